//! Domain-capped top-N selection.

use std::collections::HashMap;

use crate::config::CapConfig;
use crate::ingest::types::FeedItem;

#[derive(Debug, Clone)]
pub struct CapTable {
    limit: usize,
    default_cap: usize,
    caps: HashMap<String, usize>,
}

impl CapTable {
    pub fn new(limit: usize, default_cap: usize, caps: HashMap<String, usize>) -> Self {
        Self {
            limit,
            default_cap,
            caps,
        }
    }

    pub fn from_config(cfg: &CapConfig) -> Self {
        Self::new(cfg.limit, cfg.default_cap, cfg.caps.clone())
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// `None` means uncapped (items without a parseable host).
    pub fn cap_for(&self, domain: &str) -> Option<usize> {
        if domain == "unknown" {
            return None;
        }
        Some(self.caps.get(domain).copied().unwrap_or(self.default_cap))
    }
}

/// Pick up to `limit` items from `ranked`, honouring per-domain caps first.
///
/// Pass 1 admits an item while its domain is under cap. If that leaves the
/// selection short, pass 2 tops it up with the best remaining items regardless
/// of caps. The result keeps the relative order of `ranked`.
pub fn select_capped(ranked: &[FeedItem], caps: &CapTable) -> Vec<FeedItem> {
    let n = caps.limit();
    let mut picked = vec![false; ranked.len()];
    let mut count = 0usize;
    let mut per_domain: HashMap<&str, usize> = HashMap::new();

    for (i, it) in ranked.iter().enumerate() {
        if count == n {
            break;
        }
        let d = it.domain();
        let c = per_domain.entry(d).or_insert(0);
        if caps.cap_for(d).map_or(true, |cap| *c < cap) {
            *c += 1;
            picked[i] = true;
            count += 1;
        }
    }

    if count < n {
        for p in picked.iter_mut() {
            if count == n {
                break;
            }
            if !*p {
                *p = true;
                count += 1;
            }
        }
    }

    ranked
        .iter()
        .zip(picked)
        .filter_map(|(it, p)| p.then(|| it.clone()))
        .collect()
}
