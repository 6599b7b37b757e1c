// src/normalize/filings.rs
//! Regulator filing feeds: form-code allow-list and display titles.
//!
//! Filing titles look like `8-K - Acme Corp (0000012345) (Filer)`,
//! `FORM 10-Q` or `SCHEDULE 13G`; the filer name may only appear in the
//! summary as `Acme Corp (CIK 0000012345) (Filer)`.

use once_cell::sync::OnceCell;
use regex::Regex;
use std::collections::HashSet;

use crate::config::FilingsConfig;

#[derive(Debug, Clone)]
pub struct FilingRules {
    host: String,
    forms: HashSet<String>,
    tag: String,
}

impl FilingRules {
    pub fn from_config(cfg: &FilingsConfig) -> Self {
        Self {
            host: cfg.host.trim().to_ascii_lowercase(),
            forms: cfg.forms.iter().map(|f| normalize_form(f)).collect(),
            tag: cfg.tag.clone(),
        }
    }

    pub fn applies_to(&self, host: &str) -> bool {
        !self.host.is_empty() && host == self.host
    }

    pub fn is_allowed(&self, form: &str) -> bool {
        self.forms.contains(form)
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }
}

fn form_re() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| {
        Regex::new(
            r"\b(8-K|10-Q|10-K|6-K|20-F|S-1|S-3|424B5|DEF\s?14A|424B2|424B3|497K?|40-17G|SC\s?13[DG]|SCHEDULE\s?13[DG]|FORM\s+8-K|FORM\s+10-Q|FORM\s+10-K)\b",
        )
        .expect("filing form regex")
    })
}

fn filer_res() -> &'static [Regex; 3] {
    static RES: OnceCell<[Regex; 3]> = OnceCell::new();
    RES.get_or_init(|| {
        [
            Regex::new(r"(?i)([A-Z0-9&.,' -]{3,100})\s*\(CIK\s*\d{3,}\)\s*\(Filer\)")
                .expect("cik filer regex"),
            Regex::new(r"(?i)Company(?: Name)?:\s*([^\n<]{3,100})").expect("company regex"),
            Regex::new(r"(?i)For:\s*([^\n<]{3,100})").expect("for regex"),
        ]
    })
}

fn edgar_title_re() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\s-\s+([^()\n<]{3,100}?)\s*\(\d{4,}\)\s*\((?:Filer|Subject|Filed by)\)")
            .expect("edgar title regex")
    })
}

fn normalize_form(f: &str) -> String {
    let up = f.trim().to_ascii_uppercase();
    let up = up.strip_prefix("FORM").map(str::trim_start).unwrap_or(&up);
    let collapsed = up.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed == "DEF14A" {
        return "DEF 14A".to_string();
    }
    collapsed
}

/// Form code from a filing title: `"FORM 8-K"` → `"8-K"`, `"DEF14A"` → `"DEF 14A"`.
pub fn extract_form(title: &str) -> Option<String> {
    let up = title.to_ascii_uppercase();
    let m = form_re().captures(&up)?.get(1)?;
    Some(normalize_form(m.as_str()))
}

/// Filer/company name, trying the summary/content patterns first and the
/// EDGAR title shape last.
pub fn extract_filer(summary: &str, content: &str, title: &str) -> Option<String> {
    let blob = [summary, content, title].join("\n");
    for re in filer_res() {
        if let Some(m) = re.captures(&blob).and_then(|c| c.get(1)) {
            let name = m.as_str().trim();
            if !name.is_empty() {
                return Some(name.to_string());
            }
        }
    }
    edgar_title_re()
        .captures(title)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// `"<Form>: <Filer>"` when both are known, else the raw title.
pub fn display_title(title: &str, summary: &str, content: &str) -> String {
    match (extract_form(title), extract_filer(summary, content, title)) {
        (Some(form), Some(filer)) => format!("{form}: {filer}"),
        _ if !title.trim().is_empty() => title.trim().to_string(),
        _ => "SEC Filing".to_string(),
    }
}
