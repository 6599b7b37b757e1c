//! Keyword tagger: multi-label classification over title + summary.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRule {
    pub label: String,
    /// Lower-case substrings; leading/trailing spaces act as word boundaries.
    pub keywords: Vec<String>,
}

impl TagRule {
    pub fn new(label: &str, keywords: &[&str]) -> Self {
        Self {
            label: label.to_string(),
            keywords: keywords.iter().map(|k| k.to_ascii_lowercase()).collect(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Tagger {
    rules: Vec<TagRule>,
}

impl Tagger {
    /// Keywords are lower-cased here so tables loaded from config match the
    /// same way as the built-in seed.
    pub fn new(mut rules: Vec<TagRule>) -> Self {
        for rule in &mut rules {
            for k in &mut rule.keywords {
                *k = k.to_lowercase();
            }
        }
        Self { rules }
    }

    /// Labels whose keywords occur in the text, in table order, without repeats.
    pub fn tag(&self, title: &str, summary: &str) -> Vec<String> {
        // Padding lets " clo " match at the very start or end of the text.
        let text = format!(" {} {} ", title, summary).to_lowercase();
        let mut out: Vec<String> = Vec::new();
        for rule in &self.rules {
            if out.contains(&rule.label) {
                continue;
            }
            if rule.keywords.iter().any(|k| text.contains(k.as_str())) {
                out.push(rule.label.clone());
            }
        }
        out
    }
}
