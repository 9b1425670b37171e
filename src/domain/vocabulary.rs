use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Billing cadence of a recurring amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Monthly,
    Annual,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Monthly => "monthly",
            Period::Annual => "annual",
        }
    }

    /// Number of months one billing cycle covers.
    pub fn months(&self) -> u32 {
        match self {
            Period::Monthly => 1,
            Period::Annual => 12,
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Phrase table used to read user messages.
///
/// All matching is case-insensitive. Missing keys in a vocabulary file fall
/// back to the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vocabulary {
    /// Leading markers that turn a message into an income entry. Trailing
    /// whitespace inside a prefix is significant ("доход " requires a space).
    pub income_prefixes: Vec<String>,
    /// Suffixes after `/` meaning the cost is per year.
    pub annual_aliases: Vec<String>,
    /// Suffixes after `/` meaning the cost is per month.
    pub monthly_aliases: Vec<String>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        Self {
            income_prefixes: owned(&["+", "доход "]),
            annual_aliases: owned(&["год", "г", "y", "year", "annual"]),
            monthly_aliases: owned(&["месяц", "мес", "м", "month"]),
        }
    }
}

impl Vocabulary {
    /// Load a vocabulary from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read vocabulary file: {}", path.display()))?;
        let vocabulary: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid vocabulary file: {}", path.display()))?;
        Ok(vocabulary)
    }

    /// Resolve a period alias.
    pub fn period(&self, alias: &str) -> Option<Period> {
        let alias = alias.trim().to_lowercase();
        let matches = |aliases: &[String]| aliases.iter().any(|a| a.to_lowercase() == alias);

        if matches(&self.annual_aliases) {
            Some(Period::Annual)
        } else if matches(&self.monthly_aliases) {
            Some(Period::Monthly)
        } else {
            None
        }
    }

    /// If `text` starts with an income prefix, return the remainder.
    pub fn strip_income_prefix<'a>(&self, text: &'a str) -> Option<&'a str> {
        self.income_prefixes
            .iter()
            .filter(|prefix| !prefix.is_empty())
            .find_map(|prefix| strip_prefix_ignore_case(text, prefix))
    }

    /// Whether a whole token is one of the income markers.
    pub fn is_income_marker(&self, token: &str) -> bool {
        let token = token.to_lowercase();
        self.income_prefixes
            .iter()
            .map(|prefix| prefix.trim())
            .any(|prefix| !prefix.is_empty() && prefix.to_lowercase() == token)
    }
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let len = prefix.chars().count();
    let end = match text.char_indices().nth(len) {
        Some((idx, _)) => idx,
        None if text.chars().count() == len => text.len(),
        None => return None,
    };

    if text[..end].to_lowercase() == prefix.to_lowercase() {
        Some(&text[end..])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_aliases() {
        let vocab = Vocabulary::default();
        for alias in ["год", "Г", "y", "YEAR", "annual", " year "] {
            assert_eq!(vocab.period(alias), Some(Period::Annual), "{alias}");
        }
        for alias in ["месяц", "МЕС", "м", "Month"] {
            assert_eq!(vocab.period(alias), Some(Period::Monthly), "{alias}");
        }
        assert_eq!(vocab.period("week"), None);
        assert_eq!(vocab.period(""), None);
    }

    #[test]
    fn test_income_prefixes() {
        let vocab = Vocabulary::default();
        assert_eq!(vocab.strip_income_prefix("+Salary 80000"), Some("Salary 80000"));
        assert_eq!(
            vocab.strip_income_prefix("Доход Зарплата 80000"),
            Some("Зарплата 80000")
        );
        assert_eq!(vocab.strip_income_prefix("ДОХОД фриланс 5000"), Some("фриланс 5000"));
        assert_eq!(vocab.strip_income_prefix("доходы 5000"), None);
        assert_eq!(vocab.strip_income_prefix("Netflix 699"), None);

        assert!(vocab.is_income_marker("+"));
        assert!(vocab.is_income_marker("ДОХОД"));
        assert!(!vocab.is_income_marker("доходы"));
        assert_eq!(vocab.strip_income_prefix("+"), Some(""));
    }

    #[test]
    fn test_custom_vocabulary_from_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vocab.json");
        std::fs::write(&path, r#"{ "income_prefixes": ["income "] }"#).unwrap();

        let vocab = Vocabulary::from_json_file(&path).unwrap();
        assert_eq!(vocab.income_prefixes, vec!["income ".to_string()]);
        // Unspecified tables keep their defaults
        assert_eq!(vocab.period("год"), Some(Period::Annual));
        assert_eq!(vocab.strip_income_prefix("Income Rent 900"), Some("Rent 900"));
        assert_eq!(vocab.strip_income_prefix("+Rent 900"), None);
    }

    #[test]
    fn test_period_months() {
        assert_eq!(Period::Monthly.months(), 1);
        assert_eq!(Period::Annual.months(), 12);
    }
}
