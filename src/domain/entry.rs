use serde::{Deserialize, Serialize};

use super::{Cents, ParsedAmount};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Money leaving every month (subscriptions, bills)
    Expense,
    /// Money arriving every month (salary, rent received)
    Income,
}

impl EntryKind {
    pub const ALL: [EntryKind; 2] = [EntryKind::Expense, EntryKind::Income];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Expense => "expense",
            EntryKind::Income => "income",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "expense" | "exp" => Some(EntryKind::Expense),
            "income" | "inc" => Some(EntryKind::Income),
            _ => None,
        }
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A named recurring amount. Entries are immutable once recorded; the ledger
/// only appends and removes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub name: String,
    /// Monthly amount in cents (always positive)
    pub amount: Cents,
    /// Yearly figure the monthly amount was derived from, if any
    pub annual_amount: Option<Cents>,
}

impl LedgerEntry {
    pub fn new(name: impl Into<String>, amount: Cents) -> Self {
        assert!(amount > 0, "Entry amount must be positive");
        Self {
            name: name.into(),
            amount,
            annual_amount: None,
        }
    }

    pub fn from_parsed(name: impl Into<String>, parsed: ParsedAmount) -> Self {
        let entry = Self::new(name, parsed.monthly);
        match parsed.annual {
            Some(annual) => entry.with_annual_amount(annual),
            None => entry,
        }
    }

    pub fn with_annual_amount(mut self, annual: Cents) -> Self {
        self.annual_amount = Some(annual);
        self
    }

    pub fn is_annual(&self) -> bool {
        self.annual_amount.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_kind_roundtrip() {
        for kind in EntryKind::ALL {
            let parsed = EntryKind::from_str(kind.as_str()).unwrap();
            assert_eq!(kind, parsed);
        }
        assert_eq!(EntryKind::from_str("EXP"), Some(EntryKind::Expense));
        assert_eq!(EntryKind::from_str("inc"), Some(EntryKind::Income));
        assert_eq!(EntryKind::from_str("asset"), None);
    }

    #[test]
    fn test_entry_from_annual_parse() {
        let parsed = ParsedAmount {
            monthly: 699900,
            annual: Some(8398800),
        };
        let entry = LedgerEntry::from_parsed("Yandex Plus", parsed);
        assert_eq!(entry.amount, 699900);
        assert_eq!(entry.annual_amount, Some(8398800));
        assert!(entry.is_annual());
    }

    #[test]
    #[should_panic(expected = "Entry amount must be positive")]
    fn test_entry_rejects_zero_amount() {
        LedgerEntry::new("Broken", 0);
    }
}
