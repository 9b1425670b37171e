use thiserror::Error;

use super::{EntryKind, Vocabulary};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("expected a name followed by an amount")]
    TooFewTokens,

    #[error("entry name is empty")]
    EmptyName,
}

/// A message that matched the entry grammar: `[income prefix] name... amount`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryCommand {
    pub kind: EntryKind,
    pub name: String,
    /// Last whitespace-delimited token, not yet parsed.
    pub amount_token: String,
}

/// Split a free-text message into entry kind, name and amount token.
pub fn classify(message: &str, vocabulary: &Vocabulary) -> Result<EntryCommand, FormatError> {
    let message = message.trim();
    let (kind, rest) = match vocabulary.strip_income_prefix(message) {
        Some(rest) => (EntryKind::Income, rest),
        None => (EntryKind::Expense, message),
    };

    let tokens: Vec<&str> = rest.split_whitespace().collect();
    let Some((amount_token, name_tokens)) = tokens.split_last() else {
        return Err(FormatError::TooFewTokens);
    };
    if name_tokens.is_empty() {
        return Err(FormatError::TooFewTokens);
    }

    // Nothing but markers left where the name should be: "+ + 500"
    if name_tokens.iter().all(|t| vocabulary.is_income_marker(t)) {
        return Err(FormatError::EmptyName);
    }
    let name = name_tokens.join(" ");

    Ok(EntryCommand {
        kind,
        name,
        amount_token: amount_token.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify_default(message: &str) -> Result<EntryCommand, FormatError> {
        classify(message, &Vocabulary::default())
    }

    #[test]
    fn test_expense_entry() {
        let cmd = classify_default("Netflix 699").unwrap();
        assert_eq!(cmd.kind, EntryKind::Expense);
        assert_eq!(cmd.name, "Netflix");
        assert_eq!(cmd.amount_token, "699");
    }

    #[test]
    fn test_multi_word_name_is_normalized() {
        let cmd = classify_default("  Telegram   Premium\t249,00 ").unwrap();
        assert_eq!(cmd.name, "Telegram Premium");
        assert_eq!(cmd.amount_token, "249,00");
    }

    #[test]
    fn test_income_markers() {
        let cmd = classify_default("+Salary 80000").unwrap();
        assert_eq!(cmd.kind, EntryKind::Income);
        assert_eq!(cmd.name, "Salary");

        let cmd = classify_default("доход Фриланс 15000").unwrap();
        assert_eq!(cmd.kind, EntryKind::Income);
        assert_eq!(cmd.name, "Фриланс");

        let cmd = classify_default("+ Rent income 30000").unwrap();
        assert_eq!(cmd.kind, EntryKind::Income);
        assert_eq!(cmd.name, "Rent income");
    }

    #[test]
    fn test_annual_token_is_kept_whole() {
        let cmd = classify_default("Yandex Plus 83988/год").unwrap();
        assert_eq!(cmd.name, "Yandex Plus");
        assert_eq!(cmd.amount_token, "83988/год");
    }

    #[test]
    fn test_too_few_tokens() {
        assert_eq!(classify_default(""), Err(FormatError::TooFewTokens));
        assert_eq!(classify_default("Netflix"), Err(FormatError::TooFewTokens));
        assert_eq!(classify_default("699"), Err(FormatError::TooFewTokens));
        assert_eq!(classify_default("+80000"), Err(FormatError::TooFewTokens));
        assert_eq!(classify_default("+ 80000"), Err(FormatError::TooFewTokens));
    }

    #[test]
    fn test_marker_only_name_is_empty() {
        assert_eq!(classify_default("+ + 500"), Err(FormatError::EmptyName));
        assert_eq!(classify_default("доход + 500"), Err(FormatError::EmptyName));
        assert_eq!(classify_default("+ доход 500"), Err(FormatError::EmptyName));
        assert_eq!(classify_default("+ Доход 500"), Err(FormatError::EmptyName));

        // A marker inside a longer name is kept as part of it
        let cmd = classify_default("+ + Bonus 500").unwrap();
        assert_eq!(cmd.name, "+ Bonus");
    }

    #[test]
    fn test_amount_is_not_validated_here() {
        let cmd = classify_default("Netflix abc").unwrap();
        assert_eq!(cmd.amount_token, "abc");
    }
}
