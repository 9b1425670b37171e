use std::fmt::Write;

use crate::domain::{
    AmountError, BalanceState, Cents, EntryKind, FormatError, LedgerEntry, Totals, Vocabulary,
    format_cents,
};

use super::{AddResult, AppError, CompositionReport, DeleteResult, EntryList};

/// Renders replies as plain text. Pure: the same input always produces the
/// same bytes, so re-rendering an unchanged ledger is a no-op for clients.
#[derive(Debug, Clone)]
pub struct Renderer {
    currency: String,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new("₽")
    }
}

impl Renderer {
    pub fn new(currency: impl Into<String>) -> Self {
        Self {
            currency: currency.into(),
        }
    }

    pub fn money(&self, cents: Cents) -> String {
        format!("{} {}", format_cents(cents), self.currency)
    }

    /// Balance with an explicit sign for non-zero values.
    pub fn balance(&self, totals: &Totals) -> String {
        match totals.balance_state() {
            BalanceState::Surplus => format!("+{} (surplus)", self.money(totals.balance)),
            BalanceState::Deficit => format!("{} (deficit)", self.money(totals.balance)),
            BalanceState::Even => format!("{} (even)", self.money(totals.balance)),
        }
    }

    pub fn help(&self, vocabulary: &Vocabulary) -> String {
        let mut text = String::new();
        text.push_str("I track your monthly subscriptions and income.\n\n");
        text.push_str("Add an expense: Name amount\n");
        text.push_str("  e.g. Netflix 699 or Telegram Premium 249,00\n");
        let _ = writeln!(
            text,
            "Add income: start with {}\n  e.g. +Salary 80000",
            quoted(&vocabulary.income_prefixes)
        );
        let _ = writeln!(
            text,
            "Yearly price: amount/period, e.g. Yandex Plus 83988/year\n  yearly: {}\n  monthly: {}",
            quoted(&vocabulary.annual_aliases),
            quoted(&vocabulary.monthly_aliases)
        );
        text.push_str("\nCommands:\n");
        text.push_str("/total - monthly totals and balance\n");
        text.push_str("/list - all entries with delete buttons\n");
        text.push_str("/chart - share of each entry\n");
        text.push_str("/clear - remove all entries\n");
        text.push_str("/help - this message");
        text
    }

    pub fn entry_line(&self, position: usize, entry: &LedgerEntry) -> String {
        let mut line = format!("{}. {}: {}/month", position, entry.name, self.money(entry.amount));
        if let Some(annual) = entry.annual_amount {
            let _ = write!(line, " ({}/year)", self.money(annual));
        }
        line
    }

    pub fn added(&self, result: &AddResult) -> String {
        let mut text = format!(
            "Added {} \"{}\": {}/month",
            result.kind,
            result.entry.name,
            self.money(result.entry.amount)
        );
        if let Some(annual) = result.entry.annual_amount {
            let _ = write!(text, " ({}/year / 12)", self.money(annual));
        }
        let _ = write!(
            text,
            "\n{} now total {}/month\nBalance: {}",
            section_title(result.kind),
            self.money(result.kind_total),
            self.balance(&result.totals)
        );
        text
    }

    pub fn deleted(&self, result: &DeleteResult) -> String {
        format!(
            "Deleted {} \"{}\" ({}/month)",
            result.kind,
            result.removed.name,
            self.money(result.removed.amount)
        )
    }

    pub fn summary(&self, totals: &Totals) -> String {
        format!(
            "Expenses: {}/month\nIncome: {}/month\nBalance: {}",
            self.money(totals.expense),
            self.money(totals.income),
            self.balance(totals)
        )
    }

    /// Body of the list view for one kind.
    pub fn section(&self, kind: EntryKind, list: &EntryList) -> String {
        match list {
            EntryList::Empty => format!("{}: none", section_title(kind)),
            EntryList::Entries(entries) => {
                let mut text = format!("{}:", section_title(kind));
                for (idx, entry) in entries.iter().enumerate() {
                    let _ = write!(text, "\n{}", self.entry_line(idx + 1, entry));
                }
                text
            }
        }
    }

    pub fn empty_ledger(&self) -> String {
        "No entries yet. Send something like \"Netflix 699\" or \"+Salary 80000\".".to_string()
    }

    /// Caption and legend for the composition charts.
    pub fn chart(&self, report: &CompositionReport) -> String {
        let mut text = String::new();
        for kind in EntryKind::ALL {
            let slices = report.slices(kind);
            if slices.is_empty() {
                continue;
            }
            if !text.is_empty() {
                text.push_str("\n\n");
            }
            let _ = write!(text, "{} breakdown:", section_title(kind));
            for slice in slices {
                let _ = write!(
                    text,
                    "\n{:>5.1}%  {} ({})",
                    slice.percentage,
                    slice.name,
                    self.money(slice.amount)
                );
            }
        }
        let _ = write!(text, "\n\n{}", self.summary(&report.totals));
        text
    }

    pub fn error(&self, err: &AppError) -> String {
        match err {
            AppError::Format(FormatError::TooFewTokens) => {
                "Could not read that. Send: Name amount\nExample: Mail.ru Space 2900".to_string()
            }
            AppError::Format(FormatError::EmptyName) => {
                "The entry needs a name before the amount.".to_string()
            }
            AppError::Amount(AmountError::NotANumber(token)) => {
                format!("\"{}\" is not an amount. Example: Netflix 699", token)
            }
            AppError::Amount(AmountError::NonPositive(_)) => {
                "The amount must be greater than zero.".to_string()
            }
            AppError::Amount(AmountError::UnknownPeriod(period)) => format!(
                "Unknown period \"{}\". Use a yearly or monthly suffix, e.g. 83988/year.",
                period
            ),
            AppError::Amount(AmountError::TooLarge(_)) => "That amount is too large.".to_string(),
            AppError::Ledger(_) => {
                "Your totals would exceed the largest supported amount. Nothing was added."
                    .to_string()
            }
            AppError::IndexOutOfRange { .. } => {
                "Delete failed: the entry is no longer there.".to_string()
            }
            AppError::InvalidCallback(_) => "That button is no longer valid.".to_string(),
            AppError::UnknownCommand(name) => format!("Unknown command /{}. Try /help.", name),
            AppError::Storage(_) => "Could not save your data. Nothing was changed.".to_string(),
        }
    }
}

fn quoted(items: &[String]) -> String {
    items
        .iter()
        .map(|s| format!("\"{}\"", s.trim_end()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn section_title(kind: EntryKind) -> &'static str {
    match kind {
        EntryKind::Expense => "Expenses",
        EntryKind::Income => "Income",
    }
}
