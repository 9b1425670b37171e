use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Cents, EntryKind, LedgerEntry};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("{0} total exceeds the largest representable amount")]
    TotalOverflow(EntryKind),
}

/// One user's recurring expenses and incomes, in insertion order.
/// Positions in each list are the indices used for deletion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserLedger {
    pub expenses: Vec<LedgerEntry>,
    pub incomes: Vec<LedgerEntry>,
}

impl UserLedger {
    pub fn entries(&self, kind: EntryKind) -> &[LedgerEntry] {
        match kind {
            EntryKind::Expense => &self.expenses,
            EntryKind::Income => &self.incomes,
        }
    }

    fn entries_mut(&mut self, kind: EntryKind) -> &mut Vec<LedgerEntry> {
        match kind {
            EntryKind::Expense => &mut self.expenses,
            EntryKind::Income => &mut self.incomes,
        }
    }

    pub fn push(&mut self, kind: EntryKind, entry: LedgerEntry) {
        self.entries_mut(kind).push(entry);
    }

    /// Remove the entry at `index`, shifting later entries down by one.
    /// Returns `None` if the index is out of range.
    pub fn remove(&mut self, kind: EntryKind, index: usize) -> Option<LedgerEntry> {
        let entries = self.entries_mut(kind);
        if index < entries.len() {
            Some(entries.remove(index))
        } else {
            None
        }
    }

    /// Remove every entry, returning how many were dropped.
    pub fn clear(&mut self) -> usize {
        let count = self.len();
        self.expenses.clear();
        self.incomes.clear();
        count
    }

    pub fn len(&self) -> usize {
        self.expenses.len() + self.incomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty() && self.incomes.is_empty()
    }

    /// Total of one kind, saturating at `Cents::MAX`. Ledgers that passed
    /// `checked_totals` never saturate.
    pub fn total(&self, kind: EntryKind) -> Cents {
        sum_amounts(self.entries(kind)).unwrap_or(Cents::MAX)
    }

    pub fn totals(&self) -> Totals {
        Totals::new(self.total(EntryKind::Expense), self.total(EntryKind::Income))
    }

    /// Totals, or an error if either sum does not fit in `Cents`.
    pub fn checked_totals(&self) -> Result<Totals, LedgerError> {
        let sum = |kind: EntryKind| {
            sum_amounts(self.entries(kind)).ok_or(LedgerError::TotalOverflow(kind))
        };
        let expense = sum(EntryKind::Expense)?;
        let income = sum(EntryKind::Income)?;
        Totals::checked(expense, income).ok_or(LedgerError::TotalOverflow(EntryKind::Expense))
    }
}

/// Sum the monthly amounts of a list of entries. `None` on overflow.
pub fn sum_amounts(entries: &[LedgerEntry]) -> Option<Cents> {
    entries
        .iter()
        .try_fold(0 as Cents, |acc, e| acc.checked_add(e.amount))
}

/// Monthly totals for one user.
/// Balance = total income - total expense
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Totals {
    pub expense: Cents,
    pub income: Cents,
    pub balance: Cents,
}

impl Totals {
    pub fn new(expense: Cents, income: Cents) -> Self {
        Self {
            expense,
            income,
            balance: income.saturating_sub(expense),
        }
    }

    pub fn checked(expense: Cents, income: Cents) -> Option<Self> {
        Some(Self {
            expense,
            income,
            balance: income.checked_sub(expense)?,
        })
    }

    pub fn of(&self, kind: EntryKind) -> Cents {
        match kind {
            EntryKind::Expense => self.expense,
            EntryKind::Income => self.income,
        }
    }

    pub fn balance_state(&self) -> BalanceState {
        BalanceState::of(self.balance)
    }
}

/// Sign of the balance. Only affects presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BalanceState {
    Surplus,
    Deficit,
    Even,
}

impl BalanceState {
    pub fn of(balance: Cents) -> Self {
        match balance.signum() {
            1 => BalanceState::Surplus,
            -1 => BalanceState::Deficit,
            _ => BalanceState::Even,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger_with(expenses: &[(&str, Cents)], incomes: &[(&str, Cents)]) -> UserLedger {
        let mut ledger = UserLedger::default();
        for (name, amount) in expenses {
            ledger.push(EntryKind::Expense, LedgerEntry::new(*name, *amount));
        }
        for (name, amount) in incomes {
            ledger.push(EntryKind::Income, LedgerEntry::new(*name, *amount));
        }
        ledger
    }

    #[test]
    fn test_totals_empty() {
        let ledger = UserLedger::default();
        assert_eq!(ledger.totals(), Totals::default());
        assert_eq!(ledger.totals().balance_state(), BalanceState::Even);
    }

    #[test]
    fn test_balance_is_income_minus_expense() {
        let ledger = ledger_with(&[("Netflix", 69900), ("Spotify", 29900)], &[("Salary", 8000000)]);
        let totals = ledger.totals();
        assert_eq!(totals.expense, 99800);
        assert_eq!(totals.income, 8000000);
        assert_eq!(totals.balance, 8000000 - 99800);
        assert_eq!(totals.balance_state(), BalanceState::Surplus);
        assert_eq!(totals.of(EntryKind::Expense), 99800);
    }

    #[test]
    fn test_deficit() {
        let ledger = ledger_with(&[("Rent", 5000000)], &[("Stipend", 1000000)]);
        assert_eq!(ledger.totals().balance, -4000000);
        assert_eq!(ledger.totals().balance_state(), BalanceState::Deficit);
    }

    #[test]
    fn test_remove_shifts_indices() {
        let mut ledger = ledger_with(&[("A", 100), ("B", 200), ("C", 300)], &[]);
        let removed = ledger.remove(EntryKind::Expense, 1).unwrap();
        assert_eq!(removed.name, "B");
        assert_eq!(ledger.total(EntryKind::Expense), 400);

        let names: Vec<&str> = ledger.expenses.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["A", "C"]);
    }

    #[test]
    fn test_remove_out_of_range() {
        let mut ledger = ledger_with(&[("A", 100)], &[]);
        assert!(ledger.remove(EntryKind::Expense, 1).is_none());
        assert!(ledger.remove(EntryKind::Income, 0).is_none());
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_checked_totals_overflow() {
        let ledger = ledger_with(&[("A", Cents::MAX - 10), ("B", 11)], &[("C", 5)]);
        assert_eq!(
            ledger.checked_totals(),
            Err(LedgerError::TotalOverflow(EntryKind::Expense))
        );
        assert_eq!(ledger.total(EntryKind::Expense), Cents::MAX);
        assert_eq!(ledger.totals().balance, 5 - Cents::MAX);

        let ledger = ledger_with(&[("A", 100)], &[("B", Cents::MAX), ("C", 1)]);
        assert_eq!(
            ledger.checked_totals(),
            Err(LedgerError::TotalOverflow(EntryKind::Income))
        );
    }

    #[test]
    fn test_checked_totals_matches_totals() {
        let ledger = ledger_with(&[("Netflix", 69900)], &[("Salary", 8000000)]);
        assert_eq!(ledger.checked_totals(), Ok(ledger.totals()));
        assert_eq!(Totals::checked(Cents::MAX, -2), None);
        assert_eq!(Totals::new(Cents::MAX, -2).balance, Cents::MIN);
    }

    #[test]
    fn test_clear() {
        let mut ledger = ledger_with(&[("A", 100)], &[("B", 200)]);
        assert_eq!(ledger.clear(), 2);
        assert!(ledger.is_empty());
    }
}
