use serde::{Deserialize, Serialize};

use crate::domain::{Cents, EntryKind, LedgerEntry, Totals, UserLedger};

/// Share of each entry in its kind's monthly total. This is the data behind
/// the expense/income pie charts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionReport {
    pub expenses: Vec<CompositionSlice>,
    pub incomes: Vec<CompositionSlice>,
    pub totals: Totals,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionSlice {
    pub name: String,
    pub amount: Cents,
    pub percentage: f64,
}

impl CompositionReport {
    pub fn build(ledger: &UserLedger) -> Self {
        let totals = ledger.totals();
        Self {
            expenses: slices(&ledger.expenses, totals.expense),
            incomes: slices(&ledger.incomes, totals.income),
            totals,
        }
    }

    pub fn slices(&self, kind: EntryKind) -> &[CompositionSlice] {
        match kind {
            EntryKind::Expense => &self.expenses,
            EntryKind::Income => &self.incomes,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty() && self.incomes.is_empty()
    }
}

/// Slices sorted by amount, largest first. Entries sharing a name are
/// merged into one slice.
fn slices(entries: &[LedgerEntry], total: Cents) -> Vec<CompositionSlice> {
    let mut merged: Vec<(String, Cents)> = Vec::new();
    for entry in entries {
        match merged.iter_mut().find(|(name, _)| *name == entry.name) {
            Some((_, amount)) => *amount += entry.amount,
            None => merged.push((entry.name.clone(), entry.amount)),
        }
    }

    // Stable sort keeps insertion order among equal amounts
    merged.sort_by(|a, b| b.1.cmp(&a.1));

    merged
        .into_iter()
        .map(|(name, amount)| CompositionSlice {
            name,
            amount,
            percentage: if total > 0 {
                amount as f64 / total as f64 * 100.0
            } else {
                0.0
            },
        })
        .collect()
}
