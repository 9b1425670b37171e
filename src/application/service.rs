use std::path::Path;

use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::domain::{
    Cents, EntryKind, LedgerEntry, Totals, UserLedger, Vocabulary, classify, parse_amount,
};
use crate::storage::{Ledgers, Repository};

use super::AppError;

/// Application service owning every user's ledger.
/// This is the primary interface for any client (chat dispatcher, CLI, tests).
///
/// Mutations run under a single lock and are flushed to the repository before
/// they are acknowledged. A failed flush rolls the mutation back.
pub struct LedgerService {
    repo: Repository,
    ledgers: Mutex<Ledgers>,
    vocabulary: Vocabulary,
}

/// Result of adding an entry
#[derive(Debug, Clone)]
pub struct AddResult {
    pub kind: EntryKind,
    pub entry: LedgerEntry,
    /// Total of all entries of the same kind, including the new one
    pub kind_total: Cents,
    pub totals: Totals,
}

/// Result of deleting an entry
#[derive(Debug, Clone)]
pub struct DeleteResult {
    pub kind: EntryKind,
    pub index: usize,
    pub removed: LedgerEntry,
    pub totals: Totals,
}

/// Entries of one kind, or an explicit marker that there are none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryList {
    Empty,
    Entries(Vec<LedgerEntry>),
}

impl EntryList {
    pub fn of(entries: &[LedgerEntry]) -> Self {
        if entries.is_empty() {
            EntryList::Empty
        } else {
            EntryList::Entries(entries.to_vec())
        }
    }

    pub fn len(&self) -> usize {
        match self {
            EntryList::Empty => 0,
            EntryList::Entries(entries) => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, EntryList::Empty)
    }
}

impl LedgerService {
    /// Create a service over already-loaded ledgers.
    pub fn new(repo: Repository, ledgers: Ledgers, vocabulary: Vocabulary) -> Self {
        Self {
            repo,
            ledgers: Mutex::new(ledgers),
            vocabulary,
        }
    }

    /// Load the ledger file at `path` (or start empty if it does not exist).
    /// Legacy per-user layouts are migrated and unusable entries dropped; either
    /// change is written back immediately.
    pub async fn open(path: impl AsRef<Path>, vocabulary: Vocabulary) -> Result<Self, AppError> {
        let repo = Repository::new(path.as_ref());
        let loaded = repo.load().await?;

        info!(
            path = %repo.path().display(),
            users = loaded.ledgers.len(),
            "Loaded ledgers"
        );

        for skipped in &loaded.skipped {
            warn!(
                user = %skipped.user_id,
                kind = %skipped.kind,
                name = %skipped.name,
                reason = %skipped.reason,
                "Skipped unusable stored entry"
            );
        }
        if !loaded.migrated.is_empty() {
            info!(users = ?loaded.migrated, "Migrated legacy subscription lists");
        }
        if loaded.needs_rewrite() {
            repo.flush(&loaded.ledgers).await?;
        }

        Ok(Self::new(repo, loaded.ledgers, vocabulary))
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Apply `f` to a user's ledger and flush. On any error the user's
    /// ledger is restored to what it was before the call.
    async fn mutate<T>(
        &self,
        user_id: &str,
        f: impl FnOnce(&mut UserLedger) -> Result<T, AppError>,
    ) -> Result<T, AppError> {
        let mut ledgers = self.ledgers.lock().await;
        let previous = ledgers.get(user_id).cloned();

        let result = f(ledgers.entry(user_id.to_string()).or_default());
        let result = match result {
            Ok(value) => match self.repo.flush(&ledgers).await {
                Ok(()) => Ok(value),
                Err(err) => {
                    error!(user = user_id, error = ?err, "Failed to flush ledgers");
                    Err(AppError::Storage(err))
                }
            },
            Err(err) => Err(err),
        };

        if result.is_err() {
            match previous {
                Some(ledger) => {
                    ledgers.insert(user_id.to_string(), ledger);
                }
                None => {
                    ledgers.remove(user_id);
                }
            }
        }

        result
    }

    // ========================
    // User operations
    // ========================

    /// Register a user with an empty ledger. Returns true if the user was new.
    pub async fn start(&self, user_id: &str) -> Result<bool, AppError> {
        let mut ledgers = self.ledgers.lock().await;
        if ledgers.contains_key(user_id) {
            return Ok(false);
        }

        ledgers.insert(user_id.to_string(), UserLedger::default());
        if let Err(err) = self.repo.flush(&ledgers).await {
            error!(user = user_id, error = ?err, "Failed to flush ledgers");
            ledgers.remove(user_id);
            return Err(AppError::Storage(err));
        }

        info!(user = user_id, "Registered user");
        Ok(true)
    }

    /// Copy of a user's ledger. Unknown users have an empty ledger.
    pub async fn ledger(&self, user_id: &str) -> UserLedger {
        self.ledgers
            .lock()
            .await
            .get(user_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Copy of every ledger, for export.
    pub async fn snapshot(&self) -> Ledgers {
        self.ledgers.lock().await.clone()
    }

    /// Remove every entry of a user. Returns how many were removed.
    pub async fn clear(&self, user_id: &str) -> Result<usize, AppError> {
        let removed = self.mutate(user_id, |ledger| Ok(ledger.clear())).await?;
        info!(user = user_id, removed, "Cleared ledger");
        Ok(removed)
    }

    // ========================
    // Entry operations
    // ========================

    /// Parse a free-text message and record it as an entry.
    pub async fn record(&self, user_id: &str, message: &str) -> Result<AddResult, AppError> {
        let command = classify(message, &self.vocabulary)?;
        let parsed = parse_amount(&command.amount_token, &self.vocabulary)?;
        debug!(
            user = user_id,
            kind = %command.kind,
            name = %command.name,
            monthly = parsed.monthly,
            note = %parsed.note(),
            "Parsed entry"
        );

        self.add_entry(
            user_id,
            command.kind,
            LedgerEntry::from_parsed(command.name, parsed),
        )
        .await
    }

    /// Append an entry to a user's ledger.
    pub async fn add_entry(
        &self,
        user_id: &str,
        kind: EntryKind,
        entry: LedgerEntry,
    ) -> Result<AddResult, AppError> {
        let added = entry.clone();
        let totals = self
            .mutate(user_id, move |ledger| {
                ledger.push(kind, entry);
                Ok(ledger.checked_totals()?)
            })
            .await?;

        info!(
            user = user_id,
            %kind,
            name = %added.name,
            amount = added.amount,
            "Added entry"
        );

        Ok(AddResult {
            kind,
            entry: added,
            kind_total: totals.of(kind),
            totals,
        })
    }

    /// List a user's entries of one kind, in display order.
    pub async fn list_entries(&self, user_id: &str, kind: EntryKind) -> EntryList {
        let ledgers = self.ledgers.lock().await;
        match ledgers.get(user_id) {
            Some(ledger) => EntryList::of(ledger.entries(kind)),
            None => EntryList::Empty,
        }
    }

    /// Delete the entry at `index` in the user's list of `kind`.
    pub async fn delete_entry(
        &self,
        user_id: &str,
        kind: EntryKind,
        index: usize,
    ) -> Result<DeleteResult, AppError> {
        let (removed, totals) = self
            .mutate(user_id, |ledger| {
                let len = ledger.entries(kind).len();
                let removed = ledger
                    .remove(kind, index)
                    .ok_or(AppError::IndexOutOfRange { kind, index, len })?;
                Ok((removed, ledger.totals()))
            })
            .await?;

        info!(
            user = user_id,
            %kind,
            index,
            name = %removed.name,
            "Deleted entry"
        );

        Ok(DeleteResult {
            kind,
            index,
            removed,
            totals,
        })
    }

    /// Monthly totals and balance for a user.
    pub async fn totals(&self, user_id: &str) -> Totals {
        self.ledgers
            .lock()
            .await
            .get(user_id)
            .map(UserLedger::totals)
            .unwrap_or_default()
    }
}
