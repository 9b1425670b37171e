use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;

use crate::domain::{
    Cents, EntryKind, LedgerEntry, MAX_ENTRY_CENTS, UserLedger, cents_from_f64, cents_to_f64,
};

/// All ledgers, keyed by user identifier.
pub type Ledgers = BTreeMap<String, UserLedger>;

/// Result of loading the store from disk.
#[derive(Debug, Default)]
pub struct Loaded {
    pub ledgers: Ledgers,
    /// Users whose data was stored in the legacy bare-array shape.
    pub migrated: Vec<String>,
    /// Stored entries that could not be used and were left out.
    pub skipped: Vec<SkippedEntry>,
}

impl Loaded {
    /// Whether the file on disk differs from what was loaded and should be
    /// rewritten.
    pub fn needs_rewrite(&self) -> bool {
        !self.migrated.is_empty() || !self.skipped.is_empty()
    }
}

/// A stored entry dropped while loading.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedEntry {
    pub user_id: String,
    pub kind: EntryKind,
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredEntry {
    name: String,
    amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    annual_amount: Option<f64>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredLedger {
    #[serde(default)]
    subscriptions: Vec<StoredEntry>,
    #[serde(default)]
    incomes: Vec<StoredEntry>,
}

/// Per-user value as found on disk. Early files kept only a list of
/// subscriptions per user.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredUser {
    Legacy(Vec<StoredEntry>),
    Current(StoredLedger),
}

/// Repository persisting every ledger to a single pretty-printed JSON file.
/// Each flush rewrites the whole file.
pub struct Repository {
    path: PathBuf,
}

impl Repository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every ledger. A missing or empty file yields an empty store.
    pub async fn load(&self) -> Result<Loaded> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Loaded::default());
            }
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("Failed to read ledger file: {}", self.path.display())
                });
            }
        };

        if raw.trim().is_empty() {
            return Ok(Loaded::default());
        }

        let stored: BTreeMap<String, StoredUser> = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid ledger file: {}", self.path.display()))?;

        let mut loaded = Loaded::default();
        for (user_id, user) in stored {
            let stored_ledger = match user {
                StoredUser::Legacy(subscriptions) => {
                    loaded.migrated.push(user_id.clone());
                    StoredLedger {
                        subscriptions,
                        incomes: Vec::new(),
                    }
                }
                StoredUser::Current(ledger) => ledger,
            };

            let ledger = UserLedger {
                expenses: Self::stored_to_entries(
                    &user_id,
                    EntryKind::Expense,
                    stored_ledger.subscriptions,
                    &mut loaded.skipped,
                ),
                incomes: Self::stored_to_entries(
                    &user_id,
                    EntryKind::Income,
                    stored_ledger.incomes,
                    &mut loaded.skipped,
                ),
            };
            ledger
                .checked_totals()
                .with_context(|| format!("Invalid ledger for user {}", user_id))?;
            loaded.ledgers.insert(user_id, ledger);
        }

        Ok(loaded)
    }

    /// Write every ledger to disk, replacing the previous file.
    pub async fn flush(&self, ledgers: &Ledgers) -> Result<()> {
        let bytes = Self::encode(ledgers)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.with_context(|| {
                    format!("Failed to create directory: {}", parent.display())
                })?;
            }
        }

        let tmp_path = self.tmp_path();
        tokio::fs::write(&tmp_path, &bytes)
            .await
            .with_context(|| format!("Failed to write ledger file: {}", tmp_path.display()))?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .with_context(|| format!("Failed to replace ledger file: {}", self.path.display()))?;

        Ok(())
    }

    /// Serialize ledgers in the on-disk format (four-space indentation,
    /// non-ASCII kept verbatim).
    pub fn encode(ledgers: &Ledgers) -> Result<Vec<u8>> {
        let stored: BTreeMap<&str, StoredLedger> = ledgers
            .iter()
            .map(|(user_id, ledger)| (user_id.as_str(), Self::ledger_to_stored(ledger)))
            .collect();

        let mut buf = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        stored
            .serialize(&mut serializer)
            .context("Failed to serialize ledgers")?;
        Ok(buf)
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn ledger_to_stored(ledger: &UserLedger) -> StoredLedger {
        let convert = |entries: &[LedgerEntry]| {
            entries
                .iter()
                .map(|e| StoredEntry {
                    name: e.name.clone(),
                    amount: cents_to_f64(e.amount),
                    annual_amount: e.annual_amount.map(cents_to_f64),
                })
                .collect()
        };

        StoredLedger {
            subscriptions: convert(&ledger.expenses),
            incomes: convert(&ledger.incomes),
        }
    }

    /// Convert stored entries, dropping the ones a current ledger cannot hold.
    fn stored_to_entries(
        user_id: &str,
        kind: EntryKind,
        stored: Vec<StoredEntry>,
        skipped: &mut Vec<SkippedEntry>,
    ) -> Vec<LedgerEntry> {
        let mut entries = Vec::with_capacity(stored.len());
        for s in stored {
            match Self::stored_to_entry(&s) {
                Ok(entry) => entries.push(entry),
                Err(reason) => skipped.push(SkippedEntry {
                    user_id: user_id.to_string(),
                    kind,
                    name: s.name,
                    reason,
                }),
            }
        }
        entries
    }

    fn stored_to_entry(stored: &StoredEntry) -> Result<LedgerEntry, String> {
        let name = stored.name.trim();
        if name.is_empty() {
            return Err("empty name".to_string());
        }

        let amount = Self::stored_cents(stored.amount)
            .ok_or_else(|| format!("invalid amount {}", stored.amount))?;
        let annual_amount = match stored.annual_amount {
            None => None,
            Some(value) => Some(
                Self::stored_cents(value)
                    .ok_or_else(|| format!("invalid annual amount {}", value))?,
            ),
        };

        Ok(LedgerEntry {
            name: name.to_string(),
            amount,
            annual_amount,
        })
    }

    /// A stored amount as cents, if it is positive and within the entry ceiling.
    fn stored_cents(value: f64) -> Option<Cents> {
        cents_from_f64(value).filter(|cents| (1..=MAX_ENTRY_CENTS).contains(cents))
    }
}
