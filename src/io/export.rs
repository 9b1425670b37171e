use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;

use crate::application::LedgerService;
use crate::domain::{EntryKind, Totals, UserLedger, format_cents};

/// Full snapshot of every ledger, with derived totals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub users: BTreeMap<String, UserSnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSnapshot {
    pub ledger: UserLedger,
    pub totals: Totals,
}

/// Exporter for converting ledger data to various formats
pub struct Exporter<'a> {
    service: &'a LedgerService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a LedgerService) -> Self {
        Self { service }
    }

    /// Export every entry of every user to CSV, one row per entry.
    /// `position` is the 1-based position shown in the list view.
    pub async fn export_entries_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let ledgers = self.service.snapshot().await;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record([
            "user",
            "kind",
            "position",
            "name",
            "monthly_amount",
            "annual_amount",
        ])?;

        let mut count = 0;
        for (user_id, ledger) in &ledgers {
            for kind in EntryKind::ALL {
                for (idx, entry) in ledger.entries(kind).iter().enumerate() {
                    let position = (idx + 1).to_string();
                    let monthly = format_cents(entry.amount);
                    let annual = entry.annual_amount.map(format_cents).unwrap_or_default();
                    let record: [&str; 6] = [
                        user_id,
                        kind.as_str(),
                        &position,
                        &entry.name,
                        &monthly,
                        &annual,
                    ];
                    csv_writer.write_record(record)?;
                    count += 1;
                }
            }
        }

        csv_writer.flush()?;
        Ok(count)
    }

    /// Export every ledger as a JSON snapshot
    pub async fn export_full_json<W: Write>(&self, mut writer: W) -> Result<LedgerSnapshot> {
        let users = self
            .service
            .snapshot()
            .await
            .into_iter()
            .map(|(user_id, ledger)| {
                let totals = ledger.totals();
                (user_id, UserSnapshot { ledger, totals })
            })
            .collect();

        let snapshot = LedgerSnapshot {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Utc::now(),
            users,
        };

        let json = serde_json::to_string_pretty(&snapshot)?;
        writer.write_all(json.as_bytes())?;
        writer.flush()?;

        Ok(snapshot)
    }
}
