// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use std::path::PathBuf;

use anyhow::Result;
use subledger::application::{Dispatcher, LedgerService, Renderer};
use subledger::domain::Vocabulary;
use tempfile::TempDir;

pub const USER: &str = "1001";

/// Path of the ledger file inside a test directory
pub fn data_path(temp_dir: &TempDir) -> PathBuf {
    temp_dir.path().join("subscriptions.json")
}

/// Helper to create a test service backed by a temporary ledger file
pub async fn test_service() -> Result<(LedgerService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let service = LedgerService::open(data_path(&temp_dir), Vocabulary::default()).await?;
    Ok((service, temp_dir))
}

/// Reload the ledger file written by a previous service
pub async fn reopen(temp_dir: &TempDir) -> Result<LedgerService> {
    Ok(LedgerService::open(data_path(temp_dir), Vocabulary::default()).await?)
}

/// Dispatcher with the default renderer
pub fn dispatcher(service: &LedgerService) -> Dispatcher<'_> {
    Dispatcher::new(service, Renderer::default())
}

/// Test fixture: a typical set of subscriptions and incomes
pub struct StandardLedger;

impl StandardLedger {
    /// Netflix 699, Spotify 299, Yandex Plus 83988/year; Salary 80000
    pub async fn create(service: &LedgerService, user: &str) -> Result<()> {
        for message in ["Netflix 699", "Spotify 299", "Yandex Plus 83988/год", "+Salary 80000"] {
            service.record(user, message).await?;
        }
        Ok(())
    }
}
