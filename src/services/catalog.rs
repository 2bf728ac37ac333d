//! Catalog stock maintenance service

use crate::{error::AppResult, models::CopyRecord, repository::Repository};

/// Title registration and stock adjustments.
///
/// These are the only paths that set copy counts outside the admit/release
/// operations used by lending.
#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Register a new title with its initial stock
    pub async fn register_title(&self, title_key: &str, total_copies: u32) -> AppResult<CopyRecord> {
        let _guard = self.repository.locks.acquire(title_key).await;
        let record = self.repository.copies.register(title_key, total_copies)?;
        tracing::info!(
            title_key = %title_key,
            total_copies = total_copies,
            "Registered title"
        );
        Ok(record)
    }

    pub fn get_record(&self, title_key: &str) -> AppResult<CopyRecord> {
        self.repository.copies.get(title_key)
    }

    pub fn list_records(&self) -> Vec<CopyRecord> {
        self.repository.copies.list()
    }

    pub async fn add_copies(&self, title_key: &str, n: u32) -> AppResult<CopyRecord> {
        let _guard = self.repository.locks.acquire(title_key).await;
        let record = self.repository.copies.add_copies(title_key, n)?;
        tracing::info!(
            title_key = %title_key,
            added = n,
            available = record.available_copies,
            total = record.total_copies,
            "Added copies"
        );
        Ok(record)
    }

    pub async fn retire_copies(&self, title_key: &str, n: u32) -> AppResult<CopyRecord> {
        let _guard = self.repository.locks.acquire(title_key).await;
        let record = self.repository.copies.retire_copies(title_key, n)?;
        tracing::info!(
            title_key = %title_key,
            retired = n,
            available = record.available_copies,
            total = record.total_copies,
            "Retired copies"
        );
        Ok(record)
    }

    pub async fn set_maintenance(&self, title_key: &str, on: bool) -> AppResult<CopyRecord> {
        let _guard = self.repository.locks.acquire(title_key).await;
        let record = self.repository.copies.set_maintenance(title_key, on)?;
        tracing::info!(title_key = %title_key, maintenance = on, "Maintenance flag changed");
        Ok(record)
    }
}
