//! Application state shared across handlers

use std::sync::Arc;

use crate::db::Database;
use crate::service::SongCatalog;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    catalog: Arc<dyn SongCatalog>,
    database: Option<Database>,
}

impl AppState {
    pub fn new(catalog: impl SongCatalog + 'static) -> Self {
        Self {
            catalog: Arc::new(catalog),
            database: None,
        }
    }

    /// Attach the database `/health` checks.
    pub fn with_database(mut self, database: Database) -> Self {
        self.database = Some(database);
        self
    }

    pub fn catalog(&self) -> &dyn SongCatalog {
        self.catalog.as_ref()
    }

    pub fn database(&self) -> Option<&Database> {
        self.database.as_ref()
    }
}
