//! Application state shared across handlers.

use std::sync::Arc;

use analytics::TrendClassifier;
use database::Database;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database connection.
    pub db: Database,
    /// Trend classifier collaborator.
    pub classifier: Arc<dyn TrendClassifier>,
}

impl AppState {
    /// Create new application state.
    pub fn new(db: Database, classifier: Arc<dyn TrendClassifier>) -> Self {
        Self { db, classifier }
    }
}
