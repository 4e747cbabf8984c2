//! Session state shared by the check-in tasks.

use netlog_db::Database;
use netlog_lookup::OperatorResolver;

/// Everything a check-in task needs. Shared behind an `Arc`.
pub struct AppState {
    /// Resolves call signs against the registries
    pub resolver: OperatorResolver,
    /// Where check-ins are appended
    pub database: Database,
    /// Repeater every check-in of this session is logged against
    pub repeater: String,
}

impl AppState {
    /// Create session state for one repeater.
    pub fn new(resolver: OperatorResolver, database: Database, repeater: impl Into<String>) -> Self {
        let repeater = repeater.into();
        tracing::info!("Logging check-ins for repeater {}", repeater);
        Self {
            resolver,
            database,
            repeater,
        }
    }
}
