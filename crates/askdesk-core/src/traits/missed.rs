//! Missed-query log trait.

use chrono::{DateTime, Utc};

/// Records queries that were not resolved from the curated knowledge base.
///
/// `record` must never fail the caller: implementations swallow their own
/// errors and report them through logging only.
pub trait MissedQueryLog: Send + Sync {
    fn record(&self, query: &str, at: DateTime<Utc>);
}
