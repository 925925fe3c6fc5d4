//! Error taxonomy for the Office Hours Oracle.
//!
//! Generation-backend failures never appear here: they are absorbed inside
//! the daemon's gateway and replaced by deterministic fallbacks. These
//! variants cover store integrity violations and not-found lookups, which
//! always propagate to the caller.

use crate::types::{HelperId, QueueId, RequestId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OracleError {
    #[error("unknown helper id {0}")]
    UnknownHelper(HelperId),

    #[error("unknown request id {0}")]
    UnknownRequest(RequestId),

    #[error("queue entry {0} not found")]
    QueueEntryNotFound(QueueId),

    #[error("no active helpers available to take requests")]
    EmptyRoster,
}

impl OracleError {
    /// Whether this is a plain not-found lookup rather than a rejected write.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::QueueEntryNotFound(_))
    }
}
