//! Audit log ports — append-only start/stop records.

use std::future::Future;

use pumphouse_domain::audit::AuditRecord;
use pumphouse_domain::error::PumphouseError;

/// Write side of the audit log. The engine only ever appends.
pub trait AuditSink {
    /// Append one record.
    fn append(
        &self,
        record: AuditRecord,
    ) -> impl Future<Output = Result<(), PumphouseError>> + Send;
}

impl<T: AuditSink + Send + Sync> AuditSink for std::sync::Arc<T> {
    fn append(
        &self,
        record: AuditRecord,
    ) -> impl Future<Output = Result<(), PumphouseError>> + Send {
        (**self).append(record)
    }
}

/// Read side of the audit log, used by user-facing flows only — the
/// engine itself has no read contract.
pub trait AuditQuery {
    /// The most recent records, newest first.
    fn recent(
        &self,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<AuditRecord>, PumphouseError>> + Send;
}

impl<T: AuditQuery + Send + Sync> AuditQuery for std::sync::Arc<T> {
    fn recent(
        &self,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<AuditRecord>, PumphouseError>> + Send {
        (**self).recent(limit)
    }
}
