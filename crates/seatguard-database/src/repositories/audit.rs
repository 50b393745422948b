//! Seat audit log repository. Insert and select only.

use sqlx::PgExecutor;

use seatguard_core::error::{AppError, ErrorKind};
use seatguard_core::result::AppResult;
use seatguard_core::types::{AuditRecordId, OrganizationId};
use seatguard_entity::audit::{AuditRecord, AuditSummary, NewAuditRecord, SeatAuditAction};

use super::store_error;

const AUDIT_COLUMNS: &str =
    "id, sequence, organization_id, user_id, session_id, action, details, created_at";

/// Queries against `seat_audit_log`.
#[derive(Debug, Clone, Copy)]
pub struct AuditRepository;

impl AuditRepository {
    /// Append a record.
    pub async fn insert<'e, E: PgExecutor<'e>>(
        executor: E,
        record: &NewAuditRecord,
    ) -> AppResult<AuditRecord> {
        let sql = format!(
            "INSERT INTO seat_audit_log \
             (id, organization_id, user_id, session_id, action, details, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {AUDIT_COLUMNS}"
        );
        sqlx::query_as::<_, AuditRecord>(&sql)
            .bind(AuditRecordId::new())
            .bind(record.organization_id)
            .bind(record.user_id)
            .bind(record.session_id)
            .bind(record.action)
            .bind(&record.details)
            .bind(record.created_at)
            .fetch_one(executor)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::AuditWrite,
                    format!("Failed to append {} audit record", record.action),
                    e,
                )
            })
    }

    /// Newest records first; same-instant records in reverse insertion order.
    pub async fn recent<'e, E: PgExecutor<'e>>(
        executor: E,
        organization_id: OrganizationId,
        limit: u32,
    ) -> AppResult<Vec<AuditRecord>> {
        let sql = format!(
            "SELECT {AUDIT_COLUMNS} FROM seat_audit_log WHERE organization_id = $1 \
             ORDER BY created_at DESC, sequence DESC LIMIT $2"
        );
        sqlx::query_as::<_, AuditRecord>(&sql)
            .bind(organization_id)
            .bind(i64::from(limit))
            .fetch_all(executor)
            .await
            .map_err(store_error("Failed to query audit trail"))
    }

    /// Count records per action.
    pub async fn summarize<'e, E: PgExecutor<'e>>(
        executor: E,
        organization_id: OrganizationId,
    ) -> AppResult<AuditSummary> {
        let rows: Vec<(SeatAuditAction, i64)> = sqlx::query_as(
            "SELECT action, COUNT(*) FROM seat_audit_log WHERE organization_id = $1 \
             GROUP BY action",
        )
        .bind(organization_id)
        .fetch_all(executor)
        .await
        .map_err(store_error("Failed to summarize audit trail"))?;

        let mut summary = AuditSummary::default();
        for (action, count) in rows {
            let count = u64::try_from(count).unwrap_or(0);
            match action {
                SeatAuditAction::SeatAllocated => summary.allocated = count,
                SeatAuditAction::SeatDeallocated => summary.deallocated = count,
                SeatAuditAction::SeatLimitExceeded => summary.limit_exceeded = count,
            }
        }
        Ok(summary)
    }
}
