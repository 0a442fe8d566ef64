use time::OffsetDateTime;
use tracing::warn;
use uuid::Uuid;

use crate::dao::{
    models::AuditRecord,
    store::{DocumentStore, encode},
};

/// Collection holding the audit trail.
pub const AUDIT: &str = "auditoria";

/// Append an audit entry for an administrative mutation.
///
/// Best effort only: a failed audit write is logged and never fails the
/// mutation it describes.
pub async fn record(
    store: &DocumentStore,
    actor: &str,
    action: &str,
    entity: &str,
    entity_id: &str,
) {
    let entry = AuditRecord {
        id: Uuid::new_v4(),
        actor: actor.to_owned(),
        action: action.to_owned(),
        entity: entity.to_owned(),
        entity_id: entity_id.to_owned(),
        created_at: OffsetDateTime::now_utc(),
    };

    let result = match encode(AUDIT, &entry) {
        Ok(fields) => store.set(AUDIT, &entry.id.to_string(), fields).await,
        Err(err) => Err(err),
    };

    if let Err(err) = result {
        warn!(action, entity, entity_id, error = %err, "audit write failed");
    }
}
