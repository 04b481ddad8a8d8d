use serde::Serialize;
use smartsales_domain::AuditEntry;
use ts_rs::TS;

use super::common::timestamp;

/// API representation of one bitácora entry.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/audit-entry-response.ts"
)]
pub struct AuditEntryResponse {
    pub id: i64,
    pub usuario: Option<String>,
    pub accion: String,
    pub ip: Option<String>,
    pub fecha_hora: String,
    pub estado: bool,
}

impl From<AuditEntry> for AuditEntryResponse {
    fn from(entry: AuditEntry) -> Self {
        Self {
            id: entry.id,
            usuario: entry.username,
            accion: entry.action,
            ip: entry.ip,
            fecha_hora: timestamp(entry.recorded_at),
            estado: entry.success,
        }
    }
}
