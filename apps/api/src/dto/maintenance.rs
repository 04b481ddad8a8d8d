use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smartsales_application::{MaintenanceProgress, MaintenanceRequest};
use smartsales_core::AppResult;
use smartsales_domain::MaintenanceTicket;
use ts_rs::TS;

use super::common::{money, timestamp};

/// Incoming payload for a maintenance request.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-maintenance-request.ts"
)]
pub struct CreateMaintenanceRequest {
    pub producto_id: i64,
    pub venta_id: i64,
    pub tipo_mantenimiento: String,
    #[serde(default)]
    pub descripcion: String,
}

/// Incoming payload for technician assignment.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/assign-technician-request.ts"
)]
pub struct AssignTechnicianRequest {
    pub tecnico: i64,
}

/// Incoming payload for ticket progress.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-maintenance-status-request.ts"
)]
pub struct UpdateMaintenanceStatusRequest {
    pub estado: String,
    #[ts(type = "string | null")]
    pub fecha_realizacion: Option<DateTime<Utc>>,
    #[ts(type = "string | number | null")]
    pub costo: Option<Decimal>,
    pub notas_tecnico: Option<String>,
}

/// API representation of a maintenance ticket.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/maintenance-response.ts"
)]
pub struct MaintenanceResponse {
    pub id: i64,
    pub producto: i64,
    pub producto_nombre: String,
    pub cliente: i64,
    pub tecnico: Option<i64>,
    pub venta: i64,
    pub fecha_solicitud: String,
    pub fecha_realizacion: Option<String>,
    pub tipo_mantenimiento: String,
    pub estado: String,
    pub descripcion: String,
    pub cubierto_por_garantia: bool,
    pub costo: Option<String>,
    pub notas_tecnico: Option<String>,
}

impl CreateMaintenanceRequest {
    pub fn into_request(self) -> AppResult<MaintenanceRequest> {
        Ok(MaintenanceRequest {
            product_id: self.producto_id,
            sale_id: self.venta_id,
            kind: self.tipo_mantenimiento.parse()?,
            description: self.descripcion,
        })
    }
}

impl UpdateMaintenanceStatusRequest {
    pub fn into_progress(self) -> AppResult<MaintenanceProgress> {
        Ok(MaintenanceProgress {
            status: self.estado.parse()?,
            performed_at: self.fecha_realizacion,
            cost: self.costo,
            technician_notes: self.notas_tecnico,
        })
    }
}

impl From<MaintenanceTicket> for MaintenanceResponse {
    fn from(ticket: MaintenanceTicket) -> Self {
        Self {
            id: ticket.id,
            producto: ticket.product_id,
            producto_nombre: ticket.product_name,
            cliente: ticket.customer_id,
            tecnico: ticket.technician_id,
            venta: ticket.sale_id,
            fecha_solicitud: timestamp(ticket.requested_at),
            fecha_realizacion: ticket.performed_at.map(timestamp),
            tipo_mantenimiento: ticket.kind.as_str().to_owned(),
            estado: ticket.status.as_str().to_owned(),
            descripcion: ticket.description,
            cubierto_por_garantia: ticket.covered_by_warranty,
            costo: ticket.cost.map(money),
            notas_tecnico: ticket.technician_notes,
        }
    }
}
