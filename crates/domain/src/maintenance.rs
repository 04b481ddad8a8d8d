use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smartsales_core::AppError;

/// Kind of maintenance requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaintenanceKind {
    /// Scheduled upkeep.
    Preventivo,
    /// Repair of a fault.
    Correctivo,
}

impl MaintenanceKind {
    /// Returns the stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Preventivo => "preventivo",
            Self::Correctivo => "correctivo",
        }
    }
}

impl FromStr for MaintenanceKind {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "preventivo" => Ok(Self::Preventivo),
            "correctivo" => Ok(Self::Correctivo),
            _ => Err(AppError::Validation(format!(
                "tipo de mantenimiento desconocido '{value}'"
            ))),
        }
    }
}

/// Maintenance ticket lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceStatus {
    /// Waiting for a technician.
    Pendiente,
    /// Being worked on.
    EnProceso,
    /// Finished.
    Completado,
    /// Cancelled.
    Cancelado,
}

impl MaintenanceStatus {
    /// Returns the stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pendiente => "pendiente",
            Self::EnProceso => "en_proceso",
            Self::Completado => "completado",
            Self::Cancelado => "cancelado",
        }
    }

    /// Pending or in progress.
    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Pendiente | Self::EnProceso)
    }
}

impl Display for MaintenanceStatus {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for MaintenanceStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pendiente" => Ok(Self::Pendiente),
            "en_proceso" => Ok(Self::EnProceso),
            "completado" => Ok(Self::Completado),
            "cancelado" => Ok(Self::Cancelado),
            _ => Err(AppError::Validation(format!(
                "estado de mantenimiento desconocido '{value}'"
            ))),
        }
    }
}

/// Maintenance ticket for a sold product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceTicket {
    /// Stable identifier.
    pub id: i64,
    /// Product under maintenance.
    pub product_id: i64,
    /// Product name.
    pub product_name: String,
    /// Assigned technician.
    pub technician_id: Option<i64>,
    /// Requesting customer.
    pub customer_id: i64,
    /// Sale the product came from.
    pub sale_id: i64,
    /// Request timestamp.
    pub requested_at: DateTime<Utc>,
    /// Completion timestamp.
    pub performed_at: Option<DateTime<Utc>>,
    /// Kind of work.
    pub kind: MaintenanceKind,
    /// Lifecycle state.
    pub status: MaintenanceStatus,
    /// Problem description.
    pub description: String,
    /// Whether a current warranty covers the work.
    pub covered_by_warranty: bool,
    /// Charged cost.
    pub cost: Option<Decimal>,
    /// Technician notes.
    pub technician_notes: Option<String>,
}

impl MaintenanceTicket {
    /// Technicians may only be (re)assigned while the ticket is open.
    pub fn ensure_assignable(&self) -> Result<(), AppError> {
        if self.status.is_open() {
            return Ok(());
        }

        Err(AppError::Conflict(format!(
            "no se puede asignar técnico a un mantenimiento en estado {}",
            self.status
        )))
    }

    /// Applies a status change, stamping the completion time when needed.
    pub fn transition_to(&mut self, status: MaintenanceStatus, now: DateTime<Utc>) {
        self.status = status;
        if status == MaintenanceStatus::Completado && self.performed_at.is_none() {
            self.performed_at = Some(now);
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::{MaintenanceKind, MaintenanceStatus, MaintenanceTicket};

    fn ticket(status: MaintenanceStatus) -> MaintenanceTicket {
        MaintenanceTicket {
            id: 1,
            product_id: 1,
            product_name: "Aire acondicionado".to_owned(),
            technician_id: None,
            customer_id: 3,
            sale_id: 4,
            requested_at: Utc::now(),
            performed_at: None,
            kind: MaintenanceKind::Correctivo,
            status,
            description: "no enfría".to_owned(),
            covered_by_warranty: true,
            cost: None,
            technician_notes: None,
        }
    }

    #[test]
    fn completing_stamps_performed_at_once() {
        let mut ticket = ticket(MaintenanceStatus::EnProceso);
        let now = Utc::now();
        ticket.transition_to(MaintenanceStatus::Completado, now);
        assert_eq!(ticket.performed_at, Some(now));
    }

    #[test]
    fn closed_tickets_reject_assignment() {
        assert!(ticket(MaintenanceStatus::Pendiente).ensure_assignable().is_ok());
        assert!(ticket(MaintenanceStatus::Completado).ensure_assignable().is_err());
    }
}
