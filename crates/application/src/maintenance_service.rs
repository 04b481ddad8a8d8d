use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use smartsales_core::{ActorContext, AppError, AppResult, UserRole};
use smartsales_domain::{MaintenanceKind, MaintenanceStatus, MaintenanceTicket};

use crate::{
    AuditRecorder, MaintenanceQuery, MaintenanceRepository, NewMaintenanceTicket, SaleRepository,
    UserRepository,
};


/// Customer request for maintenance on a purchased product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaintenanceRequest {
    /// Product needing work.
    pub product_id: i64,
    /// Sale the product was bought in.
    pub sale_id: i64,
    /// Kind of work.
    pub kind: MaintenanceKind,
    /// Problem description.
    pub description: String,
}

/// Status change reported by an administrator or the assigned technician.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaintenanceProgress {
    /// New status.
    pub status: MaintenanceStatus,
    /// Explicit completion timestamp.
    pub performed_at: Option<DateTime<Utc>>,
    /// Charged cost.
    pub cost: Option<Decimal>,
    /// Technician notes.
    pub technician_notes: Option<String>,
}

/// Application service for maintenance tickets.
#[derive(Clone)]
pub struct MaintenanceService {
    tickets: Arc<dyn MaintenanceRepository>,
    sales: Arc<dyn SaleRepository>,
    users: Arc<dyn UserRepository>,
    audit: AuditRecorder,
}

impl MaintenanceService {
    /// Creates a new maintenance service.
    #[must_use]
    pub fn new(
        tickets: Arc<dyn MaintenanceRepository>,
        sales: Arc<dyn SaleRepository>,
        users: Arc<dyn UserRepository>,
        audit: AuditRecorder,
    ) -> Self {
        Self {
            tickets,
            sales,
            users,
            audit,
        }
    }

    /// Opens a ticket for a product the caller bought.
    pub async fn request(
        &self,
        actor: &ActorContext,
        request: MaintenanceRequest,
    ) -> AppResult<MaintenanceTicket> {
        if request.description.trim().is_empty() {
            return Err(AppError::Validation(
                "la descripción del problema es requerida".to_owned(),
            ));
        }

        let sale = self
            .sales
            .find_sale(request.sale_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("venta {} no encontrada", request.sale_id))
            })?;
        if sale.customer_id != actor.user_id() {
            return Err(AppError::Forbidden(
                "la venta no pertenece al usuario".to_owned(),
            ));
        }
        if !sale
            .lines
            .iter()
            .any(|line| line.product_id == request.product_id)
        {
            return Err(AppError::Validation(
                "el producto no forma parte de la venta".to_owned(),
            ));
        }
        if self
            .tickets
            .has_open_ticket(request.product_id, request.sale_id)
            .await?
        {
            return Err(AppError::Conflict(
                "ya existe un mantenimiento pendiente o en proceso para este producto".to_owned(),
            ));
        }

        let today = Utc::now().date_naive();
        let covered_by_warranty = self
            .sales
            .list_warranties(request.sale_id)
            .await?
            .iter()
            .any(|warranty| warranty.product_id == request.product_id && warranty.covers(today));

        let input = NewMaintenanceTicket {
            product_id: request.product_id,
            customer_id: actor.user_id(),
            sale_id: request.sale_id,
            kind: request.kind,
            description: request.description.trim().to_owned(),
            covered_by_warranty,
        };

        self.audit
            .audited(
                actor,
                "Solicitar mantenimiento",
                self.tickets.create_ticket(input),
                |ticket: &MaintenanceTicket| {
                    format!(
                        "Solicitó mantenimiento #{} para producto: {}",
                        ticket.id, ticket.product_name
                    )
                },
            )
            .await
    }

    /// Lists tickets: staff see all, customers their own.
    pub async fn list(&self, actor: &ActorContext) -> AppResult<Vec<MaintenanceTicket>> {
        let query = match actor.role() {
            UserRole::Administrador | UserRole::Tecnico => MaintenanceQuery::default(),
            UserRole::Cliente => MaintenanceQuery {
                customer_id: Some(actor.user_id()),
                technician_id: None,
            },
        };
        self.tickets.list_tickets(query).await
    }

    /// Returns one ticket visible to the caller.
    pub async fn get(&self, actor: &ActorContext, ticket_id: i64) -> AppResult<MaintenanceTicket> {
        let ticket = self.find(ticket_id).await?;
        if actor.role() == UserRole::Cliente && ticket.customer_id != actor.user_id() {
            return Err(AppError::Forbidden(
                "el mantenimiento no pertenece al usuario".to_owned(),
            ));
        }
        Ok(ticket)
    }

    /// Tickets requested by the caller.
    pub async fn my_tickets(&self, actor: &ActorContext) -> AppResult<Vec<MaintenanceTicket>> {
        self.tickets
            .list_tickets(MaintenanceQuery {
                customer_id: Some(actor.user_id()),
                technician_id: None,
            })
            .await
    }

    /// Tickets assigned to the calling technician.
    pub async fn my_assignments(&self, actor: &ActorContext) -> AppResult<Vec<MaintenanceTicket>> {
        if actor.role() != UserRole::Tecnico {
            return Err(AppError::Forbidden(
                "solo los técnicos tienen asignaciones".to_owned(),
            ));
        }
        self.tickets
            .list_tickets(MaintenanceQuery {
                customer_id: None,
                technician_id: Some(actor.user_id()),
            })
            .await
    }

    /// Assigns an open ticket to a technician.
    pub async fn assign_technician(
        &self,
        actor: &ActorContext,
        ticket_id: i64,
        technician_id: i64,
    ) -> AppResult<MaintenanceTicket> {
        actor.require_admin()?;
        let mut ticket = self.find(ticket_id).await?;
        ticket.ensure_assignable()?;

        let technician = self
            .users
            .find_by_id(technician_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("usuario {technician_id} no encontrado")))?;
        if technician.role != UserRole::Tecnico {
            return Err(AppError::Validation(format!(
                "el usuario {} no es técnico",
                technician.username
            )));
        }

        ticket.technician_id = Some(technician.id);
        self.audit
            .audited(
                actor,
                &format!("Asignar técnico al mantenimiento #{ticket_id}"),
                self.tickets.save_ticket(&ticket),
                |ticket: &MaintenanceTicket| {
                    format!(
                        "Asignó técnico {} al mantenimiento #{}",
                        technician.username, ticket.id
                    )
                },
            )
            .await
    }

    /// Records progress; allowed for administrators and the assigned technician.
    pub async fn update_status(
        &self,
        actor: &ActorContext,
        ticket_id: i64,
        progress: MaintenanceProgress,
    ) -> AppResult<MaintenanceTicket> {
        let mut ticket = self.find(ticket_id).await?;
        let assigned = ticket.technician_id == Some(actor.user_id());
        if !actor.is_admin() && !assigned {
            return Err(AppError::Forbidden(
                "solo el técnico asignado o un administrador puede actualizar el estado".to_owned(),
            ));
        }
        if progress.cost.is_some_and(|cost| cost < Decimal::ZERO) {
            return Err(AppError::Validation(
                "el costo no puede ser negativo".to_owned(),
            ));
        }

        if let Some(performed_at) = progress.performed_at {
            ticket.performed_at = Some(performed_at);
        }
        ticket.transition_to(progress.status, Utc::now());
        if progress.cost.is_some() {
            ticket.cost = progress.cost;
        }
        if let Some(notes) = progress.technician_notes {
            ticket.technician_notes = Some(notes);
        }

        self.audit
            .audited(
                actor,
                &format!("Actualizar mantenimiento #{ticket_id}"),
                self.tickets.save_ticket(&ticket),
                |ticket: &MaintenanceTicket| {
                    format!(
                        "Actualizó mantenimiento #{} a estado {}",
                        ticket.id, ticket.status
                    )
                },
            )
            .await
    }

    /// Deletes a ticket.
    pub async fn delete(&self, actor: &ActorContext, ticket_id: i64) -> AppResult<()> {
        actor.require_admin()?;
        let ticket = self.find(ticket_id).await?;

        self.audit
            .audited(
                actor,
                &format!("Eliminar mantenimiento #{ticket_id}"),
                self.tickets.delete_ticket(ticket_id),
                |_| {
                    format!(
                        "Eliminó mantenimiento #{} de producto: {}",
                        ticket.id, ticket.product_name
                    )
                },
            )
            .await
    }

    async fn find(&self, ticket_id: i64) -> AppResult<MaintenanceTicket> {
        self.tickets
            .find_ticket(ticket_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("mantenimiento {ticket_id} no encontrado")))
    }
}
