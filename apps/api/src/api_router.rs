use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware::from_fn_with_state;
use axum::routing::{delete, get, patch, post};
use smartsales_core::AppError;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{handlers, middleware};

mod cors;

const AUDIO_UPLOAD_LIMIT_BYTES: usize = 25 * 1024 * 1024;

pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route(
            "/api/marcas/",
            get(handlers::catalog::list_brands_handler),
        )
        .route(
            "/api/marcas/{brand_id}/",
            get(handlers::catalog::get_brand_handler),
        )
        .route(
            "/api/categorias/",
            get(handlers::catalog::list_categories_handler),
        )
        .route(
            "/api/categorias/{category_id}/",
            get(handlers::catalog::get_category_handler),
        )
        .route(
            "/api/productos/",
            get(handlers::catalog::list_products_handler),
        )
        .route(
            "/api/productos/{product_id}/",
            get(handlers::catalog::get_product_handler),
        )
        .route(
            "/api/descuentos/",
            get(handlers::discounts::list_discounts_handler),
        )
        .route(
            "/api/descuentos/vigentes/",
            get(handlers::discounts::current_discounts_handler),
        )
        .route(
            "/api/descuentos/por-producto/{product_id}/",
            get(handlers::discounts::product_price_quote_handler),
        )
        .route(
            "/api/descuentos/{discount_id}/",
            get(handlers::discounts::get_discount_handler),
        );

    let protected_routes = Router::new()
        .route(
            "/api/usuarios/",
            get(handlers::users::list_users_handler).post(handlers::users::create_user_handler),
        )
        .route("/api/usuarios/me/", get(handlers::users::me_handler))
        .route(
            "/api/usuarios/{user_id}/",
            delete(handlers::users::delete_user_handler),
        )
        .route(
            "/api/usuarios/{user_id}/rol/",
            patch(handlers::users::change_role_handler),
        )
        .route(
            "/api/clientes/",
            get(handlers::users::list_customers_handler),
        )
        .route("/api/roles/", get(handlers::users::list_roles_handler))
        .route(
            "/api/marcas/",
            post(handlers::catalog::create_brand_handler),
        )
        .route(
            "/api/marcas/{brand_id}/",
            patch(handlers::catalog::update_brand_handler)
                .put(handlers::catalog::update_brand_handler)
                .delete(handlers::catalog::delete_brand_handler),
        )
        .route(
            "/api/categorias/",
            post(handlers::catalog::create_category_handler),
        )
        .route(
            "/api/categorias/{category_id}/",
            patch(handlers::catalog::update_category_handler)
                .put(handlers::catalog::update_category_handler)
                .delete(handlers::catalog::delete_category_handler),
        )
        .route(
            "/api/productos/",
            post(handlers::catalog::create_product_handler),
        )
        .route(
            "/api/productos/{product_id}/",
            patch(handlers::catalog::update_product_handler)
                .put(handlers::catalog::update_product_handler)
                .delete(handlers::catalog::delete_product_handler),
        )
        .route(
            "/api/productos/{product_id}/descuento/",
            patch(handlers::catalog::set_product_discount_handler),
        )
        .route(
            "/api/carrito/",
            get(handlers::carts::active_cart_handler).post(handlers::carts::add_to_cart_handler),
        )
        .route(
            "/api/carrito/vaciar/",
            delete(handlers::carts::clear_cart_handler),
        )
        .route(
            "/api/stripe/crear-pago/",
            post(handlers::sales::create_payment_intent_handler),
        )
        .route(
            "/api/ventas/registrar/",
            post(handlers::sales::register_sale_handler),
        )
        .route("/api/ventas/", get(handlers::sales::list_sales_handler))
        .route(
            "/api/ventas/{sale_id}/",
            get(handlers::sales::get_sale_handler),
        )
        .route(
            "/api/ventas/{sale_id}/editar/",
            patch(handlers::sales::update_sale_status_handler),
        )
        .route(
            "/api/ventas/{sale_id}/garantias/",
            get(handlers::sales::sale_warranties_handler),
        )
        .route(
            "/api/historial-ventas/",
            get(handlers::sales::sale_history_handler),
        )
        .route(
            "/api/historial-ventas/mis-compras/",
            get(handlers::sales::my_purchases_handler),
        )
        .route(
            "/api/historial-ventas/estadisticas/",
            get(handlers::sales::sales_statistics_handler),
        )
        .route(
            "/api/historial-ventas/por-periodo/",
            get(handlers::sales::sales_by_period_handler),
        )
        .route(
            "/api/historial-ventas/{sale_id}/cancelar/",
            post(handlers::sales::cancel_sale_handler),
        )
        .route(
            "/api/descuentos/",
            post(handlers::discounts::create_discount_handler),
        )
        .route(
            "/api/descuentos/{discount_id}/",
            patch(handlers::discounts::update_discount_handler)
                .put(handlers::discounts::update_discount_handler)
                .delete(handlers::discounts::delete_discount_handler),
        )
        .route(
            "/api/descuentos/{discount_id}/activar/",
            post(handlers::discounts::activate_discount_handler),
        )
        .route(
            "/api/descuentos/{discount_id}/desactivar/",
            post(handlers::discounts::deactivate_discount_handler),
        )
        .route(
            "/api/mantenimientos/",
            get(handlers::maintenance::list_maintenance_handler)
                .post(handlers::maintenance::request_maintenance_handler),
        )
        .route(
            "/api/mantenimientos/mis-mantenimientos/",
            get(handlers::maintenance::my_maintenance_handler),
        )
        .route(
            "/api/mantenimientos/mis-asignaciones/",
            get(handlers::maintenance::my_assignments_handler),
        )
        .route(
            "/api/mantenimientos/{ticket_id}/",
            get(handlers::maintenance::get_maintenance_handler)
                .delete(handlers::maintenance::delete_maintenance_handler),
        )
        .route(
            "/api/mantenimientos/{ticket_id}/asignar-tecnico/",
            patch(handlers::maintenance::assign_technician_handler),
        )
        .route(
            "/api/mantenimientos/{ticket_id}/actualizar-estado/",
            patch(handlers::maintenance::update_maintenance_status_handler),
        )
        .route(
            "/api/reportes/",
            get(handlers::reports::list_reports_handler),
        )
        .route(
            "/api/reportes/generar/",
            post(handlers::reports::generate_structured_handler),
        )
        .route(
            "/api/reportes/generar-dinamico/",
            post(handlers::reports::generate_dynamic_handler),
        )
        .route(
            "/api/reportes/generar-por-voz/",
            post(handlers::reports::generate_from_voice_text_handler),
        )
        .route(
            "/api/reportes/generar-desde-audio/",
            post(handlers::reports::generate_from_audio_handler)
                .layer(DefaultBodyLimit::max(AUDIO_UPLOAD_LIMIT_BYTES)),
        )
        .route(
            "/api/reportes/interpretar-prompt/",
            post(handlers::reports::preview_prompt_handler),
        )
        .route(
            "/api/reportes/historial/",
            get(handlers::reports::report_history_handler),
        )
        .route(
            "/api/reportes/{report_id}/",
            get(handlers::reports::get_report_handler)
                .delete(handlers::reports::delete_report_handler),
        )
        .route(
            "/api/reportes/{report_id}/descargar/",
            get(handlers::reports::download_report_handler),
        )
        .route(
            "/api/bitacora/",
            get(handlers::audit::list_audit_entries_handler),
        )
        .route(
            "/api/ventas-historicas/",
            get(handlers::forecast::historic_sales_handler),
        )
        .route(
            "/api/predicciones-ventas/",
            get(handlers::forecast::predict_sales_handler),
        )
        .route(
            "/api/ventas-historico-predicciones/",
            get(handlers::forecast::forecast_overview_handler),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_auth,
        ));

    Ok(Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors::build_cors_layer(frontend_url)?)
        .with_state(app_state))
}
