// ============================================================================
// Web Layer - actix-web routes
// ============================================================================
//
//   GET  /               order form prefilled with a random sample
//   POST /               submit, 303 redirect to /request/{id}
//   GET  /request/{id}   view a stored order
//   GET  /health         liveness
//   GET  /metrics        Prometheus exposition
//
// Expects `web::Data<OrderWorkflow>` and `web::Data<Metrics>` as app data.
//
// ============================================================================

mod errors;
mod handlers;
pub mod pages;

use actix_web::web;

pub use handlers::{OrderForm, NOTIFICATION_HEADER};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(handlers::order_form))
        .route("/", web::post().to(handlers::submit_order))
        .route("/request/{id}", web::get().to(handlers::view_order))
        .configure(crate::metrics::configure);
}
