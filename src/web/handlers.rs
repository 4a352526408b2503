use actix_web::http::header::{self, ContentType};
use actix_web::{web, HttpResponse};
use serde::Deserialize;

use super::pages;
use crate::domain::order::{Notification, OrderWorkflow, SubmitOrder, WorkflowError};
use crate::models::{InvalidOrderId, OrderId};

/// Header reporting whether the bus accepted the order notification.
pub const NOTIFICATION_HEADER: &str = "x-order-notification";

/// Form body of `POST /`. Missing fields are left to the workflow's presence check.
#[derive(Debug, Deserialize)]
pub struct OrderForm {
    pub customer: Option<String>,
    pub amount: Option<String>,
}

impl From<OrderForm> for SubmitOrder {
    fn from(form: OrderForm) -> Self {
        SubmitOrder {
            customer: form.customer,
            amount: form.amount,
        }
    }
}

pub async fn order_form() -> HttpResponse {
    let (customer, amount) = pages::sample_customer_and_amount();

    HttpResponse::Ok()
        .insert_header(ContentType::html())
        .body(pages::order_form(&customer, &amount))
}

pub async fn submit_order(
    workflow: web::Data<OrderWorkflow>,
    form: web::Form<OrderForm>,
) -> Result<HttpResponse, WorkflowError> {
    let receipt = workflow.submit(form.into_inner().into()).await?;

    let notification = match receipt.notification {
        Notification::Published(_) => "published",
        Notification::Failed(_) => "failed",
    };

    Ok(HttpResponse::SeeOther()
        .insert_header((header::LOCATION, format!("/request/{}", receipt.id)))
        .insert_header((NOTIFICATION_HEADER, notification))
        .finish())
}

pub async fn view_order(
    workflow: web::Data<OrderWorkflow>,
    path: web::Path<String>,
) -> Result<HttpResponse, actix_web::Error> {
    // Malformed ids never reach the store.
    let id: OrderId = path
        .into_inner()
        .parse()
        .map_err(|e: InvalidOrderId| {
            tracing::debug!(error = %e, "Rejected malformed order id");
            e
        })?;

    let order = workflow.fetch(&id).await?;

    Ok(HttpResponse::Ok()
        .insert_header(ContentType::html())
        .body(pages::order_view(&order)))
}
