use actix_web::http::{header::ContentType, StatusCode};
use actix_web::{HttpResponse, ResponseError};

use super::pages::error_page;
use crate::domain::order::WorkflowError;
use crate::models::InvalidOrderId;
use crate::storage::StoreError;

impl ResponseError for WorkflowError {
    fn status_code(&self) -> StatusCode {
        match self {
            WorkflowError::Validation(_) => StatusCode::BAD_REQUEST,
            WorkflowError::NotFound(_) => StatusCode::NOT_FOUND,
            WorkflowError::Store(e) if e.is_transient() => StatusCode::SERVICE_UNAVAILABLE,
            WorkflowError::Store(StoreError::InvalidKey(_)) => StatusCode::BAD_REQUEST,
            WorkflowError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            WorkflowError::NotNotified { .. } => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let title = status.canonical_reason().unwrap_or("Error");

        // Internal store details stay in the logs.
        let message = match self {
            WorkflowError::Store(_) if status.is_server_error() => {
                "The order store could not complete the request.".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(status)
            .insert_header(ContentType::html())
            .body(error_page(title, &message))
    }
}

impl ResponseError for InvalidOrderId {
    fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::BadRequest()
            .insert_header(ContentType::html())
            .body(error_page("Bad Request", &self.to_string()))
    }
}
