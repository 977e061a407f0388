use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use log::error;
use sockify_engine::{CheckoutError, OrderApiError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("{0}")]
    InvalidRequestBody(String),
    #[error("Could not read request path: {0}")]
    InvalidRequestPath(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("Authentication Error. {0}")]
    AuthenticationError(#[from] AuthError),
    #[error("{0}")]
    NoRecordFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    PaymentGatewayError(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InvalidRequestPath(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticationError(_) => StatusCode::UNAUTHORIZED,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::PaymentGatewayError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "message": self.to_string() }).to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("No access token was provided.")]
    MissingToken,
    #[error("The access token is invalid. {0}")]
    ValidationError(String),
    #[error("The access token has expired.")]
    ExpiredToken,
    #[error("The access token does not identify an admin. {0}")]
    InvalidClaims(String),
}

impl From<CheckoutError> for ServerError {
    fn from(e: CheckoutError) -> Self {
        match e {
            CheckoutError::InvalidRequest(_)
            | CheckoutError::EmptyCart
            | CheckoutError::InvalidQuantity { .. }
            | CheckoutError::VariantNotFound(_)
            | CheckoutError::InsufficientStock { .. }
            | CheckoutError::MissingSessionId
            | CheckoutError::InvalidSessionMetadata(_)
            | CheckoutError::PaymentPending
            | CheckoutError::PaymentIncomplete
            | CheckoutError::UnexpectedSessionStatus(_)
            | CheckoutError::InvalidStatusTransition(_) => Self::InvalidRequestBody(e.to_string()),
            CheckoutError::OrderNotFound(_) => Self::NoRecordFound(e.to_string()),
            CheckoutError::PaymentAlreadyConfirmed(_) | CheckoutError::ConcurrentModification { .. } => {
                Self::Conflict(e.to_string())
            },
            CheckoutError::PaymentGatewayError(_) => {
                error!("💳️ {e}");
                Self::PaymentGatewayError(e.to_string())
            },
            CheckoutError::DatabaseError(_) => Self::BackendError(e.to_string()),
        }
    }
}

impl From<OrderApiError> for ServerError {
    fn from(e: OrderApiError) -> Self {
        match e {
            OrderApiError::InvalidRequest(_) | OrderApiError::InvalidStatusTransition(_) => {
                Self::InvalidRequestBody(e.to_string())
            },
            OrderApiError::OrderNotFound(_) | OrderApiError::InvoiceNotFound(_) => Self::NoRecordFound(e.to_string()),
            OrderApiError::ConcurrentModification { .. } => Self::Conflict(e.to_string()),
            OrderApiError::DatabaseError(_) => Self::BackendError(e.to_string()),
        }
    }
}
