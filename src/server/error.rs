use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::api::MessageBody;
use crate::inventory::InventoryError;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Invalid(#[from] InventoryError),
    #[error("{0}")]
    Unauthorized(&'static str),
    #[error("vehicle {0} not found")]
    VehicleNotFound(String),
    #[error("image not found")]
    ImageNotFound,
    #[error("token signing failed")]
    Signing,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<MultipartError> for ServerError {
    fn from(err: MultipartError) -> Self {
        Self::BadRequest(format!("malformed upload: {}", err.body_text()))
    }
}

impl ServerError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::Invalid(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::VehicleNotFound(_) | Self::ImageNotFound => StatusCode::NOT_FOUND,
            Self::Signing | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(MessageBody { message: self.to_string() })).into_response()
    }
}
