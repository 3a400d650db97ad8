//! # Listing Errors as HTTP Responses
//!
//! Parsing a listing request never fails, so the only failures a listing
//! handler sees come from the store. [`ApiError`] wraps them so a handler can
//! use `?` and still answer with a JSON body that never carries store
//! internals:
//!
//! ```rust,ignore
//! async fn list_plants(
//!     State(store): State<SeaOrmStore<plant::Entity>>,
//!     params: RawParameters,
//! ) -> Result<Json<QueryResult<Value>>, ApiError> {
//!     Ok(Json(PLANTS.list(&params, &store).await?))
//! }
//! ```

use std::fmt;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::Serialize;

const DATABASE_MESSAGE: &str = "A database error occurred";

#[derive(Debug)]
pub enum ApiError {
    /// The store reported a missing record (404).
    NotFound { resource: String },
    /// Any other store failure (500). Only logged, never sent.
    Database(DbErr),
}

impl ApiError {
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text sent to the client.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound { resource } => format!("{resource} not found"),
            Self::Database(_) => DATABASE_MESSAGE.to_string(),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::Database(err) => tracing::error!(error = ?err, "Listing query failed"),
            Self::NotFound { resource } => tracing::debug!(%resource, "Record not found"),
        }

        let body = ErrorBody {
            success: false,
            error: self.user_message(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.user_message())
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Database(err) => Some(err),
            Self::NotFound { .. } => None,
        }
    }
}

impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        match err {
            // Sea-ORM phrases these as "<resource> not found ..."
            DbErr::RecordNotFound(msg) => Self::NotFound {
                resource: msg
                    .split_whitespace()
                    .next()
                    .unwrap_or("Record")
                    .to_string(),
            },
            other => Self::Database(other),
        }
    }
}
