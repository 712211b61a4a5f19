use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use snafu::{Location, Snafu};

use crate::model::{InvalidInterval, ParseVideoId};
use crate::service::progress_manager::ProgressError;
use crate::Located;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ApiError {
    #[snafu(display("{message}"))]
    Validation {
        message: String,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("{source}"))]
    InvalidVideoId {
        source: ParseVideoId,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("{source}"))]
    InvalidReportedInterval {
        source: InvalidInterval,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("request is not authenticated"))]
    Unauthenticated {
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("{source}"))]
    Progress {
        source: ProgressError,
        #[snafu(implicit)]
        location: Location,
    },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. }
            | ApiError::InvalidVideoId { .. }
            | ApiError::InvalidReportedInterval { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Progress { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ApiError::Validation { .. }
            | ApiError::InvalidVideoId { .. }
            | ApiError::InvalidReportedInterval { .. } => "validation",
            ApiError::Unauthenticated { .. } => "unauthenticated",
            ApiError::Progress { .. } => "storage",
        }
    }
}

impl Located for ApiError {
    fn location(&self) -> Location {
        match self {
            ApiError::Validation { location, .. }
            | ApiError::InvalidVideoId { location, .. }
            | ApiError::InvalidReportedInterval { location, .. }
            | ApiError::Unauthenticated { location, .. } => *location,
            ApiError::Progress { source, .. } => source.location(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(location = %self.location(), error = ?self, "request failed: {}", self);
        } else {
            tracing::debug!(location = %self.location(), "rejected request: {}", self);
        }

        let body = ErrorBody {
            error: self.kind(),
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
