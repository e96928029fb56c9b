//! JSON error responses for the control API.

use crate::library::LibraryError;
use crate::metadata::ScrapeError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// A failed API request, rendered as `{"success": false, "msg": ...}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0} is not given!")]
    MissingParam(&'static str),

    #[error("{name} is invalid: {value}")]
    InvalidParam { name: &'static str, value: String },

    #[error(transparent)]
    Library(#[from] LibraryError),
}

impl ApiError {
    pub fn invalid(name: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidParam {
            name,
            value: value.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingParam(_) | Self::InvalidParam { .. } => StatusCode::BAD_REQUEST,
            Self::Library(e) => match e {
                LibraryError::AlreadyRunning(_) => StatusCode::CONFLICT,
                LibraryError::StillRunning(_) => StatusCode::SERVICE_UNAVAILABLE,
                LibraryError::NotYetScanned(_) => StatusCode::CONFLICT,
                LibraryError::IdOutOfRange { .. } => StatusCode::NOT_FOUND,
                LibraryError::MissingSeasonId => StatusCode::BAD_REQUEST,
                LibraryError::Scan(_) => StatusCode::INTERNAL_SERVER_ERROR,
                LibraryError::Scrape(e) => scrape_status(e),
            },
        }
    }

    /// Failed pipeline stage, for scrape errors.
    fn stage(&self) -> Option<&'static str> {
        match self {
            Self::Library(LibraryError::Scrape(e)) => Some(e.stage()),
            _ => None,
        }
    }
}

fn scrape_status(e: &ScrapeError) -> StatusCode {
    match e {
        ScrapeError::MovieDetail(_)
        | ScrapeError::TvDetail(_)
        | ScrapeError::SeasonDetail(_)
        | ScrapeError::Credits(_)
        | ScrapeError::Images(_) => StatusCode::BAD_GATEWAY,
        ScrapeError::SeasonNotFound(_) => StatusCode::NOT_FOUND,
        ScrapeError::ShowEnded | ScrapeError::ProviderBehind { .. } => StatusCode::CONFLICT,
        ScrapeError::MissingProviderId => StatusCode::UNPROCESSABLE_ENTITY,
        ScrapeError::WriteNfo(_)
        | ScrapeError::WriteEpisodeNfo(_)
        | ScrapeError::DownloadImage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::warn!(error = %self, "API request failed");
        } else {
            tracing::debug!(error = %self, "API request rejected");
        }

        let mut body = json!({
            "success": false,
            "msg": self.to_string(),
        });
        if let Some(stage) = self.stage() {
            body["stage"] = json!(stage);
        }
        if let Self::Library(e) = &self {
            body["retryable"] = json!(e.is_retryable());
        }

        (status, Json(body)).into_response()
    }
}
