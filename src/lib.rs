use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use serde_json::json;
use thiserror::Error;

pub mod area;
pub mod config;
pub mod db;
pub mod endpoints;
pub mod geo;
pub mod nearby;
pub mod pagination;
pub mod ranking;
pub mod types;

#[macro_export]
macro_rules! clone_into_closure {
    ( ($( $x:ident ),*) $y:expr ) => {
        {
            $(let $x = $x.clone();)*
            $y
        }
    };
}

#[derive(Error, Debug)]
pub enum BlogsphereError {
    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("missing query parameter '{0}'")]
    MissingParameter(&'static str),

    #[error("invalid query parameter: {0}")]
    InvalidParameter(String),

    #[error("unknown category '{0}'")]
    UnknownCategory(String),

    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("invalid radius {0}: must be a finite, non-negative number of meters")]
    InvalidRadius(f64),

    #[error("invalid page {0}: pages start at 1")]
    InvalidPage(i64),

    #[error("invalid page size {0}: must be at least 1")]
    InvalidPageSize(i64),

    #[error("page size {0} exceeds the maximum of {1}")]
    PageSizeTooLarge(i64, usize),
}

impl BlogsphereError {
    pub fn to_status_code(&self) -> StatusCode {
        match self {
            BlogsphereError::Database(_) | BlogsphereError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            BlogsphereError::MissingParameter(_)
            | BlogsphereError::InvalidParameter(_)
            | BlogsphereError::UnknownCategory(_)
            | BlogsphereError::InvalidCoordinate(_)
            | BlogsphereError::InvalidRadius(_)
            | BlogsphereError::InvalidPage(_)
            | BlogsphereError::InvalidPageSize(_)
            | BlogsphereError::PageSizeTooLarge(..) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for BlogsphereError {
    fn into_response(self) -> Response {
        let status = self.to_status_code();

        // don't leak driver details to clients
        let message = match &self {
            BlogsphereError::Database(_) | BlogsphereError::Config(_) => "internal server error".to_string(),
            other => other.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub type Result<T, E = BlogsphereError> = std::result::Result<T, E>;
