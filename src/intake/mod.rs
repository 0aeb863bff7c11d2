//! The file intake service: the HTTP endpoint the upload web page posts to.
//! This file declares the other files in this directory as sub-modules.

pub mod api;
pub mod models;

use axum::http::StatusCode;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IntakeError {
    /// The request carried no usable file part.
    #[error("{0}")]
    InvalidUpload(String),
    #[error("storage error: {0}")]
    Storage(#[from] io::Error),
}

impl IntakeError {
    pub fn status(&self) -> StatusCode {
        match self {
            IntakeError::InvalidUpload(_) => StatusCode::BAD_REQUEST,
            IntakeError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
