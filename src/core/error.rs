//! Errors shared by the ingestion, calendar and batch services.

use std::path::PathBuf;
use thiserror::Error;

use crate::infra::db::DbError;
use crate::infra::snooker_api::ApiError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
