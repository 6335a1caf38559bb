use std::io::Cursor;

use rocket::{
    http::{ContentType, Status},
    response::Responder,
    Request, Response,
};
use serde::{Deserialize, Serialize};
use sled::transaction::{ConflictableTransactionError, TransactionError};
use thiserror::Error;
use utoipa::ToSchema;

use crate::{config::AppConfig, headers::HeaderUtil, indexer::IndexerSignal, peer::PeerId};

#[derive(Clone, Debug, Error)]
pub enum PeducError {
    #[error("Config error {0}")]
    ConfigError(#[from] figment::Error),

    #[error("Invalid base path {0:?}, must start with '/' and not end with '/'")]
    InvalidBasePath(String),

    #[error("Rocket exploded {0}")]
    RocketError(String),

    #[error("Utf8 encoding error: {0}")]
    Utf8Error(#[from] std::string::FromUtf8Error),

    #[error("Sled error {0}")]
    SledError(#[from] sled::Error),

    #[error("Signaling error {0}")]
    SignalError(#[from] flume::SendError<IndexerSignal>),

    #[error("{message}")]
    BadRequest {
        entity: &'static str,
        reason: &'static str,
        message: String,
    },

    #[error("Validation failed: {}", summarize(.0))]
    Validation(Vec<FieldError>),

    #[error("Peer {0} not found")]
    PeerNotFound(PeerId),

    #[error("Corrupt record key {0:?}")]
    CorruptKey(Vec<u8>),

    #[error("bincode failed {0}")]
    BincodeError(String),

    #[error("cbor serde {0}")]
    CborError(String),

    #[error("Oopsie {0}")]
    Oops(String),
}

impl PeducError {
    pub fn bad_request(message: &str, entity: &'static str, reason: &'static str) -> Self {
        Self::BadRequest {
            entity,
            reason,
            message: message.to_string(),
        }
    }
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<Box<bincode::ErrorKind>> for PeducError {
    fn from(value: Box<bincode::ErrorKind>) -> Self {
        Self::BincodeError(value.to_string())
    }
}

impl From<rocket::Error> for PeducError {
    fn from(value: rocket::Error) -> Self {
        Self::RocketError(value.to_string())
    }
}

impl From<TransactionError<PeducError>> for PeducError {
    fn from(value: TransactionError<PeducError>) -> Self {
        match value {
            TransactionError::Abort(e) => e,
            TransactionError::Storage(e) => PeducError::SledError(e),
        }
    }
}

impl From<PeducError> for ConflictableTransactionError<PeducError> {
    fn from(value: PeducError) -> Self {
        ConflictableTransactionError::Abort(value)
    }
}

/// A single rejected field of a request payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

/// Problem document returned for every failed request.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub title: String,
    pub status: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_key: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub field_errors: Vec<FieldError>,
}

/// Error side of every route. Renders as `application/problem+json` and, when the
/// failure concerns an entity, carries the failure alert headers.
#[derive(Clone, Debug)]
pub struct PeducServeError {
    pub status: Status,
    pub body: ErrorBody,
}

impl PeducServeError {
    pub fn new(status: Status, message: String) -> Self {
        Self {
            status,
            body: ErrorBody {
                title: status.reason_lossy().to_string(),
                status: status.code,
                message,
                entity_name: None,
                error_key: None,
                field_errors: vec![],
            },
        }
    }
}

impl From<PeducError> for PeducServeError {
    fn from(value: PeducError) -> Self {
        match value {
            PeducError::BadRequest {
                entity,
                reason,
                message,
            } => {
                let mut err = Self::new(Status::BadRequest, message);
                err.body.entity_name = Some(entity.to_string());
                err.body.error_key = Some(reason.to_string());
                err
            }
            PeducError::Validation(field_errors) => {
                let mut err = Self::new(Status::BadRequest, "error.validation".to_string());
                err.body.error_key = Some("validation".to_string());
                err.body.field_errors = field_errors;
                err
            }
            PeducError::PeerNotFound(id) => {
                let mut err = Self::new(Status::NotFound, format!("Peer {id} not found"));
                err.body.entity_name = Some(crate::gateway::ENTITY_NAME.to_string());
                err.body.error_key = Some("idnotfound".to_string());
                err
            }
            other => {
                log::error!(err = other.to_string(); "request failed");
                Self::new(Status::InternalServerError, other.to_string())
            }
        }
    }
}

impl<'r> Responder<'r, 'static> for PeducServeError {
    fn respond_to(self, req: &'r Request<'_>) -> rocket::response::Result<'static> {
        let json = match serde_json::to_vec(&self.body) {
            Ok(json) => json,
            Err(e) => {
                log::error!(err = e.to_string(); "failed to serialize error body");
                return Err(Status::InternalServerError);
            }
        };

        let mut response = Response::build();
        response
            .status(self.status)
            .header(ContentType::new("application", "problem+json"));

        if let (Some(entity), Some(key)) = (&self.body.entity_name, &self.body.error_key) {
            let alerts = match req.rocket().state::<AppConfig>() {
                Some(config) => HeaderUtil::new(&config.peduc.application_name),
                None => HeaderUtil::default(),
            };
            for header in alerts.failure_alert(entity, key) {
                response.header(header);
            }
        }

        response.sized_body(json.len(), Cursor::new(json)).ok()
    }
}

