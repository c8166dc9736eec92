//! Stateless request handler for the pin resource.
//!
//! # Responsibility
//! - Select the operation from a request envelope.
//! - Acquire one store connection per invocation and run the operation.
//! - Map every outcome, success or failure, to a response envelope.
//!
//! # Invariants
//! - The connection is scoped to [`PinHandler::handle`]'s execution and is
//!   dropped (closed, with any open transaction rolled back) on every path.
//! - Pre-flight probes and rejected verbs never touch the store.
//! - Store error details are logged, never echoed to the caller.

mod cors;
mod envelope;
mod operation;

pub use cors::{ALLOW_HEADERS, ALLOW_METHODS, ALLOW_ORIGIN, MAX_AGE_SECS};
pub use envelope::{Request, Response, Status};
pub use operation::Operation;

use crate::db::{ConnectionSource, DbError};
use crate::model::pin::{ClientId, PinId, PinValidationError};
use crate::repo::pin_repo::{RepoError, SqlitePinRepository};
use crate::service::pin_service::{PinService, ServiceError};
use log::{error, info, warn};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;
use uuid::Uuid;

/// Failure of one invocation, classified for the response.
#[derive(Debug)]
pub enum HandlerError {
    Validation(PinValidationError),
    MalformedBody(String),
    NotFound(PinId),
    MethodNotAllowed(String),
    /// The store connection could not be opened or bootstrapped.
    Connection(DbError),
    Store(RepoError),
    Encode(serde_json::Error),
}

impl HandlerError {
    pub fn status(&self) -> Status {
        match self {
            Self::Validation(_) | Self::MalformedBody(_) => Status::BadRequest,
            Self::NotFound(_) => Status::NotFound,
            Self::MethodNotAllowed(_) => Status::MethodNotAllowed,
            Self::Store(RepoError::Conflict(_)) => Status::ServiceUnavailable,
            Self::Connection(_) | Self::Store(_) | Self::Encode(_) => Status::InternalError,
        }
    }

    /// Message placed in the `{"error": ...}` body.
    pub fn public_message(&self) -> String {
        match self {
            Self::Validation(err) => err.to_string(),
            Self::MalformedBody(_) => "Request body must be a JSON object".to_string(),
            Self::NotFound(_) => "Pin not found".to_string(),
            Self::MethodNotAllowed(_) => "Method not allowed".to_string(),
            Self::Store(RepoError::Conflict(_)) => {
                "Conflicting concurrent update, please retry".to_string()
            }
            Self::Connection(_) | Self::Store(_) | Self::Encode(_) => {
                "Internal server error".to_string()
            }
        }
    }
}

impl Display for HandlerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::MalformedBody(message) => write!(f, "malformed request body: {message}"),
            Self::NotFound(id) => write!(f, "pin not found: {id}"),
            Self::MethodNotAllowed(method) => write!(f, "method not allowed: {method}"),
            Self::Connection(err) => write!(f, "store connection failed: {err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "response encoding failed: {err}"),
        }
    }
}

impl Error for HandlerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Connection(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::MalformedBody(_) | Self::NotFound(_) | Self::MethodNotAllowed(_) => None,
        }
    }
}

impl From<PinValidationError> for HandlerError {
    fn from(value: PinValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<ServiceError> for HandlerError {
    fn from(value: ServiceError) -> Self {
        match value {
            ServiceError::Validation(err) => Self::Validation(err),
            ServiceError::NotFound(id) => Self::NotFound(id),
            ServiceError::Store(err) => Self::Store(err),
        }
    }
}

/// Request handler bound to a connection source.
///
/// Holds no state besides the source; concurrent calls are independent.
pub struct PinHandler<S: ConnectionSource> {
    source: S,
}

impl<S: ConnectionSource> PinHandler<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Handles one request. Never panics on bad input and never fails:
    /// every error becomes an error response.
    pub fn handle(&self, request: &Request) -> Response {
        let started_at = Instant::now();
        let request_id = request
            .request_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let operation = match Operation::from_request(request) {
            Ok(operation) => operation,
            Err(err) => return finish_error(&request_id, "dispatch", started_at, &err),
        };
        let op_name = operation.name();

        if operation == Operation::Probe {
            info!(
                "event=request module=handler status=ok request_id={} op=probe status_code=200 duration_ms={}",
                request_id,
                started_at.elapsed().as_millis()
            );
            return Response::preflight();
        }

        match self.execute(operation, &request.client_id()) {
            Ok((status, body)) => {
                info!(
                    "event=request module=handler status=ok request_id={} op={} status_code={} duration_ms={}",
                    request_id,
                    op_name,
                    status.code(),
                    started_at.elapsed().as_millis()
                );
                Response::json(status, body)
            }
            Err(err) => finish_error(&request_id, op_name, started_at, &err),
        }
    }

    /// Runs one operation against a freshly acquired connection.
    ///
    /// The connection lives on this stack frame only.
    pub fn execute(
        &self,
        operation: Operation,
        client: &ClientId,
    ) -> Result<(Status, String), HandlerError> {
        let mut conn = self.source.acquire().map_err(HandlerError::Connection)?;
        let mut service = PinService::new(SqlitePinRepository::new(&mut conn));

        match operation {
            Operation::Probe => Ok((Status::Ok, String::new())),
            Operation::List { search, sort } => {
                encode(Status::Ok, &service.list_pins(search, sort)?)
            }
            Operation::Get { id } => encode(Status::Ok, &service.get_pin(id)?),
            Operation::Create {
                title,
                description,
                content,
            } => encode(
                Status::Created,
                &service.create_pin(
                    title.as_deref(),
                    description.as_deref(),
                    content.as_deref(),
                )?,
            ),
            Operation::Like { pin_id } => encode(Status::Ok, &service.toggle_like(pin_id, client)?),
            Operation::Comment {
                pin_id,
                username,
                content,
            } => encode(
                Status::Created,
                &service.add_comment(pin_id, username.as_deref(), content.as_deref())?,
            ),
        }
    }
}

fn encode(status: Status, value: &impl Serialize) -> Result<(Status, String), HandlerError> {
    let body = serde_json::to_string(value).map_err(HandlerError::Encode)?;
    Ok((status, body))
}

fn finish_error(request_id: &str, op: &str, started_at: Instant, err: &HandlerError) -> Response {
    let status = err.status();
    if status.code() >= 500 {
        error!(
            "event=request module=handler status=error request_id={} op={} status_code={} duration_ms={} error={}",
            request_id,
            op,
            status.code(),
            started_at.elapsed().as_millis(),
            err
        );
    } else {
        warn!(
            "event=request module=handler status=rejected request_id={} op={} status_code={} duration_ms={} error={}",
            request_id,
            op,
            status.code(),
            started_at.elapsed().as_millis(),
            err
        );
    }
    Response::error(status, &err.public_message())
}
