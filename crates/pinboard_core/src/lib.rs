//! Core logic for the pinboard service.
//! This crate owns the pin/comment/like invariants and the request handler.

pub mod config;
pub mod db;
pub mod handler;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, ServiceConfig};
pub use db::{ConnectionSource, DbError, SqliteSource};
pub use handler::{HandlerError, Operation, PinHandler, Request, Response, Status};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::pin::{
    ClientId, Comment, LikeState, NewComment, NewPin, Pin, PinDetail, PinId, PinValidationError,
    SortOrder,
};
pub use repo::pin_repo::{PinListQuery, PinRepository, RepoError, RepoResult, SqlitePinRepository};
pub use service::pin_service::{PinService, ServiceError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
