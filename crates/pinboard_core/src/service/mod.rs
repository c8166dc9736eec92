//! Core use-case services.
//!
//! # Responsibility
//! - Turn raw operation inputs into validated repository calls.
//! - Keep the request handler decoupled from storage details.

pub mod pin_service;
