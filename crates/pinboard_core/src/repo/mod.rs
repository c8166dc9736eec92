//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for pins.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Every repository call runs as exactly one store transaction.
//! - Repository APIs return semantic errors (`NotFound`, `Conflict`) in
//!   addition to DB transport errors.

pub mod pin_repo;
