//! Domain model for pins, comments and likes.
//!
//! # Responsibility
//! - Define canonical records returned by the pin service.
//! - Normalize and validate write inputs before they reach storage.
//!
//! # Invariants
//! - Pin and comment identifiers are assigned by the store, never by callers.
//! - `likes_count` equals the number of like rows for the pin.

pub mod pin;
