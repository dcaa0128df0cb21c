//! Core use-case services.
//!
//! # Responsibility
//! - Hold application state derived from the repository (the live note list).
//! - Keep UI/FFI layers decoupled from storage details.

pub mod note_service;
