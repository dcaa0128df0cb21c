//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define typed data access over the notes table (`note_dao`).
//! - Run storage work off the caller thread and publish live list
//!   snapshots (`worker`, `live`).
//! - Expose the façade the state holder depends on (`note_repo`).
//!
//! # Invariants
//! - Only `NoteDraft` values (already validated) reach insert paths.
//! - Deleting a missing note is a no-op, never an error.

pub mod live;
pub mod note_dao;
pub mod note_repo;
pub mod worker;
