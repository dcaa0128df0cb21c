//! Domain model for notes.
//!
//! # Responsibility
//! - Define the persisted `Note` record and the unsaved `NoteDraft` input.
//! - Own the blank-input validation rule shared by every write path.
//!
//! # Invariants
//! - Every stored note is identified by a store-assigned `NoteId`.
//! - Notes are immutable once created; there is no update path.

pub mod note;
