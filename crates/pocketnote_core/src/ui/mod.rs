//! Headless presentation layer.
//!
//! # Responsibility
//! - Model the list/editor and detail screens as plain state + view structs.
//! - Emit navigation intents to a `NavigationSink`.
//!
//! # Invariants
//! - Screens read notes only through `NoteService`.
//! - Platform rendering stays outside core; views are plain data.

pub mod detail_screen;
pub mod list_screen;
pub mod navigation;
