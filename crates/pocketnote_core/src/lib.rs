//! Core domain logic for PocketNote.
//! This crate is the single source of truth for note storage, the live note
//! list and the screen models rendered by the mobile and terminal front ends.

pub mod app;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod ui;

pub use app::{AppError, Dispatch, NotesApp, ScreenView, UiAction};
pub use config::AppConfig;
pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::note::{Note, NoteDraft, NoteId, NoteValidationError};
pub use repo::live::{NotesSubscription, PendingWrite, UpdateSignal};
pub use repo::note_dao::{NoteDao, RepoError, RepoResult, SqliteNoteDao};
pub use repo::note_repo::{NoteRepository, WorkerNoteRepository};
pub use repo::worker::{StorageWorker, WorkerStats};
pub use service::note_service::{AddOutcome, NoteService};
pub use ui::detail_screen::{DetailScreen, DetailView};
pub use ui::list_screen::{ListScreen, ListView, NoteRow};
pub use ui::navigation::{NavigationSink, Navigator, Route, RouteParseError};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
