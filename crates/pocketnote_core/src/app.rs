//! Composition root and screen dispatcher.
//!
//! # Responsibility
//! - Wire store → data access → worker → repository → state holder by
//!   explicit construction.
//! - Route UI actions to the active screen and render it.
//!
//! # Invariants
//! - No global registry; every collaborator is passed in or built here.
//! - Rendering always reflects the newest delivered snapshot.

use crate::config::AppConfig;
use crate::db::{open_db, open_db_in_memory, DbError};
use crate::logging::{init_logging, LoggingError};
use crate::model::note::{NoteId, NoteValidationError};
use crate::repo::live::UpdateSignal;
use crate::repo::note_dao::{RepoError, SqliteNoteDao};
use crate::repo::note_repo::{NoteRepository, WorkerNoteRepository};
use crate::repo::worker::WorkerStats;
use crate::service::note_service::{AddOutcome, NoteService};
use crate::ui::detail_screen::{DetailScreen, DetailView};
use crate::ui::list_screen::{ListScreen, ListView};
use crate::ui::navigation::{Navigator, Route};
use log::info;
use rusqlite::Connection;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// App assembly failure.
#[derive(Debug)]
pub enum AppError {
    Logging(LoggingError),
    Db(DbError),
    Repo(RepoError),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Logging(err) => write!(f, "logging init failed: {err}"),
            Self::Db(err) => write!(f, "storage init failed: {err}"),
            Self::Repo(err) => write!(f, "repository init failed: {err}"),
        }
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Logging(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<DbError> for AppError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<RepoError> for AppError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// User input routed to the active screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiAction {
    SetTopic(String),
    SetContent(String),
    Add,
    Delete(NoteId),
    Open(NoteId),
    Back,
}

/// What happened to a dispatched action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Applied,
    /// Not meaningful on the active screen, or the row is gone.
    Ignored,
    Rejected(NoteValidationError),
}

/// Rendered active screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "screen", content = "view", rename_all = "snake_case")]
pub enum ScreenView {
    List(ListView),
    Detail(DetailView),
}

impl Display for ScreenView {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::List(view) => Display::fmt(view, f),
            Self::Detail(view) => Display::fmt(view, f),
        }
    }
}

pub struct NotesApp<R: NoteRepository = WorkerNoteRepository> {
    service: NoteService<R>,
    navigator: Navigator,
    list: ListScreen,
}

impl NotesApp<WorkerNoteRepository> {
    /// Builds the app from configuration.
    ///
    /// # Errors
    /// - `AppError::Logging` when a log directory is configured but unusable.
    /// - `AppError::Db` when the database cannot be opened or is too new.
    /// - `AppError::Repo` when the schema is missing or the worker cannot start.
    pub fn open(config: &AppConfig) -> Result<Self, AppError> {
        if let Some(log_dir) = &config.log_dir {
            init_logging(&config.log_level, &log_dir.to_string_lossy())
                .map_err(AppError::Logging)?;
        }
        Self::from_connection(open_db(&config.db_path)?)
    }

    /// Builds the app over a throwaway in-memory database.
    pub fn open_in_memory() -> Result<Self, AppError> {
        Self::from_connection(open_db_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, AppError> {
        let dao = SqliteNoteDao::try_new(conn)?;
        let repo = WorkerNoteRepository::spawn(dao)?;
        let app = Self::with_repository(repo)?;
        info!("event=app_open module=app status=ok");
        Ok(app)
    }

    /// Stops the storage worker after queued writes finish.
    pub fn shutdown(self) -> WorkerStats {
        self.service.into_repository().shutdown()
    }
}

impl<R: NoteRepository> NotesApp<R> {
    pub fn with_repository(repo: R) -> Result<Self, AppError> {
        Ok(Self {
            service: NoteService::new(repo)?,
            navigator: Navigator::default(),
            list: ListScreen::new(),
        })
    }

    pub fn route(&self) -> Route {
        self.navigator.current()
    }

    pub fn service(&self) -> &NoteService<R> {
        &self.service
    }

    pub fn service_mut(&mut self) -> &mut NoteService<R> {
        &mut self.service
    }

    pub fn list_screen(&self) -> &ListScreen {
        &self.list
    }

    pub fn dispatch(&mut self, action: UiAction) -> Dispatch {
        self.service.refresh();
        match (self.navigator.current(), action) {
            (Route::List, UiAction::SetTopic(value)) => {
                self.list.set_topic(value);
                Dispatch::Applied
            }
            (Route::List, UiAction::SetContent(value)) => {
                self.list.set_content(value);
                Dispatch::Applied
            }
            (Route::List, UiAction::Add) => match self.list.submit(&mut self.service) {
                AddOutcome::Submitted => Dispatch::Applied,
                AddOutcome::Rejected(reason) => Dispatch::Rejected(reason),
            },
            (Route::List, UiAction::Delete(id)) => {
                if self.list.delete_row(&mut self.service, id) {
                    Dispatch::Applied
                } else {
                    Dispatch::Ignored
                }
            }
            (Route::List, UiAction::Open(id)) => {
                if self.service.find(id).is_none() {
                    return Dispatch::Ignored;
                }
                self.list.open_row(id, &mut self.navigator);
                Dispatch::Applied
            }
            (Route::Detail { note_id }, UiAction::Back) => {
                DetailScreen::new(note_id).back(&mut self.navigator);
                Dispatch::Applied
            }
            _ => Dispatch::Ignored,
        }
    }

    /// Renders the active screen from the newest snapshot.
    pub fn render(&mut self) -> ScreenView {
        self.service.refresh();
        match self.navigator.current() {
            Route::List => {
                let status = self.service.take_status();
                ScreenView::List(self.list.render(&self.service, status))
            }
            Route::Detail { note_id } => {
                ScreenView::Detail(DetailScreen::new(note_id).render(&self.service))
            }
        }
    }

    /// Waits up to `timeout` for the list to change.
    pub fn wait_for_update(&mut self, timeout: Duration) -> bool {
        self.service.wait_for_update(timeout)
    }

    /// Handle for waiting on list changes without borrowing the app.
    pub fn update_signal(&self) -> UpdateSignal {
        self.service.update_signal()
    }

    /// Applies a pending snapshot without blocking. Returns whether the list
    /// changed.
    pub fn refresh(&mut self) -> bool {
        self.service.refresh()
    }

    /// Blocks until every issued intent completed.
    pub fn flush(&mut self) {
        self.service.flush();
    }
}
