//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the notes screens and intents to Dart via FRB.
//! - Own the single process-wide `NotesApp` the mobile UI talks to.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Calls made before `notes_open` fail with a message, never a crash.
//! - Storage work runs on the core worker thread; these calls only enqueue
//!   intents or read the latest snapshot.

use pocketnote_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    AppConfig, DetailView, Dispatch, NotesApp, ScreenView, UiAction,
};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

const WAIT_TIMEOUT_MAX_MS: u32 = 10_000;

static APP: Mutex<Option<NotesApp>> = Mutex::new(None);

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// One row of the note list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteRowItem {
    pub note_id: i64,
    pub topic: String,
}

/// Flattened screen state for Dart widgets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenState {
    /// `list` or `detail/<id>`.
    pub route: String,
    pub topic_input: String,
    pub content_input: String,
    pub add_enabled: bool,
    pub validation_message: Option<String>,
    pub rows: Vec<NoteRowItem>,
    pub status: Vec<String>,
    pub detail_topic: Option<String>,
    pub detail_content: Option<String>,
    /// True when the detail note was deleted after navigation.
    pub detail_missing: bool,
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    pub ok: bool,
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }
}

/// Opens the notes database and starts the storage worker.
///
/// `db_path` overrides `POCKETNOTE_DB_PATH`. Reopening replaces the running
/// app after its queued writes finish.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_open(db_path: Option<String>) -> ActionResponse {
    let mut config = AppConfig::from_env();
    if let Some(path) = db_path.map(|raw| raw.trim().to_string()) {
        if !path.is_empty() {
            config = config.with_db_path(path);
        }
    }

    match NotesApp::open(&config) {
        Ok(app) => {
            let previous = lock_app().replace(app);
            drop(previous);
            ActionResponse::success("Notes opened.")
        }
        Err(err) => ActionResponse::failure(format!("notes_open failed: {err}")),
    }
}

/// Stops the storage worker and releases the database.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_close() -> ActionResponse {
    match lock_app().take() {
        Some(app) => {
            let stats = app.shutdown();
            log::info!(
                "event=notes_close module=ffi status=ok inserts={} deletes={}",
                stats.inserts,
                stats.deletes
            );
            ActionResponse::success("Notes closed.")
        }
        None => ActionResponse::failure("notes are not open"),
    }
}

/// Renders the active screen; `None` before `notes_open`.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_render() -> Option<ScreenState> {
    lock_app().as_mut().map(|app| {
        let route = app.route().to_string();
        to_screen_state(route, app.render())
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn notes_set_topic(value: String) -> ActionResponse {
    dispatch(UiAction::SetTopic(value))
}

#[flutter_rust_bridge::frb(sync)]
pub fn notes_set_content(value: String) -> ActionResponse {
    dispatch(UiAction::SetContent(value))
}

/// Adds a note from the current inputs.
///
/// Success means the write was queued; the list update follows.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_add() -> ActionResponse {
    dispatch(UiAction::Add)
}

#[flutter_rust_bridge::frb(sync)]
pub fn notes_delete(note_id: i64) -> ActionResponse {
    dispatch(UiAction::Delete(note_id))
}

#[flutter_rust_bridge::frb(sync)]
pub fn notes_open_detail(note_id: i64) -> ActionResponse {
    dispatch(UiAction::Open(note_id))
}

#[flutter_rust_bridge::frb(sync)]
pub fn notes_back() -> ActionResponse {
    dispatch(UiAction::Back)
}

/// Blocks up to `timeout_ms` (capped at 10s) for the list to change.
///
/// Meant for a Dart isolate that polls for list updates. The app lock is
/// only held to grab the wake handle and to apply the snapshot, so sync
/// calls from the UI isolate keep running during the wait.
pub fn notes_wait_for_update(timeout_ms: u32) -> bool {
    let timeout = Duration::from_millis(u64::from(timeout_ms.min(WAIT_TIMEOUT_MAX_MS)));
    let signal = match lock_app().as_ref() {
        Some(app) => app.update_signal(),
        None => return false,
    };
    if !signal.wait(timeout) {
        return false;
    }
    match lock_app().as_mut() {
        Some(app) => app.refresh(),
        None => false,
    }
}

fn dispatch(action: UiAction) -> ActionResponse {
    let mut guard = lock_app();
    let Some(app) = guard.as_mut() else {
        return ActionResponse::failure("notes are not open");
    };
    match app.dispatch(action) {
        Dispatch::Applied => ActionResponse::success("OK"),
        Dispatch::Ignored => ActionResponse::failure("action not available on this screen"),
        Dispatch::Rejected(reason) => ActionResponse::failure(reason.to_string()),
    }
}

fn lock_app() -> MutexGuard<'static, Option<NotesApp>> {
    APP.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn to_screen_state(route: String, view: ScreenView) -> ScreenState {
    let mut state = ScreenState {
        route,
        topic_input: String::new(),
        content_input: String::new(),
        add_enabled: false,
        validation_message: None,
        rows: Vec::new(),
        status: Vec::new(),
        detail_topic: None,
        detail_content: None,
        detail_missing: false,
    };
    match view {
        ScreenView::List(list) => {
            state.topic_input = list.topic_input;
            state.content_input = list.content_input;
            state.add_enabled = list.add_enabled;
            state.validation_message = list.validation_message;
            state.status = list.status;
            state.rows = list
                .rows
                .into_iter()
                .map(|row| NoteRowItem {
                    note_id: row.id,
                    topic: row.topic,
                })
                .collect();
        }
        ScreenView::Detail(DetailView::Note { topic, content, .. }) => {
            state.detail_topic = Some(topic);
            state.detail_content = Some(content);
        }
        ScreenView::Detail(DetailView::Missing { .. }) => state.detail_missing = true,
    }
    state
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, init_logging, notes_add, notes_back, notes_close, notes_delete,
        notes_open, notes_open_detail, notes_render, notes_set_content, notes_set_topic,
        notes_wait_for_update, ping,
    };
    use std::sync::Mutex;
    use std::thread;
    use std::time::{Duration, Instant};

    // The bridge owns one global app; serialize tests that touch it.
    static TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(error.contains("unsupported log level"));
    }

    #[test]
    fn add_open_back_delete_through_bridge() {
        let _guard = TEST_LOCK.lock().unwrap_or_else(|p| p.into_inner());
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("bridge.db");
        let opened = notes_open(Some(db_path.to_string_lossy().into_owned()));
        assert!(opened.ok, "{}", opened.message);

        assert!(notes_set_topic("Groceries".to_string()).ok);
        assert!(notes_set_content("Milk,eggs".to_string()).ok);
        let added = notes_add();
        assert!(added.ok, "{}", added.message);

        let mut screen = notes_render().unwrap();
        for _ in 0..10 {
            if !screen.rows.is_empty() {
                break;
            }
            notes_wait_for_update(500);
            screen = notes_render().unwrap();
        }
        assert_eq!(screen.route, "list");
        assert_eq!(screen.rows.len(), 1);
        assert_eq!(screen.rows[0].topic, "Groceries");
        let note_id = screen.rows[0].note_id;

        assert!(notes_open_detail(note_id).ok);
        let detail = notes_render().unwrap();
        assert_eq!(detail.route, format!("detail/{note_id}"));
        assert_eq!(detail.detail_content.as_deref(), Some("Milk,eggs"));
        assert!(!notes_add().ok);

        assert!(notes_back().ok);
        assert!(notes_delete(note_id).ok);
        assert!(notes_close().ok);
        assert!(!notes_close().ok);
        assert!(notes_render().is_none());
    }

    #[test]
    fn blank_add_reports_validation_message() {
        let _guard = TEST_LOCK.lock().unwrap_or_else(|p| p.into_inner());
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("blank.db");
        assert!(notes_open(Some(db_path.to_string_lossy().into_owned())).ok);

        assert!(notes_set_topic("   ".to_string()).ok);
        let response = notes_add();
        assert!(!response.ok);
        assert_eq!(response.message, "topic must not be blank");
        assert_eq!(
            notes_render().unwrap().validation_message.as_deref(),
            Some("topic must not be blank")
        );
        assert!(notes_close().ok);
    }

    #[test]
    fn render_stays_responsive_while_a_wait_is_in_flight() {
        let _guard = TEST_LOCK.lock().unwrap_or_else(|p| p.into_inner());
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("waiting.db");
        assert!(notes_open(Some(db_path.to_string_lossy().into_owned())).ok);
        // Consume the initial snapshot so the next wait has to block.
        notes_wait_for_update(2_000);

        let waiter = thread::spawn(|| notes_wait_for_update(5_000));
        thread::sleep(Duration::from_millis(200));

        let started = Instant::now();
        let screen = notes_render().unwrap();
        assert!(
            started.elapsed() < Duration::from_secs(1),
            "render took {:?}",
            started.elapsed()
        );
        assert!(screen.rows.is_empty());

        assert!(notes_set_topic("Chores".to_string()).ok);
        assert!(notes_set_content("Laundry".to_string()).ok);
        assert!(notes_add().ok);
        assert!(waiter.join().unwrap());
        assert_eq!(notes_render().unwrap().rows.len(), 1);
        assert!(notes_close().ok);
    }
}
