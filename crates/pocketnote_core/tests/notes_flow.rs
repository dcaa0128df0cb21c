use pocketnote_core::db::open_db_in_memory;
use pocketnote_core::{
    AddOutcome, AppConfig, DetailView, Dispatch, ListView, Note, NoteDraft, NoteRepository,
    NoteService, NoteValidationError, NotesApp, Route, ScreenView, SqliteNoteDao, UiAction,
    WorkerNoteRepository,
};
use rusqlite::Connection;
use std::time::Duration;

const WAIT: Duration = Duration::from_secs(5);

fn service() -> NoteService<WorkerNoteRepository> {
    let dao = SqliteNoteDao::try_new(open_db_in_memory().unwrap()).unwrap();
    NoteService::new(WorkerNoteRepository::spawn(dao).unwrap()).unwrap()
}

fn summary(notes: &[Note]) -> Vec<String> {
    notes
        .iter()
        .map(|note| format!("{}/{}", note.topic, note.content))
        .collect()
}

fn list_view(app: &mut NotesApp) -> ListView {
    match app.render() {
        ScreenView::List(view) => view,
        other => panic!("expected list screen, got {other:?}"),
    }
}

#[test]
fn observer_sees_alphabetical_list_then_deletion() {
    let mut service = service();
    assert!(service.current_notes().is_empty());

    assert_eq!(service.add("Groceries", "Milk,eggs"), AddOutcome::Submitted);
    assert_eq!(service.add("Chores", "Laundry"), AddOutcome::Submitted);
    service.flush();
    assert_eq!(
        summary(service.current_notes()),
        vec!["Chores/Laundry", "Groceries/Milk,eggs"]
    );

    let chores = service.current_notes()[0].clone();
    service.delete(chores);
    service.flush();
    assert_eq!(summary(service.current_notes()), vec!["Groceries/Milk,eggs"]);
}

#[test]
fn blank_adds_create_nothing_and_valid_add_creates_one_row() {
    let mut service = service();
    for (topic, content) in [("", "x"), ("x", ""), ("", ""), ("  ", "y")] {
        assert!(matches!(
            service.add(topic, content),
            AddOutcome::Rejected(_)
        ));
    }
    assert_eq!(service.pending_intents(), 0);

    service.add("x", "y");
    service.flush();
    assert_eq!(service.current_notes().len(), 1);
    assert_eq!(service.current_notes()[0].topic, "x");
    assert_eq!(service.current_notes()[0].content, "y");
}

#[test]
fn wait_for_update_observes_background_writes() {
    let mut service = service();
    // Initial empty snapshot is delivered on subscribe.
    service.wait_for_update(WAIT);

    service.add("Topic", "Body");
    let mut changed = false;
    for _ in 0..10 {
        if service.wait_for_update(WAIT) {
            changed = true;
            break;
        }
    }
    assert!(changed);
    assert_eq!(summary(service.current_notes()), vec!["Topic/Body"]);
}

#[test]
fn two_subscribers_receive_the_same_snapshot() {
    let dao = SqliteNoteDao::try_new(open_db_in_memory().unwrap()).unwrap();
    let repo = WorkerNoteRepository::spawn(dao).unwrap();
    let first = repo.observe_all().unwrap();
    let second = repo.observe_all().unwrap();
    assert!(first.recv_timeout(WAIT).unwrap().is_empty());
    assert!(second.recv_timeout(WAIT).unwrap().is_empty());

    let note = repo
        .insert(NoteDraft::new("shared", "list").unwrap())
        .wait()
        .unwrap();
    assert_eq!(first.recv_timeout(WAIT).unwrap(), vec![note.clone()]);
    assert_eq!(second.recv_timeout(WAIT).unwrap(), vec![note]);

    let stats = repo.shutdown();
    assert_eq!(stats.inserts, 1);
    assert_eq!(stats.broadcasts, 1);
}

#[test]
fn list_screen_add_clears_inputs_and_shows_rows() {
    let mut app = NotesApp::open_in_memory().unwrap();
    app.dispatch(UiAction::SetTopic("Groceries".to_string()));
    app.dispatch(UiAction::SetContent("Milk,eggs".to_string()));
    assert!(list_view(&mut app).add_enabled);

    assert_eq!(app.dispatch(UiAction::Add), Dispatch::Applied);
    app.flush();

    let view = list_view(&mut app);
    assert_eq!(view.topic_input, "");
    assert_eq!(view.content_input, "");
    assert!(!view.add_enabled);
    assert_eq!(view.rows.len(), 1);
    assert_eq!(view.rows[0].topic, "Groceries");
    assert!(view.to_string().contains("Groceries"));
    assert!(!view.to_string().contains("Milk,eggs"));
}

#[test]
fn detail_screen_shows_note_and_back_returns_to_list() {
    let mut app = NotesApp::open_in_memory().unwrap();
    app.dispatch(UiAction::SetTopic("Chores".to_string()));
    app.dispatch(UiAction::SetContent("Laundry".to_string()));
    app.dispatch(UiAction::Add);
    app.flush();
    let id = list_view(&mut app).rows[0].id;

    assert_eq!(app.dispatch(UiAction::Open(id)), Dispatch::Applied);
    assert_eq!(app.route(), Route::Detail { note_id: id });
    match app.render() {
        ScreenView::Detail(DetailView::Note { topic, content, .. }) => {
            assert_eq!(topic, "Chores");
            assert_eq!(content, "Laundry");
        }
        other => panic!("unexpected screen: {other:?}"),
    }
    assert_eq!(app.dispatch(UiAction::Add), Dispatch::Ignored);

    assert_eq!(app.dispatch(UiAction::Back), Dispatch::Applied);
    assert_eq!(app.route(), Route::List);
}

#[test]
fn detail_of_note_deleted_after_navigation_renders_missing() {
    let mut app = NotesApp::open_in_memory().unwrap();
    app.dispatch(UiAction::SetTopic("Temp".to_string()));
    app.dispatch(UiAction::SetContent("gone soon".to_string()));
    app.dispatch(UiAction::Add);
    app.flush();
    let id = list_view(&mut app).rows[0].id;
    app.dispatch(UiAction::Open(id));

    let note = app.service().find(id).cloned().unwrap();
    app.service_mut().delete(note);
    app.flush();

    assert_eq!(
        app.render(),
        ScreenView::Detail(DetailView::Missing { note_id: id })
    );
    assert!(app.render().to_string().contains("no longer exists"));
}

#[test]
fn notes_survive_app_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig::from_lookup(|_| None).with_db_path(dir.path().join("notes.db"));

    {
        let mut app = NotesApp::open(&config).unwrap();
        app.dispatch(UiAction::SetTopic("Persist".to_string()));
        app.dispatch(UiAction::SetContent("me".to_string()));
        app.dispatch(UiAction::Add);
        let stats = app.shutdown();
        assert_eq!(stats.inserts, 1);
    }

    let mut app = NotesApp::open(&config).unwrap();
    app.wait_for_update(WAIT);
    let view = list_view(&mut app);
    assert_eq!(view.rows.len(), 1);
    assert_eq!(view.rows[0].topic, "Persist");
}

#[test]
fn blank_add_through_screen_shows_inline_message() {
    let mut app = NotesApp::open_in_memory().unwrap();
    app.dispatch(UiAction::SetTopic("Topic only".to_string()));
    assert_eq!(
        app.dispatch(UiAction::Add),
        Dispatch::Rejected(NoteValidationError::BlankContent)
    );
    let view = list_view(&mut app);
    assert_eq!(view.topic_input, "Topic only");
    assert_eq!(
        view.validation_message.as_deref(),
        Some("content must not be blank")
    );

    app.dispatch(UiAction::SetContent("now filled".to_string()));
    assert_eq!(list_view(&mut app).validation_message, None);
}

#[test]
fn storage_rejected_insert_shows_status_on_list_screen() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("notes.db");
    let config = AppConfig::from_lookup(|_| None).with_db_path(&db_path);
    let mut app = NotesApp::open(&config).unwrap();

    // A second connection makes the store refuse every new row.
    let other = Connection::open(&db_path).unwrap();
    other
        .execute_batch(
            "CREATE TRIGGER reject_notes BEFORE INSERT ON notes
             BEGIN SELECT RAISE(ABORT, 'store is read-only'); END;",
        )
        .unwrap();

    app.dispatch(UiAction::SetTopic("Groceries".to_string()));
    app.dispatch(UiAction::SetContent("Milk,eggs".to_string()));
    assert_eq!(app.dispatch(UiAction::Add), Dispatch::Applied);
    app.flush();

    let view = list_view(&mut app);
    assert!(view.rows.is_empty());
    assert_eq!(
        view.status,
        vec!["Could not save note: store is read-only".to_string()]
    );
    assert!(view.to_string().contains("Could not save note"));
    // Status messages are transient.
    assert!(list_view(&mut app).status.is_empty());

    let stats = app.shutdown();
    assert_eq!(stats.inserts, 0);
    assert_eq!(stats.failed_writes, 1);
}
