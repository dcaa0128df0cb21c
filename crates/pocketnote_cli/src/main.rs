//! Terminal front end for PocketNote.
//!
//! # Responsibility
//! - Drive the core screens from line-based stdin commands.
//! - Double as a smoke probe for `pocketnote_core` linkage.
//!
//! Configuration comes from `POCKETNOTE_DB_PATH`, `POCKETNOTE_LOG_LEVEL`
//! and `POCKETNOTE_LOG_DIR`.

use pocketnote_core::{AppConfig, Dispatch, NoteId, NotesApp, UiAction};
use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::time::Duration;

const UPDATE_WAIT: Duration = Duration::from_secs(2);

const HELP: &str = "\
commands:
  topic <text>     set the title input
  content <text>   set the content input
  add              add a note from the inputs
  open <id>        show one note
  delete <id>      delete a note
  back             return to the list
  show             redraw the current screen
  wait             wait for the list to change
  json             print the current screen as JSON
  help             show this help
  quit             exit";

enum Command {
    Action(UiAction),
    Show,
    Wait,
    Json,
    Help,
    Quit,
}

fn main() -> ExitCode {
    println!(
        "pocketnote ping={} version={}",
        pocketnote_core::ping(),
        pocketnote_core::core_version()
    );

    let config = AppConfig::from_env();
    let mut app = match NotesApp::open(&config) {
        Ok(app) => app,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };
    println!("database: {}", config.db_path.display());

    app.wait_for_update(UPDATE_WAIT);
    print!("{}", app.render());

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        let line = match lines.next() {
            Some(Ok(line)) => line,
            Some(Err(err)) => {
                eprintln!("error: {err}");
                break;
            }
            None => break,
        };

        match parse_command(&line) {
            Ok(Command::Action(action)) => {
                let writes = matches!(action, UiAction::Add | UiAction::Delete(_));
                match app.dispatch(action) {
                    Dispatch::Applied => {}
                    Dispatch::Ignored => println!("(not available here)"),
                    Dispatch::Rejected(reason) => println!("! {reason}"),
                }
                if writes {
                    app.flush();
                }
                print!("{}", app.render());
            }
            Ok(Command::Show) => print!("{}", app.render()),
            Ok(Command::Wait) => {
                if !app.wait_for_update(UPDATE_WAIT) {
                    println!("(no changes)");
                }
                print!("{}", app.render());
            }
            Ok(Command::Json) => match serde_json::to_string_pretty(&app.render()) {
                Ok(json) => println!("{json}"),
                Err(err) => eprintln!("error: {err}"),
            },
            Ok(Command::Help) => println!("{HELP}"),
            Ok(Command::Quit) => break,
            Err(message) => println!("{message}"),
        }
    }

    let stats = app.shutdown();
    log::info!(
        "event=cli_exit module=cli status=ok inserts={} deletes={}",
        stats.inserts,
        stats.deletes
    );
    ExitCode::SUCCESS
}

fn parse_command(line: &str) -> Result<Command, String> {
    let trimmed = line.trim_start();
    let (name, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim_start()),
        None => (trimmed.trim_end(), ""),
    };

    match name {
        "topic" => Ok(Command::Action(UiAction::SetTopic(rest.to_string()))),
        "content" => Ok(Command::Action(UiAction::SetContent(rest.to_string()))),
        "add" => Ok(Command::Action(UiAction::Add)),
        "open" => parse_id(rest).map(|id| Command::Action(UiAction::Open(id))),
        "delete" => parse_id(rest).map(|id| Command::Action(UiAction::Delete(id))),
        "back" => Ok(Command::Action(UiAction::Back)),
        "show" | "" => Ok(Command::Show),
        "wait" => Ok(Command::Wait),
        "json" => Ok(Command::Json),
        "help" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(format!("unknown command `{other}`; type `help`")),
    }
}

fn parse_id(raw: &str) -> Result<NoteId, String> {
    let trimmed = raw.trim().trim_start_matches('#');
    trimmed
        .parse::<NoteId>()
        .map_err(|_| format!("expected a note id, got `{}`", raw.trim()))
}
