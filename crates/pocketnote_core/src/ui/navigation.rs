//! Navigation destinations.
//!
//! # Responsibility
//! - Name the two screens and their parameters.
//! - Convert routes to and from their textual form (`list`, `detail/<id>`).
//!
//! # Invariants
//! - The detail route carries a note id, never note text.

use crate::model::note::NoteId;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

static DETAIL_ROUTE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^detail/(\d+)$").expect("valid detail route regex"));

const LIST_PATH: &str = "list";

/// Screen destination.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum Route {
    #[default]
    List,
    Detail { note_id: NoteId },
}

impl Display for Route {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::List => write!(f, "{LIST_PATH}"),
            Self::Detail { note_id } => write!(f, "detail/{note_id}"),
        }
    }
}

/// Unknown or malformed route text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteParseError(pub String);

impl Display for RouteParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown route `{}`", self.0)
    }
}

impl Error for RouteParseError {}

impl FromStr for Route {
    type Err = RouteParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim().trim_matches('/');
        if trimmed == LIST_PATH {
            return Ok(Self::List);
        }
        DETAIL_ROUTE_RE
            .captures(trimmed)
            .and_then(|caps| caps.get(1))
            .and_then(|id| id.as_str().parse::<NoteId>().ok())
            .map(|note_id| Self::Detail { note_id })
            .ok_or_else(|| RouteParseError(value.to_string()))
    }
}

/// Receiver of navigation intents emitted by screens.
pub trait NavigationSink {
    fn navigate(&mut self, route: Route);
}

/// Minimal sink that tracks the active destination.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Navigator {
    current: Route,
}

impl Navigator {
    pub fn current(&self) -> Route {
        self.current
    }
}

impl NavigationSink for Navigator {
    fn navigate(&mut self, route: Route) {
        log::debug!("event=navigate module=ui status=ok route={route}");
        self.current = route;
    }
}
