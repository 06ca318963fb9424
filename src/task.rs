// Copyright (c) 2025 Robert August Vincent II <pillarsdotnet@gmail.com>
// Co-author: Cursor-AI.

use std::sync::OnceLock;

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;

/// Due date stored when none was given.
pub const NO_DUE_DATE: NaiveDate = match NaiveDate::from_ymd_opt(9999, 12, 31) {
    Some(d) => d,
    None => panic!("9999-12-31 is a valid date"),
};

/// One row of the `tasks` table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Task {
    pub name: String,
    /// Start of the most recent session.
    pub start: NaiveDateTime,
    /// End of the most recent session; equals the creation instant until the first stop.
    pub end: NaiveDateTime,
    /// Whole seconds over every session recorded under this name.
    pub total: i64,
    pub due: NaiveDate,
}

impl Task {
    /// A task that has never run: no accumulated time and no due date.
    pub fn new(name: impl Into<String>, now: NaiveDateTime) -> Self {
        Self {
            name: name.into(),
            start: now,
            end: now,
            total: 0,
            due: NO_DUE_DATE,
        }
    }

    /// The due date, or `None` for the sentinel.
    pub fn due_date(&self) -> Option<NaiveDate> {
        (self.due != NO_DUE_DATE).then_some(self.due)
    }
}

/// Result of splitting `start` arguments into a name and an optional trailing due date.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StartArgs {
    pub name: String,
    pub due: Option<NaiveDate>,
}

fn due_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{4}-\d{1,2}-\d{1,2}$").expect("static pattern"))
}

/// Parses `"<name>"` or `"<name> <YYYY-MM-DD>"`.
///
/// The last whitespace-delimited token is taken as the due date only if it is a
/// real calendar date and something is left over for the name; otherwise the
/// whole (trimmed) input is the name.
pub fn parse_start_args(raw: &str) -> StartArgs {
    let raw = raw.trim();
    if let Some((head, token)) = raw.rsplit_once(char::is_whitespace) {
        let name = head.trim_end();
        if !name.is_empty() && due_token_re().is_match(token) {
            if let Ok(due) = NaiveDate::parse_from_str(token, "%Y-%m-%d") {
                return StartArgs {
                    name: name.to_string(),
                    due: Some(due),
                };
            }
        }
    }
    StartArgs {
        name: raw.to_string(),
        due: None,
    }
}
