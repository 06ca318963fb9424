// Copyright (c) 2025 Robert August Vincent II <pillarsdotnet@gmail.com>
// Co-author: Cursor-AI.

//! The task timer: one running task at a time, totals accumulated in the store.

use std::path::Path;

use chrono::{NaiveDateTime, NaiveTime};
use tracing::{debug, warn};

use crate::clock::{Clock, SystemClock};
use crate::error::{Error, Result};
use crate::store::{Column, Operator, TaskStore};
use crate::task::{parse_start_args, Task};

/// Whole seconds from `start` to `now`, truncated; zero if the clock went backwards.
fn elapsed_secs(start: NaiveDateTime, now: NaiveDateTime) -> i64 {
    (now - start).num_seconds().max(0)
}

#[derive(Debug)]
pub struct Timer<C = SystemClock> {
    store: TaskStore,
    clock: C,
    /// `None` while idle.
    current: Option<Task>,
}

impl Timer {
    /// Opens the store at `path` using wall-clock time.
    pub fn open(path: &Path) -> Result<Self> {
        Self::with_clock(path, SystemClock)
    }
}

impl<C: Clock> Timer<C> {
    pub fn with_clock(path: &Path, clock: C) -> Result<Self> {
        Ok(Self::from_store(TaskStore::open(path)?, clock))
    }

    pub fn from_store(store: TaskStore, clock: C) -> Self {
        Self {
            store,
            clock,
            current: None,
        }
    }

    /// The running task, if any.
    pub fn current(&self) -> Option<&Task> {
        self.current.as_ref()
    }

    /// Starts `"<name>"` or `"<name> <YYYY-MM-DD>"`.
    ///
    /// A name seen before resumes its stored total (and keeps its due date unless a
    /// new one is given); a new name is inserted with a zero total.
    pub fn start(&mut self, args: &str) -> Result<&Task> {
        if self.current.is_some() {
            return Err(Error::AlreadyRunning);
        }
        let args = parse_start_args(args);
        if args.name.is_empty() {
            return Err(Error::EmptyName);
        }
        let now = self.clock.now();
        let task = match self.store.select_one(Column::Name, &args.name)? {
            Some(existing) => {
                let task = Task {
                    start: now,
                    due: args.due.unwrap_or(existing.due),
                    ..existing
                };
                if let Some(due) = args.due {
                    self.store.update_one(Column::Due, Column::Name, (&due, &task.name))?;
                }
                self.store.update_one(Column::Start, Column::Name, (&task.start, &task.name))?;
                debug!(task = %task.name, total = task.total, "resumed task");
                task
            }
            None => {
                let mut task = Task::new(args.name, now);
                if let Some(due) = args.due {
                    task.due = due;
                }
                self.store.insert(std::slice::from_ref(&task))?;
                debug!(task = %task.name, "created task");
                task
            }
        };
        Ok(&*self.current.insert(task))
    }

    /// Stops the running task and records the session. Returns the task as stored.
    ///
    /// `end` and `total` are written as two separate updates; a crash between them
    /// leaves a fresh `end` beside a stale `total`.
    pub fn stop(&mut self) -> Result<Task> {
        let current = self.current.as_ref().ok_or(Error::NotRunning)?;
        let now = self.clock.now();
        let task = Task {
            end: now,
            total: current.total + elapsed_secs(current.start, now),
            ..current.clone()
        };
        if self.store.select_one(Column::Name, &task.name)?.is_none() {
            warn!(task = %task.name, "no stored row for running task; inserting");
            self.store.insert(std::slice::from_ref(&task))?;
        }
        self.store.update_one(Column::End, Column::Name, (&task.end, &task.name))?;
        self.store.update_one(Column::Total, Column::Name, (&task.total, &task.name))?;
        debug!(task = %task.name, total = task.total, "stopped task");
        self.current = None;
        Ok(task)
    }

    /// Tasks started since local midnight today, in storage order.
    pub fn list(&self) -> Result<Vec<Task>> {
        let midnight = self.clock.now().date().and_time(NaiveTime::MIN);
        self.store.select_many(Column::Start, &midnight, Operator::Ge)
    }

    /// Sum of the totals of two stored tasks.
    pub fn sum(&self, first: &str, second: &str) -> Result<i64> {
        let mut total = 0;
        for name in [first, second] {
            let task = self
                .store
                .select_one(Column::Name, &name)?
                .ok_or_else(|| Error::NotFound(name.to_string()))?;
            total += task.total;
        }
        Ok(total)
    }
}
