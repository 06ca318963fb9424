// Copyright (c) 2025 Robert August Vincent II <pillarsdotnet@gmail.com>
// Co-author: Cursor-AI.

use std::cell::Cell;
use std::rc::Rc;

use chrono::{Duration, Local, NaiveDateTime};

/// Source of the current local time for the [`Timer`](crate::Timer).
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Wall-clock local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Clock that only moves when told to, for tests and for embedding a `Timer`
/// in something that supplies its own notion of time. Clones share the same
/// instant, so a caller can keep one handle and give the other to a `Timer`.
#[derive(Debug, Clone)]
pub struct ManualClock(Rc<Cell<NaiveDateTime>>);

impl ManualClock {
    pub fn new(at: NaiveDateTime) -> Self {
        Self(Rc::new(Cell::new(at)))
    }

    pub fn set(&self, at: NaiveDateTime) {
        self.0.set(at);
    }

    pub fn advance(&self, by: Duration) {
        self.0.set(self.0.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        self.0.get()
    }
}
