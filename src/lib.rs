// Copyright (c) 2025 Robert August Vincent II <pillarsdotnet@gmail.com>
// Co-author: Cursor-AI.

//! # tock — task timer
//!
//! Start and stop named tasks; elapsed time is accumulated per task name in a
//! local SQLite database.
//!
//! | Type                  | Role |
//! |-----------------------|------|
//! | [`Timer`]             | Owns the single running task and every write to the store. |
//! | [`TaskStore`]         | Column-level select/update/insert over the `tasks` table. |
//! | [`Task`]              | One persisted row: name, start, end, total seconds, due date. |
//! | [`Clock`]             | Source of "now"; [`SystemClock`] in the binary, [`ManualClock`] in tests. |

pub mod clock;
pub mod error;
pub mod store;
pub mod task;
pub mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Error, Result};
pub use store::{Column, Operator, TaskStore};
pub use task::{parse_start_args, StartArgs, Task, NO_DUE_DATE};
pub use timer::Timer;
