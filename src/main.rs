// Copyright (c) 2025 Robert August Vincent II <pillarsdotnet@gmail.com>
// Co-author: Cursor-AI.

//! # tock — task timer shell
//!
//! Reads commands from stdin, one per line, and drives a single [`Timer`].
//! The database lives at `$HOME/.local/share/tock/tock.db` by default; set
//! `TOCK_DB` to use another file.
//!
//! ## Commands
//!
//! | Command              | Description |
//! |----------------------|-------------|
//! | `start <name> [due]` | Start timing `name`; optional trailing `YYYY-MM-DD` sets the due date. |
//! | `stop`               | Stop the running task and add the session to its total. |
//! | `list`               | Tasks started today. |
//! | `sum <a> <b>`        | Combined total of two tasks; `sum a a \| b b` for multi-word names. |
//! | `status`             | The running task, if any. |
//! | `help`               | Command summary. |
//! | `quit`               | Leave the shell (also EOF); a running task is stopped first. |

use chrono::NaiveDateTime;
use std::env;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;
#[cfg(unix)]
use libc::{signal, SIG_IGN};
use tock::{Clock, Task, Timer};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Default path segment under `$HOME` for the task database.
const DEFAULT_DATABASE: &str = ".local/share/tock/tock.db";

const PROMPT: &str = "(tock) ";
const INTRO: &str = "Task timer.\tType help or ? to list commands.";
const HELP: &str = "\
start <name> [YYYY-MM-DD]  start timing a task (optional due date)
stop                       stop the running task
list                       tasks started today
sum <name> <name>          combined total of two tasks
sum <name ...> | <name ...>  same, for names containing spaces
status                     show the running task
help                       this text
quit                       leave (stops a running task first)";

/// `$TOCK_DB`, else `$HOME/.local/share/tock/tock.db` (or relative to `.` if `HOME` is unset).
fn database_path() -> PathBuf {
    if let Some(p) = env::var_os("TOCK_DB") {
        return PathBuf::from(p);
    }
    env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DATABASE)
}

/// Logs to stderr. `TOCK_DEBUG` (any value) forces debug output; otherwise `RUST_LOG`, default warn.
fn init_logging() {
    let filter = if env::var_os("TOCK_DEBUG").is_some() {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// `1h 02m 03s`
fn format_duration(secs: i64) -> String {
    format!("{}h {:02}m {:02}s", secs / 3600, (secs % 3600) / 60, secs % 60)
}

fn format_time(t: NaiveDateTime) -> String {
    t.format("%a %b %d %H:%M:%S %Y").to_string()
}

fn format_task(task: &Task) -> String {
    let mut line = format!(
        "{}  started {}  total {}",
        task.name,
        format_time(task.start),
        format_duration(task.total)
    );
    if let Some(due) = task.due_date() {
        line.push_str(&format!("  due {}", due.format("%Y-%m-%d")));
    }
    line
}

enum Flow {
    Continue,
    Quit,
}

fn cmd_start<C: Clock>(timer: &mut Timer<C>, args: &str, out: &mut impl Write) -> io::Result<()> {
    match timer.start(args) {
        Ok(task) => {
            write!(out, "Started: {} at {}", task.name, format_time(task.start))?;
            if let Some(due) = task.due_date() {
                write!(out, " (due {})", due.format("%Y-%m-%d"))?;
            }
            writeln!(out)
        }
        Err(e) => writeln!(out, "tock: {}", e),
    }
}

fn cmd_stop<C: Clock>(timer: &mut Timer<C>, out: &mut impl Write) -> io::Result<()> {
    match timer.stop() {
        Ok(task) => writeln!(
            out,
            "Stopped: {} at {}, total {}",
            task.name,
            format_time(task.end),
            format_duration(task.total)
        ),
        Err(e) => writeln!(out, "tock: {}", e),
    }
}

fn cmd_list<C: Clock>(timer: &Timer<C>, out: &mut impl Write) -> io::Result<()> {
    match timer.list() {
        Ok(tasks) if tasks.is_empty() => writeln!(out, "No tasks today."),
        Ok(tasks) => {
            for task in &tasks {
                writeln!(out, "{}", format_task(task))?;
            }
            Ok(())
        }
        Err(e) => writeln!(out, "tock: {}", e),
    }
}

/// Splits `a b` or, for multi-word names, `a a | b b`.
fn sum_names(args: &str) -> Option<(&str, &str)> {
    if let Some((first, second)) = args.split_once('|') {
        let (first, second) = (first.trim(), second.trim());
        let valid = !first.is_empty() && !second.is_empty() && !second.contains('|');
        return valid.then_some((first, second));
    }
    let names: Vec<&str> = args.split_whitespace().collect();
    match names.as_slice() {
        [first, second] => Some((*first, *second)),
        _ => None,
    }
}

fn cmd_sum<C: Clock>(timer: &Timer<C>, args: &str, out: &mut impl Write) -> io::Result<()> {
    let Some((first, second)) = sum_names(args) else {
        return writeln!(out, "Usage: sum <name> <name>  |  sum <name ...> | <name ...>");
    };
    match timer.sum(first, second) {
        Ok(total) => writeln!(out, "{}", format_duration(total)),
        Err(e) => writeln!(out, "tock: {}", e),
    }
}

fn cmd_status<C: Clock>(timer: &Timer<C>, out: &mut impl Write) -> io::Result<()> {
    match timer.current() {
        Some(task) => writeln!(out, "Current Task: {}, started {}", task.name, format_time(task.start)),
        None => writeln!(out, "No task running."),
    }
}

/// Runs one input line. Blank lines do nothing.
fn dispatch<C: Clock>(timer: &mut Timer<C>, line: &str, out: &mut impl Write) -> io::Result<Flow> {
    let line = line.trim();
    let (cmd, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();
    debug!(cmd, "dispatching");
    match cmd {
        "" => {}
        "start" => cmd_start(timer, rest, out)?,
        "stop" => cmd_stop(timer, out)?,
        "list" => cmd_list(timer, out)?,
        "sum" => cmd_sum(timer, rest, out)?,
        "status" => cmd_status(timer, out)?,
        "help" | "?" => writeln!(out, "{}", HELP)?,
        "quit" | "exit" | "bye" => return Ok(Flow::Quit),
        other => writeln!(out, "tock: unknown command '{}'", other)?,
    }
    Ok(Flow::Continue)
}

/// Prompt/read/dispatch until `quit` or end of input, then stop any running task.
fn run_shell<C: Clock>(timer: &mut Timer<C>, input: impl BufRead, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "{}", INTRO)?;
    let mut lines = input.lines();
    loop {
        write!(out, "{}", PROMPT)?;
        out.flush()?;
        let Some(line) = lines.next() else {
            writeln!(out)?;
            break;
        };
        if let Flow::Quit = dispatch(timer, &line?, out)? {
            break;
        }
    }
    if timer.current().is_some() {
        info!("stopping running task before exit");
        cmd_stop(timer, out)?;
    }
    Ok(())
}

fn main() {
    #[cfg(unix)]
    unsafe {
        signal(libc::SIGPIPE, SIG_IGN);
    }
    init_logging();
    let db = database_path();
    debug!(path = %db.display(), "database");

    let mut timer = match Timer::open(&db) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("tock: {}", e);
            process::exit(1);
        }
    };
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    if let Err(e) = run_shell(&mut timer, stdin.lock(), &mut stdout) {
        if e.kind() != io::ErrorKind::BrokenPipe {
            eprintln!("tock: {}", e);
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use tock::{ManualClock, TaskStore};

    fn timer() -> (Timer<ManualClock>, ManualClock) {
        let now = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap().and_hms_opt(9, 0, 0).unwrap();
        let clock = ManualClock::new(now);
        (Timer::from_store(TaskStore::open_in_memory().unwrap(), clock.clone()), clock)
    }

    fn run(timer: &mut Timer<ManualClock>, line: &str) -> String {
        let mut out = Vec::new();
        dispatch(timer, line, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0h 00m 00s");
        assert_eq!(format_duration(3723), "1h 02m 03s");
        assert_eq!(format_duration(90_000), "25h 00m 00s");
    }

    #[test]
    fn test_database_path_ends_with_default() {
        if env::var_os("TOCK_DB").is_none() {
            assert!(database_path().ends_with(DEFAULT_DATABASE));
        }
    }

    #[test]
    fn test_start_and_stop_commands() {
        let (mut timer, clock) = timer();
        let out = run(&mut timer, "start write report 2024-12-31");
        assert!(out.starts_with("Started: write report at Wed May 01 09:00:00 2024"), "{}", out);
        assert!(out.contains("(due 2024-12-31)"));
        clock.advance(Duration::seconds(61));
        let out = run(&mut timer, "stop");
        assert!(out.contains("Stopped: write report"));
        assert!(out.contains("total 0h 01m 01s"));
    }

    #[test]
    fn test_errors_are_printed_and_shell_continues() {
        let (mut timer, _) = timer();
        assert_eq!(run(&mut timer, "stop"), "tock: no task is running\n");
        run(&mut timer, "start X");
        assert_eq!(run(&mut timer, "start Y"), "tock: a task is already running; stop it first\n");
        assert_eq!(run(&mut timer, "start"), "tock: a task is already running; stop it first\n");
        run(&mut timer, "stop");
        assert_eq!(run(&mut timer, "start"), "tock: task name must not be empty\n");
        assert_eq!(run(&mut timer, "sum X unknown"), "tock: 'unknown' does not exist\n");
        assert_eq!(run(&mut timer, "frobnicate"), "tock: unknown command 'frobnicate'\n");
    }

    #[test]
    fn test_list_and_sum_commands() {
        let (mut timer, clock) = timer();
        assert_eq!(run(&mut timer, "list"), "No tasks today.\n");
        run(&mut timer, "start a 2024-06-01");
        clock.advance(Duration::seconds(30));
        run(&mut timer, "stop");
        run(&mut timer, "start b");
        clock.advance(Duration::seconds(45));
        run(&mut timer, "stop");

        let out = run(&mut timer, "list");
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2, "{:?}", lines);
        assert!(lines[0].starts_with("a  started"));
        assert!(lines[0].ends_with("due 2024-06-01"));
        assert!(lines[1].starts_with("b  started"));
        assert!(!lines[1].contains("due"));

        assert_eq!(run(&mut timer, "sum a b"), "0h 01m 15s\n");
        assert!(run(&mut timer, "sum a").starts_with("Usage: sum"));
    }

    #[test]
    fn test_sum_multi_word_names() {
        let (mut timer, clock) = timer();
        run(&mut timer, "start write report");
        clock.advance(Duration::seconds(20));
        run(&mut timer, "stop");
        run(&mut timer, "start code review 2024-06-01");
        clock.advance(Duration::seconds(40));
        run(&mut timer, "stop");

        assert_eq!(run(&mut timer, "sum write report | code review"), "0h 01m 00s\n");
        assert_eq!(run(&mut timer, "sum write report|write report"), "0h 00m 40s\n");
        assert_eq!(run(&mut timer, "sum write report | nope"), "tock: 'nope' does not exist\n");
        assert!(run(&mut timer, "sum write report |").starts_with("Usage: sum"));
        assert!(run(&mut timer, "sum a | b | c").starts_with("Usage: sum"));
    }

    #[test]
    fn test_sum_names_split() {
        assert_eq!(sum_names("a b"), Some(("a", "b")));
        assert_eq!(sum_names(" a b | c "), Some(("a b", "c")));
        assert_eq!(sum_names("a b c"), None);
        assert_eq!(sum_names("| c"), None);
    }

    #[test]
    fn test_status_command() {
        let (mut timer, _) = timer();
        assert_eq!(run(&mut timer, "status"), "No task running.\n");
        run(&mut timer, "start coding");
        assert!(run(&mut timer, "status").starts_with("Current Task: coding, started"));
    }

    #[test]
    fn test_blank_and_help_lines() {
        let (mut timer, _) = timer();
        assert_eq!(run(&mut timer, "   "), "");
        assert!(run(&mut timer, "help").contains("sum <name> <name>"));
        assert!(run(&mut timer, "?").contains("start <name>"));
    }

    #[test]
    fn test_run_shell_stops_running_task_at_eof() {
        let (mut timer, _) = timer();
        let input = io::Cursor::new("start coding\nstatus\n");
        let mut out = Vec::new();
        run_shell(&mut timer, input, &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.starts_with(INTRO));
        assert!(out.contains("Started: coding"));
        assert!(out.contains("Stopped: coding"));
        assert!(timer.current().is_none());
    }

    #[test]
    fn test_run_shell_quit_stops_reading() {
        let (mut timer, _) = timer();
        let input = io::Cursor::new("quit\nstart never\n");
        let mut out = Vec::new();
        run_shell(&mut timer, input, &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(!out.contains("Started"));
        assert!(timer.current().is_none());
    }
}
