use std::error::Error;
use std::fmt;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use backtrace::Backtrace;
use serde::Serialize;
use slog::{error, o, Discard, Drain, Logger};

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct StackFrame {
    func: String,
    source: String,
    line: u32,
}

impl fmt::Display for StackFrame {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({}:{})", self.func, self.source, self.line)
    }
}

/// Resolved frames of the current backtrace, innermost first.
fn capture_frames() -> Vec<StackFrame> {
    Backtrace::new()
        .frames()
        .iter()
        .flat_map(|frame| frame.symbols())
        .map(|symbol| StackFrame {
            func: symbol.name().map_or_else(|| "?".to_owned(), |n| n.to_string()),
            source: symbol
                .filename()
                .and_then(|p| p.to_str())
                .map_or_else(|| "?".to_owned(), short_path),
            line: symbol.lineno().unwrap_or_default(),
        })
        .collect()
}

/// One frame per line.
fn render_trace(frames: &[StackFrame]) -> String {
    frames.iter().map(StackFrame::to_string).collect::<Vec<_>>().join("\n")
}

/// Last two path components, e.g. "filter/apply.rs".
fn short_path(s: &str) -> String {
    let path = Path::new(s);
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(file)) => format!(
            "{}/{}",
            parent.file_name().unwrap_or_default().to_string_lossy(),
            file.to_string_lossy()
        ),
        _ => s.to_owned(),
    }
}

/// Child logger carrying the error message and a stack trace.
pub fn with_err(logger: &Logger, err: &dyn Error) -> Logger {
    let trace = render_trace(&capture_frames());
    logger.new(o!("error" => err.to_string(), "stack_trace" => trace))
}

/// JSON logger writing to stdout.
pub fn get_logger() -> Logger {
    let drain = slog_json::Json::default(io::stdout()).fuse();
    let drain = Mutex::new(drain).fuse();
    Logger::root(drain, o!("app" => "filter-sim"))
}

/// Logger that drops everything, for library callers that don't want output.
pub fn discard_logger() -> Logger {
    Logger::root(Discard, o!())
}

pub fn error_context(logger: &Logger, context: &str, err: &dyn Error) {
    error!(with_err(logger, err), "{}", context);
}
