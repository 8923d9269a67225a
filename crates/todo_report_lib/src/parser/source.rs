//! # Scanning source files for TODOs.
//!
//! [`TodoScanner`] walks a file's lines once, front to back. When it finds a
//! TODO marker it soaks up the comment lines that follow as more description,
//! then grabs a few lines of the code below as context.
use serde::Serialize;

use super::{
    langs::CommentProfile,
    line::{classify, is_note_cutoff, LineKind, TodoMarker},
};

/// How many lines of code to capture after a TODO by default.
pub const DEFAULT_CONTEXT_LINES: usize = 3;

/// One TODO found in a file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TodoRecord {
    /// Path of the file, relative to the directory that was searched.
    pub file: String,
    /// 1-based line number of the marker line.
    pub line: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    pub description: String,
    /// Code following the TODO, with trailing whitespace removed.
    pub context: Vec<String>,
}

/// A TODO whose description is still being collected.
#[derive(Clone, Debug, PartialEq)]
struct PendingTodo {
    line: usize,
    assignee: Option<String>,
    desc_lines: Vec<String>,
}

impl PendingTodo {
    fn new(line: usize, marker: TodoMarker) -> Self {
        PendingTodo {
            line,
            assignee: marker.assignee.map(|s| s.to_string()),
            // The marker's own text is kept even when empty.
            desc_lines: vec![marker.description.to_string()],
        }
    }

    fn into_record(self, file: &str, context: Vec<String>) -> TodoRecord {
        TodoRecord {
            file: file.to_string(),
            line: self.line,
            assignee: self.assignee,
            description: self.desc_lines.join(" "),
            context,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
enum ScanState {
    ScanningForMarker,
    AbsorbingContinuation(PendingTodo),
    CapturingContext(PendingTodo),
}

/// Position and accumulators for one context capture.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScanCursor {
    pub index: usize,
    pub brace_balance: isize,
    pub captured: usize,
}

/// Capture up to `max_lines` lines of code starting at `start`.
///
/// Capture stops at a blank line or another TODO. A `struct` opener is taken
/// and ends the capture. A line with a closing brace is taken and ends the
/// capture only if it closes a brace opened within the capture, otherwise
/// capture ends without it.
///
/// ```rust
/// use todo_report_lib::parser::{langs::CommentProfile, source::capture_context};
///
/// let lines = ["if (ready) {", "    go();", "}", "after();"];
/// assert_eq!(
///     capture_context(&lines, 0, CommentProfile::DoubleSlash, 3),
///     vec!["if (ready) {", "    go();", "}"]
/// );
/// ```
pub fn capture_context<S: AsRef<str>>(
    lines: &[S],
    start: usize,
    profile: CommentProfile,
    max_lines: usize,
) -> Vec<String> {
    let mut context = vec![];
    let mut cursor = ScanCursor {
        index: start,
        ..Default::default()
    };

    while cursor.index < lines.len() && cursor.captured < max_lines {
        let line = lines[cursor.index].as_ref().trim_end();

        match classify(profile, line) {
            LineKind::Blank | LineKind::Todo(_) => break,
            LineKind::StructOpener => {
                context.push(line.to_string());
                break;
            }
            LineKind::Comment(_) | LineKind::Other => {}
        }

        cursor.brace_balance += line.matches('{').count() as isize;
        let closing = line.matches('}').count() as isize;
        if closing > 0 {
            if cursor.brace_balance > 0 {
                context.push(line.to_string());
                cursor.brace_balance -= closing;
            }
            log::trace!(
                "  context closed at line {} with balance {}",
                cursor.index + 1,
                cursor.brace_balance
            );
            break;
        }

        context.push(line.to_string());
        cursor.captured += 1;
        cursor.index += 1;
    }

    context
}

/// A lazy scan over one file's lines, yielding a [`TodoRecord`] per TODO.
///
/// ```rust
/// use todo_report_lib::parser::{langs::CommentProfile, source::TodoScanner};
///
/// let lines = [
///     "// TODO(ana): Load this from disk.",
///     "// Hardcoded for now.",
///     "int width = 640;",
/// ];
/// let todos = TodoScanner::new("main.c", &lines, CommentProfile::DoubleSlash).collect::<Vec<_>>();
/// assert_eq!(todos.len(), 1);
/// assert_eq!(todos[0].line, 1);
/// assert_eq!(todos[0].description, "Load this from disk. Hardcoded for now.");
/// assert_eq!(todos[0].context, vec!["int width = 640;"]);
/// ```
pub struct TodoScanner<'a, S> {
    file: &'a str,
    lines: &'a [S],
    profile: CommentProfile,
    context_lines: usize,
    cursor: usize,
    state: ScanState,
}

impl<'a, S: AsRef<str>> TodoScanner<'a, S> {
    pub fn new(file: &'a str, lines: &'a [S], profile: CommentProfile) -> Self {
        TodoScanner {
            file,
            lines,
            profile,
            context_lines: DEFAULT_CONTEXT_LINES,
            cursor: 0,
            state: ScanState::ScanningForMarker,
        }
    }

    pub fn with_context_lines(mut self, context_lines: usize) -> Self {
        self.context_lines = context_lines;
        self
    }

    fn classify_at(&self, index: usize) -> Option<LineKind<'a>> {
        let lines: &'a [S] = self.lines;
        lines
            .get(index)
            .map(|line| classify(self.profile, S::as_ref(line)))
    }

    /// Run one transition of the state machine, returning a record if one
    /// was completed. Returns `None` in the outer option at end of input.
    fn step(&mut self) -> Option<Option<TodoRecord>> {
        let state = std::mem::replace(&mut self.state, ScanState::ScanningForMarker);
        match state {
            ScanState::ScanningForMarker => {
                let kind = self.classify_at(self.cursor)?;
                if let LineKind::Todo(marker) = kind {
                    log::trace!("{}:{} TODO {marker:?}", self.file, self.cursor + 1);
                    self.state =
                        ScanState::AbsorbingContinuation(PendingTodo::new(self.cursor + 1, marker));
                }
                self.cursor += 1;
                Some(None)
            }

            ScanState::AbsorbingContinuation(mut pending) => {
                match self.classify_at(self.cursor) {
                    Some(LineKind::Comment(text)) if is_note_cutoff(text) => {
                        // The NOTE line is consumed but its text is dropped.
                        self.cursor += 1;
                        self.state = ScanState::CapturingContext(pending);
                    }
                    Some(LineKind::Comment(text)) => {
                        if !text.is_empty() {
                            pending.desc_lines.push(text.to_string());
                        }
                        self.cursor += 1;
                        self.state = ScanState::AbsorbingContinuation(pending);
                    }
                    _ => {
                        self.state = ScanState::CapturingContext(pending);
                    }
                }
                Some(None)
            }

            ScanState::CapturingContext(pending) => {
                // Context capture looks ahead without moving the cursor.
                let context =
                    capture_context(self.lines, self.cursor, self.profile, self.context_lines);
                Some(Some(pending.into_record(self.file, context)))
            }
        }
    }
}

impl<S: AsRef<str>> Iterator for TodoScanner<'_, S> {
    type Item = TodoRecord;

    fn next(&mut self) -> Option<TodoRecord> {
        loop {
            if let Some(record) = self.step()? {
                return Some(record);
            }
        }
    }
}
