//! # Finding calls that pass an `error` without checking it afterwards.
//!
//! A call like `load_image(path, &error);` must be followed, after any blank
//! or comment lines, by `ERROR_ASSERT`, `ASSERT` or `if (error ...`.
//! Detection can be switched off for a stretch of a file with
//! `// find-error off` and back on with `// find-error on`.
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::{langs::CommentProfile, line::classify};

// UNWRAP: safe because these patterns are constant and covered by tests.
static CHECK_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(ERROR_ASSERT|ASSERT|if)").unwrap());
static CALL_WITH_ERROR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^.*\(.*\berror\b.*\)\s*;").unwrap());
static VALID_ERROR_HANDLING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(ERROR_ASSERT|ASSERT|if\s*\(\s*error\b)").unwrap());
static PRAGMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*//\s*find-error\s+(on|off)\s*$").unwrap());

/// A call passing `error` whose result is never checked.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MissingErrorHandling {
    pub file: String,
    /// 1-based line number of the call.
    pub line: usize,
}

/// Per-file detection state. Every file starts out enabled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ErrorScanState {
    pub enabled: bool,
}

impl Default for ErrorScanState {
    fn default() -> Self {
        ErrorScanState { enabled: true }
    }
}

impl ErrorScanState {
    /// The state after seeing `line`, which changes only on a pragma.
    ///
    /// ```rust
    /// use todo_report_lib::parser::error_check::ErrorScanState;
    ///
    /// let state = ErrorScanState::default();
    /// assert!(!state.after_line("  // find-error off").enabled);
    /// assert!(state.after_line("// find-error off").after_line("//find-error on").enabled);
    /// assert!(state.after_line("// find-error offline").enabled);
    /// ```
    pub fn after_line(self, line: &str) -> Self {
        match PRAGMA.captures(line).and_then(|caps| caps.get(1)) {
            Some(toggle) => ErrorScanState {
                enabled: toggle.as_str() == "on",
            },
            None => self,
        }
    }
}

/// Whether `line` is a call that passes `error` and isn't itself a check.
///
/// ```rust
/// use todo_report_lib::parser::error_check::is_call_with_error;
///
/// assert!(is_call_with_error("    doSomething(error);"));
/// assert!(is_call_with_error("int n = parse(text, &error) ;"));
/// assert!(!is_call_with_error("ASSERT(parse(text, &error));"));
/// assert!(!is_call_with_error("doSomething(errors);"));
/// assert!(!is_call_with_error("doSomething(error)"));
/// ```
pub fn is_call_with_error(line: &str) -> bool {
    !CHECK_PREFIX.is_match(line) && CALL_WITH_ERROR.is_match(line)
}

/// Whether `line` checks the error.
pub fn is_error_handling(line: &str) -> bool {
    VALID_ERROR_HANDLING.is_match(line)
}

/// Look past ignorable lines after the call at `index` and decide whether the
/// next statement handles the error. Running off the end of the file counts
/// as not handling it.
pub fn is_handled_after<S: AsRef<str>>(lines: &[S], index: usize, profile: CommentProfile) -> bool {
    lines
        .iter()
        .skip(index + 1)
        .map(S::as_ref)
        .find(|line| !classify(profile, line).is_ignorable())
        .map(is_error_handling)
        .unwrap_or(false)
}

/// Check one line, threading the detection state through.
pub fn check_line<S: AsRef<str>>(
    state: ErrorScanState,
    lines: &[S],
    index: usize,
    profile: CommentProfile,
) -> (ErrorScanState, bool) {
    let line = lines[index].as_ref();
    let state = state.after_line(line);
    let missing =
        state.enabled && is_call_with_error(line) && !is_handled_after(lines, index, profile);
    (state, missing)
}

/// Find every unchecked call in a file's lines.
///
/// ```rust
/// use todo_report_lib::parser::{error_check::*, langs::CommentProfile};
///
/// let lines = [
///     "Image img = load_image(path, &error);",
///     "",
///     "// why not",
///     "ERROR_ASSERT(error);",
///     "draw(img, &error);",
///     "present();",
/// ];
/// let found = find_missing_error_handling("game.cpp", &lines, CommentProfile::DoubleSlash);
/// assert_eq!(found, vec![MissingErrorHandling { file: "game.cpp".into(), line: 5 }]);
/// ```
pub fn find_missing_error_handling<S: AsRef<str>>(
    file: &str,
    lines: &[S],
    profile: CommentProfile,
) -> Vec<MissingErrorHandling> {
    let mut state = ErrorScanState::default();
    let mut found = vec![];
    for index in 0..lines.len() {
        let (next_state, missing) = check_line(state, lines, index, profile);
        state = next_state;
        if missing {
            log::debug!("{file}:{} missing error handling", index + 1);
            found.push(MissingErrorHandling {
                file: file.to_string(),
                line: index + 1,
            });
        }
    }
    found
}
