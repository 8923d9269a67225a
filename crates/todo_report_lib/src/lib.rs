use snafu::prelude::*;
use std::path::PathBuf;

pub mod finder;
pub mod parser;
pub mod utils;

use parser::{error_check::MissingErrorHandling, ReportFormat};

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Could not read {path:?}: {source}"))]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("Could not walk {root:?}: {source}"))]
    Walk {
        root: String,
        source: walkdir::Error,
    },

    #[snafu(display("Could not relativize path {path:?}: {source}"))]
    Prefix {
        path: PathBuf,
        source: std::path::StripPrefixError,
    },

    #[snafu(display("Could not write report to {path:?}: {source}"))]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("JSON error: {source}"))]
    Json { source: serde_json::Error },
}

pub(crate) type Result<T, E = Error> = core::result::Result<T, E>;

/// An external progress message sent from the scanners.
pub enum Message {
    Error(Error),

    SearchingDirectory {
        root: String,
    },
    ScannedFile {
        path: PathBuf,
    },

    FoundTodo,
    FoundTodos {
        directories: usize,
        total: usize,
    },

    MissingErrorHandling(MissingErrorHandling),
    CheckedFiles {
        files: usize,
        findings: usize,
    },

    WroteReport {
        path: PathBuf,
        format: ReportFormat,
    },

    Goodbye,
}

/// Somewhere to send status messages to the outside world.
///
/// Any `FnMut(Message)` closure is a sink, so callers that don't care can
/// pass `&mut |_| {}`.
pub trait MessageSink {
    fn send(&mut self, msg: Message);
}

impl<F: FnMut(Message)> MessageSink for F {
    fn send(&mut self, msg: Message) {
        self(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_sinks() {
        let mut sent = vec![];
        {
            let mut sink = |msg: Message| sent.push(msg);
            sink.send(Message::FoundTodo);
            sink.send(Message::Goodbye);
        }
        assert_eq!(sent.len(), 2);
        assert!(matches!(sent[0], Message::FoundTodo));
    }

    #[test]
    fn errors_display_their_path() {
        let err = Error::Read {
            path: "engine/missing.cpp".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(err.to_string(), "Could not read \"engine/missing.cpp\": gone");
    }
}
