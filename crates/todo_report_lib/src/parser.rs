use serde::Serialize;
use snafu::ResultExt;
use std::{fmt::Display, path::Path};

use crate::{
    finder::{FileSearcher, SourceFile},
    utils::{read_text, write_text},
    JsonSnafu, Message, MessageSink, Result,
};

pub mod error_check;
pub mod langs;
pub mod line;
pub mod source;

use error_check::{find_missing_error_handling, MissingErrorHandling};
use langs::LanguageMap;
use source::{TodoRecord, TodoScanner, DEFAULT_CONTEXT_LINES};

/// Options shared by both kinds of scan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanOptions {
    /// File or directory names to skip.
    pub excludes: Vec<String>,
    /// Maximum lines of code captured after each TODO.
    pub context_lines: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        ScanOptions {
            excludes: vec![],
            context_lines: DEFAULT_CONTEXT_LINES,
        }
    }
}

/// How a [`TodoReport`] is written out.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReportFormat {
    #[default]
    Markdown,
    Json,
}

impl Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportFormat::Markdown => f.write_str("Markdown"),
            ReportFormat::Json => f.write_str("JSON"),
        }
    }
}

/// Read `file` and find all of its TODOs.
pub fn todos_in_file(
    file: &SourceFile,
    langs: &LanguageMap,
    context_lines: usize,
) -> Result<Vec<TodoRecord>> {
    let contents = read_text(&file.path)?;
    let lines = contents.lines().collect::<Vec<_>>();
    let language = langs.for_path(&file.path);
    log::debug!(
        "scanning {:?} ({} lines) as {}",
        file.path,
        lines.len(),
        language.name
    );
    Ok(TodoScanner::new(&file.relative, &lines, language.profile)
        .with_context_lines(context_lines)
        .collect())
}

/// The TODOs found under one search root.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DirectoryTodos {
    pub root: String,
    pub todos: Vec<TodoRecord>,
}

/// All the TODOs found, grouped by search root in search order.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TodoReport {
    pub directories: Vec<DirectoryTodos>,
}

impl TodoReport {
    /// Scan every file under each of `roots`.
    ///
    /// Files that can't be found or read are reported to `sink` as
    /// [`Message::Error`] and skipped.
    pub fn from_directories(
        roots: &[String],
        options: &ScanOptions,
        sink: &mut impl MessageSink,
    ) -> TodoReport {
        let langs = LanguageMap::default();
        let mut report = TodoReport::default();

        for root in roots.iter() {
            sink.send(Message::SearchingDirectory { root: root.clone() });
            let mut todos = vec![];
            for file in FileSearcher::find(root, &options.excludes) {
                let found = file.and_then(|file| {
                    let found = todos_in_file(&file, &langs, options.context_lines)?;
                    Ok((file, found))
                });
                match found {
                    Ok((file, found)) => {
                        found.iter().for_each(|_| sink.send(Message::FoundTodo));
                        sink.send(Message::ScannedFile { path: file.path });
                        todos.extend(found);
                    }
                    Err(e) => {
                        log::warn!("{e}");
                        sink.send(Message::Error(e));
                    }
                }
            }
            report.directories.push(DirectoryTodos {
                root: root.clone(),
                todos,
            });
        }

        sink.send(Message::FoundTodos {
            directories: report.directories.len(),
            total: report.total_len(),
        });
        report
    }

    pub fn total_len(&self) -> usize {
        self.directories.iter().map(|dir| dir.todos.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_len() == 0
    }

    /// Render the report as a markdown document.
    ///
    /// ```rust
    /// use todo_report_lib::parser::{source::TodoRecord, DirectoryTodos, TodoReport};
    ///
    /// let report = TodoReport {
    ///     directories: vec![DirectoryTodos {
    ///         root: "./game".into(),
    ///         todos: vec![TodoRecord {
    ///             file: "player.cpp".into(),
    ///             line: 12,
    ///             assignee: None,
    ///             description: "Clamp the speed.".into(),
    ///             context: vec!["speed += accel;".into()],
    ///         }],
    ///     }],
    /// };
    /// let expected = concat!(
    ///     "# TODO Report\n\n",
    ///     "## Directory: ./game\n\n",
    ///     "### **TODO:** Clamp the speed.\n\n",
    ///     "player.cpp (line 12)\n\n",
    ///     "**Context:**\n\n",
    ///     "```cpp\n",
    ///     "speed += accel;\n",
    ///     "```\n\n",
    ///     "---\n\n",
    /// );
    /// assert_eq!(report.as_markdown(), expected);
    /// ```
    pub fn as_markdown(&self) -> String {
        let langs = LanguageMap::default();
        let mut lines = vec![];

        lines.push("# TODO Report".to_string());
        lines.push("".into());

        for dir in self.directories.iter() {
            lines.push(format!("## Directory: {}", dir.root));
            lines.push("".into());
            for todo in dir.todos.iter() {
                lines.push(format!("### **TODO:** {}", todo.description));
                lines.push("".into());
                lines.push(format!("{} (line {})", todo.file, todo.line));
                lines.push("".into());
                if !todo.context.is_empty() {
                    lines.push("**Context:**".into());
                    lines.push("".into());
                    lines.push(format!("```{}", langs.for_path(&todo.file).fence));
                    lines.extend(todo.context.iter().cloned());
                    lines.push("```".into());
                    lines.push("".into());
                }
                lines.push("---".into());
                lines.push("".into());
            }
        }

        let mut markdown = lines.join("\n");
        markdown.push('\n');
        markdown
    }

    pub fn as_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context(JsonSnafu)
    }

    pub fn render(&self, format: ReportFormat) -> Result<String> {
        match format {
            ReportFormat::Markdown => Ok(self.as_markdown()),
            ReportFormat::Json => self.as_json(),
        }
    }

    /// Render the report and write it to the file at `path`.
    pub fn write_to(
        &self,
        path: &Path,
        format: ReportFormat,
        sink: &mut impl MessageSink,
    ) -> Result<()> {
        let text = self.render(format)?;
        write_text(path, &text)?;
        sink.send(Message::WroteReport {
            path: path.to_path_buf(),
            format,
        });
        Ok(())
    }
}

/// The unchecked error calls found under some search roots.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ErrorReport {
    pub files: usize,
    pub findings: Vec<MissingErrorHandling>,
}

impl ErrorReport {
    /// Check every file under each of `roots` whose extension is one of
    /// `extensions`, sending each finding to `sink` as it is found.
    pub fn from_directories(
        roots: &[String],
        extensions: &[String],
        options: &ScanOptions,
        sink: &mut impl MessageSink,
    ) -> ErrorReport {
        let langs = LanguageMap::default();
        let mut report = ErrorReport::default();

        for root in roots.iter() {
            sink.send(Message::SearchingDirectory { root: root.clone() });
            for file in FileSearcher::find(root, &options.excludes) {
                let file = match file {
                    Ok(file) if has_extension(&file, extensions) => file,
                    Ok(_) => continue,
                    Err(e) => {
                        log::warn!("{e}");
                        sink.send(Message::Error(e));
                        continue;
                    }
                };
                let contents = match read_text(&file.path) {
                    Ok(contents) => contents,
                    Err(e) => {
                        log::warn!("{e}");
                        sink.send(Message::Error(e));
                        continue;
                    }
                };
                let lines = contents.lines().collect::<Vec<_>>();
                let path = file.path.display().to_string();
                let profile = langs.for_path(&file.path).profile;
                for finding in find_missing_error_handling(&path, &lines, profile) {
                    sink.send(Message::MissingErrorHandling(finding.clone()));
                    report.findings.push(finding);
                }
                report.files += 1;
                sink.send(Message::ScannedFile { path: file.path });
            }
        }

        sink.send(Message::CheckedFiles {
            files: report.files,
            findings: report.findings.len(),
        });
        report
    }
}

fn has_extension(file: &SourceFile, extensions: &[String]) -> bool {
    let ext = file.path.extension().and_then(|ext| ext.to_str());
    match ext {
        Some(ext) => extensions
            .iter()
            .any(|want| want.trim_start_matches('.').eq_ignore_ascii_case(ext)),
        None => false,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn todo_report(roots: &[&str]) -> (TodoReport, Vec<Message>) {
        let roots = roots.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        let mut messages = vec![];
        let report = TodoReport::from_directories(&roots, &ScanOptions::default(), &mut |msg: Message| {
            messages.push(msg)
        });
        (report, messages)
    }

    #[test]
    fn todos_in_engine() {
        let (report, _) = todo_report(&["test_data/engine"]);
        let todos = &report.directories[0].todos;
        let found = todos
            .iter()
            .map(|todo| (todo.file.as_str(), todo.line))
            .collect::<Vec<_>>();
        assert_eq!(
            found,
            vec![
                ("core.cpp", 3),
                ("core.cpp", 11),
                ("core.cpp", 12),
                ("render.hpp", 4),
                ("platform/window.cpp", 5),
                ("shaders/build.sh", 3),
                ("shaders/quad.frag", 4),
            ]
        );

        assert_eq!(
            todos[0],
            TodoRecord {
                file: "core.cpp".into(),
                line: 3,
                assignee: Some("jo".into()),
                description: "Replace the bump allocator with a free list. It leaks on reload."
                    .into(),
                context: vec![
                    "void *alloc(Arena *arena, size_t size) {".into(),
                    "    void *ptr = arena->top;".into(),
                    "    arena->top += size;".into(),
                ],
            }
        );
        assert_eq!(todos[1].description, "Handle a zero sized reset.");
        assert!(todos[1].context.is_empty());
        assert_eq!(todos[2].description, "Log the reset.");
        assert_eq!(todos[2].context, vec!["    arena->top = arena->base;"]);
        assert_eq!(todos[3].context, vec!["struct Mesh"]);
        assert_eq!(todos[4].description, "Support resizing.");
        assert_eq!(todos[5].description, "Cache compiled shaders. Rebuilding every run is slow.");
        assert_eq!(todos[5].context, vec!["glslc quad.frag -o quad.spv"]);
        assert_eq!(todos[6].description, "Gamma correct.");
    }

    #[test]
    fn messages_report_progress_and_failures() {
        let (report, messages) = todo_report(&["test_data/engine", "test_data/missing"]);
        assert_eq!(report.directories.len(), 2);
        assert!(report.directories[1].todos.is_empty());

        let scanned = messages
            .iter()
            .filter(|msg| matches!(msg, Message::ScannedFile { .. }))
            .count();
        assert_eq!(scanned, 5);
        let found = messages
            .iter()
            .filter(|msg| matches!(msg, Message::FoundTodo))
            .count();
        assert_eq!(found, 7);
        assert!(messages.iter().any(|msg| matches!(msg, Message::Error(_))));
        assert!(matches!(
            messages.last(),
            Some(Message::FoundTodos {
                directories: 2,
                total: 7
            })
        ));
    }

    #[test]
    fn markdown_matches_the_classic_layout() {
        let (report, _) = todo_report(&["test_data/src"]);
        let markdown = report.as_markdown();
        let expected = "# TODO Report

## Directory: test_data/src

### **TODO:** Load levels from disk.

game.cpp (line 4)

**Context:**

```cpp
Level load_level(int index) {
    Level level;
    level.index = index;
```

---

### **TODO:** Batch draw calls.

renderer.cpp (line 1)

---

";
        assert_eq!(markdown, expected);
    }

    #[test]
    fn empty_report_markdown() {
        assert_eq!(TodoReport::default().as_markdown(), "# TODO Report\n\n");
        assert!(TodoReport::default().is_empty());
    }

    #[test]
    fn json_report() {
        let (report, _) = todo_report(&["test_data/src"]);
        let value: serde_json::Value = serde_json::from_str(&report.as_json().unwrap()).unwrap();
        assert_eq!(value["directories"][0]["root"], "test_data/src");
        assert_eq!(value["directories"][0]["todos"][0]["line"], 4);
        assert_eq!(value["directories"][0]["todos"][1]["file"], "renderer.cpp");
        assert!(value["directories"][0]["todos"][0].get("assignee").is_none());
    }

    #[test]
    fn render_formats() {
        let (report, _) = todo_report(&["test_data/src"]);
        assert_eq!(
            report.render(ReportFormat::Markdown).unwrap(),
            report.as_markdown()
        );
        assert!(report
            .render(ReportFormat::Json)
            .unwrap()
            .starts_with("{\n  \"directories\""));
        assert_eq!(ReportFormat::Json.to_string(), "JSON");
    }

    #[test]
    fn writing_to_a_missing_directory_fails() {
        let err = TodoReport::default()
            .write_to(
                Path::new("test_data/no/such/dir/todos.md"),
                ReportFormat::Markdown,
                &mut |_: Message| {},
            )
            .unwrap_err();
        assert!(matches!(err, crate::Error::Write { .. }));
    }

    #[test]
    fn excluded_names_are_skipped() {
        let roots = vec!["test_data/engine".to_string()];
        let options = ScanOptions {
            excludes: vec!["shaders".into(), "platform".into()],
            ..Default::default()
        };
        let report = TodoReport::from_directories(&roots, &options, &mut |_: Message| {});
        assert_eq!(report.total_len(), 4);
    }

    #[test]
    fn error_report_for_cpp_files() {
        let roots = vec!["test_data/src".to_string()];
        let mut messages = vec![];
        let report = ErrorReport::from_directories(
            &roots,
            &["cpp".into()],
            &ScanOptions::default(),
            &mut |msg: Message| messages.push(msg),
        );
        assert_eq!(report.files, 3);
        assert_eq!(
            report.findings,
            vec![MissingErrorHandling {
                file: "test_data/src/game.cpp".into(),
                line: 15,
            }]
        );
        assert!(messages
            .iter()
            .any(|msg| matches!(msg, Message::MissingErrorHandling(m) if m.line == 15)));
    }

    #[test]
    fn error_report_carries_on_after_failures() {
        let roots = vec!["test_data/missing".to_string(), "test_data/src".to_string()];
        let mut messages = vec![];
        let report = ErrorReport::from_directories(
            &roots,
            &["cpp".into()],
            &ScanOptions::default(),
            &mut |msg: Message| messages.push(msg),
        );
        assert!(matches!(
            messages.iter().find(|msg| matches!(msg, Message::Error(_))),
            Some(Message::Error(crate::Error::Walk { .. }))
        ));
        assert_eq!(report.files, 3);
        assert_eq!(report.findings.len(), 1);
        assert!(matches!(
            messages.last(),
            Some(Message::CheckedFiles {
                files: 3,
                findings: 1
            })
        ));
    }

    #[test]
    fn error_report_extension_filter() {
        let roots = vec!["test_data/src".to_string()];
        let report = ErrorReport::from_directories(
            &roots,
            &[".h".into()],
            &ScanOptions::default(),
            &mut |_: Message| {},
        );
        assert_eq!(report.files, 0);
        assert!(report.findings.is_empty());
    }
}
