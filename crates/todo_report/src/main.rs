use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use console::Style;
use indicatif::{ProgressBar, ProgressStyle};
use todo_report_lib::{
    parser::{source::DEFAULT_CONTEXT_LINES, ErrorReport, ReportFormat, ScanOptions, TodoReport},
    Message,
};

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum Format {
    Markdown,
    Json,
}

impl From<Format> for ReportFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Markdown => ReportFormat::Markdown,
            Format::Json => ReportFormat::Json,
        }
    }
}

#[derive(Debug, Clone, clap::Args)]
struct TodosArgs {
    #[clap(
        short = 'd',
        long = "dir",
        default_values = ["./engine", "./game", "./badtl"]
    )]
    /// Directory to search for TODOs, may be supplied multiple times.
    dirs: Vec<String>,

    #[clap(short, long, default_value = "todos.md")]
    /// File to write the report to, or "-" for stdout.
    output: PathBuf,

    #[clap(short, long, value_enum, default_value_t = Format::Markdown)]
    /// The format of the report.
    format: Format,

    #[clap(long, default_value_t = DEFAULT_CONTEXT_LINES)]
    /// Maximum lines of code to include after each TODO.
    context_lines: usize,
}

#[derive(Debug, Clone, clap::Args)]
struct FindErrorArgs {
    #[clap(short = 'd', long = "dir", default_values = ["src"])]
    /// Directory to search for unchecked errors, may be supplied multiple times.
    dirs: Vec<String>,

    #[clap(short = 'x', long = "ext", default_values = ["cpp"])]
    /// File extension to check, may be supplied multiple times.
    extensions: Vec<String>,
}

#[derive(Debug, Clone, clap::Subcommand)]
enum Command {
    /// Write a report of the TODOs in some directories, with a little of the
    /// code that follows each one
    Todos(TodosArgs),
    /// Find calls that pass an `error` without checking it afterwards
    FindError(FindErrorArgs),
}

#[derive(clap::Parser, Debug)]
#[command(
    version,
    about,
    author,
    help_template(
        "\
{before-help}{name} {version} by {author-with-newline}
{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}"
    )
)]
struct Cli {
    #[clap(short, long, global = true)]
    /// Name of a file or directory to skip, may be supplied multiple times.
    exclude: Vec<String>,

    #[clap(subcommand)]
    command: Command,
}

struct Printer {
    red: Style,
    yellow: Style,
    green: Style,
    dim: Style,
    todos: usize,
    progress: ProgressBar,
}

impl Default for Printer {
    fn default() -> Self {
        let spinner_style = ProgressStyle::with_template("{spinner} {wide_msg}")
            .unwrap()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ");
        let progress = ProgressBar::new_spinner();
        progress.set_style(spinner_style);

        Self {
            red: Style::new().red(),
            yellow: Style::new().yellow(),
            green: Style::new().green(),
            dim: Style::new().dim(),
            todos: 0,
            progress,
        }
    }
}

impl Printer {
    fn print(&mut self, msg: Message) {
        use Message::*;

        match msg {
            Error(err) => {
                let e = self.red.apply_to(err.to_string());
                self.progress.suspend(|| eprintln!("{e}"));
            }

            SearchingDirectory { root } => {
                self.progress
                    .suspend(|| eprintln!("Searching {root}..."));
            }
            ScannedFile { path } => {
                self.progress.inc(1);
                self.progress.set_message(format!(
                    "Scanned {} files, found {} TODOs {}",
                    self.progress.position(),
                    self.todos,
                    self.dim.apply_to(path.display())
                ));
            }

            FoundTodo => {
                self.todos += 1;
            }
            FoundTodos { directories, total } => {
                self.progress.finish_and_clear();
                eprintln!(
                    "Found {total} TODO{} in {directories} director{}",
                    if total == 1 { "" } else { "s" },
                    if directories == 1 { "y" } else { "ies" }
                );
            }

            MissingErrorHandling(finding) => {
                let tag = self.red.apply_to("ERROR");
                self.progress.suspend(|| {
                    println!(
                        "[{tag}] {}:{} missing error handling",
                        finding.file, finding.line
                    )
                });
            }
            CheckedFiles { files, findings } => {
                self.progress.finish_and_clear();
                let style = if findings == 0 {
                    &self.green
                } else {
                    &self.yellow
                };
                eprintln!(
                    "{}",
                    style.apply_to(format!(
                        "Checked {files} file{}, {findings} missing error handling",
                        if files == 1 { "" } else { "s" }
                    ))
                );
            }

            WroteReport { path, format } => {
                eprintln!("{format} file '{}' created.", path.display());
            }

            Goodbye => {
                eprintln!("🏁 {}", self.green.apply_to("All done!"));
            }
        }
    }
}

fn run_todos(args: TodosArgs, excludes: Vec<String>, printer: &mut Printer) -> ExitCode {
    let options = ScanOptions {
        excludes,
        context_lines: args.context_lines,
    };
    let mut sink = |msg: Message| printer.print(msg);
    let report = TodoReport::from_directories(&args.dirs, &options, &mut sink);
    let format = ReportFormat::from(args.format);

    let written = if args.output.as_os_str() == "-" {
        report.render(format).map(|text| print!("{text}"))
    } else {
        report.write_to(&args.output, format, &mut sink)
    };
    match written {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            sink(Message::Error(e));
            ExitCode::FAILURE
        }
    }
}

fn run_find_error(args: FindErrorArgs, excludes: Vec<String>, printer: &mut Printer) -> ExitCode {
    let options = ScanOptions {
        excludes,
        ..Default::default()
    };
    // Findings are advisory, they never fail the run.
    let _report = ErrorReport::from_directories(
        &args.dirs,
        &args.extensions,
        &options,
        &mut |msg: Message| printer.print(msg),
    );
    ExitCode::SUCCESS
}

fn main() -> ExitCode {
    env_logger::builder().init();

    let Cli { exclude, command } = Cli::parse();

    let mut printer = Printer::default();
    let code = match command {
        Command::Todos(args) => run_todos(args, exclude, &mut printer),
        Command::FindError(args) => run_find_error(args, exclude, &mut printer),
    };
    printer.print(Message::Goodbye);
    code
}
