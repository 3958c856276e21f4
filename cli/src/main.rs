mod hint;
mod logger;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use codespan_reporting::diagnostic::{Diagnostic, Label};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use log::{debug, error, info};

use mdscript::language::LanguageTable;
use mdscript::locate::find_document;
use mdscript::parser::ParseWarning;
use runner::{Executor, RunError};

const DEFAULT_PROGRAM: &str = "scripts";

#[derive(Parser, Debug)]
#[command(
    name = "scripts",
    version,
    about = "Run markdown code blocks by their heading",
    override_usage = "scripts [OPTIONS] [HEADING] [ARGS]..."
)]
struct Cli {
    /// Print debug information
    #[arg(short, long)]
    verbose: bool,

    /// Keep code blocks in every language, not only those with an interpreter
    #[arg(short, long)]
    all: bool,

    /// Print the markdown of the heading (or the whole document) instead of running it
    #[arg(short, long)]
    markdown: bool,

    /// Print the code blocks of the heading instead of running them
    #[arg(short, long)]
    code: bool,

    /// Markdown file to use (searched upward from the current directory when omitted)
    #[arg(short, long, value_name = "FILE")]
    file: Option<PathBuf>,

    /// Disable colored diagnostics
    #[arg(long)]
    no_color: bool,

    /// Dump the parsed command tree
    #[arg(long, hide = true)]
    debug_ast: bool,

    /// Heading whose code blocks to run (case-insensitive)
    heading: Option<String>,

    /// Arguments handed to the interpreter after the code
    #[arg(last = true)]
    args: Vec<String>,
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let exe = args
        .first()
        .cloned()
        .unwrap_or_else(|| DEFAULT_PROGRAM.to_string());
    let program = program_name(&exe);

    let cli = match Cli::try_parse_from(split_trailing(args)) {
        Ok(cli) => cli,
        Err(err) => {
            let code = if err.use_stderr() { 1 } else { 0 };
            let _ = err.print();
            process::exit(code);
        }
    };

    logger::init(&program, cli.verbose);
    process::exit(run(cli, &program, &exe));
}

fn run(cli: Cli, program: &str, exe: &str) -> i32 {
    let cwd = match std::env::current_dir() {
        Ok(cwd) => cwd,
        Err(e) => {
            error!("Unknown working directory: {e}");
            return 1;
        }
    };
    let stdout = io::stdout();
    match run_in(&cli, program, exe, &cwd, &mut stdout.lock()) {
        Ok(code) => code,
        Err(e) => {
            error!("Cannot write output: {e}");
            1
        }
    }
}

/// Resolve the document from `cwd` and act on the parsed command line,
/// writing anything printed (hints, markdown, code) to `out`.
fn run_in(
    cli: &Cli,
    program: &str,
    exe: &str,
    cwd: &Path,
    out: &mut impl Write,
) -> io::Result<i32> {
    debug!("{cli:?}");
    if cli.all {
        info!("--all flag is set");
    }
    if cli.heading.is_none() && !cli.args.is_empty() {
        error!("Arguments given without a heading: {}", cli.args.join(" "));
        return Ok(1);
    }

    let path = match &cli.file {
        Some(file) => file.canonicalize().unwrap_or_else(|_| file.clone()),
        None => match find_document(cwd, program) {
            Ok(path) => path,
            Err(e) => {
                error!("{e}");
                return Ok(1);
            }
        },
    };
    info!("Using markdown file: {}", path.display());

    let source = match std::fs::read_to_string(&path) {
        Ok(s) => s,
        Err(e) => {
            error!("Cannot read '{}': {}", path.display(), e);
            return Ok(1);
        }
    };

    let color_choice = if cli.no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };
    let writer = StandardStream::stderr(color_choice);
    let config = term::Config::default();

    // Set up codespan file database
    let mut files = SimpleFiles::new();
    let file_id = files.add(path.display().to_string(), source.clone());

    let script = mdscript::parser::Parser::new(source.clone(), file_id)
        .all_languages(cli.all)
        .parse();
    if cli.verbose {
        emit_warnings(&writer, &config, &files, &script.warnings);
    }

    if cli.debug_ast {
        writeln!(out, "{:#?}", script.tree)?;
        return Ok(0);
    }

    let Some(heading) = cli.heading.as_deref() else {
        info!("No heading given, printing hints");
        if cli.markdown {
            write!(out, "{source}")?;
        } else {
            write!(out, "{}", hint::render(&script.tree, cli.verbose))?;
        }
        return Ok(0);
    };

    let executor = Executor::new(&script.tree, LanguageTable::builtin())
        .with_env("MD_FILE", path.display().to_string())
        .with_env("MD_EXE", exe);

    let id = match executor.resolve(heading) {
        Ok(id) => id,
        Err(e) => {
            emit_run_error(&writer, &config, &files, file_id, &e);
            return Ok(e.exit_code());
        }
    };
    let node = &script.tree[id];
    info!("Found heading: {}, argument count: {}", node.heading, cli.args.len());

    if cli.markdown || cli.code {
        if cli.markdown {
            write!(out, "{}", source.get(node.span.clone()).unwrap_or_default())?;
        }
        if cli.code {
            for block in &node.code_blocks {
                write!(out, "{}", block.content)?;
            }
        }
        return Ok(0);
    }
    out.flush()?;

    match executor.execute(id, &cli.args) {
        Ok(()) => Ok(0),
        Err(e) => {
            emit_run_error(&writer, &config, &files, file_id, &e);
            Ok(e.exit_code())
        }
    }
}

/// File stem of the path this tool was invoked through.
fn program_name(exe: &str) -> String {
    Path::new(exe)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| DEFAULT_PROGRAM.to_string())
}

/// Option parsing stops at the heading: insert `--` right after it so that
/// every later argument reaches the interpreter, even ones that look like
/// our own options. A heading may also follow an explicit `--`.
fn split_trailing(mut args: Vec<String>) -> Vec<String> {
    let mut index = 1;
    while index < args.len() {
        let arg = args[index].as_str();
        if arg == "--" {
            let heading_follows = args
                .get(index + 1)
                .is_some_and(|next| !next.starts_with('-'));
            if heading_follows {
                args.remove(index);
                args.insert(index + 1, "--".to_string());
            }
            return args;
        }
        if arg.len() > 1 && arg.starts_with('-') {
            if takes_separate_value(arg) {
                index += 1;
            }
            index += 1;
            continue;
        }
        args.insert(index + 1, "--".to_string());
        return args;
    }
    args
}

/// Whether an option token expects its value in the next argument
/// (`--file PATH`, `-f PATH`, `-vf PATH`, but not `-fPATH` or `--file=PATH`).
fn takes_separate_value(arg: &str) -> bool {
    match arg.strip_prefix("--") {
        Some(long) => long == "file",
        None => arg[1..].find('f') == Some(arg.len() - 2),
    }
}

fn emit_run_error(
    writer: &StandardStream,
    config: &term::Config,
    files: &SimpleFiles<String, String>,
    file_id: usize,
    error: &RunError,
) {
    if let Some(span) = error.span() {
        let diagnostic = Diagnostic::error()
            .with_message(error.to_string())
            .with_labels(vec![Label::primary(file_id, span)]);
        let _ = term::emit_to_write_style(&mut writer.lock(), config, files, &diagnostic);
    } else {
        error!("{error}");
    }
}

fn emit_warnings(
    writer: &StandardStream,
    config: &term::Config,
    files: &SimpleFiles<String, String>,
    warnings: &[ParseWarning],
) {
    for warning in warnings {
        let diagnostic = warning.to_diagnostic();
        let _ = term::emit_to_write_style(&mut writer.lock(), config, files, &diagnostic);
    }
}
