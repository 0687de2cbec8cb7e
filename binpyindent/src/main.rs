//! pyindent command-line host for the PEP 8 indentation engine.
//!
//! Usage: pyindent <COMMAND> [OPTIONS] [FILE]
//!
//! Commands:
//!   newline    Print the indentation of a new line typed at the cursor
//!   align      Print the column a just-typed else/elif/except/finally aligns to
//!   filter     Print every line with strings masked and comments removed
//!
//! Options:
//!   --offset <N>           Cursor byte offset [default: end of input]
//!   --tab-size <N>         Tab width in columns
//!   --max-lookback <N>     Maximum number of previous lines inspected
//!   --config <FILE>        Load settings from a TOML file
//!   --line-endings <STYLE> unix, windows or cr [default: detected]
//!   --full-line            newline: open a line below the cursor's line
//!   --backward             newline: with --full-line, open the line above
//!   --apply                Print the edited buffer instead of the column
//!   --json                 Print a JSON object
//!   -h, --help             Print help
//!   -V, --version          Print version

use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::process;

use libpyindent::{
    apply_edits, deindent_edit, filter_line, find_continuation_alignment, insertion_point,
    new_line_edits, resolve_new_line, Buffer, Continuation, LastCommand, LineEnding, NewLineOptions, Result,
    Selection, Settings, Span, TextBuffer,
};
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    NewLine,
    Align,
    Filter,
}

#[derive(Debug)]
struct Options {
    command: Command,
    input_path: Option<String>,
    offset: Option<usize>,
    settings: Settings,
    line_ending: Option<LineEnding>,
    new_line: NewLineOptions,
    apply: bool,
    json: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let options = parse_args(&args);

    let input = match read_input(options.input_path.as_deref()) {
        Ok(input) => input,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run(&options, input) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Parse the command line, exiting on `--help`, `--version` or a usage error.
fn parse_args(args: &[String]) -> Options {
    let mut command: Option<Command> = None;
    let mut input_path: Option<String> = None;
    let mut offset: Option<usize> = None;
    let mut config_path: Option<String> = None;
    let mut tab_size: Option<usize> = None;
    let mut max_lookback: Option<usize> = None;
    let mut line_ending: Option<LineEnding> = None;
    let mut new_line = NewLineOptions::default();
    let mut apply = false;
    let mut json = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                process::exit(0);
            }
            "-V" | "--version" => {
                println!("pyindent {}", env!("CARGO_PKG_VERSION"));
                process::exit(0);
            }
            "--offset" => {
                offset = Some(number_arg(args, &mut i));
            }
            "--tab-size" => {
                tab_size = Some(number_arg(args, &mut i));
            }
            "--max-lookback" => {
                max_lookback = Some(number_arg(args, &mut i));
            }
            "--config" => {
                config_path = Some(value_arg(args, &mut i).to_string());
            }
            "--line-endings" => {
                let value = value_arg(args, &mut i);
                match value.parse::<LineEnding>() {
                    Ok(ending) => line_ending = Some(ending),
                    Err(e) => usage_error(&e),
                }
            }
            "--full-line" => {
                new_line.full_line = true;
            }
            "--backward" => {
                new_line.forward = false;
            }
            "--apply" => {
                apply = true;
            }
            "--json" => {
                json = true;
            }
            "-" => {
                // Explicit stdin
            }
            arg if arg.starts_with('-') => {
                usage_error(&format!("Unknown option: {}", arg));
            }
            arg if command.is_none() => {
                command = Some(match arg {
                    "newline" => Command::NewLine,
                    "align" => Command::Align,
                    "filter" => Command::Filter,
                    other => usage_error(&format!("Unknown command: {}", other)),
                });
            }
            arg => {
                if input_path.is_some() {
                    usage_error("Multiple input paths not supported");
                }
                input_path = Some(arg.to_string());
            }
        }
        i += 1;
    }

    let Some(command) = command else {
        usage_error("Missing command (newline, align or filter)");
    };
    if apply && json {
        usage_error("--apply and --json are mutually exclusive");
    }

    let mut settings = match config_path {
        Some(path) => match Settings::load(Path::new(&path)) {
            Ok(settings) => settings,
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        },
        None => Settings::default(),
    };
    if let Some(tab_size) = tab_size {
        if tab_size == 0 {
            usage_error("--tab-size must be at least 1");
        }
        settings.tab_size = tab_size;
    }
    if let Some(max_lookback) = max_lookback {
        settings.max_lookback = max_lookback;
    }

    Options {
        command,
        input_path,
        offset,
        settings,
        line_ending,
        new_line,
        apply,
        json,
    }
}

fn value_arg<'a>(args: &'a [String], i: &mut usize) -> &'a str {
    let flag = &args[*i];
    *i += 1;
    match args.get(*i) {
        Some(value) => value.as_str(),
        None => usage_error(&format!("{} requires an argument", flag)),
    }
}

fn number_arg(args: &[String], i: &mut usize) -> usize {
    let flag = args[*i].clone();
    let value = value_arg(args, i);
    match value.parse() {
        Ok(n) => n,
        Err(_) => usage_error(&format!("{} expects a non-negative integer, got {}", flag, value)),
    }
}

fn usage_error(message: &str) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

fn read_input(path: Option<&str>) -> io::Result<String> {
    match path {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut input = String::new();
            io::stdin().read_to_string(&mut input)?;
            Ok(input)
        }
    }
}

fn run(options: &Options, input: String) -> Result<()> {
    if options.command == Command::Filter {
        let buffer = TextBuffer::new(input);
        let mut lines = buffer.lines();
        // A final line ending does not open another line.
        if let [rest @ .., last] = lines {
            if last.is_empty() {
                lines = rest;
            }
        }
        for &span in lines {
            println!("{}", filter_line(&buffer.slice(span)?));
        }
        return Ok(());
    }

    let ending = options
        .line_ending
        .unwrap_or_else(|| LineEnding::detect(&input));
    let buffer = TextBuffer::new(input);
    let cursor = options.offset.unwrap_or(buffer.len());

    match options.command {
        Command::NewLine => run_new_line(options, &buffer, cursor, ending),
        Command::Align => run_align(options, &buffer, cursor),
        Command::Filter => Ok(()),
    }
}

fn run_new_line(
    options: &Options,
    buffer: &TextBuffer,
    cursor: usize,
    ending: LineEnding,
) -> Result<()> {
    if options.apply {
        let edits = new_line_edits(
            buffer,
            &[Selection::cursor(cursor)],
            options.new_line,
            ending,
            &options.settings,
        );
        let (text, _) = apply_edits(buffer, &edits)?;
        print!("{}", text);
        return Ok(());
    }

    let at = insertion_point(buffer, Selection::cursor(cursor), options.new_line)?;
    let resolution = resolve_new_line(buffer, at, &options.settings)?;
    if options.json {
        let output = json!({
            "indent": resolution.columns,
            "decision": resolution.decision.to_string(),
            "current_indent": resolution.current_indent,
            "lines_inspected": resolution.lines_inspected,
        });
        println!("{}", output);
    } else {
        println!("{}", resolution.columns);
    }
    Ok(())
}

fn run_align(options: &Options, buffer: &TextBuffer, cursor: usize) -> Result<()> {
    let span = buffer.line_span(cursor)?;
    let prefix = buffer.slice(Span::new(span.start, cursor))?;
    let typed = prefix.chars().last().map(String::from).unwrap_or_default();

    if options.apply {
        let last = LastCommand::Insert { characters: typed };
        let edit = deindent_edit(buffer, Selection::cursor(cursor), &last, &options.settings)?;
        let (text, _) = apply_edits(buffer, edit.as_slice())?;
        print!("{}", text);
        return Ok(());
    }

    let continuation = Continuation::detect(&prefix, &typed);
    let indent = match continuation {
        Some(continuation) => {
            find_continuation_alignment(buffer, cursor, continuation, &options.settings)?
        }
        None => None,
    };

    if options.json {
        let output = json!({
            "keyword": continuation.map(Continuation::keyword),
            "indent": indent,
        });
        println!("{}", output);
    } else {
        match indent {
            Some(indent) => println!("{}", indent),
            None => println!("none"),
        }
    }
    Ok(())
}

fn print_help() {
    println!(
        "pyindent - PEP 8 indentation for Python source being typed

USAGE:
    pyindent <COMMAND> [OPTIONS] [FILE]

COMMANDS:
    newline    Print the indentation of a new line typed at the cursor
    align      Print the column a just-typed else/elif/except/finally aligns
               to, or 'none' when the line should be left alone
    filter     Print every line with strings masked and comments removed

ARGS:
    [FILE]     Input file (reads from stdin if not provided or '-')

OPTIONS:
    --offset <N>            Cursor byte offset [default: end of input]
    --tab-size <N>          Tab width in columns [default: 4]
    --max-lookback <N>      Maximum number of previous lines inspected
                            [default: 1000]
    --config <FILE>         Load tab_size and max_lookback from a TOML file
    --line-endings <STYLE>  unix, windows or cr [default: detected from input]
    --full-line             newline: open a line below the cursor's line
    --backward              newline: with --full-line, open the line above
    --apply                 Print the edited buffer instead of the column
    --json                  Print a JSON object instead of plain text
    -h, --help              Print help
    -V, --version           Print version

ENVIRONMENT:
    RUST_LOG                Log filter for diagnostics on stderr [default: warn]

EXAMPLES:
    printf 'def func():' | pyindent newline
    pyindent align --json script.py
    pyindent newline --apply --offset 120 script.py"
    );
}
