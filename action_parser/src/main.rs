use action_parser::batch::{self, BatchConfig, BatchResults};
use action_parser::config::RuntimeConfig;
use action_parser::file_processor::FileProcessor;
use action_parser::logging::{self, codes};
use action_parser::{Action, ActionGrammar};
use std::env;
use std::path::{Path, PathBuf};
use std::process;

const EXIT_SUCCESS: i32 = 0;
const EXIT_PARSE_FAILURE: i32 = 1;
const EXIT_USAGE: i32 = 2;

/// How parsed actions are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum OutputFormat {
    #[default]
    Canonical,
    Json,
    Tree,
}

#[derive(Debug, Default)]
struct CliOptions {
    actions: Vec<String>,
    file: Option<PathBuf>,
    config: Option<PathBuf>,
    format: OutputFormat,
    threads: Option<usize>,
    fail_fast: bool,
    quiet: bool,
    show_help: bool,
    show_version: bool,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
enum UsageError {
    #[error("{option} requires a value")]
    MissingValue { option: String },

    #[error("invalid value '{value}' for {option}")]
    InvalidNumber { option: String, value: String },

    #[error("unknown option '{0}'")]
    UnknownOption(String),

    #[error("--json and --tree cannot be combined")]
    ConflictingFormats,

    #[error("no action or --file given")]
    NothingToDo,
}

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();

    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(error) => {
            eprintln!("error: {}", error);
            eprintln!("Try 'action_parser --help' for usage.");
            process::exit(EXIT_USAGE);
        }
    };

    if options.show_help {
        print_help();
        return;
    }
    if options.show_version {
        println!("action_parser {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    process::exit(run(&options));
}

fn print_help() {
    println!("action_parser v{}", env!("CARGO_PKG_VERSION"));
    println!("Parse state-machine action expressions");
    println!();
    println!("USAGE:");
    println!("    action_parser [OPTIONS] <ACTION>...       # Parse each action");
    println!("    action_parser [OPTIONS] --file <PATH>     # Validate an action file");
    println!();
    println!("OPTIONS:");
    println!("    --file <PATH>       Validate one action per line (blank and '#' lines skipped)");
    println!("    --config <PATH>     Load runtime preferences from a TOML file");
    println!("    --json              Print parsed actions as JSON");
    println!("    --tree              Print parsed actions as a debug tree");
    println!("    --threads N         Worker threads for --file (default: 1)");
    println!("    --fail-fast         Stop --file validation at the first failure");
    println!("    --quiet             Print failures only");
    println!("    --help              Show this help message");
    println!("    --version           Show version");
    println!();
    println!("EXIT STATUS:");
    println!("    0 every action parsed, 1 a parse failure, 2 usage or I/O error");
    println!();
    println!("EXAMPLES:");
    println!("    action_parser \"x := f (a, 16#0304#)\"");
    println!("    action_parser --json \"Chan'Write (c, v)\"");
    println!("    action_parser --file model.actions --threads 4 --fail-fast");
}

fn parse_args(args: &[String]) -> Result<CliOptions, UsageError> {
    let mut options = CliOptions::default();
    let mut format_flags = 0;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => options.show_help = true,
            "--version" | "-V" => options.show_version = true,
            "--json" => {
                options.format = OutputFormat::Json;
                format_flags += 1;
            }
            "--tree" => {
                options.format = OutputFormat::Tree;
                format_flags += 1;
            }
            "--fail-fast" => options.fail_fast = true,
            "--quiet" | "-q" => options.quiet = true,
            "--file" => {
                options.file = Some(PathBuf::from(option_value(args, i)?));
                i += 1;
            }
            "--config" => {
                options.config = Some(PathBuf::from(option_value(args, i)?));
                i += 1;
            }
            "--threads" => {
                let value = option_value(args, i)?;
                let threads = value
                    .parse::<usize>()
                    .ok()
                    .filter(|threads| *threads > 0)
                    .ok_or_else(|| UsageError::InvalidNumber {
                        option: "--threads".to_string(),
                        value: value.to_string(),
                    })?;
                options.threads = Some(threads);
                i += 1;
            }
            "--" => {
                options.actions.extend(args[i + 1..].iter().cloned());
                break;
            }
            other if other.starts_with('-') => {
                return Err(UsageError::UnknownOption(other.to_string()));
            }
            action => options.actions.push(action.to_string()),
        }
        i += 1;
    }

    if options.show_help || options.show_version {
        return Ok(options);
    }
    if format_flags > 1 {
        return Err(UsageError::ConflictingFormats);
    }
    if options.actions.is_empty() && options.file.is_none() {
        return Err(UsageError::NothingToDo);
    }

    Ok(options)
}

fn option_value<'a>(args: &'a [String], index: usize) -> Result<&'a str, UsageError> {
    args.get(index + 1)
        .map(String::as_str)
        .ok_or_else(|| UsageError::MissingValue {
            option: args[index].clone(),
        })
}

fn run(options: &CliOptions) -> i32 {
    let runtime = match &options.config {
        Some(path) => match RuntimeConfig::load_from_file(path) {
            Ok(runtime) => runtime,
            Err(error) => {
                logging::safe_log_error(codes::system::CONFIGURATION_ERROR, &error.to_string());
                return EXIT_USAGE;
            }
        },
        None => RuntimeConfig::default(),
    };

    if let Err(error) = logging::config::init_runtime_preferences(runtime.logging.clone()) {
        logging::safe_log_error(codes::system::CONFIGURATION_ERROR, &error);
        return EXIT_USAGE;
    }
    if let Err(error) = logging::init_global_logging() {
        logging::safe_log_error(codes::system::INITIALIZATION_FAILURE, &error);
        return EXIT_USAGE;
    }

    let grammar =
        ActionGrammar::new().with_preferences(runtime.parser.clone(), runtime.lexical.clone());

    let mut status = EXIT_SUCCESS;
    for text in &options.actions {
        status = status.max(parse_and_print(&grammar, text, options.format));
    }

    if let Some(path) = &options.file {
        let mut config = BatchConfig::from(&runtime.batch);
        if let Some(threads) = options.threads {
            config.max_threads = threads;
        }
        config.fail_fast |= options.fail_fast;
        config.progress_reporting &= !options.quiet;

        status = status.max(validate_file(&grammar, path, &config, options.quiet));
    }

    status
}

fn parse_and_print(grammar: &ActionGrammar, text: &str, format: OutputFormat) -> i32 {
    match grammar.parse(text) {
        Ok(action) => match render(&action, format) {
            Ok(rendered) => {
                println!("{}", rendered);
                EXIT_SUCCESS
            }
            Err(error) => {
                eprintln!("error: failed to serialize action: {}", error);
                EXIT_USAGE
            }
        },
        Err(error) => {
            eprintln!("{}", error.format_with_source(text));
            EXIT_PARSE_FAILURE
        }
    }
}

fn render(action: &Action, format: OutputFormat) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Canonical => Ok(action.to_string()),
        OutputFormat::Json => serde_json::to_string_pretty(action),
        OutputFormat::Tree => Ok(format!("{:#?}", action)),
    }
}

fn validate_file(grammar: &ActionGrammar, path: &Path, config: &BatchConfig, quiet: bool) -> i32 {
    let file = match FileProcessor::new()
        .with_performance_logging(!quiet)
        .process_file(path)
    {
        Ok(file) => file,
        Err(error) => {
            eprintln!("error: {}", error);
            return EXIT_USAGE;
        }
    };

    let results = match batch::validate_actions_with_grammar(&file, config, grammar) {
        Ok(results) => results,
        Err(error) => {
            eprintln!("error: {}", error);
            return EXIT_USAGE;
        }
    };

    if !quiet {
        print_batch_results(file.path(), &results);
    }

    match results.first_failure() {
        Some(first) => {
            eprintln!("{}", first.report(file.path()));
            for failure in results.failures.iter().skip(1) {
                eprintln!("{}:{}: {}", file.path().display(), failure.line, failure.error);
            }
            EXIT_PARSE_FAILURE
        }
        None => EXIT_SUCCESS,
    }
}

fn print_batch_results(origin: &Path, results: &BatchResults) {
    println!("{}", origin.display());
    println!("  {}", results.summary());
    println!(
        "  Started: {}",
        results.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    );

    let summary = logging::get_processing_summary();
    if summary.total_warnings > 0 {
        println!("  Warnings logged: {}", summary.total_warnings);
    }
}
