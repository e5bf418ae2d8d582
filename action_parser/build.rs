// build.rs - compile-time limits generated from config/<profile>.toml
use std::env;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(serde::Deserialize)]
struct CompileTimeConfig {
    file_processing: FileProcessingLimits,
    lexical: LexicalLimits,
    syntax: SyntaxLimits,
    batch: BatchLimits,
    logging: LoggingLimits,
}

#[derive(serde::Deserialize)]
struct FileProcessingLimits {
    max_file_size: u64,
    max_actions_per_file: usize,
}

#[derive(serde::Deserialize)]
struct LexicalLimits {
    max_action_length: usize,
    max_string_size: usize,
    max_identifier_length: usize,
    max_number_digits: usize,
    max_token_count: usize,
}

#[derive(serde::Deserialize)]
struct SyntaxLimits {
    max_parse_depth: usize,
    max_context_stack_depth: usize,
    max_lookahead_tokens: usize,
}

#[derive(serde::Deserialize)]
struct BatchLimits {
    max_worker_threads: usize,
    max_chunk_size: usize,
}

#[derive(serde::Deserialize)]
struct LoggingLimits {
    max_error_collection: usize,
    log_buffer_size: usize,
    max_log_message_length: usize,
    max_log_events_per_source: usize,
    security_min_log_level: u8,
}

/// Hard ceilings no profile may exceed
const ABSOLUTE_MAX_FILE_SIZE: u64 = 1_000_000_000;
const ABSOLUTE_MAX_PARSE_DEPTH: usize = 4096;
const ABSOLUTE_MAX_NUMBER_DIGITS: usize = 100_000;

/// Tighter ceilings for the production profile
const PRODUCTION_MAX_FILE_SIZE: u64 = 50_000_000;
const PRODUCTION_MAX_PARSE_DEPTH: usize = 512;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=ACTION_BUILD_PROFILE");
    println!("cargo:rerun-if-env-changed=ACTION_CONFIG_DIR");

    let profile = env::var("ACTION_BUILD_PROFILE").unwrap_or_else(|_| "development".to_string());
    let config_path = profile_path(&profile);
    println!("cargo:rerun-if-changed={}", config_path.display());

    let content = fs::read_to_string(&config_path).unwrap_or_else(|e| {
        panic!(
            "cannot read build profile {}: {} (set ACTION_BUILD_PROFILE or ACTION_CONFIG_DIR)",
            config_path.display(),
            e
        )
    });
    let config: CompileTimeConfig = toml::from_str(&content)
        .unwrap_or_else(|e| panic!("invalid TOML in {}: {}", config_path.display(), e));

    let violations = check_limits(&config, &profile);
    if !violations.is_empty() {
        panic!(
            "{} rejected:\n  {}",
            config_path.display(),
            violations.join("\n  ")
        );
    }

    let out_dir = env::var("OUT_DIR").expect("cargo sets OUT_DIR for build scripts");
    fs::write(
        Path::new(&out_dir).join("constants.rs"),
        render_constants(&config, &profile),
    )
    .expect("write generated constants");
}

/// `<workspace>/<ACTION_CONFIG_DIR or "config">/<profile>.toml`
fn profile_path(profile: &str) -> PathBuf {
    let config_dir = env::var("ACTION_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").expect("cargo sets CARGO_MANIFEST_DIR");
    let workspace_root = Path::new(&manifest_dir)
        .parent()
        .expect("crate lives inside the workspace directory");

    workspace_root
        .join(config_dir)
        .join(format!("{}.toml", profile))
}

fn check_limits(config: &CompileTimeConfig, profile: &str) -> Vec<String> {
    let mut violations = Vec::new();
    let mut require = |ok: bool, message: String| {
        if !ok {
            violations.push(message);
        }
    };

    let file_size = config.file_processing.max_file_size;
    let depth = config.syntax.max_parse_depth;

    require(
        file_size <= ABSOLUTE_MAX_FILE_SIZE,
        format!("max_file_size {} exceeds {}", file_size, ABSOLUTE_MAX_FILE_SIZE),
    );
    // Each nesting level costs a few stack frames in the recursive descent
    require(
        (1..=ABSOLUTE_MAX_PARSE_DEPTH).contains(&depth),
        format!("max_parse_depth {} outside 1..={}", depth, ABSOLUTE_MAX_PARSE_DEPTH),
    );
    require(
        config.lexical.max_number_digits <= ABSOLUTE_MAX_NUMBER_DIGITS,
        format!(
            "max_number_digits {} exceeds {}",
            config.lexical.max_number_digits, ABSOLUTE_MAX_NUMBER_DIGITS
        ),
    );
    require(
        config.lexical.max_string_size <= config.lexical.max_action_length,
        "max_string_size cannot exceed max_action_length".to_string(),
    );
    require(
        config.batch.max_worker_threads > 0 && config.batch.max_chunk_size > 0,
        "batch limits must be non-zero".to_string(),
    );
    require(
        config.logging.security_min_log_level <= 2,
        "security_min_log_level must be at most 2 (info)".to_string(),
    );

    if profile == "production" {
        require(
            file_size <= PRODUCTION_MAX_FILE_SIZE,
            format!("production max_file_size must be at most {}", PRODUCTION_MAX_FILE_SIZE),
        );
        require(
            depth <= PRODUCTION_MAX_PARSE_DEPTH,
            format!("production max_parse_depth must be at most {}", PRODUCTION_MAX_PARSE_DEPTH),
        );
    }

    violations
}

fn render_constants(config: &CompileTimeConfig, profile: &str) -> String {
    let file = &config.file_processing;
    let lexical = &config.lexical;
    let syntax = &config.syntax;
    let batch = &config.batch;
    let logging = &config.logging;

    let sections: [(&str, Vec<(&str, &str, String)>); 5] = [
        (
            "file_processing",
            vec![
                ("MAX_FILE_SIZE", "u64", file.max_file_size.to_string()),
                ("MAX_ACTIONS_PER_FILE", "usize", file.max_actions_per_file.to_string()),
            ],
        ),
        (
            "lexical",
            vec![
                ("MAX_ACTION_LENGTH", "usize", lexical.max_action_length.to_string()),
                ("MAX_STRING_SIZE", "usize", lexical.max_string_size.to_string()),
                ("MAX_IDENTIFIER_LENGTH", "usize", lexical.max_identifier_length.to_string()),
                ("MAX_NUMBER_DIGITS", "usize", lexical.max_number_digits.to_string()),
                ("MAX_TOKEN_COUNT", "usize", lexical.max_token_count.to_string()),
            ],
        ),
        (
            "syntax",
            vec![
                ("MAX_PARSE_DEPTH", "usize", syntax.max_parse_depth.to_string()),
                ("MAX_CONTEXT_STACK_DEPTH", "usize", syntax.max_context_stack_depth.to_string()),
                ("MAX_LOOKAHEAD_TOKENS", "usize", syntax.max_lookahead_tokens.to_string()),
            ],
        ),
        (
            "batch",
            vec![
                ("MAX_WORKER_THREADS", "usize", batch.max_worker_threads.to_string()),
                ("MAX_CHUNK_SIZE", "usize", batch.max_chunk_size.to_string()),
            ],
        ),
        (
            "logging",
            vec![
                ("MAX_ERROR_COLLECTION", "usize", logging.max_error_collection.to_string()),
                ("LOG_BUFFER_SIZE", "usize", logging.log_buffer_size.to_string()),
                ("MAX_LOG_MESSAGE_LENGTH", "usize", logging.max_log_message_length.to_string()),
                ("MAX_LOG_EVENTS_PER_SOURCE", "usize", logging.max_log_events_per_source.to_string()),
                ("SECURITY_MIN_LOG_LEVEL", "u8", logging.security_min_log_level.to_string()),
            ],
        ),
    ];

    let mut out = String::new();
    let _ = writeln!(out, "// Generated by build.rs from the '{}' profile. Do not edit.", profile);
    out.push_str("pub mod compile_time {\n");
    let _ = writeln!(out, "    pub const PROFILE: &str = {:?};", profile);
    for (module, constants) in &sections {
        let _ = writeln!(out, "\n    pub mod {} {{", module);
        for (name, ty, value) in constants {
            let _ = writeln!(out, "        pub const {}: {} = {};", name, ty, value);
        }
        out.push_str("    }\n");
    }
    out.push_str("}\n");
    out
}
