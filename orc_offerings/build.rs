// build.rs - TOML-driven compile-time limit generation
use std::env;
use std::fs;
use std::path::Path;

#[derive(serde::Deserialize)]
struct CompileTimeConfig {
    description: DescriptionLimits,
    accumulator: AccumulatorLimits,
    corrections: CorrectionLimits,
    batch_processing: BatchProcessingLimits,
    logging: LoggingLimits,
}

#[derive(serde::Deserialize)]
struct DescriptionLimits {
    max_tokens_per_description: usize,
    max_compound_depth: usize,
    max_topic_fragments: usize,
    max_topic_scan_depth: usize,
}

#[derive(serde::Deserialize)]
struct AccumulatorLimits {
    max_terms_per_group: usize,
    max_hours_per_group: usize,
}

#[derive(serde::Deserialize)]
struct CorrectionLimits {
    max_correction_rules: usize,
}

#[derive(serde::Deserialize)]
struct BatchProcessingLimits {
    max_worker_threads: usize,
    max_courses_per_batch: usize,
}

#[derive(serde::Deserialize)]
struct LoggingLimits {
    log_buffer_size: usize,
    max_log_message_length: usize,
    max_log_events_per_course: usize,
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=ORC_BUILD_PROFILE");
    println!("cargo:rerun-if-env-changed=ORC_CONFIG_DIR");

    let profile = env::var("ORC_BUILD_PROFILE").unwrap_or_else(|_| "development".to_string());
    let config_dir = env::var("ORC_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

    // Find workspace root (parent of orc_offerings directory)
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let workspace_root = Path::new(&manifest_dir)
        .parent()
        .expect("Could not find workspace root (parent directory)");

    let config_path = workspace_root
        .join(&config_dir)
        .join(format!("{}.toml", profile));

    println!("cargo:rerun-if-changed={}", config_path.display());

    if !config_path.exists() {
        panic!(
            "Configuration file not found: {}\nWorkspace root: {}\nLooking for: {}/{}/{}.toml",
            config_path.display(),
            workspace_root.display(),
            workspace_root.display(),
            config_dir,
            profile
        );
    }

    let config_content = fs::read_to_string(&config_path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", config_path.display(), e));

    let config: CompileTimeConfig = toml::from_str(&config_content)
        .unwrap_or_else(|e| panic!("Invalid TOML in {}: {}", config_path.display(), e));

    validate_limits(&config, &profile);
    generate_constants(&config, &profile);
}

fn validate_limits(config: &CompileTimeConfig, profile: &str) {
    const ABSOLUTE_MAX_TOKENS: usize = 10_000;
    const ABSOLUTE_MAX_WORKERS: usize = 64;

    if config.description.max_tokens_per_description == 0
        || config.description.max_tokens_per_description > ABSOLUTE_MAX_TOKENS
    {
        panic!("LIMITS: max_tokens_per_description must be in 1..={}", ABSOLUTE_MAX_TOKENS);
    }

    if config.description.max_compound_depth == 0 {
        panic!("LIMITS: max_compound_depth must be at least 1");
    }

    // Topic fragments are scanned with nested scanning disabled
    if config.description.max_topic_scan_depth != 1 {
        panic!("LIMITS: max_topic_scan_depth must be 1");
    }

    if config.accumulator.max_terms_per_group == 0 || config.accumulator.max_hours_per_group == 0 {
        panic!("LIMITS: accumulator caps cannot be zero");
    }

    if config.corrections.max_correction_rules == 0 {
        panic!("LIMITS: max_correction_rules cannot be zero");
    }

    if config.batch_processing.max_worker_threads == 0
        || config.batch_processing.max_worker_threads > ABSOLUTE_MAX_WORKERS
    {
        panic!("LIMITS: max_worker_threads must be in 1..={}", ABSOLUTE_MAX_WORKERS);
    }

    if config.logging.max_log_events_per_course > config.logging.log_buffer_size {
        panic!("LIMITS: max_log_events_per_course exceeds log_buffer_size");
    }

    if profile == "production" && config.description.max_tokens_per_description > 1_000 {
        panic!("PRODUCTION: max_tokens_per_description too high for production");
    }
}

fn generate_constants(config: &CompileTimeConfig, profile: &str) {
    let out_dir = env::var("OUT_DIR").unwrap();
    let output_path = Path::new(&out_dir).join("constants.rs");

    let constants_code = format!(
        r#"
// Generated compile-time constants from TOML configuration
// Profile: {}
// DO NOT EDIT - Generated by build.rs

pub mod compile_time {{
    pub mod description {{
        pub const MAX_TOKENS_PER_DESCRIPTION: usize = {};
        pub const MAX_COMPOUND_DEPTH: usize = {};
        pub const MAX_TOPIC_FRAGMENTS: usize = {};
        pub const MAX_TOPIC_SCAN_DEPTH: usize = {};
    }}

    pub mod accumulator {{
        pub const MAX_TERMS_PER_GROUP: usize = {};
        pub const MAX_HOURS_PER_GROUP: usize = {};
    }}

    pub mod corrections {{
        pub const MAX_CORRECTION_RULES: usize = {};
    }}

    pub mod batch_processing {{
        pub const MAX_WORKER_THREADS: usize = {};
        pub const MAX_COURSES_PER_BATCH: usize = {};
    }}

    pub mod logging {{
        pub const LOG_BUFFER_SIZE: usize = {};
        pub const MAX_LOG_MESSAGE_LENGTH: usize = {};
        pub const MAX_LOG_EVENTS_PER_COURSE: usize = {};
    }}
}}
"#,
        profile,
        // Description
        config.description.max_tokens_per_description,
        config.description.max_compound_depth,
        config.description.max_topic_fragments,
        config.description.max_topic_scan_depth,
        // Accumulator
        config.accumulator.max_terms_per_group,
        config.accumulator.max_hours_per_group,
        // Corrections
        config.corrections.max_correction_rules,
        // Batch Processing
        config.batch_processing.max_worker_threads,
        config.batch_processing.max_courses_per_batch,
        // Logging
        config.logging.log_buffer_size,
        config.logging.max_log_message_length,
        config.logging.max_log_events_per_course,
    );

    fs::write(output_path, constants_code).unwrap();
}
