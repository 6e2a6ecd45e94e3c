//! CLI argument parsing via `clap`.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "apiscore",
    version,
    about = "Score OpenAPI 3.x documents for quality",
    long_about = "apiscore — analyze an OpenAPI 3.x document across seven weighted criteria and report a 0-100 score, a letter grade, and actionable issues.\n\nConfiguration precedence: CLI > apiscore.toml > defaults.",
    after_help = "Examples:\n  apiscore score openapi.yaml\n  apiscore score 'specs/**/*.json' --output json --fail-below 80\n  apiscore score api.yaml --report-dir reports --format all\n  apiscore validate api.yaml",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
/// Supported subcommands for scoring and inspecting documents.
pub enum Commands {
    /// Show version
    #[command(about = "Show version", long_about = "Print the current apiscore version.")]
    Version,
    /// Score one or more documents
    #[command(
        about = "Score OpenAPI documents",
        long_about = "Run every analyzer over each input and print the score, grade, and per-criterion breakdown. Exits 1 when any input fails the quality gate.",
        after_help = "Examples:\n  apiscore score api.yaml --verbose --severity-threshold high\n  apiscore score a.json b.yaml --output json"
    )]
    Score {
        #[arg(required = true, help = "Files or glob patterns (JSON or YAML)")]
        inputs: Vec<String>,
        #[arg(long, help = "Project root used for config discovery (default: current dir)")]
        root: Option<String>,
        #[arg(long, help = "Output mode: human|json|markdown (default: human)")]
        output: Option<String>,
        #[arg(long, help = "Write report files into this directory")]
        report_dir: Option<String>,
        #[arg(long, help = "Report formats: json|markdown|html|all, comma-separated (default: all)")]
        format: Option<String>,
        #[arg(long, value_parser = clap::value_parser!(u32).range(0..=100), help = "Fail when the score is below N")]
        fail_below: Option<u32>,
        #[arg(long, help = "Lowest severity listed with --verbose: low|medium|high|critical")]
        severity_threshold: Option<String>,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "List issues under each criterion")]
        verbose: bool,
        #[arg(long, help = "Maximum schema nesting depth to traverse (default: 64)")]
        max_depth: Option<usize>,
    },
    /// Load and validate a document without scoring
    #[command(
        about = "Validate a document",
        long_about = "Parse the input, check the OpenAPI 3.x structure and local $ref targets, and print a short overview."
    )]
    Validate {
        #[arg(help = "File to validate (JSON or YAML)")]
        input: String,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
    },
    /// List scoring criteria
    #[command(
        about = "List criteria",
        long_about = "Print the seven scoring criteria with their weights and maximum scores."
    )]
    Criteria {
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
    },
}
