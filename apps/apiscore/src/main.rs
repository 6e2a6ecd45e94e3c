//! apiscore CLI binary entry point.
//! Delegates to the library for loading, scoring, gating, and reports.

use apiscore::analyzers::AnalysisOptions;
use apiscore::cli::{Cli, Commands};
use apiscore::config::{self, CliOverrides};
use apiscore::gate::{self, Verdict};
use apiscore::load;
use apiscore::models::ScoringResult;
use apiscore::output::{self, Scored};
use apiscore::report;
use apiscore::scoring::ScoringEngine;
use apiscore::utils::{error_prefix, info_prefix, note_prefix};
use clap::Parser;
use std::path::{Path, PathBuf};

fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .try_init();
}

fn fail(msg: impl std::fmt::Display, code: i32) -> ! {
    eprintln!("{} {}", error_prefix(), msg);
    std::process::exit(code);
}

fn has_glob_meta(s: &str) -> bool {
    s.contains(['*', '?', '['])
}

/// Expand glob patterns; plain paths pass through untouched so a missing
/// file surfaces as a load error later.
fn expand_inputs(inputs: &[String]) -> Result<Vec<PathBuf>, String> {
    let mut out = Vec::new();
    for input in inputs {
        if !has_glob_meta(input) {
            out.push(PathBuf::from(input));
            continue;
        }
        let paths = glob::glob(input).map_err(|e| format!("invalid pattern '{}': {}", input, e))?;
        let mut matched: Vec<PathBuf> = paths.filter_map(Result::ok).filter(|p| p.is_file()).collect();
        if matched.is_empty() {
            return Err(format!("no files match '{}'", input));
        }
        matched.sort();
        out.append(&mut matched);
    }
    out.dedup();
    Ok(out)
}

/// Path shown to the user, relative to the working directory when possible.
fn display_path(path: &Path) -> String {
    std::env::current_dir()
        .ok()
        .and_then(|cwd| {
            let abs = if path.is_absolute() {
                path.to_path_buf()
            } else {
                cwd.join(path)
            };
            pathdiff::diff_paths(abs, &cwd)
        })
        .unwrap_or_else(|| path.to_path_buf())
        .to_string_lossy()
        .to_string()
}

struct Scoreboard {
    source: String,
    title: String,
    result: ScoringResult,
    verdict: Verdict,
}

fn main() {
    init_logging();
    let cli = Cli::parse();
    match cli.cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Criteria { output } => {
            output::print_criteria(output.as_deref().unwrap_or("human"));
        }
        Commands::Validate { input, output } => {
            let output = output.unwrap_or_else(|| "human".to_string());
            let path = PathBuf::from(&input);
            match load::load_document(&path) {
                Ok(doc) => output::print_validation(&display_path(&path), &doc, &output),
                Err(e) => fail(e, 2),
            }
        }
        Commands::Score {
            inputs,
            root,
            output,
            report_dir,
            format,
            fail_below,
            severity_threshold,
            verbose,
            max_depth,
        } => {
            let eff = config::resolve_effective(&CliOverrides {
                root,
                output,
                fail_below,
                severity_threshold,
                verbose: if verbose { Some(true) } else { None },
                max_depth,
                report_dir,
                format,
            })
            .unwrap_or_else(|e| fail(e, 2));

            if eff.config_path.is_none() && eff.output == "human" {
                eprintln!("{} No apiscore.toml found; using defaults.", note_prefix());
            }

            let files = expand_inputs(&inputs).unwrap_or_else(|e| fail(e, 2));
            let engine = ScoringEngine::new(AnalysisOptions {
                max_schema_depth: eff.max_schema_depth,
            });

            let mut board = Vec::with_capacity(files.len());
            let mut load_failed = false;
            for path in &files {
                let source = display_path(path);
                let doc = match load::load_document(path) {
                    Ok(doc) => doc,
                    Err(e) => {
                        eprintln!("{} {}: {}", error_prefix(), source, e);
                        load_failed = true;
                        continue;
                    }
                };
                let result = engine.score(&doc);
                let verdict = gate::evaluate(&result, eff.fail_below);
                let title = doc.title().to_string();

                if let Some(dir) = eff.report_dir.as_ref() {
                    match report::export(&result, &eff.report_formats, dir, &title) {
                        Ok(written) => {
                            if eff.output == "human" {
                                for p in written {
                                    eprintln!("{} report written: {}", info_prefix(), display_path(&p));
                                }
                            }
                        }
                        Err(e) => fail(e, 2),
                    }
                }
                board.push(Scoreboard { source, title, result, verdict });
            }

            let items: Vec<Scored<'_>> = board
                .iter()
                .map(|b| Scored {
                    source: &b.source,
                    title: &b.title,
                    result: &b.result,
                    verdict: &b.verdict,
                })
                .collect();
            output::print_scores(&items, &eff.output, eff.verbose, eff.severity_threshold);

            if load_failed {
                std::process::exit(2);
            }
            if board.iter().any(|b| !b.verdict.passed()) {
                std::process::exit(1);
            }
        }
    }
}
