//! Configuration discovery and effective settings resolution.
//!
//! apiscore reads `apiscore.toml|yaml|yml` from the project root (the closest
//! ancestor holding a config file or a `.git` directory) and merges it with
//! CLI flags to produce an `Effective` config.
//! Defaults:
//! - `output`: `human`
//! - `fail_below`: unset (only the fixed minimum score and critical-issue
//!   rules apply)
//! - `severity_threshold`: `low`
//! - `verbose`: false
//! - `max_schema_depth`: 64
//! - `report.dir`: unset (no files written); `report.formats`: `all`
//!
//! Overrides precedence: CLI > config file > defaults.

use crate::analyzers::DEFAULT_MAX_SCHEMA_DEPTH;
use crate::error::ConfigError;
use crate::models::Severity;
use crate::report::ReportFormat;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Config file names, in lookup order.
pub const CONFIG_FILES: [&str; 3] = ["apiscore.toml", "apiscore.yaml", "apiscore.yml"];
pub const OUTPUT_MODES: [&str; 3] = ["human", "json", "markdown"];

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
/// `formats = "json,html"` and `formats = ["json", "html"]` are both accepted.
pub enum FormatList {
    One(String),
    Many(Vec<String>),
}

impl FormatList {
    fn joined(&self) -> String {
        match self {
            FormatList::One(s) => s.clone(),
            FormatList::Many(v) => v.join(","),
        }
    }
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Report section under `[report]`.
pub struct ReportCfg {
    pub dir: Option<String>,
    pub formats: Option<FormatList>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Root configuration loaded from `apiscore.toml|yaml`.
pub struct ApiscoreConfig {
    pub output: Option<String>,
    pub fail_below: Option<u32>,
    pub severity_threshold: Option<String>,
    pub verbose: Option<bool>,
    pub max_schema_depth: Option<usize>,
    #[serde(default)]
    pub report: Option<ReportCfg>,
}

/// Flag values collected from the command line; `None` defers to the
/// config file.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub root: Option<String>,
    pub output: Option<String>,
    pub fail_below: Option<u32>,
    pub severity_threshold: Option<String>,
    pub verbose: Option<bool>,
    pub max_depth: Option<usize>,
    pub report_dir: Option<String>,
    pub format: Option<String>,
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by commands after applying precedence.
pub struct Effective {
    pub root: PathBuf,
    pub config_path: Option<PathBuf>,
    pub output: String,
    pub fail_below: Option<u32>,
    pub severity_threshold: Severity,
    pub verbose: bool,
    pub max_schema_depth: usize,
    pub report_dir: Option<PathBuf>,
    pub report_formats: Vec<ReportFormat>,
}

/// Walk upward from `start` to detect the project root.
///
/// Stops when an `apiscore.toml|yaml|yml` or a `.git` directory is found.
pub fn detect_root(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if CONFIG_FILES.iter().any(|f| cur.join(f).is_file()) || cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start.to_path_buf(),
        }
    }
}

pub fn find_config(root: &Path) -> Option<PathBuf> {
    CONFIG_FILES.iter().map(|f| root.join(f)).find(|p| p.is_file())
}

/// Load the config at `root` if one exists. A present but unreadable or
/// malformed file is an error rather than a silent default.
pub fn load_config(root: &Path) -> Result<Option<(PathBuf, ApiscoreConfig)>, ConfigError> {
    let Some(path) = find_config(root) else {
        return Ok(None);
    };
    let text = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    let is_toml = path.extension().is_some_and(|e| e == "toml");
    let parsed = if is_toml {
        toml::from_str::<ApiscoreConfig>(&text).map_err(|e| e.to_string())
    } else {
        serde_yaml::from_str::<ApiscoreConfig>(&text).map_err(|e| e.to_string())
    };
    let cfg = parsed.map_err(|message| ConfigError::Parse {
        path: path.clone(),
        message,
    })?;
    debug!(path = %path.display(), "loaded config");
    Ok(Some((path, cfg)))
}

/// Resolve `Effective` by merging CLI flags, discovered config, and defaults.
pub fn resolve_effective(cli: &CliOverrides) -> Result<Effective, ConfigError> {
    let start = PathBuf::from(cli.root.as_deref().unwrap_or("."));
    let root = detect_root(&start);
    let (config_path, cfg) = match load_config(&root)? {
        Some((path, cfg)) => (Some(path), cfg),
        None => (None, ApiscoreConfig::default()),
    };

    let output = cli
        .output
        .clone()
        .or(cfg.output)
        .unwrap_or_else(|| "human".to_string())
        .to_ascii_lowercase();
    if !OUTPUT_MODES.contains(&output.as_str()) {
        return Err(ConfigError::Invalid(format!(
            "output '{}' (expected human|json|markdown)",
            output
        )));
    }

    let fail_below = cli.fail_below.or(cfg.fail_below);
    if let Some(n) = fail_below.filter(|n| *n > 100) {
        return Err(ConfigError::Invalid(format!(
            "fail_below {} is outside 0..=100",
            n
        )));
    }

    let severity_threshold = match cli.severity_threshold.clone().or(cfg.severity_threshold) {
        Some(s) => s.parse::<Severity>().map_err(ConfigError::Invalid)?,
        None => Severity::Low,
    };

    let verbose = cli.verbose.or(cfg.verbose).unwrap_or(false);
    let max_schema_depth = cli
        .max_depth
        .or(cfg.max_schema_depth)
        .unwrap_or(DEFAULT_MAX_SCHEMA_DEPTH);

    let report_cfg = cfg.report.unwrap_or_default();
    // Config-relative dirs resolve against the root; CLI dirs stay as given.
    let report_dir = match cli.report_dir.as_ref() {
        Some(d) => Some(PathBuf::from(d)),
        None => report_cfg.dir.map(|d| root.join(d)),
    };
    let formats = cli
        .format
        .clone()
        .or_else(|| report_cfg.formats.as_ref().map(FormatList::joined))
        .unwrap_or_else(|| "all".to_string());
    let report_formats =
        ReportFormat::parse_list(&formats).map_err(|e| ConfigError::Invalid(e.to_string()))?;

    Ok(Effective {
        root,
        config_path,
        output,
        fail_below,
        severity_threshold,
        verbose,
        max_schema_depth,
        report_dir,
        report_formats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn at(root: &Path) -> CliOverrides {
        CliOverrides {
            root: root.to_str().map(str::to_string),
            ..CliOverrides::default()
        }
    }

    #[test]
    fn test_detect_and_load_toml() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let mut f = fs::File::create(root.join("apiscore.toml")).unwrap();
        writeln!(
            f,
            "{}",
            r#"
output = "json"
fail_below = 75
severity_threshold = "high"
max_schema_depth = 12
[report]
dir = "out"
formats = ["markdown", "html"]
    "#
        )
        .unwrap();

        // Resolve from a nested dir to exercise the upward walk
        let nested = root.join("specs/v1");
        fs::create_dir_all(&nested).unwrap();
        let eff = resolve_effective(&at(&nested)).unwrap();
        assert_eq!(eff.root, root);
        assert_eq!(eff.output, "json");
        assert_eq!(eff.fail_below, Some(75));
        assert_eq!(eff.severity_threshold, Severity::High);
        assert_eq!(eff.max_schema_depth, 12);
        assert_eq!(eff.report_dir, Some(root.join("out")));
        assert_eq!(
            eff.report_formats,
            vec![ReportFormat::Markdown, ReportFormat::Html]
        );
    }

    #[test]
    fn test_load_yaml_and_defaults() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("apiscore.yaml"), "verbose: true\nreport:\n  formats: json\n").unwrap();

        let eff = resolve_effective(&at(root)).unwrap();
        assert!(eff.verbose);
        assert_eq!(eff.output, "human");
        assert_eq!(eff.fail_below, None);
        assert_eq!(eff.severity_threshold, Severity::Low);
        assert_eq!(eff.max_schema_depth, DEFAULT_MAX_SCHEMA_DEPTH);
        assert_eq!(eff.report_dir, None);
        assert_eq!(eff.report_formats, vec![ReportFormat::Json]);
    }

    #[test]
    fn test_cli_precedence() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(
            root.join("apiscore.toml"),
            "output = \"json\"\nfail_below = 90\nverbose = true\n[report]\ndir = \"cfg-out\"\n",
        )
        .unwrap();

        let cli = CliOverrides {
            output: Some("markdown".into()),
            fail_below: Some(50),
            verbose: Some(false),
            report_dir: Some("cli-out".into()),
            format: Some("html".into()),
            ..at(root)
        };
        let eff = resolve_effective(&cli).unwrap();
        assert_eq!(eff.output, "markdown");
        assert_eq!(eff.fail_below, Some(50));
        assert!(!eff.verbose);
        assert_eq!(eff.report_dir, Some(PathBuf::from("cli-out")));
        assert_eq!(eff.report_formats, vec![ReportFormat::Html]);
    }

    #[test]
    fn test_invalid_values_are_errors() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir(root.join(".git")).unwrap();

        let bad_output = CliOverrides { output: Some("xml".into()), ..at(root) };
        assert!(matches!(resolve_effective(&bad_output), Err(ConfigError::Invalid(_))));
        let bad_gate = CliOverrides { fail_below: Some(101), ..at(root) };
        assert!(matches!(resolve_effective(&bad_gate), Err(ConfigError::Invalid(_))));
        let bad_sev = CliOverrides { severity_threshold: Some("urgent".into()), ..at(root) };
        assert!(matches!(resolve_effective(&bad_sev), Err(ConfigError::Invalid(_))));

        fs::write(root.join("apiscore.toml"), "fail_below = \"high\"").unwrap();
        assert!(matches!(resolve_effective(&at(root)), Err(ConfigError::Parse { .. })));
    }
}
