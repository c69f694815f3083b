//! Command-line arguments and the validation run.

use crate::output::{self, ConsoleDestination};
use anyhow::{Context, Result};
use autolint_validator::{
    AutoloadValidator, ComposerManifest, Destination, Severity, TracingDestination,
    ValidationOptions, parse_severity_remap,
};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};

/// Exit code when the report fails.
pub const EXIT_VIOLATIONS: u8 = 1;

/// Exit code when validation could not run.
pub const EXIT_ERROR: u8 = 2;

/// Autolint - checks that Composer autoload declarations match the sources
///
/// Reads composer.json, scans every declared path and reports classes that
/// Composer's autoloader would not find where they are declared.
#[derive(Parser, Debug)]
#[command(name = "autolint")]
#[command(author = "Autolint Contributors")]
#[command(version)]
#[command(
    about = "Checks Composer autoload declarations against the source tree",
    long_about = None
)]
#[command(styles = get_styles())]
pub struct Cli {
    /// Use the specified directory as working directory
    #[arg(short = 'd', long = "working-dir", value_name = "DIR", default_value = ".")]
    pub working_dir: PathBuf,

    /// Skip the autoload-dev section
    #[arg(long)]
    pub no_dev: bool,

    /// Exclude paths matching this regex from every scan
    #[arg(long, value_name = "REGEX", env = "AUTOLINT_EXCLUDE")]
    pub exclude: Vec<String>,

    /// Remap a severity: FROM=TO, or FROM=silence to drop it
    #[arg(long = "severity", value_name = "FROM=TO", value_parser = parse_remap)]
    pub severity: Vec<(Severity, Option<Severity>)>,

    /// Treat warnings as errors
    #[arg(long)]
    pub strict: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Increase the verbosity of messages: -v for verbose, -vv for debug, -vvv for trace
    #[arg(short = 'v', long, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Only print violations
    #[arg(short = 'q', long)]
    pub quiet: bool,
}

/// How the report is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON document on stdout
    Json,
}

const fn get_styles() -> clap::builder::Styles {
    clap::builder::Styles::styled()
        .header(clap::builder::styling::AnsiColor::Green.on_default().bold())
        .usage(clap::builder::styling::AnsiColor::Green.on_default().bold())
        .literal(clap::builder::styling::AnsiColor::Cyan.on_default())
        .placeholder(clap::builder::styling::AnsiColor::Yellow.on_default())
}

fn parse_remap(value: &str) -> std::result::Result<(Severity, Option<Severity>), String> {
    parse_severity_remap(value).map_err(|e| e.to_string())
}

impl Cli {
    /// Options for the validation run.
    ///
    /// `--strict` escalates warnings unless `--severity` already remaps them.
    pub fn options(&self, base_dir: PathBuf) -> ValidationOptions {
        let mut options =
            ValidationOptions::new(base_dir).exclude(self.exclude.iter().cloned());
        for &(from, to) in &self.severity {
            options = options.remap(from, to);
        }
        let remaps_warning = self.severity.iter().any(|(from, _)| *from == Severity::Warning);
        if self.strict && !remaps_warning {
            options = options.remap(Severity::Warning, Some(Severity::Error));
        }
        if self.no_dev {
            options = options.without_dev();
        }
        options
    }
}

/// Validate the package in the working directory.
pub fn run(cli: &Cli) -> Result<ExitCode> {
    let base_dir = cli.working_dir.canonicalize().with_context(|| {
        format!("Working directory {} does not exist", cli.working_dir.display())
    })?;
    let manifest_path = base_dir.join("composer.json");
    info!(path = %manifest_path.display(), "reading manifest");
    let manifest = ComposerManifest::from_file(&manifest_path)?;

    let options = cli.options(base_dir);
    let destinations: Vec<Box<dyn Destination>> = match cli.format {
        OutputFormat::Text => vec![Box::new(ConsoleDestination::stdout())],
        OutputFormat::Json => vec![Box::new(TracingDestination)],
    };
    let report = options.build_report(destinations);

    let mut validator = AutoloadValidator::from_manifest(&manifest, &options, report)?;
    if cli.format == OutputFormat::Text && !cli.quiet {
        output::header(manifest.name.as_deref(), validator.validators().len());
    }

    validator.validate()?;
    let classes = validator.class_map()?.len();
    debug!(classes, "merged class map");

    let report = validator.report();
    match cli.format {
        OutputFormat::Text if !cli.quiet => {
            output::ambiguities(validator.scan_warnings());
            output::summary(report, classes);
        }
        OutputFormat::Text => {}
        OutputFormat::Json => output::json::print_report(report, validator.scan_warnings())?,
    }

    Ok(if report.is_failure() {
        ExitCode::from(EXIT_VIOLATIONS)
    } else {
        ExitCode::SUCCESS
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("autolint").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn defaults() {
        let cli = parse(&[]);
        assert_eq!(cli.working_dir, PathBuf::from("."));
        assert_eq!(cli.format, OutputFormat::Text);
        assert!(!cli.strict);
        assert!(cli.severity.is_empty());
    }

    #[test]
    fn severity_remaps_are_parsed() {
        let cli = parse(&["--severity", "warning=silence", "--severity", "error=critical"]);
        assert_eq!(
            cli.severity,
            vec![
                (Severity::Warning, None),
                (Severity::Error, Some(Severity::Critical)),
            ]
        );
    }

    #[test]
    fn malformed_remap_is_rejected() {
        let args = ["autolint", "--severity", "loud"];
        assert!(Cli::try_parse_from(args).is_err());
        let args = ["autolint", "--severity", "warning=loud"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn strict_escalates_warnings() {
        let options = parse(&["--strict"]).options(PathBuf::from("/pkg"));
        assert_eq!(
            options.severity_map,
            vec![(Severity::Warning, Some(Severity::Error))]
        );
    }

    #[test]
    fn explicit_warning_remap_wins_over_strict() {
        let options = parse(&["--strict", "--severity", "warning=silence"])
            .options(PathBuf::from("/pkg"));
        assert_eq!(options.severity_map, vec![(Severity::Warning, None)]);
    }

    #[test]
    fn no_dev_and_excludes_reach_options() {
        let options = parse(&["--no-dev", "--exclude", "/vendor/", "--exclude", "/cache/"])
            .options(PathBuf::from("/pkg"));
        assert!(!options.include_dev);
        assert_eq!(options.exclude, vec!["/vendor/", "/cache/"]);
    }

    #[test]
    fn verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["autolint", "-v", "-q"]).is_err());
    }
}
