//! Terminal output for validation runs.
//!
//! Violations are printed by [`ConsoleDestination`] as the report receives
//! them. Styling goes through `console`, which honours `NO_COLOR` and drops
//! colors when stdout is not a terminal.

pub mod json;

use autolint_validator::{Destination, Report, Severity, Violation};
use console::{Term, style};

/// Prints each violation on its own line.
#[derive(Debug)]
pub struct ConsoleDestination {
    term: Term,
}

impl ConsoleDestination {
    /// Destination writing to stdout.
    #[must_use]
    pub fn stdout() -> Self {
        Self {
            term: Term::stdout(),
        }
    }
}

impl Destination for ConsoleDestination {
    fn name(&self) -> &str {
        "console"
    }

    fn append(
        &mut self,
        violation: &Violation,
        severity: Severity,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.term.write_line(&render(violation, severity))?;
        Ok(())
    }
}

/// One violation line: severity label, then the message.
pub fn render(violation: &Violation, severity: Severity) -> String {
    let label = format!("{:<9}", severity.as_str());
    let label = match severity {
        Severity::Debug => style(label).dim(),
        Severity::Info | Severity::Notice => style(label).cyan(),
        Severity::Warning => style(label).yellow().bold(),
        Severity::Error => style(label).red().bold(),
        _ => style(label).red().bold().reverse(),
    };
    format!("{label}{}", violation.message())
}

/// Print the run header.
pub fn header(package: Option<&str>, loaders: usize) {
    let package = package.unwrap_or("composer.json");
    println!(
        "{} {}",
        style("Autolint").cyan().bold(),
        style(format!("Checking {loaders} autoload entries of {package}")).dim()
    );
}

/// Print scanner ambiguities as notes; they never fail the run.
pub fn ambiguities<'a>(warnings: impl IntoIterator<Item = (&'a str, &'a str)>) {
    for (validator, message) in warnings {
        println!("{}", ambiguity_line(validator, message));
    }
}

fn ambiguity_line(validator: &str, message: &str) -> String {
    format!("{}[{validator}] {message}", style(format!("{:<9}", "note")).dim())
}

/// Print the closing summary line.
pub fn summary(report: &Report, classes: usize) {
    println!();
    println!("{}", summary_line(report, classes));
}

fn summary_line(report: &Report, classes: usize) -> String {
    if report.is_empty() {
        return format!(
            "{} No autoload violations ({classes} classes)",
            style("Success:").green().bold()
        );
    }

    let counts = Severity::ALL
        .into_iter()
        .rev()
        .filter_map(|severity| match report.get(severity).len() {
            0 => None,
            1 => Some(format!("1 {severity}")),
            n => Some(format!("{n} {}", plural(severity))),
        })
        .collect::<Vec<_>>()
        .join(", ");

    let verdict = if report.is_failure() {
        style("Validation failed:").red().bold()
    } else {
        style("Validation passed:").yellow().bold()
    };
    format!("{verdict} {counts} ({classes} classes)")
}

const fn plural(severity: Severity) -> &'static str {
    match severity {
        Severity::Debug => "debug messages",
        Severity::Info => "infos",
        Severity::Notice => "notices",
        Severity::Warning => "warnings",
        Severity::Error => "errors",
        Severity::Critical => "criticals",
        Severity::Alert => "alerts",
        Severity::Emergency => "emergencies",
    }
}

/// Print an error that stopped the run.
pub fn error(err: &anyhow::Error) {
    let text = match err.downcast_ref::<autolint_core::Error>() {
        Some(core) => core.display_with_suggestions(),
        None => format!("{err:#}"),
    };
    eprintln!("{} {}", style("Error:").red().bold(), text);
}

#[cfg(test)]
mod tests {
    use super::*;
    use autolint_validator::ViolationKind;
    use pretty_assertions::assert_eq;

    fn missing(file: &str) -> Violation {
        Violation::new(
            "autoload.files",
            ViolationKind::FileNotFound {
                file_entry: file.to_string(),
            },
        )
    }

    #[test]
    fn render_prefixes_severity() {
        let line = render(&missing("a.php"), Severity::Error);
        assert_eq!(
            console::strip_ansi_codes(&line),
            "error    [autoload.files] File \"a.php\" does not exist."
        );
    }

    #[test]
    fn summary_counts_each_level() {
        let mut report = Report::default();
        report.error(missing("a.php")).unwrap();
        report.error(missing("b.php")).unwrap();
        report.warn(missing("c.php")).unwrap();

        let line = summary_line(&report, 7);
        assert_eq!(
            console::strip_ansi_codes(&line),
            "Validation failed: 2 errors, 1 warning (7 classes)"
        );
    }

    #[test]
    fn warnings_alone_pass() {
        let mut report = Report::default();
        report.warn(missing("c.php")).unwrap();
        let line = summary_line(&report, 0);
        assert!(console::strip_ansi_codes(&line).starts_with("Validation passed: 1 warning"));
    }

    #[test]
    fn ambiguity_line_names_validator() {
        let line = ambiguity_line("autoload.classmap", "Ambiguous class resolution");
        assert_eq!(
            console::strip_ansi_codes(&line),
            "note     [autoload.classmap] Ambiguous class resolution"
        );
    }

    #[test]
    fn empty_report_succeeds() {
        let line = summary_line(&Report::default(), 3);
        assert_eq!(
            console::strip_ansi_codes(&line),
            "Success: No autoload violations (3 classes)"
        );
    }
}
