//! Output formatting for spot-validator.
//!
//! Provides terminal, JSON, and JUnit XML output formatters for a
//! [`ValidationOutcome`].
//!
//! # Graceful Degradation
//!
//! This module handles errors gracefully:
//! - Non-TTY output: Color disabled via NO_COLOR or --no-color
//! - Empty results: Produces valid output with zero entries
//! - Schema failures: Row checks are reported as skipped, not passed
//!
//! All formatters produce valid output for any ValidationOutcome input.
//! No function in this module will panic.

use crate::checks::check_catalog;
use crate::cli::args::{OutputFormat, OutputOptions};
use crate::engine::result::{ErrorCategory, ValidationOutcome};

const RULE: &str = "--------------------------------------------------------------------------------";

/// Trait for output formatters
pub trait OutputFormatter {
    /// Format a validation outcome into a string
    fn format(&self, outcome: &ValidationOutcome) -> String;
}

/// Terminal (human-readable) formatter
pub struct TerminalFormatter {
    color: bool,
    verbose: bool,
    quiet: bool,
}

impl TerminalFormatter {
    pub fn new(color: bool, verbose: bool, quiet: bool) -> Self {
        TerminalFormatter {
            color,
            verbose,
            quiet,
        }
    }

    fn colorize(&self, text: &str, color_code: &str) -> String {
        if self.color {
            format!("\x1b[{}m{}\x1b[0m", color_code, text)
        } else {
            text.to_string()
        }
    }

    fn green(&self, text: &str) -> String {
        self.colorize(text, "32")
    }

    fn yellow(&self, text: &str) -> String {
        self.colorize(text, "33")
    }

    fn red(&self, text: &str) -> String {
        self.colorize(text, "31")
    }
}

impl OutputFormatter for TerminalFormatter {
    fn format(&self, outcome: &ValidationOutcome) -> String {
        let result = &outcome.result;
        let mut output = String::new();

        output.push_str(RULE);
        output.push('\n');
        output.push_str("spot-validator report\n");
        if !outcome.source.is_empty() {
            output.push_str(&format!("File: {}\n", outcome.source));
        }
        output.push_str(&format!("Validator: {}\n", outcome.backend));
        if let Some(ref reason) = outcome.fallback_reason {
            output.push_str(&format!("{} {}\n", self.yellow("Fallback:"), reason));
        }
        output.push_str(&format!(
            "Rows: {} in {} sheet(s)\n",
            result.meta.rows_total, result.meta.sheets
        ));
        if self.verbose {
            output.push_str(&format!("Columns: {}\n", result.columns_detected.join(", ")));
        }
        output.push_str(RULE);
        output.push_str("\n\n");

        for (category, entries) in &result.errors {
            output.push_str(&format!(
                "{} {} ({})\n",
                self.red("[FAIL]"),
                category.label(),
                category.as_str()
            ));
            if self.quiet {
                output.push_str(&format!("  {} entries\n", entries.len()));
            } else {
                for entry in entries {
                    output.push_str(&format!("  {}\n", entry));
                }
            }
            output.push('\n');
        }

        let summary = result.summary();
        output.push_str(RULE);
        output.push('\n');
        output.push_str(&format!(
            "SUMMARY: {} rows, {} flagged, {} entries\n",
            summary.rows_total, summary.rows_flagged, summary.total_entries
        ));
        if self.verbose {
            output.push_str(&format!("Total time: {}ms\n", outcome.duration_ms));
        }
        let status = if result.ok {
            self.green("PASS")
        } else {
            self.red("FAIL")
        };
        output.push_str(&format!("Result: {}\n", status));
        output.push_str(RULE);

        output
    }
}

/// JSON formatter, emitting the result contract plus `validator_used`.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        JsonFormatter { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, outcome: &ValidationOutcome) -> String {
        let rendered = if self.pretty {
            serde_json::to_string_pretty(outcome)
        } else {
            serde_json::to_string(outcome)
        };
        rendered.unwrap_or_else(|e| {
            serde_json::json!({ "error": true, "message": e.to_string() }).to_string()
        })
    }
}

/// JUnit XML formatter, one test case per check.
pub struct JunitFormatter;

impl JunitFormatter {
    pub fn new() -> Self {
        JunitFormatter
    }

    fn escape_xml(s: &str) -> String {
        let mut result = String::with_capacity(s.len());
        for c in s.chars() {
            match c {
                '&' => result.push_str("&amp;"),
                '<' => result.push_str("&lt;"),
                '>' => result.push_str("&gt;"),
                '"' => result.push_str("&quot;"),
                '\'' => result.push_str("&apos;"),
                c => result.push(c),
            }
        }
        result
    }
}

impl Default for JunitFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for JunitFormatter {
    fn format(&self, outcome: &ValidationOutcome) -> String {
        let result = &outcome.result;
        let catalog = check_catalog();
        let schema_failed = result.has_schema_errors();

        let failures = catalog
            .iter()
            .filter(|c| !result.entries(c.category).is_empty())
            .count();
        // Row checks never run when the schema is incomplete.
        let skipped = if schema_failed { catalog.len() - 1 } else { 0 };

        let mut output = String::new();
        output.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        output.push_str(&format!(
            "<testsuites tests=\"{}\" failures=\"{}\" errors=\"0\" skipped=\"{}\" time=\"{:.3}\">\n",
            catalog.len(),
            failures,
            skipped,
            outcome.duration_ms as f64 / 1000.0
        ));
        output.push_str(&format!(
            "  <testsuite name=\"{}\" tests=\"{}\" failures=\"{}\" errors=\"0\" skipped=\"{}\">\n",
            Self::escape_xml(if outcome.source.is_empty() { "spots" } else { &outcome.source }),
            catalog.len(),
            failures,
            skipped
        ));

        for check in &catalog {
            output.push_str(&format!(
                "    <testcase name=\"{}\" classname=\"spot-validator.{}\"",
                check.id,
                check.category.as_str()
            ));
            let entries = result.entries(check.category);
            if !entries.is_empty() {
                let body = entries
                    .iter()
                    .map(|e| Self::escape_xml(&e.to_string()))
                    .collect::<Vec<_>>()
                    .join("\n");
                output.push_str(">\n");
                output.push_str(&format!(
                    "      <failure message=\"{}: {} entries\">{}</failure>\n",
                    Self::escape_xml(check.category.label()),
                    entries.len(),
                    body
                ));
                output.push_str("    </testcase>\n");
            } else if schema_failed && check.category != ErrorCategory::MissingColumns {
                output.push_str(">\n");
                output.push_str("      <skipped message=\"required columns missing\" />\n");
                output.push_str("    </testcase>\n");
            } else {
                output.push_str(" />\n");
            }
        }

        output.push_str("  </testsuite>\n");
        output.push_str("</testsuites>");
        output
    }
}

/// Get a formatter based on the output format
pub fn get_formatter(
    format: &OutputFormat,
    no_color: bool,
    verbose: bool,
    quiet: bool,
) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Text => Box::new(TerminalFormatter::new(!no_color, verbose, quiet)),
        OutputFormat::Json => Box::new(JsonFormatter::new(true)),
        OutputFormat::Junit => Box::new(JunitFormatter::new()),
    }
}

/// [`get_formatter`] from resolved options.
pub fn formatter_for(options: &OutputOptions) -> Box<dyn OutputFormatter> {
    get_formatter(&options.format, !options.color, options.verbose, options.quiet)
}
