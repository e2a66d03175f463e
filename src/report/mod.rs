// SPDX-License-Identifier: PMPL-1.0-or-later
//! Report generation for scan results.
//!
//! Supports multiple output formats:
//! - Text: human-readable summary with score and grade
//! - JSON: the scan record exactly as downstream consumers read it
//! - SARIF: Static Analysis Results Interchange Format for IDE/CI integration
//! - Markdown: pull-request description with before/after code blocks

use crate::aggregate::ScanResult;
use crate::error::Result;
use crate::issue::{Issue, Severity};
use serde::Serialize;
use std::io::Write;

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// Structured JSON
    Json,
    /// SARIF for IDE/CI integration
    Sarif,
    /// Pull-request description
    Markdown,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Sarif => write!(f, "sarif"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "sarif" => Ok(OutputFormat::Sarif),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}

/// Destination for finished scan results
pub trait ReportSink {
    fn emit(&mut self, result: &ScanResult) -> Result<()>;
}

/// Writes a formatted report to any `Write`
pub struct WriterSink<W: Write> {
    writer: W,
    format: OutputFormat,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W, format: OutputFormat) -> Self {
        Self { writer, format }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ReportSink for WriterSink<W> {
    fn emit(&mut self, result: &ScanResult) -> Result<()> {
        let report = generate_report(result, self.format);
        writeln!(self.writer, "{}", report.trim_end())?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Generate a report from a scan result
pub fn generate_report(result: &ScanResult, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => generate_text_report(result),
        OutputFormat::Json => generate_json_report(result),
        OutputFormat::Sarif => generate_sarif_report(result),
        OutputFormat::Markdown => generate_markdown_report(result),
    }
}

/// Generate human-readable text report
fn generate_text_report(result: &ScanResult) -> String {
    let mut output = String::new();

    output.push_str("=== AccessFix Accessibility Report ===\n\n");
    output.push_str(&format!("Score: {}/100 (Grade {})\n", result.score, result.grade));

    if result.is_empty() {
        output.push_str("No accessibility issues found. All checks passed.\n");
        return output;
    }

    output.push_str(&format!(
        "Found {} issue(s): {} critical, {} warning(s), {} info\n\n",
        result.total_issues, result.critical_count, result.warning_count, result.info_count
    ));

    for severity in Severity::ALL {
        let issues = result.by_severity(severity);
        if issues.is_empty() {
            continue;
        }

        output.push_str(&format!("--- {} ({}) ---\n", severity, issues.len()));

        for issue in issues {
            output.push_str(&format!("[{}] {}\n", issue.category, issue.title));
            output.push_str(&format!("  Location: {}\n", issue.location_string()));
            if let Some(ref criteria) = issue.wcag_criteria {
                output.push_str(&format!("  WCAG: {}\n", criteria));
            }
            output.push_str(&format!("  Fix: {}\n", issue.recommended_fix));
            output.push('\n');
        }
    }

    output
}

/// Generate JSON report
fn generate_json_report(result: &ScanResult) -> String {
    serde_json::to_string_pretty(result).unwrap_or_else(|e| {
        format!("{{\"error\": \"Failed to serialize scan result: {}\"}}", e)
    })
}

/// SARIF report structure (simplified)
#[derive(Debug, Serialize)]
struct SarifReport {
    #[serde(rename = "$schema")]
    schema: String,
    version: String,
    runs: Vec<SarifRun>,
}

#[derive(Debug, Serialize)]
struct SarifRun {
    tool: SarifTool,
    results: Vec<SarifResult>,
}

#[derive(Debug, Serialize)]
struct SarifTool {
    driver: SarifDriver,
}

#[derive(Debug, Serialize)]
struct SarifDriver {
    name: String,
    version: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifResult {
    rule_id: String,
    level: String,
    message: SarifMessage,
    locations: Vec<SarifLocation>,
}

#[derive(Debug, Serialize)]
struct SarifMessage {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifLocation {
    physical_location: SarifPhysicalLocation,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifPhysicalLocation {
    artifact_location: SarifArtifactLocation,
    #[serde(skip_serializing_if = "Option::is_none")]
    region: Option<SarifRegion>,
}

#[derive(Debug, Serialize)]
struct SarifArtifactLocation {
    uri: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifRegion {
    start_line: usize,
}

/// `category/slugified-title`, stable across runs
fn sarif_rule_id(issue: &Issue) -> String {
    let slug = issue
        .title
        .to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    format!("{}/{}", issue.category, slug)
}

/// Generate SARIF report
fn generate_sarif_report(result: &ScanResult) -> String {
    let results: Vec<SarifResult> = result
        .issues
        .iter()
        .map(|issue| {
            let level = match issue.severity {
                Severity::Critical => "error",
                Severity::Warning => "warning",
                Severity::Info => "note",
            };

            let mut text = issue.description.clone();
            if let Some(ref selector) = issue.selector {
                text.push_str(&format!(" ({})", selector));
            }

            let locations = issue
                .file_path
                .iter()
                .map(|file| SarifLocation {
                    physical_location: SarifPhysicalLocation {
                        artifact_location: SarifArtifactLocation { uri: file.clone() },
                        region: issue.line_number.map(|l| SarifRegion { start_line: l }),
                    },
                })
                .collect();

            SarifResult {
                rule_id: sarif_rule_id(issue),
                level: level.to_string(),
                message: SarifMessage { text },
                locations,
            }
        })
        .collect();

    let report = SarifReport {
        schema: "https://json.schemastore.org/sarif-2.1.0.json".to_string(),
        version: "2.1.0".to_string(),
        runs: vec![SarifRun {
            tool: SarifTool {
                driver: SarifDriver {
                    name: "accessfix".to_string(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                },
            },
            results,
        }],
    };

    serde_json::to_string_pretty(&report).unwrap_or_else(|e| {
        format!("{{\"error\": \"Failed to serialize SARIF report: {}\"}}", e)
    })
}

/// Escape characters that would alter markdown structure
fn sanitize_markdown(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '`' => output.push_str("\\`"),
            '[' => output.push_str("\\["),
            ']' => output.push_str("\\]"),
            _ => output.push(ch),
        }
    }
    output
}

fn push_code_block(output: &mut String, label: &str, code: &Option<String>) {
    if let Some(code) = code {
        output.push_str(&format!("**{}:**\n```html\n{}\n```\n\n", label, code));
    }
}

/// Generate the pull-request description
fn generate_markdown_report(result: &ScanResult) -> String {
    let mut output = String::from("# Accessibility Fixes\n\n");
    output.push_str(&format!(
        "This PR addresses {} accessibility issue(s). Score: {}/100 (Grade {}).\n\n",
        result.total_issues, result.score, result.grade
    ));

    let critical = result.by_severity(Severity::Critical);
    if !critical.is_empty() {
        output.push_str(&format!("## Critical Issues ({})\n\n", critical.len()));
        for (index, issue) in critical.iter().enumerate() {
            output.push_str(&format!("### {}. {}\n", index + 1, issue.title));
            output.push_str(&format!("**Category:** {}\n", issue.category));
            output.push_str(&format!(
                "**WCAG:** {}\n",
                issue.wcag_criteria.as_deref().unwrap_or("N/A")
            ));
            if let Some(ref file) = issue.file_path {
                output.push_str(&format!("**File:** {}\n", sanitize_markdown(file)));
            }
            output.push_str(&format!("**Description:** {}\n", issue.description));
            output.push_str(&format!("**Fix:** {}\n\n", issue.recommended_fix));
            push_code_block(&mut output, "Before", &issue.code_snippet);
            push_code_block(&mut output, "After", &issue.fixed_code);
        }
    }

    let warnings = result.by_severity(Severity::Warning);
    if !warnings.is_empty() {
        output.push_str(&format!("## Warnings ({})\n\n", warnings.len()));
        for (index, issue) in warnings.iter().enumerate() {
            output.push_str(&format!("### {}. {}\n", index + 1, issue.title));
            output.push_str(&format!("**Description:** {}\n", issue.description));
            output.push_str(&format!("**Fix:** {}\n\n", issue.recommended_fix));
            push_code_block(&mut output, "Before", &issue.code_snippet);
            push_code_block(&mut output, "After", &issue.fixed_code);
        }
    }

    let info = result.by_severity(Severity::Info);
    if !info.is_empty() {
        output.push_str(&format!("## Info ({})\n\n", info.len()));
        for issue in info {
            output.push_str(&format!("- {}\n", issue.title));
        }
    }

    output.push_str("\n---\n*Generated by AccessFix - Automated Accessibility Scanning*\n");
    output
}
