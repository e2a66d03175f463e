// SPDX-License-Identifier: PMPL-1.0-or-later
//! Rule engine.
//!
//! Runs every enabled rule against a parsed document. A rule that returns an
//! error or panics loses its contribution for that document only; the other
//! rules still run and the scan still succeeds.

use crate::aggregate::{ScanResult, ScoringConfig};
use crate::config::EngineConfig;
use crate::document::{parse_document, Document, ParserStrategy};
use crate::error::{Result, RuleError};
use crate::issue::Issue;
use crate::loader::ScanUnit;
use crate::rules::{default_rules, Rule};
use rayon::prelude::*;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{debug, info, warn};

/// Issues and isolated failures from one document
#[derive(Debug, Clone, Default)]
pub struct RuleRun {
    /// Issues in detection order (rule order, then document order)
    pub issues: Vec<Issue>,
    /// Rules that failed and were skipped
    pub failures: Vec<RuleError>,
}

/// A configured set of rules
pub struct Engine {
    rules: Vec<Box<dyn Rule>>,
    strategy: ParserStrategy,
    max_parse_errors: usize,
    scoring: ScoringConfig,
}

impl Engine {
    /// Engine with the default rules minus any disabled in `config`
    pub fn new(config: &EngineConfig, scoring: ScoringConfig) -> Self {
        let rules = default_rules()
            .into_iter()
            .filter(|rule| !config.disabled_rules.iter().any(|id| id == rule.id()))
            .collect();
        Self::with_rules(rules, config, scoring)
    }

    /// Engine running exactly `rules`
    pub fn with_rules(rules: Vec<Box<dyn Rule>>, config: &EngineConfig, scoring: ScoringConfig) -> Self {
        Self {
            rules,
            strategy: config.parser,
            max_parse_errors: config.max_parse_errors,
            scoring,
        }
    }

    /// Rules this engine runs
    pub fn rules(&self) -> &[Box<dyn Rule>] {
        &self.rules
    }

    /// Run every rule against an already-parsed document
    pub fn check(&self, doc: &Document) -> RuleRun {
        let mut run = RuleRun::default();
        for rule in &self.rules {
            match run_isolated(rule.as_ref(), doc) {
                Ok(issues) => {
                    debug!("Rule {} found {} issue(s)", rule.id(), issues.len());
                    run.issues.extend(issues);
                }
                Err(err) => {
                    warn!("Skipping rule: {}", err);
                    run.failures.push(err);
                }
            }
        }
        run
    }

    /// Parse one unit and check it, stamping its file path on every issue
    pub fn check_unit(&self, unit: &ScanUnit) -> Result<RuleRun> {
        let doc = parse_document(&unit.html, self.strategy, self.max_parse_errors)?;
        let mut run = self.check(&doc);
        if let Some(path) = &unit.file_path {
            for issue in &mut run.issues {
                issue.file_path = Some(path.clone());
            }
        }
        Ok(run)
    }

    /// Check a single HTML string and aggregate the result
    pub fn scan_html(&self, html: &str) -> Result<ScanResult> {
        self.scan(&[ScanUnit::new(html)])
    }

    /// Check every unit and aggregate into one result.
    ///
    /// Units are checked in parallel; results are concatenated in unit order.
    /// A parse failure in any unit fails the whole scan.
    pub fn scan(&self, units: &[ScanUnit]) -> Result<ScanResult> {
        let runs = units
            .par_iter()
            .map(|unit| self.check_unit(unit))
            .collect::<Result<Vec<_>>>()?;

        let mut issues = Vec::new();
        let mut failures = 0;
        for run in runs {
            failures += run.failures.len();
            issues.extend(run.issues);
        }

        let result = ScanResult::from_issues(issues, &self.scoring);
        info!(
            "Scanned {} unit(s): {} issue(s), score {} ({}), {} rule failure(s)",
            units.len(),
            result.total_issues,
            result.score,
            result.grade,
            failures
        );
        Ok(result)
    }
}

fn run_isolated(rule: &dyn Rule, doc: &Document) -> std::result::Result<Vec<Issue>, RuleError> {
    match catch_unwind(AssertUnwindSafe(|| rule.check(doc))) {
        Ok(result) => result,
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(RuleError::Panicked {
                rule: rule.id().to_string(),
                message,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::Severity;

    struct FailingRule;

    impl Rule for FailingRule {
        fn id(&self) -> &'static str {
            "always-fails"
        }

        fn description(&self) -> &'static str {
            "test rule"
        }

        fn check(&self, _doc: &Document) -> std::result::Result<Vec<Issue>, RuleError> {
            Err(RuleError::evaluation(self.id(), "malformed tree"))
        }
    }

    struct PanickingRule;

    impl Rule for PanickingRule {
        fn id(&self) -> &'static str {
            "always-panics"
        }

        fn description(&self) -> &'static str {
            "test rule"
        }

        fn check(&self, _doc: &Document) -> std::result::Result<Vec<Issue>, RuleError> {
            panic!("index out of range")
        }
    }

    fn engine_with(extra: Vec<Box<dyn Rule>>) -> Engine {
        let mut rules = extra;
        rules.extend(default_rules());
        Engine::with_rules(rules, &EngineConfig::default(), ScoringConfig::default())
    }

    #[test]
    fn test_failing_rules_are_isolated() {
        let engine = engine_with(vec![Box::new(FailingRule), Box::new(PanickingRule)]);
        let doc = parse_document(r#"<html lang="en"><img src="a.png"></html>"#, ParserStrategy::Tree, 100)
            .unwrap();
        let run = engine.check(&doc);
        assert_eq!(run.failures.len(), 2);
        assert_eq!(run.failures[0].rule(), "always-fails");
        assert!(matches!(&run.failures[1], RuleError::Panicked { message, .. } if message == "index out of range"));
        assert_eq!(run.issues.len(), 1);
        assert_eq!(run.issues[0].title, "Image missing alt attribute");
    }

    #[test]
    fn test_scan_survives_rule_failure() {
        let engine = engine_with(vec![Box::new(PanickingRule)]);
        let result = engine.scan_html(r#"<html lang="en"><body></body></html>"#).unwrap();
        assert_eq!(result.total_issues, 0);
        assert_eq!(result.score, 100);
    }

    #[test]
    fn test_disabled_rules() {
        let config = EngineConfig {
            disabled_rules: vec!["image-alt".to_string()],
            ..EngineConfig::default()
        };
        let engine = Engine::new(&config, ScoringConfig::default());
        assert_eq!(engine.rules().len(), 15);
        let result = engine.scan_html(r#"<html lang="en"><img src="a.png"></html>"#).unwrap();
        assert_eq!(result.total_issues, 0);
    }

    #[test]
    fn test_units_keep_file_paths_and_order() {
        let engine = Engine::new(&EngineConfig::default(), ScoringConfig::default());
        let units = vec![
            ScanUnit::with_path("<table><tr><td>1</td></tr></table>", "b.html"),
            ScanUnit::with_path(r#"<img src="x">"#, "a.html"),
        ];
        let result = engine.scan(&units).unwrap();
        assert_eq!(result.total_issues, 3);
        assert_eq!(result.issues[0].severity, Severity::Critical);
        assert_eq!(result.issues[0].file_path.as_deref(), Some("a.html"));
        assert_eq!(result.issues[1].file_path.as_deref(), Some("b.html"));
        assert_eq!(result.issues[2].severity, Severity::Info);
    }

    #[test]
    fn test_parse_failure_fails_scan() {
        let engine = Engine::new(&EngineConfig::default(), ScoringConfig::default());
        let units = vec![ScanUnit::new("<p>ok</p>"), ScanUnit::new("no markup")];
        assert!(matches!(engine.scan(&units), Err(crate::error::ScanError::Parse(_))));
    }
}
