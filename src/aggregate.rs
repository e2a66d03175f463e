// SPDX-License-Identifier: PMPL-1.0-or-later
//! Issue aggregation and scoring.
//!
//! Score starts at 100 and loses a fixed weight per issue by severity, then is
//! clamped to [0, 100] and rounded. The grade is a pure function of the score.

use crate::issue::{Issue, Severity};
use serde::{Deserialize, Serialize};

/// Points deducted per issue of each severity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub critical: f64,
    pub warning: f64,
    pub info: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            critical: 10.0,
            warning: 5.0,
            info: 2.0,
        }
    }
}

/// Letter grade
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    /// Fixed thresholds: ≥90 A, ≥80 B, ≥70 C, ≥60 D, else F
    pub fn from_score(score: u8) -> Self {
        match score {
            90.. => Grade::A,
            80..=89 => Grade::B,
            70..=79 => Grade::C,
            60..=69 => Grade::D,
            _ => Grade::F,
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let letter = match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        };
        write!(f, "{}", letter)
    }
}

/// Numeric score with its grade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub score: u8,
    pub grade: Grade,
}

impl Score {
    pub const PERFECT: Score = Score {
        score: 100,
        grade: Grade::A,
    };

    /// Score from per-severity counts
    pub fn from_counts(critical: usize, warning: usize, info: usize, weights: &ScoringConfig) -> Self {
        if critical + warning + info == 0 {
            return Score::PERFECT;
        }
        let deducted = critical as f64 * weights.critical
            + warning as f64 * weights.warning
            + info as f64 * weights.info;
        let score = (100.0 - deducted).clamp(0.0, 100.0).round() as u8;
        Score {
            score,
            grade: Grade::from_score(score),
        }
    }
}

/// Aggregate result of one scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub issues: Vec<Issue>,
    pub total_issues: usize,
    pub critical_count: usize,
    pub warning_count: usize,
    pub info_count: usize,
    pub score: u8,
    pub grade: Grade,
}

impl ScanResult {
    /// Sort by severity (stable, so detection order breaks ties), tally and score
    pub fn from_issues(mut issues: Vec<Issue>, weights: &ScoringConfig) -> Self {
        issues.sort_by_key(|issue| std::cmp::Reverse(issue.severity.rank()));

        let count = |severity: Severity| issues.iter().filter(|i| i.severity == severity).count();
        let critical_count = count(Severity::Critical);
        let warning_count = count(Severity::Warning);
        let info_count = count(Severity::Info);
        let Score { score, grade } =
            Score::from_counts(critical_count, warning_count, info_count, weights);

        Self {
            total_issues: issues.len(),
            issues,
            critical_count,
            warning_count,
            info_count,
            score,
            grade,
        }
    }

    /// Replace the derived score with one an upstream caller already computed
    pub fn with_score(mut self, score: Score) -> Self {
        self.score = score.score;
        self.grade = score.grade;
        self
    }

    /// Issues of one severity, in report order
    pub fn by_severity(&self, severity: Severity) -> Vec<&Issue> {
        self.issues.iter().filter(|i| i.severity == severity).collect()
    }

    pub fn has_critical(&self) -> bool {
        self.critical_count > 0
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}
