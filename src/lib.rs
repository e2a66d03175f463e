// SPDX-License-Identifier: PMPL-1.0-or-later
//! AccessFix - rule-based accessibility scanner for HTML
//!
//! Parses a document, runs a fixed set of independent WCAG checks against it
//! and aggregates the findings into a scored, graded result. Each issue carries
//! the offending markup and, where one can be synthesized, a corrected
//! replacement suitable for a before/after diff.
//!
//! ## Rules
//!
//! - **Language** (3.1.1): `lang` on the root element
//! - **Images** (1.1.1): missing and empty `alt`
//! - **Forms** (1.3.1/3.3.2): labels for text controls
//! - **Controls** (4.1.2): button names
//! - **Links** (2.4.4): link names and non-descriptive link text
//! - **Headings** (1.3.1): `<h1>` presence and skipped levels
//! - **Frames** (4.1.2): iframe titles
//! - **Tables** (1.3.1): header cells and captions
//! - **Ids** (4.1.1): duplicate `id` values
//! - **ARIA** (4.1.2): redundant roles and unnamed required fields
//!
//! ## Pipeline
//!
//! [`loader`] produces [`loader::ScanUnit`]s, [`document`] parses each one,
//! [`engine`] runs the [`rules`] with per-rule isolation, [`aggregate`] sorts
//! and scores, and [`report`] hands the result to a sink. [`scanner`] wires
//! these together under a single timeout.

pub mod aggregate;
pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod issue;
pub mod loader;
pub mod report;
pub mod rules;
pub mod scanner;

pub use aggregate::{Grade, ScanResult, Score, ScoringConfig};
pub use config::Config;
pub use document::{parse_document, Document, ParserStrategy};
pub use engine::Engine;
pub use error::{ParseError, Result, RuleError, ScanError};
pub use issue::{Issue, Severity};
pub use loader::{Source, ScanUnit};
pub use scanner::Scanner;
