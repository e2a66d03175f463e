// SPDX-License-Identifier: PMPL-1.0-or-later
//! AccessFix CLI - accessibility scanning for HTML pages and repositories

use accessfix::loader::RepositoryFile;
use accessfix::report::{OutputFormat, ReportSink, WriterSink};
use accessfix::{Config, ParserStrategy, Scanner, Source};
use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Rule-based WCAG accessibility scanner
#[derive(Parser)]
#[command(name = "accessfix")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    format: FormatArg,

    /// Output file (stdout if not specified)
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// Parser backend, overriding the configuration
    #[arg(long, global = true)]
    parser: Option<ParserArg>,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch and scan a web page
    Url {
        /// Page URL
        url: String,
    },

    /// Scan a single HTML file
    File {
        /// File to scan
        path: PathBuf,
    },

    /// Scan every HTML file under a directory
    Dir {
        /// Directory to scan
        dir: PathBuf,
    },

    /// Fetch files from a GitHub repository and scan them
    Repo {
        /// Repository as owner/name
        repo: String,

        /// Paths inside the repository
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// List the rules and their ids
    Rules,
}

/// Output format CLI argument
#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    /// Human-readable text
    Text,
    /// Structured JSON
    Json,
    /// SARIF for IDE/CI
    Sarif,
    /// Pull-request description
    Markdown,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Sarif => OutputFormat::Sarif,
            FormatArg::Markdown => OutputFormat::Markdown,
        }
    }
}

/// Parser backend CLI argument
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ParserArg {
    /// Tree parser, text parser if the tree parser gives up
    Auto,
    /// Full DOM tree
    Tree,
    /// Line-oriented tokenizer
    Text,
}

impl From<ParserArg> for ParserStrategy {
    fn from(arg: ParserArg) -> Self {
        match arg {
            ParserArg::Auto => ParserStrategy::Auto,
            ParserArg::Tree => ParserStrategy::Tree,
            ParserArg::Text => ParserStrategy::Text,
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "accessfix=debug"
    } else {
        "accessfix=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

async fn run() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::load_or_default(cli.config.as_deref())?;
    if let Some(parser) = cli.parser {
        config.engine.parser = parser.into();
    }

    let source = match cli.command {
        Commands::Url { url } => Source::Url(url),
        Commands::File { path } => Source::Path(path),
        Commands::Dir { dir } => Source::Directory(dir),
        Commands::Repo { repo, paths } => Source::Repository(
            paths
                .into_iter()
                .map(|path| RepositoryFile::new(repo.clone(), path))
                .collect(),
        ),
        Commands::Rules => {
            let scanner = Scanner::new(&config)?;
            for rule in scanner.engine().rules() {
                println!("{:<20} {}", rule.id(), rule.description());
            }
            return Ok(ExitCode::SUCCESS);
        }
    };

    let scanner = Scanner::new(&config)?;
    let result = scanner.run(&source).await?;
    report_sink(cli.output.as_deref(), cli.format.into())?.emit(&result)?;
    if let Some(path) = &cli.output {
        eprintln!("Report written to {}", path.display());
    }

    if result.has_critical() {
        return Ok(ExitCode::from(1));
    }
    Ok(ExitCode::SUCCESS)
}

/// Sink writing to the output file, or stdout if none is given
fn report_sink(
    path: Option<&Path>,
    format: OutputFormat,
) -> anyhow::Result<WriterSink<Box<dyn Write>>> {
    let writer: Box<dyn Write> = match path {
        Some(p) => Box::new(
            File::create(p).with_context(|| format!("Failed to create {}", p.display()))?,
        ),
        None => Box::new(io::stdout().lock()),
    };
    Ok(WriterSink::new(writer, format))
}

#[cfg(test)]
mod tests {
    use super::*;
    use accessfix::config::EngineConfig;
    use accessfix::{Engine, ScoringConfig};

    #[test]
    fn test_report_sink_writes_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let engine = Engine::new(&EngineConfig::default(), ScoringConfig::default());
        let result = engine
            .scan_html(r#"<html lang="en"><body><img src="x.png"></body></html>"#)
            .unwrap();

        report_sink(Some(&path), OutputFormat::Json)
            .unwrap()
            .emit(&result)
            .unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["totalIssues"], 1);
    }

    #[test]
    fn test_report_sink_rejects_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("no-such-dir").join("report.txt");
        assert!(report_sink(Some(&missing), OutputFormat::Text).is_err());
    }

    #[test]
    fn test_cli_parses_global_flags() {
        let cli = Cli::try_parse_from([
            "accessfix", "file", "index.html", "--format", "sarif", "--parser", "text",
        ])
        .unwrap();
        assert!(matches!(cli.format, FormatArg::Sarif));
        assert!(matches!(cli.parser, Some(ParserArg::Text)));
        assert!(matches!(cli.command, Commands::File { .. }));
    }
}
