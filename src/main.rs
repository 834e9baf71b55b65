//! lintree - memory-aware golangci-lint runs with per-directory quality reports.
//!
//! Usage:
//!   lintree run [PATH]          Lint a Go module and print a quality table
//!   lintree categories [PATH]   Group near-identical issues and rank them
//!   lintree --help              Show help

mod render;

use std::io;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result};

use lintree_analyze::{CategoryConfig, IssueRanking};
use lintree_core::{ConfigError, LintOptions, Project, View, ViewOptions, path};

#[derive(Parser)]
#[command(
    name = "lintree",
    version,
    about = "Memory-aware golangci-lint orchestration",
    long_about = "lintree runs golangci-lint over a Go codebase without exhausting host memory.\n\n\
                  When memory runs short the current invocation is killed and its scope is \
                  split into smaller ones. The collected issues are reported per directory."
)]
struct Cli {
    /// Log debug output, including memory samples
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only print the report
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Lint a project and print issue counts and densities
    Run {
        #[command(flatten)]
        lint: LintArgs,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: ReportFormat,
    },

    /// Group near-identical issues and rank the groups by size
    Categories {
        #[command(flatten)]
        lint: LintArgs,

        /// Maximum edit distance between issues of one category
        #[arg(short, long, default_value = "10")]
        tolerance: usize,

        /// Number of categories to show (0 = all)
        #[arg(short = 'n', long, default_value = "0")]
        top: usize,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },
}

#[derive(Args)]
struct LintArgs {
    /// Root of the Go project
    #[arg(default_value = ".")]
    path: PathBuf,

    /// golangci-lint configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory names to skip, comma-separated
    #[arg(short, long, value_delimiter = ',')]
    excludes: Vec<String>,

    /// Linters to enable, comma-separated (default: the tool's own set)
    #[arg(short, long, value_delimiter = ',')]
    linters: Vec<String>,

    /// Report every directory down to this depth
    #[arg(short, long)]
    depth: Option<usize>,

    /// Extra files or directories to report on, comma-separated
    #[arg(short, long, value_delimiter = ',')]
    paths: Vec<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum ReportFormat {
    #[default]
    Text,
    Csv,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Command::Run { lint, format } => {
            run_report(&lint, format, cli.quiet).await?;
        }
        Command::Categories {
            lint,
            tolerance,
            top,
            format,
        } => {
            run_categories(&lint, tolerance, top, format, cli.quiet).await?;
        }
    }

    Ok(())
}

/// Install the stderr log subscriber; `--quiet` installs none.
fn init_logging(verbose: bool, quiet: bool) {
    if quiet {
        return;
    }
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(level)
        .init();
}

/// Lint the project and build the requested view.
async fn analyze(args: &LintArgs, quiet: bool) -> Result<(Project, View)> {
    let cwd = std::env::current_dir().context("Failed to read the working directory")?;
    let root = cwd
        .join(&args.path)
        .canonicalize()
        .context("Invalid path")?;

    let paths = args
        .paths
        .iter()
        .map(|p| project_path(&root, p))
        .collect::<Result<Vec<_>, _>>()?;

    let options = LintOptions {
        linters: args.linters.clone(),
        config_path: args.config.as_ref().map(|config| cwd.join(config)),
        exclude_dirs: args.excludes.clone(),
    };

    if !quiet {
        eprintln!("Linting {}...", root.display());
    }
    let project = lintree_lint::parse(&root, [options])
        .await
        .context("Analysis failed")?;

    if !quiet {
        eprintln!(
            "Finished after {} invocation(s)",
            project.invocations().len()
        );
        if !project.warnings().is_empty() {
            eprintln!(
                "{} issue(s) dropped for files outside the scanned tree",
                project.warnings().len()
            );
        }
    }

    let mut view_options = ViewOptions::new().with_paths(paths);
    view_options.depth = args.depth;
    let view = project.generate_view(&view_options);
    Ok((project, view))
}

/// Project-relative form of a `--paths` entry.
///
/// Relative entries are taken as already relative to the project root;
/// absolute ones must lie inside it.
fn project_path(root: &Path, entry: &Path) -> Result<String, ConfigError> {
    if entry.is_relative() {
        return Ok(entry.to_string_lossy().replace('\\', "/"));
    }
    let resolved = entry.canonicalize().unwrap_or_else(|_| entry.to_path_buf());
    path::relative_to(&resolved, root).ok_or_else(|| ConfigError::PathOutsideProject {
        path: entry.to_path_buf(),
        root: root.to_path_buf(),
    })
}

/// Print the per-directory quality report.
async fn run_report(args: &LintArgs, format: ReportFormat, quiet: bool) -> Result<()> {
    let (_, view) = analyze(args, quiet).await?;

    let mut out = io::stdout().lock();
    match format {
        ReportFormat::Text => render::text(&view, &mut out),
        ReportFormat::Csv => render::csv(&view, &mut out),
        ReportFormat::Json => render::json(&view, &mut out),
    }
    .context("Failed to write the report")?;

    Ok(())
}

/// Print issue categories, largest first.
async fn run_categories(
    args: &LintArgs,
    tolerance: usize,
    top: usize,
    format: OutputFormat,
    quiet: bool,
) -> Result<()> {
    let (_, view) = analyze(args, quiet).await?;

    let config = CategoryConfig::builder()
        .tolerance(tolerance)
        .max_categories(top)
        .build()
        .context("Invalid category settings")?;
    let report = IssueRanking::with_config(config).rank(&view);

    match format {
        OutputFormat::Text => {
            println!();
            println!("{}", "─".repeat(70));
            println!(" Issue Categories - {}", view.path.display());
            println!("{}", "─".repeat(70));
            println!();

            if report.is_empty() {
                println!(" No issues found.");
            } else {
                println!(
                    " {} categories from {} issues",
                    report.category_count, report.issues_analyzed
                );
                println!();

                for (i, category) in report.categories.iter().enumerate() {
                    println!(" {:>3}. {}", i + 1, category);
                    if let Some(first) = category.issues.first() {
                        println!(
                            "      e.g. {}:{}:{}",
                            first.file_path(),
                            first.line(),
                            first.column()
                        );
                    }
                }
            }
            println!();
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_comma_lists() {
        let cli = Cli::try_parse_from([
            "lintree", "run", "proj", "-l", "govet,unused", "-e", "gen", "-p", "a,b/c", "-d",
            "2", "-f", "csv",
        ])
        .unwrap();

        let Command::Run { lint, format } = cli.command else {
            panic!("expected run");
        };
        assert_eq!(lint.path, PathBuf::from("proj"));
        assert_eq!(lint.linters, vec!["govet", "unused"]);
        assert_eq!(lint.excludes, vec!["gen"]);
        assert_eq!(lint.paths, vec![PathBuf::from("a"), PathBuf::from("b/c")]);
        assert_eq!(lint.depth, Some(2));
        assert!(matches!(format, ReportFormat::Csv));
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["lintree", "categories", "-v"]).unwrap();
        assert!(cli.verbose);

        let Command::Categories {
            lint,
            tolerance,
            top,
            ..
        } = cli.command
        else {
            panic!("expected categories");
        };
        assert_eq!(lint.path, PathBuf::from("."));
        assert_eq!(lint.depth, None);
        assert_eq!(tolerance, 10);
        assert_eq!(top, 0);
    }

    #[test]
    fn test_verbose_and_quiet_conflict() {
        assert!(Cli::try_parse_from(["lintree", "run", "-v", "-q"]).is_err());
    }

    #[test]
    fn test_project_path() {
        let temp = tempfile::TempDir::new().unwrap();
        let root = temp.path().canonicalize().unwrap();
        std::fs::create_dir(root.join("bar")).unwrap();

        assert_eq!(project_path(&root, Path::new("bar/x.go")).unwrap(), "bar/x.go");
        assert_eq!(project_path(&root, &root.join("bar")).unwrap(), "bar");
        assert_eq!(project_path(&root, &root).unwrap(), ".");

        let outside = root.parent().unwrap().join("elsewhere");
        assert!(matches!(
            project_path(&root, &outside),
            Err(ConfigError::PathOutsideProject { .. })
        ));
    }
}
