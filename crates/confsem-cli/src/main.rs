//! # confsem CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use confsem_cli::inspect::{run_inspect, InspectArgs};
use confsem_cli::refs::{run_refs, RefsArgs};

/// Configuration semantics engine.
///
/// Walks an already-parsed configuration document against its schema,
/// resolving dependent block bodies, and matches references against the
/// targets they point to.
#[derive(Parser, Debug)]
#[command(name = "confsem", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Walk a document and print every visited node with its walk state.
    Inspect(InspectArgs),

    /// Extract targets and origins and resolve definitions.
    Refs(RefsArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Inspect(args) => run_inspect(&args),
        Commands::Refs(args) => run_refs(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parse_inspect() {
        let cli = Cli::try_parse_from([
            "confsem",
            "inspect",
            "--schema",
            "schema.yaml",
            "--document",
            "main.json",
            "--json",
        ])
        .unwrap();
        match cli.command {
            Commands::Inspect(args) => {
                assert_eq!(args.schema.to_str(), Some("schema.yaml"));
                assert_eq!(args.document.to_str(), Some("main.json"));
                assert!(args.json);
            }
            other => panic!("expected inspect, got {other:?}"),
        }
    }

    #[test]
    fn cli_parse_refs_with_position() {
        let cli = Cli::try_parse_from([
            "confsem",
            "-vv",
            "refs",
            "--schema",
            "s.yaml",
            "--document",
            "d.yaml",
            "--at",
            "3:14",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Refs(args) => {
                let at = args.at.unwrap();
                assert_eq!((at.line, at.column), (3, 14));
            }
            other => panic!("expected refs, got {other:?}"),
        }
    }

    #[test]
    fn cli_rejects_malformed_position() {
        let result = Cli::try_parse_from([
            "confsem", "refs", "--schema", "s.yaml", "--document", "d.yaml", "--at", "3",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn cli_requires_schema() {
        assert!(Cli::try_parse_from(["confsem", "inspect", "--document", "d.yaml"]).is_err());
    }

    #[test]
    fn cli_verbose_is_global() {
        let cli = Cli::try_parse_from([
            "confsem", "inspect", "--schema", "s.yaml", "--document", "d.yaml", "-v",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 1);
    }
}
