//! SOICO CTA command-line shell.
//!
//! Thin wrapper over the CTA crates: seeds and edits records, renders blocks
//! and prints diagnostics. Business logic lives in `crates/`.

mod commands;
mod state;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use commands::ListOptions;
use soico_core::AppConfig;
use soico_records::RecordFamily;
use state::AppState;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "soico-cta", version, about = "Affiliate CTA records and widgets")]
struct Cli {
    /// Configuration file (defaults to the XDG config path)
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FamilyArg {
    Securities,
    Cardloan,
}

impl From<FamilyArg> for RecordFamily {
    fn from(arg: FamilyArg) -> Self {
        match arg {
            FamilyArg::Securities => Self::Securities,
            FamilyArg::Cardloan => Self::CardLoan,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Insert default records and settings where absent
    Seed,
    /// List records in priority order
    List {
        #[arg(long, value_enum, default_value = "securities")]
        family: FamilyArg,
        /// Only enabled records
        #[arg(long)]
        enabled: bool,
        /// Maximum rows (0 = all)
        #[arg(long, default_value_t = 0)]
        limit: usize,
        /// Bypass the record cache
        #[arg(long)]
        no_cache: bool,
    },
    /// Add a record
    Add {
        slug: String,
        name: String,
        #[arg(long, value_enum, default_value = "securities")]
        family: FamilyArg,
        /// Create the record disabled
        #[arg(long)]
        disabled: bool,
    },
    /// Delete a record
    Delete {
        slug: String,
        #[arg(long, value_enum, default_value = "securities")]
        family: FamilyArg,
    },
    /// Enable or disable a record
    Toggle {
        slug: String,
        #[arg(long, action = ArgAction::Set, value_name = "BOOL")]
        enabled: bool,
        #[arg(long, value_enum, default_value = "securities")]
        family: FamilyArg,
    },
    /// Assign priorities 1..n in the given order
    Reorder {
        #[arg(required = true)]
        slugs: Vec<String>,
        #[arg(long, value_enum, default_value = "securities")]
        family: FamilyArg,
    },
    /// Render a block, e.g. `soico-cta/comparison-table`
    Render {
        block: String,
        /// Record slug for single-record widgets
        #[arg(long)]
        company: Option<String>,
        /// Row limit for comparison tables
        #[arg(long)]
        limit: Option<usize>,
        /// Full attribute bag as a JSON object
        #[arg(long, value_name = "JSON")]
        attrs: Option<String>,
        /// Prepend the family's CSS variables
        #[arg(long)]
        css: bool,
    },
    /// List published links of the link service
    Links {
        #[arg(long)]
        search: Option<String>,
    },
    /// Print configuration and data diagnostics
    Diagnose,
}

/// Initialize tracing subscriber for logging
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,soico=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

async fn run(cli: Cli) -> soico_core::Result<String> {
    let config = AppConfig::load_with_env(cli.config.as_deref())?;
    let state = AppState::open(config).await?;

    match cli.command {
        Command::Seed => commands::seed(&state).await,
        Command::List {
            family,
            enabled,
            limit,
            no_cache,
        } => {
            let options = ListOptions {
                enabled_only: enabled,
                limit,
                no_cache,
            };
            commands::list(&state, family.into(), options).await
        }
        Command::Add {
            slug,
            name,
            family,
            disabled,
        } => commands::add(&state, family.into(), &slug, &name, !disabled).await,
        Command::Delete { slug, family } => commands::delete(&state, family.into(), &slug).await,
        Command::Toggle {
            slug,
            enabled,
            family,
        } => commands::toggle(&state, family.into(), &slug, enabled).await,
        Command::Reorder { slugs, family } => {
            commands::reorder(&state, family.into(), &slugs).await
        }
        Command::Render {
            block,
            company,
            limit,
            attrs,
            css,
        } => {
            commands::render(
                &state,
                &block,
                attrs.as_deref(),
                company.as_deref(),
                limit,
                css,
            )
            .await
        }
        Command::Links { search } => commands::links(&state, search.as_deref()).await,
        Command::Diagnose => commands::diagnose(&state).await,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    info!("Starting soico-cta v{}", env!("CARGO_PKG_VERSION"));

    let output = run(Cli::parse()).await?;
    println!("{}", output.trim_end());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_toggle() {
        let cli = Cli::try_parse_from([
            "soico-cta",
            "toggle",
            "aiful",
            "--enabled",
            "false",
            "--family",
            "cardloan",
        ])
        .expect("parse");

        match cli.command {
            Command::Toggle {
                slug,
                enabled,
                family,
            } => {
                assert_eq!(slug, "aiful");
                assert!(!enabled);
                assert_eq!(RecordFamily::from(family), RecordFamily::CardLoan);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_render_with_global_config() {
        let cli = Cli::try_parse_from([
            "soico-cta",
            "render",
            "soico-cta/comparison-table",
            "--limit",
            "5",
            "--config",
            "/tmp/soico.toml",
        ])
        .expect("parse");

        assert_eq!(cli.config, Some(PathBuf::from("/tmp/soico.toml")));
        assert!(matches!(cli.command, Command::Render { limit: Some(5), .. }));
    }
}
