//! # CLI Layer
//!
//! This module is **one possible UI client** for Seahorse, not the application itself.
//!
//! The CLI layer is the **only** place in the codebase that:
//! - Knows about terminal I/O (stdout, stderr)
//! - Installs a `tracing` subscriber
//! - Handles argument parsing
//! - Formats output for human consumption
//!
//! ## Responsibilities
//!
//! 1. **Argument Parsing**: Convert shell arguments into typed commands via clap
//! 2. **Logging**: Route library diagnostics to stderr, filtered by `SEAHORSE_LOG`
//! 3. **Context Setup**: Resolve the storage root and open the library
//! 4. **Dispatch**: Route commands to the handlers
//! 5. **Shutdown**: Flush collections and release the storage grant

use super::handlers::{self, OutputMode};
use super::setup::{
    Cli, Commands, ConfigCommands, CoreCommands, DataCommands, ItemCommands, ListArgs,
    MiscCommands, TaxonomyCommands,
};
use anyhow::{anyhow, Result};
use clap::Parser;
use clapfig::{Clapfig, ConfigAction, SearchPath};
use seahorse_core::config::{SeahorseConfig, CONFIG_FILE};
use seahorse_core::init::{initialize, SeahorseContext};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter (`tracing_subscriber` directive syntax).
pub const LOG_ENV: &str = "SEAHORSE_LOG";

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Text
    };

    let mut ctx = initialize();
    debug!(root = %ctx.root().path.display(), scoped = ctx.root().scoped, "library opened");
    let result = dispatch(&mut ctx, mode, cli.command);
    ctx.shutdown();
    result
}

fn init_logging(verbose: bool) {
    let default = if verbose { "seahorse=debug,seahorse_core=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    // A subscriber may already be installed when running under a test harness
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn dispatch(ctx: &mut SeahorseContext, mode: OutputMode, command: Option<Commands>) -> Result<()> {
    // Naked `seahorse` lists everything
    let Some(command) = command else {
        return handlers::list(ctx, mode, ListArgs::default());
    };

    match command {
        Commands::Core(cmd) => match cmd {
            CoreCommands::Add { what } => handlers::add(ctx, mode, what),
            CoreCommands::List(args) => handlers::list(ctx, mode, args),
            CoreCommands::Show { item } => handlers::show(ctx, mode, &item),
        },
        Commands::Item(cmd) => match cmd {
            ItemCommands::Delete { items } => handlers::delete(ctx, mode, &items),
            ItemCommands::Favorite { items } => handlers::set_favorite(ctx, mode, &items, true),
            ItemCommands::Unfavorite { items } => handlers::set_favorite(ctx, mode, &items, false),
            ItemCommands::Tag {
                bookmark,
                tag,
                toggle,
            } => handlers::tag(ctx, mode, &bookmark, &tag, toggle),
            ItemCommands::Untag { bookmark, tag } => handlers::untag(ctx, mode, &bookmark, &tag),
            ItemCommands::Move { item, category } => {
                handlers::move_item(ctx, mode, &item, category.as_deref())
            }
        },
        Commands::Taxonomy(cmd) => match cmd {
            TaxonomyCommands::Categories { action } => handlers::categories(ctx, mode, action),
            TaxonomyCommands::Tags { action } => handlers::tags(ctx, mode, action),
        },
        Commands::Data(cmd) => match cmd {
            DataCommands::Prefs { action } => handlers::prefs(ctx, mode, action),
            DataCommands::Flush => handlers::flush(ctx, mode),
            DataCommands::Backup { list } => handlers::backup(ctx, mode, list),
            DataCommands::Paths => handlers::paths(ctx, mode),
            DataCommands::Relocate { dir } => handlers::relocate(ctx, mode, &dir),
            DataCommands::ResetLocation => handlers::reset_location(ctx, mode),
            DataCommands::Export { dest, bookmarks } => {
                handlers::export(ctx, mode, &dest, bookmarks)
            }
            DataCommands::Import { source } => handlers::import(ctx, mode, &source),
        },
        Commands::Misc(MiscCommands::Config { action }) => {
            handle_config_command(action.as_ref(), ctx, mode)
        }
    }
}

/// Handle the `seahorse config` subcommand using clapfig directly.
fn handle_config_command(
    action: Option<&ConfigCommands>,
    ctx: &SeahorseContext,
    mode: OutputMode,
) -> Result<()> {
    match action {
        None => {
            // Bare `seahorse config` shows the values in effect
            let config = &ctx.config;
            if mode == OutputMode::Json {
                println!("{}", serde_json::to_string_pretty(config)?);
                return Ok(());
            }
            let table = toml::Value::try_from(config)?;
            if let toml::Value::Table(t) = table {
                for (k, v) in &t {
                    println!("{} = {}", k, format_toml_value(v));
                }
            }
            Ok(())
        }
        Some(ConfigCommands::Gen { output }) => {
            let action = ConfigAction::Gen {
                output: output.clone(),
            };
            let result = Clapfig::builder::<SeahorseConfig>()
                .app_name("seahorse")
                .file_name(CONFIG_FILE)
                .search_paths(load_paths(ctx))
                .no_env()
                .strict(false)
                .handle(&action)
                .map_err(|e| anyhow!("{}", e))?;
            print!("{result}");
            Ok(())
        }
    }
}

/// User config first, root config overrides it.
fn load_paths(ctx: &SeahorseContext) -> Vec<SearchPath> {
    vec![
        SearchPath::Path(ctx.config_dir().to_path_buf()),
        SearchPath::Path(ctx.root().path.clone()),
    ]
}

fn format_toml_value(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => format!("\"{}\"", s),
        other => other.to_string(),
    }
}
