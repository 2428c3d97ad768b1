//! # CLI Behavior
//!
//! This is **one possible UI client** for Seahorse, not the application itself.
//! The CLI is the only place that knows about terminal I/O, exit codes, and output formatting.
//!
//! For the library architecture, see the `seahorse_core` crate documentation.
//!
//! ## Naked Execution (`seahorse`)
//!
//! Running `seahorse` with no arguments defaults to `seahorse list`.
//!
//! ## Selecting Things
//!
//! Items are addressed by id. Any unique prefix of the id's hex form works,
//! so the 8-character ids shown by `list` are enough. Categories and tags are
//! addressed by name (case-insensitive) or by id prefix.
//!
//! `add --tag <name>` and `tag <bookmark> <name>` create the tag when no tag
//! of that name exists yet.
//!
//! ## Output
//!
//! Text output is for people. `--json` prints the core types as JSON on
//! stdout. Diagnostics always go to stderr through `tracing`; set
//! `SEAHORSE_LOG=debug` (or pass `-v`) to see them.
//!
//! ## Module Structure
//!
//! - `commands`: Entry point, logging setup, dispatch, the `config` subcommand
//! - `handlers`: Per-command logic: resolve selectors, call the orchestrator, print
//! - `render`: Text formatting (item rows, detail view, summaries)
//! - `setup`: Argument parsing via clap

mod commands;
mod handlers;
mod render;
pub mod setup;

pub use commands::run;
