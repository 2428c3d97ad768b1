//! # Seahorse CLI
//!
//! The binary is intentionally thin: the CLI lives in `src/cli/`, while this
//! file only invokes `cli::run()` and handles process termination.
//!
//! ## Workspace Structure
//!
//! - `crates/seahorse-core/`: the library (store, cache, orchestrator, paths)
//! - `crates/seahorse/`: this CLI, depends on `seahorse-core`
//!
//! ## Environment
//!
//! * `SEAHORSE_DATA_DIR` - default storage root
//! * `SEAHORSE_CONFIG_DIR` - where `settings.json` and `seahorse.toml` live
//! * `SEAHORSE_LOG` - log filter, e.g. `debug` or `seahorse_core=trace`

mod cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
