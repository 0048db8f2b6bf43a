//! # tokenctl: Token Pipeline Developer Utility
//!
//! Runs the pure pipeline against local files, or a pull against the
//! configured remote, from the command line.
//!
//! ## Usage
//! ```bash
//! # Normalize + resolve + validate a token document
//! cargo run -p lumen-sync --bin tokenctl -- validate tokens.json
//!
//! # Print the generated CSS-variable / utility bindings
//! cargo run -p lumen-sync --bin tokenctl -- bindings tokens.json
//!
//! # Pull token files from the configured remote repository
//! LUMEN_GITHUB_TOKEN=ghp_... LUMEN_SYNC_REPO=acme/design-tokens \
//!     cargo run -p lumen-sync --bin tokenctl -- pull
//! ```

use std::env;
use std::process::ExitCode;
use std::sync::Arc;

use tracing::error;

use lumen_core::bindings::generate_bindings;
use lumen_core::normalize::parse_and_normalize;
use lumen_core::resolve::resolve;
use lumen_core::validation::validate;
use lumen_sync::{GitHubTransport, MemoryStore, SyncClient, SyncConfig};

fn usage() -> ExitCode {
    eprintln!("Usage: tokenctl <validate|bindings> <file.json>");
    eprintln!("       tokenctl pull");
    ExitCode::FAILURE
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("validate") => match args.get(2) {
            Some(path) => run_validate(path),
            None => usage(),
        },
        Some("bindings") => match args.get(2) {
            Some(path) => run_bindings(path),
            None => usage(),
        },
        Some("pull") => run_pull().await,
        _ => usage(),
    }
}

fn load_tree(path: &str) -> Result<lumen_core::TokenTree, ExitCode> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        error!(%path, error = %e, "Could not read file");
        ExitCode::FAILURE
    })?;
    parse_and_normalize(&raw, None).map_err(|e| {
        error!(%path, error = %e, "Could not normalize document");
        ExitCode::FAILURE
    })
}

fn run_validate(path: &str) -> ExitCode {
    let tree = match load_tree(path) {
        Ok(tree) => tree,
        Err(code) => return code,
    };

    let resolution = resolve(&tree);
    let report = validate(&tree, Some(&resolution));

    match serde_json::to_string_pretty(&report) {
        Ok(rendered) => println!("{}", rendered),
        Err(e) => {
            error!(error = %e, "Could not render report");
            return ExitCode::FAILURE;
        }
    }

    if report.valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn run_bindings(path: &str) -> ExitCode {
    let tree = match load_tree(path) {
        Ok(tree) => tree,
        Err(code) => return code,
    };

    let resolution = resolve(&tree);
    for (path, binding) in generate_bindings(&resolution.tree.flatten()) {
        println!("{}\t{}\t{}", path, binding.variable, binding.utility);
    }
    ExitCode::SUCCESS
}

async fn run_pull() -> ExitCode {
    let config = match SyncConfig::load_or_default(None) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Could not load sync config");
            return ExitCode::FAILURE;
        }
    };

    let transport = match GitHubTransport::new(&config) {
        Ok(transport) => transport,
        Err(e) => {
            error!(error = %e, "Invalid sync configuration");
            return ExitCode::FAILURE;
        }
    };

    let client = SyncClient::new(transport, config, Arc::new(MemoryStore::new()));
    match client.pull().await {
        Ok(outcome) => {
            for file in &outcome.files_found {
                println!("{}", file);
            }
            println!("Pulled {} token file(s)", outcome.files_found.len());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Pull failed");
            ExitCode::FAILURE
        }
    }
}
