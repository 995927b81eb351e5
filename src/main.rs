//! Release builder - builds, packages and signs the Windows installers.
//!
//! Usage: `release-builder <release|devbuild> <SIGNING_KEY_PATH>`

use std::process;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let exit_code = release_builder::cli::run().await;

    process::exit(exit_code);
}
