//! Batch linker for book notes.
//!
//! Reads the vault root from the first CLI argument, then `VAULT_ROOT`,
//! defaulting to the current directory; links every related-book mention
//! it can resolve and prints a one-line summary.

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shiori_vault::{link_all, VaultConfig};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shiori_vault=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let root = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("VAULT_ROOT").ok())
        .unwrap_or_else(|| ".".to_string());

    let report = link_all(VaultConfig::new(root))?;
    println!(
        "Linked segments: {}; files written: {}",
        report.segments_linked, report.files_written
    );
    Ok(())
}
