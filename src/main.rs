//! Binary entrypoint

use anyhow::Result;
use paddock::RunMode;

#[tokio::main]
async fn main() -> Result<()> {
    let mode = match std::env::args().nth(1).as_deref() {
        Some("once") => RunMode::Once,
        None => RunMode::Serve,
        Some(other) => anyhow::bail!("Unknown argument '{}' (expected 'once')", other),
    };

    paddock::run(mode).await?;
    Ok(())
}
