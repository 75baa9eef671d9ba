use anyhow::Result;
use clap::Parser;

use chainwatch::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Execute with error handling
    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            tracing::error!("Application error: {}", e);

            // Log error chain if available
            for cause in e.chain().skip(1) {
                tracing::error!("   Caused by: {}", cause);
            }

            Err(e)
        }
    }
}
