use clap::Parser;

use depot::cli;
use depot::error::Result;
use depot::transfer::TransferClient;

use depot::cli::Args;
use depot::config::load_client_config;

#[tokio::main]
async fn main() {
    env_logger::init();
    let args = Args::parse();

    if let Err(e) = run_app(args).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run_app(args: Args) -> Result<()> {
    let config = load_client_config()?;
    let client = TransferClient::new(config)?;
    cli::run(args, client).await?;
    Ok(())
}
