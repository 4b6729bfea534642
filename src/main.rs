mod cli;
mod config;
mod errors;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cli::run().await
}
