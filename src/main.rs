#[tokio::main]
async fn main() -> anyhow::Result<()> {
    symbol_scraper::run().await?;
    Ok(())
}
