#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = azmoon_api::run().await {
        eprintln!("azmoon-api fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
