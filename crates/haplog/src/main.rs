use haplog::runtime::{boot, stream};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    boot::init_logging();
    let config = boot::boot()?;
    stream::run(config).await
}
