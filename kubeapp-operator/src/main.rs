use clap::Parser;
use kubeapp_operator::{controller, telemetry, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    telemetry::init(config.log_format);
    let client = kube::Client::try_default().await?;
    controller::run(client, config).await?;
    Ok(())
}
