//! Serverless entry point: reads one proxy event as JSON from stdin and
//! writes the proxy response as JSON to stdout.

use anyhow::Context;
use greeting_api::serverless::{handler, ProxyEvent};
use greeting_api::{create_router, Config};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries the response
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?;
    config.log_startup();
    let router = create_router(&config);

    let mut input = String::new();
    tokio::io::stdin()
        .read_to_string(&mut input)
        .await
        .context("failed to read event from stdin")?;
    let event: ProxyEvent = serde_json::from_str(&input).context("invalid proxy event")?;

    let response = handler(&router, config.stage.as_deref(), event).await?;

    let mut output = serde_json::to_vec(&response)?;
    output.push(b'\n');
    let mut stdout = tokio::io::stdout();
    stdout.write_all(&output).await?;
    stdout.flush().await?;

    Ok(())
}
