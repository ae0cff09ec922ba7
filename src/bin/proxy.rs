//! Standalone forwarding proxy
//!
//! Serves `/api/submit`, `/api/summary` and `/api/group` in front of the
//! script endpoint named by `GAS_ENDPOINT`. Survey clients talk to this so
//! the endpoint URL never ships to them.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use kansei_survey::config::ProxyConfig;
use kansei_survey::server;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = ProxyConfig::from_env()?;
    println!("\n{}", "═".repeat(60));
    println!("🛰  Kansei Survey Proxy");
    println!("{}", "═".repeat(60));
    println!("listen:   {}", config.bind_addr);
    println!("upstream: {}", config.upstream);
    println!("{}\n", "═".repeat(60));

    server::serve(config).await
}
