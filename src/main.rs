use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use workshop_core::{Network, WorkshopConfig};
use workshop_horizon::HorizonHttpClient;
use workshop_soroban::SorobanHttpClient;
use workshop_soroswap::SoroswapHttpClient;

const USAGE: &str = "usage: stellar-workshop <scenario>\n\
    scenarios:\n\
    \x20 asset-lifecycle   wallets, custom asset, locked supply, pool, swap\n\
    \x20 horizon-pools     two assets and three liquidity pools\n\
    \x20 soroswap-swap     issue, deploy to Soroban, trade via the aggregator";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file (ignore if not found)
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    let scenario = match std::env::args().nth(1) {
        Some(name) => name,
        None => {
            eprintln!("{USAGE}");
            std::process::exit(2);
        }
    };

    let config = match WorkshopConfig::from_env() {
        Ok(config) => {
            info!(
                horizon = %config.horizon_url,
                soroban = %config.soroban_rpc_url,
                aggregator = %config.soroswap.base_url,
                network = %config.network.passphrase(),
                "configuration loaded"
            );
            config
        }
        Err(e) => {
            error!(error = %e, "failed to load configuration");
            std::process::exit(1);
        }
    };

    // One client per external service, constructed here and passed into the
    // workflows; no global singletons.
    let horizon = HorizonHttpClient::new(&config.horizon_url)?;
    let soroban = SorobanHttpClient::new(&config.soroban_rpc_url)?;
    let network_label = if config.network.passphrase() == Network::PUBLIC_PASSPHRASE {
        "mainnet"
    } else {
        "testnet"
    };
    let soroswap = SoroswapHttpClient::new(&config.soroswap, network_label)?;
    if !config.soroswap.is_configured() {
        info!("SOROSWAP_API_KEY not set, trading phases will run quote-only");
    }

    let result = match scenario.as_str() {
        "asset-lifecycle" => workshop_scenarios::asset_lifecycle::run(&horizon, &config).await,
        "horizon-pools" => workshop_scenarios::horizon_pools::run(&horizon, &config).await,
        "soroswap-swap" => {
            workshop_scenarios::soroswap_swap::run(&horizon, &soroban, &soroswap, &config).await
        }
        other => {
            eprintln!("unknown scenario {other:?}\n{USAGE}");
            std::process::exit(2);
        }
    };

    // Single outer boundary: log the failure with its full chain and exit.
    // Already-submitted transactions stay submitted; there is no rollback.
    if let Err(e) = result {
        error!(error = %e, scenario = %scenario, "scenario failed");
        std::process::exit(1);
    }

    info!(scenario = %scenario, "scenario completed");
    Ok(())
}
