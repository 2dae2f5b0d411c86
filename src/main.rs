//! Haggle CLI binary

use anyhow::Context;
use clap::Parser;
use haggle::cli::{Cli, Commands, HaggleApp};
use haggle::{extract_prices, next_price, GameConfig, Money};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    // Logs go to stderr so they stay out of the game transcript
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.into_command() {
        Commands::Play(args) => {
            let config = GameConfig::try_from(args).context("invalid game configuration")?;
            tracing::info!(
                "Starting game: {} attempts, prices {}..={}",
                config.rules.max_attempts,
                config.rules.price_min,
                config.rules.price_max
            );

            let mut app = HaggleApp::new(config).context("could not start the game")?;
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            app.run(stdin, tokio::io::stdout()).await?;
        }

        Commands::Extract { text } => {
            let prices = extract_prices(&text);
            if prices.is_empty() {
                println!("No prices found");
            }
            for price in prices {
                println!("{}", Money(price));
            }
        }

        Commands::NextPrice {
            player,
            owner,
            current,
        } => {
            anyhow::ensure!(current > 0.0, "current price must be positive");
            let price = next_price(&player, &owner, Money(current));
            println!("{} -> {}", Money(current), price);
        }
    }

    Ok(())
}
