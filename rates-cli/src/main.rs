//! Rates CLI
//!
//! Command-line interface for the USD/UAH rate API.

use anyhow::Result;
use clap::{Parser, Subcommand};

use rates_client::RatesClient;

#[derive(Parser)]
#[command(name = "rates")]
#[command(author, version, about = "USD/UAH rate API CLI client", long_about = None)]
struct Cli {
    /// Base URL of the rate API
    #[arg(long, env = "RATES_API_URL", default_value = "http://localhost:8080")]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the API is up
    Ping,
    /// Print the current USD to UAH rate
    Rate,
    /// Subscribe an email address to the rate broadcast
    Subscribe {
        /// Email address
        email: String,
    },
    /// Email the current rate to every subscriber now
    SendEmails,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let client = RatesClient::new(&cli.api_url);

    match cli.command {
        Commands::Ping => {
            if client.ping().await? {
                println!("✓ pong");
            } else {
                println!("✗ API did not answer pong");
                std::process::exit(1);
            }
        }

        Commands::Rate => {
            let rate = client.rate().await?;
            println!("1 USD = {rate:.2} UAH");
        }

        Commands::Subscribe { email } => match client.subscribe(&email).await {
            Ok(_) => println!("✓ {email} subscribed"),
            Err(e) if e.is_conflict() => {
                println!("✗ {email} is already subscribed");
                std::process::exit(1);
            }
            Err(e) => return Err(e.into()),
        },

        Commands::SendEmails => {
            client.send_emails().await?;
            println!("✓ Rate emails sent");
        }
    }

    Ok(())
}
