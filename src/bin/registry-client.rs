//! Command-line client for the account registry.

use std::error::Error;
use std::process;
use std::time::Duration;

use account_registry::Client;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "registry-client", version, about, long_about = None)]
struct Cli {
    /// Server host
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
    /// Server port
    #[arg(long, default_value_t = 8080)]
    port: u16,
    /// Give up on a call after this many milliseconds
    #[arg(long, default_value_t = 1000)]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create an account
    Create {
        #[arg(long)]
        name: String,
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        amount: i64,
    },
    /// Delete an account
    Delete {
        #[arg(long)]
        name: String,
    },
    /// Rename an account, keeping its amount
    ChangeName {
        #[arg(long)]
        name: String,
        #[arg(long)]
        new_name: String,
    },
    /// Overwrite an account's amount
    ChangeAmount {
        #[arg(long)]
        name: String,
        #[arg(long, allow_hyphen_values = true)]
        new_amount: i64,
    },
    /// Show an account
    Get {
        #[arg(long)]
        name: String,
    },
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();
    let timeout = Duration::from_millis(cli.timeout_ms);
    let mut client = Client::connect((cli.host.as_str(), cli.port), timeout).await?;

    let confirmation = match cli.command {
        Command::Create { name, amount } => client.create(&name, amount).await?,
        Command::Delete { name } => client.delete(&name).await?,
        Command::ChangeName { name, new_name } => client.rename(&name, &new_name).await?,
        Command::ChangeAmount { name, new_amount } => client.set_amount(&name, new_amount).await?,
        Command::Get { name } => {
            let account = client.get(&name).await?;
            format!("Account name: {}, amount: {}", account.name, account.amount)
        }
    };
    println!("{}", confirmation);
    Ok(())
}
