use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use client_core::{HttpProductApi, ProductApi, ProductListController};
use shared::domain::{DraftInput, ProductId};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod render;
mod shell;

use config::{load_settings, normalize_api_url};
use render::render;

#[derive(Parser, Debug)]
#[command(about = "Manage products held by the product API")]
struct Cli {
    /// Product collection url, e.g. http://localhost:8001/api/products
    #[arg(long, global = true)]
    api_url: Option<String>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the product list.
    List,
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        price: String,
    },
    Update {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        price: String,
    },
    Delete {
        #[arg(long)]
        id: i64,
    },
    /// Interactive session on stdin (default).
    Shell,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = load_settings();
    if let Some(api_url) = cli.api_url {
        settings.api_url = api_url;
    }

    let filter = EnvFilter::try_new(&settings.log_filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let api_url = normalize_api_url(&settings.api_url)?;
    info!(api_url = %api_url, "dashboard: using product api");
    let controller = ProductListController::new(HttpProductApi::new(api_url));

    match cli.command.unwrap_or(Command::Shell) {
        Command::Shell => shell::run(&controller, tokio::io::stdin(), tokio::io::stdout()).await,
        command => run_once(&controller, command).await,
    }
}

async fn run_once<A: ProductApi>(
    controller: &ProductListController<A>,
    command: Command,
) -> Result<()> {
    controller.start().await;

    match command {
        Command::List | Command::Shell => {}
        Command::Add { name, price } => controller.create(DraftInput::new(name, price)).await,
        Command::Update { id, name, price } => {
            let loaded = controller.snapshot().await;
            if let Some(message) = loaded.error_message() {
                print!("{}", render(&loaded));
                bail!(message);
            }
            if !controller.begin_edit_id(ProductId(id)).await {
                print!("{}", render(&controller.snapshot().await));
                bail!("no product #{id} in the list");
            }
            controller.update(DraftInput::new(name, price)).await;
        }
        Command::Delete { id } => controller.delete(ProductId(id)).await,
    }

    let state = controller.snapshot().await;
    print!("{}", render(&state));
    if let Some(message) = state.error_message() {
        bail!(message);
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
