//! Delivery CLI: command-line client for the food delivery API.
//!
//! Configured through `DELIVERY_*` variables (or a `.env` file). `login`
//! stores credentials in `DELIVERY_SESSION_FILE` so later commands run
//! signed in; `logout` removes them.

use std::io;
use std::process::ExitCode;

use chrono::Utc;
use clap::{Parser, Subcommand};
use delivery_api_client::{ApiClient, CredentialStore, Session};
use delivery_cli::{
    init_tracing, parse_item, print_json, render, report_error, stored_session_client, ItemArg,
    OutputFormat,
};
use delivery_core::models::{find_menu_item, SignUpRequest};
use delivery_core::{ClientConfig, ClientError};
use delivery_services::{CartAggregator, CatalogDesk, QuoteOutcome, SubscriptionDesk};

#[derive(Parser)]
#[command(name = "delivery", about = "Food delivery API CLI")]
struct Cli {
    /// Output format
    #[arg(long, value_enum, default_value = "table", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and remember the credentials
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget stored credentials
    Logout,
    /// Create an account
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        address: String,
    },
    /// List restaurants and their menus
    Restaurants,
    /// List subscription plans and whether they can be bought
    Plans,
    /// Buy a subscription plan starting today
    Purchase {
        /// Plan ID from `plans`
        plan_id: i64,
    },
    /// List your subscriptions
    Subscriptions,
    /// Renew a subscription for one more period
    Renew {
        /// Subscription ID from `subscriptions`
        id: i64,
    },
    /// Delete a subscription
    Delete { id: i64 },
    /// End a subscription immediately
    Expire { id: i64 },
    /// Price a cart without ordering
    Quote {
        /// Product and quantity as ID:QTY (repeatable)
        #[arg(long = "item", value_parser = parse_item, required = true)]
        items: Vec<ItemArg>,
    },
    /// Place an order
    Order {
        /// Product and quantity as ID:QTY (repeatable)
        #[arg(long = "item", value_parser = parse_item, required = true)]
        items: Vec<ItemArg>,
        /// Notes for the restaurant
        #[arg(long, default_value = "")]
        notes: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = ClientConfig::from_env()?;
    let store = CredentialStore::new(&config.session_file);
    let format = cli.format;

    match cli.command {
        Commands::Login { email, password } => {
            let client = ApiClient::from_config(&config, Session::anonymous())?;
            let account = client.authenticate(&email, &password).await?;
            if let Some(credentials) = client.session().credentials() {
                store.save(&credentials)?;
            }
            match format {
                OutputFormat::Json => print_json(&account)?,
                OutputFormat::Table => println!("Signed in as {}", email.trim()),
            }
        }
        Commands::Logout => {
            let removed = store.clear()?;
            match format {
                OutputFormat::Json => print_json(&serde_json::json!({ "signed_out": removed }))?,
                OutputFormat::Table if removed => println!("Signed out"),
                OutputFormat::Table => println!("Not signed in"),
            }
        }
        Commands::Register {
            name,
            email,
            password,
            address,
        } => {
            let client = ApiClient::from_config(&config, Session::anonymous())?;
            let request = SignUpRequest {
                name,
                email,
                password,
                address,
            };
            let account = client.register(&request).await?;
            match format {
                OutputFormat::Json => print_json(&account)?,
                OutputFormat::Table => println!(
                    "Account created for {}. Run `delivery login` to sign in.",
                    request.email
                ),
            }
        }
        Commands::Restaurants => {
            let client = stored_session_client(&config, &store)?;
            let restaurants = client.fetch_restaurants_with_menus().await?;
            match format {
                OutputFormat::Json => print_json(&restaurants)?,
                OutputFormat::Table => {
                    render::restaurants(&mut io::stdout().lock(), &restaurants)?
                }
            }
        }
        Commands::Plans => {
            let mut desk = CatalogDesk::new(stored_session_client(&config, &store)?);
            desk.load().await?;
            let offers = desk.offers(Utc::now());
            match format {
                OutputFormat::Json => print_json(&offers)?,
                OutputFormat::Table => render::offers(&mut io::stdout().lock(), &offers)?,
            }
        }
        Commands::Purchase { plan_id } => {
            let mut desk = CatalogDesk::new(stored_session_client(&config, &store)?);
            desk.load().await?;
            let request = desk.purchase(plan_id, Utc::now()).await?;
            match format {
                OutputFormat::Json => print_json(&request)?,
                OutputFormat::Table => println!(
                    "Subscribed to plan {} from {} to {}",
                    plan_id, request.start_date, request.end_date
                ),
            }
        }
        Commands::Subscriptions => {
            let desk = subscription_desk(&config, &store).await?;
            let now = Utc::now();
            let statuses = desk.statuses(now);
            match format {
                OutputFormat::Json => print_json(&statuses)?,
                OutputFormat::Table => render::subscriptions(
                    &mut io::stdout().lock(),
                    &statuses,
                    desk.expiry_warning(now),
                )?,
            }
        }
        Commands::Renew { id } => {
            let mut desk = subscription_desk(&config, &store).await?;
            let request = desk.renew(id, Utc::now()).await?;
            match format {
                OutputFormat::Json => print_json(&request)?,
                OutputFormat::Table => println!(
                    "Subscription {} renewed from {} to {}",
                    id, request.start_date, request.end_date
                ),
            }
        }
        Commands::Delete { id } => {
            let mut desk = subscription_desk(&config, &store).await?;
            desk.delete(id).await?;
            print_done(format, format!("Subscription {} deleted", id))?;
        }
        Commands::Expire { id } => {
            let mut desk = subscription_desk(&config, &store).await?;
            desk.expire_now(id).await?;
            print_done(format, format!("Subscription {} set to expire", id))?;
        }
        Commands::Quote { items } => {
            let mut aggregator = filled_cart(&config, &store, &items).await?;
            if let QuoteOutcome::Failed = aggregator.refresh_quote().await {
                anyhow::bail!("Error calculating total price");
            }
            match format {
                OutputFormat::Json => print_json(&aggregator.quote())?,
                OutputFormat::Table => render::quote(
                    &mut io::stdout().lock(),
                    aggregator.cart(),
                    &aggregator.quote(),
                )?,
            }
        }
        Commands::Order { items, notes } => {
            let mut aggregator = filled_cart(&config, &store, &items).await?;
            aggregator.set_notes(notes);
            let confirmation = aggregator.place_order().await?;
            match format {
                OutputFormat::Json => print_json(&confirmation)?,
                OutputFormat::Table => match confirmation.order_id() {
                    Some(order_id) => println!("Order {} placed", order_id),
                    None => println!("Order placed"),
                },
            }
        }
    }

    Ok(())
}

async fn subscription_desk(
    config: &ClientConfig,
    store: &CredentialStore,
) -> anyhow::Result<SubscriptionDesk<ApiClient>> {
    let mut desk = SubscriptionDesk::new(
        stored_session_client(config, store)?,
        config.lifecycle_policy(),
    );
    desk.reload().await?;
    Ok(desk)
}

/// Build a cart from `--item` arguments, resolving products against the menus.
async fn filled_cart(
    config: &ClientConfig,
    store: &CredentialStore,
    items: &[ItemArg],
) -> anyhow::Result<CartAggregator<ApiClient>> {
    let client = stored_session_client(config, store)?;
    let restaurants = client.fetch_restaurants_with_menus().await?;

    let mut aggregator = CartAggregator::new(client);
    for item in items {
        let product = find_menu_item(&restaurants, item.product_id)
            .ok_or_else(|| ClientError::NotFound(format!("product {}", item.product_id)))?;
        // superseded by the refresh or order that follows
        let _ = aggregator.add_item(product, item.quantity)?;
    }
    Ok(aggregator)
}

fn print_done(format: OutputFormat, message: String) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            print_json(&serde_json::json!({ "success": true, "message": message }))
        }
        OutputFormat::Table => {
            println!("{}", message);
            Ok(())
        }
    }
}
