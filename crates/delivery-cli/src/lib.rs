//! Helpers shared by the `delivery` binary: argument parsing, output and
//! error reporting.

pub mod render;

use anyhow::{bail, Context};
use clap::ValueEnum;
use delivery_api_client::{ApiClient, CredentialStore};
use delivery_core::{ClientConfig, ClientError, ErrorMetadata, LogLevel};
use serde::Serialize;

/// How command results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
}

/// One `--item ID:QTY` argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemArg {
    pub product_id: i64,
    pub quantity: u32,
}

/// Parse `ID:QTY`; a bare `ID` means one unit.
pub fn parse_item(arg: &str) -> anyhow::Result<ItemArg> {
    let (id, quantity) = match arg.split_once(':') {
        Some((id, quantity)) => (id, quantity),
        None => (arg, "1"),
    };
    let product_id = id
        .trim()
        .parse::<i64>()
        .with_context(|| format!("invalid product id in {:?}", arg))?;
    let quantity = quantity
        .trim()
        .parse::<u32>()
        .with_context(|| format!("invalid quantity in {:?}", arg))?;
    if quantity == 0 {
        bail!("quantity must be at least 1 in {:?}", arg);
    }
    Ok(ItemArg {
        product_id,
        quantity,
    })
}

/// Client carrying whatever credentials `store` holds.
///
/// With nothing stored the requests go out unauthenticated and the service
/// decides whether to answer them.
pub fn stored_session_client(
    config: &ClientConfig,
    store: &CredentialStore,
) -> anyhow::Result<ApiClient> {
    let session = store.session()?;
    if !session.is_authenticated() {
        tracing::debug!(path = %store.path().display(), "no stored session, sending anonymously");
    }
    ApiClient::from_config(config, session).context("Failed to create API client")
}

/// Truncate a string to max_len characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

pub fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

/// Print the one-shot message for a failed command.
///
/// Client errors show their user message and suggested action; anything else
/// prints its full context chain.
pub fn report_error(err: &anyhow::Error) {
    let Some(client_err) = err.downcast_ref::<ClientError>() else {
        eprintln!("Error: {:#}", err);
        return;
    };

    let code = client_err.error_code();
    match client_err.log_level() {
        LogLevel::Debug => tracing::debug!(code, error = %client_err, "command failed"),
        LogLevel::Warn => tracing::warn!(code, error = %client_err, "command failed"),
        LogLevel::Error => tracing::error!(code, error = %client_err, "command failed"),
    }

    eprintln!("{}", client_err.user_message());
    if let Some(action) = client_err.suggested_action() {
        eprintln!("  {}", action);
    }
}

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}
