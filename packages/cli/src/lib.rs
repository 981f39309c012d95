//! `routable-token` command line tool
//!
//! Thin shell over `routable_token`: mint tokens from static routing values
//! and decode tokens for debugging edge routing.

#![forbid(unsafe_code)]

pub mod commands;

use commands::{Cli, Commands};
use log::info;
use routable_common::LoggingTransformer;
use routable_token::{
    decode, decode_with_prefix, ConfigError, DecodeError, RoutableToken, RoutableTokenCodec,
    RoutingPayload, RoutingValue, RoutingValueSource, TokenCodecConfig, TokenError,
};
use thiserror::Error;

/// CLI failures
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded or is invalid
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Token minting failed
    #[error(transparent)]
    Token(#[from] TokenError),

    /// Token failed to decode
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// JSON rendering failed
    #[error("failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Execute a parsed command and return what should be printed
///
/// # Errors
///
/// Returns a [`CliError`] when configuration, minting or decoding fails.
pub fn run(cli: Cli) -> Result<String, CliError> {
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Generate {
            prefix,
            cell_id,
            routes,
            required,
        } => {
            let mut config = config;
            if let Some(cell_id) = cell_id {
                config.cell_id = Some(cell_id);
            }
            if let Some(required) = required {
                config.required_keys = required.into_iter().collect();
            }
            generate(config, &prefix, &routes, cli.json)
        }
        Commands::Inspect { token, prefix } => inspect(&token, prefix.as_deref(), cli.json),
    }
}

fn load_config(cli: &Cli) -> Result<TokenCodecConfig, CliError> {
    let config = match &cli.config {
        Some(path) => TokenCodecConfig::from_file(path)?,
        None => TokenCodecConfig::default(),
    };
    Ok(config.apply_env()?)
}

fn routing_value(raw: &str) -> RoutingValue {
    raw.parse::<i64>()
        .map_or_else(|_| RoutingValue::from(raw), RoutingValue::Integer)
}

fn generate(
    config: TokenCodecConfig,
    prefix: &str,
    routes: &[(String, String)],
    json: bool,
) -> Result<String, CliError> {
    let codec: RoutableTokenCodec<()> = RoutableToken::builder().with_config(config).build()?;

    let mut payload = RoutingPayload::new();
    for (key, value) in routes {
        payload.insert(key.as_str(), RoutingValueSource::fixed(routing_value(value)));
    }

    let token = codec.generate_token(&(), &payload, prefix)?;

    if json {
        // Read the payload back from the token instead of resolving it again.
        let minted = decode(token.as_str())?;
        return Ok(serde_json::to_string_pretty(&serde_json::json!({
            "token": token.as_str(),
            "payload": minted.payload(),
        }))?);
    }
    Ok(token.into_string())
}

fn inspect(token: &str, prefix: Option<&str>, json: bool) -> Result<String, CliError> {
    let decoded = match prefix {
        Some(prefix) => decode_with_prefix(token, prefix),
        None => decode(token),
    }
    .inspect_err(|err| LoggingTransformer::log_token_rejected(token, err))?;
    info!("Token inspected (fingerprint: {})", LoggingTransformer::fingerprint(token));

    if json {
        let routing: serde_json::Map<String, serde_json::Value> = decoded
            .routing()
            .iter()
            .map(|(key, value)| (key.to_string(), serde_json::Value::from(value.as_str())))
            .collect();
        return Ok(serde_json::to_string_pretty(&serde_json::json!({
            "prefix": decoded.prefix(),
            "routing": routing,
            "random_bytes": hex::encode(decoded.random_bytes()),
            "checksum": "ok",
        }))?);
    }

    let mut lines = vec![format!("prefix: {:?}", decoded.prefix())];
    lines.extend(
        decoded
            .routing()
            .iter()
            .map(|(key, value)| format!("{key}: {value}")),
    );
    lines.push(format!(
        "random_bytes: {} ({} bytes)",
        hex::encode(decoded.random_bytes()),
        decoded.random_bytes().len()
    ));
    lines.push("checksum: ok".to_string());
    Ok(lines.join("\n"))
}
