//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `config.toml`, validating all parameters,
//! and providing clear error messages for misconfiguration.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use tracing::info;

use crate::domain::token::NATIVE_DECIMALS;

use super::AppConfig;

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
  let path = Path::new(path);

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  let config = parse_config(&content)?;

  info!(
    tokens = config.tokens.len(),
    chain_id = config.chain.chain_id,
    max_retries = config.gas.max_retries,
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<AppConfig> {
  let config: AppConfig = toml::from_str(content)
    .with_context(|| "Failed to parse config.toml")?;

  validate_config(&config)?;
  Ok(config)
}

/// Validate all configuration parameters.
///
/// Checks for:
/// - Escalation factors strictly above 1
/// - A single native token with 18 decimals
/// - Unique token names
/// - Non-empty endpoints
fn validate_config(config: &AppConfig) -> Result<()> {
  // Chain validation
  anyhow::ensure!(
    !config.chain.rpc_url.is_empty(),
    "RPC URL must not be empty"
  );
  anyhow::ensure!(
    config.chain.request_timeout_secs > 0,
    "request_timeout_secs must be positive"
  );

  // Gas validation
  anyhow::ensure!(
    config.gas.safety_margin >= Decimal::ONE,
    "gas safety_margin must be >= 1, got {}",
    config.gas.safety_margin
  );
  anyhow::ensure!(
    config.gas.escalation_factor > Decimal::ONE,
    "gas escalation_factor must be > 1, got {}",
    config.gas.escalation_factor
  );

  // Confirmation validation
  anyhow::ensure!(
    config.confirmation.timeout_secs > 0,
    "confirmation timeout_secs must be positive"
  );

  // Token validation
  anyhow::ensure!(
    !config.tokens.is_empty(),
    "At least one token must be configured"
  );

  let natives: Vec<_> = config.tokens.iter().filter(|t| t.contract.is_none()).collect();
  anyhow::ensure!(
    natives.len() == 1,
    "Exactly one native token (no contract) must be configured, got {}",
    natives.len()
  );
  anyhow::ensure!(
    natives[0].decimals == NATIVE_DECIMALS,
    "Native token {} must use {} decimals, got {}",
    natives[0].name,
    NATIVE_DECIMALS,
    natives[0].decimals
  );

  let mut seen = HashSet::new();
  for (i, token) in config.tokens.iter().enumerate() {
    anyhow::ensure!(!token.name.is_empty(), "Token {} has empty name", i);
    anyhow::ensure!(
      seen.insert(token.name.to_ascii_lowercase()),
      "Token name {} is configured twice",
      token.name
    );
    anyhow::ensure!(
      token.spender.is_none() || token.contract.is_some(),
      "Token {} sets a spender but has no contract",
      token.name
    );
  }

  Ok(())
}
