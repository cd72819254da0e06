//! Configuration Module - TOML-based Gateway Configuration
//!
//! Loads and validates configuration from `config.toml`.
//! RPC endpoint, token contracts, gas heuristics and polling cadence are
//! externalized here - nothing is hardcoded in the engine.

pub mod loader;

use std::time::Duration;

use alloy::primitives::Address;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::domain::gas::{DEFAULT_ESCALATION_FACTOR, DEFAULT_MAX_RETRIES, DEFAULT_SAFETY_MARGIN};
use crate::domain::token::TokenDescriptor;

/// Top-level gateway configuration.
///
/// Loaded from `config.toml` at startup. All fields are validated
/// before the gateway serves traffic.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
  /// Service identity and HTTP binding.
  pub service: ServiceConfig,
  /// RPC endpoint and network identity.
  pub chain: ChainConfig,
  /// Gas estimation and escalation heuristics.
  #[serde(default)]
  pub gas: GasConfig,
  /// Receipt polling cadence.
  #[serde(default)]
  pub confirmation: ConfirmationConfig,
  /// ERC-20 approval behaviour.
  #[serde(default)]
  pub allowance: AllowanceConfig,
  /// Balance query settings.
  #[serde(default)]
  pub balances: BalancesConfig,
  /// Supported tokens (exactly one native).
  pub tokens: Vec<TokenConfig>,
}

impl AppConfig {
  /// Token descriptors in configuration order.
  pub fn token_descriptors(&self) -> Vec<TokenDescriptor> {
    self.tokens.iter().map(TokenConfig::descriptor).collect()
  }
}

/// Service identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
  /// Human-readable service name.
  pub name: String,
  /// Log level (trace, debug, info, warn, error).
  #[serde(default = "default_log_level")]
  pub log_level: String,
  /// HTTP API bind address.
  #[serde(default = "default_bind_address")]
  pub bind_address: String,
}

/// Chain connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
  /// JSON-RPC endpoint.
  pub rpc_url: String,
  /// Expected chain ID, checked at connect time.
  pub chain_id: u64,
  /// Per-request timeout in seconds.
  #[serde(default = "default_request_timeout")]
  pub request_timeout_secs: u64,
}

/// Gas policy configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GasConfig {
  /// Multiplier applied to the estimate before the first send.
  #[serde(default = "default_safety_margin")]
  pub safety_margin: Decimal,
  /// Multiplier applied before each retry.
  #[serde(default = "default_escalation_factor")]
  pub escalation_factor: Decimal,
  /// Retries after the first send.
  #[serde(default = "default_max_retries")]
  pub max_retries: u32,
}

impl Default for GasConfig {
  fn default() -> Self {
    Self {
      safety_margin: DEFAULT_SAFETY_MARGIN,
      escalation_factor: DEFAULT_ESCALATION_FACTOR,
      max_retries: DEFAULT_MAX_RETRIES,
    }
  }
}

/// Receipt polling configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfirmationConfig {
  /// Delay between receipt queries (milliseconds).
  #[serde(default = "default_poll_interval")]
  pub poll_interval_ms: u64,
  /// Give up waiting after this many seconds.
  #[serde(default = "default_confirmation_timeout")]
  pub timeout_secs: u64,
}

impl ConfirmationConfig {
  pub const fn poll_interval(&self) -> Duration {
    Duration::from_millis(self.poll_interval_ms)
  }

  pub const fn timeout(&self) -> Duration {
    Duration::from_secs(self.timeout_secs)
  }
}

impl Default for ConfirmationConfig {
  fn default() -> Self {
    Self {
      poll_interval_ms: default_poll_interval(),
      timeout_secs: default_confirmation_timeout(),
    }
  }
}

/// How much an approval grants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalAmount {
  /// max uint256; one approval per owner/spender pair.
  #[default]
  Unlimited,
  /// Exactly the transfer amount.
  Exact,
}

/// Allowance configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AllowanceConfig {
  #[serde(default)]
  pub approval: ApprovalAmount,
  /// Also approve when a nonzero allowance is below the transfer amount.
  #[serde(default)]
  pub top_up_insufficient: bool,
}

/// Balance query configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BalancesConfig {
  /// Upper bound on each token's balance query (milliseconds).
  #[serde(default = "default_query_timeout")]
  pub query_timeout_ms: u64,
}

impl BalancesConfig {
  pub const fn query_timeout(&self) -> Duration {
    Duration::from_millis(self.query_timeout_ms)
  }
}

impl Default for BalancesConfig {
  fn default() -> Self {
    Self {
      query_timeout_ms: default_query_timeout(),
    }
  }
}

/// Individual token configuration.
///
/// A token without `contract` is the native coin.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenConfig {
  /// Display name, also the lookup key in requests.
  pub name: String,
  /// Decimal precision; verified on-chain at startup.
  pub decimals: u8,
  /// ERC-20 contract address.
  pub contract: Option<Address>,
  /// Allowance spender; defaults to the contract itself.
  pub spender: Option<Address>,
}

impl TokenConfig {
  pub fn descriptor(&self) -> TokenDescriptor {
    match self.contract {
      None => TokenDescriptor {
        decimals: self.decimals,
        ..TokenDescriptor::native(self.name.clone())
      },
      Some(contract) => {
        let token = TokenDescriptor::erc20(self.name.clone(), contract, self.decimals);
        match self.spender {
          Some(spender) => token.with_spender(spender),
          None => token,
        }
      }
    }
  }
}

// Default value functions for serde

fn default_log_level() -> String {
  "info".to_string()
}

fn default_bind_address() -> String {
  "0.0.0.0:8080".to_string()
}

fn default_request_timeout() -> u64 {
  30
}

fn default_safety_margin() -> Decimal {
  DEFAULT_SAFETY_MARGIN
}

fn default_escalation_factor() -> Decimal {
  DEFAULT_ESCALATION_FACTOR
}

fn default_max_retries() -> u32 {
  DEFAULT_MAX_RETRIES
}

fn default_poll_interval() -> u64 {
  1_000
}

fn default_confirmation_timeout() -> u64 {
  120
}

fn default_query_timeout() -> u64 {
  10_000
}
