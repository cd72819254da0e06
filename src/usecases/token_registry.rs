//! Token Registry - On-chain Verification of Token Metadata
//!
//! Configured decimals are a correctness-critical fact: a mismatch with
//! the deployed contract silently scales every amount by a power of ten.
//! At startup each ERC-20's `decimals()` is read and compared with the
//! configuration, and its `name()` is logged next to the configured one.
//!
//! `refresh` can be re-run at any time to re-verify.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

use crate::domain::erc20;
use crate::domain::error::TransferError;
use crate::domain::token::{NATIVE_DECIMALS, TokenDescriptor, TokenKind};
use crate::ports::chain_client::ChainClient;

/// Why a token failed verification.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// Configured precision disagrees with the deployed contract.
    #[error("{token} is configured with {configured} decimals but the contract reports {onchain}")]
    DecimalsMismatch {
        token: String,
        configured: u8,
        onchain: u8,
    },

    /// `decimals()` could not be read.
    #[error("cannot verify {token}: {source}")]
    Unreadable {
        token: String,
        #[source]
        source: TransferError,
    },
}

/// Result of verifying one token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenVerification {
    pub name: String,
    pub configured_decimals: u8,
    pub onchain_decimals: u8,
    /// `name()` reported by the contract, if it implements it.
    pub onchain_name: Option<String>,
}

impl TokenVerification {
    pub const fn decimals_match(&self) -> bool {
        self.configured_decimals == self.onchain_decimals
    }
}

/// Configured tokens, verified against the chain.
pub struct TokenRegistry<C: ChainClient> {
    chain: Arc<C>,
    tokens: RwLock<Vec<TokenDescriptor>>,
}

impl<C: ChainClient> TokenRegistry<C> {
    pub fn new(chain: Arc<C>, tokens: Vec<TokenDescriptor>) -> Self {
        Self {
            chain,
            tokens: RwLock::new(tokens),
        }
    }

    /// All configured tokens.
    pub async fn tokens(&self) -> Vec<TokenDescriptor> {
        self.tokens.read().await.clone()
    }

    /// Look a token up by name (case-insensitive).
    pub async fn find(&self, name: &str) -> Option<TokenDescriptor> {
        self.tokens
            .read()
            .await
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
            .cloned()
    }

    /// Re-read decimals and names for every token.
    ///
    /// # Errors
    /// Fails on the first token whose on-chain decimals differ from the
    /// configuration, or whose `decimals()` cannot be read.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<Vec<TokenVerification>, RegistryError> {
        let tokens = self.tokens().await;
        let mut results = Vec::with_capacity(tokens.len());

        for token in &tokens {
            let verification = self
                .verify(token)
                .await
                .map_err(|source| RegistryError::Unreadable {
                    token: token.name.clone(),
                    source,
                })?;

            if !verification.decimals_match() {
                warn!(
                    token = %token.name,
                    configured = verification.configured_decimals,
                    onchain = verification.onchain_decimals,
                    "Token decimals mismatch"
                );
                return Err(RegistryError::DecimalsMismatch {
                    token: token.name.clone(),
                    configured: verification.configured_decimals,
                    onchain: verification.onchain_decimals,
                });
            }

            info!(
                token = %token.name,
                decimals = verification.onchain_decimals,
                onchain_name = verification.onchain_name.as_deref().unwrap_or("-"),
                "Token verified"
            );
            results.push(verification);
        }

        Ok(results)
    }

    async fn verify(&self, token: &TokenDescriptor) -> Result<TokenVerification, TransferError> {
        let TokenKind::Erc20 { contract, .. } = token.kind else {
            return Ok(TokenVerification {
                name: token.name.clone(),
                configured_decimals: token.decimals,
                onchain_decimals: NATIVE_DECIMALS,
                onchain_name: None,
            });
        };

        let raw = self.chain.query(contract, erc20::decimals()).await?;
        let onchain_decimals =
            erc20::decode_u8("decimals", &raw).map_err(|e| TransferError::Network(e.to_string()))?;

        // name() is optional in ERC-20
        let onchain_name = match self.chain.query(contract, erc20::name()).await {
            Ok(raw) => erc20::decode_string("name", &raw).ok(),
            Err(_) => None,
        };

        Ok(TokenVerification {
            name: token.name.clone(),
            configured_decimals: token.decimals,
            onchain_decimals,
            onchain_name,
        })
    }
}
