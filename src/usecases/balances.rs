//! Balance Aggregator - Per-token Balance Snapshot
//!
//! Queries every configured token's balance for an address concurrently,
//! converts base units to decimals with each token's precision, and
//! returns a fresh snapshot. Nothing is cached.
//!
//! A failing token query does not fail the snapshot: that token carries
//! an error marker and the remaining balances are still reported.

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, U256};
use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::domain::error::TransferError;
use crate::domain::token::{TokenDescriptor, TokenKind};
use crate::domain::{erc20, units};
use crate::ports::chain_client::ChainClient;

use super::cancel::CancelSignal;

/// Outcome of one token's balance query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BalanceOutcome {
    Ok {
        /// Balance in base units.
        raw: U256,
        amount: Decimal,
    },
    Failed {
        kind: &'static str,
        error: String,
    },
}

/// One row of a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenBalance {
    pub token: TokenDescriptor,
    #[serde(flatten)]
    pub outcome: BalanceOutcome,
}

/// Balances of one address across all configured tokens.
#[derive(Debug, Clone, Serialize)]
pub struct BalanceSnapshot {
    pub address: Address,
    pub balances: Vec<TokenBalance>,
    pub taken_at: DateTime<Utc>,
}

impl BalanceSnapshot {
    /// Decimal balance of the token named `name`, if its query succeeded.
    pub fn amount(&self, name: &str) -> Option<Decimal> {
        self.balances
            .iter()
            .find(|b| b.token.name == name)
            .and_then(|b| match &b.outcome {
                BalanceOutcome::Ok { amount, .. } => Some(*amount),
                BalanceOutcome::Failed { .. } => None,
            })
    }

    /// True when every token query succeeded.
    pub fn is_complete(&self) -> bool {
        self.balances
            .iter()
            .all(|b| matches!(b.outcome, BalanceOutcome::Ok { .. }))
    }

    pub fn failed_count(&self) -> usize {
        self.balances
            .iter()
            .filter(|b| matches!(b.outcome, BalanceOutcome::Failed { .. }))
            .count()
    }
}

/// Reads balances for every configured token.
pub struct BalanceAggregator<C: ChainClient> {
    chain: Arc<C>,
    tokens: Vec<TokenDescriptor>,
    /// Upper bound for each token's query.
    query_timeout: Duration,
}

impl<C: ChainClient> BalanceAggregator<C> {
    pub const fn new(chain: Arc<C>, tokens: Vec<TokenDescriptor>, query_timeout: Duration) -> Self {
        Self {
            chain,
            tokens,
            query_timeout,
        }
    }

    pub fn tokens(&self) -> &[TokenDescriptor] {
        &self.tokens
    }

    /// Snapshot all token balances of `address`.
    ///
    /// # Errors
    /// `InvalidRequest` for an unparsable address, `Cancelled` if the
    /// signal fires first. Per-token failures are reported in the snapshot.
    #[instrument(skip(self, cancel))]
    pub async fn get_balances(
        &self,
        address: &str,
        cancel: &CancelSignal,
    ) -> Result<BalanceSnapshot, TransferError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(TransferError::invalid("address is empty"));
        }
        let owner: Address = address
            .parse()
            .map_err(|_| TransferError::invalid(format!("not a valid address: {address}")))?;

        let queries = self.tokens.iter().map(|token| self.query_one(owner, token));

        let balances = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(TransferError::Cancelled { hash: None }),
            balances = join_all(queries) => balances,
        };

        let snapshot = BalanceSnapshot {
            address: owner,
            balances,
            taken_at: Utc::now(),
        };

        info!(
            tokens = snapshot.balances.len(),
            failed = snapshot.failed_count(),
            "Balance snapshot built"
        );
        Ok(snapshot)
    }

    async fn query_one(&self, owner: Address, token: &TokenDescriptor) -> TokenBalance {
        let outcome = match tokio::time::timeout(self.query_timeout, self.raw_balance(owner, token)).await {
            Ok(Ok(raw)) => match units::from_smallest_units(raw, token.decimals) {
                Ok(amount) => BalanceOutcome::Ok { raw, amount },
                Err(e) => BalanceOutcome::Failed {
                    kind: "conversion_error",
                    error: e.to_string(),
                },
            },
            Ok(Err(e)) => BalanceOutcome::Failed {
                kind: e.kind(),
                error: e.to_string(),
            },
            Err(_) => BalanceOutcome::Failed {
                kind: "timeout",
                error: format!("balance query exceeded {:?}", self.query_timeout),
            },
        };

        if let BalanceOutcome::Failed { error, .. } = &outcome {
            warn!(token = %token.name, error = %error, "Balance query failed");
        }

        TokenBalance {
            token: token.clone(),
            outcome,
        }
    }

    async fn raw_balance(&self, owner: Address, token: &TokenDescriptor) -> Result<U256, TransferError> {
        match token.kind {
            TokenKind::Native => Ok(self.chain.native_balance(owner).await?),
            TokenKind::Erc20 { contract, .. } => {
                let raw = self.chain.query(contract, erc20::balance_of(owner)).await?;
                erc20::decode_u256("balanceOf", &raw).map_err(|e| TransferError::Network(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn row(name: &str, outcome: BalanceOutcome) -> TokenBalance {
        TokenBalance {
            token: TokenDescriptor::native(name),
            outcome,
        }
    }

    #[test]
    fn test_snapshot_helpers() {
        let snapshot = BalanceSnapshot {
            address: Address::ZERO,
            balances: vec![
                row(
                    "A",
                    BalanceOutcome::Ok {
                        raw: U256::from(5u8),
                        amount: dec!(5),
                    },
                ),
                row(
                    "B",
                    BalanceOutcome::Failed {
                        kind: "network_error",
                        error: "boom".into(),
                    },
                ),
            ],
            taken_at: Utc::now(),
        };

        assert_eq!(snapshot.amount("A"), Some(dec!(5)));
        assert_eq!(snapshot.amount("B"), None);
        assert_eq!(snapshot.amount("C"), None);
        assert!(!snapshot.is_complete());
        assert_eq!(snapshot.failed_count(), 1);
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let json = serde_json::to_value(row(
            "A",
            BalanceOutcome::Failed {
                kind: "timeout",
                error: "slow".into(),
            },
        ))
        .unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["kind"], "timeout");
        assert_eq!(json["token"]["name"], "A");
    }
}
