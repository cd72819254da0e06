//! Gas Policy Engine - Estimate, Submit, Escalate
//!
//! Drives one submission through its retry sequence:
//! 1. Estimate gas if no limit is set (a revert here is final)
//! 2. Boost the limit by the safety margin
//! 3. Send and wait for the receipt
//! 4. On an on-chain failure or a gas-related rejection, escalate the
//!    limit and resend, up to `max_retries` times
//!
//! Every other error class leaves the loop immediately with its kind
//! intact. Each call owns a fresh `GasPolicy`, so concurrent submissions
//! never share gas state.

use rust_decimal::Decimal;
use tracing::{info, instrument, warn};

use crate::config::GasConfig;
use crate::domain::error::TransferError;
use crate::domain::gas::GasPolicy;
use crate::domain::transfer::{Account, ContractCall, SubmittedTransaction, TxStatus};
use crate::ports::chain_client::ChainClient;

use super::cancel::CancelSignal;
use super::confirmation::ConfirmationPoller;

/// Submits calls with adaptive gas escalation.
#[derive(Debug, Clone)]
pub struct GasPolicyEngine {
    safety_margin: Decimal,
    escalation_factor: Decimal,
    max_retries: u32,
    poller: ConfirmationPoller,
}

impl GasPolicyEngine {
    pub const fn new(config: &GasConfig, poller: ConfirmationPoller) -> Self {
        Self {
            safety_margin: config.safety_margin,
            escalation_factor: config.escalation_factor,
            max_retries: config.max_retries,
            poller,
        }
    }

    /// Fresh per-submission policy from this engine's settings.
    pub const fn policy(&self) -> GasPolicy {
        GasPolicy::new(self.safety_margin, self.escalation_factor, self.max_retries)
    }

    /// Submit `call` and wait for it to resolve.
    ///
    /// Returns the last resolved transaction once retries are spent,
    /// whatever its status; callers must inspect `status`.
    ///
    /// # Errors
    /// - `ExecutionReverted` if estimation reverts
    /// - `GasAllowanceExceeded` if the final send is still rejected for gas
    /// - `ConfirmationTimeout`, `Cancelled`, `Rejected`, `Network` unchanged
    #[instrument(skip_all, fields(to = %call.to, from = %call.from))]
    pub async fn submit<C: ChainClient + ?Sized>(
        &self,
        chain: &C,
        account: &Account,
        call: &ContractCall,
        mut policy: GasPolicy,
        cancel: &CancelSignal,
    ) -> Result<SubmittedTransaction, TransferError> {
        if policy.current_limit().is_none() {
            let estimate = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(TransferError::Cancelled { hash: None }),
                estimate = chain.estimate_gas(call) => estimate?,
            };
            info!(estimate, "Gas estimated");
            policy.seed(estimate);
        }

        policy.apply_margin();

        loop {
            let gas_limit = policy.record_attempt();
            let attempt = policy.attempts();

            let sent = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(TransferError::Cancelled { hash: None }),
                sent = chain.send(account, call, gas_limit) => sent,
            };

            match sent {
                Ok(hash) => {
                    info!(tx_hash = %hash, gas_limit, attempt, "Transaction broadcast");

                    let mut resolved = self
                        .poller
                        .await_transaction(chain, SubmittedTransaction::pending(hash, gas_limit), cancel)
                        .await?;
                    resolved.attempts = attempt;

                    if resolved.status == TxStatus::Failed && policy.can_retry() {
                        warn!(
                            tx_hash = %hash,
                            gas_limit,
                            attempt,
                            "Transaction failed on-chain, escalating gas"
                        );
                        policy.escalate();
                        continue;
                    }

                    return Ok(resolved);
                }
                Err(e) if e.is_gas_related() => {
                    if !policy.can_retry() {
                        warn!(error = %e, gas_limit, attempt, "Gas retries exhausted");
                        return Err(TransferError::GasAllowanceExceeded {
                            attempts: attempt,
                            last_gas_limit: gas_limit,
                        });
                    }
                    warn!(error = %e, gas_limit, attempt, "Send rejected for gas, escalating");
                    policy.escalate();
                }
                Err(e) => {
                    warn!(error = %e, attempt, "Send failed");
                    return Err(e.into());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::time::Duration;

    #[test]
    fn test_policy_from_config() {
        let cfg = GasConfig {
            safety_margin: dec!(1.5),
            escalation_factor: dec!(2),
            max_retries: 4,
        };
        let engine = GasPolicyEngine::new(
            &cfg,
            ConfirmationPoller::new(Duration::from_secs(1), Duration::from_secs(10)),
        );
        let mut p = engine.policy();
        assert_eq!(p.max_retries(), 4);
        assert_eq!(p.current_limit(), None);
        p.seed(100);
        p.apply_margin();
        assert_eq!(p.current_limit(), Some(150));
        p.escalate();
        assert_eq!(p.current_limit(), Some(300));
    }
}
