//! Alloy Chain Client - `ChainClient` over JSON-RPC
//!
//! Implements the `ChainClient` port with alloy-rs 0.9:
//! - `estimate_gas` / `query` via `eth_estimateGas` / `eth_call`
//! - `send` signs a legacy-priced transaction locally with the caller's
//!   key and broadcasts the raw envelope
//! - `get_receipt` maps `eth_getTransactionReceipt` to `ReceiptInfo`
//!
//! Node errors are classified so the engine can tell reverts and gas
//! rejections from transport failures.

use std::future::Future;
use std::sync::Arc;

use alloy::network::{EthereumWallet, ReceiptResponse, TransactionBuilder};
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use alloy::transports::{RpcError, TransportError, TransportResult};
use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::domain::transfer::{Account, ContractCall, ReceiptInfo};
use crate::ports::chain_client::{ChainClient, ChainError};

use super::provider::RpcProvider;

/// Map an alloy transport error onto the port's error classes.
pub fn classify(err: TransportError) -> ChainError {
    match err {
        RpcError::ErrorResp(payload) => {
            let message = payload.message.to_string();
            if message.to_lowercase().contains("revert") {
                ChainError::Reverted(message)
            } else {
                ChainError::Rejected(message)
            }
        }
        other => ChainError::Network(other.to_string()),
    }
}

/// `ChainClient` backed by a shared alloy provider.
pub struct AlloyChainClient {
    provider: Arc<RpcProvider>,
}

impl AlloyChainClient {
    pub const fn new(provider: Arc<RpcProvider>) -> Self {
        Self { provider }
    }

    /// Run one RPC request under the configured timeout.
    async fn timed<T>(&self, fut: impl Future<Output = TransportResult<T>>) -> Result<T, ChainError> {
        match tokio::time::timeout(self.provider.request_timeout(), fut).await {
            Ok(result) => result.map_err(classify),
            Err(_) => Err(ChainError::Network(format!(
                "RPC request timed out after {:?}",
                self.provider.request_timeout()
            ))),
        }
    }

    fn request(call: &ContractCall) -> TransactionRequest {
        TransactionRequest::default()
            .with_from(call.from)
            .with_to(call.to)
            .with_value(call.value)
            .with_input(call.data.clone())
    }
}

#[async_trait]
impl ChainClient for AlloyChainClient {
    #[instrument(skip(self, call), fields(to = %call.to))]
    async fn estimate_gas(&self, call: &ContractCall) -> Result<u64, ChainError> {
        let inner = self.provider.inner();
        let tx = Self::request(call);
        self.timed(async { inner.estimate_gas(&tx).await }).await
    }

    #[instrument(skip(self, account, call), fields(to = %call.to, gas_limit))]
    async fn send(
        &self,
        account: &Account,
        call: &ContractCall,
        gas_limit: u64,
    ) -> Result<TxHash, ChainError> {
        let signer: PrivateKeySigner = account
            .signing_key
            .expose()
            .parse()
            .map_err(|_| ChainError::Rejected("signing key is not a valid secp256k1 key".into()))?;

        if signer.address() != call.from {
            return Err(ChainError::Rejected(format!(
                "signing key does not control {}",
                call.from
            )));
        }

        let inner = self.provider.inner();

        let nonce = self
            .timed(async { inner.get_transaction_count(call.from).pending().await })
            .await?;
        let gas_price = self.timed(async { inner.get_gas_price().await }).await?;

        debug!(nonce, gas_price, "Signing transaction");

        let wallet = EthereumWallet::from(signer);
        let envelope = Self::request(call)
            .with_nonce(nonce)
            .with_gas_limit(gas_limit)
            .with_gas_price(gas_price)
            .with_chain_id(self.provider.chain_id())
            .build(&wallet)
            .await
            .map_err(|e| ChainError::Rejected(e.to_string()))?;

        let pending = self
            .timed(async { inner.send_tx_envelope(envelope).await })
            .await?;

        Ok(*pending.tx_hash())
    }

    async fn get_receipt(&self, hash: TxHash) -> Result<ReceiptInfo, ChainError> {
        let inner = self.provider.inner();
        let receipt = self
            .timed(async { inner.get_transaction_receipt(hash).await })
            .await?;

        let Some(receipt) = receipt else {
            return Ok(ReceiptInfo::pending());
        };

        Ok(ReceiptInfo {
            block_number: receipt.block_number(),
            success: receipt.status(),
            from: Some(receipt.from()),
            to: receipt.to(),
            gas_used: u64::try_from(receipt.gas_used()).ok(),
            cumulative_gas_used: u64::try_from(receipt.cumulative_gas_used()).ok(),
            effective_gas_price: u128::try_from(receipt.effective_gas_price()).ok(),
        })
    }

    async fn query(&self, contract: Address, data: Bytes) -> Result<Bytes, ChainError> {
        let inner = self.provider.inner();
        let tx = TransactionRequest::default()
            .with_to(contract)
            .with_input(data);
        self.timed(async { inner.call(&tx).await }).await
    }

    async fn native_balance(&self, owner: Address) -> Result<U256, ChainError> {
        let inner = self.provider.inner();
        self.timed(async { inner.get_balance(owner).await }).await
    }

    async fn is_healthy(&self) -> bool {
        self.provider.is_healthy().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::rpc::json_rpc::ErrorPayload;
    use alloy::transports::TransportErrorKind;

    fn error_resp(message: &'static str) -> TransportError {
        RpcError::ErrorResp(ErrorPayload {
            code: -32000,
            message: message.into(),
            data: None,
        })
    }

    #[test]
    fn test_classify_revert() {
        assert!(matches!(
            classify(error_resp("execution reverted: ERC20: transfer amount exceeds balance")),
            ChainError::Reverted(_)
        ));
    }

    #[test]
    fn test_classify_gas_rejection() {
        let err = classify(error_resp("Transaction gas allowance exceeded"));
        assert!(matches!(err, ChainError::Rejected(_)));
        assert!(err.is_gas_related());
    }

    #[test]
    fn test_classify_transport() {
        let err = classify(TransportErrorKind::backend_gone());
        assert!(matches!(err, ChainError::Network(_)));
    }
}
