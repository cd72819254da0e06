//! Token descriptors.
//!
//! A token is either the network's native coin or an ERC-20 contract.
//! The kind drives transfer dispatch: only the contract path needs an
//! allowance step.

use alloy::primitives::Address;
use serde::Serialize;

/// Decimal precision of the native coin's base unit (wei).
pub const NATIVE_DECIMALS: u8 = 18;

/// How a token is moved on-chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TokenKind {
    /// Native coin, moved by a plain value transfer.
    Native,
    /// ERC-20 contract, moved by `transfer(to, amount)`.
    Erc20 {
        /// Token contract address.
        contract: Address,
        /// Address whose allowance is checked and approved before transfers.
        spender: Address,
    },
}

/// Immutable description of a supported token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TokenDescriptor {
    /// Symbol or display name (e.g. "KCAL").
    pub name: String,
    /// Decimal precision reported by the contract.
    pub decimals: u8,
    /// Native or contract-mediated.
    #[serde(flatten)]
    pub kind: TokenKind,
}

impl TokenDescriptor {
    /// The native coin of the connected network.
    pub fn native(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            decimals: NATIVE_DECIMALS,
            kind: TokenKind::Native,
        }
    }

    /// An ERC-20 token whose spender is the contract itself.
    pub fn erc20(name: impl Into<String>, contract: Address, decimals: u8) -> Self {
        Self {
            name: name.into(),
            decimals,
            kind: TokenKind::Erc20 {
                contract,
                spender: contract,
            },
        }
    }

    /// Override the allowance spender.
    #[must_use]
    pub fn with_spender(mut self, spender: Address) -> Self {
        if let TokenKind::Erc20 { contract, .. } = self.kind {
            self.kind = TokenKind::Erc20 { contract, spender };
        }
        self
    }

    pub const fn is_native(&self) -> bool {
        matches!(self.kind, TokenKind::Native)
    }

    /// Contract address, `None` for the native coin.
    pub const fn contract(&self) -> Option<Address> {
        match self.kind {
            TokenKind::Native => None,
            TokenKind::Erc20 { contract, .. } => Some(contract),
        }
    }
}

impl std::fmt::Display for TokenDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            TokenKind::Native => write!(f, "{} (native)", self.name),
            TokenKind::Erc20 { contract, .. } => write!(f, "{} ({contract})", self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    #[test]
    fn test_native_descriptor() {
        let t = TokenDescriptor::native("FITFI");
        assert!(t.is_native());
        assert_eq!(t.decimals, 18);
        assert_eq!(t.contract(), None);
    }

    #[test]
    fn test_erc20_spender_defaults_to_contract() {
        let kcal = address!("68b2DFC494362AAE300F2C401019205d8960226b");
        let t = TokenDescriptor::erc20("KCAL", kcal, 18);
        assert_eq!(
            t.kind,
            TokenKind::Erc20 {
                contract: kcal,
                spender: kcal
            }
        );

        let router = address!("00000000000000000000000000000000000000aa");
        let t = t.with_spender(router);
        assert_eq!(
            t.kind,
            TokenKind::Erc20 {
                contract: kcal,
                spender: router
            }
        );
    }

    #[test]
    fn test_with_spender_ignored_for_native() {
        let t = TokenDescriptor::native("FITFI").with_spender(Address::ZERO);
        assert!(t.is_native());
    }
}
