use derive_new::new;
use ethers::types::{Address, Bytes, U256};

/// What an obligation wants submitted on-chain if its trigger fires. The
/// call data arrives already ABI-encoded by the protocol-specific adapter;
/// the engine treats it as opaque bytes.
#[derive(Debug, Clone, PartialEq, Eq, new, serde::Serialize, serde::Deserialize)]
pub struct ResponseSpec {
    /// Contract to call
    pub to: Address,
    /// Encoded call data
    pub data: Bytes,
    /// Ether value to attach
    pub value: U256,
    /// Gas limit for the call
    pub gas_limit: U256,
}
