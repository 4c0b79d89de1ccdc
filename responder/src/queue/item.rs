use derive_new::new;
use ethers::types::{Address, Bytes, TransactionRequest, U256};

use watchtower_core::{AppointmentId, ResponseSpec};

/// The content identity of a transaction: what would be submitted,
/// independent of the nonce and fee it is submitted at. Two fingerprints are
/// equal iff the signing chain, recipient, call data, value and gas limit all
/// match. This is the sole join key between a transaction the chain reports
/// mined and an item the queue tracks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, new, serde::Serialize, serde::Deserialize)]
pub struct TxFingerprint {
    /// Chain the transaction is signed for
    pub chain_id: u64,
    /// Recipient contract
    pub to: Address,
    /// Encoded call data
    pub data: Bytes,
    /// Ether value attached
    pub value: U256,
    /// Gas limit of the call
    pub gas_limit: U256,
}

impl TxFingerprint {
    /// Fingerprint of the transaction a response specification would produce.
    pub fn from_response(chain_id: u64, response: &ResponseSpec) -> Self {
        TxFingerprint {
            chain_id,
            to: response.to,
            data: response.data.clone(),
            value: response.value,
            gas_limit: response.gas_limit,
        }
    }
}

/// One obligation's desire to respond: the transaction it wants on-chain and
/// the gas price the fee estimator considered ideal at request time.
/// Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, new, serde::Serialize, serde::Deserialize)]
pub struct QueueItemRequest {
    /// The obligation this request responds for
    pub appointment_id: AppointmentId,
    /// What to submit
    pub fingerprint: TxFingerprint,
    /// Gas price the estimator returned when the request was formed
    pub ideal_fee: U256,
}

/// A request bound to the nonce and the (possibly escalated) gas price at
/// which it was last or will next be broadcast. The nonce is positional:
/// the item's rank in the queue plus the queue's base nonce.
#[derive(Debug, Clone, PartialEq, Eq, new, serde::Serialize, serde::Deserialize)]
pub struct QueueItem {
    /// The underlying request
    pub request: QueueItemRequest,
    /// Account nonce this item currently occupies
    pub nonce: u64,
    /// Gas price offered at this nonce
    pub fee: U256,
}

impl QueueItem {
    /// The transaction this item is currently owed to the network as.
    pub fn to_transaction_request(&self) -> TransactionRequest {
        TransactionRequest::new()
            .to(self.request.fingerprint.to)
            .data(self.request.fingerprint.data.clone())
            .value(self.request.fingerprint.value)
            .gas(self.request.fingerprint.gas_limit)
            .gas_price(self.fee)
            .nonce(self.nonce)
            .chain_id(self.request.fingerprint.chain_id)
    }
}
