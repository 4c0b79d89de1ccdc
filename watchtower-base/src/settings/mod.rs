//! Settings for watchtower services, loaded from a file overlaid with
//! environment variables.

mod loader;

pub use loader::load_settings;

use watchtower_core::QueuePolicy;

/// Connection details for the chain node.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ChainConf {
    /// HTTP JSON-RPC endpoint of the node
    pub rpc_url: String,
}

/// The responder's signing key.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct SignerConf {
    /// Hex-encoded private key of the responding account
    pub key: String,
}

/// Tuning for the responder engine.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ResponderConf {
    /// Maximum number of concurrently in-flight transactions per account.
    /// Nodes cap the pending transactions they pool per sender (Parity:
    /// max(16, 1% of the pool); Geth: 64 by default), so this must stay
    /// comfortably below those limits.
    #[serde(default = "default_max_queue_depth")]
    pub max_queue_depth: usize,
    /// Minimum percentage fee increase nodes require before accepting a
    /// replacement transaction at an already-used nonce. Parity requires
    /// 12.5%, Geth defaults to 10%; 13 satisfies both.
    #[serde(default = "default_replacement_rate")]
    pub replacement_rate: u32,
    /// How the queue ranks pending items on insertion.
    #[serde(default)]
    pub policy: QueuePolicy,
}

impl Default for ResponderConf {
    fn default() -> Self {
        ResponderConf {
            max_queue_depth: default_max_queue_depth(),
            replacement_rate: default_replacement_rate(),
            policy: QueuePolicy::default(),
        }
    }
}

fn default_max_queue_depth() -> usize {
    12
}

fn default_replacement_rate() -> u32 {
    13
}

/// Top-level settings for a watchtower service.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct Settings {
    /// Chain connection
    pub chain: ChainConf,
    /// Signing account
    pub signer: SignerConf,
    /// Responder engine tuning
    #[serde(default)]
    pub responder: ResponderConf,
}
