//! Ambient glue for watchtower services: settings loading, tracing
//! initialization, a concrete ethers-backed chain client and an in-memory
//! action store for crash-recovery bookkeeping.

#![warn(unused_extern_crates)]
#![forbid(unsafe_code)]

pub mod action_store;
pub mod client;
pub mod settings;
pub mod trace;

pub use action_store::MemoryActionStore;
pub use client::EthereumChainClient;
pub use settings::{ChainConf, ResponderConf, Settings, SignerConf};
