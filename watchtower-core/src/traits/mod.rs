mod action_store;
mod chain_client;
mod estimator;

pub use action_store::{Action, ActionId, ActionStore};
pub use chain_client::ChainClient;
pub use estimator::FeeEstimator;
