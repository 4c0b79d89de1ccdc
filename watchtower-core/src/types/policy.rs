/// How the fee queue ranks pending items when a new request is inserted.
///
/// Insertion is stable under every policy: items that compare equal never
/// swap places, so a run of equally-priced requests is always served in
/// arrival order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum QueuePolicy {
    /// Requests with a higher ideal gas price respond first, preempting
    /// cheaper pending items onto later nonces.
    #[default]
    FeeDescending,
    /// Strict arrival order; a new request always takes the next free nonce
    /// and never displaces pending items.
    FifoByArrival,
}
