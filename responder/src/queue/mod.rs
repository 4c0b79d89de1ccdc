//! The fee queue: an immutable, ordered value describing every transaction
//! currently owed to the network from one signing account.
//!
//! Every transition is a pure function returning a new queue value, so the
//! responder can compute the exact set of transactions that need a fresh
//! broadcast as a structural difference between the old and new value.
//! Invariants, held at all times:
//!
//! - items are nonce-contiguous: the item at rank `i` occupies
//!   `base_nonce + i`; no gaps, no duplicates;
//! - the queue never exceeds its maximum depth;
//! - an item placed at a nonce any earlier item was ever broadcast at
//!   offers at least the highest fee ever offered there, scaled by the
//!   replacement rate, so the network accepts it as a replacement even
//!   while the mempool still holds the old broadcast;
//! - the front item's nonce never changes while it stays queued.

use std::collections::HashMap;

use ethers::types::U256;

use watchtower_core::QueuePolicy;

use crate::error::ResponderError;

mod item;
#[cfg(test)]
mod tests;

pub use item::{QueueItem, QueueItemRequest, TxFingerprint};

/// Ordered set of in-flight transactions for one account, plus the base
/// nonce (the nonce of the front item, i.e. the next nonce expected to be
/// mined), the replacement rate and the maximum depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeQueue {
    items: Vec<QueueItem>,
    base_nonce: u64,
    replacement_rate: u32,
    max_depth: usize,
    policy: QueuePolicy,
    /// Highest fee ever offered at each live nonce, across every
    /// predecessor of this queue. A nonce vacated by `consume` keeps its
    /// entry: the mempool still holds the old broadcast there, so a later
    /// occupant must still outbid it. Entries below the base nonce are
    /// dropped once the nonce is mined.
    floors: HashMap<u64, U256>,
}

impl FeeQueue {
    /// An empty queue starting at `base_nonce`. The replacement rate is the
    /// minimum percentage fee increase network nodes require before they
    /// accept a transaction replacing another at the same nonce.
    pub fn new(base_nonce: u64, replacement_rate: u32, max_depth: usize, policy: QueuePolicy) -> Self {
        FeeQueue {
            items: Vec::new(),
            base_nonce,
            replacement_rate,
            max_depth,
            policy,
            floors: HashMap::new(),
        }
    }

    /// Nonce of the front item; the next nonce expected to be mined.
    pub fn base_nonce(&self) -> u64 {
        self.base_nonce
    }

    /// Minimum percentage fee increase for a same-nonce replacement.
    pub fn replacement_rate(&self) -> u32 {
        self.replacement_rate
    }

    /// Maximum number of concurrently in-flight transactions.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Number of queued items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True iff nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// True iff no further item can be added.
    pub fn depth_reached(&self) -> bool {
        self.items.len() >= self.max_depth
    }

    /// Read-only view of the queued items, in nonce order.
    pub fn items(&self) -> &[QueueItem] {
        &self.items
    }

    /// The item expected to be confirmed next, if any.
    pub fn front(&self) -> Option<&QueueItem> {
        self.items.first()
    }

    /// True iff an item with this fingerprint is currently queued.
    pub fn contains(&self, fingerprint: &TxFingerprint) -> bool {
        self.position(fingerprint).is_some()
    }

    /// Rank of the item with this fingerprint, if queued.
    pub fn position(&self, fingerprint: &TxFingerprint) -> Option<usize> {
        self.items
            .iter()
            .position(|item| item.request.fingerprint == *fingerprint)
    }

    /// Insert a request, assigning it a nonce according to the queue's
    /// ordering policy. Fails if the queue is at maximum depth. Items
    /// displaced onto other nonces are repriced; the caller discovers them
    /// through [`FeeQueue::difference`] and must rebroadcast them.
    pub fn add(&self, request: QueueItemRequest) -> Result<FeeQueue, ResponderError> {
        if self.depth_reached() {
            return Err(ResponderError::QueueFull {
                max_depth: self.max_depth,
            });
        }
        Ok(self.insert(vec![request]))
    }

    /// Remove the front item and advance the base nonce. Used when the chain
    /// confirms the exact transaction at the front; no other item moves, so
    /// nothing needs rebroadcasting.
    pub fn dequeue(&self) -> Result<FeeQueue, ResponderError> {
        if self.items.is_empty() {
            return Err(ResponderError::EmptyQueue);
        }
        let mut next = self.clone();
        next.items.remove(0);
        next.base_nonce += 1;
        // the mined nonce can never be reused; its broadcast history is done
        next.floors.retain(|nonce, _| *nonce >= next.base_nonce);
        Ok(next)
    }

    /// Remove the item carrying this fingerprint from anywhere in the queue
    /// and close the nonce gap: every item ranked above it shifts down one
    /// position. Each shifted item takes a nonce another item occupied in
    /// this queue, so it is repriced as a replacement and needs a fresh
    /// broadcast. Used when the chain confirms a stale, previously-broadcast
    /// version of an item instead of the current front.
    pub fn consume(&self, fingerprint: &TxFingerprint) -> Result<FeeQueue, ResponderError> {
        let rank = self
            .position(fingerprint)
            .ok_or_else(|| ResponderError::NotFound(Box::new(fingerprint.clone())))?;

        let mut items = self.items[..rank].to_vec();
        for item in &self.items[rank + 1..] {
            let nonce = item.nonce - 1;
            let fee = self.reprice(&item.request, nonce);
            items.push(QueueItem::new(item.request.clone(), nonce, fee));
        }
        Ok(self.with_items(items))
    }

    /// Re-admit items the responder previously considered settled but which
    /// a reorg revealed are still outstanding. Items are merged back in
    /// under the same insertion rule as [`FeeQueue::add`]. Callers are
    /// responsible for staying within capacity.
    pub fn unlock(&self, items: Vec<QueueItem>) -> Result<FeeQueue, ResponderError> {
        if self.items.len() + items.len() > self.max_depth {
            return Err(ResponderError::QueueFull {
                max_depth: self.max_depth,
            });
        }
        let requests = items.into_iter().map(|item| item.request).collect();
        Ok(self.insert(requests))
    }

    /// Items present in `self` that are absent from `other`, or present with
    /// a different (nonce, fee). This is exactly the set of transactions
    /// that must be broadcast after a transition from `other` to `self`;
    /// rebroadcasting anything more would violate the replacement-rate
    /// invariant for untouched items.
    pub fn difference(&self, other: &FeeQueue) -> Vec<QueueItem> {
        self.items
            .iter()
            .filter(|item| {
                !other.items.iter().any(|o| {
                    o.request == item.request && o.nonce == item.nonce && o.fee == item.fee
                })
            })
            .cloned()
            .collect()
    }

    /// The smallest fee the network accepts as a replacement for `fee` at
    /// the same nonce, rounding up so the percentage bound always holds.
    /// Computed in 256-bit arithmetic; the configured rate never overflows.
    fn replacement_fee(&self, fee: U256) -> U256 {
        let rate = U256::from(100u64) + U256::from(self.replacement_rate);
        let scaled = fee.saturating_mul(rate);
        let (quotient, remainder) = scaled.div_mod(U256::from(100));
        if remainder.is_zero() {
            quotient
        } else {
            quotient + U256::one()
        }
    }

    /// Fee for placing `request` at `nonce`: the ideal fee if nothing was
    /// ever broadcast at that nonce, otherwise whatever is needed to
    /// replace the highest fee ever offered there.
    fn reprice(&self, request: &QueueItemRequest, nonce: u64) -> U256 {
        match self.floors.get(&nonce) {
            Some(previous) => request.ideal_fee.max(self.replacement_fee(*previous)),
            None => request.ideal_fee,
        }
    }

    /// Successor queue holding `items`, with each item's offer folded into
    /// the per-nonce broadcast floors.
    fn with_items(&self, items: Vec<QueueItem>) -> FeeQueue {
        let mut floors = self.floors.clone();
        for item in &items {
            floors
                .entry(item.nonce)
                .and_modify(|fee| *fee = (*fee).max(item.fee))
                .or_insert(item.fee);
        }
        FeeQueue {
            items,
            base_nonce: self.base_nonce,
            replacement_rate: self.replacement_rate,
            max_depth: self.max_depth,
            policy: self.policy,
            floors,
        }
    }

    /// Merge `requests` into the current items under the ordering policy and
    /// rebuild positional nonces. Items that keep their nonce keep their
    /// fee; everything else is repriced against the broadcast floors.
    fn insert(&self, requests: Vec<QueueItemRequest>) -> FeeQueue {
        // carried = the (nonce, fee) the item held before this transition
        let mut ranked: Vec<(QueueItemRequest, Option<(u64, U256)>)> = self
            .items
            .iter()
            .map(|item| (item.request.clone(), Some((item.nonce, item.fee))))
            .collect();
        for request in requests {
            let rank = match self.policy {
                QueuePolicy::FifoByArrival => ranked.len(),
                QueuePolicy::FeeDescending => ranked
                    .iter()
                    .position(|(queued, _)| queued.ideal_fee < request.ideal_fee)
                    .unwrap_or(ranked.len()),
            };
            ranked.insert(rank, (request, None));
        }

        let items = ranked
            .into_iter()
            .enumerate()
            .map(|(rank, (request, carried))| {
                let nonce = self.base_nonce + rank as u64;
                let fee = match carried {
                    Some((old_nonce, old_fee)) if old_nonce == nonce => old_fee,
                    _ => self.reprice(&request, nonce),
                };
                QueueItem::new(request, nonce, fee)
            })
            .collect();
        self.with_items(items)
    }
}
