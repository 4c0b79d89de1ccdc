//! The responder: owns the fee queue for one signing account, accepts new
//! response obligations, reconciles the queue against chain events and
//! performs the actual broadcasts.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use ethers::types::Address;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use watchtower_base::settings::ResponderConf;
use watchtower_core::{AppointmentId, ChainClient, FeeEstimator, ResponseSpec};

use crate::error::ResponderError;
use crate::metrics::ResponderMetrics;
use crate::queue::{FeeQueue, QueueItem, QueueItemRequest, TxFingerprint};

/// Mutable state of one responder, serialized behind a single lock: every
/// queue transition reads and replaces the whole queue value, so interleaved
/// read-modify-write would break nonce contiguity.
#[derive(Debug)]
struct ResponderState {
    /// The queue of transactions currently owed to the network
    queue: FeeQueue,
    /// Last known queue item per appointment still worth tracking
    tracked: HashMap<AppointmentId, QueueItem>,
    /// Every nonce each appointment has ever been broadcast at. Consulted
    /// when a mined transaction is not the current front item: a report
    /// pairing a fingerprint with a nonce we never used for it is a lie.
    sent_nonces: HashMap<AppointmentId, HashSet<u64>>,
}

/// Handles any number of concurrent responses for a single signing account.
///
/// The responder requires exclusive use of the account: it manages the
/// account's nonce sequence and two writers would race each other into
/// gapped or double-spent nonces. [`crate::ResponderManager`] enforces this
/// at runtime.
///
/// All queue-mutating entry points ([`Responder::start_response`],
/// [`Responder::tx_mined`], [`Responder::re_enqueue_missing_items`]) are
/// serialized against each other; broadcasts themselves are fire-and-forget
/// tasks and never hold the engine up.
pub struct Responder {
    client: Arc<dyn ChainClient>,
    estimator: Arc<dyn FeeEstimator>,
    address: Address,
    chain_id: u64,
    signer_label: String,
    metrics: ResponderMetrics,
    state: Mutex<ResponderState>,
}

impl Responder {
    /// Build a responder for the client's signing account. Seeds the queue's
    /// base nonce from the account's pending-inclusive transaction count, so
    /// transactions already in flight before startup are not double-spent.
    pub async fn new(
        client: Arc<dyn ChainClient>,
        estimator: Arc<dyn FeeEstimator>,
        conf: ResponderConf,
        metrics: ResponderMetrics,
    ) -> Result<Self, ResponderError> {
        if conf.max_queue_depth == 0 {
            return Err(ResponderError::Argument(
                "Maximum queue depth must be greater than 0".to_owned(),
            ));
        }

        let address = client.address();
        let base_nonce = client.pending_transaction_count(address).await?;
        let chain_id = client.chain_id().await?;
        let queue = FeeQueue::new(
            base_nonce,
            conf.replacement_rate,
            conf.max_queue_depth,
            conf.policy,
        );

        info!(
            address = ?address,
            chain_id,
            base_nonce,
            max_queue_depth = conf.max_queue_depth,
            replacement_rate = conf.replacement_rate,
            "Started responder"
        );

        Ok(Responder {
            client,
            estimator,
            address,
            chain_id,
            signer_label: format!("{address:?}"),
            metrics,
            state: Mutex::new(ResponderState {
                queue,
                tracked: HashMap::new(),
                sent_nonces: HashMap::new(),
            }),
        })
    }

    /// The signing account this responder exclusively owns.
    pub fn address(&self) -> Address {
        self.address
    }

    /// The chain this responder signs for.
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Immutable snapshot of the current queue, for inspection.
    pub async fn queue(&self) -> FeeQueue {
        self.state.lock().await.queue.clone()
    }

    /// Queue a transaction responding to an obligation and broadcast
    /// whatever the transition changed. A full queue drops the obligation:
    /// that is a capacity-management decision for the surrounding system,
    /// not a fatal engine error, so the queue is left exactly as it was.
    pub async fn start_response(
        &self,
        appointment_id: AppointmentId,
        response: ResponseSpec,
    ) -> Result<(), ResponderError> {
        let ideal_fee = self.estimator.estimate(&response).await?;
        let fingerprint = TxFingerprint::from_response(self.chain_id, &response);
        let request = QueueItemRequest::new(appointment_id.clone(), fingerprint, ideal_fee);

        let mut state = self.state.lock().await;
        let next = match state.queue.add(request) {
            Ok(next) => next,
            Err(err @ ResponderError::QueueFull { .. }) => {
                warn!(
                    appointment = %appointment_id,
                    depth = state.queue.len(),
                    "Queue is full, dropping response obligation"
                );
                self.metrics.update_dropped_responses_metric(&self.signer_label);
                return Err(err);
            }
            Err(err) => return Err(err),
        };

        let replaced = next.difference(&state.queue);
        state.queue = next;
        info!(
            appointment = %appointment_id,
            ideal_fee = %ideal_fee,
            queue_length = state.queue.len(),
            rebroadcasts = replaced.len(),
            "Queued response transaction"
        );
        self.track_and_broadcast(&mut state, replaced);
        Ok(())
    }

    /// Reconcile the queue with a chain-confirmed transaction. Must be
    /// called once per mined transaction for this account, in mined (i.e.
    /// ascending nonce) order; the block monitor owns that contract.
    ///
    /// If the mined transaction is the current front item it is simply
    /// dequeued. If it is a stale, previously-broadcast version of a
    /// later-queued item, that item is consumed and the nonce gap closed,
    /// which requires rebroadcasting everything that shifted. Any other
    /// combination contradicts the queue's model of the account and leaves
    /// the queue untouched.
    pub async fn tx_mined(
        &self,
        fingerprint: &TxFingerprint,
        nonce: u64,
    ) -> Result<(), ResponderError> {
        let mut state = self.state.lock().await;

        let front = match state.queue.front() {
            Some(front) => front.clone(),
            None => {
                return self.queue_consistency(format!(
                    "Transaction mined at nonce {nonce} but the queue is empty"
                ));
            }
        };
        let Some(rank) = state.queue.position(fingerprint) else {
            return self.queue_consistency(format!(
                "Mined transaction at nonce {nonce} matches no queued fingerprint"
            ));
        };
        if front.nonce != nonce {
            return self.queue_consistency(format!(
                "Mined nonce {nonce} does not correspond to the front of the queue at {}",
                front.nonce
            ));
        }

        if front.request.fingerprint == *fingerprint {
            // the transaction we expected next was mined; nothing else moves
            state.queue = state.queue.dequeue()?;
            self.metrics
                .update_queue_length_metric(&self.signer_label, state.queue.len() as u64);
            debug!(nonce, appointment = %front.request.appointment_id, "Dequeued mined transaction");
            return Ok(());
        }

        // the mined transaction was an old broadcast of an item that has
        // since moved to a later nonce. Only believable if we actually sent
        // that item at the mined nonce at some point.
        let matched = state.queue.items()[rank].clone();
        let known_send = state
            .sent_nonces
            .get(&matched.request.appointment_id)
            .map_or(false, |nonces| nonces.contains(&nonce));
        if !known_send {
            return self.queue_consistency(format!(
                "Mined transaction for appointment {} at nonce {nonce}, but it was never broadcast at that nonce (currently queued at {})",
                matched.request.appointment_id, matched.nonce
            ));
        }

        let next = state.queue.consume(fingerprint)?;
        let replaced = next.difference(&state.queue);
        state.queue = next;
        info!(
            nonce,
            appointment = %matched.request.appointment_id,
            rebroadcasts = replaced.len(),
            "Stale broadcast mined, closed the nonce gap"
        );
        self.track_and_broadcast(&mut state, replaced);
        Ok(())
    }

    /// Reconciliation after reorg detection: given every appointment the
    /// surrounding system still considers unconfirmed, re-admit those whose
    /// tracked transaction is no longer queued (previously believed mined,
    /// now un-mined) and rebroadcast whatever the merge changed. An unknown
    /// appointment id means engine and caller have desynchronized; the call
    /// aborts before touching any state.
    pub async fn re_enqueue_missing_items(
        &self,
        still_pending: &[AppointmentId],
    ) -> Result<(), ResponderError> {
        let mut state = self.state.lock().await;

        let mut missing = Vec::new();
        for appointment_id in still_pending {
            let item = state.tracked.get(appointment_id).ok_or_else(|| {
                error!(appointment = %appointment_id, "No record of appointment in responder");
                ResponderError::Argument(format!(
                    "No record of appointment {appointment_id} in responder"
                ))
            })?;
            if !state.queue.contains(&item.request.fingerprint) {
                missing.push(item.clone());
            }
        }
        if missing.is_empty() {
            return Ok(());
        }

        let next = state.queue.unlock(missing)?;
        let replaced = next.difference(&state.queue);
        state.queue = next;
        info!(
            queue_length = state.queue.len(),
            rebroadcasts = replaced.len(),
            "Re-enqueued transactions revealed pending by a reorg"
        );
        self.track_and_broadcast(&mut state, replaced);
        Ok(())
    }

    /// Stop tracking an appointment; no further reconciliation will be
    /// attempted for it. Idempotent.
    pub async fn end_response(&self, appointment_id: &AppointmentId) {
        let mut state = self.state.lock().await;
        state.tracked.remove(appointment_id);
        state.sent_nonces.remove(appointment_id);
    }

    /// Record the changed items under their appointments and fire off one
    /// independent broadcast per item. Failures are isolated per item.
    fn track_and_broadcast(&self, state: &mut ResponderState, replaced: Vec<QueueItem>) {
        self.metrics
            .update_queue_length_metric(&self.signer_label, state.queue.len() as u64);
        for item in &replaced {
            state
                .tracked
                .insert(item.request.appointment_id.clone(), item.clone());
            state
                .sent_nonces
                .entry(item.request.appointment_id.clone())
                .or_default()
                .insert(item.nonce);
        }
        for item in replaced {
            self.spawn_broadcast(item);
        }
    }

    /// Broadcast is best-effort: a failure is logged and swallowed, because
    /// the next mined or reorg reconciliation event re-issues anything that
    /// did not land. The engine never blocks on a broadcast.
    fn spawn_broadcast(&self, item: QueueItem) {
        let client = self.client.clone();
        let metrics = self.metrics.clone();
        let signer_label = self.signer_label.clone();
        tokio::spawn(async move {
            metrics.update_broadcasts_metric(&signer_label);
            match client.send_transaction(item.to_transaction_request()).await {
                Ok(tx_hash) => info!(
                    appointment = %item.request.appointment_id,
                    nonce = item.nonce,
                    fee = %item.fee,
                    ?tx_hash,
                    "Broadcast response transaction"
                ),
                Err(err) => {
                    metrics.update_broadcast_failures_metric(&signer_label);
                    error!(
                        appointment = %item.request.appointment_id,
                        nonce = item.nonce,
                        %err,
                        "Failed to broadcast response transaction"
                    );
                }
            }
        });
    }

    fn queue_consistency(&self, message: String) -> Result<(), ResponderError> {
        error!(signer = %self.signer_label, message = %message, "Queue consistency violation");
        self.metrics
            .update_consistency_errors_metric(&self.signer_label);
        Err(ResponderError::QueueConsistency(message))
    }
}
