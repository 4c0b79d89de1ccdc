use ethers::types::{Address, Bytes, U256};

use watchtower_core::{AppointmentId, QueuePolicy};

use super::{FeeQueue, QueueItem, QueueItemRequest, TxFingerprint};
use crate::error::ResponderError;

fn fingerprint(tag: u8) -> TxFingerprint {
    TxFingerprint::new(
        1,
        Address::repeat_byte(tag),
        Bytes::from(vec![tag]),
        U256::zero(),
        U256::from(200_000),
    )
}

fn request(id: &str, tag: u8, fee: u64) -> QueueItemRequest {
    QueueItemRequest::new(AppointmentId::new(id), fingerprint(tag), U256::from(fee))
}

fn queue(base_nonce: u64, replacement_rate: u32, max_depth: usize) -> FeeQueue {
    FeeQueue::new(base_nonce, replacement_rate, max_depth, QueuePolicy::FeeDescending)
}

fn nonces_and_fees(queue: &FeeQueue) -> Vec<(u64, u64)> {
    queue
        .items()
        .iter()
        .map(|item| (item.nonce, item.fee.as_u64()))
        .collect()
}

#[test]
fn add_assigns_contiguous_nonces() {
    let q0 = queue(5, 13, 8);
    let q1 = q0.add(request("a", 1, 100)).unwrap();
    let q2 = q1.add(request("b", 2, 100)).unwrap();
    let q3 = q2.add(request("c", 3, 100)).unwrap();

    assert_eq!(q3.len(), 3);
    assert_eq!(q3.base_nonce(), 5);
    assert_eq!(nonces_and_fees(&q3), vec![(5, 100), (6, 100), (7, 100)]);
}

#[test]
fn add_beyond_max_depth_fails() {
    let q = queue(0, 13, 2)
        .add(request("a", 1, 100))
        .unwrap()
        .add(request("b", 2, 100))
        .unwrap();

    let err = q.add(request("c", 3, 100)).unwrap_err();
    assert!(matches!(err, ResponderError::QueueFull { max_depth: 2 }));
    // the receiver is a value; a failed add leaves it untouched
    assert_eq!(q.len(), 2);
}

#[test]
fn add_reports_only_the_new_item_when_nothing_is_displaced() {
    let q0 = queue(5, 10, 2);
    let q1 = q0.add(request("x", 1, 100)).unwrap();
    let q2 = q1.add(request("y", 2, 100)).unwrap();

    assert_eq!(nonces_and_fees(&q2), vec![(5, 100), (6, 100)]);

    let replaced = q2.difference(&q1);
    assert_eq!(replaced.len(), 1);
    assert_eq!(replaced[0].request.appointment_id, AppointmentId::new("y"));
    assert_eq!(replaced[0].nonce, 6);
}

#[test]
fn higher_fee_request_preempts_the_front() {
    let q1 = queue(5, 13, 4).add(request("low", 1, 100)).unwrap();
    let q2 = q1.add(request("high", 2, 200)).unwrap();

    // the new request takes the front nonce at its own (sufficient) fee;
    // the displaced item moves to a fresh nonce at its ideal fee
    assert_eq!(nonces_and_fees(&q2), vec![(5, 200), (6, 100)]);
    assert_eq!(q2.items()[0].request.appointment_id, AppointmentId::new("high"));

    let replaced = q2.difference(&q1);
    assert_eq!(replaced.len(), 2);
}

#[test]
fn preempting_fee_is_raised_to_the_replacement_floor() {
    let q1 = queue(5, 13, 4).add(request("low", 1, 100)).unwrap();
    // ideal fee 101 outranks 100 but is below the 13% replacement floor
    let q2 = q1.add(request("barely", 2, 101)).unwrap();

    assert_eq!(nonces_and_fees(&q2), vec![(5, 113), (6, 100)]);
}

#[test]
fn replacement_floor_rounds_up() {
    let q1 = queue(0, 13, 4).add(request("a", 1, 101)).unwrap();
    let q2 = q1.add(request("b", 2, 102)).unwrap();

    // 101 * 1.13 = 114.13, so anything below 115 would be rejected
    assert_eq!(nonces_and_fees(&q2), vec![(0, 115), (1, 101)]);
}

#[test]
fn fifo_policy_never_displaces() {
    let q0 = FeeQueue::new(5, 13, 4, QueuePolicy::FifoByArrival);
    let q1 = q0.add(request("low", 1, 100)).unwrap();
    let q2 = q1.add(request("high", 2, 500)).unwrap();

    assert_eq!(nonces_and_fees(&q2), vec![(5, 100), (6, 500)]);
    assert_eq!(q2.difference(&q1).len(), 1);
}

#[test]
fn dequeue_advances_the_base_nonce() {
    let q2 = queue(5, 10, 2)
        .add(request("x", 1, 100))
        .unwrap()
        .add(request("y", 2, 100))
        .unwrap();

    let q3 = q2.dequeue().unwrap();
    assert_eq!(q3.base_nonce(), 6);
    assert_eq!(nonces_and_fees(&q3), vec![(6, 100)]);
    // the surviving item kept its nonce and fee: nothing to rebroadcast
    assert!(q3.difference(&q2).is_empty());
}

#[test]
fn dequeue_on_empty_queue_fails() {
    let err = queue(5, 10, 2).dequeue().unwrap_err();
    assert!(matches!(err, ResponderError::EmptyQueue));
}

#[test]
fn consume_closes_the_nonce_gap() {
    let q = queue(5, 10, 4)
        .add(request("a", 1, 100))
        .unwrap()
        .add(request("b", 2, 100))
        .unwrap()
        .add(request("c", 3, 100))
        .unwrap();

    let consumed = q.consume(&fingerprint(2)).unwrap();

    assert_eq!(consumed.len(), 2);
    assert_eq!(consumed.base_nonce(), 5);
    // the item below the removed rank is untouched; the item above shifted
    // down onto b's old nonce and is priced to replace b's pending tx
    assert_eq!(nonces_and_fees(&consumed), vec![(5, 100), (6, 110)]);
    assert_eq!(consumed.items()[1].request.appointment_id, AppointmentId::new("c"));

    let replaced = consumed.difference(&q);
    assert_eq!(replaced.len(), 1);
    assert_eq!(replaced[0].nonce, 6);
}

#[test]
fn add_after_consume_outbids_the_vacated_nonce_broadcast() {
    let q = queue(5, 10, 4)
        .add(request("a", 1, 100))
        .unwrap()
        .add(request("b", 2, 100))
        .unwrap()
        .add(request("c", 3, 100))
        .unwrap();

    // c slides down onto b's nonce; nonce 7 is vacated, but the mempool
    // still holds c's 100-fee broadcast there
    let consumed = q.consume(&fingerprint(2)).unwrap();
    assert_eq!(nonces_and_fees(&consumed), vec![(5, 100), (6, 110)]);

    // a cheap newcomer landing on the vacated nonce must still outbid
    // the fee previously broadcast at it
    let readded = consumed.add(request("d", 4, 50)).unwrap();
    assert_eq!(nonces_and_fees(&readded), vec![(5, 100), (6, 110), (7, 110)]);
}

#[test]
fn replacement_floor_survives_an_extreme_rate() {
    let q1 = queue(0, u32::MAX, 2).add(request("a", 1, 100)).unwrap();
    let q2 = q1.add(request("b", 2, 200)).unwrap();

    // 100 * (100 + u32::MAX) / 100, exact division
    assert_eq!(q2.items()[0].fee, U256::from(4_294_967_395u64));
    assert_eq!(q2.items()[1].fee, U256::from(100));
}

#[test]
fn consume_unknown_fingerprint_fails() {
    let q = queue(5, 10, 4).add(request("a", 1, 100)).unwrap();
    let err = q.consume(&fingerprint(9)).unwrap_err();
    assert!(matches!(err, ResponderError::NotFound(_)));
}

#[test]
fn unlock_restores_items_at_the_current_base_nonce() {
    let item = QueueItem::new(request("y", 2, 100), 6, U256::from(100));
    // both previously queued transactions were mined, then a reorg revealed
    // y is pending again
    let empty = queue(7, 10, 2);

    let unlocked = empty.unlock(vec![item.clone()]).unwrap();
    assert_eq!(nonces_and_fees(&unlocked), vec![(7, 100)]);
    assert_eq!(unlocked.items()[0].request, item.request);

    let replaced = unlocked.difference(&empty);
    assert_eq!(replaced.len(), 1);
    assert_eq!(replaced[0].nonce, 7);
}

#[test]
fn unlock_beyond_max_depth_fails() {
    let q = queue(5, 10, 1).add(request("a", 1, 100)).unwrap();
    let stray = QueueItem::new(request("b", 2, 100), 3, U256::from(100));

    let err = q.unlock(vec![stray]).unwrap_err();
    assert!(matches!(err, ResponderError::QueueFull { max_depth: 1 }));
}

#[test]
fn contains_matches_on_fingerprint() {
    let q = queue(5, 10, 2).add(request("a", 1, 100)).unwrap();
    assert!(q.contains(&fingerprint(1)));
    assert!(!q.contains(&fingerprint(2)));
}

#[test]
fn difference_with_self_is_empty() {
    let q = queue(5, 10, 4)
        .add(request("a", 1, 100))
        .unwrap()
        .add(request("b", 2, 300))
        .unwrap();
    assert!(q.difference(&q).is_empty());
}

#[test]
fn difference_reports_fee_changes_at_the_same_nonce() {
    let q1 = queue(5, 13, 4).add(request("low", 1, 100)).unwrap();
    let q2 = q1.add(request("high", 2, 200)).unwrap();

    for item in q2.difference(&q1) {
        let before = q1
            .items()
            .iter()
            .find(|old| old.request == item.request)
            .map(|old| (old.nonce, old.fee));
        assert_ne!(before, Some((item.nonce, item.fee)));
    }
}
