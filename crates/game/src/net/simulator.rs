use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap};
use std::time::Duration;

use rand::rngs::StdRng;
use rkyv::util::AlignedVec;

use super::stats::{LinkParams, LinkStats};
use crate::simulation::SharedClock;

#[derive(Debug)]
struct DelayedMessage {
    release_time: Duration,
    sequence: u64,
    payload: AlignedVec,
}

impl PartialEq for DelayedMessage {
    fn eq(&self, other: &Self) -> bool {
        self.release_time == other.release_time && self.sequence == other.sequence
    }
}

impl Eq for DelayedMessage {}

impl PartialOrd for DelayedMessage {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DelayedMessage {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap
        other
            .release_time
            .cmp(&self.release_time)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// One direction of a simulated link: delayed, lossless, in-order.
///
/// Every message gets a random delay, but it is only handed out once all
/// messages sent before it have been handed out. A message whose delay has
/// elapsed while an earlier one is still in flight is parked until the gap
/// closes.
pub struct Transport {
    params: LinkParams,
    clock: SharedClock,
    rng: StdRng,
    next_sequence: u64,
    next_delivery: u64,
    in_flight: BinaryHeap<DelayedMessage>,
    parked: BTreeMap<u64, AlignedVec>,
    stats: LinkStats,
}

impl Transport {
    pub fn new(params: LinkParams, clock: SharedClock, rng: StdRng) -> Self {
        Self {
            params,
            clock,
            rng,
            next_sequence: 0,
            next_delivery: 0,
            in_flight: BinaryHeap::new(),
            parked: BTreeMap::new(),
            stats: LinkStats::default(),
        }
    }

    pub fn params(&self) -> &LinkParams {
        &self.params
    }

    pub fn stats(&self) -> &LinkStats {
        &self.stats
    }

    /// Messages sent but not yet handed out.
    pub fn pending(&self) -> usize {
        self.in_flight.len() + self.parked.len()
    }

    /// Schedules `payload` for delivery and returns its sequence number.
    pub fn send(&mut self, payload: AlignedVec) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;

        let delay = self.params.sample_delay(&mut self.rng);
        let release_time = self.clock.now() + delay;

        self.stats.messages_sent += 1;
        self.stats.bytes_sent += payload.len() as u64;

        log::trace!(
            "seq {} scheduled in {:?} ({} bytes)",
            sequence,
            delay,
            payload.len()
        );

        self.in_flight.push(DelayedMessage {
            release_time,
            sequence,
            payload,
        });

        sequence
    }

    /// Hands out every deliverable message in send order.
    pub fn take_ready(&mut self) -> Vec<AlignedVec> {
        let now = self.clock.now();

        while let Some(delayed) = self.in_flight.peek() {
            if delayed.release_time > now {
                break;
            }
            let Some(delayed) = self.in_flight.pop() else {
                break;
            };
            if delayed.sequence != self.next_delivery {
                self.stats.parked += 1;
                log::trace!(
                    "seq {} parked behind seq {}",
                    delayed.sequence,
                    self.next_delivery
                );
            }
            self.parked.insert(delayed.sequence, delayed.payload);
        }

        let mut ready = Vec::new();
        while let Some(payload) = self.parked.remove(&self.next_delivery) {
            ready.push(payload);
            self.next_delivery += 1;
        }

        self.stats.messages_delivered += ready.len() as u64;
        ready
    }
}
