use std::sync::atomic::{AtomicU64, Ordering};

use flightlink_frame::ScanStats;

/// Snapshot of channel activity since creation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelStats {
    pub frames_received: u64,
    pub frames_sent: u64,
    pub dispatched: u64,
    pub relayed: u64,
    pub dropped: u64,
    pub decode_failures: u64,
    /// Handlers that panicked; the receive loop carries on.
    pub handler_panics: u64,
    pub relay_failures: u64,
    pub checksum_mismatches: u64,
    /// Bad markers, out-of-range kinds and oversize lengths.
    pub framing_errors: u64,
    pub discarded_bytes: u64,
    pub reconnect_attempts: u64,
}

#[derive(Debug, Default)]
pub(crate) struct Counters {
    pub(crate) frames_received: AtomicU64,
    pub(crate) frames_sent: AtomicU64,
    pub(crate) dispatched: AtomicU64,
    pub(crate) relayed: AtomicU64,
    pub(crate) dropped: AtomicU64,
    pub(crate) decode_failures: AtomicU64,
    pub(crate) handler_panics: AtomicU64,
    pub(crate) relay_failures: AtomicU64,
    pub(crate) checksum_mismatches: AtomicU64,
    pub(crate) framing_errors: AtomicU64,
    pub(crate) discarded_bytes: AtomicU64,
    pub(crate) reconnect_attempts: AtomicU64,
}

pub(crate) fn bump(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}

impl Counters {
    /// Fold the scanner counters gained since `seen` into the channel totals.
    pub(crate) fn absorb(&self, seen: &mut ScanStats, now: ScanStats) {
        let framing = |s: &ScanStats| s.invalid_markers + s.invalid_kinds + s.invalid_lengths;
        self.checksum_mismatches.fetch_add(
            now.checksum_mismatches - seen.checksum_mismatches,
            Ordering::Relaxed,
        );
        self.framing_errors
            .fetch_add(framing(&now) - framing(&*seen), Ordering::Relaxed);
        self.discarded_bytes
            .fetch_add(now.discarded_bytes - seen.discarded_bytes, Ordering::Relaxed);
        *seen = now;
    }

    pub(crate) fn snapshot(&self) -> ChannelStats {
        let get = |counter: &AtomicU64| counter.load(Ordering::Relaxed);
        ChannelStats {
            frames_received: get(&self.frames_received),
            frames_sent: get(&self.frames_sent),
            dispatched: get(&self.dispatched),
            relayed: get(&self.relayed),
            dropped: get(&self.dropped),
            decode_failures: get(&self.decode_failures),
            handler_panics: get(&self.handler_panics),
            relay_failures: get(&self.relay_failures),
            checksum_mismatches: get(&self.checksum_mismatches),
            framing_errors: get(&self.framing_errors),
            discarded_bytes: get(&self.discarded_bytes),
            reconnect_attempts: get(&self.reconnect_attempts),
        }
    }
}
