use crate::builder::Builder;
use crate::clock::Clock;
use crate::error::*;
use chrono::prelude::*;
use std::{
    sync::{Arc, Mutex},
    thread,
    time::{Duration, Instant},
};
use tracing::{debug, warn};

/// bit length of the epoch-relative timestamp
pub(crate) const BIT_LEN_TIME: u64 = 41;
/// bit length of the worker id
pub(crate) const BIT_LEN_WORKER_ID: u64 = 10;
/// bit length of the per-millisecond sequence number
pub(crate) const BIT_LEN_SEQUENCE: u64 = 12;
/// largest worker id that fits in the layout
pub(crate) const MAX_WORKER_ID: u16 = (1 << BIT_LEN_WORKER_ID) - 1;
/// mask for the sequence number
pub(crate) const SEQUENCE_MASK: u16 = (1 << BIT_LEN_SEQUENCE) - 1;

/// How long a stalled call may wait before the stall is reported via
/// `tracing`. Waiting itself is unbounded; only the diagnostic has a
/// threshold.
const STALL_WARN_AFTER: Duration = Duration::from_millis(10);

/// Mutable state of the generator.
/// Only ever read and written while holding the lock in [`SharedIdGenerator`].
#[derive(Debug)]
pub(crate) struct Internals {
    pub(crate) last_timestamp: i64,
    pub(crate) sequence: u16,
}

/// SharedIdGenerator is shared between IdGenerator clones.
/// This struct is not exposed to the public.
pub(crate) struct SharedIdGenerator {
    pub(crate) epoch_millis: i64,
    pub(crate) worker_id: u16,
    pub(crate) clock: Box<dyn Clock>,
    pub(crate) internals: Mutex<Internals>,
}

impl SharedIdGenerator {
    fn elapsed_millis(&self) -> i64 {
        self.clock.now_millis() - self.epoch_millis
    }

    /// Re-read the clock until it reaches at least `floor`, then return the
    /// new reading. Called with the generator lock held, on clock regression
    /// and on sequence exhaustion. The id stream must never move backwards,
    /// so both conditions are waited out rather than surfaced as errors.
    fn stall_until(&self, floor: i64) -> i64 {
        let started = Instant::now();
        let mut warned = false;
        loop {
            let now = self.elapsed_millis();
            if now >= floor {
                return now;
            }
            if !warned && started.elapsed() >= STALL_WARN_AFTER {
                warn!(
                    lag_ms = floor - now,
                    "clock is behind the last issued timestamp, stalling id generation"
                );
                warned = true;
            }
            thread::yield_now();
        }
    }
}

/// IdGenerator mints 63-bit, time-ordered unique ids without any
/// cross-instance coordination. It is thread-safe and can be cloned to be
/// used in multiple threads; clones share the same state.
pub struct IdGenerator(pub(crate) Arc<SharedIdGenerator>);

impl IdGenerator {
    /// Create a new IdGenerator with the default configuration
    /// (worker id 0, default epoch). For custom configuration see [`builder`].
    ///
    /// [`builder`]: struct.IdGenerator.html#method.builder
    pub fn new() -> Result<Self, Error> {
        Builder::new().finalize()
    }

    /// Create a new [`Builder`] to construct an IdGenerator.
    ///
    /// [`Builder`]: struct.Builder.html
    pub fn builder() -> Builder {
        Builder::new()
    }

    /// Create a new IdGenerator with the given SharedIdGenerator.
    pub(crate) fn new_inner(shared: Arc<SharedIdGenerator>) -> Self {
        Self(shared)
    }

    /// Generate the next unique id.
    ///
    /// Each returned value is strictly greater than every value previously
    /// returned by this instance. Clock regressions and exhausted
    /// per-millisecond sequence ranges are absorbed by waiting for the clock,
    /// never by skipping ahead or erroring, so once constructed the generator
    /// can be treated as infallible; the only failure mode is a poisoned
    /// lock.
    pub fn next_id(&self) -> Result<u64, Error> {
        let shared = &self.0;
        let mut internals = shared.internals.lock().map_err(|_| Error::MutexPoisoned)?;

        let mut now = shared.elapsed_millis();
        if now < internals.last_timestamp {
            debug!(
                behind_ms = internals.last_timestamp - now,
                "system clock moved backwards, waiting for it to catch up"
            );
            now = shared.stall_until(internals.last_timestamp);
        }

        if now == internals.last_timestamp {
            internals.sequence = (internals.sequence + 1) & SEQUENCE_MASK;
            if internals.sequence == 0 {
                // 4096 ids minted this millisecond, wait out the remainder
                now = shared.stall_until(internals.last_timestamp + 1);
            }
        } else {
            internals.sequence = 0;
        }
        internals.last_timestamp = now;

        Ok(compose(now, shared.worker_id, internals.sequence))
    }

    /// Generate the next unique id and render it as `prefix` followed by the
    /// decimal digits of the id, e.g. `"BO_"` for board posts. This is the
    /// form the persistence layer embeds as a record's primary key.
    /// The generator itself is prefix-agnostic; callers pick the tag.
    pub fn next_key(&self, prefix: &str) -> Result<String, Error> {
        let id = self.next_id()?;
        Ok(format!("{prefix}{id}"))
    }
}

/// Returns a new `IdGenerator` referencing the same state as `self`.
/// This is used for concurrent use.
impl Clone for IdGenerator {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

/// Milliseconds since the Unix epoch of the default epoch,
/// 2023-01-01T00:00:00Z. Timestamps embedded in ids are measured from this
/// point unless the builder was given another `start_time`.
pub const DEFAULT_EPOCH_MILLIS: i64 = 1_672_531_200_000;

/// The default epoch as a `DateTime<Utc>`. Pair with
/// [`DecomposedId::datetime`] to audit when an id was minted.
pub fn default_epoch() -> DateTime<Utc> {
    Utc.timestamp_millis_opt(DEFAULT_EPOCH_MILLIS).unwrap()
}

/// Convert a `DateTime<Utc>` to milliseconds since the Unix epoch.
pub(crate) fn to_epoch_millis(time: DateTime<Utc>) -> i64 {
    time.timestamp_millis()
}

/// Pack an epoch-relative timestamp, worker id and sequence into one id.
/// The inverse of [`decompose`].
pub(crate) fn compose(elapsed: i64, worker_id: u16, sequence: u16) -> u64 {
    debug_assert!((0..1 << BIT_LEN_TIME).contains(&elapsed));
    (elapsed as u64) << (BIT_LEN_WORKER_ID + BIT_LEN_SEQUENCE)
        | (worker_id as u64) << BIT_LEN_SEQUENCE
        | sequence as u64
}

/// DecomposedId is the parts of a generated id.
pub struct DecomposedId {
    pub id: u64,
    pub time: u64,
    pub worker_id: u64,
    pub sequence: u64,
}

impl DecomposedId {
    /// Returns the embedded timestamp as milliseconds since the generator
    /// epoch.
    pub fn timestamp_millis(&self) -> i64 {
        self.time as i64
    }

    /// Resolves the embedded timestamp against the epoch the id was minted
    /// with, which is [`default_epoch`] unless the builder was given another
    /// `start_time`.
    pub fn datetime(&self, epoch: DateTime<Utc>) -> DateTime<Utc> {
        epoch + chrono::Duration::milliseconds(self.time as i64)
    }
}

/// The mask to extract the sequence from an id.
const MASK_SEQUENCE: u64 = (1 << BIT_LEN_SEQUENCE) - 1;
/// The mask to extract the worker id from an id.
const MASK_WORKER_ID: u64 = ((1 << BIT_LEN_WORKER_ID) - 1) << BIT_LEN_SEQUENCE;

/// Break a generated id up into its parts. Diagnostic only, not used on the
/// generation path.
pub fn decompose(id: u64) -> DecomposedId {
    DecomposedId {
        id,
        time: id >> (BIT_LEN_WORKER_ID + BIT_LEN_SEQUENCE),
        worker_id: (id & MASK_WORKER_ID) >> BIT_LEN_SEQUENCE,
        sequence: id & MASK_SEQUENCE,
    }
}
