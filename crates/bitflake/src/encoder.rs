use core::cell::Cell;
use std::sync::Arc;

use parking_lot::Mutex;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::clock::{ClockConfig, TimeSource};
use crate::error::{Error, Result};
use crate::id::Id;
use crate::layout::{FieldKind, Layout};

/// Per-encoder issuance cursor.
///
/// `current_sequence` is the *next* sequence value to issue within
/// `current_timestamp_offset`. The state is created lazily on the first
/// successful encode and mutated by nothing else.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct GeneratorState {
    current_timestamp_offset: u64,
    current_sequence: u64,
}

/// A single-owner id encoder: one layout, one clock, one node identity,
/// one issuance cursor.
///
/// The encoder is a sequential, single-writer counter and is **not**
/// thread-safe; its correctness (strictly increasing ids, no duplicate
/// `(tick, sequence)` pair) depends on calls being serialized. Wrap it in a
/// [`SharedEncoder`] for multi-threaded use, and give each distinct
/// `(layout, clock, node identity)` combination its own encoder.
///
/// # Example
/// ```
/// use bitflake::{Encoder, Preset};
///
/// let preset = Preset::Twitter;
/// let encoder = Encoder::new(preset.layout(), preset.clock(), 1, 2)?;
///
/// let a = encoder.encode_at(1_700_000_000_000)?;
/// let b = encoder.encode_at(1_700_000_000_000)?;
/// assert!(a < b);
/// # Ok::<(), bitflake::Error>(())
/// ```
#[derive(Debug)]
pub struct Encoder {
    layout: Layout,
    clock: ClockConfig,
    node_primary: u64,
    node_secondary: u64,
    state: Cell<Option<GeneratorState>>,
}

impl Encoder {
    /// Creates an encoder for a fixed node identity.
    ///
    /// Node ids are range-checked here, before any state exists, so a
    /// rejected identity can never cost a sequence value. A zero-width
    /// field accepts only the id `0`: the value is absent from the packed
    /// id, and silently dropping a nonzero id would break the round trip.
    ///
    /// # Errors
    /// [`Error::NodeIdOutOfRange`] reporting the offending field and its
    /// declared width.
    pub fn new(
        layout: Layout,
        clock: ClockConfig,
        node_primary: u64,
        node_secondary: u64,
    ) -> Result<Self> {
        if u128::from(node_primary) > layout.node_primary_mask() {
            return Err(Error::NodeIdOutOfRange {
                field: FieldKind::NodePrimary,
                value: node_primary,
                bits: layout.node_primary_bits(),
                max: layout.node_primary_mask() as u64,
            });
        }
        if u128::from(node_secondary) > layout.node_secondary_mask() {
            return Err(Error::NodeIdOutOfRange {
                field: FieldKind::NodeSecondary,
                value: node_secondary,
                bits: layout.node_secondary_bits(),
                max: layout.node_secondary_mask() as u64,
            });
        }
        Ok(Self {
            layout,
            clock,
            node_primary,
            node_secondary,
            state: Cell::new(None),
        })
    }

    /// The encoder's layout.
    pub const fn layout(&self) -> &Layout {
        &self.layout
    }

    /// The encoder's clock configuration.
    pub const fn clock(&self) -> &ClockConfig {
        &self.clock
    }

    /// Encodes one id at an explicit wall-clock instant.
    ///
    /// The tick is `floor((now_ms - epoch_ms) / tick_ms)`. When the
    /// sequence field is exhausted within a tick, the encoder synthesizes
    /// the *next* tick instead of reusing the wall clock, so output stays
    /// strictly increasing even under rapid successive calls inside one
    /// tick. A clock that stalls or steps backward between calls likewise
    /// never drags the cursor backward.
    ///
    /// On error the cursor is left untouched: a failed attempt never skips
    /// a sequence value, and a corrected retry is safe.
    ///
    /// # Errors
    /// - [`Error::ClockBeforeEpoch`] when `now_ms` predates the epoch
    /// - [`Error::TimestampFieldOverflow`] when the tick offset (wall-clock
    ///   or synthesized) no longer fits the timestamp field
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn encode_at(&self, now_ms: u64) -> Result<Id> {
        let wall_offset = self.clock.ticks_since_epoch(now_ms)?;
        self.check_timestamp(u128::from(wall_offset))?;

        let (offset, sequence) = match self.state.get() {
            None => (wall_offset, 0),
            Some(state) => {
                if wall_offset > state.current_timestamp_offset {
                    // Wall clock advanced past the cursor: fresh tick.
                    (wall_offset, 0)
                } else if u128::from(state.current_sequence) > self.layout.sequence_mask() {
                    // Tick exhausted: synthesize the next one.
                    let next = state.current_timestamp_offset + 1;
                    self.check_timestamp(u128::from(next))?;
                    (next, 0)
                } else {
                    (state.current_timestamp_offset, state.current_sequence)
                }
            }
        };

        let id = self.layout.pack(
            u128::from(offset),
            u128::from(self.node_primary),
            u128::from(self.node_secondary),
            u128::from(sequence),
        );
        self.state.set(Some(GeneratorState {
            current_timestamp_offset: offset,
            current_sequence: sequence + 1,
        }));
        Ok(Id::from_raw(id))
    }

    /// Encodes one id at the current time of `time`.
    pub fn encode<T: TimeSource>(&self, time: &T) -> Result<Id> {
        self.encode_at(time.now_ms())
    }

    /// Encodes `count` ids at a frozen wall-clock instant, sharing this
    /// encoder's cursor.
    ///
    /// Sequence and tick roll exactly as `count` external
    /// [`Self::encode_at`] calls would. The first error aborts the batch;
    /// ids issued before it remain issued.
    pub fn encode_batch_at(&self, count: usize, now_ms: u64) -> Result<Vec<Id>> {
        let mut ids = Vec::with_capacity(count);
        for _ in 0..count {
            ids.push(self.encode_at(now_ms)?);
        }
        Ok(ids)
    }

    /// Encodes `count` ids, re-reading `time` for every id.
    pub fn encode_batch<T: TimeSource>(&self, count: usize, time: &T) -> Result<Vec<Id>> {
        let mut ids = Vec::with_capacity(count);
        for _ in 0..count {
            ids.push(self.encode_at(time.now_ms())?);
        }
        Ok(ids)
    }

    fn check_timestamp(&self, offset: u128) -> Result<()> {
        if offset > self.layout.timestamp_mask() {
            return Err(Error::TimestampFieldOverflow {
                offset,
                bits: self.layout.timestamp_bits(),
            });
        }
        Ok(())
    }
}

/// A thread-safe handle around an [`Encoder`].
///
/// Clones share one cursor behind a [`parking_lot::Mutex`], so concurrent
/// callers are serialized and can never observe the same `(tick, sequence)`
/// pair.
///
/// # Example
/// ```
/// use bitflake::{Encoder, Preset, SharedEncoder, WallClock};
///
/// let preset = Preset::Twitter;
/// let shared = SharedEncoder::new(Encoder::new(preset.layout(), preset.clock(), 1, 2)?);
///
/// let handle = shared.clone();
/// let id = handle.encode(&WallClock)?;
/// # let _ = id;
/// # Ok::<(), bitflake::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct SharedEncoder {
    inner: Arc<Mutex<Encoder>>,
}

impl SharedEncoder {
    /// Wraps an encoder for shared use.
    pub fn new(encoder: Encoder) -> Self {
        Self {
            inner: Arc::new(Mutex::new(encoder)),
        }
    }

    /// See [`Encoder::encode_at`].
    pub fn encode_at(&self, now_ms: u64) -> Result<Id> {
        self.inner.lock().encode_at(now_ms)
    }

    /// See [`Encoder::encode`].
    pub fn encode<T: TimeSource>(&self, time: &T) -> Result<Id> {
        self.inner.lock().encode(time)
    }

    /// See [`Encoder::encode_batch_at`]. The whole batch is issued under
    /// one lock acquisition.
    pub fn encode_batch_at(&self, count: usize, now_ms: u64) -> Result<Vec<Id>> {
        self.inner.lock().encode_batch_at(count, now_ms)
    }

    /// See [`Encoder::encode_batch`].
    pub fn encode_batch<T: TimeSource>(&self, count: usize, time: &T) -> Result<Vec<Id>> {
        self.inner.lock().encode_batch(count, time)
    }
}
