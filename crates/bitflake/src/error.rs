//! Error types for layout construction, encoding, and decoding.
//!
//! One central [`Error`] enum covers the whole crate. Field-range overflow
//! observed while *decoding* is deliberately **not** here: it is reported as
//! [`OverflowFlags`] on an otherwise successful [`ParsedId`], so a batch of
//! mixed valid/invalid input can be processed uniformly.
//!
//! [`OverflowFlags`]: crate::OverflowFlags
//! [`ParsedId`]: crate::ParsedId

use crate::layout::FieldKind;

pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for the bitflake crate.
#[derive(Clone, thiserror::Error, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// A field width passed to [`Layout::new`] is outside `0..=63`.
    ///
    /// [`Layout::new`]: crate::Layout::new
    #[error("{field} width {bits} is out of range (each field spans 0..=63 bits)")]
    InvalidFieldWidth { field: FieldKind, bits: u32 },

    /// The sum of all field widths exceeds the 128-bit backing integer.
    ///
    /// Totals above 63 bits are merely flagged (see
    /// [`Layout::exceeds_safe_bits`]), but a layout that cannot be packed
    /// into a `u128` at all is rejected outright.
    ///
    /// [`Layout::exceeds_safe_bits`]: crate::Layout::exceeds_safe_bits
    #[error("layout spans {total_bits} bits, which exceeds the 128-bit backing integer")]
    LayoutTooWide { total_bits: u32 },

    /// The tick granularity is zero milliseconds.
    #[error("tick granularity must be at least 1 ms")]
    InvalidTickInterval,

    /// A node identifier does not fit in its declared field.
    ///
    /// Raised before any generator state is mutated, so a corrected retry
    /// is safe and never skips a sequence value.
    #[error("{field} id {value} does not fit in {bits} bits (max {max})")]
    NodeIdOutOfRange {
        field: FieldKind,
        value: u64,
        bits: u32,
        max: u64,
    },

    /// The wall clock predates the configured epoch.
    #[error("current time {now_ms} ms predates the configured epoch {epoch_ms} ms")]
    ClockBeforeEpoch { now_ms: u64, epoch_ms: u64 },

    /// The scheme has run out of representable ticks for this layout.
    #[error("timestamp offset {offset} exceeds the {bits}-bit timestamp field")]
    TimestampFieldOverflow { offset: u128, bits: u32 },

    /// Decode input is not a plain non-negative decimal integer.
    #[error("not a decimal integer: {text:?}")]
    NotADecimalInteger { text: String },

    /// A decoded timestamp offset does not map to a representable instant.
    ///
    /// This is the one case where decode cannot produce a [`ParsedId`] and
    /// must report an error instead of a flagged result.
    ///
    /// [`ParsedId`]: crate::ParsedId
    #[error("timestamp offset {offset} maps past the representable instant range")]
    TimestampOutOfRange { offset: u128 },

    /// A preset name did not match any catalog entry.
    #[error("unknown preset {name:?} (expected one of: twitter, sonyflake, discord, instagram)")]
    UnknownPreset { name: String },
}
