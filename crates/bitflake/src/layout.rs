use core::fmt;

use crate::error::{Error, Result};

/// Maximum width of any single field, in bits.
pub const MAX_FIELD_BITS: u32 = 63;

/// Widest total layout that still round-trips through a signed/double-safe
/// integer in most host environments. Totals above this are legal but
/// surfaced as a warning via [`Layout::exceeds_safe_bits`].
pub const SAFE_TOTAL_BITS: u32 = 63;

/// Width of the backing integer every id is packed into.
pub const BACKING_BITS: u32 = 128;

/// Identifies one of the four packed fields.
///
/// Significance order is fixed: sequence occupies the least significant
/// bits, then node secondary, node primary, and timestamp at the top. Both
/// reference layouts (Twitter-style and Sonyflake-style) follow this order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Timestamp,
    NodePrimary,
    NodeSecondary,
    Sequence,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::Timestamp => "timestamp",
            FieldKind::NodePrimary => "node primary",
            FieldKind::NodeSecondary => "node secondary",
            FieldKind::Sequence => "sequence",
        };
        f.write_str(name)
    }
}

/// Returns a mask with the low `bits` bits set.
///
/// Zero-width fields yield a zero mask, which is how a layout disables a
/// field entirely.
pub(crate) const fn low_mask(bits: u32) -> u128 {
    if bits == 0 {
        0
    } else if bits >= BACKING_BITS {
        u128::MAX
    } else {
        (1 << bits) - 1
    }
}

/// Right shift that tolerates a full-width shift amount.
///
/// A layout whose timestamp field is disabled can legally derive a shift of
/// 128, which the native operator rejects.
pub(crate) const fn shr(value: u128, shift: u32) -> u128 {
    if shift >= BACKING_BITS { 0 } else { value >> shift }
}

/// Left shift counterpart of [`shr`]. Only ever called with values already
/// masked to their field width, so a full-width shift can only see zero.
pub(crate) const fn shl(value: u128, shift: u32) -> u128 {
    if shift >= BACKING_BITS { 0 } else { value << shift }
}

/// An immutable bit-field layout: how a packed id splits into timestamp,
/// node primary, node secondary, and sequence fields.
///
/// The layout is pure configuration. It performs no clock or state handling;
/// see [`Encoder`] and [`Decoder`] for those.
///
/// ```text
///  Bit Index:  high bits                                      low bits
///              +---------------+--------------+--------------+---------+
///  Field:      | timestamp (T) | node pri (P) | node sec (S) | seq (Q) |
///              +---------------+--------------+--------------+---------+
///              |<------------- MSB -- total_bits -- LSB -------------->|
/// ```
///
/// # Example
/// ```
/// use bitflake::Layout;
///
/// let layout = Layout::new(41, 5, 5, 12)?;
/// assert_eq!(layout.total_bits(), 63);
/// assert_eq!(layout.sequence_mask(), 0xFFF);
/// assert_eq!(layout.timestamp_shift(), 22);
/// assert!(!layout.exceeds_safe_bits());
/// # Ok::<(), bitflake::Error>(())
/// ```
///
/// [`Encoder`]: crate::Encoder
/// [`Decoder`]: crate::Decoder
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Layout {
    timestamp_bits: u32,
    node_primary_bits: u32,
    node_secondary_bits: u32,
    sequence_bits: u32,
}

impl Layout {
    /// Builds a layout from the four field widths.
    ///
    /// Each width must lie in `0..=63`. No constraint is placed on the *sum*
    /// of widths beyond the 128-bit backing integer: historical presets
    /// occasionally approach or exceed the 63-bit safe range, so an
    /// oversized-but-packable total is reported through
    /// [`Self::exceeds_safe_bits`] rather than rejected.
    ///
    /// # Errors
    /// - [`Error::InvalidFieldWidth`] if any width exceeds 63 bits
    /// - [`Error::LayoutTooWide`] if the widths sum past 128 bits
    pub fn new(
        timestamp_bits: u32,
        node_primary_bits: u32,
        node_secondary_bits: u32,
        sequence_bits: u32,
    ) -> Result<Self> {
        let fields = [
            (FieldKind::Timestamp, timestamp_bits),
            (FieldKind::NodePrimary, node_primary_bits),
            (FieldKind::NodeSecondary, node_secondary_bits),
            (FieldKind::Sequence, sequence_bits),
        ];
        for (field, bits) in fields {
            if bits > MAX_FIELD_BITS {
                return Err(Error::InvalidFieldWidth { field, bits });
            }
        }

        let total_bits = timestamp_bits + node_primary_bits + node_secondary_bits + sequence_bits;
        if total_bits > BACKING_BITS {
            return Err(Error::LayoutTooWide { total_bits });
        }

        Ok(Self {
            timestamp_bits,
            node_primary_bits,
            node_secondary_bits,
            sequence_bits,
        })
    }

    /// Width of the timestamp field in bits.
    pub const fn timestamp_bits(&self) -> u32 {
        self.timestamp_bits
    }

    /// Width of the node primary field in bits.
    pub const fn node_primary_bits(&self) -> u32 {
        self.node_primary_bits
    }

    /// Width of the node secondary field in bits.
    pub const fn node_secondary_bits(&self) -> u32 {
        self.node_secondary_bits
    }

    /// Width of the sequence field in bits.
    pub const fn sequence_bits(&self) -> u32 {
        self.sequence_bits
    }

    /// Sum of all four field widths.
    pub const fn total_bits(&self) -> u32 {
        self.timestamp_bits + self.node_primary_bits + self.node_secondary_bits + self.sequence_bits
    }

    /// Returns `true` when the packed id can exceed [`SAFE_TOTAL_BITS`].
    ///
    /// This is a warning condition, not an error: such ids are exact inside
    /// this crate but no longer fit environments limited to 63-bit (or
    /// 53-bit double) integers.
    pub const fn exceeds_safe_bits(&self) -> bool {
        self.total_bits() > SAFE_TOTAL_BITS
    }

    /// Largest id value the declared layout can account for.
    pub const fn max_value(&self) -> u128 {
        low_mask(self.total_bits())
    }

    pub const fn sequence_shift(&self) -> u32 {
        0
    }

    pub const fn node_secondary_shift(&self) -> u32 {
        self.sequence_bits
    }

    pub const fn node_primary_shift(&self) -> u32 {
        self.sequence_bits + self.node_secondary_bits
    }

    pub const fn timestamp_shift(&self) -> u32 {
        self.sequence_bits + self.node_secondary_bits + self.node_primary_bits
    }

    /// Largest representable timestamp offset (in ticks).
    pub const fn timestamp_mask(&self) -> u128 {
        low_mask(self.timestamp_bits)
    }

    /// Largest representable node primary id.
    pub const fn node_primary_mask(&self) -> u128 {
        low_mask(self.node_primary_bits)
    }

    /// Largest representable node secondary id.
    pub const fn node_secondary_mask(&self) -> u128 {
        low_mask(self.node_secondary_bits)
    }

    /// Largest representable sequence value.
    pub const fn sequence_mask(&self) -> u128 {
        low_mask(self.sequence_bits)
    }

    /// Packs the four field values into a single integer.
    ///
    /// Callers are expected to have range-checked each component against its
    /// field mask; out-of-range bits would alias neighboring fields.
    pub(crate) fn pack(
        &self,
        timestamp_offset: u128,
        node_primary: u128,
        node_secondary: u128,
        sequence: u128,
    ) -> u128 {
        debug_assert!(timestamp_offset <= self.timestamp_mask());
        debug_assert!(node_primary <= self.node_primary_mask());
        debug_assert!(node_secondary <= self.node_secondary_mask());
        debug_assert!(sequence <= self.sequence_mask());

        shl(timestamp_offset, self.timestamp_shift())
            | shl(node_primary, self.node_primary_shift())
            | shl(node_secondary, self.node_secondary_shift())
            | sequence
    }

    /// Extracts the sequence field.
    pub(crate) const fn sequence_of(&self, id: u128) -> u128 {
        id & self.sequence_mask()
    }

    /// Extracts the node secondary field.
    pub(crate) const fn node_secondary_of(&self, id: u128) -> u128 {
        shr(id, self.node_secondary_shift()) & self.node_secondary_mask()
    }

    /// Extracts the node primary field.
    pub(crate) const fn node_primary_of(&self, id: u128) -> u128 {
        shr(id, self.node_primary_shift()) & self.node_primary_mask()
    }

    /// Extracts the timestamp field **without masking**.
    ///
    /// The raw shifted value is kept so decode can flag offsets that exceed
    /// the declared field width instead of silently truncating them.
    pub(crate) const fn raw_timestamp_of(&self, id: u128) -> u128 {
        shr(id, self.timestamp_shift())
    }
}
