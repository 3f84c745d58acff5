use crate::clock::ClockConfig;
use crate::error::Result;
use crate::id::Id;
use crate::layout::Layout;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Non-fatal layout-consistency annotations on a decoded id.
///
/// These are signals, not errors: a human operator may intentionally probe
/// out-of-spec values, and one adversarial id in a batch of thousands must
/// not abort the batch.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct OverflowFlags {
    /// The raw value carries bits the declared layout cannot account for.
    pub total_bits_exceeded: bool,
    /// The (unmasked) timestamp offset exceeds the declared field width.
    pub timestamp_field_exceeded: bool,
}

impl OverflowFlags {
    /// Returns `true` if any flag is set.
    pub const fn any(&self) -> bool {
        self.total_bits_exceeded || self.timestamp_field_exceeded
    }
}

/// An id decomposed under a specific layout and clock.
///
/// A flat record, so tabular exporters can emit one row per field without
/// further unpacking. All field values are exact; `timestamp_offset` is
/// kept **unmasked** so out-of-width offsets surface in
/// [`OverflowFlags::timestamp_field_exceeded`] instead of being silently
/// truncated.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ParsedId {
    /// The id that was decoded.
    pub id: Id,
    /// Raw ticks since the epoch, unmasked.
    pub timestamp_offset: u128,
    /// Reconstructed wall-clock instant, in milliseconds since the Unix
    /// epoch: `epoch_ms + timestamp_offset * tick_ms`. Wider than `u64`
    /// because the offset is unmasked; a flagged out-of-spec id can map
    /// past any calendar range.
    pub instant_ms: u128,
    /// Node primary field value (0 when the field is zero-width).
    pub node_primary: u64,
    /// Node secondary field value (0 when the field is zero-width).
    pub node_secondary: u64,
    /// Sequence field value.
    pub sequence: u64,
    /// Layout-consistency annotations.
    pub overflow: OverflowFlags,
}

/// One non-blank line of a batch decode.
#[derive(Clone, Debug)]
pub struct DecodedLine {
    /// 1-based line number in the original input.
    pub line: usize,
    /// The line's text, trimmed.
    pub text: String,
    /// The decoded record, or the error scoped to this line.
    pub result: Result<ParsedId>,
}

/// Decodes ids back into their constituent fields under a declared layout.
///
/// The decoder is stateless and never touches the clock; it only uses
/// [`ClockConfig`] to convert a tick offset back into a calendar instant.
/// An encoder's output fed unmodified into a decoder with the same layout
/// and clock is a correctness oracle: every field round-trips exactly.
///
/// # Example
/// ```
/// use bitflake::{Decoder, Encoder, Preset};
///
/// let preset = Preset::Twitter;
/// let encoder = Encoder::new(preset.layout(), preset.clock(), 1, 2)?;
/// let decoder = Decoder::new(preset.layout(), preset.clock());
///
/// let id = encoder.encode_at(1_700_000_000_000)?;
/// let parsed = decoder.decode_text(&id.to_string())?;
/// assert_eq!(parsed.node_primary, 1);
/// assert_eq!(parsed.node_secondary, 2);
/// assert_eq!(parsed.instant_ms, 1_700_000_000_000);
/// assert!(!parsed.overflow.any());
/// # Ok::<(), bitflake::Error>(())
/// ```
#[derive(Copy, Clone, Debug)]
pub struct Decoder {
    layout: Layout,
    clock: ClockConfig,
}

impl Decoder {
    /// Creates a decoder for a layout + clock pair.
    pub const fn new(layout: Layout, clock: ClockConfig) -> Self {
        Self { layout, clock }
    }

    /// Decodes a single id.
    ///
    /// Any id yields a [`ParsedId`], possibly with overflow flags set; the
    /// sole error is a timestamp offset whose reconstructed instant
    /// overflows the 128-bit millisecond range.
    ///
    /// # Errors
    /// [`Error::TimestampOutOfRange`]
    ///
    /// [`Error::TimestampOutOfRange`]: crate::Error::TimestampOutOfRange
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn decode(&self, id: Id) -> Result<ParsedId> {
        let raw = id.to_raw();

        let sequence = self.layout.sequence_of(raw) as u64;
        let node_secondary = self.layout.node_secondary_of(raw) as u64;
        let node_primary = self.layout.node_primary_of(raw) as u64;
        let timestamp_offset = self.layout.raw_timestamp_of(raw);

        let overflow = OverflowFlags {
            total_bits_exceeded: raw > self.layout.max_value(),
            timestamp_field_exceeded: timestamp_offset > self.layout.timestamp_mask(),
        };

        let instant_ms = self.clock.instant_ms(timestamp_offset)?;

        Ok(ParsedId {
            id,
            timestamp_offset,
            instant_ms,
            node_primary,
            node_secondary,
            sequence,
            overflow,
        })
    }

    /// Parses a decimal string and decodes it.
    ///
    /// # Errors
    /// - [`Error::NotADecimalInteger`] if `text` is not `^[0-9]+$`
    /// - [`Error::TimestampOutOfRange`] as in [`Self::decode`]
    ///
    /// [`Error::NotADecimalInteger`]: crate::Error::NotADecimalInteger
    /// [`Error::TimestampOutOfRange`]: crate::Error::TimestampOutOfRange
    pub fn decode_text(&self, text: &str) -> Result<ParsedId> {
        self.decode(text.parse()?)
    }

    /// Decodes newline-separated decimal strings.
    ///
    /// Blank (or whitespace-only) lines are ignored. Every non-blank line
    /// produces exactly one entry, in input order, carrying either a
    /// [`ParsedId`] or the error scoped to that line; a bad line never
    /// discards the rest of the batch.
    pub fn decode_lines(&self, input: &str) -> Vec<DecodedLine> {
        input
            .lines()
            .enumerate()
            .filter_map(|(idx, line)| {
                let text = line.trim();
                if text.is_empty() {
                    return None;
                }
                Some(DecodedLine {
                    line: idx + 1,
                    text: text.to_owned(),
                    result: self.decode_text(text),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::Encoder;
    use crate::error::Error;
    use crate::preset::Preset;

    fn twitter_decoder() -> Decoder {
        Decoder::new(Preset::Twitter.layout(), Preset::Twitter.clock())
    }

    #[test]
    fn round_trips_encoder_output() {
        let preset = Preset::Twitter;
        let encoder = Encoder::new(preset.layout(), preset.clock(), 5, 17).unwrap();
        let decoder = twitter_decoder();
        let now = 1_700_000_000_000;

        for expected_seq in 0..100u64 {
            let id = encoder.encode_at(now).unwrap();
            let parsed = decoder.decode_text(&id.to_string()).unwrap();

            assert_eq!(parsed.id, id);
            assert_eq!(
                parsed.timestamp_offset,
                u128::from(now - preset.clock().epoch_ms())
            );
            assert_eq!(parsed.instant_ms, u128::from(now));
            assert_eq!(parsed.node_primary, 5);
            assert_eq!(parsed.node_secondary, 17);
            assert_eq!(parsed.sequence, expected_seq);
            assert!(!parsed.overflow.any());
        }
    }

    #[test]
    fn sonyflake_round_trip_with_coarse_ticks() {
        let preset = Preset::Sonyflake;
        let encoder = Encoder::new(preset.layout(), preset.clock(), 0, 300).unwrap();
        let decoder = Decoder::new(preset.layout(), preset.clock());
        let now = 1_700_000_000_004; // not tick-aligned

        let id = encoder.encode_at(now).unwrap();
        let parsed = decoder.decode_text(&id.to_string()).unwrap();

        // nodePrimary is zero-width: always decodes to 0.
        assert_eq!(parsed.node_primary, 0);
        assert_eq!(parsed.node_secondary, 300);
        // The instant is floored to the 10 ms tick.
        assert_eq!(parsed.instant_ms, 1_700_000_000_000);
        assert!(!parsed.overflow.any());
    }

    #[test]
    fn sonyflake_primary_is_zero_for_any_input() {
        let decoder = Decoder::new(Preset::Sonyflake.layout(), Preset::Sonyflake.clock());
        for raw in [0u128, 1, 0xFFFF_FFFF, u128::from(u64::MAX), u128::MAX >> 1] {
            let parsed = decoder.decode(Id::from_raw(raw)).unwrap();
            assert_eq!(parsed.node_primary, 0, "raw {raw}");
        }
    }

    #[test]
    fn oversized_value_sets_total_bits_flag_without_failing() {
        let decoder = twitter_decoder();
        let parsed = decoder.decode_text("99999999999999999999999999").unwrap();
        assert!(parsed.overflow.total_bits_exceeded);
        assert!(parsed.overflow.timestamp_field_exceeded);
    }

    #[test]
    fn timestamp_flag_is_checked_against_the_unmasked_offset() {
        // 4-bit timestamp over 4-bit sequence: offset 20 does not fit but
        // must be reported raw, not truncated to 4.
        let layout = Layout::new(4, 0, 0, 4).unwrap();
        let clock = ClockConfig::new(0, 1).unwrap();
        let decoder = Decoder::new(layout, clock);

        let parsed = decoder.decode(Id::from_raw(20 << 4)).unwrap();
        assert_eq!(parsed.timestamp_offset, 20);
        assert!(parsed.overflow.timestamp_field_exceeded);
        assert!(parsed.overflow.total_bits_exceeded);
        assert_eq!(parsed.instant_ms, 20);
    }

    #[test]
    fn max_value_of_layout_carries_no_flags() {
        let layout = Preset::Twitter.layout();
        let decoder = twitter_decoder();
        let parsed = decoder.decode(Id::from_raw(layout.max_value())).unwrap();
        assert!(!parsed.overflow.total_bits_exceeded);
        assert!(!parsed.overflow.timestamp_field_exceeded);
        assert_eq!(parsed.timestamp_offset, layout.timestamp_mask());
    }

    #[test]
    fn unrepresentable_instant_is_the_one_decode_error() {
        // An unmasked offset near u128::MAX with a coarse tick overflows
        // the instant arithmetic itself.
        let layout = Layout::new(63, 0, 0, 0).unwrap();
        let clock = ClockConfig::new(0, 1_000).unwrap();
        let decoder = Decoder::new(layout, clock);

        let err = decoder.decode(Id::from_raw(u128::MAX)).unwrap_err();
        assert_eq!(err, Error::TimestampOutOfRange { offset: u128::MAX });
    }

    #[test]
    fn batch_preserves_order_and_scopes_errors_per_line() {
        let decoder = twitter_decoder();
        let input = "123\n\n   \nnot-an-id\n456\n";

        let lines = decoder.decode_lines(input);
        assert_eq!(lines.len(), 3);

        assert_eq!(lines[0].line, 1);
        assert_eq!(lines[0].text, "123");
        assert!(lines[0].result.is_ok());

        assert_eq!(lines[1].line, 4);
        assert_eq!(
            lines[1].result,
            Err(Error::NotADecimalInteger {
                text: "not-an-id".to_owned()
            })
        );

        assert_eq!(lines[2].line, 5);
        assert_eq!(lines[2].result.as_ref().unwrap().id, Id::from_raw(456));
    }

    #[test]
    fn batch_of_encoder_output_round_trips() {
        let preset = Preset::Discord;
        let encoder = Encoder::new(preset.layout(), preset.clock(), 3, 1).unwrap();
        let decoder = Decoder::new(preset.layout(), preset.clock());

        let ids = encoder.encode_batch_at(50, 1_700_000_000_000).unwrap();
        let input: String = ids
            .iter()
            .map(|id| format!("{id}\n"))
            .collect();

        let lines = decoder.decode_lines(&input);
        assert_eq!(lines.len(), ids.len());
        for (line, id) in lines.iter().zip(&ids) {
            let parsed = line.result.as_ref().unwrap();
            assert_eq!(parsed.id, *id);
            assert_eq!(parsed.node_primary, 3);
            assert_eq!(parsed.node_secondary, 1);
            assert!(!parsed.overflow.any());
        }
    }
}
