//! Serde support.
//!
//! Ids cross every serialization boundary as **base-10 strings**, never as
//! native numbers: JSON consumers commonly route numbers through doubles,
//! which lose exactness above `2^53`. Layouts and clock configs deserialize
//! through their validating constructors so an invalid document can never
//! materialize an invalid value.

use serde::de::Error as _;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::clock::ClockConfig;
use crate::decoder::ParsedId;
use crate::id::Id;
use crate::layout::Layout;

impl Serialize for Id {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// A `u128` rendered as a decimal string; JSON numbers stop being exact at
/// `u64` (and commonly at `2^53`), and both wide fields of a [`ParsedId`]
/// are unmasked and can exceed that.
struct Decimal(u128);

impl Serialize for Decimal {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&self.0)
    }
}

impl Serialize for ParsedId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("ParsedId", 7)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("timestamp_offset", &Decimal(self.timestamp_offset))?;
        state.serialize_field("instant_ms", &Decimal(self.instant_ms))?;
        state.serialize_field("node_primary", &self.node_primary)?;
        state.serialize_field("node_secondary", &self.node_secondary)?;
        state.serialize_field("sequence", &self.sequence)?;
        state.serialize_field("overflow", &self.overflow)?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(D::Error::custom)
    }
}

#[derive(Deserialize)]
struct LayoutRepr {
    timestamp_bits: u32,
    node_primary_bits: u32,
    node_secondary_bits: u32,
    sequence_bits: u32,
}

impl<'de> Deserialize<'de> for Layout {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let repr = LayoutRepr::deserialize(deserializer)?;
        Layout::new(
            repr.timestamp_bits,
            repr.node_primary_bits,
            repr.node_secondary_bits,
            repr.sequence_bits,
        )
        .map_err(D::Error::custom)
    }
}

#[derive(Deserialize)]
struct ClockConfigRepr {
    epoch_ms: u64,
    tick_ms: u64,
}

impl<'de> Deserialize<'de> for ClockConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let repr = ClockConfigRepr::deserialize(deserializer)?;
        ClockConfig::new(repr.epoch_ms, repr.tick_ms).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Decoder, Id, Layout, Preset};

    #[test]
    fn id_serializes_as_a_decimal_string() {
        let id = Id::from_raw(1 << 64);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"18446744073709551616\"");
        let back: Id = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn id_refuses_native_numbers() {
        assert!(serde_json::from_str::<Id>("42").is_err());
    }

    #[test]
    fn layout_deserialization_is_validated() {
        let ok = r#"{"timestamp_bits":41,"node_primary_bits":5,"node_secondary_bits":5,"sequence_bits":12}"#;
        let layout: Layout = serde_json::from_str(ok).unwrap();
        assert_eq!(layout, Preset::Twitter.layout());

        let bad = r#"{"timestamp_bits":64,"node_primary_bits":0,"node_secondary_bits":0,"sequence_bits":0}"#;
        assert!(serde_json::from_str::<Layout>(bad).is_err());
    }

    #[test]
    fn clock_deserialization_is_validated() {
        let bad = r#"{"epoch_ms":0,"tick_ms":0}"#;
        assert!(serde_json::from_str::<crate::ClockConfig>(bad).is_err());
    }

    #[test]
    fn parsed_id_is_a_flat_record() {
        let preset = Preset::Twitter;
        let decoder = Decoder::new(preset.layout(), preset.clock());
        let parsed = decoder.decode(Id::from_raw(1 << 22)).unwrap();

        let value = serde_json::to_value(parsed).unwrap();
        assert_eq!(value["id"], "4194304");
        assert_eq!(value["timestamp_offset"], "1");
        assert_eq!(value["instant_ms"], "1288834974658");
        assert_eq!(value["sequence"], 0);
        assert_eq!(value["overflow"]["total_bits_exceeded"], false);
    }
}
