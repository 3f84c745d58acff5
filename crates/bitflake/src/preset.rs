use core::fmt;
use core::str::FromStr;

use crate::clock::{
    ClockConfig, DISCORD_EPOCH_MS, INSTAGRAM_EPOCH_MS, SONYFLAKE_EPOCH_MS, TWITTER_EPOCH_MS,
};
use crate::error::Error;
use crate::layout::Layout;

/// Catalog of well-known layout + clock pairs.
///
/// Selecting a preset is equivalent to calling [`Layout::new`] and
/// [`ClockConfig::new`] with the preset's literal values; the catalog itself
/// performs no computation. The set is closed by design: presets are a
/// tagged enumeration resolved at compile time, not a string-keyed lookup.
///
/// # Example
/// ```
/// use bitflake::Preset;
///
/// let layout = Preset::Sonyflake.layout();
/// assert_eq!(layout.node_primary_bits(), 0);
/// assert_eq!(Preset::Sonyflake.clock().tick_ms(), 10);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Preset {
    /// 41-bit timestamp, 5-bit datacenter, 5-bit worker, 12-bit sequence;
    /// millisecond ticks from the Twitter epoch.
    Twitter,
    /// 39-bit timestamp, no primary field, 16-bit machine, 8-bit sequence;
    /// 10 ms ticks from the Sonyflake epoch.
    Sonyflake,
    /// 42-bit timestamp, 5-bit worker, 5-bit process, 12-bit sequence;
    /// millisecond ticks from the Discord epoch.
    Discord,
    /// 41-bit timestamp, 13-bit shard, no secondary field, 10-bit sequence;
    /// millisecond ticks from the Instagram epoch.
    Instagram,
}

impl Preset {
    /// Every catalog entry, in display order.
    pub const ALL: [Preset; 4] = [
        Preset::Twitter,
        Preset::Sonyflake,
        Preset::Discord,
        Preset::Instagram,
    ];

    /// The preset's bit-field layout.
    pub fn layout(&self) -> Layout {
        let (t, p, s, q) = match self {
            Preset::Twitter => (41, 5, 5, 12),
            Preset::Sonyflake => (39, 0, 16, 8),
            Preset::Discord => (42, 5, 5, 12),
            Preset::Instagram => (41, 13, 0, 10),
        };
        // Literal widths, all within range; cannot fail.
        match Layout::new(t, p, s, q) {
            Ok(layout) => layout,
            Err(_) => unreachable!("preset layouts are valid by construction"),
        }
    }

    /// The preset's epoch and tick granularity.
    pub fn clock(&self) -> ClockConfig {
        let (epoch_ms, tick_ms) = match self {
            Preset::Twitter => (TWITTER_EPOCH_MS, 1),
            Preset::Sonyflake => (SONYFLAKE_EPOCH_MS, 10),
            Preset::Discord => (DISCORD_EPOCH_MS, 1),
            Preset::Instagram => (INSTAGRAM_EPOCH_MS, 1),
        };
        match ClockConfig::new(epoch_ms, tick_ms) {
            Ok(clock) => clock,
            Err(_) => unreachable!("preset ticks are nonzero by construction"),
        }
    }

    /// The preset's canonical lowercase name.
    pub const fn name(&self) -> &'static str {
        match self {
            Preset::Twitter => "twitter",
            Preset::Sonyflake => "sonyflake",
            Preset::Discord => "discord",
            Preset::Instagram => "instagram",
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Preset::ALL
            .into_iter()
            .find(|p| s.eq_ignore_ascii_case(p.name()))
            .ok_or_else(|| Error::UnknownPreset { name: s.to_owned() })
    }
}
