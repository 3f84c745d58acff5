use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{Error, Result};

/// Twitter epoch: Thursday, November 4, 2010 1:42:54.657 UTC
pub const TWITTER_EPOCH_MS: u64 = 1_288_834_974_657;

/// Sonyflake epoch: Monday, September 1, 2014 00:00:00 UTC
pub const SONYFLAKE_EPOCH_MS: u64 = 1_409_529_600_000;

/// Discord epoch: Thursday, January 1, 2015 00:00:00 UTC
pub const DISCORD_EPOCH_MS: u64 = 1_420_070_400_000;

/// Instagram epoch: Saturday, January 1, 2011 00:00:00 UTC
pub const INSTAGRAM_EPOCH_MS: u64 = 1_293_840_000_000;

/// A trait for time sources that report wall-clock time.
///
/// The value is **milliseconds since the Unix epoch**; epoch subtraction and
/// tick division happen inside the encoder, per its [`ClockConfig`]. This
/// abstraction lets tests plug in frozen or stepping time sources, exactly
/// as the encoder tests do.
///
/// # Example
/// ```
/// use bitflake::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn now_ms(&self) -> u64 {
///         1234
///     }
/// }
///
/// assert_eq!(FixedTime.now_ms(), 1234);
/// ```
pub trait TimeSource {
    /// Returns the current time in milliseconds since the Unix epoch.
    fn now_ms(&self) -> u64;
}

/// The system wall clock.
///
/// Reading the clock is the encoder's only interaction with an external
/// resource; decode never touches it.
#[derive(Copy, Clone, Debug, Default)]
pub struct WallClock;

impl TimeSource for WallClock {
    fn now_ms(&self) -> u64 {
        // A host clock before 1970 has no meaningful id-scheme semantics;
        // saturate to the epoch and let ClockBeforeEpoch surface it.
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Clock configuration shared by encode and decode.
///
/// `epoch_ms` is the reference point subtracted from wall-clock time;
/// `tick_ms` is how many milliseconds one unit of the timestamp field
/// represents (typically 1; the Sonyflake preset uses 10). Both sides of an
/// encode/decode round trip must use identical values.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ClockConfig {
    epoch_ms: u64,
    tick_ms: u64,
}

impl ClockConfig {
    /// Creates a clock configuration.
    ///
    /// # Errors
    /// [`Error::InvalidTickInterval`] if `tick_ms` is zero.
    pub fn new(epoch_ms: u64, tick_ms: u64) -> Result<Self> {
        if tick_ms == 0 {
            return Err(Error::InvalidTickInterval);
        }
        Ok(Self { epoch_ms, tick_ms })
    }

    /// Milliseconds-since-Unix-epoch reference point.
    pub const fn epoch_ms(&self) -> u64 {
        self.epoch_ms
    }

    /// Milliseconds per timestamp tick.
    pub const fn tick_ms(&self) -> u64 {
        self.tick_ms
    }

    /// Converts a wall-clock instant into whole ticks since the epoch.
    ///
    /// # Errors
    /// [`Error::ClockBeforeEpoch`] when `now_ms` predates the epoch.
    pub(crate) fn ticks_since_epoch(&self, now_ms: u64) -> Result<u64> {
        let Some(elapsed) = now_ms.checked_sub(self.epoch_ms) else {
            return Err(Error::ClockBeforeEpoch {
                now_ms,
                epoch_ms: self.epoch_ms,
            });
        };
        Ok(elapsed / self.tick_ms)
    }

    /// Reconstructs the wall-clock instant for a tick offset.
    ///
    /// The result is deliberately wider than a calendar instant: decoded
    /// offsets are unmasked, so an out-of-spec id can map far past any
    /// realistic date and must still be reported (flagged) rather than
    /// rejected.
    ///
    /// # Errors
    /// [`Error::TimestampOutOfRange`] when the arithmetic overflows the
    /// 128-bit millisecond range.
    pub(crate) fn instant_ms(&self, timestamp_offset: u128) -> Result<u128> {
        timestamp_offset
            .checked_mul(u128::from(self.tick_ms))
            .and_then(|ms| ms.checked_add(u128::from(self.epoch_ms)))
            .ok_or(Error::TimestampOutOfRange {
                offset: timestamp_offset,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_tick_is_rejected() {
        assert_eq!(
            ClockConfig::new(0, 0).unwrap_err(),
            Error::InvalidTickInterval
        );
    }

    #[test]
    fn ticks_floor_toward_epoch() {
        let clock = ClockConfig::new(1_000, 10).unwrap();
        assert_eq!(clock.ticks_since_epoch(1_000).unwrap(), 0);
        assert_eq!(clock.ticks_since_epoch(1_009).unwrap(), 0);
        assert_eq!(clock.ticks_since_epoch(1_010).unwrap(), 1);
        assert_eq!(clock.ticks_since_epoch(1_025).unwrap(), 2);
    }

    #[test]
    fn before_epoch_is_an_error() {
        let clock = ClockConfig::new(1_000, 1).unwrap();
        assert_eq!(
            clock.ticks_since_epoch(999).unwrap_err(),
            Error::ClockBeforeEpoch {
                now_ms: 999,
                epoch_ms: 1_000
            }
        );
    }

    #[test]
    fn instant_round_trips_ticks() {
        let clock = ClockConfig::new(SONYFLAKE_EPOCH_MS, 10).unwrap();
        let ticks = clock.ticks_since_epoch(SONYFLAKE_EPOCH_MS + 12_345).unwrap();
        assert_eq!(ticks, 1_234);
        assert_eq!(
            clock.instant_ms(u128::from(ticks)).unwrap(),
            u128::from(SONYFLAKE_EPOCH_MS) + 12_340
        );
    }

    #[test]
    fn unrepresentable_instant_is_an_error() {
        let clock = ClockConfig::new(0, 1_000).unwrap();
        let offset = u128::MAX;
        assert_eq!(
            clock.instant_ms(offset).unwrap_err(),
            Error::TimestampOutOfRange { offset }
        );
    }

    #[test]
    fn wall_clock_is_past_known_epochs() {
        let now = WallClock.now_ms();
        assert!(now > DISCORD_EPOCH_MS);
    }
}
