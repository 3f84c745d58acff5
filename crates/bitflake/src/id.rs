use core::fmt;
use core::str::FromStr;

use crate::error::Error;

/// A packed bit-field identifier.
///
/// `Id` is an opaque unsigned integer. At every boundary (display, storage,
/// transport) it is represented as a **base-10 string of digits**, never a
/// native float: valid layouts routinely produce values above `2^53`, where
/// doubles silently lose precision.
///
/// # Example
/// ```
/// use bitflake::Id;
///
/// let id: Id = "6989262162406457346".parse()?;
/// assert_eq!(id.to_string(), "6989262162406457346");
/// assert_eq!(id.to_raw(), 6989262162406457346);
/// # Ok::<(), bitflake::Error>(())
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Id {
    id: u128,
}

impl Id {
    /// Converts a raw integer into an `Id`.
    pub const fn from_raw(raw: u128) -> Self {
        Self { id: raw }
    }

    /// Converts this id into its raw integer representation.
    pub const fn to_raw(&self) -> u128 {
        self.id
    }

    /// Returns the decimal form zero-padded to the width of `u128::MAX`, so
    /// that the string ordering of padded ids matches their numeric
    /// ordering.
    pub fn to_padded_string(&self) -> String {
        let mut n = u128::MAX;
        let mut digits = 1;
        while n >= 10 {
            n /= 10;
            digits += 1;
        }
        format!("{:0width$}", self.id, width = digits)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Id")
            .field("id", &format_args!("{} (0x{:x})", self.id, self.id))
            .finish()
    }
}

impl FromStr for Id {
    type Err = Error;

    /// Parses a non-negative decimal integer: `^[0-9]+$`.
    ///
    /// No sign, no whitespace, no radix prefix. Anything else is
    /// [`Error::NotADecimalInteger`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::NotADecimalInteger {
                text: s.to_owned(),
            });
        }
        let raw = s.parse::<u128>().map_err(|_| Error::NotADecimalInteger {
            text: s.to_owned(),
        })?;
        Ok(Self::from_raw(raw))
    }
}

impl From<Id> for u128 {
    fn from(id: Id) -> u128 {
        id.to_raw()
    }
}

impl From<u128> for Id {
    fn from(raw: u128) -> Id {
        Id::from_raw(raw)
    }
}
