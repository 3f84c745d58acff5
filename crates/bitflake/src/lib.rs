//! # bitflake
//!
//! Configurable Snowflake/Sonyflake-style bit-field identifiers.
//!
//! A [`Layout`] splits an unsigned integer into four fields (timestamp,
//! node primary, node secondary, sequence) with user-chosen widths; an
//! [`Encoder`] packs monotonically increasing ids under that layout, and a
//! [`Decoder`] performs the inverse, flagging values that are inconsistent
//! with the declared layout instead of rejecting them. Well-known schemes
//! live in the [`Preset`] catalog.
//!
//! Ids cross every boundary as base-10 **strings**: valid layouts routinely
//! produce values above `2^53`, past exact double precision.
//!
//! ```
//! use bitflake::{Decoder, Encoder, Preset};
//!
//! let preset = Preset::Twitter;
//! let encoder = Encoder::new(preset.layout(), preset.clock(), 1, 2)?;
//! let decoder = Decoder::new(preset.layout(), preset.clock());
//!
//! let id = encoder.encode_at(1_700_000_000_000)?;
//! let parsed = decoder.decode_text(&id.to_string())?;
//!
//! assert_eq!(parsed.node_primary, 1);
//! assert_eq!(parsed.node_secondary, 2);
//! assert_eq!(parsed.sequence, 0);
//! assert!(!parsed.overflow.any());
//! # Ok::<(), bitflake::Error>(())
//! ```
//!
//! ## Feature flags
//!
//! - `serde`: string-form id serialization and validated layout/clock
//!   deserialization.
//! - `tracing`: trace-level span instrumentation on encode and decode.

mod clock;
mod decoder;
mod encoder;
mod error;
mod id;
mod layout;
mod preset;
#[cfg(feature = "serde")]
mod serde;

pub use crate::clock::*;
pub use crate::decoder::*;
pub use crate::encoder::*;
pub use crate::error::*;
pub use crate::id::*;
pub use crate::layout::*;
pub use crate::preset::*;
