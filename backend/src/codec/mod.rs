//! CSV codec for salon data transfer.
//!
//! The encoder produces RFC4180-style text: a header row of column labels
//! followed by one line per record, with quote-escaping applied only where a
//! field needs it. The decoder is line-oriented: input is split on `\n`
//! before the field splitter runs, so a quoted field containing a literal
//! newline is broken across rows. That limitation is inherited from the
//! system whose files this codec must keep reading and is pinned by tests
//! here rather than fixed.

pub mod decode;
pub mod encode;

pub use decode::{decode, split_fields};
pub use encode::encode;
