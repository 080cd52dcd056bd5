//! Stream parser for the *GPRMC* sentence of the *NMEA 0183* protocol.
//!
//! The crate turns an unbounded byte stream from a positioning receiver
//! into discrete, validated position fixes: [`checksum`](checksum/index.html)
//! verifies the XOR checksum, [`parser`](parser/index.html) decodes GPRMC
//! fields into a [`GpsFix`](parser/struct.GpsFix.html),
//! [`geo`](geo/index.html) measures how far consecutive fixes are apart,
//! and [`reader`](reader/index.html) drives the whole pipeline from a
//! polled byte source, notifying registered observers.

#[cfg(test)]
#[macro_use]
extern crate assert_matches;
extern crate arrayvec;
extern crate chrono;
#[macro_use]
extern crate log;
#[macro_use]
extern crate quick_error;

pub mod checksum;
pub mod err;
pub mod geo;
pub mod parser;
pub mod reader;

pub use err::{ParseError, ReaderError};
pub use parser::GpsFix;
pub use reader::{ByteSource, ChunkSource, Reader};
