//! OGG page framing with Vorbis/Opus comment support
//!
//! This crate reads and writes the container layer of an OGG bitstream: it
//! frames logical packets into pages, reassembles pages back into packets,
//! and validates/produces page checksums. On top of that framing it reads
//! and rewrites the comment ("tag") packet carried by Vorbis and Opus
//! streams, including an embedded `METADATA_BLOCK_PICTURE` cover image.
//!
//! ```rust,no_run
//! use std::fs::OpenOptions;
//!
//! # fn main() -> oggtag::Result<()> {
//! let mut file = OpenOptions::new().read(true).write(true).open("foo.ogg")?;
//!
//! let mut decoder = oggtag::OggDecoder::new(&mut file);
//! let Some(mut tag) = decoder.read_tag()? else {
//! 	// Not an error, the stream simply carries no comment packet
//! 	return Ok(());
//! };
//!
//! tag.set_artist("Foo");
//! tag.set_title("Bar");
//! tag.save_to(&mut file)?;
//! # Ok(()) }
//! ```

mod comment;
mod crc;
mod decode;
mod encode;
mod error;
mod header;
mod page;
mod picture;
mod segment;
mod tag;
mod write;

pub use crc::crc32;
pub use decode::OggDecoder;
pub use encode::OggEncoder;
pub use error::{OggError, Result};
pub use header::{HEADER_SIZE, PageHeader};
pub use page::Page;
pub use tag::{OggCodec, OggTag};
pub use write::Truncate;

/// The maximum page content size
pub const MAX_CONTENT_SIZE: usize = 65025;

/// The page carries the continuation of a packet started on a previous page
pub const CONTINUED_PACKET: u8 = 0x01;
/// The page is the first page of the logical bitstream
pub const CONTAINS_FIRST_PAGE_OF_BITSTREAM: u8 = 0x02;
/// The page is the last page of the logical bitstream
pub const CONTAINS_LAST_PAGE_OF_BITSTREAM: u8 = 0x04;
