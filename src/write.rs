//! Rewriting a stream around a replacement comment packet
//!
//! The whole rewritten stream is buffered before the destination is
//! touched: the source and destination may be the same file, and a failure
//! partway through must leave the original bytes intact.

use crate::comment::{self, OPUSTAGS, VORBIS_COMMENT_HEAD};
use crate::decode::OggDecoder;
use crate::encode::OggEncoder;
use crate::error::{OggError, Result};
use crate::tag::OggTag;
use crate::CONTAINS_LAST_PAGE_OF_BITSTREAM;

use std::fs::File;
use std::io::{Cursor, Read, Seek, Write};

/// A byte store whose length can be reduced
pub trait Truncate {
	/// Shrink the storage to `new_len` bytes
	///
	/// # Errors
	///
	/// * [`std::io::Error`]
	fn truncate(&mut self, new_len: u64) -> std::io::Result<()>;
}

impl Truncate for File {
	fn truncate(&mut self, new_len: u64) -> std::io::Result<()> {
		self.set_len(new_len)
	}
}

impl Truncate for Cursor<Vec<u8>> {
	fn truncate(&mut self, new_len: u64) -> std::io::Result<()> {
		self.get_mut().truncate(new_len as usize);
		Ok(())
	}
}

impl<T> Truncate for &mut T
where
	T: Truncate,
{
	fn truncate(&mut self, new_len: u64) -> std::io::Result<()> {
		(**self).truncate(new_len)
	}
}

impl OggTag {
	/// Rewrite the stream in `file`, replacing its comment packet with the
	/// contents of this tag
	///
	/// The rewritten stream is fully buffered first; only then is `file`
	/// truncated and overwritten, so a failure at any earlier point leaves
	/// it untouched. On success the handle is left positioned at the end of
	/// the file.
	///
	/// # Errors
	///
	/// * The stream is empty or malformed, see [`OggDecoder::decode_page`]
	/// * [`std::io::Error`]
	pub fn save_to<F>(&self, file: &mut F) -> Result<()>
	where
		F: Read + Write + Seek + Truncate,
	{
		let mut buffer = Cursor::new(Vec::new());
		self.rewrite(file, &mut buffer)?;

		file.rewind()?;
		file.truncate(0)?;
		file.write_all(buffer.get_ref())?;
		file.flush()?;

		Ok(())
	}

	/// Rewrite the stream in `source` into `sink`, replacing its comment
	/// packet with the contents of this tag
	///
	/// Like [`OggTag::save_to`], nothing is written to `sink` until the
	/// whole rewritten stream has been produced.
	///
	/// # Errors
	///
	/// See [`OggTag::save_to`]
	pub fn rewrite_to<R, W>(&self, source: &mut R, sink: &mut W) -> Result<()>
	where
		R: Read + Seek,
		W: Write,
	{
		let mut buffer = Cursor::new(Vec::new());
		self.rewrite(source, &mut buffer)?;

		sink.write_all(buffer.get_ref())?;
		Ok(())
	}

	fn rewrite<R, W>(&self, source: &mut R, sink: &mut W) -> Result<()>
	where
		R: Read + Seek,
		W: Write,
	{
		source.rewind()?;
		let mut decoder = OggDecoder::new(source);

		// The identification page passes through unchanged, it only loses
		// its old checksum stamp
		let Some(first_page) = decoder.decode_page()? else {
			return Err(OggError::NotEnoughData);
		};

		let mut encoder = OggEncoder::new(sink, first_page.header().stream_serial);
		encoder.write_bos(first_page.header().abgp, &first_page.packets())?;

		while let Some(page) = decoder.decode_page()? {
			let replaces_comment = !page.is_continuation()
				&& page.packets().first().is_some_and(|packet| {
					packet.starts_with(VORBIS_COMMENT_HEAD) || packet.starts_with(OPUSTAGS)
				});

			if !replaces_comment {
				encoder.write_raw_page(
					page.header().header_type_flag(),
					page.header().abgp,
					page.segment_table(),
					page.content(),
				)?;
				continue;
			}

			let comment_packet = comment::build_packet(self)?;

			// The old packet may spill onto further pages, which carry
			// nothing but its remainder until the page it terminates on.
			// Those pages are consumed and dropped here; the replacement
			// is re-segmented from scratch by the muxer.
			let mut flags = 0;
			let mut abgp = page.header().abgp;
			let mut tail_page = Some(page);

			while let Some(current) = &tail_page {
				flags |= current.header().header_type_flag() & CONTAINS_LAST_PAGE_OF_BITSTREAM;
				abgp = current.header().abgp;

				if current.packet_count() > 1 || !current.last_packet_continues() {
					break;
				}

				tail_page = decoder.decode_page()?;
			}

			// Whatever shares the final page with the old packet's tail is
			// carried over behind the replacement
			let tail_packets = tail_page
				.as_ref()
				.map(|tail| tail.packets())
				.unwrap_or_default();

			let mut new_packets: Vec<&[u8]> = Vec::with_capacity(tail_packets.len().max(1));
			new_packets.push(&comment_packet);
			if !tail_packets.is_empty() {
				new_packets.extend_from_slice(&tail_packets[1..]);
			}

			encoder.write_packets(flags, abgp, &new_packets)?;
		}

		Ok(())
	}
}
