use crate::crc;
use crate::error::{OggError, Result};
use crate::header::PageHeader;
use crate::segment::{self, MAX_SEGMENT_COUNT, PacketCursor};
use crate::{CONTAINS_FIRST_PAGE_OF_BITSTREAM, CONTAINS_LAST_PAGE_OF_BITSTREAM, CONTINUED_PACKET};

use std::io::Write;

/// A muxer emitting correctly segmented, checksummed pages to a byte sink
///
/// The encoder owns the stream serial number and the page sequence counter;
/// every page written through it is stamped with the current sequence number
/// before the counter advances.
pub struct OggEncoder<W> {
	writer: W,
	stream_serial: u32,
	sequence_number: u32,
}

impl<W> OggEncoder<W>
where
	W: Write,
{
	/// Create a new `OggEncoder` for the given logical bitstream
	pub fn new(writer: W, stream_serial: u32) -> Self {
		Self {
			writer,
			stream_serial,
			sequence_number: 0,
		}
	}

	/// Returns the stream serial number pages are stamped with
	pub fn stream_serial(&self) -> u32 {
		self.stream_serial
	}

	/// Returns the number of pages written so far
	pub fn pages_written(&self) -> u32 {
		self.sequence_number
	}

	/// Consumes the encoder and returns the underlying writer
	pub fn into_inner(self) -> W {
		self.writer
	}

	/// Write a beginning-of-stream page with the given packets
	///
	/// See [`OggEncoder::write_packets`]
	pub fn write_bos(&mut self, abgp: i64, packets: &[&[u8]]) -> Result<()> {
		self.write_packets(CONTAINS_FIRST_PAGE_OF_BITSTREAM, abgp, packets)
	}

	/// Write an interior page with the given packets
	///
	/// See [`OggEncoder::write_packets`]
	pub fn write(&mut self, abgp: i64, packets: &[&[u8]]) -> Result<()> {
		self.write_packets(0, abgp, packets)
	}

	/// Write an end-of-stream page with the given packets
	///
	/// See [`OggEncoder::write_packets`]
	pub fn write_eos(&mut self, abgp: i64, packets: &[&[u8]]) -> Result<()> {
		self.write_packets(CONTAINS_LAST_PAGE_OF_BITSTREAM, abgp, packets)
	}

	/// Write the given packets, splitting them across pages as needed
	///
	/// `flags` is only applied to the first page written; any page needed to
	/// carry the remainder of an unfinished packet is flagged as a
	/// continuation instead. An empty packet list writes a single page with
	/// one zero-length segment.
	///
	/// # Errors
	///
	/// * [`std::io::Error`]
	pub fn write_packets(&mut self, flags: u8, abgp: i64, packets: &[&[u8]]) -> Result<()> {
		let empty: [&[u8]; 1] = [&[]];
		let packets = if packets.is_empty() { &empty[..] } else { packets };

		let mut cursor = PacketCursor::default();
		let mut flags = flags;

		loop {
			let filled = segment::fill_page(packets, cursor);
			self.write_page(flags, abgp, &filled.segment_table, &filled.payload)?;

			cursor = filled.next;
			if cursor.packet >= packets.len() && !filled.continued {
				break;
			}

			flags = if filled.continued { CONTINUED_PACKET } else { 0 };
		}

		Ok(())
	}

	/// Write a page with a caller-provided segment table
	///
	/// Used to copy a decoded page structurally unchanged: only the serial
	/// number, sequence number and checksum are re-stamped, so continuation
	/// structure and flags survive as-is.
	///
	/// # Errors
	///
	/// * [`OggError::TooMuchData`] (more than 255 segments, or payload
	///   longer than the table describes)
	/// * [`OggError::NotEnoughData`] (payload shorter than the table
	///   describes)
	/// * [`std::io::Error`]
	pub fn write_raw_page(
		&mut self,
		flags: u8,
		abgp: i64,
		segment_table: &[u8],
		payload: &[u8],
	) -> Result<()> {
		if segment_table.is_empty() {
			return Err(OggError::BadSegmentCount);
		}

		if segment_table.len() > MAX_SEGMENT_COUNT {
			return Err(OggError::TooMuchData);
		}

		let described: usize = segment_table.iter().map(|&b| usize::from(b)).sum();
		if payload.len() > described {
			return Err(OggError::TooMuchData);
		}
		if payload.len() < described {
			return Err(OggError::NotEnoughData);
		}

		self.write_page(flags, abgp, segment_table, payload)
	}

	fn write_page(
		&mut self,
		flags: u8,
		abgp: i64,
		segment_table: &[u8],
		payload: &[u8],
	) -> Result<()> {
		let mut header = PageHeader::new(flags, abgp, self.stream_serial, self.sequence_number);

		let segment_count = segment_table.len() as u8;
		header.checksum =
			crc::page_checksum(&header.as_bytes(segment_count), segment_table, payload);

		self.writer.write_all(&header.as_bytes(segment_count))?;
		self.writer.write_all(segment_table)?;
		self.writer.write_all(payload)?;

		self.sequence_number += 1;
		Ok(())
	}
}
