use crate::comment;
use crate::crc;
use crate::error::{OggError, Result};
use crate::header::{HEADER_SIZE, PageHeader};
use crate::page::Page;
use crate::segment;
use crate::tag::{OggCodec, OggTag};

use std::collections::VecDeque;
use std::io::Read;

/// A demuxer over a sequential byte source
///
/// Pages are decoded strictly in stream order. [`OggDecoder::decode_page`]
/// returns one page at a time, while [`OggDecoder::next_packet`] sits on top
/// of it and reassembles packets that span multiple pages.
pub struct OggDecoder<R> {
	reader: R,
	queued: VecDeque<Vec<u8>>,
	partial: Option<Vec<u8>>,
}

impl<R> OggDecoder<R>
where
	R: Read,
{
	/// Create a new `OggDecoder` over a reader positioned at a page boundary
	pub fn new(reader: R) -> Self {
		Self {
			reader,
			queued: VecDeque::new(),
			partial: None,
		}
	}

	/// Consumes the decoder and returns the underlying reader
	pub fn into_inner(self) -> R {
		self.reader
	}

	/// Decode the next page from the reader
	///
	/// Returns `None` once the reader is exhausted at a page boundary.
	///
	/// A checksum mismatch is not an error; it is logged and recorded in
	/// [`Page::checksum_valid`], and decoding proceeds.
	///
	/// # Errors
	///
	/// * [`OggError::MissingMagic`]
	/// * [`OggError::InvalidVersion`]
	/// * [`OggError::BadSegmentCount`]
	/// * [`OggError::NotEnoughData`] (the header is cut short)
	/// * [`std::io::Error`]
	pub fn decode_page(&mut self) -> Result<Option<Page>> {
		let mut header_bytes = [0; HEADER_SIZE];

		let mut read = 0;
		while read < HEADER_SIZE {
			let n = self.reader.read(&mut header_bytes[read..])?;
			if n == 0 {
				break;
			}
			read += n;
		}

		match read {
			0 => return Ok(None),
			n if n < HEADER_SIZE => return Err(OggError::NotEnoughData),
			_ => {},
		}

		let (header, segment_count) = PageHeader::parse(&header_bytes)?;

		let mut segment_table = vec![0; usize::from(segment_count)];
		self.reader.read_exact(&mut segment_table)?;

		let packet_lengths = segment::packet_lengths(&segment_table);

		let content_len: usize = segment_table.iter().map(|&b| usize::from(b)).sum();
		let mut content = vec![0; content_len];
		self.reader.read_exact(&mut content)?;

		let mut zeroed = header;
		zeroed.checksum = 0;
		let checksum = crc::page_checksum(
			&zeroed.as_bytes(segment_count),
			&segment_table,
			&content,
		);

		let checksum_valid = checksum == header.checksum;
		if !checksum_valid {
			log::warn!(
				"OGG: Page {} failed checksum validation, continuing anyway",
				header.sequence_number
			);
		}

		Ok(Some(Page {
			header,
			segment_table,
			content,
			packet_lengths,
			checksum_valid,
		}))
	}

	/// Return the next whole packet, merging continuations across pages
	///
	/// Returns `None` at the end of the stream. A packet left unterminated
	/// by the final page is returned as-is.
	pub fn next_packet(&mut self) -> Result<Option<Vec<u8>>> {
		loop {
			if let Some(packet) = self.queued.pop_front() {
				return Ok(Some(packet));
			}

			let Some(page) = self.decode_page()? else {
				return Ok(self.partial.take());
			};

			self.queue_page(&page);
		}
	}

	/// Read all remaining packets from the stream
	///
	/// # Errors
	///
	/// See [`OggDecoder::decode_page`]
	pub fn packets(&mut self) -> Result<Vec<Vec<u8>>> {
		let mut packets = Vec::new();

		while let Some(packet) = self.next_packet()? {
			packets.push(packet);
		}

		Ok(packets)
	}

	/// Scan the stream for a Vorbis/Opus comment packet and parse it
	///
	/// Reaching the end of the stream without finding one is not an error,
	/// it simply yields `None`.
	///
	/// # Errors
	///
	/// * [`OggError::MalformedComment`] (the comment packet is structurally
	///   invalid)
	/// * See [`OggDecoder::decode_page`]
	pub fn read_tag(&mut self) -> Result<Option<OggTag>> {
		while let Some(packet) = self.next_packet()? {
			if let Some(body) = packet.strip_prefix(comment::VORBIS_COMMENT_HEAD) {
				return comment::parse(OggCodec::Vorbis, body).map(Some);
			}

			if let Some(body) = packet.strip_prefix(comment::OPUSTAGS) {
				return comment::parse(OggCodec::Opus, body).map(Some);
			}
		}

		Ok(None)
	}

	fn queue_page(&mut self, page: &Page) {
		let count = page.packet_count();

		for (idx, packet) in page.packets().into_iter().enumerate() {
			let continues = idx + 1 == count && page.last_packet_continues();

			if idx == 0 {
				if let Some(mut partial) = self.partial.take() {
					if page.is_continuation() {
						partial.extend_from_slice(packet);
						if continues {
							self.partial = Some(partial);
						} else {
							self.queued.push_back(partial);
						}
						continue;
					}

					log::warn!("OGG: Expected a continuation page, flushing partial packet");
					self.queued.push_back(partial);
				}
			}

			if continues {
				self.partial = Some(packet.to_vec());
			} else {
				self.queued.push_back(packet.to_vec());
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::OggDecoder;
	use crate::OggError;

	use std::io::Cursor;

	// A real Opus identification page, size 47
	const OPUS_IDENT_PAGE: &[u8] = &[
		b'O', b'g', b'g', b'S', 0, 0x02, 0, 0, 0, 0, 0, 0, 0, 0, 0xA5, 0xF6, 0xDD, 0x68, 0, 0,
		0, 0, 0xDD, 0x2D, 0x5B, 0xD5, 0x01, 0x13, 0x4F, 0x70, 0x75, 0x73, 0x48, 0x65, 0x61,
		0x64, 0x01, 0x02, 0x38, 0x01, 0x80, 0xBB, 0, 0, 0, 0, 0,
	];

	#[test]
	fn opus_ident_header() {
		let mut decoder = OggDecoder::new(Cursor::new(OPUS_IDENT_PAGE));

		let page = decoder.decode_page().unwrap().unwrap();
		assert_eq!(page.header().header_type_flag(), 0x02);
		assert_eq!(page.header().abgp, 0);
		assert_eq!(page.header().stream_serial, 1759377061);
		assert_eq!(page.header().sequence_number, 0);
		assert_eq!(page.header().checksum(), 3579522525);
		assert!(page.checksum_valid());
		assert_eq!(page.segment_table(), &[0x13]);
		assert_eq!(page.packet_count(), 1);
		assert_eq!(page.packets()[0].len(), 0x13);
		assert!(page.packets()[0].starts_with(b"OpusHead"));

		// Clean end of stream
		assert!(decoder.decode_page().unwrap().is_none());
	}

	#[test_log::test]
	fn corrupt_checksum_is_not_fatal() {
		let mut bytes = OPUS_IDENT_PAGE.to_vec();
		// Flip a payload byte, leaving the stored checksum stale
		let last = bytes.len() - 1;
		bytes[last] ^= 0xFF;

		let mut decoder = OggDecoder::new(Cursor::new(bytes));
		let page = decoder.decode_page().unwrap().unwrap();
		assert!(!page.checksum_valid());
	}

	#[test]
	fn truncated_header_is_fatal() {
		let mut decoder = OggDecoder::new(Cursor::new(&OPUS_IDENT_PAGE[..20]));

		assert!(matches!(
			decoder.decode_page(),
			Err(OggError::NotEnoughData)
		));
	}

	#[test]
	fn truncated_content_is_fatal() {
		let mut decoder = OggDecoder::new(Cursor::new(&OPUS_IDENT_PAGE[..40]));

		assert!(matches!(decoder.decode_page(), Err(OggError::Io(_))));
	}

	#[test]
	fn garbage_is_rejected() {
		let mut decoder = OggDecoder::new(Cursor::new(&[0x55; 64]));

		assert!(matches!(
			decoder.decode_page(),
			Err(OggError::MissingMagic)
		));
	}
}
