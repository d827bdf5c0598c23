use crate::header::PageHeader;
use crate::segment::MAX_SEGMENT_SIZE;
use crate::{CONTAINS_LAST_PAGE_OF_BITSTREAM, CONTINUED_PACKET};

/// An OGG page
///
/// A page carries one or more packets; a single packet may also span
/// several pages, in which case every page but the last leaves its final
/// packet unterminated (see [`Page::last_packet_continues`]).
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Page {
	pub(crate) header: PageHeader,
	pub(crate) segment_table: Vec<u8>,
	pub(crate) content: Vec<u8>,
	pub(crate) packet_lengths: Vec<usize>,
	pub(crate) checksum_valid: bool,
}

impl Page {
	/// Returns the page's header
	pub fn header(&self) -> &PageHeader {
		&self.header
	}

	/// Returns the page's segment table
	pub fn segment_table(&self) -> &[u8] {
		self.segment_table.as_slice()
	}

	/// Returns the page's entire content, all packet payloads concatenated
	pub fn content(&self) -> &[u8] {
		self.content.as_slice()
	}

	/// Returns the number of packets starting or continuing on this page
	pub fn packet_count(&self) -> usize {
		self.packet_lengths.len()
	}

	/// Returns the page's packets, split per the segment table
	///
	/// The boundaries only cover this page; a first packet continued from a
	/// previous page or a last packet continuing onto the next one is
	/// returned partially.
	pub fn packets(&self) -> Vec<&[u8]> {
		let mut packets = Vec::with_capacity(self.packet_lengths.len());

		let mut pos = 0;
		for length in self.packet_lengths.iter().copied() {
			packets.push(&self.content[pos..pos + length]);
			pos += length;
		}

		packets
	}

	/// Whether the stored checksum matched the one computed during decoding
	///
	/// Checksum mismatches are deliberately non-fatal, many real-world files
	/// carry stale or tool-miscomputed checksums. Callers needing strict
	/// integrity must check this flag themselves.
	pub fn checksum_valid(&self) -> bool {
		self.checksum_valid
	}

	/// Whether the page's first packet continues one from the previous page
	pub fn is_continuation(&self) -> bool {
		self.header.header_type_flag & CONTINUED_PACKET != 0
	}

	/// Whether the page is flagged as the last of the logical bitstream
	pub fn is_last(&self) -> bool {
		self.header.header_type_flag & CONTAINS_LAST_PAGE_OF_BITSTREAM != 0
	}

	/// Whether the page's final packet continues onto the next page
	pub fn last_packet_continues(&self) -> bool {
		self.segment_table.last().copied() == Some(MAX_SEGMENT_SIZE as u8)
	}

	/// Convert the page back to bytes, using the checksum it was read with
	pub fn as_bytes(&self) -> Vec<u8> {
		let mut bytes = Vec::with_capacity(
			crate::HEADER_SIZE + self.segment_table.len() + self.content.len(),
		);

		bytes.extend_from_slice(&self.header.as_bytes(self.segment_table.len() as u8));
		bytes.extend_from_slice(&self.segment_table);
		bytes.extend_from_slice(&self.content);

		bytes
	}
}
