use crate::error::{OggError, Result};

use byteorder::{ByteOrder, LittleEndian};

/// The size of a page header, excluding the segment table
pub const HEADER_SIZE: usize = 27;

pub(crate) const MAGIC: &[u8; 4] = b"OggS";

/// An OGG page header
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct PageHeader {
	pub(crate) header_type_flag: u8,
	/// The page's absolute granule position
	pub abgp: i64,
	/// The page's stream serial number
	pub stream_serial: u32,
	/// The page's sequence number
	pub sequence_number: u32,
	pub(crate) checksum: u32,
}

impl PageHeader {
	/// Create a new `PageHeader`
	///
	/// The checksum starts out as 0, it is stamped when the page is written.
	pub fn new(header_type_flag: u8, abgp: i64, stream_serial: u32, sequence_number: u32) -> Self {
		Self {
			header_type_flag,
			abgp,
			stream_serial,
			sequence_number,
			checksum: 0,
		}
	}

	/// Parse the fixed-size portion of a page header
	///
	/// Returns the header alongside its segment count.
	///
	/// # Errors
	///
	/// * [`OggError::MissingMagic`]
	/// * [`OggError::InvalidVersion`]
	/// * [`OggError::BadSegmentCount`]
	pub fn parse(bytes: &[u8; HEADER_SIZE]) -> Result<(Self, u8)> {
		if &bytes[0..4] != MAGIC {
			return Err(OggError::MissingMagic);
		}

		// Version, always 0
		if bytes[4] != 0 {
			return Err(OggError::InvalidVersion);
		}

		let header_type_flag = bytes[5];
		let abgp = LittleEndian::read_i64(&bytes[6..14]);
		let stream_serial = LittleEndian::read_u32(&bytes[14..18]);
		let sequence_number = LittleEndian::read_u32(&bytes[18..22]);
		let checksum = LittleEndian::read_u32(&bytes[22..26]);

		let segments = bytes[26];
		if segments < 1 {
			return Err(OggError::BadSegmentCount);
		}

		let header = Self {
			header_type_flag,
			abgp,
			stream_serial,
			sequence_number,
			checksum,
		};

		Ok((header, segments))
	}

	/// Serialize the header to its 27 byte fixed-size form
	pub fn as_bytes(&self, segment_count: u8) -> [u8; HEADER_SIZE] {
		let mut bytes = [0; HEADER_SIZE];

		bytes[0..4].copy_from_slice(MAGIC);
		bytes[4] = 0;
		bytes[5] = self.header_type_flag;
		bytes[6..14].copy_from_slice(&self.abgp.to_le_bytes());
		bytes[14..18].copy_from_slice(&self.stream_serial.to_le_bytes());
		bytes[18..22].copy_from_slice(&self.sequence_number.to_le_bytes());
		bytes[22..26].copy_from_slice(&self.checksum.to_le_bytes());
		bytes[26] = segment_count;

		bytes
	}

	/// Returns the page's header type flag
	pub fn header_type_flag(&self) -> u8 {
		self.header_type_flag
	}

	/// Returns the page's checksum
	pub fn checksum(&self) -> u32 {
		self.checksum
	}
}

#[cfg(test)]
mod tests {
	use super::{HEADER_SIZE, PageHeader};
	use crate::OggError;
	use crate::CONTAINS_FIRST_PAGE_OF_BITSTREAM;

	#[test]
	fn round_trip() {
		let mut header = PageHeader::new(CONTAINS_FIRST_PAGE_OF_BITSTREAM, -1, 1234, 7);
		header.checksum = 0xDEAD_BEEF;

		let bytes = header.as_bytes(3);
		let (parsed, segments) = PageHeader::parse(&bytes).unwrap();

		assert_eq!(parsed, header);
		assert_eq!(segments, 3);
	}

	#[test]
	fn rejects_missing_magic() {
		let mut bytes = PageHeader::new(0, 0, 0, 0).as_bytes(1);
		bytes[0] = b'N';

		assert!(matches!(
			PageHeader::parse(&bytes),
			Err(OggError::MissingMagic)
		));
	}

	#[test]
	fn rejects_nonzero_version() {
		let mut bytes = PageHeader::new(0, 0, 0, 0).as_bytes(1);
		bytes[4] = 1;

		assert!(matches!(
			PageHeader::parse(&bytes),
			Err(OggError::InvalidVersion)
		));
	}

	#[test]
	fn rejects_zero_segment_count() {
		let bytes = PageHeader::new(0, 0, 0, 0).as_bytes(0);

		assert!(matches!(
			PageHeader::parse(&bytes),
			Err(OggError::BadSegmentCount)
		));
	}

	#[test]
	fn header_is_fixed_size() {
		let bytes = PageHeader::new(0, 0, 0, 0).as_bytes(1);
		assert_eq!(bytes.len(), HEADER_SIZE);
	}
}
