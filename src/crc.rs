// The OGG page checksum uses polynomial 0x04C11DB7, MSB first, with no
// initial value and no final XOR.
const CRC_POLYNOMIAL: u32 = 0x04C1_1DB7;

const CRC_LOOKUP: [u32; 256] = {
	let mut table = [0_u32; 256];

	let mut i = 0;
	while i < 256 {
		let mut r = (i as u32) << 24;

		let mut j = 0;
		while j < 8 {
			if r & 0x8000_0000 != 0 {
				r = (r << 1) ^ CRC_POLYNOMIAL;
			} else {
				r <<= 1;
			}
			j += 1;
		}

		table[i] = r;
		i += 1;
	}

	table
};

/// Computes the CRC32 of `data` as defined by the OGG specification
pub fn crc32(data: &[u8]) -> u32 {
	update(0, data)
}

/// Computes the checksum of a page from its three sections
///
/// The header bytes must have the checksum field zeroed, both when
/// validating an incoming page and when stamping an outgoing one.
pub(crate) fn page_checksum(header: &[u8], segment_table: &[u8], payload: &[u8]) -> u32 {
	let mut crc = update(0, header);
	crc = update(crc, segment_table);
	update(crc, payload)
}

fn update(mut crc: u32, data: &[u8]) -> u32 {
	for &byte in data {
		crc = (crc << 8) ^ CRC_LOOKUP[(((crc >> 24) & 0xFF) ^ u32::from(byte)) as usize];
	}
	crc
}

#[cfg(test)]
mod tests {
	use super::{crc32, page_checksum};

	#[test]
	fn zeros_digest_to_zero() {
		// With no initial value, runs of zero bytes never set any bits
		assert_eq!(crc32(&[]), 0);
		assert_eq!(crc32(&[0; 64]), 0);
	}

	#[test]
	fn sectioned_digest_matches_contiguous() {
		let header = [0x4F, 0x67, 0x67, 0x53, 0, 0x02, 1, 2, 3];
		let table = [0x13];
		let payload = [0xDE, 0xAD, 0xBE, 0xEF];

		let mut contiguous = Vec::new();
		contiguous.extend_from_slice(&header);
		contiguous.extend_from_slice(&table);
		contiguous.extend_from_slice(&payload);

		assert_eq!(
			page_checksum(&header, &table, &payload),
			crc32(&contiguous)
		);
	}

	#[test]
	fn deterministic() {
		let data = b"OggS\x00\x02";
		let digest = crc32(data);
		assert_ne!(digest, 0);
		assert_eq!(digest, crc32(data));
	}
}
