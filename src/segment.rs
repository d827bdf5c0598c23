//! Conversion between logical packets and a page's segment table
//!
//! A segment table holds at most 255 entries, each describing at most 255
//! payload bytes. A run of 255-valued entries continues the current packet;
//! the first entry < 255 (including 0) terminates it. The terminating entry
//! is never omitted, so a packet whose length is an exact multiple of 255
//! ends in a zero-length segment.

use crate::MAX_CONTENT_SIZE;

pub(crate) const MAX_SEGMENT_SIZE: usize = 255;
pub(crate) const MAX_SEGMENT_COUNT: usize = 255;

/// Position of the segmentation engine within a packet queue
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct PacketCursor {
	/// Index of the packet currently being placed
	pub(crate) packet: usize,
	/// Bytes of that packet already placed on previous pages
	pub(crate) offset: usize,
}

/// One page's worth of segmentation output
pub(crate) struct FilledPage {
	pub(crate) segment_table: Vec<u8>,
	pub(crate) payload: Vec<u8>,
	/// Where the next invocation should resume
	pub(crate) next: PacketCursor,
	/// The last packet on this page did not receive its terminating segment
	pub(crate) continued: bool,
}

/// Fill a single segment table from the packet queue, starting at `cursor`
///
/// Consumes packets until either the queue is exhausted or the table holds
/// [`MAX_SEGMENT_COUNT`] entries. A packet only counts as consumed once its
/// terminating segment is placed; if the table fills first, the returned
/// cursor points at the unconsumed tail and `continued` is set, meaning the
/// page that follows must carry the continuation flag. A cursor positioned
/// at the end of a packet whose terminator did not fit yields a single
/// zero-length segment on the next invocation.
pub(crate) fn fill_page(packets: &[&[u8]], mut cursor: PacketCursor) -> FilledPage {
	let queued: usize = packets[cursor.packet..]
		.iter()
		.map(|packet| packet.len())
		.sum();

	let mut segment_table = Vec::with_capacity(MAX_SEGMENT_COUNT);
	let mut payload =
		Vec::with_capacity(MAX_CONTENT_SIZE.min(queued.saturating_sub(cursor.offset)));

	while cursor.packet < packets.len() && segment_table.len() < MAX_SEGMENT_COUNT {
		let packet = packets[cursor.packet];

		while packet.len() - cursor.offset >= MAX_SEGMENT_SIZE
			&& segment_table.len() < MAX_SEGMENT_COUNT
		{
			segment_table.push(MAX_SEGMENT_SIZE as u8);
			payload.extend_from_slice(&packet[cursor.offset..cursor.offset + MAX_SEGMENT_SIZE]);
			cursor.offset += MAX_SEGMENT_SIZE;
		}

		if packet.len() - cursor.offset >= MAX_SEGMENT_SIZE
			|| segment_table.len() == MAX_SEGMENT_COUNT
		{
			break;
		}

		// The terminating segment, possibly zero-length
		let remainder = packet.len() - cursor.offset;
		segment_table.push(remainder as u8);
		payload.extend_from_slice(&packet[cursor.offset..]);

		cursor.packet += 1;
		cursor.offset = 0;
	}

	FilledPage {
		segment_table,
		payload,
		continued: cursor.offset > 0,
		next: cursor,
	}
}

/// Derive per-page packet lengths from a segment table
///
/// The reverse of [`fill_page`]: consecutive entries are merged into one
/// packet while a run of 255-valued entries persists, and the run ends at
/// the first entry < 255. A table ending on a 255-valued entry leaves its
/// final packet unterminated, to be continued on the next page.
pub(crate) fn packet_lengths(segment_table: &[u8]) -> Vec<usize> {
	let mut lengths = Vec::new();
	let mut continues = false;

	for &segment in segment_table {
		if continues {
			// `continues` can only be set once an entry has been pushed
			*lengths.last_mut().unwrap() += usize::from(segment);
		} else {
			lengths.push(usize::from(segment));
		}

		continues = usize::from(segment) == MAX_SEGMENT_SIZE;
	}

	lengths
}

#[cfg(test)]
mod tests {
	use super::{MAX_SEGMENT_COUNT, PacketCursor, fill_page, packet_lengths};
	use crate::MAX_CONTENT_SIZE;

	fn single(packet: &[u8]) -> Vec<u8> {
		let filled = fill_page(&[packet], PacketCursor::default());
		assert!(!filled.continued);
		assert_eq!(filled.next.packet, 1);
		filled.segment_table
	}

	#[test]
	fn empty_packet_gets_zero_length_terminator() {
		assert_eq!(single(&[]), vec![0]);
	}

	#[test]
	fn exact_multiple_of_255_keeps_terminator() {
		assert_eq!(single(&[1; 255]), vec![255, 0]);
		assert_eq!(single(&[1; 510]), vec![255, 255, 0]);
	}

	#[test]
	fn short_packet() {
		assert_eq!(single(&[1; 40]), vec![40]);
		assert_eq!(single(&[1; 256]), vec![255, 1]);
	}

	#[test]
	fn multiple_packets_share_a_page() {
		let filled = fill_page(&[&[1; 300], &[2; 10], &[]], PacketCursor::default());

		assert_eq!(filled.segment_table, vec![255, 45, 10, 0]);
		assert_eq!(filled.payload.len(), 310);
		assert!(!filled.continued);
		assert_eq!(filled.next, PacketCursor { packet: 3, offset: 0 });
	}

	#[test]
	fn oversized_packet_spans_pages() {
		let packet = vec![7; MAX_CONTENT_SIZE + 100];

		let first = fill_page(&[&packet], PacketCursor::default());
		assert_eq!(first.segment_table, vec![255; MAX_SEGMENT_COUNT]);
		// A full segment table describes exactly one page's worth of content
		assert_eq!(first.payload.len(), MAX_CONTENT_SIZE);
		assert!(first.continued);
		assert_eq!(first.next, PacketCursor { packet: 0, offset: MAX_CONTENT_SIZE });

		let second = fill_page(&[&packet], first.next);
		assert_eq!(second.segment_table, vec![100]);
		assert_eq!(second.payload.len(), 100);
		assert!(!second.continued);
	}

	#[test]
	fn full_table_with_pending_terminator_continues_with_zero() {
		// The terminating segment never fits on the first page here
		let packet = vec![7; MAX_CONTENT_SIZE];

		let first = fill_page(&[&packet], PacketCursor::default());
		assert_eq!(first.segment_table, vec![255; MAX_SEGMENT_COUNT]);
		assert!(first.continued);

		let second = fill_page(&[&packet], first.next);
		assert_eq!(second.segment_table, vec![0]);
		assert!(second.payload.is_empty());
		assert!(!second.continued);
	}

	#[test]
	fn table_filled_at_packet_boundary_is_not_continued() {
		// 255 one-byte packets fill the table exactly; the page after them
		// starts a fresh packet and must not carry the continuation flag.
		let mut packets: Vec<&[u8]> = vec![&[9]; 255];
		packets.push(&[1; 40]);

		let first = fill_page(&packets, PacketCursor::default());
		assert_eq!(first.segment_table, vec![1; MAX_SEGMENT_COUNT]);
		assert!(!first.continued);
		assert_eq!(first.next, PacketCursor { packet: 255, offset: 0 });

		let second = fill_page(&packets, first.next);
		assert_eq!(second.segment_table, vec![40]);
		assert!(!second.continued);
	}

	#[test]
	fn partially_placed_packet_is_continued() {
		// 254 one-byte packets and then a large one: the large packet's
		// first segment lands in the final table slot, its terminator
		// does not fit, and the page ends mid-packet.
		let mut packets: Vec<&[u8]> = vec![&[9]; 254];
		let big = vec![1; 300];
		packets.push(&big);

		let first = fill_page(&packets, PacketCursor::default());
		assert_eq!(first.segment_table.len(), MAX_SEGMENT_COUNT);
		assert_eq!(first.segment_table[254], 255);
		assert!(first.continued);

		let second = fill_page(&packets, first.next);
		assert_eq!(second.segment_table, vec![45]);
		assert!(!second.continued);
	}

	#[test]
	fn reverse_direction_merges_runs() {
		assert_eq!(packet_lengths(&[0]), vec![0]);
		assert_eq!(packet_lengths(&[255, 0]), vec![255]);
		assert_eq!(packet_lengths(&[255, 255, 0]), vec![510]);
		assert_eq!(packet_lengths(&[255, 45, 10, 0]), vec![300, 10, 0]);
		// Unterminated final packet
		assert_eq!(packet_lengths(&[255, 255]), vec![510]);
	}
}
