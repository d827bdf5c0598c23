//! The vendor string + `KEY=VALUE` comment list embedded in a stream's
//! first metadata packet
//!
//! All lengths in this block are little-endian 32-bit values, in contrast
//! to the big-endian picture sub-block nested inside it.

use crate::error::{OggError, Result};
use crate::picture;
use crate::tag::{OggCodec, OggTag};

use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use data_encoding::BASE64;

// https://xiph.org/vorbis/doc/Vorbis_I_spec.html#x1-620004.2.1
pub(crate) const VORBIS_COMMENT_HEAD: &[u8] = b"\x03vorbis";
// https://datatracker.ietf.org/doc/pdf/rfc7845.pdf#section-5.1
pub(crate) const OPUSTAGS: &[u8] = b"OpusTags";

const PICTURE_KEY: &str = "METADATA_BLOCK_PICTURE";

// Vendor used for packets built from a tag that never carried one
const DEFAULT_VENDOR: &str = "oggtag";

// Every well-known key, in the order comments are emitted
const FIELD_KEYS: [&str; 13] = [
	"ALBUM",
	"ALBUMARTIST",
	"ARTIST",
	"BPM",
	"COMPOSER",
	"COPYRIGHT",
	"DISCNUMBER",
	"DISCTOTAL",
	"ENCODER",
	"GENRE",
	"TITLE",
	"TRACKNUMBER",
	"TRACKTOTAL",
];

impl OggCodec {
	/// The magic prefix identifying this codec's comment packet
	pub fn comment_signature(self) -> &'static [u8] {
		match self {
			OggCodec::Vorbis => VORBIS_COMMENT_HEAD,
			OggCodec::Opus => OPUSTAGS,
		}
	}
}

fn field_mut<'a>(tag: &'a mut OggTag, key: &str) -> Option<&'a mut String> {
	let field = match key {
		"ALBUM" => &mut tag.album,
		"ALBUMARTIST" => &mut tag.album_artist,
		"ARTIST" => &mut tag.artist,
		"BPM" => &mut tag.bpm,
		"COMPOSER" => &mut tag.composer,
		"COPYRIGHT" => &mut tag.copyright,
		"DISCNUMBER" => &mut tag.disc_number,
		"DISCTOTAL" => &mut tag.disc_total,
		"ENCODER" => &mut tag.encoder,
		"GENRE" => &mut tag.genre,
		"TITLE" => &mut tag.title,
		"TRACKNUMBER" => &mut tag.track_number,
		"TRACKTOTAL" => &mut tag.track_total,
		_ => return None,
	};

	Some(field)
}

fn field<'a>(tag: &'a OggTag, key: &str) -> &'a str {
	match key {
		"ALBUM" => &tag.album,
		"ALBUMARTIST" => &tag.album_artist,
		"ARTIST" => &tag.artist,
		"BPM" => &tag.bpm,
		"COMPOSER" => &tag.composer,
		"COPYRIGHT" => &tag.copyright,
		"DISCNUMBER" => &tag.disc_number,
		"DISCTOTAL" => &tag.disc_total,
		"ENCODER" => &tag.encoder,
		"GENRE" => &tag.genre,
		"TITLE" => &tag.title,
		"TRACKNUMBER" => &tag.track_number,
		"TRACKTOTAL" => &tag.track_total,
		_ => "",
	}
}

/// Parse a comment block whose codec signature has already been stripped
pub(crate) fn parse(codec: OggCodec, body: &[u8]) -> Result<OggTag> {
	let reader = &mut &body[..];

	let vendor_len = reader.read_u32::<LittleEndian>()?;
	if vendor_len as usize > reader.len() {
		return Err(OggError::NotEnoughData);
	}

	let mut vendor_bytes = vec![0; vendor_len as usize];
	reader.read_exact(&mut vendor_bytes)?;

	let mut tag = OggTag::new(codec);
	tag.vendor = match String::from_utf8(vendor_bytes) {
		Ok(vendor) => vendor,
		Err(err) => {
			log::warn!("OGG: Vendor string is not valid UTF-8, substituting");
			String::from_utf8_lossy(err.as_bytes()).into_owned()
		},
	};

	let comment_count = reader.read_u32::<LittleEndian>()?;

	for _ in 0..comment_count {
		let comment_len = reader.read_u32::<LittleEndian>()?;
		if comment_len as usize > reader.len() {
			return Err(OggError::NotEnoughData);
		}

		let mut comment = vec![0; comment_len as usize];
		reader.read_exact(&mut comment)?;

		// KEY=VALUE
		let mut split = comment.splitn(2, |&b| b == b'=');
		let key_bytes = split.next().unwrap_or_default();
		let Some(value_bytes) = split.next() else {
			log::warn!("OGG: No separator found in comment, discarding");
			continue;
		};

		let key = String::from_utf8_lossy(key_bytes).to_uppercase();

		if key == PICTURE_KEY {
			let block = BASE64
				.decode(value_bytes)
				.map_err(|_| OggError::MalformedComment("Invalid base64 in picture field"))?;
			tag.cover_art = Some(picture::parse_block(&block)?);
			continue;
		}

		let value = String::from_utf8_lossy(value_bytes).into_owned();
		match field_mut(&mut tag, &key) {
			Some(field) => *field = value,
			None => {
				tag.unmapped.insert(key, value);
			},
		}
	}

	Ok(tag)
}

/// Serialize a tag into a full comment packet, codec signature included
///
/// One comment is written per non-empty well-known field, followed by the
/// preserved unmapped fields and, when cover art is present, a synthetic
/// `METADATA_BLOCK_PICTURE` comment. Vorbis packets get the trailing
/// framing bit; Opus packets do not.
pub(crate) fn build_packet(tag: &OggTag) -> Result<Vec<u8>> {
	let mut comments: Vec<String> = Vec::new();

	for key in FIELD_KEYS {
		let value = field(tag, key);
		if !value.is_empty() {
			comments.push(format!("{key}={value}"));
		}
	}

	for (key, value) in &tag.unmapped {
		if !value.is_empty() {
			comments.push(format!("{key}={value}"));
		}
	}

	if let Some(cover_art) = &tag.cover_art {
		let block = picture::build_block(cover_art)?;
		comments.push(format!("{PICTURE_KEY}={}", BASE64.encode(&block)));
	}

	let vendor = if tag.vendor.is_empty() {
		DEFAULT_VENDOR
	} else {
		tag.vendor.as_str()
	};

	let mut packet = Vec::new();
	packet.write_all(tag.codec.comment_signature())?;
	packet.write_u32::<LittleEndian>(vendor.len() as u32)?;
	packet.write_all(vendor.as_bytes())?;
	packet.write_u32::<LittleEndian>(comments.len() as u32)?;

	for comment in &comments {
		let Ok(comment_len) = u32::try_from(comment.len()) else {
			return Err(OggError::TooMuchData);
		};

		packet.write_u32::<LittleEndian>(comment_len)?;
		packet.write_all(comment.as_bytes())?;
	}

	if tag.codec == OggCodec::Vorbis {
		// Vorbis separates its header packets with a framing bit
		//
		// https://xiph.org/vorbis/doc/Vorbis_I_spec.html#x1-590004
		packet.push(1);
	}

	Ok(packet)
}
