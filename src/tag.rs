use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};

use image::DynamicImage;

/// The codec whose comment packet a tag was read from or written for
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum OggCodec {
	/// Vorbis, comment packet prefixed with `\x03vorbis`
	#[default]
	Vorbis,
	/// Opus, comment packet prefixed with `OpusTags`
	Opus,
}

/// The metadata carried by a stream's comment packet
///
/// Well-known fields are stored as the raw strings found in the comment
/// block; the numeric accessors parse on demand. Fields with unrecognized
/// keys are preserved in a separate map so a rewrite does not silently drop
/// them.
#[derive(Clone, Default)]
pub struct OggTag {
	pub(crate) codec: OggCodec,
	pub(crate) vendor: String,
	pub(crate) album: String,
	pub(crate) album_artist: String,
	pub(crate) artist: String,
	pub(crate) bpm: String,
	pub(crate) composer: String,
	pub(crate) copyright: String,
	pub(crate) disc_number: String,
	pub(crate) disc_total: String,
	pub(crate) encoder: String,
	pub(crate) genre: String,
	pub(crate) title: String,
	pub(crate) track_number: String,
	pub(crate) track_total: String,
	pub(crate) cover_art: Option<DynamicImage>,
	pub(crate) unmapped: BTreeMap<String, String>,
}

macro_rules! string_accessors {
	($(($name:ident, $setter:ident, $field:ident)),+ $(,)?) => {
		$(
			/// Returns the field's raw string value, empty when unset
			pub fn $name(&self) -> &str {
				&self.$field
			}

			/// Sets the field's value
			pub fn $setter(&mut self, $field: impl Into<String>) {
				self.$field = $field.into();
			}
		)+
	};
}

macro_rules! numeric_accessors {
	($(($name:ident, $raw:ident, $setter:ident, $field:ident)),+ $(,)?) => {
		$(
			/// Returns the field parsed as an integer, `None` when unset or
			/// not a number
			pub fn $name(&self) -> Option<u32> {
				self.$field.parse().ok()
			}

			/// Returns the field's raw string value, empty when unset
			pub fn $raw(&self) -> &str {
				&self.$field
			}

			/// Sets the field's value
			pub fn $setter(&mut self, $field: u32) {
				self.$field = $field.to_string();
			}
		)+
	};
}

impl OggTag {
	/// Create an empty tag for the given codec
	pub fn new(codec: OggCodec) -> Self {
		Self {
			codec,
			..Self::default()
		}
	}

	/// Returns the codec this tag belongs to
	pub fn codec(&self) -> OggCodec {
		self.codec
	}

	/// Returns the vendor string
	pub fn vendor(&self) -> &str {
		&self.vendor
	}

	/// Sets the vendor string
	pub fn set_vendor(&mut self, vendor: impl Into<String>) {
		self.vendor = vendor.into();
	}

	string_accessors! {
		(album, set_album, album),
		(album_artist, set_album_artist, album_artist),
		(artist, set_artist, artist),
		(composer, set_composer, composer),
		(copyright, set_copyright, copyright),
		(encoder, set_encoder, encoder),
		(genre, set_genre, genre),
		(title, set_title, title),
	}

	numeric_accessors! {
		(bpm, bpm_str, set_bpm, bpm),
		(disc_number, disc_number_str, set_disc_number, disc_number),
		(disc_total, disc_total_str, set_disc_total, disc_total),
		(track_number, track_number_str, set_track_number, track_number),
		(track_total, track_total_str, set_track_total, track_total),
	}

	/// Returns the embedded cover art, if any
	pub fn cover_art(&self) -> Option<&DynamicImage> {
		self.cover_art.as_ref()
	}

	/// Sets the embedded cover art
	pub fn set_cover_art(&mut self, cover_art: DynamicImage) {
		self.cover_art = Some(cover_art);
	}

	/// Removes the embedded cover art
	pub fn remove_cover_art(&mut self) {
		self.cover_art = None;
	}

	/// Returns the fields whose keys were not recognized
	pub fn unmapped(&self) -> &BTreeMap<String, String> {
		&self.unmapped
	}

	/// Inserts a field under an arbitrary key, returning any previous value
	///
	/// The key is case-normalized to uppercase, matching how fields are read.
	pub fn insert_unmapped(
		&mut self,
		key: impl Into<String>,
		value: impl Into<String>,
	) -> Option<String> {
		self.unmapped.insert(key.into().to_uppercase(), value.into())
	}

	/// Clears every well-known field and the cover art
	///
	/// The vendor string and unmapped fields are left untouched.
	pub fn clear(&mut self) {
		self.album.clear();
		self.album_artist.clear();
		self.artist.clear();
		self.bpm.clear();
		self.composer.clear();
		self.copyright.clear();
		self.cover_art = None;
		self.disc_number.clear();
		self.disc_total.clear();
		self.encoder.clear();
		self.genre.clear();
		self.title.clear();
		self.track_number.clear();
		self.track_total.clear();
	}
}

impl Debug for OggTag {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("OggTag")
			.field("codec", &self.codec)
			.field("vendor", &self.vendor)
			.field("artist", &self.artist)
			.field("title", &self.title)
			.field("album", &self.album)
			.field("has_cover_art", &self.cover_art.is_some())
			.field("unmapped_fields", &self.unmapped.len())
			.finish_non_exhaustive()
	}
}
