//! The FLAC-style picture block nested inside a `METADATA_BLOCK_PICTURE`
//! comment
//!
//! Unlike the page header, every integer in this sub-block is a big-endian
//! 32-bit value. The base64 layer around the block belongs to the comment
//! codec; this module works on the decoded bytes.

use crate::error::{OggError, Result};

use std::io::Cursor;

use image::{DynamicImage, GenericImageView, ImageFormat};

// https://xiph.org/flac/format.html#metadata_block_picture
const PICTURE_TYPE_FRONT_COVER: u32 = 3;
const PICTURE_MIME: &str = "image/jpeg";
const PICTURE_DESCRIPTION: &str = "Cover";

// Placeholder values, this implementation does not inspect pixel formats
const PICTURE_COLOR_DEPTH: u32 = 24;
const PICTURE_COLORS_USED: u32 = 0;

/// An explicit cursor over an immutable picture block
struct BlockReader<'a> {
	buffer: &'a [u8],
	pos: usize,
}

impl<'a> BlockReader<'a> {
	fn new(buffer: &'a [u8]) -> Self {
		Self { buffer, pos: 0 }
	}

	fn take(&mut self, count: usize) -> Result<&'a [u8]> {
		let end = self
			.pos
			.checked_add(count)
			.filter(|end| *end <= self.buffer.len())
			.ok_or(OggError::MalformedComment("Picture block is truncated"))?;

		let bytes = &self.buffer[self.pos..end];
		self.pos = end;
		Ok(bytes)
	}

	fn read_u32(&mut self) -> Result<u32> {
		let bytes = self.take(4)?;
		Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
	}
}

/// Extract and decode the image carried by a picture block
pub(crate) fn parse_block(block: &[u8]) -> Result<DynamicImage> {
	let mut reader = BlockReader::new(block);

	// Picture type
	reader.read_u32()?;

	let mime_len = reader.read_u32()?;
	reader.take(mime_len as usize)?;

	let description_len = reader.read_u32()?;
	reader.take(description_len as usize)?;

	// Width, height, color depth, colors used
	for _ in 0..4 {
		reader.read_u32()?;
	}

	let data_len = reader.read_u32()?;
	let data = reader.take(data_len as usize)?;

	Ok(image::load_from_memory(data)?)
}

/// Build a picture block around a JPEG re-encoding of `image`
pub(crate) fn build_block(image: &DynamicImage) -> Result<Vec<u8>> {
	let mut jpeg = Cursor::new(Vec::new());
	image.write_to(&mut jpeg, ImageFormat::Jpeg)?;
	let jpeg = jpeg.into_inner();

	let (width, height) = image.dimensions();

	let mut block = Vec::with_capacity(jpeg.len() + 64);
	block.extend(PICTURE_TYPE_FRONT_COVER.to_be_bytes());
	block.extend((PICTURE_MIME.len() as u32).to_be_bytes());
	block.extend(PICTURE_MIME.as_bytes());
	block.extend((PICTURE_DESCRIPTION.len() as u32).to_be_bytes());
	block.extend(PICTURE_DESCRIPTION.as_bytes());
	block.extend(width.to_be_bytes());
	block.extend(height.to_be_bytes());
	block.extend(PICTURE_COLOR_DEPTH.to_be_bytes());
	block.extend(PICTURE_COLORS_USED.to_be_bytes());
	block.extend((jpeg.len() as u32).to_be_bytes());
	block.extend(jpeg);

	Ok(block)
}

#[cfg(test)]
mod tests {
	use super::{BlockReader, build_block, parse_block};
	use crate::OggError;

	use image::{DynamicImage, GenericImageView, Rgb, RgbImage};

	fn test_image() -> DynamicImage {
		DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 6, Rgb([200, 30, 30])))
	}

	#[test]
	fn block_round_trip() {
		let original = test_image();

		let block = build_block(&original).unwrap();
		let decoded = parse_block(&block).unwrap();

		assert_eq!(decoded.dimensions(), (8, 6));
	}

	#[test]
	fn block_layout_is_big_endian() {
		let block = build_block(&test_image()).unwrap();

		let mut reader = BlockReader::new(&block);
		assert_eq!(reader.read_u32().unwrap(), 3);

		let mime_len = reader.read_u32().unwrap();
		assert_eq!(reader.take(mime_len as usize).unwrap(), b"image/jpeg");

		let desc_len = reader.read_u32().unwrap();
		assert_eq!(reader.take(desc_len as usize).unwrap(), b"Cover");

		assert_eq!(reader.read_u32().unwrap(), 8); // width
		assert_eq!(reader.read_u32().unwrap(), 6); // height
		assert_eq!(reader.read_u32().unwrap(), 24); // color depth placeholder
		assert_eq!(reader.read_u32().unwrap(), 0); // colors used placeholder

		let data_len = reader.read_u32().unwrap() as usize;
		let data = reader.take(data_len).unwrap();
		assert!(image::load_from_memory(data).is_ok());
	}

	#[test]
	fn truncated_block_is_rejected() {
		let block = build_block(&test_image()).unwrap();

		assert!(matches!(
			parse_block(&block[..block.len() - 10]),
			Err(OggError::MalformedComment(_))
		));
		assert!(matches!(
			parse_block(&block[..3]),
			Err(OggError::MalformedComment(_))
		));
	}
}
