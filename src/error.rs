use std::error::Error;
use std::fmt;

/// Alias for `Result<T, OggError>`
pub type Result<T> = std::result::Result<T, OggError>;

/// Errors that can occur while reading or writing an OGG stream
#[derive(Debug)]
pub enum OggError {
	/// The reader contains a page without a magic signature (OggS)
	MissingMagic,
	/// The reader contains a page with a nonzero version
	InvalidVersion,
	/// The reader contains a page with a segment count < 1
	BadSegmentCount,
	/// More data was provided than a single page can describe
	TooMuchData,
	/// The reader contains too little data to extract the expected information
	NotEnoughData,
	/// A comment or picture block failed structural validation
	MalformedComment(&'static str),
	/// The embedded cover art could not be decoded or encoded
	Image(image::ImageError),
	/// Any std::io::Error
	Io(std::io::Error),
}

impl fmt::Display for OggError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			OggError::MissingMagic => write!(f, "Page is missing a magic signature"),
			OggError::InvalidVersion => {
				write!(f, "Invalid stream structure version (Should always be 0)")
			},
			OggError::BadSegmentCount => write!(f, "Page has a segment count < 1"),
			OggError::TooMuchData => write!(f, "Too much data was provided"),
			OggError::NotEnoughData => {
				write!(f, "Too little data is available for the expected read")
			},
			OggError::MalformedComment(reason) => {
				write!(f, "Malformed comment block: {}", reason)
			},
			OggError::Image(err) => write!(f, "{}", err),
			OggError::Io(err) => write!(f, "{}", err),
		}
	}
}

impl Error for OggError {
	fn source(&self) -> Option<&(dyn Error + 'static)> {
		match *self {
			OggError::Image(ref e) => Some(e),
			OggError::Io(ref e) => Some(e),
			_ => None,
		}
	}
}

impl From<std::io::Error> for OggError {
	fn from(err: std::io::Error) -> OggError {
		OggError::Io(err)
	}
}

impl From<image::ImageError> for OggError {
	fn from(err: image::ImageError) -> OggError {
		OggError::Image(err)
	}
}
