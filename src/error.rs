//! Error types.
//!
//! Only deck loading, output-directory creation, font loading and export
//! post-processing can fail hard. Everything that happens while rendering a
//! single card (unknown style, missing image pixels, malformed macro)
//! degrades to a logged warning and a fallback value instead of an error.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CardforgeError>;

/// Hard failures reported to the caller.
#[derive(Error, Debug)]
pub enum CardforgeError {
    /// Reading or writing a file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The deck file is not well-formed XML.
    #[error("XML syntax error: {message}{}", .position.map(|p| format!(" at byte {p}")).unwrap_or_default())]
    Xml {
        message: String,
        position: Option<u64>,
    },

    /// The XML is well-formed but does not describe a deck.
    #[error("Invalid deck: {0}")]
    InvalidDeck(String),

    /// An embedded or referenced raster could not be decoded or encoded.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Embedded file data is not valid base64.
    #[error("Invalid embedded data: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The output directory could not be created.
    #[error("Unable to create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A font file could not be parsed.
    #[error("Unable to load font {path}: {message}")]
    Font { path: PathBuf, message: String },

    /// A PDF document could not be assembled.
    #[error("PDF output failed: {0}")]
    Pdf(String),

    /// Remote deck sources are not fetched by this crate.
    #[error("Remote deck sources are not supported: {0}")]
    RemoteSource(String),
}

impl CardforgeError {
    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<quick_xml::Error> for CardforgeError {
    fn from(err: quick_xml::Error) -> Self {
        Self::Xml {
            message: err.to_string(),
            position: None,
        }
    }
}
