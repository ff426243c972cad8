//! Error types for the renderer.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse font data: {0}")]
    FontParse(#[from] ttf_parser::FaceParsingError),

    #[error("no font found for family `{0}`")]
    FontNotFound(String),

    #[error("unknown size function `{0}` (expected linear, sqrt or sqrtinverse)")]
    UnknownSizeFunction(String),

    #[error("unknown placement mode `{0}` (expected ring or random)")]
    UnknownPlacementMode(String),

    #[error("invalid color `{0}`")]
    InvalidColor(String),

    #[error("color palette is empty")]
    EmptyPalette,

    #[error("invalid canvas size {width}x{height}")]
    InvalidCanvas { width: u32, height: u32 },

    #[error("mask image {}: {reason}", path.display())]
    Mask { path: PathBuf, reason: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("word list error: {0}")]
    Words(String),
}

impl From<json5::Error> for Error {
    fn from(e: json5::Error) -> Self {
        Error::Config(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Words(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
