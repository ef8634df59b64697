//! Response composition.
//!
//! # Responsibilities
//! - Build the 202 acknowledgment carrying the tracking pixel
//! - Build the 405 rejection for non-GET requests
//! - Hold the pixel payload loaded once at startup
//!
//! # Design Decisions
//! - Acknowledgments are never cacheable; a cached pixel skips cookie renewal
//! - The payload is shared `Bytes`; each response gets its own view of it

use std::path::{Path, PathBuf};

use axum::{
    body::{Body, Bytes},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::http::request::MethodNotAllowed;

/// A 1×1 transparent GIF.
pub static TRANSPARENT_GIF: [u8; 43] = [
    0x47, 0x49, 0x46, 0x38, 0x39, 0x61, // GIF89a
    0x01, 0x00, 0x01, 0x00, 0x80, 0x00, 0x00, // 1x1, 2-entry global color table
    0x00, 0x00, 0x00, 0xff, 0xff, 0xff, // black, white
    0x21, 0xf9, 0x04, 0x01, 0x00, 0x00, 0x00, 0x00, // color 0 is transparent
    0x2c, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, // image descriptor
    0x02, 0x02, 0x44, 0x01, 0x00, // image data
    0x3b, // trailer
];

const NO_CACHE: &str = "no-cache, no-store, must-revalidate";

/// Failure to load a custom pixel at startup.
#[derive(Debug, Error)]
pub enum PixelError {
    #[error("failed to read pixel {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not a GIF image")]
    NotGif { path: PathBuf },
}

/// Immutable response payload.
#[derive(Debug, Clone)]
pub struct Pixel {
    bytes: Bytes,
}

impl Pixel {
    /// The built-in transparent pixel.
    pub fn transparent() -> Self {
        Self {
            bytes: Bytes::from_static(&TRANSPARENT_GIF),
        }
    }

    /// Read a GIF from disk.
    pub fn load(path: &Path) -> Result<Self, PixelError> {
        let data = std::fs::read(path).map_err(|source| PixelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if !(data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a")) {
            return Err(PixelError::NotGif {
                path: path.to_path_buf(),
            });
        }
        Ok(Self {
            bytes: Bytes::from(data),
        })
    }

    /// Configured pixel, or the built-in one when no path is set.
    pub fn from_config(path: Option<&str>) -> Result<Self, PixelError> {
        match path {
            Some(path) => Self::load(Path::new(path)),
            None => Ok(Self::transparent()),
        }
    }

    /// A fresh view of the payload.
    pub fn bytes(&self) -> Bytes {
        self.bytes.clone()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// 202 Accepted with the pixel and cache suppression headers.
pub fn accepted(pixel: &Pixel) -> Response {
    (
        StatusCode::ACCEPTED,
        [
            (header::CONTENT_TYPE, "image/gif"),
            (header::CACHE_CONTROL, NO_CACHE),
            (header::PRAGMA, "no-cache"),
            (header::EXPIRES, "0"),
        ],
        pixel.bytes(),
    )
        .into_response()
}

/// 405 Method Not Allowed naming the rejected method.
pub fn method_not_allowed(method: &Method) -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [
            (header::ALLOW, "GET"),
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
        ],
        Body::from(format!("HTTP method {} not allowed.", method)),
    )
        .into_response()
}

impl IntoResponse for MethodNotAllowed {
    fn into_response(self) -> Response {
        method_not_allowed(&self.method)
    }
}
