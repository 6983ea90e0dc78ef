//! Binary format decoders for data URL payloads
//!
//! A data URL can carry an encoded binary table instead of CSV text. Each
//! decoder recognizes its format from the leading bytes; the registry is
//! passed to the resolver explicitly, so which formats are understood is a
//! property of the resolver instance rather than of the process.

use crate::{ColchartError, DataFrame, Result};
use polars::prelude::{IpcReader, SerReader};
use std::fmt;
use std::io::Cursor;
use std::sync::Arc;

/// A binary table format recognized inside data URLs
pub trait FormatDecoder: Send + Sync {
    /// Format type name, emitted as `format.type` in the Vega-Lite data block
    fn name(&self) -> &str;

    /// Check whether `bytes` are in this format
    fn sniff(&self, bytes: &[u8]) -> bool;

    /// Decode `bytes` into a DataFrame
    fn decode(&self, bytes: &[u8]) -> Result<DataFrame>;
}

/// Magic bytes at the start of an Arrow IPC file
pub const ARROW_MAGIC: &[u8; 6] = b"ARROW1";

/// Arrow IPC file format
#[derive(Debug, Clone, Copy, Default)]
pub struct ArrowIpcFormat;

impl FormatDecoder for ArrowIpcFormat {
    fn name(&self) -> &str {
        "arrow"
    }

    fn sniff(&self, bytes: &[u8]) -> bool {
        bytes.starts_with(ARROW_MAGIC)
    }

    fn decode(&self, bytes: &[u8]) -> Result<DataFrame> {
        IpcReader::new(Cursor::new(bytes.to_vec()))
            .finish()
            .map_err(|e| ColchartError::ReaderError(format!("Failed to read Arrow IPC data: {}", e)))
    }
}

/// Ordered set of binary format decoders; the first decoder that sniffs a payload wins
#[derive(Clone)]
pub struct FormatRegistry {
    decoders: Vec<Arc<dyn FormatDecoder>>,
}

impl Default for FormatRegistry {
    /// Registry with the Arrow IPC decoder
    fn default() -> Self {
        Self::empty().with_decoder(ArrowIpcFormat)
    }
}

impl fmt::Debug for FormatRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.names())
            .finish()
    }
}

impl FormatRegistry {
    /// Registry with no decoders: every data URL is treated as text
    pub fn empty() -> Self {
        Self {
            decoders: Vec::new(),
        }
    }

    /// Add a decoder, checked after the ones already registered
    pub fn with_decoder<D: FormatDecoder + 'static>(mut self, decoder: D) -> Self {
        self.decoders.push(Arc::new(decoder));
        self
    }

    /// Find the decoder recognizing `bytes`
    pub fn sniff(&self, bytes: &[u8]) -> Option<&dyn FormatDecoder> {
        self.decoders
            .iter()
            .find(|d| d.sniff(bytes))
            .map(|d| d.as_ref())
    }

    /// Registered format names, in lookup order
    pub fn names(&self) -> Vec<&str> {
        self.decoders.iter().map(|d| d.name()).collect()
    }
}
