//! Spec writers for column header charts
//!
//! The writer turns one column's metadata (type, stats, bins) plus the table's
//! resolved data block into a Vega-Lite specification. It never touches the
//! data itself; binning and counting happen in the renderer, except when
//! precomputed bins are supplied.
//!
//! # Example
//!
//! ```rust,ignore
//! use colchart::writer::{ColumnSpecInput, VegaLiteWriter};
//!
//! let writer = VegaLiteWriter::new();
//! let spec = writer.write_column(&input); // None for string/unknown columns
//! ```

pub mod vegalite;

pub use vegalite::{ColumnSpecInput, VegaLiteWriter};
