//! Reading raw data files: format detection, the dispatching import
//! pipeline, and the per-format record sources it drives.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub(crate) mod binary;
mod import;
mod infer_format;
pub mod mzml;
pub mod mzxml;

pub use import::{ImportMethod, RawFileImportMethod, RecordSource, SpectrumRecord};
pub use infer_format::{infer_format, infer_from_path, infer_from_stream, FileFormat};

use crate::store::StoreError;

/// Errors raised while importing a raw data file.
///
/// Lower-level parse and I/O failures are wrapped exactly once at the
/// importer boundary into [`ImportError::ImportFailure`], which carries the
/// source path; none of these are retryable.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The container type of the source could not be matched to a supported
    /// format.
    #[error("Unrecognized or unsupported file format for {}", path.display())]
    UnsupportedFormat { path: PathBuf },

    /// A format-specific importer failed part-way through its source.
    #[error("Failed to import {}: {source}", path.display())]
    ImportFailure {
        path: PathBuf,
        #[source]
        source: Box<ImportError>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Invalid base64 data: {0}")]
    Base64(#[from] base64_simd::Error),

    /// A record's content contradicted its own declarations, e.g. a peak
    /// buffer whose byte length does not divide into whole values.
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
