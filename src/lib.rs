//! `mzimport` reads raw mass spectrometry data files into an in-memory
//! scan model and reduces profile spectra to centroided peak lists.
//!
//! The crate is organized around a few pieces:
//!
//! 1. A [`Method`](crate::method::Method) contract shared by every long
//!    running operation, with cooperative cancellation and fractional
//!    progress reporting that work across threads.
//! 2. A [`DataPointStore`](crate::store::DataPointStore) that owns the
//!    bulk m/z and intensity buffers behind opaque handles, keeping the
//!    scan metadata lightweight.
//! 3. Streaming readers for the mzML and mzXML container formats behind
//!    one [`RecordSource`](crate::io::RecordSource) seam, fronted by a
//!    format-detecting [`RawFileImportMethod`](crate::io::RawFileImportMethod).
//! 4. A [`RecursiveCentroidingMethod`](crate::centroid::RecursiveCentroidingMethod)
//!    that splits profile signals at local minima and emits one peak per
//!    resolved summit.
//!
//! ```no_run
//! use std::sync::Arc;
//! use mzimport::{DataPointStore, ImportError, Method, RawFileImportMethod};
//!
//! # fn main() -> Result<(), ImportError> {
//! let store = Arc::new(DataPointStore::new());
//! let mut importer = RawFileImportMethod::new("./sample.mzML", store.clone());
//! if let Some(raw_file) = importer.execute()? {
//!     for scan in &raw_file.scans {
//!         println!("scan {:?}: {} total ion current", scan.scan_number, scan.tic);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
pub mod centroid;
pub mod io;
pub mod method;
pub mod spectrum;
pub mod store;

pub use crate::centroid::RecursiveCentroidingMethod;
pub use crate::io::{ImportError, RawFileImportMethod};
pub use crate::method::{CancelToken, Method, ProgressTracker};
pub use crate::spectrum::{
    RawDataFile, Scan, SpectrumDataPoints, SpectrumType,
};
pub use crate::store::{DataPointStore, StorageHandle, StoreError};
