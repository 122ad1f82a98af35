//! The normalized scan and raw-file model produced by the import pipeline.
//!
//! A [`Scan`] is immutable once constructed except for its associated
//! data-point content, which may be replaced wholesale (profile to centroid)
//! through [`Scan::set_data_points`] but never partially mutated in place.

use std::fmt::Display;
use std::path::PathBuf;

use crate::io::FileFormat;
use crate::store::{DataPointStore, StorageHandle, StoreError};

use super::data_points::{ChromatogramDataPoints, SpectrumDataPoints};

/// The instrument function a scan was acquired under, e.g. `ms` at level 2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MsFunction {
    pub name: String,
    pub ms_level: Option<u8>,
}

impl MsFunction {
    pub fn ms(ms_level: u8) -> Self {
        Self {
            name: "ms".into(),
            ms_level: Some(ms_level),
        }
    }
}

impl Default for MsFunction {
    fn default() -> Self {
        Self {
            name: "ms".into(),
            ms_level: None,
        }
    }
}

/// The polarity of an acquired scan.
#[repr(i8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Polarity {
    #[default]
    Unknown = 0,
    Positive = 1,
    Negative = -1,
}

/// The scanning mode of the instrument for one scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MsScanType {
    #[default]
    Unknown,
    Full,
    Zoom,
    Sim,
    Mrm,
    Crm,
}

/// Whether a spectrum is a dense sampled curve or already-reduced peaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpectrumType {
    Profile,
    Centroided,
}

impl Display for SpectrumType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// How precursor ions were dissociated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActivationType {
    #[default]
    Unknown,
    Cid,
    Hcd,
    Etd,
    Ecd,
}

/// Fragmentation applied to an ion, in-source or in an isolation step.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ActivationInfo {
    pub activation_type: ActivationType,
    pub energy: Option<f32>,
}

/// One precursor isolation performed before acquiring a scan.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IsolationInfo {
    /// Inclusive m/z bounds of the isolation window.
    pub mz_range: (f64, f64),
    pub precursor_mz: Option<f64>,
    pub precursor_charge: Option<i32>,
    pub activation: Option<ActivationInfo>,
}

/// Where a scan's buffers currently live: carried inline by value, or in a
/// [`DataPointStore`] under a handle once persisted.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanData {
    Inline(SpectrumDataPoints),
    Stored(StorageHandle),
}

impl Default for ScanData {
    fn default() -> Self {
        ScanData::Inline(SpectrumDataPoints::default())
    }
}

/// One acquired spectrum plus its instrument and chromatography context.
#[derive(Debug, Clone, Default)]
pub struct Scan {
    /// The source file's identifier for this record.
    pub id: String,
    pub scan_number: Option<u32>,
    pub function: MsFunction,
    pub scan_type: MsScanType,
    pub polarity: Polarity,
    pub spectrum_type: Option<SpectrumType>,
    /// Retention time in seconds, when the source declares one.
    pub retention_time: Option<f32>,
    /// Derived from the data points at import time, not from file metadata.
    pub mz_range: Option<(f64, f64)>,
    /// Total ion current, the sum of all intensities in the scan.
    pub tic: f32,
    pub source_fragmentation: Option<ActivationInfo>,
    pub isolations: Vec<IsolationInfo>,
    data: ScanData,
}

impl Scan {
    /// A scan carrying the given source identifier, otherwise-default
    /// metadata, and no data points.
    pub fn with_id(id: impl Into<String>) -> Scan {
        Scan {
            id: id.into(),
            ..Scan::default()
        }
    }

    /// Copy this scan's data points into `into`, reading through the store
    /// when the content has been persisted.
    pub fn data_points(
        &self,
        store: &DataPointStore,
        into: &mut SpectrumDataPoints,
    ) -> Result<(), StoreError> {
        match &self.data {
            ScanData::Inline(points) => {
                into.copy_from(points);
                Ok(())
            }
            ScanData::Stored(handle) => store.read_spectrum(*handle, into),
        }
    }

    /// Replace this scan's data-point content wholesale. The new list is
    /// persisted to the store and any previously stored entry is removed.
    pub fn set_data_points(
        &mut self,
        store: &DataPointStore,
        points: &SpectrumDataPoints,
    ) -> Result<(), StoreError> {
        let handle = store.store_spectrum(points)?;
        if let ScanData::Stored(old) = self.data {
            store.remove(old)?;
        }
        self.data = ScanData::Stored(handle);
        Ok(())
    }

    /// Attach an already-stored list to this scan without copying.
    pub fn set_stored_data(&mut self, handle: StorageHandle) {
        self.data = ScanData::Stored(handle);
    }

    pub fn storage_handle(&self) -> Option<StorageHandle> {
        match self.data {
            ScanData::Stored(handle) => Some(handle),
            ScanData::Inline(_) => None,
        }
    }

    /// Clone every property of this scan except its data-point content,
    /// which is left empty in the copy.
    pub fn clone_without_data(&self) -> Scan {
        Scan {
            data: ScanData::default(),
            ..self.clone()
        }
    }
}

/// The type of signal a chromatogram traces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChromatogramType {
    #[default]
    Unknown,
    /// Total ion current over time.
    Tic,
    /// Base peak intensity over time.
    Bpc,
    /// An extracted-ion trace.
    Xic,
}

/// An ancillary intensity-over-time trace declared by a raw file.
#[derive(Debug, Clone, Default)]
pub struct Chromatogram {
    pub chromatogram_type: ChromatogramType,
    data: Option<StorageHandle>,
}

impl Chromatogram {
    pub fn new(chromatogram_type: ChromatogramType, handle: StorageHandle) -> Self {
        Self {
            chromatogram_type,
            data: Some(handle),
        }
    }

    pub fn data_points(
        &self,
        store: &DataPointStore,
        into: &mut ChromatogramDataPoints,
    ) -> Result<(), StoreError> {
        match self.data {
            Some(handle) => store.read_chromatogram(handle, into),
            None => {
                into.clear();
                Ok(())
            }
        }
    }
}

/// An ordered collection of scans plus ancillary chromatograms and declared
/// instrument functions, built incrementally by an importer and handed to
/// callers as a completed, read-mostly object.
#[derive(Debug, Clone, Default)]
pub struct RawDataFile {
    pub name: String,
    pub location: Option<PathBuf>,
    pub format: FileFormat,
    pub scans: Vec<Scan>,
    pub chromatograms: Vec<Chromatogram>,
    pub functions: Vec<MsFunction>,
}

impl RawDataFile {
    pub fn new(location: PathBuf, format: FileFormat) -> Self {
        let name = location
            .file_name()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            name,
            location: Some(location),
            format,
            ..Default::default()
        }
    }

    /// Register the function a scan was acquired under, deduplicated.
    pub fn declare_function(&mut self, function: &MsFunction) {
        if !self.functions.contains(function) {
            self.functions.push(function.clone());
        }
    }
}
