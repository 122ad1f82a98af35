//! The in-memory scan and chromatogram model that importers produce and the
//! signal-processing methods consume.

mod data_points;
mod scan;
mod type_detection;

pub use data_points::{ChromatogramDataPoints, FeatureDataPoints, SpectrumDataPoints};
pub use scan::{
    ActivationInfo, ActivationType, Chromatogram, ChromatogramType, IsolationInfo, MsFunction,
    MsScanType, Polarity, RawDataFile, Scan, ScanData, SpectrumType,
};
pub use type_detection::detect_spectrum_type;
