//! The file-type-dispatching import pipeline.
//!
//! [`ImportMethod`] is the one importer pattern every format shares: it
//! drives a format-specific [`RecordSource`], normalizes each record into a
//! [`Scan`], and builds up the [`RawDataFile`]. [`RawFileImportMethod`]
//! sits in front, detects the container format, instantiates the matching
//! importer, and proxies progress and cancellation to it while staying
//! format-agnostic itself.

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::sync::Arc;

use flate2::bufread::GzDecoder;
use log::info;

use crate::method::{CancelToken, Method, ProgressTracker};
use crate::spectrum::{
    detect_spectrum_type, ActivationInfo, IsolationInfo, MsFunction, MsScanType, Polarity,
    RawDataFile, Scan, SpectrumDataPoints, SpectrumType,
};
use crate::store::DataPointStore;

use super::infer_format::{infer_format, FileFormat};
use super::mzml::MzMLRecordSource;
use super::mzxml::MzXmlRecordSource;
use super::ImportError;

/// The raw per-record facts a container format can state about one
/// spectrum, before normalization. Produced by a [`RecordSource`], consumed
/// by [`ImportMethod`].
#[derive(Debug, Clone, Default)]
pub struct SpectrumRecord {
    pub id: String,
    pub scan_number: Option<u32>,
    pub ms_level: Option<u8>,
    pub function_name: Option<String>,
    pub polarity: Polarity,
    pub scan_type: MsScanType,
    /// Retention time in seconds.
    pub retention_time: Option<f32>,
    /// The representation the file claims for this spectrum, if any.
    pub declared_type: Option<SpectrumType>,
    pub source_fragmentation: Option<ActivationInfo>,
    pub isolations: Vec<IsolationInfo>,
    pub points: SpectrumDataPoints,
}

/// A format-specific stream of spectrum records in source order. The byte
/// layout of each container lives entirely behind this seam.
pub trait RecordSource {
    /// The total number of records, when the container declares one up
    /// front. `None` means progress cannot be reported as a fraction.
    fn record_count(&mut self) -> Result<Option<u64>, ImportError>;

    /// The next record, or `None` once the source is exhausted.
    fn next_record(&mut self) -> Result<Option<SpectrumRecord>, ImportError>;
}

/// Imports every record of one [`RecordSource`] into a [`RawDataFile`].
///
/// Per record it extracts the metadata, computes the m/z range and total
/// ion current from the decoded buffers, auto-detects profile vs. centroid
/// when the file does not declare it, pushes the buffers into the store,
/// and appends the normalized scan. Cancellation is polled once per record;
/// a canceled run returns `Ok(None)` with no partial result exposed.
pub struct ImportMethod<S> {
    source: S,
    path: PathBuf,
    format: FileFormat,
    store: Arc<DataPointStore>,
    progress: ProgressTracker,
    cancel: CancelToken,
    processed: u64,
    total: Option<u64>,
    result: Option<RawDataFile>,
}

impl<S: RecordSource> ImportMethod<S> {
    pub fn new(source: S, path: PathBuf, format: FileFormat, store: Arc<DataPointStore>) -> Self {
        Self {
            source,
            path,
            format,
            store,
            progress: ProgressTracker::new(),
            cancel: CancelToken::new(),
            processed: 0,
            total: None,
            result: None,
        }
    }

    /// Replace the cancellation token, so an enclosing operation can share
    /// one flag with this importer.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Transfer ownership of the imported file out of the method.
    pub fn take_result(&mut self) -> Option<RawDataFile> {
        self.result.take()
    }

    fn run(&mut self) -> Result<Option<RawDataFile>, ImportError> {
        self.total = self.source.record_count()?;
        if self.total.is_some() {
            self.progress.update(0.0);
        }

        let mut raw_file = RawDataFile::new(self.path.clone(), self.format);
        loop {
            if self.cancel.is_canceled() {
                info!(
                    "Import of {} canceled after {} records",
                    self.path.display(),
                    self.processed
                );
                return Ok(None);
            }
            let record = match self.source.next_record()? {
                Some(record) => record,
                None => break,
            };
            let scan = self.normalize(record)?;
            raw_file.declare_function(&scan.function);
            raw_file.scans.push(scan);

            self.processed += 1;
            if let Some(total) = self.total {
                self.progress.update(self.processed as f32 / total as f32);
            }
        }
        self.progress.update(1.0);
        Ok(Some(raw_file))
    }

    /// Turn one raw record into a normalized scan backed by the store.
    fn normalize(&mut self, record: SpectrumRecord) -> Result<Scan, ImportError> {
        // Derived values come from the buffers, not from file metadata
        let mz_range = record.points.mz_range();
        let tic = record.points.tic();
        let spectrum_type = record.declared_type.unwrap_or_else(|| {
            detect_spectrum_type(record.points.mzs(), record.points.intensities())
        });
        let handle = self.store.store_spectrum(&record.points)?;

        let mut scan = Scan::with_id(record.id);
        scan.scan_number = record.scan_number;
        scan.function = MsFunction {
            name: record.function_name.unwrap_or_else(|| "ms".into()),
            ms_level: record.ms_level,
        };
        scan.scan_type = record.scan_type;
        scan.polarity = record.polarity;
        scan.spectrum_type = Some(spectrum_type);
        scan.retention_time = record.retention_time;
        scan.mz_range = mz_range;
        scan.tic = tic;
        scan.source_fragmentation = record.source_fragmentation;
        scan.isolations = record.isolations;
        scan.set_stored_data(handle);
        Ok(scan)
    }

    /// Wrap an underlying failure once at the importer boundary, tagging it
    /// with the source path.
    fn wrap_failure(&self, error: ImportError) -> ImportError {
        match error {
            already @ (ImportError::ImportFailure { .. }
            | ImportError::UnsupportedFormat { .. }) => already,
            cause => ImportError::ImportFailure {
                path: self.path.clone(),
                source: Box::new(cause),
            },
        }
    }
}

impl<S: RecordSource> Method for ImportMethod<S> {
    type Output = RawDataFile;
    type Error = ImportError;

    fn execute(&mut self) -> Result<Option<&RawDataFile>, ImportError> {
        info!("Started parsing file {}", self.path.display());
        match self.run() {
            Ok(Some(raw_file)) => {
                info!(
                    "Finished importing {}, parsed {} scans",
                    self.path.display(),
                    raw_file.scans.len()
                );
                self.result = Some(raw_file);
                Ok(self.result.as_ref())
            }
            Ok(None) => Ok(None),
            Err(error) => Err(self.wrap_failure(error)),
        }
    }

    fn progress(&self) -> Option<f32> {
        self.progress.fraction()
    }

    fn result(&self) -> Option<&RawDataFile> {
        self.result.as_ref()
    }

    fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }
}

/// The importer variant a [`RawFileImportMethod`] selected for its source.
enum SelectedImporter {
    MzML(ImportMethod<MzMLRecordSource<Box<dyn BufRead>>>),
    MzXML(ImportMethod<MzXmlRecordSource<Box<dyn BufRead>>>),
}

impl SelectedImporter {
    fn execute(&mut self) -> Result<bool, ImportError> {
        match self {
            SelectedImporter::MzML(method) => method.execute().map(|done| done.is_some()),
            SelectedImporter::MzXML(method) => method.execute().map(|done| done.is_some()),
        }
    }

    fn take_result(&mut self) -> Option<RawDataFile> {
        match self {
            SelectedImporter::MzML(method) => method.take_result(),
            SelectedImporter::MzXML(method) => method.take_result(),
        }
    }

    fn progress(&self) -> Option<f32> {
        match self {
            SelectedImporter::MzML(method) => method.progress(),
            SelectedImporter::MzXML(method) => method.progress(),
        }
    }
}

/// Detects the container format of a file and imports it with the matching
/// importer, proxying progress and cancellation.
///
/// Progress is unknown until an importer has been selected. Cancelling
/// before selection prevents any importer from starting. An unrecognized
/// container fails with [`ImportError::UnsupportedFormat`] before any
/// import work is done.
pub struct RawFileImportMethod {
    path: PathBuf,
    store: Arc<DataPointStore>,
    cancel: CancelToken,
    parser: Option<SelectedImporter>,
    result: Option<RawDataFile>,
}

impl RawFileImportMethod {
    pub fn new<P: Into<PathBuf>>(path: P, store: Arc<DataPointStore>) -> Self {
        Self {
            path: path.into(),
            store,
            cancel: CancelToken::new(),
            parser: None,
            result: None,
        }
    }

    /// Transfer ownership of the imported file out of the method.
    pub fn take_result(&mut self) -> Option<RawDataFile> {
        self.result.take()
    }

    fn open_reader(&self, gzipped: bool) -> Result<Box<dyn BufRead>, ImportError> {
        let handle = fs::File::open(&self.path)?;
        let reader: Box<dyn BufRead> = if gzipped {
            Box::new(BufReader::new(GzDecoder::new(BufReader::new(handle))))
        } else {
            Box::new(BufReader::new(handle))
        };
        Ok(reader)
    }

    fn select_importer(&mut self) -> Result<&mut SelectedImporter, ImportError> {
        let (format, gzipped) = infer_format(&self.path)?;
        let importer = match format {
            FileFormat::MzML => SelectedImporter::MzML(
                ImportMethod::new(
                    MzMLRecordSource::new(self.open_reader(gzipped)?),
                    self.path.clone(),
                    format,
                    self.store.clone(),
                )
                .with_cancel_token(self.cancel.clone()),
            ),
            FileFormat::MzXML => SelectedImporter::MzXML(
                ImportMethod::new(
                    MzXmlRecordSource::new(self.open_reader(gzipped)?),
                    self.path.clone(),
                    format,
                    self.store.clone(),
                )
                .with_cancel_token(self.cancel.clone()),
            ),
            FileFormat::Unknown => {
                return Err(ImportError::UnsupportedFormat {
                    path: self.path.clone(),
                })
            }
        };
        Ok(self.parser.insert(importer))
    }
}

impl Method for RawFileImportMethod {
    type Output = RawDataFile;
    type Error = ImportError;

    fn execute(&mut self) -> Result<Option<&RawDataFile>, ImportError> {
        if self.cancel.is_canceled() {
            return Ok(None);
        }
        let canceled = self.cancel.clone();
        let parser = self.select_importer()?;
        // Cancellation during type detection must keep the importer from
        // ever starting
        if canceled.is_canceled() {
            return Ok(None);
        }
        if parser.execute()? {
            self.result = self.parser.as_mut().and_then(SelectedImporter::take_result);
            Ok(self.result.as_ref())
        } else {
            Ok(None)
        }
    }

    fn progress(&self) -> Option<f32> {
        self.parser.as_ref().and_then(SelectedImporter::progress)
    }

    fn result(&self) -> Option<&RawDataFile> {
        self.result.as_ref()
    }

    fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::VecDeque;

    struct StubSource {
        count: Option<u64>,
        records: VecDeque<SpectrumRecord>,
    }

    impl StubSource {
        fn new(records: Vec<SpectrumRecord>) -> Self {
            Self {
                count: Some(records.len() as u64),
                records: records.into(),
            }
        }
    }

    impl RecordSource for StubSource {
        fn record_count(&mut self) -> Result<Option<u64>, ImportError> {
            Ok(self.count)
        }

        fn next_record(&mut self) -> Result<Option<SpectrumRecord>, ImportError> {
            Ok(self.records.pop_front())
        }
    }

    fn record(id: &str, ms_level: u8, mzs: Vec<f64>, intensities: Vec<f32>) -> SpectrumRecord {
        SpectrumRecord {
            id: id.into(),
            ms_level: Some(ms_level),
            points: SpectrumDataPoints::from_buffers(mzs, intensities),
            ..Default::default()
        }
    }

    #[test]
    fn records_normalize_in_source_order() {
        let store = Arc::new(DataPointStore::new());
        let source = StubSource::new(vec![
            record("scan=1", 1, vec![100.0, 200.0, 300.0], vec![1.0, 5.0, 2.0]),
            record("scan=2", 2, vec![150.0, 151.0], vec![3.0, 4.0]),
        ]);
        let mut method = ImportMethod::new(
            source,
            PathBuf::from("stub.mzML"),
            FileFormat::MzML,
            store.clone(),
        );
        assert_eq!(method.progress(), None);

        method.execute().unwrap().expect("not canceled");
        assert_eq!(method.progress(), Some(1.0));
        let raw_file = method.take_result().expect("result is set on success");
        assert_eq!(raw_file.scans.len(), 2);
        assert_eq!(raw_file.scans[0].id, "scan=1");
        assert_eq!(raw_file.scans[0].tic, 8.0);
        assert_eq!(raw_file.scans[0].mz_range, Some((100.0, 300.0)));
        assert_eq!(
            raw_file.scans[0].spectrum_type,
            Some(SpectrumType::Centroided)
        );
        assert_eq!(raw_file.scans[1].function, MsFunction::ms(2));
        assert_eq!(raw_file.functions.len(), 2);

        // Buffers went through the store, one handle per scan
        assert_eq!(store.len().unwrap(), 2);
        let mut points = SpectrumDataPoints::new();
        raw_file.scans[1]
            .data_points(&store, &mut points)
            .unwrap();
        assert_eq!(points.mzs(), &[150.0, 151.0]);
    }

    #[test]
    fn cancellation_yields_no_result() {
        let store = Arc::new(DataPointStore::new());
        let source = StubSource::new(vec![record("scan=1", 1, vec![100.0], vec![1.0])]);
        let mut method = ImportMethod::new(
            source,
            PathBuf::from("stub.mzML"),
            FileFormat::MzML,
            store.clone(),
        );
        method.cancel();

        assert!(method.execute().unwrap().is_none());
        assert!(method.result().is_none());
        assert!(store.is_empty().unwrap());
    }

    #[test_log::test]
    fn dispatcher_imports_mzxml_from_disk() {
        let mut file = tempfile::Builder::new()
            .suffix(".mzXML")
            .tempfile()
            .unwrap();
        std::io::Write::write_all(
            &mut file,
            crate::io::mzxml::test::document().as_bytes(),
        )
        .unwrap();

        let store = Arc::new(DataPointStore::new());
        let mut method = RawFileImportMethod::new(file.path(), store.clone());
        assert_eq!(method.progress(), None);

        let raw_file = method.execute().unwrap().expect("not canceled");
        assert_eq!(raw_file.format, FileFormat::MzXML);
        assert_eq!(raw_file.scans.len(), 2);
        assert_eq!(raw_file.scans[0].scan_number, Some(1));
        assert_eq!(raw_file.scans[1].function, MsFunction::ms(2));
        assert_eq!(method.progress(), Some(1.0));
        assert_eq!(store.len().unwrap(), 2);

        let owned = method.take_result().expect("result still held");
        assert_eq!(owned.scans.len(), 2);
        assert!(method.result().is_none());
    }

    #[test_log::test]
    fn dispatcher_handles_gzipped_mzml() {
        use flate2::{write::GzEncoder, Compression};
        use std::io::Write;

        let mut file = tempfile::Builder::new()
            .suffix(".mzML.gz")
            .tempfile()
            .unwrap();
        let mut encoder = GzEncoder::new(&mut file, Compression::default());
        encoder
            .write_all(crate::io::mzml::test::document().as_bytes())
            .unwrap();
        encoder.finish().unwrap();

        let store = Arc::new(DataPointStore::new());
        let mut method = RawFileImportMethod::new(file.path(), store);
        let raw_file = method.execute().unwrap().expect("not canceled");
        assert_eq!(raw_file.format, FileFormat::MzML);
        assert_eq!(raw_file.scans.len(), 2);
        assert_eq!(raw_file.scans[1].isolations.len(), 1);
    }

    #[test]
    fn dispatcher_rejects_unrecognized_containers() {
        let mut file = tempfile::Builder::new().suffix(".xyz").tempfile().unwrap();
        std::io::Write::write_all(&mut file, b"not a mass spectrometry file").unwrap();

        let store = Arc::new(DataPointStore::new());
        let mut method = RawFileImportMethod::new(file.path(), store);
        match method.execute() {
            Err(ImportError::UnsupportedFormat { path }) => assert_eq!(path, file.path()),
            other => panic!("expected unsupported format, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn dispatcher_cancel_before_execute_starts_nothing() {
        let store = Arc::new(DataPointStore::new());
        let mut method = RawFileImportMethod::new("never-opened.mzML", store.clone());
        method.cancel();

        assert!(method.execute().unwrap().is_none());
        assert_eq!(method.progress(), None);
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn source_failures_are_wrapped_with_the_path() {
        struct FailingSource;
        impl RecordSource for FailingSource {
            fn record_count(&mut self) -> Result<Option<u64>, ImportError> {
                Ok(None)
            }
            fn next_record(&mut self) -> Result<Option<SpectrumRecord>, ImportError> {
                Err(ImportError::MalformedRecord("truncated peaks".into()))
            }
        }

        let store = Arc::new(DataPointStore::new());
        let mut method = ImportMethod::new(
            FailingSource,
            PathBuf::from("broken.mzXML"),
            FileFormat::MzXML,
            store,
        );
        match method.execute() {
            Err(ImportError::ImportFailure { path, source }) => {
                assert_eq!(path, PathBuf::from("broken.mzXML"));
                assert!(matches!(*source, ImportError::MalformedRecord(_)));
            }
            other => panic!("expected wrapped failure, got {:?}", other.map(|_| ())),
        }
    }
}
