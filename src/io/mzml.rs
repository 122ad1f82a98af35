//! A streaming record source for the PSI mzML container format.
//!
//! Pulls `<spectrum>` elements one at a time, interpreting the controlled
//! vocabulary parameters that carry the scan metadata and decoding the
//! base64 (optionally zlib-compressed) little-endian binary arrays.

use std::io::BufRead;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::spectrum::{
    ActivationInfo, ActivationType, IsolationInfo, MsScanType, Polarity, SpectrumDataPoints,
    SpectrumType,
};

use super::binary::{decode_payload_f64, ByteOrder, Precision};
use super::import::{RecordSource, SpectrumRecord};
use super::ImportError;

/// The controlled-vocabulary accessions the reader interprets.
mod accession {
    pub const MS_LEVEL: &str = "MS:1000511";
    pub const CENTROID_SPECTRUM: &str = "MS:1000127";
    pub const PROFILE_SPECTRUM: &str = "MS:1000128";
    pub const NEGATIVE_SCAN: &str = "MS:1000129";
    pub const POSITIVE_SCAN: &str = "MS:1000130";
    pub const SCAN_START_TIME: &str = "MS:1000016";
    pub const MS1_SPECTRUM: &str = "MS:1000579";
    pub const MSN_SPECTRUM: &str = "MS:1000580";
    pub const SIM_SPECTRUM: &str = "MS:1000582";
    pub const SRM_SPECTRUM: &str = "MS:1000583";
    pub const ISOLATION_TARGET: &str = "MS:1000827";
    pub const ISOLATION_LOWER_OFFSET: &str = "MS:1000828";
    pub const ISOLATION_UPPER_OFFSET: &str = "MS:1000829";
    pub const SELECTED_ION_MZ: &str = "MS:1000744";
    pub const CHARGE_STATE: &str = "MS:1000041";
    pub const COLLISION_ENERGY: &str = "MS:1000045";
    pub const CID: &str = "MS:1000133";
    pub const HCD: &str = "MS:1000422";
    pub const ETD: &str = "MS:1000598";
    pub const ECD: &str = "MS:1000250";
    pub const FLOAT_64: &str = "MS:1000523";
    pub const FLOAT_32: &str = "MS:1000521";
    pub const ZLIB_COMPRESSION: &str = "MS:1000574";
    pub const MZ_ARRAY: &str = "MS:1000514";
    pub const INTENSITY_ARRAY: &str = "MS:1000515";
    pub const UNIT_MINUTE: &str = "UO:0000031";
}

/// One `<cvParam>` element, reduced to the attributes the reader uses.
#[derive(Debug, Default)]
struct CvParam {
    accession: String,
    value: String,
    unit_accession: String,
}

impl CvParam {
    fn from_attributes(event: &BytesStart) -> Result<Self, ImportError> {
        let mut param = CvParam::default();
        for_each_attribute(event, |key, value| match key {
            b"accession" => param.accession = value.to_string(),
            b"value" => param.value = value.to_string(),
            b"unitAccession" => param.unit_accession = value.to_string(),
            _ => {}
        })?;
        Ok(param)
    }
}

fn for_each_attribute(
    event: &BytesStart,
    mut body: impl FnMut(&[u8], &str),
) -> Result<(), ImportError> {
    for attribute in event.attributes() {
        let attribute = attribute.map_err(quick_xml::Error::from)?;
        let value = attribute.unescape_value()?;
        body(attribute.key.as_ref(), &value);
    }
    Ok(())
}

/// The elements whose cvParams change meaning by context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Spectrum,
    ScanList,
    Scan,
    Precursor,
    IsolationWindow,
    SelectedIon,
    Activation,
    BinaryArray,
    Binary,
}

fn section_of(name: &[u8]) -> Option<Section> {
    match name {
        b"spectrum" => Some(Section::Spectrum),
        b"scanList" => Some(Section::ScanList),
        b"scan" => Some(Section::Scan),
        b"precursor" => Some(Section::Precursor),
        b"isolationWindow" => Some(Section::IsolationWindow),
        b"selectedIon" => Some(Section::SelectedIon),
        b"activation" => Some(Section::Activation),
        b"binaryDataArray" => Some(Section::BinaryArray),
        b"binary" => Some(Section::Binary),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArrayKind {
    Mz,
    Intensity,
}

/// One `<binaryDataArray>` being accumulated.
#[derive(Debug, Default)]
struct PendingArray {
    precision: Precision,
    zlib: bool,
    kind: Option<ArrayKind>,
    text: String,
}

impl PendingArray {
    fn apply(&mut self, param: &CvParam) {
        match param.accession.as_str() {
            accession::FLOAT_64 => self.precision = Precision::Bits64,
            accession::FLOAT_32 => self.precision = Precision::Bits32,
            accession::ZLIB_COMPRESSION => self.zlib = true,
            accession::MZ_ARRAY => self.kind = Some(ArrayKind::Mz),
            accession::INTENSITY_ARRAY => self.kind = Some(ArrayKind::Intensity),
            _ => {}
        }
    }
}

/// One `<precursor>` being accumulated.
#[derive(Debug, Default)]
struct PendingIsolation {
    target: Option<f64>,
    lower_offset: f64,
    upper_offset: f64,
    selected_ion_mz: Option<f64>,
    charge: Option<i32>,
    activation_type: Option<ActivationType>,
    energy: Option<f32>,
}

impl PendingIsolation {
    fn apply(&mut self, section: Section, param: &CvParam) {
        match (section, param.accession.as_str()) {
            (Section::IsolationWindow, accession::ISOLATION_TARGET) => {
                self.target = param.value.parse().ok();
            }
            (Section::IsolationWindow, accession::ISOLATION_LOWER_OFFSET) => {
                self.lower_offset = param.value.parse().unwrap_or_default();
            }
            (Section::IsolationWindow, accession::ISOLATION_UPPER_OFFSET) => {
                self.upper_offset = param.value.parse().unwrap_or_default();
            }
            (Section::SelectedIon, accession::SELECTED_ION_MZ) => {
                self.selected_ion_mz = param.value.parse().ok();
            }
            (Section::SelectedIon, accession::CHARGE_STATE) => {
                self.charge = param.value.parse().ok();
            }
            (Section::Activation, accession::CID) => {
                self.activation_type = Some(ActivationType::Cid);
            }
            (Section::Activation, accession::HCD) => {
                self.activation_type = Some(ActivationType::Hcd);
            }
            (Section::Activation, accession::ETD) => {
                self.activation_type = Some(ActivationType::Etd);
            }
            (Section::Activation, accession::ECD) => {
                self.activation_type = Some(ActivationType::Ecd);
            }
            (Section::Activation, accession::COLLISION_ENERGY) => {
                self.energy = param.value.parse().ok();
            }
            _ => {}
        }
    }

    fn finish(self) -> Option<IsolationInfo> {
        let precursor_mz = self.selected_ion_mz.or(self.target);
        let center = self.target.or(self.selected_ion_mz)?;
        Some(IsolationInfo {
            mz_range: (center - self.lower_offset, center + self.upper_offset),
            precursor_mz,
            precursor_charge: self.charge,
            activation: self.activation_type.map(|activation_type| ActivationInfo {
                activation_type,
                energy: self.energy,
            }),
        })
    }
}

/// One `<spectrum>` element in flight.
#[derive(Debug, Default)]
struct PendingSpectrum {
    id: String,
    index: Option<usize>,
    default_length: Option<usize>,
    ms_level: Option<u8>,
    polarity: Polarity,
    scan_type: MsScanType,
    declared: Option<SpectrumType>,
    retention_time: Option<f32>,
    isolation: Option<PendingIsolation>,
    isolations: Vec<IsolationInfo>,
    mzs: Option<Vec<f64>>,
    intensities: Option<Vec<f64>>,
    array: PendingArray,
}

impl PendingSpectrum {
    fn from_attributes(event: &BytesStart) -> Result<Self, ImportError> {
        let mut spectrum = PendingSpectrum::default();
        for_each_attribute(event, |key, value| match key {
            b"id" => spectrum.id = value.to_string(),
            b"index" => spectrum.index = value.parse().ok(),
            b"defaultArrayLength" => spectrum.default_length = value.parse().ok(),
            _ => {}
        })?;
        Ok(spectrum)
    }

    fn apply(&mut self, section: Section, param: &CvParam) {
        match section {
            Section::Spectrum | Section::ScanList | Section::Scan => self.apply_scan(param),
            Section::IsolationWindow | Section::SelectedIon | Section::Activation => {
                if let Some(isolation) = self.isolation.as_mut() {
                    isolation.apply(section, param);
                }
            }
            Section::BinaryArray => self.array.apply(param),
            _ => {}
        }
    }

    fn apply_scan(&mut self, param: &CvParam) {
        match param.accession.as_str() {
            accession::MS_LEVEL => self.ms_level = param.value.parse().ok(),
            accession::CENTROID_SPECTRUM => self.declared = Some(SpectrumType::Centroided),
            accession::PROFILE_SPECTRUM => self.declared = Some(SpectrumType::Profile),
            accession::POSITIVE_SCAN => self.polarity = Polarity::Positive,
            accession::NEGATIVE_SCAN => self.polarity = Polarity::Negative,
            accession::MS1_SPECTRUM | accession::MSN_SPECTRUM => self.scan_type = MsScanType::Full,
            accession::SIM_SPECTRUM => self.scan_type = MsScanType::Sim,
            accession::SRM_SPECTRUM => self.scan_type = MsScanType::Mrm,
            accession::SCAN_START_TIME => {
                self.retention_time = param.value.parse::<f32>().ok().map(|value| {
                    if param.unit_accession == accession::UNIT_MINUTE {
                        value * 60.0
                    } else {
                        value
                    }
                });
            }
            _ => {}
        }
    }

    fn close_array(&mut self) -> Result<(), ImportError> {
        let array = std::mem::take(&mut self.array);
        let Some(kind) = array.kind else {
            return Ok(());
        };
        let values = decode_payload_f64(
            &array.text,
            array.precision,
            ByteOrder::LittleEndian,
            array.zlib,
        )?;
        match kind {
            ArrayKind::Mz => self.mzs = Some(values),
            ArrayKind::Intensity => self.intensities = Some(values),
        }
        Ok(())
    }

    fn finish(self) -> Result<SpectrumRecord, ImportError> {
        let mzs = self.mzs.unwrap_or_default();
        let intensities = self.intensities.unwrap_or_default();
        if mzs.len() != intensities.len() {
            return Err(ImportError::MalformedRecord(format!(
                "spectrum '{}' holds {} m/z values but {} intensities",
                self.id,
                mzs.len(),
                intensities.len()
            )));
        }
        if let Some(declared) = self.default_length {
            if declared != mzs.len() {
                return Err(ImportError::MalformedRecord(format!(
                    "spectrum '{}' declares {} data points but its arrays hold {}",
                    self.id,
                    declared,
                    mzs.len()
                )));
            }
        }
        let mut points = SpectrumDataPoints::with_capacity(mzs.len());
        for (mz, intensity) in mzs.iter().zip(&intensities) {
            points.add(*mz, *intensity as f32);
        }
        let scan_number =
            scan_number_from_id(&self.id).or_else(|| self.index.map(|index| index as u32 + 1));
        Ok(SpectrumRecord {
            id: self.id,
            scan_number,
            ms_level: self.ms_level,
            function_name: None,
            polarity: self.polarity,
            scan_type: self.scan_type,
            retention_time: self.retention_time,
            declared_type: self.declared,
            source_fragmentation: None,
            isolations: self.isolations,
            points,
        })
    }
}

/// Extract the native scan number from ids of the common
/// `controllerType=0 controllerNumber=1 scan=42` shape.
fn scan_number_from_id(id: &str) -> Option<u32> {
    id.split_whitespace()
        .find_map(|token| token.strip_prefix("scan="))
        .and_then(|digits| digits.parse().ok())
}

/// Streams `<spectrum>` records out of an mzML document.
pub struct MzMLRecordSource<R: BufRead> {
    reader: Reader<R>,
    buffer: Vec<u8>,
    record_count: Option<u64>,
    started: bool,
    done: bool,
    pending: Option<PendingSpectrum>,
    carried: Option<PendingSpectrum>,
    sections: Vec<Section>,
}

impl<R: BufRead> MzMLRecordSource<R> {
    pub fn new(handle: R) -> Self {
        Self {
            reader: Reader::from_reader(handle),
            buffer: Vec::with_capacity(8192),
            record_count: None,
            started: false,
            done: false,
            pending: None,
            carried: None,
            sections: Vec::new(),
        }
    }

    /// Read forward until `<spectrumList>` so the declared count is known
    /// before any record is pulled. A document without a spectrum list
    /// yields its first spectrum from here instead, carried into the next
    /// [`RecordSource::next_record`] call.
    fn scan_to_list(&mut self) -> Result<(), ImportError> {
        while !self.started && !self.done {
            self.buffer.clear();
            match self.reader.read_event_into(&mut self.buffer)? {
                Event::Start(ref event) => match event.name().as_ref() {
                    b"spectrumList" => {
                        let mut count = None;
                        for_each_attribute(event, |key, value| {
                            if key == b"count" {
                                count = value.parse().ok();
                            }
                        })?;
                        self.record_count = count;
                        self.started = true;
                    }
                    b"spectrum" => {
                        self.carried = Some(PendingSpectrum::from_attributes(event)?);
                        self.started = true;
                    }
                    _ => {}
                },
                Event::Eof => self.done = true,
                _ => {}
            }
        }
        Ok(())
    }

}

impl<R: BufRead> RecordSource for MzMLRecordSource<R> {
    fn record_count(&mut self) -> Result<Option<u64>, ImportError> {
        self.scan_to_list()?;
        Ok(self.record_count)
    }

    fn next_record(&mut self) -> Result<Option<SpectrumRecord>, ImportError> {
        self.scan_to_list()?;
        if let Some(carried) = self.carried.take() {
            self.pending = Some(carried);
            self.sections = vec![Section::Spectrum];
        }
        if self.done {
            return Ok(None);
        }
        loop {
            self.buffer.clear();
            match self.reader.read_event_into(&mut self.buffer)? {
                Event::Start(ref event) => {
                    let name = event.name();
                    match name.as_ref() {
                        b"spectrum" => {
                            self.pending = Some(PendingSpectrum::from_attributes(event)?);
                            self.sections = vec![Section::Spectrum];
                        }
                        b"cvParam" => {
                            if let (Some(pending), Some(section)) =
                                (self.pending.as_mut(), self.sections.last().copied())
                            {
                                pending.apply(section, &CvParam::from_attributes(event)?);
                            }
                        }
                        _ => {
                            if let Some(section) = section_of(name.as_ref()) {
                                if let Some(pending) = self.pending.as_mut() {
                                    match section {
                                        Section::BinaryArray => {
                                            pending.array = PendingArray::default();
                                        }
                                        Section::Precursor => {
                                            pending.isolation = Some(PendingIsolation::default());
                                        }
                                        _ => {}
                                    }
                                    self.sections.push(section);
                                }
                            }
                        }
                    }
                }
                Event::Empty(ref event) => {
                    if event.name().as_ref() == b"cvParam" {
                        if let (Some(pending), Some(section)) =
                            (self.pending.as_mut(), self.sections.last().copied())
                        {
                            pending.apply(section, &CvParam::from_attributes(event)?);
                        }
                    }
                }
                Event::Text(ref event) => {
                    if self.sections.last().copied() == Some(Section::Binary) {
                        if let Some(pending) = self.pending.as_mut() {
                            pending.array.text.push_str(&event.unescape()?);
                        }
                    }
                }
                Event::End(ref event) => {
                    let name = event.name();
                    if name.as_ref() == b"spectrumList" {
                        self.done = true;
                        return Ok(None);
                    }
                    let Some(section) = section_of(name.as_ref()) else {
                        continue;
                    };
                    if self.sections.last() == Some(&section) {
                        self.sections.pop();
                    }
                    if section == Section::Spectrum {
                        self.sections.clear();
                        if let Some(pending) = self.pending.take() {
                            return Ok(Some(pending.finish()?));
                        }
                        continue;
                    }
                    let Some(pending) = self.pending.as_mut() else {
                        continue;
                    };
                    match section {
                        Section::BinaryArray => pending.close_array()?,
                        Section::Precursor => {
                            if let Some(isolation) =
                                pending.isolation.take().and_then(PendingIsolation::finish)
                            {
                                pending.isolations.push(isolation);
                            }
                        }
                        _ => {}
                    }
                }
                Event::Eof => {
                    self.done = true;
                    if self.pending.take().is_some() {
                        return Err(ImportError::MalformedRecord(
                            "document ends inside an open spectrum element".into(),
                        ));
                    }
                    return Ok(None);
                }
                _ => {}
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use crate::io::binary::{encode_f32_array, encode_f64_array};
    use flate2::{write::ZlibEncoder, Compression};
    use std::io::{Cursor, Write};

    fn payload_f64_zlib(values: &[f64]) -> String {
        let bytes = encode_f64_array(values, ByteOrder::LittleEndian);
        let mut compressor = ZlibEncoder::new(Vec::new(), Compression::default());
        compressor.write_all(&bytes).unwrap();
        let compressed = compressor.finish().unwrap();
        base64_simd::STANDARD.encode_type::<String>(&compressed)
    }

    fn payload_f32(values: &[f32]) -> String {
        let bytes = encode_f32_array(values, ByteOrder::LittleEndian);
        base64_simd::STANDARD.encode_type::<String>(&bytes)
    }

    pub(crate) fn document() -> String {
        let survey_mz = payload_f64_zlib(&[100.0, 100.1, 100.2, 100.3]);
        let survey_intensity = payload_f32(&[0.0, 12.5, 80.0, 11.0]);
        let fragment_mz = payload_f64_zlib(&[244.1, 445.3]);
        let fragment_intensity = payload_f32(&[150.0, 900.0]);
        format!(
            r#"<?xml version="1.0" encoding="utf-8"?>
<mzML xmlns="http://psi.hupo.org/ms/mzml" version="1.1.0">
  <run id="run1">
    <spectrumList count="2" defaultDataProcessingRef="dp1">
      <spectrum index="0" id="controllerType=0 controllerNumber=1 scan=1" defaultArrayLength="4">
        <cvParam cvRef="MS" accession="MS:1000579" name="MS1 spectrum" value=""/>
        <cvParam cvRef="MS" accession="MS:1000511" name="ms level" value="1"/>
        <cvParam cvRef="MS" accession="MS:1000128" name="profile spectrum" value=""/>
        <cvParam cvRef="MS" accession="MS:1000130" name="positive scan" value=""/>
        <scanList count="1">
          <scan>
            <cvParam cvRef="MS" accession="MS:1000016" name="scan start time" value="0.025" unitAccession="UO:0000031" unitName="minute"/>
          </scan>
        </scanList>
        <binaryDataArrayList count="2">
          <binaryDataArray encodedLength="0">
            <cvParam cvRef="MS" accession="MS:1000523" name="64-bit float" value=""/>
            <cvParam cvRef="MS" accession="MS:1000574" name="zlib compression" value=""/>
            <cvParam cvRef="MS" accession="MS:1000514" name="m/z array" value=""/>
            <binary>{survey_mz}</binary>
          </binaryDataArray>
          <binaryDataArray encodedLength="0">
            <cvParam cvRef="MS" accession="MS:1000521" name="32-bit float" value=""/>
            <cvParam cvRef="MS" accession="MS:1000576" name="no compression" value=""/>
            <cvParam cvRef="MS" accession="MS:1000515" name="intensity array" value=""/>
            <binary>{survey_intensity}</binary>
          </binaryDataArray>
        </binaryDataArrayList>
      </spectrum>
      <spectrum index="1" id="controllerType=0 controllerNumber=1 scan=2" defaultArrayLength="2">
        <cvParam cvRef="MS" accession="MS:1000580" name="MSn spectrum" value=""/>
        <cvParam cvRef="MS" accession="MS:1000511" name="ms level" value="2"/>
        <cvParam cvRef="MS" accession="MS:1000127" name="centroid spectrum" value=""/>
        <cvParam cvRef="MS" accession="MS:1000129" name="negative scan" value=""/>
        <scanList count="1">
          <scan>
            <cvParam cvRef="MS" accession="MS:1000016" name="scan start time" value="121" unitAccession="UO:0000010" unitName="second"/>
          </scan>
        </scanList>
        <precursorList count="1">
          <precursor>
            <isolationWindow>
              <cvParam cvRef="MS" accession="MS:1000827" name="isolation window target m/z" value="445.34"/>
              <cvParam cvRef="MS" accession="MS:1000828" name="isolation window lower offset" value="0.5"/>
              <cvParam cvRef="MS" accession="MS:1000829" name="isolation window upper offset" value="0.6"/>
            </isolationWindow>
            <selectedIonList count="1">
              <selectedIon>
                <cvParam cvRef="MS" accession="MS:1000744" name="selected ion m/z" value="445.34"/>
                <cvParam cvRef="MS" accession="MS:1000041" name="charge state" value="2"/>
              </selectedIon>
            </selectedIonList>
            <activation>
              <cvParam cvRef="MS" accession="MS:1000133" name="collision-induced dissociation" value=""/>
              <cvParam cvRef="MS" accession="MS:1000045" name="collision energy" value="35"/>
            </activation>
          </precursor>
        </precursorList>
        <binaryDataArrayList count="2">
          <binaryDataArray encodedLength="0">
            <cvParam cvRef="MS" accession="MS:1000523" name="64-bit float" value=""/>
            <cvParam cvRef="MS" accession="MS:1000574" name="zlib compression" value=""/>
            <cvParam cvRef="MS" accession="MS:1000514" name="m/z array" value=""/>
            <binary>{fragment_mz}</binary>
          </binaryDataArray>
          <binaryDataArray encodedLength="0">
            <cvParam cvRef="MS" accession="MS:1000521" name="32-bit float" value=""/>
            <cvParam cvRef="MS" accession="MS:1000515" name="intensity array" value=""/>
            <binary>{fragment_intensity}</binary>
          </binaryDataArray>
        </binaryDataArrayList>
      </spectrum>
    </spectrumList>
  </run>
</mzML>"#
        )
    }

    #[test]
    fn reads_spectra_with_cv_metadata() {
        let mut source = MzMLRecordSource::new(Cursor::new(document().into_bytes()));
        assert_eq!(source.record_count().unwrap(), Some(2));

        let survey = source.next_record().unwrap().unwrap();
        assert_eq!(survey.scan_number, Some(1));
        assert_eq!(survey.ms_level, Some(1));
        assert_eq!(survey.polarity, Polarity::Positive);
        assert_eq!(survey.scan_type, MsScanType::Full);
        assert_eq!(survey.declared_type, Some(SpectrumType::Profile));
        assert_eq!(survey.retention_time, Some(1.5));
        assert_eq!(survey.points.mzs(), &[100.0, 100.1, 100.2, 100.3]);
        assert_eq!(survey.points.intensities(), &[0.0, 12.5, 80.0, 11.0]);
        assert!(survey.isolations.is_empty());

        let fragment = source.next_record().unwrap().unwrap();
        assert_eq!(fragment.scan_number, Some(2));
        assert_eq!(fragment.ms_level, Some(2));
        assert_eq!(fragment.polarity, Polarity::Negative);
        assert_eq!(fragment.declared_type, Some(SpectrumType::Centroided));
        assert_eq!(fragment.retention_time, Some(121.0));
        assert_eq!(fragment.points.len(), 2);
        let isolation = &fragment.isolations[0];
        assert_eq!(isolation.precursor_mz, Some(445.34));
        assert_eq!(isolation.precursor_charge, Some(2));
        assert!((isolation.mz_range.0 - 444.84).abs() < 1e-9);
        assert!((isolation.mz_range.1 - 445.94).abs() < 1e-9);
        assert_eq!(
            isolation.activation,
            Some(ActivationInfo {
                activation_type: ActivationType::Cid,
                energy: Some(35.0),
            })
        );

        assert!(source.next_record().unwrap().is_none());
        assert!(source.next_record().unwrap().is_none());
    }

    #[test]
    fn array_length_mismatch_is_malformed() {
        let document = document().replace("defaultArrayLength=\"4\"", "defaultArrayLength=\"3\"");
        let mut source = MzMLRecordSource::new(Cursor::new(document.into_bytes()));
        let error = source.next_record().unwrap_err();
        assert!(matches!(error, ImportError::MalformedRecord(_)));
    }

    #[test]
    fn scan_number_parsing() {
        assert_eq!(
            scan_number_from_id("controllerType=0 controllerNumber=1 scan=42"),
            Some(42)
        );
        assert_eq!(scan_number_from_id("scan=7"), Some(7));
        assert_eq!(scan_number_from_id("sample 3"), None);
    }
}
