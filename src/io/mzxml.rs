//! A streaming record source for the mzXML container format.
//!
//! Reads `<scan>` elements in document order, including the nested layout
//! where fragmentation scans sit inside their parent scan, and decodes the
//! `<peaks>` payload of network-order interleaved (m/z, intensity) pairs.

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

/// Parse an ISO-8601 duration of the restricted shape mzXML uses
/// (`PT(nH)(nM)(nS)`) into seconds.
fn parse_retention_time(text: &str) -> Option<f32> {
    let rest = text.strip_prefix("PT").or_else(|| text.strip_prefix("pt"))?;
    let mut seconds = 0.0f32;
    let mut number = String::new();
    for ch in rest.chars() {
        match ch {
            '0'..='9' | '.' | '+' | '-' | 'e' | 'E' => number.push(ch),
            'H' | 'h' => {
                seconds += number.parse::<f32>().ok()? * 3600.0;
                number.clear();
            }
            'M' | 'm' => {
                seconds += number.parse::<f32>().ok()? * 60.0;
                number.clear();
            }
            'S' | 's' => {
                seconds += number.parse::<f32>().ok()?;
                number.clear();
            }
            _ => return None,
        }
    }
    if number.is_empty() {
        Some(seconds)
    } else {
        None
    }
}

fn parse_scan_type(text: &str) -> MsScanType {
    match text.to_ascii_lowercase().as_str() {
        "full" => MsScanType::Full,
        "zoom" => MsScanType::Zoom,
        "sim" => MsScanType::Sim,
        "srm" | "mrm" => MsScanType::Mrm,
        "crm" => MsScanType::Crm,
        _ => MsScanType::Unknown,
    }
}

fn parse_activation_type(text: &str) -> ActivationType {
    match text.to_ascii_uppercase().as_str() {
        "CID" => ActivationType::Cid,
        "HCD" => ActivationType::Hcd,
        "ETD" => ActivationType::Etd,
        "ECD" => ActivationType::Ecd,
        _ => ActivationType::Unknown,
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

/// The `<peaks>` element being accumulated for the open scan.
#[derive(Debug, Default)]
struct PendingPeaks {
    precision: Precision,
    byte_order: ByteOrder,
    zlib: bool,
    collecting: bool,
    text: String,
}

#[derive(Debug, Default)]
struct PendingPrecursor {
    charge: Option<i32>,
    activation: Option<ActivationType>,
    collecting: bool,
    text: String,
}

/// One `<scan>` element in flight.
#[derive(Debug, Default)]
struct PendingScan {
    num: Option<u32>,
    ms_level: Option<u8>,
    peaks_count: Option<usize>,
    polarity: Polarity,
    scan_type: MsScanType,
    retention_time: Option<f32>,
    centroided: Option<bool>,
    precursor: Option<PendingPrecursor>,
    peaks: PendingPeaks,
}

impl PendingScan {
    fn from_attributes(event: &BytesStart) -> Result<Self, ImportError> {
        let mut scan = PendingScan::default();
        for_each_attribute(event, |key, value| match key {
            b"num" => scan.num = value.parse().ok(),
            b"msLevel" => scan.ms_level = value.parse().ok(),
            b"peaksCount" => scan.peaks_count = value.parse().ok(),
            b"polarity" => {
                scan.polarity = match value {
                    "+" => Polarity::Positive,
                    "-" => Polarity::Negative,
                    _ => Polarity::Unknown,
                }
            }
            b"scanType" => scan.scan_type = parse_scan_type(value),
            b"retentionTime" => scan.retention_time = parse_retention_time(value),
            b"centroided" => scan.centroided = Some(value == "1" || value == "true"),
            _ => {}
        })?;
        Ok(scan)
    }

    fn finish(self) -> Result<SpectrumRecord, ImportError> {
        let values = decode_payload_f64(
            &self.peaks.text,
            self.peaks.precision,
            self.peaks.byte_order,
            self.peaks.zlib,
        )?;
        if values.len() % 2 != 0 {
            return Err(ImportError::MalformedRecord(
                "peaks payload does not pair up into (m/z, intensity) values".into(),
            ));
        }
        let mut points = SpectrumDataPoints::with_capacity(values.len() / 2);
        for pair in values.chunks_exact(2) {
            points.add(pair[0], pair[1] as f32);
        }
        if let Some(declared) = self.peaks_count {
            if declared != points.len() {
                return Err(ImportError::MalformedRecord(format!(
                    "scan {} declares {} peaks but its payload holds {}",
                    self.num.unwrap_or_default(),
                    declared,
                    points.len()
                )));
            }
        }

        let isolations = match self.precursor {
            Some(precursor) => {
                let precursor_mz: f64 = precursor.text.trim().parse().map_err(|_| {
                    ImportError::MalformedRecord("unreadable precursorMz value".into())
                })?;
                vec![IsolationInfo {
                    mz_range: (precursor_mz, precursor_mz),
                    precursor_mz: Some(precursor_mz),
                    precursor_charge: precursor.charge,
                    activation: precursor.activation.map(|activation_type| ActivationInfo {
                        activation_type,
                        energy: None,
                    }),
                }]
            }
            None => Vec::new(),
        };

        Ok(SpectrumRecord {
            id: self.num.map(|num| num.to_string()).unwrap_or_default(),
            scan_number: self.num,
            ms_level: self.ms_level,
            function_name: None,
            polarity: self.polarity,
            scan_type: self.scan_type,
            retention_time: self.retention_time,
            declared_type: self.centroided.map(|centroided| {
                if centroided {
                    SpectrumType::Centroided
                } else {
                    SpectrumType::Profile
                }
            }),
            source_fragmentation: None,
            isolations,
            points,
        })
    }
}

/// Streams `<scan>` records out of an mzXML document.
pub struct MzXmlRecordSource<R: BufRead> {
    reader: Reader<R>,
    buffer: Vec<u8>,
    record_count: Option<u64>,
    started: bool,
    done: bool,
    pending: Option<PendingScan>,
}

impl<R: BufRead> MzXmlRecordSource<R> {
    pub fn new(handle: R) -> Self {
        Self {
            reader: Reader::from_reader(handle),
            buffer: Vec::with_capacity(8192),
            record_count: None,
            started: false,
            done: false,
            pending: None,
        }
    }

    /// Read forward until `<msRun>` so the declared scan count is known
    /// before any record is pulled.
    fn scan_to_run(&mut self) -> Result<(), ImportError> {
        while !self.started && !self.done {
            self.buffer.clear();
            match self.reader.read_event_into(&mut self.buffer)? {
                Event::Start(ref event) | Event::Empty(ref event) => {
                    if event.name().as_ref() == b"msRun" {
                        let mut count = None;
                        for_each_attribute(event, |key, value| {
                            if key == b"scanCount" {
                                count = value.parse().ok();
                            }
                        })?;
                        self.record_count = count;
                        self.started = true;
                    }
                }
                Event::Eof => self.done = true,
                _ => {}
            }
        }
        Ok(())
    }
}

impl<R: BufRead> RecordSource for MzXmlRecordSource<R> {
    fn record_count(&mut self) -> Result<Option<u64>, ImportError> {
        self.scan_to_run()?;
        Ok(self.record_count)
    }

    fn next_record(&mut self) -> Result<Option<SpectrumRecord>, ImportError> {
        self.scan_to_run()?;
        if self.done {
            return Ok(None);
        }
        loop {
            self.buffer.clear();
            match self.reader.read_event_into(&mut self.buffer)? {
                Event::Start(ref event) | Event::Empty(ref event) => {
                    match event.name().as_ref() {
                        b"scan" => {
                            let fresh = PendingScan::from_attributes(event)?;
                            // A nested fragmentation scan opens before its
                            // parent closes; the parent's own content is
                            // already complete, emit it in document order
                            if let Some(parent) = self.pending.replace(fresh) {
                                return Ok(Some(parent.finish()?));
                            }
                        }
                        b"peaks" => {
                            if let Some(pending) = self.pending.as_mut() {
                                let mut precision = Precision::Bits32;
                                // mzXML peak data defaults to network order
                                let mut byte_order = ByteOrder::BigEndian;
                                let mut zlib = false;
                                for_each_attribute(event, |key, value| match key {
                                    b"precision" => {
                                        if value == "64" {
                                            precision = Precision::Bits64;
                                        }
                                    }
                                    b"byteOrder" => {
                                        if value != "network" {
                                            byte_order = ByteOrder::LittleEndian;
                                        }
                                    }
                                    b"compressionType" => zlib = value == "zlib",
                                    _ => {}
                                })?;
                                pending.peaks = PendingPeaks {
                                    precision,
                                    byte_order,
                                    zlib,
                                    collecting: true,
                                    text: String::new(),
                                };
                            }
                        }
                        b"precursorMz" => {
                            if let Some(pending) = self.pending.as_mut() {
                                let mut precursor = PendingPrecursor {
                                    collecting: true,
                                    ..Default::default()
                                };
                                for_each_attribute(event, |key, value| match key {
                                    b"precursorCharge" => precursor.charge = value.parse().ok(),
                                    b"activationMethod" => {
                                        precursor.activation = Some(parse_activation_type(value))
                                    }
                                    _ => {}
                                })?;
                                pending.precursor = Some(precursor);
                            }
                        }
                        _ => {}
                    }
                }
                Event::Text(ref event) => {
                    if let Some(pending) = self.pending.as_mut() {
                        if pending.peaks.collecting {
                            pending.peaks.text.push_str(&event.unescape()?);
                        } else if let Some(precursor) = pending
                            .precursor
                            .as_mut()
                            .filter(|precursor| precursor.collecting)
                        {
                            precursor.text.push_str(&event.unescape()?);
                        }
                    }
                }
                Event::End(ref event) => match event.name().as_ref() {
                    b"peaks" => {
                        if let Some(pending) = self.pending.as_mut() {
                            pending.peaks.collecting = false;
                        }
                    }
                    b"precursorMz" => {
                        if let Some(precursor) =
                            self.pending.as_mut().and_then(|p| p.precursor.as_mut())
                        {
                            precursor.collecting = false;
                        }
                    }
                    b"scan" => {
                        // The innermost open scan closes here; outer scans
                        // were already emitted when their children opened
                        if let Some(pending) = self.pending.take() {
                            return Ok(Some(pending.finish()?));
                        }
                    }
                    b"msRun" => {
                        self.done = true;
                        return match self.pending.take() {
                            Some(pending) => Ok(Some(pending.finish()?)),
                            None => Ok(None),
                        };
                    }
                    _ => {}
                },
                Event::Eof => {
                    self.done = true;
                    return match self.pending.take() {
                        Some(pending) => Ok(Some(pending.finish()?)),
                        None => Ok(None),
                    };
                }
                _ => {}
            }
        }
    }
}
