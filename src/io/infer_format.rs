//! Detection of the container format of a raw data file, from the file name
//! and from the leading bytes of its content, with transparent handling of
//! GZIP-compressed files.

use std::{
    fmt::Display,
    fs,
    io::{self, prelude::*, BufReader},
    path,
};

use flate2::bufread::GzDecoder;

/// Raw data container formats the import pipeline can dispatch on.
///
/// The set is closed: supporting a new format means adding a variant here
/// and a constructor arm in the dispatcher, not editing a conditional chain.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FileFormat {
    MzML,
    MzXML,
    #[default]
    Unknown,
}

impl Display for FileFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

pub fn is_gzipped(header: &[u8]) -> bool {
    header.starts_with(b"\x1f\x8b")
}

fn is_gzipped_extension(path: path::PathBuf) -> (bool, path::PathBuf) {
    if let Some(ext) = path.extension() {
        if ext.to_ascii_lowercase() == "gz" {
            (true, path.with_extension(""))
        } else {
            (false, path)
        }
    } else {
        (false, path)
    }
}

/// Given a path, infer the file format and whether the file at that path is
/// GZIP compressed, from the name alone.
pub fn infer_from_path<P: Into<path::PathBuf>>(path: P) -> (FileFormat, bool) {
    let (is_gzipped, path) = is_gzipped_extension(path.into());
    let format = path
        .extension()
        .and_then(|ext| ext.to_ascii_lowercase().into_string().ok())
        .map(|ext| match ext.as_str() {
            "mzml" => FileFormat::MzML,
            "mzxml" => FileFormat::MzXML,
            _ => FileFormat::Unknown,
        })
        .unwrap_or(FileFormat::Unknown);
    (format, is_gzipped)
}

fn contains(buffer: &[u8], tag: &[u8]) -> bool {
    buffer.windows(tag.len()).any(|window| window == tag)
}

fn format_from_buffer(buffer: &[u8]) -> FileFormat {
    // Look for a recognizable opening tag anywhere in the XML head, after
    // declarations and whitespace
    if contains(buffer, b"<mzML") || contains(buffer, b"<indexedmzML") {
        FileFormat::MzML
    } else if contains(buffer, b"<mzXML") {
        FileFormat::MzXML
    } else {
        FileFormat::Unknown
    }
}

/// Given a stream of bytes, infer the file format and whether the stream is
/// GZIP compressed. This assumes the stream is seekable; its position is
/// restored before returning.
pub fn infer_from_stream<R: Read + Seek>(stream: &mut R) -> io::Result<(FileFormat, bool)> {
    // Enough bytes to span the XML declaration plus the root opening tag
    let mut buffer = vec![0u8; 500];
    let start = stream.stream_position()?;
    let bytes_read = stream.read(&mut buffer)?;
    buffer.truncate(bytes_read);
    stream.seek(io::SeekFrom::Start(start))?;

    let gzipped = is_gzipped(&buffer);
    if gzipped {
        let mut decompressed = Vec::with_capacity(bytes_read);
        // The header window rarely decompresses to a full segment, so a
        // short or errored read still leaves enough to sniff
        let mut decoder = GzDecoder::new(io::Cursor::new(&buffer));
        decompressed.resize(bytes_read, 0);
        let decoded = decoder.read(&mut decompressed).unwrap_or(0);
        decompressed.truncate(decoded);
        buffer = decompressed;
    }

    Ok((format_from_buffer(&buffer), gzipped))
}

/// Infer the format from the file name, falling back to opening the file
/// and sniffing its header when the name is not conclusive.
pub fn infer_format<P: Into<path::PathBuf>>(path: P) -> io::Result<(FileFormat, bool)> {
    let path: path::PathBuf = path.into();
    match infer_from_path(&path) {
        (FileFormat::Unknown, _) => {
            let handle = fs::File::open(&path)?;
            let mut stream = BufReader::new(handle);
            infer_from_stream(&mut stream)
        }
        found => Ok(found),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use flate2::{write::GzEncoder, Compression};
    use std::io::{Cursor, Write};

    #[test]
    fn extension_inference() {
        assert_eq!(infer_from_path("run.mzML"), (FileFormat::MzML, false));
        assert_eq!(infer_from_path("run.mzxml"), (FileFormat::MzXML, false));
        assert_eq!(
            infer_from_path("run.mzXML.gz"),
            (FileFormat::MzXML, true)
        );
        assert_eq!(infer_from_path("run.raw"), (FileFormat::Unknown, false));
        assert_eq!(infer_from_path("run"), (FileFormat::Unknown, false));
    }

    #[test]
    fn stream_inference() {
        let head = br#"<?xml version="1.0" encoding="utf-8"?>
<indexedmzML xmlns="http://psi.hupo.org/ms/mzml">"#;
        let mut stream = Cursor::new(head.to_vec());
        assert_eq!(
            infer_from_stream(&mut stream).unwrap(),
            (FileFormat::MzML, false)
        );
        // Position is restored for the reader that follows
        assert_eq!(stream.position(), 0);

        let mut stream = Cursor::new(b"<mzXML xmlns=\"...\">".to_vec());
        assert_eq!(
            infer_from_stream(&mut stream).unwrap(),
            (FileFormat::MzXML, false)
        );

        let mut stream = Cursor::new(b"BEGIN IONS\nTITLE=x".to_vec());
        assert_eq!(
            infer_from_stream(&mut stream).unwrap(),
            (FileFormat::Unknown, false)
        );
    }

    #[test]
    fn gzipped_stream_inference() {
        let mut compressor = GzEncoder::new(Vec::new(), Compression::default());
        compressor
            .write_all(b"<?xml version=\"1.0\"?>\n<mzXML xmlns=\"...\">")
            .unwrap();
        let compressed = compressor.finish().unwrap();
        let mut stream = Cursor::new(compressed);
        assert_eq!(
            infer_from_stream(&mut stream).unwrap(),
            (FileFormat::MzXML, true)
        );
    }
}
