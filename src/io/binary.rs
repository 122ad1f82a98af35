//! Decoding of the base64 peak payloads shared by the XML container
//! formats: base64 text, optional zlib compression, and a byte order that
//! differs between formats (mzML writes little-endian, mzXML "network"
//! order is big-endian).

use std::io::Read;

use flate2::read::ZlibDecoder;

use super::ImportError;

/// The width of the encoded floating point values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Precision {
    #[default]
    Bits32,
    Bits64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ByteOrder {
    #[default]
    LittleEndian,
    BigEndian,
}

pub fn decode_base64(text: &str) -> Result<Vec<u8>, ImportError> {
    Ok(base64_simd::STANDARD.decode_type::<Vec<u8>>(text.trim().as_bytes())?)
}

pub fn decompress_zlib(bytes: &[u8]) -> Result<Vec<u8>, ImportError> {
    let mut decoded = Vec::with_capacity(bytes.len() * 2);
    ZlibDecoder::new(bytes).read_to_end(&mut decoded)?;
    Ok(decoded)
}

/// Reinterpret a raw byte buffer as 64-bit floats.
pub fn decode_f64_array(bytes: &[u8], order: ByteOrder) -> Result<Vec<f64>, ImportError> {
    if bytes.len() % 8 != 0 {
        return Err(ImportError::MalformedRecord(format!(
            "{} bytes do not divide into 64-bit values",
            bytes.len()
        )));
    }
    let values = bytes
        .chunks_exact(8)
        .map(|chunk| match order {
            ByteOrder::LittleEndian => bytemuck::pod_read_unaligned::<f64>(chunk),
            ByteOrder::BigEndian => f64::from_bits(bytemuck::pod_read_unaligned::<u64>(chunk).swap_bytes()),
        })
        .collect();
    Ok(values)
}

/// Reinterpret a raw byte buffer as 32-bit floats.
pub fn decode_f32_array(bytes: &[u8], order: ByteOrder) -> Result<Vec<f32>, ImportError> {
    if bytes.len() % 4 != 0 {
        return Err(ImportError::MalformedRecord(format!(
            "{} bytes do not divide into 32-bit values",
            bytes.len()
        )));
    }
    let values = bytes
        .chunks_exact(4)
        .map(|chunk| match order {
            ByteOrder::LittleEndian => bytemuck::pod_read_unaligned::<f32>(chunk),
            ByteOrder::BigEndian => f32::from_bits(bytemuck::pod_read_unaligned::<u32>(chunk).swap_bytes()),
        })
        .collect();
    Ok(values)
}

/// Decode a complete payload: base64, then the optional zlib layer, then
/// the numeric reinterpretation, widening to `f64`.
pub fn decode_payload_f64(
    text: &str,
    precision: Precision,
    order: ByteOrder,
    zlib: bool,
) -> Result<Vec<f64>, ImportError> {
    let mut bytes = decode_base64(text)?;
    if zlib {
        bytes = decompress_zlib(&bytes)?;
    }
    match precision {
        Precision::Bits64 => decode_f64_array(&bytes, order),
        Precision::Bits32 => Ok(decode_f32_array(&bytes, order)?
            .into_iter()
            .map(f64::from)
            .collect()),
    }
}

/// Encode values the way the readers expect to find them; used to build
/// synthetic documents in tests and kept alongside the decoders so the two
/// directions stay in agreement.
#[cfg(test)]
pub fn encode_f64_array(values: &[f64], order: ByteOrder) -> Vec<u8> {
    match order {
        ByteOrder::LittleEndian => values
            .iter()
            .flat_map(|value| value.to_le_bytes())
            .collect(),
        ByteOrder::BigEndian => values
            .iter()
            .flat_map(|value| value.to_be_bytes())
            .collect(),
    }
}

#[cfg(test)]
pub fn encode_f32_array(values: &[f32], order: ByteOrder) -> Vec<u8> {
    match order {
        ByteOrder::LittleEndian => values
            .iter()
            .flat_map(|value| value.to_le_bytes())
            .collect(),
        ByteOrder::BigEndian => values
            .iter()
            .flat_map(|value| value.to_be_bytes())
            .collect(),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use flate2::{write::ZlibEncoder, Compression};
    use std::io::Write;

    #[test]
    fn byte_orders_round_trip() {
        let values = [445.34, 1024.0, 0.5];
        let little = encode_f64_array(&values, ByteOrder::LittleEndian);
        let big = encode_f64_array(&values, ByteOrder::BigEndian);
        assert_ne!(little, big);
        assert_eq!(decode_f64_array(&little, ByteOrder::LittleEndian).unwrap(), values);
        assert_eq!(decode_f64_array(&big, ByteOrder::BigEndian).unwrap(), values);
    }

    #[test]
    fn truncated_buffers_are_malformed() {
        let err = decode_f32_array(&[0, 0, 0], ByteOrder::LittleEndian).unwrap_err();
        assert!(matches!(err, ImportError::MalformedRecord(_)));
    }

    #[test]
    fn full_payload_decodes_through_zlib() {
        let values = [100.25f32, 7.5, 300.125];
        let bytes = encode_f32_array(&values, ByteOrder::BigEndian);
        let mut compressor = ZlibEncoder::new(Vec::new(), Compression::default());
        compressor.write_all(&bytes).unwrap();
        let compressed = compressor.finish().unwrap();
        let text = base64_simd::STANDARD.encode_type::<String>(&compressed);

        let decoded =
            decode_payload_f64(&text, Precision::Bits32, ByteOrder::BigEndian, true).unwrap();
        assert_eq!(decoded, vec![100.25, 7.5, 300.125]);
    }
}
