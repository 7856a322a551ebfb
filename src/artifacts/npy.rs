//! Minimal NumPy `.npy` support for 1-D float and unicode arrays.
//!
//! Files are written in format version 1.0 so `numpy.load` reads them
//! directly. Readers accept versions 1 through 3 and any shape whose
//! elements are stored contiguously.

use std::io::{self, Write};

const MAGIC: &[u8] = b"\x93NUMPY";
const ALIGNMENT: usize = 64;
const F64_DESCR: &str = "<f8";

fn invalid(message: impl Into<String>) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message.into())
}

fn write_header<W: Write>(out: &mut W, descr: &str, len: usize) -> io::Result<()> {
    let mut header = format!(
        "{{'descr': '{}', 'fortran_order': False, 'shape': ({},), }}",
        descr, len
    );
    // magic + version + u16 length + header + newline
    let unpadded = MAGIC.len() + 2 + 2 + header.len() + 1;
    let padding = (ALIGNMENT - unpadded % ALIGNMENT) % ALIGNMENT;
    header.extend(std::iter::repeat(' ').take(padding));
    header.push('\n');

    let header_len = u16::try_from(header.len()).map_err(|_| invalid("npy header too long"))?;
    out.write_all(MAGIC)?;
    out.write_all(&[1, 0])?;
    out.write_all(&header_len.to_le_bytes())?;
    out.write_all(header.as_bytes())
}

/// Write a 1-D little-endian `float64` array
pub fn write_f64_array<W: Write>(out: &mut W, values: &[f64]) -> io::Result<()> {
    write_header(out, F64_DESCR, values.len())?;
    for value in values {
        out.write_all(&value.to_le_bytes())?;
    }
    Ok(())
}

/// Write a 1-D fixed-width unicode array (`<U{n}`, UTF-32LE)
pub fn write_str_array<W: Write, S: AsRef<str>>(out: &mut W, values: &[S]) -> io::Result<()> {
    let width = values
        .iter()
        .map(|v| v.as_ref().chars().count())
        .max()
        .unwrap_or(0)
        .max(1);

    write_header(out, &format!("<U{}", width), values.len())?;
    for value in values {
        let mut written = 0;
        for c in value.as_ref().chars() {
            out.write_all(&(c as u32).to_le_bytes())?;
            written += 1;
        }
        for _ in written..width {
            out.write_all(&[0; 4])?;
        }
    }
    Ok(())
}

#[derive(Debug, PartialEq)]
struct Header {
    descr: String,
    count: usize,
}

fn dict_value<'a>(dict: &'a str, key: &str) -> io::Result<&'a str> {
    let needle = format!("'{}':", key);
    let start = dict
        .find(&needle)
        .map(|i| i + needle.len())
        .ok_or_else(|| invalid(format!("npy header has no '{}'", key)))?;
    Ok(dict[start..].trim_start())
}

fn parse_header(bytes: &[u8]) -> io::Result<(Header, &[u8])> {
    if bytes.len() < 10 || &bytes[..MAGIC.len()] != MAGIC {
        return Err(invalid("not an npy file"));
    }

    let (header_len, header_start) = match bytes[6] {
        1 => (u16::from_le_bytes([bytes[8], bytes[9]]) as usize, 10),
        2 | 3 if bytes.len() >= 12 => (
            u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]) as usize,
            12,
        ),
        version => return Err(invalid(format!("unsupported npy version {}", version))),
    };

    let data_start = header_start + header_len;
    if bytes.len() < data_start {
        return Err(invalid("truncated npy header"));
    }
    let dict = std::str::from_utf8(&bytes[header_start..data_start])
        .map_err(|_| invalid("npy header is not text"))?;

    let descr = dict_value(dict, "descr")?
        .strip_prefix('\'')
        .and_then(|rest| rest.split('\'').next())
        .ok_or_else(|| invalid("malformed npy descr"))?
        .to_string();

    let shape = dict_value(dict, "shape")?
        .strip_prefix('(')
        .and_then(|rest| rest.split(')').next())
        .ok_or_else(|| invalid("malformed npy shape"))?;
    let mut count = 1usize;
    for dim in shape.split(',').map(str::trim).filter(|d| !d.is_empty()) {
        let dim: usize = dim
            .parse()
            .map_err(|_| invalid(format!("bad npy dimension '{}'", dim)))?;
        count = count
            .checked_mul(dim)
            .ok_or_else(|| invalid("npy shape overflows"))?;
    }

    Ok((Header { descr, count }, &bytes[data_start..]))
}

/// Read a `<f8` array, flattening any shape
pub fn read_f64_array(bytes: &[u8]) -> io::Result<Vec<f64>> {
    let (header, data) = parse_header(bytes)?;
    if header.descr != F64_DESCR {
        return Err(invalid(format!("expected <f8 data, found {}", header.descr)));
    }
    if data.len() < header.count * 8 {
        return Err(invalid("truncated npy data"));
    }

    Ok(data
        .chunks_exact(8)
        .take(header.count)
        .map(|chunk| {
            let mut raw = [0u8; 8];
            raw.copy_from_slice(chunk);
            f64::from_le_bytes(raw)
        })
        .collect())
}

/// Read a `<U{n}` array, dropping the zero padding of each element
pub fn read_str_array(bytes: &[u8]) -> io::Result<Vec<String>> {
    let (header, data) = parse_header(bytes)?;
    let width: usize = header
        .descr
        .strip_prefix("<U")
        .and_then(|w| w.parse().ok())
        .ok_or_else(|| invalid(format!("expected <U data, found {}", header.descr)))?;
    let stride = width * 4;
    if data.len() < header.count * stride {
        return Err(invalid("truncated npy data"));
    }

    let mut values = Vec::with_capacity(header.count);
    for element in data.chunks_exact(stride.max(4)).take(header.count) {
        let mut value = String::with_capacity(width);
        for unit in element.chunks_exact(4) {
            let code = u32::from_le_bytes([unit[0], unit[1], unit[2], unit[3]]);
            if code == 0 {
                break;
            }
            value.push(char::from_u32(code).ok_or_else(|| invalid("invalid code point"))?);
        }
        values.push(value);
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_f64_layout() {
        let mut buf = Vec::new();
        write_f64_array(&mut buf, &[0.0, 0.5, 1.0]).unwrap();

        assert_eq!(&buf[..6], MAGIC);
        assert_eq!(&buf[6..8], &[1, 0]);
        let header_len = u16::from_le_bytes([buf[8], buf[9]]) as usize;
        assert_eq!((10 + header_len) % ALIGNMENT, 0);
        assert_eq!(buf[10 + header_len - 1], b'\n');

        let header = std::str::from_utf8(&buf[10..10 + header_len]).unwrap();
        assert!(header.starts_with("{'descr': '<f8', 'fortran_order': False, 'shape': (3,), }"));
        assert_eq!(buf.len(), 10 + header_len + 24);

        assert_eq!(read_f64_array(&buf).unwrap(), vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_str_layout() {
        let mut buf = Vec::new();
        write_str_array(&mut buf, &["C4", "C4.E4.G4;1.0", "F#5"]).unwrap();

        let header_len = u16::from_le_bytes([buf[8], buf[9]]) as usize;
        let header = std::str::from_utf8(&buf[10..10 + header_len]).unwrap();
        assert!(header.contains("'descr': '<U12'"));
        assert_eq!(buf.len(), 10 + header_len + 3 * 12 * 4);

        assert_eq!(
            read_str_array(&buf).unwrap(),
            vec!["C4", "C4.E4.G4;1.0", "F#5"]
        );
    }

    #[test]
    fn test_empty_arrays() {
        let mut buf = Vec::new();
        write_f64_array(&mut buf, &[]).unwrap();
        assert!(read_f64_array(&buf).unwrap().is_empty());

        let mut buf = Vec::new();
        write_str_array::<_, &str>(&mut buf, &[]).unwrap();
        assert!(read_str_array(&buf).unwrap().is_empty());
    }

    #[test]
    fn test_reads_column_vectors() {
        let header = "{'descr': '<f8', 'fortran_order': False, 'shape': (2, 1), }";
        let mut buf = Vec::new();
        buf.extend_from_slice(MAGIC);
        buf.extend_from_slice(&[1, 0]);
        buf.extend_from_slice(&(header.len() as u16).to_le_bytes());
        buf.extend_from_slice(header.as_bytes());
        buf.extend_from_slice(&0.25f64.to_le_bytes());
        buf.extend_from_slice(&0.75f64.to_le_bytes());

        assert_eq!(read_f64_array(&buf).unwrap(), vec![0.25, 0.75]);
    }

    proptest! {
        #[test]
        fn prop_str_array_reads_back(values in prop::collection::vec("\\PC{0,24}", 0..16)) {
            let mut buf = Vec::new();
            write_str_array(&mut buf, &values).unwrap();
            prop_assert_eq!(read_str_array(&buf).unwrap(), values);
        }

        #[test]
        fn prop_f64_array_reads_back(values in prop::collection::vec(-1.0e6f64..1.0e6, 0..64)) {
            let mut buf = Vec::new();
            write_f64_array(&mut buf, &values).unwrap();
            prop_assert_eq!(read_f64_array(&buf).unwrap(), values);
        }
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(read_f64_array(b"nope").is_err());

        let mut buf = Vec::new();
        write_str_array(&mut buf, &["C4"]).unwrap();
        assert!(read_f64_array(&buf).is_err());

        let mut buf = Vec::new();
        write_f64_array(&mut buf, &[1.0, 2.0]).unwrap();
        buf.truncate(buf.len() - 4);
        assert!(read_f64_array(&buf).is_err());
    }
}
