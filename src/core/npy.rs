//! Minimal NPY (format version 1.0/2.0) encoding for the arrays inside a sparse `.npz` archive.

use crate::utils::error::{EtlError, Result};
use regex::Regex;
use std::sync::LazyLock;

const MAGIC: &[u8] = b"\x93NUMPY";
const HEADER_ALIGNMENT: usize = 64;

static DESCR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"'descr':\s*'([^']+)'").expect("descr pattern is valid"));
static FORTRAN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"'fortran_order':\s*(True|False)").expect("fortran pattern is valid")
});
static SHAPE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"'shape':\s*\(([^)]*)\)").expect("shape pattern is valid"));

/// 解析後的陣列：dtype 描述、形狀與原始資料位元組
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NpyArray {
    pub descr: String,
    pub shape: Vec<usize>,
    pub payload: Vec<u8>,
}

impl NpyArray {
    pub fn len(&self) -> usize {
        self.shape.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_i64_vec(&self) -> Result<Vec<i64>> {
        let width = match self.descr.as_str() {
            "<i8" | "<u8" => 8,
            "<i4" | "<u4" => 4,
            other => {
                return Err(EtlError::matrix_format(format!(
                    "unsupported integer dtype '{}'",
                    other
                )))
            }
        };
        self.check_payload(width)?;

        let values = self.payload.chunks_exact(width).map(|chunk| match self.descr.as_str() {
            "<i8" => i64::from_le_bytes(chunk.try_into().unwrap_or([0; 8])),
            "<u8" => u64::from_le_bytes(chunk.try_into().unwrap_or([0; 8])) as i64,
            "<i4" => i32::from_le_bytes(chunk.try_into().unwrap_or([0; 4])) as i64,
            _ => u32::from_le_bytes(chunk.try_into().unwrap_or([0; 4])) as i64,
        });
        Ok(values.collect())
    }

    /// 字串純量：'<U' 為 UTF-32LE，scipy save_npz 寫出的 '|S' 為位元組；兩者尾端都補零
    pub fn to_text(&self) -> Result<String> {
        if self.descr.starts_with("|S") {
            let end = self
                .payload
                .iter()
                .position(|&b| b == 0)
                .unwrap_or(self.payload.len());
            return String::from_utf8(self.payload[..end].to_vec())
                .map_err(|_| EtlError::matrix_format("byte string array is not valid UTF-8"));
        }
        if !self.descr.starts_with("<U") {
            return Err(EtlError::matrix_format(format!(
                "expected string dtype, found '{}'",
                self.descr
            )));
        }
        if self.payload.len() % 4 != 0 {
            return Err(EtlError::matrix_format("unicode payload is not UTF-32 aligned"));
        }

        self.payload
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .take_while(|&code| code != 0)
            .map(|code| {
                char::from_u32(code)
                    .ok_or_else(|| EtlError::matrix_format("invalid code point in unicode array"))
            })
            .collect()
    }

    fn check_payload(&self, width: usize) -> Result<()> {
        let expected = self.len() * width;
        if self.payload.len() != expected {
            return Err(EtlError::matrix_format(format!(
                "payload has {} bytes, shape {:?} of width {} needs {}",
                self.payload.len(),
                self.shape,
                width,
                expected
            )));
        }
        Ok(())
    }
}

fn format_shape(shape: &[usize]) -> String {
    match shape {
        [] => "()".to_string(),
        [n] => format!("({},)", n),
        dims => format!(
            "({})",
            dims.iter()
                .map(usize::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        ),
    }
}

pub(crate) fn encode(descr: &str, shape: &[usize], payload: &[u8]) -> Vec<u8> {
    let mut header = format!(
        "{{'descr': '{}', 'fortran_order': False, 'shape': {}, }}",
        descr,
        format_shape(shape)
    );
    // magic(6) + version(2) + header_len(2) + header + '\n' 對齊 64 bytes
    let unpadded = MAGIC.len() + 4 + header.len() + 1;
    let padding = (HEADER_ALIGNMENT - unpadded % HEADER_ALIGNMENT) % HEADER_ALIGNMENT;
    header.push_str(&" ".repeat(padding));
    header.push('\n');

    let mut bytes = Vec::with_capacity(MAGIC.len() + 4 + header.len() + payload.len());
    bytes.extend_from_slice(MAGIC);
    bytes.extend_from_slice(&[1, 0]);
    bytes.extend_from_slice(&(header.len() as u16).to_le_bytes());
    bytes.extend_from_slice(header.as_bytes());
    bytes.extend_from_slice(payload);
    bytes
}

pub fn encode_i64(shape: &[usize], values: &[i64]) -> Vec<u8> {
    let payload: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
    encode("<i8", shape, &payload)
}

/// 0 維 unicode 純量，例如 scipy 的 format.npy
pub fn encode_str(value: &str) -> Vec<u8> {
    let payload: Vec<u8> = value
        .chars()
        .flat_map(|c| (c as u32).to_le_bytes())
        .collect();
    encode(&format!("<U{}", value.chars().count()), &[], &payload)
}

pub fn decode(bytes: &[u8]) -> Result<NpyArray> {
    if bytes.len() < MAGIC.len() + 4 || &bytes[..MAGIC.len()] != MAGIC {
        return Err(EtlError::matrix_format("missing NPY magic string"));
    }

    let major = bytes[MAGIC.len()];
    let (header_start, header_len) = match major {
        1 => (
            MAGIC.len() + 4,
            u16::from_le_bytes([bytes[8], bytes[9]]) as usize,
        ),
        2 | 3 => {
            if bytes.len() < MAGIC.len() + 6 {
                return Err(EtlError::matrix_format("truncated NPY header"));
            }
            (
                MAGIC.len() + 6,
                u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]) as usize,
            )
        }
        other => {
            return Err(EtlError::matrix_format(format!(
                "unsupported NPY version {}",
                other
            )))
        }
    };

    let header_end = header_start + header_len;
    let header = bytes
        .get(header_start..header_end)
        .and_then(|h| std::str::from_utf8(h).ok())
        .ok_or_else(|| EtlError::matrix_format("truncated or non-text NPY header"))?;

    let descr = DESCR_PATTERN
        .captures(header)
        .map(|c| c[1].to_string())
        .ok_or_else(|| EtlError::matrix_format("NPY header lacks 'descr'"))?;

    if let Some(caps) = FORTRAN_PATTERN.captures(header) {
        let shape_rank = SHAPE_PATTERN
            .captures(header)
            .map(|c| c[1].split(',').filter(|s| !s.trim().is_empty()).count())
            .unwrap_or(0);
        if &caps[1] == "True" && shape_rank > 1 {
            return Err(EtlError::matrix_format("fortran-ordered arrays are not supported"));
        }
    }

    let shape = SHAPE_PATTERN
        .captures(header)
        .ok_or_else(|| EtlError::matrix_format("NPY header lacks 'shape'"))?[1]
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.trim_end_matches('L')
                .parse::<usize>()
                .map_err(|_| EtlError::matrix_format(format!("bad shape entry '{}'", s)))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(NpyArray {
        descr,
        shape,
        payload: bytes[header_end..].to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_is_aligned() {
        let bytes = encode_i64(&[3], &[1, 2, 3]);
        assert_eq!(&bytes[..6], MAGIC);
        let header_len = u16::from_le_bytes([bytes[8], bytes[9]]) as usize;
        assert_eq!((10 + header_len) % 64, 0);
        assert_eq!(bytes[10 + header_len - 1], b'\n');
        assert_eq!(bytes.len(), 10 + header_len + 24);
    }

    #[test]
    fn test_decode_i64_and_shape() {
        let array = decode(&encode_i64(&[2], &[7, -1])).unwrap();
        assert_eq!(array.descr, "<i8");
        assert_eq!(array.shape, vec![2]);
        assert_eq!(array.to_i64_vec().unwrap(), vec![7, -1]);
    }

    #[test]
    fn test_decode_int32_written_by_numpy() {
        let mut payload = Vec::new();
        for v in [0i32, 3, 5] {
            payload.extend_from_slice(&v.to_le_bytes());
        }
        let bytes = encode("<i4", &[3], &payload);
        assert_eq!(decode(&bytes).unwrap().to_i64_vec().unwrap(), vec![0, 3, 5]);
    }

    #[test]
    fn test_unicode_scalar() {
        let array = decode(&encode_str("csr")).unwrap();
        assert_eq!(array.descr, "<U3");
        assert!(array.shape.is_empty());
        assert_eq!(array.to_text().unwrap(), "csr");
    }

    #[test]
    fn test_byte_string_scalar_from_scipy() {
        let array = decode(&encode("|S3", &[], b"csr")).unwrap();
        assert_eq!(array.to_text().unwrap(), "csr");

        let padded = decode(&encode("|S5", &[], b"csr\0\0")).unwrap();
        assert_eq!(padded.to_text().unwrap(), "csr");

        assert!(decode(&encode_i64(&[1], &[7])).unwrap().to_text().is_err());
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(decode(b"garbage").is_err());
        let mut bytes = encode_i64(&[2], &[1, 2]);
        bytes.truncate(bytes.len() - 3);
        assert!(decode(&bytes).unwrap().to_i64_vec().is_err());
    }
}
