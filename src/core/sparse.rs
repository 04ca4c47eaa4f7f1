//! Compressed sparse row matrix of term counts, persisted as a scipy-compatible `.npz` archive.

use crate::core::npy::{self, NpyArray};
use crate::utils::error::{EtlError, Result};
use std::io::{Cursor, Read, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrMatrix {
    n_rows: usize,
    n_cols: usize,
    indptr: Vec<usize>,
    indices: Vec<usize>,
    data: Vec<i64>,
}

impl CsrMatrix {
    /// 每列為 (column, value) 並已依 column 遞增排列
    pub fn from_sorted_rows<I>(n_cols: usize, rows: I) -> Self
    where
        I: IntoIterator<Item = Vec<(usize, i64)>>,
    {
        let mut indptr = vec![0];
        let mut indices = Vec::new();
        let mut data = Vec::new();

        for row in rows {
            for (column, value) in row {
                if value != 0 {
                    indices.push(column);
                    data.push(value);
                }
            }
            indptr.push(indices.len());
        }

        Self {
            n_rows: indptr.len() - 1,
            n_cols,
            indptr,
            indices,
            data,
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.n_cols)
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    pub fn nnz(&self) -> usize {
        self.data.len()
    }

    pub fn row_nnz(&self, row: usize) -> usize {
        self.indptr[row + 1] - self.indptr[row]
    }

    /// 列中非零項 (column, value)
    pub fn row(&self, row: usize) -> impl Iterator<Item = (usize, i64)> + '_ {
        let range = self.indptr[row]..self.indptr[row + 1];
        self.indices[range.clone()]
            .iter()
            .copied()
            .zip(self.data[range].iter().copied())
    }

    pub fn get(&self, row: usize, column: usize) -> i64 {
        self.row(row)
            .find(|(c, _)| *c == column)
            .map(|(_, v)| v)
            .unwrap_or(0)
    }

    /// 寫成 scipy.sparse.save_npz 相容的壓縮檔
    pub fn to_npz_bytes(&self) -> Result<Vec<u8>> {
        let as_i64 = |values: &[usize]| -> Result<Vec<i64>> {
            values
                .iter()
                .map(|&v| {
                    i64::try_from(v).map_err(|_| EtlError::matrix_format("index exceeds i64 range"))
                })
                .collect()
        };

        let entries: [(&str, Vec<u8>); 5] = [
            ("indices.npy", npy::encode_i64(&[self.indices.len()], &as_i64(&self.indices)?)),
            ("indptr.npy", npy::encode_i64(&[self.indptr.len()], &as_i64(&self.indptr)?)),
            ("format.npy", npy::encode_str("csr")),
            (
                "shape.npy",
                npy::encode_i64(&[2], &as_i64(&[self.n_rows, self.n_cols])?),
            ),
            ("data.npy", npy::encode_i64(&[self.data.len()], &self.data)),
        ];

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, bytes) in entries {
            zip.start_file(name, entry_options())?;
            zip.write_all(&bytes)?;
        }
        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }

    pub fn from_npz_bytes(bytes: &[u8]) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;

        let mut read_entry = |name: &str| -> Result<NpyArray> {
            let mut file = archive
                .by_name(name)
                .map_err(|_| EtlError::matrix_format(format!("missing entry '{}'", name)))?;
            let mut buffer = Vec::new();
            file.read_to_end(&mut buffer)?;
            npy::decode(&buffer)
        };

        let format = read_entry("format.npy")?.to_text()?;
        if format != "csr" {
            return Err(EtlError::matrix_format(format!(
                "unsupported sparse format '{}'",
                format
            )));
        }

        let shape = to_usize(read_entry("shape.npy")?.to_i64_vec()?, "shape")?;
        let indptr = to_usize(read_entry("indptr.npy")?.to_i64_vec()?, "indptr")?;
        let indices = to_usize(read_entry("indices.npy")?.to_i64_vec()?, "indices")?;
        let data = read_entry("data.npy")?.to_i64_vec()?;

        let [n_rows, n_cols] = shape[..] else {
            return Err(EtlError::matrix_format("shape must have two entries"));
        };

        let matrix = Self {
            n_rows,
            n_cols,
            indptr,
            indices,
            data,
        };
        matrix.check_structure()?;
        Ok(matrix)
    }

    fn check_structure(&self) -> Result<()> {
        if self.indptr.len() != self.n_rows + 1 {
            return Err(EtlError::matrix_format(format!(
                "indptr has {} entries for {} rows",
                self.indptr.len(),
                self.n_rows
            )));
        }
        if self.indptr.first() != Some(&0) || self.indptr.windows(2).any(|w| w[0] > w[1]) {
            return Err(EtlError::matrix_format("indptr must start at 0 and be non-decreasing"));
        }
        if self.indices.len() != self.data.len() || self.indptr[self.n_rows] != self.data.len() {
            return Err(EtlError::matrix_format("indices, data and indptr disagree on nnz"));
        }
        if let Some(&bad) = self.indices.iter().find(|&&c| c >= self.n_cols) {
            return Err(EtlError::matrix_format(format!(
                "column index {} out of bounds for {} columns",
                bad, self.n_cols
            )));
        }
        if self.data.iter().any(|&v| v < 0) {
            return Err(EtlError::matrix_format("term counts must be non-negative"));
        }
        Ok(())
    }
}

/// 固定時間戳，重跑輸出位元組完全一致
fn entry_options() -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default())
}

fn to_usize(values: Vec<i64>, what: &str) -> Result<Vec<usize>> {
    values
        .into_iter()
        .map(|v| {
            usize::try_from(v)
                .map_err(|_| EtlError::matrix_format(format!("negative value in {}", what)))
        })
        .collect()
}
