use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use pc_format::PointCloudError;

use crate::{float_batch, PointCloudReader, SlicedBatchReader};

/// Delimited text reader.
///
/// Every non-empty line holds `x y z` optionally followed by `r g b`, split at
/// the configured separator. Lines starting with `#` are ignored. Colors are
/// used only when the first data line carries them, every other line must
/// then carry them too.
pub struct TxtReader {
    path: PathBuf,
    separator: String,
}

impl TxtReader {
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    fn split<'l>(&self, line: &'l str) -> Vec<&'l str> {
        if self.separator.trim().is_empty() {
            line.split_whitespace().collect()
        } else {
            line.split(self.separator.as_str())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect()
        }
    }
}

impl<'a> PointCloudReader<'a> for TxtReader {
    type T = SlicedBatchReader;

    fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, PointCloudError> {
        Ok(TxtReader {
            path: path.as_ref().to_path_buf(),
            separator: ",".to_string(),
        })
    }

    fn record_batch_reader(&mut self) -> Result<Self::T, PointCloudError> {
        let reader = BufReader::new(File::open(&self.path)?);

        let mut columns: [Vec<f64>; 6] = Default::default();
        let mut colored = None;

        for (n, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let values = self
                .split(line)
                .iter()
                .map(|v| v.parse::<f64>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| PointCloudError::Decode(format!("line {}: {e}", n + 1)))?;

            if values.len() < 3 {
                return Err(PointCloudError::Decode(format!(
                    "line {}: expected at least 3 values, found {}",
                    n + 1,
                    values.len()
                )));
            }

            let width = match *colored.get_or_insert(values.len() >= 6) {
                true if values.len() < 6 => {
                    return Err(PointCloudError::Decode(format!(
                        "line {}: missing color values",
                        n + 1
                    )))
                }
                true => 6,
                false => 3,
            };

            for (column, value) in columns.iter_mut().zip(&values[..width]) {
                column.push(*value);
            }
        }

        let [x, y, z, r, g, b] = columns;
        let colors = (colored == Some(true)).then_some([r, g, b]);
        let batch = float_batch([x, y, z], colors)?;

        Ok(SlicedBatchReader::new(batch))
    }
}
