use std::{
    fs::File,
    path::{Path, PathBuf},
};

use parquet::arrow::arrow_reader::{ParquetRecordBatchReader, ParquetRecordBatchReaderBuilder};

use pc_format::PointCloudError;

use crate::{PointCloudReader, DEFAULT_BATCH_SIZE};

fn parquet_error(e: parquet::errors::ParquetError) -> PointCloudError {
    PointCloudError::Decode(format!("parquet: {e}"))
}

/// Parquet point cloud reader
pub struct ParquetReader {
    path: PathBuf,
}

impl<'a> PointCloudReader<'a> for ParquetReader {
    type T = ParquetRecordBatchReader;

    fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, PointCloudError> {
        // fail early on missing files
        File::open(&path)?;

        Ok(ParquetReader {
            path: path.as_ref().to_path_buf(),
        })
    }

    fn record_batch_reader(&'a mut self) -> Result<Self::T, PointCloudError> {
        let builder =
            ParquetRecordBatchReaderBuilder::try_new(File::open(&self.path)?).map_err(parquet_error)?;

        tracing::debug!(
            "Reading {} row groups from {}",
            builder.metadata().num_row_groups(),
            self.path.display()
        );

        builder
            .with_batch_size(DEFAULT_BATCH_SIZE)
            .build()
            .map_err(parquet_error)
    }
}
