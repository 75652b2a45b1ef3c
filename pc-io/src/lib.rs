use std::{path::Path, sync::Arc};

use arrow::{
    array::{ArrayRef, Float64Array},
    datatypes::{DataType, Schema, SchemaRef},
    error::ArrowError,
    record_batch::{RecordBatch, RecordBatchReader},
};

use pc_format::{
    compute::from_batches,
    schema::{color_field, location_field},
    Point, PointCloudError, VecPointCloud,
};

pub mod ipc;
pub mod las;
pub mod npy;
pub mod parquet;
pub mod ply;
pub mod txt;

pub const DEFAULT_BATCH_SIZE: usize = 1024 * 1024;

/// Point cloud reader trait
pub trait PointCloudReader<'a>: Sized {
    type T: RecordBatchReader;

    fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, PointCloudError>;

    fn record_batch_reader(&'a mut self) -> Result<Self::T, PointCloudError>;
}

/// Point cloud format extensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatExt {
    IPC,
    LAS,
    LAZ,
    NPY,
    NPZ,
    Parquet,
    PLY,
    TXT,
}

impl FormatExt {
    /// format of a file, judged by its extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, PointCloudError> {
        match path.as_ref().extension() {
            Some(ext) => ext.try_into(),
            None => Err(PointCloudError::UnsupportedFormat(format!(
                "missing extension on `{}`",
                path.as_ref().display()
            ))),
        }
    }
}

impl TryFrom<&std::ffi::OsStr> for FormatExt {
    type Error = PointCloudError;

    fn try_from(value: &std::ffi::OsStr) -> Result<Self, Self::Error> {
        match value.to_ascii_lowercase().to_str() {
            Some("arrow") | Some("ipc") => Ok(FormatExt::IPC),
            Some("las") => Ok(FormatExt::LAS),
            Some("laz") => Ok(FormatExt::LAZ),
            Some("npy") => Ok(FormatExt::NPY),
            Some("npz") => Ok(FormatExt::NPZ),
            Some("parquet") => Ok(FormatExt::Parquet),
            Some("ply") => Ok(FormatExt::PLY),
            Some("txt") | Some("csv") | Some("xyz") => Ok(FormatExt::TXT),
            x => Err(PointCloudError::UnsupportedFormat(format!(
                "unknown extension `{x:?}`"
            ))),
        }
    }
}

/// Decoder options
#[derive(Debug, Clone)]
pub struct ReadOptions {
    /// field separator of delimited text files
    pub separator: String,
}

impl Default for ReadOptions {
    fn default() -> Self {
        ReadOptions {
            separator: ",".to_string(),
        }
    }
}

/// Decode a point cloud, the decoder is chosen by file extension.
pub fn read<P: AsRef<Path>>(
    path: P,
    options: &ReadOptions,
) -> Result<VecPointCloud<Point<f64, 3>>, PointCloudError> {
    let format = FormatExt::from_path(&path)?;
    tracing::debug!("Decoding {} as {format:?}", path.as_ref().display());

    let pc = match format {
        FormatExt::IPC => {
            let mut reader = ipc::IpcReader::from_path(&path)?;
            collect(reader.record_batch_reader()?)
        }
        FormatExt::LAS | FormatExt::LAZ => {
            let mut reader = las::LasReader::from_path(&path)?;
            collect(reader.record_batch_reader()?)
        }
        FormatExt::NPY => {
            let mut reader = npy::NpyReader::from_path(&path)?;
            collect(reader.record_batch_reader()?)
        }
        FormatExt::NPZ => {
            let mut reader = npy::NpzReader::from_path(&path)?;
            collect(reader.record_batch_reader()?)
        }
        FormatExt::Parquet => {
            let mut reader = parquet::ParquetReader::from_path(&path)?;
            collect(reader.record_batch_reader()?)
        }
        FormatExt::PLY => {
            let mut reader = ply::PlyReader::from_path(&path)?;
            collect(reader.record_batch_reader()?)
        }
        FormatExt::TXT => {
            let mut reader =
                txt::TxtReader::from_path(&path)?.with_separator(options.separator.as_str());
            collect(reader.record_batch_reader()?)
        }
    }?;

    tracing::info!(
        "Loaded {} points ({}) from {}",
        pc.len(),
        if pc.is_colored() { "colored" } else { "uncolored" },
        path.as_ref().display()
    );

    Ok(pc)
}

/// Batch of `f64` locations and optional `f64` color channels in [0, 1].
pub(crate) fn float_batch(
    locations: [Vec<f64>; 3],
    colors: Option<[Vec<f64>; 3]>,
) -> Result<RecordBatch, ArrowError> {
    let mut fields = Vec::new();
    let mut arrays: Vec<ArrayRef> = Vec::new();

    for (d, (name, values)) in ["x", "y", "z"].iter().zip(locations).enumerate() {
        fields.push(location_field(name, d + 1, DataType::Float64));
        arrays.push(Arc::new(Float64Array::from(values)));
    }

    if let Some(colors) = colors {
        for (c, (name, values)) in ["red", "green", "blue"].iter().zip(colors).enumerate() {
            fields.push(color_field(name, c, DataType::Float64));
            arrays.push(Arc::new(Float64Array::from(values)));
        }
    }

    RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)
}

fn collect(reader: impl RecordBatchReader) -> Result<VecPointCloud<Point<f64, 3>>, PointCloudError> {
    let schema = reader.schema();
    from_batches(&schema, reader)
}

/// Serves a single in-memory batch in slices of [DEFAULT_BATCH_SIZE] rows
pub struct SlicedBatchReader {
    batch: RecordBatch,
    offset: usize,
}

impl SlicedBatchReader {
    pub fn new(batch: RecordBatch) -> Self {
        SlicedBatchReader { batch, offset: 0 }
    }
}

impl RecordBatchReader for SlicedBatchReader {
    fn schema(&self) -> SchemaRef {
        self.batch.schema()
    }
}

impl Iterator for SlicedBatchReader {
    type Item = Result<RecordBatch, ArrowError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset < self.batch.num_rows() {
            let length = DEFAULT_BATCH_SIZE.min(self.batch.num_rows() - self.offset);
            let batch = self.batch.slice(self.offset, length);
            self.offset += length;

            Some(Ok(batch))
        } else {
            None
        }
    }
}
