use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use arrow::ipc::reader::FileReader;

use pc_format::PointCloudError;

use crate::PointCloudReader;

/// Arrow IPC file reader
pub struct IpcReader {
    path: PathBuf,
}

impl<'a> PointCloudReader<'a> for IpcReader {
    type T = FileReader<BufReader<File>>;

    fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, PointCloudError> {
        File::open(&path)?;

        Ok(IpcReader {
            path: path.as_ref().to_path_buf(),
        })
    }

    fn record_batch_reader(&'a mut self) -> Result<Self::T, PointCloudError> {
        let file = BufReader::new(File::open(&self.path)?);
        Ok(FileReader::try_new(file, None)?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::{
        array::{ArrayRef, Float64Array, UInt16Array},
        ipc::writer::FileWriter,
        record_batch::RecordBatch,
    };

    use pc_format::Point;

    use crate::{read, ReadOptions};

    use super::*;

    #[test]
    fn read_colored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cloud.arrow");

        let batch = RecordBatch::try_from_iter(vec![
            ("x", Arc::new(Float64Array::from(vec![0.25, 4.])) as ArrayRef),
            ("y", Arc::new(Float64Array::from(vec![0.5, 5.])) as ArrayRef),
            ("z", Arc::new(Float64Array::from(vec![0.75, 6.])) as ArrayRef),
            ("r", Arc::new(UInt16Array::from(vec![65535, 0])) as ArrayRef),
            ("g", Arc::new(UInt16Array::from(vec![0, 65535])) as ArrayRef),
            ("b", Arc::new(UInt16Array::from(vec![0, 0])) as ArrayRef),
        ])
        .unwrap();

        let mut writer = FileWriter::try_new(File::create(&path).unwrap(), &batch.schema()).unwrap();
        writer.write(&batch).unwrap();
        writer.finish().unwrap();

        let pc = read(&path, &ReadOptions::default()).unwrap();
        assert_eq!(pc.as_slice()[0], Point::new([0.25, 0.5, 0.75]));
        assert_eq!(pc.color(0), Some([1., 0., 0.]));
        assert_eq!(pc.color(1), Some([0., 1., 0.]));
    }
}
