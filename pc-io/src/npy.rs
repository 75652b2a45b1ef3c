use std::{
    fs::File,
    io::{BufReader, Read},
    path::{Path, PathBuf},
};

use arrow::record_batch::RecordBatch;
use npyz::{npz::NpzArchive, DType, NpyFile, Order};

use pc_format::PointCloudError;

use crate::{float_batch, PointCloudReader, SlicedBatchReader};

/// array holding the points inside npz archives
pub const NPZ_KEY: &str = "pred";

/// Decode a two dimensional float array, `N x 3` locations optionally
/// followed by three color columns in [0, 1].
fn decode<R: Read>(npy: NpyFile<R>) -> Result<RecordBatch, PointCloudError> {
    let shape = npy.shape().to_vec();
    let (rows, columns) = match shape[..] {
        [rows, columns] if columns >= 3 => (rows as usize, columns as usize),
        _ => {
            return Err(PointCloudError::Decode(format!(
                "expected an array of shape (N, 3) or (N, 6), found {shape:?}"
            )))
        }
    };
    let fortran = matches!(npy.order(), Order::Fortran);

    let dtype = npy.dtype().clone();
    let values: Vec<f64> = match &dtype {
        DType::Plain(ts) if ts.to_string().ends_with("f8") => npy.into_vec::<f64>()?,
        DType::Plain(ts) if ts.to_string().ends_with("f4") => npy
            .into_vec::<f32>()?
            .into_iter()
            .map(f64::from)
            .collect(),
        dtype => {
            return Err(PointCloudError::Decode(format!(
                "unsupported dtype {}",
                dtype.descr()
            )))
        }
    };

    let column = |c: usize| -> Vec<f64> {
        (0..rows)
            .map(|r| match fortran {
                true => values[c * rows + r],
                false => values[r * columns + c],
            })
            .collect()
    };

    let locations = [column(0), column(1), column(2)];
    let colors = (columns >= 6).then(|| [column(3), column(4), column(5)]);

    Ok(float_batch(locations, colors)?)
}

/// Numpy `.npy` reader
pub struct NpyReader {
    path: PathBuf,
}

impl<'a> PointCloudReader<'a> for NpyReader {
    type T = SlicedBatchReader;

    fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, PointCloudError> {
        Ok(NpyReader {
            path: path.as_ref().to_path_buf(),
        })
    }

    fn record_batch_reader(&mut self) -> Result<Self::T, PointCloudError> {
        let npy = NpyFile::new(BufReader::new(File::open(&self.path)?))?;
        Ok(SlicedBatchReader::new(decode(npy)?))
    }
}

/// Numpy `.npz` reader, points are read from the [NPZ_KEY] array
pub struct NpzReader {
    archive: NpzArchive<BufReader<File>>,
}

impl<'a> PointCloudReader<'a> for NpzReader {
    type T = SlicedBatchReader;

    fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, PointCloudError> {
        Ok(NpzReader {
            archive: NpzArchive::open(path)?,
        })
    }

    fn record_batch_reader(&mut self) -> Result<Self::T, PointCloudError> {
        let npy = self.archive.by_name(NPZ_KEY)?.ok_or_else(|| {
            PointCloudError::Decode(format!("npz archive has no `{NPZ_KEY}` array"))
        })?;
        Ok(SlicedBatchReader::new(decode(npy)?))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use npyz::WriterBuilder;

    use pc_format::Point;

    use crate::{read, ReadOptions};

    use super::*;

    fn write_npy<T, W>(w: W, shape: &[u64], data: &[T])
    where
        T: npyz::AutoSerialize,
        W: Write,
    {
        let mut writer = npyz::WriteOptions::<T>::new()
            .default_dtype()
            .shape(shape)
            .writer(w)
            .begin_nd()
            .unwrap();
        for value in data {
            writer.push(value).unwrap();
        }
        writer.finish().unwrap();
    }

    fn write_npz(path: &Path, name: &str, shape: &[u64], data: &[f64]) {
        let mut zip = zip::ZipWriter::new(File::create(path).unwrap());
        zip.start_file(format!("{name}.npy"), zip::write::FileOptions::default())
            .unwrap();
        write_npy(&mut zip, shape, data);
        zip.finish().unwrap();
    }

    #[test]
    fn colored_npy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cloud.npy");
        write_npy(
            File::create(&path).unwrap(),
            &[2, 6],
            &[0., 1., 2., 1., 0., 0., 3., 4., 5., 0., 0.5, 1.],
        );

        let pc = read(&path, &ReadOptions::default()).unwrap();
        assert_eq!(
            pc.as_slice(),
            &[Point::new([0., 1., 2.]), Point::new([3., 4., 5.])]
        );
        assert_eq!(pc.color(0), Some([1., 0., 0.]));
        assert_eq!(pc.color(1), Some([0., 0.5, 1.]));
    }

    #[test]
    fn single_precision() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cloud.npy");
        write_npy(
            File::create(&path).unwrap(),
            &[3, 3],
            &[0f32, 0., 0., 0.5, 0., 0., 0., 0.25, 1.],
        );

        let pc = read(&path, &ReadOptions::default()).unwrap();
        assert!(!pc.is_colored());
        assert_eq!(pc.as_slice()[2], Point::new([0., 0.25, 1.]));
    }

    #[test]
    fn wrong_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.npy");
        write_npy(File::create(&path).unwrap(), &[4], &[1., 2., 3., 4.]);

        assert!(matches!(
            read(&path, &ReadOptions::default()),
            Err(PointCloudError::Decode(_))
        ));
    }

    #[test]
    fn npz_prediction() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("result.npz");
        write_npz(&path, NPZ_KEY, &[2, 3], &[1., 2., 3., 4., 5., 6.]);

        let pc = read(&path, &ReadOptions::default()).unwrap();
        assert_eq!(
            pc.as_slice(),
            &[Point::new([1., 2., 3.]), Point::new([4., 5., 6.])]
        );
    }

    #[test]
    fn npz_without_prediction() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("result.npz");
        write_npz(&path, "gt", &[2, 3], &[1., 2., 3., 4., 5., 6.]);

        assert!(matches!(
            read(&path, &ReadOptions::default()),
            Err(PointCloudError::Decode(_))
        ));
    }
}
