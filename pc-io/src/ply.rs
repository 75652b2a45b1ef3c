use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
    sync::Arc,
};

use arrow::{
    array::{
        ArrayRef, AsArray, Float32Array, Float64Array, Int16Array, Int32Array, Int8Array,
        UInt16Array, UInt32Array, UInt8Array,
    },
    datatypes::{
        DataType, Field, Float32Type, Float64Type, Int16Type, Int32Type, Int8Type, Schema,
        SchemaRef, UInt16Type, UInt32Type, UInt8Type,
    },
    error::ArrowError,
    record_batch::{RecordBatch, RecordBatchWriter},
};
use ply_rs::ply::{
    Addable, DefaultElement, ElementDef, Encoding, Header, Ply, Property, PropertyDef,
    PropertyType, ScalarType,
};

use pc_format::{compute::to_batch, schema, PointCloudError, PointTrait, VecPointCloud};

use crate::{PointCloudReader, SlicedBatchReader};

const DEFAULT_VERTEX_ELEMENT_NAME: &str = "vertex";

/// Ply point cloud reader
pub struct PlyReader {
    reader: Box<dyn BufRead + Send>,
    header: Header,
}

impl<'a> PointCloudReader<'a> for PlyReader {
    type T = SlicedBatchReader;

    fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, PointCloudError> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);

        let parser = ply_rs::parser::Parser::<DefaultElement>::new();
        let header = parser.read_header(&mut reader)?;

        Ok(PlyReader {
            reader: Box::new(reader),
            header,
        })
    }

    fn record_batch_reader(&mut self) -> Result<Self::T, PointCloudError> {
        let parser = ply_rs::parser::Parser::<DefaultElement>::new();

        let element = self
            .header
            .elements
            .get(DEFAULT_VERTEX_ELEMENT_NAME)
            .ok_or_else(|| PointCloudError::Decode("ply without vertex element".to_string()))?;

        // elements preceding the vertices are consumed and dropped
        for (name, other) in &self.header.elements {
            if name == DEFAULT_VERTEX_ELEMENT_NAME {
                break;
            }
            parser.read_payload_for_element(&mut self.reader, other, &self.header)?;
        }

        let payload = parser.read_payload_for_element(&mut self.reader, element, &self.header)?;

        let mut fields = Vec::new();
        let mut columns = Vec::new();

        for (name, property) in &element.properties {
            let PropertyType::Scalar(scalar) = &property.data_type else {
                tracing::debug!("Skipping ply list property `{name}`");
                continue;
            };

            let (field, column) = scalar_column(name, scalar, &payload)?;
            fields.push(schema::annotate(field));
            columns.push(column);
        }

        let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?;

        Ok(SlicedBatchReader::new(batch))
    }
}

fn scalar_column(
    name: &str,
    scalar: &ScalarType,
    payload: &[DefaultElement],
) -> Result<(Field, ArrayRef), PointCloudError> {
    macro_rules! column {
        ($array:ty, $variant:ident, $data_type:expr) => {{
            let values = payload
                .iter()
                .map(|element| match element.get(name) {
                    Some(Property::$variant(v)) => Ok(*v),
                    other => Err(PointCloudError::Decode(format!(
                        "ply property `{name}` holds {other:?}"
                    ))),
                })
                .collect::<Result<Vec<_>, _>>()?;
            (
                Field::new(name, $data_type, false),
                Arc::new(<$array>::from(values)) as ArrayRef,
            )
        }};
    }

    Ok(match scalar {
        ScalarType::Char => column!(Int8Array, Char, DataType::Int8),
        ScalarType::UChar => column!(UInt8Array, UChar, DataType::UInt8),
        ScalarType::Short => column!(Int16Array, Short, DataType::Int16),
        ScalarType::UShort => column!(UInt16Array, UShort, DataType::UInt16),
        ScalarType::Int => column!(Int32Array, Int, DataType::Int32),
        ScalarType::UInt => column!(UInt32Array, UInt, DataType::UInt32),
        ScalarType::Float => column!(Float32Array, Float, DataType::Float32),
        ScalarType::Double => column!(Float64Array, Double, DataType::Float64),
    })
}

/// Ply point cloud writer, ascii encoded
pub struct PlyWriter {
    target: PathBuf,
    schema: SchemaRef,
    elements: Vec<DefaultElement>,
}

impl PlyWriter {
    pub fn new<P: AsRef<Path>>(path: P, schema: SchemaRef) -> Self {
        PlyWriter {
            target: path.as_ref().to_owned(),
            schema,
            elements: Vec::new(),
        }
    }
}

impl RecordBatchWriter for PlyWriter {
    fn write(&mut self, batch: &RecordBatch) -> Result<(), ArrowError> {
        for i in 0..batch.num_rows() {
            let element = element_from_row(i, batch)?;
            self.elements.push(element);
        }
        Ok(())
    }

    fn close(self) -> Result<(), ArrowError> {
        let mut dst = File::create(self.target)?;

        let mut ply = Ply::<DefaultElement>::new();
        ply.header.encoding = Encoding::Ascii;

        // `count` is set on write by `make_consistent`
        let element = element_definition_from_schema(&self.schema)?;
        ply.header.elements.add(element);

        ply.payload
            .insert(DEFAULT_VERTEX_ELEMENT_NAME.to_string(), self.elements);

        let w = ply_rs::writer::Writer::new();
        w.write_ply(&mut dst, &mut ply)?;

        Ok(())
    }
}

/// Write a cloud as ascii ply with double coordinates and uchar colors.
pub fn write_cloud<P, Q>(path: Q, pc: &VecPointCloud<P>) -> Result<(), PointCloudError>
where
    P: PointTrait,
    <P as rstar::Point>::Scalar: num_traits::NumCast,
    Q: AsRef<Path>,
{
    let batch = to_batch(pc)?;

    let mut writer = PlyWriter::new(path.as_ref(), batch.schema());
    writer.write(&batch)?;
    writer.close()?;

    tracing::debug!("Wrote {} points to {}", pc.len(), path.as_ref().display());

    Ok(())
}

fn element_definition_from_schema(schema: &Schema) -> Result<ElementDef, ArrowError> {
    let mut element = ElementDef::new(DEFAULT_VERTEX_ELEMENT_NAME.to_string());

    for field in schema.fields() {
        element.properties.add(property_definition_from_field(field)?);
    }

    Ok(element)
}

fn property_definition_from_field(field: &Field) -> Result<PropertyDef, ArrowError> {
    let scalar = match field.data_type() {
        DataType::Int8 => ScalarType::Char,
        DataType::Int16 => ScalarType::Short,
        DataType::Int32 => ScalarType::Int,
        DataType::UInt8 => ScalarType::UChar,
        DataType::UInt16 => ScalarType::UShort,
        DataType::UInt32 => ScalarType::UInt,
        DataType::Float32 => ScalarType::Float,
        DataType::Float64 => ScalarType::Double,
        x => {
            return Err(ArrowError::NotYetImplemented(format!(
                "ply property of type {x}"
            )))
        }
    };
    Ok(PropertyDef::new(
        field.name().to_owned(),
        PropertyType::Scalar(scalar),
    ))
}

fn element_from_row(i: usize, batch: &RecordBatch) -> Result<DefaultElement, ArrowError> {
    let mut element = DefaultElement::new();

    for (field, column) in batch.schema().fields().iter().zip(batch.columns()) {
        let value = match field.data_type() {
            DataType::Int8 => Property::Char(column.as_primitive::<Int8Type>().value(i)),
            DataType::Int16 => Property::Short(column.as_primitive::<Int16Type>().value(i)),
            DataType::Int32 => Property::Int(column.as_primitive::<Int32Type>().value(i)),
            DataType::UInt8 => Property::UChar(column.as_primitive::<UInt8Type>().value(i)),
            DataType::UInt16 => Property::UShort(column.as_primitive::<UInt16Type>().value(i)),
            DataType::UInt32 => Property::UInt(column.as_primitive::<UInt32Type>().value(i)),
            DataType::Float32 => Property::Float(column.as_primitive::<Float32Type>().value(i)),
            DataType::Float64 => Property::Double(column.as_primitive::<Float64Type>().value(i)),
            x => {
                return Err(ArrowError::NotYetImplemented(format!(
                    "ply property of type {x}"
                )))
            }
        };

        element.insert(field.name().to_owned(), value);
    }

    Ok(element)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pc_format::Point;

    use crate::{read, ReadOptions};

    use super::*;

    const ASCII: &str = "ply
format ascii 1.0
element vertex 3
property float x
property float y
property float z
property uchar red
property uchar green
property uchar blue
element face 1
property list uchar int vertex_indices
end_header
0 0 0 255 0 0
1 0.5 0 0 255 0
2 1 4 0 0 51
3 0 1 2
";

    #[test]
    fn read_ascii() {
        let mut file = tempfile::Builder::new().suffix(".ply").tempfile().unwrap();
        file.write_all(ASCII.as_bytes()).unwrap();

        let mut reader = PlyReader::from_path(file.path()).unwrap();
        let batches: Vec<RecordBatch> = reader
            .record_batch_reader()
            .unwrap()
            .map(|b| b.unwrap())
            .collect();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].num_rows(), 3);
        assert_eq!(batches[0].num_columns(), 6);

        let pc = read(file.path(), &ReadOptions::default()).unwrap();
        assert_eq!(pc.len(), 3);
        assert_eq!(pc.as_slice()[2], Point::new([2., 1., 4.]));
        assert_eq!(pc.color(0), Some([1., 0., 0.]));
        assert_eq!(pc.color(2), Some([0., 0., 0.2]));
    }

    #[test]
    fn write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cloud.ply");

        let pc = VecPointCloud::with_colors(
            vec![Point::new([0.25, -0.5, 0.125]), Point::new([-0.25, 0.5, 0.])],
            vec![[1., 0., 0.], [0., 0.2, 1.]],
        )
        .unwrap();
        write_cloud(&path, &pc).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("ply\nformat ascii 1.0\n"));
        assert!(content.contains("element vertex 2"));
        assert!(content.contains("property uchar red"));

        let loaded = read(&path, &ReadOptions::default()).unwrap();
        assert_eq!(loaded.as_slice(), pc.as_slice());
        assert_eq!(loaded.color(1), Some([0., 0.2, 1.]));
    }

    #[test]
    fn missing_vertices() {
        let mut file = tempfile::Builder::new().suffix(".ply").tempfile().unwrap();
        file.write_all(b"ply\nformat ascii 1.0\nelement face 0\nproperty list uchar int vertex_indices\nend_header\n")
            .unwrap();

        let mut reader = PlyReader::from_path(file.path()).unwrap();
        assert!(matches!(
            reader.record_batch_reader(),
            Err(PointCloudError::Decode(_))
        ));
    }
}
