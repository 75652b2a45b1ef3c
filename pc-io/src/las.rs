use std::{path::Path, sync::Arc};

use arrow::{
    array::{ArrayRef, Float64Array, Float64Builder, UInt16Array, UInt16Builder},
    datatypes::{DataType, Schema, SchemaRef},
    record_batch::RecordBatch,
};
use las::Read;

use pc_format::{
    schema::{color_field, location_field},
    PointCloudError,
};

use crate::{PointCloudReader, SlicedBatchReader};

fn las_error(e: las::Error) -> PointCloudError {
    PointCloudError::Decode(format!("las: {e}"))
}

// Arrow schema for LAS points, locations and 16-bit colors only
fn schema_from_header(header: &las::Header) -> SchemaRef {
    let mut fields = vec![
        location_field("x", 1, DataType::Float64),
        location_field("y", 2, DataType::Float64),
        location_field("z", 3, DataType::Float64),
    ];
    if header.point_format().has_color {
        fields.extend([
            color_field("red", 0, DataType::UInt16),
            color_field("green", 1, DataType::UInt16),
            color_field("blue", 2, DataType::UInt16),
        ])
    }
    Arc::new(Schema::new(fields))
}

#[derive(Debug)]
struct RowBuilder {
    x: Float64Builder,
    y: Float64Builder,
    z: Float64Builder,
    red: UInt16Builder,
    green: UInt16Builder,
    blue: UInt16Builder,
}

impl RowBuilder {
    fn new(capacity: usize) -> Self {
        Self {
            x: Float64Array::builder(capacity),
            y: Float64Array::builder(capacity),
            z: Float64Array::builder(capacity),
            red: UInt16Array::builder(capacity),
            green: UInt16Array::builder(capacity),
            blue: UInt16Array::builder(capacity),
        }
    }

    fn append(&mut self, p: las::Point, header: &las::Header) {
        self.x.append_value(p.x);
        self.y.append_value(p.y);
        self.z.append_value(p.z);
        if header.point_format().has_color {
            let color = p.color.unwrap_or(las::Color::new(0, 0, 0));
            self.red.append_value(color.red);
            self.green.append_value(color.green);
            self.blue.append_value(color.blue);
        }
    }

    fn finish(&mut self, header: &las::Header) -> Vec<ArrayRef> {
        let mut columns = vec![
            Arc::new(self.x.finish()) as ArrayRef,
            Arc::new(self.y.finish()) as ArrayRef,
            Arc::new(self.z.finish()) as ArrayRef,
        ];
        if header.point_format().has_color {
            columns.extend([
                Arc::new(self.red.finish()) as ArrayRef,
                Arc::new(self.green.finish()) as ArrayRef,
                Arc::new(self.blue.finish()) as ArrayRef,
            ]);
        }
        columns
    }
}

/// LAS/LAZ point cloud reader
pub struct LasReader {
    reader: las::Reader<'static>,
}

impl<'a> PointCloudReader<'a> for LasReader {
    type T = SlicedBatchReader;

    fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, PointCloudError> {
        let reader = las::Reader::from_path(path).map_err(las_error)?;
        Ok(LasReader { reader })
    }

    fn record_batch_reader(&mut self) -> Result<Self::T, PointCloudError> {
        let header = self.reader.header().to_owned();
        let schema = schema_from_header(&header);

        let mut builder = RowBuilder::new(header.number_of_points() as usize);
        for point in self.reader.points() {
            builder.append(point.map_err(las_error)?, &header);
        }

        let batch = RecordBatch::try_new(schema, builder.finish(&header))?;

        Ok(SlicedBatchReader::new(batch))
    }
}
