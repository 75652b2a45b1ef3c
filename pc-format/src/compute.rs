use std::sync::Arc;

use arrow::{
    array::{ArrayRef, AsArray, Float64Array, UInt8Array},
    compute::cast,
    datatypes::{DataType, Float64Type, Schema, SchemaRef},
    error::ArrowError,
    record_batch::RecordBatch,
};

use crate::{
    schema::{self, color_field, location_field},
    PointCloudError, PointCloudTrait, PointTrait, Rgb, VecPointCloud,
};

/// divisor mapping integer color channels into [0, 1]
fn channel_range(data_type: &DataType) -> f64 {
    match data_type {
        DataType::UInt8 | DataType::Int8 => u8::MAX as f64,
        DataType::UInt16 | DataType::Int16 => u16::MAX as f64,
        _ => 1.,
    }
}

fn as_f64(column: &ArrayRef) -> Result<Float64Array, ArrowError> {
    let column = cast(column, &DataType::Float64)?;
    Ok(column.as_primitive::<Float64Type>().clone())
}

/// collect record batches into a point cloud
///
/// Locations are taken from the schema dimensions, colors from the red, green
/// and blue channels when all three are present.
pub fn from_batches<P, I>(
    schema: &SchemaRef,
    batches: I,
) -> Result<VecPointCloud<P>, PointCloudError>
where
    P: PointTrait,
    <P as rstar::Point>::Scalar: num_traits::NumCast,
    I: IntoIterator<Item = Result<RecordBatch, ArrowError>>,
{
    schema::validate(schema)?;

    let dimensions = schema::dimensions(schema);
    let channels = schema::colors(schema);

    let mut points = Vec::new();
    let mut colors = Vec::new();

    for batch in batches {
        let batch = batch?;

        let columns = dimensions
            .iter()
            .take(P::DIMENSIONS)
            .map(|i| as_f64(batch.column(*i)))
            .collect::<Result<Vec<_>, _>>()?;

        points.extend((0..batch.num_rows()).map(|row| {
            P::generate(|d| {
                columns
                    .get(d)
                    .and_then(|c| num_traits::cast(c.value(row)))
                    .unwrap_or_else(num_traits::Zero::zero)
            })
        }));

        if let Some(channels) = channels {
            let columns = channels
                .iter()
                .map(|i| {
                    let column = batch.column(*i);
                    Ok((as_f64(column)?, channel_range(column.data_type())))
                })
                .collect::<Result<Vec<_>, ArrowError>>()?;

            colors.extend((0..batch.num_rows()).map(|row| -> Rgb {
                [0, 1, 2].map(|c| columns[c].0.value(row) / columns[c].1)
            }));
        }
    }

    match channels {
        Some(_) => VecPointCloud::with_colors(points, colors),
        None => Ok(VecPointCloud::new(points)),
    }
}

/// record batch of a cloud, `f64` locations and 8-bit colors
pub fn to_batch<P>(pc: &VecPointCloud<P>) -> Result<RecordBatch, PointCloudError>
where
    P: PointTrait,
    <P as rstar::Point>::Scalar: num_traits::NumCast,
{
    let mut fields = Vec::new();
    let mut columns: Vec<ArrayRef> = Vec::new();

    for (d, name) in ["x", "y", "z"].iter().enumerate().take(P::DIMENSIONS) {
        fields.push(location_field(name, d + 1, DataType::Float64));
        columns.push(Arc::new(Float64Array::from_iter_values(
            pc.as_slice()
                .iter()
                .map(|p| num_traits::cast::<_, f64>(p.nth(d)).unwrap_or(f64::NAN)),
        )));
    }

    if let Some(colors) = pc.colors() {
        for (c, name) in ["red", "green", "blue"].iter().enumerate() {
            fields.push(color_field(name, c, DataType::UInt8));
            columns.push(Arc::new(UInt8Array::from_iter_values(
                colors
                    .iter()
                    .map(|rgb| (rgb[c].clamp(0., 1.) * u8::MAX as f64).round() as u8),
            )));
        }
    }

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
}
