use std::collections::HashMap;

use arrow::datatypes::{DataType, Field, SchemaRef};
use itertools::Itertools;

use crate::PointCloudError;

/// Indexable dimension like location.
///
/// Integer values define order.
pub const PCE_DIMENSION_KEY: &str = "PCE:dimension";

pub const PCE_LOCATION_KEY: &str = "PCE:location";

/// Color channel, values `red`, `green` or `blue`.
pub const PCE_COLOR_KEY: &str = "PCE:color";

const LOCATION_NAMES: [&str; 3] = ["x", "y", "z"];
const COLOR_CHANNELS: [&str; 3] = ["red", "green", "blue"];
const COLOR_SHORT_NAMES: [&str; 3] = ["r", "g", "b"];

/// location field carrying dimension metadata
pub fn location_field(name: &str, dimension: usize, data_type: DataType) -> Field {
    Field::new(name, data_type, false).with_metadata(HashMap::from([
        (PCE_DIMENSION_KEY.to_owned(), dimension.to_string()),
        (PCE_LOCATION_KEY.to_owned(), name.to_owned()),
    ]))
}

/// color field carrying channel metadata, `channel` in 0..3
pub fn color_field(name: &str, channel: usize, data_type: DataType) -> Field {
    Field::new(name, data_type, false).with_metadata(HashMap::from([(
        PCE_COLOR_KEY.to_owned(),
        COLOR_CHANNELS[channel].to_owned(),
    )]))
}

/// attach location or color metadata to a field based on its name
pub fn annotate(field: Field) -> Field {
    let name = field.name().to_ascii_lowercase();
    if let Some((i, _)) = LOCATION_NAMES.iter().find_position(|n| **n == name) {
        let data_type = field.data_type().to_owned();
        return location_field(field.name(), i + 1, data_type);
    }
    if let Some((i, _)) = COLOR_CHANNELS
        .iter()
        .zip(COLOR_SHORT_NAMES.iter())
        .find_position(|(long, short)| **long == name || **short == name)
    {
        let data_type = field.data_type().to_owned();
        return color_field(field.name(), i, data_type);
    }
    field
}

/// extract dimensions from schema
///
/// Falls back to fields named `x`, `y`, `z` when no dimension metadata is present.
pub fn dimensions(schema: &SchemaRef) -> Vec<usize> {
    let annotated = schema
        .fields()
        .iter()
        .enumerate()
        .filter(|(_, f)| f.metadata().contains_key(PCE_DIMENSION_KEY))
        .sorted_by_key(|(_, f)| f.metadata().get(PCE_DIMENSION_KEY))
        .map(|(i, _)| i)
        .collect_vec();

    if !annotated.is_empty() {
        return annotated;
    }

    LOCATION_NAMES
        .iter()
        .filter_map(|name| {
            schema
                .fields()
                .iter()
                .position(|f| f.name().eq_ignore_ascii_case(name))
        })
        .collect_vec()
}

/// column indices of the red, green and blue channels, if all three are present
pub fn colors(schema: &SchemaRef) -> Option<[usize; 3]> {
    let lookup = |channel: usize| {
        schema
            .fields()
            .iter()
            .position(|f| {
                f.metadata().get(PCE_COLOR_KEY).map(String::as_str) == Some(COLOR_CHANNELS[channel])
            })
            .or_else(|| {
                schema.fields().iter().position(|f| {
                    f.name().eq_ignore_ascii_case(COLOR_CHANNELS[channel])
                        || f.name().eq_ignore_ascii_case(COLOR_SHORT_NAMES[channel])
                })
            })
    };

    Some([lookup(0)?, lookup(1)?, lookup(2)?])
}

/// check for point cloud schema validity
pub fn validate(schema: &SchemaRef) -> Result<(), PointCloudError> {
    let dimensions = dimensions(schema);

    // assert schema has at least 3 dimensions
    if dimensions.len() < 3 {
        return Err(PointCloudError::SchemaError(
            "schema has at least 3 dimensions".to_string(),
        ));
    }

    // assert all dimensions have a numeric data type
    if !dimensions
        .iter()
        .all(|i| schema.field(*i).data_type().is_numeric())
    {
        return Err(PointCloudError::SchemaError(
            "schema has non numeric dimensions specified".to_string(),
        ));
    }

    if let Some(colors) = colors(schema) {
        if !colors
            .iter()
            .all(|i| schema.field(*i).data_type().is_numeric())
        {
            return Err(PointCloudError::SchemaError(
                "schema has non numeric color channels".to_string(),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::datatypes::Schema;

    use super::*;

    #[test]
    fn metadata() {
        let schema: SchemaRef = Arc::new(Schema::new(vec![
            Field::new("intensity", DataType::UInt16, false),
            location_field("z", 3, DataType::Float64),
            location_field("x", 1, DataType::Float64),
            location_field("y", 2, DataType::Float64),
            color_field("blue", 2, DataType::UInt8),
            color_field("green", 1, DataType::UInt8),
            color_field("red", 0, DataType::UInt8),
        ]));

        assert_eq!(dimensions(&schema), vec![2, 3, 1]);
        assert_eq!(colors(&schema), Some([6, 5, 4]));
        assert!(validate(&schema).is_ok());
    }

    #[test]
    fn names() {
        let schema: SchemaRef = Arc::new(Schema::new(vec![
            Field::new("X", DataType::Float32, false),
            Field::new("Y", DataType::Float32, false),
            Field::new("Z", DataType::Float32, false),
            Field::new("r", DataType::Float32, false),
            Field::new("g", DataType::Float32, false),
        ]));

        assert_eq!(dimensions(&schema), vec![0, 1, 2]);
        // only two channels
        assert_eq!(colors(&schema), None);
    }

    #[test]
    fn annotated_names() {
        let field = annotate(Field::new("Green", DataType::UInt8, false));
        assert_eq!(
            field.metadata().get(PCE_COLOR_KEY).map(String::as_str),
            Some("green")
        );

        let field = annotate(Field::new("y", DataType::Float32, false));
        assert_eq!(
            field.metadata().get(PCE_DIMENSION_KEY).map(String::as_str),
            Some("2")
        );

        let field = annotate(Field::new("nx", DataType::Float32, false));
        assert!(field.metadata().is_empty());
    }

    #[test]
    fn invalid() {
        let schema: SchemaRef = Arc::new(Schema::new(vec![
            location_field("x", 1, DataType::Float64),
            location_field("y", 2, DataType::Float64),
        ]));
        assert!(matches!(
            validate(&schema),
            Err(PointCloudError::SchemaError(_))
        ));

        let schema: SchemaRef = Arc::new(Schema::new(vec![
            location_field("x", 1, DataType::Float64),
            location_field("y", 2, DataType::Float64),
            location_field("z", 3, DataType::Utf8),
        ]));
        assert!(validate(&schema).is_err());
    }
}
