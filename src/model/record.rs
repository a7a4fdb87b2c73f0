//! Per-image annotation records.

use serde::{Deserialize, Deserializer, Serialize};

use super::Shape;

/// Ordered shapes belonging to one image. Later shapes are drawn on top.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageAnnotations {
    #[serde(default, deserialize_with = "lenient_shapes")]
    pub annotations: Vec<Shape>,
}

impl ImageAnnotations {
    pub fn new(annotations: Vec<Shape>) -> Self {
        Self { annotations }
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }
}

/// Deserialize `null` as the type's default value.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Read the shapes of one record, skipping the ones that cannot be read.
///
/// A single unreadable shape must not cost the record its other shapes;
/// anything that is not an array reads as no shapes.
fn lenient_shapes<'de, D>(deserializer: D) -> Result<Vec<Shape>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let Some(serde_json::Value::Array(items)) = value else {
        return Ok(Vec::new());
    };

    Ok(items
        .into_iter()
        .enumerate()
        .filter_map(|(i, item)| match serde_json::from_value(item) {
            Ok(shape) => Some(shape),
            Err(e) => {
                log::warn!("Discarding malformed shape {}: {}", i, e);
                None
            }
        })
        .collect())
}

/// Read a prior annotation sequence leniently.
///
/// Anything that is not an array yields `None` (the caller then starts from
/// empty records). Array elements that are not valid records become empty
/// records so the index alignment with the image list survives.
pub(crate) fn lenient_records<'de, D>(
    deserializer: D,
) -> Result<Option<Vec<ImageAnnotations>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let Some(serde_json::Value::Array(items)) = value else {
        return Ok(None);
    };

    let records = items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            serde_json::from_value(item).unwrap_or_else(|e| {
                log::warn!("Discarding malformed annotation record {}: {}", i, e);
                ImageAnnotations::default()
            })
        })
        .collect();

    Ok(Some(records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use toothmark_canvas::Color;

    #[test]
    fn test_bad_shape_does_not_drop_record() {
        let json = r##"{"annotations": [
            {"type":"rectangle","x":1,"y":2,"width":30,"height":40,"color":"#532E5E"},
            {"type":"rectangle","x":5,"y":6,"width":30,"height":40,"color":"red"},
            {"type":"circle","x":5,"y":6,"r":3,"color":"#532E5E"},
            {"type":"rectangle","x":"oops"}
        ]}"##;
        let record: ImageAnnotations = serde_json::from_str(json).unwrap();
        assert_eq!(record.len(), 2);
        assert_eq!(*record.annotations[0].color(), Color::rgb(0x53, 0x2E, 0x5E));
        assert_eq!(record.annotations[1].color().raw(), "red");

        let back = serde_json::to_value(&record).unwrap();
        assert_eq!(back["annotations"][1]["color"], "red");
    }

    #[test]
    fn test_null_and_non_array_shapes() {
        let record: ImageAnnotations = serde_json::from_str(r#"{"annotations": null}"#).unwrap();
        assert!(record.is_empty());
        let record: ImageAnnotations = serde_json::from_str(r#"{"annotations": 3}"#).unwrap();
        assert!(record.is_empty());
        let record: ImageAnnotations = serde_json::from_str("{}").unwrap();
        assert!(record.is_empty());
    }
}
