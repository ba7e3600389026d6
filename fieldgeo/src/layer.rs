//! User-supplied overlay layers.
//!
//! A layer is loaded from a GeoJSON file (a `Feature` or
//! `FeatureCollection`) or from a CSV file of point rows with latitude
//! and longitude columns. Either way the result is a
//! `FeatureCollection` ready to be drawn over the field map.

use crate::{FieldGeoError, C};
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, JsonObject, Value};
use log::debug;
use serde::Serialize;
use std::path::Path;

/// Display colors, assigned round-robin by layer index.
pub const LAYER_COLORS: [&str; 6] = [
    "#ef4444", "#3b82f6", "#22c55e", "#f59e0b", "#8b5cf6", "#ec4899",
];

const LAT_COLUMNS: [&str; 3] = ["lat", "latitude", "y"];
const LNG_COLUMNS: [&str; 4] = ["lng", "lon", "longitude", "x"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    GeoJson,
    Csv,
}

impl LayerKind {
    /// Infers the layer kind from a file extension.
    pub fn from_path(path: &Path) -> Result<Self, FieldGeoError> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("geojson" | "json") => Ok(Self::GeoJson),
            Some("csv") => Ok(Self::Csv),
            _ => Err(FieldGeoError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomLayer {
    pub name: String,
    pub kind: LayerKind,
    pub color: &'static str,
    pub collection: FeatureCollection,
}

impl CustomLayer {
    /// Loads the layer at `path`. `index` is the layer's position in
    /// the layer list and only picks its color.
    pub fn load(path: &Path, index: usize) -> Result<Self, FieldGeoError> {
        let kind = LayerKind::from_path(path)?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let content = std::fs::read_to_string(path)?;
        Self::parse(name, kind, &content, index)
    }

    pub fn parse(
        name: String,
        kind: LayerKind,
        content: &str,
        index: usize,
    ) -> Result<Self, FieldGeoError> {
        let collection = match kind {
            LayerKind::GeoJson => parse_geojson(content)?,
            LayerKind::Csv => parse_csv(content)?,
        };
        debug!(
            "layer; name: {name}, kind: {kind:?}, features: {}",
            collection.features.len()
        );
        Ok(Self {
            name,
            kind,
            color: LAYER_COLORS[index % LAYER_COLORS.len()],
            collection,
        })
    }
}

fn parse_geojson(content: &str) -> Result<FeatureCollection, FieldGeoError> {
    match content.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(collection) => Ok(collection),
        GeoJson::Feature(feature) => Ok(FeatureCollection {
            bbox: None,
            features: vec![feature],
            foreign_members: None,
        }),
        GeoJson::Geometry(_) => Err(FieldGeoError::NotACollection),
    }
}

fn parse_csv(content: &str) -> Result<FeatureCollection, FieldGeoError> {
    let mut reader = csv::Reader::from_reader(content.as_bytes());
    let headers = reader.headers()?.clone();

    let find_column = |names: &[&str]| {
        headers
            .iter()
            .position(|h| names.iter().any(|name| h.eq_ignore_ascii_case(name)))
    };
    let (Some(lat_idx), Some(lng_idx)) = (
        find_column(&LAT_COLUMNS[..]),
        find_column(&LNG_COLUMNS[..]),
    ) else {
        return Err(FieldGeoError::MissingCoordinateColumns);
    };

    let mut features = Vec::new();
    for record in reader.records() {
        let record = record?;
        let (Some(lat), Some(lng)) = (
            record.get(lat_idx).and_then(parse_degrees),
            record.get(lng_idx).and_then(parse_degrees),
        ) else {
            continue;
        };

        let properties: JsonObject = headers
            .iter()
            .zip(record.iter())
            .map(|(key, val)| (key.to_string(), val.into()))
            .collect();

        features.push(Feature {
            bbox: None,
            geometry: Some(Geometry::new(Value::Point(vec![lng, lat]))),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        });
    }

    Ok(FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    })
}

fn parse_degrees(field: &str) -> Option<C> {
    field.trim().parse::<C>().ok().filter(|deg| !deg.is_nan())
}

#[cfg(test)]
mod tests {
    use super::{CustomLayer, LayerKind, LAYER_COLORS};
    use crate::FieldGeoError;
    use geojson::Value;
    use std::path::Path;

    #[test]
    fn test_kind_from_path() {
        assert_eq!(
            LayerKind::from_path(Path::new("soil.GeoJSON")).unwrap(),
            LayerKind::GeoJson
        );
        assert_eq!(
            LayerKind::from_path(Path::new("soil.json")).unwrap(),
            LayerKind::GeoJson
        );
        assert_eq!(
            LayerKind::from_path(Path::new("probes.csv")).unwrap(),
            LayerKind::Csv
        );
        assert!(matches!(
            LayerKind::from_path(Path::new("map.kml")),
            Err(FieldGeoError::UnsupportedFormat(_))
        ));
        assert!(LayerKind::from_path(Path::new("README")).is_err());
    }

    #[test]
    fn test_csv_points() {
        let csv = "Name,Latitude,LON\nwell,41.5,-93.1\nbroken,north,-93.2\n\npump,41.6,-93.3\n";
        let layer = CustomLayer::parse("probes".into(), LayerKind::Csv, csv, 7).unwrap();
        assert_eq!(layer.color, LAYER_COLORS[1]);
        assert_eq!(layer.collection.features.len(), 2);

        let first = &layer.collection.features[0];
        let geometry = first.geometry.as_ref().unwrap();
        assert_eq!(geometry.value, Value::Point(vec![-93.1, 41.5]));
        let props = first.properties.as_ref().unwrap();
        assert_eq!(props["Name"], "well");
        assert_eq!(props["Latitude"], "41.5");
    }

    #[test]
    fn test_csv_missing_columns() {
        let csv = "name,elevation\nwell,300\n";
        assert!(matches!(
            CustomLayer::parse("x".into(), LayerKind::Csv, csv, 0),
            Err(FieldGeoError::MissingCoordinateColumns)
        ));
    }

    #[test]
    fn test_single_feature_is_wrapped() {
        let json = r#"{
            "type": "Feature",
            "geometry": {"type": "Point", "coordinates": [-93.0, 41.0]},
            "properties": {"name": "gate"}
        }"#;
        let layer = CustomLayer::parse("gate".into(), LayerKind::GeoJson, json, 0).unwrap();
        assert_eq!(layer.color, LAYER_COLORS[0]);
        assert_eq!(layer.collection.features.len(), 1);
    }

    #[test]
    fn test_bare_geometry_rejected() {
        let json = r#"{"type": "Point", "coordinates": [-93.0, 41.0]}"#;
        assert!(matches!(
            CustomLayer::parse("pt".into(), LayerKind::GeoJson, json, 0),
            Err(FieldGeoError::NotACollection)
        ));
    }

    #[test]
    fn test_malformed_geojson() {
        assert!(matches!(
            CustomLayer::parse("bad".into(), LayerKind::GeoJson, "{not json", 0),
            Err(FieldGeoError::GeoJson(_))
        ));
    }
}
