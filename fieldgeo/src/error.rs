use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FieldGeoError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("invalid geojson, {0}")]
    GeoJson(#[from] geojson::Error),

    #[error("invalid csv, {0}")]
    Csv(#[from] csv::Error),

    #[error("geojson must be a Feature or FeatureCollection")]
    NotACollection,

    #[error("csv must have latitude and longitude columns")]
    MissingCoordinateColumns,

    #[error("unsupported layer file {0}, use GeoJSON or CSV")]
    UnsupportedFormat(PathBuf),
}
