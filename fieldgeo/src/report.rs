//! Per-field acreage and health summaries.

use crate::{health::VegetationHealth, math::area_acres, FieldGeoError, C};
use geo::geometry::Coord;
use serde::{Deserialize, Serialize};
use std::io::Write;

/// A named field boundary as persisted by the dashboard.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FieldRecord {
    pub name: String,

    /// Boundary vertices as `[longitude, latitude]`, GeoJSON order.
    pub coordinates: Vec<[C; 2]>,

    #[serde(default)]
    pub ndvi_score: Option<C>,
}

impl FieldRecord {
    pub fn ring(&self) -> Vec<Coord<C>> {
        self.coordinates
            .iter()
            .map(|&[x, y]| Coord { x, y })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldRow {
    pub name: String,
    pub area_acres: C,
    pub ndvi_score: Option<C>,
    pub health: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldReport {
    pub fields: Vec<FieldRow>,
    pub total_fields: usize,

    /// Sum of per-field acreage, rounded to two decimal places.
    pub total_acres: C,
}

impl FieldReport {
    pub fn from_records(records: &[FieldRecord]) -> Self {
        let fields: Vec<FieldRow> = records
            .iter()
            .map(|record| FieldRow {
                name: record.name.clone(),
                area_acres: area_acres(&record.ring()),
                ndvi_score: record.ndvi_score,
                health: VegetationHealth::from_score(record.ndvi_score).label(),
            })
            .collect();
        let total_acres = fields.iter().map(|row| row.area_acres).sum::<C>();
        Self {
            total_fields: fields.len(),
            total_acres: (total_acres * 100.0).round() / 100.0,
            fields,
        }
    }

    /// Writes one `name,area_acres,ndvi_score,health` row per field.
    pub fn write_csv<W: Write>(&self, out: W) -> Result<(), FieldGeoError> {
        let mut writer = csv::Writer::from_writer(out);
        for row in &self.fields {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{FieldRecord, FieldReport};
    use approx::assert_relative_eq;

    fn records() -> Vec<FieldRecord> {
        serde_json::from_str(
            r#"[
                {
                    "name": "North Forty",
                    "coordinates": [[-93.0, 41.0], [-92.99, 41.0], [-92.99, 41.01], [-93.0, 41.01]],
                    "ndvi_score": 0.72
                },
                {
                    "name": "Creek Bottom",
                    "coordinates": [[0.0, 0.0], [0.01, 0.0], [0.0, 0.01]]
                }
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn test_report() {
        let report = FieldReport::from_records(&records());
        assert_eq!(report.total_fields, 2);
        assert_relative_eq!(report.fields[0].area_acres, 231.08);
        assert_eq!(report.fields[0].health, "Healthy");
        assert_eq!(report.fields[1].ndvi_score, None);
        assert_eq!(report.fields[1].health, "No data");
        assert_relative_eq!(report.total_acres, 384.19);
    }

    #[test]
    fn test_csv() {
        let report = FieldReport::from_records(&records());
        let mut out = Vec::new();
        report.write_csv(&mut out).unwrap();
        let csv = String::from_utf8(out).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("name,area_acres,ndvi_score,health"));
        assert_eq!(lines.next(), Some("North Forty,231.08,0.72,Healthy"));
        assert_eq!(lines.next(), Some("Creek Bottom,153.11,,No data"));
        assert_eq!(lines.next(), None);
    }
}
