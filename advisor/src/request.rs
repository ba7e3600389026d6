use serde::{Deserialize, Serialize};

/// What the advisor is told about a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSummary {
    pub name: String,

    pub area_acres: f64,

    /// NDVI in [-1, 1]; serialized as `null` when unknown.
    pub ndvi_score: Option<f64>,

    /// 7-day precipitation (mm).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precipitation: Option<f64>,

    /// Soil moisture (%).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soil_moisture: Option<f64>,

    /// Surface temperature (°F).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

impl FieldSummary {
    /// Placeholder field used for free-form questions.
    pub fn general_query() -> Self {
        Self {
            name: "General Query".to_string(),
            area_acres: 0.0,
            ndvi_score: None,
            precipitation: None,
            soil_moisture: None,
            temperature: None,
        }
    }
}

/// Current conditions at the field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    /// °F
    pub temperature: f64,
    /// %
    pub humidity: f64,
    /// mm
    pub precipitation: f64,
    /// mph
    pub wind_speed: f64,
    pub conditions: String,
}

/// Body POSTed to the advisor proxy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdviceRequest {
    pub field: FieldSummary,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather: Option<WeatherSnapshot>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

impl AdviceRequest {
    pub fn for_field(field: FieldSummary) -> Self {
        Self {
            field,
            weather: None,
            query: None,
        }
    }

    /// A free-form question not tied to a drawn field.
    pub fn question(query: impl Into<String>) -> Self {
        Self {
            field: FieldSummary::general_query(),
            weather: None,
            query: Some(query.into()),
        }
    }

    #[must_use]
    pub fn weather(mut self, weather: WeatherSnapshot) -> Self {
        self.weather = Some(weather);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{AdviceRequest, FieldSummary};
    use serde_json::json;

    #[test]
    fn test_question_body() {
        let body = serde_json::to_value(AdviceRequest::question("When to plant?")).unwrap();
        assert_eq!(
            body,
            json!({
                "field": {"name": "General Query", "area_acres": 0.0, "ndvi_score": null},
                "query": "When to plant?"
            })
        );
    }

    #[test]
    fn test_field_round_trip_from_dashboard_json() {
        let field: FieldSummary = serde_json::from_value(json!({
            "name": "North Forty",
            "area_acres": 231.08,
            "ndvi_score": 0.72,
            "soil_moisture": 41.0
        }))
        .unwrap();
        assert_eq!(field.soil_moisture, Some(41.0));
        assert_eq!(field.precipitation, None);
        let body = serde_json::to_value(AdviceRequest::for_field(field)).unwrap();
        assert!(body["field"].get("precipitation").is_none());
        assert_eq!(body["field"]["soil_moisture"], 41.0);
    }
}
