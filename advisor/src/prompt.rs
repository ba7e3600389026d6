//! Chat-completion request rendering for talking to a gateway directly.
//!
//! The hosted advisor proxy does this server side; these routines let
//! the client address an OpenAI-compatible gateway without it.

use crate::request::AdviceRequest;
use serde::Serialize;

pub const SYSTEM_PROMPT: &str = "\
You are a rural agronomy advisor with practical expertise in:
- Crop health assessment using NDVI (Normalized Difference Vegetation Index)
- The effect of weather on field operations
- Irrigation and soil management
- Pest and disease prevention
- Sustainable farming practices

Analyze the field data you are given and give concrete, actionable advice.
Format the answer in markdown with these sections:
- **Health Status**: a one line assessment
- **Key Observations**: what the data shows
- **Recommendations**: specific actions to take
- **Weather Considerations**: how current conditions affect the field

Stay under 300 words. Be encouraging but honest about concerns.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

/// Streaming chat-completion request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
}

impl<'a> CompletionRequest<'a> {
    pub fn new(model: &'a str, request: &AdviceRequest) -> Self {
        Self {
            model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: field_brief(request),
                },
            ],
            stream: true,
        }
    }
}

/// Renders the user message describing the field, its surroundings,
/// and the user's question if there is one.
pub fn field_brief(request: &AdviceRequest) -> String {
    let AdviceRequest {
        field,
        weather,
        query,
    } = request;

    let mut lines = vec![
        format!("Field: {}", field.name),
        format!("Area: {} acres", field.area_acres),
        match field.ndvi_score {
            Some(ndvi) => format!("NDVI Score: {ndvi:.2}"),
            None => "NDVI Score: Not available".to_string(),
        },
    ];
    if let Some(precipitation) = field.precipitation {
        lines.push(format!("Precipitation (7-day): {precipitation} mm"));
    }
    if let Some(soil_moisture) = field.soil_moisture {
        lines.push(format!("Soil Moisture: {soil_moisture}%"));
    }
    if let Some(temperature) = field.temperature {
        lines.push(format!("Surface Temperature: {temperature}°F"));
    }

    if let Some(weather) = weather {
        lines.push(String::new());
        lines.push("Current Weather:".to_string());
        lines.push(format!("- Temperature: {}°F", weather.temperature));
        lines.push(format!("- Humidity: {}%", weather.humidity));
        lines.push(format!("- Conditions: {}", weather.conditions));
        lines.push(format!("- Wind Speed: {} mph", weather.wind_speed));
        lines.push(format!("- Recent Precipitation: {} mm", weather.precipitation));
    }

    if let Some(query) = query {
        lines.push(String::new());
        lines.push(format!("Question: {query}"));
    }

    let mut brief = lines.join("\n");
    brief.push('\n');
    brief.push_str("\nPlease analyze this agricultural field and provide recommendations.");
    brief
}
