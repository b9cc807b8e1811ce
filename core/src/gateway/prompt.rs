use crate::model::{Incident, SensorData};
use serde_json::{json, Value};

pub const IDENTITY_INSTRUCTION: &str = "Extract the following details from this National ID card: \
Full Name, ID Number, Address. If a field is not visible, use empty string.";

/// Prompt for the strategic risk summary.
pub fn risk_prompt(sensors: &[SensorData], incidents: &[Incident]) -> serde_json::Result<String> {
    let sensors = serde_json::to_string(sensors)?;
    let incidents = serde_json::to_string(incidents)?;
    Ok(format!(
        "Act as a National Disaster Command Center AI Analyst.\n\
         Analyze the following sensor data and active incidents:\n\n\
         Sensors: {sensors}\n\
         Incidents: {incidents}\n\n\
         Provide a concise strategic summary (max 3 sentences) focusing on immediate risks \
         and recommended actions."
    ))
}

/// Response shape requested from the extraction call.
pub fn identity_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "fullName": { "type": "STRING" },
            "nationalId": { "type": "STRING" },
            "address": { "type": "STRING" }
        }
    })
}
