use serde::{Deserialize, Serialize};

use crate::domain::{PersonalityMode, Scenario};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub themes: String,
}

/// Body of `POST /generate`. A handled backend failure arrives as a 2xx with
/// only `error` set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub situation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choice1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choice2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GenerateResponse {
    pub fn scenario(&self) -> Option<Scenario> {
        Scenario::well_formed(
            self.situation.as_deref()?,
            self.choice1.as_deref()?,
            self.choice2.as_deref()?,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub themes: String,
    pub choices: Vec<String>,
    pub avoided: Vec<String>,
    #[serde(rename = "personalityMode")]
    pub personality_mode: PersonalityMode,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveResponseRequest {
    pub theme: String,
    pub analysis: String,
    pub personality_mode: PersonalityMode,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analyze_request_uses_camel_case_mode_key() {
        let request = AnalyzeRequest {
            themes: "space".to_string(),
            choices: vec!["Investigate".to_string()],
            avoided: vec!["Evacuate".to_string()],
            personality_mode: PersonalityMode::Nice,
        };
        let value = serde_json::to_value(&request).expect("json");
        assert_eq!(value["personalityMode"], "nice");
        assert_eq!(value["avoided"][0], "Evacuate");
    }

    #[test]
    fn save_request_uses_snake_case_mode_key() {
        let request = SaveResponseRequest {
            theme: "space".to_string(),
            analysis: "You are decisive.".to_string(),
            personality_mode: PersonalityMode::Mean,
        };
        let value = serde_json::to_value(&request).expect("json");
        assert_eq!(value["personality_mode"], "mean");
    }

    #[test]
    fn error_payload_yields_no_scenario() {
        let response: GenerateResponse =
            serde_json::from_str(r#"{"error":"model overloaded"}"#).expect("json");
        assert!(response.scenario().is_none());
        assert_eq!(response.error.as_deref(), Some("model overloaded"));
    }
}
