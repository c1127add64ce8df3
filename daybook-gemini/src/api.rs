//! Wire types for the `generateContent` endpoint.

use daybook_core::{DaybookError, DaybookResult, ProposedEvent};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

impl GenerateRequest {
    pub fn from_prompt(prompt: String) -> Self {
        GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.7,
                max_output_tokens: 2048,
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<Content>,
}

impl GenerateResponse {
    /// Text of the first part of the first candidate.
    pub fn text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()
            .map(|p| p.text.as_str())
    }
}

/// Slice from the first `[` to the last `]`, which strips code fences and
/// chatter around the array.
pub fn extract_json_array(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    (end > start).then(|| &text[start..=end])
}

pub fn parse_proposals(text: &str) -> DaybookResult<Vec<ProposedEvent>> {
    let json = extract_json_array(text).ok_or_else(|| {
        DaybookError::Scheduler("Could not parse Gemini response as JSON".into())
    })?;
    serde_json::from_str(json)
        .map_err(|e| DaybookError::Scheduler(format!("Could not parse Gemini response as JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let value = serde_json::to_value(GenerateRequest::from_prompt("hi".into())).unwrap();
        assert_eq!(value["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(value["generationConfig"]["maxOutputTokens"], 2048);
        assert!((value["generationConfig"]["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_response_text() {
        let response: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"[]"}],"role":"model"}}]}"#,
        )
        .unwrap();
        assert_eq!(response.text(), Some("[]"));

        let empty: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.text(), None);
    }

    #[test]
    fn test_extract_json_from_chatty_reply() {
        let reply = "Sure! Here is your plan:\n```json\n[{\"title\": \"A [draft]\"}]\n```\nGood luck.";
        assert_eq!(extract_json_array(reply), Some("[{\"title\": \"A [draft]\"}]"));
        assert_eq!(extract_json_array("no array here"), None);
        assert_eq!(extract_json_array("] backwards ["), None);
    }

    #[test]
    fn test_parse_proposals() {
        let reply = r#"```json
[
  {"title": "Thesis - Part 1", "description": "Outline", "date": "2026-02-11",
   "startTime": "09:00", "endTime": "11:00", "taskId": "t1"}
]
```"#;
        let proposals = parse_proposals(reply).unwrap();
        assert_eq!(proposals.len(), 1);
        assert_eq!(proposals[0].task_id.as_deref(), Some("t1"));

        assert!(matches!(parse_proposals("nothing"), Err(DaybookError::Scheduler(_))));
        assert!(matches!(parse_proposals("[{\"title\": 1}]"), Err(DaybookError::Scheduler(_))));
    }
}
