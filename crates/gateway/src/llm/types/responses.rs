use serde::{Deserialize, Serialize};

/// Passthrough-preserving view of an OpenAI Responses API request.
#[derive(Debug, Deserialize, Clone, Serialize)]
pub struct Request {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub model: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub stream: Option<bool>,
	#[serde(flatten, default)]
	pub rest: serde_json::Value,
}

/// The slice of a Responses API response we read: usage and model.
#[derive(Debug, Deserialize, Clone, Serialize)]
pub struct Response {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub model: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub usage: Option<Usage>,
	#[serde(flatten, default)]
	pub rest: serde_json::Value,
}

#[derive(Debug, Deserialize, Clone, Serialize, Default)]
pub struct Usage {
	#[serde(default)]
	pub input_tokens: u64,
	#[serde(default)]
	pub output_tokens: u64,
	#[serde(default)]
	pub total_tokens: u64,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub input_tokens_details: Option<InputTokensDetails>,
	#[serde(flatten, default)]
	pub rest: serde_json::Value,
}

#[derive(Debug, Deserialize, Clone, Serialize, Default)]
pub struct InputTokensDetails {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub cached_tokens: Option<u64>,
	#[serde(flatten, default)]
	pub rest: serde_json::Value,
}

/// Streamed Responses API events carry the terminal usage on
/// `response.completed`; we only look at that envelope.
#[derive(Debug, Deserialize, Clone)]
pub struct StreamEvent {
	#[serde(rename = "type")]
	pub r#type: String,
	#[serde(default)]
	pub response: Option<Response>,
}
