use serde::{Deserialize, Serialize};

/// Passthrough-preserving view of an OpenAI images/generations request.
#[derive(Debug, Deserialize, Clone, Serialize)]
pub struct Request {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub model: Option<String>,
	#[serde(flatten, default)]
	pub rest: serde_json::Value,
}

/// The slice of an image generation response we read. Only token-billed
/// models report usage; the rest omit it.
#[derive(Debug, Deserialize, Clone)]
pub struct Response {
	#[serde(default)]
	pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Usage {
	#[serde(default)]
	pub input_tokens: u64,
	#[serde(default)]
	pub output_tokens: u64,
	#[serde(default)]
	pub total_tokens: u64,
}
