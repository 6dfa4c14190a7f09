use serde::{Deserialize, Serialize};

/// Passthrough-preserving view of an OpenAI audio/speech request. The
/// response is audio bytes, not JSON; only the request is ever parsed.
#[derive(Debug, Deserialize, Clone, Serialize)]
pub struct Request {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub model: Option<String>,
	/// "sse" selects a streamed response; anything else (or absent) is a
	/// single audio body.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub stream_format: Option<String>,
	#[serde(flatten, default)]
	pub rest: serde_json::Value,
}

impl Request {
	pub fn streaming(&self) -> bool {
		self.stream_format.as_deref() == Some("sse")
	}
}
