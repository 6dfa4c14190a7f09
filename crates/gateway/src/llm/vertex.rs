use gateway_core::prelude::Strng;
use gateway_core::strng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::llm::{AIError, escape_model};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provider {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub model: Option<Strng>,
}

impl super::Provider for Provider {
	const NAME: Strng = strng::literal!("gcp.vertex_ai");
}

pub const ANTHROPIC_NAME: Strng = strng::literal!("gcp.vertex_ai_anthropic");

/// Model identifiers for Anthropic-family Vertex models may arrive fully
/// qualified; the path builder wants the bare publisher model name.
pub fn anthropic_model(model: &str) -> &str {
	model
		.strip_prefix("publishers/anthropic/models/")
		.or_else(|| model.strip_prefix("anthropic/"))
		.unwrap_or(model)
}

pub fn anthropic_path(model: &str, streaming: bool) -> Strng {
	let model = escape_model(anthropic_model(model));
	let verb = if streaming {
		"streamRawPredict"
	} else {
		"rawPredict"
	};
	strng::format!("publishers/anthropic/models/{model}:{verb}")
}

pub fn gemini_path(model: &str, streaming: bool) -> Strng {
	let model = escape_model(model);
	if streaming {
		strng::format!("publishers/google/models/{model}:streamGenerateContent?alt=sse")
	} else {
		strng::format!("publishers/google/models/{model}:generateContent")
	}
}

pub fn embeddings_path(model: &str) -> Strng {
	let model = escape_model(model);
	strng::format!("publishers/google/models/{model}:predict")
}

/// Rewrite an Anthropic messages body for rawPredict: the model is path
/// material and `anthropic_version` is mandatory (there is no default the
/// way Bedrock has one; the backend must be configured with it).
pub fn prepare_anthropic_body(body: &[u8], anthropic_version: &str) -> Result<Vec<u8>, AIError> {
	let mut map: Map<String, Value> =
		serde_json::from_slice(body).map_err(AIError::RequestMarshal)?;
	map.remove("model");
	map.insert(
		"anthropic_version".to_string(),
		Value::String(anthropic_version.to_string()),
	);
	serde_json::to_vec(&map).map_err(AIError::RequestMarshal)
}
