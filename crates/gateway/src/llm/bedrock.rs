use gateway_core::prelude::Strng;
use gateway_core::strng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::llm::{AIError, escape_model};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provider {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub model: Option<Strng>, // Optional: model override for the Bedrock API path
}

impl super::Provider for Provider {
	const NAME: Strng = strng::literal!("aws.bedrock");
}

/// Body field required by Bedrock's invoke API for Anthropic-family models.
/// https://docs.aws.amazon.com/bedrock/latest/userguide/model-parameters-anthropic-claude-messages.html
pub const DEFAULT_ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";

/// Path of the invoke API for a (possibly ARN-shaped) model identifier.
/// Slashes inside the identifier are escaped so ARNs stay one path segment.
pub fn invoke_path(model: &str, streaming: bool) -> Strng {
	let model = escape_model(model);
	if streaming {
		strng::format!("/model/{model}/invoke-with-response-stream")
	} else {
		strng::format!("/model/{model}/invoke")
	}
}

/// Rewrite an Anthropic messages body for the invoke API: the model rides in
/// the path and streaming is endpoint-selected, so both fields are dropped
/// from the body, and `anthropic_version` is required.
pub fn prepare_invoke_body(body: &[u8], anthropic_version: &str) -> Result<Vec<u8>, AIError> {
	let mut map: Map<String, Value> =
		serde_json::from_slice(body).map_err(AIError::RequestMarshal)?;
	map.remove("model");
	map.remove("stream");
	map.insert(
		"anthropic_version".to_string(),
		Value::String(anthropic_version.to_string()),
	);
	serde_json::to_vec(&map).map_err(AIError::RequestMarshal)
}
