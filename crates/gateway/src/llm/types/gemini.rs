use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Gemini generateContent request.
/// https://cloud.google.com/vertex-ai/generative-ai/docs/model-reference/inference
#[derive(Clone, Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
	pub contents: Vec<Content>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub tools: Option<Vec<Tool>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub tool_config: Option<ToolConfig>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub generation_config: Option<GenerationConfig>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub system_instruction: Option<Content>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub safety_settings: Option<Value>,
}

#[derive(Clone, Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct Content {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub role: Option<String>,
	#[serde(default)]
	pub parts: Vec<Part>,
}

/// A single content part. Exactly one of the data fields is set; `thought`
/// and `thought_signature` qualify whichever it is.
#[derive(Clone, Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct Part {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub text: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub function_call: Option<FunctionCall>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub function_response: Option<FunctionResponse>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub inline_data: Option<Blob>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub file_data: Option<FileData>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub thought: Option<bool>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub thought_signature: Option<String>,
}

impl Part {
	pub fn text(text: String) -> Self {
		Part {
			text: Some(text),
			..Default::default()
		}
	}

	pub fn is_thought(&self) -> bool {
		self.thought.unwrap_or(false)
	}
}

#[derive(Clone, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct FunctionCall {
	pub name: String,
	#[serde(default)]
	pub args: Value,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct FunctionResponse {
	pub name: String,
	pub response: Value,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Blob {
	pub mime_type: String,
	pub data: String,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct FileData {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub mime_type: Option<String>,
	pub file_uri: String,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
	pub function_declarations: Vec<FunctionDeclaration>,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDeclaration {
	pub name: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub parameters: Option<Value>,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ToolConfig {
	pub function_calling_config: FunctionCallingConfig,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct FunctionCallingConfig {
	pub mode: FunctionCallingMode,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub allowed_function_names: Option<Vec<String>>,
}

#[derive(Copy, Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FunctionCallingMode {
	Auto,
	Any,
	None,
}

#[derive(Clone, Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub temperature: Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub top_p: Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub top_k: Option<u64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub max_output_tokens: Option<u64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub candidate_count: Option<u32>,
	#[serde(skip_serializing_if = "Vec::is_empty", default)]
	pub stop_sequences: Vec<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub response_mime_type: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub response_schema: Option<Value>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub thinking_config: Option<ThinkingConfig>,
}

#[derive(Clone, Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ThinkingConfig {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub include_thoughts: Option<bool>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub thinking_budget: Option<u64>,
}

/// Response / stream chunk. Streaming sends this same shape per line.
#[derive(Clone, Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
	#[serde(default)]
	pub candidates: Vec<Candidate>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub usage_metadata: Option<UsageMetadata>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub model_version: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub response_id: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub create_time: Option<String>,
}

#[derive(Clone, Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub content: Option<Content>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub finish_reason: Option<FinishReason>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub index: Option<u32>,
}

#[derive(Copy, Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FinishReason {
	Stop,
	MaxTokens,
	Safety,
	Recitation,
	Blocklist,
	ProhibitedContent,
	Spii,
	MalformedFunctionCall,
	ImageSafety,
	// New reasons appear as the API evolves; treat them as a plain stop.
	#[serde(other)]
	Other,
}

#[derive(Copy, Clone, Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
	#[serde(default)]
	pub prompt_token_count: u64,
	#[serde(default)]
	pub candidates_token_count: u64,
	#[serde(default)]
	pub total_token_count: u64,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub cached_content_token_count: Option<u64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub thoughts_token_count: Option<u64>,
}

/// Vertex error envelope.
/// https://cloud.google.com/apis/design/errors
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
	pub error: ErrorBody,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct ErrorBody {
	#[serde(default)]
	pub code: u32,
	pub message: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub status: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<Value>,
}
