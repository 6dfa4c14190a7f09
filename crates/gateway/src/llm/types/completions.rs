use serde::{Deserialize, Serialize};

/// Passthrough-preserving view of a chat completions request: just enough
/// structure to read and rewrite the routing fields, everything else rides
/// along in `rest` byte-for-byte (modulo JSON key order, which we preserve).
#[derive(Debug, Deserialize, Clone, Serialize)]
pub struct Request {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub model: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub stream: Option<bool>,
	#[serde(flatten, default)]
	pub rest: serde_json::Value,
}

// 'typed' provides a typed accessor over the full wire shape.
pub mod typed {
	use serde::{Deserialize, Serialize};
	use serde_json::Value;

	use crate::llm::types::messages::typed::CacheControlEphemeral;

	#[derive(Copy, Clone, Deserialize, Serialize, Debug, PartialEq, Eq, Default)]
	#[serde(rename_all = "snake_case")]
	pub enum Role {
		System,
		Developer,
		#[default]
		User,
		Assistant,
		Tool,
	}

	#[derive(Clone, Deserialize, Serialize, Debug, Default)]
	pub struct Request {
		#[serde(skip_serializing_if = "Option::is_none")]
		pub model: Option<String>,
		pub messages: Vec<RequestMessage>,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub stream: Option<bool>,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub stream_options: Option<Value>,
		/// Deprecated in favor of max_completion_tokens, still widely sent.
		#[serde(skip_serializing_if = "Option::is_none")]
		pub max_tokens: Option<u64>,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub max_completion_tokens: Option<u64>,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub temperature: Option<f64>,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub top_p: Option<f64>,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub n: Option<u32>,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub stop: Option<Stop>,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub tools: Option<Vec<Tool>>,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub tool_choice: Option<ToolChoiceOption>,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub parallel_tool_calls: Option<bool>,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub response_format: Option<ResponseFormat>,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub reasoning_effort: Option<ReasoningEffort>,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub user: Option<String>,

		#[serde(flatten)]
		pub vendor_extensions: RequestVendorExtensions,
	}

	/// Fields accepted on the OpenAI surface that only exist upstream:
	/// Anthropic's sampling/thinking knobs and Gemini's safety settings.
	#[derive(Clone, Deserialize, Serialize, Debug, Default)]
	pub struct RequestVendorExtensions {
		#[serde(skip_serializing_if = "Option::is_none")]
		pub top_k: Option<u64>,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub thinking_budget_tokens: Option<u64>,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub safety_settings: Option<Value>,
	}

	impl Request {
		/// The effective completion-token cap, preferring the current field
		/// over its deprecated spelling.
		pub fn max_tokens(&self) -> Option<u64> {
			self.max_completion_tokens.or(self.max_tokens)
		}

		pub fn stop_sequences(&self) -> Vec<String> {
			match &self.stop {
				None => Vec::new(),
				Some(Stop::String(s)) => vec![s.clone()],
				Some(Stop::StringArray(v)) => v.clone(),
			}
		}
	}

	#[derive(Clone, Deserialize, Serialize, Debug)]
	#[serde(untagged)]
	pub enum Stop {
		String(String),
		StringArray(Vec<String>),
	}

	#[derive(Clone, Deserialize, Serialize, Debug)]
	#[serde(tag = "role", rename_all = "snake_case")]
	pub enum RequestMessage {
		System(RequestSystemMessage),
		Developer(RequestSystemMessage),
		User(RequestUserMessage),
		Assistant(RequestAssistantMessage),
		Tool(RequestToolMessage),
	}

	#[derive(Clone, Deserialize, Serialize, Debug)]
	pub struct RequestSystemMessage {
		pub content: TextContent,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub name: Option<String>,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub cache_control: Option<CacheControlEphemeral>,
	}

	#[derive(Clone, Deserialize, Serialize, Debug)]
	pub struct RequestUserMessage {
		pub content: UserContent,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub name: Option<String>,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub cache_control: Option<CacheControlEphemeral>,
	}

	#[derive(Clone, Deserialize, Serialize, Debug, Default)]
	pub struct RequestAssistantMessage {
		#[serde(skip_serializing_if = "Option::is_none")]
		pub content: Option<AssistantContent>,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub name: Option<String>,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub tool_calls: Option<Vec<MessageToolCall>>,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub cache_control: Option<CacheControlEphemeral>,
	}

	#[derive(Clone, Deserialize, Serialize, Debug)]
	pub struct RequestToolMessage {
		pub tool_call_id: String,
		pub content: TextContent,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub cache_control: Option<CacheControlEphemeral>,
		/// Anthropic vendor extension: marks the result of a failed tool call.
		#[serde(skip_serializing_if = "Option::is_none")]
		pub is_error: Option<bool>,
	}

	/// Content that is either a bare string or an array of text parts.
	#[derive(Clone, Deserialize, Serialize, Debug)]
	#[serde(untagged)]
	pub enum TextContent {
		Text(String),
		Parts(Vec<TextContentPart>),
	}

	impl TextContent {
		pub fn into_texts(self) -> Vec<String> {
			match self {
				TextContent::Text(t) => vec![t],
				TextContent::Parts(parts) => parts.into_iter().map(|p| p.text).collect(),
			}
		}

		pub fn joined(self) -> String {
			self.into_texts().join("\n")
		}
	}

	#[derive(Clone, Deserialize, Serialize, Debug)]
	pub struct TextContentPart {
		pub text: String,
	}

	#[derive(Clone, Deserialize, Serialize, Debug)]
	#[serde(untagged)]
	pub enum UserContent {
		Text(String),
		Parts(Vec<ContentPart>),
	}

	#[derive(Clone, Deserialize, Serialize, Debug)]
	#[serde(tag = "type", rename_all = "snake_case")]
	pub enum ContentPart {
		Text {
			text: String,
		},
		ImageUrl {
			image_url: ImageUrl,
		},
		InputAudio {
			input_audio: Value,
		},
		File {
			file: FilePart,
		},
	}

	#[derive(Clone, Deserialize, Serialize, Debug)]
	pub struct ImageUrl {
		pub url: String,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub detail: Option<String>,
	}

	#[derive(Clone, Deserialize, Serialize, Debug)]
	pub struct FilePart {
		#[serde(skip_serializing_if = "Option::is_none")]
		pub file_data: Option<String>,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub file_id: Option<String>,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub filename: Option<String>,
	}

	/// Assistant content: a string, one part, or a list of parts.
	#[derive(Clone, Deserialize, Serialize, Debug)]
	#[serde(untagged)]
	pub enum AssistantContent {
		Text(String),
		Part(AssistantContentPart),
		Parts(Vec<AssistantContentPart>),
	}

	impl AssistantContent {
		pub fn into_parts(self) -> Vec<AssistantContentPart> {
			match self {
				AssistantContent::Text(t) => vec![AssistantContentPart::Text { text: t }],
				AssistantContent::Part(p) => vec![p],
				AssistantContent::Parts(parts) => parts,
			}
		}
	}

	#[derive(Clone, Deserialize, Serialize, Debug)]
	#[serde(tag = "type", rename_all = "snake_case")]
	pub enum AssistantContentPart {
		Text {
			text: String,
		},
		Refusal {
			refusal: String,
		},
		/// Thinking text with the provider's integrity signature; round-trips
		/// to Anthropic thinking blocks.
		Thinking {
			thinking: String,
			#[serde(skip_serializing_if = "Option::is_none")]
			signature: Option<String>,
		},
		RedactedThinking {
			data: String,
		},
	}

	#[derive(Clone, Deserialize, Serialize, Debug)]
	#[serde(tag = "type", rename_all = "snake_case")]
	pub enum Tool {
		Function { function: FunctionObject },
	}

	#[derive(Clone, Deserialize, Serialize, Debug)]
	pub struct FunctionObject {
		pub name: String,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub description: Option<String>,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub parameters: Option<Value>,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub strict: Option<bool>,
	}

	/// `tool_choice` is either a mode string or a named function. The mode is
	/// kept as a raw string so an unrecognized value can be reported as an
	/// invalid request instead of a parse failure.
	#[derive(Clone, Deserialize, Serialize, Debug)]
	#[serde(untagged)]
	pub enum ToolChoiceOption {
		Mode(String),
		Named(NamedToolChoice),
	}

	#[derive(Clone, Deserialize, Serialize, Debug)]
	pub struct NamedToolChoice {
		#[serde(rename = "type")]
		pub r#type: String,
		pub function: FunctionName,
	}

	#[derive(Clone, Deserialize, Serialize, Debug)]
	pub struct FunctionName {
		pub name: String,
	}

	#[derive(Clone, Deserialize, Serialize, Debug)]
	#[serde(tag = "type", rename_all = "snake_case")]
	pub enum ResponseFormat {
		Text,
		JsonObject,
		JsonSchema { json_schema: JsonSchemaFormat },
	}

	#[derive(Clone, Deserialize, Serialize, Debug)]
	pub struct JsonSchemaFormat {
		#[serde(skip_serializing_if = "Option::is_none")]
		pub name: Option<String>,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub description: Option<String>,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub schema: Option<Value>,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub strict: Option<bool>,
	}

	#[derive(Copy, Clone, Deserialize, Serialize, Debug, PartialEq, Eq)]
	#[serde(rename_all = "snake_case")]
	pub enum ReasoningEffort {
		None,
		Minimal,
		Low,
		Medium,
		High,
		Xhigh,
	}

	#[derive(Clone, Deserialize, Serialize, Debug)]
	pub struct MessageToolCall {
		pub id: String,
		#[serde(rename = "type")]
		pub r#type: FunctionType,
		pub function: FunctionCall,
	}

	#[derive(Copy, Clone, Deserialize, Serialize, Debug, Default, PartialEq, Eq)]
	#[serde(rename_all = "snake_case")]
	pub enum FunctionType {
		#[default]
		Function,
	}

	#[derive(Clone, Deserialize, Serialize, Debug)]
	pub struct FunctionCall {
		pub name: String,
		/// JSON-encoded arguments object, kept as a string per the wire.
		pub arguments: String,
	}

	// ---- responses ----

	#[derive(Clone, Deserialize, Serialize, Debug)]
	pub struct Response {
		pub id: String,
		pub object: String,
		pub created: u64,
		pub model: String,
		pub choices: Vec<ChatChoice>,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub usage: Option<Usage>,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub system_fingerprint: Option<String>,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub service_tier: Option<String>,
	}

	#[derive(Clone, Deserialize, Serialize, Debug)]
	pub struct ChatChoice {
		pub index: u32,
		pub message: ResponseMessage,
		pub finish_reason: Option<FinishReason>,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub logprobs: Option<Value>,
	}

	#[derive(Clone, Deserialize, Serialize, Debug, Default)]
	pub struct ResponseMessage {
		#[serde(default)]
		pub role: Role,
		pub content: Option<String>,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub refusal: Option<String>,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub tool_calls: Option<Vec<MessageToolCall>>,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub audio: Option<ResponseAudio>,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub reasoning_content: Option<ReasoningContent>,
	}

	#[derive(Clone, Deserialize, Serialize, Debug)]
	pub struct ResponseAudio {
		pub id: String,
		pub data: String,
		pub transcript: String,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub expires_at: Option<u64>,
	}

	/// Model reasoning attached to a message or delta. Anthropic-family
	/// responses populate `reasoning_text`/`redacted_content`; Gemini
	/// populates the flat `text`/`signature` pair.
	#[derive(Clone, Deserialize, Serialize, Debug, Default)]
	pub struct ReasoningContent {
		#[serde(skip_serializing_if = "Option::is_none")]
		pub reasoning_text: Option<ReasoningText>,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub redacted_content: Option<String>,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub text: Option<String>,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub signature: Option<String>,
	}

	impl ReasoningContent {
		pub fn is_empty(&self) -> bool {
			self.reasoning_text.is_none()
				&& self.redacted_content.is_none()
				&& self.text.is_none()
				&& self.signature.is_none()
		}
	}

	#[derive(Clone, Deserialize, Serialize, Debug)]
	pub struct ReasoningText {
		pub text: String,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub signature: Option<String>,
	}

	#[derive(Copy, Clone, Deserialize, Serialize, Debug, PartialEq, Eq)]
	#[serde(rename_all = "snake_case")]
	pub enum FinishReason {
		Stop,
		Length,
		ToolCalls,
		ContentFilter,
		FunctionCall,
	}

	#[derive(Clone, Deserialize, Serialize, Debug, Default, PartialEq, Eq)]
	pub struct Usage {
		pub prompt_tokens: u64,
		pub completion_tokens: u64,
		pub total_tokens: u64,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub prompt_tokens_details: Option<PromptTokensDetails>,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub completion_tokens_details: Option<Value>,
	}

	#[derive(Clone, Deserialize, Serialize, Debug, Default, PartialEq, Eq)]
	pub struct PromptTokensDetails {
		#[serde(skip_serializing_if = "Option::is_none")]
		pub cached_tokens: Option<u64>,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub cache_creation_tokens: Option<u64>,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub audio_tokens: Option<u64>,
	}

	// ---- streaming ----

	#[derive(Clone, Deserialize, Serialize, Debug)]
	pub struct StreamResponse {
		pub id: String,
		pub object: String,
		pub created: u64,
		pub model: String,
		pub choices: Vec<ChatChoiceStream>,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub usage: Option<Usage>,
	}

	#[derive(Clone, Deserialize, Serialize, Debug)]
	pub struct ChatChoiceStream {
		pub index: u32,
		pub delta: StreamResponseDelta,
		pub finish_reason: Option<FinishReason>,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub logprobs: Option<Value>,
	}

	#[derive(Clone, Deserialize, Serialize, Debug, Default)]
	pub struct StreamResponseDelta {
		#[serde(skip_serializing_if = "Option::is_none")]
		pub role: Option<Role>,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub content: Option<String>,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub refusal: Option<String>,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub tool_calls: Option<Vec<MessageToolCallChunk>>,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub reasoning_content: Option<ReasoningContent>,
	}

	#[derive(Clone, Deserialize, Serialize, Debug)]
	pub struct MessageToolCallChunk {
		pub index: u32,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub id: Option<String>,
		#[serde(rename = "type", skip_serializing_if = "Option::is_none")]
		pub r#type: Option<FunctionType>,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub function: Option<FunctionCallStream>,
	}

	#[derive(Clone, Deserialize, Serialize, Debug, Default)]
	pub struct FunctionCallStream {
		#[serde(skip_serializing_if = "Option::is_none")]
		pub name: Option<String>,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub arguments: Option<String>,
	}

	// ---- errors ----

	#[derive(Clone, Deserialize, Serialize, Debug)]
	pub struct ErrorResponse {
		/// Always "error" on synthesized bodies; absent on passthrough.
		#[serde(rename = "type", skip_serializing_if = "Option::is_none")]
		pub r#type: Option<String>,
		pub error: ErrorBody,
	}

	#[derive(Clone, Deserialize, Serialize, Debug)]
	pub struct ErrorBody {
		#[serde(rename = "type")]
		pub r#type: String,
		pub message: String,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub param: Option<String>,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub code: Option<String>,
	}
}
