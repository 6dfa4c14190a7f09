use serde::{Deserialize, Serialize};

/// Passthrough-preserving view of an Anthropic messages request. Only the
/// routing fields are typed; everything else survives in `rest`.
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

	use crate::serdes::is_default;

	#[derive(Copy, Clone, Deserialize, Serialize, Debug, PartialEq, Eq, Default)]
	#[serde(rename_all = "snake_case")]
	pub enum Role {
		#[default]
		User,
		Assistant,
	}

	#[derive(Clone, Deserialize, Serialize, Debug, PartialEq, Eq)]
	#[serde(rename_all = "snake_case", tag = "type")]
	pub enum CacheControlEphemeral {
		Ephemeral {
			#[serde(default, skip_serializing_if = "Option::is_none")]
			ttl: Option<String>,
		},
	}

	/// Source of binary content: inline base64 or a fetchable URL.
	#[derive(Clone, Deserialize, Serialize, Debug)]
	#[serde(rename_all = "snake_case", tag = "type")]
	pub enum MediaSource {
		Base64 { media_type: String, data: String },
		Url { url: String },
	}

	#[derive(Clone, Deserialize, Serialize, Debug)]
	#[serde(rename_all = "snake_case")]
	pub struct ContentTextBlock {
		pub text: String,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub citations: Option<Value>,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub cache_control: Option<CacheControlEphemeral>,
	}

	impl From<String> for ContentTextBlock {
		fn from(text: String) -> Self {
			ContentTextBlock {
				text,
				citations: None,
				cache_control: None,
			}
		}
	}

	#[derive(Clone, Deserialize, Serialize, Debug)]
	#[serde(rename_all = "snake_case", tag = "type")]
	pub enum ContentBlock {
		Text(ContentTextBlock),
		Image {
			source: MediaSource,
			#[serde(skip_serializing_if = "Option::is_none")]
			cache_control: Option<CacheControlEphemeral>,
		},
		Document {
			source: MediaSource,
			#[serde(skip_serializing_if = "Option::is_none")]
			cache_control: Option<CacheControlEphemeral>,
		},
		Thinking {
			thinking: String,
			#[serde(default)]
			signature: String,
		},
		RedactedThinking {
			data: String,
		},
		ToolUse {
			id: String,
			name: String,
			input: Value,
			#[serde(skip_serializing_if = "Option::is_none")]
			cache_control: Option<CacheControlEphemeral>,
		},
		ToolResult {
			tool_use_id: String,
			content: ToolResultContent,
			#[serde(skip_serializing_if = "Option::is_none")]
			cache_control: Option<CacheControlEphemeral>,
			#[serde(skip_serializing_if = "Option::is_none")]
			is_error: Option<bool>,
		},
		ServerToolUse {
			id: String,
			name: String,
			input: Value,
			#[serde(skip_serializing_if = "Option::is_none")]
			cache_control: Option<CacheControlEphemeral>,
		},
		// There are LOTs of possible values; since we don't support them all,
		// just allow them without failing
		#[serde(other)]
		Unknown,
	}

	#[derive(Clone, Deserialize, Serialize, Debug)]
	#[serde(untagged)]
	pub enum ToolResultContent {
		/// The text contents of the tool result.
		Text(String),
		/// An array of content parts with a defined type.
		Array(Vec<ToolResultContentPart>),
	}

	#[derive(Clone, Deserialize, Serialize, Debug)]
	#[serde(tag = "type", rename_all = "snake_case")]
	pub enum ToolResultContentPart {
		Text {
			text: String,
			#[serde(skip_serializing_if = "Option::is_none")]
			cache_control: Option<CacheControlEphemeral>,
		},
		Image {
			source: Value,
			#[serde(skip_serializing_if = "Option::is_none")]
			cache_control: Option<CacheControlEphemeral>,
		},
	}

	#[derive(Clone, Deserialize, Serialize, Debug)]
	#[serde(rename_all = "snake_case")]
	pub struct Message {
		pub role: Role,
		pub content: Vec<ContentBlock>,
	}

	/// System prompt format - either a simple string or an array of blocks.
	#[derive(Clone, Deserialize, Serialize, Debug)]
	#[serde(untagged)]
	pub enum SystemPrompt {
		Text(String),
		Blocks(Vec<SystemContentBlock>),
	}

	#[derive(Clone, Deserialize, Serialize, Debug)]
	#[serde(tag = "type", rename_all = "snake_case")]
	pub enum SystemContentBlock {
		Text {
			text: String,
			#[serde(skip_serializing_if = "Option::is_none")]
			cache_control: Option<CacheControlEphemeral>,
		},
	}

	#[derive(Clone, Deserialize, Serialize, Debug, Default)]
	pub struct Request {
		/// The User/Assistant turns.
		pub messages: Vec<Message>,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub system: Option<SystemPrompt>,
		/// The model to use. Dropped from the body for providers that route
		/// the model through the path.
		#[serde(skip_serializing_if = "Option::is_none")]
		pub model: Option<String>,
		/// The maximum number of tokens to generate before stopping.
		pub max_tokens: u64,
		#[serde(default, skip_serializing_if = "Vec::is_empty")]
		pub stop_sequences: Vec<String>,
		#[serde(default, skip_serializing_if = "is_default")]
		pub stream: bool,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub temperature: Option<f64>,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub top_p: Option<f64>,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub top_k: Option<u64>,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub tools: Option<Vec<Tool>>,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub tool_choice: Option<ToolChoice>,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub metadata: Option<Metadata>,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub thinking: Option<ThinkingInput>,
		/// Structured-output constraint; only models that understand it get
		/// this field.
		#[serde(skip_serializing_if = "Option::is_none")]
		pub output_config: Option<Value>,
	}

	#[derive(Clone, Serialize, Deserialize, Debug, Eq, PartialEq)]
	#[serde(rename_all = "snake_case", tag = "type")]
	pub enum ThinkingInput {
		Enabled { budget_tokens: u64 },
		Disabled {},
	}

	/// Tool definition
	#[derive(Clone, Serialize, Deserialize, Debug)]
	pub struct Tool {
		pub name: String,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub description: Option<String>,
		/// JSON schema for tool input
		pub input_schema: Value,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub cache_control: Option<CacheControlEphemeral>,
	}

	/// Tool choice configuration
	#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
	#[serde(tag = "type", rename_all = "snake_case")]
	pub enum ToolChoice {
		/// Let model choose whether to use tools
		Auto {
			#[serde(skip_serializing_if = "Option::is_none")]
			disable_parallel_tool_use: Option<bool>,
		},
		/// Model must use one of the provided tools
		Any {
			#[serde(skip_serializing_if = "Option::is_none")]
			disable_parallel_tool_use: Option<bool>,
		},
		/// Model must use a specific tool
		Tool {
			name: String,
			#[serde(skip_serializing_if = "Option::is_none")]
			disable_parallel_tool_use: Option<bool>,
		},
		/// Model must not use any tools
		None,
	}

	/// Request metadata
	#[derive(Clone, Serialize, Deserialize, Debug, Default)]
	pub struct Metadata {
		#[serde(flatten)]
		pub fields: std::collections::HashMap<String, String>,
	}

	/// Response body for the Messages API.
	#[derive(Clone, Deserialize, Serialize, Debug)]
	pub struct MessagesResponse {
		/// Unique object identifier.
		pub id: String,
		/// Object type. For Messages, this is always "message".
		pub r#type: String,
		/// Conversational role of the generated message; always "assistant".
		pub role: Role,
		/// Content generated by the model, as a list of typed blocks.
		pub content: Vec<ContentBlock>,
		/// The model that handled the request.
		pub model: String,
		/// Why generation stopped. Null only inside message_start events.
		pub stop_reason: Option<StopReason>,
		/// Which custom stop sequence was generated, if any.
		pub stop_sequence: Option<String>,
		/// Billing and rate-limit usage.
		pub usage: Usage,
	}

	/// Reason for stopping the response generation.
	#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
	#[serde(rename_all = "snake_case")]
	pub enum StopReason {
		/// The model reached a natural stopping point.
		EndTurn,
		/// The requested max_tokens or the model's maximum was exceeded.
		MaxTokens,
		/// One of the provided custom stop_sequences was generated.
		StopSequence,
		/// The model invoked one or more tools.
		ToolUse,
		/// The model's response was refused.
		Refusal,
		/// The model paused generation (for long-running responses).
		PauseTurn,
		/// The model exceeded the context window.
		ModelContextWindowExceeded,
	}

	/// Billing and rate-limit usage. Token counts do not map one-to-one onto
	/// visible content; cached reads and cache creation are broken out.
	#[derive(Copy, Clone, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
	pub struct Usage {
		pub input_tokens: u64,
		pub output_tokens: u64,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub cache_creation_input_tokens: Option<u64>,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub cache_read_input_tokens: Option<u64>,
	}

	#[derive(Clone, Serialize, Deserialize, Debug)]
	#[serde(rename_all = "snake_case", tag = "type")]
	pub enum MessagesStreamEvent {
		MessageStart {
			message: MessagesResponse,
		},
		ContentBlockStart {
			index: u64,
			content_block: ContentBlock,
		},
		ContentBlockDelta {
			index: u64,
			delta: ContentBlockDelta,
		},
		ContentBlockStop {
			index: u64,
		},
		MessageDelta {
			delta: MessageDelta,
			usage: MessageDeltaUsage,
		},
		MessageStop,
		Ping,
		Error {
			error: MessagesError,
		},
		// Forward-compatibility: new event kinds are ignored, not fatal.
		#[serde(other)]
		Unknown,
	}

	#[derive(Clone, Serialize, Deserialize, Debug, Eq, PartialEq)]
	#[serde(rename_all = "snake_case", tag = "type")]
	#[allow(clippy::enum_variant_names)]
	pub enum ContentBlockDelta {
		TextDelta {
			text: String,
		},
		InputJsonDelta {
			partial_json: String,
		},
		ThinkingDelta {
			thinking: String,
		},
		SignatureDelta {
			signature: String,
		},
		CitationsDelta {
			#[serde(default)]
			citations: Vec<Value>,
		},
	}

	#[derive(Clone, Serialize, Deserialize, Debug, Eq, PartialEq)]
	pub struct MessageDelta {
		pub stop_reason: Option<StopReason>,
		pub stop_sequence: Option<String>,
	}

	#[derive(Clone, Serialize, Deserialize, Debug, Default, Eq, PartialEq)]
	pub struct MessageDeltaUsage {
		#[serde(skip_serializing_if = "Option::is_none")]
		pub input_tokens: Option<u64>,
		pub output_tokens: u64,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub cache_creation_input_tokens: Option<u64>,
		#[serde(skip_serializing_if = "Option::is_none")]
		pub cache_read_input_tokens: Option<u64>,
	}

	/// Error body for the Messages API.
	#[derive(Clone, Deserialize, Serialize, Debug)]
	pub struct MessagesErrorResponse {
		pub r#type: String,
		pub error: MessagesError,
	}

	#[derive(Clone, Deserialize, Serialize, Debug)]
	pub struct MessagesError {
		pub r#type: String,
		pub message: String,
	}
}
