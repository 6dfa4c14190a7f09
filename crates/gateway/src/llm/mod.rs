use gateway_core::prelude::Strng;
use gateway_core::strng;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde::{Deserialize, Serialize};

pub mod anthropic;
pub mod bedrock;
pub mod openai;
pub mod vertex;

pub mod conversion;
pub mod redact;
pub mod translator;
pub mod types;

#[cfg(test)]
mod tests;

/// The client-facing API a route speaks. Each request enters the gateway on
/// exactly one of these surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RouteType {
	/// OpenAI /chat/completions
	Completions,
	/// OpenAI /embeddings
	Embeddings,
	/// OpenAI /responses
	Responses,
	/// OpenAI /audio/speech
	Speech,
	/// OpenAI /images/generations
	ImageGeneration,
	/// Anthropic /v1/messages
	Messages,
}

/// The upstream provider wire contract. Anthropic-family models served
/// through Bedrock or Vertex have their own entries: the payload is
/// Anthropic's but the path conventions and stream framing are the cloud's.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AIProvider {
	OpenAI(openai::Provider),
	Anthropic(anthropic::Provider),
	Bedrock(bedrock::Provider),
	VertexAnthropic(vertex::Provider),
	Vertex(vertex::Provider),
}

trait Provider {
	const NAME: Strng;
}

impl AIProvider {
	pub fn provider(&self) -> Strng {
		match self {
			AIProvider::OpenAI(_) => openai::Provider::NAME,
			AIProvider::Anthropic(_) => anthropic::Provider::NAME,
			AIProvider::Bedrock(_) => bedrock::Provider::NAME,
			AIProvider::VertexAnthropic(_) => vertex::ANTHROPIC_NAME,
			AIProvider::Vertex(_) => vertex::Provider::NAME,
		}
	}

	pub fn override_model(&self) -> Option<Strng> {
		match self {
			AIProvider::OpenAI(p) => p.model.clone(),
			AIProvider::Anthropic(p) => p.model.clone(),
			AIProvider::Bedrock(p) => p.model.clone(),
			AIProvider::VertexAnthropic(p) | AIProvider::Vertex(p) => p.model.clone(),
		}
	}
}

// Error `type` constants surfaced to clients when an upstream returns a
// non-JSON error body. These are part of the wire contract; do not rename.
pub const OPENAI_BACKEND_ERROR: &str = "OpenAIBackendError";
pub const AWS_BEDROCK_BACKEND_ERROR: &str = "AWSBedrockBackendError";
pub const GCP_BACKEND_ERROR: &str = "GCPBackendError";
pub const GCP_VERTEX_AI_BACKEND_ERROR: &str = "GCPVertexAIBackendError";

/// Escapes a model identifier for use as a single path segment. Slashes are
/// structural (ARNs contain them) so they are percent-encoded; colons are
/// valid in a segment and resource identifiers depend on them surviving.
const MODEL_SEGMENT: &AsciiSet = &CONTROLS
	.add(b' ')
	.add(b'"')
	.add(b'#')
	.add(b'%')
	.add(b'/')
	.add(b'<')
	.add(b'>')
	.add(b'?')
	.add(b'\\')
	.add(b'^')
	.add(b'`')
	.add(b'{')
	.add(b'|')
	.add(b'}');

pub fn escape_model(model: &str) -> Strng {
	strng::new(utf8_percent_encode(model, MODEL_SEGMENT).to_string())
}

/// Token accounting accumulated across a response or stream. Every field is
/// set-or-unset; unset fields are absent from emitted usage blocks. `add_*`
/// is for incremental stream deltas, `set_*` for absolute provider-reported
/// values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
	pub input_tokens: Option<u64>,
	pub output_tokens: Option<u64>,
	pub total_tokens: Option<u64>,
	pub cached_input_tokens: Option<u64>,
	pub cache_creation_input_tokens: Option<u64>,
}

impl TokenUsage {
	pub fn set_input(&mut self, v: u64) {
		self.input_tokens = Some(v);
	}

	pub fn set_output(&mut self, v: u64) {
		self.output_tokens = Some(v);
	}

	pub fn set_total(&mut self, v: u64) {
		self.total_tokens = Some(v);
	}

	pub fn set_cached_input(&mut self, v: u64) {
		self.cached_input_tokens = Some(v);
	}

	pub fn set_cache_creation_input(&mut self, v: u64) {
		self.cache_creation_input_tokens = Some(v);
	}

	pub fn add_input(&mut self, v: u64) {
		*self.input_tokens.get_or_insert(0) += v;
	}

	pub fn add_output(&mut self, v: u64) {
		*self.output_tokens.get_or_insert(0) += v;
	}

	pub fn add_cached_input(&mut self, v: u64) {
		*self.cached_input_tokens.get_or_insert(0) += v;
	}

	pub fn add_cache_creation_input(&mut self, v: u64) {
		*self.cache_creation_input_tokens.get_or_insert(0) += v;
	}

	/// Derive `total` as input + output when the provider never reported one.
	/// Called once, at end of stream.
	pub fn finalize_total(&mut self) {
		if self.total_tokens.is_none()
			&& (self.input_tokens.is_some() || self.output_tokens.is_some())
		{
			self.total_tokens =
				Some(self.input_tokens.unwrap_or(0) + self.output_tokens.unwrap_or(0));
		}
	}
}

#[derive(thiserror::Error, Debug)]
pub enum AIError {
	#[error("missing field: {0}")]
	MissingField(Strng),
	#[error("invalid request: {0}")]
	InvalidRequest(Strng),
	#[error("unsupported content: {0}")]
	UnsupportedContent(Strng),
	#[error("unsupported conversion to {0}")]
	UnsupportedConversion(Strng),
	#[error("unresolvable schema reference: {0}")]
	SchemaReference(Strng),
	#[error("failed to parse request: {0}")]
	RequestParsing(serde_json::Error),
	#[error("failed to marshal request: {0}")]
	RequestMarshal(serde_json::Error),
	#[error("failed to parse response: {0}")]
	ResponseParsing(serde_json::Error),
	#[error("failed to marshal response: {0}")]
	ResponseMarshal(serde_json::Error),
	#[error("failed to decode stream: {0}")]
	StreamDecoding(anyhow::Error),
	#[error("failed to encode stream frame: {0}")]
	StreamEncoding(std::io::Error),
	#[error("anthropic stream error: {0} - {1}")]
	AnthropicStreamError(Strng, Strng),
}
