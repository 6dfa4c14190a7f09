use gateway_core::prelude::Strng;
use gateway_core::strng;
use http::{HeaderMap, StatusCode};
use serde::{Deserialize, Serialize};

use crate::llm::types::completions::typed as completions;
use crate::llm::types::messages::typed as messages;
use crate::llm::{AIError, AIProvider, RouteType, TokenUsage};
use crate::telemetry::Span;

mod anthropic;
mod bedrock;
mod gcp;
mod openai;

pub use anthropic::MessagesPassthrough;
pub use bedrock::{BedrockFromCompletions, BedrockFromMessages};
pub use gcp::{GcpAnthropicFromCompletions, GcpAnthropicFromMessages, VertexEmbeddings, VertexGeminiFromCompletions};
pub use openai::OpenAIPassthrough;

pub const HEADER_PATH: &str = ":path";
pub const HEADER_CONTENT_LENGTH: &str = "content-length";
pub const HEADER_CONTENT_TYPE: &str = "content-type";
pub const HEADER_AMZN_ERROR_TYPE: &str = "x-amzn-errortype";

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_EVENT_STREAM: &str = "text/event-stream";
pub const CONTENT_TYPE_AWS_EVENT_STREAM: &str = "application/vnd.amazon.eventstream";

/// Stream terminator for OpenAI-style chunk streams.
pub(crate) const DONE_CHUNK: &[u8] = b"data: [DONE]\n\n";
/// The Vertex route's terminator historically ends with a single newline;
/// downstream consumers depend on the exact bytes.
pub(crate) const DONE_CHUNK_VERTEX: &[u8] = b"data: [DONE]\n";

/// One header to set, in order. `:path` and `:status` pseudo-headers ride in
/// the same list; when the transport resolves duplicates, last wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetHeader {
	pub name: Strng,
	pub value: Strng,
}

impl SetHeader {
	pub fn new(name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
		SetHeader {
			name: strng::new(name),
			value: strng::new(value),
		}
	}
}

/// Result of request shaping: ordered header mutations (always including the
/// upstream `:path`) and an optional replacement body.
#[derive(Debug, Default)]
pub struct RequestTransform {
	pub headers: Vec<SetHeader>,
	pub body: Option<Vec<u8>>,
}

impl RequestTransform {
	/// Forward the client's bytes unchanged to `path`.
	pub fn passthrough(path: Strng) -> Self {
		RequestTransform {
			headers: vec![SetHeader {
				name: strng::literal!(HEADER_PATH),
				value: path,
			}],
			body: None,
		}
	}

	/// Replace the outgoing body. `content-length` always accompanies a body
	/// rewrite; the transport will not recompute it.
	pub fn rewrite(path: Strng, body: Vec<u8>) -> Self {
		RequestTransform {
			headers: vec![
				SetHeader {
					name: strng::literal!(HEADER_PATH),
					value: path,
				},
				SetHeader::new(HEADER_CONTENT_LENGTH, body.len().to_string()),
			],
			body: Some(body),
		}
	}
}

/// Result of one response-body step. An empty `body` means "forward the
/// upstream bytes unchanged"; non-empty replaces (non-streaming) or appends
/// to (streaming) the client-facing body.
#[derive(Debug, Default)]
pub struct ResponseTransform {
	pub headers: Vec<SetHeader>,
	pub body: Option<Vec<u8>>,
	pub usage: TokenUsage,
	pub model: Option<Strng>,
}

impl ResponseTransform {
	/// Replace a non-streaming body with new JSON; content-length always
	/// accompanies the rewrite.
	pub(crate) fn rewrite(body: Vec<u8>, usage: TokenUsage, model: Strng) -> Self {
		ResponseTransform {
			headers: vec![SetHeader::new(
				HEADER_CONTENT_LENGTH,
				body.len().to_string(),
			)],
			body: Some(body),
			usage,
			model: Some(model),
		}
	}
}

#[derive(Debug, Default)]
pub struct ErrorTransform {
	pub headers: Vec<SetHeader>,
	pub body: Option<Vec<u8>>,
}

impl ErrorTransform {
	/// Replace the error body, emitting content-type and content-length for
	/// the new JSON payload.
	pub(crate) fn rewrite(body: Vec<u8>) -> Self {
		ErrorTransform {
			headers: vec![
				SetHeader::new(HEADER_CONTENT_TYPE, CONTENT_TYPE_JSON),
				SetHeader::new(HEADER_CONTENT_LENGTH, body.len().to_string()),
			],
			body: Some(body),
		}
	}

	pub(crate) fn passthrough() -> Self {
		ErrorTransform::default()
	}
}

/// Per-request translator options, resolved by the host's configuration
/// layer and handed to the factory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TranslatorConfig {
	/// Upstream API version: the URL prefix for OpenAI providers, the
	/// `anthropic_version` body field for AWS/GCP Anthropic providers.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub api_version: Option<Strng>,
	/// When non-empty, replaces the request's model in body and path.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub model_name_override: Option<Strng>,
	#[serde(default)]
	pub debug_log_enabled: bool,
	#[serde(default)]
	pub enable_redaction: bool,
}

/// A per-request translator for one (client API, provider API) pair.
///
/// The host invokes the four operations in a fixed order: `request_body`
/// exactly once, `response_headers` once, then either `response_body` (many
/// times while streaming, with `end_of_stream` set on the final call) or
/// `response_error` once. Instances are never shared across requests and
/// hold no resources.
pub trait Translator: Send {
	fn request_body(
		&mut self,
		raw: &[u8],
		force_body_mutation: bool,
	) -> Result<RequestTransform, AIError>;

	fn response_headers(&mut self, headers: &HeaderMap) -> Result<Vec<SetHeader>, AIError> {
		let _ = headers;
		Ok(Vec::new())
	}

	fn response_body(
		&mut self,
		chunk: &[u8],
		end_of_stream: bool,
		span: &mut dyn Span,
	) -> Result<ResponseTransform, AIError>;

	fn response_error(
		&mut self,
		status: StatusCode,
		headers: &HeaderMap,
		body: &[u8],
	) -> Result<ErrorTransform, AIError>;
}

/// Build the translator for a route. The effective model override is the
/// factory config's, falling back to the provider's own.
pub fn translator_for(
	provider: &AIProvider,
	route: RouteType,
	mut config: TranslatorConfig,
) -> Result<Box<dyn Translator>, AIError> {
	config.model_name_override = config
		.model_name_override
		.filter(|m| !m.is_empty())
		.or_else(|| provider.override_model());
	match (provider, route) {
		(AIProvider::OpenAI(_), RouteType::Messages) => Err(unsupported(provider, route)),
		(AIProvider::OpenAI(_), _) => Ok(Box::new(OpenAIPassthrough::new(route, config))),
		(AIProvider::Anthropic(_), RouteType::Messages) => {
			Ok(Box::new(MessagesPassthrough::new(config)))
		},
		(AIProvider::Bedrock(_), RouteType::Completions) => {
			Ok(Box::new(BedrockFromCompletions::new(config)))
		},
		(AIProvider::Bedrock(_), RouteType::Messages) => {
			Ok(Box::new(BedrockFromMessages::new(config)))
		},
		(AIProvider::VertexAnthropic(_), RouteType::Completions) => {
			Ok(Box::new(GcpAnthropicFromCompletions::new(config)?))
		},
		(AIProvider::VertexAnthropic(_), RouteType::Messages) => {
			Ok(Box::new(GcpAnthropicFromMessages::new(config)?))
		},
		(AIProvider::Vertex(_), RouteType::Completions) => {
			Ok(Box::new(VertexGeminiFromCompletions::new(config)))
		},
		(AIProvider::Vertex(_), RouteType::Embeddings) => {
			Ok(Box::new(VertexEmbeddings::new(config)))
		},
		_ => Err(unsupported(provider, route)),
	}
}

fn unsupported(provider: &AIProvider, route: RouteType) -> AIError {
	AIError::UnsupportedConversion(strng::format!("{:?} to provider {}", route, provider.provider()))
}

pub(crate) fn content_type<'a>(headers: &'a HeaderMap) -> Option<&'a str> {
	headers
		.get(http::header::CONTENT_TYPE)
		.and_then(|v| v.to_str().ok())
}

pub(crate) fn is_json(headers: &HeaderMap) -> bool {
	content_type(headers).is_some_and(|ct| ct.contains("json"))
}

/// Build an OpenAI error body from a bare message.
pub(crate) fn openai_error_body(
	error_type: &str,
	message: String,
	status: StatusCode,
) -> Result<Vec<u8>, AIError> {
	let body = completions::ErrorResponse {
		r#type: Some("error".to_string()),
		error: completions::ErrorBody {
			r#type: error_type.to_string(),
			message,
			param: None,
			code: Some(status.as_u16().to_string()),
		},
	};
	serde_json::to_vec(&body).map_err(AIError::ResponseMarshal)
}

/// Build an Anthropic error body from a bare message.
pub(crate) fn anthropic_error_body(
	error_type: &str,
	message: String,
) -> Result<Vec<u8>, AIError> {
	let body = messages::MessagesErrorResponse {
		r#type: "error".to_string(),
		error: messages::MessagesError {
			r#type: error_type.to_string(),
			message,
		},
	};
	serde_json::to_vec(&body).map_err(AIError::ResponseMarshal)
}

/// Serialize one client-facing chunk as a bare `data:` SSE frame, record it
/// into the span, and optionally debug-log it (redacted when configured).
pub(crate) fn emit_chunk(
	chunk: &completions::StreamResponse,
	out: &mut bytes::BytesMut,
	span: &mut dyn Span,
	config: &TranslatorConfig,
) -> Result<(), AIError> {
	let value = serde_json::to_value(chunk).map_err(AIError::ResponseMarshal)?;
	let data = serde_json::to_vec(&value).map_err(AIError::ResponseMarshal)?;
	crate::parse::sse::emit_data(&data, out).map_err(AIError::StreamEncoding)?;
	span.record_chunk(&value);
	if config.debug_log_enabled {
		crate::llm::redact::debug_log_chunk(config.enable_redaction, chunk);
	}
	Ok(())
}

#[cfg(test)]
#[path = "translator_tests.rs"]
mod tests;
