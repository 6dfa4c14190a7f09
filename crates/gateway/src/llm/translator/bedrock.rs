use bytes::BytesMut;
use gateway_core::prelude::Strng;
use gateway_core::strng;
use http::{HeaderMap, StatusCode};
use tokio_util::codec::Decoder;
use tracing::debug;

use super::{
	CONTENT_TYPE_AWS_EVENT_STREAM, CONTENT_TYPE_EVENT_STREAM, DONE_CHUNK, ErrorTransform,
	HEADER_AMZN_ERROR_TYPE, HEADER_CONTENT_TYPE, RequestTransform, ResponseTransform, SetHeader,
	Translator, TranslatorConfig, anthropic_error_body, content_type, emit_chunk, is_json,
	openai_error_body,
};
use crate::llm::conversion::messages::{
	apply_message_delta_usage, apply_message_start_usage, apply_response_usage, from_completions,
};
use crate::llm::types::completions::typed as completions;
use crate::llm::types::messages::typed as messages;
use crate::llm::{AIError, AWS_BEDROCK_BACKEND_ERROR, TokenUsage, anthropic, bedrock, redact};
use crate::parse::aws_sse::{EventStreamCodec, unwrap_event};
use crate::parse::sse::emit_event;
use crate::telemetry::Span;

/// The message body AWS error responses carry.
#[derive(Debug, serde::Deserialize)]
struct AwsErrorBody {
	message: Option<String>,
}

fn amzn_error_type(headers: &HeaderMap) -> Option<String> {
	let raw = headers.get(HEADER_AMZN_ERROR_TYPE)?.to_str().ok()?;
	// The header value is sometimes suffixed with a URI after a colon.
	Some(raw.split(':').next().unwrap_or(raw).to_string())
}

/// Whether Anthropic's structured-output field is understood by this model
/// family. Only recent Claude generations accept `output_config`.
pub(super) fn supports_output_config(model: &str) -> bool {
	model.contains("4-5") || model.contains("4-6")
}

/// OpenAI chat completions client to an Anthropic-family model behind the
/// Bedrock invoke API. Requests are rebuilt as Anthropic messages; streamed
/// responses arrive as AWS EventStream frames wrapping Anthropic events and
/// leave as OpenAI chunks.
pub struct BedrockFromCompletions {
	config: TranslatorConfig,
	streaming: bool,
	buf: BytesMut,
	codec: EventStreamCodec,
	stream: Option<from_completions::StreamTranslation>,
	request_model: Strng,
	usage: TokenUsage,
}

impl BedrockFromCompletions {
	pub fn new(config: TranslatorConfig) -> Self {
		BedrockFromCompletions {
			config,
			streaming: false,
			buf: BytesMut::new(),
			codec: EventStreamCodec::new(),
			stream: None,
			request_model: strng::literal!(""),
			usage: TokenUsage::default(),
		}
	}

	fn anthropic_version(&self) -> &str {
		self
			.config
			.api_version
			.as_deref()
			.filter(|v| !v.is_empty())
			.unwrap_or(bedrock::DEFAULT_ANTHROPIC_VERSION)
	}
}

impl Translator for BedrockFromCompletions {
	fn request_body(
		&mut self,
		raw: &[u8],
		_force_body_mutation: bool,
	) -> Result<RequestTransform, AIError> {
		let req: completions::Request =
			serde_json::from_slice(raw).map_err(AIError::RequestParsing)?;
		let model = match &self.config.model_name_override {
			Some(m) => m.to_string(),
			None => req
				.model
				.clone()
				.ok_or(AIError::MissingField(strng::literal!("model")))?,
		};
		self.streaming = req.stream.unwrap_or(false);
		self.request_model = strng::new(&model);
		self.stream = Some(from_completions::StreamTranslation::new(
			self.request_model.clone(),
		));

		let anthropic_req =
			from_completions::translate_request(req, &model, supports_output_config(&model))?;
		let body = serde_json::to_vec(&anthropic_req).map_err(AIError::RequestMarshal)?;
		let body = bedrock::prepare_invoke_body(&body, self.anthropic_version())?;
		let path = bedrock::invoke_path(&model, self.streaming);
		Ok(RequestTransform::rewrite(path, body))
	}

	fn response_headers(&mut self, headers: &HeaderMap) -> Result<Vec<SetHeader>, AIError> {
		if content_type(headers).is_some_and(|ct| ct.starts_with(CONTENT_TYPE_AWS_EVENT_STREAM)) {
			self.streaming = true;
			return Ok(vec![SetHeader::new(
				HEADER_CONTENT_TYPE,
				CONTENT_TYPE_EVENT_STREAM,
			)]);
		}
		self.streaming = false;
		Ok(Vec::new())
	}

	fn response_body(
		&mut self,
		chunk: &[u8],
		end_of_stream: bool,
		span: &mut dyn Span,
	) -> Result<ResponseTransform, AIError> {
		self.buf.extend_from_slice(chunk);
		if !self.streaming {
			if !end_of_stream {
				return Ok(ResponseTransform::default());
			}
			let body = std::mem::take(&mut self.buf);
			let resp: messages::MessagesResponse =
				serde_json::from_slice(&body).map_err(AIError::ResponseParsing)?;
			apply_response_usage(&mut self.usage, &resp.usage);
			let openai = from_completions::translate_response(resp, &self.request_model)?;
			redact::debug_log_response(&self.config, &openai);
			let model = strng::new(&openai.model);
			let body = serde_json::to_vec(&openai).map_err(AIError::ResponseMarshal)?;
			return Ok(ResponseTransform::rewrite(body, self.usage, model));
		}

		let stream = self
			.stream
			.as_mut()
			.expect("stream state initialized in request_body");
		let mut out = BytesMut::new();
		while let Some(message) = self
			.codec
			.decode(&mut self.buf)
			.map_err(|e| AIError::StreamDecoding(anyhow::anyhow!(e.to_string())))?
		{
			let Some(wrapped) =
				unwrap_event(&message).map_err(AIError::StreamDecoding)?
			else {
				continue;
			};
			let event: messages::MessagesStreamEvent =
				serde_json::from_slice(&wrapped.data).map_err(AIError::ResponseParsing)?;
			if let Some(chunk) = stream.on_event(event)? {
				emit_chunk(&chunk, &mut out, span, &self.config)?;
			}
		}
		if end_of_stream {
			if !self.buf.is_empty() {
				debug!("discarding {} bytes of truncated eventstream frame", self.buf.len());
				self.buf.clear();
			}
			let final_chunk = stream.finish();
			emit_chunk(&final_chunk, &mut out, span, &self.config)?;
			out.extend_from_slice(DONE_CHUNK);
		}
		Ok(ResponseTransform {
			headers: Vec::new(),
			body: Some(out.to_vec()),
			usage: stream.usage(),
			model: Some(stream.response_model()),
		})
	}

	fn response_error(
		&mut self,
		status: StatusCode,
		headers: &HeaderMap,
		body: &[u8],
	) -> Result<ErrorTransform, AIError> {
		let raw = String::from_utf8_lossy(body).to_string();
		let (error_type, message) = if is_json(headers) {
			let decoded: AwsErrorBody =
				serde_json::from_slice(body).map_err(AIError::ResponseParsing)?;
			(
				amzn_error_type(headers).unwrap_or_else(|| AWS_BEDROCK_BACKEND_ERROR.to_string()),
				decoded.message.unwrap_or(raw),
			)
		} else {
			(AWS_BEDROCK_BACKEND_ERROR.to_string(), raw)
		};
		let body = openai_error_body(&error_type, message, status)?;
		Ok(ErrorTransform::rewrite(body))
	}
}

/// Anthropic messages client to the Bedrock invoke API: the body is already
/// Anthropic's, so request shaping is field surgery, and streamed responses
/// only need the EventStream wrapper peeled back into SSE.
pub struct BedrockFromMessages {
	config: TranslatorConfig,
	streaming: bool,
	buf: BytesMut,
	codec: EventStreamCodec,
	request_model: Strng,
	usage: TokenUsage,
	response_model: Option<Strng>,
}

impl BedrockFromMessages {
	pub fn new(config: TranslatorConfig) -> Self {
		BedrockFromMessages {
			config,
			streaming: false,
			buf: BytesMut::new(),
			codec: EventStreamCodec::new(),
			request_model: strng::literal!(""),
			usage: TokenUsage::default(),
			response_model: None,
		}
	}

	fn anthropic_version(&self) -> &str {
		self
			.config
			.api_version
			.as_deref()
			.filter(|v| !v.is_empty())
			.unwrap_or(bedrock::DEFAULT_ANTHROPIC_VERSION)
	}

	/// Observe a reframed event for usage and model accounting. Parse
	/// failures are fine; the client still gets the raw event.
	fn observe_event(&mut self, data: &[u8]) {
		let Ok(event) = serde_json::from_slice::<messages::MessagesStreamEvent>(data) else {
			return;
		};
		match event {
			messages::MessagesStreamEvent::MessageStart { message } => {
				if !message.model.is_empty() {
					self.response_model = Some(strng::new(&message.model));
				}
				apply_message_start_usage(&mut self.usage, &message.usage);
			},
			messages::MessagesStreamEvent::MessageDelta { usage, .. } => {
				apply_message_delta_usage(&mut self.usage, &usage);
			},
			_ => {},
		}
	}

	fn transform_with(&self, body: Option<Vec<u8>>) -> ResponseTransform {
		ResponseTransform {
			headers: Vec::new(),
			body,
			usage: self.usage,
			model: Some(
				self
					.response_model
					.clone()
					.unwrap_or_else(|| self.request_model.clone()),
			),
		}
	}
}

impl Translator for BedrockFromMessages {
	fn request_body(
		&mut self,
		raw: &[u8],
		_force_body_mutation: bool,
	) -> Result<RequestTransform, AIError> {
		let req: crate::llm::types::messages::Request =
			serde_json::from_slice(raw).map_err(AIError::RequestParsing)?;
		let model = match &self.config.model_name_override {
			Some(m) => m.to_string(),
			None => req
				.model
				.ok_or(AIError::MissingField(strng::literal!("model")))?,
		};
		self.streaming = req.stream.unwrap_or(false);
		self.request_model = strng::new(&model);

		let body = bedrock::prepare_invoke_body(raw, self.anthropic_version())?;
		let path = bedrock::invoke_path(&model, self.streaming);
		Ok(RequestTransform::rewrite(path, body))
	}

	fn response_headers(&mut self, headers: &HeaderMap) -> Result<Vec<SetHeader>, AIError> {
		if content_type(headers).is_some_and(|ct| ct.starts_with(CONTENT_TYPE_AWS_EVENT_STREAM)) {
			self.streaming = true;
			return Ok(vec![SetHeader::new(
				HEADER_CONTENT_TYPE,
				CONTENT_TYPE_EVENT_STREAM,
			)]);
		}
		self.streaming = false;
		Ok(Vec::new())
	}

	fn response_body(
		&mut self,
		chunk: &[u8],
		end_of_stream: bool,
		span: &mut dyn Span,
	) -> Result<ResponseTransform, AIError> {
		self.buf.extend_from_slice(chunk);
		if !self.streaming {
			if end_of_stream && !self.buf.is_empty() {
				let body = std::mem::take(&mut self.buf);
				let resp: messages::MessagesResponse =
					serde_json::from_slice(&body).map_err(AIError::ResponseParsing)?;
				apply_response_usage(&mut self.usage, &resp.usage);
				if !resp.model.is_empty() {
					self.response_model = Some(strng::new(&resp.model));
				}
			}
			// The body is already the client's schema.
			return Ok(self.transform_with(None));
		}

		let mut out = BytesMut::new();
		while let Some(message) = self
			.codec
			.decode(&mut self.buf)
			.map_err(|e| AIError::StreamDecoding(anyhow::anyhow!(e.to_string())))?
		{
			let Some(wrapped) =
				unwrap_event(&message).map_err(AIError::StreamDecoding)?
			else {
				continue;
			};
			self.observe_event(&wrapped.data);
			if let Ok(value) = serde_json::from_slice::<serde_json::Value>(&wrapped.data) {
				span.record_chunk(&value);
			}
			emit_event(&wrapped.event, &wrapped.data, &mut out)
				.map_err(AIError::StreamEncoding)?;
		}
		if end_of_stream {
			if !self.buf.is_empty() {
				debug!("discarding {} bytes of truncated eventstream frame", self.buf.len());
				self.buf.clear();
			}
			self.usage.finalize_total();
		}
		Ok(self.transform_with(Some(out.to_vec())))
	}

	fn response_error(
		&mut self,
		status: StatusCode,
		headers: &HeaderMap,
		body: &[u8],
	) -> Result<ErrorTransform, AIError> {
		let raw = String::from_utf8_lossy(body).to_string();
		let (error_type, message) = if is_json(headers) {
			let decoded: AwsErrorBody =
				serde_json::from_slice(body).map_err(AIError::ResponseParsing)?;
			(
				amzn_error_type(headers)
					.unwrap_or_else(|| anthropic::error_type_for_status(status.as_u16()).to_string()),
				decoded.message.unwrap_or(raw),
			)
		} else {
			(AWS_BEDROCK_BACKEND_ERROR.to_string(), raw)
		};
		let body = anthropic_error_body(&error_type, message)?;
		Ok(ErrorTransform::rewrite(body))
	}
}
