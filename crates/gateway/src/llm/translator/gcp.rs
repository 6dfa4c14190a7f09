use bytes::BytesMut;
use gateway_core::prelude::Strng;
use gateway_core::strng;
use http::{HeaderMap, StatusCode};
use tokio_util::codec::Decoder;

use super::{
	DONE_CHUNK, DONE_CHUNK_VERTEX, ErrorTransform, RequestTransform, ResponseTransform,
	Translator, TranslatorConfig, anthropic_error_body, emit_chunk, is_json, openai_error_body,
};
use crate::llm::conversion::messages::{
	apply_message_delta_usage, apply_message_start_usage, apply_response_usage,
	from_completions as messages_from_completions,
};
use crate::llm::conversion::{gemini as gemini_conversion, vertex as vertex_conversion};
use crate::llm::types::completions::typed as completions;
use crate::llm::types::messages::typed as messages;
use crate::llm::types::{embeddings, gemini};
use crate::llm::{
	AIError, GCP_BACKEND_ERROR, GCP_VERTEX_AI_BACKEND_ERROR, TokenUsage, anthropic, redact,
	vertex,
};
use crate::parse::jsonl::JsonLineCodec;
use crate::parse::sse::SseCodec;
use crate::telemetry::Span;

fn required_version(config: &TranslatorConfig) -> Result<Strng, AIError> {
	config
		.api_version
		.clone()
		.filter(|v| !v.is_empty())
		.ok_or(AIError::MissingField(strng::literal!("anthropic_version")))
}

/// OpenAI chat completions client to an Anthropic-family model behind Vertex
/// rawPredict. Request shaping matches the Bedrock route; the stream arrives
/// as native Anthropic SSE instead of EventStream frames.
pub struct GcpAnthropicFromCompletions {
	config: TranslatorConfig,
	anthropic_version: Strng,
	streaming: bool,
	buf: BytesMut,
	sse: SseCodec,
	stream: Option<messages_from_completions::StreamTranslation>,
	request_model: Strng,
	usage: TokenUsage,
}

impl GcpAnthropicFromCompletions {
	pub fn new(config: TranslatorConfig) -> Result<Self, AIError> {
		let anthropic_version = required_version(&config)?;
		Ok(GcpAnthropicFromCompletions {
			config,
			anthropic_version,
			streaming: false,
			buf: BytesMut::new(),
			sse: SseCodec::new(),
			stream: None,
			request_model: strng::literal!(""),
			usage: TokenUsage::default(),
		})
	}
}

impl Translator for GcpAnthropicFromCompletions {
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
		self.stream = Some(messages_from_completions::StreamTranslation::new(
			self.request_model.clone(),
		));

		// Vertex-served Claude does not take output_config regardless of the
		// model generation.
		let anthropic_req = messages_from_completions::translate_request(req, &model, false)?;
		let body = serde_json::to_vec(&anthropic_req).map_err(AIError::RequestMarshal)?;
		let body = vertex::prepare_anthropic_body(&body, &self.anthropic_version)?;
		let path = vertex::anthropic_path(&model, self.streaming);
		Ok(RequestTransform::rewrite(path, body))
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
			let openai =
				messages_from_completions::translate_response(resp, &self.request_model)?;
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
		loop {
			let decoded = if end_of_stream {
				self.sse.decode_eof(&mut self.buf)
			} else {
				self.sse.decode(&mut self.buf)
			};
			let frame = decoded.map_err(|e| AIError::StreamDecoding(e.into()))?;
			let Some(frame) = frame else { break };
			if frame.data.is_empty() {
				continue;
			}
			let event: messages::MessagesStreamEvent =
				serde_json::from_str(&frame.data).map_err(AIError::ResponseParsing)?;
			if let Some(chunk) = stream.on_event(event)? {
				emit_chunk(&chunk, &mut out, span, &self.config)?;
			}
		}
		if end_of_stream {
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
			match serde_json::from_slice::<messages::MessagesErrorResponse>(body) {
				Ok(e) => (e.error.r#type, e.error.message),
				Err(_) => (GCP_BACKEND_ERROR.to_string(), raw),
			}
		} else {
			(GCP_BACKEND_ERROR.to_string(), raw)
		};
		let body = openai_error_body(&error_type, message, status)?;
		Ok(ErrorTransform::rewrite(body))
	}
}

/// Anthropic messages client to Vertex rawPredict: body surgery on the way
/// in, native Anthropic SSE straight through on the way out.
pub struct GcpAnthropicFromMessages {
	config: TranslatorConfig,
	anthropic_version: Strng,
	streaming: bool,
	buf: BytesMut,
	sse: SseCodec,
	request_model: Strng,
	usage: TokenUsage,
	response_model: Option<Strng>,
}

impl GcpAnthropicFromMessages {
	pub fn new(config: TranslatorConfig) -> Result<Self, AIError> {
		let anthropic_version = required_version(&config)?;
		Ok(GcpAnthropicFromMessages {
			config,
			anthropic_version,
			streaming: false,
			buf: BytesMut::new(),
			sse: SseCodec::new(),
			request_model: strng::literal!(""),
			usage: TokenUsage::default(),
			response_model: None,
		})
	}

	fn transform(&self) -> ResponseTransform {
		ResponseTransform {
			headers: Vec::new(),
			body: None,
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

impl Translator for GcpAnthropicFromMessages {
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

		let body = vertex::prepare_anthropic_body(raw, &self.anthropic_version)?;
		let path = vertex::anthropic_path(&model, self.streaming);
		Ok(RequestTransform::rewrite(path, body))
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
			return Ok(self.transform());
		}

		// The upstream already speaks the client's SSE; observe, don't
		// rewrite.
		loop {
			let decoded = if end_of_stream {
				self.sse.decode_eof(&mut self.buf)
			} else {
				self.sse.decode(&mut self.buf)
			};
			let frame = decoded.map_err(|e| AIError::StreamDecoding(e.into()))?;
			let Some(frame) = frame else { break };
			if frame.data.is_empty() {
				continue;
			}
			let Ok(event) =
				serde_json::from_str::<messages::MessagesStreamEvent>(&frame.data)
			else {
				continue;
			};
			if let Ok(value) = serde_json::from_str::<serde_json::Value>(&frame.data) {
				span.record_chunk(&value);
			}
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
		if end_of_stream {
			self.usage.finalize_total();
		}
		Ok(self.transform())
	}

	fn response_error(
		&mut self,
		status: StatusCode,
		headers: &HeaderMap,
		body: &[u8],
	) -> Result<ErrorTransform, AIError> {
		if is_json(headers) {
			if serde_json::from_slice::<messages::MessagesErrorResponse>(body).is_ok() {
				return Ok(ErrorTransform::passthrough());
			}
			let message = String::from_utf8_lossy(body).to_string();
			let body =
				anthropic_error_body(anthropic::error_type_for_status(status.as_u16()), message)?;
			return Ok(ErrorTransform::rewrite(body));
		}
		let message = String::from_utf8_lossy(body).to_string();
		let body = anthropic_error_body(GCP_BACKEND_ERROR, message)?;
		Ok(ErrorTransform::rewrite(body))
	}
}

/// OpenAI chat completions client to Gemini behind Vertex generateContent.
pub struct VertexGeminiFromCompletions {
	config: TranslatorConfig,
	streaming: bool,
	buf: BytesMut,
	lines: JsonLineCodec,
	stream: Option<gemini_conversion::from_completions::StreamTranslation>,
	request_model: Strng,
}

impl VertexGeminiFromCompletions {
	pub fn new(config: TranslatorConfig) -> Self {
		VertexGeminiFromCompletions {
			config,
			streaming: false,
			buf: BytesMut::new(),
			lines: JsonLineCodec::new(),
			stream: None,
			request_model: strng::literal!(""),
		}
	}
}

impl Translator for VertexGeminiFromCompletions {
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
		self.stream = Some(gemini_conversion::from_completions::StreamTranslation::new(
			self.request_model.clone(),
		));

		let gemini_req = gemini_conversion::from_completions::translate_request(req)?;
		let body = serde_json::to_vec(&gemini_req).map_err(AIError::RequestMarshal)?;
		let path = vertex::gemini_path(&model, self.streaming);
		Ok(RequestTransform::rewrite(path, body))
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
			let resp: gemini::GenerateContentResponse =
				serde_json::from_slice(&body).map_err(AIError::ResponseParsing)?;
			let mut usage = TokenUsage::default();
			if let Some(m) = &resp.usage_metadata {
				gemini_conversion::from_completions::apply_usage_metadata(&mut usage, m);
			}
			let openai = gemini_conversion::from_completions::translate_response(
				resp,
				&self.request_model,
			)?;
			redact::debug_log_response(&self.config, &openai);
			let model = strng::new(&openai.model);
			let body = serde_json::to_vec(&openai).map_err(AIError::ResponseMarshal)?;
			return Ok(ResponseTransform::rewrite(body, usage, model));
		}

		let stream = self
			.stream
			.as_mut()
			.expect("stream state initialized in request_body");
		let mut out = BytesMut::new();
		loop {
			let decoded = if end_of_stream {
				self.lines.decode_eof(&mut self.buf)
			} else {
				self.lines.decode(&mut self.buf)
			};
			let line = decoded.map_err(|e| AIError::StreamDecoding(e.into()))?;
			let Some(line) = line else { break };
			let resp: gemini::GenerateContentResponse =
				serde_json::from_slice(&line).map_err(AIError::ResponseParsing)?;
			for chunk in stream.on_chunk(resp)? {
				emit_chunk(&chunk, &mut out, span, &self.config)?;
			}
		}
		if end_of_stream {
			out.extend_from_slice(DONE_CHUNK_VERTEX);
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
		vertex_error(status, headers, body)
	}
}

fn vertex_error(
	status: StatusCode,
	headers: &HeaderMap,
	body: &[u8],
) -> Result<ErrorTransform, AIError> {
	let raw = String::from_utf8_lossy(body).to_string();
	let (error_type, message) = if is_json(headers) {
		match serde_json::from_slice::<gemini::ErrorResponse>(body) {
			Ok(e) => {
				let mut message = e.error.message;
				if let Some(details) = e.error.details.filter(|d| !d.is_null()) {
					// The details payload often carries the actionable part
					// (quota ids, violated constraints); keep it.
					message.push_str(&format!(" details: {details}"));
				}
				(
					e.error
						.status
						.unwrap_or_else(|| GCP_VERTEX_AI_BACKEND_ERROR.to_string()),
					message,
				)
			},
			Err(_) => (GCP_VERTEX_AI_BACKEND_ERROR.to_string(), raw),
		}
	} else {
		(GCP_VERTEX_AI_BACKEND_ERROR.to_string(), raw)
	};
	let body = openai_error_body(&error_type, message, status)?;
	Ok(ErrorTransform::rewrite(body))
}

/// OpenAI embeddings client to Vertex text-embedding predict.
pub struct VertexEmbeddings {
	model_name_override: Option<Strng>,
	buf: BytesMut,
	request_model: Strng,
}

impl VertexEmbeddings {
	pub fn new(config: TranslatorConfig) -> Self {
		VertexEmbeddings {
			model_name_override: config.model_name_override,
			buf: BytesMut::new(),
			request_model: strng::literal!(""),
		}
	}
}

impl Translator for VertexEmbeddings {
	fn request_body(
		&mut self,
		raw: &[u8],
		_force_body_mutation: bool,
	) -> Result<RequestTransform, AIError> {
		let req: embeddings::Request =
			serde_json::from_slice(raw).map_err(AIError::RequestParsing)?;
		let model = match &self.model_name_override {
			Some(m) => m.to_string(),
			None => req
				.model
				.clone()
				.ok_or(AIError::MissingField(strng::literal!("model")))?,
		};
		self.request_model = strng::new(&model);

		let predict = vertex_conversion::from_embeddings::translate_request(&req)?;
		let body = serde_json::to_vec(&predict).map_err(AIError::RequestMarshal)?;
		let path = vertex::embeddings_path(&model);
		Ok(RequestTransform::rewrite(path, body))
	}

	fn response_body(
		&mut self,
		chunk: &[u8],
		end_of_stream: bool,
		_span: &mut dyn Span,
	) -> Result<ResponseTransform, AIError> {
		self.buf.extend_from_slice(chunk);
		if !end_of_stream {
			return Ok(ResponseTransform::default());
		}
		let body = std::mem::take(&mut self.buf);
		let resp: crate::llm::types::vertex::PredictResponse =
			serde_json::from_slice(&body).map_err(AIError::ResponseParsing)?;
		let (openai, usage) =
			vertex_conversion::from_embeddings::translate_response(resp, &self.request_model)?;
		let body = serde_json::to_vec(&openai).map_err(AIError::ResponseMarshal)?;
		Ok(ResponseTransform::rewrite(
			body,
			usage,
			self.request_model.clone(),
		))
	}

	fn response_error(
		&mut self,
		status: StatusCode,
		headers: &HeaderMap,
		body: &[u8],
	) -> Result<ErrorTransform, AIError> {
		vertex_error(status, headers, body)
	}
}
