use bytes::BytesMut;
use gateway_core::prelude::Strng;
use gateway_core::strng;
use http::{HeaderMap, StatusCode};
use tokio_util::codec::Decoder;
use tracing::debug;

use super::{
	CONTENT_TYPE_EVENT_STREAM, ErrorTransform, RequestTransform, ResponseTransform, SetHeader,
	Translator, TranslatorConfig, content_type, is_json, openai_error_body,
};
use crate::llm::types::completions::typed as completions;
use crate::llm::types::{embeddings, images, responses, speech};
use crate::llm::{AIError, OPENAI_BACKEND_ERROR, RouteType, TokenUsage, openai, redact};
use crate::parse::sse::SseCodec;
use crate::telemetry::Span;

/// OpenAI client to OpenAI upstream: bodies pass through untouched unless
/// the model is overridden; the translator's job is path construction and
/// usage/model extraction (including scanning streamed chunks).
pub struct OpenAIPassthrough {
	route: RouteType,
	config: TranslatorConfig,
	request_model: Strng,
	streaming: bool,
	buf: BytesMut,
	sse: SseCodec,
	usage: TokenUsage,
	response_model: Option<Strng>,
}

impl OpenAIPassthrough {
	pub fn new(route: RouteType, config: TranslatorConfig) -> Self {
		OpenAIPassthrough {
			route,
			config,
			request_model: strng::literal!(""),
			streaming: false,
			buf: BytesMut::new(),
			sse: SseCodec::new(),
			usage: TokenUsage::default(),
			response_model: None,
		}
	}

	fn version(&self) -> &str {
		self
			.config
			.api_version
			.as_deref()
			.filter(|v| !v.is_empty())
			.unwrap_or(openai::DEFAULT_VERSION)
	}

	fn observe_stream_frame(&mut self, data: &str) {
		if data == "[DONE]" || data.is_empty() {
			return;
		}
		match self.route {
			RouteType::Completions => {
				let Ok(chunk) = serde_json::from_str::<completions::StreamResponse>(data) else {
					debug!("failed to parse streaming response chunk");
					return;
				};
				if self.response_model.is_none() && !chunk.model.is_empty() {
					self.response_model = Some(strng::new(&chunk.model));
				}
				if let Some(u) = chunk.usage {
					// The latest usage block observed wins.
					read_usage(&mut self.usage, &u);
				}
			},
			RouteType::Responses => {
				let Ok(event) = serde_json::from_str::<responses::StreamEvent>(data) else {
					return;
				};
				if event.r#type == "response.completed"
					&& let Some(resp) = event.response
				{
					if let Some(m) = &resp.model {
						self.response_model = Some(strng::new(m));
					}
					if let Some(u) = resp.usage {
						read_responses_usage(&mut self.usage, &u);
					}
				}
			},
			// Speech streams are audio chunks; nothing to account.
			_ => {},
		}
	}

	fn observe_response(&mut self, body: &[u8]) -> Result<(), AIError> {
		match self.route {
			RouteType::Completions => {
				let resp: completions::Response =
					serde_json::from_slice(body).map_err(AIError::ResponseParsing)?;
				if !resp.model.is_empty() {
					self.response_model = Some(strng::new(&resp.model));
				}
				if let Some(u) = &resp.usage {
					read_usage(&mut self.usage, u);
				}
				if self.config.debug_log_enabled {
					let logged = if self.config.enable_redaction {
						redact::redact_response(&resp)
					} else {
						resp
					};
					debug!(body = ?serde_json::to_string(&logged).ok(), "upstream response");
				}
			},
			RouteType::Embeddings => {
				let resp: embeddings::Response =
					serde_json::from_slice(body).map_err(AIError::ResponseParsing)?;
				self.response_model = Some(strng::new(&resp.model));
				self.usage.set_input(resp.usage.prompt_tokens);
				self.usage.set_total(resp.usage.total_tokens);
			},
			RouteType::Responses => {
				let resp: responses::Response =
					serde_json::from_slice(body).map_err(AIError::ResponseParsing)?;
				if let Some(m) = &resp.model {
					self.response_model = Some(strng::new(m));
				}
				if let Some(u) = &resp.usage {
					read_responses_usage(&mut self.usage, u);
				}
			},
			RouteType::ImageGeneration => {
				let resp: images::Response =
					serde_json::from_slice(body).map_err(AIError::ResponseParsing)?;
				if let Some(u) = resp.usage {
					self.usage.set_input(u.input_tokens);
					self.usage.set_output(u.output_tokens);
					self.usage.set_total(u.total_tokens);
				}
			},
			// Speech responses are audio bytes.
			_ => {},
		}
		Ok(())
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

fn read_usage(usage: &mut TokenUsage, u: &completions::Usage) {
	usage.set_input(u.prompt_tokens);
	usage.set_output(u.completion_tokens);
	usage.set_total(u.total_tokens);
	if let Some(details) = &u.prompt_tokens_details {
		if let Some(c) = details.cached_tokens {
			usage.set_cached_input(c);
		}
		if let Some(c) = details.cache_creation_tokens {
			usage.set_cache_creation_input(c);
		}
	}
}

fn read_responses_usage(usage: &mut TokenUsage, u: &responses::Usage) {
	usage.set_input(u.input_tokens);
	usage.set_output(u.output_tokens);
	usage.set_total(u.total_tokens);
	if let Some(c) = u
		.input_tokens_details
		.as_ref()
		.and_then(|d| d.cached_tokens)
	{
		usage.set_cached_input(c);
	}
}

impl Translator for OpenAIPassthrough {
	fn request_body(
		&mut self,
		raw: &[u8],
		force_body_mutation: bool,
	) -> Result<RequestTransform, AIError> {
		let (model, streaming, body) = match self.route {
			RouteType::Completions => {
				let mut req: crate::llm::types::completions::Request =
					serde_json::from_slice(raw).map_err(AIError::RequestParsing)?;
				if let Some(m) = &self.config.model_name_override {
					req.model = Some(m.to_string());
				}
				let body = if self.config.model_name_override.is_some() || force_body_mutation {
					Some(serde_json::to_vec(&req).map_err(AIError::RequestMarshal)?)
				} else {
					None
				};
				(req.model.clone(), req.stream.unwrap_or(false), body)
			},
			RouteType::Embeddings => {
				let mut req: embeddings::Request =
					serde_json::from_slice(raw).map_err(AIError::RequestParsing)?;
				if let Some(m) = &self.config.model_name_override {
					req.model = Some(m.to_string());
				}
				let body = if self.config.model_name_override.is_some() || force_body_mutation {
					Some(serde_json::to_vec(&req).map_err(AIError::RequestMarshal)?)
				} else {
					None
				};
				(req.model.clone(), false, body)
			},
			RouteType::Responses => {
				let mut req: responses::Request =
					serde_json::from_slice(raw).map_err(AIError::RequestParsing)?;
				if let Some(m) = &self.config.model_name_override {
					req.model = Some(m.to_string());
				}
				let body = if self.config.model_name_override.is_some() || force_body_mutation {
					Some(serde_json::to_vec(&req).map_err(AIError::RequestMarshal)?)
				} else {
					None
				};
				(req.model.clone(), req.stream.unwrap_or(false), body)
			},
			RouteType::Speech => {
				let mut req: speech::Request =
					serde_json::from_slice(raw).map_err(AIError::RequestParsing)?;
				if let Some(m) = &self.config.model_name_override {
					req.model = Some(m.to_string());
				}
				let body = if self.config.model_name_override.is_some() || force_body_mutation {
					Some(serde_json::to_vec(&req).map_err(AIError::RequestMarshal)?)
				} else {
					None
				};
				(req.model.clone(), req.streaming(), body)
			},
			RouteType::ImageGeneration => {
				let mut req: images::Request =
					serde_json::from_slice(raw).map_err(AIError::RequestParsing)?;
				if let Some(m) = &self.config.model_name_override {
					req.model = Some(m.to_string());
				}
				let body = if self.config.model_name_override.is_some() || force_body_mutation {
					Some(serde_json::to_vec(&req).map_err(AIError::RequestMarshal)?)
				} else {
					None
				};
				(req.model.clone(), false, body)
			},
			RouteType::Messages => {
				return Err(AIError::UnsupportedConversion(strng::literal!(
					"messages to openai"
				)));
			},
		};
		let Some(model) = model else {
			return Err(AIError::MissingField(strng::literal!("model")));
		};
		self.request_model = strng::new(&model);
		self.streaming = streaming;

		let path = openai::path(self.route, self.version());
		Ok(match body {
			Some(body) => RequestTransform::rewrite(path, body),
			None => RequestTransform::passthrough(path),
		})
	}

	fn response_headers(&mut self, headers: &HeaderMap) -> Result<Vec<SetHeader>, AIError> {
		// Trust the upstream over the request: a JSON reply to a streaming
		// request still parses as a single body.
		self.streaming =
			content_type(headers).is_some_and(|ct| ct.starts_with(CONTENT_TYPE_EVENT_STREAM));
		Ok(Vec::new())
	}

	fn response_body(
		&mut self,
		chunk: &[u8],
		end_of_stream: bool,
		_span: &mut dyn Span,
	) -> Result<ResponseTransform, AIError> {
		self.buf.extend_from_slice(chunk);
		if self.streaming {
			loop {
				let decoded = if end_of_stream {
					self.sse.decode_eof(&mut self.buf)
				} else {
					self.sse.decode(&mut self.buf)
				};
				let frame = decoded.map_err(|e| AIError::StreamDecoding(e.into()))?;
				let Some(frame) = frame else { break };
				self.observe_stream_frame(&frame.data);
			}
			if end_of_stream {
				self.usage.finalize_total();
			}
			return Ok(self.transform());
		}

		if end_of_stream && !self.buf.is_empty() {
			let body = std::mem::take(&mut self.buf);
			self.observe_response(&body)?;
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
			// Already the client's schema.
			return Ok(ErrorTransform::passthrough());
		}
		let message = String::from_utf8_lossy(body).to_string();
		let body = openai_error_body(OPENAI_BACKEND_ERROR, message, status)?;
		Ok(ErrorTransform::rewrite(body))
	}
}
