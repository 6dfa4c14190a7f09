use bytes::BytesMut;
use gateway_core::prelude::Strng;
use gateway_core::strng;
use http::{HeaderMap, StatusCode};
use tokio_util::codec::Decoder;

use super::{
	CONTENT_TYPE_EVENT_STREAM, ErrorTransform, RequestTransform, ResponseTransform, SetHeader,
	Translator, TranslatorConfig, anthropic_error_body, content_type, is_json,
};
use crate::llm::conversion::messages::{
	apply_message_delta_usage, apply_message_start_usage, apply_response_usage,
};
use crate::llm::types::messages::typed as messages;
use crate::llm::{AIError, TokenUsage, anthropic};
use crate::parse::sse::SseCodec;
use crate::telemetry::Span;

/// Anthropic messages client to the native Anthropic API. Bodies pass
/// through unchanged apart from a model override; the translator extracts
/// usage and the served model.
pub struct MessagesPassthrough {
	config: TranslatorConfig,
	streaming: bool,
	buf: BytesMut,
	sse: SseCodec,
	request_model: Strng,
	usage: TokenUsage,
	response_model: Option<Strng>,
}

impl MessagesPassthrough {
	pub fn new(config: TranslatorConfig) -> Self {
		MessagesPassthrough {
			config,
			streaming: false,
			buf: BytesMut::new(),
			sse: SseCodec::new(),
			request_model: strng::literal!(""),
			usage: TokenUsage::default(),
			response_model: None,
		}
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

impl Translator for MessagesPassthrough {
	fn request_body(
		&mut self,
		raw: &[u8],
		force_body_mutation: bool,
	) -> Result<RequestTransform, AIError> {
		let mut req: crate::llm::types::messages::Request =
			serde_json::from_slice(raw).map_err(AIError::RequestParsing)?;
		if let Some(m) = &self.config.model_name_override {
			req.model = Some(m.to_string());
		}
		let Some(model) = req.model.clone() else {
			return Err(AIError::MissingField(strng::literal!("model")));
		};
		self.request_model = strng::new(&model);
		self.streaming = req.stream.unwrap_or(false);

		let path = strng::literal!(anthropic::DEFAULT_PATH);
		if self.config.model_name_override.is_some() || force_body_mutation {
			let body = serde_json::to_vec(&req).map_err(AIError::RequestMarshal)?;
			Ok(RequestTransform::rewrite(path, body))
		} else {
			Ok(RequestTransform::passthrough(path))
		}
	}

	fn response_headers(&mut self, headers: &HeaderMap) -> Result<Vec<SetHeader>, AIError> {
		self.streaming =
			content_type(headers).is_some_and(|ct| ct.starts_with(CONTENT_TYPE_EVENT_STREAM));
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
			return Ok(self.transform());
		}

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
			// Events the client already understands; observe usage only.
			// A frame that fails to parse is forwarded regardless.
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
		if is_json(headers) && serde_json::from_slice::<messages::MessagesErrorResponse>(body).is_ok()
		{
			// Already the client's schema.
			return Ok(ErrorTransform::passthrough());
		}
		let message = String::from_utf8_lossy(body).to_string();
		let body =
			anthropic_error_body(anthropic::error_type_for_status(status.as_u16()), message)?;
		Ok(ErrorTransform::rewrite(body))
	}
}
