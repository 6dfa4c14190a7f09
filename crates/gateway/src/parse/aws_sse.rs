use aws_smithy_eventstream::frame::{DecodedFrame, MessageFrameDecoder};
pub use aws_smithy_types::event_stream::Message;
use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use bytes::{Bytes, BytesMut};
use tokio_util::codec::Decoder;
use tracing::debug;

use crate::json;

/// Error type for EventStream decoding.
///
/// Wraps the AWS Smithy eventstream errors and satisfies the
/// `tokio_util::codec::Decoder` requirement of implementing `From<io::Error>`.
#[derive(Debug)]
pub enum EventStreamError {
	/// AWS EventStream protocol error (CRC mismatch, invalid headers, etc.)
	Protocol(aws_smithy_eventstream::error::Error),
	/// I/O error during decoding
	Io(std::io::Error),
}

impl std::fmt::Display for EventStreamError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Protocol(e) => write!(f, "{e}"),
			Self::Io(e) => write!(f, "{e}"),
		}
	}
}

impl std::error::Error for EventStreamError {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Self::Protocol(e) => Some(e),
			Self::Io(e) => Some(e),
		}
	}
}

impl From<std::io::Error> for EventStreamError {
	fn from(err: std::io::Error) -> Self {
		Self::Io(err)
	}
}

impl From<aws_smithy_eventstream::error::Error> for EventStreamError {
	fn from(err: aws_smithy_eventstream::error::Error) -> Self {
		Self::Protocol(err)
	}
}

/// A `tokio_util::codec::Decoder` around the Smithy `MessageFrameDecoder`.
///
/// Each decode consumes exactly one complete binary message; a partial
/// message at the tail of the buffer is left in place until more bytes
/// arrive.
#[derive(Default)]
pub struct EventStreamCodec {
	inner: MessageFrameDecoder,
}

impl EventStreamCodec {
	pub fn new() -> Self {
		Self::default()
	}
}

impl Decoder for EventStreamCodec {
	type Item = Message;
	type Error = EventStreamError;

	fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
		match self.inner.decode_frame(src)? {
			DecodedFrame::Complete(message) => Ok(Some(message)),
			DecodedFrame::Incomplete => Ok(None),
		}
	}
}

fn header_string(m: &Message, name: &str) -> Option<String> {
	m.headers()
		.iter()
		.find(|h| h.name().as_str() == name)
		.and_then(|h| h.value().as_string().ok())
		.map(|s| s.as_str().to_owned())
}

/// A provider event recovered from an EventStream message: the event name
/// (from the wrapped JSON's `type` field) and the event's native JSON bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrappedEvent {
	pub event: String,
	pub data: Bytes,
}

/// Unwrap one invoke-API streaming message.
///
/// The payload of each message is JSON of the form `{"bytes": "<base64>"}`
/// where the decoded bytes are the provider event in its native JSON. A
/// payload that fails to decode is skipped (`Ok(None)`): the binary frame was
/// already consumed, and later messages on the stream remain usable. Only an
/// exception frame from AWS aborts the stream.
pub fn unwrap_event(m: &Message) -> anyhow::Result<Option<WrappedEvent>> {
	if header_string(m, ":message-type").as_deref() == Some("exception") {
		let exception_type =
			header_string(m, ":exception-type").unwrap_or_else(|| "unknown".to_owned());
		let error_message = String::from_utf8_lossy(m.payload()).to_string();
		anyhow::bail!("{exception_type}: {error_message}");
	}

	let envelope = match serde_json::from_slice::<serde_json::Value>(m.payload()) {
		Ok(v) => v,
		Err(e) => {
			debug!("skipping eventstream message with undecodable payload: {e}");
			return Ok(None);
		},
	};
	let Some(b64) = json::traverse_string(&envelope, &["bytes"]) else {
		debug!("skipping eventstream message without a bytes field");
		return Ok(None);
	};
	let inner = match BASE64_STANDARD.decode(b64) {
		Ok(b) => b,
		Err(e) => {
			debug!("skipping eventstream message with invalid base64 payload: {e}");
			return Ok(None);
		},
	};
	let event = match serde_json::from_slice::<serde_json::Value>(&inner) {
		Ok(v) => json::traverse_string(&v, &["type"])
			.unwrap_or_default()
			.to_string(),
		Err(e) => {
			debug!("skipping eventstream message with undecodable inner event: {e}");
			return Ok(None);
		},
	};
	Ok(Some(WrappedEvent {
		event,
		data: Bytes::from(inner),
	}))
}
