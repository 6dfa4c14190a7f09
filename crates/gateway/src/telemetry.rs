use serde_json::Value;

/// Span is the tracing hook a host hands to `Translator::response_body`.
/// Streaming translators record each client-facing chunk they emit; the span
/// implementation (and its export) is owned entirely by the host.
pub trait Span {
	fn record_chunk(&mut self, chunk: &Value);
}

/// Span implementation for hosts that do not trace.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSpan;

impl Span for NoopSpan {
	fn record_chunk(&mut self, _chunk: &Value) {}
}

/// Collects recorded chunks; handy in tests and simple hosts.
#[derive(Debug, Default)]
pub struct RecordingSpan {
	pub chunks: Vec<Value>,
}

impl Span for RecordingSpan {
	fn record_chunk(&mut self, chunk: &Value) {
		self.chunks.push(chunk.clone());
	}
}
