use md5::{Digest, Md5};
use tracing::debug;

use crate::llm::translator::TranslatorConfig;
use crate::llm::types::completions::typed as completions;

/// Replacement for a sensitive string: its length plus a short content hash,
/// enough to correlate log lines without exposing the text.
fn placeholder(s: &str) -> String {
	let digest = Md5::digest(s.as_bytes());
	format!(
		"[REDACTED LENGTH={} HASH={}]",
		s.len(),
		hex::encode(&digest[..4])
	)
}

fn redact_in_place(s: &mut String) {
	*s = placeholder(s);
}

fn redact_opt(s: &mut Option<String>) {
	if let Some(s) = s {
		redact_in_place(s);
	}
}

fn redact_tool_calls(calls: &mut Option<Vec<completions::MessageToolCall>>) {
	for call in calls.iter_mut().flatten() {
		redact_in_place(&mut call.function.name);
		redact_in_place(&mut call.function.arguments);
	}
}

fn redact_reasoning(reasoning: &mut Option<completions::ReasoningContent>) {
	if let Some(r) = reasoning {
		if let Some(t) = &mut r.reasoning_text {
			redact_in_place(&mut t.text);
		}
		redact_opt(&mut r.redacted_content);
		redact_opt(&mut r.text);
	}
}

/// A deep copy of a chat completion response with user-visible content
/// replaced by placeholders. The input is never mutated; identifiers,
/// token counts, and finish reasons survive for debugging.
pub fn redact_response(resp: &completions::Response) -> completions::Response {
	let mut resp = resp.clone();
	for choice in &mut resp.choices {
		redact_opt(&mut choice.message.content);
		redact_opt(&mut choice.message.refusal);
		redact_tool_calls(&mut choice.message.tool_calls);
		redact_reasoning(&mut choice.message.reasoning_content);
		if let Some(audio) = &mut choice.message.audio {
			redact_in_place(&mut audio.data);
			redact_in_place(&mut audio.transcript);
		}
	}
	resp
}

/// Streaming counterpart of [`redact_response`].
pub fn redact_chunk(chunk: &completions::StreamResponse) -> completions::StreamResponse {
	let mut chunk = chunk.clone();
	for choice in &mut chunk.choices {
		redact_opt(&mut choice.delta.content);
		redact_opt(&mut choice.delta.refusal);
		for call in choice.delta.tool_calls.iter_mut().flatten() {
			if let Some(f) = &mut call.function {
				redact_opt(&mut f.name);
				redact_opt(&mut f.arguments);
			}
		}
		redact_reasoning(&mut choice.delta.reasoning_content);
	}
	chunk
}

pub(crate) fn debug_log_response(config: &TranslatorConfig, resp: &completions::Response) {
	if !config.debug_log_enabled {
		return;
	}
	if config.enable_redaction {
		let redacted = redact_response(resp);
		debug!(body = ?serde_json::to_string(&redacted).ok(), "response body");
	} else {
		debug!(body = ?serde_json::to_string(resp).ok(), "response body");
	}
}

pub(crate) fn debug_log_chunk(enable_redaction: bool, chunk: &completions::StreamResponse) {
	if enable_redaction {
		let redacted = redact_chunk(chunk);
		debug!(body = ?serde_json::to_string(&redacted).ok(), "response chunk");
	} else {
		debug!(body = ?serde_json::to_string(chunk).ok(), "response chunk");
	}
}
