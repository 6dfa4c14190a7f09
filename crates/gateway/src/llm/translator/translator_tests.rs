use aws_smithy_eventstream::frame::write_message_to;
use aws_smithy_types::event_stream::{Header, HeaderValue, Message};
use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use gateway_core::strng;
use http::{HeaderMap, StatusCode};
use serde_json::{Value, json};

use super::*;
use crate::llm::{AIProvider, anthropic, bedrock, openai, vertex};
use crate::telemetry::{NoopSpan, RecordingSpan};

fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
	let mut h = HeaderMap::new();
	for (k, v) in pairs {
		h.insert(
			http::header::HeaderName::from_bytes(k.as_bytes()).unwrap(),
			v.parse().unwrap(),
		);
	}
	h
}

fn header_value<'a>(transform_headers: &'a [SetHeader], name: &str) -> Option<&'a str> {
	transform_headers
		.iter()
		.find(|h| h.name.as_str() == name)
		.map(|h| h.value.as_str())
}

/// Pull the data payloads out of an emitted SSE body, tolerating the
/// optional space after the field name.
fn data_frames(body: &[u8]) -> Vec<String> {
	let text = std::str::from_utf8(body).unwrap();
	text
		.split('\n')
		.filter_map(|line| line.strip_prefix("data:"))
		.map(|d| d.strip_prefix(' ').unwrap_or(d).to_string())
		.filter(|d| !d.is_empty())
		.collect()
}

fn event_names(body: &[u8]) -> Vec<String> {
	let text = std::str::from_utf8(body).unwrap();
	text
		.split('\n')
		.filter_map(|line| line.strip_prefix("event:"))
		.map(|d| d.strip_prefix(' ').unwrap_or(d).to_string())
		.collect()
}

#[test]
fn anthropic_passthrough_no_mutation() {
	let mut t = MessagesPassthrough::new(TranslatorConfig::default());
	let out = t
		.request_body(
			br#"{"model":"claude-2","messages":[{"role":"user","content":"Hello!"}]}"#,
			false,
		)
		.unwrap();
	assert_eq!(header_value(&out.headers, HEADER_PATH), Some("/v1/messages"));
	assert!(out.body.is_none());
	assert_eq!(out.headers.len(), 1);

	// The stored request model backs the response-model fallback.
	let resp = t.response_body(b"", true, &mut NoopSpan).unwrap();
	assert_eq!(resp.model.as_deref(), Some("claude-2"));
}

#[test]
fn anthropic_passthrough_override_rewrites_body() {
	let cfg = TranslatorConfig {
		model_name_override: Some(strng::new("claude-sonnet-4-5")),
		..Default::default()
	};
	let mut t = MessagesPassthrough::new(cfg);
	let out = t
		.request_body(
			br#"{"model":"claude-2","max_tokens":1,"messages":[{"role":"user","content":"Hello!"}]}"#,
			false,
		)
		.unwrap();
	let body = out.body.expect("override must rewrite the body");
	assert_eq!(
		header_value(&out.headers, HEADER_CONTENT_LENGTH),
		Some(body.len().to_string().as_str())
	);
	let v: Value = serde_json::from_slice(&body).unwrap();
	assert_eq!(v["model"], "claude-sonnet-4-5");
	// Untyped fields survive the round trip.
	assert_eq!(v["max_tokens"], 1);
}

#[test]
fn anthropic_to_bedrock_body_surgery() {
	let cfg = TranslatorConfig {
		model_name_override: Some(strng::new("anthropic.claude-3-sonnet-20240229-v1:0")),
		..Default::default()
	};
	let mut t = BedrockFromMessages::new(cfg);
	let out = t
		.request_body(
			br#"{"model":"claude-2","max_tokens":5,"messages":[{"role":"user","content":"Hello!"}]}"#,
			false,
		)
		.unwrap();
	assert_eq!(
		header_value(&out.headers, HEADER_PATH),
		Some("/model/anthropic.claude-3-sonnet-20240229-v1:0/invoke")
	);
	let body: Value = serde_json::from_slice(&out.body.unwrap()).unwrap();
	assert!(body.get("model").is_none());
	assert!(body.get("stream").is_none());
	assert_eq!(body["anthropic_version"], "bedrock-2023-05-31");
	assert_eq!(body["max_tokens"], 5);
}

#[test]
fn bedrock_arn_model_escapes_into_one_path_segment() {
	let arn = "arn:aws:bedrock:us-east-1:123456789012:foundation-model/anthropic.claude-3-sonnet-20240229-v1:0";
	let cfg = TranslatorConfig {
		model_name_override: Some(strng::new(arn)),
		..Default::default()
	};
	let mut t = BedrockFromMessages::new(cfg);
	let out = t
		.request_body(
			br#"{"stream":true,"max_tokens":5,"messages":[{"role":"user","content":"hi"}]}"#,
			false,
		)
		.unwrap();
	let path = header_value(&out.headers, HEADER_PATH).unwrap();
	assert!(path.contains("%2Fanthropic"), "{path}");
	assert!(path.starts_with("/model/arn:aws:bedrock:us-east-1"), "{path}");
	assert!(path.ends_with(":0/invoke-with-response-stream"), "{path}");
}

#[test]
fn openai_passthrough_streaming_usage_extraction() {
	let mut t = OpenAIPassthrough::new(crate::llm::RouteType::Completions, TranslatorConfig::default());
	let out = t
		.request_body(
			br#"{"model":"gpt-4o","stream":true,"messages":[{"role":"user","content":"hi"}]}"#,
			false,
		)
		.unwrap();
	assert_eq!(
		header_value(&out.headers, HEADER_PATH),
		Some("/v1/chat/completions")
	);
	assert!(out.body.is_none());

	t.response_headers(&headers(&[("content-type", "text/event-stream")]))
		.unwrap();

	let sse = concat!(
		"data: {\"id\":\"x\",\"object\":\"chat.completion.chunk\",\"created\":1,",
		"\"model\":\"gpt-4o-2024-08-06\",\"choices\":[]}\n\n",
		"data: {\"id\":\"x\",\"object\":\"chat.completion.chunk\",\"created\":1,",
		"\"model\":\"gpt-4o-2024-08-06\",\"choices\":[],",
		"\"usage\":{\"prompt_tokens\":10,\"completion_tokens\":5,\"total_tokens\":15,",
		"\"prompt_tokens_details\":{\"cached_tokens\":2}}}\n\n",
		"data: [DONE]\n\n",
	);
	// Split mid-frame to exercise buffering across calls.
	let (a, b) = sse.as_bytes().split_at(40);
	let mid = t.response_body(a, false, &mut NoopSpan).unwrap();
	assert!(mid.body.is_none());
	let done = t.response_body(b, true, &mut NoopSpan).unwrap();

	assert!(done.body.is_none());
	assert_eq!(done.model.as_deref(), Some("gpt-4o-2024-08-06"));
	assert_eq!(done.usage.input_tokens, Some(10));
	assert_eq!(done.usage.output_tokens, Some(5));
	assert_eq!(done.usage.total_tokens, Some(15));
	assert_eq!(done.usage.cached_input_tokens, Some(2));
}

#[test]
fn openai_passthrough_non_streaming_usage() {
	let mut t = OpenAIPassthrough::new(crate::llm::RouteType::Completions, TranslatorConfig::default());
	t.request_body(
		br#"{"model":"gpt-4o","messages":[{"role":"user","content":"hi"}]}"#,
		false,
	)
	.unwrap();
	t.response_headers(&headers(&[("content-type", "application/json")]))
		.unwrap();
	let body = json!({
		"id": "chatcmpl-1", "object": "chat.completion", "created": 1, "model": "gpt-4o-mini",
		"choices": [{"index": 0, "message": {"role": "assistant", "content": "hey"},
			"finish_reason": "stop"}],
		"usage": {"prompt_tokens": 3, "completion_tokens": 1, "total_tokens": 4},
	});
	let out = t
		.response_body(&serde_json::to_vec(&body).unwrap(), true, &mut NoopSpan)
		.unwrap();
	assert!(out.body.is_none());
	assert_eq!(out.model.as_deref(), Some("gpt-4o-mini"));
	assert_eq!(out.usage.total_tokens, Some(4));
}

#[test]
fn openai_route_paths_and_version_prefix() {
	use crate::llm::RouteType;
	for (route, want) in [
		(RouteType::Embeddings, "/v1/embeddings"),
		(RouteType::Responses, "/v1/responses"),
		(RouteType::Speech, "/v1/audio/speech"),
		(RouteType::ImageGeneration, "/v1/images/generations"),
	] {
		assert_eq!(openai::path(route, "v1").as_str(), want);
	}
	assert_eq!(
		openai::path(RouteType::Completions, "openai/v1").as_str(),
		"/openai/v1/chat/completions"
	);

	// Speech marks streaming only for stream_format=sse; path is the same.
	let mut t = OpenAIPassthrough::new(RouteType::Speech, TranslatorConfig::default());
	let out = t
		.request_body(
			br#"{"model":"tts-1","input":"hi","voice":"alloy","stream_format":"sse"}"#,
			false,
		)
		.unwrap();
	assert_eq!(
		header_value(&out.headers, HEADER_PATH),
		Some("/v1/audio/speech")
	);
}

#[test]
fn gcp_anthropic_stream_to_openai_chunks() {
	let cfg = TranslatorConfig {
		api_version: Some(strng::new("vertex-2023-10-16")),
		..Default::default()
	};
	let mut t = GcpAnthropicFromCompletions::new(cfg).unwrap();
	let out = t
		.request_body(
			br#"{"model":"claude-sonnet-4-5","max_tokens":32,"stream":true,"messages":[{"role":"user","content":"hi"}]}"#,
			false,
		)
		.unwrap();
	assert_eq!(
		header_value(&out.headers, HEADER_PATH),
		Some("publishers/anthropic/models/claude-sonnet-4-5:streamRawPredict")
	);
	let body: Value = serde_json::from_slice(&out.body.unwrap()).unwrap();
	assert!(body.get("model").is_none());
	assert_eq!(body["anthropic_version"], "vertex-2023-10-16");
	assert_eq!(body["stream"], true);

	let events = concat!(
		"event: message_start\n",
		"data: {\"type\":\"message_start\",\"message\":{\"id\":\"msg_1\",\"type\":\"message\",",
		"\"role\":\"assistant\",\"model\":\"claude-sonnet-4-5\",\"content\":[],",
		"\"stop_reason\":null,\"stop_sequence\":null,",
		"\"usage\":{\"input_tokens\":9,\"output_tokens\":0,\"cache_read_input_tokens\":1}}}\n\n",
		"event: content_block_start\n",
		"data: {\"type\":\"content_block_start\",\"index\":0,\"content_block\":{\"type\":\"text\",\"text\":\"\"}}\n\n",
		"event: content_block_delta\n",
		"data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"Hi\"}}\n\n",
		"event: content_block_delta\n",
		"data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"!\"}}\n\n",
		"event: content_block_stop\n",
		"data: {\"type\":\"content_block_stop\",\"index\":0}\n\n",
		"event: message_delta\n",
		"data: {\"type\":\"message_delta\",\"delta\":{\"stop_reason\":\"end_turn\",\"stop_sequence\":null},",
		"\"usage\":{\"output_tokens\":16}}\n\n",
		"event: ping\ndata: {\"type\":\"ping\"}\n\n",
		"event: message_stop\n",
		"data: {\"type\":\"message_stop\"}\n\n",
	);
	let mut span = RecordingSpan::default();
	let done = t
		.response_body(events.as_bytes(), true, &mut span)
		.unwrap();

	let body = done.body.unwrap();
	let frames = data_frames(&body);
	assert_eq!(frames.last().map(String::as_str), Some("[DONE]"));
	let chunks: Vec<Value> = frames[..frames.len() - 1]
		.iter()
		.map(|f| serde_json::from_str(f).unwrap())
		.collect();
	// "Hi", "!", finish, usage
	assert_eq!(chunks.len(), 4);
	assert_eq!(chunks[0]["choices"][0]["delta"]["role"], "assistant");
	assert_eq!(chunks[0]["choices"][0]["delta"]["content"], "Hi");
	assert_eq!(chunks[0]["object"], "chat.completion.chunk");
	assert_eq!(chunks[1]["choices"][0]["delta"]["content"], "!");
	assert!(chunks[1]["choices"][0]["delta"].get("role").is_none());
	assert_eq!(chunks[2]["choices"][0]["finish_reason"], "stop");
	assert_eq!(
		chunks[3]["usage"],
		json!({
			"prompt_tokens": 10, "completion_tokens": 16, "total_tokens": 26,
			"prompt_tokens_details": {"cached_tokens": 1},
		})
	);

	assert_eq!(done.usage.input_tokens, Some(10));
	assert_eq!(done.usage.output_tokens, Some(16));
	assert_eq!(done.usage.total_tokens, Some(26));
	assert_eq!(done.usage.cached_input_tokens, Some(1));
	assert_eq!(done.model.as_deref(), Some("claude-sonnet-4-5"));
	assert_eq!(span.chunks.len(), 4);
}

#[test]
fn gcp_anthropic_requires_api_version() {
	assert!(matches!(
		GcpAnthropicFromCompletions::new(TranslatorConfig::default()),
		Err(crate::llm::AIError::MissingField(_))
	));
}

fn wrapped(inner: Value) -> Vec<u8> {
	let payload = json!({"bytes": BASE64_STANDARD.encode(serde_json::to_vec(&inner).unwrap())});
	let m = Message::new(serde_json::to_vec(&payload).unwrap())
		.add_header(Header::new(":message-type", HeaderValue::String("event".into())))
		.add_header(Header::new(":event-type", HeaderValue::String("chunk".into())));
	let mut buf = Vec::new();
	write_message_to(&m, &mut buf).unwrap();
	buf
}

fn malformed_eventstream_message() -> Vec<u8> {
	let m = Message::new(&b"{not json"[..])
		.add_header(Header::new(":message-type", HeaderValue::String("event".into())))
		.add_header(Header::new(":event-type", HeaderValue::String("chunk".into())));
	let mut buf = Vec::new();
	write_message_to(&m, &mut buf).unwrap();
	buf
}

#[test]
fn bedrock_messages_stream_unwraps_to_sse() {
	let cfg = TranslatorConfig {
		model_name_override: Some(strng::new("anthropic.claude-3-sonnet-20240229-v1:0")),
		..Default::default()
	};
	let mut t = BedrockFromMessages::new(cfg);
	t.request_body(
		br#"{"stream":true,"max_tokens":5,"messages":[{"role":"user","content":"hi"}]}"#,
		false,
	)
	.unwrap();

	let mutations = t
		.response_headers(&headers(&[(
			"content-type",
			"application/vnd.amazon.eventstream",
		)]))
		.unwrap();
	assert_eq!(
		header_value(&mutations, HEADER_CONTENT_TYPE),
		Some("text/event-stream")
	);

	let mut body = wrapped(json!({"type": "message_start", "message": {
		"id": "msg_1", "type": "message", "role": "assistant", "model": "claude-3-sonnet",
		"content": [], "stop_reason": null, "stop_sequence": null,
		"usage": {"input_tokens": 9, "output_tokens": 0, "cache_read_input_tokens": 1},
	}}));
	body.extend(malformed_eventstream_message());
	body.extend(wrapped(json!({"type": "content_block_delta", "index": 0,
		"delta": {"type": "text_delta", "text": "Hi"}})));

	let mut span = RecordingSpan::default();
	let out = t.response_body(&body, true, &mut span).unwrap();
	let out_body = out.body.unwrap();
	// The malformed middle message is skipped, not fatal.
	assert_eq!(event_names(&out_body), vec!["message_start", "content_block_delta"]);
	let frames = data_frames(&out_body);
	assert_eq!(frames.len(), 2);
	assert!(frames[0].contains("\"message_start\""));
	assert!(frames[1].contains("text_delta"));

	assert_eq!(out.usage.input_tokens, Some(10));
	assert_eq!(out.usage.cached_input_tokens, Some(1));
	assert_eq!(out.model.as_deref(), Some("claude-3-sonnet"));
	assert_eq!(span.chunks.len(), 2);
}

#[test]
fn openai_to_bedrock_request_and_response() {
	let cfg = TranslatorConfig::default();
	let mut t = BedrockFromCompletions::new(cfg);
	let out = t
		.request_body(
			br#"{"model":"anthropic.claude-3-sonnet-20240229-v1:0","max_tokens":64,"messages":[{"role":"system","content":"be brief"},{"role":"user","content":"hi"}]}"#,
			false,
		)
		.unwrap();
	assert_eq!(
		header_value(&out.headers, HEADER_PATH),
		Some("/model/anthropic.claude-3-sonnet-20240229-v1:0/invoke")
	);
	let body: Value = serde_json::from_slice(&out.body.unwrap()).unwrap();
	assert_eq!(body["anthropic_version"], "bedrock-2023-05-31");
	assert!(body.get("model").is_none());
	assert_eq!(body["system"][0]["text"], "be brief");
	assert_eq!(body["messages"][0]["content"][0]["text"], "hi");

	let resp = json!({
		"id": "msg_b", "type": "message", "role": "assistant", "model": "claude-3-sonnet",
		"content": [{"type": "text", "text": "hello"}],
		"stop_reason": "end_turn", "stop_sequence": null,
		"usage": {"input_tokens": 4, "output_tokens": 2},
	});
	let done = t
		.response_body(&serde_json::to_vec(&resp).unwrap(), true, &mut NoopSpan)
		.unwrap();
	let body = done.body.unwrap();
	assert_eq!(
		header_value(&done.headers, HEADER_CONTENT_LENGTH),
		Some(body.len().to_string().as_str())
	);
	let v: Value = serde_json::from_slice(&body).unwrap();
	assert_eq!(v["object"], "chat.completion");
	assert_eq!(v["choices"][0]["message"]["content"], "hello");
	assert_eq!(v["choices"][0]["finish_reason"], "stop");
	assert_eq!(v["usage"]["total_tokens"], 6);
	assert_eq!(done.usage.total_tokens, Some(6));
}

#[test]
fn vertex_gemini_stream_parallel_tool_calls() {
	let mut t = VertexGeminiFromCompletions::new(TranslatorConfig::default());
	let out = t
		.request_body(
			br#"{"model":"gemini-2.0-flash","stream":true,"max_tokens":10,"messages":[{"role":"user","content":"hi"}]}"#,
			false,
		)
		.unwrap();
	assert_eq!(
		header_value(&out.headers, HEADER_PATH),
		Some("publishers/google/models/gemini-2.0-flash:streamGenerateContent?alt=sse")
	);

	let chunk1 = json!({"candidates": [{"content": {"role": "model", "parts": [
		{"functionCall": {"name": "get_weather", "args": {"location": "New York City"}}},
	]}}]});
	let chunk2 = json!({"candidates": [{"content": {"role": "model", "parts": [
		{"functionCall": {"name": "get_weather", "args": {"location": "Shang Hai"}}},
	]}}]});
	let body = format!("data: {chunk1}\r\n\r\ndata: {chunk2}\r\n\r\n");

	let mut span = RecordingSpan::default();
	let done = t.response_body(body.as_bytes(), true, &mut span).unwrap();
	let out_body = done.body.unwrap();
	// Vertex terminates with a single newline after the sentinel.
	assert!(out_body.ends_with(b"data: [DONE]\n"));
	assert!(!out_body.ends_with(b"data: [DONE]\n\n"));

	let frames = data_frames(&out_body);
	assert_eq!(frames.last().map(String::as_str), Some("[DONE]"));
	let chunks: Vec<Value> = frames[..frames.len() - 1]
		.iter()
		.map(|f| serde_json::from_str(f).unwrap())
		.collect();
	assert_eq!(chunks.len(), 2);
	let c1 = &chunks[0]["choices"][0]["delta"]["tool_calls"][0];
	let c2 = &chunks[1]["choices"][0]["delta"]["tool_calls"][0];
	assert_eq!(c1["index"], 0);
	assert_eq!(c2["index"], 1);
	assert_ne!(c1["id"], c2["id"]);
	assert!(
		uuid::Uuid::parse_str(c1["id"].as_str().unwrap()).is_ok(),
		"{c1}"
	);
}

#[test]
fn vertex_embeddings_request_and_response() {
	let mut t = VertexEmbeddings::new(TranslatorConfig::default());
	let out = t
		.request_body(
			br#"{"model":"text-embedding-005","input":["hello","world"]}"#,
			false,
		)
		.unwrap();
	assert_eq!(
		header_value(&out.headers, HEADER_PATH),
		Some("publishers/google/models/text-embedding-005:predict")
	);
	let body: Value = serde_json::from_slice(&out.body.unwrap()).unwrap();
	assert_eq!(body["instances"][1]["content"], "world");

	let resp = json!({"predictions": [
		{"embeddings": {"values": [0.5], "statistics": {"token_count": 2}}},
	]});
	let done = t
		.response_body(&serde_json::to_vec(&resp).unwrap(), true, &mut NoopSpan)
		.unwrap();
	let v: Value = serde_json::from_slice(&done.body.unwrap()).unwrap();
	assert_eq!(v["object"], "list");
	assert_eq!(v["model"], "text-embedding-005");
	assert_eq!(v["usage"]["prompt_tokens"], 2);
	assert_eq!(done.usage.input_tokens, Some(2));
	assert_eq!(done.usage.output_tokens, None);
}

#[test]
fn error_translation_per_provider() {
	// Non-JSON upstream error wraps into the client schema with the
	// provider's error-type constant.
	let mut t = OpenAIPassthrough::new(crate::llm::RouteType::Completions, TranslatorConfig::default());
	let out = t
		.response_error(
			StatusCode::SERVICE_UNAVAILABLE,
			&headers(&[("content-type", "text/plain")]),
			b"upstream down",
		)
		.unwrap();
	let body = out.body.unwrap();
	assert_eq!(
		header_value(&out.headers, HEADER_CONTENT_TYPE),
		Some("application/json")
	);
	assert_eq!(
		header_value(&out.headers, HEADER_CONTENT_LENGTH),
		Some(body.len().to_string().as_str())
	);
	let v: Value = serde_json::from_slice(&body).unwrap();
	assert_eq!(v["type"], "error");
	assert_eq!(v["error"]["type"], "OpenAIBackendError");
	assert_eq!(v["error"]["message"], "upstream down");
	assert_eq!(v["error"]["code"], "503");

	// JSON errors from OpenAI are already the client's schema.
	let out = t
		.response_error(
			StatusCode::BAD_REQUEST,
			&headers(&[("content-type", "application/json")]),
			br#"{"error":{"type":"invalid_request_error","message":"bad"}}"#,
		)
		.unwrap();
	assert!(out.body.is_none());

	// AWS: {message} plus the x-amzn-errortype header (URI suffix dropped).
	let mut t = BedrockFromCompletions::new(TranslatorConfig::default());
	let out = t
		.response_error(
			StatusCode::TOO_MANY_REQUESTS,
			&headers(&[
				("content-type", "application/json"),
				("x-amzn-errortype", "ThrottlingException:http://internal"),
			]),
			br#"{"message":"slow down"}"#,
		)
		.unwrap();
	let v: Value = serde_json::from_slice(&out.body.unwrap()).unwrap();
	assert_eq!(v["error"]["type"], "ThrottlingException");
	assert_eq!(v["error"]["message"], "slow down");

	// Anthropic client: status maps to the Anthropic error taxonomy.
	let mut t = MessagesPassthrough::new(TranslatorConfig::default());
	let out = t
		.response_error(
			StatusCode::TOO_MANY_REQUESTS,
			&headers(&[("content-type", "text/plain")]),
			b"slow down",
		)
		.unwrap();
	let v: Value = serde_json::from_slice(&out.body.unwrap()).unwrap();
	assert_eq!(v["type"], "error");
	assert_eq!(v["error"]["type"], "rate_limit_error");

	// A JSON body already in Anthropic's schema passes through.
	let out = t
		.response_error(
			StatusCode::BAD_REQUEST,
			&headers(&[("content-type", "application/json")]),
			br#"{"type":"error","error":{"type":"invalid_request_error","message":"nope"}}"#,
		)
		.unwrap();
	assert!(out.body.is_none());

	// Vertex: details are appended to the message when present.
	let mut t = VertexGeminiFromCompletions::new(TranslatorConfig::default());
	let out = t
		.response_error(
			StatusCode::TOO_MANY_REQUESTS,
			&headers(&[("content-type", "application/json")]),
			br#"{"error":{"code":429,"message":"quota","status":"RESOURCE_EXHAUSTED","details":[{"reason":"RATE_LIMIT"}]}}"#,
		)
		.unwrap();
	let v: Value = serde_json::from_slice(&out.body.unwrap()).unwrap();
	assert_eq!(v["error"]["type"], "RESOURCE_EXHAUSTED");
	let msg = v["error"]["message"].as_str().unwrap();
	assert!(msg.starts_with("quota details: "), "{msg}");
	assert!(msg.contains("RATE_LIMIT"), "{msg}");

	let out = t
		.response_error(
			StatusCode::BAD_GATEWAY,
			&headers(&[("content-type", "text/html")]),
			b"<html>502</html>",
		)
		.unwrap();
	let v: Value = serde_json::from_slice(&out.body.unwrap()).unwrap();
	assert_eq!(v["error"]["type"], "GCPVertexAIBackendError");
}

#[test]
fn factory_covers_the_route_table() {
	let cfg = TranslatorConfig::default();
	let ok = [
		(AIProvider::OpenAI(openai::Provider::default()), crate::llm::RouteType::Completions),
		(AIProvider::OpenAI(openai::Provider::default()), crate::llm::RouteType::Embeddings),
		(AIProvider::OpenAI(openai::Provider::default()), crate::llm::RouteType::Responses),
		(AIProvider::OpenAI(openai::Provider::default()), crate::llm::RouteType::Speech),
		(AIProvider::OpenAI(openai::Provider::default()), crate::llm::RouteType::ImageGeneration),
		(AIProvider::Anthropic(anthropic::Provider::default()), crate::llm::RouteType::Messages),
		(AIProvider::Bedrock(bedrock::Provider::default()), crate::llm::RouteType::Completions),
		(AIProvider::Bedrock(bedrock::Provider::default()), crate::llm::RouteType::Messages),
		(AIProvider::Vertex(vertex::Provider::default()), crate::llm::RouteType::Completions),
		(AIProvider::Vertex(vertex::Provider::default()), crate::llm::RouteType::Embeddings),
	];
	for (provider, route) in ok {
		assert!(
			translator_for(&provider, route, cfg.clone()).is_ok(),
			"{provider:?} {route:?}"
		);
	}
	// GCP Anthropic needs an api_version to construct at all.
	let gcp = TranslatorConfig {
		api_version: Some(strng::new("vertex-2023-10-16")),
		..Default::default()
	};
	for route in [crate::llm::RouteType::Completions, crate::llm::RouteType::Messages] {
		assert!(
			translator_for(&AIProvider::VertexAnthropic(vertex::Provider::default()), route, gcp.clone())
				.is_ok()
		);
	}

	let bad = [
		(AIProvider::OpenAI(openai::Provider::default()), crate::llm::RouteType::Messages),
		(AIProvider::Anthropic(anthropic::Provider::default()), crate::llm::RouteType::Completions),
		(AIProvider::Bedrock(bedrock::Provider::default()), crate::llm::RouteType::Embeddings),
		(AIProvider::Vertex(vertex::Provider::default()), crate::llm::RouteType::Speech),
	];
	for (provider, route) in bad {
		assert!(
			translator_for(&provider, route, cfg.clone()).is_err(),
			"{provider:?} {route:?}"
		);
	}
}

#[test]
fn provider_model_override_feeds_the_factory() {
	let provider = AIProvider::Bedrock(bedrock::Provider {
		model: Some(strng::new("anthropic.claude-3-sonnet-20240229-v1:0")),
	});
	let mut t = translator_for(&provider, crate::llm::RouteType::Messages, TranslatorConfig::default())
		.unwrap();
	let out = t
		.request_body(br#"{"max_tokens":5,"messages":[{"role":"user","content":"hi"}]}"#, false)
		.unwrap();
	assert_eq!(
		header_value(&out.headers, HEADER_PATH),
		Some("/model/anthropic.claude-3-sonnet-20240229-v1:0/invoke")
	);
}

#[test]
fn request_body_is_deterministic() {
	let raw =
		br#"{"model":"gpt-4o","max_tokens":10,"stream":false,"messages":[{"role":"user","content":"hi"}]}"#;
	let cfg = TranslatorConfig {
		model_name_override: Some(strng::new("claude-sonnet-4-5")),
		api_version: Some(strng::new("vertex-2023-10-16")),
		..Default::default()
	};
	let a = GcpAnthropicFromCompletions::new(cfg.clone())
		.unwrap()
		.request_body(raw, false)
		.unwrap();
	let b = GcpAnthropicFromCompletions::new(cfg)
		.unwrap()
		.request_body(raw, false)
		.unwrap();
	assert_eq!(a.body, b.body);
	assert_eq!(a.headers, b.headers);
}
