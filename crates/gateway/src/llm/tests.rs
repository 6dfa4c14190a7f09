use gateway_core::strng;
use serde_json::{Value, json};

use crate::llm::conversion::gemini::from_completions as gemini_xlate;
use crate::llm::conversion::messages::from_completions as messages_xlate;
use crate::llm::conversion::vertex::from_embeddings as vertex_xlate;
use crate::llm::types::completions::typed as completions;
use crate::llm::types::gemini;
use crate::llm::types::messages::typed as messages;
use crate::llm::{AIError, escape_model};

fn completions_request(v: Value) -> completions::Request {
	serde_json::from_value(v).expect("test request must parse")
}

#[test]
fn escape_model_preserves_colons_and_escapes_slashes() {
	let arn = "arn:aws:bedrock:us-east-1:123456789012:foundation-model/anthropic.claude-3-sonnet-20240229-v1:0";
	let escaped = escape_model(arn);
	assert!(escaped.contains("%2Fanthropic"), "{escaped}");
	assert!(escaped.contains("arn:aws:bedrock:us-east-1"), "{escaped}");
	assert!(!escaped.contains('/'), "{escaped}");
}

#[test]
fn completions_to_messages_request_full() {
	let req = completions_request(json!({
		"model": "gpt-4o",
		"max_completion_tokens": 512,
		"temperature": 1.0,
		"stream": true,
		"user": "u-123",
		"messages": [
			{"role": "system", "content": "be kind"},
			{"role": "user", "content": "What's the weather in SF?"},
			{"role": "assistant", "tool_calls": [
				{"id": "call_1", "type": "function",
				 "function": {"name": "get_weather", "arguments": "{\"location\":\"SF\"}"}},
			]},
			{"role": "tool", "tool_call_id": "call_1", "content": "sunny"},
			{"role": "tool", "tool_call_id": "call_2", "content": "22C", "is_error": false},
		],
		"tools": [{"type": "function", "function": {
			"name": "get_weather",
			"parameters": {
				"type": "object",
				"properties": {"location": {"$ref": "#/definitions/loc"}},
				"definitions": {"loc": {"type": "string"}},
			},
		}}],
		"tool_choice": "auto",
		"parallel_tool_calls": false,
	}));

	let out = messages_xlate::translate_request(req, "claude-sonnet-4-5", false).unwrap();
	let got = serde_json::to_value(&out).unwrap();
	assert_eq!(
		got,
		json!({
			"messages": [
				{"role": "user", "content": [{"type": "text", "text": "What's the weather in SF?"}]},
				{"role": "assistant", "content": [
					{"type": "tool_use", "id": "call_1", "name": "get_weather",
					 "input": {"location": "SF"}},
				]},
				// Consecutive tool results coalesce into one user turn.
				{"role": "user", "content": [
					{"type": "tool_result", "tool_use_id": "call_1", "content": "sunny"},
					{"type": "tool_result", "tool_use_id": "call_2", "content": "22C", "is_error": false},
				]},
			],
			"system": [{"type": "text", "text": "be kind"}],
			"model": "claude-sonnet-4-5",
			"max_tokens": 512,
			"stream": true,
			"temperature": 1.0,
			"tools": [{
				"name": "get_weather",
				"input_schema": {
					"type": "object",
					"properties": {"location": {"type": "string"}},
					"definitions": {"loc": {"type": "string"}},
				},
			}],
			"tool_choice": {"type": "auto", "disable_parallel_tool_use": true},
			"metadata": {"user_id": "u-123"},
		}),
	);
}

#[test]
fn completions_to_messages_request_validation() {
	let missing_max_tokens = completions_request(json!({
		"model": "m", "messages": [{"role": "user", "content": "hi"}],
	}));
	assert!(matches!(
		messages_xlate::translate_request(missing_max_tokens, "m", false),
		Err(AIError::MissingField(_))
	));

	for (temperature, ok) in [(1.0, true), (1.0001, false), (-0.0, true), (-0.5, false)] {
		let req = completions_request(json!({
			"model": "m", "max_tokens": 10, "temperature": temperature,
			"messages": [{"role": "user", "content": "hi"}],
		}));
		let res = messages_xlate::translate_request(req, "m", false);
		assert_eq!(res.is_ok(), ok, "temperature {temperature}");
	}

	let bad_choice = completions_request(json!({
		"model": "m", "max_tokens": 10, "tool_choice": "banana",
		"messages": [{"role": "user", "content": "hi"}],
	}));
	assert!(matches!(
		messages_xlate::translate_request(bad_choice, "m", false),
		Err(AIError::InvalidRequest(_))
	));

	let bad_args = completions_request(json!({
		"model": "m", "max_tokens": 10,
		"messages": [{"role": "assistant", "tool_calls": [
			{"id": "c", "type": "function", "function": {"name": "f", "arguments": "{not json"}},
		]}],
	}));
	assert!(matches!(
		messages_xlate::translate_request(bad_args, "m", false),
		Err(AIError::InvalidRequest(_))
	));

	let audio = completions_request(json!({
		"model": "m", "max_tokens": 10,
		"messages": [{"role": "user", "content": [
			{"type": "input_audio", "input_audio": {"data": "...", "format": "wav"}},
		]}],
	}));
	assert!(matches!(
		messages_xlate::translate_request(audio, "m", false),
		Err(AIError::UnsupportedContent(_))
	));
}

#[test]
fn completions_to_messages_media_classification() {
	let req = completions_request(json!({
		"model": "m", "max_tokens": 10,
		"messages": [{"role": "user", "content": [
			{"type": "image_url", "image_url": {"url": "data:image/png;base64,aGk="}},
			{"type": "image_url", "image_url": {"url": "data:application/pdf;base64,cGRm"}},
			{"type": "image_url", "image_url": {"url": "https://example.com/paper.pdf?dl=1"}},
			{"type": "image_url", "image_url": {"url": "https://example.com/cat.jpg"}},
		]}],
	}));
	let out = messages_xlate::translate_request(req, "m", false).unwrap();
	let blocks = serde_json::to_value(&out.messages[0].content).unwrap();
	assert_eq!(
		blocks,
		json!([
			{"type": "image", "source": {"type": "base64", "media_type": "image/png", "data": "aGk="}},
			{"type": "document", "source": {"type": "base64", "media_type": "application/pdf", "data": "cGRm"}},
			{"type": "document", "source": {"type": "url", "url": "https://example.com/paper.pdf?dl=1"}},
			{"type": "image", "source": {"type": "url", "url": "https://example.com/cat.jpg"}},
		]),
	);

	let unsupported = completions_request(json!({
		"model": "m", "max_tokens": 10,
		"messages": [{"role": "user", "content": [
			{"type": "image_url", "image_url": {"url": "data:image/tiff;base64,eA=="}},
		]}],
	}));
	assert!(matches!(
		messages_xlate::translate_request(unsupported, "m", false),
		Err(AIError::UnsupportedContent(_))
	));
}

#[test]
fn structured_output_is_gated() {
	let req = json!({
		"model": "m", "max_tokens": 10,
		"messages": [{"role": "user", "content": "hi"}],
		"response_format": {"type": "json_schema", "json_schema": {"name": "out", "schema": {"type": "object"}}},
	});
	let gated =
		messages_xlate::translate_request(completions_request(req.clone()), "m", false).unwrap();
	assert!(gated.output_config.is_none());

	let allowed =
		messages_xlate::translate_request(completions_request(req), "claude-sonnet-4-5", true)
			.unwrap();
	assert_eq!(
		allowed.output_config.unwrap(),
		json!({"format": {"type": "json_schema", "schema": {"type": "object"}}}),
	);
}

#[test]
fn thinking_round_trip_and_effort_mapping() {
	let req = completions_request(json!({
		"model": "m", "max_tokens": 10, "reasoning_effort": "medium",
		"messages": [
			{"role": "user", "content": "hi"},
			{"role": "assistant", "content": [
				{"type": "thinking", "thinking": "let me think", "signature": "sig"},
				{"type": "redacted_thinking", "data": "opaque"},
				{"type": "text", "text": "answer"},
			]},
		],
	}));
	let out = messages_xlate::translate_request(req, "m", false).unwrap();
	assert_eq!(
		out.thinking,
		Some(messages::ThinkingInput::Enabled { budget_tokens: 2048 })
	);
	let blocks = serde_json::to_value(&out.messages[1].content).unwrap();
	assert_eq!(
		blocks,
		json!([
			{"type": "thinking", "thinking": "let me think", "signature": "sig"},
			{"type": "redacted_thinking", "data": "opaque"},
			{"type": "text", "text": "answer"},
		]),
	);
}

#[test]
fn messages_response_to_completions() {
	let resp: messages::MessagesResponse = serde_json::from_value(json!({
		"id": "msg_1",
		"type": "message",
		"role": "assistant",
		"model": "claude-sonnet-4-5",
		"content": [
			{"type": "text", "text": "Hello "},
			{"type": "text", "text": "world"},
			{"type": "thinking", "thinking": "hmm", "signature": "sig1"},
			{"type": "tool_use", "id": "tu_1", "name": "get_weather", "input": {"location": "SF"}},
		],
		"stop_reason": "tool_use",
		"stop_sequence": null,
		"usage": {
			"input_tokens": 10, "output_tokens": 5,
			"cache_read_input_tokens": 2, "cache_creation_input_tokens": 3,
		},
	}))
	.unwrap();

	let out = messages_xlate::translate_response(resp, "fallback-model").unwrap();
	assert_eq!(out.model, "claude-sonnet-4-5");
	assert_eq!(out.object, "chat.completion");
	assert_eq!(out.choices.len(), 1);
	let choice = &out.choices[0];
	assert_eq!(choice.message.content.as_deref(), Some("Hello world"));
	assert_eq!(
		choice.finish_reason,
		Some(completions::FinishReason::ToolCalls)
	);
	let calls = choice.message.tool_calls.as_ref().unwrap();
	assert_eq!(calls[0].id, "tu_1");
	assert_eq!(calls[0].function.name, "get_weather");
	assert_eq!(calls[0].function.arguments, r#"{"location":"SF"}"#);
	let reasoning = choice.message.reasoning_content.as_ref().unwrap();
	let text = reasoning.reasoning_text.as_ref().unwrap();
	assert_eq!(text.text, "hmm");
	assert_eq!(text.signature.as_deref(), Some("sig1"));

	let usage = out.usage.unwrap();
	assert_eq!(usage.prompt_tokens, 15); // 10 + 2 cached + 3 cache-creation
	assert_eq!(usage.completion_tokens, 5);
	assert_eq!(usage.total_tokens, 20);
	let details = usage.prompt_tokens_details.unwrap();
	assert_eq!(details.cached_tokens, Some(2));
	assert_eq!(details.cache_creation_tokens, Some(3));
}

#[test]
fn messages_response_model_falls_back_to_request_model() {
	let resp: messages::MessagesResponse = serde_json::from_value(json!({
		"id": "msg_1", "type": "message", "role": "assistant", "model": "",
		"content": [{"type": "text", "text": "hi"}],
		"stop_reason": "end_turn", "stop_sequence": null,
		"usage": {"input_tokens": 1, "output_tokens": 1},
	}))
	.unwrap();
	let out = messages_xlate::translate_response(resp, "the-request-model").unwrap();
	assert_eq!(out.model, "the-request-model");
}

fn stream_event(v: Value) -> messages::MessagesStreamEvent {
	serde_json::from_value(v).expect("test event must parse")
}

#[test]
fn anthropic_stream_to_openai_chunks() {
	let mut stream = messages_xlate::StreamTranslation::new(strng::new("req-model"));

	let none = |s: &mut messages_xlate::StreamTranslation, v: Value| {
		assert!(s.on_event(stream_event(v)).unwrap().is_none());
	};
	none(
		&mut stream,
		json!({"type": "message_start", "message": {
			"id": "msg_1", "type": "message", "role": "assistant", "model": "claude-sonnet-4-5",
			"content": [], "stop_reason": null, "stop_sequence": null,
			"usage": {"input_tokens": 9, "output_tokens": 0, "cache_read_input_tokens": 1},
		}}),
	);
	none(
		&mut stream,
		json!({"type": "content_block_start", "index": 0,
			"content_block": {"type": "text", "text": ""}}),
	);

	let first = stream
		.on_event(stream_event(json!({"type": "content_block_delta", "index": 0,
			"delta": {"type": "text_delta", "text": "Hi"}})))
		.unwrap()
		.unwrap();
	assert_eq!(first.id, "msg_1");
	assert_eq!(first.model, "claude-sonnet-4-5");
	assert_eq!(first.object, "chat.completion.chunk");
	assert_eq!(first.choices[0].delta.role, Some(completions::Role::Assistant));
	assert_eq!(first.choices[0].delta.content.as_deref(), Some("Hi"));

	let second = stream
		.on_event(stream_event(json!({"type": "content_block_delta", "index": 0,
			"delta": {"type": "text_delta", "text": "!"}})))
		.unwrap()
		.unwrap();
	assert_eq!(second.choices[0].delta.role, None);

	none(&mut stream, json!({"type": "content_block_stop", "index": 0}));
	none(
		&mut stream,
		json!({"type": "message_delta",
			"delta": {"stop_reason": "end_turn", "stop_sequence": null},
			"usage": {"output_tokens": 16}}),
	);

	let stop = stream
		.on_event(stream_event(json!({"type": "message_stop"})))
		.unwrap()
		.unwrap();
	assert_eq!(
		stop.choices[0].finish_reason,
		Some(completions::FinishReason::Stop)
	);

	let last = stream.finish();
	assert!(last.choices.is_empty());
	let usage = last.usage.unwrap();
	assert_eq!(usage.prompt_tokens, 10); // 9 + 1 cached
	assert_eq!(usage.completion_tokens, 16);
	assert_eq!(usage.total_tokens, 26);
	assert_eq!(
		usage.prompt_tokens_details.unwrap().cached_tokens,
		Some(1)
	);
}

#[test]
fn anthropic_stream_tool_calls() {
	let mut stream = messages_xlate::StreamTranslation::new(strng::new("m"));
	stream
		.on_event(stream_event(json!({"type": "message_start", "message": {
			"id": "msg_t", "type": "message", "role": "assistant", "model": "claude",
			"content": [], "stop_reason": null, "stop_sequence": null,
			"usage": {"input_tokens": 1, "output_tokens": 0},
		}})))
		.unwrap();

	let start = stream
		.on_event(stream_event(json!({"type": "content_block_start", "index": 1,
			"content_block": {"type": "tool_use", "id": "tu_1", "name": "get_weather", "input": {}}})))
		.unwrap()
		.unwrap();
	let calls = start.choices[0].delta.tool_calls.as_ref().unwrap();
	assert_eq!(calls[0].index, 0);
	assert_eq!(calls[0].id.as_deref(), Some("tu_1"));
	assert_eq!(
		calls[0].function.as_ref().unwrap().name.as_deref(),
		Some("get_weather")
	);
	// The empty input map produces no opening arguments fragment.
	assert_eq!(calls[0].function.as_ref().unwrap().arguments, None);
	// Tool-call announcements carry the assistant role too.
	assert_eq!(start.choices[0].delta.role, Some(completions::Role::Assistant));

	let frag = stream
		.on_event(stream_event(json!({"type": "content_block_delta", "index": 1,
			"delta": {"type": "input_json_delta", "partial_json": "{\"location\":"}})))
		.unwrap()
		.unwrap();
	let calls = frag.choices[0].delta.tool_calls.as_ref().unwrap();
	assert_eq!(calls[0].index, 0);
	assert_eq!(calls[0].id, None);
	assert_eq!(
		calls[0].function.as_ref().unwrap().arguments.as_deref(),
		Some("{\"location\":")
	);

	// A second tool block gets the next client-facing index.
	let second = stream
		.on_event(stream_event(json!({"type": "content_block_start", "index": 2,
			"content_block": {"type": "tool_use", "id": "tu_2", "name": "other", "input": {}}})))
		.unwrap()
		.unwrap();
	assert_eq!(
		second.choices[0].delta.tool_calls.as_ref().unwrap()[0].index,
		1
	);

	// Neither block was closed; both reassemble in the final chunk.
	let last = stream.finish();
	let calls = last.choices[0].delta.tool_calls.as_ref().unwrap();
	assert_eq!(calls.len(), 2);
	assert_eq!(calls[0].id.as_deref(), Some("tu_1"));
	assert_eq!(
		calls[0].function.as_ref().unwrap().arguments.as_deref(),
		Some("{\"location\":")
	);
	assert_eq!(calls[1].id.as_deref(), Some("tu_2"));
}

#[test]
fn anthropic_stream_error_event_fails() {
	let mut stream = messages_xlate::StreamTranslation::new(strng::new("m"));
	let err = stream
		.on_event(stream_event(json!({"type": "error",
			"error": {"type": "overloaded_error", "message": "try later"}})))
		.unwrap_err();
	assert_eq!(
		err.to_string(),
		"anthropic stream error: overloaded_error - try later"
	);
}

#[test]
fn completions_to_gemini_request() {
	let req = completions_request(json!({
		"model": "gemini-2.0-flash",
		"max_completion_tokens": 100,
		"temperature": 0.5,
		"n": 2,
		"stop": ["END"],
		"messages": [
			{"role": "system", "content": "sys"},
			{"role": "user", "content": "hi"},
		],
		"response_format": {"type": "json_schema", "json_schema": {"name": "out", "schema": {"type": "object"}}},
	}));
	let out = gemini_xlate::translate_request(req).unwrap();
	assert_eq!(
		serde_json::to_value(&out).unwrap(),
		json!({
			"contents": [{"role": "user", "parts": [{"text": "hi"}]}],
			"generationConfig": {
				"temperature": 0.5,
				"maxOutputTokens": 100,
				"candidateCount": 2,
				"stopSequences": ["END"],
				"responseMimeType": "application/json",
				"responseSchema": {"type": "object"},
			},
			"systemInstruction": {"parts": [{"text": "sys"}]},
		}),
	);
}

#[test]
fn completions_to_gemini_tools_and_responses() {
	let req = completions_request(json!({
		"model": "gemini-2.0-flash", "max_tokens": 50,
		"messages": [
			{"role": "user", "content": "weather?"},
			{"role": "assistant", "tool_calls": [
				{"id": "c1", "type": "function", "function": {"name": "get_weather", "arguments": "{\"city\":\"SF\"}"}},
			]},
			{"role": "tool", "tool_call_id": "c1", "content": "sunny"},
		],
		"tools": [{"type": "function", "function": {"name": "get_weather", "parameters": {"type": "object"}}}],
		"tool_choice": {"type": "function", "function": {"name": "get_weather"}},
	}));
	let out = gemini_xlate::translate_request(req).unwrap();
	let v = serde_json::to_value(&out).unwrap();
	assert_eq!(
		v["contents"],
		json!([
			{"role": "user", "parts": [{"text": "weather?"}]},
			{"role": "model", "parts": [{"functionCall": {"name": "get_weather", "args": {"city": "SF"}}}]},
			// Tool output keys back to the function by name, wrapped since it
			// was not a JSON object.
			{"role": "user", "parts": [{"functionResponse": {"name": "get_weather", "response": {"content": "sunny"}}}]},
		]),
	);
	assert_eq!(
		v["toolConfig"],
		json!({"functionCallingConfig": {"mode": "ANY", "allowedFunctionNames": ["get_weather"]}}),
	);
}

#[test]
fn gemini_response_to_completions() {
	let resp: gemini::GenerateContentResponse = serde_json::from_value(json!({
		"candidates": [{
			"content": {"role": "model", "parts": [
				{"text": "thinking...", "thought": true},
				{"text": "It is sunny.", "thoughtSignature": "sig-1"},
			]},
			"finishReason": "STOP",
		}],
		"usageMetadata": {
			"promptTokenCount": 7, "candidatesTokenCount": 4, "totalTokenCount": 11,
			"cachedContentTokenCount": 2, "thoughtsTokenCount": 3,
		},
		"modelVersion": "gemini-2.0-flash-001",
		"responseId": "resp-1",
	}))
	.unwrap();

	let out = gemini_xlate::translate_response(resp, "req-model").unwrap();
	assert_eq!(out.id, "resp-1");
	assert_eq!(out.model, "gemini-2.0-flash-001");
	let choice = &out.choices[0];
	assert_eq!(choice.message.content.as_deref(), Some("It is sunny."));
	assert_eq!(choice.finish_reason, Some(completions::FinishReason::Stop));
	let reasoning = choice.message.reasoning_content.as_ref().unwrap();
	assert_eq!(reasoning.text.as_deref(), Some("thinking..."));
	assert_eq!(reasoning.signature.as_deref(), Some("sig-1"));
	let usage = out.usage.unwrap();
	assert_eq!(
		(usage.prompt_tokens, usage.completion_tokens, usage.total_tokens),
		(7, 4, 11)
	);
	assert_eq!(
		usage.prompt_tokens_details.unwrap().cached_tokens,
		Some(2)
	);
	assert_eq!(
		usage.completion_tokens_details.unwrap(),
		json!({"reasoning_tokens": 3})
	);
}

#[test]
fn gemini_stream_parallel_tool_calls_get_distinct_indices() {
	let mut stream = gemini_xlate::StreamTranslation::new(strng::new("gemini-2.0-flash"));

	let chunk = |name: &str, location: &str| -> gemini::GenerateContentResponse {
		serde_json::from_value(json!({
			"candidates": [{"content": {"role": "model", "parts": [
				{"functionCall": {"name": name, "args": {"location": location}}},
			]}}],
		}))
		.unwrap()
	};

	let first = stream.on_chunk(chunk("get_weather", "New York City")).unwrap();
	let second = stream.on_chunk(chunk("get_weather", "Shang Hai")).unwrap();
	assert_eq!(first.len(), 1);
	assert_eq!(second.len(), 1);
	let c1 = &first[0].choices[0].delta.tool_calls.as_ref().unwrap()[0];
	let c2 = &second[0].choices[0].delta.tool_calls.as_ref().unwrap()[0];
	assert_eq!(c1.index, 0);
	assert_eq!(c2.index, 1);
	let (id1, id2) = (c1.id.as_ref().unwrap(), c2.id.as_ref().unwrap());
	assert_ne!(id1, id2);
	assert!(uuid::Uuid::parse_str(id1).is_ok(), "{id1}");
	assert!(uuid::Uuid::parse_str(id2).is_ok(), "{id2}");
}

#[test]
fn gemini_stream_usage_chunk_only_with_prompt_tokens() {
	let mut stream = gemini_xlate::StreamTranslation::new(strng::new("m"));
	let with_usage: gemini::GenerateContentResponse = serde_json::from_value(json!({
		"candidates": [{"content": {"role": "model", "parts": [{"text": "hi"}]},
			"finishReason": "STOP"}],
		"usageMetadata": {"promptTokenCount": 5, "candidatesTokenCount": 2, "totalTokenCount": 7},
	}))
	.unwrap();
	let out = stream.on_chunk(with_usage).unwrap();
	assert_eq!(out.len(), 2);
	assert_eq!(out[0].choices[0].delta.content.as_deref(), Some("hi"));
	assert!(out[1].choices.is_empty());
	assert_eq!(out[1].usage.as_ref().unwrap().total_tokens, 7);
	assert_eq!(stream.usage().total_tokens, Some(7));
}

#[test]
fn embeddings_to_vertex_predict() {
	let req: crate::llm::types::embeddings::Request = serde_json::from_value(json!({
		"model": "text-embedding-005",
		"input": ["a", "b"],
		"dimensions": 256,
		"task_type": "RETRIEVAL_DOCUMENT",
		"title": "Doc",
	}))
	.unwrap();
	let out = vertex_xlate::translate_request(&req).unwrap();
	assert_eq!(
		serde_json::to_value(&out).unwrap(),
		json!({
			"instances": [
				{"content": "a", "task_type": "RETRIEVAL_DOCUMENT", "title": "Doc"},
				{"content": "b", "task_type": "RETRIEVAL_DOCUMENT", "title": "Doc"},
			],
			"parameters": {"outputDimensionality": 256},
		}),
	);

	// A title outside document retrieval is rejected before the upstream can.
	let bad: crate::llm::types::embeddings::Request = serde_json::from_value(json!({
		"model": "text-embedding-005", "input": "a", "title": "Doc",
	}))
	.unwrap();
	assert!(matches!(
		vertex_xlate::translate_request(&bad),
		Err(AIError::InvalidRequest(_))
	));

	let tokens: crate::llm::types::embeddings::Request = serde_json::from_value(json!({
		"model": "text-embedding-005", "input": [1, 2, 3],
	}))
	.unwrap();
	assert!(matches!(
		vertex_xlate::translate_request(&tokens),
		Err(AIError::UnsupportedContent(_))
	));
}

#[test]
fn vertex_predict_response_to_embeddings() {
	let resp: crate::llm::types::vertex::PredictResponse = serde_json::from_value(json!({
		"predictions": [
			{"embeddings": {"values": [0.1, 0.2], "statistics": {"token_count": 3, "truncated": false}}},
			{"embeddings": {"values": [0.3], "statistics": {"token_count": 4, "truncated": false}}},
		],
	}))
	.unwrap();
	let (out, usage) = vertex_xlate::translate_response(resp, "text-embedding-005").unwrap();
	assert_eq!(out.object, "list");
	assert_eq!(out.model, "text-embedding-005");
	assert_eq!(out.data.len(), 2);
	assert_eq!(out.data[1].index, 1);
	assert_eq!(out.usage.prompt_tokens, 7);
	assert_eq!(out.usage.total_tokens, 7);
	// Embeddings have no output tokens.
	assert_eq!(usage.output_tokens, None);
	assert_eq!(usage.input_tokens, Some(7));
}
