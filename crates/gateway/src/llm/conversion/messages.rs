use crate::llm::TokenUsage;
use crate::llm::types::messages::typed as messages;

pub mod from_completions {
	use std::collections::HashMap;

	use gateway_core::prelude::Strng;
	use gateway_core::strng;
	use serde_json::json;

	use crate::llm::conversion::{
		PDF_TYPE, SUPPORTED_IMAGE_TYPES, is_pdf_url, parse_data_uri, parse_tool_arguments, schema,
	};
	use crate::llm::types::completions::typed as completions;
	use crate::llm::types::messages::typed as messages;
	use crate::llm::{AIError, TokenUsage};

	/// translate an OpenAI completions request into Anthropic messages
	/// parameters. `model` is the effective (possibly overridden) model;
	/// `structured_output` gates whether `response_format.json_schema` is
	/// forwarded as `output_config`.
	pub fn translate_request(
		req: completions::Request,
		model: &str,
		structured_output: bool,
	) -> Result<messages::Request, AIError> {
		let Some(max_tokens) = req.max_tokens() else {
			return Err(AIError::MissingField(strng::literal!("max_tokens")));
		};
		if let Some(t) = req.temperature
			&& !(0.0..=1.0).contains(&t)
		{
			return Err(AIError::InvalidRequest(strng::format!(
				"temperature must be in [0.0, 1.0], got {t}"
			)));
		}

		let stop_sequences = req.stop_sequences();
		let mut system: Vec<messages::SystemContentBlock> = Vec::new();
		let mut msgs: Vec<messages::Message> = Vec::new();
		// Consecutive tool messages coalesce into one user turn carrying all
		// of their tool_result blocks, in order.
		let mut pending_tool_results: Vec<messages::ContentBlock> = Vec::new();

		fn flush_tool_results(
			msgs: &mut Vec<messages::Message>,
			pending: &mut Vec<messages::ContentBlock>,
		) {
			if !pending.is_empty() {
				msgs.push(messages::Message {
					role: messages::Role::User,
					content: std::mem::take(pending),
				});
			}
		}

		for msg in req.messages {
			match msg {
				completions::RequestMessage::System(m)
				| completions::RequestMessage::Developer(m) => {
					flush_tool_results(&mut msgs, &mut pending_tool_results);
					for text in m.content.into_texts() {
						system.push(messages::SystemContentBlock::Text {
							text,
							cache_control: m.cache_control.clone(),
						});
					}
				},
				completions::RequestMessage::User(m) => {
					flush_tool_results(&mut msgs, &mut pending_tool_results);
					let mut content = match m.content {
						completions::UserContent::Text(text) => {
							vec![messages::ContentBlock::Text(text.into())]
						},
						completions::UserContent::Parts(parts) => parts
							.into_iter()
							.map(user_part_block)
							.collect::<Result<Vec<_>, _>>()?,
					};
					// A message-level cache hint becomes a breakpoint after the
					// message's final block.
					if let Some(cc) = m.cache_control
						&& let Some(messages::ContentBlock::Text(t)) = content.last_mut()
					{
						t.cache_control = Some(cc);
					}
					if !content.is_empty() {
						msgs.push(messages::Message {
							role: messages::Role::User,
							content,
						});
					}
				},
				completions::RequestMessage::Assistant(m) => {
					flush_tool_results(&mut msgs, &mut pending_tool_results);
					let mut content: Vec<messages::ContentBlock> = Vec::new();
					for part in m.content.map(|c| c.into_parts()).unwrap_or_default() {
						match part {
							completions::AssistantContentPart::Text { text }
							| completions::AssistantContentPart::Refusal { refusal: text } => {
								content.push(messages::ContentBlock::Text(text.into()));
							},
							completions::AssistantContentPart::Thinking {
								thinking,
								signature,
							} => {
								content.push(messages::ContentBlock::Thinking {
									thinking,
									signature: signature.unwrap_or_default(),
								});
							},
							completions::AssistantContentPart::RedactedThinking { data } => {
								content.push(messages::ContentBlock::RedactedThinking { data });
							},
						}
					}
					for tc in m.tool_calls.unwrap_or_default() {
						content.push(messages::ContentBlock::ToolUse {
							id: tc.id,
							name: tc.function.name,
							input: parse_tool_arguments(&tc.function.arguments)?,
							cache_control: None,
						});
					}
					if !content.is_empty() {
						msgs.push(messages::Message {
							role: messages::Role::Assistant,
							content,
						});
					}
				},
				completions::RequestMessage::Tool(m) => {
					pending_tool_results.push(messages::ContentBlock::ToolResult {
						tool_use_id: m.tool_call_id,
						content: match m.content {
							completions::TextContent::Text(t) => {
								messages::ToolResultContent::Text(t)
							},
							completions::TextContent::Parts(parts) => {
								messages::ToolResultContent::Array(
									parts
										.into_iter()
										.map(|p| messages::ToolResultContentPart::Text {
											text: p.text,
											cache_control: None,
										})
										.collect(),
								)
							},
						},
						cache_control: m.cache_control,
						is_error: m.is_error,
					});
				},
			}
		}
		flush_tool_results(&mut msgs, &mut pending_tool_results);

		let tools = req
			.tools
			.map(|tools| {
				tools
					.into_iter()
					.map(|completions::Tool::Function { function }| {
						let input_schema = match &function.parameters {
							Some(p) => schema::dereference(p)?,
							None => json!({"type": "object"}),
						};
						Ok(messages::Tool {
							name: function.name,
							description: function.description,
							input_schema,
							cache_control: None,
						})
					})
					.collect::<Result<Vec<_>, AIError>>()
			})
			.transpose()?;

		// parallel_tool_calls=false becomes disable_parallel_tool_use on
		// whichever choice variant ends up selected.
		let disable_parallel = match req.parallel_tool_calls {
			Some(false) => Some(true),
			_ => None,
		};
		let tool_choice = match req.tool_choice {
			None => None,
			Some(completions::ToolChoiceOption::Mode(mode)) => match mode.as_str() {
				"auto" => Some(messages::ToolChoice::Auto {
					disable_parallel_tool_use: disable_parallel,
				}),
				"required" | "any" => Some(messages::ToolChoice::Any {
					disable_parallel_tool_use: disable_parallel,
				}),
				"none" => Some(messages::ToolChoice::None),
				other => {
					return Err(AIError::InvalidRequest(strng::format!(
						"unknown tool_choice: {other}"
					)));
				},
			},
			Some(completions::ToolChoiceOption::Named(named)) => {
				Some(messages::ToolChoice::Tool {
					name: named.function.name,
					disable_parallel_tool_use: disable_parallel,
				})
			},
		};

		let output_config = if structured_output {
			match req.response_format {
				Some(completions::ResponseFormat::JsonSchema { json_schema }) => Some(json!({
					"format": {
						"type": "json_schema",
						"schema": json_schema.schema,
					},
				})),
				_ => None,
			}
		} else {
			None
		};

		let thinking = translate_thinking(
			req.vendor_extensions.thinking_budget_tokens,
			req.reasoning_effort,
		);

		let metadata = req.user.map(|user| messages::Metadata {
			fields: HashMap::from([("user_id".to_string(), user)]),
		});

		Ok(messages::Request {
			messages: msgs,
			system: if system.is_empty() {
				None
			} else {
				Some(messages::SystemPrompt::Blocks(system))
			},
			model: Some(model.to_string()),
			max_tokens,
			stop_sequences,
			stream: req.stream.unwrap_or(false),
			temperature: req.temperature,
			top_p: req.top_p,
			top_k: req.vendor_extensions.top_k,
			tools,
			tool_choice,
			metadata,
			thinking,
			output_config,
		})
	}

	fn translate_thinking(
		budget_tokens: Option<u64>,
		effort: Option<completions::ReasoningEffort>,
	) -> Option<messages::ThinkingInput> {
		if let Some(budget_tokens) = budget_tokens {
			return Some(messages::ThinkingInput::Enabled { budget_tokens });
		}
		// Fixed budgets per effort tier; Anthropic's minimum is 1024.
		match effort? {
			completions::ReasoningEffort::Minimal | completions::ReasoningEffort::Low => {
				Some(messages::ThinkingInput::Enabled { budget_tokens: 1024 })
			},
			completions::ReasoningEffort::Medium => {
				Some(messages::ThinkingInput::Enabled { budget_tokens: 2048 })
			},
			completions::ReasoningEffort::High | completions::ReasoningEffort::Xhigh => {
				Some(messages::ThinkingInput::Enabled { budget_tokens: 4096 })
			},
			completions::ReasoningEffort::None => None,
		}
	}

	fn user_part_block(
		part: completions::ContentPart,
	) -> Result<messages::ContentBlock, AIError> {
		match part {
			completions::ContentPart::Text { text } => {
				Ok(messages::ContentBlock::Text(text.into()))
			},
			completions::ContentPart::ImageUrl { image_url } => {
				media_block(&image_url.url)
			},
			completions::ContentPart::File { file } => {
				if let Some(data) = file.file_data {
					// file_data carries a data URI; only PDFs are documents.
					media_block(&data)
				} else {
					Err(AIError::UnsupportedContent(strng::literal!(
						"file references require file_data"
					)))
				}
			},
			completions::ContentPart::InputAudio { .. } => Err(AIError::UnsupportedContent(
				strng::literal!("input_audio"),
			)),
		}
	}

	/// Classify an image/file URL into an Anthropic image or document block.
	/// Data URIs become inline base64 sources; anything else stays a URL
	/// source, with a `.pdf` suffix selecting a document.
	fn media_block(url: &str) -> Result<messages::ContentBlock, AIError> {
		if let Some(uri) = parse_data_uri(url) {
			let source = messages::MediaSource::Base64 {
				media_type: uri.media_type.to_string(),
				data: uri.data.to_string(),
			};
			return if SUPPORTED_IMAGE_TYPES.contains(&uri.media_type) {
				Ok(messages::ContentBlock::Image {
					source,
					cache_control: None,
				})
			} else if uri.media_type == PDF_TYPE {
				Ok(messages::ContentBlock::Document {
					source,
					cache_control: None,
				})
			} else {
				Err(AIError::UnsupportedContent(strng::format!(
					"media type {}",
					uri.media_type
				)))
			};
		}
		let source = messages::MediaSource::Url {
			url: url.to_string(),
		};
		if is_pdf_url(url) {
			Ok(messages::ContentBlock::Document {
				source,
				cache_control: None,
			})
		} else {
			Ok(messages::ContentBlock::Image {
				source,
				cache_control: None,
			})
		}
	}

	/// translate an Anthropic messages response into an OpenAI completions
	/// response. `request_model` is the fallback when the body carries none.
	pub fn translate_response(
		resp: messages::MessagesResponse,
		request_model: &str,
	) -> Result<completions::Response, AIError> {
		let mut content: Option<String> = None;
		let mut tool_calls: Vec<completions::MessageToolCall> = Vec::new();
		let mut reasoning: Option<completions::ReasoningContent> = None;
		for block in resp.content {
			match block {
				messages::ContentBlock::Text(messages::ContentTextBlock { text, .. }) => {
					content.get_or_insert_with(String::new).push_str(&text);
				},
				messages::ContentBlock::ToolUse {
					id, name, input, ..
				}
				| messages::ContentBlock::ServerToolUse {
					id, name, input, ..
				} => {
					tool_calls.push(completions::MessageToolCall {
						id,
						r#type: completions::FunctionType::Function,
						function: completions::FunctionCall {
							name,
							arguments: serde_json::to_string(&input)
								.map_err(AIError::ResponseMarshal)?,
						},
					});
				},
				messages::ContentBlock::Thinking {
					thinking,
					signature,
				} => {
					reasoning
						.get_or_insert_with(Default::default)
						.reasoning_text = Some(completions::ReasoningText {
						text: thinking,
						signature: (!signature.is_empty()).then_some(signature),
					});
				},
				messages::ContentBlock::RedactedThinking { data } => {
					reasoning
						.get_or_insert_with(Default::default)
						.redacted_content = Some(data);
				},
				// Request-path-only or unsupported blocks in a response are
				// dropped rather than failing the whole exchange.
				messages::ContentBlock::ToolResult { .. }
				| messages::ContentBlock::Image { .. }
				| messages::ContentBlock::Document { .. }
				| messages::ContentBlock::Unknown => continue,
			}
		}

		let finish_reason = resp.stop_reason.map(translate_stop_reason);
		let message = completions::ResponseMessage {
			role: completions::Role::Assistant,
			content,
			refusal: None,
			tool_calls: if tool_calls.is_empty() {
				None
			} else {
				Some(tool_calls)
			},
			audio: None,
			reasoning_content: reasoning,
		};
		// Anthropic always produces exactly one choice.
		let choice = completions::ChatChoice {
			index: 0,
			message,
			finish_reason,
			logprobs: None,
		};

		let mut usage = TokenUsage::default();
		super::apply_response_usage(&mut usage, &resp.usage);
		Ok(completions::Response {
			id: resp.id,
			object: "chat.completion".to_string(),
			// No date in the Anthropic response, so it is "now"
			created: chrono::Utc::now().timestamp() as u64,
			model: if resp.model.is_empty() {
				request_model.to_string()
			} else {
				resp.model
			},
			choices: vec![choice],
			usage: Some(openai_usage(&usage)),
			system_fingerprint: None,
			service_tier: None,
		})
	}

	pub fn translate_stop_reason(reason: messages::StopReason) -> completions::FinishReason {
		match reason {
			messages::StopReason::EndTurn => completions::FinishReason::Stop,
			messages::StopReason::StopSequence => completions::FinishReason::Stop,
			// No distinct client value yet; pause reads as a clean stop.
			messages::StopReason::PauseTurn => completions::FinishReason::Stop,
			messages::StopReason::MaxTokens => completions::FinishReason::Length,
			messages::StopReason::ModelContextWindowExceeded => completions::FinishReason::Length,
			messages::StopReason::ToolUse => completions::FinishReason::ToolCalls,
			messages::StopReason::Refusal => completions::FinishReason::ContentFilter,
		}
	}

	pub fn openai_usage(usage: &TokenUsage) -> completions::Usage {
		let details = if usage.cached_input_tokens.is_some()
			|| usage.cache_creation_input_tokens.is_some()
		{
			Some(completions::PromptTokensDetails {
				cached_tokens: usage.cached_input_tokens,
				cache_creation_tokens: usage.cache_creation_input_tokens,
				audio_tokens: None,
			})
		} else {
			None
		};
		completions::Usage {
			prompt_tokens: usage.input_tokens.unwrap_or_default(),
			completion_tokens: usage.output_tokens.unwrap_or_default(),
			total_tokens: usage.total_tokens.unwrap_or_default(),
			prompt_tokens_details: details,
			completion_tokens_details: None,
		}
	}

	struct ActiveToolCall {
		/// The tool call's index in the client-facing chunk stream.
		index: u32,
		id: String,
		name: String,
		/// Arguments accumulated across input_json_delta events.
		input_json: String,
	}

	/// Stateful Anthropic-stream to OpenAI-chunk conversion.
	/// https://docs.anthropic.com/en/docs/build-with-claude/streaming
	pub struct StreamTranslation {
		request_model: Strng,
		message_id: Option<String>,
		model: Option<String>,
		created: u64,
		// Keyed by the Anthropic content block index; values carry the
		// client-facing tool index.
		active_tools: HashMap<u64, ActiveToolCall>,
		next_tool_index: i64,
		stop_reason: Option<messages::StopReason>,
		sent_first_chunk: bool,
		usage: TokenUsage,
	}

	impl StreamTranslation {
		pub fn new(request_model: Strng) -> Self {
			StreamTranslation {
				request_model,
				message_id: None,
				model: None,
				created: chrono::Utc::now().timestamp() as u64,
				active_tools: HashMap::new(),
				next_tool_index: -1,
				stop_reason: None,
				sent_first_chunk: false,
				usage: TokenUsage::default(),
			}
		}

		pub fn usage(&self) -> TokenUsage {
			self.usage
		}

		/// The model to report: what the provider said at message_start, else
		/// the request model.
		pub fn response_model(&self) -> Strng {
			match &self.model {
				Some(m) if !m.is_empty() => strng::new(m),
				_ => self.request_model.clone(),
			}
		}

		fn chunk(
			&self,
			choices: Vec<completions::ChatChoiceStream>,
			usage: Option<completions::Usage>,
		) -> completions::StreamResponse {
			completions::StreamResponse {
				id: self
					.message_id
					.clone()
					.unwrap_or_else(|| "unknown".to_string()),
				object: "chat.completion.chunk".to_string(),
				created: self.created,
				model: self.response_model().to_string(),
				choices,
				usage,
			}
		}

		fn content_chunk(
			&mut self,
			delta: completions::StreamResponseDelta,
		) -> completions::StreamResponse {
			let mut delta = delta;
			// The first chunk that actually says something announces the role.
			let says_something = delta.content.as_deref().is_some_and(|c| !c.is_empty())
				|| delta.tool_calls.is_some();
			if says_something && !self.sent_first_chunk {
				self.sent_first_chunk = true;
				delta.role = Some(completions::Role::Assistant);
			}
			let choice = completions::ChatChoiceStream {
				index: 0,
				delta,
				finish_reason: None,
				logprobs: None,
			};
			self.chunk(vec![choice], None)
		}

		pub fn on_event(
			&mut self,
			event: messages::MessagesStreamEvent,
		) -> Result<Option<completions::StreamResponse>, AIError> {
			match event {
				messages::MessagesStreamEvent::MessageStart { message } => {
					self.message_id = Some(message.id);
					self.model = Some(message.model);
					self.created = chrono::Utc::now().timestamp() as u64;
					self.next_tool_index = -1;
					super::apply_message_start_usage(&mut self.usage, &message.usage);
					Ok(None)
				},
				messages::MessagesStreamEvent::ContentBlockStart {
					index,
					content_block,
				} => match content_block {
					messages::ContentBlock::ToolUse {
						id, name, input, ..
					}
					| messages::ContentBlock::ServerToolUse {
						id, name, input, ..
					} => {
						self.next_tool_index += 1;
						let tool_index = self.next_tool_index as u32;
						// A pre-populated input map streams out as the opening
						// arguments fragment.
						let starting_args = input
							.as_object()
							.filter(|m| !m.is_empty())
							.map(|m| serde_json::to_string(m))
							.transpose()
							.map_err(AIError::ResponseMarshal)?;
						self.active_tools.insert(
							index,
							ActiveToolCall {
								index: tool_index,
								id: id.clone(),
								name: name.clone(),
								input_json: starting_args.clone().unwrap_or_default(),
							},
						);
						let delta = completions::StreamResponseDelta {
							tool_calls: Some(vec![completions::MessageToolCallChunk {
								index: tool_index,
								id: Some(id),
								r#type: Some(completions::FunctionType::Function),
								function: Some(completions::FunctionCallStream {
									name: Some(name),
									arguments: starting_args,
								}),
							}]),
							..Default::default()
						};
						Ok(Some(self.content_chunk(delta)))
					},
					messages::ContentBlock::Thinking { .. } => {
						// Opens the text stream so clients see the choice early.
						let delta = completions::StreamResponseDelta {
							content: Some(String::new()),
							..Default::default()
						};
						Ok(Some(self.content_chunk(delta)))
					},
					_ => Ok(None),
				},
				messages::MessagesStreamEvent::ContentBlockDelta { index, delta } => {
					match delta {
						messages::ContentBlockDelta::TextDelta { text }
						| messages::ContentBlockDelta::ThinkingDelta { thinking: text } => {
							let delta = completions::StreamResponseDelta {
								content: Some(text),
								..Default::default()
							};
							Ok(Some(self.content_chunk(delta)))
						},
						messages::ContentBlockDelta::InputJsonDelta { partial_json } => {
							let Some(tool) = self.active_tools.get_mut(&index) else {
								return Ok(None);
							};
							tool.input_json.push_str(&partial_json);
							let tool_index = tool.index;
							let delta = completions::StreamResponseDelta {
								tool_calls: Some(vec![completions::MessageToolCallChunk {
									index: tool_index,
									id: None,
									r#type: None,
									function: Some(completions::FunctionCallStream {
										name: None,
										arguments: Some(partial_json),
									}),
								}]),
								..Default::default()
							};
							Ok(Some(self.content_chunk(delta)))
						},
						messages::ContentBlockDelta::SignatureDelta { .. }
						| messages::ContentBlockDelta::CitationsDelta { .. } => Ok(None),
					}
				},
				messages::MessagesStreamEvent::ContentBlockStop { index } => {
					self.active_tools.remove(&index);
					Ok(None)
				},
				messages::MessagesStreamEvent::MessageDelta { delta, usage } => {
					super::apply_message_delta_usage(&mut self.usage, &usage);
					if delta.stop_reason.is_some() {
						self.stop_reason = delta.stop_reason;
					}
					Ok(None)
				},
				messages::MessagesStreamEvent::MessageStop => {
					let reason = self
						.stop_reason
						.unwrap_or(messages::StopReason::EndTurn);
					let choice = completions::ChatChoiceStream {
						index: 0,
						delta: completions::StreamResponseDelta::default(),
						finish_reason: Some(translate_stop_reason(reason)),
						logprobs: None,
					};
					Ok(Some(self.chunk(vec![choice], None)))
				},
				messages::MessagesStreamEvent::Error { error } => Err(
					AIError::AnthropicStreamError(strng::new(&error.r#type), strng::new(&error.message)),
				),
				messages::MessagesStreamEvent::Ping
				| messages::MessagesStreamEvent::Unknown => Ok(None),
			}
		}

		/// The end-of-stream chunk: final usage totals, plus any tool call the
		/// upstream never closed, reassembled whole.
		pub fn finish(&mut self) -> completions::StreamResponse {
			self.usage.finalize_total();
			let mut leftover: Vec<_> = self.active_tools.drain().map(|(_, t)| t).collect();
			leftover.sort_by_key(|t| t.index);
			let choices = if leftover.is_empty() {
				Vec::new()
			} else {
				let tool_calls = leftover
					.into_iter()
					.map(|t| completions::MessageToolCallChunk {
						index: t.index,
						id: Some(t.id),
						r#type: Some(completions::FunctionType::Function),
						function: Some(completions::FunctionCallStream {
							name: Some(t.name),
							arguments: Some(t.input_json),
						}),
					})
					.collect();
				vec![completions::ChatChoiceStream {
					index: 0,
					delta: completions::StreamResponseDelta {
						tool_calls: Some(tool_calls),
						..Default::default()
					},
					finish_reason: None,
					logprobs: None,
				}]
			};
			let usage = openai_usage(&self.usage);
			self.chunk(choices, Some(usage))
		}
	}
}

/// Fold a non-streaming (or message_start) usage block into the accumulator.
/// Anthropic reports cache reads and cache creation separately from input;
/// clients expect them rolled into the input count with the detail split out.
pub(crate) fn apply_response_usage(usage: &mut TokenUsage, u: &messages::Usage) {
	let cache_read = u.cache_read_input_tokens.unwrap_or(0);
	let cache_creation = u.cache_creation_input_tokens.unwrap_or(0);
	usage.set_input(u.input_tokens + cache_read + cache_creation);
	usage.set_output(u.output_tokens);
	usage.set_total(u.input_tokens + cache_read + cache_creation + u.output_tokens);
	if let Some(c) = u.cache_read_input_tokens {
		usage.set_cached_input(c);
	}
	if let Some(c) = u.cache_creation_input_tokens {
		usage.set_cache_creation_input(c);
	}
}

/// message_start carries absolute starting counts (input side only; output
/// accumulates from message_delta events).
pub(crate) fn apply_message_start_usage(usage: &mut TokenUsage, u: &messages::Usage) {
	let cache_read = u.cache_read_input_tokens.unwrap_or(0);
	let cache_creation = u.cache_creation_input_tokens.unwrap_or(0);
	usage.set_input(u.input_tokens + cache_read + cache_creation);
	if let Some(c) = u.cache_read_input_tokens {
		usage.set_cached_input(c);
	}
	if let Some(c) = u.cache_creation_input_tokens {
		usage.set_cache_creation_input(c);
	}
}

/// message_delta events report increments.
pub(crate) fn apply_message_delta_usage(
	usage: &mut TokenUsage,
	u: &messages::MessageDeltaUsage,
) {
	usage.add_output(u.output_tokens);
	if let Some(c) = u.cache_read_input_tokens {
		usage.add_input(c);
		usage.add_cached_input(c);
	}
	if let Some(c) = u.cache_creation_input_tokens {
		usage.add_input(c);
		usage.add_cache_creation_input(c);
	}
}
