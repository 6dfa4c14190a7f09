pub mod from_completions {
	use std::collections::HashMap;

	use gateway_core::prelude::Strng;
	use gateway_core::strng;
	use itertools::Itertools;
	use serde_json::{Value, json};
	use uuid::Uuid;

	use crate::llm::conversion::{parse_data_uri, parse_tool_arguments, schema};
	use crate::llm::types::completions::typed as completions;
	use crate::llm::types::gemini;
	use crate::llm::{AIError, TokenUsage};

	/// translate an OpenAI completions request into a Gemini generateContent
	/// request.
	pub fn translate_request(
		req: completions::Request,
	) -> Result<gemini::GenerateContentRequest, AIError> {
		let max_output_tokens = req.max_tokens();
		let stop_sequences = req.stop_sequences();
		let mut system_parts: Vec<gemini::Part> = Vec::new();
		let mut contents: Vec<gemini::Content> = Vec::new();
		// functionResponse parts need the function's name; remember what each
		// tool call id referred to.
		let mut call_names: HashMap<String, String> = HashMap::new();

		for msg in req.messages {
			match msg {
				completions::RequestMessage::System(m)
				| completions::RequestMessage::Developer(m) => {
					system_parts.extend(m.content.into_texts().into_iter().map(gemini::Part::text));
				},
				completions::RequestMessage::User(m) => {
					let parts = match m.content {
						completions::UserContent::Text(text) => vec![gemini::Part::text(text)],
						completions::UserContent::Parts(parts) => parts
							.into_iter()
							.map(user_part)
							.collect::<Result<Vec<_>, _>>()?,
					};
					if !parts.is_empty() {
						contents.push(gemini::Content {
							role: Some("user".to_string()),
							parts,
						});
					}
				},
				completions::RequestMessage::Assistant(m) => {
					let mut parts: Vec<gemini::Part> = Vec::new();
					for part in m.content.map(|c| c.into_parts()).unwrap_or_default() {
						match part {
							completions::AssistantContentPart::Text { text }
							| completions::AssistantContentPart::Refusal { refusal: text } => {
								parts.push(gemini::Part::text(text));
							},
							completions::AssistantContentPart::Thinking {
								thinking,
								signature,
							} => {
								parts.push(gemini::Part {
									text: Some(thinking),
									thought: Some(true),
									thought_signature: signature,
									..Default::default()
								});
							},
							// No Gemini equivalent; the blob is provider-bound.
							completions::AssistantContentPart::RedactedThinking { .. } => {},
						}
					}
					for tc in m.tool_calls.unwrap_or_default() {
						call_names.insert(tc.id, tc.function.name.clone());
						parts.push(gemini::Part {
							function_call: Some(gemini::FunctionCall {
								name: tc.function.name,
								args: parse_tool_arguments(&tc.function.arguments)?,
							}),
							..Default::default()
						});
					}
					if !parts.is_empty() {
						contents.push(gemini::Content {
							role: Some("model".to_string()),
							parts,
						});
					}
				},
				completions::RequestMessage::Tool(m) => {
					let name = call_names
						.get(&m.tool_call_id)
						.cloned()
						.unwrap_or_else(|| m.tool_call_id.clone());
					let text = m.content.joined();
					// functionResponse.response must be an object; non-JSON
					// tool output is wrapped.
					let response = match serde_json::from_str::<Value>(&text) {
						Ok(v @ Value::Object(_)) => v,
						_ => json!({"content": text}),
					};
					let part = gemini::Part {
						function_response: Some(gemini::FunctionResponse { name, response }),
						..Default::default()
					};
					// Parallel tool results belong to one user turn.
					match contents.last_mut() {
						Some(c)
							if c.role.as_deref() == Some("user")
								&& c.parts.iter().all(|p| p.function_response.is_some()) =>
						{
							c.parts.push(part);
						},
						_ => contents.push(gemini::Content {
							role: Some("user".to_string()),
							parts: vec![part],
						}),
					}
				},
			}
		}

		let tools = req
			.tools
			.map(|tools| {
				let declarations = tools
					.into_iter()
					.map(|completions::Tool::Function { function }| {
						// Gemini does not resolve JSON-Schema references.
						let parameters = function
							.parameters
							.as_ref()
							.map(schema::dereference)
							.transpose()?;
						Ok(gemini::FunctionDeclaration {
							name: function.name,
							description: function.description,
							parameters,
						})
					})
					.collect::<Result<Vec<_>, AIError>>()?;
				Ok::<_, AIError>(vec![gemini::Tool {
					function_declarations: declarations,
				}])
			})
			.transpose()?;

		let tool_config = match req.tool_choice {
			None => None,
			Some(completions::ToolChoiceOption::Mode(mode)) => {
				let mode = match mode.as_str() {
					"auto" => gemini::FunctionCallingMode::Auto,
					"required" | "any" => gemini::FunctionCallingMode::Any,
					"none" => gemini::FunctionCallingMode::None,
					other => {
						return Err(AIError::InvalidRequest(strng::format!(
							"unknown tool_choice: {other}"
						)));
					},
				};
				Some(gemini::ToolConfig {
					function_calling_config: gemini::FunctionCallingConfig {
						mode,
						allowed_function_names: None,
					},
				})
			},
			Some(completions::ToolChoiceOption::Named(named)) => Some(gemini::ToolConfig {
				function_calling_config: gemini::FunctionCallingConfig {
					mode: gemini::FunctionCallingMode::Any,
					allowed_function_names: Some(vec![named.function.name]),
				},
			}),
		};

		let (response_mime_type, response_schema) = match req.response_format {
			Some(completions::ResponseFormat::JsonSchema { json_schema }) => {
				let schema = json_schema
					.schema
					.as_ref()
					.map(schema::dereference)
					.transpose()?;
				(Some("application/json".to_string()), schema)
			},
			Some(completions::ResponseFormat::JsonObject) => {
				(Some("application/json".to_string()), None)
			},
			_ => (None, None),
		};

		let thinking_config = thinking_config(
			req.vendor_extensions.thinking_budget_tokens,
			req.reasoning_effort,
		);

		let generation_config = gemini::GenerationConfig {
			temperature: req.temperature,
			top_p: req.top_p,
			top_k: req.vendor_extensions.top_k,
			max_output_tokens,
			candidate_count: req.n,
			stop_sequences,
			response_mime_type,
			response_schema,
			thinking_config,
		};

		Ok(gemini::GenerateContentRequest {
			contents,
			tools,
			tool_config,
			generation_config: Some(generation_config),
			system_instruction: if system_parts.is_empty() {
				None
			} else {
				Some(gemini::Content {
					role: None,
					parts: system_parts,
				})
			},
			safety_settings: req.vendor_extensions.safety_settings,
		})
	}

	fn user_part(part: completions::ContentPart) -> Result<gemini::Part, AIError> {
		match part {
			completions::ContentPart::Text { text } => Ok(gemini::Part::text(text)),
			completions::ContentPart::ImageUrl { image_url } => media_part(&image_url.url),
			completions::ContentPart::File { file } => match file.file_data {
				Some(data) => media_part(&data),
				None => Err(AIError::UnsupportedContent(strng::literal!(
					"file references require file_data"
				))),
			},
			completions::ContentPart::InputAudio { .. } => Err(AIError::UnsupportedContent(
				strng::literal!("input_audio"),
			)),
		}
	}

	fn media_part(url: &str) -> Result<gemini::Part, AIError> {
		if let Some(uri) = parse_data_uri(url) {
			return Ok(gemini::Part {
				inline_data: Some(gemini::Blob {
					mime_type: uri.media_type.to_string(),
					data: uri.data.to_string(),
				}),
				..Default::default()
			});
		}
		Ok(gemini::Part {
			file_data: Some(gemini::FileData {
				mime_type: None,
				file_uri: url.to_string(),
			}),
			..Default::default()
		})
	}

	fn thinking_config(
		budget_tokens: Option<u64>,
		effort: Option<completions::ReasoningEffort>,
	) -> Option<gemini::ThinkingConfig> {
		let budget = if let Some(b) = budget_tokens {
			Some(b)
		} else {
			match effort? {
				completions::ReasoningEffort::Minimal | completions::ReasoningEffort::Low => {
					Some(1024)
				},
				completions::ReasoningEffort::Medium => Some(2048),
				completions::ReasoningEffort::High | completions::ReasoningEffort::Xhigh => {
					Some(4096)
				},
				completions::ReasoningEffort::None => None,
			}
		};
		budget.map(|thinking_budget| gemini::ThinkingConfig {
			include_thoughts: Some(true),
			thinking_budget: Some(thinking_budget),
		})
	}

	/// What one candidate contributed to a message/delta.
	#[derive(Default)]
	struct CandidateContent {
		content: Option<String>,
		reasoning_text: Option<String>,
		reasoning_signature: Option<String>,
		tool_calls: Vec<(String, String, String)>, // (id, name, arguments)
	}

	fn collect_candidate(
		candidate_content: Option<gemini::Content>,
		next_tool_id: &mut impl FnMut() -> String,
	) -> Result<CandidateContent, AIError> {
		let mut out = CandidateContent::default();
		for part in candidate_content.map(|c| c.parts).unwrap_or_default() {
			if part.is_thought() {
				if let Some(text) = part.text {
					out
						.reasoning_text
						.get_or_insert_with(String::new)
						.push_str(&text);
				}
				if let Some(sig) = part.thought_signature {
					out.reasoning_signature = Some(sig);
				}
				continue;
			}
			// A signature can ride on a non-thought part; it still belongs to
			// the reasoning content.
			if let Some(sig) = part.thought_signature {
				out.reasoning_signature = Some(sig);
			}
			if let Some(text) = part.text {
				out.content.get_or_insert_with(String::new).push_str(&text);
			}
			if let Some(call) = part.function_call {
				let arguments =
					serde_json::to_string(&call.args).map_err(AIError::ResponseMarshal)?;
				out.tool_calls.push((next_tool_id(), call.name, arguments));
			}
		}
		Ok(out)
	}

	fn reasoning_content(
		text: Option<String>,
		signature: Option<String>,
	) -> Option<completions::ReasoningContent> {
		if text.is_none() && signature.is_none() {
			return None;
		}
		Some(completions::ReasoningContent {
			reasoning_text: None,
			redacted_content: None,
			text,
			signature,
		})
	}

	pub fn translate_finish_reason(
		reason: gemini::FinishReason,
		has_tool_calls: bool,
	) -> completions::FinishReason {
		if has_tool_calls {
			return completions::FinishReason::ToolCalls;
		}
		match reason {
			gemini::FinishReason::Stop => completions::FinishReason::Stop,
			gemini::FinishReason::MaxTokens => completions::FinishReason::Length,
			gemini::FinishReason::Safety
			| gemini::FinishReason::Recitation
			| gemini::FinishReason::Blocklist
			| gemini::FinishReason::ProhibitedContent
			| gemini::FinishReason::Spii
			| gemini::FinishReason::ImageSafety => completions::FinishReason::ContentFilter,
			gemini::FinishReason::MalformedFunctionCall | gemini::FinishReason::Other => {
				completions::FinishReason::Stop
			},
		}
	}

	/// translate a non-streaming Gemini response into an OpenAI completions
	/// response.
	pub fn translate_response(
		resp: gemini::GenerateContentResponse,
		request_model: &str,
	) -> Result<completions::Response, AIError> {
		let mut next_tool_id = || Uuid::new_v4().to_string();
		let mut choices = Vec::with_capacity(resp.candidates.len());
		for (i, candidate) in resp.candidates.into_iter().enumerate() {
			let index = candidate.index.unwrap_or(i as u32);
			let collected = collect_candidate(candidate.content, &mut next_tool_id)?;
			let tool_calls = collected
				.tool_calls
				.into_iter()
				.map(|(id, name, arguments)| completions::MessageToolCall {
					id,
					r#type: completions::FunctionType::Function,
					function: completions::FunctionCall { name, arguments },
				})
				.collect_vec();
			let has_tool_calls = !tool_calls.is_empty();
			let message = completions::ResponseMessage {
				role: completions::Role::Assistant,
				content: collected.content,
				refusal: None,
				tool_calls: if has_tool_calls {
					Some(tool_calls)
				} else {
					None
				},
				audio: None,
				reasoning_content: reasoning_content(
					collected.reasoning_text,
					collected.reasoning_signature,
				),
			};
			choices.push(completions::ChatChoice {
				index,
				message,
				finish_reason: candidate
					.finish_reason
					.map(|r| translate_finish_reason(r, has_tool_calls)),
				logprobs: None,
			});
		}

		let mut usage = TokenUsage::default();
		let openai_usage = resp.usage_metadata.map(|m| {
			apply_usage_metadata(&mut usage, &m);
			usage_from_metadata(&m)
		});
		Ok(completions::Response {
			id: resp
				.response_id
				.unwrap_or_else(|| format!("chatcmpl-{}", Uuid::new_v4())),
			object: "chat.completion".to_string(),
			created: chrono::Utc::now().timestamp() as u64,
			model: resp
				.model_version
				.unwrap_or_else(|| request_model.to_string()),
			choices,
			usage: openai_usage,
			system_fingerprint: None,
			service_tier: None,
		})
	}

	pub(crate) fn apply_usage_metadata(usage: &mut TokenUsage, m: &gemini::UsageMetadata) {
		usage.set_input(m.prompt_token_count);
		usage.set_output(m.candidates_token_count);
		usage.set_total(m.total_token_count);
		if let Some(c) = m.cached_content_token_count {
			usage.set_cached_input(c);
		}
	}

	fn usage_from_metadata(m: &gemini::UsageMetadata) -> completions::Usage {
		let details = m
			.cached_content_token_count
			.map(|cached| completions::PromptTokensDetails {
				cached_tokens: Some(cached),
				cache_creation_tokens: None,
				audio_tokens: None,
			});
		completions::Usage {
			prompt_tokens: m.prompt_token_count,
			completion_tokens: m.candidates_token_count,
			total_tokens: m.total_token_count,
			prompt_tokens_details: details,
			completion_tokens_details: m
				.thoughts_token_count
				.map(|t| json!({"reasoning_tokens": t})),
		}
	}

	/// Stateful Gemini-stream to OpenAI-chunk conversion. Tool-call indices
	/// increment globally across the stream so parallel calls spread over
	/// chunks stay distinct.
	pub struct StreamTranslation {
		request_model: Strng,
		model: Option<String>,
		response_id: Option<String>,
		created: u64,
		tool_call_index: u32,
		sent_first_chunk: bool,
		usage: TokenUsage,
	}

	impl StreamTranslation {
		pub fn new(request_model: Strng) -> Self {
			StreamTranslation {
				request_model,
				model: None,
				response_id: None,
				created: chrono::Utc::now().timestamp() as u64,
				tool_call_index: 0,
				sent_first_chunk: false,
				usage: TokenUsage::default(),
			}
		}

		pub fn usage(&self) -> TokenUsage {
			self.usage
		}

		pub fn response_model(&self) -> Strng {
			match &self.model {
				Some(m) if !m.is_empty() => strng::new(m),
				_ => self.request_model.clone(),
			}
		}

		/// Convert one parsed Gemini chunk. Returns the content chunk (if the
		/// candidate said anything) followed by a usage-only chunk when the
		/// provider attached usage metadata.
		pub fn on_chunk(
			&mut self,
			resp: gemini::GenerateContentResponse,
		) -> Result<Vec<completions::StreamResponse>, AIError> {
			if let Some(model) = &resp.model_version {
				self.model = Some(model.clone());
			}
			if let Some(id) = &resp.response_id {
				self.response_id = Some(id.clone());
			}

			let mut out = Vec::new();
			let mut choices = Vec::with_capacity(resp.candidates.len());
			for (i, candidate) in resp.candidates.into_iter().enumerate() {
				let index = candidate.index.unwrap_or(i as u32);
				let mut next_tool_id = || Uuid::new_v4().to_string();
				let collected = collect_candidate(candidate.content, &mut next_tool_id)?;
				let tool_calls = collected
					.tool_calls
					.into_iter()
					.map(|(id, name, arguments)| {
						let chunk = completions::MessageToolCallChunk {
							index: self.tool_call_index,
							id: Some(id),
							r#type: Some(completions::FunctionType::Function),
							function: Some(completions::FunctionCallStream {
								name: Some(name),
								arguments: Some(arguments),
							}),
						};
						self.tool_call_index += 1;
						chunk
					})
					.collect_vec();
				let has_tool_calls = !tool_calls.is_empty();
				let mut delta = completions::StreamResponseDelta {
					content: collected.content,
					tool_calls: if has_tool_calls {
						Some(tool_calls)
					} else {
						None
					},
					reasoning_content: reasoning_content(
						collected.reasoning_text,
						collected.reasoning_signature,
					),
					..Default::default()
				};
				let says_something = delta.content.is_some()
					|| delta.tool_calls.is_some()
					|| delta.reasoning_content.is_some();
				if says_something && !self.sent_first_chunk {
					self.sent_first_chunk = true;
					delta.role = Some(completions::Role::Assistant);
				}
				choices.push(completions::ChatChoiceStream {
					index,
					delta,
					finish_reason: candidate
						.finish_reason
						.map(|r| translate_finish_reason(r, has_tool_calls)),
					logprobs: None,
				});
			}
			if !choices.is_empty() {
				out.push(self.chunk(choices, None));
			}

			if let Some(m) = resp.usage_metadata
				&& m.prompt_token_count > 0
			{
				apply_usage_metadata(&mut self.usage, &m);
				out.push(self.chunk(Vec::new(), Some(usage_from_metadata(&m))));
			}
			Ok(out)
		}

		fn chunk(
			&self,
			choices: Vec<completions::ChatChoiceStream>,
			usage: Option<completions::Usage>,
		) -> completions::StreamResponse {
			completions::StreamResponse {
				id: self
					.response_id
					.clone()
					.unwrap_or_else(|| "unknown".to_string()),
				object: "chat.completion.chunk".to_string(),
				created: self.created,
				model: self.response_model().to_string(),
				choices,
				usage,
			}
		}
	}
}
