use crate::llm::AIError;
use crate::llm::types::{embeddings, vertex};

pub mod from_embeddings {
	use gateway_core::strng;
	use itertools::Itertools;

	use super::*;
	use crate::llm::TokenUsage;
	use crate::llm::types::embeddings::typed::EmbeddingInput;

	/// translate an OpenAI embeddings request into a Vertex predict request.
	pub fn translate_request(req: &embeddings::Request) -> Result<vertex::PredictRequest, AIError> {
		let input: EmbeddingInput =
			serde_json::from_value(req.input.clone()).map_err(AIError::RequestParsing)?;
		let Some(texts) = input.as_strings() else {
			return Err(AIError::UnsupportedContent(strng::literal!(
				"token array embedding inputs"
			)));
		};

		let task_type = req
			.rest
			.get("task_type")
			.and_then(|v| v.as_str())
			.map(|s| s.to_string());
		let title = req
			.rest
			.get("title")
			.and_then(|v| v.as_str())
			.map(|s| s.to_string());
		// Vertex rejects a title on anything but document-retrieval inputs;
		// surface that as a request error instead of an upstream 400.
		if title.is_some() && task_type.as_deref() != Some("RETRIEVAL_DOCUMENT") {
			return Err(AIError::InvalidRequest(strng::literal!(
				"title is only valid with task_type RETRIEVAL_DOCUMENT"
			)));
		}

		// Vertex natively supports batching via the instances array, so each
		// input string maps to an Instance directly.
		let instances = texts
			.into_iter()
			.map(|content| vertex::Instance {
				content,
				task_type: task_type.clone(),
				title: title.clone(),
			})
			.collect_vec();

		let auto_truncate = req.rest.get("auto_truncate").and_then(|v| v.as_bool());
		let output_dimensionality = req.dimensions.map(|d| d as u64);
		let parameters = if auto_truncate.is_some() || output_dimensionality.is_some() {
			Some(vertex::Parameters {
				auto_truncate,
				output_dimensionality,
			})
		} else {
			None
		};

		Ok(vertex::PredictRequest {
			instances,
			parameters,
		})
	}

	/// translate a Vertex predict response into the OpenAI embeddings shape.
	/// Embeddings have no output tokens; input and total are the summed
	/// per-prediction token counts, when the provider reports them.
	pub fn translate_response(
		resp: vertex::PredictResponse,
		model: &str,
	) -> Result<(embeddings::Response, TokenUsage), AIError> {
		let mut total_prompt_tokens = 0;
		let mut data = Vec::with_capacity(resp.predictions.len());
		for (i, pred) in resp.predictions.into_iter().enumerate() {
			let mut embeddings_result = pred.embeddings;
			if let Some(stats) = &embeddings_result.statistics {
				total_prompt_tokens += stats.token_count;
			}
			data.push(embeddings::Embedding {
				index: i as u32,
				object: "embedding".to_string(),
				// Move the large vector out of the response body rather than
				// re-allocating it during translation.
				embedding: std::mem::take(&mut embeddings_result.values),
				rest: Default::default(),
			});
		}

		let mut usage = TokenUsage::default();
		usage.set_input(total_prompt_tokens);
		usage.set_total(total_prompt_tokens);

		let resp = embeddings::Response {
			object: "list".to_string(),
			model: model.to_string(),
			data,
			usage: embeddings::Usage {
				prompt_tokens: total_prompt_tokens,
				total_tokens: total_prompt_tokens,
				rest: Default::default(),
			},
			rest: Default::default(),
		};
		Ok((resp, usage))
	}
}
