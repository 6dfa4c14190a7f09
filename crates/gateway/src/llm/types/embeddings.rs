use serde::{Deserialize, Serialize};

/// Passthrough-preserving view of an OpenAI embeddings request.
#[derive(Debug, Deserialize, Clone, Serialize)]
pub struct Request {
	pub model: Option<String>,
	pub input: serde_json::Value,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub dimensions: Option<u32>,
	// Everything else - passthrough
	#[serde(flatten, default)]
	pub rest: serde_json::Value,
}

#[derive(Debug, Deserialize, Clone, Serialize)]
pub struct Response {
	pub object: String,
	pub model: String,
	pub data: Vec<Embedding>,
	pub usage: Usage,
	#[serde(flatten, default)]
	pub rest: serde_json::Value,
}

#[derive(Debug, Deserialize, Clone, Serialize)]
pub struct Embedding {
	pub index: u32,
	pub object: String,
	pub embedding: Vec<f32>,
	#[serde(flatten, default)]
	pub rest: serde_json::Value,
}

#[derive(Debug, Deserialize, Clone, Serialize)]
pub struct Usage {
	pub prompt_tokens: u64,
	pub total_tokens: u64,
	#[serde(flatten, default)]
	pub rest: serde_json::Value,
}

pub mod typed {
	use serde::{Deserialize, Serialize};

	/// The four wire shapes `input` accepts. Token inputs can only be
	/// forwarded to providers that accept raw token ids.
	#[derive(Debug, Deserialize, Clone, Serialize)]
	#[serde(untagged)]
	pub enum EmbeddingInput {
		Text(String),
		TextArray(Vec<String>),
		Tokens(Vec<u64>),
		TokenArrays(Vec<Vec<u64>>),
	}

	impl EmbeddingInput {
		/// The textual inputs, or None when the input is token ids.
		pub fn as_strings(&self) -> Option<Vec<String>> {
			match self {
				EmbeddingInput::Text(s) => Some(vec![s.clone()]),
				EmbeddingInput::TextArray(v) => Some(v.clone()),
				EmbeddingInput::Tokens(_) | EmbeddingInput::TokenArrays(_) => None,
			}
		}
	}
}
