use gateway_core::prelude::Strng;
use gateway_core::strng;
use serde::{Deserialize, Serialize};

use crate::llm::RouteType;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provider {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub model: Option<Strng>,
}

impl super::Provider for Provider {
	const NAME: Strng = strng::literal!("openai");
}

pub const DEFAULT_VERSION: &str = "v1";

/// The upstream path for a route. `version` is the URL prefix configured for
/// the backend (typically "v1"); it may itself contain slashes for gateways
/// that nest the API under a longer base path.
pub fn path(route: RouteType, version: &str) -> Strng {
	let suffix = match route {
		RouteType::Completions => "chat/completions",
		RouteType::Embeddings => "embeddings",
		RouteType::Responses => "responses",
		RouteType::Speech => "audio/speech",
		RouteType::ImageGeneration => "images/generations",
		// Messages is not an OpenAI surface; the factory rejects the pairing
		// before path construction.
		RouteType::Messages => "chat/completions",
	};
	strng::format!("/{}/{}", version.trim_matches('/'), suffix)
}
