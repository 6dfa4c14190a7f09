use gateway_core::prelude::Strng;
use gateway_core::strng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provider {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub model: Option<Strng>,
}

impl super::Provider for Provider {
	const NAME: Strng = strng::literal!("anthropic");
}

pub const DEFAULT_PATH: &str = "/v1/messages";

/// Error `type` implied by an upstream status code, used when an Anthropic
/// error body must be synthesized from a bare status.
/// https://docs.anthropic.com/en/api/errors
pub fn error_type_for_status(status: u16) -> &'static str {
	match status {
		400 => "invalid_request_error",
		401 => "authentication_error",
		403 => "permission_error",
		404 => "not_found_error",
		429 => "rate_limit_error",
		500 => "internal_server_error",
		503 => "service_unavailable_error",
		_ => "api_error",
	}
}
