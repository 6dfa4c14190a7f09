pub mod gemini;
pub mod messages;
pub mod schema;
pub mod vertex;

/// MIME types we can hand to Anthropic-family models as inline images.
pub(crate) const SUPPORTED_IMAGE_TYPES: &[&str] =
	&["image/jpeg", "image/png", "image/gif", "image/webp"];

pub(crate) const PDF_TYPE: &str = "application/pdf";

pub(crate) struct DataUri<'a> {
	pub media_type: &'a str,
	pub data: &'a str,
}

/// Split a `data:<mime>;base64,<payload>` URI. Non-base64 data URIs are not
/// accepted by any upstream we speak to, so they parse as None and fall into
/// the URL handling of the caller.
pub(crate) fn parse_data_uri(url: &str) -> Option<DataUri<'_>> {
	let rest = url.strip_prefix("data:")?;
	let (meta, data) = rest.split_once(',')?;
	let media_type = meta.strip_suffix(";base64")?;
	Some(DataUri { media_type, data })
}

/// Whether a URL names a PDF by path suffix (query string ignored).
pub(crate) fn is_pdf_url(url: &str) -> bool {
	let path = url.split(['?', '#']).next().unwrap_or(url);
	path.to_ascii_lowercase().ends_with(".pdf")
}

/// Tool-call arguments arrive as a JSON-encoded string; every upstream we
/// translate to wants the decoded object. An empty string means "no
/// arguments".
pub(crate) fn parse_tool_arguments(arguments: &str) -> Result<serde_json::Value, crate::llm::AIError> {
	use gateway_core::strng;

	use crate::llm::AIError;
	if arguments.trim().is_empty() {
		return Ok(serde_json::json!({}));
	}
	let v: serde_json::Value = serde_json::from_str(arguments).map_err(|e| {
		AIError::InvalidRequest(strng::format!("malformed tool call arguments: {e}"))
	})?;
	if !v.is_object() {
		return Err(AIError::InvalidRequest(strng::literal!(
			"tool call arguments must be a JSON object"
		)));
	}
	Ok(v)
}
