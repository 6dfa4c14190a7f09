use gateway_core::strng;
use serde_json::Value;

use crate::llm::AIError;

// Generous bound on nesting; real tool schemas are nowhere near it, and it
// backstops pathological inputs the visited-set cannot see (deeply nested
// non-ref structures).
const MAX_DEPTH: usize = 128;

/// Resolve every `$ref` in a JSON Schema document in place, producing a
/// self-contained schema. Providers that consume tool parameter schemas
/// (Anthropic, Gemini) do not follow references, so they must be expanded
/// before forwarding. External references, dangling pointers, and reference
/// cycles are all request errors.
pub fn dereference(schema: &Value) -> Result<Value, AIError> {
	let mut stack = Vec::new();
	resolve(schema, schema, &mut stack, 0)
}

fn resolve(
	root: &Value,
	node: &Value,
	stack: &mut Vec<String>,
	depth: usize,
) -> Result<Value, AIError> {
	if depth > MAX_DEPTH {
		return Err(AIError::SchemaReference(strng::literal!(
			"schema nesting too deep"
		)));
	}
	match node {
		Value::Object(map) => {
			if let Some(reference) = map.get("$ref") {
				let Some(reference) = reference.as_str() else {
					return Err(AIError::SchemaReference(strng::literal!(
						"$ref must be a string"
					)));
				};
				if stack.iter().any(|seen| seen == reference) {
					return Err(AIError::SchemaReference(strng::format!(
						"circular $ref: {reference}"
					)));
				}
				let target = lookup(root, reference)?;
				stack.push(reference.to_string());
				let resolved = resolve(root, target, stack, depth + 1)?;
				stack.pop();
				// Siblings of $ref are ignored, as JSON Schema drafts before
				// 2019-09 require.
				return Ok(resolved);
			}
			let mut out = serde_json::Map::with_capacity(map.len());
			for (k, v) in map {
				out.insert(k.clone(), resolve(root, v, stack, depth + 1)?);
			}
			Ok(Value::Object(out))
		},
		Value::Array(items) => {
			let resolved = items
				.iter()
				.map(|v| resolve(root, v, stack, depth + 1))
				.collect::<Result<Vec<_>, _>>()?;
			Ok(Value::Array(resolved))
		},
		other => Ok(other.clone()),
	}
}

fn lookup<'a>(root: &'a Value, reference: &str) -> Result<&'a Value, AIError> {
	let Some(pointer) = reference.strip_prefix('#') else {
		return Err(AIError::SchemaReference(strng::format!(
			"external $ref not supported: {reference}"
		)));
	};
	root.pointer(pointer).ok_or_else(|| {
		AIError::SchemaReference(strng::format!("dangling $ref: {reference}"))
	})
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn resolves_nested_refs() {
		let schema = json!({
			"type": "object",
			"properties": {
				"loc": {"$ref": "#/definitions/location"},
			},
			"definitions": {
				"location": {
					"type": "object",
					"properties": {"city": {"$ref": "#/definitions/name"}},
				},
				"name": {"type": "string"},
			},
		});
		let out = dereference(&schema).unwrap();
		assert_eq!(
			out["properties"]["loc"]["properties"]["city"],
			json!({"type": "string"})
		);
	}

	#[test]
	fn circular_ref_fails() {
		let schema = json!({
			"properties": {"a": {"$ref": "#/definitions/a"}},
			"definitions": {"a": {"properties": {"b": {"$ref": "#/definitions/a"}}}},
		});
		let err = dereference(&schema).unwrap_err();
		assert!(err.to_string().contains("circular"), "{err}");
	}

	#[test]
	fn dangling_and_external_refs_fail() {
		let dangling = json!({"$ref": "#/definitions/missing"});
		assert!(dereference(&dangling).is_err());
		let external = json!({"$ref": "https://example.com/schema.json#/a"});
		assert!(dereference(&external).is_err());
	}

	#[test]
	fn escaped_pointer_tokens_resolve() {
		let schema = json!({
			"field": {"$ref": "#/defs/a~1b"},
			"defs": {"a/b": {"type": "integer"}},
		});
		let out = dereference(&schema).unwrap();
		assert_eq!(out["field"], json!({"type": "integer"}));
	}
}
