use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Convert between two serde types through their JSON representation.
/// Used to move between the passthrough-preserving view of a body (unknown
/// fields flattened into `rest`) and its typed view.
pub fn convert<S: Serialize, D: DeserializeOwned>(s: &S) -> Result<D, serde_json::Error> {
	let v = serde_json::to_value(s)?;
	serde_json::from_value(v)
}

/// Tolerant path accessor: walks object keys, returning None on any missing
/// or non-object intermediate instead of failing.
pub fn traverse<'a>(v: &'a Value, path: &[&str]) -> Option<&'a Value> {
	let mut cur = v;
	for key in path {
		cur = cur.as_object()?.get(*key)?;
	}
	Some(cur)
}

/// Like traverse, but yields the string value at the path.
pub fn traverse_string<'a>(v: &'a Value, path: &[&str]) -> Option<&'a str> {
	traverse(v, path).and_then(Value::as_str)
}
