use bytes::{Buf, Bytes, BytesMut};
use tokio_util::codec::Decoder;

use super::sse::scan_delimiter;

/// Decoder for line-delimited JSON streams, as emitted by Gemini's
/// `streamGenerateContent`. Lines may carry an SSE-style `data: ` prefix,
/// which is stripped. The line delimiter is detected from the same candidate
/// set as SSE frames and locked on first use; an unterminated trailing line
/// stays buffered until more bytes arrive (or end of stream).
#[derive(Default)]
pub struct JsonLineCodec {
	delimiter: Option<&'static [u8]>,
}

impl JsonLineCodec {
	pub fn new() -> Self {
		Self::default()
	}
}

fn strip_line(mut raw: BytesMut) -> Option<Bytes> {
	if raw.starts_with(b"data:") {
		raw.advance(5);
		if raw.starts_with(b" ") {
			raw.advance(1);
		}
	}
	// Skip blank keep-alive lines
	if raw.iter().all(|b| b.is_ascii_whitespace()) {
		return None;
	}
	Some(raw.freeze())
}

impl Decoder for JsonLineCodec {
	type Item = Bytes;
	type Error = std::io::Error;

	fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
		loop {
			let Some((end, delim)) = scan_delimiter(src, self.delimiter) else {
				return Ok(None);
			};
			self.delimiter = Some(delim);
			let line = src.split_to(end);
			src.advance(delim.len());
			if let Some(line) = strip_line(line) {
				return Ok(Some(line));
			}
		}
	}

	fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
		if let Some(line) = self.decode(src)? {
			return Ok(Some(line));
		}
		if src.is_empty() {
			return Ok(None);
		}
		let line = src.split_to(src.len());
		Ok(strip_line(line))
	}
}
