use std::borrow::Cow;

use bytes::{Buf, Bytes, BytesMut};
use tokio_sse_codec::{Event, Frame, SseEncoder};
use tokio_util::codec::{Decoder, Encoder};

/// The frame delimiters we accept. Providers disagree on line endings, so the
/// first delimiter observed on a stream is locked in for its remainder.
/// Ordering matters only for ties: when two candidates match at the same
/// offset the longer one wins (`\r\n\r\n` also contains `\n\n` one byte in).
const DELIMITERS: &[&[u8]] = &[b"\r\n\r\n", b"\n\n", b"\r\r"];

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
	haystack
		.windows(needle.len())
		.position(|w| w == needle)
}

/// Locate the next frame boundary. Returns (frame_end, delimiter) where
/// frame_end is the offset of the delimiter's first byte.
pub(super) fn scan_delimiter(
	buf: &[u8],
	locked: Option<&'static [u8]>,
) -> Option<(usize, &'static [u8])> {
	if let Some(d) = locked {
		return find_subslice(buf, d).map(|i| (i, d));
	}
	let mut best: Option<(usize, &'static [u8])> = None;
	for d in DELIMITERS {
		if let Some(i) = find_subslice(buf, d) {
			let better = match best {
				None => true,
				// Strict comparison keeps the earlier candidate on ties, so the
				// DELIMITERS ordering (longest first) resolves overlap.
				Some((bi, _)) => i < bi,
			};
			if better {
				best = Some((i, d));
			}
		}
	}
	best
}

/// One parsed SSE frame: the `event:` name (if any) and the concatenated
/// `data:` lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
	pub event: Option<String>,
	pub data: String,
}

impl SseFrame {
	/// Frames with no data lines at all (comments, retry hints) carry nothing
	/// we ever act on.
	pub fn is_empty(&self) -> bool {
		self.event.is_none() && self.data.is_empty()
	}
}

fn parse_frame(raw: &[u8]) -> SseFrame {
	let text = String::from_utf8_lossy(raw);
	let mut event = None;
	let mut data: Vec<&str> = Vec::new();
	for line in text.split(['\r', '\n']) {
		if let Some(rest) = line.strip_prefix("event:") {
			event = Some(rest.strip_prefix(' ').unwrap_or(rest).to_string());
		} else if let Some(rest) = line.strip_prefix("data:") {
			data.push(rest.strip_prefix(' ').unwrap_or(rest));
		}
		// Everything else (id:, retry:, ": comment") is ignored.
	}
	SseFrame {
		event,
		data: data.join("\n"),
	}
}

/// A `tokio_util::codec::Decoder` over SSE frames.
///
/// Incoming bytes accumulate in the caller's `BytesMut`; each decode pulls
/// off one complete frame, leaving any trailing partial frame for the next
/// call. The frame delimiter is detected on first use and locked.
#[derive(Default)]
pub struct SseCodec {
	delimiter: Option<&'static [u8]>,
}

impl SseCodec {
	pub fn new() -> Self {
		Self::default()
	}
}

impl Decoder for SseCodec {
	type Item = SseFrame;
	type Error = std::io::Error;

	fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
		let Some((end, delim)) = scan_delimiter(src, self.delimiter) else {
			return Ok(None);
		};
		self.delimiter = Some(delim);
		let frame = src.split_to(end);
		src.advance(delim.len());
		Ok(Some(parse_frame(&frame)))
	}

	fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
		if let Some(f) = self.decode(src)? {
			return Ok(Some(f));
		}
		if src.is_empty() {
			return Ok(None);
		}
		// A final frame may lack its trailing delimiter.
		let frame = src.split_to(src.len());
		let frame = parse_frame(&frame);
		if frame.is_empty() {
			Ok(None)
		} else {
			Ok(Some(frame))
		}
	}
}

/// Emit one SSE frame (`event: <name>` line only when a name is given,
/// then `data: <data>` and a blank line).
pub fn emit_event(name: &str, data: &[u8], dst: &mut BytesMut) -> std::io::Result<()> {
	let frame = Frame::Event(Event::<Bytes> {
		data: Bytes::copy_from_slice(data),
		name: Cow::Owned(name.to_string()),
		id: None,
	});
	SseEncoder::new()
		.encode(frame, dst)
		.map_err(std::io::Error::other)
}

/// Emit a bare `data:` frame, the shape OpenAI-style chunk streams use.
pub fn emit_data(data: &[u8], dst: &mut BytesMut) -> std::io::Result<()> {
	let frame = Frame::Event(Event::<Bytes> {
		data: Bytes::copy_from_slice(data),
		name: Cow::Borrowed(""),
		id: None,
	});
	SseEncoder::new()
		.encode(frame, dst)
		.map_err(std::io::Error::other)
}
