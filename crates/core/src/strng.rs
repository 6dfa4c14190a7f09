/// Strng is a cheaply clonable, immutable string. Cloning is a reference
/// count bump, and strings under (roughly) 22 bytes are stored inline.
/// Use it anywhere a string is stored once and copied around many times,
/// such as model names and provider identifiers.
pub type Strng = arcstr::ArcStr;

// literal! builds a Strng at compile time with no allocation.
// format! is the allocating equivalent of std's format!.
pub use arcstr::format;
pub use arcstr::literal;

pub fn new<A: AsRef<str>>(s: A) -> Strng {
	arcstr::ArcStr::from(s.as_ref())
}
