pub mod strng;

pub mod prelude {
	pub use crate::strng;
	pub use crate::strng::Strng;
}
