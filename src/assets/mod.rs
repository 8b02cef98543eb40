pub(crate) mod color;
pub mod font;
pub mod pattern;
pub mod source;
