pub mod colors;
pub mod render;
