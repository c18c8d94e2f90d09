mod content;

pub use content::{Content, Part};
