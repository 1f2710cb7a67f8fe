pub mod file_utils;
pub mod request;
pub mod theme;
pub mod types;

pub use file_utils::*;
pub use request::*;
pub use theme::{theme, themes, Rgb, ThemeSpec, DEFAULT_THEME};
pub use types::*;
