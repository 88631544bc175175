//! 展示层
//!
//! 只消费 `RequestState`，不参与解析流程。

pub mod html;
pub mod math_text;
pub mod terminal;

pub use html::render_detailed_method;
pub use math_text::{segments, Segment};
pub use terminal::{loading_message, render_state};
