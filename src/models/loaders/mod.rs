pub mod image_loader;
pub mod toml_loader;

pub use image_loader::load_image;
pub use toml_loader::{load_answer_bank_toml, parse_answer_bank_toml};
