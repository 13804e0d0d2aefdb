pub mod base;
pub mod openai;
