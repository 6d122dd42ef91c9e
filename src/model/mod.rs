pub mod classification;
pub mod config;
pub mod evaluation;
pub mod generation;
pub mod interpretation;

pub use classification::*;
pub use config::{Config, GenerationParams, LlmBackend, ModelInfo};
pub use evaluation::*;
pub use generation::*;
pub use interpretation::*;
