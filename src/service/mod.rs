pub mod classification;
pub mod evaluation;
pub mod generation;
pub mod interpretation;
pub mod llm;
pub mod metrics;

pub use classification::BugClassifier;
pub use generation::TestGenerator;
pub use interpretation::LogInterpreter;
pub use llm::{LlmError, TextGenerator};
pub use metrics::MetricsCollector;
