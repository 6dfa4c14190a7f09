pub mod json;
pub mod llm;
pub mod parse;
pub mod serdes;
pub mod telemetry;
