pub mod aws_sse;
pub mod jsonl;
pub mod sse;

#[cfg(test)]
#[path = "parse_tests.rs"]
mod tests;
