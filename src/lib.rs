pub mod agent;
pub mod config;
pub mod error;
pub mod ethereum;
pub mod llm;
pub mod tools;
