pub mod agent;
pub mod anki;
pub mod batch;
pub mod cli;
pub mod config;
pub mod conversation;
pub mod deck;
pub mod ollama;
pub mod tools;

#[cfg(test)]
mod testing;
