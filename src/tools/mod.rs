pub mod add_cards;
pub mod get_cards;

pub use add_cards::AddCardsArgs;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;

use crate::ollama::ToolCall;

/// A function the model may call, in Ollama's `tools` format.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDescriptor {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub function: FunctionDescriptor,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Value,
}

impl ToolDescriptor {
    fn function(name: &'static str, description: &'static str, parameters: Value) -> Self {
        Self {
            kind: "function",
            function: FunctionDescriptor {
                name,
                description,
                parameters,
            },
        }
    }
}

/// Every tool the model is offered. Sent unchanged with each chat request.
pub fn registry() -> Vec<ToolDescriptor> {
    vec![add_cards::descriptor(), get_cards::descriptor()]
}

/// A tool call resolved against the registry.
#[derive(Debug, Clone, PartialEq)]
pub enum DeckOperation {
    AddCards(AddCardsArgs),
    GetCards,
    Unsupported(String),
}

impl DeckOperation {
    /// Resolve a model tool call by exact function name.
    ///
    /// Unknown names are not an error; malformed arguments for a known
    /// function are.
    pub fn from_call(call: &ToolCall) -> Result<Self> {
        match call.function.name.as_str() {
            add_cards::NAME => {
                let args = decode_arguments(&call.function.arguments)
                    .with_context(|| format!("Invalid arguments for {}", add_cards::NAME))?;
                Ok(Self::AddCards(args))
            }
            get_cards::NAME => Ok(Self::GetCards),
            other => Ok(Self::Unsupported(other.to_string())),
        }
    }
}

/// Ollama sends arguments as an object; OpenAI-style servers send a JSON string.
fn decode_arguments<T: serde::de::DeserializeOwned>(arguments: &Value) -> Result<T> {
    match arguments {
        Value::String(raw) => Ok(serde_json::from_str(raw)?),
        other => Ok(serde_json::from_value(other.clone())?),
    }
}
