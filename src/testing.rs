//! In-memory stand-ins for AnkiConnect and Ollama, shared by unit tests.

use anyhow::Result;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crate::anki::{AnkiTransport, ApiError};
use crate::deck::DeckConfig;
use crate::ollama::{ChatMessage, ChatModel};
use crate::tools::ToolDescriptor;

pub fn deck_config() -> DeckConfig {
    DeckConfig {
        deck_name: "TestDeck".to_string(),
        front_field: "Front".to_string(),
        back_field: "Back".to_string(),
    }
}

#[derive(Default)]
struct AnkiState {
    next_id: i64,
    /// (note id, deck, fields as `{name: {value}}`)
    notes: Vec<(i64, String, Value)>,
    rejected_fronts: HashSet<String>,
    calls: Vec<(String, Value)>,
}

/// Enough of AnkiConnect to serve `addNotes`, `findNotes` and `notesInfo`.
#[derive(Clone, Default)]
pub struct FakeAnki {
    state: Arc<Mutex<AnkiState>>,
}

impl FakeAnki {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `addNotes` return null for notes with a field equal to `front`.
    pub fn reject_front(&self, front: &str) {
        self.state.lock().unwrap().rejected_fronts.insert(front.to_string());
    }

    pub fn insert_raw(&self, deck: &str, fields: Value) -> i64 {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = 1_700_000_000_000 + state.next_id;
        state.notes.push((id, deck.to_string(), fields));
        id
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn fronts(&self, deck: &str) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .notes
            .iter()
            .filter(|(_, d, _)| d == deck)
            .filter_map(|(_, _, fields)| fields["Front"]["value"].as_str().map(str::to_string))
            .collect()
    }

    fn add_notes(&self, params: &Value) -> Result<Value, ApiError> {
        let notes = params["notes"]
            .as_array()
            .ok_or_else(|| ApiError::Service("notes must be a list".to_string()))?;

        let mut ids = Vec::new();
        for note in notes {
            let deck = note["deckName"].as_str().unwrap_or_default().to_string();
            let fields: serde_json::Map<String, Value> = note["fields"]
                .as_object()
                .map(|f| {
                    f.iter()
                        .map(|(k, v)| (k.clone(), json!({ "value": v })))
                        .collect()
                })
                .unwrap_or_default();
            let rejected = {
                let state = self.state.lock().unwrap();
                fields.values().any(|v| {
                    v["value"]
                        .as_str()
                        .is_some_and(|text| state.rejected_fronts.contains(text))
                })
            };
            if rejected {
                ids.push(Value::Null);
            } else {
                ids.push(json!(self.insert_raw(&deck, Value::Object(fields))));
            }
        }
        Ok(Value::Array(ids))
    }

    fn find_notes(&self, params: &Value) -> Result<Value, ApiError> {
        let query = params["query"].as_str().unwrap_or_default();
        let deck = query
            .strip_prefix("deck:\"")
            .and_then(|q| q.strip_suffix('"'))
            .unwrap_or(query);
        let state = self.state.lock().unwrap();
        let ids: Vec<i64> = state
            .notes
            .iter()
            .filter(|(_, d, _)| d == deck)
            .map(|(id, _, _)| *id)
            .collect();
        Ok(json!(ids))
    }

    fn notes_info(&self, params: &Value) -> Result<Value, ApiError> {
        let wanted: Vec<i64> = params["notes"]
            .as_array()
            .map(|ids| ids.iter().filter_map(Value::as_i64).collect())
            .unwrap_or_default();
        let state = self.state.lock().unwrap();
        let infos: Vec<Value> = state
            .notes
            .iter()
            .filter(|(id, _, _)| wanted.contains(id))
            .map(|(id, _, fields)| json!({ "noteId": id, "modelName": "Basic", "tags": [], "fields": fields }))
            .collect();
        Ok(Value::Array(infos))
    }
}

#[async_trait::async_trait]
impl AnkiTransport for FakeAnki {
    async fn invoke(&self, action: &str, _version: u8, params: Value) -> Result<Value, ApiError> {
        self.state
            .lock()
            .unwrap()
            .calls
            .push((action.to_string(), params.clone()));

        match action {
            "addNotes" => self.add_notes(&params),
            "findNotes" => self.find_notes(&params),
            "notesInfo" => self.notes_info(&params),
            other => Err(ApiError::Service(format!("unsupported action: {}", other))),
        }
    }
}

/// AnkiConnect when Anki is not running.
pub struct UnreachableAnki;

#[async_trait::async_trait]
impl AnkiTransport for UnreachableAnki {
    async fn invoke(&self, _action: &str, _version: u8, _params: Value) -> Result<Value, ApiError> {
        Err(ApiError::Unreachable)
    }
}

/// Replays canned replies in order and records every request's messages.
/// Errors once the script runs out.
#[derive(Clone)]
pub struct ScriptedChat {
    replies: Arc<Mutex<Vec<ChatMessage>>>,
    requests: Arc<Mutex<Vec<Vec<ChatMessage>>>>,
}

impl ScriptedChat {
    pub fn new(mut replies: Vec<ChatMessage>) -> Self {
        replies.reverse();
        Self {
            replies: Arc::new(Mutex::new(replies)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn requests(&self) -> Vec<Vec<ChatMessage>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ChatModel for ScriptedChat {
    async fn chat(&self, messages: &[ChatMessage], tools: &[ToolDescriptor]) -> Result<ChatMessage> {
        assert_eq!(tools.len(), 2, "every request carries the full registry");
        self.requests.lock().unwrap().push(messages.to_vec());
        self.replies
            .lock()
            .unwrap()
            .pop()
            .ok_or_else(|| anyhow::anyhow!("model unavailable"))
    }
}
