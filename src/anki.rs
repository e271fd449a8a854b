use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

/// The one error kind callers of the AnkiConnect client ever observe.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// AnkiConnect answered with a non-null `error`, or a non-2xx status.
    #[error("{0}")]
    Service(String),
    /// The response did not follow the `{error, result}` envelope.
    #[error("{0}")]
    Protocol(String),
    #[error("No response received from server")]
    Unreachable,
    #[error("{0}")]
    Transport(String),
}

/// Request/response seam for AnkiConnect.
#[async_trait::async_trait]
pub trait AnkiTransport: Send + Sync {
    async fn invoke(&self, action: &str, version: u8, params: Value) -> Result<Value, ApiError>;
}

/// A typed AnkiConnect action: the struct serializes to `params`.
pub trait AnkiAction: Serialize + Sync {
    const NAME: &'static str;
    const VERSION: u8 = 6;
    type Output: DeserializeOwned;
}

/// Invoke a typed action and decode its result once, at the edge.
pub async fn request<T, A>(transport: &T, action: &A) -> Result<A::Output, ApiError>
where
    T: AnkiTransport + ?Sized,
    A: AnkiAction,
{
    let params = serde_json::to_value(action)
        .map_err(|e| ApiError::Transport(e.to_string()))?;
    let result = transport.invoke(A::NAME, A::VERSION, params).await?;
    serde_json::from_value(result).map_err(|e| {
        ApiError::Protocol(format!("unexpected result for {}: {}", A::NAME, e))
    })
}

/// Validate the `{error, result}` envelope and unwrap `result`.
pub fn parse_envelope(body: Value) -> Result<Value, ApiError> {
    let Value::Object(mut fields) = body else {
        return Err(ApiError::Protocol("response is not a JSON object".to_string()));
    };
    if fields.len() != 2 {
        return Err(ApiError::Protocol(
            "response has an unexpected number of fields".to_string(),
        ));
    }
    let error = fields.remove("error").ok_or_else(|| {
        ApiError::Protocol("response is missing required error field".to_string())
    })?;
    let result = fields.remove("result").ok_or_else(|| {
        ApiError::Protocol("response is missing required result field".to_string())
    })?;

    match error {
        Value::Null => Ok(result),
        Value::String(message) => Err(ApiError::Service(message)),
        other => Err(ApiError::Service(other.to_string())),
    }
}

/// reqwest-backed AnkiConnect client.
pub struct AnkiConnectClient {
    pub endpoint: String,
    client: reqwest::Client,
}

impl AnkiConnectClient {
    pub fn new(endpoint: String) -> Self {
        Self {
            endpoint,
            client: reqwest::Client::new(),
        }
    }
}

fn classify(err: reqwest::Error) -> ApiError {
    if err.is_connect() || err.is_timeout() {
        ApiError::Unreachable
    } else {
        ApiError::Transport(err.to_string())
    }
}

#[async_trait::async_trait]
impl AnkiTransport for AnkiConnectClient {
    async fn invoke(&self, action: &str, version: u8, params: Value) -> Result<Value, ApiError> {
        log::debug!("AnkiConnect: {} (v{})", action, version);

        let body = json!({
            "action": action,
            "version": version,
            "params": params,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(classify)?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .json::<Value>()
                .await
                .ok()
                .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
                .unwrap_or_else(|| "An error occurred".to_string());
            log::debug!("AnkiConnect: {} returned {}", action, status);
            return Err(ApiError::Service(message));
        }

        let body: Value = response.json().await.map_err(classify)?;
        parse_envelope(body)
    }
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteOptions {
    pub allow_duplicate: bool,
}

/// One note in an `addNotes` batch. `fields` maps field names to values.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNote {
    pub deck_name: String,
    pub model_name: String,
    pub fields: serde_json::Map<String, Value>,
    pub options: NoteOptions,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AddNotes {
    pub notes: Vec<NewNote>,
}

impl AnkiAction for AddNotes {
    const NAME: &'static str = "addNotes";
    /// One entry per input note; `None` means Anki rejected it.
    type Output = Vec<Option<i64>>;
}

#[derive(Debug, Clone, Serialize)]
pub struct FindNotes {
    pub query: String,
}

impl AnkiAction for FindNotes {
    const NAME: &'static str = "findNotes";
    type Output = Vec<i64>;
}

#[derive(Debug, Clone, Serialize)]
pub struct NotesInfo {
    pub notes: Vec<i64>,
}

impl AnkiAction for NotesInfo {
    const NAME: &'static str = "notesInfo";
    type Output = Vec<NoteInfo>;
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NoteInfo {
    pub note_id: i64,
    #[serde(default)]
    pub fields: std::collections::HashMap<String, FieldValue>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct FieldValue {
    #[serde(default)]
    pub value: String,
}
