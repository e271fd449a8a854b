use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::anki::{self, AddNotes, AnkiTransport, FindNotes, NewNote, NoteOptions, NotesInfo};

/// Which deck to target and how note fields are named in its note type.
#[derive(Debug, Clone, PartialEq)]
pub struct DeckConfig {
    pub deck_name: String,
    pub front_field: String,
    pub back_field: String,
}

/// One flashcard as proposed by the model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Note {
    #[serde(default)]
    pub front: String,
    #[serde(default)]
    pub back: String,
}

/// A note as stored in Anki.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedNote {
    pub note_id: i64,
    pub front: String,
    pub back: String,
}

/// Result of `add_cards`, reported back to the model as-is.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddCardsOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub added_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<Option<i64>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AddCardsOutcome {
    fn added(results: Vec<Option<i64>>) -> Self {
        Self {
            success: true,
            added_count: Some(results.iter().filter(|id| id.is_some()).count()),
            results: Some(results),
            error: None,
        }
    }

    fn failed(error: String) -> Self {
        Self {
            success: false,
            added_count: None,
            results: None,
            error: Some(error),
        }
    }
}

/// Reads and appends notes in a single Anki deck.
pub struct DeckAccessor<T: AnkiTransport> {
    transport: T,
    config: DeckConfig,
}

impl<T: AnkiTransport> DeckAccessor<T> {
    pub fn new(transport: T, config: DeckConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &DeckConfig {
        &self.config
    }

    /// Add all `notes` in one `addNotes` call. Failures come back as a value.
    pub async fn add_cards(&self, note_type: &str, notes: &[Note]) -> AddCardsOutcome {
        log::info!(
            "Deck: adding {} card(s) to \"{}\" with note type \"{}\"",
            notes.len(),
            self.config.deck_name,
            note_type
        );

        let action = AddNotes {
            notes: notes.iter().map(|n| self.new_note(note_type, n)).collect(),
        };

        match anki::request(&self.transport, &action).await {
            Ok(results) => {
                let outcome = AddCardsOutcome::added(results);
                log::info!(
                    "Deck: added {} of {} card(s)",
                    outcome.added_count.unwrap_or(0),
                    notes.len()
                );
                outcome
            }
            Err(e) => {
                log::error!("Deck: error adding cards: {}", e);
                AddCardsOutcome::failed(e.to_string())
            }
        }
    }

    /// All notes in the deck. An empty deck and a failed lookup both yield
    /// an empty list.
    pub async fn get_cards(&self) -> Vec<PersistedNote> {
        log::info!("Deck: reading cards from \"{}\"", self.config.deck_name);

        match self.fetch_cards().await {
            Ok(cards) => cards,
            Err(e) => {
                log::error!("Deck: error getting cards: {}", e);
                Vec::new()
            }
        }
    }

    async fn fetch_cards(&self) -> Result<Vec<PersistedNote>, anki::ApiError> {
        let query = FindNotes {
            query: format!("deck:\"{}\"", self.config.deck_name),
        };
        let note_ids = anki::request(&self.transport, &query).await?;
        if note_ids.is_empty() {
            log::info!("Deck: no notes found in \"{}\"", self.config.deck_name);
            return Ok(Vec::new());
        }

        let infos = anki::request(&self.transport, &NotesInfo { notes: note_ids }).await?;
        let field = |info: &anki::NoteInfo, name: &str| {
            info.fields
                .get(name)
                .map(|f| f.value.clone())
                .unwrap_or_default()
        };

        Ok(infos
            .iter()
            .map(|info| PersistedNote {
                note_id: info.note_id,
                front: field(info, &self.config.front_field),
                back: field(info, &self.config.back_field),
            })
            .collect())
    }

    fn new_note(&self, note_type: &str, note: &Note) -> NewNote {
        let mut fields = serde_json::Map::new();
        fields.insert(self.config.front_field.clone(), Value::String(note.front.clone()));
        fields.insert(self.config.back_field.clone(), Value::String(note.back.clone()));

        NewNote {
            deck_name: self.config.deck_name.clone(),
            model_name: note_type.to_string(),
            fields,
            options: NoteOptions {
                allow_duplicate: false,
            },
            tags: Vec::new(),
        }
    }
}
