use serde::Deserialize;
use serde_json::json;

use super::ToolDescriptor;
use crate::deck::Note;

pub const NAME: &str = "addCardsToDeck";

/// Arguments the model supplies to `addCardsToDeck`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCardsArgs {
    pub note_type: String,
    pub notes: Vec<Note>,
}

pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor::function(
        NAME,
        "Adds a list of new cards (notes) to a specified Anki deck.",
        json!({
            "type": "object",
            "properties": {
                "noteType": {
                    "type": "string",
                    "description": "The Anki note type to use for the new cards (e.g., \"Basic\", \"Basic (and reversed card)\")."
                },
                "notes": {
                    "type": "array",
                    "description": "An array of notes to add. Each note should have a \"front\" and \"back\".",
                    "items": {
                        "type": "object",
                        "properties": {
                            "front": {
                                "type": "string",
                                "description": "The content for the front of the card."
                            },
                            "back": {
                                "type": "string",
                                "description": "The content for the back of the card."
                            }
                        },
                        "required": ["front", "back"]
                    }
                }
            },
            "required": ["noteType", "notes"]
        }),
    )
}
