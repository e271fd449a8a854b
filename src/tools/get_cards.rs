use serde_json::json;

use super::ToolDescriptor;

pub const NAME: &str = "getCardsFromDeck";

/// `getCardsFromDeck` takes no input; the properties mirror `addCardsToDeck`
/// so models that require a parameter schema accept it.
pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor::function(
        NAME,
        "Retrieves all cards (notes) from a specified Anki deck.",
        json!({
            "type": "object",
            "properties": {
                "noteType": {
                    "type": "string",
                    "description": "Unused for this function."
                },
                "notes": {
                    "type": "array",
                    "description": "Unused for this function.",
                    "items": {
                        "type": "object",
                        "properties": {
                            "front": { "type": "string", "description": "Unused." },
                            "back": { "type": "string", "description": "Unused." }
                        },
                        "required": ["front", "back"]
                    }
                }
            },
            "required": []
        }),
    )
}
