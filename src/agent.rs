use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine};
use std::path::Path;

use crate::anki::{AnkiConnectClient, AnkiTransport};
use crate::batch::ImageProcessor;
use crate::config::Config;
use crate::conversation::Conversation;
use crate::deck::DeckAccessor;
use crate::ollama::{ChatMessage, ChatModel, OllamaClient, ToolCall};
use crate::tools::{self, DeckOperation, ToolDescriptor};

/// Agent that turns one image into flashcards through a tool-calling model.
pub struct CardGeneratorAgent<M: ChatModel, T: AnkiTransport> {
    model: M,
    deck: DeckAccessor<T>,
    language: String,
    tools: Vec<ToolDescriptor>,
}

impl CardGeneratorAgent<OllamaClient, AnkiConnectClient> {
    pub fn from_config(config: &Config) -> Self {
        let model = OllamaClient::new(
            config.ai_model.endpoint.clone(),
            config.ai_model.model.clone(),
        );
        let deck = DeckAccessor::new(
            AnkiConnectClient::new(config.anki.endpoint.clone()),
            config.anki.deck(),
        );
        Self::new(model, deck, config.prompt.language.clone())
    }
}

impl<M: ChatModel, T: AnkiTransport> CardGeneratorAgent<M, T> {
    pub fn new(model: M, deck: DeckAccessor<T>, language: String) -> Self {
        Self {
            model,
            deck,
            language,
            tools: tools::registry(),
        }
    }

    /// Run the full two-round exchange for one image and return the model's
    /// final answer.
    pub async fn process_image(&self, path: &Path) -> Result<String> {
        // Step 1: Load and encode
        log::info!("Agent: Step 1 - Reading {}", path.display());
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read image {}", path.display()))?;
        let image = STANDARD.encode(&bytes);

        // Step 2: Existing cards, for duplicate avoidance
        log::info!("Agent: Step 2 - Reading existing cards");
        let existing = self.deck.get_cards().await;
        let previous_cards: String = existing.iter().map(|c| format!(" {}", c.front)).collect();
        log::info!("Agent: Step 2 - {} existing card(s)", existing.len());

        // Step 3: Round 1
        log::info!("Agent: Step 3 - Sending image to the model");
        let prompt = Self::build_prompt(&self.language, &previous_cards);
        let mut conversation = Conversation::new(ChatMessage::user_with_image(prompt, image));

        let reply = self
            .model
            .chat(conversation.messages(), &self.tools)
            .await
            .context("Agent: first chat round failed")?;
        log_reply("first", &reply);

        if reply.tool_calls().is_empty() {
            log::info!("Agent: no tool calls requested");
            return Ok(reply.content);
        }

        // Step 4: Tool calls
        log::info!("Agent: Step 4 - Running {} tool call(s)", reply.tool_calls().len());
        let results = self.run_tool_calls(reply.tool_calls()).await?;

        // Step 5: Round 2
        log::info!("Agent: Step 5 - Sending tool results back to the model");
        conversation.push_assistant(reply);
        conversation.push_tool_results(results);

        let final_reply = self
            .model
            .chat(conversation.messages(), &self.tools)
            .await
            .context("Agent: second chat round failed")?;
        log_reply("final", &final_reply);

        Ok(final_reply.content)
    }

    /// One tool result per call, in call order.
    async fn run_tool_calls(&self, calls: &[ToolCall]) -> Result<Vec<ChatMessage>> {
        let mut results = Vec::with_capacity(calls.len());

        for call in calls {
            let name = &call.function.name;
            log::info!("Agent: calling {} with args: {}", name, call.function.arguments);

            let content = match DeckOperation::from_call(call)? {
                DeckOperation::AddCards(args) => {
                    let outcome = self.deck.add_cards(&args.note_type, &args.notes).await;
                    serde_json::to_string(&outcome)?
                }
                DeckOperation::GetCards => serde_json::to_string(&self.deck.get_cards().await)?,
                DeckOperation::Unsupported(name) => {
                    log::error!("Agent: function {} is not available", name);
                    format!("Error: Function {} not found.", name)
                }
            };

            log::info!("Agent: response from {}: {}", name, content);
            results.push(ChatMessage::tool_result(call.id.clone(), name, content));
        }

        Ok(results)
    }

    /// The instruction sent with the image; identical in both rounds.
    fn build_prompt(language: &str, previous_cards: &str) -> String {
        format!(
            "Parse the {lang} text in this image. Identify the subject matter and create Anki \
             flashcards for the {lang} vocabulary. Ensure that duplicates are not being added. \
             For reference, here are all of the previously added cards{previous}. Use the \
             {tool} tool to add these new {lang} vocab cards to the Anki deck. For the notes, \
             provide \"front\" and \"back\" content. ",
            lang = language,
            previous = previous_cards,
            tool = tools::add_cards::NAME,
        )
    }
}

fn log_reply(round: &str, reply: &ChatMessage) {
    if log::log_enabled!(log::Level::Debug) {
        let pretty = serde_json::to_string_pretty(reply).unwrap_or_default();
        log::debug!("Agent: {} model reply: {}", round, pretty);
    }
}

#[async_trait::async_trait]
impl<M: ChatModel, T: AnkiTransport> ImageProcessor for CardGeneratorAgent<M, T> {
    async fn process(&self, path: &Path) -> Result<String> {
        self.process_image(path).await
    }
}
