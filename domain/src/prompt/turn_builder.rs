//! Turn prompt construction
//!
//! [`TurnBuilder::build_prompt`] is a pure function: the same participant,
//! speaker, message and constraints always produce the same bytes. All
//! non-determinism lives in the completion provider.

use crate::persona::entities::Participant;
use serde::{Deserialize, Serialize};

/// Template used when a participant does not carry its own.
///
/// Placeholders: `{display_name}`, `{agent_name}`, `{personality}`,
/// `{description}`, `{speaker}`, `{message}`, `{max_words}`, `{style_rules}`.
/// `{style_rules}` expands to the full rule block of [`RoundConstraints`].
pub const DEFAULT_TURN_TEMPLATE: &str = r#"You are {display_name} ({agent_name}), a {personality} member of a startup advisory roundtable.
Your focus: {description}

{speaker} says: {message}

Respond as {agent_name}.
{style_rules}"#;

/// Placeholders every custom template must contain
pub const REQUIRED_PLACEHOLDERS: [&str; 2] = ["{speaker}", "{message}"];

const STYLE_RULES_PLACEHOLDER: &str = "{style_rules}";

/// Formatting rules applied to every turn of a round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundConstraints {
    /// Upper bound on the length of each answer, in words
    pub max_words: usize,
    /// Extra style rules appended after the built-in ones
    pub style_rules: Vec<String>,
}

impl Default for RoundConstraints {
    fn default() -> Self {
        Self {
            max_words: 5,
            style_rules: Vec::new(),
        }
    }
}

impl RoundConstraints {
    pub fn with_max_words(mut self, max_words: usize) -> Self {
        self.max_words = max_words;
        self
    }

    pub fn with_style_rule(mut self, rule: impl Into<String>) -> Self {
        self.style_rules.push(rule.into());
        self
    }

    /// Render the rule block embedded in every prompt.
    pub fn render(&self) -> String {
        let mut block = String::from("Rules:\n");
        block.push_str(&format!(
            "- Respond in at most {} words.\n",
            self.max_words
        ));
        block.push_str(
            "- Do not use asterisks, bold, emojis, markdown, or any other text styling.",
        );
        for rule in &self.style_rules {
            block.push_str("\n- ");
            block.push_str(rule.trim());
        }
        block
    }
}

/// Builds the instruction sent to the completion provider for one turn
pub struct TurnBuilder;

impl TurnBuilder {
    /// Build the prompt for `participant`, answering `previous_message`
    /// spoken by `previous_speaker_name`.
    ///
    /// For the first turn of a round the speaker is `"User"` and the message
    /// is the kickoff text. A custom template without `{style_rules}` gets
    /// the rule block appended, so the formatting limits always reach the
    /// provider.
    pub fn build_prompt(
        participant: &Participant,
        previous_speaker_name: &str,
        previous_message: &str,
        constraints: &RoundConstraints,
    ) -> String {
        let template = participant
            .prompt_template()
            .unwrap_or(DEFAULT_TURN_TEMPLATE);
        let agent_name = participant.agent_name();
        let max_words = constraints.max_words.to_string();
        let rendered_constraints = constraints.render();

        let mut prompt = render(template, |key| match key {
            "display_name" => Some(participant.display_name()),
            "agent_name" => Some(agent_name.as_str()),
            "personality" => Some(participant.personality().as_str()),
            "description" => Some(participant.description()),
            "speaker" => Some(previous_speaker_name),
            "message" => Some(previous_message.trim()),
            "max_words" => Some(max_words.as_str()),
            "style_rules" => Some(rendered_constraints.as_str()),
            _ => None,
        });

        if !template.contains(STYLE_RULES_PLACEHOLDER) {
            prompt.push_str("\n\n");
            prompt.push_str(&rendered_constraints);
        }
        prompt
    }

    /// Required placeholders absent from `template`
    pub fn missing_placeholders(template: &str) -> Vec<&'static str> {
        REQUIRED_PLACEHOLDERS
            .into_iter()
            .filter(|p| !template.contains(p))
            .collect()
    }
}

/// Single-pass `{placeholder}` substitution.
///
/// Substituted values are copied verbatim, so a message containing
/// `{speaker}` is never expanded. Unknown placeholders are left as-is.
fn render<'a>(template: &str, lookup: impl Fn(&str) -> Option<&'a str>) -> String {
    let mut out = String::with_capacity(template.len() + 256);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                let key = &after[..close];
                match lookup(key) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(key);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}
