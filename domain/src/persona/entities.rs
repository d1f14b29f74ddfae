//! Participant entities and value objects

use crate::core::error::DomainError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Identifier of a roundtable participant (e.g. `PM`, `CTO`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ParticipantId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ParticipantId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Temperament a participant speaks with (Value Object)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Personality {
    #[default]
    Neutral,
    Cautious,
    Optimistic,
    Skeptical,
    Supportive,
}

impl Personality {
    pub const ALL: [Personality; 5] = [
        Personality::Neutral,
        Personality::Cautious,
        Personality::Optimistic,
        Personality::Skeptical,
        Personality::Supportive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Personality::Neutral => "neutral",
            Personality::Cautious => "cautious",
            Personality::Optimistic => "optimistic",
            Personality::Skeptical => "skeptical",
            Personality::Supportive => "supportive",
        }
    }
}

impl std::fmt::Display for Personality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Personality {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Personality::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DomainError::UnknownPersonality(s.to_string()))
    }
}

impl Serialize for Personality {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Personality {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// One named persona at the roundtable (Entity)
///
/// Immutable once the [`PersonaRegistry`](super::registry::PersonaRegistry)
/// is built; sessions only ever borrow it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    id: ParticipantId,
    display_name: String,
    personality: Personality,
    description: String,
    prompt_template: Option<String>,
}

impl Participant {
    pub fn new(
        id: impl Into<ParticipantId>,
        display_name: impl Into<String>,
        personality: Personality,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            personality,
            description: description.into(),
            prompt_template: None,
        }
    }

    /// Replace the default turn prompt with a custom template.
    ///
    /// See [`TurnBuilder`](crate::prompt::TurnBuilder) for the placeholders.
    pub fn with_prompt_template(mut self, template: impl Into<String>) -> Self {
        self.prompt_template = Some(template.into());
        self
    }

    pub fn with_personality(mut self, personality: Personality) -> Self {
        self.personality = personality;
        self
    }

    pub fn id(&self) -> &ParticipantId {
        &self.id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn personality(&self) -> Personality {
        self.personality
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn prompt_template(&self) -> Option<&str> {
        self.prompt_template.as_deref()
    }

    /// Name the participant answers to in prompts, e.g. `PM-neutral`.
    pub fn agent_name(&self) -> String {
        format!("{}-{}", self.id, self.personality)
    }
}
