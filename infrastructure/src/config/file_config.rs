//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into application and domain
//! types after [`FileConfig::validate`] has passed.

use crate::providers::{DEFAULT_ENDPOINT, DEFAULT_MODEL};
use roundtable_application::{CompletionOptions, RoundtableConfig};
use roundtable_domain::{DomainError, Participant, PersonaRegistry, Personality, RoundConstraints};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Environment variable holding the API key unless configured otherwise
pub const DEFAULT_API_KEY_ENV: &str = "ROUNDTABLE_API_KEY";

/// Configuration errors; all of them are fatal at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("timeout_seconds cannot be 0")]
    InvalidTimeout,

    #[error("max_concurrent_sessions cannot be 0")]
    InvalidMaxConcurrentSessions,

    #[error("max_words cannot be 0")]
    InvalidMaxWords,

    #[error("participant id cannot be empty")]
    EmptyParticipantId,

    #[error("participant {id}: {source}")]
    UnknownPersonality { id: String, source: DomainError },

    #[error("provider {0} cannot be empty")]
    EmptyProviderField(&'static str),

    #[error("API key not found: set the {0} environment variable")]
    MissingApiKey(String),

    #[error("Invalid participant panel: {0}")]
    Panel(#[from] DomainError),

    #[error("kickoff_participant '{0}' is not on the panel")]
    UnknownKickoffParticipant(String),
}

/// Raw provider configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProviderConfig {
    /// Chat completions endpoint
    pub url: String,
    /// Model name sent with every request
    pub model: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
}

impl Default for FileProviderConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
        }
    }
}

/// Raw round scheduling configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRoundtableConfig {
    pub temperature: f32,
    pub max_tokens: u32,
    /// Hard bound on a single completion call
    pub timeout_seconds: u64,
    /// Word limit embedded in every prompt
    pub max_words: usize,
    /// Extra rules appended to the prompt constraints
    pub style_rules: Vec<String>,
    /// Participant who opens every round
    pub kickoff_participant: Option<String>,
    pub max_concurrent_sessions: usize,
    /// Start from the built-in five-role panel
    pub use_default_panel: bool,
}

impl Default for FileRoundtableConfig {
    fn default() -> Self {
        let completion = CompletionOptions::default();
        Self {
            temperature: completion.temperature,
            max_tokens: completion.max_tokens,
            timeout_seconds: completion.timeout.as_secs(),
            max_words: RoundConstraints::default().max_words,
            style_rules: Vec::new(),
            kickoff_participant: None,
            max_concurrent_sessions: RoundtableConfig::default().max_concurrent_sessions,
            use_default_panel: true,
        }
    }
}

/// Raw participant entry from TOML (`[[participants]]`)
///
/// An entry whose id matches a default role overrides only the fields it
/// sets; any other id adds a new participant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileParticipantConfig {
    pub id: String,
    pub display_name: Option<String>,
    pub personality: Option<String>,
    pub description: Option<String>,
    pub prompt_template: Option<String>,
}

/// Raw transcript configuration from TOML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileTranscriptConfig {
    /// JSONL file every turn is appended to; disabled when unset
    pub path: Option<PathBuf>,
}

/// Complete configuration file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub provider: FileProviderConfig,
    pub roundtable: FileRoundtableConfig,
    pub participants: Vec<FileParticipantConfig>,
    pub transcript: FileTranscriptConfig,
}

impl FileConfig {
    /// Validate everything that does not need the environment
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.roundtable.timeout_seconds == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        if self.roundtable.max_concurrent_sessions == 0 {
            return Err(ConfigError::InvalidMaxConcurrentSessions);
        }
        if self.roundtable.max_words == 0 {
            return Err(ConfigError::InvalidMaxWords);
        }
        if self.provider.url.trim().is_empty() {
            return Err(ConfigError::EmptyProviderField("url"));
        }
        if self.provider.model.trim().is_empty() {
            return Err(ConfigError::EmptyProviderField("model"));
        }

        for entry in &self.participants {
            if entry.id.trim().is_empty() {
                return Err(ConfigError::EmptyParticipantId);
            }
            entry.parse_personality()?;
        }

        Ok(())
    }

    /// Application-level scheduling config
    pub fn to_roundtable_config(&self) -> RoundtableConfig {
        let rt = &self.roundtable;
        let completion = CompletionOptions::default()
            .with_temperature(rt.temperature)
            .with_max_tokens(rt.max_tokens)
            .with_timeout(Duration::from_secs(rt.timeout_seconds));
        let constraints = rt
            .style_rules
            .iter()
            .fold(RoundConstraints::default().with_max_words(rt.max_words), |c, rule| {
                c.with_style_rule(rule.clone())
            });

        let config = RoundtableConfig::default()
            .with_completion(completion)
            .with_constraints(constraints)
            .with_max_concurrent_sessions(rt.max_concurrent_sessions);

        match self.kickoff_participant() {
            Some(id) => config.with_kickoff_participant(id),
            None => config,
        }
    }

    /// Build the participant panel: defaults (unless disabled), then
    /// overrides and additions from `[[participants]]`.
    ///
    /// Also rejects a `kickoff_participant` that is not on the resulting
    /// panel, since every session would otherwise fail at creation.
    pub fn build_persona_registry(&self) -> Result<PersonaRegistry, ConfigError> {
        let mut participants: Vec<Participant> = if self.roundtable.use_default_panel {
            PersonaRegistry::default_panel().list_participants().to_vec()
        } else {
            Vec::new()
        };

        for entry in &self.participants {
            let id = entry.id.trim();
            if id.is_empty() {
                return Err(ConfigError::EmptyParticipantId);
            }
            let personality = entry.parse_personality()?;

            match participants.iter_mut().find(|p| p.id().as_str() == id) {
                Some(existing) => *existing = entry.apply_to(existing, personality),
                None => participants.push(entry.to_participant(id, personality)),
            }
        }

        let registry = PersonaRegistry::new(participants)?;
        if let Some(id) = self.kickoff_participant() {
            if !registry.contains(id) {
                return Err(ConfigError::UnknownKickoffParticipant(id.to_string()));
            }
        }
        Ok(registry)
    }

    fn kickoff_participant(&self) -> Option<&str> {
        self.roundtable
            .kickoff_participant
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    /// Read the API key from the configured environment variable
    pub fn resolve_api_key(&self) -> Result<String, ConfigError> {
        let var = &self.provider.api_key_env;
        std::env::var(var)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingApiKey(var.clone()))
    }
}

impl FileParticipantConfig {
    fn parse_personality(&self) -> Result<Option<Personality>, ConfigError> {
        self.personality
            .as_deref()
            .map(str::parse::<Personality>)
            .transpose()
            .map_err(|source| ConfigError::UnknownPersonality {
                id: self.id.clone(),
                source,
            })
    }

    fn apply_to(&self, base: &Participant, personality: Option<Personality>) -> Participant {
        let updated = Participant::new(
            base.id().clone(),
            self.display_name.as_deref().unwrap_or(base.display_name()),
            personality.unwrap_or(base.personality()),
            self.description.as_deref().unwrap_or(base.description()),
        );
        match self.prompt_template.as_deref().or(base.prompt_template()) {
            Some(template) => updated.with_prompt_template(template),
            None => updated,
        }
    }

    fn to_participant(&self, id: &str, personality: Option<Personality>) -> Participant {
        let participant = Participant::new(
            id,
            self.display_name.as_deref().unwrap_or(id),
            personality.unwrap_or_default(),
            self.description.as_deref().unwrap_or_default(),
        );
        match &self.prompt_template {
            Some(template) => participant.with_prompt_template(template.clone()),
            None => participant,
        }
    }
}
