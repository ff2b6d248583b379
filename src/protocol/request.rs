//! Research request descriptor and builder.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::error::{Error, Result};

use super::interaction::InteractionId;

/// Agent used when the caller does not name one.
pub const DEFAULT_AGENT: &str = "deep-research-pro-preview-12-2025";

/// Immutable descriptor of one research request.
///
/// Built with [`ResearchRequest::builder`]. The target holds exactly one
/// of agent-plus-config or a bare model identifier; when both are given
/// to the builder the model wins and the agent fields are suppressed
/// from the outgoing call.
#[derive(Debug, Clone, PartialEq)]
pub struct ResearchRequest {
    input: String,
    target: ResearchTarget,
    previous_interaction_id: Option<InteractionId>,
    tools: Vec<ToolSpec>,
}

/// What the request runs against.
#[derive(Debug, Clone, PartialEq)]
pub enum ResearchTarget {
    /// A named research agent plus its configuration map.
    Agent {
        /// Agent version name.
        name: String,
        /// Merged agent configuration.
        config: AgentConfig,
    },
    /// A bare model identifier, typically for quick follow-ups.
    Model(String),
}

impl ResearchRequest {
    /// Start building a request for the given input text.
    pub fn builder(input: impl Into<String>) -> ResearchRequestBuilder {
        ResearchRequestBuilder {
            input: input.into(),
            agent_name: None,
            agent_config: None,
            model: None,
            previous_interaction_id: None,
            file_search_stores: Vec::new(),
        }
    }

    /// The research prompt.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// The agent or model this request runs against.
    pub fn target(&self) -> &ResearchTarget {
        &self.target
    }

    /// Interaction to continue from, for follow-up questions.
    pub fn previous_interaction_id(&self) -> Option<&InteractionId> {
        self.previous_interaction_id.as_ref()
    }

    /// Tool descriptors attached to the request.
    pub fn tools(&self) -> &[ToolSpec] {
        &self.tools
    }

    /// Build the JSON body for a create call.
    ///
    /// `background` is always true; `stream` selects between the event
    /// stream and the snapshot response.
    pub fn to_body(&self, stream: bool) -> Value {
        let mut body = json!({
            "input": self.input,
            "background": true,
            "stream": stream,
        });
        match &self.target {
            ResearchTarget::Agent { name, config } => {
                body["agent"] = json!(name);
                body["agent_config"] = Value::Object(config.as_map().clone());
            }
            ResearchTarget::Model(model) => {
                body["model"] = json!(model);
            }
        }
        if let Some(previous) = &self.previous_interaction_id {
            body["previous_interaction_id"] = json!(previous.as_str());
        }
        if !self.tools.is_empty() {
            body["tools"] = json!(self.tools);
        }
        body
    }
}

/// Builder for [`ResearchRequest`].
#[derive(Debug, Clone)]
pub struct ResearchRequestBuilder {
    input: String,
    agent_name: Option<String>,
    agent_config: Option<AgentConfig>,
    model: Option<String>,
    previous_interaction_id: Option<InteractionId>,
    file_search_stores: Vec<FileSearchStore>,
}

impl ResearchRequestBuilder {
    /// Use a named agent (default: [`DEFAULT_AGENT`]).
    pub fn agent_name(mut self, name: impl Into<String>) -> Self {
        self.agent_name = Some(name.into());
        self
    }

    /// Override agent configuration keys.
    ///
    /// The overrides are merged over the stock configuration at build
    /// time; keys not present here keep their default values.
    pub fn agent_config(mut self, config: AgentConfig) -> Self {
        self.agent_config = Some(config);
        self
    }

    /// Run against a bare model instead of an agent.
    ///
    /// Takes precedence over any agent name or config.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Continue from a completed interaction.
    pub fn previous_interaction_id(mut self, id: impl Into<InteractionId>) -> Self {
        self.previous_interaction_id = Some(id.into());
        self
    }

    /// Attach a file-search store for grounding. Repeatable.
    pub fn file_search_store(mut self, store: FileSearchStore) -> Self {
        self.file_search_stores.push(store);
        self
    }

    /// Attach several file-search stores at once.
    pub fn file_search_stores(
        mut self,
        stores: impl IntoIterator<Item = FileSearchStore>,
    ) -> Self {
        self.file_search_stores.extend(stores);
        self
    }

    /// Validate and build the request.
    pub fn build(self) -> Result<ResearchRequest> {
        if self.input.trim().is_empty() {
            return Err(Error::invalid_config("research input is empty"));
        }

        let target = match self.model {
            Some(model) => ResearchTarget::Model(model),
            None => ResearchTarget::Agent {
                name: self.agent_name.unwrap_or_else(|| DEFAULT_AGENT.to_string()),
                config: AgentConfig::defaults().merged(self.agent_config.unwrap_or_default()),
            },
        };

        let tools = if self.file_search_stores.is_empty() {
            Vec::new()
        } else {
            vec![ToolSpec::FileSearch {
                file_search_store_names: self.file_search_stores,
            }]
        };

        Ok(ResearchRequest {
            input: self.input,
            target,
            previous_interaction_id: self.previous_interaction_id,
            tools,
        })
    }
}

/// Tool descriptor attached to a research request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolSpec {
    /// Ground the research in file-search stores.
    FileSearch {
        /// Stores to search, in the caller-supplied order.
        file_search_store_names: Vec<FileSearchStore>,
    },
}

/// Agent configuration map sent as the `agent_config` request field.
///
/// User-supplied keys are merged over [`AgentConfig::defaults`] key by
/// key: untouched defaults survive, user values win.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentConfig(Map<String, Value>);

impl AgentConfig {
    /// The stock deep-research configuration.
    pub fn defaults() -> Self {
        let mut map = Map::new();
        map.insert("type".to_string(), json!("deep-research"));
        map.insert("thinking_summaries".to_string(), json!("auto"));
        Self(map)
    }

    /// Parse a CLI argument: a path to a JSON file if one exists at that
    /// location, otherwise inline JSON. The value must be a JSON object.
    pub fn from_arg(arg: &str) -> Result<Self> {
        let path = Path::new(arg);
        if path.is_file() {
            let raw = std::fs::read_to_string(path).map_err(|e| Error::read_failed(path, e))?;
            let value: Value = serde_json::from_str(&raw)
                .map_err(|e| Error::invalid_config(format!("invalid JSON in '{arg}': {e}")))?;
            return Self::from_value(value);
        }
        let value: Value = serde_json::from_str(arg).map_err(|e| {
            Error::invalid_config(format!(
                "invalid JSON: {e} (pass inline JSON or a path to a JSON file)"
            ))
        })?;
        Self::from_value(value)
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(Error::invalid_config(format!(
                "agent config must be a JSON object, got {other}"
            ))),
        }
    }

    /// Merge `overrides` over this configuration, key by key.
    pub fn merged(mut self, overrides: AgentConfig) -> Self {
        for (key, value) in overrides.0 {
            self.0.insert(key, value);
        }
        self
    }

    /// Look up a configuration value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// The underlying JSON object.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for AgentConfig {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Reference to a file-search grounding store.
///
/// Always of the form `fileSearchStores/<name>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileSearchStore(String);

impl FileSearchStore {
    /// Validate and wrap a store reference.
    pub fn parse(value: &str) -> Result<Self> {
        if !value.starts_with("fileSearchStores/") {
            return Err(Error::invalid_config(format!(
                "invalid store format: {value}. Expected: fileSearchStores/<name>"
            )));
        }
        Ok(Self(value.to_string()))
    }

    /// Get the store reference as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileSearchStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
