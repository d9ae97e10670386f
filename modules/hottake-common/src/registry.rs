use std::path::Path;

use tracing::warn;

use crate::error::HottakeError;

/// One registry entry: a topic of interest and its required polarity.
/// `support == true` means generated output must support the topic,
/// `false` means it must oppose it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StanceEntry {
    pub topic: String,
    pub support: bool,
}

/// Mapping of topic → required stance, owned by the admin surface.
///
/// Topics match case-insensitively but display with their stored casing.
/// The pipeline loads a snapshot once per run and never mutates it; an empty
/// registry means "no constraints".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StanceRegistry {
    entries: Vec<StanceEntry>,
}

impl StanceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(pairs: impl IntoIterator<Item = (String, bool)>) -> Self {
        let mut registry = Self::new();
        for (topic, support) in pairs {
            registry.add(topic, support);
        }
        registry
    }

    /// Load from the persisted JSON document: an object of topic →
    /// `"True"`/`"False"` (native booleans also accepted). Entries with any
    /// other value shape are skipped with a warning.
    pub fn load(path: &Path) -> Result<Self, HottakeError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| HottakeError::Registry(format!("read {}: {e}", path.display())))?;
        let value: serde_json::Value = serde_json::from_str(&raw)
            .map_err(|e| HottakeError::Registry(format!("parse {}: {e}", path.display())))?;

        let object = value
            .as_object()
            .ok_or_else(|| HottakeError::Registry("registry document is not an object".into()))?;

        let mut registry = Self::new();
        for (topic, stance) in object {
            let support = match stance {
                serde_json::Value::String(s) if s.eq_ignore_ascii_case("true") => true,
                serde_json::Value::String(s) if s.eq_ignore_ascii_case("false") => false,
                serde_json::Value::Bool(b) => *b,
                other => {
                    warn!(topic, value = %other, "Skipping registry entry with unusable stance");
                    continue;
                }
            };
            registry.add(topic.clone(), support);
        }
        Ok(registry)
    }

    /// Fail-open load: a missing or unusable registry degrades to "no
    /// constraints" rather than aborting the run.
    pub fn load_or_empty(path: &Path) -> Self {
        match Self::load(path) {
            Ok(registry) => registry,
            Err(e) => {
                warn!(error = %e, "Registry unavailable, running unconstrained");
                Self::new()
            }
        }
    }

    /// Persist in the admin-owned format: topic → `"True"`/`"False"`.
    pub fn save(&self, path: &Path) -> Result<(), HottakeError> {
        let mut object = serde_json::Map::new();
        for entry in &self.entries {
            let stance = if entry.support { "True" } else { "False" };
            object.insert(entry.topic.clone(), serde_json::Value::String(stance.into()));
        }
        let doc = serde_json::to_string_pretty(&serde_json::Value::Object(object))
            .map_err(|e| HottakeError::Registry(format!("serialize: {e}")))?;
        std::fs::write(path, doc)
            .map_err(|e| HottakeError::Registry(format!("write {}: {e}", path.display())))?;
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[StanceEntry] {
        &self.entries
    }

    /// Topic → bool object, the shape handed to generator/judge prompts.
    pub fn to_map_value(&self) -> serde_json::Value {
        let mut object = serde_json::Map::new();
        for entry in &self.entries {
            object.insert(entry.topic.clone(), serde_json::Value::Bool(entry.support));
        }
        serde_json::Value::Object(object)
    }

    /// Insert or replace (case-insensitive topic key, case-preserving display).
    pub fn add(&mut self, topic: impl Into<String>, support: bool) {
        let topic = topic.into();
        match self.position(&topic) {
            Some(i) => self.entries[i] = StanceEntry { topic, support },
            None => self.entries.push(StanceEntry { topic, support }),
        }
    }

    /// Flip a topic's polarity. Returns false if the topic is not present.
    pub fn toggle(&mut self, topic: &str) -> bool {
        match self.position(topic) {
            Some(i) => {
                self.entries[i].support = !self.entries[i].support;
                true
            }
            None => false,
        }
    }

    /// Remove a topic. Returns false if the topic is not present.
    pub fn remove(&mut self, topic: &str) -> bool {
        match self.position(topic) {
            Some(i) => {
                self.entries.remove(i);
                true
            }
            None => false,
        }
    }

    pub fn stance_for(&self, topic: &str) -> Option<bool> {
        self.position(topic).map(|i| self.entries[i].support)
    }

    /// Registry topics present in `text` as case-insensitive substrings,
    /// in registry order. Substring semantics are deliberate: a topic inside
    /// an unrelated word still counts as a hit.
    pub fn matched_topics(&self, text: &str) -> Vec<String> {
        let haystack = text.to_lowercase();
        self.entries
            .iter()
            .filter(|e| haystack.contains(&e.topic.to_lowercase()))
            .map(|e| e.topic.clone())
            .collect()
    }

    /// True if at least one registry topic appears in `text`.
    pub fn matches(&self, text: &str) -> bool {
        let haystack = text.to_lowercase();
        self.entries
            .iter()
            .any(|e| haystack.contains(&e.topic.to_lowercase()))
    }

    /// Restriction of the registry to the given tags: the per-candidate
    /// stance subset. Derived, never stored.
    pub fn subset(&self, tags: &[String]) -> StanceRegistry {
        let entries = self
            .entries
            .iter()
            .filter(|e| tags.iter().any(|t| t.eq_ignore_ascii_case(&e.topic)))
            .cloned()
            .collect();
        StanceRegistry { entries }
    }

    fn position(&self, topic: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.topic.eq_ignore_ascii_case(topic))
    }
}
