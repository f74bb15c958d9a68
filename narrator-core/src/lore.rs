//! D&D 5e lore lookups.
//!
//! Resolves monster, spell and magic item names against the public 5e SRD API
//! and renders the result as a short text block the narrator can weave into
//! its story. Lookups fail open: every failure, transport errors included,
//! comes back as readable text rather than an error.

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

/// Default base endpoint of the 5e SRD API.
pub const DEFAULT_LORE_API_BASE: &str = "https://www.dnd5eapi.co/api/2014";

/// Longest description excerpt kept in a rendered record, in characters.
pub const DESCRIPTION_LIMIT: usize = 200;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_REDIRECTS: usize = 10;

/// The three kinds of lore the API can resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoreCategory {
    Monster,
    Spell,
    Item,
}

impl LoreCategory {
    /// Path segment of this category's endpoint.
    pub fn path(self) -> &'static str {
        match self {
            LoreCategory::Monster => "monsters",
            LoreCategory::Spell => "spells",
            LoreCategory::Item => "magic-items",
        }
    }

    fn header(self) -> &'static str {
        match self {
            LoreCategory::Monster => "D&D MONSTER",
            LoreCategory::Spell => "D&D SPELL",
            LoreCategory::Item => "D&D MAGIC ITEM",
        }
    }

    /// Text reported in place of a record when a lookup fails.
    pub fn failure_text(self, name: &str, failure: &LookupFailure) -> String {
        use LookupFailure::*;

        match (self, failure) {
            (LoreCategory::Monster, Status(_)) => {
                format!("Monster '{name}' not found in D&D bestiary.")
            }
            (LoreCategory::Monster, MissingName | EmptyName) => {
                format!("Monster '{name}' not found.")
            }
            (LoreCategory::Monster, Transport(_) | Malformed(_)) => {
                format!("Unable to retrieve info about '{name}'. Use your D&D creativity.")
            }
            (LoreCategory::Spell, Status(_) | MissingName | EmptyName) => {
                format!("Spell '{name}' not found.")
            }
            (LoreCategory::Spell, Transport(_) | Malformed(_)) => {
                format!("Unable to retrieve info about spell '{name}'.")
            }
            (LoreCategory::Item, Status(_) | MissingName | EmptyName) => {
                format!("Magic item '{name}' not found.")
            }
            (LoreCategory::Item, Transport(_) | Malformed(_)) => {
                format!("Unable to retrieve info about item '{name}'.")
            }
        }
    }
}

impl fmt::Display for LoreCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoreCategory::Monster => write!(f, "monster"),
            LoreCategory::Spell => write!(f, "spell"),
            LoreCategory::Item => write!(f, "magic item"),
        }
    }
}

/// Why a lookup produced no record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupFailure {
    /// The request never got a response.
    Transport(String),
    /// The API answered with something other than 200.
    Status(u16),
    /// The body has no usable `name` field.
    MissingName,
    /// The requested name normalized to nothing.
    EmptyName,
    /// The body is not JSON, or a required field is missing or mistyped.
    Malformed(String),
}

impl fmt::Display for LookupFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupFailure::Transport(e) => write!(f, "transport error: {e}"),
            LookupFailure::Status(status) => write!(f, "status {status}"),
            LookupFailure::MissingName => write!(f, "response has no name"),
            LookupFailure::EmptyName => write!(f, "empty lookup name"),
            LookupFailure::Malformed(e) => write!(f, "malformed response: {e}"),
        }
    }
}

/// Normalized search key: lowercase, trimmed, whitespace runs become `-`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LookupQuery(String);

impl LookupQuery {
    pub fn new(raw: &str) -> Self {
        let key = raw
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-");
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for LookupQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A successfully resolved lore entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoreRecord {
    pub category: LoreCategory,
    pub name: String,
    /// Attribute lines in display order.
    pub fields: Vec<(&'static str, String)>,
}

impl LoreRecord {
    /// Build a record from an API body.
    ///
    /// Fails with [`LookupFailure::MissingName`] when the body has no `name`,
    /// and with [`LookupFailure::Malformed`] when any other required field is
    /// missing.
    pub fn from_json(category: LoreCategory, body: &Value) -> Result<Self, LookupFailure> {
        let name = match body.get("name") {
            None | Some(Value::Null) => return Err(LookupFailure::MissingName),
            Some(value) => scalar_text(value).ok_or_else(|| malformed("name"))?,
        };

        let mut fields = Vec::new();
        match category {
            LoreCategory::Monster => {
                fields.push(("Type", required_text(body, "type")?));
                fields.push(("Size", required_text(body, "size")?));
                if let Some(alignment) = optional_text(body, "alignment") {
                    fields.push(("Alignment", alignment));
                }
                fields.push(("Challenge Rating", required_text(body, "challenge_rating")?));
                fields.push(("Hit Points", required_int(body, "hit_points")?.to_string()));
                if let Some(first) = first_element(body, "armor_class") {
                    let value = first
                        .get("value")
                        .and_then(as_int)
                        .ok_or_else(|| malformed("armor_class"))?;
                    fields.push(("Armor Class", value.to_string()));
                }
            }
            LoreCategory::Spell => {
                fields.push(("Level", required_int(body, "level")?.to_string()));
                fields.push(("School", nested_name(body, "school")?));
                fields.push(("Casting Time", required_text(body, "casting_time")?));
                fields.push(("Range", required_text(body, "range")?));
                if let Some(desc) = description(body) {
                    fields.push(("Description", desc));
                }
            }
            LoreCategory::Item => {
                if body.get("equipment_category").is_some() {
                    fields.push(("Type", nested_name(body, "equipment_category")?));
                }
                if body.get("rarity").is_some() {
                    fields.push(("Rarity", nested_name(body, "rarity")?));
                }
                if let Some(desc) = description(body) {
                    fields.push(("Description", desc));
                }
            }
        }

        Ok(Self {
            category,
            name,
            fields,
        })
    }

    /// Value of the attribute line with the given label.
    pub fn field(&self, label: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for LoreRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}: {}", self.category.header(), self.name)?;
        for (label, value) in &self.fields {
            writeln!(f, "{label}: {value}")?;
        }
        Ok(())
    }
}

/// Keep at most [`DESCRIPTION_LIMIT`] characters and always append `...`.
pub fn truncate_description(text: &str) -> String {
    let mut excerpt: String = text.chars().take(DESCRIPTION_LIMIT).collect();
    excerpt.push_str("...");
    excerpt
}

fn malformed(field: &str) -> LookupFailure {
    LookupFailure::Malformed(format!("missing or invalid field '{field}'"))
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn as_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn required_text(body: &Value, field: &str) -> Result<String, LookupFailure> {
    body.get(field)
        .and_then(scalar_text)
        .ok_or_else(|| malformed(field))
}

fn optional_text(body: &Value, field: &str) -> Option<String> {
    body.get(field).and_then(scalar_text)
}

fn required_int(body: &Value, field: &str) -> Result<i64, LookupFailure> {
    body.get(field).and_then(as_int).ok_or_else(|| malformed(field))
}

fn nested_name(body: &Value, field: &str) -> Result<String, LookupFailure> {
    body.get(field)
        .and_then(|nested| nested.get("name"))
        .and_then(scalar_text)
        .ok_or_else(|| malformed(field))
}

fn first_element<'a>(body: &'a Value, field: &str) -> Option<&'a Value> {
    body.get(field).and_then(Value::as_array).and_then(|a| a.first())
}

fn description(body: &Value) -> Option<String> {
    let first = first_element(body, "desc")?;
    Some(truncate_description(&scalar_text(first).unwrap_or_default()))
}

/// Settings for the lore client.
#[derive(Debug, Clone)]
pub struct LoreConfig {
    /// Base endpoint, without the category path.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Retry once after a transport error.
    pub retry_transport_errors: bool,
    /// Honor proxy settings from the environment.
    pub use_system_proxy: bool,
}

impl Default for LoreConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_LORE_API_BASE.to_string(),
            timeout: DEFAULT_TIMEOUT,
            retry_transport_errors: true,
            use_system_proxy: true,
        }
    }
}

impl LoreConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn without_retry(mut self) -> Self {
        self.retry_transport_errors = false;
        self
    }

    pub fn without_system_proxy(mut self) -> Self {
        self.use_system_proxy = false;
        self
    }
}

/// Capability handed to the narrator for mid-generation lookups.
///
/// Implementations must never fail: the returned text is either a rendered
/// record or a not-found message.
#[async_trait]
pub trait LoreLookup: Send + Sync {
    async fn lookup(&self, category: LoreCategory, name: &str) -> String;
}

/// HTTP client for the 5e SRD API.
#[derive(Debug, Clone)]
pub struct LoreClient {
    client: reqwest::Client,
    config: LoreConfig,
}

impl LoreClient {
    pub fn new(config: LoreConfig) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS));
        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &LoreConfig {
        &self.config
    }

    pub async fn lookup_monster(&self, name: &str) -> String {
        self.lookup(LoreCategory::Monster, name).await
    }

    pub async fn lookup_spell(&self, name: &str) -> String {
        self.lookup(LoreCategory::Spell, name).await
    }

    pub async fn lookup_item(&self, name: &str) -> String {
        self.lookup(LoreCategory::Item, name).await
    }

    /// Resolve a name to a record, keeping the failure reason.
    pub async fn fetch(
        &self,
        category: LoreCategory,
        query: &LookupQuery,
    ) -> Result<LoreRecord, LookupFailure> {
        if query.is_empty() {
            return Err(LookupFailure::EmptyName);
        }

        let url = self.url_for(category, query);
        let body = match self.get_json(&url).await {
            Err(LookupFailure::Transport(reason)) if self.config.retry_transport_errors => {
                debug!(%url, %reason, "lore request failed, retrying once");
                self.get_json(&url).await?
            }
            other => other?,
        };

        LoreRecord::from_json(category, &body)
    }

    fn url_for(&self, category: LoreCategory, query: &LookupQuery) -> String {
        format!(
            "{}/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            category.path(),
            query
        )
    }

    async fn get_json(&self, url: &str) -> Result<Value, LookupFailure> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| LookupFailure::Transport(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(LookupFailure::Status(status.as_u16()));
        }

        let text = response
            .text()
            .await
            .map_err(|e| LookupFailure::Transport(e.to_string()))?;

        serde_json::from_str(&text).map_err(|e| LookupFailure::Malformed(e.to_string()))
    }
}

#[async_trait]
impl LoreLookup for LoreClient {
    async fn lookup(&self, category: LoreCategory, name: &str) -> String {
        let query = LookupQuery::new(name);
        match self.fetch(category, &query).await {
            Ok(record) => record.to_string(),
            Err(failure) => {
                warn!(%category, query = %query, %failure, "lore lookup failed");
                category.failure_text(name, &failure)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn goblin() -> Value {
        json!({
            "name": "Goblin",
            "type": "Humanoid",
            "size": "Small",
            "challenge_rating": "1/4",
            "hit_points": 7
        })
    }

    #[test]
    fn test_query_normalization() {
        assert_eq!(LookupQuery::new("Goblin").as_str(), "goblin");
        assert_eq!(LookupQuery::new("  Bag of   Holding ").as_str(), "bag-of-holding");
        assert_eq!(LookupQuery::new("Magic\tMissile").as_str(), "magic-missile");
        assert!(LookupQuery::new("   ").is_empty());
        assert_eq!(LookupQuery::new("Cure Wounds"), LookupQuery::new("cure  wounds"));
    }

    #[test]
    fn test_monster_without_optional_fields() {
        let record = LoreRecord::from_json(LoreCategory::Monster, &goblin()).unwrap();
        let text = record.to_string();

        assert!(text.contains("D&D MONSTER: Goblin\n"));
        assert!(text.contains("Type: Humanoid\n"));
        assert!(text.contains("Size: Small\n"));
        assert!(text.contains("Challenge Rating: 1/4\n"));
        assert!(text.contains("Hit Points: 7\n"));
        assert!(!text.contains("Alignment:"));
        assert!(!text.contains("Armor Class:"));
    }

    #[test]
    fn test_monster_with_optional_fields() {
        let mut body = goblin();
        body["alignment"] = json!("Neutral Evil");
        body["armor_class"] = json!([{"value": 15}]);

        let text = LoreRecord::from_json(LoreCategory::Monster, &body)
            .unwrap()
            .to_string();

        assert_eq!(
            text,
            "D&D MONSTER: Goblin\n\
             Type: Humanoid\n\
             Size: Small\n\
             Alignment: Neutral Evil\n\
             Challenge Rating: 1/4\n\
             Hit Points: 7\n\
             Armor Class: 15\n"
        );
    }

    #[test]
    fn test_monster_numeric_challenge_rating_and_empty_armor() {
        let mut body = goblin();
        body["challenge_rating"] = json!(0.25);
        body["armor_class"] = json!([]);

        let record = LoreRecord::from_json(LoreCategory::Monster, &body).unwrap();
        assert_eq!(record.field("Challenge Rating"), Some("0.25"));
        assert_eq!(record.field("Armor Class"), None);
    }

    #[test]
    fn test_monster_missing_required_field_is_malformed() {
        let mut body = goblin();
        body.as_object_mut().unwrap().remove("hit_points");

        let err = LoreRecord::from_json(LoreCategory::Monster, &body).unwrap_err();
        assert!(matches!(err, LookupFailure::Malformed(_)));
    }

    #[test]
    fn test_missing_name() {
        let err = LoreRecord::from_json(LoreCategory::Spell, &json!({"level": 3})).unwrap_err();
        assert_eq!(err, LookupFailure::MissingName);

        let err = LoreRecord::from_json(LoreCategory::Item, &json!([1, 2])).unwrap_err();
        assert_eq!(err, LookupFailure::MissingName);
    }

    #[test]
    fn test_spell_formatting() {
        let body = json!({
            "name": "Fireball",
            "level": 3,
            "school": {"name": "Evocation"},
            "casting_time": "1 action",
            "range": "150 feet",
            "desc": ["A bright streak flashes from your pointing finger..."]
        });

        let text = LoreRecord::from_json(LoreCategory::Spell, &body)
            .unwrap()
            .to_string();

        assert!(text.starts_with("D&D SPELL: Fireball\n"));
        assert!(text.contains("Level: 3\n"));
        assert!(text.contains("School: Evocation\n"));
        assert!(text.contains("Casting Time: 1 action\n"));
        assert!(text.contains("Range: 150 feet\n"));
        assert!(text.contains(
            "Description: A bright streak flashes from your pointing finger......\n"
        ));
    }

    #[test]
    fn test_spell_without_description() {
        let body = json!({
            "name": "Fireball",
            "level": 3,
            "school": {"name": "Evocation"},
            "casting_time": "1 action",
            "range": "150 feet",
            "desc": []
        });

        let text = LoreRecord::from_json(LoreCategory::Spell, &body)
            .unwrap()
            .to_string();
        assert!(!text.contains("Description:"));
    }

    #[test]
    fn test_description_truncation() {
        let long = "a".repeat(250);
        let rendered = truncate_description(&long);
        assert_eq!(rendered, format!("{}...", "a".repeat(200)));

        let short = "b".repeat(50);
        assert_eq!(truncate_description(&short), format!("{short}..."));

        let exact = "c".repeat(200);
        assert_eq!(truncate_description(&exact), format!("{exact}..."));
    }

    #[test]
    fn test_truncation_counts_characters() {
        let runes = "ᚠ".repeat(250);
        let rendered = truncate_description(&runes);
        assert_eq!(rendered.chars().count(), 203);
        assert!(rendered.ends_with("..."));
    }

    #[test]
    fn test_item_formatting() {
        let body = json!({
            "name": "Bag of Holding",
            "equipment_category": {"name": "Wondrous Item"},
            "rarity": {"name": "Uncommon"},
            "desc": ["This bag has an interior space considerably larger than its outside dimensions..."]
        });

        let text = LoreRecord::from_json(LoreCategory::Item, &body)
            .unwrap()
            .to_string();

        assert!(text.starts_with("D&D MAGIC ITEM: Bag of Holding\n"));
        assert!(text.contains("Type: Wondrous Item\n"));
        assert!(text.contains("Rarity: Uncommon\n"));
        assert!(text.contains("Description: This bag has an interior space"));
    }

    #[test]
    fn test_item_with_only_name() {
        let record =
            LoreRecord::from_json(LoreCategory::Item, &json!({"name": "Bag of Holding"})).unwrap();
        assert_eq!(record.to_string(), "D&D MAGIC ITEM: Bag of Holding\n");
        assert!(record.fields.is_empty());
    }

    #[test]
    fn test_failure_texts() {
        let status = LookupFailure::Status(404);
        let transport = LookupFailure::Transport("connection refused".to_string());

        assert_eq!(
            LoreCategory::Monster.failure_text("Beholder", &status),
            "Monster 'Beholder' not found in D&D bestiary."
        );
        assert_eq!(
            LoreCategory::Monster.failure_text("Beholder", &LookupFailure::MissingName),
            "Monster 'Beholder' not found."
        );
        assert_eq!(
            LoreCategory::Monster.failure_text("Beholder", &transport),
            "Unable to retrieve info about 'Beholder'. Use your D&D creativity."
        );
        assert_eq!(
            LoreCategory::Spell.failure_text("Wish", &status),
            "Spell 'Wish' not found."
        );
        assert_eq!(
            LoreCategory::Spell.failure_text("Wish", &transport),
            "Unable to retrieve info about spell 'Wish'."
        );
        assert_eq!(
            LoreCategory::Item.failure_text("Vorpal Sword", &LookupFailure::MissingName),
            "Magic item 'Vorpal Sword' not found."
        );
        assert_eq!(
            LoreCategory::Item
                .failure_text("Vorpal Sword", &LookupFailure::Malformed(String::new())),
            "Unable to retrieve info about item 'Vorpal Sword'."
        );
    }

    #[test]
    fn test_url_building() {
        let client =
            LoreClient::new(LoreConfig::default().with_base_url("http://lore.test/api/")).unwrap();
        let url = client.url_for(LoreCategory::Item, &LookupQuery::new("Bag of Holding"));
        assert_eq!(url, "http://lore.test/api/magic-items/bag-of-holding");
    }
}
