use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A single cheat-code bundle as returned by the catalog.
///
/// Immutable once received. `id` is unique within one [`GameResult`] and is the
/// key used by [`DisclosureState`](crate::models::DisclosureState).
///
/// Every field decodes leniently: `null`, a missing key, or a value of the
/// wrong type becomes the field's default instead of failing the response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheatFile {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: String,

    #[serde(default, deserialize_with = "lenient")]
    pub credits: String,

    #[serde(default, deserialize_with = "lenient")]
    pub buildid: String,

    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "lenient")]
    pub titles: Vec<String>,

    #[serde(default, deserialize_with = "lenient")]
    pub content: String,
}

/// Full response for one `titleId`/`buildId` query.
///
/// `count` is advisory metadata reported by the server. It is displayed next to
/// `cheats.len()` and is never reconciled with it.
///
/// Only `cheats` is structural; the client checks that it is an array before
/// decoding. The header fields decode like [`CheatFile`]'s.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    #[serde(default, deserialize_with = "lenient")]
    pub name: String,

    #[serde(default, deserialize_with = "lenient")]
    pub titleid: String,

    #[serde(default, deserialize_with = "lenient")]
    pub slug: String,

    #[serde(default, deserialize_with = "lenient")]
    pub banner: Option<String>,

    #[serde(default, deserialize_with = "lenient")]
    pub image: Option<String>,

    #[serde(default, deserialize_with = "lenient")]
    pub count: i64,

    #[serde(deserialize_with = "cheat_entries")]
    pub cheats: Vec<CheatFile>,
}

impl GameResult {
    /// Artwork to show in the game header: the banner, else the image.
    pub fn artwork(&self) -> Option<&str> {
        self.banner
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.image.as_deref().filter(|s| !s.is_empty()))
    }

    /// Name used in user-facing messages, falling back to the queried title id.
    pub fn display_name<'a>(&'a self, queried_title_id: &'a str) -> &'a str {
        if self.name.is_empty() {
            queried_title_id
        } else {
            &self.name
        }
    }

    pub fn find_cheat(&self, id: &str) -> Option<&CheatFile> {
        self.cheats.iter().find(|c| c.id == id)
    }
}

/// What an error body carried under `errors`.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorDetails {
    /// Field name → message or list of messages, in server order
    Fields(IndexMap<String, Value>),

    /// Any other shape (a bare list, a string, a number)
    Other(Value),
}

/// Shape of an error body returned by either endpoint.
///
/// Every field is optional; [`ApiErrorBody::message`] applies the fallback order
/// `message` → `title` → flattened `errors`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiErrorBody {
    pub message: Option<String>,
    pub title: Option<String>,
    pub errors: Option<ErrorDetails>,
}

impl ApiErrorBody {
    /// Pick the known keys out of an error body one by one, so a key of an
    /// unexpected type never hides its siblings. A body that is not a JSON
    /// object yields an empty body.
    pub fn from_value(value: &Value) -> Self {
        let text = |key: &str| {
            value
                .get(key)
                .and_then(Value::as_str)
                .map(str::to_string)
        };

        let errors = match value.get("errors") {
            None | Some(Value::Null) => None,
            Some(Value::Object(fields)) => Some(ErrorDetails::Fields(
                fields.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            )),
            Some(other) => Some(ErrorDetails::Other(other.clone())),
        };

        Self {
            message: text("message"),
            title: text("title"),
            errors,
        }
    }

    /// Extract a human-readable message, if the body carries one.
    pub fn message(&self) -> Option<String> {
        if let Some(message) = self.message.as_deref().filter(|s| !s.is_empty()) {
            return Some(message.to_string());
        }
        if let Some(title) = self.title.as_deref().filter(|s| !s.is_empty()) {
            return Some(title.to_string());
        }
        self.errors
            .as_ref()
            .map(ErrorDetails::flatten)
            .filter(|s| !s.is_empty())
    }
}

impl ErrorDetails {
    /// Join the messages with `"; "`. Shapes that are not strings or lists of
    /// strings fall back to the compact JSON text of the whole `errors` value.
    pub fn flatten(&self) -> String {
        let parts = match self {
            ErrorDetails::Fields(fields) => fields
                .values()
                .map(string_messages)
                .collect::<Option<Vec<_>>>()
                .map(|lists| lists.concat()),
            ErrorDetails::Other(value) => string_messages(value),
        };

        match parts {
            Some(parts) => parts.join("; "),
            None => self.to_json(),
        }
    }

    fn to_json(&self) -> String {
        let text = match self {
            ErrorDetails::Fields(fields) => serde_json::to_string(fields),
            ErrorDetails::Other(value) => serde_json::to_string(value),
        };
        text.unwrap_or_default()
    }
}

/// A string or a list of strings; `None` for anything else.
fn string_messages(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::String(s) => Some(vec![s.clone()]),
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => None,
    }
}

/// Decode `T`, or fall back to `T::default()` on `null` or a type mismatch.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Ids arrive as strings or numbers.
fn lenient_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

/// Decode each entry on its own; entries that are not objects are skipped.
fn cheat_entries<'de, D>(deserializer: D) -> Result<Vec<CheatFile>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = Vec::<Value>::deserialize(deserializer)?;
    Ok(entries
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|entry| serde_json::from_value(entry).ok())
        .collect())
}
