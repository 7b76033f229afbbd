//! Item data structures and remote wire-format parsing.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::Result;

/// One story fetched from the remote source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Remote-assigned identifier
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,

    /// Story title, empty when the remote omits it
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,

    /// Link target
    #[serde(default)]
    pub url: Option<String>,

    /// Submitter
    #[serde(default, rename = "by")]
    pub author: Option<String>,

    /// Ranking score
    #[serde(default, deserialize_with = "null_as_default")]
    pub score: i64,

    /// Comment count, passed through as supplied
    #[serde(default, rename = "descendants")]
    pub comment_count: Option<Value>,

    /// Posting time, passed through as supplied
    #[serde(default, rename = "time")]
    pub posted_at: Option<Value>,

    /// Child ids in remote order
    #[serde(default, deserialize_with = "deserialize_ids")]
    pub kids: Vec<String>,
}

impl Item {
    /// Parse a single item body. The remote answers `null` for unknown ids.
    pub fn parse(body: &str) -> Result<Option<Self>> {
        Ok(serde_json::from_str(body)?)
    }

    /// Project into the lightweight view served to callers.
    pub fn view(&self) -> ItemView {
        ItemView {
            title: self.title.clone(),
            url: self.url.clone(),
            author: self.author.clone(),
            posted_at: self.posted_at.clone(),
            score: self.score,
            comment_count: self.comment_count.clone(),
        }
    }
}

/// Ranked projection of an [`Item`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemView {
    pub title: String,
    pub url: Option<String>,
    pub author: Option<String>,
    pub posted_at: Option<Value>,
    pub score: i64,
    pub comment_count: Option<Value>,
}

impl From<&Item> for ItemView {
    fn from(item: &Item) -> Self {
        item.view()
    }
}

/// Parse the ranked id list. Entries may be numbers or strings.
pub fn parse_index(body: &str) -> Result<Vec<String>> {
    let ids: Vec<RawId> = serde_json::from_str(body)?;
    Ok(ids.into_iter().map(String::from).collect())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(u64),
    Text(String),
}

impl From<RawId> for String {
    fn from(id: RawId) -> Self {
        match id {
            RawId::Number(n) => n.to_string(),
            RawId::Text(s) => s,
        }
    }
}

fn deserialize_id<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<String, D::Error> {
    RawId::deserialize(deserializer).map(String::from)
}

fn deserialize_ids<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Vec<String>, D::Error> {
    let ids: Option<Vec<RawId>> = Option::deserialize(deserializer)?;
    Ok(ids
        .unwrap_or_default()
        .into_iter()
        .map(String::from)
        .collect())
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
