use anyhow::{anyhow, Context, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const SNAPSHOT_SCHEMA_VERSION: u32 = 1;

/// An open tab as reported by the host browser.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TabRecord {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub fav_icon_url: Option<String>,
    #[serde(default)]
    pub window_id: u64,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub audible: bool,
}

/// A recently closed tab that the host can restore by session id.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub session_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub fav_icon_url: Option<String>,
}

/// Everything the ranker needs for one pass, captured at query time.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub schema_version: Option<u32>,
    #[serde(default)]
    pub tabs: Vec<TabRecord>,
    #[serde(default)]
    pub closed: Vec<SessionRecord>,
    /// Tab ids, most recently used first.
    #[serde(default)]
    pub mru: Vec<u64>,
}

impl Snapshot {
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let snapshot: Self =
            serde_json::from_slice(bytes).context("Snapshot is not valid JSON")?;
        if let Some(version) = snapshot.schema_version {
            if version != SNAPSHOT_SCHEMA_VERSION {
                return Err(anyhow!(
                    "snapshot.schema_version {version} is not supported (expected {SNAPSHOT_SCHEMA_VERSION})"
                ));
            }
        }
        Ok(snapshot)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    OpenTab,
    ClosedSession,
}

/// Half-open `[start, end)` character ranges to emphasize, per displayed line.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq, JsonSchema)]
pub struct Highlights {
    pub title: Vec<[usize; 2]>,
    pub url: Vec<[usize; 2]>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct ItemOutput {
    pub kind: ItemKind,
    /// Position in the enumeration handed to the ranker.
    pub origin: usize,
    pub score: f64,
    pub title: String,
    pub url: String,
    pub favicon: Option<String>,
    pub tab_id: Option<u64>,
    pub window_id: Option<u64>,
    pub session_id: Option<String>,
    pub highlights: Highlights,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct SectionOutput {
    pub id: String,
    pub title: String,
    pub items: Vec<ItemOutput>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct RankOutput {
    pub query: String,
    pub profile: String,
    pub total: usize,
    pub sections: Vec<SectionOutput>,
}

#[derive(Debug, Serialize, Deserialize, Clone, JsonSchema)]
pub struct ErrorEnvelope {
    pub code: String,
    pub message: String,
    pub hint: Option<String>,
}

pub fn snapshot_schema() -> Result<serde_json::Value> {
    serde_json::to_value(schemars::schema_for!(Snapshot)).map_err(Into::into)
}
