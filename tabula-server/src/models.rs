//! Request and response bodies.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tabula_engine::{ReadOptions, SourceMetadata};

fn default_separator() -> String {
    ",".to_owned()
}

fn default_header() -> bool {
    true
}

fn default_decimal() -> char {
    '.'
}

fn default_rows() -> i64 {
    5
}

/// Body of `/data/load` and the base of every other data request
#[derive(Debug, Clone, Deserialize)]
pub struct DataLoadRequest {
    /// Local path, `file://` URL or http(s) URL
    pub source_url: String,
    #[serde(default = "default_separator")]
    pub separator: String,
    #[serde(default = "default_header")]
    pub header: bool,
    #[serde(default = "default_decimal")]
    pub decimal: char,
    #[serde(default)]
    pub names: Option<Vec<String>>,
}

impl DataLoadRequest {
    pub fn read_options(&self) -> ReadOptions {
        ReadOptions {
            separator: self.separator.clone(),
            decimal: self.decimal,
            header: self.header,
            names: self.names.clone(),
        }
    }
}

/// Body of `/data/head` and `/data/tail`
#[derive(Debug, Clone, Deserialize)]
pub struct DataSliceRequest {
    #[serde(flatten)]
    pub source: DataLoadRequest,
    #[serde(default = "default_rows")]
    pub n: i64,
}

pub type Records = Vec<Map<String, Value>>;

#[derive(Debug, Serialize)]
pub struct LoadResponse {
    pub status: &'static str,
    pub shape: (usize, usize),
    pub columns: Vec<String>,
    pub preview: Records,
}

#[derive(Debug, Serialize)]
pub struct RecordsResponse {
    pub status: &'static str,
    pub data: Records,
}

#[derive(Debug, Serialize)]
pub struct StatisticsResponse {
    pub status: &'static str,
    pub statistics: Value,
}

#[derive(Debug, Serialize)]
pub struct MetadataResponse {
    pub status: &'static str,
    pub metadata: SourceMetadata,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub status: &'static str,
    pub shape: (usize, usize),
    pub columns: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ClearCacheResponse {
    pub status: &'static str,
    pub removed: usize,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
