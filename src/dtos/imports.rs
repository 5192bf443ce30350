use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    #[serde(default)]
    pub customers: Vec<ImportRow>,
}

/// One spreadsheet row as uploaded. Every field is optional and loosely
/// typed: spreadsheet exports hand over numbers where strings are expected
/// and vice versa, so normalization happens in the import engine rather
/// than at deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImportRow {
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default, rename = "box")]
    pub box_number: Option<Value>,
    #[serde(default)]
    pub mobile: Option<Value>,
    #[serde(default)]
    pub balance: Option<Value>,
    #[serde(default)]
    pub curr: Option<Value>,
    #[serde(default)]
    pub address: Option<Value>,
}
