// In: src/bridge/format.rs

//! Defines every JSON document exchanged on the JSON boundary.
//! This is the single source of truth for the key names and shapes the engine
//! reads and writes. Keys the engine adds in newer builds are kept in each
//! top-level struct's `extra` map and written back unchanged.

use crate::types::{Field, PacketMeta, Row, Schema};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

//==================================================================================
// 0. Serde Helpers
//==================================================================================

/// Treats an explicit JSON `null` like a missing key. Nil slices arrive as `null`.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn is_zero(n: &i64) -> bool {
    *n == 0
}

fn default_true() -> bool {
    true
}

fn default_level() -> i32 {
    3
}

/// Wire format of `Header::timestamp`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

//==================================================================================
// I. Packet Documents
//==================================================================================

/// A column as the engine spells it in JSON.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct FieldJson {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "Type")]
    pub type_name: String,
    #[serde(default)]
    pub length: i64,
    #[serde(default)]
    pub precision: i64,
    #[serde(default)]
    pub scale: i64,
    #[serde(default)]
    pub key: bool,
    #[serde(default)]
    pub timezone: String,
    #[serde(default)]
    pub subtype: String,
}

impl From<&Field> for FieldJson {
    fn from(f: &Field) -> Self {
        Self {
            name: f.name.clone(),
            type_name: f.type_name.clone(),
            length: f.length.into(),
            precision: f.precision.into(),
            scale: f.scale.into(),
            key: f.is_key,
            timezone: String::new(),
            subtype: String::new(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaJson {
    #[serde(rename = "Fields", default, deserialize_with = "null_as_default")]
    pub fields: Vec<FieldJson>,
}

impl SchemaJson {
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

impl From<&Schema> for SchemaJson {
    fn from(schema: &Schema) -> Self {
        Self {
            fields: schema.fields.iter().map(FieldJson::from).collect(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    #[serde(rename = "type", default)]
    pub msg_type: String,
    #[serde(default)]
    pub table_name: String,
    #[serde(default)]
    pub message_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub in_reply_to: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub part_number: i64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub total_parts: i64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub records_in_part: i64,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub sender: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub recipient: String,
}

impl Header {
    /// A fresh `reference` header stamped with the current time and a new id.
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            msg_type: "reference".to_string(),
            table_name: table_name.into(),
            message_id: new_message_id(),
            timestamp: Utc::now().format(TIMESTAMP_FORMAT).to_string(),
            ..Self::default()
        }
    }

    /// Parses `timestamp`, accepting RFC 3339 as well as the engine's own format.
    pub fn timestamp_utc(&self) -> Option<DateTime<Utc>> {
        if let Ok(ts) = DateTime::parse_from_rfc3339(&self.timestamp) {
            return Some(ts.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(&self.timestamp, TIMESTAMP_FORMAT)
            .ok()
            .map(|naive| naive.and_utc())
    }
}

/// Pagination metadata attached to `J_FilterRowsPage` results.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryContext {
    #[serde(default)]
    pub total_records: i64,
    #[serde(default)]
    pub matched_records: i64,
    #[serde(default)]
    pub returned_records: i64,
    #[serde(default)]
    pub more_available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_offset: Option<i64>,
    #[serde(default)]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

impl QueryContext {
    /// The offset the next page must start at, if there is one.
    pub fn expected_next_offset(&self) -> Option<i64> {
        self.more_available
            .then_some(self.offset + self.returned_records)
    }
}

/// A whole dataset: schema, header and rows.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct PacketData {
    #[serde(default)]
    pub schema: SchemaJson,
    #[serde(default)]
    pub header: Header,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_context: Option<QueryContext>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PacketData {
    pub fn new(
        table_name: impl Into<String>,
        fields: Vec<FieldJson>,
        data: Vec<Vec<String>>,
    ) -> Self {
        Self {
            schema: SchemaJson { fields },
            header: Header::new(table_name),
            data,
            ..Self::default()
        }
    }

    /// Builds the JSON view of a Direct-boundary packet.
    pub fn from_parts(schema: &Schema, rows: &[Row], meta: &PacketMeta) -> Self {
        let timestamp = meta
            .timestamp_utc()
            .map(|ts| ts.format(TIMESTAMP_FORMAT).to_string())
            .unwrap_or_default();
        Self {
            schema: SchemaJson::from(schema),
            header: Header {
                msg_type: meta.msg_type.clone(),
                table_name: meta.table_name.clone(),
                message_id: meta.message_id.clone(),
                timestamp,
                ..Header::default()
            },
            data: rows.iter().map(|r| r.values.clone()).collect(),
            ..Self::default()
        }
    }

    pub fn row_count(&self) -> usize {
        self.data.len()
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.schema.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// All values of one column, or `None` if the column does not exist.
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.schema.index_of(name)?;
        Some(
            self.data
                .iter()
                .map(|row| row.get(idx).map(String::as_str).unwrap_or(""))
                .collect(),
        )
    }
}

//==================================================================================
// II. Processor & Export Documents
//==================================================================================

/// One step of a `J_ApplyChain` pipeline.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChainStep {
    #[serde(rename = "type")]
    pub step_type: String,
    #[serde(default)]
    pub params: Value,
}

impl ChainStep {
    pub fn new(step_type: impl Into<String>, params: Value) -> Self {
        Self {
            step_type: step_type.into(),
            params,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    #[serde(default)]
    pub compress: bool,
    #[serde(default = "default_level")]
    pub level: i32,
    #[serde(default = "default_true")]
    pub checksum: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            compress: false,
            level: default_level(),
            checksum: true,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub files: Vec<String>,
    #[serde(default)]
    pub total_parts: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The engine's acknowledgement for `J_WriteFile`.
#[derive(Deserialize, Debug, Clone, Default)]
pub(crate) struct WriteAck {
    #[serde(default)]
    pub ok: bool,
}

/// `J_SerializeValue` answers with `{"value": ...}`.
#[derive(Deserialize, Debug, Clone)]
pub(crate) struct SerializedValue {
    pub value: String,
}

//==================================================================================
// III. Diff Documents
//==================================================================================

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldChange {
    #[serde(default)]
    pub field_name: String,
    #[serde(default)]
    pub old_value: String,
    #[serde(default)]
    pub new_value: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ModifiedRow {
    #[serde(default)]
    pub key: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub old_row: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub new_row: Vec<String>,
    /// Keyed by the column index, as a decimal string.
    #[serde(default, deserialize_with = "null_as_default")]
    pub changes: hashbrown::HashMap<String, FieldChange>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffStats {
    #[serde(default)]
    pub total_in_a: i64,
    #[serde(default)]
    pub total_in_b: i64,
    #[serde(default)]
    pub added: i64,
    #[serde(default)]
    pub removed: i64,
    #[serde(default)]
    pub modified: i64,
    #[serde(default)]
    pub unchanged: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct DiffResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub added: Vec<Vec<String>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub removed: Vec<Vec<String>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub modified: Vec<ModifiedRow>,
    #[serde(default)]
    pub stats: DiffStats,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DiffResult {
    pub fn is_identical(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty()
    }
}

//==================================================================================
// IV. Identifiers
//==================================================================================

/// A random RFC 4122 version-4 identifier, hyphenated lowercase.
pub fn new_message_id() -> String {
    let mut bytes: [u8; 16] = rand::random();
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;

    let hex: String = bytes.iter().map(|b| format!("{:02x}", b)).collect();
    format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    )
}
