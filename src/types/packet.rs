// In: src/types/packet.rs

//! Owned, safe copies of the engine's packet contents.
//!
//! Values of these types are produced by copying out of a live `RawPacket`;
//! they never borrow engine memory and stay valid after the packet is released.

use crate::error::{Result, TdtpError};
use crate::ffi::layout::{read_c_str, read_fixed, RawField, RawPacket, RawRow, RawSchema};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

//==================================================================================
// I. Schema
//==================================================================================

/// One column definition.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub type_name: String,
    pub length: i32,
    pub precision: i32,
    pub scale: i32,
    pub is_key: bool,
    pub is_readonly: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            length: 0,
            precision: 0,
            scale: 0,
            is_key: false,
            is_readonly: false,
        }
    }

    pub(crate) fn from_raw(raw: &RawField) -> Self {
        Self {
            name: read_fixed(&raw.name),
            type_name: read_fixed(&raw.type_name),
            length: raw.length,
            precision: raw.precision,
            scale: raw.scale,
            is_key: raw.is_key != 0,
            is_readonly: raw.is_readonly != 0,
        }
    }
}

/// Ordered column definitions. An empty schema is valid.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    pub fields: Vec<Field>,
}

impl Schema {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// # Safety
    /// `raw.fields` must point to `raw.field_count` initialized fields, or be
    /// null when the count is zero.
    pub(crate) unsafe fn from_raw(raw: &RawSchema) -> Result<Self> {
        let count = checked_count(raw.field_count, "schema.field_count")?;
        if count == 0 {
            return Ok(Self::default());
        }
        if raw.fields.is_null() {
            return Err(TdtpError::MalformedPacket(format!(
                "schema claims {} fields but the array is null",
                count
            )));
        }
        let fields = std::slice::from_raw_parts(raw.fields, count);
        Ok(Self {
            fields: fields.iter().map(Field::from_raw).collect(),
        })
    }
}

//==================================================================================
// II. Rows
//==================================================================================

/// One record. Empty strings stand for nulls.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct Row {
    pub values: Vec<String>,
}

impl Row {
    pub fn new(values: Vec<String>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&str> {
        self.values.get(idx).map(String::as_str)
    }

    /// # Safety
    /// `raw.values` must point to `raw.value_count` C string pointers.
    pub(crate) unsafe fn from_raw(raw: &RawRow, row_idx: usize) -> Result<Self> {
        let count = checked_count(raw.value_count, "row.value_count")?;
        if count == 0 {
            return Ok(Self::default());
        }
        if raw.values.is_null() {
            return Err(TdtpError::MalformedPacket(format!(
                "row {} claims {} values but the array is null",
                row_idx, count
            )));
        }
        let ptrs = std::slice::from_raw_parts(raw.values, count);
        let mut values = Vec::with_capacity(count);
        for (col, &ptr) in ptrs.iter().enumerate() {
            let value = read_c_str(ptr).ok_or_else(|| {
                TdtpError::MalformedPacket(format!(
                    "row {} value {} is a null pointer",
                    row_idx, col
                ))
            })?;
            values.push(value);
        }
        Ok(Self { values })
    }
}

impl From<Vec<String>> for Row {
    fn from(values: Vec<String>) -> Self {
        Self { values }
    }
}

impl<'a> From<Vec<&'a str>> for Row {
    fn from(values: Vec<&'a str>) -> Self {
        Self {
            values: values.into_iter().map(str::to_owned).collect(),
        }
    }
}

/// # Safety
/// `pkt.rows` must point to `pkt.row_count` initialized rows.
pub(crate) unsafe fn rows_from_raw(pkt: &RawPacket) -> Result<Vec<Row>> {
    let count = checked_count(pkt.row_count, "packet.row_count")?;
    if count == 0 {
        return Ok(Vec::new());
    }
    if pkt.rows.is_null() {
        return Err(TdtpError::MalformedPacket(format!(
            "packet claims {} rows but the array is null",
            count
        )));
    }
    std::slice::from_raw_parts(pkt.rows, count)
        .iter()
        .enumerate()
        .map(|(i, row)| Row::from_raw(row, i))
        .collect()
}

fn checked_count(count: i32, what: &str) -> Result<usize> {
    usize::try_from(count)
        .map_err(|_| TdtpError::MalformedPacket(format!("{} is negative ({})", what, count)))
}

//==================================================================================
// III. Metadata
//==================================================================================

/// The packet's compression tag.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Compression {
    #[default]
    None,
    Zstd,
    Other(String),
}

impl Compression {
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim() {
            "" | "none" => Compression::None,
            t if t.eq_ignore_ascii_case("zstd") => Compression::Zstd,
            t => Compression::Other(t.to_string()),
        }
    }

    pub fn as_tag(&self) -> &str {
        match self {
            Compression::None => "none",
            Compression::Zstd => "zstd",
            Compression::Other(t) => t,
        }
    }

    pub fn is_compressed(&self) -> bool {
        !matches!(self, Compression::None)
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// Header fields of a Direct-boundary packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketMeta {
    pub msg_type: String,
    pub table_name: String,
    pub message_id: String,
    pub timestamp_unix: i64,
    pub compression: Compression,
}

impl PacketMeta {
    pub(crate) fn from_raw(pkt: &RawPacket) -> Self {
        Self {
            msg_type: read_fixed(&pkt.msg_type),
            table_name: read_fixed(&pkt.table_name),
            message_id: read_fixed(&pkt.message_id),
            timestamp_unix: pkt.timestamp_unix,
            compression: Compression::from_tag(&read_fixed(&pkt.compression)),
        }
    }

    /// `None` when the engine left the timestamp unset or out of range.
    pub fn timestamp_utc(&self) -> Option<DateTime<Utc>> {
        if self.timestamp_unix == 0 {
            return None;
        }
        DateTime::from_timestamp(self.timestamp_unix, 0)
    }
}
