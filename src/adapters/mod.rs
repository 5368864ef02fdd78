// In: src/adapters/mod.rs

//! Conversions between JSON-boundary packets and tabular representations.
//!
//! The core crate knows nothing about any dataframe library; each one plugs in
//! through `TabularAdapter`. `ColumnarAdapter` is always available. The Arrow
//! implementation is compiled only with the `arrow` feature.

use crate::bridge::format::{FieldJson, PacketData};
use crate::error::{Result, TdtpError};

#[cfg(feature = "arrow")]
pub mod arrow_impl;

#[cfg(feature = "arrow")]
pub use arrow_impl::ArrowAdapter;

/// A capability for converting packets to and from a library's table type.
pub trait TabularAdapter {
    type Table;

    fn to_table(&self, data: &PacketData) -> Result<Self::Table>;

    /// Builds a packet with a fresh `reference` header for `table_name`.
    fn from_table(&self, table: &Self::Table, table_name: &str) -> Result<PacketData>;
}

/// One named column of string values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub field: FieldJson,
    pub values: Vec<String>,
}

/// Transposes packets into columns and back.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColumnarAdapter;

impl TabularAdapter for ColumnarAdapter {
    type Table = Vec<Column>;

    fn to_table(&self, data: &PacketData) -> Result<Vec<Column>> {
        let width = data.schema.fields.len();
        if let Some((idx, row)) = data.data.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(TdtpError::MalformedPacket(format!(
                "row {} has {} values for {} fields",
                idx,
                row.len(),
                width
            )));
        }
        Ok(data
            .schema
            .fields
            .iter()
            .enumerate()
            .map(|(i, field)| Column {
                field: field.clone(),
                values: data.data.iter().map(|row| row[i].clone()).collect(),
            })
            .collect())
    }

    fn from_table(&self, table: &Vec<Column>, table_name: &str) -> Result<PacketData> {
        let rows = table.first().map_or(0, |c| c.values.len());
        if let Some(col) = table.iter().find(|c| c.values.len() != rows) {
            return Err(TdtpError::InvalidArgument(format!(
                "column {} has {} values, expected {}",
                col.field.name,
                col.values.len(),
                rows
            )));
        }
        let data = (0..rows)
            .map(|r| table.iter().map(|c| c.values[r].clone()).collect())
            .collect();
        let fields = table.iter().map(|c| c.field.clone()).collect();
        Ok(PacketData::new(table_name, fields, data))
    }
}
