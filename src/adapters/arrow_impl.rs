// In: src/adapters/arrow_impl.rs

//! Packets as Arrow `RecordBatch`es.
//!
//! Every column becomes a nullable `Utf8` array; the TDTP type and key flag
//! ride along in the Arrow field metadata so `from_table` can rebuild the
//! schema. Non-string columns coming from elsewhere are cast to `Utf8` and
//! nulls become empty strings.

use super::TabularAdapter;
use crate::bridge::format::{FieldJson, PacketData};
use crate::error::{Result, TdtpError};
use arrow::array::{Array, ArrayRef, StringArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use std::collections::HashMap;
use std::sync::Arc;

pub const META_TYPE: &str = "tdtp.type";
pub const META_KEY: &str = "tdtp.key";

#[derive(Debug, Clone, Copy, Default)]
pub struct ArrowAdapter;

fn arrow_field(field: &FieldJson) -> Field {
    let mut metadata = HashMap::new();
    metadata.insert(META_TYPE.to_string(), field.type_name.clone());
    if field.key {
        metadata.insert(META_KEY.to_string(), "true".to_string());
    }
    Field::new(&field.name, DataType::Utf8, true).with_metadata(metadata)
}

fn tdtp_field(field: &Field) -> FieldJson {
    let metadata = field.metadata();
    FieldJson {
        name: field.name().clone(),
        type_name: metadata
            .get(META_TYPE)
            .cloned()
            .unwrap_or_else(|| "TEXT".to_string()),
        key: metadata.get(META_KEY).is_some_and(|v| v == "true"),
        ..FieldJson::default()
    }
}

impl TabularAdapter for ArrowAdapter {
    type Table = RecordBatch;

    fn to_table(&self, data: &PacketData) -> Result<RecordBatch> {
        let fields: Vec<Field> = data.schema.fields.iter().map(arrow_field).collect();
        let schema = Arc::new(Schema::new(fields));
        let columns = (0..data.schema.fields.len())
            .map(|i| {
                let values = data
                    .data
                    .iter()
                    .enumerate()
                    .map(|(r, row)| {
                        row.get(i).map(String::as_str).ok_or_else(|| {
                            TdtpError::MalformedPacket(format!(
                                "row {} has no value for column {}",
                                r, i
                            ))
                        })
                    })
                    .collect::<Result<Vec<&str>>>()?;
                Ok(Arc::new(StringArray::from(values)) as ArrayRef)
            })
            .collect::<Result<Vec<_>>>()?;

        let options = RecordBatchOptions::new().with_row_count(Some(data.row_count()));
        Ok(RecordBatch::try_new_with_options(schema, columns, &options)?)
    }

    fn from_table(&self, batch: &RecordBatch, table_name: &str) -> Result<PacketData> {
        let schema = batch.schema();
        let fields: Vec<FieldJson> = schema.fields().iter().map(|f| tdtp_field(f)).collect();

        let columns = batch
            .columns()
            .iter()
            .map(|col| cast(col, &DataType::Utf8))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let strings = columns
            .iter()
            .map(|col| {
                col.as_any()
                    .downcast_ref::<StringArray>()
                    .ok_or_else(|| TdtpError::InvalidArgument("column did not cast to Utf8".into()))
            })
            .collect::<Result<Vec<_>>>()?;

        let data = (0..batch.num_rows())
            .map(|r| {
                strings
                    .iter()
                    .map(|col| {
                        if col.is_null(r) {
                            String::new()
                        } else {
                            col.value(r).to_string()
                        }
                    })
                    .collect()
            })
            .collect();

        Ok(PacketData::new(table_name, fields, data))
    }
}
