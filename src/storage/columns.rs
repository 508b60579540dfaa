// src/storage/columns.rs

//! Arrow encoding of scrape results.

use std::sync::Arc;

use arrow_array::builder::{ListBuilder, StringBuilder};
use arrow_array::cast::AsArray;
use arrow_array::types::{Int32Type, Int64Type, UInt32Type, UInt64Type};
use arrow_array::{Array, ArrayRef, Int64Array, ListArray, RecordBatch};
use arrow_schema::{DataType, Field, Schema, SchemaRef};

use crate::error::{AppError, Result};
use crate::models::{QuestionId, ScrapeResult};

pub const QUESTION_ID: &str = "question_id";
pub const BOUNTY_START: &str = "bounty_start";
pub const BOUNTY_END: &str = "bounty_end";

/// Schema of a result part file.
pub fn result_schema() -> SchemaRef {
    let item = Arc::new(Field::new("item", DataType::Utf8, true));
    Arc::new(Schema::new(vec![
        Field::new(QUESTION_ID, DataType::Int64, false),
        Field::new(BOUNTY_START, DataType::List(Arc::clone(&item)), false),
        Field::new(BOUNTY_END, DataType::List(item), false),
    ]))
}

/// Encode results as one record batch, preserving their order.
pub fn encode_results(results: &[ScrapeResult]) -> Result<RecordBatch> {
    let ids = Int64Array::from_iter_values(results.iter().map(|r| r.question_id.to_stored()));
    let starts = timestamp_lists(results.iter().map(|r| &r.bounty_start));
    let ends = timestamp_lists(results.iter().map(|r| &r.bounty_end));

    let columns: Vec<ArrayRef> = vec![Arc::new(ids), Arc::new(starts), Arc::new(ends)];
    Ok(RecordBatch::try_new(result_schema(), columns)?)
}

/// Decode the rows of a result record batch.
pub fn decode_results(batch: &RecordBatch) -> Result<Vec<ScrapeResult>> {
    let ids = question_ids(batch)?;
    let starts = list_column(batch, BOUNTY_START)?;
    let ends = list_column(batch, BOUNTY_END)?;

    let mut results = Vec::with_capacity(ids.len());
    for (row, id) in ids.into_iter().enumerate() {
        let question_id = id.and_then(QuestionId::from_stored).ok_or_else(|| {
            AppError::validation(format!("row {row} has no valid {QUESTION_ID}"))
        })?;
        results.push(ScrapeResult {
            question_id,
            bounty_start: timestamps_at(starts, row)?,
            bounty_end: timestamps_at(ends, row)?,
        });
    }
    Ok(results)
}

/// Read the `question_id` column of any integer type, widened to `i64`.
///
/// Null entries and `u64` values beyond `i64::MAX` come back as `None`.
pub fn question_ids(batch: &RecordBatch) -> Result<Vec<Option<i64>>> {
    let column = batch
        .column_by_name(QUESTION_ID)
        .ok_or_else(|| AppError::validation(format!("missing column '{QUESTION_ID}'")))?;

    let values = match column.data_type() {
        DataType::Int64 => column.as_primitive::<Int64Type>().iter().collect(),
        DataType::Int32 => column
            .as_primitive::<Int32Type>()
            .iter()
            .map(|v| v.map(i64::from))
            .collect(),
        DataType::UInt32 => column
            .as_primitive::<UInt32Type>()
            .iter()
            .map(|v| v.map(i64::from))
            .collect(),
        DataType::UInt64 => column
            .as_primitive::<UInt64Type>()
            .iter()
            .map(|v| v.and_then(|v| i64::try_from(v).ok()))
            .collect(),
        other => {
            return Err(AppError::validation(format!(
                "column '{QUESTION_ID}' has unsupported type {other}"
            )));
        }
    };
    Ok(values)
}

fn timestamp_lists<'a>(rows: impl Iterator<Item = &'a Vec<Option<String>>>) -> ListArray {
    let mut builder = ListBuilder::new(StringBuilder::new());
    for row in rows {
        for timestamp in row {
            builder.values().append_option(timestamp.as_deref());
        }
        builder.append(true);
    }
    builder.finish()
}

fn list_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a ListArray> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_list_opt::<i32>())
        .ok_or_else(|| AppError::validation(format!("missing list column '{name}'")))
}

fn timestamps_at(list: &ListArray, row: usize) -> Result<Vec<Option<String>>> {
    if list.is_null(row) {
        return Ok(Vec::new());
    }
    let values = list.value(row);
    let strings = values
        .as_string_opt::<i32>()
        .ok_or_else(|| AppError::validation("timestamp list does not hold strings"))?;
    Ok(strings.iter().map(|v| v.map(str::to_string)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_keeps_nulls_and_empty_lists() {
        let results = vec![
            ScrapeResult {
                question_id: QuestionId::new(10),
                bounty_start: vec![Some("2024-01-01 00:00:00Z".into()), None],
                bounty_end: vec![],
            },
            ScrapeResult {
                question_id: QuestionId::new(11),
                bounty_start: vec![],
                bounty_end: vec![Some("2024-01-08 00:00:00Z".into())],
            },
        ];

        let batch = encode_results(&results).unwrap();
        assert_eq!(batch.num_rows(), 2);
        assert_eq!(decode_results(&batch).unwrap(), results);
    }

    #[test]
    fn test_question_ids_accepts_int32() {
        let ids: ArrayRef = Arc::new(arrow_array::Int32Array::from(vec![Some(5), None, Some(-1)]));
        let batch = RecordBatch::try_from_iter(vec![(QUESTION_ID, ids)]).unwrap();
        assert_eq!(question_ids(&batch).unwrap(), vec![Some(5), None, Some(-1)]);
    }

    #[test]
    fn test_question_ids_rejects_strings() {
        let ids: ArrayRef = Arc::new(arrow_array::StringArray::from(vec!["5"]));
        let batch = RecordBatch::try_from_iter(vec![(QUESTION_ID, ids)]).unwrap();
        assert!(question_ids(&batch).is_err());
    }
}
