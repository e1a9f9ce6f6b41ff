//! Table materialisation: turn an ordered record set into a rectangular
//! table and persist it as CSV or XLSX.
//!
//! ## Two input shapes
//!
//! Model output usually arrives as a list of row objects, but some replies
//! degenerate to a columnar dict-of-arrays (`{"name": [...], "age": [...]}`).
//! Rather than duck-typing the difference mid-write, [`classify`] produces an
//! explicit [`TableShape`] first, so each branch's contract is independently
//! testable.
//!
//! ## Cell rendering
//!
//! JSON strings render bare (no surrounding quotes), null and missing keys
//! render as empty cells, and everything else renders in its JSON text form —
//! a nested object in a cell is surprising but losing it would be worse.

use crate::error::Doc2TableError;
use serde_json::Value;
use std::io;
use std::path::Path;
use tracing::{debug, info};

/// How the record set maps onto a rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableShape {
    /// One row per record; columns are the union of keys in first-seen order.
    RowObjects,
    /// A single object whose values are column arrays; keys are columns.
    ColumnArrays,
}

/// A rectangular table ready to persist. Every row has exactly
/// `columns.len()` cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Decide how the record set maps onto a table.
///
/// `ColumnArrays` only when the set is exactly one non-empty object with
/// every top-level value an array; anything else is row-wise.
pub fn classify(records: &[Value]) -> TableShape {
    match records {
        [Value::Object(map)] if !map.is_empty() && map.values().all(Value::is_array) => {
            TableShape::ColumnArrays
        }
        _ => TableShape::RowObjects,
    }
}

/// Convert a record set into a [`Table`].
///
/// Fails with [`Doc2TableError::EmptyRecordSet`] when there is nothing to
/// materialise, and with [`Doc2TableError::NotTabular`] when a record is not
/// a JSON object (row-wise) or column arrays have unequal lengths
/// (column-wise).
pub fn materialize(records: &[Value]) -> Result<Table, Doc2TableError> {
    if records.is_empty() {
        return Err(Doc2TableError::EmptyRecordSet);
    }

    let shape = classify(records);
    debug!(?shape, records = records.len(), "materialising record set");
    match shape {
        TableShape::RowObjects => materialize_rows(records),
        TableShape::ColumnArrays => materialize_columns(records),
    }
}

fn materialize_rows(records: &[Value]) -> Result<Table, Doc2TableError> {
    // First pass: the column set is the union of keys in first-seen order.
    // serde_json's preserve_order feature keeps each object's own key order.
    let mut columns: Vec<String> = Vec::new();
    for (index, record) in records.iter().enumerate() {
        let object = record.as_object().ok_or_else(|| Doc2TableError::NotTabular {
            index,
            detail: format!("expected a JSON object, got {}", type_name(record)),
        })?;
        for key in object.keys() {
            if !columns.iter().any(|c| c == key) {
                columns.push(key.clone());
            }
        }
    }

    let rows = records
        .iter()
        .map(|record| {
            let object = record.as_object().unwrap(); // validated above
            columns
                .iter()
                .map(|column| render_cell(object.get(column)))
                .collect()
        })
        .collect();

    Ok(Table { columns, rows })
}

fn materialize_columns(records: &[Value]) -> Result<Table, Doc2TableError> {
    let object = records[0].as_object().unwrap(); // guaranteed by classify

    let columns: Vec<String> = object.keys().cloned().collect();
    let arrays: Vec<&Vec<Value>> = object.values().map(|v| v.as_array().unwrap()).collect();

    let height = arrays[0].len();
    if arrays.iter().any(|a| a.len() != height) {
        return Err(Doc2TableError::NotTabular {
            index: 0,
            detail: "column arrays have unequal lengths".to_string(),
        });
    }

    let rows = (0..height)
        .map(|r| arrays.iter().map(|a| render_cell(Some(&a[r]))).collect())
        .collect();

    Ok(Table { columns, rows })
}

fn render_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Persist a table to `path`.
///
/// Format is decided solely by the destination extension: `.xlsx`/`.xls` →
/// one-sheet spreadsheet workbook, anything else → comma-separated text.
/// Parent directories are created as needed.
pub fn persist(table: &Table, path: &Path) -> Result<(), Doc2TableError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| Doc2TableError::OutputWriteFailed {
                path: path.to_path_buf(),
                source: e,
            })?;
        }
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "xlsx" | "xls" => write_xlsx(table, path),
        _ => write_csv(table, path),
    }?;

    info!(
        "Persisted {} rows × {} columns to {}",
        table.rows.len(),
        table.columns.len(),
        path.display()
    );
    Ok(())
}

fn write_csv(table: &Table, path: &Path) -> Result<(), Doc2TableError> {
    let io_err = |e: io::Error| Doc2TableError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| io_err(io::Error::other(e)))?;
    writer
        .write_record(&table.columns)
        .map_err(|e| io_err(io::Error::other(e)))?;
    for row in &table.rows {
        writer
            .write_record(row)
            .map_err(|e| io_err(io::Error::other(e)))?;
    }
    writer.flush().map_err(io_err)
}

fn write_xlsx(table: &Table, path: &Path) -> Result<(), Doc2TableError> {
    let xlsx_err = |e: rust_xlsxwriter::XlsxError| Doc2TableError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: io::Error::other(e),
    };

    let mut workbook = rust_xlsxwriter::Workbook::new();
    let sheet = workbook.add_worksheet();

    for (col, name) in table.columns.iter().enumerate() {
        sheet.write_string(0, col as u16, name).map_err(xlsx_err)?;
    }
    for (row, cells) in table.rows.iter().enumerate() {
        for (col, cell) in cells.iter().enumerate() {
            sheet
                .write_string(row as u32 + 1, col as u16, cell)
                .map_err(xlsx_err)?;
        }
    }

    workbook.save(path).map_err(xlsx_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn union_of_keys_with_missing_cells() {
        let records = vec![json!({"a": 1, "b": 2}), json!({"a": 3})];
        let table = materialize(&records).unwrap();
        assert_eq!(table.columns, vec!["a", "b"]);
        assert_eq!(table.rows, vec![vec!["1", "2"], vec!["3", ""]]);
    }

    #[test]
    fn columns_keep_first_seen_order_across_records() {
        let records = vec![json!({"b": 1, "a": 2}), json!({"c": 3, "a": 4})];
        let table = materialize(&records).unwrap();
        assert_eq!(table.columns, vec!["b", "a", "c"]);
    }

    #[test]
    fn string_cells_render_unquoted_and_null_renders_empty() {
        let records = vec![json!({"name": "Alice", "note": null, "tags": ["x", "y"]})];
        // A single object with a non-array value stays row-wise.
        assert_eq!(classify(&records), TableShape::RowObjects);
        let table = materialize(&records).unwrap();
        assert_eq!(table.rows[0][0], "Alice");
        assert_eq!(table.rows[0][1], "");
        assert_eq!(table.rows[0][2], "[\"x\",\"y\"]");
    }

    #[test]
    fn empty_record_set_fails() {
        let err = materialize(&[]).unwrap_err();
        assert!(matches!(err, Doc2TableError::EmptyRecordSet));
    }

    #[test]
    fn non_object_record_fails_with_index() {
        let records = vec![json!({"a": 1}), json!("just a string")];
        let err = materialize(&records).unwrap_err();
        match err {
            Doc2TableError::NotTabular { index, detail } => {
                assert_eq!(index, 1);
                assert!(detail.contains("string"));
            }
            other => panic!("expected NotTabular, got {other:?}"),
        }
    }

    #[test]
    fn dict_of_arrays_is_classified_columnar() {
        let records = vec![json!({"name": ["Alice", "Bob"], "age": [30, 25]})];
        assert_eq!(classify(&records), TableShape::ColumnArrays);

        let table = materialize(&records).unwrap();
        assert_eq!(table.columns, vec!["name", "age"]);
        assert_eq!(table.rows, vec![vec!["Alice", "30"], vec!["Bob", "25"]]);
    }

    #[test]
    fn two_objects_with_array_values_stay_row_wise() {
        // Column-array shape only applies to a single-record set.
        let records = vec![json!({"a": [1]}), json!({"a": [2]})];
        assert_eq!(classify(&records), TableShape::RowObjects);
    }

    #[test]
    fn unequal_column_arrays_fail() {
        let records = vec![json!({"name": ["Alice", "Bob"], "age": [30]})];
        let err = materialize(&records).unwrap_err();
        assert!(matches!(err, Doc2TableError::NotTabular { .. }));
    }

    #[test]
    fn persist_csv_writes_header_and_rows() {
        let table = Table {
            columns: vec!["a".into(), "b".into()],
            rows: vec![vec!["1".into(), "2".into()], vec!["3".into(), "".into()]],
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        persist(&table, &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "a,b\n1,2\n3,\n");
    }

    #[test]
    fn persist_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/out.csv");
        let table = Table {
            columns: vec!["a".into()],
            rows: vec![vec!["1".into()]],
        };
        persist(&table, &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn persist_xlsx_writes_a_workbook() {
        let table = Table {
            columns: vec!["a".into()],
            rows: vec![vec!["1".into()]],
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        persist(&table, &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        // XLSX is a ZIP container; check the magic rather than the size.
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn unknown_extension_falls_back_to_csv() {
        let table = Table {
            columns: vec!["a".into()],
            rows: vec![vec!["1".into()]],
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.tsv");
        persist(&table, &path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("a\n") || contents.starts_with("a\r\n"));
    }
}
