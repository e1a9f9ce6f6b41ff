//! Aggregation: merge recovered JSON values across chunks into one ordered
//! record set.
//!
//! Order is chunk order, then within-chunk array order. The aggregator
//! imposes no deduplication and no record-count limit — overlapping chunks
//! can legitimately report the same record twice, and whether that is a
//! duplicate is a question for the caller's schema, not this pipeline.

use serde_json::Value;

/// Append the records contributed by one recovered value, returning how many
/// were added.
///
/// * array → each element becomes one record
/// * object → one record
/// * scalar (string/number/bool/null) → nothing; the reply parsed as JSON but
///   carries no tabular payload
pub fn append_records(records: &mut Vec<Value>, value: Value) -> usize {
    match value {
        Value::Array(elements) => {
            let count = elements.len();
            records.extend(elements);
            count
        }
        object @ Value::Object(_) => {
            records.push(object);
            1
        }
        _ => 0,
    }
}

/// Merge a sequence of recovered values (in chunk order) into a record set.
///
/// `None` entries are chunks whose reply yielded no JSON; they contribute
/// nothing and raise no error here — the miss was already recorded when the
/// chunk was processed.
pub fn aggregate<I>(values: I) -> Vec<Value>
where
    I: IntoIterator<Item = Option<Value>>,
{
    let mut records = Vec::new();
    for value in values.into_iter().flatten() {
        append_records(&mut records, value);
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn arrays_objects_and_misses_merge_in_order() {
        let records = aggregate(vec![
            Some(json!([{"a": 1}, {"a": 2}])),
            None,
            Some(json!({"b": 3})),
        ]);
        assert_eq!(records, vec![json!({"a": 1}), json!({"a": 2}), json!({"b": 3})]);
    }

    #[test]
    fn scalars_contribute_nothing() {
        let mut records = Vec::new();
        assert_eq!(append_records(&mut records, json!(42)), 0);
        assert_eq!(append_records(&mut records, json!("just text")), 0);
        assert_eq!(append_records(&mut records, json!(null)), 0);
        assert!(records.is_empty());
    }

    #[test]
    fn array_elements_are_counted() {
        let mut records = Vec::new();
        let added = append_records(&mut records, json!([{"x": 1}, {"x": 2}, {"x": 3}]));
        assert_eq!(added, 3);
        assert_eq!(records.len(), 3);
    }

    #[test]
    fn duplicates_are_kept() {
        let records = aggregate(vec![
            Some(json!({"id": 1})),
            Some(json!({"id": 1})),
        ]);
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn all_misses_yield_an_empty_record_set() {
        let records = aggregate(vec![None, None, None]);
        assert!(records.is_empty());
    }
}
