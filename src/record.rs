use serde::Deserialize;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use thiserror::Error;

/// One raw person entry as it appears in a source file. Sources are allowed
/// to be partial: the same id may show up in several files, each contributing
/// a different slice of the data.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PersonRecord {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub partner: Option<String>,
    #[serde(default)]
    pub children: Option<Vec<String>>,
}

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("invalid record data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("record {index} has an empty id")]
    EmptyId { index: usize },
}

/// Parses one source: a JSON array of person records. A failure here is
/// fatal for this source only; the caller decides how to report it.
pub fn parse_records(input: &str) -> Result<Vec<PersonRecord>, RecordError> {
    let records: Vec<PersonRecord> = serde_json::from_str(input)?;
    for (index, record) in records.iter().enumerate() {
        if record.id.is_empty() {
            return Err(RecordError::EmptyId { index });
        }
    }
    Ok(records)
}

/// Merges per-source record collections into one flat, unique-by-id list.
///
/// The first occurrence of an id is canonical; later occurrences only fill
/// gaps. A populated partner is never overwritten, children lists are
/// unioned in first-seen order, and a missing children list is adopted
/// wholesale. Differing names are not reconciled: the first one wins.
pub fn merge_sources(sources: Vec<Vec<PersonRecord>>) -> Vec<PersonRecord> {
    let mut order: Vec<String> = Vec::new();
    let mut by_id: HashMap<String, PersonRecord> = HashMap::new();

    for record in sources.into_iter().flatten() {
        match by_id.entry(record.id.clone()) {
            Entry::Vacant(slot) => {
                order.push(record.id.clone());
                slot.insert(record);
            }
            Entry::Occupied(mut slot) => {
                let canonical = slot.get_mut();
                if canonical.name.is_none() {
                    canonical.name = record.name;
                }
                if canonical.partner.is_none() {
                    canonical.partner = record.partner;
                }
                match (&mut canonical.children, record.children) {
                    (None, Some(children)) => canonical.children = Some(children),
                    (Some(existing), Some(children)) => {
                        for child in children {
                            if !existing.contains(&child) {
                                existing.push(child);
                            }
                        }
                    }
                    _ => {}
                }
            }
        }
    }

    order
        .into_iter()
        .filter_map(|id| by_id.remove(&id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str) -> PersonRecord {
        PersonRecord {
            id: id.to_string(),
            name: Some(id.to_uppercase()),
            partner: None,
            children: None,
        }
    }

    #[test]
    fn parse_accepts_optional_fields() {
        let input = r#"[
            {"id": "a", "name": "Ada", "partner": "b", "children": ["c"]},
            {"id": "b", "name": "Ben"}
        ]"#;
        let records = parse_records(input).expect("parse failed");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].partner.as_deref(), Some("b"));
        assert_eq!(records[1].partner, None);
        assert_eq!(records[1].children, None);
    }

    #[test]
    fn parse_rejects_malformed_input() {
        assert!(parse_records("not json").is_err());
        assert!(parse_records(r#"[{"name": "missing id"}]"#).is_err());
    }

    #[test]
    fn parse_rejects_empty_id() {
        let err = parse_records(r#"[{"id": ""}]"#).unwrap_err();
        assert!(matches!(err, RecordError::EmptyId { index: 0 }));
    }

    #[test]
    fn merge_fills_complementary_fields() {
        let mut with_partner = record("a");
        with_partner.partner = Some("b".to_string());
        let mut with_children = record("a");
        with_children.children = Some(vec!["c".to_string(), "d".to_string()]);

        let merged = merge_sources(vec![vec![with_partner], vec![with_children]]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].partner.as_deref(), Some("b"));
        assert_eq!(
            merged[0].children,
            Some(vec!["c".to_string(), "d".to_string()])
        );
    }

    #[test]
    fn merge_never_overwrites_existing_partner() {
        let mut first = record("a");
        first.partner = Some("b".to_string());
        let mut second = record("a");
        second.partner = Some("z".to_string());

        let merged = merge_sources(vec![vec![first], vec![second]]);
        assert_eq!(merged[0].partner.as_deref(), Some("b"));
    }

    #[test]
    fn merge_unions_children_in_first_seen_order() {
        let mut first = record("a");
        first.children = Some(vec!["c".to_string(), "d".to_string()]);
        let mut second = record("a");
        second.children = Some(vec!["d".to_string(), "e".to_string()]);

        let merged = merge_sources(vec![vec![first], vec![second]]);
        assert_eq!(
            merged[0].children,
            Some(vec!["c".to_string(), "d".to_string(), "e".to_string()])
        );
    }

    #[test]
    fn merge_keeps_first_name() {
        let mut first = record("a");
        first.name = Some("Ada".to_string());
        let mut second = record("a");
        second.name = Some("Adelaide".to_string());

        let merged = merge_sources(vec![vec![first], vec![second]]);
        assert_eq!(merged[0].name.as_deref(), Some("Ada"));
    }

    #[test]
    fn merge_preserves_encounter_order_across_sources() {
        let merged = merge_sources(vec![
            vec![record("a"), record("b")],
            vec![record("b"), record("c")],
        ]);
        let ids: Vec<&str> = merged.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }
}
