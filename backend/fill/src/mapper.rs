//! Field mapper: recognition result × mapping table → fill work items.

use scanfill_core::{FieldMapping, RecognitionResult};

/// One value ready to be written: the semantic key, the target input id,
/// and the trimmed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedField {
    pub key: String,
    pub target: String,
    pub value: String,
}

/// Pair mapping entries with their recognized values, skipping entries
/// whose value is absent, empty, or whitespace-only.
///
/// Lazy and restartable: calling this again over the same result yields
/// the same sequence, in mapping declaration order.
pub fn mapped_fields<'a>(
    result: &'a RecognitionResult,
    mapping: &'a FieldMapping,
) -> impl Iterator<Item = MappedField> + 'a {
    mapping.entries().iter().filter_map(|entry| {
        result
            .field(&entry.key)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| MappedField {
                key: entry.key.clone(),
                target: entry.target.clone(),
                value: value.to_string(),
            })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use scanfill_core::FieldTarget;

    fn result_with(pairs: &[(&str, &str)]) -> RecognitionResult {
        let mut result = RecognitionResult::default();
        for (key, value) in pairs {
            result
                .fields
                .insert(key.to_string(), serde_json::Value::String(value.to_string()));
        }
        result
    }

    fn mapping() -> FieldMapping {
        FieldMapping::new(vec![
            FieldTarget::new("first_name", "first_name"),
            FieldTarget::new("last_name", "last_name"),
            FieldTarget::new("email", "email_address"),
        ])
    }

    #[test]
    fn skips_absent_empty_and_blank_values() {
        let result = result_with(&[("first_name", "Ada"), ("last_name", ""), ("email", "  \t")]);
        let fields: Vec<_> = mapped_fields(&result, &mapping()).collect();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].key, "first_name");
        assert_eq!(fields[0].value, "Ada");
    }

    #[test]
    fn trims_surviving_values() {
        let result = result_with(&[("email", " ada@example.com ")]);
        let fields: Vec<_> = mapped_fields(&result, &mapping()).collect();
        assert_eq!(fields[0].target, "email_address");
        assert_eq!(fields[0].value, "ada@example.com");
    }

    #[test]
    fn preserves_mapping_declaration_order() {
        let result = result_with(&[
            ("email", "ada@example.com"),
            ("first_name", "Ada"),
            ("last_name", "Lovelace"),
        ]);
        let keys: Vec<_> = mapped_fields(&result, &mapping())
            .map(|f| f.key)
            .collect();
        assert_eq!(keys, vec!["first_name", "last_name", "email"]);
    }

    #[test]
    fn sequence_is_restartable() {
        let result = result_with(&[("first_name", "Ada")]);
        let mapping = mapping();
        let first: Vec<_> = mapped_fields(&result, &mapping).collect();
        let second: Vec<_> = mapped_fields(&result, &mapping).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn non_string_values_are_skipped() {
        let mut result = RecognitionResult::default();
        result
            .fields
            .insert("first_name".to_string(), serde_json::json!(42));
        assert_eq!(mapped_fields(&result, &mapping()).count(), 0);
    }
}
