//! Reference implementation of the normalization seam.
//!
//! Interprets a small declarative schema format, sufficient to exercise
//! every shape the middleware can produce:
//!
//! ```json
//! { "entity": "charges", "key": "id",
//!   "relations": { "card": { "entity": "cards", "key": "id" } } }
//! ```
//!
//! flattens a single record, and
//!
//! ```json
//! { "list": { "path": "data", "of": { "entity": "charges", "key": "id" } } }
//! ```
//!
//! flattens a paginated list envelope: the envelope fields survive in the
//! result skeleton while the records under `path` are replaced by their
//! ids. Relations may themselves be record or list schemas; entities of
//! every type merge into one entity map.

use apiflow_core::normalize::{Normalized, Normalizer, Schema};
use serde_json::{Map, Value};

/// Declarative-schema [`Normalizer`] for tests and examples.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaNormalizer;

impl Normalizer for SchemaNormalizer {
    fn normalize(&self, body: &Value, schema: &Schema) -> Normalized {
        let mut entities = Map::new();
        let result = flatten(body, schema.as_object(), &mut entities);
        Normalized {
            result,
            entities: Some(entities),
        }
    }
}

/// Flatten `value` per `schema`, accumulating records into `entities`, and
/// return the reference skeleton that replaces the value.
fn flatten(value: &Value, schema: &Map<String, Value>, entities: &mut Map<String, Value>) -> Value {
    if let Some(Value::Object(list)) = schema.get("list") {
        return flatten_list(value, list, entities);
    }
    if let Some(entity) = schema.get("entity").and_then(Value::as_str) {
        return flatten_record(value, entity, schema, entities);
    }
    // A schema declaring neither form leaves the value untouched.
    value.clone()
}

fn flatten_list(
    value: &Value,
    list: &Map<String, Value>,
    entities: &mut Map<String, Value>,
) -> Value {
    let path = list.get("path").and_then(Value::as_str).unwrap_or("data");
    let Some(Value::Object(of)) = list.get("of") else {
        return value.clone();
    };
    let Value::Object(envelope) = value else {
        return value.clone();
    };

    let mut skeleton = envelope.clone();
    if let Some(Value::Array(items)) = envelope.get(path) {
        let ids = items.iter().map(|item| flatten(item, of, entities)).collect();
        skeleton.insert(path.to_string(), Value::Array(ids));
    }
    Value::Object(skeleton)
}

fn flatten_record(
    value: &Value,
    entity: &str,
    schema: &Map<String, Value>,
    entities: &mut Map<String, Value>,
) -> Value {
    let Value::Object(record) = value else {
        return value.clone();
    };
    let key = schema.get("key").and_then(Value::as_str).unwrap_or("id");

    let mut stored = record.clone();
    if let Some(Value::Object(relations)) = schema.get("relations") {
        for (field, relation_schema) in relations {
            if let (Some(field_value), Value::Object(relation_schema)) =
                (record.get(field), relation_schema)
            {
                let reference = flatten(field_value, relation_schema, entities);
                stored.insert(field.clone(), reference);
            }
        }
    }

    let id = record.get(key).cloned().unwrap_or(Value::Null);
    let id_key = match &id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };

    let bucket = entities
        .entry(entity.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if let Value::Object(bucket) = bucket {
        bucket.insert(id_key, Value::Object(stored));
    }

    id
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use apiflow_core::normalize::Schema;
    use serde_json::json;

    fn schema(value: Value) -> Schema {
        match value {
            Value::Object(map) => Schema::from_object(map),
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn flattens_a_list_envelope_into_ids() {
        let body = json!({
            "limit": 20,
            "offset": 0,
            "data": [
                { "id": "charge_1", "amount": 200_000 },
                { "id": "charge_2", "amount": 500_000 },
            ],
        });
        let schema = schema(json!({
            "list": { "path": "data", "of": { "entity": "charges", "key": "id" } },
        }));

        let normalized = SchemaNormalizer.normalize(&body, &schema);

        assert_eq!(
            normalized.result,
            json!({ "limit": 20, "offset": 0, "data": ["charge_1", "charge_2"] })
        );
        assert_eq!(
            normalized.entities,
            Some(
                json!({
                    "charges": {
                        "charge_1": { "id": "charge_1", "amount": 200_000 },
                        "charge_2": { "id": "charge_2", "amount": 500_000 },
                    },
                })
                .as_object()
                .cloned()
                .unwrap()
            )
        );
    }

    #[test]
    fn flattens_nested_relations_of_both_forms() {
        let body = json!({
            "id": "charge_1",
            "amount": 200_000,
            "card": { "id": "card_test_111", "brand": "bankA" },
            "refunds": {
                "offset": 10,
                "limit": 20,
                "total": 2,
                "data": [
                    { "id": "refund_1", "amount": 10 },
                    { "id": "refund_9", "amount": 9999 },
                ],
            },
        });
        let schema = schema(json!({
            "entity": "charges",
            "key": "id",
            "relations": {
                "card": { "entity": "cards", "key": "id" },
                "refunds": {
                    "list": { "path": "data", "of": { "entity": "refunds", "key": "id" } },
                },
            },
        }));

        let normalized = SchemaNormalizer.normalize(&body, &schema);

        assert_eq!(normalized.result, json!("charge_1"));
        assert_eq!(
            normalized.entities,
            Some(
                json!({
                    "cards": {
                        "card_test_111": { "id": "card_test_111", "brand": "bankA" },
                    },
                    "charges": {
                        "charge_1": {
                            "id": "charge_1",
                            "amount": 200_000,
                            "card": "card_test_111",
                            "refunds": {
                                "offset": 10,
                                "limit": 20,
                                "total": 2,
                                "data": ["refund_1", "refund_9"],
                            },
                        },
                    },
                    "refunds": {
                        "refund_1": { "id": "refund_1", "amount": 10 },
                        "refund_9": { "id": "refund_9", "amount": 9999 },
                    },
                })
                .as_object()
                .cloned()
                .unwrap()
            )
        );
    }
}
