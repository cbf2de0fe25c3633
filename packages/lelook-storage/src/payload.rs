//! Conversions between Qdrant payload values and JSON.

use std::collections::HashMap;

use qdrant_client::{
	Payload,
	qdrant::{PointId, Value, point_id::PointIdOptions, value::Kind},
};
use serde_json::{Map, Number, Value as JsonValue};

pub fn json_to_payload(fields: Map<String, JsonValue>) -> Payload {
	let mut payload = Payload::new();

	for (key, value) in fields {
		payload.insert(key, Value::from(value));
	}

	payload
}

pub fn payload_to_json(payload: HashMap<String, Value>) -> JsonValue {
	JsonValue::Object(payload.into_iter().map(|(key, value)| (key, value_to_json(value))).collect())
}

pub fn value_to_json(value: Value) -> JsonValue {
	match value.kind {
		None | Some(Kind::NullValue(_)) => JsonValue::Null,
		Some(Kind::BoolValue(flag)) => JsonValue::Bool(flag),
		Some(Kind::IntegerValue(number)) => JsonValue::from(number),
		Some(Kind::DoubleValue(number)) =>
			Number::from_f64(number).map(JsonValue::Number).unwrap_or(JsonValue::Null),
		Some(Kind::StringValue(text)) => JsonValue::String(text),
		Some(Kind::StructValue(inner)) => payload_to_json(inner.fields),
		Some(Kind::ListValue(list)) =>
			JsonValue::Array(list.values.into_iter().map(value_to_json).collect()),
	}
}

pub fn point_id_to_string(point_id: Option<&PointId>) -> Option<String> {
	match point_id?.point_id_options.as_ref()? {
		PointIdOptions::Uuid(id) => Some(id.clone()),
		PointIdOptions::Num(id) => Some(id.to_string()),
	}
}

#[cfg(test)]
mod tests {
	use qdrant_client::qdrant::ListValue;
	use serde_json::json;

	use super::*;

	#[test]
	fn converts_nested_values() {
		let tags = Value {
			kind: Some(Kind::ListValue(ListValue {
				values: vec![Value { kind: Some(Kind::StringValue("desk".to_string())) }],
			})),
		};
		let payload = HashMap::from([
			("title".to_string(), Value { kind: Some(Kind::StringValue("Lamp".to_string())) }),
			("rating".to_string(), Value { kind: Some(Kind::DoubleValue(4.5)) }),
			("reviews_count".to_string(), Value { kind: Some(Kind::IntegerValue(12)) }),
			("in_stock".to_string(), Value { kind: Some(Kind::BoolValue(true)) }),
			("brand".to_string(), Value { kind: None }),
			("tags".to_string(), tags),
		]);

		assert_eq!(
			payload_to_json(payload),
			json!({
				"title": "Lamp",
				"rating": 4.5,
				"reviews_count": 12,
				"in_stock": true,
				"brand": null,
				"tags": ["desk"]
			})
		);
	}

	#[test]
	fn stringifies_point_ids() {
		let id = PointId::from("8f14e45f-ceea-467a-9575-6e3d2f5b6c01".to_string());

		assert_eq!(
			point_id_to_string(Some(&id)).as_deref(),
			Some("8f14e45f-ceea-467a-9575-6e3d2f5b6c01")
		);
		assert_eq!(point_id_to_string(None), None);
	}
}
