use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_CURRENCY: &str = "USD";
pub const IMAGE_FIELDS: [&str; 5] = ["image_url", "thumbnail", "image", "img_url", "photo"];
pub const EMBEDDING_TEXT_FIELD: &str = "text_for_embedding";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSource {
	VectorDb,
	Internet,
}

/// Canonical product shape shared by every pipeline stage.
///
/// `source_url` is the identity key. `score`, `blended_score` and `source` are pipeline
/// annotations and never reach the vector index payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductRecord {
	pub title: String,
	pub price: String,
	pub currency: String,
	pub image_url: String,
	pub source_url: String,
	pub seller: String,
	pub rating: Option<f64>,
	pub reviews_count: Option<u64>,
	pub description: String,
	pub category: Option<String>,
	pub brand: Option<String>,
	pub delivery: Option<String>,
	pub original_price: Option<String>,
	pub tags: Vec<String>,
	pub in_stock: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub score: Option<f32>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub blended_score: Option<f32>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub source: Option<ProductSource>,
}
impl ProductRecord {
	/// Reads a loosely shaped JSON object. Non-objects yield `None`.
	///
	/// Numeric fields accept numbers or numeric strings. Out-of-range ratings and negative
	/// review counts are treated as absent.
	pub fn from_json(value: &Value) -> Option<Self> {
		let obj = value.as_object()?;

		Some(Self {
			title: first_text(obj, &["title", "name"]).unwrap_or_default(),
			price: display_text(obj.get("price")).unwrap_or_default(),
			currency: text(obj, "currency").unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
			image_url: first_text(obj, &IMAGE_FIELDS).unwrap_or_default(),
			source_url: first_text(obj, &["source_url", "link"]).unwrap_or_default(),
			seller: text(obj, "seller").unwrap_or_default(),
			rating: rating(obj.get("rating")),
			reviews_count: count(obj.get("reviews_count")),
			description: text(obj, "description").unwrap_or_default(),
			category: text(obj, "category"),
			brand: text(obj, "brand"),
			delivery: text(obj, "delivery"),
			original_price: display_text(obj.get("original_price")),
			tags: tags(obj.get("tags")),
			in_stock: obj.get("in_stock").and_then(Value::as_bool).unwrap_or(true),
			score: number(obj.get("score")).map(|score| score as f32),
			blended_score: number(obj.get("blended_score")).map(|score| score as f32),
			source: obj.get("source").and_then(|raw| ProductSource::deserialize(raw).ok()),
		})
	}

	/// Text indexed for semantic search: title, description, brand, category and tags.
	pub fn embedding_text(&self) -> String {
		let mut parts: Vec<&str> = vec![self.title.as_str(), self.description.as_str()];

		parts.extend(self.brand.as_deref());
		parts.extend(self.category.as_deref());
		parts.extend(self.tags.iter().map(String::as_str));

		let parts: Vec<&str> =
			parts.into_iter().map(str::trim).filter(|part| !part.is_empty()).collect();

		parts.join(" ")
	}

	/// Payload stored next to the vector. Annotations are left out.
	pub fn index_payload(&self) -> Map<String, Value> {
		let mut payload = Map::new();

		payload.insert("title".to_string(), Value::from(self.title.clone()));
		payload.insert("price".to_string(), Value::from(self.price.clone()));
		payload.insert("currency".to_string(), Value::from(self.currency.clone()));
		payload.insert("image_url".to_string(), Value::from(self.image_url.clone()));
		payload.insert("source_url".to_string(), Value::from(self.source_url.clone()));
		payload.insert("seller".to_string(), Value::from(self.seller.clone()));
		payload.insert("rating".to_string(), self.rating.map(Value::from).unwrap_or(Value::Null));
		payload.insert(
			"reviews_count".to_string(),
			self.reviews_count.map(Value::from).unwrap_or(Value::Null),
		);
		payload.insert("description".to_string(), Value::from(self.description.clone()));
		payload.insert("category".to_string(), optional(self.category.as_deref()));
		payload.insert("brand".to_string(), optional(self.brand.as_deref()));
		payload.insert("delivery".to_string(), optional(self.delivery.as_deref()));
		payload.insert("original_price".to_string(), optional(self.original_price.as_deref()));
		payload.insert("tags".to_string(), Value::from(self.tags.clone()));
		payload.insert("in_stock".to_string(), Value::Bool(self.in_stock));
		payload.insert(EMBEDDING_TEXT_FIELD.to_string(), Value::from(self.embedding_text()));

		payload
	}
}
impl Default for ProductRecord {
	fn default() -> Self {
		Self {
			title: String::new(),
			price: String::new(),
			currency: DEFAULT_CURRENCY.to_string(),
			image_url: String::new(),
			source_url: String::new(),
			seller: String::new(),
			rating: None,
			reviews_count: None,
			description: String::new(),
			category: None,
			brand: None,
			delivery: None,
			original_price: None,
			tags: Vec::new(),
			in_stock: true,
			score: None,
			blended_score: None,
			source: None,
		}
	}
}

/// A retrieval result before merge. `Malformed` marks an item the upstream reported as broken.
#[derive(Clone, Debug, PartialEq)]
pub enum Retrieved {
	Record(ProductRecord),
	Malformed { reason: String },
}
impl Retrieved {
	pub fn record(&self) -> Option<&ProductRecord> {
		match self {
			Self::Record(record) => Some(record),
			Self::Malformed { .. } => None,
		}
	}

	pub fn into_record(self) -> Option<ProductRecord> {
		match self {
			Self::Record(record) => Some(record),
			Self::Malformed { .. } => None,
		}
	}
}
impl From<ProductRecord> for Retrieved {
	fn from(record: ProductRecord) -> Self {
		Self::Record(record)
	}
}

pub(crate) fn text(obj: &Map<String, Value>, key: &str) -> Option<String> {
	display_text(obj.get(key))
}

pub(crate) fn first_text(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
	keys.iter().find_map(|key| text(obj, key))
}

/// Strings pass through and numbers are stringified. Empty strings count as absent.
pub(crate) fn display_text(value: Option<&Value>) -> Option<String> {
	match value? {
		Value::String(raw) if !raw.is_empty() => Some(raw.clone()),
		Value::Number(number) => Some(number.to_string()),
		_ => None,
	}
}

pub(crate) fn number(value: Option<&Value>) -> Option<f64> {
	let parsed = match value? {
		Value::Number(number) => number.as_f64(),
		Value::String(raw) => raw.trim().parse::<f64>().ok(),
		_ => None,
	};

	parsed.filter(|value| value.is_finite())
}

pub(crate) fn rating(value: Option<&Value>) -> Option<f64> {
	number(value).filter(|rating| (0.0..=5.0).contains(rating))
}

pub(crate) fn count(value: Option<&Value>) -> Option<u64> {
	match value? {
		Value::Number(number) => number.as_u64().or_else(|| whole(number.as_f64()?)),
		Value::String(raw) => raw.trim().replace(',', "").parse::<u64>().ok(),
		_ => None,
	}
}

fn whole(value: f64) -> Option<u64> {
	(value >= 0.0 && value.fract() == 0.0).then_some(value as u64)
}

pub(crate) fn tags(value: Option<&Value>) -> Vec<String> {
	match value {
		Some(Value::Array(items)) => items
			.iter()
			.filter_map(Value::as_str)
			.map(str::trim)
			.filter(|tag| !tag.is_empty())
			.map(str::to_string)
			.collect(),
		Some(Value::String(raw)) => split_tags(raw),
		_ => Vec::new(),
	}
}

pub(crate) fn split_tags(raw: &str) -> Vec<String> {
	raw.split(',').map(str::trim).filter(|tag| !tag.is_empty()).map(str::to_string).collect()
}

fn optional(value: Option<&str>) -> Value {
	value.map(Value::from).unwrap_or(Value::Null)
}
