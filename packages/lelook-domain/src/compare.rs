use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{price, record::ProductRecord};

pub const MAX_COMPARED: usize = 5;
pub const UNKNOWN_PRODUCT: &str = "Unknown Product";
pub const MISSING_PRICE: &str = "N/A";

const PRICE_CEILING: f64 = 1_000.0;
const RATING_WEIGHT: f64 = 200.0;
const REVIEW_WEIGHT: f64 = 0.1;
const REVIEW_CAP: f64 = 100.0;
const IN_STOCK_BONUS: f64 = 500.0;
const COMPLETENESS_BONUS: f64 = 300.0;
const BRAND_BONUS: f64 = 50.0;
const DESCRIPTION_BONUS: f64 = 25.0;
const DESCRIPTION_MIN_CHARS: usize = 20;

/// Display-ready view of a ranked product.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComparedProduct {
	pub name: String,
	pub price: String,
	pub image: String,
	pub link: String,
	pub rank: usize,
	pub seller: String,
	pub rating: Option<f64>,
	pub reviews_count: Option<u64>,
}

/// Multi-factor desirability score. Higher is better.
pub fn desirability(record: &ProductRecord) -> f64 {
	let mut score = 0.0;

	if let Some(price) = price::parse_price(&record.price) {
		score += (PRICE_CEILING - price).max(0.0);
	}
	if let Some(rating) = record.rating
		&& rating > 0.0
	{
		score += rating * RATING_WEIGHT;
	}
	if let Some(reviews) = record.reviews_count
		&& reviews > 0
	{
		score += (reviews as f64 * REVIEW_WEIGHT).min(REVIEW_CAP);
	}
	if record.in_stock {
		score += IN_STOCK_BONUS;
	}
	if !record.image_url.is_empty() {
		score += COMPLETENESS_BONUS;
	}
	if !record.source_url.is_empty() {
		score += COMPLETENESS_BONUS;
	}
	if record.brand.as_deref().is_some_and(|brand| !brand.trim().is_empty()) {
		score += BRAND_BONUS;
	}
	if record.description.trim().chars().count() > DESCRIPTION_MIN_CHARS {
		score += DESCRIPTION_BONUS;
	}

	score
}

/// Ranks records by [`desirability`] and maps the best five for display.
///
/// Equal scores keep their input order.
pub fn rank_products(records: &[ProductRecord]) -> Vec<ComparedProduct> {
	let mut scored: Vec<(f64, &ProductRecord)> =
		records.iter().map(|record| (desirability(record), record)).collect();

	scored.sort_by(|left, right| right.0.total_cmp(&left.0));

	scored
		.into_iter()
		.take(MAX_COMPARED)
		.enumerate()
		.map(|(idx, (_, record))| to_compared(record, idx + 1))
		.collect()
}

/// Ranks an arbitrary JSON value. Anything but an array yields no products, and array
/// entries that are not objects are skipped.
pub fn rank_json(value: &Value) -> Vec<ComparedProduct> {
	let Some(items) = value.as_array() else {
		return Vec::new();
	};
	let records: Vec<ProductRecord> = items.iter().filter_map(ProductRecord::from_json).collect();

	rank_products(&records)
}

fn to_compared(record: &ProductRecord, rank: usize) -> ComparedProduct {
	let name = if record.title.is_empty() { UNKNOWN_PRODUCT } else { record.title.as_str() };
	let price = if record.price.is_empty() { MISSING_PRICE } else { record.price.as_str() };

	ComparedProduct {
		name: name.to_string(),
		price: price.to_string(),
		image: record.image_url.clone(),
		link: record.source_url.clone(),
		rank,
		seller: record.seller.clone(),
		rating: record.rating,
		reviews_count: record.reviews_count,
	}
}
