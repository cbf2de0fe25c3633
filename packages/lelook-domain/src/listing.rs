//! Maps raw shopping-catalog listings onto [`ProductRecord`].

use serde_json::Value;

use crate::record::{self, DEFAULT_CURRENCY, ProductRecord, Retrieved};

/// Normalizes one raw listing.
///
/// Link fields are tried in order `link`, `product_link`. Missing ratings and review counts
/// stay absent. A non-object listing or one that carries an `error` key is reported as
/// [`Retrieved::Malformed`].
pub fn normalize_listing(raw: &Value, requested_category: Option<&str>) -> Retrieved {
	let Some(obj) = raw.as_object() else {
		return Retrieved::Malformed { reason: "Listing is not a JSON object.".to_string() };
	};

	if let Some(error) = obj.get("error") {
		let reason = error.as_str().map(str::to_string).unwrap_or_else(|| error.to_string());

		return Retrieved::Malformed { reason };
	}

	let price = record::text(obj, "price")
		.or_else(|| record::display_text(obj.get("extracted_price")))
		.unwrap_or_default();
	let category = requested_category
		.map(str::trim)
		.filter(|category| !category.is_empty())
		.map(str::to_string);

	Retrieved::Record(ProductRecord {
		title: record::text(obj, "title").unwrap_or_default(),
		price,
		currency: record::text(obj, "currency").unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
		image_url: record::text(obj, "thumbnail").unwrap_or_default(),
		source_url: record::first_text(obj, &["link", "product_link"]).unwrap_or_default(),
		seller: record::text(obj, "source").unwrap_or_default(),
		rating: record::rating(obj.get("rating")),
		reviews_count: record::count(obj.get("reviews")),
		description: record::text(obj, "description").unwrap_or_default(),
		category,
		brand: record::text(obj, "brand"),
		delivery: record::text(obj, "delivery"),
		original_price: record::text(obj, "old_price"),
		tags: record::text(obj, "tag").map(|raw| record::split_tags(&raw)).unwrap_or_default(),
		in_stock: true,
		..ProductRecord::default()
	})
}
