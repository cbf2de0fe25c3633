//! Reconciles semantic and catalog results into one ordered list.

use std::collections::HashSet;

use lelook_domain::{ProductRecord, ProductSource, Retrieved};

/// Floor mixed into semantic matches.
pub const SEMANTIC_FLOOR: f32 = 0.5;
/// Floor mixed into catalog matches.
pub const CATALOG_FLOOR: f32 = 0.3;
/// Score assumed for catalog listings that carry none.
pub const DEFAULT_CATALOG_SCORE: f32 = 0.5;

/// Deduplicates by `source_url`, preferring semantic matches, then orders by blended score.
///
/// `weight` is not clamped; values outside 0.0-1.0 are used as given. When one side has no
/// records the other side keeps its own order and no blended score is assigned. Records with
/// an empty `source_url` are never treated as duplicates.
pub fn merge(semantic: Vec<Retrieved>, catalog: Vec<Retrieved>, weight: f32) -> Vec<ProductRecord> {
	let semantic = valid_records(semantic, "semantic");
	let catalog = valid_records(catalog, "catalog");

	if semantic.is_empty() || catalog.is_empty() {
		let (records, source) = if semantic.is_empty() {
			(catalog, ProductSource::Internet)
		} else {
			(semantic, ProductSource::VectorDb)
		};

		return dedup(records.into_iter().map(|record| tag(record, source)));
	}

	let combined = dedup(
		semantic
			.into_iter()
			.map(|record| tag(record, ProductSource::VectorDb))
			.chain(catalog.into_iter().map(|record| tag(record, ProductSource::Internet))),
	);
	let mut keyed: Vec<(f32, ProductRecord)> = combined
		.into_iter()
		.map(|mut record| {
			let key = blend(&mut record, weight);

			record.blended_score = Some(key);

			(key, record)
		})
		.collect();

	keyed.sort_by(|left, right| right.0.total_cmp(&left.0));

	keyed.into_iter().map(|(_, record)| record).collect()
}

/// Blended order key for a tagged record. Fills the default catalog score when missing.
pub fn blend(record: &mut ProductRecord, weight: f32) -> f32 {
	match record.source {
		Some(ProductSource::Internet) => {
			let score = *record.score.get_or_insert(DEFAULT_CATALOG_SCORE);

			score * (1.0 - weight) + weight * CATALOG_FLOOR
		},
		_ => record.score.unwrap_or(0.0) * weight + (1.0 - weight) * SEMANTIC_FLOOR,
	}
}

fn valid_records(items: Vec<Retrieved>, branch: &'static str) -> Vec<ProductRecord> {
	let total = items.len();
	let records: Vec<ProductRecord> =
		items.into_iter().filter_map(Retrieved::into_record).collect();
	let dropped = total - records.len();

	if dropped > 0 {
		tracing::warn!(branch, dropped, "Dropped malformed upstream results.");
	}

	records
}

fn tag(mut record: ProductRecord, source: ProductSource) -> ProductRecord {
	record.source = Some(source);

	record
}

fn dedup(records: impl Iterator<Item = ProductRecord>) -> Vec<ProductRecord> {
	let mut seen = HashSet::new();

	records
		.filter(|record| record.source_url.is_empty() || seen.insert(record.source_url.clone()))
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn record(url: &str, score: Option<f32>) -> ProductRecord {
		ProductRecord { source_url: url.to_string(), score, ..ProductRecord::default() }
	}

	fn retrieved(url: &str, score: Option<f32>) -> Retrieved {
		Retrieved::Record(record(url, score))
	}

	#[test]
	fn shared_url_keeps_the_semantic_copy() {
		let merged = merge(vec![retrieved("a", Some(0.9))], vec![retrieved("a", Some(0.1))], 0.6);

		assert_eq!(merged.len(), 1);
		assert_eq!(merged[0].source, Some(ProductSource::VectorDb));
		assert_eq!(merged[0].score, Some(0.9));

		let key = merged[0].blended_score.expect("Expected a blended score.");

		assert!((key - 0.74).abs() < 1e-6, "Unexpected blended score: {key}");
	}

	#[test]
	fn catalog_listings_default_their_score() {
		let merged = merge(vec![retrieved("a", Some(0.2))], vec![retrieved("b", None)], 0.6);
		let catalog = merged.iter().find(|r| r.source_url == "b").expect("Missing catalog record.");

		assert_eq!(catalog.score, Some(DEFAULT_CATALOG_SCORE));
		assert!((catalog.blended_score.unwrap_or_default() - 0.38).abs() < 1e-6);
	}

	#[test]
	fn orders_by_blended_score() {
		let merged = merge(
			vec![retrieved("low", Some(0.0))],
			vec![retrieved("high", Some(1.0))],
			0.0,
		);

		// low: 0.0 * 0 + 1.0 * 0.5 = 0.5, high: 1.0 * 1.0 + 0 = 1.0
		assert_eq!(merged[0].source_url, "high");
		assert_eq!(merged[1].source_url, "low");
	}

	#[test]
	fn ties_favor_semantic_records() {
		// Both keys are exactly 0.3 with full semantic weight.
		let merged = merge(vec![retrieved("s", Some(0.3))], vec![retrieved("c", Some(0.9))], 1.0);

		assert_eq!(merged[0].source_url, "s");
		assert_eq!(merged[1].source_url, "c");
	}

	#[test]
	fn one_empty_side_passes_the_other_through() {
		let merged = merge(
			Vec::new(),
			vec![retrieved("b", Some(0.1)), retrieved("a", Some(0.9)), retrieved("b", None)],
			0.6,
		);

		let urls: Vec<&str> = merged.iter().map(|r| r.source_url.as_str()).collect();

		assert_eq!(urls, vec!["b", "a"]);
		assert!(merged.iter().all(|r| r.source == Some(ProductSource::Internet)));
		assert!(merged.iter().all(|r| r.blended_score.is_none()));
		assert_eq!(merged[0].score, Some(0.1));
	}

	#[test]
	fn malformed_items_are_dropped() {
		let merged = merge(
			vec![Retrieved::Malformed { reason: "broken".to_string() }],
			vec![Retrieved::Malformed { reason: "quota".to_string() }, retrieved("a", None)],
			0.6,
		);

		assert_eq!(merged.len(), 1);
		assert_eq!(merged[0].source_url, "a");
	}

	#[test]
	fn both_empty_is_empty() {
		assert!(merge(Vec::new(), Vec::new(), 0.6).is_empty());
	}

	#[test]
	fn empty_urls_are_not_duplicates() {
		let merged = merge(vec![retrieved("", Some(0.5))], vec![retrieved("", Some(0.5))], 0.6);

		assert_eq!(merged.len(), 2);
	}

	#[test]
	fn weight_outside_unit_range_is_not_clamped() {
		let mut semantic = record("a", Some(1.0));

		semantic.source = Some(ProductSource::VectorDb);

		// 1.0 * 2.0 + (1.0 - 2.0) * 0.5 = 1.5
		assert!((blend(&mut semantic, 2.0) - 1.5).abs() < 1e-6);
	}

	#[test]
	fn repeated_merges_are_identical() {
		let semantic = vec![retrieved("a", Some(0.3)), retrieved("b", Some(0.3))];
		let catalog =
			vec![retrieved("c", Some(0.9)), retrieved("a", Some(0.9)), retrieved("d", None)];
		let first = merge(semantic.clone(), catalog.clone(), 0.6);
		let second = merge(semantic, catalog, 0.6);

		assert_eq!(first, second);
	}
}
