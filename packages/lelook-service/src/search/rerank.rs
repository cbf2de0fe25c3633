use std::time::Duration;

use serde::Deserialize;
use serde_json::{Value, json};

use lelook_domain::ProductRecord;

use crate::LelookService;

#[derive(Clone, Debug, PartialEq)]
pub struct RerankOutcome {
	pub products: Vec<ProductRecord>,
	/// Whether a validated collaborator ordering was applied.
	pub reranked: bool,
}

#[derive(Debug, Deserialize)]
struct RankingResponse {
	ranked_indices: Vec<i64>,
	reasoning: String,
}

impl LelookService {
	/// Reorders `records` by the LLM collaborator's judgment of relevance to `query`.
	///
	/// Never fails: an unconfigured collaborator, a timeout, a transport error, or output that
	/// does not match the ranking schema all keep the incoming order. Every record is kept
	/// before truncation to `max_results`.
	pub async fn rerank_products(
		&self,
		records: Vec<ProductRecord>,
		query: &str,
		max_results: usize,
	) -> RerankOutcome {
		let Some(cfg) = self.cfg.providers.rerank.as_ref() else {
			return fallback(records, max_results);
		};

		if records.is_empty() {
			return fallback(records, max_results);
		}

		let max_chars = self.cfg.rerank.max_description_chars as usize;
		let summaries: Vec<Value> = records
			.iter()
			.enumerate()
			.map(|(index, record)| summarize(index, record, max_chars))
			.collect();
		let call = self.providers.rerank.rank(cfg, query, &summaries);
		let raw = match tokio::time::timeout(Duration::from_millis(cfg.timeout_ms), call).await {
			Ok(Ok(raw)) => raw,
			Ok(Err(err)) => {
				tracing::warn!(reason = %err, "Rerank failed; keeping merged order.");

				return fallback(records, max_results);
			},
			Err(_) => {
				tracing::warn!(
					reason = "timeout",
					timeout_ms = cfg.timeout_ms,
					"Rerank failed; keeping merged order."
				);

				return fallback(records, max_results);
			},
		};
		let response: RankingResponse = match serde_json::from_value(raw) {
			Ok(response) => response,
			Err(err) => {
				tracing::warn!(
					reason = %err,
					"Rerank response violated the ranking schema; keeping merged order."
				);

				return fallback(records, max_results);
			},
		};

		tracing::debug!(reasoning = %response.reasoning, "Rerank justification.");

		let (mut products, discarded) = apply_ranking(records, &response.ranked_indices);

		if discarded > 0 {
			tracing::debug!(discarded, "Discarded invalid rerank indices.");
		}

		products.truncate(max_results);

		RerankOutcome { products, reranked: true }
	}
}

/// Emits records in the order named by `indices`, then every unreferenced record in its
/// original order. Out-of-range and repeated indices are discarded one by one.
///
/// Returns the reordered records and the number of discarded indices.
pub fn apply_ranking(records: Vec<ProductRecord>, indices: &[i64]) -> (Vec<ProductRecord>, usize) {
	let mut slots: Vec<Option<ProductRecord>> = records.into_iter().map(Some).collect();
	let mut ordered = Vec::with_capacity(slots.len());
	let mut discarded = 0;

	for &index in indices {
		let slot = usize::try_from(index).ok().and_then(|index| slots.get_mut(index));

		match slot.and_then(Option::take) {
			Some(record) => ordered.push(record),
			None => discarded += 1,
		}
	}

	ordered.extend(slots.into_iter().flatten());

	(ordered, discarded)
}

fn fallback(mut records: Vec<ProductRecord>, max_results: usize) -> RerankOutcome {
	records.truncate(max_results);

	RerankOutcome { products: records, reranked: false }
}

fn summarize(index: usize, record: &ProductRecord, max_chars: usize) -> Value {
	json!({
		"index": index,
		"title": record.title,
		"price": record.price,
		"currency": record.currency,
		"rating": record.rating,
		"reviews_count": record.reviews_count,
		"description": truncate_chars(record.description.trim(), max_chars),
		"brand": record.brand,
		"seller": record.seller,
		"delivery": record.delivery,
		"original_price": record.original_price,
		"tags": record.tags,
	})
}

fn truncate_chars(text: &str, max: usize) -> &str {
	match text.char_indices().nth(max) {
		Some((cut, _)) => &text[..cut],
		None => text,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn records(urls: &[&str]) -> Vec<ProductRecord> {
		urls.iter()
			.map(|url| ProductRecord { source_url: url.to_string(), ..ProductRecord::default() })
			.collect()
	}

	fn urls(records: &[ProductRecord]) -> Vec<&str> {
		records.iter().map(|record| record.source_url.as_str()).collect()
	}

	#[test]
	fn unreferenced_records_are_appended() {
		let (ordered, discarded) = apply_ranking(records(&["item0", "item1", "item2"]), &[2, 0]);

		assert_eq!(urls(&ordered), vec!["item2", "item0", "item1"]);
		assert_eq!(discarded, 0);
	}

	#[test]
	fn invalid_indices_are_discarded_individually() {
		let (ordered, discarded) =
			apply_ranking(records(&["a", "b", "c"]), &[-1, 1, 7, 1, 0, 3]);

		assert_eq!(urls(&ordered), vec!["b", "a", "c"]);
		assert_eq!(discarded, 4);
	}

	#[test]
	fn empty_ranking_keeps_input_order() {
		let (ordered, _) = apply_ranking(records(&["a", "b"]), &[]);

		assert_eq!(urls(&ordered), vec!["a", "b"]);
	}

	#[test]
	fn summaries_truncate_descriptions_by_chars() {
		let record = ProductRecord {
			description: "  éclair au chocolat  ".to_string(),
			..ProductRecord::default()
		};
		let summary = summarize(3, &record, 6);

		assert_eq!(summary["index"], 3);
		assert_eq!(summary["description"], "éclair");
	}
}
