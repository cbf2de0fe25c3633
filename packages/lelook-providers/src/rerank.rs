use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::{Error, Result};

const SYSTEM_PROMPT: &str = "You rank shopping products by how well they match a user's query. \
You receive the query and a JSON array of product summaries, each with an integer index. \
Return every index exactly once, most relevant first, in ranked_indices, and a one or two \
sentence justification in reasoning. Consider the query intent, price, rating, review count, \
brand, delivery and discounts.";

/// Asks a chat-completions model for a relevance permutation of `summaries`.
///
/// The returned value is the model's structured output and is not validated here.
pub async fn rank(
	cfg: &lelook_config::LlmProviderConfig,
	query: &str,
	summaries: &[Value],
) -> Result<Value> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = build_request_body(cfg, query, summaries)?;
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_ranking_content(json)
}

pub fn build_request_body(
	cfg: &lelook_config::LlmProviderConfig,
	query: &str,
	summaries: &[Value],
) -> Result<Value> {
	let products = serde_json::to_string(summaries)?;

	Ok(serde_json::json!({
		"model": cfg.model,
		"temperature": cfg.temperature,
		"messages": [
			{ "role": "system", "content": SYSTEM_PROMPT },
			{ "role": "user", "content": format!("Query: {query}\n\nProducts:\n{products}") },
		],
		"response_format": {
			"type": "json_schema",
			"json_schema": {
				"name": "product_ranking",
				"strict": true,
				"schema": {
					"type": "object",
					"properties": {
						"ranked_indices": { "type": "array", "items": { "type": "integer" } },
						"reasoning": { "type": "string" },
					},
					"required": ["ranked_indices", "reasoning"],
					"additionalProperties": false,
				},
			},
		},
	}))
}

fn parse_ranking_content(json: Value) -> Result<Value> {
	let content = json
		.get("choices")
		.and_then(Value::as_array)
		.and_then(|choices| choices.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|message| message.get("content"))
		.and_then(Value::as_str)
		.ok_or_else(|| Error::InvalidResponse {
			message: "Rerank response is missing message content.".to_string(),
		})?;

	serde_json::from_str(strip_code_fence(content)).map_err(|_| Error::InvalidResponse {
		message: "Rerank content is not valid JSON.".to_string(),
	})
}

fn strip_code_fence(content: &str) -> &str {
	let trimmed = content.trim();
	let Some(inner) = trimmed.strip_prefix("```") else {
		return trimmed;
	};
	let inner = inner.strip_prefix("json").unwrap_or(inner);

	inner.strip_suffix("```").unwrap_or(inner).trim()
}
