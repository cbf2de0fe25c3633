mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	CatalogProviderConfig, Config, EmbeddingProviderConfig, LlmProviderConfig, Providers, Qdrant,
	Rerank, Search, Security, Service, Storage,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;
	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	for (label, value) in
		[("service.http_bind", &cfg.service.http_bind), ("service.mcp_bind", &cfg.service.mcp_bind)]
	{
		if value.trim().is_empty() {
			return Err(Error::Validation { message: format!("{label} must be non-empty.") });
		}
	}

	if cfg.storage.qdrant.collection.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.qdrant.collection must be non-empty.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions != cfg.storage.qdrant.vector_dim {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must match storage.qdrant.vector_dim."
				.to_string(),
		});
	}
	if cfg.search.default_results == 0 {
		return Err(Error::Validation {
			message: "search.default_results must be greater than zero.".to_string(),
		});
	}
	if cfg.search.default_results > cfg.search.max_results {
		return Err(Error::Validation {
			message: "search.default_results must not exceed search.max_results.".to_string(),
		});
	}
	if !cfg.search.hybrid_weight.is_finite() {
		return Err(Error::Validation {
			message: "search.hybrid_weight must be a finite number.".to_string(),
		});
	}
	if !(0.0..=1.0).contains(&cfg.search.hybrid_weight) {
		return Err(Error::Validation {
			message: "search.hybrid_weight must be in the range 0.0-1.0.".to_string(),
		});
	}
	if cfg.rerank.max_description_chars == 0 {
		return Err(Error::Validation {
			message: "rerank.max_description_chars must be greater than zero.".to_string(),
		});
	}
	if let Some(rerank) = cfg.providers.rerank.as_ref()
		&& !rerank.temperature.is_finite()
	{
		return Err(Error::Validation {
			message: "providers.rerank.temperature must be a finite number.".to_string(),
		});
	}

	let mut keys = vec![("embedding", &cfg.providers.embedding.api_key)];

	if let Some(catalog) = cfg.providers.catalog.as_ref() {
		keys.push(("catalog", &catalog.api_key));
	}
	if let Some(rerank) = cfg.providers.rerank.as_ref() {
		keys.push(("rerank", &rerank.api_key));
	}

	for (label, key) in keys {
		if key.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("Provider {label} api_key must be non-empty."),
			});
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.security.auth_token.as_deref().map(|token| token.trim().is_empty()).unwrap_or(false) {
		cfg.security.auth_token = None;
	}
}
