use qdrant_client::qdrant::{
	Condition, CreateCollectionBuilder, CreateFieldIndexCollectionBuilder, Distance, FieldType,
	Filter, PointStruct, Query, QueryPointsBuilder, ScrollPointsBuilder, UpsertPointsBuilder,
	VectorParamsBuilder,
};
use serde_json::{Map, Value as JsonValue};
use uuid::Uuid;

use crate::{Error, Result, payload};

pub const CATEGORY_FIELD: &str = "category";

/// A nearest-neighbor match with its payload decoded to JSON.
#[derive(Clone, Debug, PartialEq)]
pub struct IndexHit {
	pub payload: JsonValue,
	pub score: f32,
}

/// A stored point returned by a scan.
#[derive(Clone, Debug, PartialEq)]
pub struct IndexPoint {
	pub id: String,
	pub payload: JsonValue,
}

pub struct QdrantStore {
	pub client: qdrant_client::Qdrant,
	pub collection: String,
	pub vector_dim: u32,
}
impl QdrantStore {
	pub fn new(cfg: &lelook_config::Qdrant) -> Result<Self> {
		let client = qdrant_client::Qdrant::from_url(&cfg.url).build()?;

		Ok(Self { client, collection: cfg.collection.clone(), vector_dim: cfg.vector_dim })
	}

	/// Creates the cosine collection and its category keyword index when missing.
	pub async fn ensure_collection(&self) -> Result<()> {
		if self.client.collection_exists(self.collection.clone()).await? {
			return Ok(());
		}

		self.client
			.create_collection(
				CreateCollectionBuilder::new(self.collection.clone()).vectors_config(
					VectorParamsBuilder::new(self.vector_dim.into(), Distance::Cosine),
				),
			)
			.await?;
		self.client
			.create_field_index(
				CreateFieldIndexCollectionBuilder::new(
					self.collection.clone(),
					CATEGORY_FIELD,
					FieldType::Keyword,
				)
				.wait(true),
			)
			.await?;

		tracing::info!(collection = %self.collection, "Created Qdrant collection.");

		Ok(())
	}

	pub async fn upsert(
		&self,
		id: Uuid,
		vector: Vec<f32>,
		fields: Map<String, JsonValue>,
	) -> Result<()> {
		self.check_dim(&vector)?;

		let point = PointStruct::new(id.to_string(), vector, payload::json_to_payload(fields));

		let request = UpsertPointsBuilder::new(self.collection.clone(), vec![point]).wait(true);

		self.client.upsert_points(request).await?;

		Ok(())
	}

	pub async fn search(
		&self,
		vector: Vec<f32>,
		limit: u64,
		category: Option<&str>,
	) -> Result<Vec<IndexHit>> {
		self.check_dim(&vector)?;

		let mut request = QueryPointsBuilder::new(self.collection.clone())
			.query(Query::new_nearest(vector))
			.with_payload(true)
			.limit(limit);

		if let Some(category) = category {
			request = request
				.filter(Filter::must([Condition::matches(CATEGORY_FIELD, category.to_string())]));
		}

		let response = self.client.query(request).await?;

		Ok(response
			.result
			.into_iter()
			.map(|point| IndexHit {
				payload: payload::payload_to_json(point.payload),
				score: point.score,
			})
			.collect())
	}

	pub async fn scroll(&self, limit: u32) -> Result<Vec<IndexPoint>> {
		let request =
			ScrollPointsBuilder::new(self.collection.clone()).limit(limit).with_payload(true);
		let response = self.client.scroll(request).await?;
		let mut points = Vec::with_capacity(response.result.len());

		for point in response.result {
			let Some(id) = payload::point_id_to_string(point.id.as_ref()) else {
				return Err(Error::InvalidPayload(
					"Qdrant returned a point without an id.".to_string(),
				));
			};

			points.push(IndexPoint { id, payload: payload::payload_to_json(point.payload) });
		}

		Ok(points)
	}

	fn check_dim(&self, vector: &[f32]) -> Result<()> {
		if vector.len() != self.vector_dim as usize {
			return Err(Error::InvalidArgument(format!(
				"Vector dimension {} does not match collection dimension {}.",
				vector.len(),
				self.vector_dim
			)));
		}

		Ok(())
	}
}
