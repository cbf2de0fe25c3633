mod error;

pub use error::{Error, Result};

use std::{env, thread, time::Duration};

use qdrant_client::Qdrant;
use tokio::{runtime::Builder, time};
use uuid::Uuid;

/// A uniquely named Qdrant collection that is deleted when the test finishes.
pub struct TestCollection {
	url: String,
	name: String,
	cleaned: bool,
}
impl TestCollection {
	pub fn new(url: &str, prefix: &str) -> Self {
		let name = format!("{prefix}_{}", Uuid::new_v4().simple());

		Self { url: url.to_string(), name, cleaned: false }
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn url(&self) -> &str {
		&self.url
	}

	pub async fn cleanup(mut self) -> Result<()> {
		self.cleanup_inner().await
	}

	async fn cleanup_inner(&mut self) -> Result<()> {
		if self.cleaned {
			return Ok(());
		}

		delete_collection(&self.url, &self.name).await?;

		self.cleaned = true;

		Ok(())
	}
}
impl Drop for TestCollection {
	fn drop(&mut self) {
		if self.cleaned {
			return;
		}

		let url = self.url.clone();
		let name = self.name.clone();
		let cleanup_thread = thread::spawn(move || {
			let runtime = match Builder::new_current_thread().enable_all().build() {
				Ok(runtime) => runtime,
				Err(err) => {
					eprintln!("Test collection cleanup failed: {err}.");

					return;
				},
			};

			if let Err(err) = runtime.block_on(delete_collection(&url, &name)) {
				eprintln!("Test Qdrant cleanup failed: {err}.");
			}
		});
		let _ = cleanup_thread.join();
	}
}

pub fn env_qdrant_url() -> Option<String> {
	env::var("LELOOK_QDRANT_URL").ok()
}

async fn delete_collection(url: &str, name: &str) -> Result<()> {
	let client = Qdrant::from_url(url)
		.build()
		.map_err(|err| Error::Message(format!("Failed to build Qdrant client: {err}.")))?;
	let exists = time::timeout(Duration::from_secs(10), client.collection_exists(name.to_string()))
		.await
		.map_err(|_| Error::Message("Qdrant collection_exists timed out.".to_string()))??;

	if !exists {
		return Ok(());
	}

	time::timeout(Duration::from_secs(10), client.delete_collection(name.to_string()))
		.await
		.map_err(|_| Error::Message("Qdrant delete_collection timed out.".to_string()))??;

	Ok(())
}
