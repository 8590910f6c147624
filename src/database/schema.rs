// file: src/database/schema.rs
// description: Astra DB collection management for vector storage
// reference: https://docs.datastax.com/en/astra-db-serverless/api-reference/database-methods/create-collection.html

use crate::database::client::AstraDbClient;
use crate::error::Result;
use serde_json::{Value, json};
use tracing::{info, warn};

pub struct CollectionManager<'a> {
    client: &'a AstraDbClient,
}

impl<'a> CollectionManager<'a> {
    pub fn new(client: &'a AstraDbClient) -> Self {
        Self { client }
    }

    pub async fn initialize(&self) -> Result<()> {
        info!("Initializing Astra DB collection");

        if self.verify_collection().await? {
            info!("Collection already exists");
            return Ok(());
        }

        info!(
            "Creating collection {} with {}-dimensional cosine vectors",
            self.client.collection_name(),
            self.client.dimension()
        );
        self.client
            .command_ok(&self.client.keyspace_url(), &self.create_command())
            .await?;

        info!("Collection initialized successfully");
        Ok(())
    }

    pub async fn verify_collection(&self) -> Result<bool> {
        let name = self.client.collection_name();
        let exists = self
            .client
            .list_collections()
            .await?
            .iter()
            .any(|c| c == name);

        if exists {
            info!("Collection '{}' exists", name);
        } else {
            warn!("Collection '{}' does not exist", name);
        }
        Ok(exists)
    }

    /// `content` is left unindexed: it carries the whole resume and indexed
    /// strings are length-limited.
    fn create_command(&self) -> Value {
        json!({
            "createCollection": {
                "name": self.client.collection_name(),
                "options": {
                    "vector": {
                        "dimension": self.client.dimension(),
                        "metric": "cosine"
                    },
                    "indexing": {"deny": ["content"]}
                }
            }
        })
    }
}
