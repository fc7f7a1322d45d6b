//! Builds a [`Conversation`] from [`RealtorSettings`]: model client, listing store and
//! checkpoint store.

use std::sync::Arc;

use thiserror::Error;

use realtor::{
    sample_listings, BuildError, ChatOpenAI, CheckpointError, Conversation, ConversationState,
    DatabaseError, InMemoryPropertyDatabase, JsonSerializer, PropertyDatabase, RealtorDeps,
    RealtorSettings, SqlitePropertyDatabase, SqliteSaver,
};

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("OPENAI_API_KEY is not set (export it or add it to .env / ~/.config/realtor/config.toml)")]
    MissingApiKey,
    #[error("listings database: {0}")]
    Listings(#[from] DatabaseError),
    #[error("checkpoint database: {0}")]
    Checkpoints(#[from] CheckpointError),
    #[error("build graph: {0}")]
    Build(#[from] BuildError),
}

/// Opens the listing store. A new SQLite file is seeded with the sample listings.
async fn open_listings(settings: &RealtorSettings) -> Result<Arc<dyn PropertyDatabase>, SetupError> {
    let Some(path) = &settings.listings_db else {
        return Ok(Arc::new(InMemoryPropertyDatabase::with_samples()));
    };
    let db = SqlitePropertyDatabase::open(path)?;
    if db.count().await? == 0 {
        let n = db.seed(sample_listings()).await?;
        tracing::info!(path = %path.display(), listings = n, "seeded listings database");
    }
    Ok(Arc::new(db))
}

pub async fn build_conversation(settings: &RealtorSettings) -> Result<Conversation, SetupError> {
    let api_key = settings.api_key.as_deref().ok_or(SetupError::MissingApiKey)?;
    let llm = ChatOpenAI::from_parts(settings.model.as_str(), Some(api_key), settings.base_url.as_deref())
        .with_temperature(0.0);

    let mut deps = RealtorDeps::new(Arc::new(llm), open_listings(settings).await?)
        .with_recursion_limit(settings.recursion_limit);
    if let Some(path) = &settings.checkpoint_db {
        let saver = SqliteSaver::<ConversationState>::new(path, Arc::new(JsonSerializer::new()))?;
        deps = deps.with_checkpointer(Arc::new(saver));
    } else {
        tracing::debug!("no REALTOR_CHECKPOINT_DB; conversations last for this process only");
    }
    Ok(Conversation::new(deps)?)
}
