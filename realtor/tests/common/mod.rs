//! Shared helpers for realtor integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use realtor::{
    AppointmentBook, Conversation, ConversationState, InMemoryPropertyDatabase, JsonSerializer,
    Message, MockLlm, MockReply, RealtorDeps, SqliteSaver,
};

pub fn scripted(replies: Vec<MockReply>) -> Arc<MockLlm> {
    Arc::new(MockLlm::new(replies))
}

/// In-memory conversation over the sample listings.
pub fn conversation(llm: Arc<MockLlm>, book: Arc<AppointmentBook>) -> Conversation {
    let deps = RealtorDeps::new(llm, Arc::new(InMemoryPropertyDatabase::with_samples()))
        .with_appointments(book);
    Conversation::new(deps).unwrap()
}

/// Conversation whose checkpoints live in a SQLite file.
pub fn durable_conversation(
    llm: Arc<MockLlm>,
    book: Arc<AppointmentBook>,
    db: &Path,
) -> Conversation {
    let saver = SqliteSaver::<ConversationState>::new(db, Arc::new(JsonSerializer::new())).unwrap();
    let deps = RealtorDeps::new(llm, Arc::new(InMemoryPropertyDatabase::with_samples()))
        .with_appointments(book)
        .with_checkpointer(Arc::new(saver));
    Conversation::new(deps).unwrap()
}

/// Every tool call in `history` is answered by exactly one later tool result with its id.
pub fn assert_calls_answered(history: &[Message]) {
    let mut results: HashMap<&str, usize> = HashMap::new();
    for m in history {
        if let Some(id) = m.tool_call_id() {
            *results.entry(id).or_default() += 1;
        }
    }
    for (i, m) in history.iter().enumerate() {
        for call in m.tool_calls() {
            assert_eq!(
                results.get(call.id.as_str()).copied(),
                Some(1),
                "call {} ({}) must have exactly one result",
                call.id,
                call.name
            );
            let answered_later = history[i + 1..]
                .iter()
                .any(|r| r.tool_call_id() == Some(call.id.as_str()));
            assert!(answered_later, "call {} answered before it was made", call.id);
        }
    }
}
