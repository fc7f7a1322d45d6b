//! Conversation state threaded through the realtor graph.
//!
//! [`ConversationState`] is the canonical record; nodes return a [`ConversationUpdate`] delta
//! and the graph runtime merges it (messages appended, search criteria replaced wholesale).

mod conversation;
mod search_criteria;

pub use conversation::{ConversationState, ConversationUpdate};
pub use search_criteria::{field_label, SearchCriteria};
