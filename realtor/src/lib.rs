//! # Realtor
//!
//! A conversational real-estate assistant built on a small checkpointed state graph.
//!
//! A main agent answers the user directly, calls its own tools, or delegates: property
//! searches go to the search-criteria agent, which turns free text into a structured
//! [`SearchCriteria`] and queries the [`PropertyDatabase`]; viewings go to the appointment
//! agent, whose booking, cancelling and rescheduling tools sit behind an interrupt gate that
//! only an explicit approval clears.
//!
//! ## Main modules
//!
//! - [`graph`]: [`StateGraph`], [`CompiledStateGraph`], [`Node`], [`Next`]; interrupt-before
//!   gates with [`PendingInterrupt`] and per-step checkpoints.
//! - [`memory`]: [`Checkpointer`], [`MemorySaver`], [`SqliteSaver`], [`RunnableConfig`].
//! - [`state`]: [`ConversationState`], [`ConversationUpdate`], [`SearchCriteria`].
//! - [`llm`]: [`LlmClient`], [`invoke_structured`], [`MockLlm`], [`ChatOpenAI`].
//! - [`tools`]: [`Tool`], [`ToolRegistry`], YAML-declared specs ([`ToolCatalog`]), the
//!   listing and appointment tools.
//! - [`agents`]: the realtor nodes, routers and [`build_realtor_graph`].
//! - [`database`]: [`PropertyDatabase`], in-memory and SQLite listing stores.
//! - [`conversation`]: [`Conversation::turn`], the per-turn entry point.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use realtor::{Conversation, InMemoryPropertyDatabase, MockLlm, MockReply, RealtorDeps};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let llm = Arc::new(MockLlm::new(vec![MockReply::text("Hi! Where would you like to live?")]));
//! let db = Arc::new(InMemoryPropertyDatabase::with_samples());
//! let conversation = Conversation::new(RealtorDeps::new(llm, db))?;
//!
//! let outcome = conversation.turn("thread-1", Some("hello".into()), false).await?;
//! println!("{}", outcome.reply().unwrap_or_default());
//! # Ok(())
//! # }
//! ```

pub mod agents;
pub mod conversation;
pub mod database;
pub mod error;
pub mod graph;
pub mod llm;
pub mod memory;
pub mod message;
pub mod settings;
pub mod state;
pub mod tools;

pub use agents::{
    build_realtor_graph, criteria_summary, route_appointment_agent, route_main_agent,
    AppointmentAgent, BuildError, MainAgent, NodeId, PendingSensitiveCalls, QueryDatabaseNode,
    RealtorDeps, SearchCriteriaAgent, ToolNode,
};
pub use conversation::{denial_text, Conversation, TurnOutcome};
pub use database::{
    sample_listings, DatabaseError, InMemoryPropertyDatabase, Listing, PropertyDatabase,
    SqlitePropertyDatabase,
};
pub use error::AgentError;
pub use graph::{
    CompilationError, CompiledStateGraph, DefaultInterruptHandler, GraphRun, GraphState,
    InterruptHandler, Next, Node, PassThroughNode, PendingInterrupt, RunStatus, StateGraph,
    StateSnapshot, END, START,
};
pub use llm::{
    invoke_structured, ChatOpenAI, LlmClient, LlmRequest, LlmResponse, LlmUsage, MockLlm,
    MockReply, ResponseFormat,
};
pub use memory::{
    Checkpoint, CheckpointError, CheckpointMetadata, CheckpointSource, Checkpointer,
    JsonSerializer, MemorySaver, RunnableConfig, Serializer, SqliteSaver,
};
pub use message::{Message, ToolCall};
pub use settings::{RealtorSettings, SettingsError, DEFAULT_MODEL};
pub use state::{field_label, ConversationState, ConversationUpdate, SearchCriteria};
pub use tools::{
    appointment_tools, Appointment, AppointmentBook, Delegation, Tool, ToolCatalog, ToolError,
    ToolRegistry, ToolSafety, ToolSpec,
};
