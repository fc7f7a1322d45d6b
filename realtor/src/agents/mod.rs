//! Realtor agents, tool nodes, routers and the graph that wires them.
//!
//! The main agent answers or delegates; the search-criteria agent maintains the structured
//! filter; the appointment agent drives the appointment tools, whose sensitive half sits
//! behind the graph's interrupt gate.

mod appointment_agent;
mod graph;
mod handoff;
mod main_agent;
mod node_id;
mod query_database;
mod routers;
mod search_criteria_agent;
mod tool_node;

pub use appointment_agent::AppointmentAgent;
pub use graph::{build_realtor_graph, BuildError, PendingSensitiveCalls, RealtorDeps};
pub use main_agent::MainAgent;
pub use node_id::NodeId;
pub use query_database::{QueryDatabaseNode, MAX_LISTED};
pub use routers::{route_appointment_agent, route_main_agent};
pub use search_criteria_agent::{criteria_summary, SearchCriteriaAgent};
pub use tool_node::ToolNode;
