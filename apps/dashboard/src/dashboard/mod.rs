// Presentation layer: the per-visitor session state machine, the pure views
// derived from it, and the orchestration that wires actions to gateways.

pub mod handlers;
pub mod orchestrator;
pub mod registry;
pub mod session;
pub mod views;

pub use orchestrator::Dashboard;
pub use registry::SessionRegistry;
