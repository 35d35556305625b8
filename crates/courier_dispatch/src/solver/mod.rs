pub mod construction;
pub mod dispatch_context;
pub mod dispatch_params;
pub mod ls;
pub mod orchestrator;
pub mod route;
pub mod scheduler;
pub mod score;
pub mod simulator;
