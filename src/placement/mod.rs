pub mod engine;
pub mod workspace_guard;
