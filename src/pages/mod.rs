pub mod files;
pub mod graph;
pub mod not_found;
