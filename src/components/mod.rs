//! Reusable view components.

pub mod relation_graph;
