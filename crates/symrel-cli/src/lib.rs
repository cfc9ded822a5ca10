//! CLI library components for the Symbol Relation Workbench.

pub mod logging;
