pub mod actions;
pub mod changeset;
pub mod config;
pub mod error;
pub mod packages;
pub mod platform;
pub mod report;
pub mod runner;
pub mod snapshot;
pub mod webhook;
pub mod workflow;
pub mod workspace;

#[cfg(test)]
pub(crate) mod testing;
