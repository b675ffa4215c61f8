//! Whaletown - identity, addressing and mail routing for a town of agents
//!
//! A town runs many coding agents side by side, each in its own tmux
//! session. Town-level agents (mayor, deacon) coordinate everything; each
//! rig (a project) has a witness that watches its workers, a refinery that
//! merges their branches, human-driven crew members and ephemeral polecats.
//!
//! This crate is the shared vocabulary for naming those agents.
//!
//! # Architecture
//!
//! - **connection**: Mail address parsing (`[machine:]rig/polecat`)
//! - **session**: Agent identities, tmux session names, session classification
//! - **beads**: Agent bead IDs
//! - **mail**: Messages, recipient resolution, nudge targeting
//! - **protocol**: Witness/refinery merge protocol
//! - **workspace**: Town directory layout and role detection
//! - **doctor**: Health checks (orphaned sessions)
//! - **config**: Configuration file and validation

// Core modules
pub mod config;
pub mod connection;
pub mod error;
pub mod session;

// Components
pub mod beads;
pub mod doctor;
pub mod logging;
pub mod mail;
pub mod protocol;
pub mod workspace;

// Re-exports
pub use error::{Result, WhaletownError};
