//! Session, request and view-state layer for the Real-Time RAG console.
//!
//! Everything here runs on a single cooperative thread: shared handles are
//! `Rc`, trait futures are `?Send`, and the same code serves the browser
//! build and native tests.

pub mod answer;
pub mod api;
pub mod auth_flow;
pub mod config;
pub mod conversation;
pub mod dto;
pub mod error;
pub mod identity;
pub mod notify;
pub mod routes;
pub mod session;
pub mod simulation;
pub mod team;

pub use error::ClientError;
