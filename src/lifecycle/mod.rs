//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     trigger() → broadcast → Router::listen loop exits
//!     → pending history navigations finish on their own tasks
//! ```
//!
//! # Design Decisions
//! - One coordinator per process, shared by reference
//! - Triggering twice is harmless

pub mod shutdown;

pub use shutdown::Shutdown;
