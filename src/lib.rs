//! detachd: headless front-end for long-running network tools
//!
//! The engine reports progress and messages through a
//! [`UiContext`](core::UiContext) without knowing which front-end is active.
//! This crate provides the headless one: it detaches the process from its
//! controlling terminal, discards user-facing messages, draws progress on
//! stderr and, on a fatal error, rebinds the standard streams to a diagnostic
//! log so the report is not lost.

pub mod boot;
pub mod cli;
pub mod core;
pub mod daemon;

pub use crate::core::{CancellationToken, DaemonError, MessageQueue, UiContext, UiOps};
pub use crate::daemon::{DetachStrategy, HeadlessUi};
