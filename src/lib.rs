//! Bind breakpoints in C# sources to the namespace, type and method that
//! enclose them.
//!
//! [`resolve`] is the one-call entry point. [`Binder`] adds configuration,
//! a parse cache and batch binding.

pub mod binder;
pub mod cache;
pub mod commands;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod grammar;
pub mod location;
pub mod locator;
pub mod naming;
pub mod scope;
pub mod types;
pub mod watch;

pub use crate::binder::{Binder, resolve};
pub use crate::error::{BindFailure, Error};
pub use crate::types::{BindOutcome, BreakpointRequest, ResolvedScope, TextPosition};
