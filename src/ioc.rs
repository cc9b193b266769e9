//! Container module.
//!
//! This module provides the IoC container: bindings, aliases, deferred
//! providers, module loading and `resolve`/`make`.
//!
//! # Examples
//!
//! ```rust,no_run
//! use fold::ioc::{Container, Factory};
//! ```

pub use fold_ioc::*;
