//! Registrar module.
//!
//! This module provides boot-time provider registration, the single
//! stabilization pass over deferred providers, and directory autoloading.
//!
//! # Examples
//!
//! ```rust,no_run
//! use fold::registrar::{Registrar, generate_directory_hash};
//! ```

pub use fold_registrar::*;
