//! Core infrastructure
//!
//! Target-independent plumbing shared by all components. Currently this is
//! the logging macro layer; see [`logging`].

pub mod logging;
