//! Core firmware infrastructure
//!
//! This module contains the components every task leans on: the logging
//! abstraction and the cross-task health supervision protocol.

pub mod logging;
pub mod supervisor;
