//! # Equipment Interface
//!
//! This module defines the interface structures which are exchanged with the driver each tick.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

pub mod cam;
pub mod dems;
pub mod telem;
