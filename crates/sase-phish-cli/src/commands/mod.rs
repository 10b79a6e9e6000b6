//! CLI Commands

pub mod features;
pub mod inspect;
pub mod predict;
pub mod train;
