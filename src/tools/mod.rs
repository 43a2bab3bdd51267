//! Larder Tools module
//!
//! MCP tool implementations for the Larder service.

pub mod inventory;
pub mod prices;
pub mod recipes;
pub mod shifts;
pub mod status;
