//! Larder Library
//!
//! Core functionality for food-production inventory and recipe costing.

pub mod build_info;
pub mod costing;
pub mod db;
pub mod mcp;
pub mod models;
pub mod pricing;
pub mod tools;
