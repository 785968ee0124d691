//! Core document composition engine for Tessera.
//!
//! This crate contains pure composition and reporting logic with ZERO web or database
//! dependencies. Inputs arrive as in-memory values; artifacts leave as in-memory values or
//! bytes written into a caller-supplied buffer.
//!
//! # Modules
//!
//! - `layout` - Page geometry and multi-up composition of rendered units
//! - `reports` - Transaction aggregation, category shares and row-level pagination
//! - `render` - Print, workbook and view renderings plus PDF/CSV serialization

pub mod layout;
pub mod render;
pub mod reports;
