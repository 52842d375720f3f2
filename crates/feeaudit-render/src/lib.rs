//! # feeaudit-render
//!
//! Rendering backends for feeaudit aggregate tables.
//!
//! This crate provides:
//! - Excel audit workbooks, one block per run (for the operator)
//! - Plain-text run summaries (for the console)
//! - The block layout shared by both, testable without a workbook
//!
//! ## Example
//!
//! ```rust,ignore
//! use feeaudit_core::Renderer;
//! use feeaudit_render::{ExcelRenderer, TextRenderer};
//!
//! let xlsx_bytes = ExcelRenderer::new().contract_name("STE").render(&table)?;
//! std::fs::write("Agent_Fee_Audit.xlsx", xlsx_bytes)?;
//!
//! println!("{}", TextRenderer::new().render(&table)?);
//! ```

pub mod excel;
pub mod layout;
pub mod text;

pub use excel::ExcelRenderer;
pub use layout::{AuditLayout, LayoutCell};
pub use text::TextRenderer;
