//! Ingestion stages: from uploaded bytes to report text.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ (pdf | utf-8 read) ──▶ cache
//! (stage)   (dispatch)   (per-page text)       (by path)
//! ```
//!
//! 1. [`input`]  : validate the file name and bytes, stage them in a temp dir
//! 2. [`extract`]: choose the reader from the extension and join PDF pages
//! 3. [`pdf`]    : pdfium-backed page text; runs inside `spawn_blocking`
//!    because pdfium is not async-safe
//! 4. [`cache`]  : memoise extraction results by path

pub mod cache;
pub mod extract;
pub mod input;
pub mod pdf;
