//! Pipeline stages for PDF-to-quiz generation.
//!
//! Each submodule implements exactly one transformation step, so each can
//! be tested without the others and the external collaborators (converter
//! process, completion endpoint) sit behind a trait at exactly one place.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ render ──▶ encode ──▶ llm ──▶ postprocess ──▶ questions/<name>.json
//! (check)  (pdftocairo) (base64)  (POST)   (unfence)
//! ```
//!
//! 1. [`input`]  — validate the selected PDF and derive its base name
//! 2. [`render`] — run the rasterizer in `spawn_blocking`; one JPEG per page
//! 3. [`encode`] — read the JPEGs back and base64-wrap them as data URIs
//! 4. [`llm`]    — one chat request with every page attached; the only
//!    stage with network I/O
//! 5. [`postprocess`] — strip code fences the model may wrap around its JSON

pub mod encode;
pub mod input;
pub mod llm;
pub mod postprocess;
pub mod render;
