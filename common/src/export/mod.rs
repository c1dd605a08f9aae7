//! Export core modules shared by the CLI and the PDF renderer.

pub mod pdf_core;
