//! This crate implements the lexical engine of the assembler. It scans source lines into tokens
//! and hands them out through a navigable, backtrackable stream that expands registered
//! replacements lazily.
//!
//! The final output of this phase is a [`token_stream::TokenStream`], either scanned from a text
//! source with [`token_stream::TokenStream::scan`] or replaying a captured token list.

#![deny(
    missing_debug_implementations,
    missing_copy_implementations,
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    clippy::missing_errors_doc
)]
#![allow(clippy::missing_panics_doc, clippy::missing_const_for_fn)]

mod arena;
pub mod context;
pub mod error;
pub mod scanner;
mod sequence;
pub mod token;
pub mod token_stream;
