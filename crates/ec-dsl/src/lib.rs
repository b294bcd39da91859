//! Front end for entity class declaration files.
//!
//! Text goes through [`lexer`], [`parser`] (bracket-nested raw blocks) and
//! [`compiler`] (entityDef and model blocks), and comes out as
//! [`ec_core::DeclBlock`]s. [`DefDirectory`] and [`TextSource`] wrap that
//! pipeline as [`ec_core::DeclSource`]s.

pub mod ast;
pub mod compiler;
pub mod diagnostics;
pub mod lexer;
pub mod parser;
pub mod source;

pub use diagnostics::render_diagnostics;
pub use source::{DefDirectory, TextSource, parse_text};
