//! `zn` library crate.
//!
//! High-level layout:
//! - frontend: `input` + `lexer` + `parser` produce the AST
//! - `exec`: tree-walking evaluator, scope chain, value & arithmetic core
//! - `error`: class-coded diagnostics shared by every stage
//! - `highlight` / `keygen`: token-stream consumers for external tooling
pub mod error;
pub mod exec;
pub mod highlight;
pub mod input;
pub mod keygen;
pub mod lexer;
pub mod parser;
pub mod probe;
