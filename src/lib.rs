//! AST-to-SSA lowering core for the NewLang compiler.
//!
//! This crate takes a typed abstract syntax tree — one already annotated
//! with resolved types by an external type checker — and produces NIR
//! (NewLang Intermediate Representation): a typed, SSA-form,
//! basic-block-structured function IR with explicit stack allocation,
//! loads, stores, field addressing, and parameterized-block control flow.
//!
//! What this crate does *not* do: lex, parse, or type-check source text;
//! generate machine code from NIR; or optimize the NIR it produces (no
//! constant folding, no dead-code elimination, no mem2reg). Those are the
//! job of the surrounding compiler.
//!
//! The pipeline, leaves first: [`types`] (the semantic type model) →
//! [`nir`] (functions, blocks, instructions, values) → [`lower`] (walks one
//! function's [`ast`] and produces its NIR body) → [`driver`] (iterates a
//! program's declarations and lowers each function or method).

pub mod ast;
pub mod diagnostics;
pub mod driver;
pub mod lower;
pub mod nir;
pub mod types;

pub use diagnostics::{Diagnostic, DiagnosticSink, LoggingDiagnosticSink, VecDiagnosticSink};
pub use driver::{lower_declarations, LoweringResult};
pub use nir::NIRFunction;
pub use types::Type;
