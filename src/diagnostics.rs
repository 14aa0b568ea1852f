//! The diagnostic sink injected into the function lowerer.
//!
//! Lowering never fails outright on a structurally-recoverable condition
//! (§7): it records one of these events and substitutes an `Undef`/error
//! value so the rest of the function still lowers to a well-formed block
//! graph. Rendering a diagnostic into user-facing text is the embedder's
//! job, not this crate's.

use std::sync::Mutex;

use crate::ast::Range;
use crate::types::Type;

#[derive(Clone, Debug, PartialEq)]
pub enum Diagnostic {
    /// An identifier could not be resolved to a binding, a field of `self`,
    /// or anything else the lowerer knows how to materialize.
    CannotComputeAddress { range: Range, expr_type: Type },
    /// An lvalue-assignment target has no addressable location.
    CannotStore { range: Range, expr_type: Type },
    /// `*expr` where `expr` is not pointer-typed.
    DereferenceNonPointer { range: Range, expr_type: Type },
    /// `&expr` where `expr` is not an lvalue.
    AddressOfNonLValue { range: Range, expr_type: Type },
}

impl Diagnostic {
    pub fn range(&self) -> Range {
        match self {
            Diagnostic::CannotComputeAddress { range, .. }
            | Diagnostic::CannotStore { range, .. }
            | Diagnostic::DereferenceNonPointer { range, .. }
            | Diagnostic::AddressOfNonLValue { range, .. } => *range,
        }
    }
}

/// Minimum diagnostic-sink contract from §6.3.
///
/// Implementations must tolerate concurrent use (§5): the reference driver
/// is sequential, but nothing here prevents an embedder from running several
/// function lowerers in parallel against one shared sink.
pub trait DiagnosticSink {
    fn nir_cannot_compute_address(&self, range: Range, expr_type: Type);
    fn nir_cannot_store(&self, range: Range, expr_type: Type);
    fn nir_dereference_non_pointer(&self, range: Range, expr_type: Type);
    fn nir_address_of_non_lvalue(&self, range: Range, expr_type: Type);
}

/// An in-memory, append-only sink. The default choice for tests and for any
/// embedder that wants to inspect what went wrong after lowering completes.
#[derive(Default)]
pub struct VecDiagnosticSink {
    events: Mutex<Vec<Diagnostic>>,
}

impl VecDiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.events.lock().unwrap())
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().unwrap().is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    fn push(&self, diagnostic: Diagnostic) {
        self.events.lock().unwrap().push(diagnostic);
    }
}

impl DiagnosticSink for VecDiagnosticSink {
    fn nir_cannot_compute_address(&self, range: Range, expr_type: Type) {
        self.push(Diagnostic::CannotComputeAddress { range, expr_type });
    }

    fn nir_cannot_store(&self, range: Range, expr_type: Type) {
        self.push(Diagnostic::CannotStore { range, expr_type });
    }

    fn nir_dereference_non_pointer(&self, range: Range, expr_type: Type) {
        self.push(Diagnostic::DereferenceNonPointer { range, expr_type });
    }

    fn nir_address_of_non_lvalue(&self, range: Range, expr_type: Type) {
        self.push(Diagnostic::AddressOfNonLValue { range, expr_type });
    }
}

/// Forwards every event to `log::warn!` instead of collecting it. Useful
/// when lowering is wired into a pipeline that already has its own
/// diagnostic rendering downstream of the log stream.
#[derive(Default)]
pub struct LoggingDiagnosticSink;

impl DiagnosticSink for LoggingDiagnosticSink {
    fn nir_cannot_compute_address(&self, range: Range, expr_type: Type) {
        log::warn!("cannot compute address of {expr_type:?} at {range:?}");
    }

    fn nir_cannot_store(&self, range: Range, expr_type: Type) {
        log::warn!("cannot store into {expr_type:?} at {range:?}");
    }

    fn nir_dereference_non_pointer(&self, range: Range, expr_type: Type) {
        log::warn!("dereference of non-pointer {expr_type:?} at {range:?}");
    }

    fn nir_address_of_non_lvalue(&self, range: Range, expr_type: Type) {
        log::warn!("address-of non-lvalue {expr_type:?} at {range:?}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec_sink_collects_in_order() {
        let sink = VecDiagnosticSink::new();
        sink.nir_cannot_store(Range::default(), Type::Int);
        sink.nir_dereference_non_pointer(Range::default(), Type::Bool);
        let events = sink.take();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], Diagnostic::CannotStore { .. }));
        assert!(matches!(events[1], Diagnostic::DereferenceNonPointer { .. }));
        assert!(sink.is_empty());
    }
}
