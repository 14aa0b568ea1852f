//! The function lowerer (§4.3): walks one function's typed AST and produces
//! its NIR body in place.
//!
//! Each lowering pass owns exactly one `NIRFunction` under construction plus
//! the small amount of state described by the source material's lowering
//! state: a name-to-value map, the block currently being appended to, and —
//! for methods — the incoming `self` pointer and its struct type.

mod address;
mod control_flow;
mod expressions;
mod statements;

use std::collections::HashMap;

use crate::ast::{FunctionDeclaration, Parameter};
use crate::diagnostics::DiagnosticSink;
use crate::nir::{BlockId, Instruction, NIRFunction, NIRValue};
use crate::types::{StructType, Type};

pub struct FunctionLowerer<'s> {
    function: NIRFunction,
    current_block: BlockId,
    variables: HashMap<String, NIRValue>,
    self_param: Option<NIRValue>,
    self_struct: Option<StructType>,
    sink: &'s dyn DiagnosticSink,
    block_seq: usize,
    degraded: bool,
}

/// Lowers one function or method declaration to NIR.
///
/// `method_owner` is `Some` when lowering a struct method: the entry block
/// gains a leading `Pointer(owner)` parameter bound to `self`, and that
/// parameter is never spilled to an alloca (§9, "Implicit `self` handling").
/// `name_override` supplies the mangled `<Struct>_<method>` name for
/// methods; `None` uses the declaration's own name.
pub fn lower_function(
    decl: &FunctionDeclaration,
    method_owner: Option<&StructType>,
    name_override: Option<&str>,
    sink: &dyn DiagnosticSink,
) -> (NIRFunction, bool) {
    let mut lowerer = FunctionLowerer::new(decl, method_owner, name_override, sink);
    if let Some(body) = &decl.body {
        lowerer.lower_block(body);
    }
    lowerer.finish()
}

impl<'s> FunctionLowerer<'s> {
    fn new(
        decl: &FunctionDeclaration,
        method_owner: Option<&StructType>,
        name_override: Option<&str>,
        sink: &'s dyn DiagnosticSink,
    ) -> Self {
        let mut param_types = Vec::with_capacity(decl.parameters.len() + 1);
        if let Some(owner) = method_owner {
            param_types.push(Type::pointer_to(Type::Struct(owner.clone())));
        }
        for param in &decl.parameters {
            param_types.push(resolved_param_type(param));
        }
        let return_type = decl
            .resolved_return_type
            .clone()
            .unwrap_or(Type::Void);
        let name = name_override.unwrap_or(&decl.name);
        let (function, entry, mut params) = NIRFunction::new(name, param_types, return_type);

        let mut lowerer = FunctionLowerer {
            function,
            current_block: entry,
            variables: HashMap::new(),
            self_param: None,
            self_struct: method_owner.cloned(),
            sink,
            block_seq: 0,
            degraded: false,
        };

        if method_owner.is_some() {
            lowerer.self_param = Some(params.remove(0));
        }

        for (param, value) in decl.parameters.iter().zip(params.into_iter()) {
            lowerer.spill_parameter(param, value);
        }

        lowerer
    }

    fn spill_parameter(&mut self, param: &Parameter, value: NIRValue) {
        let ty = self.function.value_type(&value);
        let alloca = self
            .function
            .append_value(self.current_block, Instruction::alloca(ty, param.name.clone()));
        self.function.append_instruction(
            self.current_block,
            Instruction::Store {
                address: alloca.clone(),
                value,
            },
        );
        self.variables.insert(param.name.clone(), alloca);
    }

    /// Synthesizes a missing terminator on the final block and hands back
    /// the built function together with whether any diagnostic fired.
    fn finish(mut self) -> (NIRFunction, bool) {
        if !self.function.block(self.current_block).is_closed() {
            let return_type = self.function.return_type.clone();
            let value = if matches!(return_type, Type::Void) {
                None
            } else {
                Some(default_value(&return_type))
            };
            self.function
                .set_terminator(self.current_block, crate::nir::Terminator::Return(value));
        }
        (self.function, self.degraded)
    }

    fn next_chain_id(&mut self) -> usize {
        self.block_seq += 1;
        self.block_seq
    }

    fn mark_degraded(&mut self) {
        self.degraded = true;
    }

    fn store(&mut self, address: NIRValue, value: NIRValue) {
        self.function
            .append_instruction(self.current_block, Instruction::Store { address, value });
    }

    fn self_field_type(&self, name: &str) -> Option<Type> {
        self.self_struct
            .as_ref()
            .and_then(|s| field_type_of(&Type::Struct(s.clone()), name))
    }

    fn error_constant(&self, resolved_type: Option<&Type>) -> NIRValue {
        NIRValue::Undef(resolved_type.cloned().unwrap_or_else(Type::fresh_unknown))
    }
}

fn resolved_param_type(param: &Parameter) -> Type {
    param.resolved_type.clone().unwrap_or_else(Type::fresh_unknown)
}

/// The fallback value synthesized for a fallen-through non-`Void` return
/// (§4.3.8): zero for integers, `false` for `Bool`, zero for anything else
/// the lowerer doesn't have a more specific default for.
fn default_value(ty: &Type) -> NIRValue {
    match ty {
        Type::Bool => NIRValue::Constant(Type::Bool, crate::nir::Literal::Bool(false)),
        Type::Int | Type::Int8 | Type::Int32 => {
            NIRValue::Constant(ty.clone(), crate::nir::Literal::Int(0))
        }
        _ => NIRValue::Constant(ty.clone(), crate::nir::Literal::Int(0)),
    }
}

fn field_type_of(ty: &Type, name: &str) -> Option<Type> {
    match ty {
        Type::Struct(s) => s.fields.iter().find(|(n, _)| n == name).map(|(_, t)| t.clone()),
        Type::Pointer(inner) => field_type_of(inner, name),
        _ => None,
    }
}

fn resolve_field_path_type(ty: &Type, path: &[String]) -> Option<Type> {
    let mut current = ty.clone();
    for field in path {
        current = field_type_of(&current, field)?;
    }
    Some(current)
}
