//! The top-level driver (§4.4): turns a list of typed declarations into a
//! flat list of lowered NIR functions.

use crate::ast::{Declaration, StructDeclaration};
use crate::diagnostics::DiagnosticSink;
use crate::lower::lower_function;
use crate::nir::NIRFunction;
use crate::types::{StructType, Type};

/// The functions produced from one `lower_declarations` pass, plus whether
/// any of them hit a structurally-recoverable diagnostic (§7, class 1)
/// along the way. A `true` flag doesn't mean the result is unusable — every
/// function is still well-formed NIR — only that it's worth checking the
/// sink before trusting the program's semantics.
pub struct LoweringResult {
    pub functions: Vec<NIRFunction>,
    pub degraded: bool,
}

pub fn lower_declarations(declarations: &[Declaration], sink: &dyn DiagnosticSink) -> LoweringResult {
    let mut functions = Vec::new();
    let mut degraded = false;

    for declaration in declarations {
        match declaration {
            Declaration::Function(decl) if !decl.is_extern => {
                let (function, function_degraded) = lower_function(decl, None, None, sink);
                degraded |= function_degraded;
                functions.push(function);
            }
            Declaration::Function(_) | Declaration::Extern(_) => {}
            Declaration::Struct(decl) => {
                let struct_type = build_struct_type(decl);
                for method in &decl.methods {
                    let name_override = format!("{}_{}", decl.name, method.name);
                    let (function, function_degraded) =
                        lower_function(method, Some(&struct_type), Some(&name_override), sink);
                    degraded |= function_degraded;
                    functions.push(function);
                }
            }
        }
    }

    LoweringResult { functions, degraded }
}

fn build_struct_type(decl: &StructDeclaration) -> StructType {
    StructType {
        name: decl.name.clone(),
        fields: decl
            .fields
            .iter()
            .map(|f| (f.name.clone(), f.resolved_type.clone().unwrap_or_else(Type::fresh_unknown)))
            .collect(),
        methods: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::*;
    use crate::diagnostics::VecDiagnosticSink;

    fn range() -> Range {
        Range::default()
    }

    #[test]
    fn extern_declarations_produce_no_nir() {
        let decls = vec![Declaration::Extern(ExternDeclaration {
            name: "puts".to_string(),
            range: range(),
        })];
        let sink = VecDiagnosticSink::new();
        let result = lower_declarations(&decls, &sink);
        assert!(result.functions.is_empty());
        assert!(!result.degraded);
    }

    #[test]
    fn extern_function_declarations_produce_no_nir() {
        let decls = vec![Declaration::Function(FunctionDeclaration {
            name: "puts".to_string(),
            parameters: vec![],
            body: None,
            is_extern: true,
            resolved_return_type: Some(Type::Void),
            range: range(),
        })];
        let sink = VecDiagnosticSink::new();
        let result = lower_declarations(&decls, &sink);
        assert!(result.functions.is_empty());
    }

    #[test]
    fn struct_methods_are_mangled_and_carry_a_leading_self_pointer() {
        let method = FunctionDeclaration {
            name: "move".to_string(),
            parameters: vec![Parameter {
                name: "dx".to_string(),
                resolved_type: Some(Type::Int),
                range: range(),
            }],
            body: Some(Block { statements: vec![], range: range() }),
            is_extern: false,
            resolved_return_type: Some(Type::Void),
            range: range(),
        };
        let decls = vec![Declaration::Struct(StructDeclaration {
            name: "Point".to_string(),
            fields: vec![StructField { name: "x".to_string(), resolved_type: Some(Type::Int) }],
            methods: vec![method],
            range: range(),
        })];
        let sink = VecDiagnosticSink::new();
        let result = lower_declarations(&decls, &sink);
        assert_eq!(result.functions.len(), 1);
        let function = &result.functions[0];
        assert_eq!(function.name, "Point_move");
        assert_eq!(function.param_types.len(), 2);
        assert!(function.param_types[0].is_pointer());
    }

    #[test]
    fn functions_are_returned_in_encounter_order() {
        let make_fn = |name: &str| {
            Declaration::Function(FunctionDeclaration {
                name: name.to_string(),
                parameters: vec![],
                body: Some(Block { statements: vec![], range: range() }),
                is_extern: false,
                resolved_return_type: Some(Type::Void),
                range: range(),
            })
        };
        let decls = vec![make_fn("a"), make_fn("b"), make_fn("c")];
        let sink = VecDiagnosticSink::new();
        let result = lower_declarations(&decls, &sink);
        let names: Vec<_> = result.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }
}
