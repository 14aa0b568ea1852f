//! End-to-end lowering scenarios, hand-building the typed AST the way an
//! external type checker would hand it to this crate.

use newlang_nir::ast::*;
use newlang_nir::diagnostics::{Diagnostic, VecDiagnosticSink};
use newlang_nir::lower::lower_function;
use newlang_nir::nir::{Instruction, NIRValue, Terminator};
use newlang_nir::types::{StructType, Type};

fn range() -> Range {
    Range::default()
}

fn ident(name: &str, ty: Type) -> Expression {
    Expression::Identifier(IdentifierExpression {
        name: name.to_string(),
        resolved_type: Some(ty),
        range: range(),
    })
}

fn int_lit(value: i64) -> Expression {
    Expression::IntegerLiteral(IntegerLiteralExpression {
        value: value.to_string(),
        resolved_type: Some(Type::Int),
        range: range(),
    })
}

fn param(name: &str, ty: Type) -> Parameter {
    Parameter { name: name.to_string(), resolved_type: Some(ty), range: range() }
}

fn block(statements: Vec<Statement>) -> Block {
    Block { statements, range: range() }
}

fn func(
    name: &str,
    parameters: Vec<Parameter>,
    return_type: Type,
    body: Vec<Statement>,
) -> FunctionDeclaration {
    FunctionDeclaration {
        name: name.to_string(),
        parameters,
        body: Some(block(body)),
        is_extern: false,
        resolved_return_type: Some(return_type),
        range: range(),
    }
}

// S1 — identity.
#[test]
fn identity_function_spills_and_reloads_its_parameter() {
    let decl = func(
        "id",
        vec![param("x", Type::Int)],
        Type::Int,
        vec![Statement::Return(ReturnStatement {
            value: Some(ident("x", Type::Int)),
            range: range(),
        })],
    );
    let sink = VecDiagnosticSink::new();
    let (function, degraded) = lower_function(&decl, None, None, &sink);
    assert!(!degraded);
    assert_eq!(function.blocks().len(), 1);

    let entry = function.entry_block_id();
    let ids = function.block(entry).instruction_ids();
    assert_eq!(ids.len(), 3, "alloca, store, load");
    assert!(matches!(function.instruction(ids[0]), Instruction::Alloca { name, .. } if name == "x"));
    assert!(matches!(function.instruction(ids[1]), Instruction::Store { .. }));
    assert!(matches!(function.instruction(ids[2]), Instruction::Load { .. }));
    match function.block(entry).terminator.as_ref().unwrap() {
        Terminator::Return(Some(NIRValue::Instruction(id))) => assert_eq!(*id, ids[2]),
        other => panic!("expected Return(load result), got {other:?}"),
    }
}

// S2 — short-circuit and.
#[test]
fn short_circuit_and_builds_a_two_block_diamond() {
    let decl = func(
        "f",
        vec![param("a", Type::Bool), param("b", Type::Bool)],
        Type::Bool,
        vec![Statement::Return(ReturnStatement {
            value: Some(Expression::Binary(BinaryExpression {
                operator: BinaryOperator::And,
                left: Box::new(ident("a", Type::Bool)),
                right: Box::new(ident("b", Type::Bool)),
                resolved_type: Some(Type::Bool),
                range: range(),
            })),
            range: range(),
        })],
    );
    let sink = VecDiagnosticSink::new();
    let (function, degraded) = lower_function(&decl, None, None, &sink);
    assert!(!degraded);

    let names: Vec<_> = function.blocks().iter().map(|b| b.name.clone()).collect();
    assert_eq!(names, vec!["entry", "and_continue_1", "and_merge_1"]);

    let entry = function.entry_block_id();
    match function.block(entry).terminator.as_ref().unwrap() {
        Terminator::Branch { true_args, false_args, .. } => {
            assert!(true_args.is_empty());
            assert_eq!(false_args.len(), 1);
            match &false_args[0] {
                NIRValue::Constant(Type::Bool, newlang_nir::nir::Literal::Bool(v)) => assert!(!v),
                other => panic!("expected constant false, got {other:?}"),
            }
        }
        other => panic!("expected a branch terminator, got {other:?}"),
    }

    for b in function.blocks() {
        assert!(b.is_closed());
    }
}

// S3 — if/elseif/else.
#[test]
fn if_elseif_else_chain_closes_every_block_into_one_merge() {
    let decl = func(
        "classify",
        vec![param("n", Type::Int)],
        Type::Void,
        vec![Statement::If(IfStatement {
            clauses: vec![
                IfClause {
                    condition: Expression::Binary(BinaryExpression {
                        operator: BinaryOperator::Lt,
                        left: Box::new(ident("n", Type::Int)),
                        right: Box::new(int_lit(0)),
                        resolved_type: Some(Type::Bool),
                        range: range(),
                    }),
                    body: block(vec![]),
                },
                IfClause {
                    condition: Expression::Binary(BinaryExpression {
                        operator: BinaryOperator::Eq,
                        left: Box::new(ident("n", Type::Int)),
                        right: Box::new(int_lit(0)),
                        resolved_type: Some(Type::Bool),
                        range: range(),
                    }),
                    body: block(vec![]),
                },
            ],
            else_block: Some(block(vec![])),
            range: range(),
        })],
    );
    let sink = VecDiagnosticSink::new();
    let (function, _) = lower_function(&decl, None, None, &sink);

    let mut names: Vec<_> = function.blocks().iter().map(|b| b.name.clone()).collect();
    names.sort();
    let mut expected = vec![
        "entry".to_string(),
        "merge_1".to_string(),
        "then1_1".to_string(),
        "cond2_1".to_string(),
        "then2_1".to_string(),
        "else_block_1".to_string(),
    ];
    expected.sort();
    assert_eq!(names, expected);
    for b in function.blocks() {
        assert!(b.is_closed());
    }
}

// S4 — method call.
#[test]
fn method_call_mangles_the_name_and_passes_self_as_the_first_argument() {
    let point = StructType {
        name: "Point".to_string(),
        fields: vec![("x".to_string(), Type::Int)],
        methods: vec![],
    };
    let decl = func(
        "bump",
        vec![param("p", Type::Struct(point.clone()))],
        Type::Void,
        vec![Statement::Expression(ExpressionStatement {
            expression: Expression::Call(CallExpression {
                callee: Box::new(Expression::MemberAccess(MemberAccessExpression {
                    base: Box::new(ident("p", Type::Struct(point.clone()))),
                    member: "move".to_string(),
                    resolved_type: None,
                    range: range(),
                })),
                arguments: vec![CallArgument { value: int_lit(1) }],
                resolved_type: Some(Type::Void),
                range: range(),
            }),
            range: range(),
        })],
    );
    let sink = VecDiagnosticSink::new();
    let (function, degraded) = lower_function(&decl, None, None, &sink);
    assert!(!degraded);

    let entry = function.entry_block_id();
    let call = function
        .block(entry)
        .instruction_ids()
        .iter()
        .map(|id| function.instruction(*id))
        .find(|inst| matches!(inst, Instruction::Call { .. }))
        .expect("a Call instruction");
    match call {
        Instruction::Call { callee, args, .. } => {
            assert_eq!(callee, "Point_move");
            assert_eq!(args.len(), 2);
            assert_eq!(function.value_type(&args[0]), Type::pointer_to(Type::Struct(point)));
        }
        _ => unreachable!(),
    }
}

// S5 — member write.
#[test]
fn member_write_resolves_the_nested_field_address() {
    let pos = StructType {
        name: "Pos".to_string(),
        fields: vec![("x".to_string(), Type::Int)],
        methods: vec![],
    };
    let point = StructType {
        name: "Point".to_string(),
        fields: vec![("pos".to_string(), Type::Struct(pos))],
        methods: vec![],
    };
    let decl = func(
        "move_point",
        vec![param("p", Type::Struct(point))],
        Type::Void,
        vec![Statement::MemberAssign(MemberAssignStatement {
            base_name: "p".to_string(),
            member_path: vec!["pos".to_string(), "x".to_string()],
            value: int_lit(3),
            range: range(),
        })],
    );
    let sink = VecDiagnosticSink::new();
    let (function, degraded) = lower_function(&decl, None, None, &sink);
    assert!(!degraded);

    let entry = function.entry_block_id();
    let instructions: Vec<_> = function
        .block(entry)
        .instruction_ids()
        .iter()
        .map(|id| function.instruction(*id))
        .collect();
    let field_addr = instructions
        .iter()
        .find(|inst| matches!(inst, Instruction::FieldAddress { .. }))
        .expect("a FieldAddress instruction");
    match field_addr {
        Instruction::FieldAddress { field_path, result_type, .. } => {
            assert_eq!(field_path, &vec!["pos".to_string(), "x".to_string()]);
            assert_eq!(*result_type, Type::pointer_to(Type::Int));
        }
        _ => unreachable!(),
    }
    assert!(instructions.iter().any(|inst| matches!(inst, Instruction::Store { .. })));
}

// S6 — dereference of a non-pointer.
#[test]
fn dereferencing_a_non_pointer_emits_a_diagnostic_and_still_closes_the_block() {
    let decl = func(
        "bad",
        vec![],
        Type::Int,
        vec![Statement::Return(ReturnStatement {
            value: Some(Expression::Unary(UnaryExpression {
                operator: UnaryOperator::Dereference,
                operand: Box::new(int_lit(1)),
                resolved_type: Some(Type::Int),
                range: range(),
            })),
            range: range(),
        })],
    );
    let sink = VecDiagnosticSink::new();
    let (function, degraded) = lower_function(&decl, None, None, &sink);
    assert!(degraded);

    let events = sink.take();
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], Diagnostic::DereferenceNonPointer { .. }));

    let entry = function.entry_block_id();
    assert!(function.block(entry).is_closed());
    assert!(matches!(
        function.block(entry).terminator.as_ref().unwrap(),
        Terminator::Return(Some(NIRValue::Undef(_)))
    ));
}

// Invariant 7 + 9: struct method mangling and unreachable-return completion.
#[test]
fn a_void_function_with_no_explicit_return_gets_one_synthesized() {
    let decl = func("noop", vec![], Type::Void, vec![]);
    let sink = VecDiagnosticSink::new();
    let (function, _) = lower_function(&decl, None, None, &sink);
    let entry = function.entry_block_id();
    assert!(matches!(
        function.block(entry).terminator.as_ref().unwrap(),
        Terminator::Return(None)
    ));
}

#[test]
fn a_non_void_function_with_no_explicit_return_gets_a_default_value() {
    let decl = func("noop", vec![], Type::Int, vec![]);
    let sink = VecDiagnosticSink::new();
    let (function, _) = lower_function(&decl, None, None, &sink);
    let entry = function.entry_block_id();
    match function.block(entry).terminator.as_ref().unwrap() {
        Terminator::Return(Some(NIRValue::Constant(Type::Int, newlang_nir::nir::Literal::Int(0)))) => {}
        other => panic!("expected Return(Constant(Int, 0)), got {other:?}"),
    }
}
