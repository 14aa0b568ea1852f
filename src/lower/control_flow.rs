use crate::ast::{BinaryExpression, BinaryOperator, IfStatement};
use crate::nir::{Literal, NIRValue, Terminator};
use crate::types::Type;

use super::FunctionLowerer;

/// §4.3.5 — an if/elseif/else chain. One `merge` block is created before any
/// clause is lowered, since a clause's fallthrough jump may target it before
/// later clauses (or the else block) exist.
pub(super) fn lower_if(lowerer: &mut FunctionLowerer, stmt: &IfStatement) {
    let chain = lowerer.next_chain_id();
    let (merge, _) = lowerer.function.create_block(format!("merge_{chain}"), vec![]);

    let clause_count = stmt.clauses.len();
    for (index, clause) in stmt.clauses.iter().enumerate() {
        let condition = lowerer.lower_expression(&clause.condition);
        let (then_block, _) = lowerer
            .function
            .create_block(format!("then{}_{chain}", index + 1), vec![]);
        let is_last = index + 1 == clause_count;
        let next = if !is_last {
            lowerer
                .function
                .create_block(format!("cond{}_{chain}", index + 2), vec![])
                .0
        } else if stmt.else_block.is_some() {
            lowerer
                .function
                .create_block(format!("else_block_{chain}"), vec![])
                .0
        } else {
            merge
        };

        lowerer.function.set_terminator(
            lowerer.current_block,
            Terminator::Branch {
                condition,
                true_target: then_block,
                true_args: vec![],
                false_target: next,
                false_args: vec![],
            },
        );

        lowerer.current_block = then_block;
        lowerer.lower_block(&clause.body);
        close_with_jump_to(lowerer, merge);
        lowerer.current_block = next;
    }

    if let Some(else_block) = &stmt.else_block {
        lowerer.lower_block(else_block);
        close_with_jump_to(lowerer, merge);
    }

    lowerer.current_block = merge;
}

fn close_with_jump_to(lowerer: &mut FunctionLowerer, target: crate::nir::BlockId) {
    if !lowerer.function.block(lowerer.current_block).is_closed() {
        lowerer.function.set_terminator(
            lowerer.current_block,
            Terminator::Jump { target, args: vec![] },
        );
    }
}

/// §4.3.5 — `&&`/`||` lowered as a branch into a two-block diamond whose
/// merge block carries the single `Bool` result as a block parameter,
/// playing the role a phi node would in a conventional SSA encoding.
pub(super) fn lower_short_circuit(
    lowerer: &mut FunctionLowerer,
    expr: &BinaryExpression,
) -> NIRValue {
    let is_and = expr.operator == BinaryOperator::And;
    let chain = lowerer.next_chain_id();
    let prefix = if is_and { "and" } else { "or" };

    let left = lowerer.lower_expression(&expr.left);
    let (continue_block, _) = lowerer
        .function
        .create_block(format!("{prefix}_continue_{chain}"), vec![]);
    let (merge_block, merge_params) = lowerer
        .function
        .create_block(format!("{prefix}_merge_{chain}"), vec![Type::Bool]);

    let short_value = NIRValue::Constant(Type::Bool, Literal::Bool(!is_and));
    let (true_target, true_args, false_target, false_args) = if is_and {
        (continue_block, vec![], merge_block, vec![short_value])
    } else {
        (merge_block, vec![short_value], continue_block, vec![])
    };

    lowerer.function.set_terminator(
        lowerer.current_block,
        Terminator::Branch {
            condition: left,
            true_target,
            true_args,
            false_target,
            false_args,
        },
    );

    lowerer.current_block = continue_block;
    let right = lowerer.lower_expression(&expr.right);
    close_with_jump_args(lowerer, merge_block, vec![right]);
    lowerer.current_block = merge_block;

    merge_params
        .into_iter()
        .next()
        .expect("short-circuit merge block has exactly one parameter")
}

fn close_with_jump_args(lowerer: &mut FunctionLowerer, target: crate::nir::BlockId, args: Vec<NIRValue>) {
    if !lowerer.function.block(lowerer.current_block).is_closed() {
        lowerer.function.set_terminator(lowerer.current_block, Terminator::Jump { target, args });
    }
}
