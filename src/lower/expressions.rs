use crate::ast::{
    BinaryExpression, BinaryOperator, CallExpression, CastExpression, Expression,
    MemberAccessExpression, UnaryExpression, UnaryOperator,
};
use crate::nir::{BinOp, Instruction, Literal, NIRValue, UnOp};
use crate::types::Type;

use super::{field_type_of, FunctionLowerer};

const PRIMITIVE_CAST_NAMES: [&str; 4] = ["Int", "Int8", "Int32", "Bool"];

impl<'s> FunctionLowerer<'s> {
    pub(super) fn lower_expression(&mut self, expr: &Expression) -> NIRValue {
        match expr {
            Expression::IntegerLiteral(lit) => {
                let value = lit.value.parse::<i64>().unwrap_or(0);
                let ty = lit.resolved_type.clone().unwrap_or(Type::Int);
                NIRValue::Constant(ty, Literal::Int(value))
            }
            Expression::StringLiteral(lit) => {
                let ty = lit
                    .resolved_type
                    .clone()
                    .unwrap_or_else(|| Type::pointer_to(Type::Int8));
                NIRValue::Constant(ty, Literal::Str(lit.value.clone()))
            }
            Expression::BooleanLiteral(lit) => {
                let ty = lit.resolved_type.clone().unwrap_or(Type::Bool);
                NIRValue::Constant(ty, Literal::Bool(lit.value))
            }
            Expression::Identifier(id) => {
                self.materialize_identifier(&id.name, id.resolved_type.as_ref(), id.range)
            }
            Expression::Unary(unary) => self.lower_unary(unary),
            Expression::Binary(binary) => self.lower_binary(binary),
            Expression::Call(call) => self.lower_call(call),
            Expression::Cast(cast) => self.lower_cast(cast),
            Expression::MemberAccess(access) => self.lower_member_access(access),
        }
    }

    /// §4.3.6 — reads from the variable map, falls back to a `self` field,
    /// else emits `nirCannotComputeAddress` and yields an error value.
    pub(super) fn materialize_identifier(
        &mut self,
        name: &str,
        resolved_type: Option<&Type>,
        range: crate::ast::Range,
    ) -> NIRValue {
        if let Some(value) = self.variables.get(name).cloned() {
            return match value {
                NIRValue::BlockParameter { .. } => value,
                alloca => {
                    let ty = resolved_type.cloned().unwrap_or(Type::Int);
                    self.function
                        .append_value(self.current_block, Instruction::Load { address: alloca, result_type: ty })
                }
            };
        }
        if let Some(field_ty) = self.self_field_type(name) {
            let self_value = self
                .self_param
                .clone()
                .expect("self field lookup succeeded without a self parameter");
            let addr = self.function.append_value(
                self.current_block,
                Instruction::FieldAddress {
                    base: self_value,
                    field_path: vec![name.to_string()],
                    result_type: Type::pointer_to(field_ty.clone()),
                },
            );
            return self
                .function
                .append_value(self.current_block, Instruction::Load { address: addr, result_type: field_ty });
        }
        self.sink.nir_cannot_compute_address(
            range,
            resolved_type.cloned().unwrap_or_else(Type::fresh_unknown),
        );
        self.mark_degraded();
        self.error_constant(resolved_type)
    }

    fn lower_unary(&mut self, unary: &UnaryExpression) -> NIRValue {
        match unary.operator {
            UnaryOperator::Negate | UnaryOperator::LogicalNot => {
                let operand = self.lower_expression(&unary.operand);
                let operand_ty = self.function.value_type(&operand);
                let op = if unary.operator == UnaryOperator::Negate {
                    UnOp::Negate
                } else {
                    UnOp::LogicalNot
                };
                let result_type = unary.resolved_type.clone().unwrap_or(operand_ty);
                self.function.append_value(
                    self.current_block,
                    Instruction::UnaryOp { op, operand, result_type },
                )
            }
            UnaryOperator::Dereference => {
                let operand = self.lower_expression(&unary.operand);
                let operand_ty = self.function.value_type(&operand);
                match operand_ty.pointee().cloned() {
                    Some(pointee) => self.function.append_value(
                        self.current_block,
                        Instruction::Load { address: operand, result_type: pointee },
                    ),
                    None => {
                        self.sink
                            .nir_dereference_non_pointer(unary.range, operand_ty);
                        self.mark_degraded();
                        self.error_constant(unary.resolved_type.as_ref())
                    }
                }
            }
            UnaryOperator::AddressOf => match self.address_of(&unary.operand) {
                Some(addr) => addr,
                None => {
                    let ty = unary
                        .operand
                        .resolved_type()
                        .cloned()
                        .unwrap_or_else(Type::fresh_unknown);
                    self.sink.nir_address_of_non_lvalue(unary.range, ty);
                    self.mark_degraded();
                    self.error_constant(unary.resolved_type.as_ref())
                }
            },
        }
    }

    fn lower_binary(&mut self, binary: &BinaryExpression) -> NIRValue {
        if binary.operator.is_short_circuit() {
            return super::control_flow::lower_short_circuit(self, binary);
        }
        let left = self.lower_expression(&binary.left);
        let right = self.lower_expression(&binary.right);
        let op = map_binary_operator(binary.operator);
        let result_type = binary.resolved_type.clone().unwrap_or_else(|| {
            if binary.operator.is_comparison() {
                Type::Bool
            } else {
                Type::Int
            }
        });
        self.function.append_value(
            self.current_block,
            Instruction::BinaryOp { op, left, right, result_type },
        )
    }

    fn lower_call(&mut self, call: &CallExpression) -> NIRValue {
        if let Expression::MemberAccess(access) = call.callee.as_ref() {
            if let Expression::Identifier(base_id) = access.base.as_ref() {
                if self.variables.contains_key(&base_id.name) {
                    return self.lower_method_call(access, base_id, call);
                }
            }
        }
        if let Expression::Identifier(callee_id) = call.callee.as_ref() {
            if PRIMITIVE_CAST_NAMES.contains(&callee_id.name.as_str()) && call.arguments.len() == 1 {
                if let Some(resolved) = &call.resolved_type {
                    if resolved.type_id() == callee_id.name {
                        let value = self.lower_expression(&call.arguments[0].value);
                        return self.function.append_value(
                            self.current_block,
                            Instruction::Cast { value, result_type: resolved.clone() },
                        );
                    }
                }
            }
        }
        let args: Vec<NIRValue> = call
            .arguments
            .iter()
            .map(|a| self.lower_expression(&a.value))
            .collect();
        let name = callee_name(call.callee.as_ref());
        let result_type = call.resolved_type.clone().unwrap_or(Type::Void);
        self.function.append_value(
            self.current_block,
            Instruction::Call { callee: name, args, result_type },
        )
    }

    fn lower_method_call(
        &mut self,
        access: &MemberAccessExpression,
        base_id: &crate::ast::IdentifierExpression,
        call: &CallExpression,
    ) -> NIRValue {
        let struct_name = base_id
            .resolved_type
            .as_ref()
            .map(owner_struct_name)
            .unwrap_or_default();
        let mangled = format!("{struct_name}_{}", access.member);
        let base_addr = self
            .address_of(access.base.as_ref())
            .unwrap_or_else(|| self.lower_expression(access.base.as_ref()));
        let mut args = vec![base_addr];
        args.extend(call.arguments.iter().map(|a| self.lower_expression(&a.value)));
        let result_type = call.resolved_type.clone().unwrap_or(Type::Void);
        self.function.append_value(
            self.current_block,
            Instruction::Call { callee: mangled, args, result_type },
        )
    }

    fn lower_cast(&mut self, cast: &CastExpression) -> NIRValue {
        let value = self.lower_expression(&cast.expression);
        let result_type = cast.resolved_type.clone().unwrap_or(Type::Int);
        self.function
            .append_value(self.current_block, Instruction::Cast { value, result_type })
    }

    /// §4.3.7 — reads through a pointer-typed base with `FieldAddress` +
    /// `Load`, or projects field-by-field over a value with `FieldExtract`.
    fn lower_member_access(&mut self, access: &MemberAccessExpression) -> NIRValue {
        let (root, path) = collapse_member_chain(access);
        if let Expression::Identifier(id) = root {
            if let Some(base) = self.variables.get(&id.name).cloned() {
                let base_ty = self.function.value_type(&base);
                if let Some(pointee) = base_ty.pointee().cloned() {
                    let leaf_type = super::resolve_field_path_type(&pointee, &path)
                        .unwrap_or_else(Type::fresh_unknown);
                    let addr = self.function.append_value(
                        self.current_block,
                        Instruction::FieldAddress {
                            base,
                            field_path: path,
                            result_type: Type::pointer_to(leaf_type.clone()),
                        },
                    );
                    return self.function.append_value(
                        self.current_block,
                        Instruction::Load { address: addr, result_type: leaf_type },
                    );
                }
            }
        }
        let mut current = self.lower_expression(root);
        let mut current_ty = self.function.value_type(&current);
        for field in path {
            let field_ty = field_type_of(&current_ty, &field).unwrap_or_else(Type::fresh_unknown);
            current = self.function.append_value(
                self.current_block,
                Instruction::FieldExtract {
                    base: current,
                    field_name: field,
                    result_type: field_ty.clone(),
                },
            );
            current_ty = field_ty;
        }
        current
    }
}

fn collapse_member_chain(access: &MemberAccessExpression) -> (&Expression, Vec<String>) {
    let mut path = vec![access.member.clone()];
    let mut cur = access.base.as_ref();
    while let Expression::MemberAccess(inner) = cur {
        path.push(inner.member.clone());
        cur = inner.base.as_ref();
    }
    path.reverse();
    (cur, path)
}

fn owner_struct_name(ty: &Type) -> String {
    match ty {
        Type::Struct(s) => s.name.clone(),
        Type::Pointer(inner) => owner_struct_name(inner),
        other => other.type_id(),
    }
}

fn callee_name(expr: &Expression) -> String {
    match expr {
        Expression::Identifier(id) => id.name.clone(),
        // `base.bar()` where `base` didn't resolve to a known method owner
        // (§4.3.3 case 1 already handles the owning-struct case): fall back
        // to the member name rather than losing it entirely.
        Expression::MemberAccess(access) => access.member.clone(),
        _ => "<anonymous>".to_string(),
    }
}

fn map_binary_operator(op: BinaryOperator) -> BinOp {
    match op {
        BinaryOperator::Add => BinOp::Add,
        BinaryOperator::Sub => BinOp::Sub,
        BinaryOperator::Mul => BinOp::Mul,
        BinaryOperator::Div => BinOp::Div,
        BinaryOperator::Mod => BinOp::Mod,
        BinaryOperator::Eq => BinOp::Eq,
        BinaryOperator::Ne => BinOp::Ne,
        BinaryOperator::Lt => BinOp::Lt,
        BinaryOperator::Le => BinOp::Le,
        BinaryOperator::Gt => BinOp::Gt,
        BinaryOperator::Ge => BinOp::Ge,
        BinaryOperator::And | BinaryOperator::Or => {
            unreachable!("short-circuit operators are handled by lower_binary before this point")
        }
    }
}
