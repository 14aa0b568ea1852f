use crate::ast::{Expression, MemberAccessExpression, UnaryOperator};
use crate::nir::{Instruction, NIRValue};
use crate::types::Type;

use super::{resolve_field_path_type, FunctionLowerer};

impl<'s> FunctionLowerer<'s> {
    /// §4.3.4 — the memory location of an lvalue, or `None` if `expr`
    /// doesn't denote one.
    pub(super) fn address_of(&mut self, expr: &Expression) -> Option<NIRValue> {
        match expr {
            Expression::Identifier(id) => self.address_of_identifier(&id.name),
            Expression::MemberAccess(access) => self.address_of_member_access(access),
            Expression::Unary(unary) if unary.operator == UnaryOperator::Dereference => {
                Some(self.lower_expression(&unary.operand))
            }
            _ => None,
        }
    }

    fn address_of_identifier(&mut self, name: &str) -> Option<NIRValue> {
        if let Some(value) = self.variables.get(name).cloned() {
            return match value {
                NIRValue::Instruction(_) => Some(value),
                // Bound to a block parameter: the un-spilled `self` case.
                NIRValue::BlockParameter { .. } => None,
                _ => None,
            };
        }
        let field_ty = self.self_field_type(name)?;
        let self_value = self.self_param.clone()?;
        Some(self.function.append_value(
            self.current_block,
            Instruction::FieldAddress {
                base: self_value,
                field_path: vec![name.to_string()],
                result_type: Type::pointer_to(field_ty),
            },
        ))
    }

    fn address_of_member_access(&mut self, access: &MemberAccessExpression) -> Option<NIRValue> {
        let (root, path) = collapse_member_chain(access);
        if let Expression::Identifier(id) = root {
            if let Some(base) = self.variables.get(&id.name).cloned() {
                if let NIRValue::Instruction(_) = &base {
                    let base_ty = self.function.value_type(&base);
                    if let Some(pointee) = base_ty.pointee().cloned() {
                        let leaf_type =
                            resolve_field_path_type(&pointee, &path).unwrap_or_else(Type::fresh_unknown);
                        return Some(self.function.append_value(
                            self.current_block,
                            Instruction::FieldAddress {
                                base,
                                field_path: path,
                                result_type: Type::pointer_to(leaf_type),
                            },
                        ));
                    }
                }
            }
        }
        let self_value = self.self_param.clone()?;
        let leaf_type = self
            .self_struct
            .as_ref()
            .and_then(|s| resolve_field_path_type(&Type::Struct(s.clone()), &path))
            .unwrap_or_else(Type::fresh_unknown);
        Some(self.function.append_value(
            self.current_block,
            Instruction::FieldAddress {
                base: self_value,
                field_path: path,
                result_type: Type::pointer_to(leaf_type),
            },
        ))
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
