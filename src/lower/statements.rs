use crate::ast::{
    AssignStatement, Block, IfStatement, LValueAssignStatement, MemberAssignStatement,
    ReturnStatement, Statement, VarBinding,
};
use crate::nir::{Instruction, Terminator};
use crate::types::Type;

use super::{resolve_field_path_type, FunctionLowerer};

impl<'s> FunctionLowerer<'s> {
    pub(super) fn lower_block(&mut self, block: &Block) {
        for statement in &block.statements {
            if self.function.block(self.current_block).is_closed() {
                // A prior statement (`return`, or an `if` whose every arm
                // returns) already closed this block. Anything after it is
                // unreachable; there is no block left to append it to.
                break;
            }
            self.lower_statement(statement);
        }
    }

    fn lower_statement(&mut self, statement: &Statement) {
        match statement {
            Statement::VarBinding(stmt) => self.lower_var_binding(stmt),
            Statement::Assign(stmt) => self.lower_assign(stmt),
            Statement::MemberAssign(stmt) => self.lower_member_assign(stmt),
            Statement::LValueAssign(stmt) => self.lower_lvalue_assign(stmt),
            Statement::Return(stmt) => self.lower_return(stmt),
            Statement::Block(block) => self.lower_block(block),
            Statement::Expression(stmt) => {
                self.lower_expression(&stmt.expression);
            }
            Statement::If(stmt) => self.lower_if(stmt),
        }
    }

    fn lower_var_binding(&mut self, stmt: &VarBinding) {
        let declared_block = self.current_block;
        let declared_type = stmt
            .value
            .as_ref()
            .and_then(|e| e.resolved_type().cloned())
            .or_else(|| stmt.type_annotation.clone());
        let Some(ty) = declared_type else {
            return;
        };
        let alloca = self
            .function
            .append_value(declared_block, Instruction::alloca(ty, stmt.name.clone()));
        if let Some(expr) = &stmt.value {
            // `e` may open and close blocks of its own (e.g. a short-circuit
            // operator); the store belongs wherever lowering `e` left off,
            // not in the block the alloca was placed in.
            let value = self.lower_expression(expr);
            self.function.append_instruction(
                self.current_block,
                Instruction::Store {
                    address: alloca.clone(),
                    value,
                },
            );
        }
        self.variables.insert(stmt.name.clone(), alloca);
    }

    fn lower_assign(&mut self, stmt: &AssignStatement) {
        if let Some(target) = self.variables.get(&stmt.name).cloned() {
            let value = self.lower_expression(&stmt.value);
            self.store(target, value);
            return;
        }
        if let Some(field_ty) = self.self_field_type(&stmt.name) {
            if let Some(self_value) = self.self_param.clone() {
                let addr = self.function.append_value(
                    self.current_block,
                    Instruction::FieldAddress {
                        base: self_value,
                        field_path: vec![stmt.name.clone()],
                        result_type: Type::pointer_to(field_ty),
                    },
                );
                let value = self.lower_expression(&stmt.value);
                self.store(addr, value);
                return;
            }
        }
        self.lower_expression(&stmt.value);
    }

    fn lower_member_assign(&mut self, stmt: &MemberAssignStatement) {
        let Some(base) = self.variables.get(&stmt.base_name).cloned() else {
            self.lower_expression(&stmt.value);
            return;
        };
        let base_type = self.function.value_type(&base);
        let Some(pointee) = base_type.pointee().cloned() else {
            self.lower_expression(&stmt.value);
            return;
        };
        let leaf_type =
            resolve_field_path_type(&pointee, &stmt.member_path).unwrap_or_else(Type::fresh_unknown);
        let addr = self.function.append_value(
            self.current_block,
            Instruction::FieldAddress {
                base,
                field_path: stmt.member_path.clone(),
                result_type: Type::pointer_to(leaf_type),
            },
        );
        let value = self.lower_expression(&stmt.value);
        self.store(addr, value);
    }

    fn lower_lvalue_assign(&mut self, stmt: &LValueAssignStatement) {
        match self.address_of(&stmt.target) {
            Some(addr) => {
                let value = self.lower_expression(&stmt.value);
                self.store(addr, value);
            }
            None => {
                let ty = stmt
                    .target
                    .resolved_type()
                    .cloned()
                    .unwrap_or_else(Type::fresh_unknown);
                self.sink.nir_cannot_store(stmt.target.range(), ty);
                self.mark_degraded();
                self.lower_expression(&stmt.value);
            }
        }
    }

    fn lower_return(&mut self, stmt: &ReturnStatement) {
        let value = stmt.value.as_ref().map(|e| self.lower_expression(e));
        self.function
            .set_terminator(self.current_block, Terminator::Return(value));
    }

    pub(super) fn lower_if(&mut self, stmt: &IfStatement) {
        super::control_flow::lower_if(self, stmt);
    }
}
