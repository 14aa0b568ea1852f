//! A textual dump of a lowered function, useful for tests and for anyone
//! eyeballing what the lowerer produced. Not a parseable format — value
//! names are assigned at print time and carry no meaning elsewhere.

use std::collections::HashMap;
use std::fmt::{self, Display};

use crate::nir::function::NIRFunction;
use crate::nir::value::{BlockId, InstId, Instruction, NIRValue, Terminator};

struct Namer {
    params: HashMap<(BlockId, usize), String>,
    insts: HashMap<InstId, String>,
}

impl Namer {
    fn build(function: &NIRFunction) -> Self {
        let mut params = HashMap::new();
        let mut insts = HashMap::new();
        let mut next = 0usize;
        for (block_index, block) in function.blocks().iter().enumerate() {
            let block_id = BlockId(block_index);
            for index in 0..block.parameters.len() {
                params.insert((block_id, index), format!("%{next}"));
                next += 1;
            }
            for &inst_id in block.instruction_ids() {
                if function.instruction(inst_id).result_type().is_some() {
                    insts.insert(inst_id, format!("%{next}"));
                    next += 1;
                }
            }
        }
        Namer { params, insts }
    }

    fn name(&self, value: &NIRValue) -> String {
        match value {
            NIRValue::BlockParameter { block, index, .. } => self
                .params
                .get(&(*block, *index))
                .cloned()
                .unwrap_or_else(|| "%?".to_string()),
            NIRValue::Instruction(id) => self
                .insts
                .get(id)
                .cloned()
                .unwrap_or_else(|| "%?".to_string()),
            NIRValue::Constant(ty, lit) => format!("{lit:?}:{ty}"),
            NIRValue::Undef(ty) => format!("undef:{ty}"),
        }
    }
}

impl Display for NIRFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let namer = Namer::build(self);
        let params = self
            .param_types
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(f, "fn {}({}) -> {} {{", self.name, params, self.return_type)?;
        for (block_index, block) in self.blocks().iter().enumerate() {
            let block_id = BlockId(block_index);
            let block_params = block
                .parameters
                .iter()
                .enumerate()
                .map(|(index, ty)| {
                    format!(
                        "{}: {ty}",
                        namer
                            .params
                            .get(&(block_id, index))
                            .cloned()
                            .unwrap_or_default()
                    )
                })
                .collect::<Vec<_>>()
                .join(", ");
            writeln!(f, "{}({}):", block.name, block_params)?;
            for &inst_id in block.instruction_ids() {
                writeln!(f, "  {}", format_instruction(self, &namer, inst_id))?;
            }
            match &block.terminator {
                Some(term) => writeln!(f, "  {}", format_terminator(self, &namer, term))?,
                None => writeln!(f, "  <no terminator>")?,
            }
        }
        write!(f, "}}")
    }
}

fn result_prefix(namer: &Namer, inst_id: InstId, inst: &Instruction) -> String {
    match inst.result_type() {
        Some(_) => format!("{} = ", namer.insts.get(&inst_id).cloned().unwrap_or_default()),
        None => String::new(),
    }
}

fn format_instruction(function: &NIRFunction, namer: &Namer, inst_id: InstId) -> String {
    let inst = function.instruction(inst_id);
    let prefix = result_prefix(namer, inst_id, inst);
    match inst {
        Instruction::Alloca {
            allocated_type,
            name,
            ..
        } => format!("{prefix}alloca {allocated_type}, \"{name}\""),
        Instruction::Load { address, .. } => format!("{prefix}load {}", namer.name(address)),
        Instruction::Store { address, value } => {
            format!("store {}, {}", namer.name(address), namer.name(value))
        }
        Instruction::FieldAddress {
            base, field_path, ..
        } => format!(
            "{prefix}field_addr {}, {}",
            namer.name(base),
            field_path.join(".")
        ),
        Instruction::FieldExtract {
            base, field_name, ..
        } => format!("{prefix}field_extract {}, {field_name}", namer.name(base)),
        Instruction::BinaryOp {
            op, left, right, ..
        } => format!(
            "{prefix}{:?} {}, {}",
            op,
            namer.name(left),
            namer.name(right)
        ),
        Instruction::UnaryOp { op, operand, .. } => {
            format!("{prefix}{:?} {}", op, namer.name(operand))
        }
        Instruction::Cast { value, result_type } => {
            format!("{prefix}cast {} to {result_type}", namer.name(value))
        }
        Instruction::Call { callee, args, .. } => format!(
            "{prefix}call {callee}({})",
            args.iter()
                .map(|a| namer.name(a))
                .collect::<Vec<_>>()
                .join(", ")
        ),
    }
}

fn format_terminator(function: &NIRFunction, namer: &Namer, term: &Terminator) -> String {
    match term {
        Terminator::Return(None) => "return".to_string(),
        Terminator::Return(Some(value)) => format!("return {}", namer.name(value)),
        Terminator::Jump { target, args } => {
            format!(
                "jump {}({})",
                function.block(*target).name,
                args.iter()
                    .map(|a| namer.name(a))
                    .collect::<Vec<_>>()
                    .join(", ")
            )
        }
        Terminator::Branch {
            condition,
            true_target,
            true_args,
            false_target,
            false_args,
        } => format!(
            "branch {}, {}({}), {}({})",
            namer.name(condition),
            function.block(*true_target).name,
            true_args
                .iter()
                .map(|a| namer.name(a))
                .collect::<Vec<_>>()
                .join(", "),
            function.block(*false_target).name,
            false_args
                .iter()
                .map(|a| namer.name(a))
                .collect::<Vec<_>>()
                .join(", "),
        ),
    }
}
