use crate::nir::value::{BlockId, InstId, Instruction, NIRValue, Terminator};
use crate::types::Type;

/// One block of straight-line code. Block parameters stand in for phi nodes:
/// a jump or branch into a block supplies one argument per parameter, and
/// every predecessor must agree on the block's parameter list.
pub struct BasicBlock {
    pub name: String,
    pub parameters: Vec<Type>,
    instruction_ids: Vec<InstId>,
    pub terminator: Option<Terminator>,
}

impl BasicBlock {
    pub fn instruction_ids(&self) -> &[InstId] {
        &self.instruction_ids
    }

    pub fn is_closed(&self) -> bool {
        self.terminator.is_some()
    }
}

/// A lowered function: one or more basic blocks, the first of which is the
/// entry block, sharing one flat instruction arena.
///
/// Instructions and block parameters are addressed by index rather than by
/// reference so that a `NIRValue` can be copied freely while lowering without
/// fighting the borrow checker over the block or function it came from.
pub struct NIRFunction {
    pub name: String,
    pub param_types: Vec<Type>,
    pub return_type: Type,
    blocks: Vec<BasicBlock>,
    instructions: Vec<Instruction>,
}

impl NIRFunction {
    /// Creates the function together with its entry block, minting one
    /// `NIRValue::BlockParameter` per declared parameter type, in order.
    pub fn new(
        name: impl Into<String>,
        param_types: Vec<Type>,
        return_type: Type,
    ) -> (Self, BlockId, Vec<NIRValue>) {
        let mut function = NIRFunction {
            name: name.into(),
            param_types: param_types.clone(),
            return_type,
            blocks: Vec::new(),
            instructions: Vec::new(),
        };
        let (entry, params) = function.create_block("entry", param_types);
        (function, entry, params)
    }

    pub fn entry_block_id(&self) -> BlockId {
        BlockId(0)
    }

    pub fn blocks(&self) -> &[BasicBlock] {
        &self.blocks
    }

    pub fn block(&self, id: BlockId) -> &BasicBlock {
        &self.blocks[id.0]
    }

    fn block_mut(&mut self, id: BlockId) -> &mut BasicBlock {
        &mut self.blocks[id.0]
    }

    pub fn instruction(&self, id: InstId) -> &Instruction {
        &self.instructions[id.0]
    }

    /// Creates a new block and mints its parameter values immediately, so
    /// the caller can wire them into the lowering of statements that follow
    /// before any jump targeting this block exists yet.
    pub fn create_block(
        &mut self,
        name: impl Into<String>,
        parameter_types: Vec<Type>,
    ) -> (BlockId, Vec<NIRValue>) {
        let id = BlockId(self.blocks.len());
        let params = parameter_types
            .iter()
            .enumerate()
            .map(|(index, ty)| NIRValue::BlockParameter {
                block: id,
                index,
                ty: ty.clone(),
            })
            .collect();
        self.blocks.push(BasicBlock {
            name: name.into(),
            parameters: parameter_types,
            instruction_ids: Vec::new(),
            terminator: None,
        });
        (id, params)
    }

    /// Appends an instruction to `block` and returns its id. Panics if the
    /// block is already closed — the lowerer never has a reason to append
    /// past a terminator.
    pub fn append_instruction(&mut self, block: BlockId, inst: Instruction) -> InstId {
        assert!(
            !self.block(block).is_closed(),
            "cannot append an instruction to a block that already has a terminator"
        );
        let id = InstId(self.instructions.len());
        self.instructions.push(inst);
        self.block_mut(block).instruction_ids.push(id);
        id
    }

    /// Like `append_instruction`, but for instructions that produce a value.
    /// Panics if `inst` has no result type (i.e. is a `Store`).
    pub fn append_value(&mut self, block: BlockId, inst: Instruction) -> NIRValue {
        assert!(
            inst.result_type().is_some(),
            "append_value called with a void instruction"
        );
        let id = self.append_instruction(block, inst);
        NIRValue::Instruction(id)
    }

    /// Closes `block` with `terminator`. Panics if the block already has a
    /// terminator, or if a jump/branch target's parameter list doesn't match
    /// the supplied arguments in count and type — both are contract
    /// violations on the lowerer's part, not something a caller recovers
    /// from.
    pub fn set_terminator(&mut self, block: BlockId, terminator: Terminator) {
        assert!(
            !self.block(block).is_closed(),
            "block already has a terminator"
        );
        match &terminator {
            Terminator::Return(_) => {}
            Terminator::Jump { target, args } => self.validate_branch_args(*target, args),
            Terminator::Branch {
                true_target,
                true_args,
                false_target,
                false_args,
                ..
            } => {
                self.validate_branch_args(*true_target, true_args);
                self.validate_branch_args(*false_target, false_args);
            }
        }
        self.block_mut(block).terminator = Some(terminator);
    }

    fn validate_branch_args(&self, target: BlockId, args: &[NIRValue]) {
        let params = &self.block(target).parameters;
        assert_eq!(
            params.len(),
            args.len(),
            "branch into block {:?} supplies {} argument(s) for {} parameter(s)",
            target,
            args.len(),
            params.len()
        );
        for (param_ty, arg) in params.iter().zip(args.iter()) {
            let arg_ty = self.value_type(arg);
            assert!(
                arg_ty.same_type(param_ty) || arg_ty.implicitly_convertible(param_ty),
                "branch into block {:?} passes {:?} for a {:?} parameter",
                target,
                arg_ty,
                param_ty
            );
        }
    }

    /// Resolves the static type of any value reachable from this function.
    pub fn value_type(&self, value: &NIRValue) -> Type {
        match value {
            NIRValue::BlockParameter { ty, .. } => ty.clone(),
            NIRValue::Instruction(id) => self
                .instruction(*id)
                .result_type()
                .expect("instruction referenced as a value has no result type"),
            NIRValue::Constant(ty, _) => ty.clone(),
            NIRValue::Undef(ty) => ty.clone(),
        }
    }

    /// A function is well-formed only once every block it owns has a
    /// terminator. Used by the driver as a cheap sanity check after
    /// lowering a function body, before handing the result to the caller.
    pub fn is_well_formed(&self) -> bool {
        !self.blocks.is_empty() && self.blocks.iter().all(BasicBlock::is_closed)
    }
}
