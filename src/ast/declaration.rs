use crate::ast::span::Range;
use crate::ast::statement::Block;
use crate::types::Type;

#[derive(Clone, Debug)]
pub struct Parameter {
    pub name: String,
    pub resolved_type: Option<Type>,
    pub range: Range,
}

#[derive(Clone, Debug)]
pub struct FunctionDeclaration {
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub body: Option<Block>,
    pub is_extern: bool,
    pub resolved_return_type: Option<Type>,
    pub range: Range,
}

#[derive(Clone, Debug)]
pub struct ExternDeclaration {
    pub name: String,
    pub range: Range,
}

#[derive(Clone, Debug)]
pub struct StructField {
    pub name: String,
    pub resolved_type: Option<Type>,
}

#[derive(Clone, Debug)]
pub struct StructDeclaration {
    pub name: String,
    pub fields: Vec<StructField>,
    pub methods: Vec<FunctionDeclaration>,
    pub range: Range,
}

#[derive(Clone, Debug)]
pub enum Declaration {
    Function(FunctionDeclaration),
    Extern(ExternDeclaration),
    Struct(StructDeclaration),
}
