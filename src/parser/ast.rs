//! AST node types produced by the parser.
//!
//! Statements carry the source line of their first token so the evaluator
//! can localize runtime diagnostics; expressions do the same.

/// Root node owning the program's top-level block.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub content: BlockStmt,
}

/// Ordered sequence of statements at one indent level.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BlockStmt {
    pub children: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    VarDeclare(VarDeclareStmt),
    While(WhileLoopStmt),
    Branch(BranchStmt),
    Iterate(IterateStmt),
    FunctionDeclare(FunctionDeclareStmt),
    ClassDeclare(ClassDeclareStmt),
    Return(FunctionReturnStmt),
    Expr(Expression),
    Empty,
}

/// `令 …` — one statement may bind several name groups (block form).
#[derive(Debug, Clone, PartialEq)]
pub struct VarDeclareStmt {
    pub line: usize,
    pub pairs: Vec<VarAssignPair>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum VarAssignPair {
    /// `A，B 为 EXPR` / `A，B 恒为 EXPR`
    Assign {
        names: Vec<String>,
        expr: Expression,
        is_const: bool,
    },
    /// `A，B 成为 类：P1，P2`
    ObjNew {
        names: Vec<String>,
        class: String,
        params: Vec<Expression>,
    },
}

/// `每当 EXPR ：BLOCK`
#[derive(Debug, Clone, PartialEq)]
pub struct WhileLoopStmt {
    pub line: usize,
    pub condition: Expression,
    pub body: BlockStmt,
}

/// `如果 … (再如 …)* (否则 …)?`
#[derive(Debug, Clone, PartialEq)]
pub struct BranchStmt {
    pub line: usize,
    pub if_expr: Expression,
    pub if_block: BlockStmt,
    pub other_exprs: Vec<Expression>,
    pub other_blocks: Vec<BlockStmt>,
    pub else_block: Option<BlockStmt>,
}

/// `[以 K[，V]] 遍历 EXPR ：BLOCK`
#[derive(Debug, Clone, PartialEq)]
pub struct IterateStmt {
    pub line: usize,
    pub names: Vec<String>,
    pub target: Expression,
    pub body: BlockStmt,
}

/// `如何 NAME ？ [已知 P1，P2] BLOCK`
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDeclareStmt {
    pub line: usize,
    pub name: String,
    pub params: Vec<String>,
    pub body: BlockStmt,
}

/// `何为 NAME ？ BLOCK` — zero-argument computed member, class body only.
#[derive(Debug, Clone, PartialEq)]
pub struct GetterDeclareStmt {
    pub line: usize,
    pub name: String,
    pub body: BlockStmt,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDeclare {
    pub name: String,
    pub init: Expression,
}

/// `定义 NAME ：` followed by properties, constructor ids, methods, getters.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDeclareStmt {
    pub line: usize,
    pub name: String,
    pub properties: Vec<PropertyDeclare>,
    pub constructor_ids: Vec<String>,
    pub methods: Vec<FunctionDeclareStmt>,
    pub getters: Vec<GetterDeclareStmt>,
}

/// `返回 EXPR`
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionReturnStmt {
    pub line: usize,
    pub expr: Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub line: usize,
    pub body: ExprBody,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprBody {
    /// Number literal kept as scanned text; the value core parses it.
    Number(String),
    /// String literal content (outer quote pair stripped).
    Str(String),
    Id(String),
    Array(Vec<Expression>),
    /// Ordered key-value pairs.
    HashMap(Vec<(Expression, Expression)>),
    FuncCall {
        name: String,
        params: Vec<Expression>,
    },
    Logic {
        op: LogicOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    VarAssign {
        target: Box<Expression>,
        value: Box<Expression>,
    },
    Member(MemberExpr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicOp {
    And,
    Or,
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
}

/// A member expression: root · access, chains are left-associative.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberExpr {
    pub root: MemberRoot,
    pub access: MemberAccess,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MemberRoot {
    Expr(Box<Expression>),
    /// `此之 …` — resolves against the enclosing loop scope.
    ThisScope,
    /// `其 …` — resolves against the enclosing function's receiver.
    ThisProp,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MemberAccess {
    Id(String),
    MethodCall {
        name: String,
        params: Vec<Expression>,
    },
    Index(Box<Expression>),
}
