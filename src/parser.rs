//! Recursive-descent parser.
//!
//! Works over a three-slot token window (current, peek, peek2). Block
//! structure comes from the lexer's line table: a child block's lines must
//! sit exactly one indent unit deeper than the parent's. Statements end at
//! line breaks via the implicit-terminator rule in [`Parser::meet_stmt_line_break`].

use crate::error::{self, Cursor, Diagnostic, SYNTAX_ERROR_CLASS};
use crate::lexer::token::{Token, TokenKind};
use crate::lexer::Lexer;

pub mod ast;

use ast::{
    BlockStmt, BranchStmt, ClassDeclareStmt, ExprBody, Expression, FunctionDeclareStmt,
    FunctionReturnStmt, GetterDeclareStmt, IterateStmt, LogicOp, MemberAccess, MemberExpr,
    MemberRoot, Program, PropertyDeclare, Statement, VarAssignPair, VarDeclareStmt,
    WhileLoopStmt,
};

pub struct Parser {
    lexer: Lexer,
    // [current, peek, peek2]
    tokens: [Token; 3],
    line_term_flag: bool,
}

impl Parser {
    pub fn new(lexer: Lexer) -> Self {
        Self {
            lexer,
            tokens: [Token::eof(0, 0), Token::eof(0, 0), Token::eof(0, 0)],
            line_term_flag: false,
        }
    }

    pub fn lexer(&self) -> &Lexer {
        &self.lexer
    }

    /// Parse the whole token stream into a program. After success the
    /// parser's peek token is EOF.
    pub fn parse(mut self) -> Result<(Program, Lexer), Diagnostic> {
        match self.parse_program() {
            Ok(program) => Ok((program, self.lexer)),
            Err(mut err) => {
                self.complete_cursor(&mut err);
                Err(err)
            }
        }
    }

    fn parse_program(&mut self) -> Result<Program, Diagnostic> {
        // advance twice to fill peek and peek2
        self.next()?;
        self.next()?;

        let peek_indent = self.peek_indent();
        let content = self.parse_block(peek_indent)?;

        if !matches!(self.peek().kind, TokenKind::Eof) {
            return Err(error::unexpected_eof());
        }
        Ok(Program { content })
    }

    /// Attach file/line/text to a syntax error, anchored on the peek or
    /// current token as its factory recorded.
    fn complete_cursor(&mut self, err: &mut Diagnostic) {
        if err.error_class() != SYNTAX_ERROR_CLASS {
            return;
        }
        let token = match err.info_value("cursor") {
            Some("current") => self.current().clone(),
            _ => self.peek().clone(),
        };
        self.lexer.fill_line_to_end();
        let line = token.range.start_line;
        let table = self.lexer.line_table();
        err.set_cursor(Cursor {
            file: self.lexer.file().to_string(),
            line_num: line,
            col_num: table.line_column(line, token.range.start_idx),
            text: table.line_text(line),
        });
    }

    //// token window

    fn next(&mut self) -> Result<(), Diagnostic> {
        let token = self.lexer.next_token()?;
        self.tokens.rotate_left(1);
        self.tokens[2] = token;
        Ok(())
    }

    fn current(&self) -> &Token {
        &self.tokens[0]
    }

    fn peek(&self) -> &Token {
        &self.tokens[1]
    }

    /// The virtual statement terminator: true when the peek token starts on
    /// a later line than the current token ends, unless the current token
    /// opens a continuation (，{ 【 ： ？) or the peek closes one (】 }).
    fn meet_stmt_line_break(&self) -> bool {
        let current = self.current();
        let peek = self.peek();

        if matches!(current.kind, TokenKind::Eof) || matches!(peek.kind, TokenKind::Eof) {
            return false;
        }
        if peek.range.start_line <= current.range.end_line {
            return false;
        }
        if matches!(
            current.kind,
            TokenKind::CommaSep
                | TokenKind::StmtQuoteL
                | TokenKind::ArrayQuoteL
                | TokenKind::FuncCall
                | TokenKind::FuncDeclare
        ) {
            return false;
        }
        if matches!(peek.kind, TokenKind::ArrayQuoteR | TokenKind::StmtQuoteR) {
            return false;
        }
        true
    }

    fn reset_line_term_flag(&mut self) {
        self.line_term_flag = false;
    }

    /// Consume the peek token if it matches; a line break in front of it
    /// ends the statement instead once the parser has committed to one.
    fn try_consume(&mut self, valid: &[TokenKind]) -> Result<Option<Token>, Diagnostic> {
        if self.meet_stmt_line_break() && self.line_term_flag {
            return Ok(None);
        }
        if valid.contains(&self.peek().kind) {
            let token = self.peek().clone();
            self.line_term_flag = true;
            self.next()?;
            return Ok(Some(token));
        }
        Ok(None)
    }

    fn consume(&mut self, valid: &[TokenKind]) -> Result<Token, Diagnostic> {
        if self.meet_stmt_line_break() && self.line_term_flag {
            return Err(error::invalid_syntax_curr());
        }
        if valid.contains(&self.peek().kind) {
            let token = self.peek().clone();
            self.line_term_flag = true;
            self.next()?;
            return Ok(token);
        }
        Err(error::invalid_syntax())
    }

    //// indent helpers

    fn line_indent_of(&self, line: usize) -> usize {
        self.lexer.line_table().line_indent(line).unwrap_or(0)
    }

    fn peek_indent(&self) -> usize {
        self.line_indent_of(self.peek().range.start_line)
    }

    /// A child block must sit at exactly parent indent + 1.
    fn expect_block_indent(&self) -> Result<usize, Diagnostic> {
        let curr_indent = self.line_indent_of(self.current().range.start_line);
        let peek_indent = self.peek_indent();
        if peek_indent == curr_indent + 1 {
            Ok(peek_indent)
        } else {
            Err(error::unexpected_indent())
        }
    }

    //// statements

    fn parse_block(&mut self, expected_indent: usize) -> Result<BlockStmt, Diagnostic> {
        let mut block = BlockStmt::default();
        loop {
            if matches!(self.peek().kind, TokenKind::Eof) {
                break;
            }
            let indent = self.peek_indent();
            if indent < expected_indent {
                break;
            }
            if indent > expected_indent {
                return Err(error::unexpected_indent());
            }
            block.children.push(self.parse_statement(expected_indent)?);
        }
        Ok(block)
    }

    fn parse_statement(&mut self, indent: usize) -> Result<Statement, Diagnostic> {
        self.reset_line_term_flag();
        match self.peek().kind {
            TokenKind::StmtSep | TokenKind::Comment => {
                self.next()?;
                Ok(Statement::Empty)
            }
            TokenKind::DeclareW => self.parse_var_declare(),
            TokenKind::ReturnW => self.parse_return(),
            TokenKind::CondW => self.parse_branch(indent),
            TokenKind::WhileLoopW => self.parse_while(),
            TokenKind::VarOneW | TokenKind::IteratorW => self.parse_iterate(),
            TokenKind::FuncW => Ok(Statement::FunctionDeclare(self.parse_function_declare()?)),
            TokenKind::ObjDefineW => self.parse_class_declare(),
            // dangling clause keywords never start a statement
            TokenKind::CondOtherW | TokenKind::CondElseW => Err(error::invalid_syntax()),
            _ => {
                let expr = self.parse_expression(false)?;
                Ok(Statement::Expr(expr))
            }
        }
    }

    /// A declared name is an identifier or a var-quoted identifier.
    fn parse_declared_name(&mut self) -> Result<String, Diagnostic> {
        let token = self.consume(&[TokenKind::Identifier, TokenKind::VarQuote])?;
        Ok(token.literal)
    }

    fn parse_var_declare(&mut self) -> Result<Statement, Diagnostic> {
        let declare = self.consume(&[TokenKind::DeclareW])?;
        let line = declare.range.start_line;

        // 令： block form groups one pair per line
        if self.try_consume(&[TokenKind::FuncCall])?.is_some() {
            let block_indent = self.expect_block_indent()?;
            let mut pairs = Vec::new();
            loop {
                if matches!(self.peek().kind, TokenKind::Eof) {
                    break;
                }
                if self.peek_indent() != block_indent {
                    break;
                }
                self.reset_line_term_flag();
                pairs.push(self.parse_var_pair()?);
            }
            return Ok(Statement::VarDeclare(VarDeclareStmt { line, pairs }));
        }

        let pair = self.parse_var_pair()?;
        Ok(Statement::VarDeclare(VarDeclareStmt {
            line,
            pairs: vec![pair],
        }))
    }

    fn parse_var_pair(&mut self) -> Result<VarAssignPair, Diagnostic> {
        let mut names = vec![self.parse_declared_name()?];
        while self.try_consume(&[TokenKind::CommaSep])?.is_some() {
            names.push(self.parse_declared_name()?);
        }

        if self.try_consume(&[TokenKind::LogicYesW])?.is_some() {
            let expr = self.parse_expression(false)?;
            return Ok(VarAssignPair::Assign {
                names,
                expr,
                is_const: false,
            });
        }
        if self.try_consume(&[TokenKind::AssignConstW])?.is_some() {
            let expr = self.parse_expression(false)?;
            return Ok(VarAssignPair::Assign {
                names,
                expr,
                is_const: true,
            });
        }
        if self.try_consume(&[TokenKind::ObjNewW])?.is_some() {
            let class = self.parse_declared_name()?;
            let mut params = Vec::new();
            if self.try_consume(&[TokenKind::FuncCall])?.is_some() {
                params.push(self.parse_expression(false)?);
                while self.try_consume(&[TokenKind::CommaSep])?.is_some() {
                    params.push(self.parse_expression(false)?);
                }
            }
            return Ok(VarAssignPair::ObjNew {
                names,
                class,
                params,
            });
        }
        Err(error::invalid_syntax())
    }

    fn parse_return(&mut self) -> Result<Statement, Diagnostic> {
        let ret = self.consume(&[TokenKind::ReturnW])?;
        let expr = self.parse_expression(false)?;
        Ok(Statement::Return(FunctionReturnStmt {
            line: ret.range.start_line,
            expr,
        }))
    }

    fn parse_while(&mut self) -> Result<Statement, Diagnostic> {
        let head = self.consume(&[TokenKind::WhileLoopW])?;
        let condition = self.parse_expression(true)?;
        self.consume(&[TokenKind::FuncCall])?;
        let body = self.parse_sub_block()?;
        Ok(Statement::While(WhileLoopStmt {
            line: head.range.start_line,
            condition,
            body,
        }))
    }

    fn parse_branch(&mut self, indent: usize) -> Result<Statement, Diagnostic> {
        let head = self.consume(&[TokenKind::CondW])?;
        let if_expr = self.parse_expression(true)?;
        self.consume(&[TokenKind::FuncCall])?;
        let if_block = self.parse_sub_block()?;

        let mut other_exprs = Vec::new();
        let mut other_blocks = Vec::new();
        loop {
            if !matches!(self.peek().kind, TokenKind::CondOtherW) || self.peek_indent() != indent {
                break;
            }
            self.reset_line_term_flag();
            self.consume(&[TokenKind::CondOtherW])?;
            other_exprs.push(self.parse_expression(true)?);
            self.consume(&[TokenKind::FuncCall])?;
            other_blocks.push(self.parse_sub_block()?);
        }

        let mut else_block = None;
        if matches!(self.peek().kind, TokenKind::CondElseW) && self.peek_indent() == indent {
            self.reset_line_term_flag();
            self.consume(&[TokenKind::CondElseW])?;
            self.consume(&[TokenKind::FuncCall])?;
            else_block = Some(self.parse_sub_block()?);
        }

        Ok(Statement::Branch(BranchStmt {
            line: head.range.start_line,
            if_expr,
            if_block,
            other_exprs,
            other_blocks,
            else_block,
        }))
    }

    fn parse_iterate(&mut self) -> Result<Statement, Diagnostic> {
        let line = self.peek().range.start_line;
        let mut names = Vec::new();
        if self.try_consume(&[TokenKind::VarOneW])?.is_some() {
            names.push(self.parse_declared_name()?);
            while self.try_consume(&[TokenKind::CommaSep])?.is_some() {
                names.push(self.parse_declared_name()?);
            }
        }
        self.consume(&[TokenKind::IteratorW])?;
        let target = self.parse_expression(false)?;
        self.consume(&[TokenKind::FuncCall])?;
        let body = self.parse_sub_block()?;
        Ok(Statement::Iterate(IterateStmt {
            line,
            names,
            target,
            body,
        }))
    }

    fn parse_function_declare(&mut self) -> Result<FunctionDeclareStmt, Diagnostic> {
        let head = self.consume(&[TokenKind::FuncW])?;
        let name = self.parse_declared_name()?;
        self.consume(&[TokenKind::FuncDeclare])?;

        let block_indent = self.expect_block_indent()?;
        // optional first statement: 已知 P1，P2 declares parameters
        let mut params = Vec::new();
        if matches!(self.peek().kind, TokenKind::ParamAssignW) {
            self.reset_line_term_flag();
            self.consume(&[TokenKind::ParamAssignW])?;
            params.push(self.parse_declared_name()?);
            while self.try_consume(&[TokenKind::CommaSep])?.is_some() {
                params.push(self.parse_declared_name()?);
            }
        }
        let body = self.parse_block(block_indent)?;

        Ok(FunctionDeclareStmt {
            line: head.range.start_line,
            name,
            params,
            body,
        })
    }

    fn parse_getter_declare(&mut self) -> Result<GetterDeclareStmt, Diagnostic> {
        let head = self.consume(&[TokenKind::GetterW])?;
        let name = self.parse_declared_name()?;
        self.consume(&[TokenKind::FuncDeclare])?;
        let body = self.parse_sub_block()?;
        Ok(GetterDeclareStmt {
            line: head.range.start_line,
            name,
            body,
        })
    }

    fn parse_class_declare(&mut self) -> Result<Statement, Diagnostic> {
        let head = self.consume(&[TokenKind::ObjDefineW])?;
        let name = self.parse_declared_name()?;
        self.consume(&[TokenKind::FuncCall])?;
        let block_indent = self.expect_block_indent()?;

        let mut properties = Vec::new();
        let mut constructor_ids = Vec::new();
        let mut methods = Vec::new();
        let mut getters = Vec::new();

        loop {
            if matches!(self.peek().kind, TokenKind::Eof) {
                break;
            }
            if self.peek_indent() != block_indent {
                break;
            }
            self.reset_line_term_flag();
            match self.peek().kind {
                TokenKind::Comment | TokenKind::StmtSep => {
                    self.next()?;
                }
                TokenKind::ObjThisW => {
                    self.consume(&[TokenKind::ObjThisW])?;
                    let prop_name = self.parse_declared_name()?;
                    self.consume(&[TokenKind::LogicYesW])?;
                    let init = self.parse_expression(false)?;
                    properties.push(PropertyDeclare {
                        name: prop_name,
                        init,
                    });
                }
                TokenKind::ObjConstructW => {
                    self.consume(&[TokenKind::ObjConstructW])?;
                    constructor_ids.push(self.parse_declared_name()?);
                    while self.try_consume(&[TokenKind::CommaSep])?.is_some() {
                        constructor_ids.push(self.parse_declared_name()?);
                    }
                }
                TokenKind::FuncW => methods.push(self.parse_function_declare()?),
                TokenKind::GetterW => getters.push(self.parse_getter_declare()?),
                _ => return Err(error::invalid_syntax()),
            }
        }

        Ok(Statement::ClassDeclare(ClassDeclareStmt {
            line: head.range.start_line,
            name,
            properties,
            constructor_ids,
            methods,
            getters,
        }))
    }

    fn parse_sub_block(&mut self) -> Result<BlockStmt, Diagnostic> {
        let block_indent = self.expect_block_indent()?;
        self.parse_block(block_indent)
    }

    //// expressions
    //
    // precedence, loose to tight:  或  <  且  <  comparison / assignment
    // over member chains over primaries. Inside 如果/再如/每当 conditions
    // (`in_condition`), 为 reads as the EQ comparison; elsewhere it is the
    // assignment expression.

    fn parse_expression(&mut self, in_condition: bool) -> Result<Expression, Diagnostic> {
        self.parse_logic_or(in_condition)
    }

    fn parse_logic_or(&mut self, in_condition: bool) -> Result<Expression, Diagnostic> {
        let mut left = self.parse_logic_and(in_condition)?;
        while self.try_consume(&[TokenKind::LogicOrW])?.is_some() {
            let right = self.parse_logic_and(in_condition)?;
            left = Expression {
                line: left.line,
                body: ExprBody::Logic {
                    op: LogicOp::Or,
                    left: Box::new(left),
                    right: Box::new(right),
                },
            };
        }
        Ok(left)
    }

    fn parse_logic_and(&mut self, in_condition: bool) -> Result<Expression, Diagnostic> {
        let mut left = self.parse_logic_item(in_condition)?;
        while self.try_consume(&[TokenKind::LogicAndW])?.is_some() {
            let right = self.parse_logic_item(in_condition)?;
            left = Expression {
                line: left.line,
                body: ExprBody::Logic {
                    op: LogicOp::And,
                    left: Box::new(left),
                    right: Box::new(right),
                },
            };
        }
        Ok(left)
    }

    fn parse_logic_item(&mut self, in_condition: bool) -> Result<Expression, Diagnostic> {
        let left = self.parse_member_chain()?;

        let cmp = self.try_consume(&[
            TokenKind::LogicEqualW,
            TokenKind::LogicNotEqW,
            TokenKind::LogicNotW,
            TokenKind::LogicGtW,
            TokenKind::LogicGteW,
            TokenKind::LogicLtW,
            TokenKind::LogicLteW,
            TokenKind::LogicYesW,
        ])?;
        let Some(op_token) = cmp else {
            return Ok(left);
        };

        let op = match op_token.kind {
            TokenKind::LogicEqualW => LogicOp::Eq,
            TokenKind::LogicNotEqW | TokenKind::LogicNotW => LogicOp::Neq,
            TokenKind::LogicGtW => LogicOp::Gt,
            TokenKind::LogicGteW => LogicOp::Gte,
            TokenKind::LogicLtW => LogicOp::Lt,
            TokenKind::LogicLteW => LogicOp::Lte,
            TokenKind::LogicYesW => {
                if in_condition {
                    LogicOp::Eq
                } else {
                    // assignment: target must be a name or member expression
                    if !matches!(left.body, ExprBody::Id(_) | ExprBody::Member(_)) {
                        return Err(error::expr_must_type_id());
                    }
                    let value = self.parse_expression(false)?;
                    return Ok(Expression {
                        line: left.line,
                        body: ExprBody::VarAssign {
                            target: Box::new(left),
                            value: Box::new(value),
                        },
                    });
                }
            }
            _ => return Err(error::invalid_syntax()),
        };

        let right = self.parse_member_chain()?;
        Ok(Expression {
            line: left.line,
            body: ExprBody::Logic {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
        })
    }

    /// Member chains: `之 NAME`, `之（方法：…）`, `#EXPR`, `#{EXPR}` applied
    /// left-associatively over a primary / 此之 / 其 root.
    fn parse_member_chain(&mut self) -> Result<Expression, Diagnostic> {
        let line = self.peek().range.start_line;

        let mut expr = if self.try_consume(&[TokenKind::StaticSelfW])?.is_some() {
            let access = self.parse_member_access()?;
            Expression {
                line,
                body: ExprBody::Member(MemberExpr {
                    root: MemberRoot::ThisScope,
                    access,
                }),
            }
        } else if self.try_consume(&[TokenKind::ObjThisW])?.is_some() {
            let name = self.parse_declared_name()?;
            Expression {
                line,
                body: ExprBody::Member(MemberExpr {
                    root: MemberRoot::ThisProp,
                    access: MemberAccess::Id(name),
                }),
            }
        } else {
            self.parse_primary()?
        };

        loop {
            if self.try_consume(&[TokenKind::ObjDotW])?.is_some() {
                let access = self.parse_member_access()?;
                expr = Expression {
                    line,
                    body: ExprBody::Member(MemberExpr {
                        root: MemberRoot::Expr(Box::new(expr)),
                        access,
                    }),
                };
            } else if self.try_consume(&[TokenKind::MapHash])?.is_some() {
                let index = self.parse_primary()?;
                expr = Expression {
                    line,
                    body: ExprBody::Member(MemberExpr {
                        root: MemberRoot::Expr(Box::new(expr)),
                        access: MemberAccess::Index(Box::new(index)),
                    }),
                };
            } else if self.try_consume(&[TokenKind::MapQHash])?.is_some() {
                let index = self.parse_expression(false)?;
                self.consume(&[TokenKind::StmtQuoteR])?;
                expr = Expression {
                    line,
                    body: ExprBody::Member(MemberExpr {
                        root: MemberRoot::Expr(Box::new(expr)),
                        access: MemberAccess::Index(Box::new(index)),
                    }),
                };
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn parse_member_access(&mut self) -> Result<MemberAccess, Diagnostic> {
        if matches!(self.peek().kind, TokenKind::FuncQuoteL) {
            let (name, params) = self.parse_func_call_body()?;
            return Ok(MemberAccess::MethodCall { name, params });
        }
        Ok(MemberAccess::Id(self.parse_declared_name()?))
    }

    fn parse_primary(&mut self) -> Result<Expression, Diagnostic> {
        let line = self.peek().range.start_line;
        match self.peek().kind {
            TokenKind::Number => {
                let token = self.consume(&[TokenKind::Number])?;
                Ok(Expression {
                    line,
                    body: ExprBody::Number(token.literal),
                })
            }
            TokenKind::String => {
                let token = self.consume(&[TokenKind::String])?;
                Ok(Expression {
                    line,
                    body: ExprBody::Str(strip_quotes(&token.literal)),
                })
            }
            TokenKind::Identifier | TokenKind::VarQuote => {
                let token = self.consume(&[TokenKind::Identifier, TokenKind::VarQuote])?;
                Ok(Expression {
                    line,
                    body: ExprBody::Id(token.literal),
                })
            }
            TokenKind::ArrayQuoteL => self.parse_array_or_hashmap(),
            TokenKind::FuncQuoteL => {
                let (name, params) = self.parse_func_call_body()?;
                Ok(Expression {
                    line,
                    body: ExprBody::FuncCall { name, params },
                })
            }
            TokenKind::StmtQuoteL => {
                self.consume(&[TokenKind::StmtQuoteL])?;
                let inner = self.parse_expression(false)?;
                self.consume(&[TokenKind::StmtQuoteR])?;
                Ok(inner)
            }
            _ => Err(error::invalid_syntax()),
        }
    }

    /// `【…】` — array and hashmap literals share the bracket pair; the
    /// first `==` decides which one it is, and mixing is an error.
    fn parse_array_or_hashmap(&mut self) -> Result<Expression, Diagnostic> {
        let open = self.consume(&[TokenKind::ArrayQuoteL])?;
        let line = open.range.start_line;

        if self.try_consume(&[TokenKind::MapData])?.is_some() {
            self.consume(&[TokenKind::ArrayQuoteR])?;
            return Ok(Expression {
                line,
                body: ExprBody::HashMap(Vec::new()),
            });
        }
        if self.try_consume(&[TokenKind::ArrayQuoteR])?.is_some() {
            return Ok(Expression {
                line,
                body: ExprBody::Array(Vec::new()),
            });
        }

        let first = self.parse_expression(false)?;
        if self.try_consume(&[TokenKind::MapData])?.is_some() {
            let value = self.parse_expression(false)?;
            let mut pairs = vec![(first, value)];
            while self.try_consume(&[TokenKind::CommaSep])?.is_some() {
                let key = self.parse_expression(false)?;
                if self.try_consume(&[TokenKind::MapData])?.is_none() {
                    return Err(error::mix_array_hashmap());
                }
                let value = self.parse_expression(false)?;
                pairs.push((key, value));
            }
            self.consume(&[TokenKind::ArrayQuoteR])?;
            return Ok(Expression {
                line,
                body: ExprBody::HashMap(pairs),
            });
        }

        let mut items = vec![first];
        while self.try_consume(&[TokenKind::CommaSep])?.is_some() {
            let item = self.parse_expression(false)?;
            if matches!(self.peek().kind, TokenKind::MapData) {
                return Err(error::mix_array_hashmap());
            }
            items.push(item);
        }
        self.consume(&[TokenKind::ArrayQuoteR])?;
        Ok(Expression {
            line,
            body: ExprBody::Array(items),
        })
    }

    /// `（NAME）` or `（NAME：A1，A2）`
    fn parse_func_call_body(&mut self) -> Result<(String, Vec<Expression>), Diagnostic> {
        self.consume(&[TokenKind::FuncQuoteL])?;
        let name = self.parse_declared_name()?;
        let mut params = Vec::new();
        if self.try_consume(&[TokenKind::FuncCall])?.is_some() {
            params.push(self.parse_expression(false)?);
            while self.try_consume(&[TokenKind::CommaSep])?.is_some() {
                params.push(self.parse_expression(false)?);
            }
        }
        self.consume(&[TokenKind::FuncQuoteR])?;
        Ok((name, params))
    }
}

fn strip_quotes(literal: &str) -> String {
    let chars: Vec<char> = literal.chars().collect();
    if chars.len() >= 2 {
        chars[1..chars.len() - 1].iter().collect()
    } else {
        literal.to_string()
    }
}

/// Convenience entry: lex and parse a source stream.
pub fn parse_source(input: crate::input::InputStream) -> Result<(Program, Lexer), Diagnostic> {
    let lexer = Lexer::new(input);
    Parser::new(lexer).parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::InputStream;
    use indoc::indoc;

    fn parse_ok(source: &str) -> Program {
        let (program, _) = parse_source(InputStream::from_text(source))
            .unwrap_or_else(|e| panic!("parse failed: {}", e.display()));
        program
    }

    fn parse_err(source: &str) -> Diagnostic {
        parse_source(InputStream::from_text(source))
            .map(|_| ())
            .expect_err("expected parse failure")
    }

    fn id(name: &str, line: usize) -> Expression {
        Expression {
            line,
            body: ExprBody::Id(name.to_string()),
        }
    }

    fn num(text: &str, line: usize) -> Expression {
        Expression {
            line,
            body: ExprBody::Number(text.to_string()),
        }
    }

    #[test]
    fn parses_inline_var_declare() {
        let program = parse_ok("令某变量为100");
        assert_eq!(
            program.content.children,
            vec![Statement::VarDeclare(VarDeclareStmt {
                line: 1,
                pairs: vec![VarAssignPair::Assign {
                    names: vec!["某变量".to_string()],
                    expr: num("100", 1),
                    is_const: false,
                }],
            })]
        );
    }

    #[test]
    fn parses_multi_name_and_const_declares() {
        let program = parse_ok("令变量1，变量2为100；令圆周率恒为3.1415926");
        let children = &program.content.children;
        assert_eq!(children.len(), 3); // declare ; declare
        match &children[0] {
            Statement::VarDeclare(decl) => match &decl.pairs[0] {
                VarAssignPair::Assign { names, is_const, .. } => {
                    assert_eq!(names, &vec!["变量1".to_string(), "变量2".to_string()]);
                    assert!(!is_const);
                }
                other => panic!("unexpected pair {other:?}"),
            },
            other => panic!("unexpected statement {other:?}"),
        }
        match &children[2] {
            Statement::VarDeclare(decl) => match &decl.pairs[0] {
                VarAssignPair::Assign { is_const, .. } => assert!(is_const),
                other => panic!("unexpected pair {other:?}"),
            },
            other => panic!("unexpected statement {other:?}"),
        }
    }

    #[test]
    fn parses_block_var_declare() {
        let program = parse_ok(indoc! {"
            令：
                A为1
                B，C为2
                D成为点：3，4
        "});
        match &program.content.children[0] {
            Statement::VarDeclare(decl) => {
                assert_eq!(decl.pairs.len(), 3);
                assert!(matches!(
                    &decl.pairs[2],
                    VarAssignPair::ObjNew { class, params, .. }
                        if class == "点" && params.len() == 2
                ));
            }
            other => panic!("unexpected statement {other:?}"),
        }
    }

    #[test]
    fn parses_nested_assignment_expression() {
        let program = parse_ok("令A为B为C");
        match &program.content.children[0] {
            Statement::VarDeclare(decl) => match &decl.pairs[0] {
                VarAssignPair::Assign { expr, .. } => {
                    assert!(matches!(expr.body, ExprBody::VarAssign { .. }));
                }
                other => panic!("unexpected pair {other:?}"),
            },
            other => panic!("unexpected statement {other:?}"),
        }
    }

    #[test]
    fn parses_branch_with_elseif_and_else() {
        let program = parse_ok(indoc! {"
            如果真：
                （X+Y：20，30）
            再如A为100：
                （显示）
            否则：
                （X-Y：20，30）
        "});
        match &program.content.children[0] {
            Statement::Branch(branch) => {
                assert_eq!(branch.other_exprs.len(), 1);
                // 为 inside a condition reads as EQ
                assert!(matches!(
                    branch.other_exprs[0].body,
                    ExprBody::Logic { op: LogicOp::Eq, .. }
                ));
                assert!(branch.else_block.is_some());
            }
            other => panic!("unexpected statement {other:?}"),
        }
    }

    #[test]
    fn parses_while_loop_with_comparison() {
        let program = parse_ok(indoc! {"
            每当X大于0：
                X为（X-Y：X，1）
        "});
        match &program.content.children[0] {
            Statement::While(stmt) => {
                assert!(matches!(
                    stmt.condition.body,
                    ExprBody::Logic { op: LogicOp::Gt, .. }
                ));
                assert_eq!(stmt.body.children.len(), 1);
            }
            other => panic!("unexpected statement {other:?}"),
        }
    }

    #[test]
    fn parses_function_declare_with_params() {
        let program = parse_ok(indoc! {"
            如何测试？
                已知X，Y
                （X+Y：X，Y）
        "});
        match &program.content.children[0] {
            Statement::FunctionDeclare(func) => {
                assert_eq!(func.name, "测试");
                assert_eq!(func.params, vec!["X".to_string(), "Y".to_string()]);
                assert_eq!(func.body.children.len(), 1);
            }
            other => panic!("unexpected statement {other:?}"),
        }
    }

    #[test]
    fn parses_iterate_forms() {
        let program = parse_ok(indoc! {"
            以K，V遍历表：
                （显示：K，V）
        "});
        match &program.content.children[0] {
            Statement::Iterate(stmt) => {
                assert_eq!(stmt.names, vec!["K".to_string(), "V".to_string()]);
                assert_eq!(stmt.target, id("表", 1));
            }
            other => panic!("unexpected statement {other:?}"),
        }

        let program = parse_ok(indoc! {"
            遍历【1，2】：
                此之（结束）
        "});
        match &program.content.children[0] {
            Statement::Iterate(stmt) => assert!(stmt.names.is_empty()),
            other => panic!("unexpected statement {other:?}"),
        }
    }

    #[test]
    fn parses_class_declaration() {
        let program = parse_ok(indoc! {"
            定义狗：
                其名为「小黄」
                其年龄为0

                是为名，年龄

                如何狂吠？
                    返回「汪汪汪」

                何为总和？
                    返回20
        "});
        match &program.content.children[0] {
            Statement::ClassDeclare(class) => {
                assert_eq!(class.name, "狗");
                assert_eq!(class.properties.len(), 2);
                assert_eq!(class.constructor_ids, vec!["名".to_string(), "年龄".to_string()]);
                assert_eq!(class.methods.len(), 1);
                assert_eq!(class.getters.len(), 1);
            }
            other => panic!("unexpected statement {other:?}"),
        }
    }

    #[test]
    fn parses_member_chains_left_associative() {
        let program = parse_ok("Array#10之首之（执行）");
        match &program.content.children[0] {
            Statement::Expr(Expression {
                body: ExprBody::Member(member),
                ..
            }) => {
                assert!(matches!(member.access, MemberAccess::MethodCall { .. }));
                let MemberRoot::Expr(inner) = &member.root else {
                    panic!("expected expression root");
                };
                let ExprBody::Member(inner_member) = &inner.body else {
                    panic!("expected nested member");
                };
                assert!(matches!(inner_member.access, MemberAccess::Id(_)));
            }
            other => panic!("unexpected statement {other:?}"),
        }
    }

    #[test]
    fn parses_this_scope_and_prop_roots() {
        let program = parse_ok("其年龄为20");
        match &program.content.children[0] {
            Statement::Expr(Expression {
                body: ExprBody::VarAssign { target, .. },
                ..
            }) => {
                let ExprBody::Member(member) = &target.body else {
                    panic!("expected member target");
                };
                assert_eq!(member.root, MemberRoot::ThisProp);
            }
            other => panic!("unexpected statement {other:?}"),
        }

        let program = parse_ok("此之（结束）#2");
        match &program.content.children[0] {
            Statement::Expr(Expression {
                body: ExprBody::Member(member),
                ..
            }) => {
                assert!(matches!(member.access, MemberAccess::Index(_)));
            }
            other => panic!("unexpected statement {other:?}"),
        }
    }

    #[test]
    fn parses_multi_line_collection_literals() {
        let program = parse_ok(indoc! {"
            令对象表为【
                1 == 「象」,
                2 == 「士」
            】
        "}.replace(',', "，").as_str());
        match &program.content.children[0] {
            Statement::VarDeclare(decl) => match &decl.pairs[0] {
                VarAssignPair::Assign { expr, .. } => {
                    assert!(matches!(&expr.body, ExprBody::HashMap(pairs) if pairs.len() == 2));
                }
                other => panic!("unexpected pair {other:?}"),
            },
            other => panic!("unexpected statement {other:?}"),
        }
    }

    #[test]
    fn parses_continuation_across_lines_after_comma() {
        let program = parse_ok(indoc! {"
            令树叶，鲜花，
                雪花为「黑」
        "});
        match &program.content.children[0] {
            Statement::VarDeclare(decl) => match &decl.pairs[0] {
                VarAssignPair::Assign { names, .. } => {
                    assert_eq!(names.len(), 3);
                }
                other => panic!("unexpected pair {other:?}"),
            },
            other => panic!("unexpected statement {other:?}"),
        }
    }

    #[test]
    fn rejects_mixed_array_and_hashmap_elements() {
        let err = parse_err("【100，100 == 200，300】");
        assert_eq!(err.code(), 0x2255);
    }

    #[test]
    fn rejects_statement_split_without_continuation() {
        let err = parse_err(indoc! {"
            令甲为
            100
        "});
        assert_eq!(err.error_class(), SYNTAX_ERROR_CLASS);
    }

    #[test]
    fn rejects_trailing_unparsed_lines() {
        // an indented line after the top block ends is unexpected
        let err = parse_err(indoc! {"
            （显示：甲）
                乙为2
        "});
        assert_eq!(err.error_class(), SYNTAX_ERROR_CLASS);
    }

    #[test]
    fn empty_statements_come_from_separators_and_comments() {
        let program = parse_ok("注：注释\n令A为1；");
        let children = &program.content.children;
        assert!(matches!(children[0], Statement::Empty));
        assert!(matches!(children[1], Statement::VarDeclare(_)));
        assert!(matches!(children[2], Statement::Empty));
    }

    #[test]
    fn syntax_error_cursor_names_file_and_line() {
        let err = parse_err("令甲为【1，2");
        let cursor = err.cursor().expect("cursor should be attached");
        assert_eq!(cursor.file, "$repl");
        assert_eq!(cursor.line_num, 1);
    }

    #[test]
    fn parser_finishes_at_eof() {
        let program = parse_ok(indoc! {"
            每当1：
                令A为B
        "});
        assert_eq!(program.content.children.len(), 1);
    }
}
