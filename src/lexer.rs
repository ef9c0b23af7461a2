//! Indent-aware lexer.
//!
//! Scans a char stream into tokens while recording, per physical line, the
//! indent count and absolute char range (the line table). Strings nest
//! through a bounded quote stack, comments are emitted as tokens so
//! downstream tools can render them, and identifiers may embed whitespace
//! between their chars.

use crate::error::{self, Cursor, Diagnostic, IO_ERROR_CLASS};
use crate::input::InputStream;

pub mod line;
pub mod token;

use line::{IndentKind, LineTable};
use token::{
    Token, TokenKind, TokenRange, CR, EOF_CHAR, GLYPH_ZHU, LF, MIDDLE_DOT, SP, TAB,
};

const DEFAULT_BLOCK_SIZE: usize = 512;
const QUOTE_STACK_MAX: usize = 32;

pub struct Lexer {
    input: InputStream,
    line_table: LineTable,
    quote_stack: Vec<char>,
    ch_buffer: Vec<char>,
    cursor: isize,
    block_size: usize,
    begin_lex: bool,
}

impl Lexer {
    pub fn new(input: InputStream) -> Self {
        Self {
            input,
            line_table: LineTable::new(),
            quote_stack: Vec::new(),
            ch_buffer: Vec::new(),
            cursor: -1,
            block_size: DEFAULT_BLOCK_SIZE,
            begin_lex: true,
        }
    }

    pub fn file(&self) -> &str {
        self.input.file()
    }

    pub fn line_table(&self) -> &LineTable {
        &self.line_table
    }

    pub fn current_line(&self) -> usize {
        self.line_table.current_line()
    }

    /// Parse and emit the next token (comments included). On failure the
    /// diagnostic leaves here with a completed cursor.
    pub fn next_token(&mut self) -> Result<Token, Diagnostic> {
        match self.next_token_inner() {
            Ok(token) => Ok(token),
            Err(mut err) => {
                self.attach_cursor(&mut err);
                Err(err)
            }
        }
    }

    fn next_token_inner(&mut self) -> Result<Token, Diagnostic> {
        // The first line never passes a line break, so mark its indent
        // stage explicitly when it starts without SP/TAB.
        if self.begin_lex {
            self.begin_lex = false;
            if !matches!(self.peek()?, SP | TAB | EOF_CHAR) {
                self.line_table.set_indent(0, IndentKind::Unknown)?;
            }
        }

        loop {
            let ch = self.next_ch()?;
            match ch {
                EOF_CHAR => {
                    self.line_table.push_line(self.index());
                    return Ok(Token::eof(self.current_line(), self.index()));
                }
                SP | TAB => {
                    if self.line_table.on_indent_stage() {
                        self.parse_indents(ch)?;
                    } else {
                        self.consume_white_space()?;
                    }
                }
                CR | LF => {
                    self.parse_crlf(ch)?;
                }
                GLYPH_ZHU => {
                    // possibly a comment lead; fall back to identifier
                    let saved = self.cursor;
                    let range = self.token_range();
                    let (is_comment, is_multi_line, note) = self.validate_comment()?;
                    if is_comment {
                        return self.parse_comment(is_multi_line, &note, range);
                    }
                    self.rebase(saved);
                    return self.parse_identifier(ch);
                }
                _ if token::is_left_quote(ch) => return self.parse_string(ch),
                MIDDLE_DOT => return self.parse_var_quote(),
                _ => {
                    if token::is_white_space(ch) {
                        self.consume_white_space()?;
                        continue;
                    }
                    if token::is_digit(ch) || matches!(ch, '.' | '+' | '-') {
                        return self.parse_number(ch);
                    }
                    if token::MARK_LEADS.contains(&ch) {
                        return self.parse_markers(ch);
                    }
                    if let Some(token) = self.parse_keyword(ch, true)? {
                        return Ok(token);
                    }
                    return self.parse_identifier(ch);
                }
            }
        }
    }

    fn attach_cursor(&mut self, err: &mut Diagnostic) {
        if err.error_class() == IO_ERROR_CLASS {
            // line end may be unreachable, use what the buffer holds
            err.set_cursor(Cursor {
                file: self.input.file().to_string(),
                line_num: self.current_line(),
                col_num: 0,
                text: self.line_table.line_text(self.current_line()),
            });
        } else {
            self.fill_line_to_end();
            err.set_cursor(Cursor {
                file: self.input.file().to_string(),
                line_num: self.current_line(),
                col_num: self.line_table.line_column(self.current_line(), self.index()),
                text: self.line_table.line_text(self.current_line()),
            });
        }
    }

    //// cursor movement

    fn ensure_buffered(&mut self, upto: isize) -> Result<(), Diagnostic> {
        while upto + 1 >= self.line_table.buffer_len() as isize && !self.input.at_end() {
            let chunk = self.input.read(self.block_size)?;
            self.line_table.append_buffer(&chunk);
        }
        Ok(())
    }

    /// Move forward one char and return it (EOF sentinel past the end).
    fn next_ch(&mut self) -> Result<char, Diagnostic> {
        self.cursor += 1;
        self.ensure_buffered(self.cursor + 1)?;
        Ok(self.line_table.char_at(self.index()))
    }

    fn peek(&mut self) -> Result<char, Diagnostic> {
        self.ensure_buffered(self.cursor + 1)?;
        Ok(self.char_at(self.cursor + 1))
    }

    fn peek2(&mut self) -> Result<char, Diagnostic> {
        self.ensure_buffered(self.cursor + 2)?;
        Ok(self.char_at(self.cursor + 2))
    }

    fn char_at(&self, idx: isize) -> char {
        if idx < 0 {
            EOF_CHAR
        } else {
            self.line_table.char_at(idx as usize)
        }
    }

    /// Current cursor as a buffer index.
    fn index(&self) -> usize {
        self.cursor.max(0) as usize
    }

    /// Move the cursor back within the current line.
    fn rebase(&mut self, cursor: isize) {
        self.cursor = cursor;
    }

    /// Pull input until the current line's break is buffered, so error
    /// display can echo the whole line.
    pub(crate) fn fill_line_to_end(&mut self) {
        loop {
            let mut idx = self.index();
            let mut found = false;
            while idx < self.line_table.buffer_len() {
                if matches!(self.line_table.char_at(idx), CR | LF) {
                    found = true;
                    break;
                }
                idx += 1;
            }
            if found || self.input.at_end() {
                return;
            }
            match self.input.read(self.block_size) {
                Ok(chunk) => self.line_table.append_buffer(&chunk),
                Err(_) => return,
            }
        }
    }

    fn token_range(&self) -> TokenRange {
        TokenRange {
            start_line: self.current_line(),
            start_idx: self.index(),
            end_line: self.current_line(),
            end_idx: self.index(),
        }
    }

    fn set_range_end(&self, range: &mut TokenRange) {
        range.end_line = self.current_line();
        range.end_idx = self.index() + 1;
    }

    fn clear_buffer(&mut self) {
        self.ch_buffer.clear();
    }

    fn push_buffer(&mut self, ch: char) {
        self.ch_buffer.push(ch);
    }

    fn buffer_string(&self) -> String {
        self.ch_buffer.iter().collect()
    }

    fn push_quote(&mut self, ch: char) -> Result<(), Diagnostic> {
        if self.quote_stack.len() >= QUOTE_STACK_MAX {
            return Err(error::quote_stack_full(QUOTE_STACK_MAX));
        }
        self.quote_stack.push(ch);
        Ok(())
    }

    //// parsing logics

    fn parse_indents(&mut self, ch: char) -> Result<(), Diagnostic> {
        let mut count = 1;
        while self.peek()? == ch {
            count += 1;
            self.next_ch()?;
        }
        let kind = match ch {
            TAB => IndentKind::Tab,
            SP => IndentKind::Space,
            _ => IndentKind::Unknown,
        };
        self.line_table.set_indent(count, kind)
    }

    /// Handle a line break; any CR/LF pair counts as one logical newline.
    fn parse_crlf(&mut self, ch: char) -> Result<Vec<char>, Diagnostic> {
        let p = self.peek()?;
        let consumed = if (ch == CR && p == LF) || (ch == LF && p == CR) {
            self.next_ch()?;
            self.line_table.push_line(self.index() - 1);
            vec![ch, p]
        } else {
            self.line_table.push_line(self.index());
            vec![ch]
        };

        self.line_table.new_line(self.index() + 1);

        // zero-indent lines still set their indent record
        if !matches!(self.peek()?, SP | TAB | EOF_CHAR) {
            self.line_table.set_indent(0, IndentKind::Unknown)?;
        }
        Ok(consumed)
    }

    /// Validate a comment lead after 注: `注：` / `注123：` single line,
    /// colon followed by “ or 「 makes it multi-line.
    fn validate_comment(&mut self) -> Result<(bool, bool, Vec<char>), Diagnostic> {
        let mut note = Vec::new();
        loop {
            let ch = self.next_ch()?;
            if ch == token::COLON {
                if matches!(self.peek()?, '“' | '「') {
                    self.next_ch()?;
                    return Ok((true, true, note));
                }
                return Ok((true, false, note));
            }
            if token::is_digit(ch) || token::is_white_space(ch) {
                note.push(ch);
                continue;
            }
            return Ok((false, false, note));
        }
    }

    fn parse_comment(
        &mut self,
        is_multi_line: bool,
        note: &[char],
        mut range: TokenRange,
    ) -> Result<Token, Diagnostic> {
        self.clear_buffer();
        if is_multi_line {
            let quote = self.char_at(self.cursor);
            self.push_quote(quote)?;
            self.push_buffer(quote);
        }

        loop {
            let ch = self.next_ch()?;
            match ch {
                EOF_CHAR => {
                    self.rebase(self.cursor - 1);
                    self.set_range_end(&mut range);
                    return Ok(self.comment_token(note, range));
                }
                CR | LF => {
                    let nl = self.parse_crlf(ch)?;
                    if !is_multi_line {
                        return Ok(self.comment_token(note, range));
                    }
                    for c in nl {
                        self.push_buffer(c);
                    }
                    self.line_table.set_indent(0, IndentKind::Unknown)?;
                }
                _ => {
                    if is_multi_line {
                        if token::is_left_quote(ch) {
                            self.push_quote(ch)?;
                        }
                        if token::is_right_quote(ch) {
                            if let Some(&top) = self.quote_stack.last() {
                                if token::matching_right_quote(top) == Some(ch) {
                                    self.quote_stack.pop();
                                }
                            }
                            if self.quote_stack.is_empty() {
                                self.set_range_end(&mut range);
                                self.push_buffer(ch);
                                return Ok(self.comment_token(note, range));
                            }
                        }
                    }
                    self.push_buffer(ch);
                    self.set_range_end(&mut range);
                }
            }
        }
    }

    fn comment_token(&self, note: &[char], range: TokenRange) -> Token {
        let note_str: String = note.iter().collect();
        let literal = format!("注{}：{}", note_str, self.buffer_string());
        Token::new(TokenKind::Comment, literal, range)
    }

    /// Scan a quoted string. Quotes nest through the bounded stack and the
    /// outer pair is kept in the literal.
    fn parse_string(&mut self, first: char) -> Result<Token, Diagnostic> {
        self.clear_buffer();
        self.quote_stack.clear();
        self.push_quote(first)?;
        let mut range = self.token_range();

        loop {
            let ch = self.next_ch()?;
            match ch {
                EOF_CHAR => {
                    self.rebase(self.cursor - 1);
                    self.set_range_end(&mut range);
                    return Ok(self.string_token(first, range));
                }
                _ if token::is_left_quote(ch) => {
                    self.push_buffer(ch);
                    self.push_quote(ch)?;
                }
                _ if token::is_right_quote(ch) => {
                    if let Some(&top) = self.quote_stack.last() {
                        if token::matching_right_quote(top) == Some(ch) {
                            self.quote_stack.pop();
                        }
                    }
                    if self.quote_stack.is_empty() {
                        self.set_range_end(&mut range);
                        return Ok(self.string_token(first, range));
                    }
                    self.push_buffer(ch);
                }
                CR | LF => {
                    let nl = self.parse_crlf(ch)?;
                    for c in nl {
                        self.push_buffer(c);
                    }
                    self.line_table.set_indent(0, IndentKind::Unknown)?;
                }
                _ => self.push_buffer(ch),
            }
        }
    }

    fn string_token(&self, first: char, range: TokenRange) -> Token {
        let mut literal = String::new();
        literal.push(first);
        literal.push_str(&self.buffer_string());
        if let Some(right) = token::matching_right_quote(first) {
            literal.push(right);
        }
        Token::new(TokenKind::String, literal, range)
    }

    /// `·名·` — identifier quoted with middle dots; may collide with
    /// keywords and embeds whitespace.
    fn parse_var_quote(&mut self) -> Result<Token, Diagnostic> {
        self.clear_buffer();
        let mut range = self.token_range();
        let mut count = 0;
        loop {
            let ch = self.next_ch()?;
            match ch {
                EOF_CHAR => {
                    self.rebase(self.cursor - 1);
                    self.set_range_end(&mut range);
                    return Ok(Token::new(TokenKind::VarQuote, self.buffer_string(), range));
                }
                MIDDLE_DOT => {
                    self.set_range_end(&mut range);
                    return Ok(Token::new(TokenKind::VarQuote, self.buffer_string(), range));
                }
                _ => {
                    if token::is_white_space(ch) {
                        continue;
                    }
                    if token::is_identifier_char(ch, count == 0) {
                        self.push_buffer(ch);
                        count += 1;
                        if count > token::MAX_IDENTIFIER_LENGTH {
                            return Err(error::identifier_exceed_length(
                                token::MAX_IDENTIFIER_LENGTH,
                            ));
                        }
                    } else {
                        return Err(error::invalid_identifier());
                    }
                }
            }
        }
    }

    /// Hand-written DFA over `^[+-]?(\d+\.?\d*|\.\d+)((E[+-]?|\*10^[+-]?|\*^[+-]?)\d+)?$`;
    /// underscores between digits are skipped.
    fn parse_number(&mut self, first: char) -> Result<Token, Diagnostic> {
        self.clear_buffer();
        let mut range = self.token_range();

        const S_BEGIN: u8 = 1;
        const S_DOT: u8 = 2;
        const S_INT_END: u8 = 3;
        const S_INT_PM_FLAG: u8 = 5;
        const S_DOT_DEC_END: u8 = 6;
        const S_E_FLAG: u8 = 7;
        const S_S_FLAG: u8 = 8;
        const S_EXP_PM_FLAG: u8 = 9;
        const S_SCI_I: u8 = 10;
        const S_SCI_END_FLAG: u8 = 11;
        const S_EXP_END: u8 = 12;
        const S_SCI_II: u8 = 13;

        let mut state = S_BEGIN;
        let mut ch = first;
        loop {
            match ch {
                EOF_CHAR => break,
                'e' | 'E' => match state {
                    S_DOT_DEC_END | S_INT_END => state = S_E_FLAG,
                    _ => break,
                },
                '.' => match state {
                    S_BEGIN | S_INT_PM_FLAG | S_INT_END => state = S_DOT,
                    _ => break,
                },
                '-' | '+' => match state {
                    S_BEGIN => state = S_INT_PM_FLAG,
                    S_E_FLAG | S_SCI_END_FLAG => state = S_EXP_PM_FLAG,
                    _ => break,
                },
                '_' => {
                    ch = self.next_ch()?;
                    continue;
                }
                '*' => match state {
                    S_DOT_DEC_END | S_INT_END => state = S_S_FLAG,
                    _ => break,
                },
                '1' => match state {
                    S_S_FLAG => state = S_SCI_I,
                    S_BEGIN | S_INT_END | S_INT_PM_FLAG => state = S_INT_END,
                    S_DOT | S_DOT_DEC_END => state = S_DOT_DEC_END,
                    S_EXP_PM_FLAG | S_SCI_END_FLAG | S_EXP_END => state = S_EXP_END,
                    _ => break,
                },
                '0' => match state {
                    S_SCI_I => state = S_SCI_II,
                    S_BEGIN | S_INT_END | S_INT_PM_FLAG => state = S_INT_END,
                    S_DOT | S_DOT_DEC_END => state = S_DOT_DEC_END,
                    S_EXP_PM_FLAG | S_SCI_END_FLAG | S_EXP_END => state = S_EXP_END,
                    _ => break,
                },
                '2'..='9' => match state {
                    S_BEGIN | S_INT_END | S_INT_PM_FLAG => state = S_INT_END,
                    S_DOT | S_DOT_DEC_END => state = S_DOT_DEC_END,
                    S_EXP_PM_FLAG | S_SCI_END_FLAG | S_EXP_END => state = S_EXP_END,
                    _ => break,
                },
                '^' => match state {
                    S_S_FLAG | S_SCI_II => state = S_SCI_END_FLAG,
                    _ => break,
                },
                _ => break,
            }
            self.push_buffer(ch);
            ch = self.next_ch()?;
        }

        if matches!(state, S_INT_END | S_DOT_DEC_END | S_EXP_END) {
            self.rebase(self.cursor - 1);
            self.set_range_end(&mut range);
            return Ok(Token::new(TokenKind::Number, self.buffer_string(), range));
        }
        Err(error::invalid_char(ch))
    }

    fn parse_markers(&mut self, ch: char) -> Result<Token, Diagnostic> {
        self.clear_buffer();
        self.push_buffer(ch);
        let start = self.token_range();

        let mark = |lexer: &Lexer, kind: TokenKind, num: usize| -> Result<Token, Diagnostic> {
            let mut range = start;
            range.end_line = start.start_line;
            range.end_idx = start.start_idx + num;
            Ok(Token::new(kind, lexer.buffer_string(), range))
        };

        match ch {
            token::COMMA => mark(self, TokenKind::CommaSep, 1),
            token::COLON => mark(self, TokenKind::FuncCall, 1),
            token::SEMICOLON => mark(self, TokenKind::StmtSep, 1),
            token::QUESTION_MARK => mark(self, TokenKind::FuncDeclare, 1),
            token::REF_MARK => mark(self, TokenKind::ObjRef, 1),
            token::BANG_MARK => mark(self, TokenKind::MustT, 1),
            token::ANNOTATION_MARK => mark(self, TokenKind::AnnoT, 1),
            token::HASH_MARK => {
                if self.peek()? == token::LEFT_CURLY {
                    let next = self.next_ch()?;
                    self.push_buffer(next);
                    return mark(self, TokenKind::MapQHash, 2);
                }
                mark(self, TokenKind::MapHash, 1)
            }
            token::ELLIPSIS_MARK => {
                if self.peek()? == token::ELLIPSIS_MARK {
                    let next = self.next_ch()?;
                    self.push_buffer(next);
                    return mark(self, TokenKind::MoreParam, 2);
                }
                Err(error::invalid_single_ellipsis())
            }
            token::LEFT_BRACKET => mark(self, TokenKind::ArrayQuoteL, 1),
            token::RIGHT_BRACKET => mark(self, TokenKind::ArrayQuoteR, 1),
            token::LEFT_PAREN => mark(self, TokenKind::FuncQuoteL, 1),
            token::RIGHT_PAREN => mark(self, TokenKind::FuncQuoteR, 1),
            token::LEFT_CURLY => mark(self, TokenKind::StmtQuoteL, 1),
            token::RIGHT_CURLY => mark(self, TokenKind::StmtQuoteR, 1),
            token::EQUAL => {
                if self.peek()? == token::EQUAL {
                    let next = self.next_ch()?;
                    self.push_buffer(next);
                    return mark(self, TokenKind::MapData, 2);
                }
                Err(error::invalid_single_equal())
            }
            token::DOUBLE_ARROW => mark(self, TokenKind::MapData, 1),
            _ => Err(error::invalid_char(ch)),
        }
    }

    /// Try matching a keyword at the current position. When `move_forward`
    /// is false (identifier boundary probe), the cursor is left untouched.
    fn parse_keyword(
        &mut self,
        ch: char,
        move_forward: bool,
    ) -> Result<Option<Token>, Diagnostic> {
        let peek = self.peek()?;
        let peek2 = self.peek2()?;
        let Some((kind, word_len)) = token::match_keyword(ch, peek, peek2) else {
            return Ok(None);
        };

        let mut range = self.token_range();
        if move_forward {
            for _ in 1..word_len {
                self.next_ch()?;
            }
        }
        range.end_line = range.start_line;
        range.end_idx = range.start_idx + word_len;

        let mut tok = Token::keyword(kind);
        tok.range = range;
        Ok(Some(tok))
    }

    fn consume_white_space(&mut self) -> Result<(), Diagnostic> {
        while token::is_white_space(self.peek()?) {
            self.next_ch()?;
        }
        Ok(())
    }

    /// Identifiers accumulate up to 32 significant chars; whitespace inside
    /// is skipped, and a keyword or marker terminates the scan.
    fn parse_identifier(&mut self, first: char) -> Result<Token, Diagnostic> {
        self.clear_buffer();

        if !token::is_identifier_char(first, true) {
            return Err(error::invalid_identifier());
        }

        let mut range = self.token_range();
        self.set_range_end(&mut range);
        self.push_buffer(first);
        let mut count = 1;

        loop {
            let prev = self.cursor;
            let ch = self.next_ch()?;

            if token::is_white_space(ch) {
                continue;
            }
            // a keyword or a comment lead terminates the identifier
            if self.parse_keyword(ch, false)?.is_some() {
                self.rebase(prev);
                self.set_range_end(&mut range);
                return Ok(Token::new(TokenKind::Identifier, self.buffer_string(), range));
            }
            if ch == GLYPH_ZHU {
                let (valid_comment, _, _) = self.validate_comment()?;
                if valid_comment {
                    self.rebase(prev);
                    self.set_range_end(&mut range);
                    return Ok(Token::new(
                        TokenKind::Identifier,
                        self.buffer_string(),
                        range,
                    ));
                }
                self.rebase(prev + 1);
            }
            if matches!(ch, EOF_CHAR | CR | LF | MIDDLE_DOT)
                || token::is_left_quote(ch)
                || token::MARK_LEADS.contains(&ch)
            {
                self.rebase(prev);
                return Ok(Token::new(TokenKind::Identifier, self.buffer_string(), range));
            }

            if token::is_identifier_char(ch, false) {
                if count >= token::MAX_IDENTIFIER_LENGTH {
                    return Err(error::identifier_exceed_length(
                        token::MAX_IDENTIFIER_LENGTH,
                    ));
                }
                self.push_buffer(ch);
                self.set_range_end(&mut range);
                count += 1;
                continue;
            }
            return Err(error::invalid_char(ch));
        }
    }
}

/// Scan a whole stream into tokens, EOF token included.
pub fn tokenize(input: InputStream) -> Result<Vec<Token>, Diagnostic> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let is_eof = matches!(token.kind, TokenKind::Eof);
        tokens.push(token);
        if is_eof {
            break;
        }
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn kinds_of(source: &str) -> Vec<TokenKind> {
        tokenize(InputStream::from_text(source))
            .expect("tokenize should succeed")
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    fn literals_of(source: &str) -> Vec<(TokenKind, String)> {
        tokenize(InputStream::from_text(source))
            .expect("tokenize should succeed")
            .into_iter()
            .map(|token| (token.kind, token.literal))
            .collect()
    }

    #[test]
    fn scans_declaration_statement() {
        assert_eq!(
            literals_of("令变量名为125"),
            vec![
                (TokenKind::DeclareW, "令".to_string()),
                (TokenKind::Identifier, "变量名".to_string()),
                (TokenKind::LogicYesW, "为".to_string()),
                (TokenKind::Number, "125".to_string()),
                (TokenKind::Eof, String::new()),
            ]
        );
    }

    #[test]
    fn scans_three_char_keywords_before_identifiers() {
        assert_eq!(
            kinds_of("甲不等于乙"),
            vec![
                TokenKind::Identifier,
                TokenKind::LogicNotEqW,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn identifier_skips_embedded_whitespace() {
        let tokens = literals_of("变量 名为1");
        assert_eq!(tokens[0], (TokenKind::Identifier, "变量名".to_string()));
        assert_eq!(tokens[1].0, TokenKind::LogicYesW);
    }

    #[test]
    fn identifier_length_is_capped() {
        let long_name: String = std::iter::repeat('名').take(33).collect();
        let err = tokenize(InputStream::from_text(&long_name)).expect_err("expected length error");
        assert_eq!(err.code(), 0x2025);
    }

    #[test]
    fn string_literal_keeps_outer_quotes_and_nests() {
        let tokens = literals_of("「外「内」层」");
        assert_eq!(tokens[0], (TokenKind::String, "「外「内」层」".to_string()));
    }

    #[test]
    fn string_preserves_newlines() {
        let tokens = literals_of("「甲\n乙」");
        assert_eq!(tokens[0], (TokenKind::String, "「甲\n乙」".to_string()));
    }

    #[test]
    fn comment_tokens_are_emitted() {
        let tokens = literals_of("注：这是注释\n令A为1");
        assert_eq!(tokens[0], (TokenKind::Comment, "注：这是注释".to_string()));
        assert_eq!(tokens[1].0, TokenKind::DeclareW);
    }

    #[test]
    fn multi_line_comment_ends_at_matching_quote() {
        let tokens = literals_of("注：「多行\n注释」令A为1");
        assert_eq!(
            tokens[0],
            (TokenKind::Comment, "注：「多行\n注释」".to_string())
        );
        assert_eq!(tokens[1].0, TokenKind::DeclareW);
    }

    #[test]
    fn numbered_comment_lead_is_recognized() {
        let tokens = literals_of("注123：备注");
        assert_eq!(tokens[0].0, TokenKind::Comment);
        assert_eq!(tokens[0].1, "注123：备注");
    }

    #[test]
    fn scans_number_formats() {
        for source in ["10", "-0.25", "3.14159", "2.5E-3", "31415*10^-4", "12_000"] {
            let tokens = literals_of(source);
            assert_eq!(tokens[0].0, TokenKind::Number, "source: {source}");
        }
        assert_eq!(literals_of("12_000")[0].1, "12000");
    }

    #[test]
    fn scans_markers_and_double_marks() {
        assert_eq!(
            kinds_of("【「甲」==1】#{2}"),
            vec![
                TokenKind::ArrayQuoteL,
                TokenKind::String,
                TokenKind::MapData,
                TokenKind::Number,
                TokenKind::ArrayQuoteR,
                TokenKind::MapQHash,
                TokenKind::Number,
                TokenKind::StmtQuoteR,
                TokenKind::Eof,
            ]
        );
        assert_eq!(kinds_of("A ⟺ B")[1], TokenKind::MapData);
    }

    #[test]
    fn single_equal_and_ellipsis_are_errors() {
        let err = tokenize(InputStream::from_text("A = 1")).expect_err("expected = failure");
        assert_eq!(err.code(), 0x2002);
        let err = tokenize(InputStream::from_text("…")).expect_err("expected … failure");
        assert_eq!(err.code(), 0x2001);
    }

    #[test]
    fn var_quote_allows_keyword_collision() {
        let tokens = literals_of("·先令·");
        assert_eq!(tokens[0], (TokenKind::VarQuote, "先令".to_string()));
    }

    #[test]
    fn records_indents_in_line_table() {
        let source = indoc! {"
            如果真：
                令A为1
                令B为2
        "};
        let mut lexer = Lexer::new(InputStream::from_text(source));
        loop {
            let token = lexer.next_token().expect("tokenize should succeed");
            if matches!(token.kind, TokenKind::Eof) {
                break;
            }
        }
        assert_eq!(lexer.line_table().line_indent(1), Some(0));
        assert_eq!(lexer.line_table().line_indent(2), Some(1));
        assert_eq!(lexer.line_table().line_indent(3), Some(1));
    }

    #[test]
    fn mixing_indent_types_fails() {
        let source = "如果真：\n    令A为1\n\t令B为2\n";
        let err = tokenize(InputStream::from_text(source)).expect_err("expected indent conflict");
        assert_eq!(err.code(), 0x2021);
    }

    #[test]
    fn lexer_error_cursor_points_at_offending_glyph() {
        let err = tokenize(InputStream::from_text("令A为$1")).expect_err("expected invalid char");
        assert_eq!(err.code(), 0x2026);
        let cursor = err.cursor().expect("cursor should be attached");
        assert_eq!(cursor.line_num, 1);
        assert_eq!(cursor.text, "令A为$1");
    }

    #[test]
    fn token_ranges_are_ordered() {
        let source = indoc! {"
            令对象表为【
                1 == 「象」，
                2 == 「士」
            】
        "};
        let tokens = tokenize(InputStream::from_text(source)).expect("tokenize should succeed");
        for token in &tokens {
            assert!(token.range.start_line <= token.range.end_line);
            if token.range.start_line == token.range.end_line {
                assert!(token.range.start_idx <= token.range.end_idx);
            }
        }
        assert!(matches!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof)));
    }

    #[test]
    fn crlf_pairs_collapse_to_one_line_break() {
        let mut lexer = Lexer::new(InputStream::from_text("令A为1\r\n令B为2"));
        loop {
            let token = lexer.next_token().expect("tokenize should succeed");
            if matches!(token.kind, TokenKind::Eof) {
                break;
            }
        }
        assert_eq!(lexer.current_line(), 2);
    }
}
