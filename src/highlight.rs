//! Syntax-highlighting helpers for external tooling.
//!
//! These consume only the lexer's token stream and line table. The
//! markdown rewriter turns ```zn fenced blocks and `zn: …` inline spans
//! into paired hidden-source / highlighted HTML elements, and re-renders
//! pairs produced by an earlier run.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use crate::error::Diagnostic;
use crate::input::InputStream;
use crate::lexer::line::{IndentKind, LineTable};
use crate::lexer::token::{Token, TokenKind};
use crate::lexer::Lexer;

// GitHub style (light) color scheme
const CS_KEYWORD: &str = "#d73a49";
const CS_TOKEN: &str = "#6f42c1";
const CS_NUMBER: &str = "#005cc5";
const CS_STRING: &str = "#032f62";
const CS_VARIABLE: &str = "#e36209";
const CS_COMMENT: &str = "#6a737d";

const FONT_FAMILY: &str = "Sarasa Mono SC, Microsoft YaHei, monospace";

/// Display class of a token, used to pick its color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenClass {
    Keyword,
    Mark,
    Number,
    Str,
    Variable,
    Comment,
}

pub fn classify(kind: TokenKind) -> TokenClass {
    match kind {
        TokenKind::Number => TokenClass::Number,
        TokenKind::String => TokenClass::Str,
        TokenKind::Identifier | TokenKind::VarQuote => TokenClass::Variable,
        TokenKind::Comment => TokenClass::Comment,
        TokenKind::Eof
        | TokenKind::CommaSep
        | TokenKind::StmtSep
        | TokenKind::FuncCall
        | TokenKind::FuncDeclare
        | TokenKind::ObjRef
        | TokenKind::MustT
        | TokenKind::AnnoT
        | TokenKind::MapHash
        | TokenKind::MoreParam
        | TokenKind::ArrayQuoteL
        | TokenKind::ArrayQuoteR
        | TokenKind::FuncQuoteL
        | TokenKind::FuncQuoteR
        | TokenKind::MapData
        | TokenKind::StmtQuoteL
        | TokenKind::StmtQuoteR
        | TokenKind::MapQHash => TokenClass::Mark,
        _ => TokenClass::Keyword,
    }
}

fn class_color(class: TokenClass) -> &'static str {
    match class {
        TokenClass::Keyword => CS_KEYWORD,
        TokenClass::Mark => CS_TOKEN,
        TokenClass::Number => CS_NUMBER,
        TokenClass::Str => CS_STRING,
        TokenClass::Variable => CS_VARIABLE,
        TokenClass::Comment => CS_COMMENT,
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Tokenize a code snippet and render one colored HTML line per source
/// line; fails with the lexer's diagnostic on invalid input.
pub fn highlight_code(code: &str) -> Result<String, Diagnostic> {
    let mut lexer = Lexer::new(InputStream::from_text(code));
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        if matches!(token.kind, TokenKind::Eof) {
            break;
        }
        tokens.push(token);
    }
    Ok(compose_pretty_html(&tokens, lexer.line_table()))
}

fn compose_pretty_html(tokens: &[Token], table: &LineTable) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut line_item: Vec<String> = Vec::new();

    let mut last_line = 0usize;
    let mut last_index = 0usize;

    for token in tokens {
        let line_num = token.range.start_line;
        if line_num > last_line {
            if last_line != 0 {
                lines.push(line_item.join(""));
                line_item = Vec::new();
            }
            // blank lines between tokens
            for _ in 0..line_num.saturating_sub(last_line + 1) {
                lines.push(String::new());
            }
            // re-create indentation
            let indents = table.line_indent(line_num).unwrap_or(0);
            match table.indent_kind() {
                IndentKind::Tab => line_item.push("\t".repeat(indents)),
                IndentKind::Space => {
                    let nbsps = "&nbsp;".repeat(indents * 4);
                    line_item.push(format!("<span>{}</span>", nbsps));
                }
                IndentKind::Unknown => {}
            }
        } else {
            // spaces between tokens on the same line
            let col_diff = token.range.start_idx.saturating_sub(last_index);
            if col_diff > 0 {
                let nbsps = "&nbsp;".repeat(col_diff);
                line_item.push(format!("<span>{}</span>", nbsps));
            }
        }

        let color = class_color(classify(token.kind));
        line_item.push(format!(
            "<span style='color:{}'>{}</span>",
            color,
            escape_html(&token.literal)
        ));

        last_line = token.range.end_line;
        last_index = token.range.end_idx;
    }
    if !line_item.is_empty() {
        lines.push(line_item.join(""));
    }
    lines.join("\n")
}

fn content_tag(code: &str) -> String {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    code.hash(&mut hasher);
    format!("{:08x}", hasher.finish() as u32)
}

/// Rewrite a whole Markdown document. Already-rendered pairs (hidden
/// `zn-ref-…` elements next to `zn-source-…` ones) are re-highlighted
/// from their stored source; fresh fenced blocks and inline spans are
/// expanded into such pairs.
pub fn rewrite_markdown(data: &str) -> String {
    let refs = collect_ref_sources(data);
    let data = replace_rendered_sources(data, &refs);
    let data = replace_fenced_blocks(&data);
    replace_inline_spans(&data)
}

/// First pass: gather `zn-ref-TAG` element contents (the stored source).
fn collect_ref_sources(data: &str) -> HashMap<String, String> {
    let mut sources = HashMap::new();
    let mut rest = data;
    while let Some(pos) = rest.find("class='zn-ref-") {
        let after = &rest[pos + "class='zn-ref-".len()..];
        let Some(tag_end) = after.find('\'') else { break };
        let tag = after[..tag_end].to_string();
        let Some(elem_start) = after.find('>') else { break };
        let content = &after[elem_start + 1..];
        let end = match (content.find("</pre>"), content.find("</code>")) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (Some(a), None) => Some(a),
            (None, Some(b)) => Some(b),
            (None, None) => None,
        };
        let Some(end) = end else { break };
        let source = content[..end]
            .trim_start_matches("zn: ")
            .to_string();
        sources.insert(tag, source);
        rest = &content[end..];
    }
    sources
}

/// Second pass: refresh the visible `zn-source-TAG` twin elements.
fn replace_rendered_sources(data: &str, refs: &HashMap<String, String>) -> String {
    let mut output = String::new();
    let mut rest = data;
    loop {
        let Some(pos) = rest.find("class='zn-source-") else {
            output.push_str(rest);
            return output;
        };
        let after_tag = &rest[pos + "class='zn-source-".len()..];
        let Some(tag_end) = after_tag.find('\'') else {
            output.push_str(rest);
            return output;
        };
        let tag = &after_tag[..tag_end];
        let Some(elem_start) = after_tag.find('>') else {
            output.push_str(rest);
            return output;
        };
        let content = &after_tag[elem_start + 1..];
        let end = match (content.find("</pre>"), content.find("</code>")) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (Some(a), None) => Some(a),
            (None, Some(b)) => Some(b),
            (None, None) => None,
        };
        let Some(end) = end else {
            output.push_str(rest);
            return output;
        };

        // emit everything through the opening tag unchanged
        let consumed = pos + "class='zn-source-".len() + elem_start + 1;
        output.push_str(&rest[..consumed]);
        match refs.get(tag).and_then(|src| highlight_code(src).ok()) {
            Some(rendered) => output.push_str(&rendered),
            None => output.push_str(&content[..end]),
        }
        rest = &content[end..];
    }
}

fn replace_fenced_blocks(data: &str) -> String {
    let mut output = String::new();
    let mut rest = data;
    while let Some(pos) = rest.find("```zn\n") {
        let block_start = pos + "```zn\n".len();
        let Some(block_len) = rest[block_start..].find("```") else {
            break;
        };
        let code = rest[block_start..block_start + block_len].trim_matches(['\r', '\n']);
        output.push_str(&rest[..pos]);
        match highlight_code(code) {
            Ok(rendered) => {
                let tag = content_tag(code);
                output.push_str(&format!(
                    "<pre class='zn-ref-{tag}' style='display: none'>zn: {code}</pre>\n<pre class='zn-source-{tag}' style='font-family: {FONT_FAMILY}'>{rendered}</pre>",
                ));
            }
            Err(_) => {
                // leave unparsable blocks untouched
                output.push_str(&rest[pos..block_start + block_len + 3]);
            }
        }
        rest = &rest[block_start + block_len + 3..];
    }
    output.push_str(rest);
    output
}

fn replace_inline_spans(data: &str) -> String {
    let mut output = String::new();
    let mut rest = data;
    while let Some(pos) = rest.find("`zn: ") {
        let code_start = pos + "`zn: ".len();
        let Some(code_len) = rest[code_start..].find('`') else {
            break;
        };
        let code = &rest[code_start..code_start + code_len];
        output.push_str(&rest[..pos]);
        match highlight_code(code) {
            Ok(rendered) => {
                let tag = content_tag(code);
                output.push_str(&format!(
                    "<code class='zn-ref-{tag}' style='display: none'>zn: {code}</code><code class='zn-source-{tag}' style='font-family: {FONT_FAMILY}'>{rendered}</code>",
                ));
            }
            Err(_) => output.push_str(&rest[pos..code_start + code_len + 1]),
        }
        rest = &rest[code_start + code_len + 1..];
    }
    output.push_str(rest);
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_token_kinds() {
        assert_eq!(classify(TokenKind::DeclareW), TokenClass::Keyword);
        assert_eq!(classify(TokenKind::CommaSep), TokenClass::Mark);
        assert_eq!(classify(TokenKind::Number), TokenClass::Number);
        assert_eq!(classify(TokenKind::String), TokenClass::Str);
        assert_eq!(classify(TokenKind::Identifier), TokenClass::Variable);
        assert_eq!(classify(TokenKind::Comment), TokenClass::Comment);
    }

    #[test]
    fn highlights_each_token_with_its_color() {
        let html = highlight_code("令变量名为125").expect("highlight should succeed");
        assert!(html.contains("<span style='color:#d73a49'>令</span>"));
        assert!(html.contains("<span style='color:#e36209'>变量名</span>"));
        assert!(html.contains("<span style='color:#005cc5'>125</span>"));
    }

    #[test]
    fn rewrites_fenced_blocks_into_paired_elements() {
        let markdown = "前言\n```zn\n令A为1\n```\n后记\n";
        let rewritten = rewrite_markdown(markdown);
        assert!(rewritten.contains("class='zn-ref-"));
        assert!(rewritten.contains("style='display: none'>zn: 令A为1</pre>"));
        assert!(rewritten.contains("class='zn-source-"));
        assert!(!rewritten.contains("```zn"));
    }

    #[test]
    fn rewrites_inline_spans() {
        let rewritten = rewrite_markdown("行内 `zn: 令A为1` 代码\n");
        assert!(rewritten.contains("<code class='zn-ref-"));
        assert!(rewritten.contains(">zn: 令A为1</code>"));
    }

    #[test]
    fn rerenders_existing_pairs_from_hidden_source() {
        let first = rewrite_markdown("```zn\n令A为1\n```\n");
        // a second run keeps the pair and still renders spans
        let second = rewrite_markdown(&first);
        assert!(second.contains("zn: 令A为1"));
        assert!(second.contains("<span style='color:#d73a49'>令</span>"));
    }

    #[test]
    fn leaves_invalid_code_blocks_untouched() {
        let markdown = "```zn\n令A = 1\n```\n";
        let rewritten = rewrite_markdown(markdown);
        assert!(rewritten.contains("```zn"));
    }
}
