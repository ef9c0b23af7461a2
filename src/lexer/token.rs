//! Token model and the static character tables driving the lexer:
//! punctuation marks, quote pairs, whitespace, identifier classes and the
//! keyword table (glyph → kind, per the language's fixed keyword set).

/// Sentinel char marking end of input inside the lexer.
pub const EOF_CHAR: char = '\0';

// punctuation marks
pub const COMMA: char = '，'; // U+FF0C
pub const COLON: char = '：'; // U+FF1A
pub const SEMICOLON: char = '；'; // U+FF1B
pub const QUESTION_MARK: char = '？'; // U+FF1F
pub const REF_MARK: char = '&';
pub const BANG_MARK: char = '！'; // U+FF01
pub const ANNOTATION_MARK: char = '@';
pub const HASH_MARK: char = '#';
pub const ELLIPSIS_MARK: char = '…'; // U+2026
pub const LEFT_BRACKET: char = '【'; // U+3010
pub const RIGHT_BRACKET: char = '】'; // U+3011
pub const LEFT_PAREN: char = '（'; // U+FF08
pub const RIGHT_PAREN: char = '）'; // U+FF09
pub const EQUAL: char = '=';
pub const DOUBLE_ARROW: char = '⟺'; // U+27FA
pub const LEFT_CURLY: char = '{';
pub const RIGHT_CURLY: char = '}';

pub const MARK_LEADS: [char; 17] = [
    COMMA,
    COLON,
    SEMICOLON,
    QUESTION_MARK,
    REF_MARK,
    BANG_MARK,
    ANNOTATION_MARK,
    HASH_MARK,
    ELLIPSIS_MARK,
    LEFT_BRACKET,
    RIGHT_BRACKET,
    LEFT_PAREN,
    RIGHT_PAREN,
    EQUAL,
    DOUBLE_ARROW,
    LEFT_CURLY,
    RIGHT_CURLY,
];

// spaces
pub const SP: char = ' ';
pub const TAB: char = '\t';
pub const CR: char = '\r';
pub const LF: char = '\n';

const WHITE_SPACES: [char; 20] = [
    '\u{0009}', '\u{000B}', '\u{000C}', '\u{0020}', '\u{00A0}', '\u{2000}', '\u{2001}', '\u{2002}',
    '\u{2003}', '\u{2004}', '\u{2005}', '\u{2006}', '\u{2007}', '\u{2008}', '\u{2009}', '\u{200A}',
    '\u{200B}', '\u{202F}', '\u{205F}', '\u{3000}',
];

pub fn is_white_space(ch: char) -> bool {
    WHITE_SPACES.contains(&ch)
}

// quote pairs: 《》 「」 『』 “” ‘’
pub const LEFT_QUOTES: [char; 5] = ['《', '「', '『', '“', '‘'];
pub const RIGHT_QUOTES: [char; 5] = ['》', '」', '』', '”', '’'];

pub fn is_left_quote(ch: char) -> bool {
    LEFT_QUOTES.contains(&ch)
}

pub fn is_right_quote(ch: char) -> bool {
    RIGHT_QUOTES.contains(&ch)
}

/// The right quote matching a given left quote.
pub fn matching_right_quote(left: char) -> Option<char> {
    LEFT_QUOTES
        .iter()
        .position(|q| *q == left)
        .map(|idx| RIGHT_QUOTES[idx])
}

/// Middle dot wrapping var-quoted identifiers: `·名·`
pub const MIDDLE_DOT: char = '·';

/// Comment lead glyph 注.
pub const GLYPH_ZHU: char = '注';

pub fn is_digit(ch: char) -> bool {
    ch.is_ascii_digit()
}

/// Identifier characters: CJK unified ideographs, 〇, underscore, ASCII
/// letters; digits and `* + - /` in non-first position only.
pub fn is_identifier_char(ch: char, is_first: bool) -> bool {
    if ('\u{4E00}'..='\u{9FFF}').contains(&ch) {
        return true;
    }
    if ch == '〇' || ch == '_' {
        return true;
    }
    if ch.is_ascii_alphabetic() {
        return true;
    }
    if !is_first {
        if ch.is_ascii_digit() {
            return true;
        }
        if matches!(ch, '*' | '+' | '-' | '/') {
            return true;
        }
    }
    false
}

pub const MAX_IDENTIFIER_LENGTH: usize = 32;

/// Token discriminant: special tokens, punctuation, then keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Eof,
    String,
    VarQuote,
    Number,
    Identifier,
    Comment,

    CommaSep,    // ，
    StmtSep,     // ；
    FuncCall,    // ：
    FuncDeclare, // ？
    ObjRef,      // &
    MustT,       // ！
    AnnoT,       // @
    MapHash,     // #
    MoreParam,   // ……
    ArrayQuoteL, // 【
    ArrayQuoteR, // 】
    FuncQuoteL,  // （
    FuncQuoteR,  // ）
    MapData,     // == or ⟺
    StmtQuoteL,  // {
    StmtQuoteR,  // }
    MapQHash,    // #{

    // keywords
    DeclareW,      // 令
    LogicYesW,     // 为
    AssignConstW,  // 恒为
    CondOtherW,    // 再如
    CondW,         // 如果
    FuncW,         // 如何
    GetterW,       // 何为
    ParamAssignW,  // 已知
    ReturnW,       // 返回
    LogicNotW,     // 不为
    LogicNotEqW,   // 不等于
    LogicLteW,     // 不大于
    LogicGteW,     // 不小于
    LogicLtW,      // 小于
    LogicGtW,      // 大于
    VarOneW,       // 以
    CondElseW,     // 否则
    WhileLoopW,    // 每当
    ObjNewW,       // 成为
    ObjDefineW,    // 定义
    ObjThisW,      // 其
    LogicOrW,      // 或
    LogicAndW,     // 且
    ObjDotW,       // 之
    ObjConstructW, // 是为
    LogicEqualW,   // 等于
    StaticSelfW,   // 此之
    IteratorW,     // 遍历
}

/// Glyphs that may begin a keyword; seeing one triggers keyword matching.
pub const KEYWORD_LEADS: [char; 24] = [
    '不', '且', '为', '之', '令', '以', '何', '其', '再', '否', '大', '如', '定', '小', '已', '恒',
    '成', '或', '是', '此', '每', '等', '返', '遍',
];

/// The full keyword table: literal glyphs for each keyword kind.
pub const KEYWORD_TABLE: [(TokenKind, &str); 28] = [
    (TokenKind::DeclareW, "令"),
    (TokenKind::LogicYesW, "为"),
    (TokenKind::AssignConstW, "恒为"),
    (TokenKind::CondOtherW, "再如"),
    (TokenKind::CondW, "如果"),
    (TokenKind::FuncW, "如何"),
    (TokenKind::GetterW, "何为"),
    (TokenKind::ParamAssignW, "已知"),
    (TokenKind::ReturnW, "返回"),
    (TokenKind::LogicNotW, "不为"),
    (TokenKind::LogicNotEqW, "不等于"),
    (TokenKind::LogicLteW, "不大于"),
    (TokenKind::LogicGteW, "不小于"),
    (TokenKind::LogicLtW, "小于"),
    (TokenKind::LogicGtW, "大于"),
    (TokenKind::VarOneW, "以"),
    (TokenKind::CondElseW, "否则"),
    (TokenKind::WhileLoopW, "每当"),
    (TokenKind::ObjNewW, "成为"),
    (TokenKind::ObjDefineW, "定义"),
    (TokenKind::ObjThisW, "其"),
    (TokenKind::LogicOrW, "或"),
    (TokenKind::LogicAndW, "且"),
    (TokenKind::ObjDotW, "之"),
    (TokenKind::ObjConstructW, "是为"),
    (TokenKind::LogicEqualW, "等于"),
    (TokenKind::StaticSelfW, "此之"),
    (TokenKind::IteratorW, "遍历"),
];

/// Match a keyword from a (lead, peek, peek2) window. Longest match wins;
/// returns the kind and consumed length in chars.
pub fn match_keyword(ch: char, peek: char, peek2: char) -> Option<(TokenKind, usize)> {
    match ch {
        '不' => match (peek, peek2) {
            ('为', _) => Some((TokenKind::LogicNotW, 2)),
            ('小', '于') => Some((TokenKind::LogicGteW, 3)),
            ('大', '于') => Some((TokenKind::LogicLteW, 3)),
            ('等', '于') => Some((TokenKind::LogicNotEqW, 3)),
            _ => None,
        },
        '且' => Some((TokenKind::LogicAndW, 1)),
        '为' => Some((TokenKind::LogicYesW, 1)),
        '之' => Some((TokenKind::ObjDotW, 1)),
        '令' => Some((TokenKind::DeclareW, 1)),
        '以' => Some((TokenKind::VarOneW, 1)),
        '何' => (peek == '为').then_some((TokenKind::GetterW, 2)),
        '其' => Some((TokenKind::ObjThisW, 1)),
        '再' => (peek == '如').then_some((TokenKind::CondOtherW, 2)),
        '否' => (peek == '则').then_some((TokenKind::CondElseW, 2)),
        '大' => (peek == '于').then_some((TokenKind::LogicGtW, 2)),
        '如' => match peek {
            '何' => Some((TokenKind::FuncW, 2)),
            '果' => Some((TokenKind::CondW, 2)),
            _ => None,
        },
        '定' => (peek == '义').then_some((TokenKind::ObjDefineW, 2)),
        '小' => (peek == '于').then_some((TokenKind::LogicLtW, 2)),
        '已' => (peek == '知').then_some((TokenKind::ParamAssignW, 2)),
        '恒' => (peek == '为').then_some((TokenKind::AssignConstW, 2)),
        '成' => (peek == '为').then_some((TokenKind::ObjNewW, 2)),
        '或' => Some((TokenKind::LogicOrW, 1)),
        '是' => (peek == '为').then_some((TokenKind::ObjConstructW, 2)),
        '此' => (peek == '之').then_some((TokenKind::StaticSelfW, 2)),
        '每' => (peek == '当').then_some((TokenKind::WhileLoopW, 2)),
        '等' => (peek == '于').then_some((TokenKind::LogicEqualW, 2)),
        '返' => (peek == '回').then_some((TokenKind::ReturnW, 2)),
        '遍' => (peek == '历').then_some((TokenKind::IteratorW, 2)),
        _ => None,
    }
}

/// Absolute position of a token in the source rune buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenRange {
    /// line number of the first char (1-based)
    pub start_line: usize,
    pub start_idx: usize,
    /// line number of the last char (1-based)
    pub end_line: usize,
    pub end_idx: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: String,
    pub range: TokenRange,
}

impl Token {
    pub fn new(kind: TokenKind, literal: String, range: TokenRange) -> Self {
        Self {
            kind,
            literal,
            range,
        }
    }

    pub fn eof(line: usize, idx: usize) -> Self {
        Self {
            kind: TokenKind::Eof,
            literal: String::new(),
            range: TokenRange {
                start_line: line,
                start_idx: idx,
                end_line: line,
                end_idx: idx,
            },
        }
    }

    pub fn keyword(kind: TokenKind) -> Self {
        let literal = KEYWORD_TABLE
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, glyphs)| (*glyphs).to_string())
            .unwrap_or_default();
        Self {
            kind,
            literal,
            range: TokenRange::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_leads_cover_every_table_entry() {
        for (_, glyphs) in KEYWORD_TABLE {
            let lead = glyphs.chars().next().expect("keyword has a lead glyph");
            assert!(KEYWORD_LEADS.contains(&lead), "missing lead {lead}");
        }
    }

    #[test]
    fn longest_keyword_match_wins() {
        assert_eq!(match_keyword('不', '大', '于'), Some((TokenKind::LogicLteW, 3)));
        assert_eq!(match_keyword('不', '为', '空'), Some((TokenKind::LogicNotW, 2)));
        assert_eq!(match_keyword('不', '能', '够'), None);
        assert_eq!(match_keyword('为', '何', '物'), Some((TokenKind::LogicYesW, 1)));
    }

    #[test]
    fn identifier_chars_restrict_first_position() {
        assert!(is_identifier_char('变', true));
        assert!(is_identifier_char('〇', true));
        assert!(!is_identifier_char('3', true));
        assert!(is_identifier_char('3', false));
        assert!(is_identifier_char('-', false));
        assert!(!is_identifier_char('-', true));
    }

    #[test]
    fn quote_pairs_align() {
        assert_eq!(matching_right_quote('「'), Some('」'));
        assert_eq!(matching_right_quote('《'), Some('》'));
        assert_eq!(matching_right_quote('」'), None);
    }
}
