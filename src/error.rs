//! Structured diagnostics shared by every stage of the pipeline.
//!
//! A [`Diagnostic`] carries a class-coded error number, a user-facing
//! message, an optional source cursor and a display mask that controls
//! which lines of the rendered report are shown. Factory functions below
//! are grouped by error class and keep the codes in one place.

use thiserror::Error;

/// Error classes — the high byte of a diagnostic code.
pub const LEX_ERROR_CLASS: u16 = 0x20;
pub const IO_ERROR_CLASS: u16 = 0x21;
pub const SYNTAX_ERROR_CLASS: u16 = 0x22;
pub const TYPE_ERROR_CLASS: u16 = 0x23;
pub const INDEX_ERROR_CLASS: u16 = 0x24;
pub const NAME_ERROR_CLASS: u16 = 0x25;
pub const ARITH_ERROR_CLASS: u16 = 0x26;
pub const PARAM_ERROR_CLASS: u16 = 0x27;
pub const BREAK_ERROR_CLASS: u16 = 0x50;
pub const INTERNAL_ERROR_CLASS: u16 = 0x60;

/// Break signal codes (class BREAK). These are control-flow carriers, not
/// true errors; they only surface as diagnostics when no enclosing loop or
/// function absorbs them.
pub const RETURN_BREAK_SIGNAL: u16 = 0x5001;
pub const CONTINUE_BREAK_SIGNAL: u16 = 0x5002;
pub const BREAK_BREAK_SIGNAL: u16 = 0x5003;

// display masks
const DP_HIDE_FILE_NAME: u16 = 0x0001;
const DP_HIDE_LINE_CURSOR: u16 = 0x0002;
const DP_HIDE_LINE_NUM: u16 = 0x0004;
const DP_HIDE_LINE_TEXT: u16 = 0x0008;
const DP_HIDE_ERR_CLASS: u16 = 0x0010;

/// Locates where a diagnostic occurred: file, line, column (in chars of
/// the displayed line text) and the line text itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cursor {
    pub file: String,
    pub line_num: usize,
    pub col_num: usize,
    pub text: String,
}

/// Structured error record with code, class and display mask.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct Diagnostic {
    code: u16,
    message: String,
    cursor: Option<Cursor>,
    info: Vec<(&'static str, String)>,
    display_mask: u16,
}

impl Diagnostic {
    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn error_class(&self) -> u16 {
        self.code >> 8
    }

    pub fn cursor(&self) -> Option<&Cursor> {
        self.cursor.as_ref()
    }

    pub fn set_cursor(&mut self, cursor: Cursor) {
        self.cursor = Some(cursor);
    }

    pub fn info_value(&self, key: &str) -> Option<&str> {
        self.info
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    fn on_mask(&self, mask: u16) -> bool {
        self.display_mask & mask > 0
    }

    /// Render the full user-facing report:
    ///
    /// ```text
    /// 在「FILE」中，位于第 N 行发现错误：
    ///     <source line>
    ///        ^
    /// ‹CCCC› <class label>：<message>
    /// ```
    pub fn display(&self) -> String {
        let cursor = self.cursor.clone().unwrap_or_default();

        let line1 = if self.on_mask(DP_HIDE_FILE_NAME) {
            if self.on_mask(DP_HIDE_LINE_NUM) {
                "发现错误：".to_string()
            } else {
                format!("在第 {} 行发现错误：", cursor.line_num)
            }
        } else if self.on_mask(DP_HIDE_LINE_NUM) {
            format!("在「{}」中发现错误：", cursor.file)
        } else {
            format!("在「{}」中，位于第 {} 行发现错误：", cursor.file, cursor.line_num)
        };

        let line2 = if self.on_mask(DP_HIDE_LINE_TEXT) {
            String::new()
        } else {
            format!("    {}", cursor.text)
        };

        let line3 = if self.on_mask(DP_HIDE_LINE_TEXT) || self.on_mask(DP_HIDE_LINE_CURSOR) {
            String::new()
        } else {
            let offset = display_offset(&cursor.text, cursor.col_num);
            format!("   {}^", " ".repeat(offset + 1))
        };

        let line4 = if self.on_mask(DP_HIDE_ERR_CLASS) {
            self.message.clone()
        } else {
            let label = class_label(self.error_class());
            format!("‹{:04X}› {}：{}", self.code, label, self.message)
        };

        [line1, line2, line3, line4]
            .into_iter()
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn class_label(class: u16) -> &'static str {
    match class {
        LEX_ERROR_CLASS => "语法错误",
        IO_ERROR_CLASS => "I/O错误",
        SYNTAX_ERROR_CLASS => "语法错误",
        TYPE_ERROR_CLASS => "类型错误",
        INDEX_ERROR_CLASS => "索引错误",
        NAME_ERROR_CLASS => "标识错误",
        ARITH_ERROR_CLASS => "算术错误",
        PARAM_ERROR_CLASS => "参数错误",
        BREAK_ERROR_CLASS => "中断信号",
        INTERNAL_ERROR_CLASS => "内部错误",
        _ => "未知错误",
    }
}

/// Sum character display widths over the first `col` chars of `text` so the
/// caret lines up under wide (CJK, fullwidth) glyphs.
fn display_offset(text: &str, col: usize) -> usize {
    const BORDERS: [u32; 38] = [
        126, 159, 687, 710, 711, 727, 733, 879, 1154, 1161, 4347, 4447, 7467, 7521, 8369, 8426,
        9000, 9002, 11021, 12350, 12351, 12438, 12442, 19893, 19967, 55203, 63743, 64106, 65039,
        65059, 65131, 65279, 65376, 65500, 65510, 120831, 262141, 1114109,
    ];
    const WIDTHS: [usize; 38] = [
        1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 2, 1, 0, 1, 0, 1, 2, 1, 2, 1, 2, 0, 2, 1, 2, 1, 2, 1, 0,
        2, 1, 2, 1, 2, 1, 2, 1,
    ];

    let char_width = |ch: char| -> usize {
        let cp = ch as u32;
        if cp == 0xE || cp == 0xF {
            return 0;
        }
        for (idx, border) in BORDERS.iter().enumerate() {
            if cp <= *border {
                return WIDTHS[idx];
            }
        }
        1
    };

    text.chars().take(col).map(char_width).sum()
}

struct ErrorClass {
    prefix: u16,
    base_mask: u16,
}

impl ErrorClass {
    const fn new(prefix: u16, base_mask: u16) -> Self {
        Self { prefix, base_mask }
    }

    fn diagnostic(&self, subcode: u16, message: String) -> Diagnostic {
        Diagnostic {
            code: (self.prefix << 8) | subcode,
            message,
            cursor: None,
            info: Vec::new(),
            display_mask: self.base_mask,
        }
    }

    fn diagnostic_with_info(
        &self,
        subcode: u16,
        message: String,
        info: Vec<(&'static str, String)>,
    ) -> Diagnostic {
        let mut diag = self.diagnostic(subcode, message);
        diag.info = info;
        diag
    }
}

const LEX_ERROR: ErrorClass = ErrorClass::new(LEX_ERROR_CLASS, 0);
const IO_ERROR: ErrorClass = ErrorClass::new(
    IO_ERROR_CLASS,
    DP_HIDE_LINE_TEXT | DP_HIDE_FILE_NAME | DP_HIDE_LINE_CURSOR | DP_HIDE_LINE_NUM,
);
const SYNTAX_ERROR: ErrorClass = ErrorClass::new(SYNTAX_ERROR_CLASS, 0);
const TYPE_ERROR: ErrorClass = ErrorClass::new(TYPE_ERROR_CLASS, DP_HIDE_LINE_CURSOR);
const INDEX_ERROR: ErrorClass = ErrorClass::new(INDEX_ERROR_CLASS, DP_HIDE_LINE_CURSOR);
const NAME_ERROR: ErrorClass = ErrorClass::new(NAME_ERROR_CLASS, DP_HIDE_LINE_CURSOR);
const ARITH_ERROR: ErrorClass = ErrorClass::new(ARITH_ERROR_CLASS, DP_HIDE_LINE_CURSOR);
const PARAM_ERROR: ErrorClass = ErrorClass::new(PARAM_ERROR_CLASS, DP_HIDE_LINE_CURSOR);
const BREAK_ERROR: ErrorClass = ErrorClass::new(BREAK_ERROR_CLASS, DP_HIDE_LINE_CURSOR);
const INTERNAL_ERROR: ErrorClass = ErrorClass::new(INTERNAL_ERROR_CLASS, DP_HIDE_LINE_CURSOR);

fn type_label(name: &str) -> &str {
    match name {
        "string" => "文本",
        "decimal" => "数值",
        "integer" => "整数",
        "function" => "方法",
        "bool" => "二象",
        "null" => "空",
        "array" => "元组",
        "hashmap" => "列表",
        "id" => "标识",
        other => other,
    }
}

fn quoted_type_labels(assert_types: &[&str]) -> String {
    assert_types
        .iter()
        .map(|at| format!("「{}」", type_label(at)))
        .collect::<Vec<_>>()
        .join("、")
}

//// 0x20 — lex errors

pub fn invalid_single_ellipsis() -> Diagnostic {
    LEX_ERROR.diagnostic(0x01, "未能识别单个「…」字符，或许应该是「……」？".to_string())
}

pub fn invalid_single_equal() -> Diagnostic {
    LEX_ERROR.diagnostic(0x02, "未能识别单个「=」字符，或许应该是「==」？".to_string())
}

pub fn decode_utf8_fail(byte: u8) -> Diagnostic {
    LEX_ERROR.diagnostic_with_info(
        0x20,
        format!(
            "前方有无法解析成UTF-8编码之异常字符'\\x{:x}'，请确认文件编码之正确性及完整性",
            byte
        ),
        vec![("charcode", byte.to_string())],
    )
}

pub fn invalid_indent_type(expect: u8, got: u8) -> Diagnostic {
    let name = |indent_type: u8| if indent_type == 9 { "「TAB」" } else { "「空格」" };
    LEX_ERROR.diagnostic_with_info(
        0x21,
        format!(
            "此行现行缩进类型为{}，与前设缩进类型{}不符",
            name(got),
            name(expect)
        ),
        vec![("expect", expect.to_string()), ("got", got.to_string())],
    )
}

pub fn invalid_indent_space_count(count: usize) -> Diagnostic {
    LEX_ERROR.diagnostic_with_info(
        0x22,
        format!(
            "当缩进类型为「空格」，其所列字符数应为4之倍数：当前空格字符数为{}",
            count
        ),
        vec![("count", count.to_string())],
    )
}

pub fn quote_stack_full(max_size: usize) -> Diagnostic {
    LEX_ERROR.diagnostic_with_info(
        0x23,
        format!("在文本中嵌套过多引号：最大可以嵌套{}层", max_size),
        vec![("maxsize", max_size.to_string())],
    )
}

pub fn invalid_identifier() -> Diagnostic {
    LEX_ERROR.diagnostic(0x24, "标识符不符合规范".to_string())
}

pub fn identifier_exceed_length(max_len: usize) -> Diagnostic {
    LEX_ERROR.diagnostic_with_info(
        0x25,
        format!("标识符长度超过限制：最大可用长度为{}个字元", max_len),
        vec![("maxlen", max_len.to_string())],
    )
}

pub fn invalid_char(ch: char) -> Diagnostic {
    LEX_ERROR.diagnostic_with_info(
        0x26,
        format!("未能识别字元「{}」", ch),
        vec![("charcode", (ch as u32).to_string())],
    )
}

//// 0x20 — I/O flavored lex errors (file level)

pub fn file_not_found(path: &str) -> Diagnostic {
    IO_ERROR.diagnostic_with_info(
        0x10,
        format!("未能找到文件 {}，请检查它是否存在！", path),
        vec![("path", path.to_string())],
    )
}

pub fn file_open_error(path: &str, detail: &str) -> Diagnostic {
    IO_ERROR.diagnostic_with_info(
        0x11,
        format!("未能读取文件 {}，请检查其是否存在及有无读取权限！", path),
        vec![("path", path.to_string()), ("error", detail.to_string())],
    )
}

pub fn read_stream_error(detail: &str) -> Diagnostic {
    IO_ERROR.diagnostic_with_info(
        0x12,
        format!("读取I/O流失败：{}！", detail),
        vec![("error", detail.to_string())],
    )
}

//// 0x22 — syntax errors

pub fn invalid_syntax() -> Diagnostic {
    SYNTAX_ERROR.diagnostic_with_info(
        0x50,
        "不合规范之语法".to_string(),
        vec![("cursor", "peek".to_string())],
    )
}

/// Same as [`invalid_syntax`] but anchored on the current token instead of
/// the peek token.
pub fn invalid_syntax_curr() -> Diagnostic {
    SYNTAX_ERROR.diagnostic_with_info(
        0x50,
        "不合规范之语法".to_string(),
        vec![("cursor", "current".to_string())],
    )
}

pub fn unexpected_indent() -> Diagnostic {
    SYNTAX_ERROR.diagnostic_with_info(
        0x51,
        "意外出现之缩进".to_string(),
        vec![("cursor", "peek".to_string())],
    )
}

pub fn incomplete_stmt() -> Diagnostic {
    SYNTAX_ERROR.diagnostic_with_info(
        0x52,
        "语句仍未结束".to_string(),
        vec![("cursor", "peek".to_string())],
    )
}

pub fn expr_must_type_id() -> Diagnostic {
    SYNTAX_ERROR.diagnostic_with_info(
        0x53,
        "表达式须为「泛标识符」〈如‘变量’、‘对象之名’之类〉".to_string(),
        vec![("cursor", "peek".to_string())],
    )
}

pub fn unexpected_eof() -> Diagnostic {
    SYNTAX_ERROR.diagnostic_with_info(
        0x54,
        "仍有语句在最后未被解析".to_string(),
        vec![("cursor", "peek".to_string())],
    )
}

pub fn mix_array_hashmap() -> Diagnostic {
    SYNTAX_ERROR.diagnostic_with_info(
        0x55,
        "元组元素与列表元素混用".to_string(),
        vec![("cursor", "current".to_string())],
    )
}

//// 0x23 — type errors

pub fn invalid_expr_type(assert_types: &[&str]) -> Diagnostic {
    TYPE_ERROR.diagnostic(
        0x01,
        format!("表达式不符合期望之{}类型", quoted_type_labels(assert_types)),
    )
}

pub fn invalid_func_variable(tag: &str) -> Diagnostic {
    TYPE_ERROR.diagnostic_with_info(
        0x02,
        format!("「{}」须为一个方法", tag),
        vec![("tag", tag.to_string())],
    )
}

pub fn invalid_param_type(assert_types: &[&str]) -> Diagnostic {
    TYPE_ERROR.diagnostic(
        0x03,
        format!("输入参数不符合期望之{}类型", quoted_type_labels(assert_types)),
    )
}

pub fn invalid_compare_l_type(assert_types: &[&str]) -> Diagnostic {
    TYPE_ERROR.diagnostic(
        0x04,
        format!("比较值的类型应为{}", quoted_type_labels(assert_types)),
    )
}

pub fn invalid_compare_r_type(assert_types: &[&str]) -> Diagnostic {
    TYPE_ERROR.diagnostic(
        0x05,
        format!("被比较值的类型应为{}", quoted_type_labels(assert_types)),
    )
}

//// 0x24 — index errors

pub fn index_out_of_range() -> Diagnostic {
    INDEX_ERROR.diagnostic(0x01, "索引超出此对象可用范围".to_string())
}

pub fn index_key_not_found(key: &str) -> Diagnostic {
    INDEX_ERROR.diagnostic_with_info(
        0x02,
        format!("索引「{}」并不存在于此对象中", key),
        vec![("index", key.to_string())],
    )
}

//// 0x25 — name errors

pub fn name_not_defined(name: &str) -> Diagnostic {
    NAME_ERROR.diagnostic_with_info(
        0x01,
        format!("标识「{}」未有定义", name),
        vec![("name", name.to_string())],
    )
}

pub fn name_redeclared(name: &str) -> Diagnostic {
    NAME_ERROR.diagnostic_with_info(
        0x02,
        format!("标识「{}」被重复定义", name),
        vec![("name", name.to_string())],
    )
}

pub fn assign_to_constant() -> Diagnostic {
    NAME_ERROR.diagnostic(0x03, "不允许赋值给常变量".to_string())
}

pub fn property_not_found(name: &str) -> Diagnostic {
    NAME_ERROR.diagnostic_with_info(
        0x04,
        format!("未找到属性「{}」", name),
        vec![("name", name.to_string())],
    )
}

pub fn method_not_found(name: &str) -> Diagnostic {
    NAME_ERROR.diagnostic_with_info(
        0x05,
        format!("未找到方法名「{}」", name),
        vec![("name", name.to_string())],
    )
}

pub fn invalid_assignment_target() -> Diagnostic {
    NAME_ERROR.diagnostic(0x06, "不允许向此表达式赋值".to_string())
}

pub fn class_on_non_root() -> Diagnostic {
    NAME_ERROR.diagnostic(0x07, "类定义只能在根作用域中使用".to_string())
}

//// 0x26 — arithmetic errors

pub fn arith_div_zero() -> Diagnostic {
    ARITH_ERROR.diagnostic(0x01, "被除数不得为0".to_string())
}

pub fn parse_from_string_error(raw: &str) -> Diagnostic {
    ARITH_ERROR.diagnostic(0x02, format!("解析「{}」错误", raw))
}

pub fn to_integer_error(raw: &str) -> Diagnostic {
    ARITH_ERROR.diagnostic(0x03, format!("转换 {} 成整数错误", raw))
}

//// 0x27 — parameter errors

pub fn least_params_error(min_params: usize) -> Diagnostic {
    PARAM_ERROR.diagnostic_with_info(
        0x01,
        format!("需要输入至少{}个参数", min_params),
        vec![("minParams", min_params.to_string())],
    )
}

pub fn mismatch_param_length(expect: usize, got: usize) -> Diagnostic {
    PARAM_ERROR.diagnostic_with_info(
        0x02,
        format!("此方法定义了{}个参数，而实际输入{}个参数", expect, got),
        vec![("expect", expect.to_string()), ("got", got.to_string())],
    )
}

pub fn most_params_error(max_params: usize) -> Diagnostic {
    PARAM_ERROR.diagnostic_with_info(
        0x03,
        format!("至多需要{}个参数", max_params),
        vec![("maxParams", max_params.to_string())],
    )
}

pub fn exact_params_error(exact_params: usize) -> Diagnostic {
    PARAM_ERROR.diagnostic_with_info(
        0x04,
        format!("需要正好{}个参数", exact_params),
        vec![("exactParams", exact_params.to_string())],
    )
}

//// 0x50 — break signals (surfaced only when unhandled)

pub fn return_break_error() -> Diagnostic {
    BREAK_ERROR.diagnostic(0x01, "未处理之「返回」中断".to_string())
}

pub fn continue_break_error() -> Diagnostic {
    BREAK_ERROR.diagnostic(0x02, "未处理之「继续」中断".to_string())
}

pub fn break_break_error() -> Diagnostic {
    BREAK_ERROR.diagnostic(0x03, "未处理之「结束」中断".to_string())
}

//// 0x60 — internal errors

pub fn unexpected_case(tag: &str, value: &str) -> Diagnostic {
    INTERNAL_ERROR.diagnostic(0x01, format!("未定义的条件项：「{}」的值为「{}」", tag, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_code_combines_class_and_subcode() {
        assert_eq!(name_not_defined("甲").code(), 0x2501);
        assert_eq!(invalid_char('$').code(), 0x2026);
        assert_eq!(return_break_error().code(), RETURN_BREAK_SIGNAL);
        assert_eq!(continue_break_error().code(), CONTINUE_BREAK_SIGNAL);
        assert_eq!(break_break_error().code(), BREAK_BREAK_SIGNAL);
    }

    #[test]
    fn displays_full_report_with_caret() {
        let mut err = invalid_char('$');
        err.set_cursor(Cursor {
            file: "draft/example.zn".to_string(),
            line_num: 12,
            col_num: 2,
            text: "令甲$为1".to_string(),
        });
        // 令 and 甲 are both double-width, so the caret sits 4 cells in.
        assert_eq!(
            err.display(),
            "在「draft/example.zn」中，位于第 12 行发现错误：\n    令甲$为1\n        ^\n‹2026› 语法错误：未能识别字元「$」"
        );
    }

    #[test]
    fn io_mask_hides_location_lines() {
        let err = file_not_found("/tmp/none.zn");
        assert_eq!(
            err.display(),
            "发现错误：\n‹2110› I/O错误：未能找到文件 /tmp/none.zn，请检查它是否存在！"
        );
    }

    #[test]
    fn syntax_errors_record_cursor_anchor() {
        assert_eq!(invalid_syntax().info_value("cursor"), Some("peek"));
        assert_eq!(invalid_syntax_curr().info_value("cursor"), Some("current"));
    }
}
