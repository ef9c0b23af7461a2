//! End-to-end program scenarios run through the public pipeline:
//! source text → lexer → parser → evaluator, asserting on final values,
//! probe logs and diagnostics.

use indoc::indoc;
use zn::error::Diagnostic;
use zn::exec::scope::RootScope;
use zn::exec::value::Value;
use zn::exec::Context;
use zn::input::InputStream;

fn run(program: &str) -> (Context, Result<Value, Diagnostic>) {
    let mut ctx = Context::new();
    let mut scope = RootScope::new();
    let result = ctx.execute_code(InputStream::from_text(program), &mut scope);
    (ctx, result)
}

fn run_value(program: &str) -> (Context, Value) {
    let (ctx, result) = run(program);
    let value = result.unwrap_or_else(|e| panic!("program failed: {}", e.display()));
    (ctx, value)
}

fn probe_strings(ctx: &Context, tag: &str) -> Vec<String> {
    ctx.probe()
        .get_log(tag)
        .iter()
        .map(|log| log.value_str.clone())
        .collect()
}

#[test]
fn declaration_and_reassignment_yield_last_value() {
    let (_, value) = run_value("令A为10；A为10241024");
    assert_eq!(value.display_string(), "10241024");
}

#[test]
fn parameterized_function_returns_sum() {
    let (_, value) = run_value(indoc! {"
        如何测试？
            已知X，Y
            （X+Y：2，3）
        （测试）
    "});
    assert_eq!(value.display_string(), "5");
}

#[test]
fn return_short_circuits_dead_code() {
    let (_, value) = run_value(indoc! {"
        如何测试？
            已知阈值
            如果阈值大于10：
                返回「大于」
            返回「小于」
            「等于」
        （测试：6）
    "});
    assert_eq!(value.display_string(), "「小于」");
}

#[test]
fn undefined_name_reports_code_and_cursor() {
    let (_, result) = run(indoc! {"
        令变量名-甲为10
        令变量名-乙为20
        （X+Y：变量名-未定，变量名-甲）
    "});
    let err = result.expect_err("expected name error");
    assert_eq!(err.code(), 0x2501);
    assert_eq!(err.message(), "标识「变量名-未定」未有定义");
    assert_eq!(err.cursor().expect("cursor").line_num, 3);
}

#[test]
fn mixed_indent_types_fail_in_lexer() {
    let program = "如果真：\n    令A为1\n如果真：\n\t令B为2\n";
    let (_, result) = run(program);
    let err = result.expect_err("expected indent conflict");
    assert_eq!(err.code(), 0x2021);
}

#[test]
fn division_respects_default_precision() {
    let (_, value) = run_value("（X/Y：1，3）");
    assert_eq!(value.display_string(), "0.33333333");

    // a zero dividend short-circuits, even over zero
    let (_, value) = run_value("（X/Y：0，0）");
    assert_eq!(value.display_string(), "0");

    let (_, result) = run("（X/Y：5，0）");
    assert_eq!(result.expect_err("expected div-zero").code(), 0x2601);
}

#[test]
fn hashmap_iteration_follows_insertion_order() {
    let (ctx, _) = run_value(indoc! {"
        遍历【「a」==1，「b」==2，「c」==3】：
            （__probe：「K」，此之索引）
            （__probe：「V」，此之值）
    "});
    assert_eq!(probe_strings(&ctx, "K"), vec!["「a」", "「b」", "「c」"]);
    assert_eq!(probe_strings(&ctx, "V"), vec!["1", "2", "3"]);
}

#[test]
fn while_break_skips_rest_of_iteration() {
    let mut ctx = Context::new();
    let mut scope = RootScope::new();
    scope.set_symbol("X", Value::Decimal(zn::exec::decimal::Decimal::from_int(3, 0)), false);
    ctx.execute_code(
        InputStream::from_text(indoc! {"
            每当X大于0：
                如果X等于2：
                    此之（结束）
                （__probe：「T」，X）
                X为（X-Y：X，1）
        "}),
        &mut scope,
    )
    .unwrap_or_else(|e| panic!("program failed: {}", e.display()));
    // the break iteration records no probe entry
    assert_eq!(probe_strings(&ctx, "T"), vec!["3"]);
}

#[test]
fn while_continue_resumes_condition_check() {
    let mut ctx = Context::new();
    let mut scope = RootScope::new();
    scope.set_symbol("X", Value::Decimal(zn::exec::decimal::Decimal::from_int(3, 0)), false);
    ctx.execute_code(
        InputStream::from_text(indoc! {"
            每当X大于0：
                X为（X-Y：X，1）
                如果X等于1：
                    此之（继续）
                （__probe：「C」，X）
        "}),
        &mut scope,
    )
    .unwrap_or_else(|e| panic!("program failed: {}", e.display()));
    assert_eq!(probe_strings(&ctx, "C"), vec!["2", "0"]);
}

#[test]
fn iterate_binds_lead_names_and_loop_props() {
    let (ctx, _) = run_value(indoc! {"
        以K，V遍历【「土」，「地」】：
            （__probe：「K1」，K）
            （__probe：「V1」，V）
    "});
    assert_eq!(probe_strings(&ctx, "K1"), vec!["0", "1"]);
    assert_eq!(probe_strings(&ctx, "V1"), vec!["「土」", "「地」"]);
}

#[test]
fn loop_bodies_rebind_declarations_each_pass() {
    let (ctx, _) = run_value(indoc! {"
        遍历【「一」，「地」】：
            令X为100
            （__probe：「$X」，X）
    "});
    assert_eq!(probe_strings(&ctx, "$X"), vec!["100", "100"]);
}

#[test]
fn iterating_a_decimal_is_a_type_error() {
    let (_, result) = run(indoc! {"
        遍历10：
            （显示）
    "});
    assert_eq!(result.expect_err("expected type error").code(), 0x2301);
}

#[test]
fn constants_refuse_reassignment_and_keep_value() {
    let mut ctx = Context::new();
    let mut scope = RootScope::new();
    let err = ctx
        .execute_code(InputStream::from_text("令G恒为5；G为6"), &mut scope)
        .expect_err("expected constant error");
    assert_eq!(err.code(), 0x2503);

    let value = ctx
        .execute_code(InputStream::from_text("G"), &mut scope)
        .expect("read back");
    assert_eq!(value.display_string(), "5");
}

#[test]
fn root_scope_persists_across_inputs() {
    let mut ctx = Context::new();
    let mut scope = RootScope::new();
    ctx.execute_code(InputStream::from_text("令A为10"), &mut scope)
        .expect("declare");
    let value = ctx
        .execute_code(InputStream::from_text("（X*Y：A，A）"), &mut scope)
        .expect("reuse binding");
    assert_eq!(value.display_string(), "100");
}

#[test]
fn declaration_deep_copies_while_assignment_aliases() {
    let (ctx, _) = run_value(indoc! {"
        令甲为【1，2，3】
        令乙为甲
        乙#0为9
        （__probe：「A」，甲）
        （__probe：「B」，乙）
    "});
    // 乙 was declared from 甲 by deep copy, so 甲 is untouched
    assert_eq!(probe_strings(&ctx, "A"), vec!["【1，2，3】"]);
    assert_eq!(probe_strings(&ctx, "B"), vec!["【9，2，3】"]);
}

#[test]
fn member_index_assignment_writes_through() {
    let (ctx, _) = run_value(indoc! {"
        令表为【10，20，30】
        表#1为75
        （__probe：「E」，表#1）
        （__probe：「T」，表）
    "});
    assert_eq!(probe_strings(&ctx, "E"), vec!["75"]);
    assert_eq!(probe_strings(&ctx, "T"), vec!["【10，75，30】"]);
}

#[test]
fn hashmap_index_reads_and_writes() {
    let (ctx, _) = run_value(indoc! {"
        令表为【「甲」==20，「乙」==30】
        表#「乙」为40
        （__probe：「M」，表#「乙」）
    "});
    assert_eq!(probe_strings(&ctx, "M"), vec!["40"]);

    let (_, result) = run(indoc! {"
        令表为【「甲」==20】
        表#「丙」为1
    "});
    assert_eq!(result.expect_err("expected key error").code(), 0x2402);
}

#[test]
fn array_getters_compute_over_elements() {
    let (ctx, _) = run_value(indoc! {"
        令表为【1，2，3】
        （__probe：「S」，表之和）
        （__probe：「C」，表之数目）
        （__probe：「F」，表之首）
        （__probe：「L」，表之尾）
    "});
    assert_eq!(probe_strings(&ctx, "S"), vec!["6"]);
    assert_eq!(probe_strings(&ctx, "C"), vec!["3"]);
    assert_eq!(probe_strings(&ctx, "F"), vec!["1"]);
    assert_eq!(probe_strings(&ctx, "L"), vec!["3"]);
}

#[test]
fn decimal_text_getter_renders_display_form() {
    let (ctx, _) = run_value(indoc! {"
        令数为3.14
        （__probe：「T」，数之文本）
    "});
    assert_eq!(probe_strings(&ctx, "T"), vec!["「3.14」"]);
}

#[test]
fn classes_construct_with_properties_methods_and_getters() {
    let (ctx, _) = run_value(indoc! {"
        定义狗：
            其名为「小黄」
            其年龄为0

            是为名，年龄

            如何狂吠？
                返回「汪汪汪」

            何为概况？
                返回其名

        令旺财成为狗：「旺财」，3
        （__probe：「N」，旺财之名）
        旺财之名为「小白」
        （__probe：「N2」，旺财之名）
        （__probe：「G」，旺财之概况）
        （__probe：「M」，旺财之（狂吠））
        （__probe：「AGE」，旺财之年龄）
    "});
    assert_eq!(probe_strings(&ctx, "N"), vec!["「旺财」"]);
    assert_eq!(probe_strings(&ctx, "N2"), vec!["「小白」"]);
    // the getter reads the receiver's current property
    assert_eq!(probe_strings(&ctx, "G"), vec!["「小白」"]);
    assert_eq!(probe_strings(&ctx, "M"), vec!["「汪汪汪」"]);
    assert_eq!(probe_strings(&ctx, "AGE"), vec!["3"]);
}

#[test]
fn constructor_arity_is_checked() {
    let (_, result) = run(indoc! {"
        定义点：
            其横为0
            其纵为0

            是为横，纵

        令原点成为点：1
    "});
    assert_eq!(result.expect_err("expected arity error").code(), 0x2702);
}

#[test]
fn function_arity_is_checked() {
    let (_, result) = run(indoc! {"
        如何测试？
            已知X，Y
            返回X
        （测试：1，2，3）
    "});
    assert_eq!(result.expect_err("expected arity error").code(), 0x2702);
}

#[test]
fn logic_operators_short_circuit_and_require_bools() {
    let (_, value) = run_value("假且{（X/Y：1，0）等于1}");
    assert_eq!(value.display_string(), "假");
    let (_, value) = run_value("真或{（X/Y：1，0）等于1}");
    assert_eq!(value.display_string(), "真");

    let (_, result) = run("1且真");
    assert_eq!(result.expect_err("expected bool error").code(), 0x2301);
}

#[test]
fn comparisons_cover_all_orderings() {
    for (program, expected) in [
        ("3大于2", "真"),
        ("3小于2", "假"),
        ("3不小于3", "真"),
        ("3不大于2", "假"),
        ("「甲」等于「甲」", "真"),
        ("「甲」不等于「乙」", "真"),
        ("2等于「2」", "假"),
        ("【1，2】等于【1，2】", "真"),
        ("【1，2】等于【1，3】", "假"),
        ("空等于空", "真"),
    ] {
        let (_, value) = run_value(program);
        assert_eq!(value.display_string(), expected, "program: {program}");
    }
}

#[test]
fn function_hoisting_allows_forward_calls() {
    let (_, value) = run_value(indoc! {"
        （之后定义）
        如何之后定义？
            返回42
    "});
    assert_eq!(value.display_string(), "42");
}

#[test]
fn unhandled_break_signal_surfaces_as_break_error() {
    let (_, result) = run("返回1");
    assert_eq!(result.expect_err("expected break error").code(), 0x5001);
}

#[test]
fn class_declaration_outside_root_scope_fails() {
    let (_, result) = run(indoc! {"
        如何测试？
            定义狗：
                其名为「小黄」
        （测试）
    "});
    assert_eq!(result.expect_err("expected scope error").code(), 0x2507);
}

#[test]
fn display_of_literal_round_trips() {
    for literal in ["10241024", "「你好」", "真", "假", "空", "-25"] {
        let (_, value) = run_value(literal);
        let rendered = value.display_string();
        let (_, again) = run_value(&rendered);
        assert_eq!(again.display_string(), rendered, "literal: {literal}");
    }
}

#[test]
fn redeclaring_builtin_names_fails() {
    let (_, result) = run("令真为1");
    assert_eq!(result.expect_err("expected redeclare error").code(), 0x2502);
}
