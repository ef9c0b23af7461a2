use std::fs;
use std::io::{self, BufRead, Write};

use anyhow::{Context as _, Result, bail};
use zn::exec::scope::RootScope;
use zn::exec::value::Value;
use zn::exec::Context;
use zn::highlight;
use zn::input::InputStream;
use zn::keygen;

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);

    let Some(first) = args.next() else {
        enter_repl()?;
        return Ok(());
    };

    match first.as_str() {
        "-v" | "--version" => {
            println!("Zn语言版本：{}", env!("CARGO_PKG_VERSION"));
        }
        "md-pretty" => {
            let file = args
                .next()
                .ok_or_else(|| anyhow::anyhow!("md-pretty 需要一个 Markdown 文件"))?;
            md_pretty(&file)?;
        }
        "gen-keyword" => {
            gen_keyword(args)?;
        }
        _ => {
            if args.next().is_some() {
                bail!("只支持一个输入文件");
            }
            exec_program(&first);
        }
    }
    Ok(())
}

/// Run a program file; diagnostics render to stdout.
fn exec_program(file: &str) {
    let mut ctx = Context::new();
    let mut scope = RootScope::new();
    let input = match InputStream::from_file(file) {
        Ok(input) => input,
        Err(err) => {
            println!("{}", err.display());
            return;
        }
    };
    // unlike the REPL, the last value is not echoed here
    if let Err(err) = ctx.execute_code(input, &mut scope) {
        println!("{}", err.display());
    }
}

fn enter_repl() -> Result<()> {
    let mut ctx = Context::new();
    let mut scope = RootScope::new();

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("Zn> ");
        io::stdout().flush().context("flushing prompt")?;

        let Some(line) = lines.next() else {
            break;
        };
        let text = line.context("reading prompt input")?;

        if text == ".exit" {
            break;
        }
        if text == ".print" {
            print_symbols(&scope);
            continue;
        }

        match ctx.execute_code(InputStream::from_text(&text), &mut scope) {
            Ok(value) => pretty_display_value(&value),
            Err(err) => println!("{}", err.display()),
        }
    }
    Ok(())
}

/// Echo a final value with per-kind colors.
fn pretty_display_value(value: &Value) {
    let text = value.display_string();
    match value {
        // FG color: cyan (light blue)
        Value::Decimal(_) => println!("\x1b[38;5;147m{}\x1b[0m", text),
        // FG color: green
        Value::Str(_) => println!("\x1b[38;5;184m{}\x1b[0m", text),
        // FG color: white
        Value::Bool(_) => println!("\x1b[38;5;231m{}\x1b[0m", text),
        Value::Null | Value::Function(_) => println!("‹\x1b[38;5;80m{}\x1b[0m›", text),
        _ => println!("{}", text),
    }
}

// TODO: list user bindings once the symbol-dump format is settled
fn print_symbols(_scope: &RootScope) {}

fn md_pretty(file: &str) -> Result<()> {
    let data = fs::read_to_string(file).with_context(|| format!("Reading {file}"))?;
    let rewritten = highlight::rewrite_markdown(&data);
    fs::write(file, rewritten).with_context(|| format!("Writing {file}"))?;
    println!("替换 {} 成功", file);
    Ok(())
}

fn gen_keyword(mut args: impl Iterator<Item = String>) -> Result<()> {
    let mut input_file: Option<String> = None;
    let mut out_file = "keyword_gen.rs".to_string();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-o" | "--outFile" => {
                out_file = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("Missing output path after {arg}"))?;
            }
            _ => input_file = Some(arg),
        }
    }
    let input_file = input_file.ok_or_else(|| anyhow::anyhow!("gen-keyword 需要一个定义文件"))?;

    let data = fs::read_to_string(&input_file).with_context(|| format!("Reading {input_file}"))?;
    let defs = keygen::parse_defs(&data);
    let code = keygen::generate(&defs);
    fs::write(&out_file, code).with_context(|| format!("Writing {out_file}"))?;
    println!("已生成 {}", out_file);
    Ok(())
}
