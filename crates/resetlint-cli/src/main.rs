//! resetlint CLI - checks Reset methods of reference counted structs.

use std::env;
use std::fs;
use std::process;

use resetlint_analysis::types::CheckDiagnostic;

mod output;

fn main() {
    output::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    match args[1].as_str() {
        "check" => {
            let mut json = false;
            let mut files = Vec::new();
            for arg in &args[2..] {
                if arg == "--json" {
                    json = true;
                } else {
                    files.push(arg.as_str());
                }
            }
            if files.is_empty() {
                eprintln!("Usage: resetlint check [--json] <file.go>...");
                process::exit(1);
            }
            cmd_check(&files, json);
        }
        "lex" => {
            if args.len() < 3 {
                eprintln!("Usage: resetlint lex <file.go>");
                process::exit(1);
            }
            cmd_lex(&args[2]);
        }
        "parse" => {
            if args.len() < 3 {
                eprintln!("Usage: resetlint parse <file.go>");
                process::exit(1);
            }
            cmd_parse(&args[2]);
        }
        "help" | "--help" | "-h" => {
            print_usage();
        }
        "version" | "--version" | "-V" => {
            println!("resetlint 0.1.0");
        }
        other => {
            // Treat as filename
            if other.ends_with(".go") {
                cmd_check(&[other], false);
            } else {
                eprintln!("Unknown command: {}", other);
                print_usage();
                process::exit(1);
            }
        }
    }
}

fn print_usage() {
    println!("resetlint 0.1.0 - Reset completeness checks for pooled structs");
    println!();
    println!("Usage: resetlint <command> [args]");
    println!();
    println!("Commands:");
    println!("  check [--json] <file>...  Check Reset coverage of refcount structs");
    println!("  lex <file>                Tokenize a file and print tokens");
    println!("  parse <file>              Parse a file and print declarations");
    println!("  help                      Show this help");
    println!("  version                   Show version");
}

fn read_source(path: &str) -> String {
    match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading {}: {}", path, e);
            process::exit(1);
        }
    }
}

fn cmd_check(files: &[&str], json: bool) {
    let mut failed = false;

    for path in files {
        let source = read_source(path);
        let report = resetlint_analysis::check(&source, path);

        if json {
            println!("{}", resetlint_analysis::check_json(&report));
        } else {
            for diag in &report.diagnostics {
                show_diagnostic(diag);
            }
            if report.success {
                println!("{}", output::check_ok(path));
            } else {
                eprintln!("{}", output::check_failed(path, report.error_count));
            }
        }

        if !report.success {
            failed = true;
        }
    }

    if failed {
        process::exit(1);
    }
}

fn show_diagnostic(diag: &CheckDiagnostic) {
    eprintln!();
    eprintln!("{}: {} [{}]", output::error_label(), diag.message, diag.rule);
    eprintln!(
        "  {} line {}:{}",
        output::error_arrow(),
        diag.location.line,
        diag.location.column
    );
    eprintln!("   {}", output::pipe());
    eprintln!(
        "{}{} {}",
        output::line_number(diag.location.line),
        output::pipe(),
        diag.location.source_line
    );
    eprintln!(
        "   {} {}{}",
        output::pipe(),
        " ".repeat(diag.location.column.saturating_sub(1)),
        output::caret()
    );
    eprintln!(
        "   {}: {}",
        output::fix_label(),
        output::fix_text(&diag.fix)
    );
}

fn cmd_lex(path: &str) {
    let source = read_source(path);

    let mut lexer = resetlint_lexer::Lexer::new(&source);
    let result = lexer.tokenize();

    for error in &result.errors {
        show_error(&source, error.span.start, &error.message);
    }

    if result.is_ok() {
        println!("=== Tokens ({}) ===\n", result.tokens.len());
        for tok in &result.tokens {
            if matches!(tok.kind, resetlint_ast::token::TokenKind::Newline) {
                continue;
            }
            println!("{:4}:{:<3} {:?}", tok.span.start, tok.span.end, tok.kind);
        }
        println!("\n=== Lex OK: {} tokens ===", result.tokens.len());
    } else {
        eprintln!("\n=== Lex FAILED: {} error(s) ===", result.errors.len());
        process::exit(1);
    }
}

fn cmd_parse(path: &str) {
    let source = read_source(path);

    let mut lexer = resetlint_lexer::Lexer::new(&source);
    let lex_result = lexer.tokenize();

    for error in &lex_result.errors {
        show_error(&source, error.span.start, &error.message);
    }
    if !lex_result.is_ok() {
        eprintln!("\n=== Lex FAILED: {} error(s) ===", lex_result.errors.len());
        process::exit(1);
    }

    let mut parser = resetlint_parser::Parser::new(lex_result.tokens);
    let result = parser.parse();

    for error in &result.errors {
        show_error(&source, error.span.start, &error.message);
    }

    if let Some(package) = &result.package {
        println!("package {}", package);
    }
    for decl in &result.decls {
        println!("{:#?}", decl);
    }

    if result.is_ok() {
        println!("\n=== Parse OK: {} declaration(s) ===", result.decls.len());
    } else {
        eprintln!("\n=== Parse FAILED: {} error(s) ===", result.errors.len());
        process::exit(1);
    }
}

fn show_error(source: &str, pos: usize, message: &str) {
    let mut line_num = 1;
    let mut line_start = 0;

    for (i, c) in source.char_indices() {
        if i >= pos {
            break;
        }
        if c == '\n' {
            line_num += 1;
            line_start = i + 1;
        }
    }

    let col = pos - line_start + 1;

    let line_end = source[line_start..]
        .find('\n')
        .map(|i| line_start + i)
        .unwrap_or(source.len());

    let line = &source[line_start..line_end];

    eprintln!();
    eprintln!("{}: {}", output::error_label(), message);
    eprintln!("  {} line {}:{}", output::error_arrow(), line_num, col);
    eprintln!("   {}", output::pipe());
    eprintln!("{}{} {}", output::line_number(line_num), output::pipe(), line);
    eprintln!(
        "   {} {}{}",
        output::pipe(),
        " ".repeat(col.saturating_sub(1)),
        output::caret()
    );
}
