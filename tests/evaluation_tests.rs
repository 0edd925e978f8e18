// End-to-end tests: source text in, value or diagnostics out.

use flint::compilation::Compilation;
use flint::conversion::Conversion;
use flint::evaluator::Variables;
use flint::host::Host;
use flint::repl::Repl;
use flint::source::SourceText;
use flint::symbols::{BuiltinFunction, LabelSymbol, Symbol, TypeSymbol, VariableKind};
use flint::value::Value;
use flint::{EvaluationResult, SyntaxTree, TextSpan};
use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Host with canned input that records everything printed.
#[derive(Default)]
struct ScriptedHost {
    input: VecDeque<String>,
    output: Vec<String>,
    cancel_after: Option<usize>,
    polls: Cell<usize>,
}

impl ScriptedHost {
    fn with_input(lines: &[&str]) -> Self {
        Self {
            input: lines.iter().map(|line| line.to_string()).collect(),
            ..Self::default()
        }
    }
}

impl Host for ScriptedHost {
    fn print(&mut self, text: &str) {
        self.output.push(text.to_string());
    }

    fn read(&mut self) -> String {
        self.input.pop_front().unwrap_or_default()
    }

    fn is_cancelled(&self) -> bool {
        self.polls.set(self.polls.get() + 1);
        matches!(self.cancel_after, Some(limit) if self.polls.get() > limit)
    }
}

fn evaluate_with(text: &str, host: &mut ScriptedHost) -> EvaluationResult {
    let compilation = Compilation::new(SyntaxTree::parse(text));
    let mut variables = Variables::new();
    compilation.evaluate(&mut variables, host)
}

fn evaluate(text: &str) -> EvaluationResult {
    evaluate_with(text, &mut ScriptedHost::default())
}

fn assert_value(text: &str, expected: Value) {
    let result = evaluate(text);
    let messages: Vec<&str> = result.diagnostics.iter().map(|d| d.message.as_str()).collect();
    assert!(messages.is_empty(), "{:?} reported {:?}", text, messages);
    assert_eq!(result.value, Some(expected), "evaluating {:?}", text);
}

/// Source text with `[` and `]` marking where diagnostics are expected.
struct AnnotatedText {
    text: String,
    spans: Vec<TextSpan>,
}

impl AnnotatedText {
    fn parse(annotated: &str) -> Self {
        let mut text = String::new();
        let mut spans = Vec::new();
        let mut starts = Vec::new();
        let mut position = 0;

        for c in annotated.chars() {
            match c {
                '[' => starts.push(position),
                ']' => {
                    let start = starts.pop().expect("unbalanced ']' in annotated text");
                    spans.push(TextSpan::from_bounds(start, position));
                }
                _ => {
                    text.push(c);
                    position += 1;
                }
            }
        }

        assert!(starts.is_empty(), "unbalanced '[' in annotated text");
        Self { text, spans }
    }
}

fn assert_diagnostics(annotated: &str, expected: &[&str]) {
    let annotated = AnnotatedText::parse(annotated);
    assert_eq!(
        annotated.spans.len(),
        expected.len(),
        "every expected diagnostic needs a marked span"
    );

    let result = evaluate(&annotated.text);
    assert_eq!(result.value, None);

    let actual: Vec<(&str, TextSpan)> = result
        .diagnostics
        .iter()
        .map(|d| (d.message.as_str(), d.span))
        .collect();
    let expected: Vec<(&str, TextSpan)> = expected
        .iter()
        .copied()
        .zip(annotated.spans.iter().copied())
        .collect();
    assert_eq!(actual, expected, "diagnostics for {:?}", annotated.text);
}

// ============================================================================
// Values
// ============================================================================

#[test]
fn evaluates_expressions() {
    let cases: Vec<(&str, Value)> = vec![
        ("1", Value::Number(1)),
        ("+1", Value::Number(1)),
        ("-1", Value::Number(-1)),
        ("14 + 12", Value::Number(26)),
        ("12 - 3", Value::Number(9)),
        ("4 * 2", Value::Number(8)),
        ("9 / 3", Value::Number(3)),
        ("7 / 2", Value::Number(3)),
        ("10 % 3", Value::Number(1)),
        ("(10)", Value::Number(10)),
        ("-(18 - 51)", Value::Number(33)),
        ("1 + 2 * 3", Value::Number(7)),
        ("12 == 3", Value::Bool(false)),
        ("5 == 5", Value::Bool(true)),
        ("12 != 3", Value::Bool(true)),
        ("3 < 4", Value::Bool(true)),
        ("5 <= 4", Value::Bool(false)),
        ("4 > 3", Value::Bool(true)),
        ("4 >= 4", Value::Bool(true)),
        ("true", Value::Bool(true)),
        ("!true", Value::Bool(false)),
        ("true && false", Value::Bool(false)),
        ("false || true", Value::Bool(true)),
        ("false || false", Value::Bool(false)),
        ("true == false", Value::Bool(false)),
        ("1 < 2 && 2 < 3 || false", Value::Bool(true)),
        ("\"a\" + \"b\"", Value::String("ab".to_string())),
        ("\"a\" == \"a\"", Value::Bool(true)),
        ("\"x\" + 1", Value::String("x1".to_string())),
        ("1 + \"x\"", Value::String("1x".to_string())),
        ("\"is \" + true", Value::String("is true".to_string())),
        ("string(10) + string(true)", Value::String("10true".to_string())),
        ("\"say \"\"hi\"\"\"", Value::String("say \"hi\"".to_string())),
        ("9223372036854775807 + 1", Value::Number(i64::MIN)),
    ];

    for (text, expected) in cases {
        assert_value(text, expected);
    }
}

#[test]
fn evaluates_statements() {
    let cases: Vec<(&str, Value)> = vec![
        ("var a = 10", Value::Number(10)),
        ("let b: string = \"x\"", Value::String("x".to_string())),
        ("{ var a = 10 (a * a) }", Value::Number(100)),
        ("{ var a = 0 (a = 10) * a }", Value::Number(100)),
        ("{ var a = 0 if a == 0 a = 10 a }", Value::Number(10)),
        ("{ var a = 0 if a == 4 a = 10 a }", Value::Number(0)),
        ("{ var a = 0 if a == 0 a = 10 else a = 5 a }", Value::Number(10)),
        ("{ var a = 0 if a == 4 a = 10 else a = 5 a }", Value::Number(5)),
        (
            "{ var i = 10 var result = 0 while i > 0 { result = result + i i = i - 1 } result }",
            Value::Number(55),
        ),
        (
            "{ var result = 0 for i = 1 to 10 { result = result + i } result }",
            Value::Number(45),
        ),
        ("{ var x = 1 { var x = 2 } x }", Value::Number(1)),
        ("{ var a = 0 false && (a = 1) == 1 a }", Value::Number(0)),
        ("{ var a = 0 true || (a = 1) == 1 a }", Value::Number(0)),
        ("{ var a = 0 true && (a = 1) == 1 a }", Value::Number(1)),
    ];

    for (text, expected) in cases {
        assert_value(text, expected);
    }
}

#[test]
fn assignment_declares_and_leaves_value_in_store() {
    let compilation = Compilation::new(SyntaxTree::parse("(a = 10) * a"));
    let mut variables = Variables::new();
    let result = compilation.evaluate(&mut variables, &mut ScriptedHost::default());

    assert!(result.diagnostics.is_empty());
    assert_eq!(result.value, Some(Value::Number(100)));

    let globals = &compilation.global_scope().variables;
    assert_eq!(globals.len(), 1);
    assert_eq!(globals[0].name(), "a");
    assert_eq!(globals[0].kind(), VariableKind::Global);
    assert_eq!(variables.get(&globals[0]), Some(&Value::Number(10)));
}

#[test]
fn for_upper_bound_is_checked_every_iteration() {
    assert_value(
        "{ var n = 3 var count = 0 for i = 0 to n { n = 5 count = count + 1 } count }",
        Value::Number(5),
    );
}

#[test]
fn empty_program_evaluates_to_nil() {
    assert_value("", Value::Nil);
}

// ============================================================================
// Built-in functions
// ============================================================================

#[test]
fn print_goes_to_the_host() {
    let mut host = ScriptedHost::default();
    let result = evaluate_with("for i = 0 to 3 print(string(i))", &mut host);

    assert!(result.diagnostics.is_empty());
    assert_eq!(host.output, vec!["0", "1", "2"]);
}

#[test]
fn read_takes_a_line_from_the_host() {
    let mut host = ScriptedHost::with_input(&["Bob"]);
    let result = evaluate_with("{ var name = read() print(\"Hello \" + name) }", &mut host);

    assert!(result.diagnostics.is_empty());
    assert_eq!(host.output, vec!["Hello Bob"]);
}

#[test]
fn parse_int_yields_nil_on_bad_input() {
    assert_value("parseInt(\"42\") + 1", Value::Number(43));
    assert_value("parseInt(\" -7 \")", Value::Number(-7));
    assert_value("parseInt(\"abc\")", Value::Nil);

    let mut host = ScriptedHost::with_input(&["12", "30"]);
    let result = evaluate_with("parseInt(read()) + parseInt(read())", &mut host);
    assert_eq!(result.value, Some(Value::Number(42)));
}

// ============================================================================
// Runtime errors
// ============================================================================

#[test]
fn runtime_errors_are_reported() {
    let cases = [
        ("1 / 0", "Division by zero"),
        ("10 % 0", "Division by zero"),
        ("parseInt(\"abc\") + 1", "Cannot add nil and number"),
        ("-parseInt(\"abc\")", "Cannot apply '-' to nil"),
        ("parseInt(\"x\") < 1", "Cannot compare nil and number"),
    ];

    for (text, message) in cases {
        let result = evaluate(text);
        assert_eq!(result.value, None, "evaluating {:?}", text);
        let messages: Vec<&str> = result.diagnostics.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, vec![message], "evaluating {:?}", text);
    }
}

#[test]
fn runtime_error_points_at_the_expression() {
    let annotated = AnnotatedText::parse("{ var x = 0 [10 / x] }");
    let result = evaluate(&annotated.text);

    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].span, annotated.spans[0]);
}

#[test]
fn runtime_error_in_a_for_loop_points_at_its_header() {
    let annotated = AnnotatedText::parse(
        "var n = 0\nvar k = parseInt(\"q\")\n[for i = 0 to k] { n = n + 1 }",
    );
    let result = evaluate(&annotated.text);

    let actual: Vec<(&str, TextSpan)> = result
        .diagnostics
        .iter()
        .map(|d| (d.message.as_str(), d.span))
        .collect();
    assert_eq!(actual, vec![("Cannot compare number and nil", annotated.spans[0])]);
}

#[test]
fn unset_variable_points_at_its_use() {
    let annotated = AnnotatedText::parse("1 + [x]");
    let first = Rc::new(Compilation::new(SyntaxTree::parse("var x = 1")));
    // The declaring submission never ran, so x has no value yet
    let second = Compilation::continue_with(first, SyntaxTree::parse(&annotated.text));

    let mut variables = Variables::new();
    let result = second.evaluate(&mut variables, &mut ScriptedHost::default());

    let actual: Vec<(&str, TextSpan)> = result
        .diagnostics
        .iter()
        .map(|d| (d.message.as_str(), d.span))
        .collect();
    assert_eq!(actual, vec![("Variable 'x' has no value", annotated.spans[0])]);
}

#[test]
fn host_can_cancel_a_runaway_loop() {
    let mut host = ScriptedHost {
        cancel_after: Some(100),
        ..ScriptedHost::default()
    };
    let result = evaluate_with("while true { }", &mut host);

    let messages: Vec<&str> = result.diagnostics.iter().map(|d| d.message.as_str()).collect();
    assert_eq!(messages, vec!["Evaluation cancelled"]);
    assert_eq!(result.value, None);
}

// ============================================================================
// Diagnostics
// ============================================================================

#[test]
fn reports_redeclaration() {
    assert_diagnostics(
        "{ var x = 10 var y = 100 { var x = 10 } var [x] = 5 }",
        &["Variable 'x' is already declared in this scope"],
    );
}

#[test]
fn reports_undefined_variable() {
    assert_diagnostics("[x] * 10", &["Undefined variable 'x'"]);
}

#[test]
fn reports_assignment_to_read_only() {
    assert_diagnostics(
        "{ let x = 10 x [=] 0 }",
        &["Variable 'x' is read-only and cannot be assigned to"],
    );
    assert_diagnostics(
        "for i = 0 to 10 i [=] 5",
        &["Variable 'i' is read-only and cannot be assigned to"],
    );
}

#[test]
fn reports_type_mismatches() {
    assert_diagnostics(
        "{ var x = 10 x = [true] }",
        &["Cannot convert type 'bool' to 'number'"],
    );
    assert_diagnostics(
        "{ var x = 0 if [10] x = 10 }",
        &["Cannot convert type 'number' to 'bool'"],
    );
    assert_diagnostics(
        "{ var x = 0 while [x] x = 10 }",
        &["Cannot convert type 'number' to 'bool'"],
    );
    assert_diagnostics(
        "for i = [false] to 10 { }",
        &["Cannot convert type 'bool' to 'number'"],
    );
    assert_diagnostics(
        "var s: string = [1]",
        &["Cannot convert type 'number' to 'string' implicitly"],
    );
}

#[test]
fn reports_undefined_operators() {
    assert_diagnostics("[+]true", &["Unary operator '+' is not defined for type 'bool'"]);
    assert_diagnostics(
        "10 [*] false",
        &["Binary operator '*' is not defined for types 'number' and 'bool'"],
    );
    assert_diagnostics(
        "\"a\" [<] \"b\"",
        &["Binary operator '<' is not defined for types 'string' and 'string'"],
    );
}

#[test]
fn reports_calls() {
    assert_diagnostics("[foo](1)", &["Function 'foo' doesn't exist"]);
    assert_diagnostics(
        "[print()]",
        &["Function 'print' requires 1 argument(s) but was given 0"],
    );
    assert_diagnostics(
        "print([1])",
        &["Parameter 'text' requires a value of type 'string' but was given a value of type 'number'"],
    );
    assert_diagnostics("var x = [print(\"a\")]", &["Expression must have a value"]);
    assert_diagnostics("var x: [foo] = 1", &["Type 'foo' doesn't exist"]);
}

#[test]
fn error_types_suppress_cascades() {
    assert_diagnostics("[x] + 1 == 2 && true", &["Undefined variable 'x'"]);
    assert_diagnostics(
        "[y] + 1 + [-]true",
        &["Undefined variable 'y'", "Unary operator '-' is not defined for type 'bool'"],
    );
    assert_diagnostics("{ var a = [b] a * true }", &["Undefined variable 'b'"]);
}

#[test]
fn diagnostics_are_in_source_order() {
    assert_diagnostics(
        "1 + [$][]",
        &["Invalid character: '$'", "Unexpected token <EndOfFile>, expected <Number>"],
    );
    assert_diagnostics(
        "[)] [$]",
        &["Unexpected token <RightParen>, expected <Number>", "Invalid character: '$'"],
    );
    assert_diagnostics(
        "[x] + (1[]",
        &["Undefined variable 'x'", "Unexpected token <EndOfFile>, expected <RightParen>"],
    );
    assert_diagnostics(
        "[foo]([y])",
        &["Function 'foo' doesn't exist", "Undefined variable 'y'"],
    );
    assert_diagnostics(
        "{ let x = 1 x [=] [z] }",
        &["Variable 'x' is read-only and cannot be assigned to", "Undefined variable 'z'"],
    );
}

#[test]
fn incomplete_input_never_evaluates() {
    let result = evaluate("1 +");
    assert_eq!(result.value, None);
    assert_eq!(result.diagnostics.len(), 1);
}

#[test]
fn plain_rendering_has_line_and_column() {
    let text = "var a = 1\nvar b = c";
    let result = evaluate(text);
    let source = SourceText::new(text);

    let rendered: Vec<String> = result
        .diagnostics
        .iter()
        .map(|d| d.render_plain(&source))
        .collect();
    assert_eq!(rendered, vec!["(2, 9): Undefined variable 'c'"]);
}

#[test]
fn conversion_classification() {
    assert_eq!(Conversion::classify(TypeSymbol::Number, TypeSymbol::Number), Conversion::Identity);
    assert_eq!(Conversion::classify(TypeSymbol::Number, TypeSymbol::String), Conversion::Explicit);
    assert_eq!(Conversion::classify(TypeSymbol::Bool, TypeSymbol::String), Conversion::Explicit);
    assert_eq!(Conversion::classify(TypeSymbol::String, TypeSymbol::Number), Conversion::Invalid);

    assert!(Conversion::Identity.is_implicit());
    assert!(!Conversion::Explicit.is_implicit());
    assert!(Conversion::Explicit.exists());
    assert!(!Conversion::Invalid.exists());
}

// ============================================================================
// Submissions
// ============================================================================

#[test]
fn continued_compilations_see_earlier_globals() {
    let mut variables = Variables::new();
    let mut host = ScriptedHost::default();

    let first = Rc::new(Compilation::new(SyntaxTree::parse("var x = 10")));
    assert_eq!(first.evaluate(&mut variables, &mut host).value, Some(Value::Number(10)));

    let second = Rc::new(Compilation::continue_with(Rc::clone(&first), SyntaxTree::parse("x * 2")));
    assert_eq!(second.evaluate(&mut variables, &mut host).value, Some(Value::Number(20)));

    // Redeclaring in a later submission shadows instead of conflicting
    let third = Rc::new(Compilation::continue_with(
        Rc::clone(&second),
        SyntaxTree::parse("var x = \"s\""),
    ));
    let result = third.evaluate(&mut variables, &mut host);
    assert!(result.diagnostics.is_empty());

    let fourth = Compilation::continue_with(Rc::clone(&third), SyntaxTree::parse("x + \"!\""));
    assert_eq!(
        fourth.evaluate(&mut variables, &mut host).value,
        Some(Value::String("s!".to_string()))
    );
}

#[test]
fn visible_symbols_list_newest_declaration_once() {
    let mut variables = Variables::new();
    let mut host = ScriptedHost::default();

    let first = Rc::new(Compilation::new(SyntaxTree::parse("var x = 1 let y = true")));
    first.evaluate(&mut variables, &mut host);
    let second = Compilation::continue_with(Rc::clone(&first), SyntaxTree::parse("var x = \"s\""));
    second.evaluate(&mut variables, &mut host);

    let symbols = second.visible_symbols();
    let names: Vec<String> = symbols.iter().map(Symbol::name).collect();
    assert_eq!(
        names,
        vec!["x", "y", "print", "read", "parseInt", "bool", "number", "string"]
    );
    assert_eq!(symbols[0].to_string(), "var x: string");
    assert_eq!(symbols[1].to_string(), "let y: bool");
}

#[test]
fn parameter_and_label_symbols() {
    let text = Symbol::Parameter(BuiltinFunction::ParseInt.parameters()[0]);
    assert_eq!(text.name(), "text");
    assert_eq!(text.to_string(), "text: string");
    assert_eq!(
        Symbol::Function(BuiltinFunction::ParseInt).to_string(),
        "parseInt(text: string): number"
    );

    let label = Symbol::Label(LabelSymbol(3));
    assert_eq!(label.name(), "Label3");
    assert_eq!(label.to_string(), "Label3:");
}

#[test]
fn repl_only_keeps_successful_submissions() {
    let mut repl = Repl::new();
    let mut host = ScriptedHost::default();

    let (_, result) = repl.evaluate_submission("var x = 1", &mut host);
    assert_eq!(result.value, Some(Value::Number(1)));

    let (_, result) = repl.evaluate_submission("var y = x +", &mut host);
    assert!(!result.is_success());

    // y never made it into scope
    let (_, result) = repl.evaluate_submission("y", &mut host);
    let messages: Vec<&str> = result.diagnostics.iter().map(|d| d.message.as_str()).collect();
    assert_eq!(messages, vec!["Undefined variable 'y'"]);

    let (_, result) = repl.evaluate_submission("x + 1", &mut host);
    assert_eq!(result.value, Some(Value::Number(2)));
}

#[test]
fn repl_keeps_only_reachable_values() {
    let mut repl = Repl::new();
    let mut host = ScriptedHost::default();

    repl.evaluate_submission("var x = 1", &mut host);
    assert_eq!(repl.variables().len(), 1);

    // z is written before the failure but its submission is discarded
    let (_, result) = repl.evaluate_submission("var z = 5 var w = 1 / 0", &mut host);
    assert!(!result.is_success());
    assert_eq!(repl.variables().len(), 1);

    // Block locals and loop variables don't outlive their submission
    let (_, result) = repl.evaluate_submission("{ var t = 2 }", &mut host);
    assert_eq!(result.value, Some(Value::Number(2)));
    repl.evaluate_submission("for i = 0 to 3 { x = x + i }", &mut host);

    let values: Vec<&Value> = repl.variables().values().collect();
    assert_eq!(values, vec![&Value::Number(4)]);
}

#[test]
fn repl_submission_completeness() {
    assert!(!Repl::is_complete_submission(""));
    assert!(Repl::is_complete_submission("x\n"));
    assert!(!Repl::is_complete_submission("1 +\n"));
    assert!(!Repl::is_complete_submission("{\nvar a = 1\n"));
    assert!(Repl::is_complete_submission("{\nvar a = 1\n}\n"));
    // A blank line submits whatever is there
    assert!(Repl::is_complete_submission("1 +\n\n"));
}
