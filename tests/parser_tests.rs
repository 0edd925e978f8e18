// Parser tests: operator precedence and associativity for every operator
// pair, statement shapes, and recovery from missing tokens.

use flint::ast::{Expr, Stmt};
use flint::lexer::TokenType;
use flint::SyntaxTree;

/// Fully parenthesized rendering of an expression's shape.
fn shape(expression: &Expr) -> String {
    match expression {
        Expr::Literal { token, .. } if token.is_missing() => "<missing>".to_string(),
        Expr::Literal { token, .. } => token.text.clone(),
        Expr::Name { identifier } => identifier.text.clone(),
        Expr::Unary { operator, operand } => format!("({}{})", operator.text, shape(operand)),
        Expr::Binary {
            left,
            operator,
            right,
        } => format!("({} {} {})", shape(left), operator.text, shape(right)),
        Expr::Parenthesized { expression, .. } => shape(expression),
        Expr::Assignment {
            identifier,
            expression,
            ..
        } => format!("({} = {})", identifier.text, shape(expression)),
        Expr::Call {
            identifier,
            arguments,
            ..
        } => {
            let arguments: Vec<String> = arguments.iter().map(shape).collect();
            format!("{}({})", identifier.text, arguments.join(", "))
        }
    }
}

fn parse_expression(text: &str) -> Expr {
    let tree = SyntaxTree::parse(text);
    assert!(tree.diagnostics.is_empty(), "diagnostics for {:?}", text);
    assert_eq!(tree.root.statements.len(), 1);
    match tree.root.statements.into_iter().next() {
        Some(Stmt::Expression { expression }) => expression,
        other => panic!("expected an expression statement, got {:?}", other),
    }
}

fn text(kind: TokenType) -> &'static str {
    kind.fixed_text().expect("operators have fixed text")
}

#[test]
fn binary_operators_honor_precedence() {
    for op1 in TokenType::binary_operators() {
        for op2 in TokenType::binary_operators() {
            let source = format!("a {} b {} c", text(op1), text(op2));
            let expected = if op1.binary_precedence() >= op2.binary_precedence() {
                format!("((a {} b) {} c)", text(op1), text(op2))
            } else {
                format!("(a {} (b {} c))", text(op1), text(op2))
            };

            assert_eq!(shape(&parse_expression(&source)), expected, "parsing {:?}", source);
        }
    }
}

#[test]
fn unary_operators_bind_tighter_than_binary() {
    for unary in TokenType::unary_operators() {
        for binary in TokenType::binary_operators() {
            let source = format!("{}a {} b", text(unary), text(binary));
            let expected = format!("(({}a) {} b)", text(unary), text(binary));

            assert_eq!(shape(&parse_expression(&source)), expected, "parsing {:?}", source);
        }
    }
}

#[test]
fn assignment_is_right_associative() {
    assert_eq!(shape(&parse_expression("a = b = 1 + 2")), "(a = (b = (1 + 2)))");
}

#[test]
fn parentheses_override_precedence() {
    assert_eq!(shape(&parse_expression("(1 + 2) * 3")), "((1 + 2) * 3)");
    assert_eq!(shape(&parse_expression("-(18 - 51)")), "(-(18 - 51))");
}

#[test]
fn calls_take_comma_separated_arguments() {
    assert_eq!(shape(&parse_expression("print(\"a\" + b)")), "print((\"a\" + b))");
    assert_eq!(shape(&parse_expression("f(1, 2, x = 3)")), "f(1, 2, (x = 3))");
    assert_eq!(shape(&parse_expression("read()")), "read()");
}

#[test]
fn statements_parse_into_their_kinds() {
    let tree = SyntaxTree::parse(
        "var x = 1
         let y: number = 2
         if x < y { x = y } else x = 0
         while x > 0 x = x - 1
         for i = 0 to 10 print(string(i))
         x",
    );
    assert!(tree.diagnostics.is_empty());

    let kinds: Vec<&str> = tree.root.statements.iter().map(|s| s.kind_name()).collect();
    assert_eq!(
        kinds,
        vec![
            "VariableDeclaration",
            "VariableDeclaration",
            "IfStatement",
            "WhileStatement",
            "ForStatement",
            "ExpressionStatement",
        ]
    );

    assert!(matches!(
        &tree.root.statements[0],
        Stmt::VariableDeclaration { type_clause: None, keyword, .. } if keyword.token_type == TokenType::Var
    ));
    assert!(matches!(
        &tree.root.statements[1],
        Stmt::VariableDeclaration { type_clause: Some(clause), keyword, .. }
            if keyword.token_type == TokenType::Let && clause.identifier.text == "number"
    ));
    assert!(matches!(&tree.root.statements[2], Stmt::If { else_clause: Some(_), .. }));
}

#[test]
fn missing_operand_reports_once_at_end_of_file() {
    let tree = SyntaxTree::parse("1 +");

    let messages: Vec<&str> = tree.diagnostics.iter().map(|d| d.message.as_str()).collect();
    assert_eq!(messages, vec!["Unexpected token <EndOfFile>, expected <Number>"]);
    assert_eq!(tree.diagnostics.iter().next().map(|d| d.span.start), Some(3));

    match &tree.root.statements[..] {
        [Stmt::Expression { expression }] => assert_eq!(shape(expression), "(1 + <missing>)"),
        other => panic!("unexpected statements {:?}", other),
    }
    assert!(!tree.is_complete());
}

#[test]
fn missing_close_brace_is_synthesized() {
    let tree = SyntaxTree::parse("{ var a = 1");

    let messages: Vec<&str> = tree.diagnostics.iter().map(|d| d.message.as_str()).collect();
    assert_eq!(messages, vec!["Unexpected token <EndOfFile>, expected <RightBrace>"]);

    match &tree.root.statements[..] {
        [Stmt::Block {
            statements,
            close_brace,
            ..
        }] => {
            assert_eq!(statements.len(), 1);
            assert!(close_brace.is_missing());
            assert_eq!(close_brace.span.length, 0);
        }
        other => panic!("unexpected statements {:?}", other),
    }
    assert!(!tree.is_complete());
}

#[test]
fn stray_tokens_do_not_stop_the_parse() {
    let tree = SyntaxTree::parse(") ) x");

    assert!(!tree.diagnostics.is_empty());
    assert_eq!(tree.root.end_of_file.token_type, TokenType::EndOfFile);
    // The trailing name is still parsed
    assert!(tree.root.statements.iter().any(|statement| matches!(
        statement,
        Stmt::Expression { expression: Expr::Name { identifier } } if identifier.text == "x"
    )));
}

#[test]
fn spans_cover_first_to_last_token() {
    let expression = parse_expression("  foo(1, 2)  ");
    let span = expression.span();
    assert_eq!(span.start, 2);
    assert_eq!(span.end(), 11);
}

#[test]
fn complete_submissions() {
    assert!(SyntaxTree::parse("").is_complete());
    assert!(SyntaxTree::parse("x = 1").is_complete());
    assert!(SyntaxTree::parse("{ x = 1 }").is_complete());
    assert!(!SyntaxTree::parse("if x").is_complete());
    assert!(!SyntaxTree::parse("while true {").is_complete());
}
