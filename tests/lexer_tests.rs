// Lexer tests: every token kind round-trips through its text, and adjacent
// tokens only merge where the grammar says they must be separated.

use flint::lexer::{Lexer, TokenType};
use flint::source::SourceText;
use flint::value::Value;
use flint::SyntaxTree;

fn lex(text: &str) -> Vec<(TokenType, String)> {
    let (tokens, _) = SyntaxTree::parse_tokens(text);
    tokens
        .into_iter()
        .map(|token| (token.token_type, token.text))
        .collect()
}

fn dynamic_tokens() -> Vec<(TokenType, &'static str)> {
    vec![
        (TokenType::Identifier, "a"),
        (TokenType::Identifier, "abc"),
        (TokenType::Identifier, "_tmp1"),
        (TokenType::Number, "1"),
        (TokenType::Number, "123"),
        (TokenType::String, "\"Test\""),
        (TokenType::String, "\"Te\"\"st\""),
    ]
}

fn separators() -> Vec<(TokenType, &'static str)> {
    vec![
        (TokenType::Whitespace, " "),
        (TokenType::Whitespace, "  "),
        (TokenType::Whitespace, "\t"),
        (TokenType::Whitespace, "\n"),
        (TokenType::Whitespace, "\r\n"),
    ]
}

fn all_tokens() -> Vec<(TokenType, &'static str)> {
    let mut tokens: Vec<(TokenType, &'static str)> = TokenType::ALL
        .iter()
        .filter_map(|kind| kind.fixed_text().map(|text| (*kind, text)))
        .collect();
    tokens.extend(dynamic_tokens());
    tokens
}

fn is_word(kind: TokenType) -> bool {
    kind == TokenType::Identifier || kind.is_keyword()
}

fn requires_separator(first: TokenType, second: TokenType) -> bool {
    if is_word(first) && (is_word(second) || second == TokenType::Number) {
        return true;
    }
    if first == TokenType::Number && second == TokenType::Number {
        return true;
    }
    if first == TokenType::String && second == TokenType::String {
        return true;
    }
    if first == TokenType::Slash && second == TokenType::Slash {
        return true;
    }
    matches!(
        first,
        TokenType::Bang | TokenType::Equal | TokenType::Less | TokenType::Greater
    ) && matches!(second, TokenType::Equal | TokenType::EqualEqual)
}

#[test]
fn every_token_round_trips() {
    let mut all = all_tokens();
    all.extend(separators());
    all.push((TokenType::Comment, "// a comment"));

    for (kind, text) in all {
        let tokens = lex(text);
        assert_eq!(tokens, vec![(kind, text.to_string())], "lexing {:?}", text);
    }
}

#[test]
fn every_token_type_is_tested() {
    let tested: Vec<TokenType> = all_tokens()
        .into_iter()
        .map(|(kind, _)| kind)
        .chain([TokenType::Whitespace, TokenType::Comment])
        .collect();

    let untested: Vec<TokenType> = TokenType::ALL
        .iter()
        .copied()
        .filter(|kind| !matches!(kind, TokenType::BadToken | TokenType::EndOfFile))
        .filter(|kind| !tested.contains(kind))
        .collect();

    assert!(untested.is_empty(), "token types without a test: {:?}", untested);
}

#[test]
fn adjacent_tokens_without_separator() {
    for (first, first_text) in all_tokens() {
        for (second, second_text) in all_tokens() {
            if requires_separator(first, second) {
                continue;
            }

            let text = format!("{}{}", first_text, second_text);
            assert_eq!(
                lex(&text),
                vec![(first, first_text.to_string()), (second, second_text.to_string())],
                "lexing {:?}",
                text
            );
        }
    }
}

#[test]
fn adjacent_tokens_with_separator() {
    for (first, first_text) in all_tokens() {
        for (second, second_text) in all_tokens() {
            if !requires_separator(first, second) {
                continue;
            }

            for (separator, separator_text) in separators() {
                let text = format!("{}{}{}", first_text, separator_text, second_text);
                assert_eq!(
                    lex(&text),
                    vec![
                        (first, first_text.to_string()),
                        (separator, separator_text.to_string()),
                        (second, second_text.to_string()),
                    ],
                    "lexing {:?}",
                    text
                );
            }
        }
    }
}

#[test]
fn pairs_needing_a_separator_merge_without_one() {
    for (first, first_text) in all_tokens() {
        for (second, second_text) in all_tokens() {
            if !requires_separator(first, second) {
                continue;
            }

            let text = format!("{}{}", first_text, second_text);
            let kinds: Vec<TokenType> = lex(&text).into_iter().map(|(kind, _)| kind).collect();
            assert_ne!(kinds, vec![first, second], "lexing {:?}", text);
        }
    }
}

#[test]
fn literal_values() {
    let (tokens, diagnostics) = SyntaxTree::parse_tokens("42 \"say \"\"hi\"\"\" true false");
    assert!(diagnostics.is_empty());

    let values: Vec<Option<Value>> = tokens
        .into_iter()
        .filter(|token| token.token_type != TokenType::Whitespace)
        .map(|token| token.value)
        .collect();
    assert_eq!(
        values,
        vec![
            Some(Value::Number(42)),
            Some(Value::String("say \"hi\"".to_string())),
            Some(Value::Bool(true)),
            Some(Value::Bool(false)),
        ]
    );
}

#[test]
fn invalid_character_is_reported() {
    let (tokens, diagnostics) = SyntaxTree::parse_tokens("1 $ 2");

    assert_eq!(tokens[2].token_type, TokenType::BadToken);
    assert_eq!(tokens[2].text, "$");

    let messages: Vec<&str> = diagnostics.iter().map(|d| d.message.as_str()).collect();
    assert_eq!(messages, vec!["Invalid character: '$'"]);
    assert_eq!(diagnostics.iter().next().map(|d| d.span.start), Some(2));
}

#[test]
fn number_out_of_range_is_reported() {
    let (tokens, diagnostics) = SyntaxTree::parse_tokens("99999999999999999999");

    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].token_type, TokenType::Number);
    assert_eq!(tokens[0].value, Some(Value::Number(0)));

    let messages: Vec<&str> = diagnostics.iter().map(|d| d.message.as_str()).collect();
    assert_eq!(messages, vec!["Invalid number: 99999999999999999999"]);
}

#[test]
fn unterminated_string_is_reported() {
    let (tokens, diagnostics) = SyntaxTree::parse_tokens("\"abc\nx");

    assert_eq!(tokens[0].token_type, TokenType::String);
    assert_eq!(tokens[0].value, Some(Value::String("abc".to_string())));
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(
        diagnostics.iter().next().map(|d| d.message.as_str()),
        Some("Unterminated string literal")
    );
}

#[test]
fn end_of_file_repeats() {
    let source = SourceText::new("x");
    let mut lexer = Lexer::new(&source);

    assert_eq!(lexer.next_token().token_type, TokenType::Identifier);
    for _ in 0..3 {
        let token = lexer.next_token();
        assert_eq!(token.token_type, TokenType::EndOfFile);
        assert_eq!(token.span.start, 1);
        assert!(!token.is_missing());
    }
    assert!(lexer.diagnostics().is_empty());
}

#[test]
fn iterator_stops_after_end_of_file() {
    let source = SourceText::new("a + b");
    let kinds: Vec<TokenType> = Lexer::new(&source).map(|token| token.token_type).collect();

    assert_eq!(
        kinds,
        vec![
            TokenType::Identifier,
            TokenType::Whitespace,
            TokenType::Plus,
            TokenType::Whitespace,
            TokenType::Identifier,
            TokenType::EndOfFile,
        ]
    );
}

#[test]
fn line_and_column_lookup() {
    let source = SourceText::new("ab\r\ncd\nef");

    assert_eq!(source.lines().len(), 3);
    assert_eq!(source.line_column(0), (0, 0));
    assert_eq!(source.line_column(1), (0, 1));
    assert_eq!(source.line_column(4), (1, 0));
    assert_eq!(source.line_column(7), (2, 0));
    assert_eq!(source.line_column(8), (2, 1));
}
