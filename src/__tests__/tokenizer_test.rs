use crate::tokenizer::tokenize;
use crate::util::Code;
use crate::{Syntax, Token};

fn tokens(text: &str) -> Vec<Token> {
    let code = Code::new(text);
    tokenize(&code, Syntax::Hocon)
        .into_iter()
        .map(|lex| lex.token)
        .collect()
}

#[test]
pub fn basic_tokens_test() {
    assert_eq!(
        tokens("{ a : 1 }"),
        vec![
            Token::Start,
            Token::OpenBrace,
            Token::UnquotedText("a".to_string()),
            Token::EqualsOrColon,
            Token::Int {
                value: 1,
                raw: "1".to_string()
            },
            Token::CloseBrace,
            Token::End,
        ]
    );
}

#[test]
pub fn number_classification_test() {
    match &tokens("a : 2147483648")[3] {
        Token::Long { value, .. } => assert_eq!(*value, 2147483648),
        other => panic!("expected Long, got {:?}", other),
    }
    match &tokens("a : 1.5e3")[3] {
        Token::Double { value, raw } => {
            assert_eq!(*value, 1500.0);
            assert_eq!(raw, "1.5e3");
        }
        other => panic!("expected Double, got {:?}", other),
    }
    // a failed number parse falls back to unquoted text
    match &tokens("a : 1.2.3")[3] {
        Token::UnquotedText(s) => assert_eq!(s, "1.2.3"),
        other => panic!("expected UnquotedText, got {:?}", other),
    }
}

#[test]
pub fn whitespace_between_simple_values_test() {
    // the space between two simple values is kept for concatenation
    let toks = tokens("a : true foo");
    assert_eq!(toks[4], Token::UnquotedText(" ".to_string()));
    // the space before a bracket is not
    let toks = tokens("a : [1] [2]");
    assert!(!toks.iter().any(|t| t.is_whitespace_text()));
}

#[test]
pub fn newline_token_carries_line_test() {
    let toks = tokens("a : 1\nb : 2");
    assert!(toks.contains(&Token::Newline(1)));
}

#[test]
pub fn comment_tokens_test() {
    let toks = tokens("# hello\na : 1 // trailing");
    assert_eq!(toks[1], Token::Comment(" hello".to_string()));
    assert_eq!(toks.last(), Some(&Token::End));
    assert!(toks.contains(&Token::Comment(" trailing".to_string())));
}

#[test]
pub fn quoted_string_escapes_test() {
    match &tokens(r#"a : "x\n\tA\"" "#)[3] {
        Token::QuotedString { value, .. } => assert_eq!(value, "x\n\tA\""),
        other => panic!("expected QuotedString, got {:?}", other),
    }
}

#[test]
pub fn substitution_token_test() {
    match &tokens("a : ${x.y}")[3] {
        Token::Substitution { optional, tokens } => {
            assert!(!optional);
            assert_eq!(tokens.len(), 1);
            assert_eq!(tokens[0].token, Token::UnquotedText("x.y".to_string()));
        }
        other => panic!("expected Substitution, got {:?}", other),
    }
    match &tokens("a : ${?x}")[3] {
        Token::Substitution { optional, .. } => assert!(optional),
        other => panic!("expected Substitution, got {:?}", other),
    }
}

#[test]
pub fn reserved_character_is_problem_test() {
    let toks = tokens("a : @b");
    assert!(toks.iter().any(|t| matches!(t, Token::Problem(message) if message.contains("Reserved character"))));
}

#[test]
pub fn unterminated_string_is_problem_test() {
    let toks = tokens("a : \"oops\nb : 1");
    assert!(toks.iter().any(|t| matches!(t, Token::Problem(_))));
}

#[test]
pub fn plus_equals_token_test() {
    assert!(tokens("a += 1").contains(&Token::PlusEquals));
}

#[test]
pub fn log_label_assigned_once_test() {
    use crate::tokenizer::Tokenizer;
    use crate::util::Log;

    let code = Code::new("a : 1");
    let tokenizer = Tokenizer::new(&code, Syntax::Hocon);
    tokenizer.set_log(Log::Success("tokens")).unwrap();
    match tokenizer.set_log(Log::Verbose("tokens-again")) {
        Err(message) => assert!(message.contains("already assigned"), "{}", message),
        Ok(()) => panic!("expected the second log assignment to fail"),
    }
    let toks = tokenizer.tokenize();
    assert_eq!(toks.last().map(|lex| lex.token.clone()), Some(Token::End));
}

#[test]
pub fn json_flavor_rejects_extensions_test() {
    let code = Code::new("{\"a\" = 1}");
    let toks = tokenize(&code, Syntax::Json);
    assert!(toks
        .iter()
        .any(|lex| matches!(&lex.token, Token::Problem(message) if message.contains("'='"))));

    let code = Code::new("{\"a\" : ${b}}");
    let toks = tokenize(&code, Syntax::Json);
    assert!(toks
        .iter()
        .any(|lex| matches!(&lex.token, Token::Problem(message) if message.contains("substitutions"))));

    let code = Code::new("{\"a\" : 1} # no comments");
    let toks = tokenize(&code, Syntax::Json);
    assert!(toks
        .iter()
        .any(|lex| matches!(&lex.token, Token::Problem(message) if message.contains("Comments"))));
}
