use crate::util::{Code, Log};
use crate::{Lex, Syntax, Token};
use once_cell::unsync::OnceCell;

/// Characters that may never appear in unquoted text.
fn is_forbidden_char(c: char) -> bool {
    matches!(
        c,
        '$' | '"'
            | '{'
            | '}'
            | '['
            | ']'
            | ':'
            | '='
            | ','
            | '+'
            | '#'
            | '`'
            | '^'
            | '?'
            | '!'
            | '@'
            | '*'
            | '&'
            | '\\'
    )
}

/// Reserved characters with no syntactic meaning of their own; encountering
/// one outside quotes is a lexical error.
fn is_reserved_char(c: char) -> bool {
    matches!(c, '$' | '`' | '^' | '?' | '!' | '@' | '*' | '&' | '\\')
}

/// Transforms configuration text into a flat, forward-only token stream.
///
/// Whitespace between two simple values on one line is preserved as an
/// [UnquotedText](Token::UnquotedText) token so value concatenation can keep
/// it; all other whitespace is absorbed. Lexical errors become
/// [Problem](Token::Problem) tokens carried forward for the parser to raise.
pub struct Tokenizer<'c> {
    code: &'c Code<'c>,
    flavor: Syntax,
    pos: usize,
    tokens: Vec<Lex>,
    log: OnceCell<Log<&'static str>>,
}

impl<'c> Tokenizer<'c> {
    pub fn new(code: &'c Code<'c>, flavor: Syntax) -> Self {
        Self {
            code,
            flavor,
            pos: 0,
            tokens: Vec::new(),
            log: OnceCell::new(),
        }
    }

    /// Set a log label to debug the token stream.
    pub fn set_log(&self, log: Log<&'static str>) -> Result<(), String> {
        self.log
            .set(log)
            .map_err(|err| format!("Log label {} is already assigned.", err))
    }

    pub fn tokenize(mut self) -> Vec<Lex> {
        self.push(Token::Start, 0);
        loop {
            let ws_start = self.pos;
            self.skip_inline_whitespace();
            let ws_end = self.pos;
            let start = self.pos;

            let c = match self.peek_char() {
                Some(c) => c,
                None => break,
            };

            match c {
                '\n' => {
                    let line = self.code.obtain_line(start);
                    self.pos += 1;
                    self.push(Token::Newline(line), start);
                }
                ',' => {
                    self.pos += 1;
                    self.push(Token::Comma, start);
                }
                ':' => {
                    self.pos += 1;
                    self.push(Token::EqualsOrColon, start);
                }
                '=' => {
                    self.pos += 1;
                    let token = if self.flavor == Syntax::Json {
                        Token::Problem("'=' is not allowed in JSON, use ':'".to_string())
                    } else {
                        Token::EqualsOrColon
                    };
                    self.push(token, start);
                }
                '{' => {
                    self.pos += 1;
                    self.push(Token::OpenBrace, start);
                }
                '}' => {
                    self.pos += 1;
                    self.push(Token::CloseBrace, start);
                }
                '[' => {
                    self.pos += 1;
                    self.push(Token::OpenBracket, start);
                }
                ']' => {
                    self.pos += 1;
                    self.push(Token::CloseBracket, start);
                }
                '+' => {
                    self.pos += 1;
                    let token = if self.peek_char() == Some('=') {
                        self.pos += 1;
                        if self.flavor == Syntax::Json {
                            Token::Problem("'+=' is not allowed in JSON".to_string())
                        } else {
                            Token::PlusEquals
                        }
                    } else {
                        Token::Problem(
                            "'+' not followed by '='; '+' is only allowed as part of '+='"
                                .to_string(),
                        )
                    };
                    self.push(token, start);
                }
                '#' => {
                    let token = self.pull_comment(1);
                    self.push_lex(token);
                }
                '/' if self.peek_char_at(1) == Some('/') => {
                    let token = self.pull_comment(2);
                    self.push_lex(token);
                }
                '"' => {
                    self.whitespace_prefix(ws_start, ws_end);
                    let lex = self.pull_quoted_string();
                    self.push_lex(lex);
                }
                '$' if self.peek_char_at(1) == Some('{') => {
                    if self.flavor == Syntax::Json {
                        self.pos += 2;
                        self.push(
                            Token::Problem(
                                "substitutions (${}) are not allowed in JSON".to_string(),
                            ),
                            start,
                        );
                    } else {
                        self.whitespace_prefix(ws_start, ws_end);
                        let lex = self.pull_substitution();
                        self.push_lex(lex);
                    }
                }
                c if c.is_ascii_digit() || c == '-' => {
                    self.whitespace_prefix(ws_start, ws_end);
                    let lex = self.pull_number();
                    self.push_lex(lex);
                }
                c if is_reserved_char(c) => {
                    self.pos += c.len_utf8();
                    self.push(
                        Token::Problem(format!(
                            "Reserved character '{}' is not allowed outside quotes \
                             (if you intended '{}' to be part of a string value, try \
                             enclosing the value in double quotes)",
                            c, c
                        )),
                        start,
                    );
                }
                _ => {
                    self.whitespace_prefix(ws_start, ws_end);
                    let lex = self.pull_unquoted_text();
                    self.push_lex(lex);
                }
            }
        }
        let end = self.code.text.len();
        self.push(Token::End, end);
        self.tokens
    }

    fn peek_char(&self) -> Option<char> {
        self.code.text[self.pos..].chars().next()
    }

    fn peek_char_at(&self, extra_bytes: usize) -> Option<char> {
        self.code.text.get(self.pos + extra_bytes..)?.chars().next()
    }

    fn skip_inline_whitespace(&mut self) {
        while let Some(c) = self.peek_char() {
            if c != '\n' && c.is_whitespace() {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
    }

    /// Emit the skipped whitespace as an unquoted text token when it stands
    /// between two simple values: `a b` concatenates to `"a b"` but `a {`
    /// drops the space.
    fn whitespace_prefix(&mut self, ws_start: usize, ws_end: usize) {
        if ws_end > ws_start
            && self
                .tokens
                .last()
                .map_or(false, |l| l.token.is_simple_value())
        {
            let text = self.code.slice(ws_start, ws_end).to_string();
            let lex = Lex::new(
                Token::UnquotedText(text),
                ws_start,
                ws_end,
                self.code.obtain_line(ws_start),
            );
            self.push_lex(lex);
        }
    }

    fn push(&mut self, token: Token, start: usize) {
        let lex = Lex::new(token, start, self.pos, self.code.obtain_line(start));
        self.push_lex(lex);
    }

    fn push_lex(&mut self, lex: Lex) {
        #[cfg(debug_assertions)]
        if let Some(log) = self.log.get() {
            if log.order() >= Log::Success(()).order() {
                println!(
                    "[{}; Token]: {} at {}",
                    log,
                    lex.token,
                    self.code.obtain_position(lex.start)
                );
            }
        }
        self.tokens.push(lex);
    }

    fn pull_comment(&mut self, marker_len: usize) -> Lex {
        let start = self.pos;
        self.pos += marker_len;
        let text_start = self.pos;
        while let Some(c) = self.peek_char() {
            if c == '\n' {
                break;
            }
            self.pos += c.len_utf8();
        }
        let text = self.code.slice(text_start, self.pos).to_string();
        let token = if self.flavor == Syntax::Json {
            Token::Problem("Comments are not allowed in JSON".to_string())
        } else {
            Token::Comment(text)
        };
        Lex::new(token, start, self.pos, self.code.obtain_line(start))
    }

    fn pull_unquoted_text(&mut self) -> Lex {
        let start = self.pos;
        while let Some(c) = self.peek_char() {
            if c.is_whitespace() || is_forbidden_char(c) {
                break;
            }
            if c == '/' && self.peek_char_at(1) == Some('/') {
                break;
            }
            self.pos += c.len_utf8();
        }
        let text = self.code.slice(start, self.pos);
        let token = match text {
            "true" => Token::Bool(true),
            "false" => Token::Bool(false),
            "null" => Token::Null,
            _ => {
                if self.flavor == Syntax::Json {
                    Token::Problem(format!("Token not allowed in valid JSON: '{}'", text))
                } else {
                    Token::UnquotedText(text.to_string())
                }
            }
        };
        Lex::new(token, start, self.pos, self.code.obtain_line(start))
    }

    fn pull_number(&mut self) -> Lex {
        let start = self.pos;
        self.pos += 1;
        while let Some(c) = self.peek_char() {
            if matches!(c, '0'..='9' | 'e' | 'E' | '+' | '-' | '.') {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
        let raw = self.code.slice(start, self.pos);
        let token = if raw.contains(['.', 'e', 'E']) {
            match raw.parse::<f64>() {
                Ok(value) => Token::Double {
                    value,
                    raw: raw.to_string(),
                },
                Err(_) => self.number_fallback(raw),
            }
        } else {
            match raw.parse::<i64>() {
                Ok(value) => {
                    if value >= i32::MIN as i64 && value <= i32::MAX as i64 {
                        Token::Int {
                            value: value as i32,
                            raw: raw.to_string(),
                        }
                    } else {
                        Token::Long {
                            value,
                            raw: raw.to_string(),
                        }
                    }
                }
                Err(_) => self.number_fallback(raw),
            }
        };
        Lex::new(token, start, self.pos, self.code.obtain_line(start))
    }

    /// A failed number parse may still be legal unquoted text, for example a
    /// version string like `1.2.3`.
    fn number_fallback(&self, raw: &str) -> Token {
        if self.flavor == Syntax::Json {
            return Token::Problem(format!("Invalid number: '{}'", raw));
        }
        if raw.contains('+') {
            Token::Problem(format!(
                "Invalid number: '{}' (reserved character '+' is not allowed outside quotes)",
                raw
            ))
        } else {
            Token::UnquotedText(raw.to_string())
        }
    }

    fn pull_quoted_string(&mut self) -> Lex {
        let start = self.pos;
        self.pos += 1;
        let mut value = String::new();
        loop {
            let c = match self.peek_char() {
                Some(c) => c,
                None => {
                    return self.problem_at(
                        start,
                        "Expecting a close quote '\"' but reached end of file".to_string(),
                    );
                }
            };
            if c == '\n' {
                return self.problem_at(
                    start,
                    "Quoted string was not closed before end of line".to_string(),
                );
            }
            self.pos += c.len_utf8();
            match c {
                '"' => break,
                '\\' => match self.pull_escape() {
                    Ok(unescaped) => value.push(unescaped),
                    Err(message) => return self.problem_at(start, message),
                },
                c if (c as u32) < 0x20 => {
                    return self.problem_at(
                        start,
                        format!(
                            "JSON does not allow unescaped control character {:#04x} in quoted strings, use a backslash escape",
                            c as u32
                        ),
                    );
                }
                c => value.push(c),
            }
        }
        let raw = self.code.slice(start, self.pos).to_string();
        Lex::new(
            Token::QuotedString { value, raw },
            start,
            self.pos,
            self.code.obtain_line(start),
        )
    }

    fn pull_escape(&mut self) -> Result<char, String> {
        let e = match self.peek_char() {
            Some(e) => e,
            None => return Err("End of file in backslash escape".to_string()),
        };
        self.pos += e.len_utf8();
        match e {
            '"' => Ok('"'),
            '\\' => Ok('\\'),
            '/' => Ok('/'),
            'b' => Ok('\u{0008}'),
            'f' => Ok('\u{000C}'),
            'n' => Ok('\n'),
            'r' => Ok('\r'),
            't' => Ok('\t'),
            'u' => self.pull_unicode_escape(),
            other => Err(format!(
                "backslash followed by '{}', this is not a valid escape sequence (quoted strings use JSON escaping, so use \"\\\\\" for literal backslash)",
                other
            )),
        }
    }

    fn pull_unicode_escape(&mut self) -> Result<char, String> {
        let first = self.pull_hex4()?;
        if (0xD800..=0xDBFF).contains(&first) {
            // high surrogate; JSON encodes astral characters as a pair
            if self.peek_char() != Some('\\') || self.peek_char_at(1) != Some('u') {
                return Err(format!(
                    "malformed \\uXXXX escape: lone surrogate {:#06x}",
                    first
                ));
            }
            self.pos += 2;
            let second = self.pull_hex4()?;
            if !(0xDC00..=0xDFFF).contains(&second) {
                return Err(format!(
                    "malformed \\uXXXX escape: {:#06x} is not a low surrogate",
                    second
                ));
            }
            let combined = 0x10000 + ((first - 0xD800) << 10) + (second - 0xDC00);
            char::from_u32(combined)
                .ok_or_else(|| format!("malformed \\uXXXX escape: invalid pair {:#06x}", combined))
        } else {
            char::from_u32(first)
                .ok_or_else(|| format!("malformed \\uXXXX escape: invalid scalar {:#06x}", first))
        }
    }

    fn pull_hex4(&mut self) -> Result<u32, String> {
        let mut acc: u32 = 0;
        for _ in 0..4 {
            let c = self
                .peek_char()
                .ok_or_else(|| "End of file in \\uXXXX escape".to_string())?;
            let digit = c
                .to_digit(16)
                .ok_or_else(|| format!("'{}' is not a hex digit in \\uXXXX escape", c))?;
            self.pos += c.len_utf8();
            acc = acc * 16 + digit;
        }
        Ok(acc)
    }

    fn pull_substitution(&mut self) -> Lex {
        let start = self.pos;
        self.pos += 2;
        let optional = if self.peek_char() == Some('?') {
            self.pos += 1;
            true
        } else {
            false
        };
        let mut inner: Vec<Lex> = Vec::new();
        loop {
            let c = match self.peek_char() {
                Some(c) => c,
                None => {
                    return self.problem_at(
                        start,
                        "Substitution '${' was not closed with a '}'".to_string(),
                    );
                }
            };
            match c {
                '}' => {
                    self.pos += 1;
                    break;
                }
                '\n' => {
                    return self.problem_at(
                        start,
                        "Substitution '${' was not closed before end of line".to_string(),
                    );
                }
                '"' => {
                    let lex = self.pull_quoted_string();
                    if let Token::Problem(message) = lex.token {
                        return self.problem_at(start, message);
                    }
                    inner.push(lex);
                }
                c if c.is_whitespace() => {
                    let ws_start = self.pos;
                    self.skip_inline_whitespace();
                    let text = self.code.slice(ws_start, self.pos).to_string();
                    inner.push(Lex::new(
                        Token::UnquotedText(text),
                        ws_start,
                        self.pos,
                        self.code.obtain_line(ws_start),
                    ));
                }
                c if c.is_ascii_digit() || c == '-' => {
                    let lex = self.pull_number();
                    if let Token::Problem(message) = lex.token {
                        return self.problem_at(start, message);
                    }
                    inner.push(lex);
                }
                c if is_forbidden_char(c) => {
                    self.pos += c.len_utf8();
                    return self.problem_at(
                        start,
                        format!("'{}' is not allowed in a substitution expression", c),
                    );
                }
                _ => {
                    let lex = self.pull_unquoted_text();
                    if let Token::Problem(message) = lex.token {
                        return self.problem_at(start, message);
                    }
                    inner.push(lex);
                }
            }
        }
        if inner.iter().all(|l| l.token.is_whitespace_text()) {
            return self.problem_at(start, "Substitution '${}' has an empty path".to_string());
        }
        Lex::new(
            Token::Substitution {
                optional,
                tokens: inner,
            },
            start,
            self.pos,
            self.code.obtain_line(start),
        )
    }

    fn problem_at(&self, start: usize, message: String) -> Lex {
        Lex::new(
            Token::Problem(message),
            start,
            self.pos,
            self.code.obtain_line(start),
        )
    }
}

/// Tokenize the whole input eagerly.
pub fn tokenize(code: &Code, flavor: Syntax) -> Vec<Lex> {
    Tokenizer::new(code, flavor).tokenize()
}
