use crate::include::IncludeContext;
use crate::util::Code;
use crate::value::{concatenate, ConfigObject, ConfigValue};
use crate::{tokenizer, ConfigError, Lex, Origin, Path, PathBuilder, Syntax, Token};

/// Includes nested deeper than this raise a parse error; a sane document
/// never comes close, an include cycle always does.
const MAX_INCLUDE_DEPTH: usize = 50;

/// Parse configuration text into a single unresolved value.
pub(crate) fn parse(
    code: &Code,
    origin: &Origin,
    flavor: Syntax,
    include_context: &IncludeContext,
) -> Result<ConfigValue, ConfigError> {
    let tokens = tokenizer::tokenize(code, flavor);
    let mut run = ParseRun {
        tokens,
        pos: 0,
        base_origin: origin.clone(),
        flavor,
        include_context,
        path_stack: Vec::new(),
        pending_comments: Vec::new(),
    };
    run.parse_root()
}

/// Parse a path expression such as `a."b.c".d` into a [Path].
pub(crate) fn parse_path(expression: &str) -> Result<Path, ConfigError> {
    let code = Code::new(expression);
    let tokens = tokenizer::tokenize(&code, Syntax::Hocon);
    let mut items: Vec<(String, bool)> = Vec::new();
    for lex in &tokens {
        match &lex.token {
            Token::Start | Token::End => {}
            Token::Problem(message) => {
                return Err(ConfigError::BadPath {
                    path: expression.to_string(),
                    message: message.clone(),
                });
            }
            other => match key_item(other) {
                Some(item) => items.push(item),
                None => {
                    return Err(ConfigError::BadPath {
                        path: expression.to_string(),
                        message: format!("Token not allowed in path expression: {}", other),
                    });
                }
            },
        }
    }
    path_from_items(items, expression)
}

/// The textual contribution of a token to a path expression, or [None] for
/// tokens that cannot appear in one. Quoted strings are single whole keys.
fn key_item(token: &Token) -> Option<(String, bool)> {
    match token {
        Token::UnquotedText(s) => Some((s.clone(), false)),
        Token::QuotedString { value, .. } => Some((value.clone(), true)),
        Token::Int { raw, .. } => Some((raw.clone(), false)),
        Token::Long { raw, .. } => Some((raw.clone(), false)),
        Token::Double { raw, .. } => Some((raw.clone(), false)),
        Token::Bool(b) => Some((b.to_string(), false)),
        Token::Null => Some(("null".to_string(), false)),
        _ => None,
    }
}

/// Assemble path keys from (text, was-quoted) pieces. Unquoted text splits on
/// periods; quoted text never does, and marks its key as allowed to be empty.
fn path_from_items(
    mut items: Vec<(String, bool)>,
    expression: &str,
) -> Result<Path, ConfigError> {
    let bad = |message: &str| ConfigError::BadPath {
        path: expression.to_string(),
        message: message.to_string(),
    };
    // leading and trailing whitespace is not part of a path
    while items
        .first()
        .map_or(false, |(t, q)| !q && t.trim().is_empty())
    {
        items.remove(0);
    }
    while items
        .last()
        .map_or(false, |(t, q)| !q && t.trim().is_empty())
    {
        items.pop();
    }

    let mut builder = PathBuilder::new();
    let mut appended = 0;
    // current element text plus whether a quoted piece contributed to it
    let mut current: Option<(String, bool)> = None;
    for (text, quoted) in items {
        if quoted {
            let cur = current.get_or_insert((String::new(), true));
            cur.0.push_str(&text);
            cur.1 = true;
        } else {
            for ch in text.chars() {
                if ch == '.' {
                    match current.take() {
                        Some((buf, had_quoted)) => {
                            if buf.is_empty() && !had_quoted {
                                return Err(bad(
                                    "path has a leading, trailing, or two adjacent periods '.' (use quoted \"\" if you want an empty key)",
                                ));
                            }
                            builder.append_key(buf);
                            appended += 1;
                        }
                        None => {
                            return Err(bad(
                                "path has a leading, trailing, or two adjacent periods '.' (use quoted \"\" if you want an empty key)",
                            ));
                        }
                    }
                } else {
                    current.get_or_insert((String::new(), false)).0.push(ch);
                }
            }
        }
    }
    match current.take() {
        Some((buf, had_quoted)) => {
            if buf.is_empty() && !had_quoted {
                return Err(bad("path has an empty key"));
            }
            builder.append_key(buf);
        }
        None => {
            if appended == 0 {
                return Err(bad("expecting a field name or path here, got nothing"));
            }
            return Err(bad(
                "path has a leading, trailing, or two adjacent periods '.' (use quoted \"\" if you want an empty key)",
            ));
        }
    }
    match builder.result() {
        Some(path) => Ok(path),
        None => Err(bad("expecting a field name or path here, got nothing")),
    }
}

struct ParseRun<'p> {
    tokens: Vec<Lex>,
    pos: usize,
    base_origin: Origin,
    flavor: Syntax,
    include_context: &'p IncludeContext,
    /// Keys of the enclosing objects, used to desugar `+=` with a full path.
    path_stack: Vec<String>,
    /// Comment lines waiting to attach to the next field or element.
    pending_comments: Vec<String>,
}

impl<'p> ParseRun<'p> {
    fn lex(&self) -> &Lex {
        &self.tokens[self.pos]
    }

    fn token(&self) -> &Token {
        &self.tokens[self.pos].token
    }

    fn advance(&mut self) {
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn origin_here(&self) -> Origin {
        self.base_origin.with_line(self.lex().line)
    }

    fn parse_error(&self, message: String) -> ConfigError {
        ConfigError::parse(self.origin_here(), message)
    }

    /// Raise any lexical problem carried by the current token.
    fn check_problem(&self) -> Result<(), ConfigError> {
        if let Token::Problem(message) = self.token() {
            Err(self.parse_error(message.clone()))
        } else {
            Ok(())
        }
    }

    /// Skip newlines and comments before a field or element. Comment lines
    /// accumulate; a blank line detaches them from whatever follows.
    fn skip_ignorable(&mut self) -> Result<(), ConfigError> {
        let mut newline_run = 0;
        loop {
            match self.token() {
                Token::Newline(_) => {
                    newline_run += 1;
                    if newline_run >= 2 {
                        self.pending_comments.clear();
                    }
                    self.advance();
                }
                Token::Comment(text) => {
                    self.pending_comments.push(text.clone());
                    newline_run = 0;
                    self.advance();
                }
                Token::Problem(message) => {
                    return Err(self.parse_error(message.clone()));
                }
                _ => return Ok(()),
            }
        }
    }

    /// Consume the separator after a field or element: a comma, or (in
    /// HOCON) a newline. Comments on the value's own line are discarded; a
    /// comment on a following line is left for [skip_ignorable] to collect
    /// for the next field. Returns (separated, separated-by-comma).
    fn consume_separator(&mut self) -> (bool, bool) {
        loop {
            match self.token() {
                Token::Comment(_) => {
                    self.advance();
                }
                Token::Newline(_) => {
                    self.advance();
                    if self.flavor == Syntax::Hocon {
                        return (true, false);
                    }
                    // in JSON a newline is plain whitespace; keep looking
                    // for the comma
                }
                Token::Comma => {
                    self.advance();
                    return (true, true);
                }
                _ => return (false, false),
            }
        }
    }

    fn attach_pending_comments(&mut self, value: ConfigValue) -> ConfigValue {
        if self.pending_comments.is_empty() {
            value
        } else {
            let comments = std::mem::take(&mut self.pending_comments);
            value.with_origin(value.origin().with_comments(comments))
        }
    }

    fn parse_root(&mut self) -> Result<ConfigValue, ConfigError> {
        if matches!(self.token(), Token::Start) {
            self.advance();
        }
        self.skip_ignorable()?;
        let root = match self.token() {
            Token::OpenBrace | Token::OpenBracket => self.parse_value()?,
            Token::End => {
                // an entirely empty document is an empty object
                ConfigValue::object(self.origin_here(), ConfigObject::new())
            }
            _ => {
                if self.flavor == Syntax::Json {
                    return Err(self.parse_error(format!(
                        "Document must have an object or array at root, got: {}",
                        self.token()
                    )));
                }
                self.parse_object_body(false)?
            }
        };
        self.skip_ignorable()?;
        if !matches!(self.token(), Token::End) {
            return Err(self.parse_error(format!(
                "Document has trailing token after root value: {}",
                self.token()
            )));
        }
        Ok(root)
    }

    /// Parse fields into an object. With `braced` the body ends at `}`,
    /// otherwise at end of file (braces omitted at root).
    fn parse_object_body(&mut self, braced: bool) -> Result<ConfigValue, ConfigError> {
        let object_origin = self.origin_here();
        let mut object = ConfigObject::new();
        loop {
            self.skip_ignorable()?;
            match self.token() {
                Token::CloseBrace => {
                    if braced {
                        self.advance();
                        break;
                    }
                    return Err(self.parse_error(
                        "unbalanced close brace '}' with no open brace".to_string(),
                    ));
                }
                Token::End => {
                    if braced {
                        return Err(
                            self.parse_error("expecting a close brace '}', got end of file".to_string())
                        );
                    }
                    break;
                }
                Token::Comma => {
                    return Err(self.parse_error(
                        "expecting a field name here, got ',' (two commas in a row)".to_string(),
                    ));
                }
                _ => {}
            }

            self.parse_field(&mut object)?;

            // after a field: a comma or at least one newline, unless the
            // object ends right here
            let (separated, had_comma) = self.consume_separator();
            self.skip_ignorable()?;
            match self.token() {
                Token::CloseBrace | Token::End => {
                    if had_comma && self.flavor == Syntax::Json {
                        return Err(self
                            .parse_error("JSON does not allow a trailing comma".to_string()));
                    }
                    continue;
                }
                _ if separated => continue,
                _ => {
                    return Err(self.parse_error(format!(
                        "Object should have ended with a close brace or had a comma, instead had token: {}",
                        self.token()
                    )));
                }
            }
        }
        Ok(ConfigValue::object(object_origin, object))
    }

    fn parse_field(&mut self, object: &mut ConfigObject) -> Result<(), ConfigError> {
        if self.flavor == Syntax::Hocon && self.at_include_statement() {
            return self.parse_include(object);
        }

        let key_path = self.parse_key()?;
        let pushed = key_path.length();
        for key in key_path.keys() {
            self.path_stack.push(key.clone());
        }
        let parsed = self.parse_field_value(&key_path);
        self.path_stack.truncate(self.path_stack.len() - pushed);
        let value = parsed?;

        let value = self.attach_pending_comments(value);
        insert_field(object, &key_path, value);
        Ok(())
    }

    fn parse_field_value(&mut self, key_path: &Path) -> Result<ConfigValue, ConfigError> {
        self.check_problem()?;
        match self.token() {
            Token::EqualsOrColon => {
                self.advance();
                self.parse_value()
            }
            Token::OpenBrace if self.flavor == Syntax::Hocon => self.parse_value(),
            Token::PlusEquals => {
                self.advance();
                let element = self.parse_value()?;
                self.desugar_append(element)
            }
            other => Err(self.parse_error(format!(
                "Key '{}' may not be followed by token: {}",
                key_path.render(),
                other
            ))),
        }
    }

    /// `key += v` desugars to `key = ${?full.path.of.key} [v]`.
    fn desugar_append(&mut self, element: ConfigValue) -> Result<ConfigValue, ConfigError> {
        let full_path = Path::from_keys(self.path_stack.clone());
        let substitution =
            ConfigValue::substitution(element.origin().clone(), full_path, true);
        let list = ConfigValue::list(element.origin().clone(), vec![element]);
        match concatenate(vec![substitution, list])? {
            Some(value) => Ok(value),
            None => panic!("+= desugaring vanished"),
        }
    }

    /// Whether the current position starts an `include` statement rather
    /// than a field whose key is the word "include".
    fn at_include_statement(&self) -> bool {
        match self.token() {
            Token::UnquotedText(s) if s == "include" => {}
            _ => return false,
        }
        let mut ahead = self.pos + 1;
        while let Some(lex) = self.tokens.get(ahead) {
            match &lex.token {
                t if t.is_whitespace_text() => ahead += 1,
                Token::QuotedString { .. } => return true,
                Token::UnquotedText(s) => {
                    return s.starts_with("file(")
                        || s.starts_with("required(")
                        || s.starts_with("url(")
                        || s.starts_with("classpath(");
                }
                _ => return false,
            }
        }
        false
    }

    fn parse_key(&mut self) -> Result<Path, ConfigError> {
        let mut items: Vec<(String, bool)> = Vec::new();
        let expression_start = self.pos;
        loop {
            self.check_problem()?;
            match key_item(self.token()) {
                Some(item) => {
                    items.push(item);
                    self.advance();
                }
                None => break,
            }
        }
        if items.is_empty() {
            return Err(self.parse_error(format!(
                "expecting a field name or path here, got {}",
                self.token()
            )));
        }
        if self.flavor == Syntax::Json {
            let quoted_single = items.len() == 1 && items[0].1;
            if !quoted_single {
                let lex = &self.tokens[expression_start];
                return Err(ConfigError::parse(
                    self.base_origin.with_line(lex.line),
                    "JSON requires fields to have a quoted string key".to_string(),
                ));
            }
            return Ok(Path::new_key(&items[0].0));
        }
        let rendered: String = items.iter().map(|(t, _)| t.as_str()).collect();
        path_from_items(items, &rendered)
    }

    /// Parse one value: one or more concatenation pieces on the same line,
    /// folded where possible.
    fn parse_value(&mut self) -> Result<ConfigValue, ConfigError> {
        let mut pieces: Vec<ConfigValue> = Vec::new();
        loop {
            self.check_problem()?;
            let origin = self.origin_here();
            let piece = match self.token().clone() {
                Token::UnquotedText(text) => {
                    self.advance();
                    ConfigValue::string(origin, text)
                }
                Token::QuotedString { value, .. } => {
                    self.advance();
                    ConfigValue::string(origin, value)
                }
                Token::Int { value, raw } => {
                    self.advance();
                    ConfigValue::int(origin, value, Some(raw))
                }
                Token::Long { value, raw } => {
                    self.advance();
                    ConfigValue::long(origin, value, Some(raw))
                }
                Token::Double { value, raw } => {
                    self.advance();
                    ConfigValue::double(origin, value, Some(raw))
                }
                Token::Bool(value) => {
                    self.advance();
                    ConfigValue::boolean(origin, value)
                }
                Token::Null => {
                    self.advance();
                    ConfigValue::null(origin)
                }
                Token::Substitution { optional, tokens } => {
                    self.advance();
                    let path = self.substitution_path(&tokens)?;
                    ConfigValue::substitution(origin, path, optional)
                }
                Token::OpenBrace => self.parse_object()?,
                Token::OpenBracket => self.parse_array()?,
                _ => break,
            };
            pieces.push(piece);
            if self.flavor == Syntax::Json {
                break;
            }
        }
        if pieces.is_empty() {
            return Err(self.parse_error(format!("expecting a value, got {}", self.token())));
        }
        match concatenate(pieces)? {
            Some(value) => Ok(value),
            None => panic!("concatenation of parsed pieces vanished"),
        }
    }

    fn substitution_path(&self, inner: &[Lex]) -> Result<Path, ConfigError> {
        let mut items: Vec<(String, bool)> = Vec::new();
        for lex in inner {
            match &lex.token {
                Token::Problem(message) => {
                    return Err(ConfigError::parse(
                        self.base_origin.with_line(lex.line),
                        message.clone(),
                    ));
                }
                other => match key_item(other) {
                    Some(item) => items.push(item),
                    None => {
                        return Err(ConfigError::parse(
                            self.base_origin.with_line(lex.line),
                            format!("Token not allowed in substitution expression: {}", other),
                        ));
                    }
                },
            }
        }
        let rendered: String = items.iter().map(|(t, _)| t.as_str()).collect();
        path_from_items(items, &rendered)
    }

    fn parse_object(&mut self) -> Result<ConfigValue, ConfigError> {
        self.advance();
        self.parse_object_body(true)
    }

    fn parse_array(&mut self) -> Result<ConfigValue, ConfigError> {
        let list_origin = self.origin_here();
        self.advance();
        let mut items: Vec<ConfigValue> = Vec::new();
        self.skip_ignorable()?;
        if matches!(self.token(), Token::CloseBracket) {
            self.advance();
            return Ok(ConfigValue::list(list_origin, items));
        }
        loop {
            let element = self.parse_value()?;
            let element = self.attach_pending_comments(element);
            items.push(element);

            let (separated, had_comma) = self.consume_separator();
            self.skip_ignorable()?;
            match self.token() {
                Token::CloseBracket => {
                    if had_comma && self.flavor == Syntax::Json {
                        return Err(self
                            .parse_error("JSON does not allow a trailing comma".to_string()));
                    }
                    self.advance();
                    break;
                }
                _ if separated => continue,
                other => {
                    return Err(self.parse_error(format!(
                        "List should have ended with ']' or had a comma, instead had token: {}",
                        other
                    )));
                }
            }
        }
        Ok(ConfigValue::list(list_origin, items))
    }

    fn parse_include(&mut self, object: &mut ConfigObject) -> Result<(), ConfigError> {
        let include_origin = self.origin_here();
        self.advance(); // the word "include"
        while self.token().is_whitespace_text() {
            self.advance();
        }

        if self.include_context.depth >= MAX_INCLUDE_DEPTH {
            return Err(ConfigError::parse(
                include_origin,
                format!(
                    "include statements nested more than {} times; is there a cycle of includes?",
                    MAX_INCLUDE_DEPTH
                ),
            ));
        }

        let (target, required) = self.parse_include_target()?;
        let included = match self
            .include_context
            .includer
            .include(self.include_context, &target)
        {
            Ok(included) => included,
            // retrieval failures only matter for required(); syntax errors
            // inside an included document always propagate
            Err(err @ (ConfigError::Io { .. } | ConfigError::FileNotFound { .. })) => {
                if required {
                    return Err(err);
                }
                None
            }
            Err(other) => return Err(other),
        };

        match included {
            Some(value) => match value.kind() {
                crate::value::ValueKind::Object(included_object) => {
                    // the included document is a fallback under the
                    // enclosing object, never an override
                    for (key, child) in included_object.iter() {
                        match object.get(key) {
                            Some(existing) => {
                                let merged = existing.with_fallback(child);
                                object.insert(key.to_string(), merged);
                            }
                            None => object.insert(key.to_string(), child.clone()),
                        }
                    }
                    Ok(())
                }
                _ => Err(ConfigError::parse(
                    include_origin,
                    format!(
                        "included document '{}' does not have an object at root",
                        target.name()
                    ),
                )),
            },
            None => {
                if required {
                    Err(ConfigError::FileNotFound {
                        path: target.name().to_string(),
                    })
                } else {
                    Ok(())
                }
            }
        }
    }

    fn parse_include_target(&mut self) -> Result<(crate::IncludeTarget, bool), ConfigError> {
        use crate::IncludeTarget;

        let mut required = false;
        let mut expected_closing = 0;
        let mut wrapper: Option<&str> = None;

        if let Token::UnquotedText(text) = self.token() {
            let mut rest = text.as_str();
            if let Some(stripped) = rest.strip_prefix("required(") {
                required = true;
                expected_closing += 1;
                rest = stripped;
            }
            for kind in ["file(", "url(", "classpath("] {
                if let Some(stripped) = rest.strip_prefix(kind) {
                    wrapper = Some(&kind[..kind.len() - 1]);
                    expected_closing += 1;
                    rest = stripped;
                }
            }
            if !rest.is_empty() || expected_closing == 0 {
                return Err(self.parse_error(format!(
                    "include statement must be followed by a quoted string or file()/url()/classpath()/required(), got '{}'",
                    text
                )));
            }
            self.advance();
            while self.token().is_whitespace_text() {
                self.advance();
            }
        }

        let name = match self.token() {
            Token::QuotedString { value, .. } => value.clone(),
            other => {
                return Err(self.parse_error(format!(
                    "include statement must be followed by a quoted string, got {}",
                    other
                )));
            }
        };
        self.advance();

        if expected_closing > 0 {
            while self.token().is_whitespace_text() {
                self.advance();
            }
            let closing = ")".repeat(expected_closing);
            match self.token() {
                Token::UnquotedText(text) if *text == closing => self.advance(),
                other => {
                    return Err(self.parse_error(format!(
                        "expecting '{}' to close the include statement, got {}",
                        closing, other
                    )));
                }
            }
        }

        let target = match wrapper {
            Some("file") => IncludeTarget::File(name),
            Some("url") => IncludeTarget::Url(name),
            Some("classpath") => IncludeTarget::Classpath(name),
            _ => IncludeTarget::Heuristic(name),
        };
        Ok((target, required))
    }
}

/// Insert a field, expanding a dotted key `a.b.c : v` into nested objects and
/// merging with any earlier assignment of the same key (the later one wins,
/// the earlier becomes its fallback).
fn insert_field(object: &mut ConfigObject, key_path: &Path, value: ConfigValue) {
    let mut wrapped = value;
    for key in key_path.keys()[1..].iter().rev() {
        let mut inner = ConfigObject::new();
        let origin = wrapped.origin().clone();
        inner.insert(key.clone(), wrapped);
        wrapped = ConfigValue::object(origin, inner);
    }
    let first = key_path.first();
    match object.get(first) {
        Some(existing) => {
            let merged = wrapped.with_fallback(existing);
            object.insert(first.to_string(), merged);
        }
        None => object.insert(first.to_string(), wrapped),
    }
}
