use crate::value::render_json_string;
use crate::{ConfigError, Path, PathBuilder};
use std::fmt::{Debug, Display, Formatter};

impl Path {
    /// A single-element path whose key is taken literally; periods in `key`
    /// are part of the key, not separators.
    pub fn new_key(key: &str) -> Self {
        Self {
            keys: vec![key.to_string()],
        }
    }

    /// Parse a path expression such as `a."b.c".d`, honoring quoting.
    pub fn new_path(expression: &str) -> Result<Self, ConfigError> {
        crate::parser::parse_path(expression)
    }

    pub fn from_keys(keys: Vec<String>) -> Self {
        if keys.is_empty() {
            panic!("empty path");
        }
        Self { keys }
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn first(&self) -> &str {
        &self.keys[0]
    }

    pub fn last(&self) -> &str {
        &self.keys[self.keys.len() - 1]
    }

    /// All keys but the last, or [None] for a single-key path.
    pub fn parent(&self) -> Option<Path> {
        if self.keys.len() <= 1 {
            None
        } else {
            Some(Path {
                keys: self.keys[..self.keys.len() - 1].to_vec(),
            })
        }
    }

    /// All keys but the first, or [None] for a single-key path.
    pub fn remainder(&self) -> Option<Path> {
        if self.keys.len() <= 1 {
            None
        } else {
            Some(Path {
                keys: self.keys[1..].to_vec(),
            })
        }
    }

    pub fn length(&self) -> usize {
        self.keys.len()
    }

    /// The keys from `first_index` (inclusive) to `last_index` (exclusive).
    pub fn sub_path(&self, first_index: usize, last_index: usize) -> Path {
        if last_index < first_index || last_index > self.keys.len() || first_index == last_index {
            panic!("bad call to sub_path({}, {})", first_index, last_index);
        }
        Path {
            keys: self.keys[first_index..last_index].to_vec(),
        }
    }

    pub fn prepend(&self, to_prepend: &Path) -> Path {
        let mut keys = to_prepend.keys.clone();
        keys.extend(self.keys.iter().cloned());
        Path { keys }
    }

    pub fn starts_with(&self, prefix: &Path) -> bool {
        self.keys.len() >= prefix.keys.len() && self.keys[..prefix.keys.len()] == prefix.keys[..]
    }

    /// Render the path as a dotted expression, quoting keys that would not
    /// parse back unquoted. The result re-parses to an equal path.
    pub fn render(&self) -> String {
        let mut s = String::new();
        for (i, key) in self.keys.iter().enumerate() {
            if i > 0 {
                s.push('.');
            }
            s.push_str(&render_key(key));
        }
        s
    }
}

/// Whether a key needs quoting to survive a render/parse round trip. A key
/// starting with anything that could begin a number must be quoted, since the
/// number syntax could otherwise mangle it.
fn has_funky_chars(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        None => return false,
        Some(first) => {
            if !first.is_ascii_alphabetic() {
                return true;
            }
        }
    }
    chars.any(|c| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
}

/// Render a single key, quoted if necessary.
pub(crate) fn render_key(key: &str) -> String {
    if has_funky_chars(key) || key.is_empty() {
        render_json_string(key)
    } else {
        key.to_string()
    }
}

/// Join key elements into a path expression.
pub fn join_path(elements: &[&str]) -> String {
    Path::from_keys(elements.iter().map(|e| e.to_string()).collect()).render()
}

/// Split a path expression into its key elements.
pub fn split_path(path: &str) -> Result<Vec<String>, ConfigError> {
    Ok(Path::new_path(path)?.keys)
}

impl Display for Path {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render())
    }
}

impl Debug for Path {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Path({})", self.render())
    }
}

impl PathBuilder {
    pub fn new() -> Self {
        Self { keys: Vec::new() }
    }

    pub fn append_key(&mut self, key: String) {
        self.keys.push(key);
    }

    pub fn append_path(&mut self, path: &Path) {
        self.keys.extend(path.keys.iter().cloned());
    }

    /// The assembled path, or [None] when no keys were appended.
    pub fn result(self) -> Option<Path> {
        if self.keys.is_empty() {
            None
        } else {
            Some(Path { keys: self.keys })
        }
    }
}

impl Default for PathBuilder {
    fn default() -> Self {
        Self::new()
    }
}
