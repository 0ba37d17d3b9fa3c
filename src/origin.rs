use crate::Origin;
use std::fmt::{Display, Formatter};

impl Origin {
    /// Create an origin with a plain description, such as `"String"` for text
    /// parsed from memory.
    pub fn new_simple(description: &str) -> Self {
        Self {
            description: description.to_string(),
            filename: None,
            line: -1,
            comments: Vec::new(),
        }
    }

    /// Create an origin for a file source.
    pub fn new_file(filename: &str) -> Self {
        Self {
            description: filename.to_string(),
            filename: Some(filename.to_string()),
            line: -1,
            comments: Vec::new(),
        }
    }

    /// A copy of self pinned to a 1-based line number.
    pub fn with_line(&self, line: usize) -> Self {
        Self {
            description: self.description.clone(),
            filename: self.filename.clone(),
            line: line as i32,
            comments: self.comments.clone(),
        }
    }

    /// A copy of self carrying the given comments.
    pub fn with_comments(&self, comments: Vec<String>) -> Self {
        Self {
            description: self.description.clone(),
            filename: self.filename.clone(),
            line: self.line,
            comments,
        }
    }

    /// A string describing the origin, including the line number when one is
    /// known. Used as the prefix of every error message.
    pub fn description(&self) -> String {
        if self.line < 0 {
            self.description.clone()
        } else {
            format!("{}: {}", self.description, self.line)
        }
    }

    /// The line number, or -1 when no meaningful line is known.
    pub fn line(&self) -> i32 {
        self.line
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// Comments that "went with" this value in the source: the run of comment
    /// lines immediately preceding it, with no blank line in between.
    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    /// Combine two origins into one describing both, collapsing line spans
    /// when they come from the same source (`file.conf: 1-5`).
    pub fn merge(a: &Origin, b: &Origin) -> Origin {
        if a.description == b.description {
            let (lo, hi) = if a.line <= b.line {
                (a.line, b.line)
            } else {
                (b.line, a.line)
            };
            if lo >= 0 && lo != hi {
                // span covering both lines; the line range is part of the
                // description so description() does not append a line again
                Origin {
                    description: format!("{}: {}-{}", a.description, lo, hi),
                    filename: a.filename.clone(),
                    line: -1,
                    comments: Vec::new(),
                }
            } else {
                Origin {
                    description: a.description.clone(),
                    filename: a.filename.clone(),
                    line: hi,
                    comments: Vec::new(),
                }
            }
        } else {
            Origin {
                description: format!("merge of {} and {}", a.description(), b.description()),
                filename: None,
                line: -1,
                comments: Vec::new(),
            }
        }
    }

    /// Fold [merge](Origin::merge) over a non-empty sequence of origins.
    pub fn merge_many<'o, I: IntoIterator<Item = &'o Origin>>(origins: I) -> Origin {
        let mut iter = origins.into_iter();
        let first = match iter.next() {
            Some(o) => o.clone(),
            None => panic!("tried to merge an empty list of origins"),
        };
        iter.fold(first, |acc, o| Origin::merge(&acc, o))
    }
}

impl Display for Origin {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}
