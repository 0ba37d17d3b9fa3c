mod code;
mod logger;
mod position;
use once_cell::unsync::OnceCell;

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
/// The line and column information at a byte offset of the configuration text.
pub struct Position {
    pub line: usize,
    pub column: usize,
}

/// A wrapper for the configuration text to be tokenized, with lazily computed
/// line break information used to build [Origin](crate::Origin)s and error messages.
pub struct Code<'c> {
    pub text: &'c str,
    line_breaks: OnceCell<Vec<usize>>,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
/// A enum structure to assign multiple level debugging to the tokenizer.
pub enum Log<T> {
    None,
    Default(T),
    Success(T),
    Result(T),
    Verbose(T),
}
