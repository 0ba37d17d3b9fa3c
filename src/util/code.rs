use super::{Code, Position};
use once_cell::unsync::OnceCell;

impl<'c> From<&'c str> for Code<'c> {
    fn from(text: &'c str) -> Self {
        Code::new(text)
    }
}

impl<'c> Code<'c> {
    pub fn new(text: &'c str) -> Self {
        Self {
            text,
            line_breaks: OnceCell::new(),
        }
    }

    /// Slice the original text between two byte offsets.
    ///
    /// The tokenizer only produces offsets on ASCII boundaries, so the slice
    /// is always on a character boundary.
    pub fn slice(&self, start: usize, end: usize) -> &'c str {
        &self.text[start..end]
    }

    pub fn obtain_line_breaks(&self) -> &Vec<usize> {
        self.line_breaks.get_or_init(|| {
            self.text
                .bytes()
                .enumerate()
                .filter_map(|(index, n)| if n == b'\n' { Some(index) } else { None })
                .collect()
        })
    }

    /// The 1-based line number at a byte offset.
    pub fn obtain_line(&self, pointer: usize) -> usize {
        let line_breaks = self.obtain_line_breaks();
        let index = match line_breaks.binary_search(&pointer) {
            Ok(index) | Err(index) => index,
        };
        index + 1
    }

    pub fn obtain_position(&self, pointer: usize) -> Position {
        let line_breaks = self.obtain_line_breaks();
        let index = match line_breaks.binary_search(&pointer) {
            Ok(index) | Err(index) => index,
        };

        if index == 0 {
            Position::new(1, self.text[..pointer].chars().count() + 1)
        } else {
            let break_point = line_breaks[index - 1] + 1;
            Position::new(index + 1, self.text[break_point..pointer].chars().count() + 1)
        }
    }
}
