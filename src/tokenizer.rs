//! Command Tokenizer
//!
//! Splits one protocol line into parameters. Unquoted parameters are
//! separated by runs of spaces and tabs; double quotes group words into a
//! single parameter, with backslash escaping inside quotes. The tokenizer
//! knows nothing about commands.

/// Scanner state over a single input line.
pub struct Tokenizer {
    chars: Vec<char>,
    pos: usize,
}

impl Tokenizer {
    pub fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    /// Returns the next whitespace-delimited word. Past end of input this
    /// deterministically returns an empty string; callers detect "no more
    /// parameters" that way.
    pub fn next_word(&mut self) -> String {
        let mut word = String::new();
        while let Some(c) = self.peek() {
            if is_space(c) {
                break;
            }
            word.push(c);
            self.pos += 1;
        }
        self.consume_spaces();
        word
    }

    /// Returns the next parameter: a quoted string if the input starts with
    /// a double quote, otherwise a plain word.
    pub fn next_param(&mut self) -> String {
        if self.peek() == Some('"') {
            self.next_string()
        } else {
            self.next_word()
        }
    }

    /// Parses a quoted parameter. The backslash suppresses interpretation of
    /// the following character: the backslash is dropped, the escaped
    /// character kept literally. An unterminated quote consumes to end of
    /// input and returns what was accumulated (lenient recovery, not an
    /// error).
    fn next_string(&mut self) -> String {
        let mut out = String::new();
        if self.peek() != Some('"') {
            return out;
        }
        self.pos += 1;
        while let Some(c) = self.peek() {
            match c {
                '"' => {
                    self.pos += 1;
                    break;
                }
                '\\' => {
                    self.pos += 1;
                    if let Some(escaped) = self.peek() {
                        out.push(escaped);
                        self.pos += 1;
                    }
                }
                _ => {
                    out.push(c);
                    self.pos += 1;
                }
            }
        }
        self.consume_spaces();
        out
    }

    fn consume_spaces(&mut self) {
        while let Some(c) = self.peek() {
            if !is_space(c) {
                break;
            }
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }
}

fn is_space(c: char) -> bool {
    c == ' ' || c == '\t'
}
