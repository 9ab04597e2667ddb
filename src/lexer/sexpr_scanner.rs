use super::token::{RawKind, RawNode};

/// Characters that can never appear inside a symbol
const DELIMITERS: &[char] = &[
    '(', ')', '[', ']', '{', '}', '"', '\'', ';', '@', '^', '`', '~', '\\',
];

fn is_whitespace(c: char) -> bool {
    c.is_whitespace() || c == ','
}

fn is_closer(c: char) -> bool {
    matches!(c, ')' | ']' | '}')
}

fn is_symbol_char(c: char) -> bool {
    c != '\0' && !is_whitespace(c) && !DELIMITERS.contains(&c)
}

/// Result of reading a whole source text
#[derive(Debug, Clone)]
pub struct RawDocument {
    /// The `Document` node
    pub root: RawNode,
    /// Number of characters the reader consumed
    pub consumed: usize,
    /// Source as characters, for slicing node text
    pub source: Vec<char>,
}

impl RawDocument {
    /// Raw text covered by `start..end`
    pub fn text(&self, start: usize, end: usize) -> String {
        let end = end.min(self.source.len());
        let start = start.min(end);
        self.source[start..end].iter().collect()
    }

    /// True when the reader stopped before the end of the source
    pub fn has_remainder(&self) -> bool {
        self.consumed < self.source.len()
    }
}

/// Reader for Clojure-flavoured S-expression syntax
///
/// Never fails: malformed input is reported as `SyntaxError` and
/// `RestSyntaxError` nodes inside the tree.
pub struct SExprScanner {
    /// Source code as character vector
    source: Vec<char>,
    /// Current position in source
    current: usize,
}

impl SExprScanner {
    /// Creates a new scanner from source code
    pub fn new(source: &str) -> Self {
        SExprScanner {
            source: source.chars().collect(),
            current: 0,
        }
    }

    /// Reads every top level form
    ///
    /// A stray closing delimiter at top level stops the reader; the rest of
    /// the source is left unconsumed.
    pub fn scan_document(mut self) -> RawDocument {
        let mut children = Vec::new();

        loop {
            self.skip_trivia(&mut children);
            if self.is_at_end() || is_closer(self.peek()) {
                break;
            }
            children.push(self.scan_form());
        }

        let consumed = self.current;
        RawDocument {
            root: RawNode::new(RawKind::Document, 0, consumed, children),
            consumed,
            source: self.source,
        }
    }

    /// Skips whitespace, recording comments as `Comment` nodes
    fn skip_trivia(&mut self, into: &mut Vec<RawNode>) {
        loop {
            let c = self.peek();
            if is_whitespace(c) {
                self.advance();
            } else if c == ';' {
                let start = self.current;
                while !self.is_at_end() && self.peek() != '\n' {
                    self.advance();
                }
                into.push(RawNode::leaf(RawKind::Comment, start, self.current));
            } else {
                break;
            }
        }
    }

    fn scan_form(&mut self) -> RawNode {
        let start = self.current;
        let c = self.advance();

        match c {
            '(' => self.scan_collection(RawKind::List, start, ')'),
            '[' => self.scan_collection(RawKind::Vector, start, ']'),
            '{' => self.scan_collection(RawKind::Map, start, '}'),

            '#' => match self.peek() {
                '{' => {
                    self.advance();
                    self.scan_collection(RawKind::Set, start, '}')
                }
                '(' => {
                    self.advance();
                    self.scan_collection(RawKind::Lambda, start, ')')
                }
                '\'' => {
                    self.advance();
                    self.scan_prefixed(RawKind::VarQuote, start)
                }
                '_' => {
                    self.advance();
                    self.scan_prefixed(RawKind::Discard, start)
                }
                _ => {
                    self.skip_symbol_chars();
                    RawNode::leaf(RawKind::SyntaxError, start, self.current)
                }
            },

            '\'' => self.scan_prefixed(RawKind::Quote, start),
            '`' => self.scan_prefixed(RawKind::Backtick, start),
            '~' => {
                if self.match_char('@') {
                    self.scan_prefixed(RawKind::UnquoteSplicing, start)
                } else {
                    self.scan_prefixed(RawKind::Unquote, start)
                }
            }
            '@' => self.scan_prefixed(RawKind::Deref, start),
            '^' => self.scan_tag(start),

            '"' => self.scan_string(start),

            ':' => {
                let kind = if self.skip_symbol_chars() > 0 {
                    RawKind::Keyword
                } else {
                    RawKind::SyntaxError
                };
                RawNode::leaf(kind, start, self.current)
            }

            '%' => {
                self.skip_symbol_chars();
                let suffix: String = self.source[start + 1..self.current].iter().collect();
                let kind = if suffix.is_empty()
                    || suffix == "&"
                    || suffix.chars().all(|d| d.is_ascii_digit())
                {
                    RawKind::ParamName
                } else {
                    RawKind::Symbol
                };
                RawNode::leaf(kind, start, self.current)
            }

            '-' if self.peek().is_ascii_digit() => self.scan_number(RawKind::NegNumber, start),

            '0' if matches!(self.peek(), 'x' | 'X') && self.peek_next().is_ascii_hexdigit() => {
                self.advance(); // x
                while self.peek().is_ascii_hexdigit() {
                    self.advance();
                }
                self.finish_atom(RawKind::HexLiteral, start)
            }

            c if c.is_ascii_digit() => self.scan_number(RawKind::Number, start),

            c if is_symbol_char(c) => {
                self.skip_symbol_chars();
                RawNode::leaf(RawKind::Symbol, start, self.current)
            }

            _ => RawNode::leaf(RawKind::SyntaxError, start, self.current),
        }
    }

    fn scan_collection(&mut self, kind: RawKind, start: usize, closer: char) -> RawNode {
        let mut children = Vec::new();

        loop {
            self.skip_trivia(&mut children);

            if self.is_at_end() {
                // Unterminated: the whole span is an error
                return RawNode::new(RawKind::SyntaxError, start, self.current, children);
            }

            let c = self.peek();
            if c == closer {
                self.advance();
                return RawNode::new(kind, start, self.current, children);
            }

            if is_closer(c) {
                let at = self.current;
                self.advance();
                children.push(RawNode::leaf(RawKind::SyntaxError, at, self.current));
                continue;
            }

            children.push(self.scan_form());
        }
    }

    /// Reads the form following a reader prefix such as `'` or `#_`
    fn scan_prefixed(&mut self, kind: RawKind, start: usize) -> RawNode {
        let mut children = Vec::new();
        match self.scan_operand(&mut children) {
            Some(target) => {
                children.push(target);
                RawNode::new(kind, start, self.current, children)
            }
            None => RawNode::new(RawKind::SyntaxError, start, self.current, children),
        }
    }

    fn scan_tag(&mut self, start: usize) -> RawNode {
        let mut children = Vec::new();

        let Some(meta) = self.scan_operand(&mut children) else {
            return RawNode::new(RawKind::SyntaxError, start, self.current, children);
        };
        children.push(meta);

        let Some(target) = self.scan_operand(&mut children) else {
            return RawNode::new(RawKind::SyntaxError, start, self.current, children);
        };
        children.push(target);

        RawNode::new(RawKind::Tag, start, self.current, children)
    }

    fn scan_operand(&mut self, trivia: &mut Vec<RawNode>) -> Option<RawNode> {
        self.skip_trivia(trivia);
        if self.is_at_end() || is_closer(self.peek()) {
            return None;
        }
        Some(self.scan_form())
    }

    fn scan_string(&mut self, start: usize) -> RawNode {
        while !self.is_at_end() && self.peek() != '"' {
            if self.peek() == '\\' {
                self.advance();
                if self.is_at_end() {
                    break;
                }
            }
            self.advance();
        }

        if self.is_at_end() {
            return RawNode::leaf(RawKind::RestSyntaxError, start, self.current);
        }

        self.advance(); // Closing "
        RawNode::leaf(RawKind::String, start, self.current)
    }

    fn scan_number(&mut self, kind: RawKind, start: usize) -> RawNode {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            self.advance(); // consume .
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        if matches!(self.peek(), 'e' | 'E') {
            let next = self.peek_next();
            let signed = matches!(next, '+' | '-') && self.peek_at(2).is_ascii_digit();
            if next.is_ascii_digit() || signed {
                self.advance(); // e
                if signed {
                    self.advance();
                }
                while self.peek().is_ascii_digit() {
                    self.advance();
                }
            }
        }

        self.finish_atom(kind, start)
    }

    /// Numbers glued to symbol characters (`12abc`) are malformed
    fn finish_atom(&mut self, kind: RawKind, start: usize) -> RawNode {
        if self.skip_symbol_chars() > 0 {
            RawNode::leaf(RawKind::SyntaxError, start, self.current)
        } else {
            RawNode::leaf(kind, start, self.current)
        }
    }

    fn skip_symbol_chars(&mut self) -> usize {
        let from = self.current;
        while is_symbol_char(self.peek()) {
            self.advance();
        }
        self.current - from
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn advance(&mut self) -> char {
        let c = self.peek();
        if !self.is_at_end() {
            self.current += 1;
        }
        c
    }

    fn peek(&self) -> char {
        self.peek_at(0)
    }

    fn peek_next(&self) -> char {
        self.peek_at(1)
    }

    fn peek_at(&self, offset: usize) -> char {
        self.source
            .get(self.current + offset)
            .copied()
            .unwrap_or('\0')
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() != expected {
            false
        } else {
            self.current += 1;
            true
        }
    }
}
