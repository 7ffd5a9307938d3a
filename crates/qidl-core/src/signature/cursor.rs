/// A cursor over signature text that tracks the byte offset.
///
/// Provides low-level character access with peek/advance semantics.
/// Signatures are single-line, so only the offset is tracked.
pub struct Cursor<'src> {
    /// The text being scanned.
    source: &'src str,
    /// Remaining text (slice starting at current position).
    rest: &'src str,
    /// Current byte offset from start of source.
    offset: usize,
}

impl<'src> Cursor<'src> {
    /// Create a new cursor at the start of the text.
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            rest: source,
            offset: 0,
        }
    }

    /// Get the full text.
    #[inline]
    pub fn source(&self) -> &'src str {
        self.source
    }

    /// Current byte offset from start of text.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Check if we've reached the end of input.
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.rest.is_empty()
    }

    /// Peek at the current character without consuming it.
    #[inline]
    pub fn peek(&self) -> Option<char> {
        let first = *self.rest.as_bytes().first()?;
        if first < 128 {
            Some(first as char)
        } else {
            self.rest.chars().next()
        }
    }

    /// Consume the current character and advance.
    ///
    /// Returns the consumed character, or `None` if at EOF.
    #[inline]
    pub fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        let len = ch.len_utf8();
        self.rest = &self.rest[len..];
        self.offset += len;
        Some(ch)
    }

    /// Consume if the current character matches.
    #[inline]
    pub fn eat(&mut self, ch: char) -> bool {
        if self.peek() == Some(ch) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume a `<`…`>` delimited run, honouring nested angle brackets.
    ///
    /// Must be called with the cursor on the opening `<`. Returns the text
    /// between the outer delimiters, or `None` if the run is never closed
    /// (the cursor is then at EOF).
    pub fn eat_angle_run(&mut self) -> Option<&'src str> {
        debug_assert_eq!(self.peek(), Some('<'));
        self.advance();
        let start = self.offset;
        let mut depth = 1usize;
        while let Some(ch) = self.advance() {
            match ch {
                '<' => depth += 1,
                '>' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(&self.source[start..self.offset - 1]);
                    }
                }
                _ => {}
            }
        }
        None
    }
}
