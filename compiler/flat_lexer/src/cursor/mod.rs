//! Byte cursor over the source text.
//!
//! Reads past the end return `0x00`, so dispatch on `current()` terminates
//! naturally at EOF. Interior null bytes are distinguished from EOF by
//! [`Cursor::is_eof`].

#[derive(Clone, Copy, Debug)]
pub(crate) struct Cursor<'a> {
    src: &'a str,
    /// Current byte offset into `src`.
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(src: &'a str, pos: usize) -> Self {
        debug_assert!(pos <= src.len(), "cursor start {pos} past end of source");
        Self { src, pos }
    }

    #[inline]
    fn byte_at(&self, pos: usize) -> u8 {
        self.src.as_bytes().get(pos).copied().unwrap_or(0)
    }

    /// Byte at the current position, `0x00` at EOF.
    #[inline]
    pub(crate) fn current(&self) -> u8 {
        self.byte_at(self.pos)
    }

    #[inline]
    pub(crate) fn peek(&self) -> u8 {
        self.byte_at(self.pos + 1)
    }

    #[inline]
    pub(crate) fn peek2(&self) -> u8 {
        self.byte_at(self.pos + 2)
    }

    #[inline]
    pub(crate) fn advance(&mut self) {
        self.pos += 1;
    }

    #[inline]
    pub(crate) fn advance_n(&mut self, n: usize) {
        self.pos += n;
    }

    /// Advance past one full UTF-8 character.
    pub(crate) fn advance_char(&mut self) {
        let width = self.src[self.pos..].chars().next().map_or(1, char::len_utf8);
        self.pos += width;
    }

    #[inline]
    pub(crate) fn is_eof(&self) -> bool {
        self.pos >= self.src.len()
    }

    #[inline]
    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    /// Source text from `start` to the current position.
    pub(crate) fn slice_from(&self, start: usize) -> &'a str {
        &self.src[start..self.pos]
    }

    /// Remaining source text after the current position.
    pub(crate) fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    /// Advance while `pred` holds. `pred(0)` must be false.
    #[inline]
    pub(crate) fn eat_while(&mut self, pred: impl Fn(u8) -> bool) {
        while pred(self.current()) {
            self.pos += 1;
        }
    }

    /// Advance to the next `\n` (not consumed) or EOF.
    pub(crate) fn eat_until_newline_or_eof(&mut self) {
        let remaining = self.rest().as_bytes();
        match memchr::memchr(b'\n', remaining) {
            // Leave a preceding `\r` for the linebreak token.
            Some(offset) if offset > 0 && remaining[offset - 1] == b'\r' => {
                self.pos += offset - 1;
            }
            Some(offset) => self.pos += offset,
            None => self.pos = self.src.len(),
        }
    }

    /// Advance past ordinary string content to the next `quote`, `\` or line
    /// terminator. Returns the byte found, or 0 at EOF.
    pub(crate) fn skip_to_string_delim(&mut self, quote: u8) -> u8 {
        let remaining = self.rest().as_bytes();
        let primary = memchr::memchr3(quote, b'\\', b'\n', remaining);
        let cr = memchr::memchr(b'\r', remaining);
        match earliest_of(primary, cr) {
            Some(offset) => {
                self.pos += offset;
                self.current()
            }
            None => {
                self.pos = self.src.len();
                0
            }
        }
    }

    /// Advance past ordinary template content to the next backtick or `\`.
    /// Returns the byte found, or 0 at EOF.
    pub(crate) fn skip_to_template_delim(&mut self) -> u8 {
        match memchr::memchr2(b'`', b'\\', self.rest().as_bytes()) {
            Some(offset) => {
                self.pos += offset;
                self.current()
            }
            None => {
                self.pos = self.src.len();
                0
            }
        }
    }

    /// Advance past the next `*/`. Returns `false` (cursor at EOF) if the
    /// comment is unterminated.
    pub(crate) fn eat_block_comment_body(&mut self) -> bool {
        match memchr::memmem::find(self.rest().as_bytes(), b"*/") {
            Some(offset) => {
                self.pos += offset + 2;
                true
            }
            None => {
                self.pos = self.src.len();
                false
            }
        }
    }
}

/// Number of line breaks in `text`. A `\r\n` pair counts once.
pub fn count_newlines(text: &str) -> u32 {
    let count = memchr::memchr_iter(b'\n', text.as_bytes()).count();
    u32::try_from(count).unwrap_or(u32::MAX)
}

fn earliest_of(a: Option<usize>, b: Option<usize>) -> Option<usize> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.min(y)),
        (Some(x), None) | (None, Some(x)) => Some(x),
        (None, None) => None,
    }
}
