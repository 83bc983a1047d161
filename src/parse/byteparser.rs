//! Slice-backed `Parser` implementation

use crate::internal::offset::{ContextOffset, IndexTracker};
use crate::parse::error::{ParseError, ParseResult, WindowError};
use crate::parse::Parser;

/// `Parser` over a borrowed byte slice, tracking an absolute offset and a
/// stack of context windows.
#[derive(Debug)]
pub struct ByteParser<'a> {
    buf: &'a [u8],
    offset: ContextOffset,
}

impl<'a> ByteParser<'a> {
    #[must_use]
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            offset: ContextOffset::with_limit(buf.len()),
        }
    }

    /// Total length of the underlying buffer, regardless of open windows
    #[must_use]
    pub fn buffer_len(&self) -> usize {
        self.offset.absolute_limit()
    }

    /// Number of context windows currently open
    #[must_use]
    pub fn window_depth(&self) -> usize {
        self.offset.depth()
    }

    fn overrun(&self, requested: usize) -> ParseError {
        ParseError::Window(WindowError::ConsumeWouldExceedLimit {
            offset: self.offset.index(),
            requested,
            limit: self.offset.limit(),
        })
    }
}

impl Parser for ByteParser<'_> {
    #[inline]
    fn view_len(&self) -> usize {
        self.offset.limit()
    }

    #[inline]
    fn offset(&self) -> usize {
        self.offset.index()
    }

    #[inline]
    fn remainder(&self) -> usize {
        self.offset.rem()
    }

    fn consume_byte(&mut self) -> ParseResult<u8> {
        match self.offset.advance(1) {
            (ix, true) => Ok(self.buf[ix]),
            (_, false) => Err(self.overrun(1)),
        }
    }

    fn consume(&mut self, nbytes: usize) -> ParseResult<&[u8]> {
        match self.offset.advance(nbytes) {
            (ix, true) => Ok(&self.buf[ix..ix + nbytes]),
            (_, false) => Err(self.overrun(nbytes)),
        }
    }

    fn set_fit(&mut self, n: usize) -> ParseResult<()> {
        self.offset.set_fit(n)
    }

    fn enforce_target(&mut self) -> ParseResult<()> {
        self.offset.enforce_target()
    }

    fn lookback(&self, from: usize) -> &[u8] {
        let cur = self.offset.index();
        &self.buf[from.min(cur)..cur]
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parse::error::TokenError;

    #[test]
    fn varints() {
        let buf = [0x00, 0x7f, 0x80, 0x01, 0xac, 0x02];
        let mut p = ByteParser::new(&buf);
        assert_eq!(p.take_varint(), Ok(0));
        assert_eq!(p.take_varint(), Ok(127));
        assert_eq!(p.take_varint(), Ok(128));
        assert_eq!(p.take_varint(), Ok(300));
        assert_eq!(p.remainder(), 0);
    }

    #[test]
    fn varint_limits() {
        let max = [0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x01];
        assert_eq!(ByteParser::new(&max).take_varint(), Ok(u64::MAX));

        let wide = [0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x02];
        assert_eq!(
            ByteParser::new(&wide).take_varint(),
            Err(ParseError::Token(TokenError::VarintOverflow))
        );

        let long = [0x80; 11];
        assert_eq!(
            ByteParser::new(&long).take_varint(),
            Err(ParseError::Token(TokenError::VarintOverflow))
        );

        let short = [0x80, 0x80];
        assert_eq!(
            ByteParser::new(&short).take_varint(),
            Err(ParseError::Token(TokenError::NonTerminating(vec![0x80, 0x80])))
        );
    }

    #[test]
    fn fixed_words_are_little_endian() {
        let buf = [0x01, 0x00, 0x00, 0x00, 0x02, 0, 0, 0, 0, 0, 0, 0x80];
        let mut p = ByteParser::new(&buf);
        assert_eq!(p.take_fixed32(), Ok(1));
        assert_eq!(p.take_fixed64(), Ok(0x8000_0000_0000_0002));
    }

    #[test]
    fn windows_bound_consumption() {
        let buf = b"\x03abcde";
        let mut p = ByteParser::new(buf);
        let len = p.take_varint().unwrap() as usize;
        p.set_fit(len).unwrap();
        assert_eq!(p.remainder(), 3);
        assert!(p.consume(4).is_err());
        assert_eq!(p.consume(3), Ok(&b"abc"[..]));
        assert_eq!(p.remainder(), 0);
        p.enforce_target().unwrap();
        assert_eq!(p.remainder(), 2);
        assert_eq!(p.lookback(1), b"abc");
    }

    #[test]
    fn length_prefix_past_end() {
        let buf = [0x05, b'a', b'b'];
        let mut p = ByteParser::new(&buf);
        assert_eq!(
            p.take_length_delimited(),
            Err(ParseError::Window(WindowError::ConsumeWouldExceedLimit {
                offset: 1,
                requested: 5,
                limit: 3
            }))
        );
    }
}
