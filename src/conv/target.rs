/// Byte-oriented sink with incremental, infallible append operations
///
/// It is convenient to think of `Target` as an analogue of [`std::io::Write`]
/// whose `push_XXX` methods are infallible and total. The `usize` they return
/// is the number of bytes appended, used by the encoder to compute length
/// prefixes and to report totals, never as a signal of partial success.
///
/// Fallible destinations such as files are handled a layer up, in
/// [`store`](crate::store), which encodes into memory first and only then
/// hands the finished buffer to the destination.
pub trait Target {
    /// Hints that at least `extra` more bytes are about to be appended.
    ///
    /// For implementors with a notion of capacity this should reserve space;
    /// for everything else it is a no-op.
    fn anticipate(&mut self, extra: usize);

    /// Returns a fresh, empty value of the `Self` type.
    fn create() -> Self;

    /// Appends a single byte. The return value must be `1`.
    fn push_one(&mut self, b: u8) -> usize;

    /// Appends the bytes of a fixed-length array. The return value must be `N`.
    ///
    /// This must be indistinguishable from `N` successive `push_one` calls.
    fn push_many<const N: usize>(&mut self, arr: [u8; N]) -> usize;

    /// Appends every byte of `buf`, returning `buf.len()`.
    fn push_all(&mut self, buf: &[u8]) -> usize;
}

/// Alias for [`std::io::Sink`], used as a `Target` that only counts the bytes
/// it is given. The encoder uses it to size length prefixes without allocating.
pub type ByteCounter = std::io::Sink;

impl Target for ByteCounter {
    #[inline(always)]
    fn anticipate(&mut self, _: usize) {}

    #[inline]
    fn create() -> Self {
        std::io::sink()
    }

    #[inline(always)]
    fn push_one(&mut self, _: u8) -> usize {
        1
    }

    #[inline(always)]
    fn push_many<const N: usize>(&mut self, _: [u8; N]) -> usize {
        N
    }

    #[inline(always)]
    fn push_all(&mut self, buf: &[u8]) -> usize {
        buf.len()
    }
}

impl Target for Vec<u8> {
    #[inline]
    fn anticipate(&mut self, extra: usize) {
        self.reserve(extra)
    }

    #[inline]
    #[must_use]
    fn create() -> Self {
        Self::new()
    }

    #[inline]
    fn push_one(&mut self, b: u8) -> usize {
        self.push(b);
        1
    }

    #[inline]
    fn push_many<const N: usize>(&mut self, arr: [u8; N]) -> usize {
        self.extend_from_slice(&arr);
        N
    }

    #[inline]
    fn push_all(&mut self, buf: &[u8]) -> usize {
        self.extend_from_slice(buf);
        buf.len()
    }
}
