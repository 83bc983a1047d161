//! Offset and context windows for the slice-based `Parser`
//!
//! [`ContextOffset`] couples a monotonically increasing index into a buffer of
//! known length with a [`FrameStack`] of window targets. Each target is an
//! absolute offset that the index must land on exactly before the window it
//! belongs to can be closed, and no consume operation may carry the index
//! past the innermost target while that window is open.

use crate::internal::stack::Stack;
use crate::parse::error::{ParseError, ParseResult, WindowError};

/// Trackers of a monotonically increasing index for non-backtracking
/// traversal of an array-like type, bounded by an invariant absolute limit
/// that the index may reach but never exceed.
pub(crate) trait IndexTracker {
    /// Creates a tracker at index `0` with absolute limit `abs`.
    fn with_limit(abs: usize) -> Self;

    /// Current value of the index.
    fn index(&self) -> usize;

    /// Absolute upper bound on the index, as passed to [`with_limit`].
    fn absolute_limit(&self) -> usize;

    /// Current upper bound on the index, never greater than the absolute limit.
    fn limit(&self) -> usize {
        self.absolute_limit()
    }

    /// Number of indices remaining before the current limit.
    fn rem(&self) -> usize {
        debug_assert!(self.limit() >= self.index());
        self.limit() - self.index()
    }

    /// Attempt to increment the index by `n`.
    ///
    /// Returns the index before the attempt, and whether the increment was
    /// performed. The index either stays put or advances by exactly `n`.
    fn advance(&mut self, n: usize) -> (usize, bool);
}

/// Determines whether a window ending at absolute offset `request` fits
/// inside the innermost existing window, if there is one.
#[inline]
fn detect_error(cur: usize) -> impl Fn(Option<usize>, usize) -> Option<WindowError> {
    move |innermost, request| match innermost {
        Some(limit) if request > limit => Some(WindowError::OpenWouldExceedWindow {
            limit: limit - cur,
            request: request - cur,
        }),
        _ => None,
    }
}

/// Stack of absolute window targets.
///
/// Elements are sorted by induction, with the smallest target on top.
#[derive(Debug, Default)]
#[repr(transparent)]
pub(crate) struct FrameStack(Vec<usize>);

impl FrameStack {
    fn push_frame(&mut self, cur: usize, target: usize) -> ParseResult<()> {
        Ok(self.0.push_validated(target, detect_error(cur))?)
    }

    fn peek(&self) -> Option<usize> {
        self.0.peek()
    }

    fn pop(&mut self) -> Option<usize> {
        Stack::pop(&mut self.0)
    }

    fn depth(&self) -> usize {
        self.0.depth()
    }
}

/// Tracks both the current offset of a buffer-based parser and its stack
/// of context windows.
#[derive(Debug)]
pub(crate) struct ContextOffset {
    abs: usize,
    frames: FrameStack,
    cur: usize,
}

impl ContextOffset {
    /// Opens a window permitting exactly `winsize` more bytes to be consumed.
    ///
    /// Fails if the window would pass the end of the buffer, or would not
    /// nest inside the innermost existing window.
    pub(crate) fn set_fit(&mut self, winsize: usize) -> ParseResult<()> {
        let cur = self.cur;
        match cur.checked_add(winsize) {
            Some(target) if target <= self.abs => self.frames.push_frame(cur, target),
            _ => Err(ParseError::Window(WindowError::OpenWouldExceedBuffer {
                bytes_left: self.abs - cur,
                request: winsize,
            })),
        }
    }

    /// Closes the innermost window, which must have been fully consumed.
    pub(crate) fn enforce_target(&mut self) -> ParseResult<()> {
        match self.frames.pop() {
            None => Err(ParseError::Window(WindowError::CloseWithoutWindow)),
            Some(tgt) => match tgt.cmp(&self.cur) {
                std::cmp::Ordering::Equal => Ok(()),
                std::cmp::Ordering::Greater => {
                    Err(ParseError::Window(WindowError::CloseWithResidue {
                        residual: tgt - self.cur,
                    }))
                }
                std::cmp::Ordering::Less => Err(ParseError::Window(WindowError::OffsetOverflow {
                    excess: self.cur - tgt,
                })),
            },
        }
    }

    /// Number of windows currently open
    pub(crate) fn depth(&self) -> usize {
        self.frames.depth()
    }
}

impl IndexTracker for ContextOffset {
    fn with_limit(abs: usize) -> Self {
        Self {
            abs,
            frames: FrameStack::default(),
            cur: 0,
        }
    }

    #[inline]
    fn index(&self) -> usize {
        self.cur
    }

    #[inline(always)]
    fn absolute_limit(&self) -> usize {
        self.abs
    }

    /// Returns the target of the innermost window, or the absolute limit
    /// if no window is open.
    #[inline]
    fn limit(&self) -> usize {
        self.frames.peek().unwrap_or(self.abs)
    }

    #[inline]
    fn advance(&mut self, n: usize) -> (usize, bool) {
        let ret = self.cur;
        match self.cur.checked_add(n) {
            Some(next) if next <= self.limit() => {
                self.cur = next;
                (ret, true)
            }
            _ => (ret, false),
        }
    }
}
