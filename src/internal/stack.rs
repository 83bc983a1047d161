/// Minimal stack abstraction over `Copy` items
pub(crate) trait Stack {
    /// Type of the values that are pushed onto the stack.
    type Item: Copy;

    /// Return the topmost value of the Stack, or `None` if it is empty
    fn peek(&self) -> Option<Self::Item>;

    /// Like `peek`, but the topmost value of the stack is removed if it exists.
    fn pop(&mut self) -> Option<Self::Item>;

    /// Push `item` onto the top of the stack.
    fn push(&mut self, item: Self::Item);

    /// Given a closure that returns `None` in the case of a valid value to push,
    /// and `Some(err)` if an error occured, pre-validate and push `item` onto the
    /// Stack.
    ///
    /// If `Err(_)` is returned, the receiver is unmodified.
    fn push_validated<Error, F>(&mut self, item: Self::Item, validate: F) -> Result<(), Error>
    where
        F: Fn(Option<Self::Item>, Self::Item) -> Option<Error>,
    {
        match validate(self.peek(), item) {
            None => {
                self.push(item);
                Ok(())
            }
            Some(err) => Err(err),
        }
    }

    fn depth(&self) -> usize;
}

impl<T: Copy> Stack for Vec<T> {
    type Item = T;

    fn peek(&self) -> Option<Self::Item> {
        self.last().copied()
    }

    fn pop(&mut self) -> Option<Self::Item> {
        Vec::pop(self)
    }

    fn push(&mut self, item: Self::Item) {
        Vec::push(self, item)
    }

    fn depth(&self) -> usize {
        self.len()
    }
}
