//! Element iterator for [`ByteVec`](crate::ByteVec).

use std::iter::FusedIterator;
use std::slice::ChunksExact;

/// Borrowing iterator over a vector's elements, each as a byte slice.
///
/// Holds a shared borrow of the vector, so it cannot observe a reallocation.
#[derive(Clone, Debug)]
pub struct Iter<'a> {
    chunks: ChunksExact<'a, u8>,
}

impl<'a> Iter<'a> {
    pub(crate) fn new(bytes: &'a [u8], element_size: usize) -> Self {
        // A destroyed vector has element size zero and no bytes.
        Self {
            chunks: bytes.chunks_exact(element_size.max(1)),
        }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<&'a [u8]> {
        self.chunks.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.chunks.size_hint()
    }

    fn nth(&mut self, n: usize) -> Option<&'a [u8]> {
        self.chunks.nth(n)
    }
}

impl DoubleEndedIterator for Iter<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.chunks.next_back()
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl FusedIterator for Iter<'_> {}
