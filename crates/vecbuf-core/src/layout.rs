//! Element layout: the construction-time configuration of a vector.

use std::alloc::Layout;

use crate::error::VecError;

/// Byte size and alignment of one vector element.
///
/// Validated at construction; immutable afterwards. The size is always a
/// multiple of the alignment, so consecutive elements in a buffer aligned
/// to `align` are each aligned too.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ElementLayout {
    size: usize,
    align: usize,
}

impl ElementLayout {
    /// Largest alignment [`ElementLayout::new`] will infer from a size.
    ///
    /// Matches the guarantee of C's `malloc` on common 64-bit targets.
    pub const MAX_ALIGN: usize = 16;

    /// Layout for elements of `size` bytes with natural alignment.
    ///
    /// The alignment is the largest power of two dividing `size`, capped
    /// at [`MAX_ALIGN`](Self::MAX_ALIGN). Any C or Rust type of this size
    /// has an alignment no larger than that.
    pub fn new(size: usize) -> Result<Self, VecError> {
        if size == 0 {
            return Err(VecError::ZeroSizedElement);
        }
        let natural = 1usize << size.trailing_zeros();
        Ok(Self {
            size,
            align: natural.min(Self::MAX_ALIGN),
        })
    }

    /// Layout with an explicit alignment.
    ///
    /// `align` must be a power of two and `size` a non-zero multiple of it.
    pub fn with_align(size: usize, align: usize) -> Result<Self, VecError> {
        if size == 0 {
            return Err(VecError::ZeroSizedElement);
        }
        if !align.is_power_of_two() || size % align != 0 {
            return Err(VecError::InvalidLayout { size, align });
        }
        Ok(Self { size, align })
    }

    /// Exact layout of `T`. May be zero-sized; vectors reject that.
    pub const fn of<T>() -> Self {
        Self {
            size: std::mem::size_of::<T>(),
            align: std::mem::align_of::<T>(),
        }
    }

    /// Layout of a torn-down vector: no element size at all.
    pub const fn destroyed() -> Self {
        Self { size: 0, align: 1 }
    }

    /// Element size in bytes.
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Element alignment in bytes.
    pub const fn align(&self) -> usize {
        self.align
    }

    /// Byte size of `capacity` elements, or `None` on overflow.
    pub fn array_bytes(&self, capacity: usize) -> Option<usize> {
        self.size.checked_mul(capacity)
    }

    /// Allocation layout for `capacity` elements.
    ///
    /// `None` when the byte size overflows `usize` or exceeds what
    /// [`Layout`] can describe (`isize::MAX` after rounding).
    pub fn array(&self, capacity: usize) -> Option<Layout> {
        let bytes = self.array_bytes(capacity)?;
        Layout::from_size_align(bytes, self.align).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn natural_alignment_from_size() {
        assert_eq!(ElementLayout::new(1).unwrap().align(), 1);
        assert_eq!(ElementLayout::new(3).unwrap().align(), 1);
        assert_eq!(ElementLayout::new(4).unwrap().align(), 4);
        assert_eq!(ElementLayout::new(12).unwrap().align(), 4);
        assert_eq!(ElementLayout::new(24).unwrap().align(), 8);
        assert_eq!(ElementLayout::new(132).unwrap().align(), 4);
        assert_eq!(ElementLayout::new(256).unwrap().align(), 16);
    }

    #[test]
    fn zero_size_rejected() {
        assert_eq!(ElementLayout::new(0), Err(VecError::ZeroSizedElement));
        assert_eq!(
            ElementLayout::with_align(0, 4),
            Err(VecError::ZeroSizedElement)
        );
    }

    #[test]
    fn explicit_alignment_validated() {
        assert!(ElementLayout::with_align(32, 32).is_ok());
        assert_eq!(
            ElementLayout::with_align(12, 8),
            Err(VecError::InvalidLayout { size: 12, align: 8 })
        );
        assert_eq!(
            ElementLayout::with_align(12, 3),
            Err(VecError::InvalidLayout { size: 12, align: 3 })
        );
    }

    #[test]
    fn of_matches_rust_type() {
        let l = ElementLayout::of::<u64>();
        assert_eq!(l.size(), 8);
        assert_eq!(l.align(), std::mem::align_of::<u64>());
        assert_eq!(ElementLayout::of::<()>().size(), 0);
    }

    #[test]
    fn array_overflow_is_none() {
        let l = ElementLayout::new(8).unwrap();
        assert_eq!(l.array_bytes(usize::MAX / 8 + 1), None);
        assert!(l.array(usize::MAX / 8 + 1).is_none());
        // Representable in usize but beyond isize::MAX.
        assert!(l.array(usize::MAX / 8).is_none());
        assert_eq!(l.array(10).unwrap().size(), 80);
        assert_eq!(l.array(10).unwrap().align(), 8);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn natural_layout_is_self_consistent(size in 1usize..100_000) {
                let l = ElementLayout::new(size).unwrap();
                prop_assert!(l.align().is_power_of_two());
                prop_assert!(l.align() <= ElementLayout::MAX_ALIGN);
                prop_assert_eq!(l.size() % l.align(), 0);
            }

            #[test]
            fn array_bytes_is_checked_product(size in 1usize..4096, cap in 0usize..1_000_000) {
                let l = ElementLayout::new(size).unwrap();
                prop_assert_eq!(l.array_bytes(cap), Some(size * cap));
                let arr = l.array(cap).unwrap();
                prop_assert_eq!(arr.size(), size * cap);
            }
        }
    }
}
