//! Newtype wrappers that pick a semigroup for a numeric or ordered type.
//!
//! A plain `i32` has several lawful semigroups (addition, maximum, ...), so
//! the choice is made by wrapping the value.

macro_rules! define_wrapper {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct $name<A>(pub A);

        impl<A> $name<A> {
            /// Wraps a value.
            #[inline]
            pub const fn new(value: A) -> Self {
                Self(value)
            }

            /// Unwraps the value.
            #[inline]
            pub fn into_inner(self) -> A {
                self.0
            }
        }
    };
}

define_wrapper! {
    /// Combines by addition.
    ///
    /// ```rust
    /// use persistent_hamt::typeclass::{Semigroup, Sum};
    ///
    /// assert_eq!(Sum::new(3).combine(Sum::new(5)).into_inner(), 8);
    /// ```
    Sum
}

define_wrapper! {
    /// Combines by keeping the larger value.
    Max
}

define_wrapper! {
    /// Combines by keeping the smaller value.
    Min
}
