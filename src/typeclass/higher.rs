//! Higher-kinded type emulation.

/// A type constructor applied to one element type.
///
/// `Inner` is the element type the constructor is currently applied to and
/// `WithType<B>` is the same constructor applied to `B`. For a keyed
/// container the key (and hasher) stay fixed and only the value type varies.
///
/// # Examples
///
/// ```rust
/// use persistent_hamt::persistent::PersistentHashMap;
/// use persistent_hamt::typeclass::TypeConstructor;
///
/// fn element_count<T: TypeConstructor<Inner = i32>>(_: &T) -> &'static str {
///     "holds i32"
/// }
///
/// let map: PersistentHashMap<String, i32> = PersistentHashMap::new();
/// assert_eq!(element_count(&map), "holds i32");
/// ```
pub trait TypeConstructor {
    /// The element type.
    type Inner;

    /// The same constructor over another element type.
    type WithType<B>: TypeConstructor<Inner = B>;
}

impl<A> TypeConstructor for Option<A> {
    type Inner = A;
    type WithType<B> = Option<B>;
}

impl<A> TypeConstructor for Vec<A> {
    type Inner = A;
    type WithType<B> = Vec<B>;
}
