//! Strongly-typed index newtypes.
//!
//! Cell, boundary-face and patch indices all end up as `usize` offsets into
//! flat arrays. Keeping them distinct stops a patch id from being used to
//! index a cell field.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! define_index {
    (
        $(#[$meta:meta])*
        $name:ident, $display_prefix:literal
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[repr(transparent)]
        #[serde(transparent)]
        pub struct $name(usize);

        impl $name {
            /// Create a new index.
            #[inline]
            pub const fn new(index: usize) -> Self {
                Self(index)
            }

            /// Get the raw index value.
            #[inline]
            pub const fn get(self) -> usize {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $display_prefix, self.0)
            }
        }
    };
}

define_index!(
    /// Cell index in a partition-local mesh.
    ///
    /// ```
    /// use massbal::types::CellIndex;
    ///
    /// let cell = CellIndex::new(7);
    /// assert_eq!(cell.get(), 7);
    /// ```
    CellIndex,
    "C"
);

define_index!(
    /// Boundary-face index, counted over all boundary faces of a mesh.
    FaceIndex,
    "F"
);

define_index!(
    /// Position of a named patch in a mesh's boundary list.
    ///
    /// Only produced by a successful name lookup, so holding one means the
    /// patch exists on this partition.
    PatchIndex,
    "P"
);
