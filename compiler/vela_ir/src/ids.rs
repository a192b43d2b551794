//! Dense indices into the program graph's tables.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            #[inline]
            pub const fn new(index: u32) -> Self {
                $name(index)
            }

            /// Get the index into the owning table.
            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }

            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

define_id!(
    /// Index into [`ProgramGraph`](crate::ProgramGraph) classes.
    ClassId,
    "class#"
);
define_id!(
    /// Index into [`ProgramGraph`](crate::ProgramGraph) functions.
    FunctionId,
    "fn#"
);
define_id!(
    /// Index into [`ProgramGraph`](crate::ProgramGraph) variables.
    VarId,
    "var#"
);
define_id!(
    /// Index into [`ProgramGraph`](crate::ProgramGraph) static libraries.
    LibId,
    "lib#"
);
