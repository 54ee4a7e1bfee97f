//! Element type descriptor: kind, bit width, and SIMD lane count.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The numeric family of a [`Type`]'s elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeKind {
    Int,
    UInt,
    Float,
}

/// A scalar or vector element type: `(kind, bits, lanes)`.
///
/// `bool` is represented as `UInt` with `bits == 1`. `lanes == 1` is a
/// scalar type; `lanes > 1` is a vector of that many lanes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Type {
    pub kind: TypeKind,
    pub bits: u8,
    pub lanes: u32,
}

impl Type {
    pub const fn new(kind: TypeKind, bits: u8, lanes: u32) -> Self {
        Type { kind, bits, lanes }
    }

    pub const fn int(bits: u8) -> Self {
        Type::new(TypeKind::Int, bits, 1)
    }

    pub const fn uint(bits: u8) -> Self {
        Type::new(TypeKind::UInt, bits, 1)
    }

    pub const fn float(bits: u8) -> Self {
        Type::new(TypeKind::Float, bits, 1)
    }

    pub const fn bool_() -> Self {
        Type::new(TypeKind::UInt, 1, 1)
    }

    pub fn is_scalar(&self) -> bool {
        self.lanes == 1
    }

    pub fn is_vector(&self) -> bool {
        self.lanes > 1
    }

    pub fn is_bool(&self) -> bool {
        self.kind == TypeKind::UInt && self.bits == 1
    }

    pub fn is_float(&self) -> bool {
        self.kind == TypeKind::Float
    }

    pub fn is_int(&self) -> bool {
        self.kind == TypeKind::Int
    }

    pub fn is_uint(&self) -> bool {
        self.kind == TypeKind::UInt
    }

    /// The scalar type obtained by dropping lanes to 1.
    pub fn element_of(&self) -> Type {
        Type::new(self.kind, self.bits, 1)
    }

    /// Widens a scalar type to a vector of `lanes` lanes. No-op if already
    /// that width.
    pub fn with_lanes(&self, lanes: u32) -> Type {
        Type::new(self.kind, self.bits, lanes)
    }

    /// The largest magnitude-representable signed/unsigned range for this
    /// type, used as a bounds-analysis fallback. `None` for float or for
    /// widths wider than 16 bits (per the bounds component's contract).
    pub fn representable_range(&self) -> Option<(i128, i128)> {
        match self.kind {
            TypeKind::Float => None,
            TypeKind::UInt if self.bits <= 16 => {
                Some((0, (1i128 << self.bits) - 1))
            }
            TypeKind::Int if self.bits <= 16 => {
                let half = 1i128 << (self.bits - 1);
                Some((-half, half - 1))
            }
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let base = match self.kind {
            TypeKind::Int => "int",
            TypeKind::UInt => "uint",
            TypeKind::Float => "float",
        };
        write!(f, "{base}{}", self.bits)?;
        if self.lanes > 1 {
            write!(f, "x{}", self.lanes)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_vs_vector() {
        let t = Type::int(32);
        assert!(t.is_scalar());
        let v = t.with_lanes(4);
        assert!(v.is_vector());
        assert_eq!(v.element_of(), t);
    }

    #[test]
    fn bool_is_uint1() {
        let b = Type::bool_();
        assert!(b.is_bool());
        assert_eq!(b, Type::uint(1));
    }

    #[test]
    fn equality_is_componentwise() {
        assert_eq!(Type::int(32), Type::int(32));
        assert_ne!(Type::int(32), Type::int(16));
        assert_ne!(Type::int(32), Type::uint(32));
    }

    #[test]
    fn representable_range() {
        assert_eq!(Type::uint(8).representable_range(), Some((0, 255)));
        assert_eq!(Type::int(8).representable_range(), Some((-128, 127)));
        assert_eq!(Type::float(32).representable_range(), None);
        assert_eq!(Type::int(32).representable_range(), None);
    }

    #[test]
    fn display_format() {
        assert_eq!(Type::int(32).to_string(), "int32");
        assert_eq!(Type::int(32).with_lanes(4).to_string(), "int32x4");
    }
}
