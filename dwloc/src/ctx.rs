//! The pools of externally owned resources that location entries refer to.
//!
//! Entries never store symbols, variable descriptors or constants directly: they store `Copy`
//! indices into the pools below, all owned by a [LocCtx]. Pools only grow and pooled data is
//! immutable once allocated, so an index, once handed out, stays valid for the lifetime of the
//! `LocCtx`. Comparing two indices compares allocation identity: two separately allocated
//! constants with the same bit pattern are *not* the same constant.

use crate::DebugLocError;
use std::{fmt, mem};
use typed_index_collections::TiVec;

/// Helper to create index overflow errors.
fn index_overflow(typ: &str) -> DebugLocError {
    DebugLocError::LimitExceeded(format!("index overflow: {typ}"))
}

// Generate common methods for 32-bit index types.
macro_rules! index_32bit {
    ($struct:ident) => {
        impl $struct {
            pub(crate) fn new(v: usize) -> Result<Self, DebugLocError> {
                u32::try_from(v)
                    .map_err(|_| index_overflow(stringify!($struct)))
                    .map(|u| Self(u))
            }
        }

        impl From<usize> for $struct {
            /// Required for TiVec. **DO NOT USE INTERNALLY as this can `panic`!** Instead, use
            /// [Self::new].
            fn from(v: usize) -> Self {
                Self::new(v).unwrap()
            }
        }

        impl From<$struct> for usize {
            // Required for TiVec.
            fn from(s: $struct) -> usize {
                static_assertions::const_assert!(mem::size_of::<usize>() >= 4);
                s.0 as usize
            }
        }

        impl fmt::Display for $struct {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
                write!(f, "{}", self.0)
            }
        }
    };
}

/// An instruction-stream symbol index.
///
/// One of these is an index into [LocCtx::syms]. Two `SymIdx` compare equal iff they name the
/// same allocated symbol; the symbol's contents are never consulted.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub struct SymIdx(u32);
index_32bit!(SymIdx);

/// A variable descriptor index.
///
/// One of these is an index into [LocCtx::vars].
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub struct VarIdx(u32);
index_32bit!(VarIdx);

/// A floating point constant index.
///
/// One of these is an index into [LocCtx::float_consts].
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub struct FloatConstIdx(u32);
index_32bit!(FloatConstIdx);

/// An integer constant index.
///
/// One of these is an index into [LocCtx::int_consts].
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub struct IntConstIdx(u32);
index_32bit!(IntConstIdx);

/// A symbol marking a position in the generated instruction stream.
///
/// Symbols delimit where a location description is valid. The emission pipeline allocates each
/// symbol once and refers to it by [SymIdx] thereafter; the name exists for display only and
/// plays no part in any comparison.
#[derive(Debug)]
pub struct InsnSym {
    name: String,
}

impl InsnSym {
    /// The symbol's display name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// The descriptor of a source-level variable, or of one piece of a variable whose value has been
/// split across several locations.
#[derive(Debug)]
pub struct VarDesc {
    /// The variable's source-level name.
    name: String,
    /// `Some(off)` if this descriptor covers a piece of a split variable, where `off` is the
    /// byte offset of the piece within the whole variable. `None` if it covers the whole
    /// variable. Note that a piece at offset 0 is distinct from a whole variable.
    piece: Option<u64>,
}

impl VarDesc {
    /// Create a descriptor covering the whole variable `name`.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            piece: None,
        }
    }

    /// Create a descriptor covering the piece of `name` starting `byte_off` bytes into the
    /// variable.
    pub fn new_piece(name: &str, byte_off: u64) -> Self {
        Self {
            name: name.to_owned(),
            piece: Some(byte_off),
        }
    }

    /// The variable's source-level name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Does this descriptor cover a piece of a split variable (as opposed to the whole of it)?
    pub fn is_piece(&self) -> bool {
        self.piece.is_some()
    }

    /// The byte offset of this piece within the whole variable, or 0 if this descriptor covers
    /// the whole variable.
    pub fn piece_byte_off(&self) -> u64 {
        self.piece.unwrap_or(0)
    }
}

/// A pooled floating point constant.
///
/// Deliberately does not implement [PartialEq]: constants are compared by [FloatConstIdx]
/// identity, never by value.
#[derive(Debug)]
pub struct FloatConst(f64);

impl FloatConst {
    /// The constant's value.
    pub fn value(&self) -> f64 {
        self.0
    }
}

/// A pooled integer constant of up to 64 bits.
///
/// Deliberately does not implement [PartialEq]: constants are compared by [IntConstIdx]
/// identity, never by value.
#[derive(Debug)]
pub struct IntConst {
    /// The width of the constant in bits.
    bits: u32,
    /// The constant's value, zero extended to 64 bits.
    v: u64,
}

impl IntConst {
    /// The width of the constant in bits.
    pub fn bits(&self) -> u32 {
        self.bits
    }

    /// The constant's value, zero extended to 64 bits.
    pub fn value(&self) -> u64 {
        self.v
    }
}

/// The `LocCtx` is the top-level container for the resources that location entries refer to:
/// instruction-stream symbols, variable descriptors and pooled constants.
///
/// During a merge pass over an entry list the `LocCtx` is read-only; entries hold indices into
/// it and never allocate, free or mutate pooled data.
#[derive(Debug)]
pub struct LocCtx {
    /// The instruction-stream symbol pool. A [SymIdx] describes an index into this.
    syms: TiVec<SymIdx, InsnSym>,
    /// The variable descriptor pool. A [VarIdx] describes an index into this.
    vars: TiVec<VarIdx, VarDesc>,
    /// The floating point constant pool. A [FloatConstIdx] describes an index into this.
    float_consts: TiVec<FloatConstIdx, FloatConst>,
    /// The integer constant pool. An [IntConstIdx] describes an index into this.
    int_consts: TiVec<IntConstIdx, IntConst>,
}

impl LocCtx {
    /// Create an empty `LocCtx`.
    pub fn new() -> Self {
        Self {
            syms: TiVec::new(),
            vars: TiVec::new(),
            float_consts: TiVec::new(),
            int_consts: TiVec::new(),
        }
    }

    /// Allocate a new instruction-stream symbol named `name`.
    pub fn new_sym(&mut self, name: &str) -> Result<SymIdx, DebugLocError> {
        match SymIdx::new(self.syms.len()) {
            Ok(x) => {
                self.syms.push(InsnSym {
                    name: name.to_owned(),
                });
                Ok(x)
            }
            Err(e) => Err(e),
        }
    }

    /// Add the variable descriptor `vd` to the pool.
    pub fn new_var(&mut self, vd: VarDesc) -> Result<VarIdx, DebugLocError> {
        match VarIdx::new(self.vars.len()) {
            Ok(x) => {
                self.vars.push(vd);
                Ok(x)
            }
            Err(e) => Err(e),
        }
    }

    /// Allocate a new floating point constant.
    ///
    /// Constants are never interned: allocating the same value twice yields two distinct
    /// constants.
    pub fn new_float_const(&mut self, v: f64) -> Result<FloatConstIdx, DebugLocError> {
        match FloatConstIdx::new(self.float_consts.len()) {
            Ok(x) => {
                self.float_consts.push(FloatConst(v));
                Ok(x)
            }
            Err(e) => Err(e),
        }
    }

    /// Allocate a new `bits`-wide integer constant with value `v` (zero extended).
    ///
    /// Constants are never interned: allocating the same value twice yields two distinct
    /// constants.
    pub fn new_int_const(&mut self, bits: u32, v: u64) -> Result<IntConstIdx, DebugLocError> {
        if !(1..=64).contains(&bits) {
            return Err(DebugLocError::LimitExceeded(format!(
                "unsupported integer constant width: {bits} bits"
            )));
        }
        match IntConstIdx::new(self.int_consts.len()) {
            Ok(x) => {
                self.int_consts.push(IntConst { bits, v });
                Ok(x)
            }
            Err(e) => Err(e),
        }
    }

    /// Return the symbol for the specified index.
    ///
    /// # Panics
    ///
    /// Panics if the index is out of bounds.
    pub fn sym(&self, idx: SymIdx) -> &InsnSym {
        &self.syms[idx]
    }

    /// Return the variable descriptor for the specified index.
    ///
    /// # Panics
    ///
    /// Panics if the index is out of bounds.
    pub fn var(&self, idx: VarIdx) -> &VarDesc {
        &self.vars[idx]
    }

    /// Return the floating point constant for the specified index.
    ///
    /// # Panics
    ///
    /// Panics if the index is out of bounds.
    pub fn float_const(&self, idx: FloatConstIdx) -> &FloatConst {
        &self.float_consts[idx]
    }

    /// Return the integer constant for the specified index.
    ///
    /// # Panics
    ///
    /// Panics if the index is out of bounds.
    pub fn int_const(&self, idx: IntConstIdx) -> &IntConst {
        &self.int_consts[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index32_fits() {
        assert!(SymIdx::new(0).is_ok());
        assert!(SymIdx::new(1).is_ok());
        assert!(SymIdx::new(0x1234).is_ok());
        assert!(SymIdx::new(usize::try_from(u32::MAX).unwrap()).is_ok());
    }

    #[test]
    fn index32_doesnt_fit() {
        assert!(SymIdx::new(usize::try_from(u32::MAX).unwrap() + 1).is_err());
        assert!(VarIdx::new(usize::MAX).is_err());
    }

    #[test]
    fn index32_round_trip() {
        let idx = VarIdx::new(0x1234).unwrap();
        assert_eq!(usize::from(idx), 0x1234);
        assert_eq!(format!("{idx}"), "4660");
    }

    #[test]
    fn alloc_syms() {
        let mut ctx = LocCtx::new();
        let s0 = ctx.new_sym("func_begin0").unwrap();
        let s1 = ctx.new_sym("debug_loc0").unwrap();
        assert_ne!(s0, s1);
        assert_eq!(ctx.sym(s0).name(), "func_begin0");
        assert_eq!(ctx.sym(s1).name(), "debug_loc0");
    }

    #[test]
    fn var_pieces() {
        let mut ctx = LocCtx::new();
        let whole = ctx.new_var(VarDesc::new("x")).unwrap();
        let piece0 = ctx.new_var(VarDesc::new_piece("y", 0)).unwrap();
        let piece8 = ctx.new_var(VarDesc::new_piece("y", 8)).unwrap();
        assert!(!ctx.var(whole).is_piece());
        assert_eq!(ctx.var(whole).piece_byte_off(), 0);
        // A piece at offset 0 is still a piece.
        assert!(ctx.var(piece0).is_piece());
        assert_eq!(ctx.var(piece0).piece_byte_off(), 0);
        assert_eq!(ctx.var(piece8).piece_byte_off(), 8);
        assert_eq!(ctx.var(piece8).name(), "y");
    }

    #[test]
    fn consts_compare_by_identity() {
        let mut ctx = LocCtx::new();
        let c0 = ctx.new_float_const(1.0).unwrap();
        let c1 = ctx.new_float_const(1.0).unwrap();
        assert_ne!(c0, c1);
        let i0 = ctx.new_int_const(32, 42).unwrap();
        let i1 = ctx.new_int_const(32, 42).unwrap();
        assert_ne!(i0, i1);
        assert_eq!(ctx.int_const(i0).value(), ctx.int_const(i1).value());
    }

    #[test]
    fn int_const_width_checked() {
        let mut ctx = LocCtx::new();
        assert!(ctx.new_int_const(0, 0).is_err());
        assert!(ctx.new_int_const(65, 0).is_err());
        assert!(ctx.new_int_const(1, 1).is_ok());
        assert!(ctx.new_int_const(64, u64::MAX).is_ok());
    }
}
