//! Debug-location list entries.
//!
//! A [LocEntry] says: over the half-open instruction range `[begin, end)`, the variable (or the
//! pieces of the variable) named by its values can be found where those values say. Entries are
//! created one at a time by the emission pipeline as it walks the generated instructions, then
//! offered to the two merge operations while the pipeline scans the resulting ordered list (see
//! [crate::loc_list]). A successful merge mutates the receiving entry in place; the caller
//! discards the other entry and must not refer to it again.
//!
//! An entry's only state transitions are the monotonic extension of its end symbol and the
//! dedup-bounded growth of its value list, both via the merge operations. Nothing ever shrinks a
//! value list or retracts a range boundary.

use crate::{
    ctx::{FloatConstIdx, IntConstIdx, LocCtx, SymIdx, VarIdx},
    machine_loc::MachineLoc,
};
use smallvec::SmallVec;
use std::fmt;
use strum::EnumDiscriminants;

/// A single location or constant.
///
/// The owning variable takes no part in equality: two values are equal iff their kinds and
/// payloads are (see [LocValueKind]). Values likewise have no general ordering; the only
/// cross-value comparison besides equality is the [Self::piece_byte_off] grouping key used by
/// the sort step.
#[derive(Clone, Copy, Debug)]
pub struct LocValue {
    /// The variable (or variable piece) this value describes.
    var: VarIdx,
    /// What holds the variable's contents.
    kind: LocValueKind,
}

/// What holds a variable's contents: a machine location or one of three constant forms.
///
/// Equality of the two pooled constant forms is index identity: two separately allocated
/// constants are unequal even if the pooled values coincide.
#[derive(Clone, Copy, Debug, EnumDiscriminants, Eq, PartialEq)]
#[strum_discriminants(name(LocValueTag))]
pub enum LocValueKind {
    /// The variable is live in a machine location.
    MachineLoc(MachineLoc),
    /// The variable's value is a known 64-bit signed integer.
    Int(i64),
    /// The variable's value is a pooled floating point constant.
    FloatConst(FloatConstIdx),
    /// The variable's value is a pooled integer constant.
    IntConst(IntConstIdx),
}

impl LocValue {
    /// Create a value placing `var` in the machine location `loc`.
    pub fn new_machine_loc(var: VarIdx, loc: MachineLoc) -> Self {
        Self {
            var,
            kind: LocValueKind::MachineLoc(loc),
        }
    }

    /// Create a value stating that `var` holds the integer `v`.
    pub fn new_int(var: VarIdx, v: i64) -> Self {
        Self {
            var,
            kind: LocValueKind::Int(v),
        }
    }

    /// Create a value stating that `var` holds the pooled floating point constant `cidx`.
    pub fn new_float_const(var: VarIdx, cidx: FloatConstIdx) -> Self {
        Self {
            var,
            kind: LocValueKind::FloatConst(cidx),
        }
    }

    /// Create a value stating that `var` holds the pooled integer constant `cidx`.
    pub fn new_int_const(var: VarIdx, cidx: IntConstIdx) -> Self {
        Self {
            var,
            kind: LocValueKind::IntConst(cidx),
        }
    }

    /// The variable (or variable piece) this value describes.
    pub fn var(&self) -> VarIdx {
        self.var
    }

    /// What holds the variable's contents.
    pub fn kind(&self) -> LocValueKind {
        self.kind
    }

    /// Report which of the four forms this value takes, without its payload.
    pub fn tag(&self) -> LocValueTag {
        LocValueTag::from(&self.kind)
    }

    /// Is this value a machine location?
    pub fn is_machine_loc(&self) -> bool {
        self.tag() == LocValueTag::MachineLoc
    }

    /// Is this value a known integer?
    pub fn is_int(&self) -> bool {
        self.tag() == LocValueTag::Int
    }

    /// Is this value a pooled floating point constant?
    pub fn is_float_const(&self) -> bool {
        self.tag() == LocValueTag::FloatConst
    }

    /// Is this value a pooled integer constant?
    pub fn is_int_const(&self) -> bool {
        self.tag() == LocValueTag::IntConst
    }

    /// The byte offset of the variable piece this value describes, or 0 if it describes a whole
    /// variable.
    ///
    /// This is a grouping key for sorting the pieces of one split variable. It is *not* a total
    /// order over values: it ignores the kind and payload entirely, and two pieces with equal
    /// offsets are equivalent under it. Don't use it to compare values across variables.
    pub fn piece_byte_off(&self, ctx: &LocCtx) -> u64 {
        ctx.var(self.var).piece_byte_off()
    }

    /// Return an object with a [fmt::Display] implementation showing this value with its
    /// variable name resolved from `ctx`.
    pub fn display<'a>(&'a self, ctx: &'a LocCtx) -> DisplayableLocValue<'a> {
        DisplayableLocValue { val: self, ctx }
    }
}

impl PartialEq for LocValue {
    /// Equality is over the kind and payload only; the owning variable is deliberately
    /// excluded.
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Eq for LocValue {}

/// Helper for [LocValue::display].
pub struct DisplayableLocValue<'a> {
    val: &'a LocValue,
    ctx: &'a LocCtx,
}

impl fmt::Display for DisplayableLocValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let vd = self.ctx.var(self.val.var);
        write!(f, "{}", vd.name())?;
        if vd.is_piece() {
            write!(f, "+{}", vd.piece_byte_off())?;
        }
        match self.val.kind {
            LocValueKind::MachineLoc(loc) => write!(f, ": {loc}"),
            LocValueKind::Int(v) => write!(f, ": {v}"),
            LocValueKind::FloatConst(cidx) => write!(f, ": fconst{cidx}"),
            LocValueKind::IntConst(cidx) => write!(f, ": iconst{cidx}"),
        }
    }
}

/// An entry in a debug-location list.
///
/// `begin` and `end` delimit the half-open range of generated instructions over which `values`
/// describe the variable. An entry always covers a range and always carries at least one value.
#[derive(Clone, Debug)]
pub struct LocEntry {
    /// Begin symbol of the address range for which this entry's values are valid.
    begin: SymIdx,
    /// End symbol (exclusive) of the address range.
    end: SymIdx,
    /// The locations/constants belonging to this entry, sorted by piece offset and free of
    /// duplicates. More than one element implies every element describes a piece of one split
    /// variable.
    values: SmallVec<[LocValue; 1]>,
}

impl LocEntry {
    /// Create an entry stating that `val` holds over `[begin, end)`. No merging is performed.
    pub fn new(begin: SymIdx, end: SymIdx, val: LocValue) -> Self {
        let mut values = SmallVec::new();
        values.push(val);
        Self { begin, end, values }
    }

    /// The symbol at which this entry's range begins.
    pub fn begin(&self) -> SymIdx {
        self.begin
    }

    /// The symbol at which this entry's range ends (exclusive).
    pub fn end(&self) -> SymIdx {
        self.end
    }

    /// A read-only view of this entry's values.
    pub fn values(&self) -> &[LocValue] {
        &self.values
    }

    /// If `self` and `next` describe different pieces of the same variable over ranges starting
    /// at the same symbol, merge them: append `next`'s values to `self`'s and adopt `next`'s
    /// end symbol. Returns true if the merge happened; on false, `self` is unmodified and the
    /// caller must keep both entries.
    ///
    /// Two pieces of one split variable are computed independently and so arrive as separate
    /// entries, but a consumer expects at most one entry active per address for a given
    /// variable; this turns the overlapping pair into one entry with a multi-piece value list.
    pub fn merge_values(&mut self, ctx: &LocCtx, next: &LocEntry) -> bool {
        if self.begin == next.begin && !self.values.is_empty() && !next.values.is_empty() {
            let vd = ctx.var(self.values[0].var());
            let next_vd = ctx.var(next.values[0].var());
            if vd.name() == next_vd.name() && vd.is_piece() && next_vd.is_piece() {
                self.add_values(ctx, &next.values);
                self.end = next.end;
                return true;
            }
        }
        false
    }

    /// If `next`'s range starts at the symbol where `self`'s ends and both entries carry
    /// exactly equal value lists, extend `self`'s range over `next`'s. Returns true if the
    /// merge happened; values are left unchanged either way.
    ///
    /// This collapses a contiguous run of instructions that don't move the variable into a
    /// single range. It bounds the size of the emitted table and has no semantic effect on the
    /// described value.
    pub fn merge_ranges(&mut self, next: &LocEntry) -> bool {
        if self.end == next.begin && self.values == next.values {
            self.end = next.end;
            return true;
        }
        false
    }

    /// Append `vals` to this entry's value list, then re-sort by piece offset and drop
    /// duplicates.
    ///
    /// # Panics
    ///
    /// Panics if any resulting value describes a variable that is not a piece. Appending values
    /// is only meaningful when combining the pieces of one split variable, so a non-piece here
    /// means the caller merged values for a variable that was never split. That is a contract
    /// violation, not a data condition, and it aborts in release builds too.
    pub fn add_values(&mut self, ctx: &LocCtx, vals: &[LocValue]) {
        self.values.extend_from_slice(vals);
        self.sort_unique_values(ctx);
        assert!(
            self.values.iter().all(|v| ctx.var(v.var()).is_piece()),
            "merged values for a variable that was never split"
        );
    }

    /// Sort the values by piece offset, then drop all but the first of each run of equal
    /// values. Idempotent.
    fn sort_unique_values(&mut self, ctx: &LocCtx) {
        // The sort is stable, so pieces with equal offsets keep their insertion order and a
        // repeat application changes nothing.
        self.values.sort_by_key(|v| v.piece_byte_off(ctx));
        self.values.dedup();
    }

    /// Return an object with a [fmt::Display] implementation showing this entry with symbol and
    /// variable names resolved from `ctx`.
    pub fn display<'a>(&'a self, ctx: &'a LocCtx) -> DisplayableLocEntry<'a> {
        DisplayableLocEntry { ent: self, ctx }
    }
}

/// Helper for [LocEntry::display].
pub struct DisplayableLocEntry<'a> {
    ent: &'a LocEntry,
    ctx: &'a LocCtx,
}

impl fmt::Display for DisplayableLocEntry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}): ",
            self.ctx.sym(self.ent.begin).name(),
            self.ctx.sym(self.ent.end).name()
        )?;
        for (i, v) in self.ent.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", v.display(self.ctx))?;
        }
        Ok(())
    }
}
