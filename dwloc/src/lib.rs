#![allow(clippy::new_without_default)]

//! An in-memory model of debug-location list entries.
//!
//! While walking the instructions it has generated, a debug-info emitter records, for each
//! source-level variable, where that variable's contents can be found over which stretch of the
//! instruction stream: in a register, at a register-relative memory address, or folded away into
//! a known constant. Each such record is a [LocEntry](loc_entry::LocEntry): a half-open range
//! `[begin, end)` between two instruction-stream symbols, plus one or more
//! [LocValue](loc_entry::LocValue)s describing what holds the variable's contents there. The
//! emitter that encodes entries into the persisted debug section is a downstream consumer of this
//! crate, not part of it.
//!
//! A variable whose value has been split across several locations (e.g. a struct spread over
//! multiple registers) is described by one entry per *piece*, each piece identified by its byte
//! offset within the whole variable. Two merge operations keep the entry list small and free of
//! overlaps:
//!
//!  * [merge_values](loc_entry::LocEntry::merge_values) combines entries describing different
//!    pieces of the same variable over ranges that start at the same symbol, so that at most one
//!    entry is active per address for a given variable.
//!  * [merge_ranges](loc_entry::LocEntry::merge_ranges) coalesces adjacent entries describing
//!    identical values, collapsing runs of instructions that don't move a variable into a single
//!    range.
//!
//! Everything an entry refers to is owned by a [LocCtx](ctx::LocCtx) and referred to by index.
//! This gives the comparison semantics the model needs for free: two range-boundary symbols (or
//! two pooled constants) are the same thing iff they are the same allocation, never because their
//! contents happen to coincide.
//!
//! Abbreviations used throughout (in alphabetical order):
//!
//!  * `ctx`: the name conventionally given to the shared [LocCtx](ctx::LocCtx) instance.
//!  * `Idx`: "index".
//!  * `Insn`: "instruction".
//!  * `Sym`: "symbol".
//!  * `Var`: "variable".

use thiserror::Error;

pub mod ctx;
pub mod loc_entry;
pub mod loc_list;
pub mod machine_loc;

pub use ctx::{FloatConstIdx, IntConstIdx, LocCtx, SymIdx, VarDesc, VarIdx};
pub use loc_entry::{LocEntry, LocValue, LocValueKind, LocValueTag};
pub use loc_list::merge_entries;
pub use machine_loc::MachineLoc;

/// A failure to allocate debug-location data.
#[derive(Debug, Error)]
pub enum DebugLocError {
    #[error("Internal error: {0}")]
    /// A pool index limit was exceeded: the code region being described has more symbols,
    /// variables or constants than an index can address.
    LimitExceeded(String),
}
