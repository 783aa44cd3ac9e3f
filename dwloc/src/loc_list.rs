//! Coalescing of ordered entry lists.
//!
//! The emission pipeline produces one [LocEntry] per computed location while walking the
//! generated instructions, so a variable that sits still for a hundred instructions arrives as a
//! run of degenerate entries, and the pieces of a split variable arrive as separate entries for
//! the same start symbol. [merge_entries] is the scan that collapses both before the list is
//! handed to the emitter.

use crate::{ctx::LocCtx, loc_entry::LocEntry};

/// Exhaustively merge adjacent entries of the ordered entry list `entries`.
///
/// For each adjacent pair, [LocEntry::merge_values] is attempted first (simultaneous pieces of
/// one split variable), then [LocEntry::merge_ranges] (adjacent ranges describing identical
/// values). The returned list is merge-closed: no adjacent pair satisfies the preconditions of
/// either merge.
///
/// The order of `entries` is the instruction-walk order that created them; entries are never
/// reordered, only combined with their immediate successor.
pub fn merge_entries(ctx: &LocCtx, entries: Vec<LocEntry>) -> Vec<LocEntry> {
    let in_len = entries.len();
    let mut out: Vec<LocEntry> = Vec::with_capacity(in_len);
    for ent in entries {
        if let Some(last) = out.last_mut() {
            if last.merge_values(ctx, &ent) {
                log::trace!("merged piece values: {}", last.display(ctx));
                continue;
            }
            if last.merge_ranges(&ent) {
                log::trace!("coalesced ranges: {}", last.display(ctx));
                continue;
            }
        }
        out.push(ent);
    }
    log::debug!("merged {in_len} location entries into {}", out.len());
    out
}
