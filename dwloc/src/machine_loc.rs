//! Machine location descriptions.

use std::fmt;

/// Where in the generated machine state a variable's contents live.
///
/// Register numbering follows the target's DWARF register mapping (e.g. on x86-64, RBP is DWARF
/// register 6). The location model compares these for equality only and interprets no further
/// structure; translating them into the persisted expression encoding is the emitter's job.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MachineLoc {
    /// The value is in a register.
    Register(u16),
    /// The value is in memory, `off` bytes from the address held in register `reg`.
    Indirect { reg: u16, off: i32 },
}

impl fmt::Display for MachineLoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Register(reg) => write!(f, "reg{reg}"),
            Self::Indirect { reg, off } => write!(f, "[reg{reg}{off:+}]"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_is_structural() {
        assert_eq!(MachineLoc::Register(6), MachineLoc::Register(6));
        assert_ne!(MachineLoc::Register(6), MachineLoc::Register(7));
        assert_eq!(
            MachineLoc::Indirect { reg: 6, off: -8 },
            MachineLoc::Indirect { reg: 6, off: -8 }
        );
        // A register and an indirect through the same register are different locations.
        assert_ne!(
            MachineLoc::Register(6),
            MachineLoc::Indirect { reg: 6, off: 0 }
        );
    }

    #[test]
    fn display() {
        assert_eq!(format!("{}", MachineLoc::Register(5)), "reg5");
        assert_eq!(
            format!("{}", MachineLoc::Indirect { reg: 6, off: -16 }),
            "[reg6-16]"
        );
        assert_eq!(
            format!("{}", MachineLoc::Indirect { reg: 7, off: 8 }),
            "[reg7+8]"
        );
    }
}
