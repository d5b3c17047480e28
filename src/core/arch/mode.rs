//! Privilege modes.
//!
//! This model implements only machine mode; `PrivMode` still enumerates
//! `User` and `Supervisor` because `mstatus.mpp` is a two-bit field that
//! can hold any of the three encodings (for instance across an `mret`
//! that was configured with a non-machine `mpp`), even though the core
//! never actually executes anything other than in `Machine`.

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum PrivMode {
    User = 0,
    Supervisor = 1,
    Machine = 3,
}

impl PrivMode {
    pub fn from_u8(val: u8) -> Self {
        match val & 0b11 {
            0 => PrivMode::User,
            1 => PrivMode::Supervisor,
            _ => PrivMode::Machine,
        }
    }

    pub fn to_u8(self) -> u8 {
        self as u8
    }

    pub fn name(&self) -> &'static str {
        match self {
            PrivMode::User => "U",
            PrivMode::Supervisor => "S",
            PrivMode::Machine => "M",
        }
    }

    /// Whether this mode is allowed to execute `mret`/access M-mode CSRs.
    pub fn is_machine(&self) -> bool {
        matches!(self, PrivMode::Machine)
    }
}

impl std::fmt::Display for PrivMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
