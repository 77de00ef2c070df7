use std::fmt;

/// Which backing stack a fault refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackKind {
    /// Procedure stack (spilled register contents).
    Procedure,
    /// Procedure chain stack (saved call frames).
    Chain,
}

impl fmt::Display for StackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StackKind::Procedure => f.write_str("procedure stack"),
            StackKind::Chain => f.write_str("chain stack"),
        }
    }
}

/// Hardware trap a fault is handed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trap {
    /// Memory/stack mapping error. Window bounds and stack exhaustion all land here.
    MapErr,
    /// System call entry; the recorded window base shift travels with it.
    Syscall,
    /// Breakpoint / debug trap.
    Debug,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("register index {index} outside window of {limit} slots")]
    WindowBounds { index: usize, limit: usize },

    #[error("{stack} overflow: {requested} bytes requested, {available} available")]
    StackOverflow {
        stack: StackKind,
        requested: usize,
        available: usize,
    },

    #[error("{stack} underflow: {requested} bytes requested, {available} stored")]
    StackUnderflow {
        stack: StackKind,
        requested: usize,
        available: usize,
    },

    #[error("Unsupported feature: {0}")]
    Unsupported(&'static str),

    #[error("Illegal control transfer tag {0:#x}")]
    IllegalTransfer(u8),

    #[error("System call (wbs = {wbs})")]
    Syscall { wbs: u8 },

    #[error("Debug trap")]
    Debug,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// The trap this fault is delivered as, or `None` when the fault is fatal
    /// to the emulation itself.
    #[must_use]
    pub const fn trap(&self) -> Option<Trap> {
        match self {
            Error::WindowBounds { .. }
            | Error::StackOverflow { .. }
            | Error::StackUnderflow { .. } => Some(Trap::MapErr),
            Error::Syscall { .. } => Some(Trap::Syscall),
            Error::Debug => Some(Trap::Debug),
            Error::Unsupported(_) | Error::IllegalTransfer(_) | Error::InvalidConfig(_) => None,
        }
    }

    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        self.trap().is_none()
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_and_stack_faults_share_trap() {
        let faults = [
            Error::WindowBounds { index: 9, limit: 8 },
            Error::StackOverflow {
                stack: StackKind::Chain,
                requested: 32,
                available: 0,
            },
            Error::StackUnderflow {
                stack: StackKind::Procedure,
                requested: 8,
                available: 0,
            },
        ];
        for fault in &faults {
            assert_eq!(fault.trap(), Some(Trap::MapErr), "{fault}");
            assert!(!fault.is_fatal());
        }
    }

    #[test]
    fn test_fatal_kinds() {
        assert!(Error::Unsupported("dbl").is_fatal());
        assert!(Error::IllegalTransfer(7).is_fatal());
        assert_eq!(Error::Syscall { wbs: 3 }.trap(), Some(Trap::Syscall));
        assert_eq!(Error::Debug.trap(), Some(Trap::Debug));
    }

    #[test]
    fn test_display() {
        let err = Error::StackOverflow {
            stack: StackKind::Chain,
            requested: 32,
            available: 16,
        };
        assert_eq!(
            err.to_string(),
            "chain stack overflow: 32 bytes requested, 16 available"
        );
    }
}
