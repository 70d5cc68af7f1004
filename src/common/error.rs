//! Fatal simulation error types.
//!
//! Only conditions that abort the simulator are represented here. Decode
//! failures and writes to register 0 are architectural and never reach this
//! type — see the error handling design notes in `DESIGN.md`.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Which memory an out-of-bounds access hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryKind {
    /// Instruction memory.
    Imem,
    /// Data memory.
    Dmem,
}

impl fmt::Display for MemoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoryKind::Imem => write!(f, "Instruction MEM"),
            MemoryKind::Dmem => write!(f, "Data MEM"),
        }
    }
}

/// A fatal condition that aborts the simulation.
#[derive(Debug)]
pub enum SimError {
    /// A read or write fell outside the bounds of the named memory.
    OutOfBounds {
        memory: MemoryKind,
        address: u32,
    },
    /// An input or output file could not be read or written.
    Io {
        path: PathBuf,
        source: io::Error,
    },
    /// An input file's contents could not be parsed as the expected format.
    MalformedInput {
        path: PathBuf,
        reason: String,
    },
    /// The driver ran past its safety cycle bound without both cores halting.
    CycleBoundExceeded {
        limit: u64,
    },
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::OutOfBounds { memory, address } => {
                write!(f, "{memory} - Out of bound access at address {address:#x}")
            }
            SimError::Io { path, source } => {
                write!(f, "could not access '{}': {}", path.display(), source)
            }
            SimError::MalformedInput { path, reason } => {
                write!(f, "malformed input '{}': {}", path.display(), reason)
            }
            SimError::CycleBoundExceeded { limit } => {
                write!(f, "exceeded safety bound of {limit} cycles without halting")
            }
        }
    }
}

impl std::error::Error for SimError {}
