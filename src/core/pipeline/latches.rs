//! Pipeline register contents.
//!
//! There are four true inter-stage latches (IF/ID, ID/EX, EX/MEM, MEM/WB);
//! `IfState` is not one of them, it is the IF stage's own PC/nop state, fed
//! back into itself each cycle. The five names used throughout the trace and
//! the stage functions (IF, ID, EX, MEM, WB) each refer to the latch or state
//! that feeds that stage.

use crate::core::control::ControlSignals;
use crate::isa::Instruction;

/// The IF stage's own state: the next fetch address and whether fetching has
/// stopped for good (the halt sentinel was seen).
#[derive(Debug, Clone, Copy)]
pub struct IfState {
    pub pc: u32,
    pub nop: bool,
}

impl IfState {
    pub fn reset() -> Self {
        Self { pc: 0, nop: false }
    }
}

/// IF/ID: the fetched word, not yet decoded.
///
/// `pc` is the address the word was fetched from. It is not part of the
/// dumped trace (the reference field vocabulary for this latch is only
/// `nop`/`Instr`) but branch and jump targets computed in the ID stage need
/// it, so it rides along internally.
#[derive(Debug, Clone, Copy)]
pub struct IfIdLatch {
    pub nop: bool,
    pub instr_word: u32,
    pub pc: u32,
}

impl IfIdLatch {
    pub fn bubble() -> Self {
        Self {
            nop: true,
            instr_word: 0,
            pc: 0,
        }
    }
}

/// ID/EX: the decoded instruction, its raw (pre-forwarding) operand reads,
/// and the control signals EX/MEM/WB act on.
#[derive(Debug, Clone, Copy)]
pub struct IdExLatch {
    pub nop: bool,
    pub instr: Instruction,
    pub read_data1: u32,
    pub read_data2: u32,
    pub imm: i32,
    pub rs1: u8,
    pub rs2: u8,
    pub wrt_reg_addr: u8,
    pub ctrl: ControlSignals,
}

impl IdExLatch {
    pub fn bubble() -> Self {
        Self {
            nop: true,
            instr: Instruction::Invalid,
            read_data1: 0,
            read_data2: 0,
            imm: 0,
            rs1: 0,
            rs2: 0,
            wrt_reg_addr: 0,
            ctrl: ControlSignals::default(),
        }
    }

    /// Whether EX should use the immediate (rather than the, possibly
    /// forwarded, rs2 value) as its second ALU operand. True for everything
    /// except R-type, the only form with two register operands.
    pub fn is_i_type(&self) -> bool {
        !matches!(self.instr, Instruction::R { .. })
    }
}

/// EX/MEM: the ALU result (or effective address), the value to store, and
/// the destination register for a later writeback.
#[derive(Debug, Clone, Copy)]
pub struct ExMemLatch {
    pub nop: bool,
    pub alu_result: u32,
    pub store_data: u32,
    pub rs1: u8,
    pub rs2: u8,
    pub wrt_reg_addr: u8,
    pub ctrl: ControlSignals,
}

impl ExMemLatch {
    pub fn bubble() -> Self {
        Self {
            nop: true,
            alu_result: 0,
            store_data: 0,
            rs1: 0,
            rs2: 0,
            wrt_reg_addr: 0,
            ctrl: ControlSignals::default(),
        }
    }
}

/// MEM/WB: the value to commit to the register file.
#[derive(Debug, Clone, Copy)]
pub struct MemWbLatch {
    pub nop: bool,
    pub wrt_data: u32,
    pub rs1: u8,
    pub rs2: u8,
    pub wrt_reg_addr: u8,
    pub ctrl: ControlSignals,
}

impl MemWbLatch {
    pub fn bubble() -> Self {
        Self {
            nop: true,
            wrt_data: 0,
            rs1: 0,
            rs2: 0,
            wrt_reg_addr: 0,
            ctrl: ControlSignals::default(),
        }
    }
}
