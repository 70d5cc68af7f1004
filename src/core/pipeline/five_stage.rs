//! The five-stage pipelined core.
//!
//! Stages run in reverse pipeline order each cycle -- WB, MEM, EX, ID, IF --
//! so that every stage sees the latch state as it stood at the *start* of
//! the cycle, never a value a later-in-program-order stage has already
//! overwritten this same cycle. This also means a taken branch or JAL,
//! resolved in ID, can simply redirect `if_state.pc` before IF (which runs
//! right after, within the same `step()` call) ever fetches the wrong-path
//! instruction -- no separate squash bookkeeping is needed.

use std::rc::Rc;

use crate::common::error::SimError;
use crate::common::regfile::RegisterFile;
use crate::core::memory::{DataMemory, InstrMemory};
use crate::core::pipeline::latches::{ExMemLatch, IdExLatch, IfIdLatch, IfState, MemWbLatch};
use crate::core::pipeline::stages;

/// Per-cycle trace data for the pipelined core: the post-cycle contents of
/// every latch, in the field vocabulary the reference dump format uses.
#[derive(Debug, Clone, Copy)]
pub struct FiveStageTrace {
    pub if_state: IfState,
    pub if_id: IfIdLatch,
    pub id_ex: IdExLatch,
    pub ex_mem: ExMemLatch,
    pub mem_wb: MemWbLatch,
    /// A load-use hazard froze IF/ID this cycle.
    pub stalled: bool,
    /// A taken branch or JAL squashed the fall-through fetch this cycle.
    pub squashed: bool,
}

/// The five-stage pipelined core.
pub struct FiveStageCore {
    pub(crate) imem: Rc<InstrMemory>,
    pub(crate) dmem: DataMemory,
    pub(crate) rf: RegisterFile,
    pub(crate) if_state: IfState,
    pub(crate) if_id: IfIdLatch,
    pub(crate) id_ex: IdExLatch,
    pub(crate) ex_mem: ExMemLatch,
    pub(crate) mem_wb: MemWbLatch,
    cycle: u64,
    halted: bool,
    load_use_stalls: u64,
    control_flow_squashes: u64,
}

impl FiveStageCore {
    /// Creates a core at PC 0 with every latch holding a bubble.
    pub fn new(imem: Rc<InstrMemory>, dmem: DataMemory) -> Self {
        Self {
            imem,
            dmem,
            rf: RegisterFile::new(),
            if_state: IfState::reset(),
            if_id: IfIdLatch::bubble(),
            id_ex: IdExLatch::bubble(),
            ex_mem: ExMemLatch::bubble(),
            mem_wb: MemWbLatch::bubble(),
            cycle: 0,
            halted: false,
            load_use_stalls: 0,
            control_flow_squashes: 0,
        }
    }

    pub fn halted(&self) -> bool {
        self.halted
    }

    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn registers(&self) -> &RegisterFile {
        &self.rf
    }

    pub fn data_memory(&self) -> &DataMemory {
        &self.dmem
    }

    /// Total load-use stalls incurred so far.
    pub fn load_use_stalls(&self) -> u64 {
        self.load_use_stalls
    }

    /// Total control-flow squashes (taken branches/JALs) so far.
    pub fn control_flow_squashes(&self) -> u64 {
        self.control_flow_squashes
    }

    fn snapshot(&self, stalled: bool, squashed: bool) -> FiveStageTrace {
        FiveStageTrace {
            if_state: self.if_state,
            if_id: self.if_id,
            id_ex: self.id_ex,
            ex_mem: self.ex_mem,
            mem_wb: self.mem_wb,
            stalled,
            squashed,
        }
    }

    /// Executes one cycle.
    ///
    /// A cycle where every latch is already a bubble *on entry* is the
    /// drain-confirmation cycle: its (trivial) stage logic still runs and
    /// is still dumped, and only at the end of it does [`Self::halted`]
    /// become true. This costs one extra cycle beyond the last real
    /// instruction's WB, matching the reference cycle counts.
    pub fn step(&mut self) -> Result<FiveStageTrace, SimError> {
        let fully_drained_on_entry = self.if_state.nop
            && self.if_id.nop
            && self.id_ex.nop
            && self.ex_mem.nop
            && self.mem_wb.nop;

        // EX's forwarding needs these latches as they stood before MEM and
        // WB (which run first, below) overwrite them this cycle.
        let ex_mem_pre = self.ex_mem;
        let mem_wb_pre = self.mem_wb;

        stages::writeback_stage(self);
        stages::memory_stage(self)?;
        stages::execute_stage(self, &ex_mem_pre, &mem_wb_pre);
        let outcome = stages::decode_stage(self);
        stages::fetch_stage(self, outcome.stall)?;

        if outcome.stall {
            self.load_use_stalls += 1;
        }
        if outcome.squashed {
            self.control_flow_squashes += 1;
        }

        self.cycle += 1;
        self.halted = fully_drained_on_entry;
        Ok(self.snapshot(outcome.stall, outcome.squashed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::memory::InstrMemory;

    const HALT: u32 = 0xFFFF_FFFF;

    fn r_type(funct7: u32, rs2: u32, rs1: u32, funct3: u32, rd: u32) -> u32 {
        (funct7 << 25) | (rs2 << 20) | (rs1 << 15) | (funct3 << 12) | (rd << 7) | 0b011_0011
    }

    fn i_arith(imm: i32, rs1: u32, rd: u32) -> u32 {
        (((imm as u32) & 0xFFF) << 20) | (rs1 << 15) | (rd << 7) | 0b001_0011
    }

    fn lw(imm: i32, rs1: u32, rd: u32) -> u32 {
        (((imm as u32) & 0xFFF) << 20) | (rs1 << 15) | (0x2 << 12) | (rd << 7) | 0b000_0011
    }

    fn sw(imm: u32, rs2: u32, rs1: u32) -> u32 {
        let hi = (imm >> 5) & 0x7F;
        let lo = imm & 0x1F;
        (hi << 25) | (rs2 << 20) | (rs1 << 15) | (0x2 << 12) | (lo << 7) | 0b010_0011
    }

    fn beq(imm: u32, rs2: u32, rs1: u32) -> u32 {
        let bit12 = (imm >> 12) & 1;
        let bit11 = (imm >> 11) & 1;
        let bits10_5 = (imm >> 5) & 0x3F;
        let bits4_1 = (imm >> 1) & 0xF;
        (bit12 << 31)
            | (bits10_5 << 25)
            | (rs2 << 20)
            | (rs1 << 15)
            | (bits4_1 << 8)
            | (bit11 << 7)
            | 0b110_0011
    }

    fn jal(imm: u32, rd: u32) -> u32 {
        let bit20 = (imm >> 20) & 1;
        let bits19_12 = (imm >> 12) & 0xFF;
        let bit11 = (imm >> 11) & 1;
        let bits10_1 = (imm >> 1) & 0x3FF;
        (bit20 << 31) | (bits10_1 << 21) | (bit11 << 20) | (bits19_12 << 12) | (rd << 7) | 0b110_1111
    }

    fn core_with(words: &[u32], dmem: Vec<u8>) -> FiveStageCore {
        let mut bytes = Vec::new();
        for w in words {
            bytes.extend_from_slice(&w.to_be_bytes());
        }
        let imem = Rc::new(InstrMemory::new(bytes));
        FiveStageCore::new(imem, DataMemory::new(dmem))
    }

    fn run_to_halt(core: &mut FiveStageCore) {
        while !core.halted() {
            core.step().unwrap();
        }
    }

    /// Scenario 1: ADDI x1,x0,5; ADDI x2,x1,7; HALT -> 7 total cycles.
    #[test]
    fn scenario_1_cycle_count_and_result() {
        let mut core = core_with(&[i_arith(5, 0, 1), i_arith(7, 1, 2), HALT], vec![]);
        run_to_halt(&mut core);
        assert_eq!(core.registers().read(1), 5);
        assert_eq!(core.registers().read(2), 12);
        assert_eq!(core.cycle(), 7, "per SPEC_FULL.md section 4.6's termination derivation");
    }

    /// Scenario 2: LW x1,0(x0); ADD x2,x1,x1; SW x2,4(x0); HALT with DMEM[0..3]=3.
    #[test]
    fn scenario_2_load_use_stall_and_store() {
        let mut dmem = vec![0u8; 8];
        dmem[3] = 3;
        let mut core = core_with(
            &[lw(0, 0, 1), r_type(0x00, 1, 1, 0x0, 2), sw(4, 2, 0), HALT],
            dmem,
        );
        run_to_halt(&mut core);
        assert_eq!(core.registers().read(1), 3);
        assert_eq!(core.registers().read(2), 6);
        assert_eq!(core.data_memory().read_word(4).unwrap(), 6);
    }

    /// Scenario 3: branch not taken.
    #[test]
    fn scenario_3_branch_not_taken() {
        let mut core = core_with(
            &[
                i_arith(1, 0, 1),
                beq(8, 0, 1),
                i_arith(99, 0, 2),
                i_arith(7, 0, 3),
                HALT,
            ],
            vec![],
        );
        run_to_halt(&mut core);
        assert_eq!(core.registers().read(2), 99);
        assert_eq!(core.registers().read(3), 7);
    }

    /// Scenario 4: branch taken squashes the instruction at the fall-through slot.
    #[test]
    fn scenario_4_branch_taken_squashes_fallthrough() {
        let mut core = core_with(
            &[
                i_arith(0, 0, 1),
                beq(8, 0, 1),
                i_arith(99, 0, 2),
                i_arith(7, 0, 3),
                HALT,
            ],
            vec![],
        );
        run_to_halt(&mut core);
        assert_eq!(core.registers().read(2), 0, "squashed by the taken branch");
        assert_eq!(core.registers().read(3), 7);
    }

    /// Scenario 5: JAL over one instruction.
    #[test]
    fn scenario_5_jal_skips_one_instruction() {
        let mut core = core_with(
            &[jal(8, 1), i_arith(99, 0, 2), i_arith(7, 0, 3), HALT],
            vec![],
        );
        run_to_halt(&mut core);
        assert_eq!(core.registers().read(1), 4);
        assert_eq!(core.registers().read(2), 0, "skipped by the jump");
        assert_eq!(core.registers().read(3), 7);
    }

    /// Scenario 6: SUB producing a two's-complement negative, with forwarding
    /// supplying the producer's value before it reaches the register file.
    #[test]
    fn scenario_6_sub_with_forwarding() {
        let mut core = core_with(&[i_arith(3, 0, 2), r_type(0x20, 2, 0, 0x0, 1), HALT], vec![]);
        run_to_halt(&mut core);
        assert_eq!(core.registers().read(1), 0xFFFF_FFFD);
        assert_eq!(core.registers().read(1) as i32, -3);
    }

    #[test]
    fn single_cycle_and_pipelined_cores_agree_on_final_state() {
        let words = [
            i_arith(5, 0, 1),
            lw(0, 0, 2),
            r_type(0x00, 2, 1, 0x0, 3),
            sw(4, 3, 0),
            HALT,
        ];
        let mut dmem_bytes = vec![0u8; 8];
        dmem_bytes[3] = 10;

        let mut pipelined = core_with(&words, dmem_bytes.clone());
        run_to_halt(&mut pipelined);

        let mut imem_bytes = Vec::new();
        for w in &words {
            imem_bytes.extend_from_slice(&w.to_be_bytes());
        }
        let imem = Rc::new(InstrMemory::new(imem_bytes));
        let mut single = crate::core::single_stage::SingleStageCore::new(imem, DataMemory::new(dmem_bytes));
        while !single.halted() {
            single.step().unwrap();
        }

        assert_eq!(pipelined.registers().snapshot(), single.registers().snapshot());
        assert_eq!(pipelined.data_memory().bytes(), single.data_memory().bytes());
    }
}
