//! Decode (ID) stage.
//!
//! Resolves the load-use stall, evaluates branches and JAL (both resolved
//! entirely here, never reaching EX), and otherwise builds the ID/EX latch
//! for everything that does flow forward (R/I-arith/load/store).

use crate::core::control::control_signals;
use crate::core::pipeline::five_stage::FiveStageCore;
use crate::core::pipeline::hazards::{forward_pair, need_stall_load_use};
use crate::core::pipeline::latches::IdExLatch;
use crate::isa::{decode, BranchOp, Instruction};

/// Register source fields for a forward-flowing instruction. Branch, JAL,
/// halt and invalid forms are handled directly in [`id_stage`] and never
/// reach here.
fn source_regs(instr: &Instruction) -> (u8, u8) {
    match *instr {
        Instruction::R { rs1, rs2, .. } => (rs1, rs2),
        Instruction::IArith { rs1, .. } => (rs1, 0),
        Instruction::ILoad { rs1, .. } => (rs1, 0),
        Instruction::S { rs1, rs2, .. } => (rs1, rs2),
        _ => (0, 0),
    }
}

/// The EX latch's `write_register_addr` field: the destination register for
/// everything that writes back, and rs2 for a store (the value MEM writes to
/// DMEM), matching the reference latch construction even though a store
/// never sets `write_back_enable`.
fn dest_reg(instr: &Instruction) -> u8 {
    match *instr {
        Instruction::R { rd, .. } => rd,
        Instruction::IArith { rd, .. } => rd,
        Instruction::ILoad { rd, .. } => rd,
        Instruction::S { rs2, .. } => rs2,
        _ => 0,
    }
}

fn immediate(instr: &Instruction) -> i32 {
    match *instr {
        Instruction::IArith { imm, .. } => imm,
        Instruction::ILoad { imm, .. } => imm,
        Instruction::S { imm, .. } => imm,
        _ => 0,
    }
}

/// Outcome of one ID cycle, reported back so `step()` can drive IF and tally
/// statistics.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeOutcome {
    /// A load-use hazard froze IF and the IF/ID latch this cycle.
    pub stall: bool,
    /// A taken branch or JAL redirected the PC this cycle, squashing
    /// whatever IF would otherwise have fetched.
    pub squashed: bool,
}

/// Runs ID for one cycle.
pub fn decode_stage(core: &mut FiveStageCore) -> DecodeOutcome {
    if need_stall_load_use(
        core.id_ex.ctrl.read_mem,
        core.id_ex.wrt_reg_addr,
        core.if_id.instr_word,
    ) {
        core.id_ex = IdExLatch::bubble();
        return DecodeOutcome {
            stall: true,
            squashed: false,
        };
    }

    if core.if_id.nop {
        core.id_ex = IdExLatch::bubble();
        return DecodeOutcome::default();
    }

    let instr = decode(core.if_id.instr_word);
    let mut squashed = false;

    match instr {
        Instruction::Halt | Instruction::Invalid => {
            core.id_ex = IdExLatch::bubble();
        }
        Instruction::Branch { op, rs1, rs2, imm } => {
            let raw1 = core.rf.read(rs1 as usize);
            let raw2 = core.rf.read(rs2 as usize);
            // EX and MEM have already run this cycle (see FiveStageCore::step),
            // so the live ex_mem/mem_wb latches already hold this cycle's
            // freshest results -- exactly what a branch sitting in ID needs.
            let (a, b) = forward_pair(rs1, rs2, raw1, raw2, &core.ex_mem, &core.mem_wb);
            let taken = match op {
                BranchOp::Eq => a == b,
                BranchOp::Ne => a != b,
            };
            if taken {
                core.if_state.pc = core.if_id.pc.wrapping_add(imm as u32);
                squashed = true;
            }
            core.id_ex = IdExLatch::bubble();
        }
        Instruction::Jal { rd, imm } => {
            let link = core.if_id.pc.wrapping_add(4);
            core.rf.write(rd as usize, link);
            core.if_state.pc = core.if_id.pc.wrapping_add(imm as u32);
            core.id_ex = IdExLatch::bubble();
            squashed = true;
        }
        _ => {
            let (rs1, rs2) = source_regs(&instr);
            let read_data1 = core.rf.read(rs1 as usize);
            let read_data2 = core.rf.read(rs2 as usize);
            let imm = immediate(&instr);
            let wrt_reg_addr = dest_reg(&instr);
            let ctrl = control_signals(&instr);
            core.id_ex = IdExLatch {
                nop: false,
                instr,
                read_data1,
                read_data2,
                imm,
                rs1,
                rs2,
                wrt_reg_addr,
                ctrl,
            };
        }
    }

    DecodeOutcome {
        stall: false,
        squashed,
    }
}
