//! Execute (EX) stage.

use crate::core::alu::Alu;
use crate::core::pipeline::five_stage::FiveStageCore;
use crate::core::pipeline::hazards::forward_pair;
use crate::core::pipeline::latches::ExMemLatch;
use crate::isa::{AluOp, Instruction};

/// Runs EX for one cycle.
///
/// Forwards operands from `ex_mem_pre`/`mem_wb_pre`, the EX/MEM and MEM/WB
/// latches as they stood at the start of *this* cycle (captured by the
/// caller before MEM and WB overwrote them this same cycle).
pub fn execute_stage(core: &mut FiveStageCore, ex_mem_pre: &ExMemLatch, mem_wb_pre: &crate::core::pipeline::latches::MemWbLatch) {
    let entry = core.id_ex;

    core.ex_mem = if entry.nop {
        ExMemLatch::bubble()
    } else {
        let (a, raw_b) = forward_pair(entry.rs1, entry.rs2, entry.read_data1, entry.read_data2, ex_mem_pre, mem_wb_pre);

        let alu_op = match entry.instr {
            Instruction::R { op, .. } | Instruction::IArith { op, .. } => op,
            _ => AluOp::Add, // load/store effective address: rs1 + imm
        };
        let operand_b = if entry.is_i_type() { entry.imm as u32 } else { raw_b };
        let alu_result = Alu::execute(alu_op, a, operand_b);

        ExMemLatch {
            nop: false,
            alu_result,
            store_data: raw_b,
            rs1: entry.rs1,
            rs2: entry.rs2,
            wrt_reg_addr: entry.wrt_reg_addr,
            ctrl: entry.ctrl,
        }
    };
}
