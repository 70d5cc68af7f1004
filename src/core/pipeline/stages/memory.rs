//! Memory access (MEM) stage.

use crate::common::error::SimError;
use crate::core::pipeline::five_stage::FiveStageCore;
use crate::core::pipeline::latches::MemWbLatch;

/// Runs MEM for one cycle: performs the actual DMEM read or write for a
/// load/store sitting in EX/MEM, and builds the MEM/WB latch.
pub fn memory_stage(core: &mut FiveStageCore) -> Result<(), SimError> {
    let entry = core.ex_mem;

    core.mem_wb = if entry.nop {
        MemWbLatch::bubble()
    } else if entry.ctrl.read_mem {
        let loaded = core.dmem.read_word(entry.alu_result)?;
        MemWbLatch {
            nop: false,
            wrt_data: loaded,
            rs1: entry.rs1,
            rs2: entry.rs2,
            wrt_reg_addr: entry.wrt_reg_addr,
            ctrl: entry.ctrl,
        }
    } else {
        if entry.ctrl.write_mem {
            core.dmem.write_word(entry.alu_result, entry.store_data)?;
        }
        MemWbLatch {
            nop: false,
            wrt_data: entry.alu_result,
            rs1: entry.rs1,
            rs2: entry.rs2,
            wrt_reg_addr: entry.wrt_reg_addr,
            ctrl: entry.ctrl,
        }
    };
    Ok(())
}
