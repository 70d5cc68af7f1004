//! Fetch (IF) stage.

use crate::common::error::SimError;
use crate::core::pipeline::five_stage::FiveStageCore;
use crate::core::pipeline::latches::IfIdLatch;
use crate::isa::{decode, Instruction};

/// Runs IF for one cycle.
///
/// Does nothing when `stall` is set (a load-use hazard freezes the PC and
/// the IF/ID latch for one cycle) or when IF has already latched the halt
/// sentinel (`if_state.nop`). Otherwise fetches the word at the current PC;
/// the sentinel stops fetching for good without advancing the PC further.
pub fn fetch_stage(core: &mut FiveStageCore, stall: bool) -> Result<(), SimError> {
    if stall {
        return Ok(());
    }
    if core.if_state.nop {
        core.if_id = IfIdLatch::bubble();
        return Ok(());
    }

    let fetch_pc = core.if_state.pc;
    let word = core.imem.read(fetch_pc)?;

    if matches!(decode(word), Instruction::Halt) {
        core.if_state.nop = true;
        core.if_id = IfIdLatch::bubble();
        return Ok(());
    }

    core.if_id = IfIdLatch {
        nop: false,
        instr_word: word,
        pc: fetch_pc,
    };
    core.if_state.pc = fetch_pc.wrapping_add(4);
    Ok(())
}
