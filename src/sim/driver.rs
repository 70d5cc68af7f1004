//! Drives both cores to completion against a shared instruction memory.

use std::path::Path;
use std::rc::Rc;

use crate::common::error::SimError;
use crate::core::memory::{DataMemory, InstrMemory};
use crate::core::{FiveStageCore, SingleStageCore};
use crate::sim::loader;
use crate::sim::trace::{FiveStageTraceWriter, SingleStageTraceWriter};
use crate::stats::Stats;

/// Upper bound on cycles run per core, guarding against a genuine infinite
/// loop in a malformed program (e.g. `BEQ x0, x0, 0`).
pub const CYCLE_BOUND: u64 = 1_000_000;

/// Runs both cores to completion, writing every trace file and returning
/// the collected statistics for both.
pub fn run(iodir: &Path) -> Result<Stats, SimError> {
    let imem_bytes = loader::load_imem(iodir)?;
    let dmem_bytes = loader::load_dmem(iodir)?;
    let imem = Rc::new(InstrMemory::new(imem_bytes));

    let mut single = SingleStageCore::new(Rc::clone(&imem), DataMemory::new(dmem_bytes.clone()));
    let mut pipelined = FiveStageCore::new(imem, DataMemory::new(dmem_bytes));

    let mut ss_writer = SingleStageTraceWriter::create(iodir)?;
    let mut fs_writer = FiveStageTraceWriter::create(iodir)?;

    let mut stats = Stats::default();

    while !single.halted() {
        let trace = single.step()?;
        // step() already incremented the cycle counter; dump under the
        // 0-based index of the cycle that just ran, matching the reference
        // ("print states after executing cycle 0, cycle 1, ...").
        ss_writer.record(single.cycle() - 1, single.registers(), &trace)?;
        if !trace.nop {
            stats.single_stage_instructions += 1;
        }
        if single.cycle() > CYCLE_BOUND {
            return Err(SimError::CycleBoundExceeded { limit: CYCLE_BOUND });
        }
    }
    stats.single_stage_cycles = single.cycle();

    while !pipelined.halted() {
        let trace = pipelined.step()?;
        fs_writer.record(pipelined.cycle() - 1, pipelined.registers(), &trace)?;
        if !trace.mem_wb.nop {
            stats.pipelined_instructions += 1;
        }
        if pipelined.cycle() > CYCLE_BOUND {
            return Err(SimError::CycleBoundExceeded { limit: CYCLE_BOUND });
        }
    }
    stats.pipelined_cycles = pipelined.cycle();
    stats.load_use_stalls = pipelined.load_use_stalls();
    stats.control_flow_squashes = pipelined.control_flow_squashes();

    ss_writer.finish(single.data_memory(), iodir)?;
    fs_writer.finish(pipelined.data_memory(), iodir)?;

    Ok(stats)
}
