//! Per-cycle trace writers.
//!
//! One append-mode writer per output file, opened once at driver
//! construction and written to every cycle; the DMEM dumps are written once,
//! at the end, straight from each core's final memory contents.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::common::error::SimError;
use crate::common::regfile::RegisterFile;
use crate::core::memory::DataMemory;
use crate::core::pipeline::FiveStageTrace;
use crate::core::single_stage::SingleStageTrace;

fn create(path: &Path) -> Result<BufWriter<File>, SimError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|source| SimError::Io {
            path: path.to_path_buf(),
            source,
        })
}

fn io_err(path: &Path, source: std::io::Error) -> SimError {
    SimError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn write_register_file(w: &mut BufWriter<File>, path: &Path, cycle: u64, rf: &RegisterFile) -> Result<(), SimError> {
    writeln!(w, "State of RF after executing cycle:\t{cycle}").map_err(|e| io_err(path, e))?;
    for value in rf.snapshot() {
        writeln!(w, "{value:032b}").map_err(|e| io_err(path, e))?;
    }
    Ok(())
}

fn write_dmem(path: &Path, dmem: &DataMemory) -> Result<(), SimError> {
    let mut w = create(path)?;
    for byte in dmem.bytes().iter() {
        writeln!(w, "{byte:08b}").map_err(|e| io_err(path, e))?;
    }
    Ok(())
}

fn separator(w: &mut BufWriter<File>, path: &Path, cycle: u64) -> Result<(), SimError> {
    writeln!(w, "{}", "-".repeat(70)).map_err(|e| io_err(path, e))?;
    writeln!(w, "State after executing cycle: {cycle}").map_err(|e| io_err(path, e))?;
    Ok(())
}

fn kv(w: &mut BufWriter<File>, path: &Path, key: &str, value: impl std::fmt::Display) -> Result<(), SimError> {
    writeln!(w, "{key}: {value}").map_err(|e| io_err(path, e))
}

/// Writes the single-cycle core's outputs: `SS_RFResult.txt` and
/// `StateResult_SS.txt` (which only ever carries `IF.PC`/`IF.nop` — the
/// single-cycle core has no separate latch model to report) plus, once at
/// the end, `SS_DMEMResult.txt`.
pub struct SingleStageTraceWriter {
    rf_path: std::path::PathBuf,
    state_path: std::path::PathBuf,
    rf_file: BufWriter<File>,
    state_file: BufWriter<File>,
}

impl SingleStageTraceWriter {
    pub fn create(iodir: &Path) -> Result<Self, SimError> {
        let rf_path = iodir.join("SS_RFResult.txt");
        let state_path = iodir.join("StateResult_SS.txt");
        Ok(Self {
            rf_file: create(&rf_path)?,
            state_file: create(&state_path)?,
            rf_path,
            state_path,
        })
    }

    pub fn record(&mut self, cycle: u64, rf: &RegisterFile, trace: &SingleStageTrace) -> Result<(), SimError> {
        write_register_file(&mut self.rf_file, &self.rf_path, cycle, rf)?;
        separator(&mut self.state_file, &self.state_path, cycle)?;
        kv(&mut self.state_file, &self.state_path, "IF.PC", trace.pc)?;
        kv(&mut self.state_file, &self.state_path, "IF.nop", trace.nop)?;
        Ok(())
    }

    pub fn finish(&mut self, dmem: &DataMemory, iodir: &Path) -> Result<(), SimError> {
        self.rf_file.flush().map_err(|e| io_err(&self.rf_path, e))?;
        self.state_file.flush().map_err(|e| io_err(&self.state_path, e))?;
        write_dmem(&iodir.join("SS_DMEMResult.txt"), dmem)
    }
}

/// Writes the pipelined core's outputs: `FS_RFResult.txt` and
/// `StateResult_FS.txt` (every field of all five latches) plus, once at the
/// end, `FS_DMEMResult.txt`.
pub struct FiveStageTraceWriter {
    rf_path: std::path::PathBuf,
    state_path: std::path::PathBuf,
    rf_file: BufWriter<File>,
    state_file: BufWriter<File>,
}

impl FiveStageTraceWriter {
    pub fn create(iodir: &Path) -> Result<Self, SimError> {
        let rf_path = iodir.join("FS_RFResult.txt");
        let state_path = iodir.join("StateResult_FS.txt");
        Ok(Self {
            rf_file: create(&rf_path)?,
            state_file: create(&state_path)?,
            rf_path,
            state_path,
        })
    }

    pub fn record(&mut self, cycle: u64, rf: &RegisterFile, trace: &FiveStageTrace) -> Result<(), SimError> {
        write_register_file(&mut self.rf_file, &self.rf_path, cycle, rf)?;

        let p = &self.state_path;
        let w = &mut self.state_file;
        separator(w, p, cycle)?;

        kv(w, p, "IF.PC", trace.if_state.pc)?;
        kv(w, p, "IF.nop", trace.if_state.nop)?;

        kv(w, p, "ID.Instr", trace.if_id.instr_word)?;
        kv(w, p, "ID.nop", trace.if_id.nop)?;

        kv(w, p, "EX.Read_data1", trace.id_ex.read_data1)?;
        kv(w, p, "EX.Read_data2", trace.id_ex.read_data2)?;
        kv(w, p, "EX.Imm", trace.id_ex.imm)?;
        kv(w, p, "EX.Rs", trace.id_ex.rs1)?;
        kv(w, p, "EX.Rt", trace.id_ex.rs2)?;
        kv(w, p, "EX.Wrt_reg_addr", trace.id_ex.wrt_reg_addr)?;
        kv(w, p, "EX.is_I_type", trace.id_ex.is_i_type())?;
        kv(w, p, "EX.rd_mem", trace.id_ex.ctrl.read_mem)?;
        kv(w, p, "EX.wrt_mem", trace.id_ex.ctrl.write_mem)?;
        kv(w, p, "EX.wrt_enable", trace.id_ex.ctrl.write_back_enable)?;
        kv(w, p, "EX.nop", trace.id_ex.nop)?;

        kv(w, p, "MEM.ALUresult", trace.ex_mem.alu_result)?;
        kv(w, p, "MEM.Store_data", trace.ex_mem.store_data)?;
        kv(w, p, "MEM.Rs", trace.ex_mem.rs1)?;
        kv(w, p, "MEM.Rt", trace.ex_mem.rs2)?;
        kv(w, p, "MEM.Wrt_reg_addr", trace.ex_mem.wrt_reg_addr)?;
        kv(w, p, "MEM.rd_mem", trace.ex_mem.ctrl.read_mem)?;
        kv(w, p, "MEM.wrt_mem", trace.ex_mem.ctrl.write_mem)?;
        kv(w, p, "MEM.wrt_enable", trace.ex_mem.ctrl.write_back_enable)?;
        kv(w, p, "MEM.nop", trace.ex_mem.nop)?;

        kv(w, p, "WB.Wrt_data", trace.mem_wb.wrt_data)?;
        kv(w, p, "WB.Rs", trace.mem_wb.rs1)?;
        kv(w, p, "WB.Rt", trace.mem_wb.rs2)?;
        kv(w, p, "WB.Wrt_reg_addr", trace.mem_wb.wrt_reg_addr)?;
        kv(w, p, "WB.wrt_enable", trace.mem_wb.ctrl.write_back_enable)?;
        kv(w, p, "WB.nop", trace.mem_wb.nop)?;
        Ok(())
    }

    pub fn finish(&mut self, dmem: &DataMemory, iodir: &Path) -> Result<(), SimError> {
        self.rf_file.flush().map_err(|e| io_err(&self.rf_path, e))?;
        self.state_file.flush().map_err(|e| io_err(&self.state_path, e))?;
        write_dmem(&iodir.join("FS_DMEMResult.txt"), dmem)
    }
}
