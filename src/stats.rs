//! Simulation statistics collection and reporting.
//!
//! Tracks the handful of counters the two cores can actually produce:
//! cycle counts, retired-instruction counts, and the pipelined core's
//! load-use stalls and control-flow squashes. Cache, branch-predictor, and
//! privilege-mode breakdowns from the reference stats banner have no
//! counterpart here -- this simulator has no cache, no predictor, and no
//! privilege modes.

use std::time::Instant;

/// Collected statistics for one run of both cores.
pub struct Stats {
    start_time: Instant,
    pub single_stage_cycles: u64,
    pub single_stage_instructions: u64,
    pub pipelined_cycles: u64,
    pub pipelined_instructions: u64,
    pub load_use_stalls: u64,
    pub control_flow_squashes: u64,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
            single_stage_cycles: 0,
            single_stage_instructions: 0,
            pipelined_cycles: 0,
            pipelined_instructions: 0,
            load_use_stalls: 0,
            control_flow_squashes: 0,
        }
    }
}

impl Stats {
    /// Prints a summary comparing both cores' cycle counts and CPI.
    pub fn print(&self) {
        let seconds = self.start_time.elapsed().as_secs_f64();

        let ss_cyc = self.single_stage_cycles.max(1);
        let ss_instr = self.single_stage_instructions.max(1);
        let fs_cyc = self.pipelined_cycles.max(1);
        let fs_instr = self.pipelined_instructions.max(1);

        println!("\n==========================================================");
        println!("RISC-V CORE SIMULATION STATISTICS");
        println!("==========================================================");
        println!("host_seconds             {seconds:.4} s");
        println!("----------------------------------------------------------");
        println!("SINGLE-CYCLE CORE");
        println!("  cycles                 {}", self.single_stage_cycles);
        println!("  instructions           {}", self.single_stage_instructions);
        println!("  cpi                    {:.4}", ss_cyc as f64 / ss_instr as f64);
        println!("----------------------------------------------------------");
        println!("FIVE-STAGE PIPELINED CORE");
        println!("  cycles                 {}", self.pipelined_cycles);
        println!("  instructions           {}", self.pipelined_instructions);
        println!("  cpi                    {:.4}", fs_cyc as f64 / fs_instr as f64);
        println!("  load_use_stalls        {}", self.load_use_stalls);
        println!("  control_flow_squashes  {}", self.control_flow_squashes);
        println!("==========================================================");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_stats_are_all_zero_except_clock() {
        let stats = Stats::default();
        assert_eq!(stats.single_stage_cycles, 0);
        assert_eq!(stats.pipelined_cycles, 0);
        assert_eq!(stats.load_use_stalls, 0);
        assert_eq!(stats.control_flow_squashes, 0);
    }
}
