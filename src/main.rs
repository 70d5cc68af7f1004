//! RISC-V dual-core cycle-accurate simulator CLI.
//!
//! Loads `imem.txt`/`dmem.txt` from an I/O directory, runs both cores to
//! completion, writes the per-cycle trace files and final memory dumps, and
//! prints a cycle-count comparison.

use std::path::PathBuf;
use std::process;

use clap::Parser;

use rv32i_sim::sim::driver;

/// Command-line arguments for the simulator.
#[derive(Parser, Debug)]
#[command(author, version, about = "RISC-V single-cycle / five-stage pipeline simulator")]
struct Args {
    /// Directory holding `imem.txt`/`dmem.txt` and where trace files are written.
    #[arg(long, default_value = ".")]
    iodir: PathBuf,
}

fn main() {
    let args = Args::parse();

    println!("[*] I/O directory: {}", args.iodir.display());

    match driver::run(&args.iodir) {
        Ok(stats) => {
            stats.print();
        }
        Err(e) => {
            eprintln!("\n[!] FATAL TRAP: {e}");
            process::exit(1);
        }
    }
}
