//! Demo CLI for the RV32 step model.
//!
//! Loads a flat binary into a [`FlatMemory`] image, steps the model until
//! it hits an implementation limit or a step budget runs out, and prints
//! either instruction-mix statistics or (with `--json-trace`) one JSON
//! line per committed step.

use std::{fs, process};

use clap::Parser;

use rv32step::config::Config;
use rv32step::core::state::Model;
use rv32step::core::step;
use rv32step::sim::flat_memory::FlatMemory;
use rv32step::stats::SimStats;

/// Command-line arguments for the demo binary.
#[derive(Parser, Debug)]
#[command(author, version, about = "RV32 step-model demo harness")]
struct Args {
    /// Flat binary to load and execute.
    file: String,

    /// TOML configuration file. Falls back to the model's own defaults
    /// (all extensions enabled, reset vector 0x8000_0000) if omitted.
    #[arg(short, long)]
    config: Option<String>,

    /// Address the binary is loaded at and the model resets to.
    #[arg(long, default_value = "0x80000000")]
    base: String,

    /// Stop after this many steps even if the model hasn't trapped.
    #[arg(long, default_value_t = 1_000_000)]
    max_steps: u64,

    /// Emit one JSON trace line per committed step instead of a summary.
    #[arg(long)]
    json_trace: bool,
}

fn parse_hex_arg(s: &str) -> u32 {
    u32::from_str_radix(s.trim_start_matches("0x"), 16)
        .unwrap_or_else(|_| panic!("not a hex address: {s}"))
}

/// Entry point.
///
/// 1. Parse arguments and the optional TOML config.
/// 2. Load the flat binary into [`FlatMemory`] at `--base` and reset the
///    model to that address.
/// 3. Step until `--max-steps` is reached or the model returns an
///    implementation-limit error (an unimplemented CSR access), which
///    this harness treats as fatal: print a diagnostic, dump the
///    instruction-mix stats gathered so far, and exit non-zero.
fn main() {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path).expect("failed to read config file");
            toml::from_str(&text).expect("failed to parse config file")
        }
        None => Config::default(),
    };

    let base = parse_hex_arg(&args.base);
    let bin_data = fs::read(&args.file).expect("failed to read binary");

    println!("Model Configuration");
    println!("-------------------");
    println!("  ISA:              rv32imafc_zicsr");
    println!("  Compressed:       {}", config.extensions.compressed);
    println!("  Float:            {}", config.extensions.float);
    println!("  Load base:        {:#x}", base);
    println!("  Image size:       {} bytes", bin_data.len());
    println!("-------------------");

    // `--json-trace` forces trace output for this run regardless of the
    // config file; `general.trace_instructions` lets a config do the same
    // without a CLI flag, for a harness that always wants it on.
    let emit_trace = args.json_trace || config.general.trace_instructions;

    let mut model = Model::new(config);
    model.reset(base);
    let mut mem = FlatMemory::load_image(base, &bin_data);
    let mut stats = SimStats::default();

    for _ in 0..args.max_steps {
        let status = match step::step(&mut model, &mut mem) {
            Ok(status) => status,
            Err(e) => {
                eprintln!("\n[!] UNIMPLEMENTED: {}", e);
                eprintln!("    pc = {:#x}", model.pc);
                stats.print();
                process::exit(1);
            }
        };
        stats.record(status, model.trace.inst);

        if emit_trace {
            print_trace_json(&model);
        }
    }

    if !emit_trace {
        stats.print();
    }
}

fn print_trace_json(model: &Model) {
    let t = &model.trace;
    let json = serde_json::json!({
        "valid": t.valid,
        "pc": t.pc,
        "inst": t.inst,
        "step_status": format!("{:?}", t.step_status),
        "xreg_mask": t.xreg_mask,
        "freg_mask": t.freg_mask,
        "csr_writes": t.csr_writes(),
    });
    println!("{}", json);
}
