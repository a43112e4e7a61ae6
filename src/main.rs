//! eZ80 Emulator - CLI Entry Point
//!
//! Commands:
//! - `ez80-emu run <image>` - Load a raw binary image and execute it
//! - `ez80-emu test` - Run the built-in self-test

use clap::{Parser, Subcommand};
use ez80::{execute_one, CpuState, RunConfig, RunSummary, StopReason};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ez80-emu")]
#[command(author = "Yigit")]
#[command(version = "0.1.0")]
#[command(about = "A cycle-counted eZ80 instruction-set emulator")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a raw binary image until the step limit or a fault
    Run {
        /// Path to the binary image
        image: String,
        /// JSON config file; flags below override its values
        #[arg(short, long)]
        config: Option<String>,
        /// Maximum number of instructions to execute (default: 10000)
        #[arg(short, long)]
        max_steps: Option<u64>,
        /// Address to load the image at (decimal or 0x-prefixed hex)
        #[arg(short, long, value_parser = parse_number::<u32>)]
        load_address: Option<u32>,
        /// Initial 16-bit program counter
        #[arg(long, value_parser = parse_number::<u16>)]
        pc: Option<u16>,
        /// Initial MBASE segment
        #[arg(long, value_parser = parse_number::<u8>)]
        mbase: Option<u8>,
        /// Memory image size in bytes (default: 65536)
        #[arg(long, value_parser = parse_number::<usize>)]
        memory_size: Option<usize>,
        /// Log every executed instruction (overrides RUST_LOG for this crate)
        #[arg(short, long)]
        trace: bool,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run the built-in self-test
    Test,
}

fn main() {
    let cli = Cli::parse();

    let trace = matches!(cli.command, Some(Commands::Run { trace: true, .. }));
    init_logging(trace);

    match cli.command {
        Some(Commands::Run {
            image,
            config,
            max_steps,
            load_address,
            pc,
            mbase,
            memory_size,
            trace: _,
            json,
        }) => {
            let mut run_config = match config {
                Some(path) => match RunConfig::load(&path) {
                    Ok(c) => c,
                    Err(e) => {
                        eprintln!("❌ Failed to load config {}: {}", path, e);
                        std::process::exit(1);
                    }
                },
                None => RunConfig::default(),
            };
            if let Some(v) = max_steps {
                run_config.max_steps = v;
            }
            if let Some(v) = load_address {
                run_config.load_address = v;
            }
            if let Some(v) = pc {
                run_config.pc = v;
            }
            if let Some(v) = mbase {
                run_config.mbase = v;
            }
            if let Some(v) = memory_size {
                run_config.memory_size = v;
            }
            run_image(&image, &run_config, json);
        }
        Some(Commands::Test) => {
            run_self_test();
        }
        None => {
            println!("eZ80 Emulator v0.1.0");
            println!("A cycle-counted eZ80 instruction-set emulator");
            println!();
            println!("Use --help for available commands");
            println!();
            demo_accumulator();
        }
    }
}

fn init_logging(trace: bool) {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(env.as_deref(), trace))
        .with_writer(std::io::stderr)
        .init();
}

/// `RUST_LOG` directives (default `ez80=warn`), with `--trace` raising the
/// crate to `trace` on top of whatever they say.
fn log_filter(env: Option<&str>, trace: bool) -> EnvFilter {
    let mut filter = env
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("ez80=warn"));
    if trace {
        if let Ok(directive) = "ez80=trace".parse() {
            filter = filter.add_directive(directive);
        }
    }
    filter
}

/// Parse a decimal or `0x`-prefixed hexadecimal number.
fn parse_number<T>(s: &str) -> Result<T, String>
where
    T: TryFrom<u64>,
{
    let value = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse::<u64>(),
    }
    .map_err(|e| format!("invalid number '{}': {}", s, e))?;

    T::try_from(value).map_err(|_| format!("{} is out of range", s))
}

fn run_image(path: &str, config: &RunConfig, json: bool) {
    let image = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("❌ Failed to read image: {}", e);
            std::process::exit(1);
        }
    };

    let summary = match ez80::runner::run(config, &image) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("❌ Failed to start: {}", e);
            std::process::exit(1);
        }
    };

    if json {
        match serde_json::to_string_pretty(&summary) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("❌ Failed to encode summary: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        println!("🔧 Running: {} ({} bytes at {:06X})", path, image.len(), config.load_address);
        print_summary(&summary, config.max_steps);
    }

    if let StopReason::Fault(_) = summary.stop {
        std::process::exit(2);
    }
}

fn print_summary(summary: &RunSummary, max_steps: u64) {
    let regs = &summary.registers;

    println!();
    println!("━━━ Result ━━━");
    println!("Steps:  {}", summary.steps);
    println!("Cycles: {}", summary.cycles);
    println!("PC:     {:06X}  (MBASE={:02X})", summary.pc, regs.mbase);
    println!("A:      {:02X}", regs.a);
    println!("BC:     {:06X}", regs.bc.get24());
    println!("DE:     {:06X}", regs.de.get24());
    println!("HL:     {:06X}", regs.hl.get24());
    println!("IX:     {:06X}", regs.ix.get24());
    println!("IY:     {:06X}", regs.iy.get24());

    match &summary.stop {
        StopReason::StepLimit => {
            println!();
            println!("⚠️  Reached step limit ({}). Use --max-steps to increase.", max_steps);
        }
        StopReason::Fault(e) => {
            println!();
            println!("❌ Stopped: {}", e);
        }
    }
}

fn demo_accumulator() {
    println!("━━━ Accumulator Demo ━━━");
    println!();

    let mut cpu = CpuState::new();
    let mut memory = [0xC6, 0x80, 0xC6, 0x50, 0xC6, 0x40];

    for _ in 0..3 {
        let pc = cpu.program_counter();
        match execute_one(&mut cpu, &mut memory) {
            Ok(cycles) => println!("  {:06X}: ADD A,n  A={:02X}  cycles={}", pc, cpu.regs.a, cycles),
            Err(e) => {
                eprintln!("❌ {}", e);
                std::process::exit(1);
            }
        }
    }
}

fn run_self_test() {
    use ez80::{CpuError, Pair};

    println!("━━━ eZ80 Emulator Self-Test ━━━");
    println!();

    let mut passed = 0;
    let mut failed = 0;

    // Test 1: accumulator add sequence
    print!("ADD A,n sequence... ");
    let mut cpu = CpuState::new();
    let mut memory = [0xC6, 0x80, 0xC6, 0x50, 0xC6, 0x40];
    let mut ok = true;
    for (a, cycles) in [(0x80, 2), (0xD0, 4), (0x10, 6)] {
        if execute_one(&mut cpu, &mut memory) != Ok(cycles) || cpu.regs.a != a {
            ok = false;
            break;
        }
    }
    if ok { println!("✓"); passed += 1; }
    else { println!("✗"); failed += 1; }

    // Test 2: 16-bit writes keep the upper lane
    print!("16-bit view keeps upper lane... ");
    let mut cpu = CpuState::new();
    cpu.regs.write24(Pair::Hl, 0xAB_0000);
    cpu.regs.write16(Pair::Hl, 0x1234);
    if cpu.regs.read24(Pair::Hl) == 0xAB_1234 {
        println!("✓");
        passed += 1;
    } else {
        println!("✗ (got {:06X})", cpu.regs.read24(Pair::Hl));
        failed += 1;
    }

    // Test 3: program counter composition
    print!("MBASE:PC composition... ");
    let mut cpu = CpuState::new();
    cpu.regs.mbase = 0xD0;
    cpu.regs.set_pc16(0x1234);
    if cpu.program_counter() == 0xD0_1234 {
        println!("✓");
        passed += 1;
    } else {
        println!("✗ (got {:06X})", cpu.program_counter());
        failed += 1;
    }

    // Test 4: unimplemented opcodes are reported, not skipped
    print!("Unimplemented opcode detection... ");
    let mut cpu = CpuState::new();
    let mut memory = [0x76];
    let result = execute_one(&mut cpu, &mut memory);
    if result == Err(CpuError::UnimplementedOpcode { opcode: 0x76, prefix: None, address: 0 })
        && cpu == CpuState::new()
    {
        println!("✓");
        passed += 1;
    } else {
        println!("✗ ({:?})", result);
        failed += 1;
    }

    println!();
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Results: {} passed, {} failed", passed, failed);

    if failed == 0 {
        println!("✓ All tests passed!");
    } else {
        std::process::exit(1);
    }
}
