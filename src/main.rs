use std::error::Error;
use std::fs::File;
use std::path::PathBuf;
use std::process::exit;

use clap::Parser;
use log::{info, warn};

use chip8_vm::config::{Config, DEFAULT_INSTRUCTIONS_PER_SECOND};
use chip8_vm::display::{MonoTermDisplay, SCREEN_HEIGHT, SCREEN_WIDTH};
use chip8_vm::input::{Input, KeyLayout, StdinInput};
use chip8_vm::interpreter::Chip8Interpreter;
use chip8_vm::scheduler::Scheduler;
use chip8_vm::sound::{Mute, SimpleBeep, Sound};
use chip8_vm::trace::LogTracer;

/// Run a CHIP-8 program in the terminal. Esc quits.
///
/// Logs go to stderr; redirect them (2>trace.log) when tracing.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// ROM file, loaded unmodified at 0x200
    rom: PathBuf,

    /// log every executed instruction
    #[arg(short, long)]
    trace: bool,

    /// instructions per second; 0 runs flat out
    #[arg(long, default_value_t = DEFAULT_INSTRUCTIONS_PER_SECOND)]
    ips: u32,

    /// seed for the random number instruction
    #[arg(long)]
    seed: Option<u64>,

    /// don't use the PC speaker
    #[arg(short, long)]
    mute: bool,

    /// which keys stand in for the hex keypad
    #[arg(long, value_enum, default_value_t = KeyLayout::Conventional)]
    keys: KeyLayout,
}

fn main() {
    let args = Args::parse();

    let default_level = if args.trace { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    // nothing gets built until we know the ROM is readable
    let mut rom = match File::open(&args.rom) {
        Ok(rom) => rom,
        Err(e) => {
            eprintln!("Failed to read ROM {}: {}", args.rom.display(), e);
            exit(1);
        }
    };

    let config = Config {
        instructions_per_second: args.ips,
        seed: args.seed,
        trace: args.trace,
        key_layout: args.keys,
        ..Config::default()
    };

    let mut interpreter = Chip8Interpreter::new(config.seed);
    if let Err(e) = interpreter.load_program(&mut rom) {
        eprintln!("Failed to load ROM {}: {}", args.rom.display(), e);
        exit(1);
    }

    if let Err(e) = emulate(interpreter, config, args.mute) {
        // the terminal has been restored by now
        eprintln!("chip8-vm: {}", e);
        exit(1);
    }
}

fn emulate(interpreter: Chip8Interpreter, config: Config, mute: bool) -> Result<(), Box<dyn Error>> {
    let mut display = MonoTermDisplay::new(SCREEN_WIDTH, SCREEN_HEIGHT)?;
    let mut input = StdinInput::new(config.key_layout, config.key_hold)?;
    let mut sound: Box<dyn Sound> = if mute {
        Box::new(Mute::new())
    } else {
        Box::new(SimpleBeep::new())
    };

    // drop anything typed while the terminal was being set up
    input.flush_keys()?;

    let trace = config.trace;
    let mut scheduler = Scheduler::new(
        interpreter,
        &mut display,
        &mut input,
        sound.as_mut(),
        config,
    );
    if trace {
        scheduler.set_observer(Box::new(LogTracer::new()));
    }

    let reason = scheduler.run()?;
    info!("{:?} after {} instructions", reason, scheduler.executed());
    drop(scheduler);
    if sound.is_beeping() {
        if let Err(e) = sound.stop() {
            warn!("sound: {}", e);
        }
    }
    Ok(())
}
