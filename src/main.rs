use crate::gb::cartridge::Cartridge;
use crate::gb::display::HeadlessDisplay;
use crate::gb::{Emulator, EmulatorConfig, INTERRUPT_DISPATCH_CYCLES, SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::gui::PocketBoy;
use clap::Parser;
use eframe::egui;
use env_logger::Env;
use std::path::PathBuf;
use std::process::ExitCode;

mod gb;
mod gui;

#[derive(Parser)]
#[command(version, about = "Game Boy (DMG) emulator")]
struct Args {
    #[arg(help = "Path of the ROM to load")]
    rom: PathBuf,

    #[arg(short, long, default_value_t = 3, help = "Display scale factor")]
    upscale: usize,

    #[arg(short = 's', long, help = "Print serial output to stdout")]
    print_serial: bool,

    #[arg(long, help = "Run without a window")]
    headless: bool,

    #[arg(long, help = "Stop after the given amount of frames (headless only)")]
    frames: Option<u64>,

    #[arg(long, help = "Run as fast as possible")]
    no_fps_limit: bool,

    #[arg(long, default_value_t = INTERRUPT_DISPATCH_CYCLES, help = "Cycles charged per interrupt dispatch")]
    interrupt_cycles: u32,
}

impl From<Args> for EmulatorConfig {
    fn from(args: Args) -> Self {
        Self {
            rom: args.rom,
            upscale: args.upscale.max(1),
            print_serial: args.print_serial,
            headless: args.headless,
            frames: args.frames,
            fps_limit: !args.no_fps_limit,
            interrupt_cycles: args.interrupt_cycles,
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let config = EmulatorConfig::from(Args::parse());

    log::info!("Loading cartridge {}...", config.rom.display());
    let cartridge = match Cartridge::try_from(config.rom.as_path()) {
        Ok(cartridge) => cartridge,
        Err(err) => {
            eprintln!("Unable to load cartridge: {err}");
            return ExitCode::FAILURE;
        }
    };

    match config.headless {
        true => run_headless(cartridge, &config),
        false => run_gui(cartridge, config),
    }
}

/// Runs the emulator on the current thread without any window.
fn run_headless(cartridge: Cartridge, config: &EmulatorConfig) -> ExitCode {
    let display = HeadlessDisplay::new(config.frames);
    let mut emulator = Emulator::new(cartridge, display, config);
    let result = emulator.run();

    if !config.print_serial && !emulator.serial_output().is_empty() {
        println!("{}", String::from_utf8_lossy(emulator.serial_output()));
    }
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}

/// Opens the main window, the emulator runs on a separate thread.
fn run_gui(cartridge: Cartridge, config: EmulatorConfig) -> ExitCode {
    let size = egui::vec2(
        (SCREEN_WIDTH * config.upscale) as f32 + 16.0,
        (SCREEN_HEIGHT * config.upscale) as f32 + 48.0,
    );
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size(size),
        ..Default::default()
    };
    let result = eframe::run_native(
        "pocketboy",
        options,
        Box::new(|_| Ok(Box::new(PocketBoy::new(cartridge, config)))),
    );
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("Unable to start frontend: {err}");
            ExitCode::FAILURE
        }
    }
}
