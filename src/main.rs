use chip8vm::{
    config::Config,
    keyboard::Keyboard,
    memory::read_rom_file,
    timer::Ticker,
    window::Screen,
    CycleStatus, EmuError, Emulator,
};
use log::info;

// Separately:
// CPU: cycles_per_second, spread over 60 frames
// Display: 60 times per second
// Timer: 60 times per second

fn main() -> Result<(), EmuError> {
    env_logger::init();

    let config = match Config::from_args(std::env::args()) {
        Ok(config) => config,
        Err(EmuError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(e) => return Err(e),
    };

    let program = read_rom_file(&config.rom_path)?;
    let mut emu = match config.seed {
        Some(seed) => Emulator::seeded(seed),
        None => Emulator::new(),
    };
    emu.reset();
    emu.load_program(&program)?;

    let mut screen = Screen::new("chip8vm - ESC to exit", config.scale)?;
    let mut keyboard = Keyboard::new();
    let mut timers = Ticker::per_second(config.timer_hz);
    let cycles_per_frame = config.cycles_per_frame();
    info!(
        "running {} at {} Hz ({} cycles per frame)",
        config.rom_path.display(),
        config.cycles_per_second,
        cycles_per_frame
    );

    while screen.is_open() {
        keyboard.update_keys(&screen.keys());

        let mut redraw = false;
        for _ in 0..cycles_per_frame {
            match emu.step(&keyboard)? {
                CycleStatus::Redraw => redraw = true,
                CycleStatus::WaitingForKey => break,
                CycleStatus::Continue => {}
            }
        }

        for _ in 0..timers.poll() {
            emu.tick_timers();
        }

        if redraw {
            screen.render(emu.frame_buffer())?;
        } else {
            screen.update();
        }
    }
    Ok(())
}
