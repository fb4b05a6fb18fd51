use std::path::PathBuf;

use clap::Parser;

use crate::{error::EmuError, timer::TIMER_DEC_PER_SECOND};

pub const DEFAULT_CYCLES_PER_SECOND: u32 = 700;
pub const DEFAULT_SCALE: u8 = 16;

const SCALES: [u8; 6] = [1, 2, 4, 8, 16, 32];

/// Run settings for the `chip8vm` binary.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(version, about = "CHIP-8 interpreter", long_about = None)]
pub struct Config {
    /// Raw CHIP-8 program image, loaded at 0x200
    pub rom_path: PathBuf,

    /// Instructions executed per second
    #[arg(long = "hz", default_value_t = DEFAULT_CYCLES_PER_SECOND, value_parser = clap::value_parser!(u32).range(1..))]
    pub cycles_per_second: u32,

    /// Delay and sound timer rate
    #[arg(skip = TIMER_DEC_PER_SECOND)]
    pub timer_hz: u64,

    /// Window scale factor
    #[arg(long, default_value_t = DEFAULT_SCALE, value_parser = parse_scale)]
    pub scale: u8,

    /// Seed for CXNN; entropy when absent
    #[arg(long)]
    pub seed: Option<u64>,
}

fn parse_scale(s: &str) -> Result<u8, String> {
    let scale: u8 = s.parse().map_err(|_| format!("`{s}` is not a number"))?;
    if SCALES.contains(&scale) {
        Ok(scale)
    } else {
        Err(format!("scale must be one of {SCALES:?}"))
    }
}

impl Config {
    /// Parses `args`, whose first item is the program name.
    pub fn from_args<I, T>(args: I) -> Result<Self, EmuError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::try_parse_from(args).map_err(|e| EmuError::Usage(e.to_string()))
    }

    /// Steps run between two 60 Hz frames, at least one.
    pub fn cycles_per_frame(&self) -> u32 {
        (self.cycles_per_second / self.timer_hz.max(1) as u32).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Config, EmuError> {
        Config::from_args(std::iter::once("chip8vm").chain(args.iter().copied()))
    }

    #[test]
    fn test_defaults() {
        let config = parse(&["roms/pong.ch8"]).unwrap();
        assert_eq!(config.rom_path, PathBuf::from("roms/pong.ch8"));
        assert_eq!(config.cycles_per_second, 700);
        assert_eq!(config.timer_hz, 60);
        assert_eq!(config.scale, 16);
        assert_eq!(config.seed, None);
        assert_eq!(config.cycles_per_frame(), 11);
    }

    #[test]
    fn test_all_flags() {
        let config = parse(&["--hz", "1200", "game.ch8", "--seed", "42", "--scale", "8"]).unwrap();
        assert_eq!(config.rom_path, PathBuf::from("game.ch8"));
        assert_eq!(config.cycles_per_second, 1200);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.scale, 8);
        assert_eq!(config.cycles_per_frame(), 20);
    }

    #[test]
    fn test_slow_clock_still_steps() {
        let config = parse(&["game.ch8", "--hz", "30"]).unwrap();
        assert_eq!(config.cycles_per_frame(), 1);
    }

    #[test]
    fn test_usage_errors() {
        assert!(matches!(parse(&[]), Err(EmuError::Usage(_))));
        assert!(matches!(parse(&["a.ch8", "--bogus"]), Err(EmuError::Usage(_))));
        assert!(matches!(parse(&["a.ch8", "--hz"]), Err(EmuError::Usage(_))));
        assert!(matches!(parse(&["a.ch8", "--hz", "fast"]), Err(EmuError::Usage(_))));
        assert!(matches!(parse(&["a.ch8", "--hz", "0"]), Err(EmuError::Usage(_))));
        assert!(matches!(parse(&["a.ch8", "--scale", "3"]), Err(EmuError::Usage(_))));
        assert!(matches!(parse(&["a.ch8", "--seed", "-1"]), Err(EmuError::Usage(_))));
    }
}
