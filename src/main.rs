use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::time::Duration;
use tracing::level_filters::LevelFilter;
use tracing::{info, warn};

mod clock;
mod compositor;
mod config;
mod decode;
mod error;
mod frame_buffer;
mod geometry;
mod panel;
mod pixel_format;
mod playback;
mod protocol;
mod transport;

#[cfg(test)]
mod test_support;

use clock::MonotonicClock;
use config::HardwareConfig;
use frame_buffer::PackedFrames;
use geometry::{Geometry, PanelSize};
use panel::Panel;
use playback::Player;
use transport::SpidevTransport;

#[derive(Parser, Debug)]
#[command(name = "display-zero")]
#[command(about = "display-zero - 128x160 SPI panel player\n\nConverts animations to packed frame buffers and plays them on the panel.", long_about = None)]
struct Cli {
    /// Enable debug output (statistics)
    #[arg(long, global = true)]
    debug: bool,

    /// Enable detailed debug (hex dumps of every command)
    #[arg(long, global = true)]
    ddebug: bool,

    /// Panel wiring configuration (JSON)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Mode,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Mode {
    /// Resample an image or animation into a packed frame buffer
    Convert {
        /// GIF or still image to convert
        input: PathBuf,

        /// Packed frame buffer to write
        #[arg(short = 'o', long = "output")]
        output: PathBuf,
    },
    /// Play a packed frame buffer on the panel until interrupted
    Play {
        /// Packed frame buffer to play
        input: PathBuf,

        /// Frame period in milliseconds
        #[arg(short = 't', long = "time", value_name = "PERIOD_MS", value_parser = clap::value_parser!(u64).range(1..))]
        period_ms: u64,
    },
}

fn convert(input: &Path, output: &Path) -> Result<()> {
    let frames = decode::decode_frames(input)
        .with_context(|| format!("Failed to decode {}", input.display()))?;

    let geometry = Geometry::default();
    let packed = compositor::resample(&frames, &geometry);
    let packed = PackedFrames::from_bytes(packed, geometry.panel)?;

    packed
        .store(output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    Ok(())
}

fn play(input: &Path, period_ms: u64, hardware: &HardwareConfig) -> Result<()> {
    let frames = PackedFrames::load(input, PanelSize::PANEL)
        .with_context(|| format!("Failed to load {}", input.display()))?;
    let player = Player::new(frames, Duration::from_millis(period_ms));

    // Set up Ctrl-C handler with graceful shutdown
    let running = player.get_running_flag();
    let result = ctrlc::set_handler(move || {
        info!("Shutting down...");
        running.store(false, Ordering::Relaxed);
    });
    if let Err(e) = result {
        warn!("Could not set Ctrl-C handler: {}", e);
    }

    let transport = SpidevTransport::open(hardware)
        .with_context(|| format!("Failed to open {}", hardware.spi_device))?;
    let mut panel = Panel::new(transport).context("Failed to initialize panel")?;

    // Blocks until shutdown
    let result = player.run(&mut panel, &MonotonicClock);

    // Blank and sleep the panel even if playback failed
    panel.shutdown();

    result.map(|_| ())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ddebug implies debug
    let level = if cli.ddebug {
        LevelFilter::TRACE
    } else if cli.debug {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Mode::Convert { input, output } => convert(&input, &output),
        Mode::Play { input, period_ms } => {
            let hardware = HardwareConfig::load(cli.config.as_deref())?;
            play(&input, period_ms, &hardware)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::scratch_dir;
    use clap::error::ErrorKind;
    use image::{Rgba, RgbaImage};
    use std::fs;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("display-zero").chain(args.iter().copied()))
    }

    #[test]
    fn test_parse_convert() {
        for flag in ["-o", "--output"] {
            let cli = parse(&["convert", "in.gif", flag, "out.raw"]).unwrap();
            assert_eq!(
                cli.command,
                Mode::Convert {
                    input: PathBuf::from("in.gif"),
                    output: PathBuf::from("out.raw"),
                }
            );
        }
    }

    #[test]
    fn test_parse_play() {
        let cli = parse(&["--debug", "play", "out.raw", "-t", "40"]).unwrap();
        assert!(cli.debug);
        assert!(!cli.ddebug);
        assert_eq!(
            cli.command,
            Mode::Play {
                input: PathBuf::from("out.raw"),
                period_ms: 40,
            }
        );

        // global flags may follow the subcommand
        let cli = parse(&["play", "out.raw", "--time", "1", "--ddebug", "--config", "panel.json"]).unwrap();
        assert!(cli.ddebug);
        assert_eq!(cli.config, Some(PathBuf::from("panel.json")));
    }

    #[test]
    fn test_bad_period_rejected() {
        for period in ["0", "-5", "abc", ""] {
            assert!(parse(&["play", "out.raw", "-t", period]).is_err(), "period {:?}", period);
        }
        assert!(parse(&["play", "out.raw"]).is_err());
    }

    #[test]
    fn test_repeated_flags_rejected() {
        assert!(parse(&["play", "out.raw", "-t", "10", "-t", "20"]).is_err());
        assert!(parse(&["convert", "in.gif", "-o", "a.raw", "-o", "b.raw"]).is_err());
    }

    #[test]
    fn test_flags_of_other_mode_rejected() {
        assert!(parse(&["convert", "in.gif", "-o", "out.raw", "-t", "5"]).is_err());
        assert!(parse(&["play", "out.raw", "-t", "5", "-o", "x.raw"]).is_err());
    }

    #[test]
    fn test_one_mode_required() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["convert", "in.gif", "-o", "out.raw", "play", "out.raw", "-t", "5"]).is_err());
        assert!(parse(&["convert", "in.gif"]).is_err());
    }

    #[test]
    fn test_help() {
        assert_eq!(parse(&["-h"]).unwrap_err().kind(), ErrorKind::DisplayHelp);
        assert_eq!(parse(&["help"]).unwrap_err().kind(), ErrorKind::DisplayHelp);
        assert_eq!(parse(&["play", "--help"]).unwrap_err().kind(), ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_convert_writes_packed_frames() {
        let dir = scratch_dir("main_convert");
        let input = dir.join("still.png");
        let output = dir.join("out.raw");
        RgbaImage::from_pixel(400, 320, Rgba([255, 255, 255, 255]))
            .save(&input)
            .unwrap();

        convert(&input, &output).unwrap();

        let data = fs::read(&output).unwrap();
        assert_eq!(data.len(), PanelSize::PANEL.frame_size());
        assert!(data.iter().all(|&b| b == 0xFC));
    }

    #[test]
    fn test_failed_convert_writes_nothing() {
        let dir = scratch_dir("main_convert_missing");
        let output = dir.join("out.raw");
        assert!(convert(&dir.join("missing.gif"), &output).is_err());
        assert!(!output.exists());
    }
}
