//! Command-line interface definitions and command execution

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use alignflash::{AlignError, AlignedFlash, FlashDevice, VerifyingDevice};
use alignflash_platform::StreamFlash;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use embedded_io_adapters::std::FromStd;
use log::{debug, info};

use crate::number_parser::{parse_hex_bytes, parse_u32};

/// Bytes shown per hex dump line
const DUMP_WIDTH: usize = 16;

type ImageDevice = StreamFlash<FromStd<File>>;

/// Byte-level access to NOR flash images
#[derive(Parser, Debug)]
#[command(name = "alignflash")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Erase sector size in bytes
    #[arg(long, global = true, default_value = "4096", value_parser = parse_u32)]
    pub sector_size: u32,

    /// Reject writes that need an erase first instead of ANDing them in
    #[arg(long, global = true)]
    pub verify: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new, fully erased flash image
    Create {
        /// Path to the image file
        image: PathBuf,

        /// Image size in bytes (a whole number of sectors)
        #[arg(long, value_parser = parse_u32)]
        size: u32,
    },

    /// Hex dump a byte range
    Read {
        /// Path to the image file
        image: PathBuf,

        /// Start address
        #[arg(value_parser = parse_u32)]
        address: u32,

        /// Number of bytes
        #[arg(value_parser = parse_u32)]
        length: u32,
    },

    /// Program bytes at an address (the target must be erased)
    Write {
        /// Path to the image file
        image: PathBuf,

        /// Start address
        #[arg(value_parser = parse_u32)]
        address: u32,

        /// Data as a hex byte string, e.g. "deadbeef"
        #[arg(required_unless_present = "file", conflicts_with = "file")]
        hex: Option<String>,

        /// Read the data from a host file instead
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Erase the sectors covering a byte range
    Erase {
        /// Path to the image file
        image: PathBuf,

        /// Start address (should be sector aligned)
        #[arg(value_parser = parse_u32)]
        address: u32,

        /// Number of bytes (should be a whole number of sectors)
        #[arg(value_parser = parse_u32)]
        size: u32,
    },

    /// Show image geometry and which sectors hold data
    Info {
        /// Path to the image file
        image: PathBuf,
    },
}

impl Commands {
    fn image(&self) -> &Path {
        match self {
            Commands::Create { image, .. }
            | Commands::Read { image, .. }
            | Commands::Write { image, .. }
            | Commands::Erase { image, .. }
            | Commands::Info { image } => image,
        }
    }
}

pub fn run(cli: Cli) -> Result<()> {
    if cli.sector_size == 0 || cli.sector_size % alignflash::WORD_SIZE as u32 != 0 {
        anyhow::bail!(
            "Sector size {} must be a non-zero multiple of {}",
            cli.sector_size,
            alignflash::WORD_SIZE
        );
    }

    let device = match &cli.command {
        Commands::Create { image, size } => create_image(image, *size, cli.sector_size)?,
        command => open_image(command.image(), cli.sector_size)?,
    };

    let device = if cli.verify {
        let mut flash = AlignedFlash::new(VerifyingDevice::new(device));
        execute(&mut flash, &cli.command)?;
        flash.into_inner().into_inner()
    } else {
        let mut flash = AlignedFlash::new(device);
        execute(&mut flash, &cli.command)?;
        flash.into_inner()
    };

    finish(device)
}

fn create_image(path: &Path, size: u32, sector_size: u32) -> Result<ImageDevice> {
    if size % sector_size != 0 {
        anyhow::bail!(
            "Image size {} is not a whole number of {}-byte sectors",
            size,
            sector_size
        );
    }

    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .with_context(|| format!("Failed to create image: {}", path.display()))?;

    info!("Creating {} byte image at {}", size, path.display());
    Ok(StreamFlash::new(FromStd::new(file), size, sector_size))
}

fn open_image(path: &Path, sector_size: u32) -> Result<ImageDevice> {
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)
        .with_context(|| format!("Failed to open image: {}", path.display()))?;

    let device = StreamFlash::open(FromStd::new(file), sector_size)
        .with_context(|| format!("Failed to open image: {}", path.display()))?;
    debug!(
        "Opened {} ({} bytes, {} byte sectors)",
        path.display(),
        device.capacity(),
        sector_size
    );
    Ok(device)
}

fn finish(mut device: ImageDevice) -> Result<()> {
    device.sync().context("Failed to flush image")
}

fn execute<D>(flash: &mut AlignedFlash<D>, command: &Commands) -> Result<()>
where
    D: FlashDevice,
    D::Error: Send + Sync + 'static,
{
    match command {
        Commands::Create { size, .. } => {
            // A fresh file has no bytes yet; erasing writes every sector out
            flash.erase(0, *size).context("Failed to erase new image")?;
            println!(
                "Created {} byte image ({} sectors of {} bytes)",
                size,
                size / flash.sector_size().get(),
                flash.sector_size()
            );
        }

        Commands::Read {
            address, length, ..
        } => {
            let mut buf = vec![0u8; *length as usize];
            flash
                .read(*address, &mut buf)
                .with_context(|| format!("Failed to read {} bytes at {:#x}", length, address))?;
            for (index, line) in buf.chunks(DUMP_WIDTH).enumerate() {
                let line_address = *address as usize + index * DUMP_WIDTH;
                println!("{}", format_dump_line(line_address, line));
            }
        }

        Commands::Write {
            address, hex, file, ..
        } => {
            let data = match (hex, file) {
                (_, Some(path)) => std::fs::read(path)
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                (Some(hex), None) => parse_hex_bytes(hex)?,
                (None, None) => anyhow::bail!("Nothing to write: give hex data or --file"),
            };

            flash.write(*address, &data).map_err(|err| write_error(err, *address))?;
            println!("Wrote {} bytes at {:#x}", data.len(), address);
        }

        Commands::Erase { address, size, .. } => {
            // Misaligned ranges are logged and truncated by the adapter
            let sector_size = flash.sector_size().get();
            flash
                .erase(*address, *size)
                .with_context(|| format!("Failed to erase {} bytes at {:#x}", size, address))?;
            println!("Erased {} sectors", size / sector_size);
        }

        Commands::Info { image } => {
            let sector_size = flash.sector_size().get();
            let sectors = flash.capacity() / sector_size;
            println!("Image:       {}", image.display());
            println!("Capacity:    {} bytes", flash.capacity());
            println!("Sector size: {} bytes", sector_size);
            println!("Sectors:     {}", sectors);

            let mut buf = vec![0u8; sector_size as usize];
            let mut erased = 0;
            for sector in 0..sectors {
                flash
                    .read(sector * sector_size, &mut buf)
                    .with_context(|| format!("Failed to read sector {}", sector))?;
                let programmed = buf.iter().filter(|b| **b != 0xFF).count();
                if programmed == 0 {
                    erased += 1;
                } else {
                    println!("  sector {:>5}: {} programmed bytes", sector, programmed);
                }
            }
            println!("Erased:      {}/{} sectors", erased, sectors);
        }
    }

    Ok(())
}

fn write_error<E>(err: AlignError<E>, address: u32) -> anyhow::Error
where
    E: core::fmt::Debug + core::fmt::Display + Send + Sync + 'static,
{
    let hint = match err.operation() {
        Some(alignflash::Operation::Write) => " (is the target erased?)",
        _ => "",
    };
    anyhow::Error::new(err).context(format!("Failed to write at {:#x}{}", address, hint))
}

/// Format one hex dump line: address, hex bytes, printable ASCII
fn format_dump_line(address: usize, bytes: &[u8]) -> String {
    let hex: Vec<String> = bytes.iter().map(|b| format!("{:02x}", b)).collect();
    let ascii: String = bytes
        .iter()
        .map(|b| if b.is_ascii_graphic() || *b == b' ' { *b as char } else { '.' })
        .collect();
    format!(
        "{:08x}  {:<width$}  |{}|",
        address,
        hex.join(" "),
        ascii,
        width = DUMP_WIDTH * 3 - 1
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("alignflash").chain(args.iter().copied()))
    }

    fn image_path(dir: &tempfile::TempDir) -> String {
        dir.path().join("flash.img").to_string_lossy().into_owned()
    }

    #[test]
    fn test_create_write_erase_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let image = image_path(&dir);

        run(cli(&["create", &image, "--size", "0x2000"])).unwrap();
        let bytes = std::fs::read(&image).unwrap();
        assert_eq!(bytes.len(), 0x2000);
        assert!(bytes.iter().all(|b| *b == 0xFF));

        run(cli(&["write", &image, "0x0FFE", "aabbccdd"])).unwrap();
        let bytes = std::fs::read(&image).unwrap();
        assert_eq!(&bytes[0xFFC..0x1004], &[0xFF, 0xFF, 0xAA, 0xBB, 0xCC, 0xDD, 0xFF, 0xFF]);

        run(cli(&["erase", &image, "4096", "4096"])).unwrap();
        let bytes = std::fs::read(&image).unwrap();
        assert_eq!(&bytes[0xFFE..0x1000], &[0xAA, 0xBB]);
        assert!(bytes[0x1000..].iter().all(|b| *b == 0xFF));

        run(cli(&["read", &image, "0xFF0", "32"])).unwrap();
        run(cli(&["info", &image])).unwrap();
    }

    #[test]
    fn test_write_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let image = image_path(&dir);
        let payload = dir.path().join("payload.bin");
        std::fs::write(&payload, b"hello flash").unwrap();

        run(cli(&["create", &image, "--size", "4096"])).unwrap();
        run(cli(&[
            "write",
            &image,
            "3",
            "--file",
            payload.to_str().unwrap(),
        ]))
        .unwrap();

        let bytes = std::fs::read(&image).unwrap();
        assert_eq!(&bytes[3..14], b"hello flash");
    }

    #[test]
    fn test_verify_rejects_rewrite() {
        let dir = tempfile::tempdir().unwrap();
        let image = image_path(&dir);

        run(cli(&["create", &image, "--size", "4096"])).unwrap();
        run(cli(&["--verify", "write", &image, "1", "00"])).unwrap();

        let err = run(cli(&["--verify", "write", &image, "1", "80"])).unwrap_err();
        assert!(err.to_string().contains("is the target erased?"));

        // Without --verify the program silently ANDs
        run(cli(&["write", &image, "1", "80"])).unwrap();
        assert_eq!(std::fs::read(&image).unwrap()[1], 0x00);
    }

    #[test]
    fn test_create_rejects_partial_sector() {
        let dir = tempfile::tempdir().unwrap();
        let image = image_path(&dir);

        let err = run(cli(&["create", &image, "--size", "5000"])).unwrap_err();
        assert!(err.to_string().contains("whole number"));
    }

    #[test]
    fn test_open_missing_image() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(cli(&["info", &image_path(&dir)])).unwrap_err();
        assert!(err.to_string().contains("Failed to open image"));
    }

    #[test]
    fn test_custom_sector_size() {
        let dir = tempfile::tempdir().unwrap();
        let image = image_path(&dir);

        run(cli(&["--sector-size", "256", "create", &image, "--size", "1024"])).unwrap();
        run(cli(&["--sector-size", "256", "write", &image, "0", "00000000"])).unwrap();
        run(cli(&["--sector-size", "256", "erase", &image, "0", "256"])).unwrap();

        assert!(std::fs::read(&image).unwrap().iter().all(|b| *b == 0xFF));
    }

    #[test]
    fn test_format_dump_line() {
        let line = format_dump_line(0x10, b"AB\x00\xff");
        assert_eq!(
            line,
            format!("00000010  {:<47}  |AB..|", "41 42 00 ff")
        );
    }
}
