//! Command definitions and handlers for the iostream CLI.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use iostream::{
    GlobFlags, IoStatus, ReadEndian, SeekFrom, Stream, glob_directory, load_file, save_all,
};

/// Bytes per hexdump row.
const HEX_ROW: usize = 16;

/// Pause before retrying a source that is not ready.
const NOT_READY_DELAY: Duration = Duration::from_millis(1);

#[derive(Parser, Debug)]
#[command(name = "iostream")]
#[command(about = "Inspect and move bytes through iostream backends")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print a file's contents
    Cat {
        /// File to print
        file: PathBuf,
    },

    /// Copy a file through a bounded transfer buffer
    Copy {
        /// Source file
        src: PathBuf,
        /// Destination file (created or truncated)
        dst: PathBuf,
        /// Transfer buffer size in bytes
        #[arg(short, long, default_value = "4096")]
        buffer: usize,
    },

    /// Hex dump part of a file
    Hexdump {
        /// File to dump
        file: PathBuf,
        /// Start offset
        #[arg(short, long, default_value = "0")]
        offset: u64,
        /// Maximum number of bytes
        #[arg(short = 'n', long)]
        length: Option<usize>,
    },

    /// List every regular file below a directory
    Ls {
        /// Directory to walk
        #[arg(default_value = ".")]
        dir: PathBuf,
    },

    /// Show size and leading magic of a file
    Info {
        /// File to inspect
        file: PathBuf,
    },
}

/// Run a parsed command line against stdout.
pub fn run(cli: Cli) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    execute(&cli.command, &mut out)?;
    out.flush()?;
    Ok(())
}

pub fn execute(command: &Command, out: &mut dyn Write) -> Result<()> {
    match command {
        Command::Cat { file } => cat(file, out),
        Command::Copy { src, dst, buffer } => {
            let copied = copy(src, dst, *buffer)?;
            writeln!(out, "{} bytes copied", copied)?;
            Ok(())
        }
        Command::Hexdump { file, offset, length } => hexdump(file, *offset, *length, out),
        Command::Ls { dir } => ls(dir, out),
        Command::Info { file } => info(file, out),
    }
}

fn cat(file: &Path, out: &mut dyn Write) -> Result<()> {
    let loaded = load_file(file).with_context(|| format!("Failed to read {}", file.display()))?;
    out.write_all(&loaded)?;
    Ok(())
}

fn copy(src: &Path, dst: &Path, buffer: usize) -> Result<u64> {
    if buffer == 0 {
        bail!("Transfer buffer must not be empty");
    }

    let mut input =
        Stream::from_file(src, "rb").with_context(|| format!("Failed to open {}", src.display()))?;
    let mut output = Stream::from_file(dst, "wb")
        .with_context(|| format!("Failed to create {}", dst.display()))?;

    let mut chunk = vec![0u8; buffer];
    let mut total = 0u64;
    loop {
        let n = input.read(&mut chunk);
        if n == 0 {
            if at_end(&mut input, src)? {
                break;
            }
            continue;
        }
        save_all(&mut output, &chunk[..n])
            .with_context(|| format!("Writing {} failed", dst.display()))?;
        total += n as u64;
    }

    output.flush()?;
    output
        .close()
        .with_context(|| format!("Failed to close {}", dst.display()))?;
    log::info!("copied {} bytes from {} to {}", total, src.display(), dst.display());
    Ok(total)
}

fn hexdump(file: &Path, offset: u64, length: Option<usize>, out: &mut dyn Write) -> Result<()> {
    let mut stream =
        Stream::from_file(file, "rb").with_context(|| format!("Failed to open {}", file.display()))?;
    let start = stream.seek(SeekFrom::Start(offset))?;
    dump(&mut stream, file, start, length, out)
}

fn dump(
    stream: &mut Stream<'_>,
    file: &Path,
    start: u64,
    length: Option<usize>,
    out: &mut dyn Write,
) -> Result<()> {
    let mut remaining = length.unwrap_or(usize::MAX);
    let mut address = start;
    let mut row = [0u8; HEX_ROW];
    while remaining > 0 {
        let want = remaining.min(HEX_ROW);
        let n = stream.read(&mut row[..want]);
        if n == 0 {
            if at_end(stream, file)? {
                break;
            }
            continue;
        }
        writeln!(out, "{}", format_row(address, &row[..n]))?;
        address += n as u64;
        remaining -= n;
    }
    Ok(())
}

/// Classify a zero-byte read: `true` at end of stream, `false` once a
/// not-ready source has been given time to catch up.
fn at_end(stream: &mut Stream<'_>, path: &Path) -> Result<bool> {
    match stream.status() {
        IoStatus::Eof => Ok(true),
        IoStatus::NotReady => {
            std::thread::sleep(NOT_READY_DELAY);
            Ok(false)
        }
        status => {
            let reason = stream
                .take_error()
                .map(|e| e.to_string())
                .unwrap_or_else(|| status.to_string());
            bail!("Reading {} failed: {}", path.display(), reason)
        }
    }
}

/// `00000010  48 65 6c 6c 6f                                    |Hello|`
fn format_row(address: u64, bytes: &[u8]) -> String {
    let mut hex = String::with_capacity(HEX_ROW * 3);
    for (i, b) in bytes.iter().enumerate() {
        if i == HEX_ROW / 2 {
            hex.push(' ');
        }
        hex.push_str(&format!("{:02x} ", b));
    }
    let ascii: String = bytes
        .iter()
        .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' })
        .collect();
    format!("{:08x}  {:<49} |{}|", address, hex, ascii)
}

fn ls(dir: &Path, out: &mut dyn Write) -> Result<()> {
    let mut files = glob_directory(dir, None, GlobFlags::empty())
        .with_context(|| format!("Failed to list {}", dir.display()))?;
    files.sort();
    for file in files {
        writeln!(out, "{}", file.display())?;
    }
    Ok(())
}

fn info(file: &Path, out: &mut dyn Write) -> Result<()> {
    let mut stream =
        Stream::from_file(file, "rb").with_context(|| format!("Failed to open {}", file.display()))?;
    let size = stream.size()?;
    writeln!(out, "size: {} bytes", size)?;
    writeln!(out, "capabilities: {:?}", stream.capabilities())?;

    if size >= 4 {
        let le = stream.read_u32_le()?;
        stream.seek(SeekFrom::Start(0))?;
        let be = stream.read_u32_be()?;
        writeln!(out, "magic: {:#010x} (le) {:#010x} (be)", le, be)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_to_string(command: Command) -> Result<String> {
        let mut out = Vec::new();
        execute(&command, &mut out)?;
        Ok(String::from_utf8(out)?)
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["iostream", "hexdump", "a.bin", "-o", "16", "-n", "32"])
            .unwrap();
        match cli.command {
            Command::Hexdump { offset, length, .. } => {
                assert_eq!(offset, 16);
                assert_eq!(length, Some(32));
            }
            other => panic!("unexpected command: {:?}", other),
        }
        assert!(Cli::try_parse_from(["iostream", "bogus"]).is_err());
    }

    #[test]
    fn test_cat_prints_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("hello.txt");
        std::fs::write(&path, "hello\n")?;

        assert_eq!(run_to_string(Command::Cat { file: path })?, "hello\n");
        Ok(())
    }

    #[test]
    fn test_copy_with_small_buffer() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let src = dir.path().join("src.bin");
        let dst = dir.path().join("dst.bin");
        let data: Vec<u8> = (0..=255u8).cycle().take(10_000).collect();
        std::fs::write(&src, &data)?;

        assert_eq!(copy(&src, &dst, 7)?, 10_000);
        assert_eq!(std::fs::read(&dst)?, data);
        assert!(copy(&src, &dst, 0).is_err());
        Ok(())
    }

    #[test]
    fn test_hexdump_rows() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("hex.bin");
        std::fs::write(&path, b"0123456789abcdefHello")?;

        let text = run_to_string(Command::Hexdump {
            file: path,
            offset: 16,
            length: None,
        })?;
        assert!(text.starts_with("00000010  48 65 6c 6c 6f"));
        assert!(text.trim_end().ends_with("|Hello|"));
        assert_eq!(text.lines().count(), 1);
        Ok(())
    }

    #[test]
    fn test_dump_reports_unreadable_stream() -> Result<()> {
        let file = tempfile::tempfile()?;
        let mut stream = Stream::from_std_file(file, iostream::OpenMode::parse("w")?);

        let mut out = Vec::new();
        let err = dump(&mut stream, Path::new("out.bin"), 0, None, &mut out).unwrap_err();
        assert!(err.to_string().contains("out.bin"));
        assert!(out.is_empty());
        Ok(())
    }

    #[test]
    fn test_format_row_splits_halves() {
        let row = format_row(0, &[0u8; 16]);
        assert!(row.contains("00 00 00 00 00 00 00 00  00"));
        assert!(row.ends_with("|................|"));
    }

    #[test]
    fn test_ls_is_sorted() -> Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(dir.path().join("b.txt"), "b")?;
        std::fs::write(dir.path().join("a.txt"), "a")?;

        let text = run_to_string(Command::Ls {
            dir: dir.path().to_path_buf(),
        })?;
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("a.txt"));
        Ok(())
    }

    #[test]
    fn test_info_reports_magic() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("magic.bin");
        std::fs::write(&path, [0x4c, 0x45, 0x47, 0x4f, 0x00])?;

        let text = run_to_string(Command::Info { file: path })?;
        assert!(text.contains("size: 5 bytes"));
        assert!(text.contains("0x4f47454c (le)"));
        assert!(text.contains("0x4c45474f (be)"));
        Ok(())
    }
}
