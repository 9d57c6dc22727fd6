//! Usb2Snes Control Tool
//!
//! CLI for checking a bridge setup: list devices, query info, read memory and
//! watch controller inputs.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use snes_input_core::{Client, MemoryRegion, Transport, CONTROLLER_1_INPUT, USB2SNES_URI};
use std::io::Write;
use tokio::sync::watch;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const CLIENT_NAME: &str = "usb2snesctl";

#[derive(Parser)]
#[command(name = "usb2snesctl")]
#[command(about = "Inspect a Usb2Snes bridge and controller inputs")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List devices known to the bridge
    Devices,
    /// Attach to the first device and show its info
    Info,
    /// Read a memory range and print it as hex
    Read {
        /// Bridge address in hex (e.g., F5008B)
        #[arg(value_parser = parse_hex)]
        address: u32,

        /// Number of bytes to read
        #[arg(default_value = "2")]
        length: usize,
    },
    /// Print held buttons whenever they change
    Watch {
        /// Bridge address of the input word in hex [default: controller 1]
        #[arg(long, value_parser = parse_hex)]
        address: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut client = Client::connect(USB2SNES_URI)
        .await
        .context("Could not connect to QUsb2Snes. Is it running?")?;
    client.set_name(CLIENT_NAME).await?;

    let result = match cli.command {
        Commands::Devices => handle_devices(&mut client).await,
        Commands::Info => handle_info(&mut client).await,
        Commands::Read { address, length } => {
            let region = MemoryRegion::new(address, length);
            handle_read(&mut client, region, &mut std::io::stdout()).await
        }
        Commands::Watch { address } => {
            let address = address.unwrap_or(CONTROLLER_1_INPUT.address);
            let region = MemoryRegion::new(address, CONTROLLER_1_INPUT.length);

            let (stop_tx, stop_rx) = watch::channel(false);
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    stop_tx.send_replace(true);
                }
            });
            handle_watch(&mut client, region, stop_rx, &mut std::io::stdout())
                .await
                .map(|_| ())
        }
    };

    if let Err(e) = client.close().await {
        debug!("Error closing connection: {}", e);
    }
    result
}

async fn handle_devices(client: &mut Client) -> Result<()> {
    let devices = client.devices().await?;
    if devices.is_empty() {
        println!("No device connected");
    }
    for device in devices {
        println!("{}", device);
    }
    Ok(())
}

async fn handle_info(client: &mut Client) -> Result<()> {
    let device = client.attach_first().await?;
    let info = client.info().await?;
    println!("Device: {}", device);
    println!("  Type: {}", info.dev_type);
    println!("  Firmware: {}", info.version);
    println!("  Game: {}", info.game.trim());
    if !info.flags.is_empty() {
        println!("  Flags: {}", info.flags.join(", "));
    }
    Ok(())
}

async fn handle_read<T: Transport>(
    client: &mut Client<T>,
    region: MemoryRegion,
    out: &mut impl Write,
) -> Result<()> {
    client.attach_first().await?;
    let data = client.read_memory(region).await?;
    for line in hex_dump(region.address, &data) {
        writeln!(out, "{}", line)?;
    }
    Ok(())
}

/// Prints the input word each time it changes until `stop` turns true.
/// Returns the number of changes printed.
async fn handle_watch<T: Transport>(
    client: &mut Client<T>,
    region: MemoryRegion,
    stop: watch::Receiver<bool>,
    out: &mut impl Write,
) -> Result<usize> {
    let device = client.attach_first().await?;
    writeln!(out, "Watching {} at {:06X} (Ctrl-C to stop)", device, region.address)?;

    let mut last = None;
    let mut changes = 0;
    while !*stop.borrow() {
        let snapshot = client.read_inputs(region).await?;
        if last != Some(snapshot) {
            let held: Vec<_> = snapshot.pressed().map(|b| b.label()).collect();
            let held = if held.is_empty() {
                "-".to_string()
            } else {
                held.join(" ")
            };
            writeln!(out, "{:04X}  {}", snapshot.raw(), held)?;
            last = Some(snapshot);
            changes += 1;
        }
    }
    Ok(changes)
}

/// Parses a hex number with an optional `0x` or `$` prefix.
fn parse_hex(s: &str) -> Result<u32, String> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .or_else(|| s.strip_prefix('$'))
        .unwrap_or(s);
    u32::from_str_radix(digits, 16).map_err(|e| format!("invalid hex address '{}': {}", s, e))
}

/// Formats `data` as rows of 16 bytes prefixed with their address.
fn hex_dump(address: u32, data: &[u8]) -> Vec<String> {
    data.chunks(16)
        .enumerate()
        .map(|(row, chunk)| {
            let bytes: Vec<_> = chunk.iter().map(|b| format!("{:02X}", b)).collect();
            format!("{:06X}  {}", address as usize + row * 16, bytes.join(" "))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use snes_input_core::testing::{self, MockBridge};

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("F5008B"), Ok(0xF5_008B));
        assert_eq!(parse_hex("0xf5008b"), Ok(0xF5_008B));
        assert_eq!(parse_hex("$7FC0"), Ok(0x7FC0));
        assert!(parse_hex("xyz").is_err());
    }

    #[test]
    fn test_hex_dump() {
        let data: Vec<u8> = (0..18).collect();
        let lines = hex_dump(0x7FC0, &data);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("007FC0  00 01 02"));
        assert_eq!(lines[1], "007FD0  10 11");
    }

    #[test]
    fn test_cli_parses_watch_default() {
        let cli = Cli::try_parse_from(["usb2snesctl", "watch"]).unwrap();
        match cli.command {
            Commands::Watch { address } => assert_eq!(address, None),
            _ => panic!("expected watch"),
        }

        let cli = Cli::try_parse_from(["usb2snesctl", "watch", "--address", "$F50CE0"]).unwrap();
        match cli.command {
            Commands::Watch { address } => assert_eq!(address, Some(0xF5_0CE0)),
            _ => panic!("expected watch"),
        }
    }

    #[tokio::test]
    async fn test_watch_prints_changes_until_stopped() {
        let (stop_tx, stop_rx) = watch::channel(false);
        let (url, server) = testing::serve(move |mut bridge: MockBridge| async move {
            let reads: Vec<[u8; 2]> = vec![[0x80, 0x00], [0x80, 0x00], [0x00, 0x00]];
            let mut reads = reads.into_iter();
            while let Some(request) = bridge.request().await {
                match request["Opcode"].as_str() {
                    Some("DeviceList") => bridge.reply_results(&["device-1"]).await,
                    Some("GetAddress") => {
                        let inputs = reads.next().expect("read after stop");
                        // Raise the flag before the last reply so the loop ends on it
                        if reads.len() == 0 {
                            stop_tx.send_replace(true);
                        }
                        bridge.reply_binary(&inputs).await;
                    }
                    _ => {}
                }
            }
        })
        .await
        .unwrap();

        let mut client = Client::connect(&url).await.unwrap();
        let mut out = Vec::new();
        let changes = handle_watch(&mut client, CONTROLLER_1_INPUT, stop_rx, &mut out)
            .await
            .unwrap();
        client.close().await.unwrap();
        server.await.unwrap();

        assert_eq!(changes, 2);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Watching device-1 at F5008B (Ctrl-C to stop)\n8000  A\n0000  -\n"
        );
    }

    #[tokio::test]
    async fn test_read_prints_hex_dump() {
        let (url, server) = testing::serve(|mut bridge: MockBridge| async move {
            while let Some(request) = bridge.request().await {
                match request["Opcode"].as_str() {
                    Some("DeviceList") => bridge.reply_results(&["device-1"]).await,
                    Some("GetAddress") => {
                        assert_eq!(request["Operands"][0], "7FC0");
                        assert_eq!(request["Operands"][1], "2");
                        bridge.reply_binary(&[0xAB, 0xCD]).await;
                    }
                    _ => {}
                }
            }
        })
        .await
        .unwrap();

        let mut client = Client::connect(&url).await.unwrap();
        let mut out = Vec::new();
        handle_read(&mut client, MemoryRegion::new(0x7FC0, 2), &mut out)
            .await
            .unwrap();
        client.close().await.unwrap();
        server.await.unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "007FC0  AB CD\n");
    }
}
