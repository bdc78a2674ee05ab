// src/cli.rs
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use crate::bencode::bvalue_to_json;
use crate::config::Config;
use crate::torrent::{info_hash_with, Torrent};

#[derive(Debug, Parser)]
#[command(name = "bdecoder", version, about = "Decode bencode and inspect .torrent files")]
pub struct Cli {
    /// Read settings from this file instead of ./bdecoder.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log decoding progress
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Decode a bencoded string and print it as JSON
    Decode { bencoded_string: String },

    /// Show the metadata of a .torrent file
    Info {
        torrent_file: PathBuf,

        /// Print the torrent as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn use_command(command: &Command, config: &Config) -> Result<()> {
    let decoder = config.decoder();

    match command {
        Command::Decode { bencoded_string } => {
            let value = decoder
                .decode(bencoded_string.as_bytes())
                .context("Failed to decode input")?;
            let json_val = bvalue_to_json(&value).context("Failed to render input as JSON")?;
            println!("{}", render_json(&json_val, config.pretty_json)?);
        }
        Command::Info { torrent_file, json } => {
            let buf = fs::read(torrent_file)
                .with_context(|| format!("Failed to read {}", torrent_file.display()))?;
            info!("read {} bytes from {}", buf.len(), torrent_file.display());

            let torrent = Torrent::from_bytes_with(&decoder, &buf)
                .with_context(|| format!("Error reading torrent {}", torrent_file.display()))?;
            let info_hash = info_hash_with(&decoder, &buf)?;

            if *json {
                let mut value = serde_json::to_value(&torrent)?;
                value["info_hash"] = serde_json::Value::String(hex::encode(info_hash));
                println!("{}", render_json(&value, config.pretty_json)?);
            } else {
                println!("Info Hash: {}", hex::encode(info_hash));
                if config.show_piece_hashes {
                    println!("{:#}", torrent);
                } else {
                    println!("{}", torrent);
                }
            }
        }
    }
    Ok(())
}

fn render_json(value: &serde_json::Value, pretty: bool) -> Result<String> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(text)
}
