//! mkvstegfs - create or repair a steganographic volume.
//!
//! Fills a file or block device with noise and writes the superblock the
//! filesystem driver needs to find the volume size.

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use std::path::{Path, PathBuf};
use vstegfs::{entropy_source, units, Capacity, FormatJob, FormatOptions};

const LICENCE: &str = "\
This program is free software, released under the MIT licence.

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software to deal in the software without restriction. The software
is provided \"as is\", without warranty of any kind, express or implied.";

#[derive(Parser)]
#[command(name = "mkvstegfs")]
#[command(disable_version_flag = true)]
#[command(
    about = "Create a steganographic volume image",
    long_about = "Create a steganographic volume image. If a block device is used instead \
                  of a file (eg: /dev/sda1) a size is not needed as the volume will use all \
                  available space on that device or partition."
)]
struct Cli {
    /// Where to write the volume
    #[arg(
        short = 'f',
        long = "filesystem",
        value_name = "PATH",
        required_unless_present_any = ["licence", "version"]
    )]
    filesystem: Option<PathBuf>,

    /// Size of the volume, in MB unless suffixed with M, G or T
    #[arg(short, long, value_name = "SIZE")]
    size: Option<String>,

    /// Overwrite an existing file
    #[arg(short = 'x', long)]
    force: bool,

    /// Only rewrite the superblock of an existing volume
    #[arg(short, long)]
    restore: bool,

    /// Print the capacity report as JSON
    #[arg(long)]
    json: bool,

    /// Show licence information
    #[arg(short, long)]
    licence: bool,

    /// Show version information
    #[arg(short = 'v', long)]
    version: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    location: &'a Path,
    #[serde(flatten)]
    capacity: Capacity,
}

fn main() {
    if let Err(e) = init_logger() {
        eprintln!("{e}");
        std::process::exit(1);
    }

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        let code = e
            .downcast_ref::<vstegfs::Error>()
            .map_or(1, vstegfs::Error::exit_code);
        std::process::exit(code);
    }
}

fn init_logger() -> Result<(), log::SetLoggerError> {
    let env = env_logger::Env::default().filter_or("RUST_LOG", "info");
    env_logger::try_init_from_env(env)
}

fn run(cli: Cli) -> anyhow::Result<()> {
    if cli.version {
        println!("mkvstegfs {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }
    if cli.licence {
        println!("{LICENCE}");
        return Ok(());
    }

    let path = cli.filesystem.context("no volume location given")?;
    let size_units = match &cli.size {
        Some(s) => units::parse_size(s)?,
        None => 0,
    };

    let opts = FormatOptions {
        path,
        size_units,
        force: cli.force,
        restore: cli.restore,
    };

    let job = FormatJob::prepare(&opts)?;
    if !job.is_restore() {
        print_report(job.path(), job.capacity(), cli.json)?;
    }
    job.run(&mut entropy_source())?;

    Ok(())
}

fn print_report(location: &Path, capacity: Capacity, json: bool) -> anyhow::Result<()> {
    if json {
        let report = Report { location, capacity };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("location      : {}", location.display());
        println!("{capacity}");
    }
    Ok(())
}
