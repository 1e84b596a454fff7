//! Build script: renders the `nfs-helper` manual page into `OUT_DIR`.

use std::{env, fs, path::PathBuf};

use clap::CommandFactory;
use clap_mangen::Man;

#[path = "src/cli.rs"]
mod cli;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=src/cli.rs");
    println!("cargo:rerun-if-env-changed=CARGO_PKG_VERSION");

    let cmd = cli::Cli::command();
    let name = cmd.get_name().to_owned();
    let version = env::var("CARGO_PKG_VERSION")
        .map_err(|_| "CARGO_PKG_VERSION must be set by Cargo")?;

    let mut buf = Vec::new();
    Man::new(cmd)
        .section("1")
        .source(format!("{name} {version}"))
        .render(&mut buf)?;

    let out_dir = PathBuf::from(env::var_os("OUT_DIR").ok_or("OUT_DIR must be set by Cargo")?);
    fs::write(out_dir.join(format!("{name}.1")), buf)?;
    Ok(())
}
