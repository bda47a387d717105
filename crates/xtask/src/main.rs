use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "xtask", about = "Lattice maintainer tasks")]
struct Cli {
    #[command(subcommand)]
    command: Option<CommandName>,
}

#[derive(Debug, Default, Subcommand)]
enum CommandName {
    /// Update default_config.toml by running `lattice config generate`.
    #[default]
    UpdateDefaultConfig,
    /// Simulate the built-in page and fail if any block never animates.
    CheckPage {
        /// Virtual time to simulate
        #[arg(long, default_value_t = 8000)]
        duration_ms: u64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or_default() {
        CommandName::UpdateDefaultConfig => update_default_config(),
        CommandName::CheckPage { duration_ms } => check_page(duration_ms),
    }
}

fn update_default_config() -> Result<()> {
    let root = project_root()?;
    let dest = root
        .join("crates")
        .join("lattice-core")
        .join("default_config.toml");

    let output = run_lattice(&root, &["config", "generate"])?;
    fs::write(&dest, &output.stdout)
        .with_context(|| format!("write config to {}", dest.display()))?;

    println!("Updated {}", dest.display());
    Ok(())
}

fn check_page(duration_ms: u64) -> Result<()> {
    let root = project_root()?;
    let duration = duration_ms.to_string();
    let output = run_lattice(&root, &["simulate", "--duration-ms", &duration])?;
    let summary = String::from_utf8_lossy(&output.stdout);

    let stuck: Vec<&str> = summary
        .lines()
        .filter(|line| {
            line.ends_with(": hidden")
                || line.ends_with("(not triggered)")
                || line.starts_with("live: inert")
                || line.starts_with("live: waiting")
        })
        .collect();

    print!("{summary}");
    if !stuck.is_empty() {
        bail!("built-in page has blocks that never animate:\n{}", stuck.join("\n"));
    }
    println!("Built-in page OK");
    Ok(())
}

/// Runs the CLI with a throwaway `LATTICE_HOME` so local config never leaks in.
fn run_lattice(root: &Path, args: &[&str]) -> Result<Output> {
    let home = tempfile::tempdir().context("create temp dir for LATTICE_HOME")?;
    let display = args.join(" ");

    let output = Command::new("cargo")
        .current_dir(root)
        .env("LATTICE_HOME", home.path())
        .args(["run", "--quiet", "-p", "lattice", "--"])
        .args(args)
        .output()
        .with_context(|| format!("run `cargo run -p lattice -- {display}`"))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("`lattice {display}` failed: {stderr}");
    }
    Ok(output)
}

fn project_root() -> Result<PathBuf> {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let root = manifest_dir
        .ancestors()
        .nth(2)
        .context("locate workspace root from CARGO_MANIFEST_DIR")?;
    Ok(root.to_path_buf())
}
