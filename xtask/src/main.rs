use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use rangefield::infra::catalog::FormCatalog;
use std::path::{Path, PathBuf};
use std::process::Command;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(author, version, about = "Project automation commands", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run cargo nextest with default configuration
    Nextest {
        #[arg(long)]
        profile: Option<String>,
        #[arg(long)]
        release: bool,
    },
    /// Load and build every form catalog (*.toml with [[fields]]) under a directory
    ValidateForms {
        #[arg(long, default_value = "crates/rangefield/assets")]
        dir: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Nextest { profile, release } => run_nextest(profile, release)?,
        Commands::ValidateForms { dir } => validate_forms(&dir)?,
    }
    Ok(())
}

fn run_nextest(profile: Option<String>, release: bool) -> Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.arg("nextest").arg("run");
    if let Some(profile) = profile {
        cmd.arg("--profile").arg(profile);
    }
    if release {
        cmd.arg("--release");
    }
    let status = cmd.status()?;
    if !status.success() {
        bail!("cargo nextest run failed");
    }
    Ok(())
}

fn validate_forms(dir: &Path) -> Result<()> {
    let mut checked = 0;
    let mut failed = 0;
    for entry in WalkDir::new(dir).into_iter().filter_map(|entry| entry.ok()) {
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("toml") {
            continue;
        }
        let contents = std::fs::read_to_string(path)?;
        if !contents.contains("[[fields]]") {
            continue;
        }
        checked += 1;
        match FormCatalog::load(path).and_then(|catalog| catalog.build_form()) {
            Ok(form) => println!("ok    {} ({} fields)", path.display(), form.len()),
            Err(err) => {
                failed += 1;
                println!("error {}: {err:#}", path.display());
            }
        }
    }
    println!("{checked} catalogs checked, {failed} failed");
    if failed > 0 {
        bail!("{failed} form catalogs are invalid");
    }
    Ok(())
}
