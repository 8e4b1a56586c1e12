//! datum CLI - check designs and inspect resolved anchor frames.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use datum::{Assembly, BuildConfig};
use datum_ir::Design;
use datum_kernel::{AnalyticKernel, SolidId};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod report;
mod settings;

use report::{write_records, FrameRecord};
use settings::{Format, Settings};

#[derive(Parser)]
#[command(name = "datum")]
#[command(about = "Resolve anchors and frames of declarative assemblies", long_about = None)]
struct Cli {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// TOML config with [build] and [output] tables
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a design and report whether every reference resolves
    Check {
        /// Design file (.json or .toml)
        design: PathBuf,
    },
    /// Print every resolved anchor
    Resolve {
        /// Design file (.json or .toml)
        design: PathBuf,
        /// Only anchors of this part
        #[arg(short, long)]
        part: Option<String>,
        /// Output format (default from config, else table)
        #[arg(short, long, value_enum)]
        format: Option<Format>,
    },
    /// Print one frame by reference path
    Frame {
        /// Design file (.json or .toml)
        design: PathBuf,
        /// Reference path, e.g. `base.face_top` or a part name
        path: String,
        /// Output format (default from config, else table)
        #[arg(short, long, value_enum)]
        format: Option<Format>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let stdout = std::io::stdout();
    run(cli, &mut stdout.lock())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli, out: &mut impl Write) -> Result<()> {
    let settings = Settings::load(cli.config.as_deref())?;
    debug!(?settings, "loaded settings");

    match cli.command {
        Commands::Check { design } => {
            let (doc, assembly) = build(&design, &settings.build)?;
            writeln!(
                out,
                "{}: ok ({} parts, {} anchors)",
                doc.name.as_deref().unwrap_or("design"),
                assembly.parts().len(),
                assembly.registry().len()
            )?;
        }
        Commands::Resolve {
            design,
            part,
            format,
        } => {
            let (_, assembly) = build(&design, &settings.build)?;
            let records: Vec<FrameRecord> = match &part {
                Some(name) => {
                    let placed = assembly
                        .part(name)
                        .with_context(|| format!("no part named `{name}`"))?;
                    std::iter::once(FrameRecord::new(name.as_str(), "part", placed.placement()))
                        .chain(assembly.anchors_of(name).map(FrameRecord::from_anchor))
                        .collect()
                }
                None => assembly
                    .registry()
                    .iter()
                    .map(FrameRecord::from_anchor)
                    .collect(),
            };
            write_records(
                out,
                &records,
                format.unwrap_or(settings.output.format),
                settings.output.precision,
            )?;
        }
        Commands::Frame {
            design,
            path,
            format,
        } => {
            let (_, assembly) = build(&design, &settings.build)?;
            let frame = assembly.resolve(&path)?;
            let kind = match assembly.registry().get(&path) {
                Some(anchor) => FrameRecord::from_anchor(anchor).kind,
                None => "part",
            };
            write_records(
                out,
                &[FrameRecord::new(path.as_str(), kind, &frame)],
                format.unwrap_or(settings.output.format),
                settings.output.precision,
            )?;
        }
    }
    Ok(())
}

fn build(path: &Path, config: &BuildConfig) -> Result<(Design, Assembly<SolidId>)> {
    let design =
        Design::load(path).with_context(|| format!("failed to load {}", path.display()))?;
    info!(
        design = %path.display(),
        parts = design.part_count(),
        declarations = design.declarations.len(),
        "loaded design"
    );
    let mut kernel = AnalyticKernel::new();
    let assembly = Assembly::from_design(&mut kernel, &design, config)
        .with_context(|| format!("failed to resolve {}", path.display()))?;
    Ok((design, assembly))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOWER: &str = r#"
name = "tower"

[[declarations]]
[declarations.part]
name = "base"
shape = { type = "Box", size = { x = 10.0, y = 10.0, z = 20.0 } }

[[declarations]]
[declarations.part]
name = "lid"
shape = { type = "Box", size = { x = 10.0, y = 10.0, z = 2.0 } }
at = { target = "base.face_top", offset = [0.0, 0.0, 5.0] }
"#;

    fn design_file(text: &str, ext: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(ext).tempfile().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file
    }

    fn run_args(args: &[&str]) -> Result<String> {
        let cli = Cli::try_parse_from(std::iter::once("datum").chain(args.iter().copied()))?;
        let mut out = Vec::new();
        run(cli, &mut out)?;
        Ok(String::from_utf8(out)?)
    }

    #[test]
    fn check_reports_counts() {
        let file = design_file(TOWER, ".toml");
        let path = file.path().to_str().unwrap();
        let text = run_args(&["check", path]).unwrap();
        assert_eq!(text.trim(), "tower: ok (2 parts, 22 anchors)");
    }

    #[test]
    fn frame_of_part_is_its_placement() {
        let file = design_file(TOWER, ".toml");
        let path = file.path().to_str().unwrap();
        let text = run_args(&["frame", path, "lid", "--format", "json"]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value[0]["kind"], "part");
        assert_eq!(value[0]["origin"][2], 25.0);
    }

    #[test]
    fn resolve_one_part_as_table() {
        let file = design_file(TOWER, ".toml");
        let path = file.path().to_str().unwrap();
        let text = run_args(&["resolve", path, "--part", "lid"]).unwrap();
        let lines: Vec<_> = text.lines().collect();
        // header, placement, eleven auto-anchors
        assert_eq!(lines.len(), 13);
        assert!(lines[1].starts_with("lid "));
        assert!(text.contains("lid.face_top"));
        assert!(!text.contains("base."));
    }

    #[test]
    fn config_sets_default_format() {
        let design = design_file(TOWER, ".toml");
        let config = design_file("[output]\nformat = \"json\"\n", ".toml");
        let text = run_args(&[
            "--config",
            config.path().to_str().unwrap(),
            "frame",
            design.path().to_str().unwrap(),
            "base.face_top",
        ])
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value[0]["kind"], "auto");
    }

    #[test]
    fn resolution_errors_carry_context() {
        let broken = TOWER.replace("base.face_top", "ghost.face_top");
        let file = design_file(&broken, ".toml");
        let err = run_args(&["check", file.path().to_str().unwrap()]).unwrap_err();
        let chain = format!("{err:#}");
        assert!(chain.contains("failed to resolve"), "{chain}");
        assert!(chain.contains("ghost.face_top"), "{chain}");
    }

    #[test]
    fn unknown_part_and_unknown_extension() {
        let file = design_file(TOWER, ".toml");
        let path = file.path().to_str().unwrap();
        assert!(run_args(&["resolve", path, "--part", "nope"]).is_err());

        let odd = design_file(TOWER, ".yaml");
        assert!(run_args(&["check", odd.path().to_str().unwrap()]).is_err());
    }
}
