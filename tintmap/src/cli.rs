//! Command-line interface
//!
//! - `segment`: image in, bundle JSON out (optionally the wall mask PNG)
//! - `palette`: print the extracted palette
//! - `settings`: print default settings, one value, or every key's regen level

use crate::bundle::Bundle;
use crate::error::{TintmapError, TintmapResult};
use crate::io::{read_raster, write_mask_png};
use crate::session::{RepairPoll, Session};
use clap::{Args, Parser, Subcommand};
use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tintmap_core::config::FrontEnd;
use tintmap_core::{SettingKey, Settings};

/// How long `segment --repair` waits for the worker
const REPAIR_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Parser, Debug)]
#[command(name = "tintmap")]
#[command(author, version, about = "Segment line art into leak-proof color regions")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the region map and write a bundle
    Segment {
        /// Input illustration
        input: PathBuf,

        /// Bundle JSON to write
        #[arg(short, long)]
        output: PathBuf,

        /// Also write the wall mask as PNG
        #[arg(long, value_name = "PNG")]
        mask: Option<PathBuf>,

        /// Use the leak-repair pipeline instead of the mask builder
        #[arg(long)]
        repair: bool,

        /// Bundle id (defaults to the input file stem)
        #[arg(long)]
        id: Option<String>,

        #[command(flatten)]
        settings: SettingsArgs,
    },

    /// Print the palette as hex colors
    Palette {
        /// Input illustration
        input: PathBuf,

        /// Random seed for K-means seeding
        #[arg(short, long, default_value_t = 0)]
        seed: u64,

        #[command(flatten)]
        settings: SettingsArgs,
    },

    /// Inspect settings
    Settings {
        /// Print one value by dotted key
        #[arg(long, value_name = "KEY")]
        get: Option<String>,

        /// Print every key with its regen level
        #[arg(long)]
        levels: bool,

        #[command(flatten)]
        settings: SettingsArgs,
    },
}

/// Settings file and overrides shared by every subcommand
#[derive(Args, Debug, Default)]
pub struct SettingsArgs {
    /// Settings JSON file; missing fields take defaults
    #[arg(long, value_name = "JSON")]
    pub config: Option<PathBuf>,

    /// Override a setting, e.g. `--set repair.thicken_px=2`
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub overrides: Vec<String>,
}

impl SettingsArgs {
    /// Load the file, then apply overrides in order
    pub fn resolve(&self) -> TintmapResult<Settings> {
        let mut settings = match &self.config {
            Some(path) => Settings::from_json_str(&fs::read_to_string(path)?)?,
            None => Settings::default(),
        };
        for entry in &self.overrides {
            let (key, value) = entry.split_once('=').ok_or_else(|| {
                tintmap_core::Error::InvalidParameter(format!(
                    "override {:?} is not KEY=VALUE",
                    entry
                ))
            })?;
            settings.set(key.trim(), value)?;
        }
        Ok(settings)
    }
}

/// Run a parsed command line
pub fn run(cli: Cli) -> TintmapResult<()> {
    match cli.command {
        Command::Segment {
            input,
            output,
            mask,
            repair,
            id,
            settings,
        } => {
            let mut settings = settings.resolve()?;
            if repair {
                settings.front_end = FrontEnd::Repair;
            }
            segment(&input, &output, mask.as_deref(), id, settings)
        }
        Command::Palette {
            input,
            seed,
            settings,
        } => {
            let settings = settings.resolve()?;
            let raster = read_raster(&input)?;
            let mut rng = StdRng::seed_from_u64(seed);
            let palette = tintmap_color::extract_palette(&raster, &settings.palette, &mut rng)?;
            for color in palette {
                println!("{}", color);
            }
            Ok(())
        }
        Command::Settings {
            get,
            levels,
            settings,
        } => {
            let settings = settings.resolve()?;
            if let Some(key) = get {
                println!("{}", settings.get(&key)?);
            } else if levels {
                for key in SettingKey::ALL {
                    println!(
                        "{:<55} {:<10} {}",
                        key.path(),
                        format!("{:?}", key.regen_level()).to_lowercase(),
                        settings.get(key.path())?
                    );
                }
            } else {
                println!("{}", settings.to_json_string()?);
            }
            Ok(())
        }
    }
}

fn segment(
    input: &Path,
    output: &Path,
    mask_path: Option<&Path>,
    id: Option<String>,
    settings: Settings,
) -> TintmapResult<()> {
    let raster = read_raster(input)?;
    let mut session = Session::new(settings)?;
    session.load_raster(raster)?;
    if session.pending_generation().is_some() {
        match session.wait_repair(REPAIR_TIMEOUT)? {
            RepairPoll::Committed(stats) => info!(
                "repair: {} endpoints, {} bridges, {} islands removed",
                stats.endpoints, stats.bridges, stats.islands_removed
            ),
            other => {
                return Err(TintmapError::RepairFailed {
                    cause: format!("repair job ended as {:?}", other),
                });
            }
        }
    }

    let scene = session.scene().ok_or(TintmapError::NoScene)?;
    if let Some(path) = mask_path {
        write_mask_png(scene.mask(), path)?;
    }
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "tintmap".to_string());
    let id = id.unwrap_or_else(|| stem.clone());
    let bundle: Bundle = session.export_bundle(&id, &stem)?;
    bundle.write(output)?;
    println!(
        "{}: {}x{}, {} regions, {} palette colors",
        output.display(),
        bundle.manifest.width,
        bundle.manifest.height,
        bundle.layers.regions.max_region_id,
        bundle.palette.len()
    );
    Ok(())
}
