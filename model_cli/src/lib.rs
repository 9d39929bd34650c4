use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};

use model_core::export::TableFormat;
use model_core::operations::Request;
use model_core::params::{BuildingParameters, StructuralSystem};
use model_core::units::LengthUnit;

#[derive(Parser)]
#[command(name = "bayline")]
#[command(about = "Bayline: parametric structural model generator", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Generator configuration (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Generate a model and write the DXF drawing and analysis tables
    Generate {
        /// Parameters JSON file ("-" for stdin); the reference building when absent
        #[arg(short, long)]
        params: Option<PathBuf>,

        #[command(flatten)]
        overrides: ParameterOverrides,

        /// Output directory (overrides the configuration)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Artifact file stem
        #[arg(long)]
        stem: Option<String>,

        /// Table format: json, text or xlsx
        #[arg(short, long)]
        format: Option<String>,

        /// Build and summarize without writing files
        #[arg(long)]
        dry_run: bool,
    },

    /// Normalize parameters and report the first invalid field
    Validate {
        #[arg(short, long)]
        params: Option<PathBuf>,

        #[command(flatten)]
        overrides: ParameterOverrides,
    },

    /// Show load cases and expanded combinations of a profile
    Combos {
        /// Profile identifier (configured default when absent)
        #[arg(short, long)]
        profile: Option<String>,

        #[arg(short, long, default_value = "shear_wall")]
        system: String,
    },

    /// List design-code profiles
    Profiles,

    /// List concrete grades
    Materials,

    /// Print the reference building parameters
    Reference,

    /// Run a JSON request (file or stdin) and print the JSON response
    Request {
        file: Option<PathBuf>,
    },
}

/// Per-field overrides applied on top of the parameters file
#[derive(clap::Args, Debug, PartialEq, Default)]
pub struct ParameterOverrides {
    #[arg(long)]
    pub floors: Option<i64>,

    #[arg(long)]
    pub length: Option<f64>,

    #[arg(long)]
    pub width: Option<f64>,

    #[arg(long)]
    pub floor_height: Option<f64>,

    #[arg(long)]
    pub wall_thickness: Option<f64>,

    #[arg(long)]
    pub slab_thickness: Option<f64>,

    /// Length unit of every dimension: m, mm or ft
    #[arg(long)]
    pub units: Option<String>,

    /// shear_wall, moment_frame or dual
    #[arg(long)]
    pub system: Option<String>,

    /// Target shear-wall coverage ratio
    #[arg(long)]
    pub ratio: Option<f64>,

    #[arg(long)]
    pub grade: Option<String>,

    /// Design-code profile identifier
    #[arg(long)]
    pub code: Option<String>,
}

impl ParameterOverrides {
    pub fn apply(&self, params: &mut BuildingParameters) -> Result<()> {
        if let Some(v) = self.floors {
            params.floors = v;
        }
        if let Some(v) = self.length {
            params.length = v;
        }
        if let Some(v) = self.width {
            params.width = v;
        }
        if let Some(v) = self.floor_height {
            params.floor_height = v;
        }
        if let Some(v) = self.wall_thickness {
            params.wall_thickness = v;
        }
        if let Some(v) = self.slab_thickness {
            params.slab_thickness = Some(v);
        }
        if let Some(u) = &self.units {
            params.units = LengthUnit::from_str_flexible(u).ok_or_else(|| anyhow!("unknown unit '{}'", u))?;
        }
        if let Some(s) = &self.system {
            params.structural_system = StructuralSystem::from_str_flexible(s)?;
        }
        if let Some(v) = self.ratio {
            params.shear_wall_ratio = Some(v);
        }
        if let Some(g) = &self.grade {
            params.concrete_grade = g.clone();
        }
        if let Some(c) = &self.code {
            params.design_code = c.clone();
        }
        Ok(())
    }
}

/// Read a file, or stdin when the path is "-" or absent
pub fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(p) if p != Path::new("-") => {
            fs::read_to_string(p).with_context(|| format!("reading {}", p.display()))
        }
        _ => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text).context("reading stdin")?;
            Ok(text)
        }
    }
}

fn load_parameters(path: Option<&Path>, overrides: &ParameterOverrides) -> Result<BuildingParameters> {
    let mut params = match path {
        Some(p) => {
            let text = read_input(Some(p))?;
            serde_json::from_str(&text).context("parsing building parameters")?
        }
        None => BuildingParameters::reference_building(),
    };
    overrides.apply(&mut params)?;
    Ok(params)
}

impl Commands {
    /// Translate the command line into a typed request
    pub fn to_request(&self) -> Result<Request> {
        Ok(match self {
            Commands::Generate {
                params,
                overrides,
                output_dir,
                stem,
                format,
                dry_run,
            } => {
                let table_format = format
                    .as_deref()
                    .map(|f| TableFormat::from_str_flexible(f).ok_or_else(|| anyhow!("unknown table format '{}'", f)))
                    .transpose()?;
                Request::Generate {
                    parameters: load_parameters(params.as_deref(), overrides)?,
                    output_dir: output_dir.clone(),
                    stem: stem.clone(),
                    table_format,
                    write: !dry_run,
                }
            }
            Commands::Validate { params, overrides } => Request::ValidateParameters {
                parameters: load_parameters(params.as_deref(), overrides)?,
            },
            Commands::Combos { profile, system } => Request::LoadCombinations {
                profile: profile.clone(),
                structural_system: StructuralSystem::from_str_flexible(system)?,
            },
            Commands::Profiles => Request::ListProfiles,
            Commands::Materials => Request::ListMaterials,
            Commands::Reference => Request::ReferenceBuilding,
            Commands::Request { file } => {
                let text = read_input(file.as_deref())?;
                serde_json::from_str(&text).context("parsing request")?
            }
        })
    }
}
