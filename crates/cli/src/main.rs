//! pedalctl — configure EB3-series e-bike controllers from the command
//! line: manage tuning profiles and upload them over a serial port.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use indicatif::ProgressBar;
use tracing_subscriber::EnvFilter;

use openpedelec_profile::{PROFILE_EXTENSION, Profile, scan_dir};
use openpedelec_upload::{UploadOutcome, upload_to_port};
use pedelec_infineon_protocol::{
    ParamClass, ParamId, ParamKind, Value, build_frame, catalog,
};

#[derive(Parser)]
#[command(name = "pedalctl", version, about = "Tune EB3-series e-bike controllers")]
struct Cli {
    /// Profile directory (defaults to the per-user data directory).
    #[arg(long, global = true)]
    profile_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List profiles in the profile directory.
    List,
    /// List supported controller models.
    Models,
    /// Create a profile with default values.
    New {
        name: String,
        /// Controller model index (1-based, see `models`).
        #[arg(long)]
        model: Option<i64>,
    },
    /// Show a profile's parameters.
    Show { name: String },
    /// Change parameter values: `pedalctl set commute battery_current=18.5`.
    Set {
        name: String,
        /// `parameter=value` assignments.
        #[arg(required = true)]
        assignments: Vec<String>,
    },
    /// Duplicate a profile under a derived name.
    Copy { name: String },
    /// Rename a profile (moves its file).
    Rename { name: String, new_name: String },
    /// Delete a profile and its file.
    Delete { name: String },
    /// Print the wire frame for a profile as hex bytes.
    Frame { name: String },
    /// Upload a profile to a controller.
    Upload {
        name: String,
        /// Serial port, e.g. /dev/ttyUSB0 or COM3.
        #[arg(long)]
        port: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let dir = resolve_profile_dir(cli.profile_dir)?;

    match cli.command {
        Command::List => cmd_list(&dir),
        Command::Models => cmd_models(),
        Command::New { name, model } => cmd_new(&dir, &name, model),
        Command::Show { name } => cmd_show(&dir, &name),
        Command::Set { name, assignments } => cmd_set(&dir, &name, &assignments),
        Command::Copy { name } => cmd_copy(&dir, &name),
        Command::Rename { name, new_name } => cmd_rename(&dir, &name, &new_name),
        Command::Delete { name } => cmd_delete(&dir, &name),
        Command::Frame { name } => cmd_frame(&dir, &name),
        Command::Upload { name, port } => cmd_upload(&dir, &name, &port),
    }
}

fn resolve_profile_dir(flag: Option<PathBuf>) -> Result<PathBuf> {
    let dir = match flag {
        Some(dir) => dir,
        None => dirs::data_dir()
            .context("no per-user data directory on this system; pass --profile-dir")?
            .join("openpedelec"),
    };
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create profile directory {}", dir.display()))?;
    Ok(dir)
}

fn load_profile(dir: &std::path::Path, name: &str) -> Result<Profile> {
    let path = if name.ends_with(&format!(".{PROFILE_EXTENSION}")) {
        PathBuf::from(name)
    } else {
        dir.join(format!("{name}.{PROFILE_EXTENSION}"))
    };
    Profile::load(&path).with_context(|| format!("failed to load profile '{name}'"))
}

fn cmd_list(dir: &std::path::Path) -> Result<()> {
    let outcome = scan_dir(dir).context("failed to scan profile directory")?;

    if outcome.profiles.is_empty() && outcome.failures.is_empty() {
        println!("no profiles in {}", dir.display());
        return Ok(());
    }

    println!("{:<8} {}", "MODEL", "PROFILE");
    for profile in &outcome.profiles {
        println!("{:<8} {}", profile.model_name(), profile.description());
    }
    for (path, err) in &outcome.failures {
        eprintln!("skipped {}: {err}", path.display());
    }
    Ok(())
}

fn cmd_models() -> Result<()> {
    println!("{:<6} {}", "INDEX", "MODEL");
    for (i, model) in catalog().models().iter().enumerate() {
        println!("{:<6} {}", i + 1, model.name);
    }
    Ok(())
}

fn cmd_new(dir: &std::path::Path, name: &str, model: Option<i64>) -> Result<()> {
    let mut profile = Profile::new(name);
    if let Some(index) = model {
        catalog()
            .model(index)
            .with_context(|| format!("model index {index} (see `pedalctl models`)"))?;
        let mut session = profile.edit();
        session.set(ParamId::ControllerModel, Value::Int(index));
        session.commit();
    }
    profile.save_in(dir).context("failed to save new profile")?;
    println!(
        "created {} ({})",
        profile.description(),
        profile.model_name()
    );
    Ok(())
}

fn cmd_show(dir: &std::path::Path, name: &str) -> Result<()> {
    let profile = load_profile(dir, name)?;
    println!("{} ({})", profile.description(), profile.model_name());
    for (id, value) in profile.values().iter() {
        let desc = id.descriptor();
        let rendered = match value {
            Value::Int(v) => {
                if id == ParamId::ControllerModel {
                    format!("{v} ({})", catalog().model_name(v))
                } else {
                    format!("{v}")
                }
            }
            Value::Float(v) => format!("{:.*}", desc.precision as usize, v),
        };
        let units = desc.units.unwrap_or("");
        println!("  {:<22} {:>8} {units}", id.name(), rendered);
    }
    Ok(())
}

fn cmd_set(dir: &std::path::Path, name: &str, assignments: &[String]) -> Result<()> {
    let mut profile = load_profile(dir, name)?;
    let mut session = profile.edit();

    for assignment in assignments {
        let (key, text) = assignment
            .split_once('=')
            .with_context(|| format!("'{assignment}' is not of the form parameter=value"))?;
        let id = ParamId::from_name(key.trim())
            .with_context(|| format!("unknown parameter '{key}'"))?;
        let value = parse_assignment(id, text.trim())?;
        let stale = session.set(id, value);
        for dep in stale {
            tracing::debug!(param = %dep, "display value needs recompute");
        }
    }

    session.commit();
    profile.save().context("failed to save profile")?;
    println!("updated {}", profile.description());
    Ok(())
}

fn parse_assignment(id: ParamId, text: &str) -> Result<Value> {
    let desc = id.descriptor();
    let value = match desc.kind {
        ParamKind::Integer => Value::Int(
            text.parse::<i64>()
                .with_context(|| format!("{id}: '{text}' is not an integer"))?,
        ),
        ParamKind::Float => Value::Float(
            text.parse::<f64>()
                .with_context(|| format!("{id}: '{text}' is not a number"))?,
        ),
    };

    let (min, max) = desc.range;
    let v = value.as_f64();
    if v < min || v > max {
        let domain = match desc.class {
            ParamClass::Enumeration => "choice",
            ParamClass::Continuous => desc.units.unwrap_or("value"),
        };
        bail!("{id}: {text} outside the allowed {domain} range {min}..={max}");
    }
    Ok(value)
}

fn cmd_copy(dir: &std::path::Path, name: &str) -> Result<()> {
    let profile = load_profile(dir, name)?;
    let mut copy = profile.duplicate();
    copy.save_in(dir).context("failed to save profile copy")?;
    println!("created {}", copy.description());
    Ok(())
}

fn cmd_rename(dir: &std::path::Path, name: &str, new_name: &str) -> Result<()> {
    let mut profile = load_profile(dir, name)?;
    profile.rename(new_name).context("failed to rename profile")?;
    println!("renamed to {}", profile.description());
    Ok(())
}

fn cmd_delete(dir: &std::path::Path, name: &str) -> Result<()> {
    let mut profile = load_profile(dir, name)?;
    profile.remove().context("failed to delete profile")?;
    println!("deleted {name}");
    Ok(())
}

fn cmd_frame(dir: &std::path::Path, name: &str) -> Result<()> {
    let profile = load_profile(dir, name)?;
    let frame = build_frame(profile.values()).context("failed to encode profile")?;
    for chunk in frame.chunks(8) {
        let hex: Vec<String> = chunk.iter().map(|b| format!("{b:02X}")).collect();
        println!("{}", hex.join(" "));
    }
    Ok(())
}

fn cmd_upload(dir: &std::path::Path, name: &str, port: &str) -> Result<()> {
    let profile = load_profile(dir, name)?;
    let frame = build_frame(profile.values()).context("failed to encode profile")?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_message("connecting");
    let outcome = upload_to_port(port, &frame, |phase| {
        spinner.set_message(phase.to_string());
        spinner.tick();
        true
    })
    .with_context(|| format!("upload to {port} failed"))?;

    match outcome {
        UploadOutcome::Completed => {
            spinner.finish_with_message("settings uploaded successfully");
        }
        UploadOutcome::Cancelled => {
            spinner.finish_with_message("upload cancelled");
        }
    }
    Ok(())
}
