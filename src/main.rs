//! diffsim - diffraction & micro-tomography pattern simulator.
//!
//! CLI Usage:
//!   diffsim new-config [config.json]   # write a template configuration
//!   diffsim validate <config.json>     # check a configuration
//!   diffsim simulate <config.json>     # run the scan and export results

use std::path::Path;

use anyhow::{bail, Context, Result};

use diffsim::config::Config;
use diffsim::io::mrc;
use diffsim::physics::Simulation;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let task = args.get(1).map(String::as_str).unwrap_or("");

    match task {
        "new-config" => {
            let path = args.get(2).map(String::as_str).unwrap_or("config.json");
            new_config(Path::new(path))
        }
        "validate" => validate(config_arg(&args)?),
        "simulate" => simulate(config_arg(&args)?),
        _ => {
            eprintln!("usage: diffsim <new-config|validate|simulate> [config.json]");
            std::process::exit(2);
        }
    }
}

fn config_arg(args: &[String]) -> Result<&Path> {
    match args.get(2) {
        Some(path) => Ok(Path::new(path)),
        None => bail!("a config file must be provided for this task"),
    }
}

fn new_config(path: &Path) -> Result<()> {
    if path.exists() {
        bail!("'{}' already exists; refusing to overwrite", path.display());
    }
    Config::default()
        .save(path)
        .with_context(|| format!("cannot write '{}'", path.display()))?;
    log::info!("Template configuration written to '{}'", path.display());
    Ok(())
}

fn validate(path: &Path) -> Result<()> {
    let config = Config::load(path)?;
    config.validate()?;
    if !Path::new(&config.sample.sample_file).is_file() {
        bail!("sample file '{}' not found", config.sample.sample_file);
    }
    log::info!("Configuration '{}' is valid", path.display());
    Ok(())
}

fn simulate(path: &Path) -> Result<()> {
    let config = Config::load(path)?;
    config.validate()?;

    let mut sample = config
        .load_sample()
        .with_context(|| format!("cannot load sample '{}'", config.sample.sample_file))?;
    let beam = config.build_beam()?;
    let screen = config.build_screen()?;
    log::info!(
        "Sample: {} atoms; screen: {}x{} px ({:?}); beam wavelength {:.4} A",
        sample.atoms().len(),
        screen.resolution(),
        screen.resolution(),
        screen.shape(),
        beam.wavelength()
    );

    let mut sim = Simulation::new(&mut sample, &screen, &beam, config.scan_options())?;
    log::info!("Scanning {} image(s)...", sim.image_count());
    sim.full_scan()?;

    let output = Path::new(&config.output.output_file);
    mrc::export_stack(output, &sim)
        .with_context(|| format!("cannot export stack to '{}'", output.display()))?;
    log::info!("Intensity stack written to '{}'", output.display());

    if !config.output.spectra_file.is_empty() {
        let spectra = Path::new(&config.output.spectra_file);
        mrc::export_spectrum(spectra, &sim)
            .with_context(|| format!("cannot export spectrum to '{}'", spectra.display()))?;
        log::info!("Spectrum written to '{}'", spectra.display());
    }

    Ok(())
}
