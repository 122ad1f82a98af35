use std::env;
use std::process;
use std::sync::Arc;

use log::warn;

use mzimport::centroid::RecursiveCentroidingMethod;
use mzimport::{DataPointStore, ImportError, Method, RawFileImportMethod, SpectrumType};

const USAGE: &str = "usage: mzimport [--centroid <noise-level>] <file.mzML|file.mzXML> ...";

/// Accepted m/z width of a centroided peak, matching the defaults used for
/// orbitrap-resolution profile data.
const PEAK_WIDTH_RANGE: (f64, f64) = (0.001, 1.0);

fn main() {
    env_logger::init();

    let mut noise_level: Option<f32> = None;
    let mut paths: Vec<String> = Vec::new();
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--centroid" => match args.next().and_then(|level| level.parse().ok()) {
                Some(level) => noise_level = Some(level),
                None => {
                    eprintln!("{USAGE}");
                    process::exit(2);
                }
            },
            "-h" | "--help" => {
                println!("{USAGE}");
                return;
            }
            _ => paths.push(arg),
        }
    }
    if paths.is_empty() {
        eprintln!("{USAGE}");
        process::exit(2);
    }

    let store = Arc::new(DataPointStore::new());
    for path in &paths {
        if let Err(error) = summarize(path, &store, noise_level) {
            eprintln!("{path}: {error}");
            process::exit(1);
        }
    }
}

fn summarize(
    path: &str,
    store: &Arc<DataPointStore>,
    noise_level: Option<f32>,
) -> Result<(), ImportError> {
    let mut importer = RawFileImportMethod::new(path, store.clone());
    let Some(raw_file) = importer.execute()? else {
        return Ok(());
    };
    println!(
        "{}: {} format, {} scans, {} MS functions",
        raw_file.name,
        raw_file.format,
        raw_file.scans.len(),
        raw_file.functions.len()
    );

    for scan in &raw_file.scans {
        let description = match scan.mz_range {
            Some((low, high)) => format!(
                "m/z {:.4}-{:.4}, TIC {:.4e}",
                low, high, scan.tic
            ),
            None => "empty".to_string(),
        };
        println!(
            "  scan {:>6} ms{} {:?} {}",
            scan.scan_number.map(|n| n.to_string()).unwrap_or_default(),
            scan.function.ms_level.unwrap_or(1),
            scan.spectrum_type,
            description
        );

        if let Some(noise_level) = noise_level {
            if scan.spectrum_type == Some(SpectrumType::Profile) {
                let mut centroider =
                    RecursiveCentroidingMethod::new(scan, store, noise_level, PEAK_WIDTH_RANGE);
                match centroider.execute() {
                    Ok(Some(centroided)) => {
                        let mut peaks = mzimport::SpectrumDataPoints::new();
                        centroided.data_points(store, &mut peaks).ok();
                        println!(
                            "         -> centroided to {} peaks, TIC {:.4e}",
                            peaks.len(),
                            centroided.tic
                        );
                    }
                    Ok(None) => {}
                    Err(error) => warn!("centroiding scan {:?} failed: {error}", scan.scan_number),
                }
            }
        }
    }
    Ok(())
}
