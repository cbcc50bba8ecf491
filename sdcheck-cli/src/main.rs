use anyhow::Result;
use clap::error::ErrorKind;
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::process::ExitCode;

use sdcheck_core::report::Reporter;
use sdcheck_core::verify::{locate_test_dir, verify_all, Layout, SetupError};

const EXIT_FAILED: u8 = 1;
const EXIT_USAGE: u8 = 2;

#[derive(Parser)]
#[command(
    name = "sdcheck",
    version,
    about = "Verify SD card test files written by the storage test firmware",
    after_help = "Point this at the mount point of the SD card after running the test firmware."
)]
struct Cli {
    /// Mount point of the SD card
    mount: PathBuf,
    /// Test directory under the mount point
    #[arg(long, default_value = "__test__")]
    test_dir: String,
    /// Firmware results log inside the test directory
    #[arg(long, default_value = "results.txt")]
    results: String,
    /// Manifest inside the test directory
    #[arg(long, default_value = "manifest.txt")]
    manifest: String,
    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() -> Result<ExitCode> {
    let cli = match Cli::try_parse() {
        Ok(c) => c,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            print!("{}", e.render());
            return Ok(ExitCode::SUCCESS);
        }
        Err(e) => {
            // usage goes to stdout along with the rest of the report
            print!("{}", e.render());
            return Ok(ExitCode::from(EXIT_USAGE));
        }
    };
    init_logging(cli.verbose);

    let layout = Layout { test_dir: cli.test_dir, results_file: cli.results, manifest_file: cli.manifest };
    let test_dir = match locate_test_dir(&cli.mount, &layout) {
        Ok(p) => p,
        Err(e) => {
            println!("Error: {}", e);
            if let SetupError::TestDirMissing { .. } = e {
                println!("Did the test firmware run successfully?");
            }
            return Ok(ExitCode::from(EXIT_USAGE));
        }
    };
    log::info!("verifying {} (test dir {})", cli.mount.display(), test_dir.display());

    let mut rep = Reporter::new(std::io::stdout().lock());
    let tally = verify_all(&cli.mount, &test_dir, &layout, &mut rep)?;
    Ok(if tally.is_success() { ExitCode::SUCCESS } else { ExitCode::from(EXIT_FAILED) })
}
