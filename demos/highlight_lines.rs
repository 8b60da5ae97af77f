use std::{env, path::PathBuf, process::ExitCode, time::Instant};

use env_logger::Builder;
use log::{error, info};
use runway_lines::OutputDirectory;

fn main() -> ExitCode {
    Builder::from_default_env().format_timestamp_nanos().init();

    let mut args = env::args().skip(1);
    let Some(input) = args.next().map(PathBuf::from) else {
        eprintln!("usage: highlight_lines <image.png|jpg> [output-dir]");
        return ExitCode::FAILURE;
    };
    let output_dir = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("static/uploads"));

    let output = match OutputDirectory::create(&output_dir) {
        Ok(output) => output,
        Err(err) => {
            error!("cannot use {}: {err}", output_dir.display());
            return ExitCode::FAILURE;
        }
    };

    let start = Instant::now();
    match output.process_file(&input) {
        Ok(artifacts) => {
            info!("processed {} in {:?}", input.display(), start.elapsed());
            info!("longest: {}", artifacts.longest);
            info!("second:  {}", artifacts.second);
            println!("{}", artifacts.output_image.display());
            println!("{}", artifacts.edges_image.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
