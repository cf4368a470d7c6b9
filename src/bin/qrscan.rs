use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use rayon::prelude::*;

#[derive(Parser)]
#[command(name = "qrscan", version, about = "Decode QR codes from image files")]
struct Cli {
    /// Image files to scan
    #[arg(required = true)]
    images: Vec<PathBuf>,

    /// Print payloads as raw bytes on stdout instead of lossy UTF-8
    #[arg(long)]
    raw: bool,
}

fn scan(path: &PathBuf, raw: bool) -> Result<usize, String> {
    let img = image::open(path).map_err(|e| format!("{}: {e}", path.display()))?;
    let gray = img.to_luma8();
    let (width, height) = gray.dimensions();

    let symbols = qrsight::detect_from_grayscale(gray.as_raw(), width as usize, height as usize);
    for symbol in &symbols {
        if raw {
            use std::io::Write;
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(&symbol.data)
                .and_then(|_| stdout.write_all(b"\n"))
                .map_err(|e| e.to_string())?;
        } else {
            println!(
                "{}: v{} {:?} mask {}: {}",
                path.display(),
                symbol.version,
                symbol.ec_level,
                symbol.mask,
                String::from_utf8_lossy(&symbol.data)
            );
        }
    }
    Ok(symbols.len())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Each decode is single-threaded; files fan out across cores.
    let results: Vec<Result<usize, String>> = cli
        .images
        .par_iter()
        .map(|path| scan(path, cli.raw))
        .collect();

    let mut found = 0usize;
    let mut failed = false;
    for result in results {
        match result {
            Ok(count) => found += count,
            Err(message) => {
                eprintln!("error: {message}");
                failed = true;
            }
        }
    }

    if failed {
        ExitCode::FAILURE
    } else if found == 0 {
        eprintln!("no QR codes found");
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
