use std::error::Error;
use std::path::Path;

use sudoscan::Scanner;
use sudoscan_core::solve;

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <image> [out.json]", args[0]);
        std::process::exit(2);
    }

    let scanner = Scanner::new();
    let outcome = scanner.scan_path(Path::new(&args[1]))?;
    println!("Recognized {} digits:", outcome.board.filled_count());
    print!("{}", outcome.board);

    match solve(&outcome.board) {
        Ok(solved) => {
            println!("\nSolution:");
            print!("{}", solved);
        }
        Err(e) => println!("\nNot solvable as scanned: {}", e),
    }

    if let Some(out_path) = args.get(2) {
        let json = serde_json::to_string_pretty(&outcome)?;
        std::fs::write(out_path, json)?;
        println!("Wrote {out_path}");
    }
    Ok(())
}
