//! Inspect a DWG file: version, entity counts by type, handle range.
//!
//! Usage:
//!     inspect <path.dwg>
//!     inspect --version
//!
//! Exit codes: 0 success, 1 decode failure, 2 usage error.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();

    match args.as_slice() {
        [flag] if flag == "--version" => {
            println!("dwgread {}", dwgread::VERSION);
            ExitCode::SUCCESS
        }
        [path] => match inspect(PathBuf::from(path)) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("error: {e:#}");
                ExitCode::from(1)
            }
        },
        _ => {
            eprintln!("usage: inspect <path.dwg> | inspect --version");
            ExitCode::from(2)
        }
    }
}

fn inspect(path: PathBuf) -> anyhow::Result<()> {
    let document = dwgread::convert::read_with_fallback(&path)
        .with_context(|| format!("decoding {}", path.display()))?;

    println!("file:     {}", path.display());
    println!(
        "version:  {} ({})",
        document.version,
        document.version.release_name()
    );

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    let mut min_handle = u64::MAX;
    let mut max_handle = 0u64;
    for entity in document.entities() {
        *counts.entry(entity.dxftype()).or_default() += 1;
        let h = entity.handle().value();
        min_handle = min_handle.min(h);
        max_handle = max_handle.max(h);
    }

    println!("entities: {}", document.entity_count());
    for (dxftype, count) in &counts {
        println!("  {dxftype:<12} {count}");
    }
    if document.entity_count() > 0 {
        println!("handles:  {min_handle:#X} .. {max_handle:#X}");
    }

    let layouts: Vec<&str> = document.layout_names().collect();
    println!("layouts:  {}", layouts.join(", "));

    for warning in document.warnings() {
        eprintln!("warning: {warning}");
    }

    Ok(())
}
