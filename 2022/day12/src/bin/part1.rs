use anyhow::{Context, Result};
use clap::Parser;
use day12::CLIArgs;

fn main() -> Result<()> {
    let args = CLIArgs::parse();
    let map = day12::read_map(&args.input_path).with_context(|| {
        format!(
            "Failed to read height map from given file({}).",
            args.input_path.display()
        )
    })?;

    let steps_n = map.shortest_path_len().inspect_err(|_| {
        eprintln!(
            "Searched {}x{} height map without reaching the end square.",
            map.row_n(),
            map.col_n()
        )
    })?;
    println!("Shortest path is {}", steps_n);

    Ok(())
}
