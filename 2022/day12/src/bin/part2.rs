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

    let steps_n = map
        .min_steps_n_from_lowest_or_err()
        .context("Failed to find a hiking trail from the lowest squares.")?;
    println!("Fewest steps from any lowest square is {}", steps_n);

    Ok(())
}
