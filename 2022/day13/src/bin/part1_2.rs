use anyhow::{Context, Result};
use clap::Parser;
use day13::{CLIArgs, DIVIDER_NUMBERS};

fn main() -> Result<()> {
    let args = CLIArgs::parse();
    let packets = day13::read_packets(&args.input_path).with_context(|| {
        format!(
            "Failed to read packets from given file({}).",
            args.input_path.display()
        )
    })?;

    let ordered_sum = day13::sum_of_ordered_pair_indices(&packets);
    println!(
        "The sum of correctly ordered packet pair indices is {}",
        ordered_sum
    );

    let positions = day13::divider_positions(&packets)?;
    for (n, pos) in DIVIDER_NUMBERS.iter().zip(positions) {
        eprintln!("Found divider packet [[{}]] at {}.", n, pos);
    }
    println!("The decoder key is {}", day13::decoder_key(&packets)?);

    Ok(())
}
