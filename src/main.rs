use clap::Parser;
use palaeomag_ingest::cli::{args::Args, commands};
use std::process;

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    match commands::run(args) {
        Ok(_summary) => {
            // Success - the summary has already been printed by the command
            process::exit(0);
        }
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("palaeomag-ingest - Palaeomagnetic Measurement File Loader");
    println!("==========================================================");
    println!();
    println!("Read laboratory measurement files from many magnetometers and programs");
    println!("into one canonical record type, and convert them to PuffinPlot format.");
    println!();
    println!("USAGE:");
    println!("    palaeomag-ingest <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    load        Load files and print a summary with diagnostics");
    println!("    convert     Load files and write a PuffinPlot (.ppl) file");
    println!("    formats     List supported file formats and their options");
    println!("    help        Show this help message or help for specific commands");
    println!();
    println!("EXAMPLES:");
    println!("    # Load a directory of 2G files measured with an empty-tray protocol:");
    println!("    palaeomag-ingest load runs/ --protocol TRAY_NORMAL");
    println!();
    println!("    # Convert JR6 files recorded with AGICO orientation parameters:");
    println!("    palaeomag-ingest convert 'site*.jr6' --orientation 12,0,12,90 -o site.ppl");
    println!();
    println!("    # Load a spreadsheet export described by a format definition:");
    println!("    palaeomag-ingest load export.csv --format export-format.txt");
    println!();
    println!("For detailed help on any command, use:");
    println!("    palaeomag-ingest <COMMAND> --help");
}
