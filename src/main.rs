extern crate clap;
#[macro_use] extern crate log;
extern crate fern;
extern crate chrono;
extern crate regex;
extern crate term_grid;

pub mod assembler;

use clap::{Arg, ArgMatches, App};
use term_grid::{Grid, GridOptions, Direction, Filling, Cell};

use std::path::{Path, PathBuf};

use assembler::catalog::OpcodeCatalog;
use assembler::diagnostics::Diagnostics;

/// Extension given to assembled programs when `-o` is not used.
const OUTPUT_EXTENSION: &str = "pexe";

fn main() {
    let args = process_arguments();
    initialize_logging(args.occurrences_of("verbose"));

    debug!("Arguments:\n\tVerbosity: {}\n\tCheck Only: {}\n\tOutfile: {}\n\tInfile: {}",
        level_for(args.occurrences_of("verbose")),
        args.is_present("check"),
        args.value_of("output").unwrap_or("None"),
        args.value_of("INPUT").unwrap_or("None")
    );

    let catalog = OpcodeCatalog::pippin();

    if args.is_present("list") {
        println!("{}", catalog_grid(&catalog));
    }

    let ipath = match args.value_of("INPUT") {
        Some(ifile) => Path::new(ifile),
        // Listing the instruction set alone is a complete run.
        None => return,
    };

    let opath = match args.value_of("output") {
        Some(filename) => PathBuf::from(filename),
        None => ipath.with_extension(OUTPUT_EXTENSION),
    };
    let opath = if args.is_present("check") { None } else { Some(opath.as_path()) };

    let mut diagnostics = Diagnostics::new();
    let assembly = match assembler::assemble_file(ipath, opath, &catalog, &mut diagnostics) {
        Ok(assembly) => assembly,
        Err(err) => {
            error!("fatal: {}", err);
            std::process::exit(1);
        },
    };

    if !assembly.success {
        for (_, message) in diagnostics.iter() {
            error!("{}", message);
        }
        error!("Stopped assembly of `{}` due to {} error(s).", ipath.display(), diagnostics.len());
        std::process::exit(1);
    }

    if args.is_present("print-debug") {
        let mut grid = Grid::new(GridOptions {
            filling:     Filling::Spaces(1),
            direction:   Direction::LeftToRight,
        });

        for (idx, (source, ins)) in assembly.sections.code.iter().zip(assembly.program.code.iter()).enumerate() {
            grid.add(Cell::from(format!("0x{:04X}:", idx)));
            grid.add(Cell::from(source.to_string()));
            grid.add(Cell::from("=>".to_string()));
            grid.add(Cell::from(ins.to_string()));
        }
        for (source, datum) in assembly.sections.data.iter().zip(assembly.program.data.iter()) {
            grid.add(Cell::from("DATA".to_string()));
            grid.add(Cell::from(source.to_string()));
            grid.add(Cell::from("=>".to_string()));
            grid.add(Cell::from(datum.to_string()));
        }

        println!("{}", grid.fit_into_columns(4));
    }

    info!("Assembled `{}` without errors.", ipath.display());
}

fn process_arguments() -> ArgMatches<'static> {
    App::new(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .arg(Arg::with_name("INPUT")
            .help("Sets the input file to use")
            .required_unless("list")
            .multiple(false)
            .index(1))
        .arg(Arg::with_name("verbose")
            .short("v")
            .multiple(true)
            .takes_value(false)
            .help("Sets the level of verbosity"))
        .arg(Arg::with_name("output")
            .short("o")
            .takes_value(true)
            .help("write output to an outfile"))
        .arg(Arg::with_name("check")
            .short("e")
            .takes_value(false)
            .help("check the source only, write no output"))
        .arg(Arg::with_name("print-debug")
            .short("d")
            .alias("show")
            .alias("s")
            .takes_value(false)
            .help("prints the assembled listing alongside the source to STDOUT"))
        .arg(Arg::with_name("list")
            .short("l")
            .takes_value(false)
            .help("prints the instruction set to STDOUT"))
        .get_matches()
}

/// Lays out every mnemonic with its opcode and the addressing modes it takes.
fn catalog_grid(catalog: &OpcodeCatalog) -> String {
    let mut grid = Grid::new(GridOptions {
        filling:     Filling::Spaces(2),
        direction:   Direction::LeftToRight,
    });

    for mnemonic in catalog.mnemonics() {
        let modes = if catalog.takes_no_argument(mnemonic) {
            "-".to_string()
        } else {
            let mut modes = Vec::with_capacity(3);
            if catalog.accepts_immediate(mnemonic) { modes.push("immediate"); }
            modes.push("direct");
            if catalog.accepts_indirect(mnemonic) { modes.push("indirect"); }
            modes.join(",")
        };
        grid.add(Cell::from(mnemonic.to_string()));
        grid.add(Cell::from(format!("{:X}", catalog.opcode(mnemonic).unwrap_or_default())));
        grid.add(Cell::from(modes));
    }

    grid.fit_into_columns(3).to_string()
}

fn level_for(verbosity: u64) -> log::LevelFilter {
    match verbosity {
        0 => log::LevelFilter::Error,
        1 => log::LevelFilter::Warn,
        2 => log::LevelFilter::Info,
        3 | _ => log::LevelFilter::Debug,
    }
}

fn initialize_logging(verbosity: u64) {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(level_for(verbosity))
        .chain(std::io::stdout())
        .apply().ok();
}
