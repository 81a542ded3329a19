use std::path::{Path, PathBuf};
use std::process::{self, ExitCode};
use std::time::Instant;
use std::env;

use genotype_base::{error, utils};
use genotype_base::{Encoding, Error, GenotypeBase, LoadParams};

use getopts::Options;

use tracing::info;

//-----------------------------------------------------------------------------

fn main() -> ExitCode {
    utils::init_logging();
    let start_time = Instant::now();

    // Parse arguments.
    let config = Config::new();

    // Open the database.
    let database = error::logged("opening the database", GenotypeBase::open(&config.db_file));
    let mut database = match database {
        Ok(database) => database,
        Err(_) => return ExitCode::FAILURE,
    };

    // Load the files in order and stop at the first failure.
    for (table, file) in config.inputs.iter() {
        let stage = format!("loading {} into table {}", file.display(), table);
        if error::logged(&stage, load(&mut database, table, file, &config.params)).is_err() {
            return ExitCode::FAILURE;
        }
    }

    // Statistics.
    let size = database.file_size().unwrap_or(String::from("unknown"));
    info!("Final database size: {}", size);

    let seconds = start_time.elapsed().as_secs_f64();
    info!("Used {:.3} seconds", seconds);
    ExitCode::SUCCESS
}

fn load(database: &mut GenotypeBase, table: &str, file: &Path, params: &LoadParams) -> Result<(), Error> {
    database.load_table(table, file, params)?;
    let rows = database.rows(table)?;
    info!("Table {} now contains {} rows", table, rows);
    Ok(())
}

//-----------------------------------------------------------------------------

struct Config {
    pub db_file: PathBuf,
    pub inputs: Vec<(String, PathBuf)>,
    pub params: LoadParams,
}

impl Config {
    pub fn new() -> Config {
        let mut params = LoadParams::default();

        let args: Vec<String> = env::args().collect();
        let program = args[0].clone();
        let header = format!("Usage: {} [options] database.db TABLE=FILE [TABLE=FILE ...]", program);

        let mut opts = Options::new();
        opts.optflag("h", "help", "print this help");
        opts.optopt("d", "delimiter", "field delimiter (default: ;)", "CHAR");
        opts.optflag("", "latin1", "input files are Latin-1 instead of UTF-8");
        let batch_desc = format!("number of rows per transaction (default: {})", params.batch_size);
        opts.optopt("b", "batch-size", &batch_desc, "INT");
        let matches = match opts.parse(&args[1..]) {
            Ok(m) => m,
            Err(f) => {
                eprintln!("{}", f);
                process::exit(1);
            }
        };

        if matches.opt_present("h") {
            eprint!("{}", opts.usage(&header));
            process::exit(0);
        }
        if matches.free.len() < 2 {
            eprint!("{}", opts.usage(&header));
            process::exit(1);
        }
        let db_file = PathBuf::from(&matches.free[0]);

        let mut inputs: Vec<(String, PathBuf)> = Vec::new();
        for arg in matches.free[1..].iter() {
            match arg.split_once('=') {
                Some((table, file)) if !table.is_empty() && !file.is_empty() => {
                    inputs.push((table.to_string(), PathBuf::from(file)));
                },
                _ => {
                    eprintln!("Invalid input {} (expected TABLE=FILE)", arg);
                    process::exit(1);
                }
            }
        }

        // Parameters.
        if let Some(s) = matches.opt_str("d") {
            match utils::parse_delimiter(&s) {
                Some(delimiter) => params.delimiter = delimiter,
                None => {
                    eprintln!("Invalid delimiter: {}", s);
                    process::exit(1);
                }
            }
        }
        if matches.opt_present("latin1") {
            params.encoding = Encoding::Latin1;
        }
        if let Some(s) = matches.opt_str("b") {
            match s.parse::<usize>() {
                Ok(size) if size > 0 => params.batch_size = size,
                _ => {
                    eprintln!("Invalid batch size: {}", s);
                    process::exit(1);
                }
            }
        }

        Config {
            db_file,
            inputs,
            params,
        }
    }
}

//-----------------------------------------------------------------------------
