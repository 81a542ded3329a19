use std::path::PathBuf;
use std::process::{self, ExitCode};
use std::time::Instant;
use std::{env, fs};

use genotype_base::{error, utils};
use genotype_base::{Error, GenotypeBase, Schema};

use getopts::Options;

use tracing::info;

//-----------------------------------------------------------------------------

fn main() -> ExitCode {
    utils::init_logging();
    let start_time = Instant::now();

    // Parse arguments.
    let config = Config::new();

    match error::logged("creating the database", run(&config)) {
        Ok(()) => {
            let seconds = start_time.elapsed().as_secs_f64();
            info!("Used {:.3} seconds", seconds);
            ExitCode::SUCCESS
        },
        Err(_) => ExitCode::FAILURE,
    }
}

fn run(config: &Config) -> Result<(), Error> {
    // Check if the database already exists.
    if utils::file_exists(&config.db_file) {
        if config.overwrite {
            info!("Overwriting database {}", config.db_file.display());
            fs::remove_file(&config.db_file)?;
        } else {
            return Err(Error::Exists(config.db_file.clone()));
        }
    }

    // Create the database.
    GenotypeBase::create(&config.db_file, config.schema)?;

    // Statistics.
    let database = GenotypeBase::open(&config.db_file)?;
    let tables = database.tables()?;
    info!("The {} database contains tables {}", database.schema(), tables.join(", "));

    Ok(())
}

//-----------------------------------------------------------------------------

struct Config {
    pub schema: Schema,
    pub db_file: PathBuf,
    pub overwrite: bool,
}

impl Config {
    pub fn new() -> Config {
        let args: Vec<String> = env::args().collect();
        let program = args[0].clone();
        let header = format!("Usage: {} [options] herring|salmon", program);

        let mut opts = Options::new();
        opts.optflag("h", "help", "print this help");
        opts.optopt("o", "output", "output file name (default: <schema>.db)", "FILE");
        opts.optflag("", "overwrite", "overwrite the database file if it exists");
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

        let schema: Schema = if let Some(s) = matches.free.first() {
            match s.parse() {
                Ok(schema) => schema,
                Err(err) => {
                    eprintln!("{}", err);
                    process::exit(1);
                }
            }
        } else {
            eprint!("{}", opts.usage(&header));
            process::exit(1);
        };

        let db_file = match matches.opt_str("o") {
            Some(s) => PathBuf::from(s),
            None => PathBuf::from(format!("{}.db", schema)),
        };
        let overwrite = matches.opt_present("overwrite");

        Config {
            schema,
            db_file,
            overwrite,
        }
    }
}

//-----------------------------------------------------------------------------
