use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process::{self, ExitCode};
use std::time::Instant;
use std::env;

use genotype_base::{error, export, utils};
use genotype_base::{Error, ExportParams, GenotypeBase};

use getopts::Options;

use tracing::info;

//-----------------------------------------------------------------------------

fn main() -> ExitCode {
    utils::init_logging();
    let start_time = Instant::now();

    // Parse arguments.
    let config = Config::new();

    match error::logged("exporting genotypes", run(&config)) {
        Ok(()) => {
            let seconds = start_time.elapsed().as_secs_f64();
            info!("Used {:.3} seconds", seconds);
            ExitCode::SUCCESS
        },
        Err(_) => ExitCode::FAILURE,
    }
}

fn run(config: &Config) -> Result<(), Error> {
    // Open the database and build the table.
    let database = GenotypeBase::open(&config.db_file)?;
    let table = database.genotype_table()?;

    let mut params = ExportParams::for_schema(database.schema());
    if let Some(delimiter) = config.delimiter {
        params.delimiter = delimiter;
    }

    // Delimited output.
    match &config.output {
        Some(filename) => {
            info!("Writing {} genotype rows to {}", table.len(), filename.display());
            let file = File::create(filename)?;
            export::write_delimited(&table, &params, BufWriter::new(file))?;
        },
        None => {
            let stdout = io::stdout();
            export::write_delimited(&table, &params, stdout.lock())?;
        },
    }

    Ok(())
}

//-----------------------------------------------------------------------------

struct Config {
    pub db_file: PathBuf,
    pub output: Option<PathBuf>,
    pub delimiter: Option<u8>,
}

impl Config {
    pub fn new() -> Config {
        let args: Vec<String> = env::args().collect();
        let program = args[0].clone();
        let header = format!("Usage: {} [options] database.db", program);

        let mut opts = Options::new();
        opts.optflag("h", "help", "print this help");
        opts.optopt("o", "output", "output file name (default: stdout)", "FILE");
        opts.optopt("d", "delimiter", "field delimiter (default: ;)", "CHAR");
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

        let db_file = if let Some(s) = matches.free.first() {
            PathBuf::from(s)
        } else {
            eprint!("{}", opts.usage(&header));
            process::exit(1);
        };
        let output = matches.opt_str("o").map(PathBuf::from);

        let mut delimiter: Option<u8> = None;
        if let Some(s) = matches.opt_str("d") {
            match utils::parse_delimiter(&s) {
                Some(d) => delimiter = Some(d),
                None => {
                    eprintln!("Invalid delimiter: {}", s);
                    process::exit(1);
                }
            }
        }

        Config {
            db_file,
            output,
            delimiter,
        }
    }
}

//-----------------------------------------------------------------------------
