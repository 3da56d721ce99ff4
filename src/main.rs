// mumr: Find maximal unique matches with an enhanced suffix array
//
// Copyright 2025 mumr contributors.

// Copyrights in this project are retained by contributors. No copyright assignment
// is required to contribute to this project.

// Except as otherwise noted (below and/or in individual files), this
// project is licensed under the Apache License, Version 2.0
// <LICENSE-APACHE> or <http://www.apache.org/licenses/LICENSE-2.0> or
// the MIT license, <LICENSE-MIT> or <http://opensource.org/licenses/MIT>,
// at your option.
//
use std::io::BufWriter;
use std::io::Write;

use clap::Parser;
use log::{info, warn};

use mumr::error::Error;
use mumr::sequence::{self, Sequence};
use mumr::RunConfig;

// Command-line interface
mod cli;

/// Initializes the logger with verbosity given in `log_max_level`.
fn init_log(log_max_level: usize) {
    stderrlog::new()
        .module(module_path!())
        .quiet(false)
        .verbosity(log_max_level)
        .timestamp(stderrlog::Timestamp::Off)
        .init()
        .unwrap();
}

// Reads all records from a fastX file; "-" reads stdin.
fn read_fastx_file(file: &str) -> Result<Vec<(String, Vec<u8>)>, Error> {
    let mut reader = if file == "-" {
        needletail::parse_fastx_stdin()
    } else {
        needletail::parse_fastx_file(file)
    }
    .map_err(|e| Error::InvalidInput(format!("{}: {}", file, e)))?;

    let mut records = Vec::new();
    while let Some(rec) = reader.next() {
        match rec {
            Ok(seqrec) => {
                let id = String::from_utf8_lossy(seqrec.id()).into_owned();
                let name = id.split_ascii_whitespace().next().unwrap_or("").to_string();
                records.push((name, seqrec.seq().into_owned()));
            }
            Err(e) => {
                // Keep whatever parsed so far, skip the rest of the file.
                warn!("{}: {}", file, e);
                break;
            }
        }
    }

    Ok(records)
}

/// Reads all input files into normalized sequences.
///
/// Without the join flag every record becomes its own sequence; with it
/// each file contributes one concatenated genome named after the file.
/// When fewer files than genomes to compare are supplied, stdin fills in
/// the remainder.
fn read_input(cli: &cli::Cli) -> Result<(Vec<Sequence>, bool), Error> {
    if cli.join && cli.seq_files.is_empty() {
        return Err(Error::InvalidInput(
            "in join mode at least one filename needs to be supplied".to_string(),
        ));
    }

    let mut files = cli.seq_files.clone();
    let min_files = if cli.join { 2 } else { 1 };
    while files.len() < min_files {
        files.push("-".to_string());
    }

    let mut sequences = Vec::new();
    let mut non_acgt = false;

    for file in &files {
        let records = read_fastx_file(file)?;
        if cli.join {
            if records.is_empty() {
                continue;
            }
            let joined = sequence::join(records.iter().map(|r| r.1.as_slice()));
            let (seq, flag) = Sequence::new(&sequence::join_name(file), &joined);
            non_acgt |= flag;
            sequences.push(seq);
        } else {
            for (name, bytes) in &records {
                let (seq, flag) = Sequence::new(name, bytes);
                non_acgt |= flag;
                sequences.push(seq);
            }
        }
    }

    Ok((sequences, non_acgt))
}

fn validate(sequences: &[Sequence]) -> Result<(), Error> {
    if sequences.len() < 2 {
        return Err(Error::InvalidInput(format!(
            "with less than two sequences ({} given) there is nothing to compare",
            sequences.len()
        )));
    }

    for seq in sequences {
        if seq.is_empty() {
            return Err(Error::InvalidInput(format!(
                "the sequence {} is empty",
                seq.name
            )));
        }
        if seq.len() > sequence::LENGTH_LIMIT {
            return Err(Error::InvalidInput(format!(
                "the sequence {} is too long; the technical limit is {}",
                seq.name,
                sequence::LENGTH_LIMIT
            )));
        }
    }

    Ok(())
}

fn try_main(cli: &cli::Cli) -> Result<(), Error> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(cli.num_threads)
        .thread_name(|i| format!("rayon-thread-{}", i))
        .build_global()
        .unwrap();

    let (sequences, non_acgt) = read_input(cli)?;
    validate(&sequences)?;

    if non_acgt {
        warn!(
            "The input sequences contained characters other than acgtACGT. \
             These were mapped to N to ensure correct results."
        );
    }
    info!("Comparing {} sequences", sequences.len());

    let config = RunConfig {
        forward: cli.both || !cli.revcomp,
        revcomp: cli.both || cli.revcomp,
        min_length: cli.min_length,
        p_value: cli.p_value,
    };

    let mut out = BufWriter::new(std::io::stdout());
    mumr::run(&sequences, &config, &mut out)?;
    out.flush()?;

    Ok(())
}

fn main() {
    let cli = cli::Cli::parse();
    init_log(match cli.verbose {
        0 => 1,
        1 => 2,
        _ => 3,
    });

    if let Err(e) = try_main(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
