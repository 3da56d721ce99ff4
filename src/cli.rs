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
use clap::Parser;

#[derive(Parser)]
#[command(version)]
#[command(about = "Find maximal unique matches between a reference and query sequences")]
pub struct Cli {
    /// Input FASTA file(s); the first sequence is the reference. Reads
    /// stdin if no files are supplied.
    pub seq_files: Vec<String>,

    // Matching directions
    /// Compute forward and reverse complement matches
    #[arg(short = 'b', help_heading = "Matching")]
    pub both: bool,

    /// Compute only reverse complement matches
    #[arg(short = 'r', help_heading = "Matching")]
    pub revcomp: bool,

    // Input handling
    /// Treat all sequences from one file as a single genome
    #[arg(short = 'j', long = "join", help_heading = "Input")]
    pub join: bool,

    // Anchor filtering
    /// Minimum length of a MUM; derived from the p-value by default
    #[arg(
        short = 'l',
        long = "min-length",
        default_value_t = 0,
        help_heading = "Filtering"
    )]
    pub min_length: usize,

    /// Significance of a MUM
    #[arg(
        short = 'p',
        default_value_t = 0.05,
        value_parser = parse_probability,
        help_heading = "Filtering"
    )]
    pub p_value: f64,

    // Resources
    /// Number of worker threads; 0 uses all available cores
    #[arg(short = 't', long = "threads", default_value_t = 0)]
    pub num_threads: usize,

    // Verbosity
    /// Print additional information; give twice for progress output
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

fn parse_probability(s: &str) -> Result<f64, String> {
    let p: f64 = s
        .parse()
        .map_err(|_| format!("expected a floating point number, but '{}' was given", s))?;
    if (0.0..=1.0).contains(&p) {
        Ok(p)
    } else {
        Err(format!(
            "a probability should be a value between 0 and 1; got {}",
            p
        ))
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
//
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probability_parser_accepts_unit_interval() {
        assert_eq!(parse_probability("0.05"), Ok(0.05));
        assert_eq!(parse_probability("0"), Ok(0.0));
        assert_eq!(parse_probability("1"), Ok(1.0));
        assert!(parse_probability("1.5").is_err());
        assert!(parse_probability("-0.1").is_err());
        assert!(parse_probability("abc").is_err());
    }

    #[test]
    fn defaults() {
        let cli = Cli::parse_from(["mumr", "ref.fna", "query.fna"]);
        assert!(!cli.both);
        assert!(!cli.revcomp);
        assert!(!cli.join);
        assert_eq!(cli.min_length, 0);
        assert_eq!(cli.p_value, 0.05);
        assert_eq!(cli.verbose, 0);
    }
}
