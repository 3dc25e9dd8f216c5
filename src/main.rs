//! # Attercop
//!
//! 🕷️ Attercop turns collected tweet streams into flat records that are ready
//! for analysis or indexing, and prepares tweet text for model training.
//!
//! This project can be used both as a tool to extract or preprocess collections,
//! or as a lib to integrate record access, standardization and extraction into
//! other projects.
//!
//! ## Getting started
//!
//! ```sh
//! attercop 0.3.0
//! tweet processing tool.
//!
//! USAGE:
//!     attercop <SUBCOMMAND>
//!
//! FLAGS:
//!     -h, --help       Prints help information
//!     -V, --version    Prints version information
//!
//! SUBCOMMANDS:
//!     extract       Extract flat records from raw statuses
//!     help          Prints this message or the help of the given subcommand(s)
//!     preprocess    Preprocess training text
//! ```
//!

use structopt::StructOpt;

#[macro_use]
extern crate log;

mod cli;

use attercop::error::Error;
use attercop::pipeline::{ExtractPipeline, Pipeline, PreprocessPipeline};
use attercop::text::PreprocessConfig;
use attercop::tweet::{ExtractOptions, TweetConfig};

fn main() -> Result<(), Error> {
    env_logger::init();

    let opt = cli::Attercop::from_args();
    debug!("cli args\n{:#?}", opt);

    match opt {
        cli::Attercop::Extract(e) => {
            let config = TweetConfig {
                standardizer: e.standardize,
                keywords: e.keywords,
                ..Default::default()
            };
            let options = ExtractOptions {
                media: e.media,
                geo: e.geo,
            };
            let p = ExtractPipeline::new(e.src, e.dst, config, options, e.compact);
            p.run()?;
        }

        cli::Attercop::Preprocess(p) => {
            let config = PreprocessConfig {
                remove_punctuation: p.remove_punctuation,
                standardize_punctuation: p.standardize_punctuation,
                remove_emoji: p.remove_emoji,
                asciify_emoji: p.asciify_emoji,
                replace_url_with: p.replace_url_with,
                replace_user_with: p.replace_user_with,
                replace_email_with: p.replace_email_with,
                asciify: p.asciify,
                lower_case: p.lower_case,
                min_num_chars: p.min_num_chars,
                ..Default::default()
            };
            let pipeline = PreprocessPipeline::new(p.src, p.dst, p.standardize, config);
            pipeline.run()?;
        }
    };
    Ok(())
}
