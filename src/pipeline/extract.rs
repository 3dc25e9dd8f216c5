/*! Record extraction pipeline.

Reads newline-delimited JSON status records, builds a [`TweetView`] per
record against a shared [`TweetConfig`] and writes one extracted record per
line. Records that fail to parse or serialize are logged and skipped, never
failing the batch. Extraction runs in parallel; the output keeps the input
order.
!*/
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;

use log::{error, info, warn};
use rayon::prelude::*;
use serde_json::Value;

use crate::error::Error;
use crate::pipeline::pipeline::Pipeline;
use crate::tweet::{ExtractOptions, TweetConfig, TweetView};

pub struct ExtractPipeline {
    src: PathBuf,
    dst: PathBuf,
    config: TweetConfig,
    options: ExtractOptions,
    compact: bool,
}

impl ExtractPipeline {
    pub fn new(
        src: PathBuf,
        dst: PathBuf,
        config: TweetConfig,
        options: ExtractOptions,
        compact: bool,
    ) -> Self {
        if options.geo && config.geocoder.is_none() && config.regions.is_none() {
            warn!("geo extraction requested without geo collaborators, most records will resolve empty");
        }
        Self {
            src,
            dst,
            config,
            options,
            compact,
        }
    }

    /// Extracts a single line. Parse and serialization failures are logged
    /// with their line number and skipped.
    fn process_line(&self, number: usize, line: &str) -> Option<String> {
        if line.trim().is_empty() {
            return None;
        }
        let raw: Value = match serde_json::from_str(line) {
            Ok(raw) => raw,
            Err(e) => {
                error!("line {}: {:?}", number, e);
                return None;
            }
        };
        let view = TweetView::new(Some(&raw), &self.config);
        let serialized = if self.compact {
            serde_json::to_string(&view.extract_compact(&self.options))
        } else {
            serde_json::to_string(&view.extract(&self.options))
        };
        match serialized {
            Ok(serialized) => Some(serialized),
            Err(e) => {
                error!("line {}: {:?}", number, e);
                None
            }
        }
    }
}

impl Pipeline<()> for ExtractPipeline {
    fn run(&self) -> Result<(), Error> {
        let reader = BufReader::new(File::open(&self.src)?);
        let lines: Vec<String> = reader.lines().collect::<Result<_, _>>()?;
        info!("extracting {} records from {:?}", lines.len(), self.src);

        let records: Vec<String> = lines
            .par_iter()
            .enumerate()
            .filter_map(|(index, line)| self.process_line(index + 1, line))
            .collect();

        let skipped = lines.len() - records.len();
        if skipped > 0 {
            warn!("skipped {} lines", skipped);
        }

        let mut writer = BufWriter::new(File::create(&self.dst)?);
        for record in &records {
            writeln!(writer, "{}", record)?;
        }
        info!("wrote {} records to {:?}", records.len(), self.dst);
        Ok(())
    }
}
