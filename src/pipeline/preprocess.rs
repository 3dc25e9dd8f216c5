/*! Training data preprocessing pipeline.

Reads a CSV with a `text` column, standardizes and preprocesses every row
and writes the result back out, dropping rows whose preprocessed text comes
back empty. All other columns pass through untouched.
!*/
use std::path::PathBuf;

use log::{error, info, warn};

use crate::error::Error;
use crate::pipeline::pipeline::Pipeline;
use crate::text::{preprocess, PreprocessConfig, Standardizer};

pub struct PreprocessPipeline {
    src: PathBuf,
    dst: PathBuf,
    standardizer: Standardizer,
    config: PreprocessConfig,
}

impl PreprocessPipeline {
    pub fn new(
        src: PathBuf,
        dst: PathBuf,
        standardizer: Standardizer,
        config: PreprocessConfig,
    ) -> Self {
        Self {
            src,
            dst,
            standardizer,
            config,
        }
    }
}

impl Pipeline<()> for PreprocessPipeline {
    fn run(&self) -> Result<(), Error> {
        let mut reader = csv::Reader::from_path(&self.src)?;
        let headers = reader.headers()?.clone();
        let text_index = headers
            .iter()
            .position(|header| header == "text")
            .ok_or_else(|| Error::Custom(format!("no text column in {:?}", self.src)))?;

        let mut writer = csv::Writer::from_path(&self.dst)?;
        writer.write_record(&headers)?;

        let mut kept = 0usize;
        let mut dropped = 0usize;
        let mut malformed = 0usize;
        for record in reader.records() {
            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    error!("skipping malformed csv row: {:?}", e);
                    malformed += 1;
                    continue;
                }
            };
            let text = record.get(text_index).unwrap_or("");
            let text = preprocess(&self.standardizer.apply(text), &self.config, None);
            if text.is_empty() {
                dropped += 1;
                continue;
            }
            let row: Vec<&str> = record
                .iter()
                .enumerate()
                .map(|(index, field)| {
                    if index == text_index {
                        text.as_str()
                    } else {
                        field
                    }
                })
                .collect();
            writer.write_record(&row)?;
            kept += 1;
        }
        writer.flush()?;

        if malformed > 0 {
            warn!("skipped {} malformed rows", malformed);
        }
        info!("kept {} rows, dropped {} with empty preprocessed text", kept, dropped);
        Ok(())
    }
}
