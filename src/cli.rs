//! Command line arguments and parameters management/parsing.
use std::path::PathBuf;

use attercop::text::Standardizer;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "attercop", about = "tweet processing tool.")]
/// Holds every command that is callable by the `attercop` command.
pub enum Attercop {
    #[structopt(about = "Extract flat records from raw statuses")]
    Extract(Extract),
    #[structopt(about = "Preprocess training text")]
    Preprocess(Preprocess),
}

#[derive(Debug, StructOpt)]
/// Extract command and parameters.
pub struct Extract {
    #[structopt(parse(from_os_str), help = "newline-delimited JSON statuses")]
    pub src: PathBuf,
    #[structopt(parse(from_os_str), help = "extraction result destination")]
    pub dst: PathBuf,
    #[structopt(
        long = "standardize",
        default_value = "standardize",
        help = "standardization pipeline applied to texts"
    )]
    pub standardize: Standardizer,
    #[structopt(
        long = "keywords",
        help = "lowercase keywords to match against the pooled record text"
    )]
    pub keywords: Vec<String>,
    #[structopt(long = "geo", help = "resolve geo information")]
    pub geo: bool,
    #[structopt(long = "media", help = "summarize media entities")]
    pub media: bool,
    #[structopt(long = "compact", help = "write the compact indexed shape")]
    pub compact: bool,
}

#[derive(Debug, StructOpt)]
/// Preprocess command and parameters.
pub struct Preprocess {
    #[structopt(parse(from_os_str), help = "source csv with a text column")]
    pub src: PathBuf,
    #[structopt(parse(from_os_str), help = "destination csv")]
    pub dst: PathBuf,
    #[structopt(
        long = "standardize",
        default_value = "standardize",
        help = "standardization pipeline applied before preprocessing"
    )]
    pub standardize: Standardizer,
    #[structopt(long = "remove-punctuation", help = "replace punctuation with spaces")]
    pub remove_punctuation: bool,
    #[structopt(
        long = "standardize-punctuation",
        help = "transliterate punctuation to ascii"
    )]
    pub standardize_punctuation: bool,
    #[structopt(long = "remove-emoji", help = "remove emoji and other symbols")]
    pub remove_emoji: bool,
    #[structopt(
        long = "asciify-emoji",
        help = "replace emoji with :description: tokens"
    )]
    pub asciify_emoji: bool,
    #[structopt(long = "replace-url-with", help = "replacement for the <url> filler")]
    pub replace_url_with: Option<String>,
    #[structopt(long = "replace-user-with", help = "replacement for the @user filler")]
    pub replace_user_with: Option<String>,
    #[structopt(long = "replace-email-with", help = "replacement for the @email filler")]
    pub replace_email_with: Option<String>,
    #[structopt(long = "asciify", help = "transliterate everything to ascii")]
    pub asciify: bool,
    #[structopt(long = "lower-case", help = "lower-case the result")]
    pub lower_case: bool,
    #[structopt(
        long = "min-chars",
        default_value = "0",
        help = "drop rows with fewer characters than this"
    )]
    pub min_num_chars: usize,
}
