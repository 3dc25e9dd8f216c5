/*! Named standardization pipelines.

Fixed compositions of the atomic transforms, applied as a unit. Every
pipeline short-circuits empty input to `""` and collapses whitespace
once on its final result. Selection by name goes through
[`Standardizer`], which rejects unknown names when the configuration is
built rather than at first use.
!*/
use std::str::FromStr;

use crate::error::Error;
use crate::text::atomic::{
    anonymize_text, collapse_whitespace, parse_html_emoji, separate_hashtags, standardize_text,
    EMAIL_FILLER, URL_FILLER, USER_FILLER,
};

/// Unescapes, strips control characters and NFKC-normalizes.
pub fn standardize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    collapse_whitespace(&standardize_text(text))
}

/// Decodes HTML emoji spans and splits adjacent hashtags before
/// standardizing.
pub fn standardize_html(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let text = parse_html_emoji(text);
    let text = separate_hashtags(&text);
    collapse_whitespace(&standardize_text(&text))
}

/// Standardizes, then replaces URLs, mentions and emails with the
/// default fillers.
pub fn standardize_anonymize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let text = standardize_text(text);
    let text = anonymize_text(&text, URL_FILLER, USER_FILLER, EMAIL_FILLER);
    collapse_whitespace(&text)
}

/// Decodes HTML emoji spans and splits adjacent hashtags before
/// standardizing and anonymizing.
pub fn standardize_anonymize_html(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let text = parse_html_emoji(text);
    let text = separate_hashtags(&text);
    let text = standardize_text(&text);
    let text = anonymize_text(&text, URL_FILLER, USER_FILLER, EMAIL_FILLER);
    collapse_whitespace(&text)
}

/// Splits adjacent hashtags before standardizing and anonymizing,
/// without HTML emoji decoding.
pub fn separate_hashtags_standardize_anonymize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let text = separate_hashtags(text);
    let text = standardize_text(&text);
    let text = anonymize_text(&text, URL_FILLER, USER_FILLER, EMAIL_FILLER);
    collapse_whitespace(&text)
}

/// Standardization pipeline selection.
///
/// A closed set of named pipelines. Configuration code parses the name
/// once via [`FromStr`]; an unknown name is a configuration error, not
/// a runtime one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Standardizer {
    /// Leaves text untouched.
    #[default]
    Identity,
    Standardize,
    StandardizeHtml,
    StandardizeAnonymize,
    StandardizeAnonymizeHtml,
    SeparateHashtagsStandardizeAnonymize,
}

impl Standardizer {
    /// Runs the selected pipeline on `text`.
    pub fn apply(&self, text: &str) -> String {
        match self {
            Standardizer::Identity => text.to_string(),
            Standardizer::Standardize => standardize(text),
            Standardizer::StandardizeHtml => standardize_html(text),
            Standardizer::StandardizeAnonymize => standardize_anonymize(text),
            Standardizer::StandardizeAnonymizeHtml => standardize_anonymize_html(text),
            Standardizer::SeparateHashtagsStandardizeAnonymize => {
                separate_hashtags_standardize_anonymize(text)
            }
        }
    }

    /// Get the configuration name of the pipeline.
    pub fn name(&self) -> &'static str {
        match self {
            Standardizer::Identity => "identity",
            Standardizer::Standardize => "standardize",
            Standardizer::StandardizeHtml => "standardize_html",
            Standardizer::StandardizeAnonymize => "standardize_anonymize",
            Standardizer::StandardizeAnonymizeHtml => "standardize_anonymize_html",
            Standardizer::SeparateHashtagsStandardizeAnonymize => {
                "separate_hashtags_standardize_anonymize"
            }
        }
    }
}

impl FromStr for Standardizer {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "identity" => Ok(Standardizer::Identity),
            "standardize" => Ok(Standardizer::Standardize),
            "standardize_html" => Ok(Standardizer::StandardizeHtml),
            "standardize_anonymize" => Ok(Standardizer::StandardizeAnonymize),
            "standardize_anonymize_html" => Ok(Standardizer::StandardizeAnonymizeHtml),
            "separate_hashtags_standardize_anonymize" => {
                Ok(Standardizer::SeparateHashtagsStandardizeAnonymize)
            }
            unknown => Err(Error::UnknownStandardizer(unknown.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_short_circuit() {
        assert_eq!(standardize(""), "");
        assert_eq!(standardize_anonymize_html(""), "");
    }

    #[test]
    fn standardize_unescapes_and_collapses() {
        assert_eq!(standardize("fish &amp;\u{0} chips  "), "fish & chips");
    }

    #[test]
    fn anonymize_pipeline() {
        let text = "RT @User123: Check https://t.co/AbC123 out 🚀&amp; more\u{0} stuff";
        assert_eq!(
            standardize_anonymize(text),
            "RT @user : Check <url> out 🚀& more stuff"
        );
    }

    #[test]
    fn html_pipeline_decodes_spans_and_hashtags() {
        let text =
            r#"Fun <span data-emoji-bytes="[240, 159, 152, 137]"></span> #a#b &amp; done"#;
        assert_eq!(standardize_html(text), "Fun 😉 #a #b & done");
    }

    #[test]
    fn hashtag_pipeline_skips_html() {
        assert_eq!(
            separate_hashtags_standardize_anonymize("#one#two @someone_11"),
            "#one #two @user"
        );
    }

    #[test]
    fn unknown_name_is_rejected() {
        assert!(Standardizer::from_str("standardize").is_ok());
        assert!(matches!(
            Standardizer::from_str("no_such_pipeline"),
            Err(Error::UnknownStandardizer(_))
        ));
    }

    #[test]
    fn identity_is_default() {
        assert_eq!(Standardizer::default(), Standardizer::Identity);
        assert_eq!(Standardizer::Identity.apply("As  is"), "As  is");
    }
}
