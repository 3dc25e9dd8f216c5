/*! Configurable preprocessing entry point.

One function, [`preprocess`], drives every optional cleanup step in a
fixed order. Thresholds (`min_num_tokens`, `min_num_chars`) return the
empty string as a "drop this record" sentinel, never an error; callers
filtering a dataset must treat `""` as excluded.
!*/
use itertools::Itertools;
use log::debug;

use crate::text::atomic;
use crate::text::tokenize::{Token, Tokenize};

/// Options for [`preprocess`], applied in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreprocessConfig {
    /// Replace punctuation (P*, except dashes) with a space.
    pub remove_punctuation: bool,
    /// Transliterate punctuation to ASCII.
    pub standardize_punctuation: bool,
    /// Remove symbols-other (So) characters.
    pub remove_emoji: bool,
    /// Replace emoji with `:description:` tokens.
    pub asciify_emoji: bool,
    /// Replace the `<url>` filler with something else.
    pub replace_url_with: Option<String>,
    /// Replace the `@user` filler with something else.
    pub replace_user_with: Option<String>,
    /// Replace the `@email` filler with something else.
    pub replace_email_with: Option<String>,
    /// Drop texts with fewer alphabetic, non-filler tokens than this.
    pub min_num_tokens: usize,
    pub lemmatize: bool,
    pub remove_stop_words: bool,
    /// Transliterate everything to ASCII.
    pub asciify: bool,
    pub lower_case: bool,
    /// Drop texts with fewer characters than this.
    pub min_num_chars: usize,
}

/// Preprocesses tweet text.
///
/// Token-level options (`min_num_tokens`, `lemmatize`,
/// `remove_stop_words`) only apply when a tokenizer is passed in;
/// without one they are skipped. Returns `""` when a threshold is not
/// met.
pub fn preprocess(text: &str, config: &PreprocessConfig, tokenizer: Option<&dyn Tokenize>) -> String {
    let mut text = text.to_string();
    if config.remove_punctuation {
        text = atomic::remove_punctuation(&text);
    }
    if config.standardize_punctuation {
        text = atomic::standardize_punctuation(&text);
    }
    if config.remove_emoji {
        text = atomic::remove_emoji(&text);
    }
    if config.asciify_emoji {
        text = atomic::asciify_emoji(&text);
    }
    if let Some(replacement) = &config.replace_url_with {
        text = text.replace(atomic::URL_FILLER, replacement);
    }
    if let Some(replacement) = &config.replace_user_with {
        text = text.replace(atomic::USER_FILLER, replacement);
    }
    if let Some(replacement) = &config.replace_email_with {
        text = text.replace(atomic::EMAIL_FILLER, replacement);
    }
    text = atomic::collapse_whitespace(&text);

    let wants_tokens = config.min_num_tokens > 0 || config.lemmatize || config.remove_stop_words;
    if wants_tokens {
        if let Some(tokenizer) = tokenizer {
            let mut tokens = tokenizer.tokenize(&text);
            if config.min_num_tokens > 0 {
                let num_tokens = tokens
                    .iter()
                    .filter(|t| t.is_alpha() && !t.is_punct() && !is_filler(t.text(), config))
                    .count();
                if num_tokens < config.min_num_tokens {
                    return String::new();
                }
            }
            if config.remove_stop_words {
                tokens.retain(|t| !t.is_stop());
            }
            if config.remove_stop_words && !config.lemmatize {
                text = tokens.iter().map(Token::text).join(" ");
            }
            if config.lemmatize {
                text = tokens.iter().map(Token::lemma).join(" ");
            }
        } else {
            debug!("no tokenizer configured, skipping token-level options");
        }
    }
    if config.asciify {
        text = atomic::asciify(&text);
    }
    if config.lower_case {
        text = text.to_lowercase();
    }
    if config.min_num_chars > 0 && text.chars().count() < config.min_num_chars {
        return String::new();
    }
    text
}

fn is_filler(token_text: &str, config: &PreprocessConfig) -> bool {
    let trimmed = token_text.trim();
    config.replace_user_with.as_deref() == Some(trimmed)
        || config.replace_url_with.as_deref() == Some(trimmed)
}
