/*! Atomic text transforms.

Pure string functions composed by the standardization pipelines in
[`crate::text::standardize`] and [`crate::text::preprocess`].
Most of them may introduce duplicate whitespace; callers collapse it
once at the end of a pipeline rather than after every step.

For Unicode categories, go to
<https://en.wikipedia.org/wiki/Unicode_character_property>.
!*/
use deunicode::{deunicode, deunicode_char};
use itertools::Itertools;
use lazy_static::lazy_static;
use log::warn;
use regex::{Captures, NoExpand, Regex};
use scraper::{ElementRef, Html, Selector};
use unic_ucd::GeneralCategory;
use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

use crate::text::contractions::{CONTRACTIONS, CONTRACTION_RE};

/// Default filler for shortened links.
pub const URL_FILLER: &str = "<url>";
/// Default filler for @mentions.
pub const USER_FILLER: &str = "@user";
/// Default filler for email addresses.
pub const EMAIL_FILLER: &str = "@email";

lazy_static! {
    // Handles are 1-15 word characters. A handle is only replaced when it
    // sits at the start of the text or after a character that is neither
    // `@` nor a word character, so `about@you` stays untouched.
    static ref USERNAME_RE: Regex = Regex::new(r"(^|[^@\w])@\w{1,15}\b").unwrap();
    // Tweets carry their links as shortened t.co URLs, so only that host
    // is matched.
    static ref TWITTER_URL_RE: Regex = Regex::new(r"https?://t\.co(?:/[0-9a-zA-Z]+)?").unwrap();
    static ref EMAIL_RE: Regex = Regex::new(r"[\w\.-]+@[\w\.-]+(\.\w+)+").unwrap();
    static ref HASHTAG_PAIR_RE: Regex = Regex::new(r"#(\w+)#(\w+)").unwrap();
    static ref EMOJI_TOKEN_RE: Regex = Regex::new(r":([\w-]+):").unwrap();
    static ref EMOJI_SPAN_SELECTOR: Selector = Selector::parse("span[data-emoji-bytes]").unwrap();
}

/// Unescapes HTML entities, strips control characters and normalizes
/// to NFKC, in that order.
pub fn standardize_text(text: &str) -> String {
    let text = html_escape::decode_html_entities(text);
    let text = remove_control_characters(&text);
    normalize(&text)
}

/// Decodes `<span data-emoji-bytes="[...]">` markup into the emoji
/// characters it encodes.
///
/// Text without such spans is returned unchanged. When spans are
/// present the result is the text content of the fragment with each
/// span replaced by its decoded emoji; undecodable byte arrays are
/// logged and dropped.
pub fn parse_html_emoji(text: &str) -> String {
    let fragment = Html::parse_fragment(text);
    if fragment.select(&EMOJI_SPAN_SELECTOR).next().is_none() {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    flatten_emoji_spans(fragment.root_element(), &mut out);
    out
}

fn flatten_emoji_spans(element: ElementRef, out: &mut String) {
    for node in element.children() {
        if let Some(text) = node.value().as_text() {
            out.push_str(text);
        } else if let Some(child) = ElementRef::wrap(node) {
            if child.value().name() == "span" {
                if let Some(raw) = child.value().attr("data-emoji-bytes") {
                    match decode_emoji_bytes(raw) {
                        Some(emoji) => out.push_str(&emoji),
                        None => warn!("undecodable emoji byte array: {raw}"),
                    }
                    continue;
                }
            }
            flatten_emoji_spans(child, out);
        }
    }
}

fn decode_emoji_bytes(raw: &str) -> Option<String> {
    let bytes: Vec<u8> = serde_json::from_str(raw).ok()?;
    String::from_utf8(bytes).ok()
}

/// Puts a space between directly adjacent hashtags so tokenizers do not
/// merge them.
pub fn separate_hashtags(text: &str) -> String {
    HASHTAG_PAIR_RE
        .replace_all(text, " #${1} #${2} ")
        .into_owned()
}

/// Replaces `@mentions` with a padded `filler`.
/// May introduce duplicate whitespace.
pub fn replace_mentions(text: &str, filler: &str) -> String {
    USERNAME_RE
        .replace_all(text, |caps: &Captures| {
            format!("{} {} ", &caps[1], filler)
        })
        .into_owned()
}

/// Replaces shortened links with a padded `filler`.
/// May introduce duplicate whitespace.
pub fn replace_urls(text: &str, filler: &str) -> String {
    TWITTER_URL_RE
        .replace_all(text, NoExpand(&format!(" {} ", filler)))
        .into_owned()
}

/// Replaces email addresses with `filler`, then pads every filler
/// occurrence with spaces. May introduce duplicate whitespace.
pub fn replace_emails(text: &str, filler: &str) -> String {
    let text = EMAIL_RE.replace_all(text, NoExpand(filler));
    text.replace(filler, &format!(" {} ", filler))
}

/// Replaces URLs, mentions and emails, in that order.
///
/// URLs go first: their query parts can contain `@`-like substrings the
/// mention pattern must not see.
pub fn anonymize_text(text: &str, url_filler: &str, user_filler: &str, email_filler: &str) -> String {
    let text = replace_urls(text, url_filler);
    let text = replace_mentions(&text, user_filler);
    replace_emails(&text, email_filler)
}

/// Strips control (C*) characters, including the NUL byte.
pub fn remove_control_characters(text: &str) -> String {
    text.chars()
        .filter(|c| !GeneralCategory::of(*c).is_other())
        .collect()
}

/// Transliterates every character to its closest ASCII form.
pub fn asciify(text: &str) -> String {
    deunicode(text)
}

/// Transliterates punctuation (P*) to ASCII, leaving dashes (Pd) and
/// everything else untouched.
pub fn standardize_punctuation(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        let category = GeneralCategory::of(c);
        if category.is_punctuation() && category != GeneralCategory::DashPunctuation {
            out.push_str(deunicode_char(c).unwrap_or(""));
        } else {
            out.push(c);
        }
    }
    out
}

/// Replaces punctuation (P*) except dashes (Pd) with a space.
/// May introduce duplicate whitespace.
pub fn remove_punctuation(text: &str) -> String {
    text.chars()
        .map(|c| {
            let category = GeneralCategory::of(c);
            if category.is_punctuation() && category != GeneralCategory::DashPunctuation {
                ' '
            } else {
                c
            }
        })
        .collect()
}

/// Normalizes by compatibility (NFKC).
pub fn normalize(text: &str) -> String {
    text.nfkc().collect()
}

/// Replaces symbol-other (So) characters with a space.
/// May introduce duplicate whitespace.
pub fn remove_emoji(text: &str) -> String {
    text.chars()
        .map(|c| {
            if GeneralCategory::of(c) == GeneralCategory::OtherSymbol {
                ' '
            } else {
                c
            }
        })
        .collect()
}

/// Replaces emoji with their colon-delimited descriptions, padded with
/// spaces (`😉` becomes ` :winking_face: `).
/// May introduce duplicate whitespace.
pub fn asciify_emoji(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for grapheme in text.graphemes(true) {
        match known_emoji(grapheme) {
            Some(emoji) => {
                out.push(':');
                out.push_str(&emoji_token(emoji.name()));
                out.push(':');
            }
            None => out.push_str(grapheme),
        }
    }
    EMOJI_TOKEN_RE.replace_all(&out, " :${1}: ").into_owned()
}

fn known_emoji(grapheme: &str) -> Option<&'static emojis::Emoji> {
    emojis::get(grapheme).or_else(|| emojis::get(grapheme.trim_end_matches('\u{fe0f}')))
}

fn emoji_token(name: &str) -> String {
    name.chars()
        .map(|c| if c == ' ' { '_' } else { c })
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

/// Expands contractions (`weren't` to `were not`), keeping the case of
/// the first character, then removes any leftover apostrophes.
pub fn expand_contractions(text: &str) -> String {
    let expanded = CONTRACTION_RE.replace_all(text, |caps: &Captures| {
        let matched = &caps[0];
        let expansion = CONTRACTIONS
            .get(matched)
            .or_else(|| CONTRACTIONS.get(matched.to_lowercase().as_str()))
            .copied();
        match expansion {
            Some(expansion) => {
                let mut rest = expansion.chars();
                rest.next();
                match matched.chars().next() {
                    Some(first) => format!("{}{}", first, rest.as_str()),
                    None => expansion.to_string(),
                }
            }
            None => matched.to_string(),
        }
    });
    expanded.replace('\'', "")
}

/// Collapses every whitespace run into a single space and trims the ends.
/// Idempotent.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mention_boundaries() {
        let text = "Hi @Mark! Nice meeting you here!@Jen, what about@you?";
        assert_eq!(
            replace_mentions(text, USER_FILLER),
            "Hi  @user ! Nice meeting you here! @user , what about@you?"
        );
    }

    #[test]
    fn mention_handle_too_long() {
        let text = "@sixteen_chars_xx is over the limit";
        assert_eq!(replace_mentions(text, USER_FILLER), text);
    }

    #[test]
    fn shortened_urls() {
        let text = "So there's a link https://t.co/SoMErAnd0M. They're all like that";
        assert_eq!(
            replace_urls(text, URL_FILLER),
            "So there's a link  <url> . They're all like that"
        );
    }

    #[test]
    fn emails_padded() {
        let text = "You can reach me at vip@guy.me! For business matters:vipbiz@guy.me.";
        assert_eq!(
            replace_emails(text, EMAIL_FILLER),
            "You can reach me at  @email ! For business matters: @email ."
        );
    }

    #[test]
    fn anonymize_order() {
        let text = "Good samaritan.https://t.co/SaMAr1TaNn-my website. \
                    I work for a charity:@charity. Contact me:gs@gmail.com";
        assert_eq!(
            anonymize_text(text, URL_FILLER, USER_FILLER, EMAIL_FILLER),
            "Good samaritan. <url> -my website. \
             I work for a charity: @user . Contact me: @email "
        );
    }

    #[test]
    fn control_characters_stripped() {
        let text = "Just\n a\t collection\r of\0 control\u{7} characters\u{c}";
        assert_eq!(
            remove_control_characters(text),
            "Just a collection of control characters"
        );
    }

    #[test]
    fn nfkc_idempotent() {
        let text = "ﬁne Ⅷ ①";
        let once = normalize(text);
        assert_eq!(once, "fine VIII 1");
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn collapse_idempotent() {
        let text = "  a \t b\n\nc ";
        let once = collapse_whitespace(text);
        assert_eq!(once, "a b c");
        assert_eq!(collapse_whitespace(&once), once);
    }

    #[test]
    fn punctuation_removed_keeps_dashes() {
        assert_eq!(remove_punctuation("Let's eat, Grandma!"), "Let s eat  Grandma ");
        assert_eq!(remove_punctuation("twenty-one"), "twenty-one");
    }

    #[test]
    fn punctuation_standardized() {
        assert_eq!(standardize_punctuation("wait — what…"), "wait — what...");
        assert_eq!(standardize_punctuation("it’s"), "it's");
    }

    #[test]
    fn contractions_keep_case() {
        assert_eq!(expand_contractions("Weren't you there?"), "Were not you there?");
        assert_eq!(
            expand_contractions("weren't isn't aren't"),
            "were not is not are not"
        );
    }

    #[test]
    fn contractions_strip_stray_apostrophes() {
        assert_eq!(expand_contractions("rock 'n' roll"), "rock n roll");
    }

    #[test]
    fn emoji_removed() {
        assert_eq!(remove_emoji("a 😀 b"), "a   b");
    }

    #[test]
    fn emoji_described() {
        assert_eq!(asciify_emoji("😉"), " :winking_face: ");
    }

    #[test]
    fn html_emoji_spans() {
        let text = r#"RT <span class="emoji" data-emoji-bytes="[240, 159, 152, 137]"></span> hi"#;
        assert_eq!(parse_html_emoji(text), "RT 😉 hi");
    }

    #[test]
    fn html_passthrough() {
        assert_eq!(parse_html_emoji("no spans here"), "no spans here");
        assert_eq!(parse_html_emoji("<b>bold</b> text"), "<b>bold</b> text");
    }

    #[test]
    fn hashtags_separated() {
        assert_eq!(separate_hashtags("#one#two"), " #one #two ");
        assert_eq!(separate_hashtags("#solo stays"), "#solo stays");
    }
}
