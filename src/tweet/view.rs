/*! Lazy accessors over raw tweet records.

Views wrap a deserialized status payload ([`serde_json::Value`]) and expose
typed accessors without copying the record. Missing or malformed parts
degrade to absent values instead of failing: a view over `None` answers
every accessor with its empty default, and a wrong-shaped field is logged
and treated as absent.

Derived values that are not free to compute ([`TweetView::text`],
[`TweetView::retweet_or_tweet`], [`TweetView::media`],
[`TweetView::keyword_matching_text`]) are memoized per view instance.
!*/
use std::cell::OnceCell;
use std::fmt;

use itertools::Itertools;
use lazy_static::lazy_static;
use log::warn;
use serde_json::{Map, Value};

use crate::text::{Standardizer, Tokenize};
use crate::tweet::geo::{Geocode, RegionLookup};

lazy_static! {
    /// Backing object handed to views over a missing or malformed record.
    static ref EMPTY: Map<String, Value> = Map::new();
    /// Configuration of detached sub-views (retweeted and quoted statuses).
    static ref DEFAULT_CONFIG: TweetConfig = TweetConfig::default();
}

/// Processing configuration shared by every view of a batch.
///
/// The default configuration applies no text normalization, matches no
/// keywords and carries no collaborators.
#[derive(Default)]
pub struct TweetConfig {
    /// Normalization pipeline applied to tweet texts and user descriptions.
    pub standardizer: Standardizer,
    /// Lowercase keywords matched against the pooled tweet text.
    pub keywords: Vec<String>,
    /// Resolves free-form user locations to coordinates.
    pub geocoder: Option<Box<dyn Geocode + Sync>>,
    /// Resolves coordinates and country codes to region metadata.
    pub regions: Option<Box<dyn RegionLookup + Sync>>,
    /// Splits text into tokens for token counting.
    pub tokenizer: Option<Box<dyn Tokenize + Sync>>,
}

impl fmt::Debug for TweetConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TweetConfig")
            .field("standardizer", &self.standardizer)
            .field("keywords", &self.keywords)
            .field("geocoder", &self.geocoder.is_some())
            .field("regions", &self.regions.is_some())
            .field("tokenizer", &self.tokenizer.is_some())
            .finish()
    }
}

/// Read-only view over a single raw tweet record.
#[derive(Debug)]
pub struct TweetView<'a> {
    status: &'a Map<String, Value>,
    config: &'a TweetConfig,
    text: OnceCell<Option<String>>,
    media: OnceCell<Option<&'a [Value]>>,
    subject: OnceCell<Box<TweetView<'a>>>,
    keyword_text: OnceCell<String>,
}

impl<'a> TweetView<'a> {
    /// Builds a view over `status` with the given configuration.
    ///
    /// A missing or null record yields an empty view. Any other non-object
    /// value is logged and treated the same way.
    pub fn new(status: Option<&'a Value>, config: &'a TweetConfig) -> Self {
        Self::from_parts(object_or_empty(status, "status"), config)
    }

    /// Builds a view with the default configuration.
    pub fn detached(status: Option<&'a Value>) -> Self {
        Self::new(status, &DEFAULT_CONFIG)
    }

    fn from_parts(status: &'a Map<String, Value>, config: &'a TweetConfig) -> Self {
        TweetView {
            status,
            config,
            text: OnceCell::new(),
            media: OnceCell::new(),
            subject: OnceCell::new(),
            keyword_text: OnceCell::new(),
        }
    }

    /// Get a reference to the view's configuration.
    pub fn config(&self) -> &'a TweetConfig {
        self.config
    }

    fn field(&self, key: &str) -> Option<&'a Value> {
        self.status.get(key)
    }

    fn str_field(&self, key: &str) -> Option<&'a str> {
        self.field(key).and_then(Value::as_str)
    }

    fn entity_list(&self, key: &str) -> &'a [Value] {
        self.field("entities")
            .and_then(|entities| entities.get(key))
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Get the tweet id.
    pub fn id(&self) -> Option<&'a str> {
        self.str_field("id_str")
    }

    /// Get the raw creation timestamp.
    pub fn created_at(&self) -> Option<&'a str> {
        self.str_field("created_at")
    }

    /// Get the tweet language.
    pub fn lang(&self) -> Option<&'a str> {
        self.str_field("lang")
    }

    /// Get the name of the project the record was collected for.
    pub fn project(&self) -> Option<&'a str> {
        self.str_field("project")
    }

    /// Keywords the upstream collection already matched on this record.
    pub fn matching_keywords(&self) -> Vec<&'a str> {
        self.field("matching_keywords")
            .and_then(Value::as_array)
            .map(|keywords| keywords.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// Get a view over the authoring user.
    pub fn user(&self) -> UserView<'a> {
        UserView {
            user: object_or_empty(self.field("user"), "user"),
            config: self.config,
        }
    }

    /// Normalized tweet text, memoized on first access.
    ///
    /// The text is read from the subject record (the retweeted status for
    /// retweets): the extended tweet's `full_text` when an extended tweet
    /// is present, the top-level `full_text` otherwise, falling back to
    /// `text`. The raw value is passed through the configured standardizer.
    pub fn text(&self) -> Option<&str> {
        self.text
            .get_or_init(|| {
                let subject = self.retweet_or_tweet();
                let extended = subject.extended_tweet();
                let raw = if !extended.is_empty() {
                    extended.status.get("full_text")
                } else if subject.status.contains_key("full_text") {
                    subject.status.get("full_text")
                } else {
                    subject.status.get("text")
                };
                value_to_text(raw).map(|text| self.config.standardizer.apply(&text))
            })
            .as_deref()
    }

    /// The record most accessors should read from: the retweeted status
    /// for retweets, the tweet itself otherwise. Memoized.
    pub fn retweet_or_tweet(&self) -> &TweetView<'a> {
        self.subject.get_or_init(|| {
            if self.is_retweet() {
                Box::new(self.retweeted_status())
            } else {
                Box::new(TweetView::from_parts(self.status, self.config))
            }
        })
    }

    /// Hashtag texts of this record's entities.
    pub fn hashtags(&self) -> Vec<&'a str> {
        self.entity_list("hashtags")
            .iter()
            .filter_map(|hashtag| hashtag.get("text").and_then(Value::as_str))
            .collect()
    }

    /// Raw user mention entities of this record, not of its retweeted status.
    pub fn user_mentions(&self) -> &'a [Value] {
        self.entity_list("user_mentions")
    }

    /// Raw url entities of this record.
    pub fn urls(&self) -> &'a [Value] {
        self.entity_list("urls")
    }

    /// Media entities of the subject record, memoized.
    ///
    /// A non-empty extended tweet media list wins over the top-level
    /// `extended_entities` one.
    pub fn media(&self) -> Option<&'a [Value]> {
        *self.media.get_or_init(|| {
            let subject = self.retweet_or_tweet();
            subject
                .extended_tweet()
                .media()
                .filter(|media| !media.is_empty())
                .or_else(|| {
                    subject
                        .field("extended_entities")
                        .and_then(|entities| entities.get("media"))
                        .and_then(Value::as_array)
                        .map(Vec::as_slice)
                })
        })
    }

    /// Whether the record carries an extended tweet.
    pub fn has_extended(&self) -> bool {
        self.status.contains_key("extended_tweet")
    }

    /// Get a view over the extended tweet.
    pub fn extended_tweet(&self) -> ExtendedTweetView<'a> {
        ExtendedTweetView {
            status: object_or_empty(self.field("extended_tweet"), "extended_tweet"),
        }
    }

    /// Whether the record is a retweet.
    pub fn is_retweet(&self) -> bool {
        self.status.contains_key("retweeted_status")
    }

    /// Detached view over the retweeted status.
    pub fn retweeted_status(&self) -> TweetView<'a> {
        TweetView::detached(self.field("retweeted_status"))
    }

    /// Get the retweet count.
    pub fn retweet_count(&self) -> Option<i64> {
        self.field("retweet_count").and_then(Value::as_i64)
    }

    /// Whether the record quotes another status. Retweets carry the quoted
    /// status of their source tweet, so they never count as quotes here.
    pub fn has_quote(&self) -> bool {
        self.status.contains_key("quoted_status") && !self.is_retweet()
    }

    /// Detached view over the quoted status.
    pub fn quoted_status(&self) -> TweetView<'a> {
        TweetView::detached(self.field("quoted_status"))
    }

    /// Whether the record replies to another status.
    pub fn is_reply(&self) -> bool {
        self.field("in_reply_to_status_id_str")
            .map_or(false, |id| !id.is_null())
    }

    /// Get the id of the status this record replies to.
    pub fn replied_status_id(&self) -> Option<&'a str> {
        self.str_field("in_reply_to_status_id_str")
    }

    /// Get the id of the user this record replies to.
    pub fn replied_user_id(&self) -> Option<&'a str> {
        self.str_field("in_reply_to_user_id_str")
    }

    /// Exact point coordinates as `(longitude, latitude)`.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        let point = match self.field("coordinates") {
            Some(Value::Object(geo)) => geo.get("coordinates"),
            Some(Value::Null) | None => return None,
            Some(other) => {
                warn!("malformed coordinates field: {}", other);
                return None;
            }
        }?;
        let pair = (
            point.get(0).and_then(Value::as_f64),
            point.get(1).and_then(Value::as_f64),
        );
        match pair {
            (Some(longitude), Some(latitude)) => Some((longitude, latitude)),
            _ => {
                warn!("malformed coordinates point: {}", point);
                None
            }
        }
    }

    /// Get a view over the tagged place.
    pub fn place(&self) -> PlaceView<'a> {
        PlaceView {
            place: object_or_empty(self.field("place"), "place"),
        }
    }

    /// All text keyword matching runs against, lowercased: the normalized
    /// tweet text, the subject's user mention names and the subject's url
    /// fields. Memoized.
    pub fn keyword_matching_text(&self) -> &str {
        self.keyword_text.get_or_init(|| {
            let mut pooled = String::new();
            pooled.push_str(self.text().unwrap_or(""));
            pooled.push_str(&self.user_mentions_text());
            pooled.push_str(&self.urls_text());
            pooled.to_lowercase()
        })
    }

    fn user_mentions_text(&self) -> String {
        let mentions = self.retweet_or_tweet().user_mentions();
        let names = mentions
            .iter()
            .filter_map(|mention| mention.get("name").and_then(Value::as_str));
        let screen_names = mentions
            .iter()
            .filter_map(|mention| mention.get("screen_name").and_then(Value::as_str));
        names.chain(screen_names).join(" ")
    }

    fn urls_text(&self) -> String {
        let subject = self.retweet_or_tweet();
        let urls = subject.urls();
        let unwound = urls.iter().map(|url| {
            url.get("unwound")
                .and_then(|unwound| unwound.get("url"))
                .and_then(Value::as_str)
                .unwrap_or("")
        });
        let expanded = urls
            .iter()
            .map(|url| url.get("expanded_url").and_then(Value::as_str).unwrap_or(""));
        let media = subject
            .extended_tweet()
            .media()
            .unwrap_or(&[])
            .iter()
            .map(|medium| medium.get("expanded_url").and_then(Value::as_str).unwrap_or(""));
        unwound.chain(expanded).chain(media).join(" ")
    }
}

/// A clone shares the backing record and configuration but starts with
/// cold caches.
impl Clone for TweetView<'_> {
    fn clone(&self) -> Self {
        TweetView::from_parts(self.status, self.config)
    }
}

/// Views compare by record content and by the comparable parts of their
/// configuration. Memoized state never participates.
impl PartialEq for TweetView<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.status == other.status
            && self.config.standardizer == other.config.standardizer
            && self.config.keywords == other.config.keywords
    }
}

/// Read-only view over a user object.
#[derive(Debug)]
pub struct UserView<'a> {
    user: &'a Map<String, Value>,
    config: &'a TweetConfig,
}

impl<'a> UserView<'a> {
    /// Get the user id.
    pub fn id(&self) -> Option<&'a str> {
        self.user.get("id_str").and_then(Value::as_str)
    }

    /// Get the display name.
    pub fn name(&self) -> Option<&'a str> {
        self.user.get("name").and_then(Value::as_str)
    }

    /// Get the handle.
    pub fn screen_name(&self) -> Option<&'a str> {
        self.user.get("screen_name").and_then(Value::as_str)
    }

    /// Get the free-form profile location.
    pub fn location(&self) -> Option<&'a str> {
        self.user.get("location").and_then(Value::as_str)
    }

    /// Profile description, passed through the configured standardizer.
    pub fn description(&self) -> Option<String> {
        let raw = value_to_text(self.user.get("description"))?;
        Some(self.config.standardizer.apply(&raw))
    }

    /// Whether the account is verified.
    pub fn verified(&self) -> Option<bool> {
        self.user.get("verified").and_then(Value::as_bool)
    }

    /// Get the follower count.
    pub fn followers_count(&self) -> Option<i64> {
        self.user.get("followers_count").and_then(Value::as_i64)
    }

    /// Get the friend count.
    pub fn friends_count(&self) -> Option<i64> {
        self.user.get("friends_count").and_then(Value::as_i64)
    }

    /// Get the status count.
    pub fn statuses_count(&self) -> Option<i64> {
        self.user.get("statuses_count").and_then(Value::as_i64)
    }

    /// Get the account creation timestamp.
    pub fn created_at(&self) -> Option<&'a str> {
        self.user.get("created_at").and_then(Value::as_str)
    }

    /// User time zone. Newer exports write `timezone`, older ones
    /// `time_zone`; the newer key wins whenever it is present.
    pub fn time_zone(&self) -> Option<&'a str> {
        if self.user.contains_key("timezone") {
            self.user.get("timezone").and_then(Value::as_str)
        } else {
            self.user.get("time_zone").and_then(Value::as_str)
        }
    }

    /// Get the self-declared user language.
    pub fn lang(&self) -> Option<&'a str> {
        self.user.get("lang").and_then(Value::as_str)
    }
}

impl PartialEq for UserView<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.user == other.user && self.config.standardizer == other.config.standardizer
    }
}

/// Read-only view over an extended tweet object.
#[derive(Debug, PartialEq)]
pub struct ExtendedTweetView<'a> {
    status: &'a Map<String, Value>,
}

impl<'a> ExtendedTweetView<'a> {
    /// Whether the backing object is empty or missing.
    pub fn is_empty(&self) -> bool {
        self.status.is_empty()
    }

    /// Get the untruncated text.
    pub fn full_text(&self) -> Option<&'a str> {
        self.status.get("full_text").and_then(Value::as_str)
    }

    /// Media entities of the extended tweet.
    pub fn media(&self) -> Option<&'a [Value]> {
        self.status
            .get("extended_entities")
            .and_then(|entities| entities.get("media"))
            .and_then(Value::as_array)
            .map(Vec::as_slice)
    }
}

/// Read-only view over a place object.
#[derive(Debug, PartialEq)]
pub struct PlaceView<'a> {
    place: &'a Map<String, Value>,
}

impl<'a> PlaceView<'a> {
    /// Bounding box rings of the place. A present but wrong-shaped
    /// bounding box is logged and reported as absent.
    pub fn coordinates(&self) -> Option<&'a Vec<Value>> {
        let bounding_box = match self.place.get("bounding_box") {
            Some(Value::Object(bounding_box)) => bounding_box,
            Some(Value::Null) | None => return None,
            Some(other) => {
                warn!("malformed bounding box: {}", other);
                return None;
            }
        };
        bounding_box.get("coordinates").and_then(Value::as_array)
    }

    /// Get the country code.
    pub fn country_code(&self) -> Option<&'a str> {
        self.place.get("country_code").and_then(Value::as_str)
    }

    /// Get the place type.
    pub fn place_type(&self) -> Option<&'a str> {
        self.place.get("place_type").and_then(Value::as_str)
    }
}

fn object_or_empty<'a>(value: Option<&'a Value>, what: &str) -> &'a Map<String, Value> {
    match value {
        Some(Value::Object(object)) => object,
        Some(Value::Null) | None => &EMPTY,
        Some(other) => {
            warn!("expected {} to be an object, got: {}", what, other);
            &EMPTY
        }
    }
}

/// Coerces a raw field to text. Strings pass through, numbers and booleans
/// are stringified, containers are logged and treated as absent.
fn value_to_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(text) => Some(text.clone()),
        Value::Null => None,
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(boolean) => Some(boolean.to_string()),
        other => {
            warn!("expected a text value, got: {}", other);
            None
        }
    }
}
