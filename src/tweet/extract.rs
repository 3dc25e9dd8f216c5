/*! Flat record extraction.

Turns a [`TweetView`] into the flat shapes consumed downstream: the full
analysis record ([`TweetExtract`], dotted column names, absent values kept
as explicit nulls) and the compact indexed shape (absent values and false
flags dropped entirely).
!*/
use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, Utc};
use log::{debug, warn};
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::text::atomic::anonymize_text;
use crate::tweet::geo::GeoInfo;
use crate::tweet::view::TweetView;

/// Switches for the optional extract enrichments.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractOptions {
    pub media: bool,
    pub geo: bool,
}

/// Flat analysis record. Dotted field names mirror the nesting of the raw
/// record they were read from.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TweetExtract {
    pub id: Option<String>,
    pub text: Option<String>,
    pub in_reply_to_status_id: Option<String>,
    pub in_reply_to_user_id: Option<String>,
    pub quoted_user_id: Option<String>,
    pub quoted_status_id: Option<String>,
    pub retweeted_user_id: Option<String>,
    pub retweeted_status_id: Option<String>,
    pub created_at: Option<String>,
    #[serde(rename = "entities.user_mentions")]
    pub user_mentions: Option<Vec<String>>,
    #[serde(rename = "user.id")]
    pub user_id: Option<String>,
    #[serde(rename = "user.screen_name")]
    pub user_screen_name: Option<String>,
    #[serde(rename = "user.name")]
    pub user_name: Option<String>,
    #[serde(rename = "user.description")]
    pub user_description: Option<String>,
    #[serde(rename = "user.timezone")]
    pub user_timezone: Option<String>,
    #[serde(rename = "user.location")]
    pub user_location: Option<String>,
    #[serde(rename = "user.num_followers")]
    pub user_num_followers: Option<i64>,
    #[serde(rename = "user.num_following")]
    pub user_num_following: Option<i64>,
    #[serde(rename = "user.created_at")]
    pub user_created_at: Option<String>,
    #[serde(rename = "user.statuses_count")]
    pub user_statuses_count: Option<i64>,
    #[serde(rename = "user.is_verified")]
    pub user_is_verified: Option<bool>,
    pub lang: Option<String>,
    pub is_retweet: bool,
    pub has_quote: bool,
    pub is_reply: bool,
    pub contains_keywords: bool,
    #[serde(flatten)]
    pub geo: Option<GeoInfo>,
    #[serde(flatten)]
    pub media: Option<MediaInfo>,
}

/// Media summary attached to full extracts.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MediaInfo {
    pub has_media: bool,
    /// Per-type counts of the effective media entities.
    pub media: HashMap<String, u64>,
    /// Media urls. For videos and animated gifs the media url points to a
    /// preview image.
    pub media_image_urls: Vec<String>,
}

impl TweetView<'_> {
    /// Extracts the full analysis record.
    pub fn extract(&self, options: &ExtractOptions) -> TweetExtract {
        let geo = options.geo.then(|| self.add_region_info(self.geo_info()));
        let media = options.media.then(|| self.media_info());
        let user = self.user();
        let quoted = self.quoted_status();
        let retweeted = self.retweeted_status();
        TweetExtract {
            id: self.id().map(str::to_owned),
            text: self.text().map(str::to_owned),
            in_reply_to_status_id: self.replied_status_id().map(str::to_owned),
            in_reply_to_user_id: self.replied_user_id().map(str::to_owned),
            quoted_user_id: quoted.user().id().map(str::to_owned),
            quoted_status_id: quoted.id().map(str::to_owned),
            retweeted_user_id: retweeted.user().id().map(str::to_owned),
            retweeted_status_id: retweeted.id().map(str::to_owned),
            created_at: self.created_at().and_then(isoformat),
            user_mentions: self.user_mention_ids(),
            user_id: user.id().map(str::to_owned),
            user_screen_name: user.screen_name().map(str::to_owned),
            user_name: user.name().map(str::to_owned),
            user_description: user.description(),
            user_timezone: user.time_zone().map(str::to_owned),
            user_location: user.location().map(str::to_owned),
            user_num_followers: user.followers_count(),
            user_num_following: user.friends_count(),
            user_created_at: user.created_at().and_then(isoformat),
            user_statuses_count: user.statuses_count(),
            user_is_verified: user.verified(),
            lang: self.lang().map(str::to_owned),
            is_retweet: self.is_retweet(),
            has_quote: self.has_quote(),
            is_reply: self.is_reply(),
            contains_keywords: !self.matching_keywords().is_empty() || self.contains_keywords(),
            geo,
            media,
        }
    }

    /// Extracts the compact indexed shape. Absent values and false flags
    /// are dropped; an unresolved geo point drops the whole geo object.
    pub fn extract_compact(&self, options: &ExtractOptions) -> Map<String, Value> {
        let user = self.user();
        let quoted = self.quoted_status();
        let retweeted = self.retweeted_status();

        let mut user_map = Map::new();
        insert_str(&mut user_map, "id", user.id());
        insert_str(&mut user_map, "name", user.name());
        insert_str(&mut user_map, "screen_name", user.screen_name());
        insert_str(&mut user_map, "location", user.location());
        insert_string(&mut user_map, "description", user.description());

        let mut record = Map::new();
        insert_string(
            &mut record,
            "created_at",
            self.created_at().and_then(utc_timestamp),
        );
        insert_str(&mut record, "id", self.id());
        insert_str(&mut record, "text", self.text());
        insert_str(&mut record, "in_reply_to_user_id", self.replied_user_id());
        insert_str(&mut record, "in_reply_to_status_id", self.replied_status_id());
        insert_str(&mut record, "retweeted_user_id", retweeted.user().id());
        insert_str(&mut record, "retweeted_status_id", retweeted.id());
        insert_str(&mut record, "quoted_user_id", quoted.user().id());
        insert_str(&mut record, "quoted_status_id", quoted.id());
        record.insert("user".to_owned(), Value::Object(user_map));
        if options.geo {
            if let Some(geo) = compact_geo(self.geo_info()) {
                record.insert("geo_info".to_owned(), geo);
            }
        }
        let hashtags = self.hashtags();
        if !hashtags.is_empty() {
            let hashtags: Vec<Value> = hashtags
                .into_iter()
                .map(|hashtag| Value::String(hashtag.to_owned()))
                .collect();
            record.insert("hashtags".to_owned(), Value::Array(hashtags));
        }
        if self.has_quote() {
            record.insert("has_quote".to_owned(), Value::Bool(true));
        }
        if self.is_retweet() {
            record.insert("is_retweet".to_owned(), Value::Bool(true));
        }
        insert_str(&mut record, "lang", self.lang());
        insert_str(&mut record, "project", self.project());
        let matching = self.matching_keywords();
        if !matching.is_empty() {
            let matching: Vec<Value> = matching
                .into_iter()
                .map(|keyword| Value::String(keyword.to_owned()))
                .collect();
            record.insert("matching_keywords".to_owned(), Value::Array(matching));
        }
        record
    }

    /// Ids of the accounts this record mentions. Mentions of a retweeted
    /// status are not included. Empty is reported as absent.
    pub fn user_mention_ids(&self) -> Option<Vec<String>> {
        let ids: Vec<String> = self
            .user_mentions()
            .iter()
            .filter_map(|mention| mention.get("id_str").and_then(Value::as_str))
            .map(str::to_owned)
            .collect();
        (!ids.is_empty()).then_some(ids)
    }

    /// Summarizes the effective media entities.
    pub fn media_info(&self) -> MediaInfo {
        let mut info = MediaInfo::default();
        let media = match self.media() {
            Some(media) => media,
            None => return info,
        };
        info.has_media = true;
        for medium in media {
            match medium.get("type").and_then(Value::as_str) {
                Some(kind) => *info.media.entry(kind.to_owned()).or_insert(0) += 1,
                None => debug!("media entity without a type: {}", medium),
            }
            if let Some(url) = medium.get("media_url").and_then(Value::as_str) {
                info.media_image_urls.push(url.to_owned());
            }
        }
        info
    }

    /// Whether any configured keyword occurs in the pooled record text.
    /// An empty keyword list disables matching.
    pub fn contains_keywords(&self) -> bool {
        if self.config().keywords.is_empty() {
            return false;
        }
        let pooled = self.keyword_matching_text();
        self.config()
            .keywords
            .iter()
            .any(|keyword| pooled.contains(keyword.as_str()))
    }

    /// Number of alphabetic non-stop-word tokens in the effective text,
    /// with mentions, urls and emails stripped. Absent without a
    /// configured tokenizer.
    pub fn token_count(&self) -> Option<usize> {
        let tokenizer = self.config().tokenizer.as_ref()?;
        let text = anonymize_text(self.text().unwrap_or(""), "", "", "");
        let count = tokenizer
            .tokenize(&text)
            .iter()
            .filter(|token| token.is_alpha() && !token.is_stop())
            .count();
        Some(count)
    }
}

fn insert_str(map: &mut Map<String, Value>, key: &str, value: Option<&str>) {
    if let Some(value) = value {
        map.insert(key.to_owned(), Value::String(value.to_owned()));
    }
}

fn insert_string(map: &mut Map<String, Value>, key: &str, value: Option<String>) {
    if let Some(value) = value {
        map.insert(key.to_owned(), Value::String(value));
    }
}

/// Nests the resolved point as `{lat, lon}`. Without a full point there is
/// no compact geo object at all.
fn compact_geo(geo: GeoInfo) -> Option<Value> {
    let (latitude, longitude) = match (geo.latitude, geo.longitude) {
        (Some(latitude), Some(longitude)) => (latitude, longitude),
        _ => return None,
    };
    let mut map = Map::new();
    map.insert(
        "coordinates".to_owned(),
        json!({ "lat": latitude, "lon": longitude }),
    );
    insert_string(&mut map, "country_code", geo.country_code);
    insert_string(&mut map, "location_type", geo.location_type);
    if let Some(source) = geo.source {
        map.insert("geo_type".to_owned(), Value::String(source.name().to_owned()));
    }
    Some(Value::Object(map))
}

fn isoformat(raw: &str) -> Option<String> {
    parse_created_at(raw).map(|stamp| stamp.to_rfc3339())
}

fn utc_timestamp(raw: &str) -> Option<String> {
    parse_created_at(raw).map(|stamp| {
        stamp
            .with_timezone(&Utc)
            .format("%Y-%m-%dT%H:%M:%S.000Z")
            .to_string()
    })
}

/// Parses Twitter's legacy timestamp format, falling back to RFC 3339.
/// Unparseable timestamps are logged and reported as absent.
fn parse_created_at(raw: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_str(raw, "%a %b %d %H:%M:%S %z %Y")
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map_err(|err| warn!("unparseable timestamp {:?}: {}", raw, err))
        .ok()
}
