/*! Geo enrichment.

Resolves a geographic point and country for a tweet record, trying sources
in strict priority order: exact coordinates, then the place bounding box,
then the geocoded free-form user location. Resolution is best effort and
never fails the surrounding extraction; an unresolvable record yields an
empty [`GeoInfo`].

The actual lookup backends (a geocoder index, a country polygon table) are
consumed through the [`Geocode`] and [`RegionLookup`] traits supplied on the
view configuration.
!*/
use log::{debug, warn};
use serde::Serialize;
use serde_json::Value;

use crate::tweet::view::TweetView;

/// Resolves a free-form location string to geo candidates.
pub trait Geocode {
    /// Candidates ordered by relevance. Empty means unresolved.
    fn decode(&self, location: &str) -> Vec<GeoCandidate>;
}

/// Country polygon table with region metadata.
pub trait RegionLookup {
    /// Country code of the polygon containing the point, if any.
    fn contains(&self, longitude: f64, latitude: f64) -> Option<String>;
    /// Country code of the polygon closest to the point.
    fn nearest(&self, longitude: f64, latitude: f64) -> Option<String>;
    /// World Bank region of a country.
    fn region_of(&self, country_code: &str) -> Option<String>;
    /// Subregion of a country.
    fn subregion_of(&self, country_code: &str) -> Option<String>;
}

/// A single geocoder candidate for a location string.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoCandidate {
    pub longitude: f64,
    pub latitude: f64,
    pub country_code: Option<String>,
    pub location_type: Option<String>,
}

/// Which source produced a resolved point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GeoSource {
    #[serde(rename = "tweet.coordinates")]
    Coordinates,
    #[serde(rename = "tweet.place")]
    Place,
    #[serde(rename = "user.location")]
    UserLocation,
}

impl GeoSource {
    /// String form written to output records.
    pub fn name(&self) -> &'static str {
        match self {
            GeoSource::Coordinates => "tweet.coordinates",
            GeoSource::Place => "tweet.place",
            GeoSource::UserLocation => "user.location",
        }
    }
}

/// Resolved geo information. Absent fields are dropped on serialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GeoInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_type: Option<String>,
    #[serde(rename = "geo_type", skip_serializing_if = "Option::is_none")]
    pub source: Option<GeoSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subregion: Option<String>,
}

impl GeoInfo {
    /// Whether both coordinates resolved.
    pub fn has_point(&self) -> bool {
        self.longitude.is_some() && self.latitude.is_some()
    }
}

impl TweetView<'_> {
    /// Resolves geo information for the record.
    ///
    /// Sources are tried in strict priority order and the first one that
    /// yields a point wins: exact coordinates, the place bounding box
    /// centroid, the geocoded user location. The country code comes from
    /// the place when it carries a non-empty one, otherwise from a reverse
    /// lookup against the configured polygon table.
    pub fn geo_info(&self) -> GeoInfo {
        let mut geo = GeoInfo::default();
        if let Some((longitude, latitude)) = self.coordinates() {
            geo.longitude = Some(longitude);
            geo.latitude = Some(latitude);
            geo.country_code =
                self.resolve_country(self.place().country_code(), longitude, latitude);
            geo.location_type = self.place().place_type().map(str::to_owned);
            geo.source = Some(GeoSource::Coordinates);
        } else if let Some(ring) = self.bounding_box_ring() {
            let (longitude, latitude) = polygon_centroid(&ring);
            geo.longitude = Some(longitude);
            geo.latitude = Some(latitude);
            geo.country_code =
                self.resolve_country(self.place().country_code(), longitude, latitude);
            geo.location_type = self.place().place_type().map(str::to_owned);
            geo.source = Some(GeoSource::Place);
        } else {
            let geocoder = match &self.config().geocoder {
                Some(geocoder) => geocoder,
                None => {
                    warn!("cannot resolve geo info from the user location without a geocoder");
                    return geo;
                }
            };
            let candidates = self
                .user()
                .location()
                .map(|location| geocoder.decode(location))
                .unwrap_or_default();
            match candidates.into_iter().next() {
                Some(candidate) => {
                    geo.country_code = self.resolve_country(
                        candidate.country_code.as_deref(),
                        candidate.longitude,
                        candidate.latitude,
                    );
                    geo.longitude = Some(candidate.longitude);
                    geo.latitude = Some(candidate.latitude);
                    geo.location_type = candidate.location_type;
                    geo.source = Some(GeoSource::UserLocation);
                }
                None => debug!("no geo source available on the record"),
            }
        }
        geo
    }

    /// Attaches region and subregion for the resolved country code, when a
    /// region table is configured. Unknown country codes leave both absent.
    pub fn add_region_info(&self, mut geo: GeoInfo) -> GeoInfo {
        let code = match geo.country_code.as_deref().filter(|code| !code.is_empty()) {
            Some(code) => code,
            None => return geo,
        };
        let regions = match &self.config().regions {
            Some(regions) => regions,
            None => return geo,
        };
        geo.region = regions.region_of(code);
        geo.subregion = regions.subregion_of(code);
        if geo.region.is_none() && geo.subregion.is_none() {
            warn!("unknown country code {}", code);
        }
        geo
    }

    /// Place country code when present and non-empty, else a reverse lookup
    /// of the point against the polygon table.
    fn resolve_country(
        &self,
        country_code: Option<&str>,
        longitude: f64,
        latitude: f64,
    ) -> Option<String> {
        match country_code {
            Some(code) if !code.is_empty() => Some(code.to_owned()),
            _ => {
                let regions = self.config().regions.as_ref()?;
                regions.contains(longitude, latitude).or_else(|| {
                    let nearest = regions.nearest(longitude, latitude);
                    if let Some(code) = &nearest {
                        warn!(
                            "coordinates {}, {} are outside of a country land area, \
                             matched to the closest country ({})",
                            longitude, latitude, code
                        );
                    }
                    nearest
                })
            }
        }
    }

    /// First ring of the place bounding box as numeric points. A present
    /// but wrong-shaped ring is logged and reported as absent.
    fn bounding_box_ring(&self) -> Option<Vec<(f64, f64)>> {
        let rings = self.place().coordinates()?;
        let ring = rings.first()?.as_array()?;
        if ring.is_empty() {
            return None;
        }
        let mut points = Vec::with_capacity(ring.len());
        for point in ring {
            let pair = (
                point.get(0).and_then(Value::as_f64),
                point.get(1).and_then(Value::as_f64),
            );
            match pair {
                (Some(longitude), Some(latitude)) => points.push((longitude, latitude)),
                _ => {
                    warn!("malformed bounding box point: {}", point);
                    return None;
                }
            }
        }
        Some(points)
    }
}

/// Area centroid of a ring given without its closing point. Degenerate
/// zero-area rings fall back to the vertex mean.
fn polygon_centroid(points: &[(f64, f64)]) -> (f64, f64) {
    let mut doubled_area = 0.0;
    let mut x = 0.0;
    let mut y = 0.0;
    for (i, &(x0, y0)) in points.iter().enumerate() {
        let (x1, y1) = points[(i + 1) % points.len()];
        let cross = x0 * y1 - x1 * y0;
        doubled_area += cross;
        x += (x0 + x1) * cross;
        y += (y0 + y1) * cross;
    }
    if doubled_area.abs() < f64::EPSILON {
        let (sx, sy) = points
            .iter()
            .fold((0.0, 0.0), |(sx, sy), &(px, py)| (sx + px, sy + py));
        return (sx / points.len() as f64, sy / points.len() as f64);
    }
    (x / (3.0 * doubled_area), y / (3.0 * doubled_area))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::tweet::view::TweetConfig;

    struct FakeGeocoder(Vec<GeoCandidate>);

    impl Geocode for FakeGeocoder {
        fn decode(&self, location: &str) -> Vec<GeoCandidate> {
            if location.is_empty() {
                return vec![];
            }
            self.0.clone()
        }
    }

    struct FakeRegions;

    impl RegionLookup for FakeRegions {
        fn contains(&self, longitude: f64, _latitude: f64) -> Option<String> {
            (longitude < 100.0).then(|| "CH".to_string())
        }

        fn nearest(&self, _longitude: f64, _latitude: f64) -> Option<String> {
            Some("IT".to_string())
        }

        fn region_of(&self, country_code: &str) -> Option<String> {
            (country_code == "CH").then(|| "Europe & Central Asia".to_string())
        }

        fn subregion_of(&self, country_code: &str) -> Option<String> {
            (country_code == "CH").then(|| "Western Europe".to_string())
        }
    }

    fn geo_config() -> TweetConfig {
        TweetConfig {
            regions: Some(Box::new(FakeRegions)),
            ..TweetConfig::default()
        }
    }

    #[test]
    fn coordinates_beat_the_place_bounding_box() {
        let raw = json!({
            "coordinates": {"coordinates": [8.54, 47.37]},
            "place": {
                "bounding_box": {"coordinates": [[[0.0, 0.0], [2.0, 0.0], [2.0, 2.0], [0.0, 2.0]]]},
                "country_code": "CH",
                "place_type": "city"
            }
        });
        let view = TweetView::detached(Some(&raw));
        let geo = view.geo_info();
        assert_eq!(geo.longitude, Some(8.54));
        assert_eq!(geo.latitude, Some(47.37));
        assert_eq!(geo.country_code.as_deref(), Some("CH"));
        assert_eq!(geo.location_type.as_deref(), Some("city"));
        assert_eq!(geo.source, Some(GeoSource::Coordinates));
    }

    #[test]
    fn place_centroid_is_the_bounding_box_center() {
        let raw = json!({
            "place": {
                "bounding_box": {"coordinates": [[[0.0, 0.0], [2.0, 0.0], [2.0, 2.0], [0.0, 2.0]]]},
                "country_code": "CH"
            }
        });
        let view = TweetView::detached(Some(&raw));
        let geo = view.geo_info();
        assert_eq!(geo.longitude, Some(1.0));
        assert_eq!(geo.latitude, Some(1.0));
        assert_eq!(geo.source, Some(GeoSource::Place));
    }

    #[test]
    fn degenerate_bounding_box_uses_the_vertex_mean() {
        let point = [8.5, 47.25];
        let raw = json!({
            "place": {
                "bounding_box": {"coordinates": [[point, point, point, point]]},
                "country_code": "CH"
            }
        });
        let view = TweetView::detached(Some(&raw));
        let geo = view.geo_info();
        assert_eq!(geo.longitude, Some(8.5));
        assert_eq!(geo.latitude, Some(47.25));
    }

    #[test]
    fn empty_place_country_code_is_resolved_by_reverse_lookup() {
        let raw = json!({
            "coordinates": {"coordinates": [8.54, 47.37]},
            "place": {"country_code": ""}
        });
        let config = geo_config();
        let view = TweetView::new(Some(&raw), &config);
        assert_eq!(view.geo_info().country_code.as_deref(), Some("CH"));
    }

    #[test]
    fn reverse_lookup_falls_back_to_the_nearest_country() {
        let raw = json!({"coordinates": {"coordinates": [170.0, -43.5]}});
        let config = geo_config();
        let view = TweetView::new(Some(&raw), &config);
        // outside every containment polygon of the fake table
        assert_eq!(view.geo_info().country_code.as_deref(), Some("IT"));
    }

    #[test]
    fn user_location_is_geocoded_last() {
        let raw = json!({"user": {"location": "Zurich, Switzerland"}});
        let config = TweetConfig {
            geocoder: Some(Box::new(FakeGeocoder(vec![GeoCandidate {
                longitude: 8.54,
                latitude: 47.37,
                country_code: Some("CH".to_string()),
                location_type: Some("city".to_string()),
            }]))),
            ..TweetConfig::default()
        };
        let view = TweetView::new(Some(&raw), &config);
        let geo = view.geo_info();
        assert_eq!(geo.longitude, Some(8.54));
        assert_eq!(geo.location_type.as_deref(), Some("city"));
        assert_eq!(geo.country_code.as_deref(), Some("CH"));
        assert_eq!(geo.source, Some(GeoSource::UserLocation));
    }

    #[test]
    fn candidate_without_country_code_uses_reverse_lookup() {
        let raw = json!({"user": {"location": "somewhere"}});
        let config = TweetConfig {
            geocoder: Some(Box::new(FakeGeocoder(vec![GeoCandidate {
                longitude: 8.54,
                latitude: 47.37,
                country_code: None,
                location_type: None,
            }]))),
            regions: Some(Box::new(FakeRegions)),
            ..TweetConfig::default()
        };
        let view = TweetView::new(Some(&raw), &config);
        assert_eq!(view.geo_info().country_code.as_deref(), Some("CH"));
    }

    #[test]
    fn unresolvable_records_yield_an_empty_geo_object() {
        let raw = json!({"text": "no geo at all"});
        let view = TweetView::detached(Some(&raw));
        assert_eq!(view.geo_info(), GeoInfo::default());

        let config = TweetConfig {
            geocoder: Some(Box::new(FakeGeocoder(vec![]))),
            ..TweetConfig::default()
        };
        let view = TweetView::new(Some(&raw), &config);
        assert_eq!(view.geo_info(), GeoInfo::default());
    }

    #[test]
    fn malformed_bounding_box_ring_is_skipped() {
        let raw = json!({
            "place": {"bounding_box": {"coordinates": [[["a", "b"]]]}}
        });
        let view = TweetView::detached(Some(&raw));
        assert_eq!(view.geo_info(), GeoInfo::default());
    }

    #[test]
    fn region_info_is_attached_for_known_countries() {
        let config = geo_config();
        let raw = json!({});
        let view = TweetView::new(Some(&raw), &config);
        let geo = view.add_region_info(GeoInfo {
            country_code: Some("CH".to_string()),
            ..GeoInfo::default()
        });
        assert_eq!(geo.region.as_deref(), Some("Europe & Central Asia"));
        assert_eq!(geo.subregion.as_deref(), Some("Western Europe"));
    }

    #[test]
    fn unknown_country_codes_leave_region_info_absent() {
        let config = geo_config();
        let raw = json!({});
        let view = TweetView::new(Some(&raw), &config);
        let geo = view.add_region_info(GeoInfo {
            country_code: Some("XX".to_string()),
            ..GeoInfo::default()
        });
        assert_eq!(geo.region, None);
        assert_eq!(geo.subregion, None);
    }

    #[test]
    fn serialization_drops_absent_fields() {
        let geo = GeoInfo {
            longitude: Some(1.0),
            latitude: Some(2.0),
            source: Some(GeoSource::Place),
            ..GeoInfo::default()
        };
        let value = serde_json::to_value(&geo).unwrap();
        assert_eq!(value["geo_type"], "tweet.place");
        assert_eq!(value["longitude"], 1.0);
        assert!(value.get("country_code").is_none());
        assert!(value.get("region").is_none());
    }
}
