/*! Tweet record model.

[`TweetView`] and its sub-views give read-only, lazily evaluated access to
raw status records. Extraction flattens a view into the output shapes and
geo resolution enriches them with a geographic point and country.
!*/
mod extract;
mod geo;
mod view;

pub use extract::{ExtractOptions, MediaInfo, TweetExtract};
pub use geo::{GeoCandidate, GeoInfo, GeoSource, Geocode, RegionLookup};
pub use view::{ExtendedTweetView, PlaceView, TweetConfig, TweetView, UserView};
