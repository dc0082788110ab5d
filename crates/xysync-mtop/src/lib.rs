//! Client, parser, and crawl driver for the marketplace's signed mtop API.

pub mod client;
pub mod convert;
pub mod detail;
pub mod error;
pub mod evasion;
pub mod feed;
pub mod filter;
pub mod item;
pub mod parse;
pub(crate) mod retry;
pub mod session;
pub mod signature;
pub(crate) mod tags;
pub mod types;

pub use client::{MtopClient, DEFAULT_BASE_URL};
pub use convert::{detail_url, feed_item_to_product, feed_items_to_products, merge_detail};
pub use detail::{parse_detail, DETAIL_API};
pub use error::MtopError;
pub use evasion::{DelayManager, Evasion, HeaderProfile, HeaderRandomizer};
pub use feed::{FeedHarvest, FeedOptions, FEED_API};
pub use filter::{filter_items, FeedFilter};
pub use item::{FeedItem, ItemDetail, ListingTime, SellerProfile};
pub use parse::{parse_card, parse_page, ParsedPage};
pub use session::{SessionCookie, SessionCredential};
pub use signature::{sign, sign_payload, SignedPayload, DEFAULT_APP_KEY};
pub use tags::parse_want_count;
pub use types::MtopResponse;
