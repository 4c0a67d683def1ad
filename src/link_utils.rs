use std::fmt;
use std::time::Duration;

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::errors::LinkError;

/// Share-link utilities for NetEase Cloud Music resources
///
/// This module resolves pasted share links (desktop client, web player,
/// mobile client and 163cn.tv short-link forms) into the resource kind and
/// numeric id the API works with.

// @const: Android client album share path carries the id in the path itself
static ANDROID_ALBUM_PATH_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^/album/(?P<id>\d*)/?$").unwrap()
});

/// Upper bound on chained short-link redirects before giving up
const MAX_SHORT_LINK_HOPS: usize = 5;

/// Kind of resource a share link points to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// A single song
    Song,
    /// An album and its tracks
    Album,
    /// A user playlist
    Playlist,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ResourceKind::Song => write!(f, "song"),
            ResourceKind::Album => write!(f, "album"),
            ResourceKind::Playlist => write!(f, "playlist"),
        }
    }
}

/// A share link resolved to a concrete resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceLink {
    /// What the link points to
    pub kind: ResourceKind,
    /// Numeric id of the resource
    pub id: u64,
}

impl fmt::Display for ResourceLink {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.id)
    }
}

/// Outcome of classifying one URL without any network access
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    /// The link names a resource directly
    Resource(ResourceLink),
    /// A 163cn.tv short link whose redirect target must be fetched
    ShortLink(String),
}

/// Classify a share link into a resource or a short link to expand.
///
/// Performs no network access; short links are reported as
/// `LinkTarget::ShortLink` for the caller to expand.
pub fn parse_link(link: &str) -> Result<LinkTarget, LinkError> {
    // The web player publishes hash-routed links (`/#/song?id=…`); fold the
    // route back into a plain path before parsing.
    let normalized = link.replacen("/#/", "/", 1);

    let parsed = Url::parse(&normalized)
        .map_err(|_| LinkError::UnsupportedLink(link.to_string()))?;

    let kind;
    let mut id: Option<u64> = None;

    match parsed.host_str().unwrap_or("") {
        "music.163.com" => match parsed.path() {
            "/playlist" => kind = ResourceKind::Playlist,
            "/album" => kind = ResourceKind::Album,
            "/song" => kind = ResourceKind::Song,
            path => match ANDROID_ALBUM_PATH_REGEX.captures(path) {
                Some(caps) => {
                    kind = ResourceKind::Album;
                    let raw = caps.name("id").map_or("", |m| m.as_str());
                    id = Some(raw.parse().map_err(|_| {
                        LinkError::ParseLink(format!("album id in path: {}", path))
                    })?);
                }
                None => return Err(LinkError::UnsupportedLink(link.to_string())),
            },
        },
        "y.music.163.com" => match parsed.path() {
            "/m/playlist" => kind = ResourceKind::Playlist,
            "/m/song" => kind = ResourceKind::Song,
            _ => return Err(LinkError::UnsupportedLink(link.to_string())),
        },
        "163cn.tv" => return Ok(LinkTarget::ShortLink(link.to_string())),
        _ => return Err(LinkError::UnsupportedLink(link.to_string())),
    }

    let id = match id {
        Some(id) => id,
        None => query_id(&parsed).ok_or_else(|| LinkError::ParseLink(link.to_string()))?,
    };

    Ok(LinkTarget::Resource(ResourceLink { kind, id }))
}

/// Resolve a share link all the way to a resource, expanding short links
/// through their redirect targets
pub async fn resolve_link(link: &str) -> Result<ResourceLink, LinkError> {
    let mut current = link.to_string();

    for _ in 0..MAX_SHORT_LINK_HOPS {
        match parse_link(&current)? {
            LinkTarget::Resource(resource) => return Ok(resource),
            LinkTarget::ShortLink(short) => {
                current = follow_short_link(&short).await?;
                debug!("Short link {} redirects to {}", short, current);
            }
        }
    }

    Err(LinkError::ParseLink(format!(
        "too many short-link redirects starting from {}",
        link
    )))
}

/// Numeric `id` query parameter, if present and well-formed
fn query_id(url: &Url) -> Option<u64> {
    url.query_pairs()
        .find(|(key, _)| key == "id")
        .and_then(|(_, value)| value.parse().ok())
}

/// Fetch a short link without following the redirect and hand back the
/// Location target
async fn follow_short_link(link: &str) -> Result<String, LinkError> {
    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .timeout(Duration::from_secs(10))
        .build()
        .map_err(|e| LinkError::ShortLinkRequest(e.to_string()))?;

    let response = client
        .get(link)
        .send()
        .await
        .map_err(|e| LinkError::ShortLinkRequest(e.to_string()))?;

    if response.status() != reqwest::StatusCode::FOUND {
        return Err(LinkError::ParseLink(format!(
            "unexpected status {} from short link {}",
            response.status(),
            link
        )));
    }

    match response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|value| value.to_str().ok())
    {
        Some(location) => Ok(location.to_string()),
        None => Err(LinkError::NoRedirectLocation(link.to_string())),
    }
}
