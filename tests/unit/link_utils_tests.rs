/*!
 * Tests for share link parsing
 */

use ncmlyrics::errors::LinkError;
use ncmlyrics::link_utils::{parse_link, resolve_link, LinkTarget, ResourceKind, ResourceLink};

/// Test parsing a plain desktop song link
#[test]
fn test_parse_link_withSongLink_shouldResolveSong() {
    let target = parse_link("https://music.163.com/song?id=1991012").unwrap();
    assert_eq!(
        target,
        LinkTarget::Resource(ResourceLink {
            kind: ResourceKind::Song,
            id: 1991012
        })
    );
}

/// Test parsing an album link
#[test]
fn test_parse_link_withAlbumLink_shouldResolveAlbum() {
    let target = parse_link("https://music.163.com/album?id=35757233").unwrap();
    assert_eq!(
        target,
        LinkTarget::Resource(ResourceLink {
            kind: ResourceKind::Album,
            id: 35757233
        })
    );
}

/// Test parsing a playlist link
#[test]
fn test_parse_link_withPlaylistLink_shouldResolvePlaylist() {
    let target = parse_link("https://music.163.com/playlist?id=123123123").unwrap();
    assert_eq!(
        target,
        LinkTarget::Resource(ResourceLink {
            kind: ResourceKind::Playlist,
            id: 123123123
        })
    );
}

/// Test that the web player's hash-routed form parses like the plain one
#[test]
fn test_parse_link_withHashRoutedLink_shouldResolve() {
    let target = parse_link("https://music.163.com/#/playlist?id=456").unwrap();
    assert_eq!(
        target,
        LinkTarget::Resource(ResourceLink {
            kind: ResourceKind::Playlist,
            id: 456
        })
    );
}

/// Test the mobile web player link forms
#[test]
fn test_parse_link_withMobileLinks_shouldResolve() {
    let song = parse_link("https://y.music.163.com/m/song?id=77").unwrap();
    assert_eq!(
        song,
        LinkTarget::Resource(ResourceLink {
            kind: ResourceKind::Song,
            id: 77
        })
    );

    let playlist = parse_link("https://y.music.163.com/m/playlist?id=88").unwrap();
    assert_eq!(
        playlist,
        LinkTarget::Resource(ResourceLink {
            kind: ResourceKind::Playlist,
            id: 88
        })
    );
}

/// Test the Android client album form carrying the id in the path
#[test]
fn test_parse_link_withAndroidAlbumPath_shouldResolveAlbum() {
    let target = parse_link("https://music.163.com/album/321/").unwrap();
    assert_eq!(
        target,
        LinkTarget::Resource(ResourceLink {
            kind: ResourceKind::Album,
            id: 321
        })
    );
}

/// Test that a 163cn.tv link is reported as a short link, no network access
#[test]
fn test_parse_link_withShortLink_shouldReportShortLink() {
    let target = parse_link("http://163cn.tv/abc123").unwrap();
    assert_eq!(target, LinkTarget::ShortLink("http://163cn.tv/abc123".to_string()));
}

/// Test rejection of hosts this tool does not understand
#[test]
fn test_parse_link_withUnsupportedHost_shouldFail() {
    let result = parse_link("https://example.com/song?id=1");
    assert!(matches!(result, Err(LinkError::UnsupportedLink(_))));
}

/// Test rejection of a recognized host with an unknown path
#[test]
fn test_parse_link_withUnknownPath_shouldFail() {
    let result = parse_link("https://music.163.com/artist?id=1");
    assert!(matches!(result, Err(LinkError::UnsupportedLink(_))));
}

/// Test rejection when the id query parameter is missing or malformed
#[test]
fn test_parse_link_withMissingId_shouldFail() {
    assert!(matches!(
        parse_link("https://music.163.com/song"),
        Err(LinkError::ParseLink(_))
    ));
    assert!(matches!(
        parse_link("https://music.163.com/song?id=notanumber"),
        Err(LinkError::ParseLink(_))
    ));
}

/// Test rejection of text that is not a URL at all
#[test]
fn test_parse_link_withGarbage_shouldFail() {
    assert!(matches!(
        parse_link("not a link"),
        Err(LinkError::UnsupportedLink(_))
    ));
}

/// Test that resolving a direct link needs no redirect expansion
#[tokio::test]
async fn test_resolve_link_withDirectLink_shouldResolveWithoutNetwork() {
    let resource = resolve_link("https://music.163.com/song?id=42").await.unwrap();
    assert_eq!(
        resource,
        ResourceLink {
            kind: ResourceKind::Song,
            id: 42
        }
    );
}

/// Test the display form used in log messages
#[test]
fn test_resource_link_display_shouldNameKindAndId() {
    let link = ResourceLink {
        kind: ResourceKind::Playlist,
        id: 9,
    };
    assert_eq!(link.to_string(), "playlist 9");
}
