use wildtrack_shared::parser::{self, ParsedTracks};
use wildtrack_shared::utm::UtmZone;

/// Where the backend serves the tracks export.
pub const TRACKS_PATH: &str = "/data/tracks.csv";

/// Zone the exported UTM coordinates are in.
pub const TRACKS_ZONE: UtmZone = UtmZone::ZONE_18_NORTH;

/// Build an absolute URL from the page origin and a server path.
pub fn build_url(origin: &str, path: &str) -> String {
    format!(
        "{}/{}",
        origin.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

fn tracks_url() -> Result<String, String> {
    let origin = web_sys::window()
        .ok_or("no browser window")?
        .location()
        .origin()
        .map_err(|_| "page origin unavailable".to_string())?;
    Ok(build_url(&origin, TRACKS_PATH))
}

/// Fetch the raw CSV text.
pub async fn fetch_tracks_csv() -> Result<String, String> {
    let resp = reqwest::get(tracks_url()?)
        .await
        .map_err(|e| e.to_string())?;
    if !resp.status().is_success() {
        return Err(format!("Failed to load tracks: HTTP {}", resp.status()));
    }
    resp.text().await.map_err(|e| e.to_string())
}

/// Fetch and parse the tracks export. Rows that fail to parse are dropped
/// and counted in the result.
pub async fn fetch_tracks() -> Result<ParsedTracks, String> {
    let text = fetch_tracks_csv().await?;
    parser::parse_tracks(&text, TRACKS_ZONE).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url() {
        assert_eq!(
            build_url("http://localhost:3000", TRACKS_PATH),
            "http://localhost:3000/data/tracks.csv"
        );
    }

    #[test]
    fn test_build_url_trailing_slash() {
        assert_eq!(
            build_url("https://tracks.example.org/", "/data/tracks.csv"),
            "https://tracks.example.org/data/tracks.csv"
        );
    }

    #[test]
    fn test_tracks_zone() {
        assert_eq!(TRACKS_ZONE.to_string(), "18N");
    }
}
