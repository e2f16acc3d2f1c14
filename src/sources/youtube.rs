use url::Url;

const YOUTUBE_HOSTS: &[&str] = &[
    "youtube.com",
    "www.youtube.com",
    "m.youtube.com",
    "music.youtube.com",
    "gaming.youtube.com",
];

/// Checks that `candidate` is a YouTube video URL yt-dlp can stream.
///
/// Accepted shapes:
/// - `https://www.youtube.com/watch?v=<id>` (also `m.`, `music.`, `gaming.`)
/// - `https://youtu.be/<id>`
/// - `https://www.youtube.com/{embed,v,shorts,live}/<id>`
pub fn is_valid_track_url(candidate: &str) -> bool {
    let Ok(url) = Url::parse(candidate) else {
        return false;
    };
    if !matches!(url.scheme(), "http" | "https") {
        return false;
    }

    video_id(&url).is_some_and(is_video_id)
}

fn video_id(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_ascii_lowercase();
    let mut segments = url.path_segments()?;

    if host == "youtu.be" {
        return segments.next().map(str::to_string);
    }
    if !YOUTUBE_HOSTS.contains(&host.as_str()) {
        return None;
    }

    match segments.next()? {
        "watch" => url
            .query_pairs()
            .find(|(key, _)| key == "v")
            .map(|(_, value)| value.into_owned()),
        "embed" | "v" | "shorts" | "live" => segments.next().map(str::to_string),
        _ => None,
    }
}

fn is_video_id(id: String) -> bool {
    id.len() == 11
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
