//! MIME type guessing from file extensions

const DEFAULT_MIME: &str = "application/octet-stream";

/// Guess a MIME type from the extension of the last path segment
pub fn guess_mime_type(path: &str) -> &'static str {
    let name = path.rsplit('/').next().unwrap_or(path);
    let ext = match name.rsplit_once('.') {
        Some((_, ext)) => ext.to_lowercase(),
        None => return DEFAULT_MIME,
    };

    match ext.as_str() {
        "txt" => "text/plain",
        "md" => "text/markdown",
        "csv" => "text/csv",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" | "mjs" => "application/javascript",
        "json" => "application/json",
        "xml" => "application/xml",
        "wasm" => "application/wasm",
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        _ => DEFAULT_MIME,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_extensions() {
        assert_eq!(guess_mime_type("/a/notes.txt"), "text/plain");
        assert_eq!(guess_mime_type("/data.JSON"), "application/json");
        assert_eq!(guess_mime_type("/img/photo.jpeg"), "image/jpeg");
    }

    #[test]
    fn test_unknown_or_missing_extension() {
        assert_eq!(guess_mime_type("/archive.xyz"), DEFAULT_MIME);
        assert_eq!(guess_mime_type("/Makefile"), DEFAULT_MIME);
        // Dots in folder names do not count
        assert_eq!(guess_mime_type("/site.d/README"), DEFAULT_MIME);
    }
}
