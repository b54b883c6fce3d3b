//! Content-type inference and disposition for streamed objects.

/// Types reported by the storage layer that say nothing about the content.
const UNRELIABLE_TYPES: &[&str] = &[
    "application/octet-stream",
    "binary/octet-stream",
    "b2/x-auto",
];

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Map a file name to a MIME type by its extension.
pub fn infer_content_type(name: &str) -> &'static str {
    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        "ico" => "image/x-icon",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "m4a" => "audio/mp4",
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "ppt" => "application/vnd.ms-powerpoint",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "json" => "application/json",
        "zip" => "application/zip",
        _ => mime_guess::from_path(name)
            .first_raw()
            .unwrap_or(FALLBACK_CONTENT_TYPE),
    }
}

/// Prefer the type the storage layer reported unless it is missing or
/// generic, in which case infer it from the name.
pub fn resolve_content_type(name: &str, reported: Option<&str>) -> String {
    match reported.map(str::trim) {
        Some(reported)
            if !reported.is_empty()
                && !UNRELIABLE_TYPES
                    .iter()
                    .any(|t| reported.eq_ignore_ascii_case(t)) =>
        {
            reported.to_string()
        }
        _ => infer_content_type(name).to_string(),
    }
}

/// Images, video, audio and PDFs are viewed in place; everything else is
/// downloaded.
pub fn is_inline(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence.starts_with("image/")
        || essence.starts_with("video/")
        || essence.starts_with("audio/")
        || essence == "application/pdf"
}

/// `Content-Type` and `Content-Disposition` for serving an object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentHeaders {
    pub content_type: String,
    pub content_disposition: String,
}

impl ContentHeaders {
    pub fn for_object(name: &str, reported: Option<&str>) -> Self {
        let content_type = resolve_content_type(name, reported);
        let disposition = if is_inline(&content_type) {
            "inline"
        } else {
            "attachment"
        };
        let display_name = name.replace('\\', "\\\\").replace('"', "\\\"");
        Self {
            content_disposition: format!("{disposition}; filename=\"{display_name}\""),
            content_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn infers_common_types_case_insensitively() {
        let cases = vec![
            ("photo.JPG", "image/jpeg"),
            ("clip.mov", "video/quicktime"),
            ("song.mp3", "audio/mpeg"),
            ("report.pdf", "application/pdf"),
            (
                "sheet.xlsx",
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            ),
            ("notes.txt", "text/plain"),
            ("no_extension", "application/octet-stream"),
        ];
        for (name, expected) in cases {
            assert_eq!(infer_content_type(name), expected, "name: {name}");
        }
    }

    #[test]
    fn generic_reported_types_are_replaced() {
        assert_eq!(
            resolve_content_type("cat.png", Some("application/octet-stream")),
            "image/png"
        );
        assert_eq!(resolve_content_type("cat.png", Some("b2/x-auto")), "image/png");
        assert_eq!(resolve_content_type("cat.png", None), "image/png");
        assert_eq!(
            resolve_content_type("cat.png", Some("image/webp")),
            "image/webp"
        );
    }

    #[test]
    fn media_and_pdf_are_inline_everything_else_downloads() {
        assert_eq!(
            ContentHeaders::for_object("cat.png", None),
            ContentHeaders {
                content_type: "image/png".to_string(),
                content_disposition: "inline; filename=\"cat.png\"".to_string(),
            }
        );
        assert_eq!(
            ContentHeaders::for_object("a.pdf", None).content_disposition,
            "inline; filename=\"a.pdf\""
        );
        assert_eq!(
            ContentHeaders::for_object("budget \"final\".xlsx", None).content_disposition,
            "attachment; filename=\"budget \\\"final\\\".xlsx\""
        );
        assert!(is_inline("audio/ogg; codecs=opus"));
        assert!(!is_inline("text/plain"));
    }
}
