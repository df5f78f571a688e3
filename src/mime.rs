//! Static extension → media type table used for manifest entries.

pub const OCTET_STREAM: &str = "application/octet-stream";

/// Media type for a lowercase extension without the leading dot.
fn lookup(ext: &str) -> Option<&'static str> {
    let mime = match ext {
        "pdf" => "application/pdf",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "doc" => "application/msword",
        "xls" => "application/vnd.ms-excel",
        "ppt" => "application/vnd.ms-powerpoint",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "zip" => "application/zip",
        "txt" => "text/plain",
        _ => return None,
    };
    Some(mime)
}

/// Extension after the last dot, or `""` when there is none or it is empty.
pub fn file_extension(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(pos) if pos + 1 < file_name.len() => &file_name[pos + 1..],
        _ => "",
    }
}

/// Infer the media type from a file name's extension (case-insensitive).
/// Unknown extensions map to `application/octet-stream`.
pub fn media_type_for(file_name: &str) -> &'static str {
    let ext = file_extension(file_name).to_ascii_lowercase();
    lookup(&ext).unwrap_or(OCTET_STREAM)
}
