//! MIME type resolution and display labels.
//!
//! Uploads that arrive without a declared content type are resolved from the
//! filename extension. Listings decorate each row with a human-readable label
//! and a coarse category.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::constants::OCTET_STREAM;

/// MIME types that are summarized by the vision model instead of being uploaded raw.
pub const IMAGE_MIME_TYPES: &[&str] = &[
    "image/png",
    "image/jpeg",
    "image/jpg",
    "image/webp",
    "image/gif",
    "image/bmp",
    "image/tiff",
    "image/svg+xml",
    "image/heic",
    "image/heif",
];

/// Extension to MIME table. Lookups are case-insensitive on the extension.
const EXTENSION_MIME_TYPES: &[(&str, &str)] = &[
    // images
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("webp", "image/webp"),
    ("gif", "image/gif"),
    ("bmp", "image/bmp"),
    ("tif", "image/tiff"),
    ("tiff", "image/tiff"),
    ("svg", "image/svg+xml"),
    ("heic", "image/heic"),
    ("heif", "image/heif"),
    // documents
    ("pdf", "application/pdf"),
    ("doc", "application/msword"),
    (
        "docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
    ("xls", "application/vnd.ms-excel"),
    (
        "xlsx",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    ),
    (
        "pptx",
        "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    ),
    ("odt", "application/vnd.oasis.opendocument.text"),
    ("rtf", "text/rtf"),
    // data
    ("json", "application/json"),
    ("xml", "application/xml"),
    ("csv", "text/csv"),
    ("tsv", "text/tab-separated-values"),
    ("yaml", "application/x-yaml"),
    ("yml", "text/yaml"),
    ("sql", "application/sql"),
    ("ipynb", "application/x-ipynb+json"),
    // text
    ("txt", "text/plain"),
    ("md", "text/markdown"),
    ("markdown", "text/markdown"),
    ("html", "text/html"),
    ("htm", "text/html"),
    // code
    ("py", "text/x-python"),
    ("js", "text/javascript"),
    ("ts", "text/typescript"),
    ("java", "text/x-java-source"),
    ("c", "text/x-c"),
    ("cpp", "text/x-c++"),
    ("cs", "text/x-csharp"),
    ("go", "text/x-go"),
    ("rs", "text/x-rust"),
    ("rb", "text/x-ruby"),
    ("php", "text/x-php"),
    ("kt", "text/x-kotlin"),
    ("swift", "text/x-swift"),
    ("dart", "text/x-dart"),
    ("sh", "application/x-sh"),
    // archives
    ("zip", "application/zip"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    Document,
    Data,
    Text,
    Code,
    Archive,
    Notebook,
    Image,
}

/// Display information for a stored MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileTypeInfo {
    pub label: &'static str,
    pub category: FileCategory,
}

const fn info(label: &'static str, category: FileCategory) -> FileTypeInfo {
    FileTypeInfo { label, category }
}

const UNKNOWN: FileTypeInfo = info("Unknown", FileCategory::Document);

/// Resolve the MIME type recorded for an upload.
///
/// A non-empty declared type wins (parameters such as `; charset=utf-8` are
/// stripped). Otherwise the extension table is consulted, falling back to
/// `application/octet-stream`.
pub fn resolve_mime_type(declared: Option<&str>, filename: &str) -> String {
    let declared = declared
        .map(normalize_mime_type)
        .filter(|mime| !mime.is_empty());

    match declared {
        Some(mime) => mime,
        None => mime_from_extension(filename)
            .unwrap_or(OCTET_STREAM)
            .to_string(),
    }
}

/// Strip parameters and lowercase (`Text/Plain; charset=utf-8` -> `text/plain`).
pub fn normalize_mime_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase()
}

pub fn mime_from_extension(filename: &str) -> Option<&'static str> {
    let (_, extension) = filename.rsplit_once('.')?;
    let extension = extension.to_lowercase();
    EXTENSION_MIME_TYPES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, mime)| *mime)
}

pub fn is_image_mime(mime: &str) -> bool {
    IMAGE_MIME_TYPES.contains(&mime)
}

pub fn file_type_info(mime: &str) -> FileTypeInfo {
    use FileCategory::*;

    match normalize_mime_type(mime).as_str() {
        "application/pdf" => info("PDF Document", Document),
        "application/msword"
        | "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
            info("Word Document", Document)
        }
        "application/vnd.ms-excel"
        | "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet" => {
            info("Excel Spreadsheet", Document)
        }
        "application/vnd.openxmlformats-officedocument.presentationml.presentation" => {
            info("PowerPoint Presentation", Document)
        }
        "application/vnd.oasis.opendocument.text" => info("OpenDocument Text", Document),
        "application/json" => info("JSON", Data),
        "application/xml" | "text/xml" => info("XML", Data),
        "text/csv" => info("CSV", Data),
        "text/tab-separated-values" => info("TSV", Data),
        "application/x-yaml" | "text/yaml" => info("YAML", Data),
        "application/sql" | "text/x-sql" => info("SQL", Data),
        "text/plain" => info("Text File", Text),
        "text/markdown" => info("Markdown", Text),
        "text/html" => info("HTML", Text),
        "text/rtf" => info("Rich Text", Text),
        "text/x-python" => info("Python", Code),
        "text/javascript" | "application/javascript" => info("JavaScript", Code),
        "text/typescript" | "application/typescript" => info("TypeScript", Code),
        "text/x-java-source" => info("Java", Code),
        "text/x-c" => info("C", Code),
        "text/x-c++" => info("C++", Code),
        "text/x-csharp" => info("C#", Code),
        "text/x-go" => info("Go", Code),
        "text/x-rust" => info("Rust", Code),
        "text/x-ruby" => info("Ruby", Code),
        "text/x-php" => info("PHP", Code),
        "text/x-kotlin" => info("Kotlin", Code),
        "text/x-swift" => info("Swift", Code),
        "text/x-dart" => info("Dart", Code),
        "application/x-sh" | "text/x-shellscript" => info("Shell Script", Code),
        "application/zip" => info("ZIP Archive", Archive),
        "application/x-ipynb+json" => info("Jupyter Notebook", Notebook),
        "image/png" => info("PNG Image", Image),
        "image/jpeg" => info("JPEG Image", Image),
        "image/jpg" => info("JPG Image", Image),
        "image/webp" => info("WebP Image", Image),
        "image/gif" => info("GIF Image", Image),
        "image/svg+xml" => info("SVG Image", Image),
        "image/bmp" => info("BMP Image", Image),
        "image/tiff" => info("TIFF Image", Image),
        "image/heic" => info("HEIC Image", Image),
        "image/heif" => info("HEIF Image", Image),
        _ => UNKNOWN,
    }
}
