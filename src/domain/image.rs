//! Accepted image formats for product uploads

/// Image formats a product upload may carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
}

/// Accepted names, matched against both the file extension and the MIME subtype
const ALLOWED_NAMES: &[(&str, ImageFormat)] = &[
    ("jpeg", ImageFormat::Jpeg),
    ("jpg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("gif", ImageFormat::Gif),
];

impl ImageFormat {
    fn from_name(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        ALLOWED_NAMES
            .iter()
            .find(|(allowed, _)| *allowed == lower)
            .map(|(_, format)| *format)
    }

    /// Match a file extension (without the dot), case-insensitive
    pub fn from_extension(ext: &str) -> Option<Self> {
        Self::from_name(ext)
    }

    /// Match a declared MIME type such as `image/png`; parameters are ignored
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or("").trim();
        let (top, sub) = essence.split_once('/')?;
        if !top.eq_ignore_ascii_case("image") {
            return None;
        }
        Self::from_name(sub)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Png => "png",
            ImageFormat::Gif => "gif",
        }
    }
}

/// Human-readable list used in rejection messages
pub fn allowed_list() -> String {
    ALLOWED_NAMES
        .iter()
        .map(|(name, _)| *name)
        .collect::<Vec<_>>()
        .join(", ")
}
