use std::fmt;

/// Image media types accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageType {
    /// `image/jpeg`
    Jpeg,
    /// `image/png`
    Png,
    /// `image/webp`
    Webp,
    /// `image/gif`
    Gif,
    /// `image/svg+xml`
    Svg,
}

impl ImageType {
    /// Parses a declared media type (`image/png`, `image/svg+xml; charset=utf-8`, ...).
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or(mime).trim();
        match essence.to_ascii_lowercase().as_str() {
            "image/jpeg" => Some(ImageType::Jpeg),
            "image/png" => Some(ImageType::Png),
            "image/webp" => Some(ImageType::Webp),
            "image/gif" => Some(ImageType::Gif),
            "image/svg+xml" => Some(ImageType::Svg),
            _ => None,
        }
    }

    /// Maps a file extension (with or without the leading dot) to its image type.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(ImageType::Jpeg),
            "png" => Some(ImageType::Png),
            "webp" => Some(ImageType::Webp),
            "gif" => Some(ImageType::Gif),
            "svg" => Some(ImageType::Svg),
            _ => None,
        }
    }

    /// Canonical media type string
    pub fn mime(&self) -> &'static str {
        match self {
            ImageType::Jpeg => "image/jpeg",
            ImageType::Png => "image/png",
            ImageType::Webp => "image/webp",
            ImageType::Gif => "image/gif",
            ImageType::Svg => "image/svg+xml",
        }
    }

    /// Default file extension, including the leading dot
    pub fn extension(&self) -> &'static str {
        match self {
            ImageType::Jpeg => ".jpg",
            ImageType::Png => ".png",
            ImageType::Webp => ".webp",
            ImageType::Gif => ".gif",
            ImageType::Svg => ".svg",
        }
    }
}

impl fmt::Display for ImageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime())
    }
}
