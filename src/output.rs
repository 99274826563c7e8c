//! Output-shape types: the PDF/screenshot distinction and the HTTP response
//! descriptor handed to a consuming framework.

use std::fmt;
use std::str::FromStr;

/// The two kinds of artifact the engine can produce. Fixed per capture
/// instance at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Pdf,
    Screenshot,
}

impl OutputFormat {
    /// Default file extension for the format. Screenshots may override this
    /// through [`ImageType`].
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Pdf => "pdf",
            OutputFormat::Screenshot => "png",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Pdf => "application/pdf",
            OutputFormat::Screenshot => "image/png",
        }
    }

    /// Label used in error messages when a forwarded method is rejected.
    pub fn adapter_label(self) -> &'static str {
        match self {
            OutputFormat::Pdf => "PdfCapture",
            OutputFormat::Screenshot => "ScreenshotCapture",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Pdf => write!(f, "pdf"),
            OutputFormat::Screenshot => write!(f, "screenshot"),
        }
    }
}

/// Image encoding for screenshot captures, forwarded to the engine as the
/// screenshot `type` option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageType {
    Png,
    Jpeg,
    Webp,
}

impl ImageType {
    pub fn extension(self) -> &'static str {
        match self {
            ImageType::Png => "png",
            ImageType::Jpeg => "jpeg",
            ImageType::Webp => "webp",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ImageType::Png => "image/png",
            ImageType::Jpeg => "image/jpeg",
            ImageType::Webp => "image/webp",
        }
    }
}

impl FromStr for ImageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(ImageType::Png),
            "jpg" | "jpeg" => Ok(ImageType::Jpeg),
            "webp" => Ok(ImageType::Webp),
            other => Err(format!(
                "Unsupported screenshot type '{}': expected png, jpeg, or webp",
                other
            )),
        }
    }
}

impl fmt::Display for ImageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Everything a framework needs to turn a rendered artifact into an HTTP
/// response. Packaging only; nothing here writes to a socket.
#[derive(Debug, Clone)]
pub struct ResponseDescriptor {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub file_name: String,
}

impl ResponseDescriptor {
    /// Content-Disposition header value for a download response.
    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_extension_and_mime() {
        assert_eq!(OutputFormat::Pdf.extension(), "pdf");
        assert_eq!(OutputFormat::Pdf.mime_type(), "application/pdf");
        assert_eq!(OutputFormat::Pdf.adapter_label(), "PdfCapture");
    }

    #[test]
    fn screenshot_defaults_to_png() {
        assert_eq!(OutputFormat::Screenshot.extension(), "png");
        assert_eq!(OutputFormat::Screenshot.mime_type(), "image/png");
        assert_eq!(OutputFormat::Screenshot.adapter_label(), "ScreenshotCapture");
    }

    #[test]
    fn image_type_parses_aliases() {
        assert_eq!("png".parse::<ImageType>().unwrap(), ImageType::Png);
        assert_eq!("jpg".parse::<ImageType>().unwrap(), ImageType::Jpeg);
        assert_eq!("JPEG".parse::<ImageType>().unwrap(), ImageType::Jpeg);
        assert_eq!("webp".parse::<ImageType>().unwrap(), ImageType::Webp);
        assert!("bmp".parse::<ImageType>().is_err());
    }

    #[test]
    fn content_disposition_quotes_file_name() {
        let descriptor = ResponseDescriptor {
            bytes: vec![1, 2, 3],
            mime_type: "application/pdf".to_string(),
            file_name: "invoice.pdf".to_string(),
        };

        assert_eq!(
            descriptor.content_disposition(),
            "attachment; filename=\"invoice.pdf\""
        );
    }
}
