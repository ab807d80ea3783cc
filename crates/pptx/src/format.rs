//! Template file format detection.

use serde::{Deserialize, Serialize};
use slidegen_core::{Error, Result};

/// ZIP local file header magic (`PK\x03\x04`).
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// The accepted template formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateFormat {
    /// Presentation (`.pptx`).
    Pptx,
    /// Presentation template (`.potx`).
    Potx,
}

impl TemplateFormat {
    /// Extensions accepted for uploads, without the dot.
    pub const EXTENSIONS: [&'static str; 2] = ["pptx", "potx"];

    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_lowercase().as_str() {
            "pptx" => Some(Self::Pptx),
            "potx" => Some(Self::Potx),
            _ => None,
        }
    }

    /// Detect format from a file name.
    pub fn from_filename(filename: &str) -> Option<Self> {
        filename
            .rsplit_once('.')
            .and_then(|(_, ext)| Self::from_extension(ext))
    }

    /// Validate the name and the leading bytes of an upload.
    ///
    /// Both formats are ZIP containers, so anything without the ZIP magic
    /// is rejected before it is parsed.
    pub fn sniff(filename: &str, bytes: &[u8]) -> Result<Self> {
        let format = Self::from_filename(filename).ok_or_else(|| {
            Error::UnsupportedFormat(format!(
                "'{}' is not a .pptx or .potx file",
                filename
            ))
        })?;
        if !bytes.starts_with(&ZIP_MAGIC) {
            return Err(Error::UnsupportedFormat(format!(
                "'{}' is not a presentation document",
                filename
            )));
        }
        Ok(format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extension() {
        assert_eq!(TemplateFormat::from_extension("pptx"), Some(TemplateFormat::Pptx));
        assert_eq!(TemplateFormat::from_extension(".POTX"), Some(TemplateFormat::Potx));
        assert_eq!(TemplateFormat::from_extension("ppt"), None);
        assert_eq!(TemplateFormat::from_filename("deck.final.pptx"), Some(TemplateFormat::Pptx));
        assert_eq!(TemplateFormat::from_filename("pptx"), None);
    }

    #[test]
    fn test_sniff() {
        let zip = b"PK\x03\x04rest";
        assert_eq!(TemplateFormat::sniff("a.pptx", zip).unwrap(), TemplateFormat::Pptx);
        assert!(matches!(
            TemplateFormat::sniff("a.docx", zip),
            Err(Error::UnsupportedFormat(_))
        ));
        assert!(matches!(
            TemplateFormat::sniff("a.pptx", b"%PDF-1.7"),
            Err(Error::UnsupportedFormat(_))
        ));
        assert!(matches!(
            TemplateFormat::sniff("a.pptx", b""),
            Err(Error::UnsupportedFormat(_))
        ));
    }
}
