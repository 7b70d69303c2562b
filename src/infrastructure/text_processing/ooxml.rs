//! Shared plumbing for the zip-packaged XML formats (docx, xlsx).

use std::fmt::Display;
use std::io::{Cursor, Read};

use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesRef, BytesStart};
use zip::ZipArchive;
use zip::result::ZipError;

use crate::application::ports::FileLoaderError;

pub(crate) struct OoxmlPackage<'a> {
    archive: ZipArchive<Cursor<&'a [u8]>>,
}

impl<'a> OoxmlPackage<'a> {
    pub(crate) fn open(data: &'a [u8]) -> Result<Self, FileLoaderError> {
        let archive = ZipArchive::new(Cursor::new(data)).map_err(|e| {
            FileLoaderError::ExtractionFailed(format!("not a valid OOXML package: {e}"))
        })?;
        Ok(Self { archive })
    }

    /// Reads a part as UTF-8. A missing part is `None`, not an error.
    pub(crate) fn read_part(&mut self, name: &str) -> Result<Option<String>, FileLoaderError> {
        let mut entry = match self.archive.by_name(name) {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => {
                return Err(FileLoaderError::ExtractionFailed(format!(
                    "failed to open {name}: {e}"
                )));
            }
        };

        let mut xml = String::new();
        entry.read_to_string(&mut xml).map_err(|e| {
            FileLoaderError::ExtractionFailed(format!("failed to read {name}: {e}"))
        })?;
        Ok(Some(xml))
    }

    pub(crate) fn require_part(&mut self, name: &str) -> Result<String, FileLoaderError> {
        self.read_part(name)?
            .ok_or_else(|| FileLoaderError::ExtractionFailed(format!("missing part {name}")))
    }
}

pub(crate) fn xml_error(error: impl Display) -> FileLoaderError {
    FileLoaderError::ExtractionFailed(format!("malformed XML: {error}"))
}

/// Expands `&amp;`-style and numeric references reported between text events.
pub(crate) fn resolve_reference(reference: &BytesRef<'_>) -> Result<String, FileLoaderError> {
    if let Some(ch) = reference.resolve_char_ref().map_err(xml_error)? {
        return Ok(ch.to_string());
    }
    let name = reference.decode().map_err(xml_error)?;
    Ok(resolve_predefined_entity(&name)
        .unwrap_or_default()
        .to_string())
}

/// Value of the attribute whose local name (prefix ignored) is `key`.
pub(crate) fn attribute(element: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    element
        .attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == key)
        .map(|a| String::from_utf8_lossy(&a.value).into_owned())
}
