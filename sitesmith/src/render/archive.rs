//! Zip export of a rendered file set

use crate::error::ArchiveError;
use crate::form::{FieldValue, FormData};
use crate::github::TemplateFile;
use std::io::{Cursor, Write};

/// Pack a rendered file set into a zip archive
///
/// Entries are written in input order, deflate-compressed. The
/// generated README is appended as `README.md` unless the set already
/// carries one.
///
/// # Errors
///
/// Returns [`ArchiveError`] when an entry cannot be written or the
/// archive cannot be finalized.
pub fn pack_archive(files: &[TemplateFile], readme: &str) -> Result<Vec<u8>, ArchiveError> {
    let buffer = Cursor::new(Vec::new());
    let mut zip = zip::ZipWriter::new(buffer);

    let options =
        zip::write::FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for file in files {
        zip.start_file(&file.path, options)?;
        zip.write_all(file.content.as_bytes())?;
    }

    if !files.iter().any(|f| f.path == "README.md") {
        zip.start_file("README.md", options)?;
        zip.write_all(readme.as_bytes())?;
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

/// Derive the archive filename from the user's site name
///
/// Whitespace runs collapse to `-`; an absent or empty name falls back
/// to `website.zip`.
#[must_use]
pub fn archive_file_name(data: &FormData) -> String {
    let name = data
        .get("name")
        .and_then(FieldValue::as_text)
        .map(str::trim)
        .filter(|s| !s.is_empty());

    name.map_or_else(
        || "website.zip".to_string(),
        |name| {
            let slug = name.split_whitespace().collect::<Vec<_>>().join("-");
            format!("{slug}.zip")
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn file(path: &str, content: &str) -> TemplateFile {
        TemplateFile {
            path: path.to_string(),
            original_path: path.to_string(),
            content: content.to_string(),
            size: None,
        }
    }

    fn entry_content(archive: &mut zip::ZipArchive<Cursor<Vec<u8>>>, name: &str) -> String {
        let mut entry = archive.by_name(name).unwrap();
        let mut content = String::new();
        entry.read_to_string(&mut content).unwrap();
        content
    }

    #[test]
    fn test_pack_round_trip() {
        let files = vec![
            file("index.html", "<h1>Ada</h1>"),
            file("css/site.css", "body {}"),
        ];

        let bytes = pack_archive(&files, "# Ada\n").unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();

        assert_eq!(archive.len(), 3);
        assert_eq!(entry_content(&mut archive, "index.html"), "<h1>Ada</h1>");
        assert_eq!(entry_content(&mut archive, "css/site.css"), "body {}");
        assert_eq!(entry_content(&mut archive, "README.md"), "# Ada\n");
    }

    #[test]
    fn test_pack_keeps_existing_readme() {
        let files = vec![file("README.md", "template readme")];

        let bytes = pack_archive(&files, "generated readme").unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();

        assert_eq!(archive.len(), 1);
        assert_eq!(entry_content(&mut archive, "README.md"), "template readme");
    }

    #[test]
    fn test_archive_file_name() {
        let mut data = FormData::new();
        assert_eq!(archive_file_name(&data), "website.zip");

        data.insert("name".to_string(), "Ada  Lovelace Site".into());
        assert_eq!(archive_file_name(&data), "Ada-Lovelace-Site.zip");

        data.insert("name".to_string(), "   ".into());
        assert_eq!(archive_file_name(&data), "website.zip");
    }
}
