//! Reads the input ZIP archive and hands each valid JSON-wrapped HTML
//! document to a callback, without holding the whole archive in memory.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::warn;
use zip::ZipArchive;

#[derive(Debug, Deserialize)]
struct DocEnvelope {
    url: String,
    content: String,
}

/// Opens `archive_path` and calls `on_document(filename, url, html)` for
/// every member whose name ends in `.json` (case-insensitive) and whose
/// contents decode to `{url, content}`. A member that fails to read or
/// decode is logged and skipped; it does not abort the run. Returns the
/// number of documents accepted.
pub fn for_each_document(
    archive_path: &Path,
    mut on_document: impl FnMut(&str, &str, &str),
) -> Result<usize> {
    let file = File::open(archive_path)
        .with_context(|| format!("opening archive {}", archive_path.display()))?;
    let mut zip = ZipArchive::new(file)
        .with_context(|| format!("reading zip structure of {}", archive_path.display()))?;

    let mut accepted = 0;
    for i in 0..zip.len() {
        let mut entry = match zip.by_index(i) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(index = i, error = %e, "skipping unreadable zip entry");
                continue;
            }
        };
        let name = entry.name().to_string();
        if !name.to_lowercase().ends_with(".json") {
            continue;
        }

        let mut contents = String::new();
        if let Err(e) = entry.read_to_string(&mut contents) {
            warn!(member = name.as_str(), error = %e, "skipping unreadable archive member");
            continue;
        }

        match serde_json::from_str::<DocEnvelope>(&contents) {
            Ok(envelope) => {
                on_document(&name, &envelope.url, &envelope.content);
                accepted += 1;
            }
            Err(e) => {
                warn!(member = name.as_str(), error = %e, "skipping malformed document");
            }
        }
    }

    Ok(accepted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::FileOptions;

    fn write_fixture_archive(path: &Path) {
        let file = File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = FileOptions::default();

        writer.start_file("a.json", options).unwrap();
        writer
            .write_all(br#"{"url": "http://x/a", "content": "<title>Alpha</title>"}"#)
            .unwrap();

        writer.start_file("not-html.txt", options).unwrap();
        writer.write_all(b"ignored, not a .json member").unwrap();

        writer.start_file("broken.json", options).unwrap();
        writer.write_all(b"not valid json").unwrap();

        writer.finish().unwrap();
    }

    #[test]
    fn skips_non_json_members_and_malformed_documents() {
        let dir = tempfile::tempdir().unwrap();
        let archive_path = dir.path().join("fixture.zip");
        write_fixture_archive(&archive_path);

        let mut seen = Vec::new();
        let accepted = for_each_document(&archive_path, |name, url, html| {
            seen.push((name.to_string(), url.to_string(), html.to_string()));
        })
        .unwrap();

        assert_eq!(accepted, 1);
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, "a.json");
        assert_eq!(seen[0].1, "http://x/a");
    }
}
