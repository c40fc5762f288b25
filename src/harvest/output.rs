//! Output artifact writers for a completed session.
//!
//! Each session directory receives four artifacts: a binary-encoded PMID
//! list, a JSON document of all records, a directory of per-record text
//! files, and a ZIP archive bundling exactly that directory's contents.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::error::Result;
use crate::models::ArticleRecord;

pub const IDS_FILE: &str = "article_ids.bin";
pub const JSON_FILE: &str = "articles.json";
pub const TEXT_DIR: &str = "articles_txt";
pub const ARCHIVE_FILE: &str = "articles.zip";

/// Write the ordered PMID list in binary-encoded form
pub fn write_id_list(path: &Path, records: &[ArticleRecord]) -> Result<()> {
    let ids: Vec<&str> = records.iter().map(|r| r.pmid.as_str()).collect();
    fs::write(path, bincode::serialize(&ids)?)?;
    info!(count = ids.len(), path = %path.display(), "id list written");
    Ok(())
}

/// Write the full record list as a JSON array, in fetch order
pub fn write_json_document(path: &Path, records: &[ArticleRecord]) -> Result<()> {
    fs::write(path, serde_json::to_string_pretty(records)?)?;
    info!(count = records.len(), path = %path.display(), "json document written");
    Ok(())
}

/// Write one `<index>.txt` per record under `dir`
pub fn write_text_files(dir: &Path, records: &[ArticleRecord]) -> Result<()> {
    fs::create_dir_all(dir)?;
    for (index, record) in records.iter().enumerate() {
        fs::write(dir.join(format!("{}.txt", index)), record.to_text())?;
    }
    info!(count = records.len(), dir = %dir.display(), "text files written");
    Ok(())
}

/// Archive the per-record text files; entry names are relative to
/// `text_dir` and nothing else goes into the archive.
pub fn write_archive(path: &Path, text_dir: &Path) -> Result<()> {
    let file = fs::File::create(path)?;
    let mut archive = ZipWriter::new(file);
    let options = SimpleFileOptions::default();

    let mut entries: Vec<PathBuf> = fs::read_dir(text_dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    entries.sort();

    for entry in &entries {
        let name = entry
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        archive.start_file(name, options)?;
        let mut source = fs::File::open(entry)?;
        std::io::copy(&mut source, &mut archive)?;
    }

    archive.finish()?;
    info!(entries = entries.len(), path = %path.display(), "archive written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::tempdir;

    fn record(pmid: &str, title: &str) -> ArticleRecord {
        ArticleRecord {
            pmid: pmid.to_string(),
            title: Some(title.to_string()),
            book_title: None,
            abstract_text: Some(String::new()),
            authors: vec![],
            publication_date: "Unknown".to_string(),
            keywords: vec![],
            journal: Some("Unknown".to_string()),
            publisher: None,
            copyright: "Unknown".to_string(),
            sections: BTreeMap::new(),
        }
    }

    #[test]
    fn test_id_list_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(IDS_FILE);
        let records = vec![record("111", "a"), record("222", "b")];

        write_id_list(&path, &records).unwrap();

        let ids: Vec<String> = bincode::deserialize(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(ids, vec!["111", "222"]);
    }

    #[test]
    fn test_json_document_is_an_array_in_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(JSON_FILE);
        let records = vec![record("111", "first"), record("222", "second")];

        write_json_document(&path, &records).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        let array = value.as_array().unwrap();
        assert_eq!(array.len(), 2);
        assert_eq!(array[0]["PMID"], "111");
        assert_eq!(array[1]["Title"], "second");
    }

    #[test]
    fn test_text_files_one_per_record() {
        let dir = tempdir().unwrap();
        let text_dir = dir.path().join(TEXT_DIR);
        let records = vec![record("111", "a"), record("222", "b"), record("333", "c")];

        write_text_files(&text_dir, &records).unwrap();

        assert_eq!(fs::read_dir(&text_dir).unwrap().count(), 3);
        let first = fs::read_to_string(text_dir.join("0.txt")).unwrap();
        assert!(first.contains("PMID: 111\n"));
        assert!(first.contains("Title: a\n"));
    }

    #[test]
    fn test_archive_contains_exactly_the_text_files() {
        let dir = tempdir().unwrap();
        let text_dir = dir.path().join(TEXT_DIR);
        let archive_path = dir.path().join(ARCHIVE_FILE);
        let records = vec![record("111", "a"), record("222", "b")];

        write_text_files(&text_dir, &records).unwrap();
        write_archive(&archive_path, &text_dir).unwrap();

        let file = fs::File::open(&archive_path).unwrap();
        let mut archive = zip::ZipArchive::new(file).unwrap();
        assert_eq!(archive.len(), 2);

        let names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        assert!(names.contains(&"0.txt".to_string()));
        assert!(names.contains(&"1.txt".to_string()));
        // Entry names carry no directory prefix
        assert!(names.iter().all(|n| !n.contains('/')));
    }
}
