use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::index::{DisplayIndex, DisplayItem, ItemSelector};
use crate::model::{Metadata, OwnerId, Subject};
use crate::store::DataStore;
use chrono::{DateTime, Utc};
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use super::helpers::{indexed_items, items_by_selectors, load_profile};

/// Manifest stored as `recall/items.json` inside the archive.
#[derive(Debug, Serialize)]
struct Manifest<'a> {
    owner: &'a OwnerId,
    exported_at: DateTime<Utc>,
    repetition_flow: Vec<u32>,
    subjects: &'a [Subject],
    items: Vec<ManifestEntry<'a>>,
}

#[derive(Debug, Serialize)]
struct ManifestEntry<'a> {
    file: String,
    #[serde(flatten)]
    metadata: &'a Metadata,
}

/// Writes `recall-backup-YYYY-MM-DD.tar.gz` into `out_dir`. Without
/// selectors every active item is exported.
pub fn run<S: DataStore>(
    store: &S,
    owner: &OwnerId,
    selectors: &[ItemSelector],
    out_dir: &Path,
    now: DateTime<Utc>,
) -> Result<CmdResult> {
    let items = resolve_items(store, owner, selectors)?;

    if items.is_empty() {
        let mut res = CmdResult::default();
        res.add_message(CmdMessage::info("No items to export."));
        return Ok(res);
    }

    let profile = load_profile(store, owner)?;
    let filename = format!("recall-backup-{}.tar.gz", now.format("%Y-%m-%d"));
    let path = out_dir.join(filename);
    let file = File::create(&path)?;

    let manifest = Manifest {
        owner,
        exported_at: now,
        repetition_flow: profile.flow().days().to_vec(),
        subjects: &profile.subjects,
        items: items
            .iter()
            .map(|di| ManifestEntry {
                file: entry_name(di),
                metadata: &di.item.metadata,
            })
            .collect(),
    };
    write_archive(file, &manifest, &items)?;
    log::info!("exported {} items to {}", items.len(), path.display());

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Exported {} item(s) to {}",
        items.len(),
        path.display()
    )));
    result.exported = Some(path);
    Ok(result)
}

fn resolve_items<S: DataStore>(
    store: &S,
    owner: &OwnerId,
    selectors: &[ItemSelector],
) -> Result<Vec<DisplayItem>> {
    if selectors.is_empty() {
        Ok(indexed_items(store, owner)?
            .into_iter()
            .filter(|di| matches!(di.index, DisplayIndex::Active(_)))
            .collect())
    } else {
        items_by_selectors(store, owner, selectors)
    }
}

fn entry_name(di: &DisplayItem) -> String {
    format!(
        "{}-{}.md",
        sanitize_filename(&di.item.metadata.title),
        &di.item.metadata.id.to_string()[..8]
    )
}

fn write_archive<W: Write>(writer: W, manifest: &Manifest, items: &[DisplayItem]) -> Result<()> {
    let enc = GzEncoder::new(writer, Compression::default());
    let mut tar = tar::Builder::new(enc);

    let json = serde_json::to_string_pretty(manifest)?;
    append(&mut tar, "recall/items.json", json.as_bytes())?;

    for di in items {
        let content = format!("# {}\n\n{}\n", di.item.metadata.title, di.item.content);
        append(
            &mut tar,
            &format!("recall/{}", entry_name(di)),
            content.as_bytes(),
        )?;
    }

    tar.into_inner()?.finish()?;
    Ok(())
}

fn append<W: Write>(tar: &mut tar::Builder<W>, name: &str, data: &[u8]) -> Result<()> {
    let mut header = tar::Header::new_gnu();
    header.set_size(data.len() as u64);
    header.set_mode(0o644);
    header.set_mtime(Utc::now().timestamp().max(0) as u64);
    header.set_cksum();
    tar.append_data(&mut header, name, data)?;
    Ok(())
}

fn sanitize_filename(name: &str) -> String {
    let cleaned = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == ' ' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect::<String>()
        .trim()
        .to_string();
    if cleaned.is_empty() {
        "item".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::fixtures::*;
    use flate2::read::GzDecoder;
    use std::io::Read;
    use tempfile::tempdir;

    #[test]
    fn exports_active_items_by_default() {
        let fixture = StoreFixture::new()
            .with_item("Active", "x")
            .with_archived_item("Archived");
        let items = resolve_items(&fixture.store, &owner(), &[]).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].item.metadata.title, "Active");
    }

    #[test]
    fn writes_dated_archive_with_manifest() {
        let dir = tempdir().unwrap();
        let fixture = StoreFixture::new()
            .with_item("Ownership", "Each value has one owner.")
            .with_item("Borrowing", "Shared xor mutable.");
        let now = Utc::now();

        let res = run(&fixture.store, &owner(), &[], dir.path(), now).unwrap();
        let path = res.exported.unwrap();
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            format!("recall-backup-{}.tar.gz", now.format("%Y-%m-%d"))
        );

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(bytes[0], 0x1f);
        assert_eq!(bytes[1], 0x8b);

        let mut archive = tar::Archive::new(GzDecoder::new(&bytes[..]));
        let mut names = Vec::new();
        let mut manifest = String::new();
        for entry in archive.entries().unwrap() {
            let mut entry = entry.unwrap();
            let name = entry.path().unwrap().to_string_lossy().to_string();
            if name == "recall/items.json" {
                entry.read_to_string(&mut manifest).unwrap();
            }
            names.push(name);
        }
        assert_eq!(names.len(), 3);
        assert_eq!(names[0], "recall/items.json");
        assert!(names.iter().any(|n| n.starts_with("recall/Ownership-")));

        let parsed: serde_json::Value = serde_json::from_str(&manifest).unwrap();
        assert_eq!(parsed["owner"], "ana");
        assert_eq!(parsed["items"].as_array().unwrap().len(), 2);
        assert_eq!(parsed["items"][0]["review_count"], 0);
    }

    #[test]
    fn nothing_to_export() {
        let dir = tempdir().unwrap();
        let fixture = StoreFixture::new().with_archived_item("Old");
        let res = run(&fixture.store, &owner(), &[], dir.path(), Utc::now()).unwrap();
        assert!(res.exported.is_none());
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize_filename("Hello World"), "Hello World");
        assert_eq!(sanitize_filename("foo/bar"), "foo_bar");
        assert_eq!(sanitize_filename("  "), "item");
    }
}
