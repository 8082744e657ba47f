use anyhow::{Context, Result};
use chrono::Utc;
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tokio::{fs, io::AsyncWriteExt};

const PREFIX: &str = "snapshot-";
const EXT: &str = "html";

/// Save a fetched report page under `dest_dir` as `snapshot-<UTC timestamp>.html`.
/// Returns the full path of the saved file.
pub async fn save_snapshot(dest_dir: impl AsRef<Path>, html: &str) -> Result<PathBuf> {
    let stamp = Utc::now().format("%Y%m%dT%H%M%S%3fZ").to_string();
    write_new_snapshot(dest_dir.as_ref(), &stamp, html).await
}

/// Never overwrites: a name already taken gets `_1`, `_2`, ... appended to the stamp,
/// which still sorts after the unsuffixed name.
async fn write_new_snapshot(dest_dir: &Path, stamp: &str, html: &str) -> Result<PathBuf> {
    fs::create_dir_all(dest_dir)
        .await
        .with_context(|| format!("creating snapshot directory {:?}", dest_dir))?;

    let mut n = 0u32;
    loop {
        let name = if n == 0 {
            format!("{}{}.{}", PREFIX, stamp, EXT)
        } else {
            format!("{}{}_{}.{}", PREFIX, stamp, n, EXT)
        };
        let dest_path = dest_dir.join(name);
        match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&dest_path)
            .await
        {
            Ok(mut file) => {
                file.write_all(html.as_bytes())
                    .await
                    .with_context(|| format!("writing snapshot {:?}", dest_path))?;
                file.flush().await?;
                return Ok(dest_path);
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => n += 1,
            Err(e) => {
                return Err(e).with_context(|| format!("creating snapshot {:?}", dest_path))
            }
        }
    }
}

pub async fn load_snapshot(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    fs::read_to_string(path)
        .await
        .with_context(|| format!("reading snapshot {:?}", path))
}

/// Most recent snapshot in `dir`, judged by the timestamp in its name.
pub async fn latest_snapshot(dir: impl AsRef<Path>) -> Result<Option<PathBuf>> {
    let dir = dir.as_ref();
    if !fs::try_exists(dir).await.unwrap_or(false) {
        return Ok(None);
    }

    let mut latest: Option<(String, PathBuf)> = None;
    let mut entries = fs::read_dir(dir)
        .await
        .with_context(|| format!("listing snapshot directory {:?}", dir))?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|s| s.to_str()).map(str::to_string) else {
            continue;
        };
        if !name.starts_with(PREFIX) || path.extension().and_then(|s| s.to_str()) != Some(EXT) {
            continue;
        }
        if latest.as_ref().map_or(true, |(best, _)| name > *best) {
            latest = Some((name, path));
        }
    }
    Ok(latest.map(|(_, path)| path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_save_and_load() {
        let tmp = tempdir().unwrap();
        let html = "<table><tbody></tbody></table>";
        let path = save_snapshot(tmp.path().join("snaps"), html).await.unwrap();
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("snapshot-"));
        assert_eq!(load_snapshot(&path).await.unwrap(), html);
    }

    #[tokio::test]
    async fn test_same_stamp_does_not_overwrite() {
        let tmp = tempdir().unwrap();
        let stamp = "20240101T000000000Z";
        let first = write_new_snapshot(tmp.path(), stamp, "first").await.unwrap();
        let second = write_new_snapshot(tmp.path(), stamp, "second").await.unwrap();

        assert_ne!(first, second);
        assert_eq!(load_snapshot(&first).await.unwrap(), "first");
        assert_eq!(load_snapshot(&second).await.unwrap(), "second");
        assert_eq!(latest_snapshot(tmp.path()).await.unwrap().unwrap(), second);
    }

    #[tokio::test]
    async fn test_latest_snapshot_by_name() {
        let tmp = tempdir().unwrap();
        for name in [
            "snapshot-20240101T000000000Z.html",
            "snapshot-20240301T000000000Z.html",
            "snapshot-20240201T000000000Z.html",
            "notes.html",
            "snapshot-20250101T000000000Z.txt",
        ] {
            std::fs::write(tmp.path().join(name), "x").unwrap();
        }
        let latest = latest_snapshot(tmp.path()).await.unwrap().unwrap();
        assert_eq!(
            latest.file_name().unwrap().to_string_lossy(),
            "snapshot-20240301T000000000Z.html"
        );
    }

    #[tokio::test]
    async fn test_latest_snapshot_missing_dir() {
        let tmp = tempdir().unwrap();
        assert!(latest_snapshot(tmp.path().join("nope")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_load_missing_snapshot_fails() {
        let tmp = tempdir().unwrap();
        assert!(load_snapshot(tmp.path().join("missing.html")).await.is_err());
    }
}
