//! Filesystem walk feeding the Library Indexer's `build_index` (§4.2, §6 `Scan(rootPath)`).

use std::path::Path;

use td_models::FileDescriptor;

/// Recursively collect every regular file under `root`, with paths relative to it. Hidden
/// entries (dotfiles) are skipped; everything else is handed to the path parser, which rejects
/// whatever doesn't match the Tesla naming contract.
pub fn walk(root: &Path) -> std::io::Result<Vec<FileDescriptor>> {
    let mut files = Vec::new();
    walk_into(root, root, &mut files)?;
    Ok(files)
}

fn walk_into(root: &Path, dir: &Path, out: &mut Vec<FileDescriptor>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let file_name = entry.file_name();
        if file_name.to_string_lossy().starts_with('.') {
            continue;
        }
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            walk_into(root, &path, out)?;
            continue;
        }
        if !file_type.is_file() {
            continue;
        }
        let metadata = entry.metadata()?;
        let modified_unix_ms = metadata
            .modified()
            .ok()
            .and_then(|m| m.duration_since(std::time::UNIX_EPOCH).ok())
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0);
        let rel_path = path
            .strip_prefix(root)
            .unwrap_or(&path)
            .to_string_lossy()
            .replace('\\', "/");
        out.push(FileDescriptor {
            path: path.clone(),
            rel_path,
            size: metadata.len(),
            identity: td_models::FileIdentity::from_size_and_mtime(metadata.len(), modified_unix_ms),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn walk_finds_nested_files_and_skips_dotfiles() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("RecentClips")).unwrap();
        fs::write(
            dir.path().join("RecentClips/2024-01-01_08-00-00-front.mp4"),
            b"x",
        )
        .unwrap();
        fs::write(dir.path().join(".DS_Store"), b"x").unwrap();

        let files = walk(dir.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].rel_path, "RecentClips/2024-01-01_08-00-00-front.mp4");
    }
}
