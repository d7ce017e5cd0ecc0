/// File extensions treated as CSV input in batch mode.
const INPUT_EXTENSIONS: &[&str] = &["csv", "txt"];

/// Checks that the input path exists.
///
/// # Errors
/// * If the path does not exist.
pub fn check_path<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<()> {
    if !path.as_ref().exists() {
        return Err(anyhow::anyhow!("Input path does not exist: {}", path.as_ref().display()));
    }
    anyhow::Ok(())
}

/// Creates the parent directory of `path` if it is missing.
pub fn ensure_parent_dir_exist<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<()> {
    if let Some(parent) = path.as_ref().parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    anyhow::Ok(())
}

/// Creates `dir` (and parents) if it is missing.
pub fn ensure_dir_exist<P: AsRef<std::path::Path>>(dir: P) -> anyhow::Result<()> {
    if !dir.as_ref().exists() {
        std::fs::create_dir_all(dir.as_ref())?;
    }
    anyhow::Ok(())
}

fn is_input_file(path: &std::path::Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| INPUT_EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e)))
}

/// Lists `.csv`/`.txt` files directly inside `dir`, sorted by path.
pub fn collect_input_files<P: AsRef<std::path::Path>>(
    dir: P,
) -> anyhow::Result<Vec<std::path::PathBuf>> {
    let mut paths = std::fs::read_dir(dir.as_ref())?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| is_input_file(path))
        .collect::<Vec<_>>();
    paths.sort();
    anyhow::Ok(paths)
}

/// JSON payload path for `input` inside `output_dir`: same stem, `.json`.
pub fn payload_path(input: &std::path::Path, output_dir: &std::path::Path) -> std::path::PathBuf {
    let mut name = input.file_stem().unwrap_or(input.as_os_str()).to_os_string();
    name.push(".json");
    output_dir.join(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_path() {
        let dir = tempfile::tempdir().unwrap();
        assert!(check_path(dir.path()).is_ok());
        assert!(check_path(dir.path().join("missing.csv")).is_err());
    }

    #[test]
    fn test_collect_input_files_filters_extensions() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.csv", "a.TXT", "notes.md", "c.json"] {
            std::fs::write(dir.path().join(name), "x").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.csv")).unwrap();

        let files = collect_input_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.TXT", "b.csv"]);
    }

    #[test]
    fn test_ensure_parent_dir_exist() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested").join("deeper").join("out.json");
        ensure_parent_dir_exist(&target).unwrap();
        assert!(target.parent().unwrap().is_dir());
    }

    #[test]
    fn test_payload_path() {
        let path = payload_path(
            std::path::Path::new("/data/week-12.csv"),
            std::path::Path::new("/out"),
        );
        assert_eq!(path, std::path::PathBuf::from("/out/week-12.json"));
        let path = payload_path(std::path::Path::new("cgm.2024.csv"), std::path::Path::new("out"));
        assert_eq!(path, std::path::PathBuf::from("out/cgm.2024.json"));
    }
}
