use std::fs;
use std::path::{Path, PathBuf};

// error.rs only wraps `reqwest::Error`.
const HTTP_CALLERS: &[&str] = &["src/adapters/simcompanies.rs", "src/error.rs"];
const HISTORY_WRITERS: &[&str] = &["src/persistence/history_store.rs"];

fn collect_rust_files(root: &Path, out: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(root) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_rust_files(&path, out);
            continue;
        }
        if path.extension().and_then(|s| s.to_str()) == Some("rs") {
            out.push(path);
        }
    }
}

/// Non-test lines matching `pattern` in files outside `allowed`
fn offenders(pattern: impl Fn(&str) -> bool, allowed: &[&str]) -> Vec<String> {
    let repo_root = Path::new(env!("CARGO_MANIFEST_DIR"));
    let mut files = Vec::new();
    collect_rust_files(&repo_root.join("src"), &mut files);

    let mut found = Vec::new();
    for file in files {
        let rel = file
            .strip_prefix(repo_root)
            .unwrap_or(&file)
            .to_string_lossy()
            .replace('\\', "/");
        if allowed.iter().any(|a| *a == rel) {
            continue;
        }
        let content = fs::read_to_string(&file).unwrap_or_default();
        for (idx, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed == "#[cfg(test)]" {
                break;
            }
            if pattern(trimmed) {
                found.push(format!("{rel}:{}: {}", idx + 1, trimmed));
            }
        }
    }
    found
}

#[test]
fn http_access_is_limited_to_market_adapter() {
    let found = offenders(
        |line| line.contains("reqwest::") || line.contains("Client::builder("),
        HTTP_CALLERS,
    );
    assert!(
        found.is_empty(),
        "HTTP access outside the market adapter:\n{}",
        found.join("\n")
    );
}

#[test]
fn history_files_are_written_only_by_the_store() {
    let found = offenders(
        |line| {
            line.contains("fs::write(")
                || line.contains("fs::rename(")
                || line.contains("fs::copy(")
                || line.contains("File::create(")
        },
        HISTORY_WRITERS,
    );
    assert!(
        found.is_empty(),
        "direct file writes outside the history store:\n{}",
        found.join("\n")
    );
}
