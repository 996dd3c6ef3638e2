use crate::error::Result;
use log::debug;
use std::path::PathBuf;
use walkdir::WalkDir;

/// File scanner for a Go package directory.
///
/// The `FileScanner` lists the Go source files that sit directly in the given
/// directory. Subdirectories are not visited: a Go package is one directory,
/// and route registration is analyzed package by package.
///
/// # Example
///
/// ```no_run
/// use go_openapi_from_source::scanner::FileScanner;
/// use std::path::PathBuf;
///
/// let scanner = FileScanner::new(PathBuf::from("./cmd/api"));
/// let result = scanner.scan().unwrap();
/// println!("Found {} Go files", result.go_files.len());
/// ```
pub struct FileScanner {
    root_path: PathBuf,
}

/// Result of directory scanning operation.
pub struct ScanResult {
    /// Paths of all discovered `.go` files, sorted by file name
    pub go_files: Vec<PathBuf>,
    /// Number of `_test.go` files that were skipped
    pub skipped_test_files: usize,
}

impl FileScanner {
    /// Creates a new `FileScanner` for the specified directory.
    pub fn new(root_path: PathBuf) -> Self {
        Self { root_path }
    }

    /// Collects the top-level `.go` files of the directory.
    ///
    /// Files whose name ends in `_test.go` are skipped. The result is sorted
    /// by file name so repeated runs see the files in the same order.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or any of its entries cannot be read.
    /// Scanning never continues past an unreadable entry.
    pub fn scan(&self) -> Result<ScanResult> {
        let mut go_files = Vec::new();
        let mut skipped_test_files = 0;

        for entry in WalkDir::new(&self.root_path)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry?;
            let path = entry.path();

            // Symlinks count when they point at a regular file
            if !path.is_file() {
                continue;
            }
            if path.extension().and_then(|s| s.to_str()) != Some("go") {
                continue;
            }

            let file_name = entry.file_name().to_string_lossy();
            if file_name.ends_with("_test.go") {
                debug!("Skipping test file: {}", path.display());
                skipped_test_files += 1;
                continue;
            }

            go_files.push(path.to_path_buf());
        }

        debug!(
            "Scanned {}: {} Go files, {} test files skipped",
            self.root_path.display(),
            go_files.len(),
            skipped_test_files
        );

        Ok(ScanResult {
            go_files,
            skipped_test_files,
        })
    }
}
