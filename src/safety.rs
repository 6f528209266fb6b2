//! Safety utilities to prevent overwriting input transcripts.
//!
//! Re-timed output must never land on top of the candidate or reference it
//! was computed from, and a batch output directory must be separate from
//! the input directories.

use anyhow::{bail, Result};
use std::path::{Path, PathBuf};

/// Resolve a path for comparison; paths that do not exist yet are compared as given.
fn resolved(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Validates that an output file is safe to write.
///
/// # Arguments
/// * `output` - The file that will be created/overwritten
/// * `source_paths` - Input transcripts that must not match the output
///
/// # Returns
/// * `Ok(())` if the output path is safe
/// * `Err` with a descriptive message if the check fails
pub fn validate_output_path(output: &Path, source_paths: &[&Path]) -> Result<()> {
    let output_resolved = resolved(output);

    for source in source_paths {
        if output == *source || output_resolved == resolved(source) {
            bail!(
                "Safety check failed: output '{}' cannot be the same as source '{}'",
                output.display(),
                source.display()
            );
        }
    }

    if output.is_dir() {
        bail!(
            "Safety check failed: output '{}' is a directory",
            output.display()
        );
    }

    Ok(())
}

/// Validates that a batch output directory is distinct from every input directory.
pub fn validate_output_dir(output_dir: &Path, input_dirs: &[&Path]) -> Result<()> {
    let output_resolved = resolved(output_dir);

    for input in input_dirs {
        if output_dir == *input || output_resolved == resolved(input) {
            bail!(
                "Safety check failed: output directory '{}' cannot be the same as input directory '{}'",
                output_dir.display(),
                input.display()
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_output_path() {
        let output = PathBuf::from("/tmp/song.aligned.lrc");
        let candidate = PathBuf::from("/data/song.lrc");
        let reference = PathBuf::from("/data/song.ref.lrc");
        assert!(validate_output_path(&output, &[&candidate, &reference]).is_ok());
    }

    #[test]
    fn test_output_equals_source() {
        let path = PathBuf::from("/data/song.lrc");
        let result = validate_output_path(&path, &[&path]);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("cannot be the same as source"));
    }

    #[test]
    fn test_output_dir_equals_input_dir() {
        let candidates = PathBuf::from("/data/candidates");
        let references = PathBuf::from("/data/references");
        let aligned = PathBuf::from("/data/aligned");
        assert!(validate_output_dir(&aligned, &[&candidates, &references]).is_ok());

        let result = validate_output_dir(&candidates, &[&candidates, &references]);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("cannot be the same as input directory"));
    }
}
