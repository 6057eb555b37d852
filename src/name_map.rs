//! Maps input file paths to display names (C12).

use std::path::Path;

use crate::err::{AppError, ArgError};

/// Injective path -> display-name mapping, built once per `merge` run.
#[derive(Debug, Clone)]
pub struct NameMap {
    names: Vec<String>,
}

impl NameMap {
    /// `custom` must either be empty (derive names from each path's file
    /// stem) or have exactly one entry per input path.
    pub fn new(paths: &[String], custom: &[String]) -> Result<Self, AppError> {
        let names = if custom.is_empty() {
            paths.iter().map(|p| file_stem(p)).collect()
        } else {
            if custom.len() != paths.len() {
                return Err(AppError::UserInput(ArgError::NameCountMismatch {
                    given: custom.len(),
                    expected: paths.len(),
                }));
            }
            custom.to_vec()
        };
        Ok(Self { names })
    }

    pub fn display_name(&self, index: usize) -> &str {
        &self.names[index]
    }

    pub fn display_names(&self) -> &[String] {
        &self.names
    }

    /// Split a comma-separated list of raw identifiers, trim each, map
    /// through this name map's input-order index, and rejoin with commas.
    /// Entries that do not match a known input path pass through unchanged.
    pub fn convert_source_string(&self, paths: &[String], csv: &str) -> String {
        csv.split(',')
            .map(|raw| {
                let trimmed = raw.trim();
                paths
                    .iter()
                    .position(|p| p == trimmed)
                    .map(|idx| self.display_name(idx).to_string())
                    .unwrap_or_else(|| trimmed.to_string())
            })
            .collect::<Vec<_>>()
            .join(",")
    }
}

fn file_stem(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn derives_stem_without_extension() {
        let paths = vec!["/data/sample1.vcf".to_string(), "/data/sample2.vcf.gz".to_string()];
        let map = NameMap::new(&paths, &[]).unwrap();
        assert_eq!(map.display_name(0), "sample1");
        assert_eq!(map.display_name(1), "sample2.vcf");
    }

    #[test]
    fn custom_names_must_match_input_count() {
        let paths = vec!["a.vcf".to_string(), "b.vcf".to_string()];
        let err = NameMap::new(&paths, &["only_one".to_string()]).unwrap_err();
        assert!(matches!(
            err,
            AppError::UserInput(ArgError::NameCountMismatch { given: 1, expected: 2 })
        ));
    }

    #[test]
    fn convert_source_string_maps_known_paths() {
        let paths = vec!["a.vcf".to_string(), "b.vcf".to_string()];
        let map = NameMap::new(&paths, &["CallerA".to_string(), "CallerB".to_string()]).unwrap();
        assert_eq!(map.convert_source_string(&paths, "a.vcf, b.vcf"), "CallerA,CallerB");
    }
}
