use crate::utils::error::{MaintError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// One of the three spreadsheet exports a reimport needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceKind {
    pub label: &'static str,
    pub stems: &'static [&'static str],
}

pub const CUSTOMERS: SourceKind = SourceKind {
    label: "Kunden.xlsx",
    stems: &["Kunden"],
};

pub const FRAGRANCES: SourceKind = SourceKind {
    label: "Düfte.xlsx",
    stems: &["Düfte", "Dufte", "Duefte"],
};

pub const COMPOSITIONS: SourceKind = SourceKind {
    label: "Zusammenstellungen.xlsx",
    stems: &["Zusammenstellungen"],
};

/// Accepted extensions, most preferred first.
pub const EXTENSIONS: &[&str] = &["xlsx", "xls", "ods", "csv"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFiles {
    pub customers: PathBuf,
    pub fragrances: PathBuf,
    pub compositions: PathBuf,
}

/// Finds the file for `kind` in `dir`. An exact file name wins over a
/// case-insensitive match; earlier extensions win over later ones.
pub fn find_source_file(dir: &Path, kind: &SourceKind) -> Result<Option<PathBuf>> {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .collect();
    entries.sort();

    for ext in EXTENSIONS {
        for stem in kind.stems {
            let wanted = format!("{}.{}", stem, ext);

            let exact = dir.join(&wanted);
            if exact.is_file() {
                return Ok(Some(exact));
            }

            let wanted = wanted.to_lowercase();
            let found = entries.iter().find(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .map(|name| name.to_lowercase() == wanted)
                    .unwrap_or(false)
            });
            if let Some(path) = found {
                return Ok(Some(path.clone()));
            }
        }
    }

    Ok(None)
}

/// Locates all three exports or fails on the first one missing.
pub fn locate_sources(dir: &Path) -> Result<SourceFiles> {
    let require = |kind: &SourceKind| -> Result<PathBuf> {
        find_source_file(dir, kind)?.ok_or_else(|| MaintError::MissingSourceFile {
            label: kind.label.to_string(),
            dir: dir.to_path_buf(),
        })
    };

    let customers = require(&CUSTOMERS)?;
    let fragrances = require(&FRAGRANCES)?;
    let compositions = require(&COMPOSITIONS)?;

    Ok(SourceFiles {
        customers,
        fragrances,
        compositions,
    })
}
