//! Local training corpus.
//!
//! Layout: `<root>/<language>/<any file>`. Each subdirectory is one language,
//! named by the directory; each regular file in it is one UTF-8 document.
//! Documents are read lazily, one at a time.

use crate::core::types::LanguageId;
use crate::error::{LangIdError, Result};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

const GUTENBERG_START: &str = "*** START OF";
const GUTENBERG_END: &str = "*** END OF";

/// Returns the body of a Project Gutenberg text, between the line holding the
/// START marker and the END marker. Text without both markers is returned whole.
pub fn strip_gutenberg_boilerplate(text: &str) -> &str {
    let Some(start) = text.find(GUTENBERG_START) else {
        return text;
    };
    let body_start = text[start..]
        .find('\n')
        .map_or(text.len(), |nl| start + nl + 1);
    match text[body_start..].find(GUTENBERG_END) {
        Some(end) => &text[body_start..body_start + end],
        None => text,
    }
}

#[derive(Debug, Clone)]
pub struct Corpus {
    root: PathBuf,
    documents: BTreeMap<LanguageId, Vec<PathBuf>>,
    strip_boilerplate: bool,
}

impl Corpus {
    /// Lists languages and their documents, both sorted. Hidden entries are ignored.
    pub fn discover(root: &Path) -> Result<Self> {
        let mut documents = BTreeMap::new();
        for entry in read_dir_sorted(root)? {
            if !entry.is_dir() || is_hidden(&entry) {
                continue;
            }
            let Some(language) = entry.file_name().map(|n| n.to_string_lossy().into_owned())
            else {
                continue;
            };
            let files: Vec<PathBuf> = read_dir_sorted(&entry)?
                .into_iter()
                .filter(|p| p.is_file() && !is_hidden(p))
                .collect();
            documents.insert(language, files);
        }

        info!(
            "Discovered {} languages in corpus {}",
            documents.len(),
            root.display()
        );

        Ok(Self {
            root: root.to_path_buf(),
            documents,
            strip_boilerplate: true,
        })
    }

    pub fn with_boilerplate_stripping(mut self, strip: bool) -> Self {
        self.strip_boilerplate = strip;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.documents.keys().map(String::as_str)
    }

    pub fn document_paths(&self, language: &str) -> &[PathBuf] {
        self.documents
            .get(language)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Yields (document name, contents) per document. A file that cannot be
    /// read or is not valid UTF-8 yields an `Err` and iteration continues.
    pub fn documents<'a>(
        &'a self,
        language: &str,
    ) -> impl Iterator<Item = (String, io::Result<String>)> + 'a {
        let strip = self.strip_boilerplate;
        self.document_paths(language).iter().map(move |path| {
            let name = path.display().to_string();
            let text = fs::read_to_string(path).map(|text| {
                if strip {
                    strip_gutenberg_boilerplate(&text).to_string()
                } else {
                    text
                }
            });
            (name, text)
        })
    }
}

fn read_dir_sorted(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| LangIdError::io(dir, e))?;
    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| LangIdError::io(dir, e))?;
        paths.push(entry.path());
    }
    paths.sort();
    Ok(paths)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map_or(false, |n| n.to_string_lossy().starts_with('.'))
}
