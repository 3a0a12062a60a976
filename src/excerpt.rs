//! Where excerpts come from.
//!
//! Candidates are gathered from the embedded snippet pack or a directory,
//! filtered (no plain-text files, nothing over the size cap) and one is
//! picked at random.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use include_dir::{include_dir, Dir};
use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::Config;

static SNIPPET_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/snippets");

const TAB_WIDTH: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Excerpt {
    /// file name, or "prompt" for text given on the command line
    pub name: String,
    pub text: String,
}

impl Excerpt {
    pub fn new(name: impl Into<String>, text: &str) -> Self {
        Self {
            name: name.into(),
            text: normalize(text),
        }
    }
}

/// Make the text typeable key by key: CRLF becomes LF, tabs become spaces
/// (the tab key is not accepted as input) and trailing whitespace goes.
pub fn normalize(text: &str) -> String {
    text.replace("\r\n", "\n")
        .replace('\t', &" ".repeat(TAB_WIDTH))
        .trim_end()
        .to_string()
}

/// Which candidate files may become excerpts
#[derive(Debug, Clone)]
pub struct ExcerptFilter {
    pub max_size: usize,
    pub excluded_extensions: Vec<String>,
}

impl ExcerptFilter {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            max_size: cfg.max_excerpt_size,
            excluded_extensions: cfg.excluded_extensions.clone(),
        }
    }

    pub fn is_plain_text(&self, name: &str) -> bool {
        Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.excluded_extensions
                    .iter()
                    .any(|excluded| excluded.eq_ignore_ascii_case(ext))
            })
    }

    pub fn within_size(&self, size: usize) -> bool {
        size <= self.max_size
    }

    pub fn accepts(&self, name: &str, size: usize) -> bool {
        !self.is_plain_text(name) && self.within_size(size)
    }
}

/// Where to take the next excerpt from
#[derive(Debug, Clone)]
pub enum ExcerptSource {
    Prompt(String),
    File(PathBuf),
    Dir(PathBuf),
    Embedded,
}

impl ExcerptSource {
    pub fn resolve<R: Rng + ?Sized>(&self, filter: &ExcerptFilter, rng: &mut R) -> Result<Excerpt> {
        match self {
            ExcerptSource::Prompt(text) => Ok(Excerpt::new("prompt", text)),
            ExcerptSource::File(path) => from_file(path, filter),
            ExcerptSource::Dir(path) => {
                let candidates = from_dir(path)?;
                choose(&candidates, filter, rng)
                    .with_context(|| format!("no usable excerpt in {}", path.display()))
            }
            ExcerptSource::Embedded => {
                choose(&embedded(), filter, rng).context("no usable embedded excerpt")
            }
        }
    }
}

/// Every snippet shipped inside the binary, unfiltered
pub fn embedded() -> Vec<(String, String)> {
    SNIPPET_DIR
        .files()
        .filter_map(|file| {
            let name = file.path().file_name()?.to_str()?.to_string();
            let text = file.contents_utf8()?.to_string();
            Some((name, text))
        })
        .collect()
}

/// Read the UTF-8 files directly inside `dir`, unfiltered
pub fn from_dir(dir: &Path) -> Result<Vec<(String, String)>> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("reading snippet dir {}", dir.display()))?;

    let mut candidates = Vec::new();
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        match fs::read_to_string(&path) {
            Ok(text) => candidates.push((name.to_string(), text)),
            Err(e) => debug!("skipping {}: {e}", path.display()),
        }
    }
    Ok(candidates)
}

/// Load one file as the excerpt. The size cap still applies; the plain-text
/// filter does not, since the file was asked for by name.
pub fn from_file(path: &Path, filter: &ExcerptFilter) -> Result<Excerpt> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading excerpt {}", path.display()))?;
    if !filter.within_size(text.len()) {
        bail!(
            "{} is {} bytes, over the {} byte limit",
            path.display(),
            text.len(),
            filter.max_size
        );
    }
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("excerpt");
    Ok(Excerpt::new(name, &text))
}

/// Pick one accepted candidate at random
pub fn choose<R: Rng + ?Sized>(
    candidates: &[(String, String)],
    filter: &ExcerptFilter,
    rng: &mut R,
) -> Option<Excerpt> {
    let usable: Vec<&(String, String)> = candidates
        .iter()
        .filter(|(name, text)| filter.accepts(name, text.len()))
        .collect();
    debug!("{} of {} candidates usable", usable.len(), candidates.len());

    usable
        .choose(rng)
        .map(|(name, text)| Excerpt::new(name.as_str(), text))
}
