//! Document state carried through the pipeline.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use sha2::{Digest, Sha256};

/// Opens a code placeholder. Private-use code points do not occur in
/// authored prose, so a placeholder never collides with document text.
const PLACEHOLDER_OPEN: char = '\u{E000}';
const PLACEHOLDER_CLOSE: char = '\u{E001}';

/// Content hash of a code fragment's body (lowercase hex SHA-256).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn of(code: &str) -> Self {
        Self(hex::encode(Sha256::digest(code.as_bytes())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The token that stands in for the fragment in the document text.
    pub fn placeholder(&self) -> String {
        format!("{PLACEHOLDER_OPEN}{}{PLACEHOLDER_CLOSE}", self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fenced code block lifted out of the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeFragment {
    /// Language tag after the opening fence, possibly empty
    pub language: String,
    /// Raw code between the fences
    pub code: String,
}

/// Code fragments of one document, keyed by fingerprint.
///
/// Fragments with identical code share an entry; the last one inserted
/// decides the language.
#[derive(Debug, Default)]
pub struct CodeMap {
    fragments: HashMap<Fingerprint, CodeFragment>,
}

impl CodeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a fragment and return the fingerprint it is filed under.
    pub fn insert(&mut self, language: &str, code: &str) -> Fingerprint {
        let fingerprint = Fingerprint::of(code);
        self.fragments.insert(
            fingerprint.clone(),
            CodeFragment {
                language: language.to_string(),
                code: code.to_string(),
            },
        );
        fingerprint
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Fingerprint, &CodeFragment)> {
        self.fragments.iter()
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

/// A document being processed through the pipeline.
///
/// `content` evolves through the stages:
///
/// 1. Initially: the raw source
/// 2. After code: fences replaced by placeholders, `code_map` populated
/// 3. After markdown: an HTML fragment still holding placeholders
/// 4. After highlight: placeholders replaced by highlighted code
#[derive(Debug)]
pub struct ProcessingDocument {
    /// Directory of the source file (for resolving stylesheet imports)
    pub source_dir: PathBuf,

    /// Content being processed
    pub content: String,

    /// Fragments extracted by the code stage, consumed by the highlight stage
    pub code_map: CodeMap,
}

impl ProcessingDocument {
    pub fn new(source: &str, source_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            content: source.to_string(),
            code_map: CodeMap::new(),
        }
    }
}
