//! Document loading and chunking

use std::path::Path;

use tracing::{debug, warn};

use super::RetrievalError;

/// Upper bound on chunk length, in characters
pub const CHUNK_SIZE: usize = 1024;
/// Characters carried over from the end of one chunk into the next
pub const CHUNK_OVERLAP: usize = 128;

/// One text file from the data directory
#[derive(Debug, Clone)]
pub struct Document {
    /// File name, used as the chunk source
    pub name: String,
    pub text: String,
}

/// A piece of a document, the unit that gets embedded
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub source: String,
    pub text: String,
}

impl Document {
    pub fn chunks(&self) -> Vec<Chunk> {
        chunk_text(&self.text, CHUNK_SIZE, CHUNK_OVERLAP)
            .into_iter()
            .map(|text| Chunk {
                source: self.name.clone(),
                text,
            })
            .collect()
    }
}

/// Read every regular, non-hidden file directly under `dir`, sorted by name.
///
/// Files that are not valid UTF-8 are skipped with a warning.
pub fn load_documents(dir: &Path) -> Result<Vec<Document>, RetrievalError> {
    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source| RetrievalError::Io { path, source }
    };

    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err(dir))? {
        let entry = entry.map_err(io_err(dir))?;
        let path = entry.path();
        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        if path.is_file() && !hidden {
            paths.push(path);
        }
    }
    paths.sort();

    let mut documents = Vec::with_capacity(paths.len());
    for path in paths {
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                warn!(path = %path.display(), "Skipping non UTF-8 file");
                continue;
            }
            Err(e) => return Err(io_err(&path)(e)),
        };
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        debug!(document = %name, bytes = text.len(), "Loaded document");
        documents.push(Document { name, text });
    }

    Ok(documents)
}

/// Split text into word-aligned windows of at most `size` characters.
///
/// Whitespace is normalized to single spaces. Consecutive windows share up
/// to `overlap` characters of trailing words. A single word longer than
/// `size` becomes its own chunk.
pub fn chunk_text(text: &str, size: usize, overlap: usize) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < words.len() {
        let mut end = start;
        let mut len = 0;
        while end < words.len() {
            let add = words[end].chars().count() + usize::from(end > start);
            if end > start && len + add > size {
                break;
            }
            len += add;
            end += 1;
        }
        chunks.push(words[start..end].join(" "));
        if end >= words.len() {
            break;
        }

        // walk back over trailing words for the overlap, always moving forward
        let mut next = end;
        let mut carried = 0;
        while next > start + 1 {
            let w = words[next - 1].chars().count() + 1;
            if carried + w > overlap {
                break;
            }
            carried += w;
            next -= 1;
        }
        start = next;
    }

    chunks
}
