//! Document chunking for ingestion
//!
//! Recursive character splitting: pick the finest-grained separator actually
//! present in the text, split on it, greedily pack pieces into chunks bounded
//! by `max_size`, and carry enough trailing pieces into the next chunk to
//! satisfy the requested overlap. Pure and deterministic; the ingestion
//! pipeline runs this before documents reach the evidence store.

/// Chunking configuration defaults
pub const CHUNK_SIZE_CHARS: usize = 1000;
pub const CHUNK_OVERLAP_CHARS: usize = 100;

/// Separator preference, coarse to fine. An empty separator means per-character.
const SEPARATORS: [&str; 3] = ["\n\n", "\n", " "];

/// Document chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub text: String,
    /// Ordinal position within the source document
    pub position: usize,
}

/// Named chunking presets for common document shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkPreset {
    /// Prose documents
    General,
    /// Contracts and statutes, larger windows keep clauses intact
    Legal,
    /// Source code, smaller precise chunks
    Code,
    /// FAQ-style content, very small chunks
    Granular,
}

impl ChunkPreset {
    /// (max_size, overlap) in characters
    pub fn params(self) -> (usize, usize) {
        match self {
            ChunkPreset::General => (1000, 100),
            ChunkPreset::Legal => (2000, 300),
            ChunkPreset::Code => (800, 50),
            ChunkPreset::Granular => (500, 50),
        }
    }
}

impl std::str::FromStr for ChunkPreset {
    type Err = crate::error::RagRootError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "general" => Ok(ChunkPreset::General),
            "legal" => Ok(ChunkPreset::Legal),
            "code" => Ok(ChunkPreset::Code),
            "granular" => Ok(ChunkPreset::Granular),
            other => Err(crate::error::RagRootError::InvalidInput(format!(
                "unknown chunk preset: {}",
                other
            ))),
        }
    }
}

/// Split text into bounded, overlapping chunks.
///
/// Whitespace-only chunks are dropped. Text that already fits in `max_size`
/// is returned unchanged as a single chunk. `overlap` is clamped below
/// `max_size`.
pub fn split_text(text: &str, max_size: usize, overlap: usize) -> Vec<Chunk> {
    if max_size == 0 {
        return Vec::new();
    }
    let overlap = overlap.min(max_size.saturating_sub(1));

    split_recursive(text, max_size, overlap)
        .into_iter()
        .enumerate()
        .map(|(position, text)| Chunk { text, position })
        .collect()
}

/// Split with a named preset
pub fn split_with_preset(text: &str, preset: ChunkPreset) -> Vec<Chunk> {
    let (max_size, overlap) = preset.params();
    split_text(text, max_size, overlap)
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn split_recursive(text: &str, max_size: usize, overlap: usize) -> Vec<String> {
    if char_len(text) <= max_size {
        if text.trim().is_empty() {
            return Vec::new();
        }
        return vec![text.to_string()];
    }

    // Coarsest separator actually present; fall back to per-character splitting
    let separator = SEPARATORS
        .iter()
        .find(|s| text.contains(**s))
        .copied()
        .unwrap_or("");

    let pieces: Vec<String> = if separator.is_empty() {
        text.chars().map(|c| c.to_string()).collect()
    } else {
        text.split(separator).map(str::to_string).collect()
    };

    let mut chunks = Vec::new();
    let mut good: Vec<String> = Vec::new();

    for piece in pieces {
        if char_len(&piece) < max_size {
            good.push(piece);
        } else {
            if !good.is_empty() {
                chunks.extend(merge_pieces(&good, separator, max_size, overlap));
                good.clear();
            }
            // Atomic piece still too large: recurse with the next finer separator
            chunks.extend(split_recursive(&piece, max_size, overlap));
        }
    }

    if !good.is_empty() {
        chunks.extend(merge_pieces(&good, separator, max_size, overlap));
    }

    chunks
}

/// Greedily pack pieces into chunks bounded by `max_size`, keeping a trailing
/// suffix of at least `overlap` characters when a chunk is closed.
fn merge_pieces(pieces: &[String], separator: &str, max_size: usize, overlap: usize) -> Vec<String> {
    let sep_len = char_len(separator);
    let mut chunks = Vec::new();
    let mut current: Vec<&String> = Vec::new();
    let mut total = 0usize;

    for piece in pieces {
        let len = char_len(piece);
        let join_cost = if current.is_empty() { 0 } else { sep_len };

        if total + len + join_cost > max_size && !current.is_empty() {
            let joined = join_pieces(&current, separator);
            if !joined.trim().is_empty() {
                chunks.push(joined);
            }

            // Carry back the minimal trailing suffix that satisfies the
            // overlap, shrinking further if the incoming piece would not fit.
            while !current.is_empty() {
                let head_cost = char_len(current[0]) + if current.len() > 1 { sep_len } else { 0 };
                let must_shrink = total + len + sep_len > max_size;
                let keeps_overlap = total.saturating_sub(head_cost) >= overlap;

                if must_shrink || keeps_overlap {
                    current.remove(0);
                    total = total.saturating_sub(head_cost);
                } else {
                    break;
                }
            }
        }

        let join_cost = if current.is_empty() { 0 } else { sep_len };
        current.push(piece);
        total += len + join_cost;
    }

    if !current.is_empty() {
        let joined = join_pieces(&current, separator);
        if !joined.trim().is_empty() {
            chunks.push(joined);
        }
    }

    chunks
}

fn join_pieces(pieces: &[&String], separator: &str) -> String {
    pieces
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(separator)
}
