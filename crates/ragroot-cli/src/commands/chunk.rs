//! Chunking command for preparing documents for indexing

use crate::app::{ChunkArgs, OutputFormat, PresetArg};
use anyhow::{Context, Result};
use ragroot_core::{split_text, ChunkPreset};
use serde::Serialize;

#[derive(Serialize)]
struct ChunkOutput<'a> {
    position: usize,
    chars: usize,
    text: &'a str,
}

pub fn run(args: ChunkArgs, format: OutputFormat) -> Result<()> {
    let text = std::fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;

    let preset = match args.preset {
        PresetArg::General => ChunkPreset::General,
        PresetArg::Legal => ChunkPreset::Legal,
        PresetArg::Code => ChunkPreset::Code,
        PresetArg::Granular => ChunkPreset::Granular,
    };
    let (preset_size, preset_overlap) = preset.params();
    let max_size = args.size.unwrap_or(preset_size);
    let overlap = args.overlap.unwrap_or(preset_overlap);

    let chunks = split_text(&text, max_size, overlap);

    match format {
        OutputFormat::Json => {
            let output: Vec<ChunkOutput> = chunks
                .iter()
                .map(|c| ChunkOutput {
                    position: c.position,
                    chars: c.text.chars().count(),
                    text: &c.text,
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Cli => {
            println!(
                "{} chunks (max {} chars, overlap {})",
                chunks.len(),
                max_size,
                overlap
            );
            for chunk in &chunks {
                println!();
                println!(
                    "--- chunk {} ({} chars) ---",
                    chunk.position,
                    chunk.text.chars().count()
                );
                println!("{}", chunk.text);
            }
        }
    }

    Ok(())
}
