// core/src/storage.rs
use crate::models::SessionSummary;
use std::error::Error;
use std::path::Path;

/// Leser inn et øktsammendrag fra disk (JSON).
pub fn load_summary(path: &str) -> Result<SessionSummary, Box<dyn Error>> {
    let contents = std::fs::read_to_string(path)?;
    let mut de = serde_json::Deserializer::from_str(&contents);
    let summary: SessionSummary = serde_path_to_error::deserialize(&mut de)
        .map_err(|e| format!("summary parse at {}: {}", e.path(), e))?;
    println!("📂 Sammendrag lastet fra {} (økt {})", path, summary.session_id);
    Ok(summary)
}

/// Lagrer et øktsammendrag til disk som JSON (pretty-print).
/// Dette er den lokale kopien som synkes opportunistisk senere.
pub fn save_summary(summary: &SessionSummary, path: &str) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(summary)?;
    std::fs::write(path, json)?;
    println!("✅ Sammendrag lagret til {} (økt {})", path, summary.session_id);
    Ok(())
}

/// Filnavn for en økt i en lokal katalog.
pub fn summary_path(dir: &str, session_id: &str) -> String {
    Path::new(dir)
        .join(format!("{session_id}.json"))
        .to_string_lossy()
        .into_owned()
}
