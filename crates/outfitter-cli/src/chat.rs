//! Interactive chat prompt: slash commands and gallery output.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Local;
use tracing::warn;

use outfitter_core::models::chat::{image_mime_type, strip_data_uri_prefix};
use outfitter_core::models::{Gallery, GarmentType};

/// A line typed at the chat prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    Message(String),
    Reset,
    Next(String),
    Prev(String),
    Save(PathBuf),
    Help,
    Quit,
    Unknown(String),
}

impl ChatCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if !line.starts_with('/') {
            return ChatCommand::Message(line.to_string());
        }

        let mut parts = line.splitn(2, char::is_whitespace);
        let command = parts.next().unwrap_or_default();
        let arg = parts.next().map(str::trim).unwrap_or_default();

        match (command, arg) {
            ("/quit" | "/exit", _) => ChatCommand::Quit,
            ("/reset", _) => ChatCommand::Reset,
            ("/help", _) => ChatCommand::Help,
            ("/next", garment) if !garment.is_empty() => ChatCommand::Next(garment.to_lowercase()),
            ("/prev", garment) if !garment.is_empty() => ChatCommand::Prev(garment.to_lowercase()),
            ("/save", "") => ChatCommand::Save(PathBuf::from(".")),
            ("/save", dir) => ChatCommand::Save(PathBuf::from(dir)),
            _ => ChatCommand::Unknown(command.to_string()),
        }
    }
}

pub fn print_help() {
    println!("Commands:");
    println!("  /next <type>   show the next image for a garment type");
    println!("  /prev <type>   show the previous image for a garment type");
    println!("  /save [dir]    save the images currently shown");
    println!("  /reset         start a new conversation");
    println!("  /quit          leave the chat");
}

pub fn print_gallery(gallery: &Gallery) {
    for garment in gallery.sections() {
        let size = gallery
            .current(garment)
            .map(|encoded| strip_data_uri_prefix(encoded).len() * 3 / 4)
            .unwrap_or(0);
        println!(
            "  [{}] {} (~{} KB)",
            garment,
            gallery.counter(garment).unwrap_or_default(),
            size / 1024
        );
    }
    println!("  (use /next, /prev and /save to browse)");
}

/// File name for a saved gallery image, e.g. `top-20261017-101500.jpg`
pub fn image_file_name(garment: GarmentType, encoded: &str, timestamp: &str) -> String {
    let extension = match image_mime_type(encoded) {
        "image/jpeg" => "jpg",
        _ => "png",
    };
    format!("{}-{}.{}", garment.as_str(), timestamp, extension)
}

/// Write the currently shown image of every section into `dir`.
///
/// Section names come from the server, so only known garment types are
/// used in file names; anything else is skipped.
pub fn save_gallery(gallery: &Gallery, dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    let timestamp = Local::now().format("%Y%m%d-%H%M%S").to_string();
    let mut saved = Vec::new();

    for section in gallery.sections() {
        let Ok(garment) = section.parse::<GarmentType>() else {
            warn!(section, "Skipping gallery section with unknown garment type");
            continue;
        };
        let Some(encoded) = gallery.current(section) else {
            continue;
        };
        let bytes = STANDARD
            .decode(strip_data_uri_prefix(encoded).trim())
            .with_context(|| format!("Image for {} is not valid base64", garment))?;

        let path = dir.join(image_file_name(garment, encoded, &timestamp));
        std::fs::write(&path, bytes)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        saved.push(path);
    }

    Ok(saved)
}
