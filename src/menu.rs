// Terminal front-end for trying the classifier without the web server.

use crate::inference::adapter::{InferenceAdapter, Prediction};
use crate::inference::source::ImageSource;
use anyhow::{Context, Result};
use dialoguer::{Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};

const FOLDER_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Runs the select loop until the user chooses "Exit".
pub fn main_menu(adapter: &InferenceAdapter) -> Result<()> {
    if !adapter.is_available() {
        println!("The classifier cannot run because the model failed to load.");
        return Ok(());
    }

    loop {
        let items = [
            "Classify an image file",
            "Classify every image in a folder",
            "Search flowers by name",
            "Exit",
        ];
        let selection = Select::new()
            .with_prompt("FLOWER CLASSIFICATION SYSTEM")
            .items(&items)
            .default(0)
            .interact()?;

        match selection {
            0 => {
                let path: String = Input::new().with_prompt("Image file path").interact_text()?;
                let path = PathBuf::from(path.trim());
                let prediction = adapter.classify(&ImageSource::Path(&path));
                println!("{}", format_prediction(&path.to_string_lossy(), &prediction));
            }
            1 => {
                let dir: String = Input::new().with_prompt("Folder").interact_text()?;
                if let Err(e) = classify_folder(adapter, Path::new(dir.trim())) {
                    println!("{:#}", e);
                }
            }
            2 => {
                let term: String = Input::new().with_prompt("Flower name").interact_text()?;
                for line in format_search(&adapter.labels().search(term.trim())) {
                    println!("{}", line);
                }
            }
            3 => break,
            _ => {}
        }
    }
    Ok(())
}

fn classify_folder(adapter: &InferenceAdapter, dir: &Path) -> Result<()> {
    let files = image_files(dir)
        .with_context(|| format!("cannot read folder {}", dir.display()))?;

    let progress = ProgressBar::new(files.len() as u64);
    progress.set_style(ProgressStyle::with_template("{bar:40} {pos}/{len}")?);

    for path in &files {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let prediction = adapter.classify(&ImageSource::Path(path));
        progress.println(format_prediction(&name, &prediction));
        progress.inc(1);
    }
    progress.finish_and_clear();

    println!("{} images classified", files.len());
    Ok(())
}

/// `.jpg`, `.jpeg` and `.png` files directly inside `dir`, sorted by name.
pub fn image_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let matches = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .is_some_and(|e| FOLDER_EXTENSIONS.contains(&e.as_str()));
        if matches && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

pub fn format_prediction(name: &str, prediction: &Prediction) -> String {
    match prediction {
        Ok(c) => format!("{}: {} ({}) - {:.4}", name, c.label, c.class_key, c.confidence),
        Err(e) => format!("{}: {}", name, e),
    }
}

pub fn format_search(found: &[(&str, &str)]) -> Vec<String> {
    if found.is_empty() {
        return vec!["No flower matches.".to_string()];
    }
    found
        .iter()
        .map(|(key, name)| format!("{}: {}", key, name))
        .collect()
}
