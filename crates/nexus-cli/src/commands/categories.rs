use std::path::Path;

use nexus_core::{CategoryConfig, Notebook};

use crate::error::CliError;

pub fn format_category_lines(categories: &[CategoryConfig]) -> Vec<String> {
    categories
        .iter()
        .map(|category| {
            format!(
                "{:<12} {:<16} {:<12} {}",
                category.id, category.label, category.icon, category.color
            )
        })
        .collect()
}

pub async fn run_categories_list(as_json: bool, notebook: &Notebook) -> Result<(), CliError> {
    let categories = notebook.load_categories().await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&categories)?);
    } else {
        for line in format_category_lines(&categories) {
            println!("{line}");
        }
    }
    Ok(())
}

pub async fn run_categories_set(path: &Path, notebook: &Notebook) -> Result<(), CliError> {
    let payload = std::fs::read_to_string(path)?;
    let categories: Vec<CategoryConfig> = serde_json::from_str(&payload)?;

    let saved = notebook.save_categories(categories).await?;
    println!("Saved {} categories", saved.len());
    Ok(())
}
