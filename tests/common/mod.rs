/*!
 * Common test utilities for the adscribe test suite
 */

use anyhow::Result;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use adscribe::model::{Brief, ScriptDocument};


/// Route library logs through env_logger; safe to call from every test
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Path of a config file inside `dir` that does not exist yet
pub fn config_path_in(dir: &Path) -> PathBuf {
    dir.join("nested").join("conf.json")
}

/// The eco-friendly cleaning brief used across the suite
pub fn eco_brief() -> Brief {
    Brief::new(
        "Eco-Friendly Cleaning Products",
        "natural ingredients, biodegradable, safe for kids",
        "environmentally conscious homeowners",
    )
}

/// The two-line document the mock service answers with
pub fn eco_document() -> ScriptDocument {
    adscribe::providers::mock::sample_document()
}

/// Serialized document in the shape the script service returns
pub fn eco_document_json() -> String {
    serde_json::json!({
        "script": {
            "lines": [
                { "text": "Tired of harsh chemicals in your home?", "voice_direction": "Concerned, conversational" },
                { "text": "Switch to natural, biodegradable cleaning that works.", "voice_direction": "Warm and confident" }
            ],
            "estimated_duration": "30s"
        },
        "art_direction": {
            "visual_style": "Bright, airy lifestyle photography",
            "color_palette": ["#2E7D32", "#A5D6A7", "#FFFFFF"],
            "typography": { "headings": "Montserrat Bold", "body": "Open Sans" },
            "key_elements": ["Plant-based ingredients", "Sunlit kitchen"],
            "layout": "Product centered with text overlay at the bottom"
        }
    })
    .to_string()
}
