//! Deterministic offline chapter generation.
//!
//! Every remote generation step has a pure local twin so the pipeline
//! always produces usable narrative output. Selection is hash-based:
//! identical metadata and genre always yield the same chapter.

use crate::metadata::EntryMetadata;
use crate::story::chapter::{ChapterId, StoryChapter, StoryGenre};
use std::hash::{Hash, Hasher};

/// Generate a chapter locally from metadata alone.
pub fn generate(genre: StoryGenre, metadata: &EntryMetadata) -> StoryChapter {
    let themes = theme_phrase(metadata);
    let (title, text) = render_body(genre, &themes, metadata);

    let cliffhangers = cliffhangers_for(genre);
    let index = stable_index(genre, metadata, cliffhangers.len());

    StoryChapter {
        id: ChapterId::new(),
        title,
        text,
        cliffhanger: cliffhangers[index].to_string(),
    }
}

fn theme_phrase(metadata: &EntryMetadata) -> String {
    if metadata.themes.is_empty() {
        "today's reflections".to_string()
    } else {
        metadata.themes.join(", ")
    }
}

fn render_body(genre: StoryGenre, themes: &str, metadata: &EntryMetadata) -> (String, String) {
    let lead_theme = metadata
        .themes
        .first()
        .map(String::as_str)
        .unwrap_or("courage");

    match genre {
        StoryGenre::Fantasy => (
            format!("The Trial of {lead_theme}"),
            format!(
                "Deep in the enchanted realm, our hero faced a new trial. \
                 The ancient scrolls spoke of {themes}, and only a brave \
                 heart could turn such lessons into magic. Step by step, \
                 spell by spell, the hero grew stronger."
            ),
        ),
        StoryGenre::Mystery => (
            format!("The Case of the Hidden {lead_theme}"),
            format!(
                "A curious clue appeared in the detective's notebook. \
                 Everything pointed toward {themes}, but the pieces refused \
                 to fit at first glance. With a magnifying glass and a \
                 patient mind, the detective studied every detail."
            ),
        ),
        StoryGenre::Adventure => (
            format!("Expedition {lead_theme}"),
            format!(
                "The expedition set out at dawn, map in hand. The trail \
                 ahead wound through {themes}, and every switchback taught \
                 the explorer something no compass could. The summit was \
                 closer than it looked."
            ),
        ),
        StoryGenre::SciFi => (
            format!("Mission Log: {lead_theme}"),
            format!(
                "Aboard the starship, the young commander reviewed the \
                 mission log. Sensors had detected {themes} in the nearby \
                 system, and the crew would need every lesson from the \
                 academy to navigate it."
            ),
        ),
        StoryGenre::General => (
            format!("A Chapter About {lead_theme}"),
            format!(
                "Today brought a new page in an ongoing story. It was a day \
                 of {themes}, the kind of day that seems ordinary until you \
                 look back and see how much it mattered."
            ),
        ),
    }
}

fn cliffhangers_for(genre: StoryGenre) -> &'static [&'static str] {
    match genre {
        StoryGenre::Fantasy => &[
            "But as the hero turned to leave, the runes on the wall began to glow...",
            "Somewhere beyond the mist, a dragon stirred in its sleep...",
            "The old wizard smiled and whispered: the real spell comes tomorrow...",
        ],
        StoryGenre::Mystery => &[
            "Then the lights flickered, and a new clue slid under the door...",
            "The detective froze: one fingerprint did not belong to anyone known...",
            "Just as the case seemed closed, the telephone rang...",
        ],
        StoryGenre::Adventure => &[
            "At the edge of the cliff, a rope bridge swayed in the wind...",
            "The map's last corner was torn, and the trail went cold...",
            "From the valley below came a sound no explorer had heard before...",
        ],
        StoryGenre::SciFi => &[
            "Then the console blinked red: an unknown signal was incoming...",
            "The star chart showed a planet that should not exist...",
            "As the engines cooled, something knocked on the outer hull...",
        ],
        StoryGenre::General => &[
            "And tomorrow, a brand-new page was waiting to be written...",
            "Little did anyone know what the next day would bring...",
            "The story paused there, ready to pick up right where it left off...",
        ],
    }
}

/// Stable selection index from genre + metadata.
fn stable_index(genre: StoryGenre, metadata: &EntryMetadata, len: usize) -> usize {
    // DefaultHasher::new() uses fixed keys, so this is stable across
    // runs, unlike hashing through a RandomState.
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    genre.as_str().hash(&mut hasher);
    for theme in &metadata.themes {
        theme.hash(&mut hasher);
    }
    metadata.sentiment.to_bits().hash(&mut hasher);
    (hasher.finish() as usize) % len.max(1)
}
