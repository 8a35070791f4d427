use crate::error::Result;
use crate::extract::QaPair;
use genanki_rs::{Deck, Field, Model, Note, Template};
use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::debug;

// Fixed note-type id; changing it would orphan existing cards on re-import.
const MODEL_ID: i64 = 1_607_392_319;

// Deck ids live in a fixed ten-digit range.
const DECK_ID_RANGE: u64 = 10_000_000_000;

/// Derives a stable numeric deck identifier from the deck name.
///
/// First eight bytes of `SHA-256(name)` reduced into a fixed ten-digit
/// range. The scheme is deterministic across platforms and runs; collisions
/// between distinct names are possible but not checked.
#[must_use]
pub fn deck_id(name: &str) -> i64 {
    let digest = Sha256::digest(name.as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);

    let reduced = u64::from_be_bytes(prefix) % DECK_ID_RANGE;
    reduced as i64
}

/// Returns the two-field note model shared by all generated cards.
///
/// The front shows the question; the back repeats the front and appends the
/// answer below a separator.
#[must_use]
pub fn note_model() -> Model {
    Model::new(
        MODEL_ID,
        "Simple Model",
        vec![Field::new("Question"), Field::new("Answer")],
        vec![Template::new("Card 1")
            .qfmt("{{Question}}")
            .afmt(r#"{{FrontSide}}<hr id="answer">{{Answer}}"#)],
    )
}

/// Builds a deck containing one note per QA pair, order preserved.
///
/// # Errors
///
/// Returns an error if a note rejects its field values.
pub fn build_deck(name: &str, description: &str, pairs: &[QaPair]) -> Result<Deck> {
    let id = deck_id(name);
    let model = note_model();
    let mut deck = Deck::new(id, name, description);

    for pair in pairs {
        let note = Note::new(
            model.clone(),
            vec![pair.question.as_str(), pair.answer.as_str()],
        )?;
        deck.add_note(note);
    }

    debug!("Built deck '{}' (id {}) with {} notes", name, id, pairs.len());
    Ok(deck)
}

/// Serializes a deck into a self-contained `.apkg` package file.
///
/// # Errors
///
/// Returns an error if the package cannot be written.
pub fn write_package(mut deck: Deck, path: &Path) -> Result<()> {
    deck.write_to_file(&path.to_string_lossy())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deck_id_is_stable() {
        assert_eq!(deck_id("Biology"), deck_id("Biology"));
    }

    #[test]
    fn test_deck_id_within_range() {
        for name in ["a", "Biology", "Rust Notes", ""] {
            let id = deck_id(name);
            assert!(id >= 0);
            assert!((id as u64) < DECK_ID_RANGE);
        }
    }

    #[test]
    fn test_distinct_names_distinct_ids() {
        // Collisions are possible in principle, just not for these.
        assert_ne!(deck_id("Biology"), deck_id("Chemistry"));
        assert_ne!(deck_id("Biology"), deck_id("biology"));
    }

    #[test]
    fn test_deck_id_independent_of_content() {
        let before = deck_id("Biology");
        let pairs = vec![QaPair {
            question: "Q".to_string(),
            answer: "A".to_string(),
        }];
        build_deck("Biology", "", &pairs).unwrap();

        assert_eq!(deck_id("Biology"), before);
    }

    #[test]
    fn test_build_deck_empty() {
        let deck = build_deck("Empty", "", &[]);

        assert!(deck.is_ok());
    }

    #[test]
    fn test_build_deck_with_pairs() {
        let pairs = vec![
            QaPair {
                question: "What is 2+2?".to_string(),
                answer: "4".to_string(),
            },
            QaPair {
                question: "Capital of France?".to_string(),
                answer: "Paris".to_string(),
            },
        ];

        let deck = build_deck("Quiz", "", &pairs);

        assert!(deck.is_ok());
    }

    #[test]
    fn test_write_package() {
        let temp = assert_fs::TempDir::new().unwrap();
        let path = temp.path().join("Quiz.apkg");

        let pairs = vec![QaPair {
            question: "Q?".to_string(),
            answer: "A".to_string(),
        }];
        let deck = build_deck("Quiz", "", &pairs).unwrap();
        write_package(deck, &path).unwrap();

        assert!(path.exists());
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }
}
