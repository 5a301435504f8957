use anyhow::{ensure, Result};

/// Genre labels in the exact column order of the model's output vector.
pub const GENRES: [&str; 24] = [
    "Action",
    "Adventure",
    "Animation",
    "Biography",
    "Comedy",
    "Crime",
    "Documentary",
    "Drama",
    "Family",
    "Fantasy",
    "Film-Noir",
    "History",
    "Horror",
    "Music",
    "Musical",
    "Mystery",
    "News",
    "Romance",
    "Sci-Fi",
    "Short",
    "Sport",
    "Thriller",
    "War",
    "Western",
];

/// A genre is predicted when its probability is strictly above this value.
pub const THRESHOLD: f32 = 0.5;

/// Probabilities for one input, keyed by genre in `GENRES` order.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    scores: Vec<(&'static str, f32)>,
}

impl Prediction {
    /// Pair a raw model output row with the label set.
    pub fn from_probabilities(probabilities: &[f32]) -> Result<Self> {
        ensure!(
            probabilities.len() == GENRES.len(),
            "model returned {} probabilities, expected {}",
            probabilities.len(),
            GENRES.len()
        );

        let scores = GENRES
            .iter()
            .copied()
            .zip(probabilities.iter().copied())
            .collect();

        Ok(Self { scores })
    }

    /// Genres above `THRESHOLD`, in label set order.
    pub fn filtered_labels(&self) -> Vec<String> {
        self.scores
            .iter()
            .filter(|(_, p)| *p > THRESHOLD)
            .map(|(genre, _)| genre.to_string())
            .collect()
    }

    /// `"<Genre>: <p>"` for every genre, six decimals.
    pub fn formatted_probabilities(&self) -> Vec<String> {
        self.scores
            .iter()
            .map(|(genre, p)| format!("{genre}: {p:.6}"))
            .collect()
    }
}

#[cfg(test)]
impl Prediction {
    pub fn scores(&self) -> &[(&'static str, f32)] {
        &self.scores
    }

    pub fn probability(&self, genre: &str) -> Option<f32> {
        self.scores
            .iter()
            .find(|(name, _)| *name == genre)
            .map(|(_, p)| *p)
    }
}
