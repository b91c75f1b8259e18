//! Feature-hashing encoder. Local, deterministic, always available.
//!
//! Each word contributes a unigram feature and its boundary-padded character
//! trigrams, so paraphrases that share word stems ("offer" / "offered")
//! land close together. Features are hashed into fixed-dimension buckets
//! with FNV-1a and the result is L2-normalized.

use askdesk_core::error::Result;
use askdesk_core::traits::Encoder;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::LazyLock;

const WORD_WEIGHT: f32 = 1.0;
const TRIGRAM_WEIGHT: f32 = 0.5;

static STOP_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "the", "a", "an", "is", "are", "was", "were", "be", "been", "being", "have", "has",
        "had", "do", "does", "did", "will", "would", "could", "should", "may", "might",
        "shall", "can", "i", "me", "my", "you", "your", "we", "our", "us", "they", "it",
        "this", "that", "these", "those", "what", "which", "who", "how", "and", "but", "or",
        "of", "in", "on", "at", "to", "for", "with", "from", "by", "as", "if", "so", "any",
    ]
    .into_iter()
    .collect()
});

pub struct HashingEncoder {
    dimensions: usize,
}

impl HashingEncoder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    /// Hash a feature into a bucket index using FNV-1a.
    fn bucket(feature: &str, dims: usize) -> usize {
        let mut h: u64 = 0xcbf29ce484222325;
        for b in feature.as_bytes() {
            h ^= *b as u64;
            h = h.wrapping_mul(0x100000001b3);
        }
        (h % dims as u64) as usize
    }

    /// Lowercase alphanumeric words, stop words removed.
    fn tokenize(text: &str) -> Vec<String> {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(|w| w.to_lowercase())
            .filter(|w| !STOP_WORDS.contains(w.as_str()))
            .collect()
    }

    pub fn vector(&self, text: &str) -> Vec<f32> {
        let mut vec = vec![0.0f32; self.dimensions];

        for word in Self::tokenize(text) {
            vec[Self::bucket(&format!("w:{word}"), self.dimensions)] += WORD_WEIGHT;

            let padded: Vec<char> = format!("^{word}$").chars().collect();
            for tri in padded.windows(3) {
                let feature: String = tri.iter().collect();
                vec[Self::bucket(&format!("t:{feature}"), self.dimensions)] += TRIGRAM_WEIGHT;
            }
        }

        let norm: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for v in &mut vec {
                *v /= norm;
            }
        }
        vec
    }
}

#[async_trait]
impl Encoder for HashingEncoder {
    fn name(&self) -> &str {
        "hashing"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn encode(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.vector(text))
    }
}
