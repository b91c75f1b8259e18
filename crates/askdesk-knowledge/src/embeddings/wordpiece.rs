//! Uncased WordPiece tokenizer for BERT-family sentence encoders.

use askdesk_core::error::{AskDeskError, Result};
use std::collections::HashMap;
use std::path::Path;

const MAX_WORD_CHARS: usize = 100;

/// Greedy longest-match-first WordPiece over a `vocab.txt` token list.
pub struct WordPiece {
    vocab: HashMap<String, i64>,
    unk: i64,
    cls: i64,
    sep: i64,
    /// Sequence cap including `[CLS]` and `[SEP]`.
    max_len: usize,
}

impl WordPiece {
    /// Read `vocab.txt`: one token per line, id = line number.
    pub fn from_vocab_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AskDeskError::Encoder(format!("{}: {e}", path.display())))?;
        Self::from_tokens(content.lines())
    }

    pub fn from_tokens<'a>(tokens: impl IntoIterator<Item = &'a str>) -> Result<Self> {
        let vocab: HashMap<String, i64> = tokens
            .into_iter()
            .enumerate()
            .map(|(id, token)| (token.trim_end().to_string(), id as i64))
            .collect();
        let special = |name: &str| {
            vocab
                .get(name)
                .copied()
                .ok_or_else(|| AskDeskError::Encoder(format!("vocabulary has no {name} token")))
        };
        Ok(Self {
            unk: special("[UNK]")?,
            cls: special("[CLS]")?,
            sep: special("[SEP]")?,
            vocab,
            max_len: 256,
        })
    }

    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = max_len.max(2);
        self
    }

    /// `[CLS] pieces… [SEP]`, truncated to `max_len`.
    pub fn encode(&self, text: &str) -> Vec<i64> {
        let mut ids = vec![self.cls];
        for word in basic_tokens(&text.to_lowercase()) {
            self.push_word(&word, &mut ids);
        }
        ids.truncate(self.max_len - 1);
        ids.push(self.sep);
        ids
    }

    fn push_word(&self, word: &str, ids: &mut Vec<i64>) {
        let chars: Vec<char> = word.chars().collect();
        if chars.len() > MAX_WORD_CHARS {
            ids.push(self.unk);
            return;
        }

        let mut pieces = Vec::new();
        let mut start = 0;
        while start < chars.len() {
            let mut end = chars.len();
            let mut found = None;
            while start < end {
                let body: String = chars[start..end].iter().collect();
                let candidate = if start == 0 { body } else { format!("##{body}") };
                if let Some(&id) = self.vocab.get(&candidate) {
                    found = Some(id);
                    break;
                }
                end -= 1;
            }
            match found {
                Some(id) => {
                    pieces.push(id);
                    start = end;
                }
                None => {
                    ids.push(self.unk);
                    return;
                }
            }
        }
        ids.extend(pieces);
    }
}

/// Whitespace split with every punctuation character as its own token.
fn basic_tokens(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    for c in text.chars() {
        if c.is_whitespace() {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
        } else if !c.is_alphanumeric() {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
            tokens.push(c.to_string());
        } else {
            current.push(c);
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}
