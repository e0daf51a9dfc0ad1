// File: src/core/ngram.rs

/// Longest n-gram extracted from a token, in characters.
pub const MAX_NGRAM_LEN: usize = 5;

/// Iterates every character n-gram of `token` of length 1..=MAX_NGRAM_LEN.
/// Order is start offset first, then length: "cat" gives c, ca, cat, a, at, t.
/// The yielded slices borrow from `token`; nothing is allocated per n-gram.
pub fn generate_ngrams(token: &str) -> NGrams<'_> {
    let mut boundaries: Vec<usize> = token.char_indices().map(|(i, _)| i).collect();
    boundaries.push(token.len());
    NGrams {
        token,
        boundaries,
        start: 0,
        len: 1,
    }
}

/// Number of n-grams [`generate_ngrams`] yields for a token of `chars` characters:
/// the sum over each offset i of min(MAX_NGRAM_LEN, chars - i).
pub fn ngram_count(chars: usize) -> usize {
    (0..chars).map(|i| MAX_NGRAM_LEN.min(chars - i)).sum()
}

pub struct NGrams<'a> {
    token: &'a str,
    /// Byte offset of every char, plus the token length.
    boundaries: Vec<usize>,
    start: usize,
    len: usize,
}

impl<'a> NGrams<'a> {
    fn char_len(&self) -> usize {
        self.boundaries.len() - 1
    }
}

impl<'a> Iterator for NGrams<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let chars = self.char_len();
        if self.start >= chars {
            return None;
        }
        let from = self.boundaries[self.start];
        let to = self.boundaries[self.start + self.len];
        let gram = &self.token[from..to];

        if self.len < MAX_NGRAM_LEN && self.start + self.len < chars {
            self.len += 1;
        } else {
            self.start += 1;
            self.len = 1;
        }
        Some(gram)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let chars = self.char_len();
        if self.start >= chars {
            return (0, Some(0));
        }
        let rest = ngram_count(chars - self.start) - (self.len - 1);
        (rest, Some(rest))
    }
}

impl<'a> ExactSizeIterator for NGrams<'a> {}
