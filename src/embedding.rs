use crate::error::RaceError;

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::fmt::{self, Debug, Display};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use flate2::read::GzDecoder;
use ndarray::{Array1, Array2, Axis};
use ndarray_npy::read_npy;
use tracing::{info, warn};


/// Word -> vector lookup, read only once loaded.
pub struct EmbeddingTable {
    t2i: HashMap<String, usize>,
    vecs: Vec<Array1<f32>>,
    dim: usize,
}

impl EmbeddingTable {

    /// Parses `word v1 v2 ... vN` lines, values must be finite numbers. The width of the first row is the table dim,
    /// a repeated word overwrites the earlier row.
    pub fn load<R: BufRead>(reader: R) -> Result<EmbeddingTable, RaceError> {

        let mut t2i: HashMap<String, usize> = HashMap::new();
        let mut vecs: Vec<Array1<f32>> = Vec::new();
        let mut dim: Option<usize> = None;

        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let mut fields = line.split_whitespace();
            let word = match fields.next() {
                Some(word) => word,
                None => continue, // blank line
            };

            let values = fields
            .map(|token| match token.parse::<f32>() {
                Ok(value) if value.is_finite() => Ok(value),
                _ => Err(RaceError::MalformedLine { line: i + 1, token: token.to_owned() })
            })
            .collect::<Result<Vec<f32>, RaceError>>()?;

            let width = *dim.get_or_insert(values.len());
            if values.len() != width {
                warn!("line {}: '{}' has {} values, expected {}", i + 1, word, values.len(), width);
            }

            let row = Array1::from_vec(values);
            match t2i.get(word) {
                Some(index) => vecs[*index] = row,
                None => {
                    t2i.insert(word.to_owned(), vecs.len());
                    vecs.push(row);
                }
            }
        }

        Ok(Self {
            t2i: t2i,
            vecs: vecs,
            dim: dim.unwrap_or(0)
        })
    }

    /// Opens a text table from disk, `.gz` files are decompressed while reading.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<EmbeddingTable, RaceError> {

        let path = path.as_ref();
        info!("loading vectors from {}...", path.display());

        let f = File::open(path)?;
        let table = if path.extension().map_or(false, |ext| ext == "gz") {
            EmbeddingTable::load(BufReader::new(GzDecoder::new(f)))?
        } else {
            EmbeddingTable::load(BufReader::new(f))?
        };

        info!("loaded {} vectors of dim {}", table.len(), table.dim());
        Ok(table)
    }

    /// Loads trainer output: an `.npy` matrix plus the json `word -> row` index.
    pub fn from_npy<P: AsRef<Path>, Q: AsRef<Path>>(vecs_path: P, words_path: Q) -> Result<EmbeddingTable, RaceError> {

        let w: Array2<f32> = read_npy(vecs_path.as_ref())?;
        let f = BufReader::new(File::open(words_path.as_ref())?);
        let t2i: HashMap<String, usize> = serde_json::from_reader(f)?;

        let n_rows = w.dim().0;
        if let Some((word, i)) = t2i.iter().find(|(_, i)| **i >= n_rows) {
            return Err(RaceError::Config(format!("token '{}' points to row {} but matrix has {} rows", word, i, n_rows)));
        }

        let vecs = w.axis_iter(Axis(0)).map(|row| row.to_owned()).collect::<Vec<Array1<f32>>>();
        info!("loaded {} vectors of dim {}", t2i.len(), w.dim().1);

        Ok(Self {
            t2i: t2i,
            vecs: vecs,
            dim: w.dim().1
        })
    }

    pub fn len(&self) -> usize {
        self.t2i.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t2i.is_empty()
    }

    /// Width of the first row parsed.
    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn contains(&self, word: &str) -> bool {
        self.t2i.contains_key(word)
    }

    pub fn vector(&self, word: &str) -> Option<&Array1<f32>> {
        self.t2i.get(word).map(|i| &self.vecs[*i])
    }

    /// Keeps the words held by the table. Duplicates collapse and the result
    /// iterates in lexicographic order, not input order.
    pub fn filter_present<I>(&self, words: I) -> BTreeSet<String>
    where
        I: IntoIterator,
        I::Item: AsRef<str> {
        words
        .into_iter()
        .filter(|w| self.contains(w.as_ref()))
        .map(|w| w.as_ref().to_owned())
        .collect()
    }

    /// Euclidean distance between the vectors of two words.
    pub fn distance(&self, word_a: &str, word_b: &str) -> Result<f32, RaceError> {

        let a = self.vector(word_a).ok_or_else(|| RaceError::WordNotFound(word_a.to_owned()))?;
        let b = self.vector(word_b).ok_or_else(|| RaceError::WordNotFound(word_b.to_owned()))?;
        euclidean(a, b)
    }

    /// The `k` words closest to `word`, itself excluded, ascending by distance.
    /// Rows of a different width than `word`'s are skipped.
    pub fn nearest(&self, word: &str, k: usize) -> Result<Vec<(String, f32)>, RaceError> {

        let vec = self.vector(word).ok_or_else(|| RaceError::WordNotFound(word.to_owned()))?;

        let mut scored: Vec<(String, f32)> = self.t2i
        .iter()
        .filter(|(token, _)| token.as_str() != word)
        .filter_map(|(token, i)| euclidean(vec, &self.vecs[*i]).ok().map(|d| (token.to_owned(), d)))
        .collect();

        scored.sort_by(|(t, s), (u, r)| rank_distance(*s, *r).then_with(|| t.cmp(u)));
        scored.truncate(k);
        Ok(scored)
    }

}

/// Orders distances ascending with every nan, whatever its sign, last.
pub(crate) fn rank_distance(a: f32, b: f32) -> Ordering {
    a.is_nan().cmp(&b.is_nan()).then_with(|| a.total_cmp(&b))
}

fn euclidean(a: &Array1<f32>, b: &Array1<f32>) -> Result<f32, RaceError> {

    if a.len() != b.len() {
        return Err(RaceError::DimensionMismatch { left: a.len(), right: b.len() });
    }
    let diff = a - b;
    Ok(diff.mapv(|x| x.powi(2)).sum().sqrt())
}

// never dump the vectors themselves
impl Debug for EmbeddingTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddingTable")
        .field("words", &self.len())
        .field("dim", &self.dim)
        .finish()
    }
}

impl Display for EmbeddingTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} words x {} dims", self.len(), self.dim)
    }
}
