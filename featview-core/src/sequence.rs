use serde::{Deserialize, Serialize};

/// Residues shown on the sequence row, or just a length when only the
/// coordinate system is known.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "SequenceInput")]
pub struct Sequence {
    pub residues: Vec<char>,
    pub length: usize,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SequenceInput {
    Text(String),
    Residues(Vec<String>),
    Length(usize),
}

impl From<SequenceInput> for Sequence {
    fn from(input: SequenceInput) -> Self {
        match input {
            SequenceInput::Text(s) => Sequence::from(s.as_str()),
            SequenceInput::Residues(list) => {
                Sequence::from(list.iter().filter_map(|r| r.chars().next()).collect::<Vec<char>>())
            }
            SequenceInput::Length(n) => Sequence::from_length(n),
        }
    }
}

impl From<&str> for Sequence {
    fn from(s: &str) -> Self {
        Sequence::from(s.chars().filter(|c| !c.is_whitespace()).collect::<Vec<char>>())
    }
}

impl From<Vec<char>> for Sequence {
    fn from(residues: Vec<char>) -> Self {
        let length = residues.len();
        Self { residues, length }
    }
}

impl Sequence {
    pub fn from_length(length: usize) -> Self {
        Self { residues: Vec::new(), length }
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn has_residues(&self) -> bool {
        !self.residues.is_empty()
    }

    /// Residue at a 1-based position.
    pub fn residue(&self, position: usize) -> Option<char> {
        position.checked_sub(1).and_then(|i| self.residues.get(i)).copied()
    }

    /// 0-based slice bounds covering a visible `[start, end]` window.
    pub fn window(&self, start: f64, end: f64) -> (usize, usize) {
        let len = self.residues.len();
        let lo = ((start + 0.5).floor() - 1.0).max(0.0) as usize;
        let hi = (end.ceil().max(0.0) as usize).min(len);
        (lo.min(hi), hi)
    }

    /// `[0, length + 1]`, the horizontal domain for this sequence.
    pub fn x_domain(&self) -> (f64, f64) {
        (0.0, self.length as f64 + 1.0)
    }
}
