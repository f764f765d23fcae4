/// Char offsets of one displayed field that should be emphasized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchSpan {
    positions: Vec<usize>,
}

impl MatchSpan {
    #[must_use]
    pub fn from_positions(mut positions: Vec<usize>) -> Self {
        positions.sort_unstable();
        positions.dedup();
        Self { positions }
    }

    #[must_use]
    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Moves every offset `by` chars to the right.
    #[must_use]
    pub fn shifted(mut self, by: usize) -> Self {
        for pos in &mut self.positions {
            *pos += by;
        }
        self
    }

    /// Folds the offsets into contiguous half-open `[start, end)` runs.
    #[must_use]
    pub fn ranges(&self) -> Vec<[usize; 2]> {
        let mut ranges: Vec<[usize; 2]> = Vec::new();
        for &pos in &self.positions {
            match ranges.last_mut() {
                Some(last) if last[1] == pos => last[1] = pos + 1,
                _ => ranges.push([pos, pos + 1]),
            }
        }
        ranges
    }

    /// Wraps each highlighted run of `text` in `open`/`close` markers.
    #[must_use]
    pub fn mark(&self, text: &str, open: &str, close: &str) -> String {
        let mut out = String::with_capacity(text.len() + self.positions.len() * 2);
        let mut ranges = self.ranges().into_iter().peekable();
        for (idx, ch) in text.chars().enumerate() {
            if let Some(&[start, end]) = ranges.peek() {
                if idx == start {
                    out.push_str(open);
                }
                out.push(ch);
                if idx + 1 == end {
                    out.push_str(close);
                    ranges.next();
                }
            } else {
                out.push(ch);
            }
        }
        out
    }
}
