//! Length-based batch reordering.
//!
//! Sorting a batch by length descending packs similarly sized texts into the
//! same mini batch, which keeps padding waste down. The permutation is
//! recorded so results can be put back in caller order after inference.

/// A permutation that reorders texts by length descending and can undo itself.
#[derive(Debug, Clone)]
pub struct LengthOrdering {
    /// Caller index at each processing position.
    forward: Vec<usize>,
    /// Processing position for each caller index.
    inverse: Vec<usize>,
}

impl LengthOrdering {
    /// Build the permutation for `texts`, longest first. Equal lengths keep
    /// their original relative order so runs are reproducible.
    pub fn by_length_desc(texts: &[String]) -> Self {
        let mut forward: Vec<usize> = (0..texts.len()).collect();
        forward.sort_by(|&a, &b| {
            texts[b]
                .chars()
                .count()
                .cmp(&texts[a].chars().count())
                .then(a.cmp(&b))
        });

        let mut inverse = vec![0; forward.len()];
        for (pos, &idx) in forward.iter().enumerate() {
            inverse[idx] = pos;
        }

        Self { forward, inverse }
    }

    /// Reorder `items` from caller order into processing order.
    pub fn apply<T: Clone>(&self, items: &[T]) -> Vec<T> {
        self.forward.iter().map(|&idx| items[idx].clone()).collect()
    }

    /// Put `items` produced in processing order back into caller order.
    pub fn restore<T>(&self, items: Vec<T>) -> Vec<T> {
        let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
        self.inverse
            .iter()
            .map(|&pos| slots[pos].take().expect("permutation visits each slot once"))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }
}
