use super::types::Difficulty;

/// Encoder-driven difficulty picker. Both rotation directions are honored
/// and the list wraps around; confirmation is the caller's button edge.
pub struct DifficultyMenu {
    index: usize,
}

impl DifficultyMenu {
    pub const fn new() -> Self {
        Self { index: 0 }
    }

    pub fn current(&self) -> Difficulty {
        Difficulty::ALL[self.index]
    }

    /// Applies one poll's worth of encoder detents; returns whether the
    /// highlighted entry changed.
    pub fn turn(&mut self, detents: i32) -> bool {
        if detents == 0 {
            return false;
        }
        let len = Difficulty::ALL.len() as i32;
        self.index = (self.index as i32 + detents).rem_euclid(len) as usize;
        true
    }
}
