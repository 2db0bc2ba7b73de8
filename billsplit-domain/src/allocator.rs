/// Strictly increasing id source for one entity kind.
///
/// Ids start at 1 and are never reused, even after the entity they were
/// minted for is gone. Each aggregate owns the sequence for the kind it
/// mints, so independent sessions and tests never interfere.
#[derive(Clone, Debug, Default)]
pub struct IdSequence(u64);

impl IdSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&mut self) -> u64 {
        self.0 += 1;
        self.0
    }
}
