/// The consumable the learner is looking for
///
/// It never acts on its own; the learner moves it to a fresh random cell
/// whenever it is eaten.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Target;

impl Target {
    pub fn new() -> Self {
        Self
    }
}
