#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TreeParams {
    pub max_depth: Option<u16>,
}

impl TreeParams {
    pub fn new() -> Self {
        Self { max_depth: None }
    }

    /// `None` grows until every leaf is pure; `Some(0)` yields a single leaf.
    pub fn set_max_depth(&mut self, max_depth: Option<u16>) {
        self.max_depth = max_depth;
    }

    pub fn max_depth(&self) -> Option<u16> {
        self.max_depth
    }
}
