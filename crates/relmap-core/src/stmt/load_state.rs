/// How much of an object's association graph has been hydrated.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LoadState {
    /// Only the object's own columns are populated.
    #[default]
    New,

    /// Wire-visible associations have been loaded.
    PartialLoad,

    /// Every eligible association has been loaded.
    FullLoad,
}

impl LoadState {
    /// Returns true when an object in this state needs no further loading to
    /// satisfy `requested`.
    pub fn satisfies(self, requested: LoadState) -> bool {
        self >= requested
    }
}
