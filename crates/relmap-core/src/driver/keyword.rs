/// Abstract SQL keywords whose spelling differs between backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlKeyword {
    Lower,
    Upper,
    Like,
    ILike,
}
