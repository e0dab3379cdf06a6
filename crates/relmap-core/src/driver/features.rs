use std::{fmt, ops::BitOr};

/// Capabilities of a backend, as a bitset.
///
/// Callers consult it to decide whether identifiers and timestamps must be
/// generated client side.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Features(u8);

impl Features {
    pub const NONE: Features = Features(0);

    /// The backend fills in missing GUID keys.
    pub const AUTO_GENERATE_GUIDS: Features = Features(1 << 0);

    /// The backend fills in creation timestamps.
    pub const AUTO_GENERATE_TIMESTAMPS: Features = Features(1 << 1);

    /// Inserts can return generated column values.
    pub const RETURNED_INSERTS: Features = Features(1 << 2);

    pub const ALL: Features = Features(0b111);

    pub const fn contains(self, other: Features) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn union(self, other: Features) -> Features {
        Features(self.0 | other.0)
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for Features {
    type Output = Features;

    fn bitor(self, rhs: Features) -> Features {
        self.union(rhs)
    }
}

impl fmt::Debug for Features {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut set = f.debug_set();

        for (flag, name) in [
            (Features::AUTO_GENERATE_GUIDS, "AUTO_GENERATE_GUIDS"),
            (Features::AUTO_GENERATE_TIMESTAMPS, "AUTO_GENERATE_TIMESTAMPS"),
            (Features::RETURNED_INSERTS, "RETURNED_INSERTS"),
        ] {
            if self.contains(flag) {
                set.entry(&format_args!("{name}"));
            }
        }

        set.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_and_contains() {
        let features = Features::AUTO_GENERATE_GUIDS | Features::RETURNED_INSERTS;
        assert!(features.contains(Features::AUTO_GENERATE_GUIDS));
        assert!(!features.contains(Features::AUTO_GENERATE_TIMESTAMPS));
        assert!(Features::ALL.contains(features));
        assert!(Features::NONE.is_empty());
    }
}
