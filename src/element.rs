use std::fmt::{Debug, Display};

/**
 * Vertices and faces of the mesh implement this trait. They are identified by
 * their integer key.
 */
pub trait Handle {
    /**
     * The key of the element.
     */
    fn index(&self) -> u32;
}

/**
 * Vertex handle.
 */
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VH {
    idx: u32,
}

/**
 * Face handle.
 */
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FH {
    idx: u32,
}

impl Handle for VH {
    fn index(&self) -> u32 {
        self.idx
    }
}

impl From<u32> for VH {
    fn from(idx: u32) -> Self {
        VH { idx }
    }
}

impl From<&u32> for VH {
    fn from(idx: &u32) -> Self {
        VH { idx: *idx }
    }
}

impl Handle for FH {
    fn index(&self) -> u32 {
        self.idx
    }
}

impl From<u32> for FH {
    fn from(idx: u32) -> Self {
        FH { idx }
    }
}

impl From<&u32> for FH {
    fn from(idx: &u32) -> Self {
        FH { idx: *idx }
    }
}

impl Display for VH {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "VH({})", self.index())
    }
}

impl Display for FH {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FH({})", self.index())
    }
}

impl Debug for VH {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "VH({})", self.index())
    }
}

impl Debug for FH {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FH({})", self.index())
    }
}

/// Monotonic key generator.
///
/// The counter only ever grows. Automatic keys are taken from the counter, and
/// explicit keys push the counter past themselves, so a freshly generated key
/// is always larger than any key ever used, even after deletions. Once
/// `u32::MAX` has been used there are no keys left to generate.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct KeyCounter {
    next: u64,
}

impl KeyCounter {
    /// The next key, or `None` if the keys are exhausted.
    pub fn generate(&mut self) -> Option<u32> {
        let key = self.peek()?;
        self.next += 1;
        Some(key)
    }

    pub fn observe(&mut self, key: u32) {
        self.next = self.next.max(u64::from(key) + 1);
    }

    pub fn peek(&self) -> Option<u32> {
        u32::try_from(self.next).ok()
    }
}
