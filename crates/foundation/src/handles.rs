/// Generational handle: `(index, generation)`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(u32, u32);

impl Handle {
    pub fn new(index: u32, generation: u32) -> Self {
        Handle(index, generation)
    }

    pub fn index(&self) -> u32 {
        self.0
    }

    pub fn generation(&self) -> u32 {
        self.1
    }
}

/// Hands out monotonically increasing handles. Indices are never reused within one
/// allocator, so a stale handle can never alias a live resource.
#[derive(Debug, Default)]
pub struct HandleAllocator {
    next_index: u32,
    generation: u32,
}

impl HandleAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocator whose handles carry `generation`, e.g. one per mount.
    pub fn with_generation(generation: u32) -> Self {
        Self {
            next_index: 0,
            generation,
        }
    }

    pub fn allocate(&mut self) -> Handle {
        let h = Handle::new(self.next_index, self.generation);
        self.next_index = self.next_index.wrapping_add(1);
        h
    }

    pub fn allocated(&self) -> u32 {
        self.next_index
    }
}
