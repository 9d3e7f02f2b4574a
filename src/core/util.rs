use std::hash::BuildHasher;
use std::hash::Hasher;

/// Hasher for server-assigned window identifiers, which are already
/// well distributed.
#[derive(Default)]
pub struct IdHasher {
    state: u64,
}

impl Hasher for IdHasher {
    #[inline]
    fn write(
        &mut self,
        bytes: &[u8],
    ) {
        for &byte in bytes {
            self.state = self.state.rotate_left(8) + u64::from(byte);
        }
    }

    #[inline]
    fn write_u32(
        &mut self,
        value: u32,
    ) {
        self.state = u64::from(value);
    }

    #[inline]
    fn finish(&self) -> u64 {
        self.state
    }
}

#[derive(Default, Clone)]
pub struct BuildIdHasher;

impl BuildHasher for BuildIdHasher {
    type Hasher = IdHasher;

    #[inline]
    fn build_hasher(&self) -> Self::Hasher {
        Self::Hasher {
            state: 0,
        }
    }
}
