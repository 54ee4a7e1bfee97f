//! The runtime buffer descriptor passed to a compiled pipeline: a bit-exact
//! layout so the backend (out of scope here) and any future native-codegen
//! counterpart agree on field order and width.

use serde::{Deserialize, Serialize};

pub const MAX_RANK: usize = 4;

/// A rank-`r` buffer descriptor, `r <= `[`MAX_RANK`]. Dimensions `i >= r`
/// carry `extent[i] == 0`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferDescriptor {
    pub host: u64,
    pub device: u64,
    pub host_dirty: u8,
    pub device_dirty: u8,
    pub extent: [u32; MAX_RANK],
    pub stride: [u32; MAX_RANK],
    pub min: [u32; MAX_RANK],
    pub elem_size: u32,
}

impl BufferDescriptor {
    /// A zeroed descriptor for a buffer of rank `r`, no host/device memory
    /// attached.
    pub fn new(rank: usize, elem_size: u32) -> Self {
        debug_assert!(rank <= MAX_RANK, "buffer rank exceeds MAX_RANK");
        BufferDescriptor {
            host: 0,
            device: 0,
            host_dirty: 0,
            device_dirty: 0,
            extent: [0; MAX_RANK],
            stride: [0; MAX_RANK],
            min: [0; MAX_RANK],
            elem_size,
        }
    }

    pub fn rank(&self) -> usize {
        self.extent.iter().take_while(|&&e| e != 0).count()
    }

    pub fn set_dim(&mut self, i: usize, min: u32, extent: u32, stride: u32) {
        self.min[i] = min;
        self.extent[i] = extent;
        self.stride[i] = stride;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_buffer_is_zeroed_beyond_elem_size() {
        let b = BufferDescriptor::new(2, 4);
        assert_eq!(b.host, 0);
        assert_eq!(b.elem_size, 4);
        assert_eq!(b.rank(), 0);
    }

    #[test]
    fn set_dim_and_rank_tracking() {
        let mut b = BufferDescriptor::new(2, 4);
        b.set_dim(0, 0, 640, 1);
        b.set_dim(1, 0, 480, 640);
        assert_eq!(b.rank(), 2);
        assert_eq!(b.extent, [640, 480, 0, 0]);
        assert_eq!(b.stride, [1, 640, 0, 0]);
    }

    #[test]
    fn layout_is_repr_c_sized_as_expected() {
        // 8 (host) + 8 (device) + 1 + 1 (+ 2 padding to the next u32) +
        // 4*4 (extent) + 4*4 (stride) + 4*4 (min) + 4 (elem_size) = 72.
        assert_eq!(std::mem::size_of::<BufferDescriptor>(), 72);
    }
}
