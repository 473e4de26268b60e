// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Page-aligned transfer buffers.
//!
//! The SG driver can map user pages straight into the HBA's scatter list
//! when the data buffer starts on a page boundary. Instead of asking the
//! allocator for a specific alignment, we over-allocate by one page and
//! keep a view that starts at the first aligned byte of the block.

use core::fmt;

use crate::error::SgError;

/// Page size assumed for transfer buffers.
pub const PAGE_SIZE: usize = 4096;

/// Page size as reported by the OS, falling back to [`PAGE_SIZE`].
pub fn page_size() -> usize {
    // SAFETY: sysconf has no preconditions.
    let sz = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    usize::try_from(sz).ok().filter(|s| s.is_power_of_two()).unwrap_or(PAGE_SIZE)
}

/// An owned, zero-initialised block with an aligned window of `len` bytes.
///
/// The backing `Vec` is never grown after construction, so the window keeps
/// its address for the buffer's whole life.
pub struct AlignedBuffer {
    raw: Vec<u8>,
    offset: usize,
    len: usize,
}

impl AlignedBuffer {
    /// Allocate `len` usable bytes starting on a page boundary (at least
    /// [`PAGE_SIZE`]).
    pub fn new(len: usize) -> Result<Self, SgError> {
        Self::with_alignment(len, page_size().max(PAGE_SIZE))
    }

    /// Allocate `len` usable bytes starting on an `align` boundary.
    ///
    /// `len` must be non-zero: a transfer with no data phase carries no
    /// buffer at all.
    pub fn with_alignment(len: usize, align: usize) -> Result<Self, SgError> {
        if len == 0 {
            return Err(SgError::invalid("aligned buffer length must be non-zero"));
        }
        if !align.is_power_of_two() {
            return Err(SgError::invalid(format!(
                "alignment {align} is not a power of two"
            )));
        }
        let total = len
            .checked_add(align)
            .ok_or(SgError::OutOfMemory { requested: len })?;

        let mut raw = Vec::new();
        raw.try_reserve_exact(total)
            .map_err(|_| SgError::OutOfMemory { requested: len })?;
        raw.resize(total, 0);

        let offset = raw.as_ptr().align_offset(align);
        if offset >= align || offset + len > raw.len() {
            return Err(SgError::OutOfMemory { requested: len });
        }

        Ok(Self { raw, offset, len })
    }

    /// Allocate an aligned copy of `data`.
    pub fn copy_from(data: &[u8]) -> Result<Self, SgError> {
        let mut buf = Self::new(data.len())?;
        buf.as_mut_slice().copy_from_slice(data);
        Ok(buf)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.raw[self.offset..self.offset + self.len]
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.raw[self.offset..self.offset + self.len]
    }

    #[inline]
    pub fn as_ptr(&self) -> *const u8 {
        self.as_slice().as_ptr()
    }

    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.as_mut_slice().as_mut_ptr()
    }

    /// Copy out the first `n` bytes of the window (clamped to its length).
    pub fn to_vec_truncated(&self, n: usize) -> Vec<u8> {
        self.as_slice()[..n.min(self.len)].to_vec()
    }
}

impl fmt::Debug for AlignedBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlignedBuffer")
            .field("len", &self.len)
            .field("offset", &self.offset)
            .field("allocated", &self.raw.len())
            .finish()
    }
}
