//! Byte and list storage: heapless by default, heap-backed with the `alloc` feature.
//!
//! `Buf<N>` holds the raw bytes of a single protocol name and `List<T, N>` holds
//! the ordered protocol list. Without the `alloc` feature both are backed by
//! `heapless::Vec` (inline storage, hard capacity `N`). With `alloc` they are
//! backed by `alloc::vec::Vec` (heap storage, `N` ignored).

use crate::error::Error;

#[cfg(not(feature = "alloc"))]
pub type Buf<const N: usize> = heapless::Vec<u8, N>;

#[cfg(feature = "alloc")]
pub type Buf<const N: usize> = alloc::vec::Vec<u8>;

#[cfg(not(feature = "alloc"))]
pub type List<T, const N: usize> = heapless::Vec<T, N>;

#[cfg(feature = "alloc")]
pub type List<T, const N: usize> = alloc::vec::Vec<T>;

/// Common operations on byte buffers, abstracting over heapless and alloc backends.
pub trait BufExt {
    fn buf_extend_from_slice(&mut self, data: &[u8]) -> Result<(), Error>;
    fn buf_as_slice(&self) -> &[u8];
}

/// Push access to a protocol list, abstracting over heapless and alloc backends.
pub trait ListExt<T> {
    /// Append `item`, failing with `CapacityExceeded` when inline storage is full.
    fn list_push(&mut self, item: T) -> Result<(), Error>;
    fn list_as_slice(&self) -> &[T];
}

impl<const N: usize> BufExt for heapless::Vec<u8, N> {
    fn buf_extend_from_slice(&mut self, data: &[u8]) -> Result<(), Error> {
        self.extend_from_slice(data).map_err(|_| Error::BufferTooSmall {
            needed: self.len() + data.len(),
        })
    }
    fn buf_as_slice(&self) -> &[u8] { self }
}

impl<T, const N: usize> ListExt<T> for heapless::Vec<T, N> {
    fn list_push(&mut self, item: T) -> Result<(), Error> {
        self.push(item).map_err(|_| Error::CapacityExceeded)
    }
    fn list_as_slice(&self) -> &[T] { self }
}

#[cfg(feature = "alloc")]
impl BufExt for alloc::vec::Vec<u8> {
    fn buf_extend_from_slice(&mut self, data: &[u8]) -> Result<(), Error> {
        self.extend_from_slice(data);
        Ok(())
    }
    fn buf_as_slice(&self) -> &[u8] { self }
}

#[cfg(feature = "alloc")]
impl<T> ListExt<T> for alloc::vec::Vec<T> {
    fn list_push(&mut self, item: T) -> Result<(), Error> {
        self.push(item);
        Ok(())
    }
    fn list_as_slice(&self) -> &[T] { self }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heapless_list_reports_capacity() {
        let mut list: heapless::Vec<u8, 2> = heapless::Vec::new();
        list.list_push(1).unwrap();
        list.list_push(2).unwrap();
        assert_eq!(list.list_push(3), Err(Error::CapacityExceeded));
        assert_eq!(list.list_as_slice(), &[1, 2]);
    }

    #[test]
    fn heapless_buf_reports_needed() {
        let mut buf: heapless::Vec<u8, 4> = heapless::Vec::new();
        buf.buf_extend_from_slice(b"h2").unwrap();
        assert_eq!(
            buf.buf_extend_from_slice(b"abc"),
            Err(Error::BufferTooSmall { needed: 5 })
        );
        assert_eq!(buf.buf_as_slice(), b"h2");
    }
}
