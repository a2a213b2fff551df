//! Byte-cost contract for stored values

use std::rc::Rc;
use std::sync::Arc;

use bytes::Bytes;

/// A value that can report how many bytes it costs the store
///
/// The store charges each entry `value.len() + key.as_ref().len()` bytes
/// against its budget. The reported length must not change while the value
/// sits in the store.
#[allow(clippy::len_without_is_empty)]
pub trait Value {
    /// Byte-cost of this value
    fn len(&self) -> usize;
}

impl Value for String {
    fn len(&self) -> usize {
        String::len(self)
    }
}

impl Value for &str {
    fn len(&self) -> usize {
        str::len(self)
    }
}

impl Value for Box<str> {
    fn len(&self) -> usize {
        str::len(self)
    }
}

impl Value for Vec<u8> {
    fn len(&self) -> usize {
        Vec::len(self)
    }
}

impl Value for Box<[u8]> {
    fn len(&self) -> usize {
        <[u8]>::len(self)
    }
}

impl Value for Bytes {
    fn len(&self) -> usize {
        Bytes::len(self)
    }
}

impl<T: Value + ?Sized> Value for Arc<T> {
    fn len(&self) -> usize {
        T::len(self)
    }
}

impl<T: Value + ?Sized> Value for Rc<T> {
    fn len(&self) -> usize {
        T::len(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cost<V: Value>(value: &V) -> usize {
        value.len()
    }

    #[test]
    fn test_string_like_values() {
        assert_eq!(cost(&String::from("hello")), 5);
        assert_eq!(cost(&"héllo"), 6);
        assert_eq!(cost(&Box::<str>::from("abc")), 3);
    }

    #[test]
    fn test_byte_values() {
        assert_eq!(cost(&vec![0u8; 16]), 16);
        assert_eq!(cost(&vec![1u8; 4].into_boxed_slice()), 4);
        assert_eq!(cost(&Bytes::from_static(b"page")), 4);
        assert_eq!(cost(&Vec::<u8>::new()), 0);
    }

    #[test]
    fn test_shared_values() {
        assert_eq!(cost(&Arc::new(vec![0u8; 10])), 10);
        assert_eq!(cost(&Rc::new(String::from("rc"))), 2);
    }
}
