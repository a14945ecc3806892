//! Typed buffers for geometry and raster targets
//!
//! A `Resource` is a fixed-size array with an optional 2D shape. The element
//! count is set at construction and never changes.

use std::fmt;

/// Error type for building a resource from existing data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceError {
    SizeMismatch { expected: usize, actual: usize },
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::SizeMismatch { expected, actual } => {
                write!(f, "Resource size mismatch: expected {} elements, got {}", expected, actual)
            }
        }
    }
}

impl std::error::Error for ResourceError {}

#[derive(Debug, Clone, PartialEq)]
pub struct Resource<T> {
    data: Vec<T>,
    width: usize,
    height: usize,
}

impl<T: Default + Clone> Resource<T> {
    /// 1D buffer of `count` default elements
    pub fn new(count: usize) -> Self {
        Self::new_2d(count, 1)
    }

    /// 2D buffer of `width * height` default elements
    pub fn new_2d(width: usize, height: usize) -> Self {
        Self {
            data: vec![T::default(); width * height],
            width,
            height,
        }
    }
}

impl<T> Resource<T> {
    /// Wrap existing data as a `width * height` buffer
    pub fn from_vec(width: usize, height: usize, data: Vec<T>) -> Result<Self, ResourceError> {
        if data.len() != width * height {
            return Err(ResourceError::SizeMismatch {
                expected: width * height,
                actual: data.len(),
            });
        }
        Ok(Self { data, width, height })
    }

    pub fn number_of_elements(&self) -> usize {
        self.data.len()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Element by linear index. Panics if `i` is out of range.
    #[inline]
    pub fn item(&self, i: usize) -> &T {
        &self.data[i]
    }

    #[inline]
    pub fn item_mut(&mut self, i: usize) -> &mut T {
        &mut self.data[i]
    }

    /// Element at (x, y), i.e. `item(y * width + x)`. Panics if out of range.
    #[inline]
    pub fn item_at(&self, x: usize, y: usize) -> &T {
        &self.data[y * self.width + x]
    }

    #[inline]
    pub fn item_at_mut(&mut self, x: usize, y: usize) -> &mut T {
        &mut self.data[y * self.width + x]
    }

    pub fn get(&self, i: usize) -> Option<&T> {
        self.data.get(i)
    }

    pub fn get_at(&self, x: usize, y: usize) -> Option<&T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.width + x)
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }
}

/// 1D buffer over existing data
impl<T> From<Vec<T>> for Resource<T> {
    fn from(data: Vec<T>) -> Self {
        let width = data.len();
        Self { data, width, height: 1 }
    }
}

impl<T: Clone> Resource<T> {
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }
}
