//! Chunked slab allocator that owns every node of a tree.

use std::mem;
use std::ops::{Index, IndexMut};

/// A handle to an object stored in a `TypedArena<T>`.
///
/// Handles are plain values: copying one never copies or aliases the object it refers to. Handles
/// order the same way `TypedArena::iter_mut` visits their objects.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct Handle {
    chunk_index: usize,
    block_index: usize,
}

#[derive(Clone)]
enum Block<T> {
    Occupied(T),
    Vacant(Option<Handle>),
}

/// An allocator for a single type of object.
///
/// Objects are stored in fixed-size chunks so that growing the arena never moves existing
/// objects. Freed blocks are threaded into a free list and reused by later allocations.
#[derive(Clone)]
pub struct TypedArena<T> {
    head: Option<Handle>,
    chunks: Vec<Vec<Block<T>>>,
    chunk_size: usize,
    len: usize,
    capacity: usize,
}

impl<T> TypedArena<T> {
    fn is_valid_handle(&self, handle: Handle) -> bool {
        handle.chunk_index < self.chunks.len()
            && handle.block_index < self.chunks[handle.chunk_index].len()
    }

    /// Constructs a new, empty `TypedArena<T>` holding `chunk_size` objects per chunk.
    ///
    /// # Panics
    ///
    /// Panics if `chunk_size` is zero.
    pub fn new(chunk_size: usize) -> Self {
        assert!(chunk_size > 0, "Expected a positive chunk size.");
        TypedArena {
            head: None,
            chunks: Vec::new(),
            chunk_size,
            len: 0,
            capacity: 0,
        }
    }

    /// Returns the number of live objects in the arena.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Moves `value` into the arena and returns the handle to it.
    pub fn allocate(&mut self, value: T) -> Handle {
        if self.len == self.capacity {
            self.chunks.push(Vec::with_capacity(self.chunk_size));
            self.capacity += self.chunk_size;
            debug!(
                "arena grew to {} chunks ({} blocks)",
                self.chunks.len(),
                self.capacity,
            );
        }
        self.len += 1;

        match self.head.take() {
            None => {
                let chunk_index = self.chunks.len() - 1;
                let chunk = &mut self.chunks[chunk_index];
                chunk.push(Block::Occupied(value));
                Handle {
                    chunk_index,
                    block_index: chunk.len() - 1,
                }
            },
            Some(handle) => {
                let block = &mut self.chunks[handle.chunk_index][handle.block_index];
                match mem::replace(block, Block::Occupied(value)) {
                    Block::Vacant(next) => {
                        self.head = next;
                        handle
                    },
                    Block::Occupied(_) => panic!("Expected the free list to point at a vacant block."),
                }
            },
        }
    }

    /// Removes the object behind `handle` from the arena and returns it. The handle may be handed
    /// out again by a later allocation.
    ///
    /// # Panics
    ///
    /// Panics if `handle` does not refer to a live object.
    pub fn free(&mut self, handle: Handle) -> T {
        if !self.is_valid_handle(handle) {
            panic!("Error: attempting to free invalid block.");
        }
        let block = &mut self.chunks[handle.chunk_index][handle.block_index];
        match mem::replace(block, Block::Vacant(self.head)) {
            Block::Vacant(next) => {
                *block = Block::Vacant(next);
                panic!("Error: attempting to free vacant block.");
            },
            Block::Occupied(value) => {
                self.len -= 1;
                self.head = Some(handle);
                value
            },
        }
    }

    /// Drops every object and releases all chunks.
    pub fn clear(&mut self) {
        self.head = None;
        self.chunks.clear();
        self.len = 0;
        self.capacity = 0;
    }

    pub fn get(&self, handle: Handle) -> Option<&T> {
        if !self.is_valid_handle(handle) {
            return None;
        }
        match self.chunks[handle.chunk_index][handle.block_index] {
            Block::Occupied(ref value) => Some(value),
            Block::Vacant(_) => None,
        }
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        if !self.is_valid_handle(handle) {
            return None;
        }
        match self.chunks[handle.chunk_index][handle.block_index] {
            Block::Occupied(ref mut value) => Some(value),
            Block::Vacant(_) => None,
        }
    }

    /// Returns mutable references to every live object, paired with their handles, in storage
    /// order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Handle, &mut T)> {
        self.chunks
            .iter_mut()
            .enumerate()
            .flat_map(|(chunk_index, chunk)| {
                chunk
                    .iter_mut()
                    .enumerate()
                    .filter_map(move |(block_index, block)| match block {
                        Block::Occupied(value) => Some((Handle { chunk_index, block_index }, value)),
                        Block::Vacant(_) => None,
                    })
            })
    }
}

impl<T> Index<Handle> for TypedArena<T> {
    type Output = T;

    fn index(&self, handle: Handle) -> &Self::Output {
        self.get(handle).expect("Error: handle does not refer to a live block.")
    }
}

impl<T> IndexMut<Handle> for TypedArena<T> {
    fn index_mut(&mut self, handle: Handle) -> &mut Self::Output {
        self.get_mut(handle).expect("Error: handle does not refer to a live block.")
    }
}
