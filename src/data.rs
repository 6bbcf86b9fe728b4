/*
MIT License

Copyright (c) 2026 Raja Lehtihet and Wael El Oraiby

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
*/

//! Per-step data dictionaries.

use crate::tensor::Tensor;
use std::collections::BTreeMap;
use std::collections::btree_map;

/// Mapping from variable key to tensor, supplied fresh on every evaluation.
///
/// The optional split name (for example `"nstep_train"`) is used by
/// [`crate::Problem`] to prefix its metric names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataDict {
    tensors: BTreeMap<String, Tensor>,
    name: Option<String>,
}

impl DataDict {
    /// Creates an empty, unnamed dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty dictionary tagged with a split name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            tensors: BTreeMap::new(),
            name: Some(name.into()),
        }
    }

    /// Adds a tensor and returns the dictionary (builder style).
    pub fn with(mut self, key: impl Into<String>, value: Tensor) -> Self {
        self.tensors.insert(key.into(), value);
        self
    }

    /// Inserts a tensor, returning the previous value for `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: Tensor) -> Option<Tensor> {
        self.tensors.insert(key.into(), value)
    }

    /// Returns the tensor stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Tensor> {
        self.tensors.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.tensors.contains_key(key)
    }

    /// Iterates keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.tensors.keys().map(String::as_str)
    }

    /// Iterates `(key, tensor)` pairs in sorted key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, Tensor> {
        self.tensors.iter()
    }

    pub fn len(&self) -> usize {
        self.tensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tensors.is_empty()
    }

    /// Returns the split name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    /// Moves every entry of `other` into `self`, overwriting duplicates.
    pub fn extend(&mut self, other: DataDict) {
        self.tensors.extend(other.tensors);
    }
}

impl FromIterator<(String, Tensor)> for DataDict {
    fn from_iter<I: IntoIterator<Item = (String, Tensor)>>(iter: I) -> Self {
        Self {
            tensors: iter.into_iter().collect(),
            name: None,
        }
    }
}

impl<'a> IntoIterator for &'a DataDict {
    type Item = (&'a String, &'a Tensor);
    type IntoIter = btree_map::Iter<'a, String, Tensor>;

    fn into_iter(self) -> Self::IntoIter {
        self.tensors.iter()
    }
}
