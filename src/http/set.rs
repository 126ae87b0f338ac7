//! Ordered collections of requests

use std::ops::{Add, AddAssign, Deref};

use serde::{Deserialize, Serialize};

use super::request::Request;

/// Ordered collection of requests
///
/// Merging keeps discovery order and never deduplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestSet {
    requests: Vec<Request>,
}

impl RequestSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, request: Request) {
        self.requests.push(request);
    }

    /// Append every request of `other`, in order
    pub fn merge(&mut self, other: RequestSet) {
        self.requests.extend(other.requests);
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Request> {
        self.requests.iter_mut()
    }

    pub fn into_vec(self) -> Vec<Request> {
        self.requests
    }
}

impl Deref for RequestSet {
    type Target = [Request];

    fn deref(&self) -> &[Request] {
        &self.requests
    }
}

impl From<Vec<Request>> for RequestSet {
    fn from(requests: Vec<Request>) -> Self {
        Self { requests }
    }
}

impl FromIterator<Request> for RequestSet {
    fn from_iter<I: IntoIterator<Item = Request>>(iter: I) -> Self {
        Self {
            requests: iter.into_iter().collect(),
        }
    }
}

impl Extend<Request> for RequestSet {
    fn extend<I: IntoIterator<Item = Request>>(&mut self, iter: I) {
        self.requests.extend(iter);
    }
}

impl IntoIterator for RequestSet {
    type Item = Request;
    type IntoIter = std::vec::IntoIter<Request>;

    fn into_iter(self) -> Self::IntoIter {
        self.requests.into_iter()
    }
}

impl<'a> IntoIterator for &'a RequestSet {
    type Item = &'a Request;
    type IntoIter = std::slice::Iter<'a, Request>;

    fn into_iter(self) -> Self::IntoIter {
        self.requests.iter()
    }
}

impl Add for RequestSet {
    type Output = RequestSet;

    fn add(mut self, rhs: RequestSet) -> RequestSet {
        self.merge(rhs);
        self
    }
}

impl AddAssign for RequestSet {
    fn add_assign(&mut self, rhs: RequestSet) {
        self.merge(rhs);
    }
}

/// Input of an injection operation: one request or a whole collection
#[derive(Debug, Clone, Copy)]
pub enum RequestInput<'a> {
    Single(&'a Request),
    Set(&'a RequestSet),
}

impl<'a> RequestInput<'a> {
    /// The requests to process, in order
    pub fn requests(&self) -> &'a [Request] {
        match *self {
            RequestInput::Single(request) => std::slice::from_ref(request),
            RequestInput::Set(set) => set,
        }
    }
}

impl<'a> From<&'a Request> for RequestInput<'a> {
    fn from(request: &'a Request) -> Self {
        RequestInput::Single(request)
    }
}

impl<'a> From<&'a RequestSet> for RequestInput<'a> {
    fn from(set: &'a RequestSet) -> Self {
        RequestInput::Set(set)
    }
}
