use crate::Float;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fixed extra arguments for a [`BatchCostFunction`](crate::traits::BatchCostFunction).
///
/// An ordered list of positional values plus a mapping of named values. The optimizer captures
/// one [`Args`] per run and hands the same reference to every evaluation, so the cost function
/// sees identical arguments on every iteration. Names the caller leaves out are up to the cost
/// function to default, usually through [`Args::get_or`].
///
/// ```rust
/// use murmuration::core::Args;
///
/// let args = Args::new().with_positional(2.0).with_named("shift", 1.5);
/// assert_eq!(args.positional(0), Some(2.0));
/// assert_eq!(args.get_or("shift", 0.0), 1.5);
/// assert_eq!(args.get_or("scale", 10.0), 10.0);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Args {
    positional: Vec<Float>,
    named: BTreeMap<String, Float>,
}

impl Args {
    /// Create an empty set of arguments.
    pub fn new() -> Self {
        Self::default()
    }
    /// Append a positional value.
    pub fn with_positional(mut self, value: Float) -> Self {
        self.positional.push(value);
        self
    }
    /// Set a named value, replacing any previous value under the same name.
    pub fn with_named<S: Into<String>>(mut self, name: S, value: Float) -> Self {
        self.named.insert(name.into(), value);
        self
    }
    /// The positional value at `index`, if one was given.
    pub fn positional(&self, index: usize) -> Option<Float> {
        self.positional.get(index).copied()
    }
    /// All positional values in the order they were given.
    pub fn positionals(&self) -> &[Float] {
        &self.positional
    }
    /// The named value `name`, if one was given.
    pub fn get(&self, name: &str) -> Option<Float> {
        self.named.get(name).copied()
    }
    /// The named value `name`, or `default` if the caller did not supply it.
    pub fn get_or(&self, name: &str, default: Float) -> Float {
        self.get(name).unwrap_or(default)
    }
}

impl<S: Into<String>> FromIterator<(S, Float)> for Args {
    fn from_iter<T: IntoIterator<Item = (S, Float)>>(iter: T) -> Self {
        Self {
            positional: Vec::new(),
            named: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
