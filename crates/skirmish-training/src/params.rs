//! Parameter vectors: the individuals being evolved.
//!
//! A [`ParameterVector`] is a mapping from a fixed set of parameter names to real values.
//! The set of names and the permitted range of every value are described by a shared
//! [`DomainTable`]. Every vector carries a reference to its table, so:
//!
//! - the key set cannot change after construction (values are stored positionally),
//! - bounds are a property of the vector itself rather than of scattered clamp calls.
//!
//! Domains are enforced when values are produced (sampling, mutation, loading), never when
//! they are read.
//!
//! # Operations
//!
//! - **Initialization**: [`ParameterVector::sample_random`] draws every value uniformly from
//!   its domain
//! - **Crossover**: [`ParameterVector::blend`] averages two parents key by key
//! - **Mutation**: [`ParameterVector::mutate`] perturbs single values and clamps them
//! - **Projection**: [`ParameterVector::clamp`] moves every value back into its domain

use std::{collections::BTreeMap, sync::Arc};

use rand::Rng;
use serde::{Serialize, Serializer, ser::SerializeMap as _};

use crate::error::InvalidConfiguration;

/// The closed interval `[min, max]` a parameter may take.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamDomain {
    min: f64,
    max: f64,
}

impl ParamDomain {
    /// Returns `None` unless `min <= max` and both the bounds and the width are finite.
    #[must_use]
    pub fn new(min: f64, max: f64) -> Option<Self> {
        (min <= max && (max - min).is_finite()).then_some(Self { min, max })
    }

    #[must_use]
    pub fn min(&self) -> f64 {
        self.min
    }

    #[must_use]
    pub fn max(&self) -> f64 {
        self.max
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }

    #[must_use]
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    /// Draws a value uniformly from `[min, max]`.
    pub fn sample<R>(&self, rng: &mut R) -> f64
    where
        R: Rng + ?Sized,
    {
        rng.random_range(self.min..=self.max)
    }
}

/// The fixed, ordered set of parameter names and their domains.
///
/// Tables are normally built once per run and shared through an [`Arc`] by every
/// [`ParameterVector`] of that run.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainTable {
    names: Vec<String>,
    domains: Vec<ParamDomain>,
}

impl DomainTable {
    /// Builds a table from `(name, min, max)` entries, in declaration order.
    ///
    /// # Errors
    ///
    /// Fails if no entries are given, a name repeats, or a domain is empty or non-finite.
    pub fn new<I, S>(entries: I) -> Result<Self, InvalidConfiguration>
    where
        I: IntoIterator<Item = (S, f64, f64)>,
        S: Into<String>,
    {
        let mut names: Vec<String> = vec![];
        let mut domains = vec![];
        for (name, min, max) in entries {
            let name = name.into();
            if names.contains(&name) {
                return Err(InvalidConfiguration::DuplicateParameter { name });
            }
            let domain = ParamDomain::new(min, max)
                .ok_or_else(|| InvalidConfiguration::InvalidDomain {
                    name: name.clone(),
                    min,
                    max,
                })?;
            names.push(name);
            domains.push(domain);
        }
        if names.is_empty() {
            return Err(InvalidConfiguration::EmptyDomainTable);
        }
        Ok(Self { names, domains })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    #[must_use]
    pub fn domain(&self, name: &str) -> Option<ParamDomain> {
        self.index_of(name).map(|i| self.domains[i])
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.names.iter().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ParamDomain)> + '_ {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.domains.iter().copied())
    }
}

/// Why a flat name-to-value record does not describe a [`ParameterVector`].
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum RecordShapeError {
    #[display("missing parameter '{name}'")]
    MissingKey { name: String },
    #[display("unknown parameter '{name}'")]
    UnknownKey { name: String },
    #[display("parameter '{name}' is not a finite number")]
    NonFinite { name: String },
}

/// One candidate solution: a value for every parameter of a [`DomainTable`].
///
/// Serializes as a flat `{ "<name>": <value>, ... }` map in table order.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterVector {
    domains: Arc<DomainTable>,
    values: Vec<f64>,
}

impl ParameterVector {
    /// Draws every parameter independently and uniformly from its domain.
    pub fn sample_random<R>(domains: &Arc<DomainTable>, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let values = domains.domains.iter().map(|d| d.sample(rng)).collect();
        Self {
            domains: Arc::clone(domains),
            values,
        }
    }

    /// Builds a vector from values given in table order.
    ///
    /// Returns `None` if the number of values does not match the table. Values are taken
    /// as-is; call [`Self::clamp`] to project them into their domains.
    #[must_use]
    pub fn from_values(domains: &Arc<DomainTable>, values: Vec<f64>) -> Option<Self> {
        (values.len() == domains.len()).then(|| Self {
            domains: Arc::clone(domains),
            values,
        })
    }

    /// Builds a vector from a flat record that must name exactly the table's parameters.
    ///
    /// # Errors
    ///
    /// Fails on a missing, unknown or non-finite entry.
    pub fn from_map(
        domains: &Arc<DomainTable>,
        record: &BTreeMap<String, f64>,
    ) -> Result<Self, RecordShapeError> {
        if let Some(name) = record.keys().find(|k| domains.index_of(k).is_none()) {
            return Err(RecordShapeError::UnknownKey { name: name.clone() });
        }
        let values = domains
            .names()
            .map(|name| match record.get(name) {
                None => Err(RecordShapeError::MissingKey {
                    name: name.to_owned(),
                }),
                Some(v) if !v.is_finite() => Err(RecordShapeError::NonFinite {
                    name: name.to_owned(),
                }),
                Some(v) => Ok(*v),
            })
            .collect::<Result<_, _>>()?;
        Ok(Self {
            domains: Arc::clone(domains),
            values,
        })
    }

    /// Builds a vector from a possibly partial record.
    ///
    /// Known keys with finite values are clamped into their domains and kept, missing or
    /// non-finite ones are sampled uniformly, unknown keys are ignored.
    pub fn merge_from_map<R>(
        domains: &Arc<DomainTable>,
        record: &BTreeMap<String, f64>,
        rng: &mut R,
    ) -> Self
    where
        R: Rng + ?Sized,
    {
        let values = domains
            .iter()
            .map(|(name, domain)| match record.get(name) {
                Some(v) if v.is_finite() => domain.clamp(*v),
                _ => domain.sample(rng),
            })
            .collect();
        Self {
            domains: Arc::clone(domains),
            values,
        }
    }

    #[must_use]
    pub fn domains(&self) -> &Arc<DomainTable> {
        &self.domains
    }

    /// Returns the values in table order.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.domains.index_of(name).map(|i| self.values[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.domains.names().zip(self.values.iter().copied())
    }

    #[must_use]
    pub fn to_map(&self) -> BTreeMap<String, f64> {
        self.iter().map(|(k, v)| (k.to_owned(), v)).collect()
    }

    /// Projects every value into its declared domain. Idempotent.
    pub fn clamp(&mut self) {
        for (value, domain) in self.values.iter_mut().zip(&self.domains.domains) {
            *value = domain.clamp(*value);
        }
    }

    /// Returns `true` if every value lies inside its domain.
    #[must_use]
    pub fn is_within_domains(&self) -> bool {
        self.values
            .iter()
            .zip(&self.domains.domains)
            .all(|(v, d)| d.contains(*v))
    }

    /// Blend crossover: every child value is the arithmetic mean of the parents' values.
    ///
    /// # Panics
    ///
    /// Panics if the parents were built from different domain tables.
    #[must_use]
    pub fn blend(p1: &Self, p2: &Self) -> Self {
        assert!(
            Arc::ptr_eq(&p1.domains, &p2.domains) || p1.domains == p2.domains,
            "parents must share a domain table"
        );
        let values = p1
            .values
            .iter()
            .zip(&p2.values)
            .map(|(a, b)| (a + b) / 2.0)
            .collect();
        Self {
            domains: Arc::clone(&p1.domains),
            values,
        }
    }

    /// Uniform mutation, applied per parameter.
    ///
    /// With probability `rate`, a value is shifted by a perturbation drawn uniformly from
    /// `[-step, step]` and then clamped into its own domain. Untouched values are left as
    /// they are.
    ///
    /// # Panics
    ///
    /// Panics if `rate` is outside `[0, 1]` or `step` is negative or not finite.
    /// The perturbation is `step` scaled by `U(-1, 1)`, so any finite step is usable.
    pub fn mutate<R>(&mut self, rate: f64, step: f64, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        assert!(step.is_finite() && step >= 0.0);
        for (value, domain) in self.values.iter_mut().zip(&self.domains.domains) {
            if rng.random_bool(rate) {
                *value = domain.clamp(*value + step * rng.random_range(-1.0..=1.0));
            }
        }
    }
}

impl Serialize for ParameterVector {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, &value)?;
        }
        map.end()
    }
}
