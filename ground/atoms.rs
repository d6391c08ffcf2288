//! Sets of ground atoms, indexed by signature.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use slash_syntax::*;

use crate::arithmetic::reduce;
use crate::matcher::{finish, resolve};
use crate::{
    compose, Bindings, Deferred, GroundTerm, GroundingError, Matcher as _, Substitute as _,
};

/// A set of ground atoms. Iteration is ordered by signature, then by
/// arguments under the ground-term order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AtomTable(BTreeMap<Signature, BTreeSet<Vec<GroundTerm>>>);

impl AtomTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an atom; true if it was not already present.
    pub fn insert(&mut self, atom: &Atom<GroundTerm>) -> bool {
        self.0
            .entry(atom.signature())
            .or_default()
            .insert(atom.application().arguments.clone())
    }

    pub fn contains(&self, atom: &Atom<GroundTerm>) -> bool {
        self.0
            .get(&atom.signature())
            .map(|tuples| tuples.contains(&atom.application().arguments))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.0.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn signatures(&self) -> impl Iterator<Item = &Signature> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = Atom<GroundTerm>> + '_ {
        self.0.iter().flat_map(|(signature, tuples)| {
            tuples.iter().map(|arguments| {
                let app = Application::new(signature.name.clone(), arguments.iter().cloned());
                if signature.strong {
                    Atom::Strong(app)
                } else {
                    Atom::App(app)
                }
            })
        })
    }

    /// Every extension of `bindings` under which `pattern` matches some
    /// atom in the table, in table order.
    pub fn matches(
        &self,
        pattern: &Atom<Term>,
        bindings: &Bindings,
    ) -> Result<Vec<Bindings>, GroundingError> {
        let mut found = Vec::new();
        for (_, extended, deferred) in self.select(pattern, bindings, Deferred::new())? {
            if finish(deferred, &extended)? {
                found.push(extended);
            }
        }
        Ok(found)
    }

    /// Like [`matches`](Self::matches), but as one step of a join:
    /// arithmetic that later literals may complete is carried along
    /// with each extension rather than checked now.
    pub(crate) fn extend(
        &self,
        pattern: &Atom<Term>,
        bindings: &Bindings,
        deferred: &Deferred,
    ) -> Result<Vec<(Bindings, Deferred)>, GroundingError> {
        Ok(self
            .select(pattern, bindings, deferred.clone())?
            .into_iter()
            .map(|(_, extended, deferred)| (extended, deferred))
            .collect())
    }

    /// The atoms in the table that `pattern` matches under `bindings`.
    /// Unlike [`matches`](Self::matches), this also reports what an
    /// anonymous variable stood for.
    pub fn matching_atoms(
        &self,
        pattern: &Atom<Term>,
        bindings: &Bindings,
    ) -> Result<Vec<Atom<GroundTerm>>, GroundingError> {
        let mut found = Vec::new();
        for (tuple, extended, deferred) in self.select(pattern, bindings, Deferred::new())? {
            if finish(deferred, &extended)? {
                found.push(pattern.with_arguments(tuple.to_vec()));
            }
        }
        Ok(found)
    }

    fn select(
        &self,
        pattern: &Atom<Term>,
        bindings: &Bindings,
        deferred: Deferred,
    ) -> Result<Vec<(&[GroundTerm], Bindings, Deferred)>, GroundingError> {
        let Some(tuples) = self.0.get(&pattern.signature()) else {
            return Ok(Vec::new());
        };
        let arguments = pattern
            .application()
            .arguments
            .iter()
            .map(|arg| reduce(&arg.substitute(bindings)))
            .collect::<Result<Vec<_>, _>>()?;
        let mut selected = Vec::new();
        for tuple in tuples {
            let mut local = Bindings::new();
            let mut pending = deferred.clone();
            if !arguments
                .iter()
                .zip(tuple)
                .all(|(arg, value)| arg.matches(value, &mut local, &mut pending))
            {
                continue;
            }
            let Some(extended) = compose(bindings, &local) else {
                continue;
            };
            if let Some(pending) = resolve(pending, &extended)? {
                selected.push((tuple.as_slice(), extended, pending));
            }
        }
        Ok(selected)
    }
}

impl fmt::Display for AtomTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let atoms = self.iter().map(|a| a.to_string()).collect::<Vec<_>>();
        write!(f, "{{{}}}", atoms.join(", "))
    }
}

impl<'a> FromIterator<&'a Atom<GroundTerm>> for AtomTable {
    fn from_iter<I: IntoIterator<Item = &'a Atom<GroundTerm>>>(atoms: I) -> Self {
        let mut table = Self::new();
        for atom in atoms {
            table.insert(atom);
        }
        table
    }
}
