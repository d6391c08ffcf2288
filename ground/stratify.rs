//! Order rules by the dependencies among their predicates.
//!
//! The dependency graph has a node per predicate signature and an
//! edge from every head signature of a rule to every signature in
//! its body (aggregate and choice conditions included), labeled with
//! the polarity of the occurrence. Heads of the same rule depend on
//! each other, so a rule always lands in exactly one component.
//!
//! Strongly connected components are found with Tarjan's algorithm,
//! which emits a component only after every component it reaches;
//! i.e., dependencies come first. Negative cycles are allowed: the
//! order only speeds instantiation up, it does not gate it.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use slash_syntax::*;

use crate::collectors::Signatures as _;

type Graph = BTreeMap<Signature, BTreeSet<(Signature, Polarity)>>;

/// A set of mutually dependent predicates and the rules defining them.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Component {
    pub signatures: BTreeSet<Signature>,
    /// Indexes of the defining rules, in source order.
    pub rules: Vec<usize>,
    /// Does some predicate depend on itself?
    pub recursive: bool,
    /// True unless a negative edge closes a cycle.
    pub stratified: bool,
}

/// Components in evaluation order. Rules that define no predicate
/// (constraints, empty choices) come last, in a component of their own.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Stratification(Vec<Component>);

impl Stratification {
    pub fn new(rules: &[BaseRule<Term>]) -> Self {
        let mut graph = Graph::new();
        let mut heads = Vec::with_capacity(rules.len());
        for rule in rules {
            let head = head_signatures(rule);
            let body = body_signatures(rule);
            for h in &head {
                let edges = graph.entry(h.clone()).or_default();
                edges.extend(head.iter().filter(|g| *g != h).map(|g| (g.clone(), Polarity::Positive)));
                edges.extend(body.iter().cloned());
            }
            for (b, _) in &body {
                graph.entry(b.clone()).or_default();
            }
            heads.push(head);
        }

        let mut components = strongly_connected(&graph)
            .into_iter()
            .map(|signatures| {
                let internal = signatures
                    .iter()
                    .flat_map(|s| &graph[s])
                    .filter(|(t, _)| signatures.contains(t))
                    .collect::<Vec<_>>();
                Component {
                    recursive: !internal.is_empty(),
                    stratified: internal.iter().all(|(_, p)| *p == Polarity::Positive),
                    signatures,
                    rules: Vec::new(),
                }
            })
            .collect::<Vec<_>>();
        let owner = components
            .iter()
            .enumerate()
            .flat_map(|(i, c)| c.signatures.iter().map(move |s| (s.clone(), i)))
            .collect::<BTreeMap<_, _>>();

        let mut headless = Component {
            stratified: true,
            ..Component::default()
        };
        for (i, head) in heads.iter().enumerate() {
            match head.first().and_then(|s| owner.get(s)) {
                Some(&c) => components[c].rules.push(i),
                None => headless.rules.push(i),
            }
        }
        components.retain(|c| !c.rules.is_empty());
        if !headless.rules.is_empty() {
            components.push(headless);
        }
        Self(components)
    }

    pub fn components(&self) -> &[Component] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Component> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// No cycle goes through default negation.
    pub fn is_stratified(&self) -> bool {
        self.iter().all(|c| c.stratified)
    }
}

impl fmt::Display for Stratification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, c) in self.iter().enumerate() {
            let signatures = c.signatures.iter().map(|s| s.to_string()).collect::<Vec<_>>();
            write!(f, "{i}: {{{}}} rules {:?}", signatures.join(", "), c.rules)?;
            if c.recursive {
                f.write_str(" recursive")?;
            }
            if !c.stratified {
                f.write_str(" unstratified")?;
            }
            f.write_str("\n")?;
        }
        Ok(())
    }
}

fn head_signatures(rule: &BaseRule<Term>) -> Vec<Signature> {
    let mut head = match rule {
        BaseRule::Disjunctive(Rule { head, .. }) => head.iter().map(Atom::signature).collect(),
        BaseRule::Choice(ChoiceRule { head, .. }) => {
            head.elements.iter().map(|e| e.atom.signature()).collect()
        }
        BaseRule::Npp(NppRule { head, .. }) => vec![head.signature()],
    };
    head.sort();
    head.dedup();
    head
}

fn body_signatures(rule: &BaseRule<Term>) -> Vec<(Signature, Polarity)> {
    let mut body = rule.body().signatures();
    if let BaseRule::Choice(ChoiceRule { head, .. }) = rule {
        for element in &head.elements {
            body.extend(element.condition.signatures());
        }
    }
    body
}

/// Tarjan's algorithm with an explicit call stack, so that long
/// dependency chains cannot overflow the native one.
fn strongly_connected(graph: &Graph) -> Vec<BTreeSet<Signature>> {
    let mut index = BTreeMap::<&Signature, usize>::new();
    let mut low = BTreeMap::<&Signature, usize>::new();
    let mut stack = Vec::<&Signature>::new();
    let mut on_stack = BTreeSet::<&Signature>::new();
    let mut components = Vec::new();

    for root in graph.keys() {
        if index.contains_key(root) {
            continue;
        }
        let mut calls = vec![(root, 0)];
        index.insert(root, index.len());
        low.insert(root, index[root]);
        stack.push(root);
        on_stack.insert(root);

        while let Some((node, next)) = calls.pop() {
            if let Some((succ, _)) = graph[node].iter().nth(next) {
                calls.push((node, next + 1));
                match index.get(succ) {
                    None => {
                        index.insert(succ, index.len());
                        low.insert(succ, index[succ]);
                        stack.push(succ);
                        on_stack.insert(succ);
                        calls.push((succ, 0));
                    }
                    Some(&i) if on_stack.contains(succ) => {
                        let l = low[node].min(i);
                        low.insert(node, l);
                    }
                    Some(_) => (),
                }
                continue;
            }

            // All successors done.
            if let Some(&(parent, _)) = calls.last() {
                let l = low[parent].min(low[node]);
                low.insert(parent, l);
            }
            if low[node] == index[node] {
                let mut component = BTreeSet::new();
                while let Some(s) = stack.pop() {
                    on_stack.remove(s);
                    component.insert(s.clone());
                    if s == node {
                        break;
                    }
                }
                components.push(component);
            }
        }
    }
    components
}
