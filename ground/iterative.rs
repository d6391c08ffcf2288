//! A quite-good strategy for grounding: start with the facts, and
//! iteratively collect bindings, one dependency component at a time.
//!
//! Every rule is instantiated by joining its positive body literals
//! against the possible atoms found so far. The heads of the resulting
//! instances become possible in turn, and a component's rules are
//! re-run until that stops happening. Once a component is complete,
//! we know which of its atoms are certain, which lets later components
//! discard instances whose default negation must fail. The output
//! statements are assembled only at the very end, when every aggregate
//! can see all of its elements.

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use slash_syntax::*;
use slash_tracer::trace;

use crate::domain::{name_anonymous, Domain};
use crate::elements::{check_npp_arity, ground_choice};
use crate::stratify::{Component, Stratification};
use crate::{
    Bindings, GroundProgram, GroundTerm, Groundable as _, Grounder, GroundingError,
    GroundingOptions, Names, Safety as _, SourceProgram,
};

pub struct IterativeGrounder {
    program: SourceProgram,
    options: GroundingOptions,
}

impl IterativeGrounder {
    pub fn new(program: SourceProgram, options: GroundingOptions) -> Self {
        Self { program, options }
    }
}

impl Grounder<SourceProgram> for IterativeGrounder {
    fn ground(self, bindings: &Bindings) -> Result<GroundProgram, GroundingError> {
        let trace = self.options.trace;
        let rules = self.program.rules().cloned().collect::<Vec<_>>();
        let given = bindings.keys().cloned().collect::<Names>();
        for rule in &rules {
            rule.check_safety(&given)?;
            trace!(trace, Safety, "Safe: {}", rule);
        }
        check_npp_arity(&rules, self.program.query())?;

        let stratification = Stratification::new(&rules);
        trace!(trace, Stratify, "Components:\n{}", stratification);

        let named = rules.iter().map(name_anonymous).collect::<Vec<_>>();
        let mut run = Run {
            rules: &rules,
            named: &named,
            bindings,
            domain: Domain::new(),
            firings: vec![BTreeSet::new(); rules.len()],
            budget: Budget::new(&self.options),
            options: &self.options,
        };
        for (n, component) in stratification.iter().enumerate() {
            if !component.stratified {
                trace!(trace, Stratify, "Component {} has a negative cycle", n);
            }
            run.fixpoint(n, component)?;
            run.settle(component)?;
        }
        run.assemble(self.program.query(), stratification.is_stratified())
    }
}

/// The state of one grounding run.
struct Run<'r> {
    /// As written, for error messages.
    rules: &'r [BaseRule<Term>],
    /// With anonymous variables named.
    named: &'r [BaseRule<Term>],
    bindings: &'r Bindings,
    domain: Domain,
    /// Bindings under which each rule has fired, in canonical order.
    firings: Vec<BTreeSet<Bindings>>,
    budget: Budget,
    options: &'r GroundingOptions,
}

impl<'r> Run<'r> {
    /// Instantiate the rules of a component until no new atom appears.
    fn fixpoint(&mut self, n: usize, component: &Component) -> Result<(), GroundingError> {
        let mut pass = 0;
        loop {
            self.budget.pass()?;
            pass += 1;
            let before = self.domain.possible.len();
            for &i in &component.rules {
                self.instantiate(i).map_err(|e| e.with_rule(&self.rules[i]))?;
            }
            let added = self.domain.possible.len() - before;
            trace!(
                self.options.trace,
                Ground,
                "Component {} pass {}: {} new atoms, {} total",
                n,
                pass,
                added,
                self.domain.possible.len()
            );
            // Without recursion, nothing a pass adds can be used by it.
            if added == 0 || !component.recursive {
                return Ok(());
            }
        }
    }

    fn instantiate(&mut self, i: usize) -> Result<(), GroundingError> {
        let rule = &self.named[i];
        for bindings in self.domain.join(rule.body(), self.bindings)? {
            match rule {
                BaseRule::Disjunctive(Rule { head, .. }) => {
                    if self.firings[i].contains(&bindings) {
                        continue;
                    }
                    for atom in head {
                        self.domain.possible.insert(&atom.ground_with(&bindings)?);
                    }
                }
                // Elements may grow along with their conditions.
                BaseRule::Choice(ChoiceRule { head, .. }) => {
                    for element in ground_choice(&self.domain, head, &bindings)?.elements {
                        self.domain.possible.insert(&element.atom);
                    }
                }
                BaseRule::Npp(NppRule { head, .. }) => {
                    if self.firings[i].contains(&bindings) {
                        continue;
                    }
                    for atom in head.ground_with(&bindings)?.atoms() {
                        self.domain.possible.insert(&atom);
                    }
                }
            }
            self.firings[i].insert(bindings);
        }
        Ok(())
    }

    /// Find the atoms of a complete component that are certainly true:
    /// heads of normal instances whose positive bodies are certain and
    /// whose negated atoms are impossible.
    fn settle(&mut self, component: &Component) -> Result<(), GroundingError> {
        let before = self.domain.certain.len();
        loop {
            let mut changed = false;
            for &i in &component.rules {
                let BaseRule::Disjunctive(Rule { head, body }) = &self.named[i] else {
                    continue;
                };
                if head.len() != 1 || body.iter().any(|l| matches!(l, Literal::Aggregate(..))) {
                    continue;
                }
                for bindings in &self.firings[i] {
                    if self.is_certain(body, bindings)? {
                        changed |= self.domain.certain.insert(&head[0].ground_with(bindings)?);
                    }
                }
            }
            if !changed {
                break;
            }
        }
        trace!(
            self.options.trace,
            Ground,
            "{} new certain atoms",
            self.domain.certain.len() - before
        );
        Ok(())
    }

    fn is_certain(&self, body: &[Literal<Term>], bindings: &Bindings) -> Result<bool, GroundingError> {
        for literal in body {
            match literal {
                Literal::Positive(atom) => {
                    if !self.domain.certain.contains(&atom.ground_with(bindings)?) {
                        return Ok(false);
                    }
                }
                Literal::Negative(atom) => {
                    if !self.domain.possible.matches(atom, bindings)?.is_empty() {
                        return Ok(false);
                    }
                }
                // Relations held when the rule fired.
                Literal::Relation(..) | Literal::Aggregate(..) => (),
            }
        }
        Ok(true)
    }

    /// Build the output statements: rules in source order, and each
    /// rule's instances in binding order.
    fn assemble(
        self,
        query: Option<&Atom<Term>>,
        stratified: bool,
    ) -> Result<GroundProgram, GroundingError> {
        let mut statements = Vec::new();
        let mut seen = BTreeSet::new();
        for (i, rule) in self.named.iter().enumerate() {
            for bindings in &self.firings[i] {
                let statement = self
                    .statement(rule, bindings)
                    .map_err(|e| e.with_rule(&self.rules[i]))?;
                if let Some(statement) = statement {
                    if seen.insert(statement.clone()) {
                        statements.push(statement);
                    }
                }
            }
        }
        trace!(
            self.options.trace,
            Assemble,
            "{} statements, {} possible atoms, {} certain",
            statements.len(),
            self.domain.possible.len(),
            self.domain.certain.len()
        );

        let answers = match query {
            Some(q) => self
                .domain
                .possible
                .matching_atoms(q, self.bindings)
                .map_err(|e| e.with_rule(&Statement::Query(q.clone())))?,
            None => Vec::new(),
        };
        Ok(GroundProgram::new(
            statements,
            self.domain.possible,
            self.domain.certain,
            query.cloned(),
            answers,
            stratified,
        ))
    }

    /// The ground instance of a rule, unless it turned out to have a
    /// certainly false body after all.
    fn statement(
        &self,
        rule: &BaseRule<Term>,
        bindings: &Bindings,
    ) -> Result<Option<BaseRule<GroundTerm>>, GroundingError> {
        if !self.domain.admits(rule.body(), bindings)? {
            return Ok(None);
        }
        let body = self.domain.ground_body(rule.body(), bindings)?;
        Ok(Some(match rule {
            BaseRule::Disjunctive(Rule { head, .. }) => BaseRule::Disjunctive(Rule::new(
                head.iter()
                    .map(|a| a.ground_with(bindings))
                    .collect::<Result<Vec<_>, _>>()?,
                body,
            )),
            BaseRule::Choice(ChoiceRule { head, .. }) => {
                BaseRule::Choice(ChoiceRule::new(ground_choice(&self.domain, head, bindings)?, body))
            }
            BaseRule::Npp(NppRule { head, .. }) => {
                BaseRule::Npp(NppRule::new(head.ground_with(bindings)?, body))
            }
        }))
    }
}

/// Caller-imposed limits on the whole run.
struct Budget {
    max_passes: Option<usize>,
    time_limit: Option<Duration>,
    start: Instant,
    passes: usize,
}

impl Budget {
    fn new(options: &GroundingOptions) -> Self {
        Self {
            max_passes: options.max_iterations,
            time_limit: options.time_limit,
            start: Instant::now(),
            passes: 0,
        }
    }

    /// Account for one more pass, or fail if that would exceed a limit.
    fn pass(&mut self) -> Result<(), GroundingError> {
        let elapsed = self.start.elapsed();
        let out_of_passes = self.max_passes.map_or(false, |max| self.passes >= max);
        let out_of_time = self.time_limit.map_or(false, |limit| elapsed > limit);
        if out_of_passes || out_of_time {
            return Err(GroundingError::NonTermination {
                passes: self.passes,
                elapsed,
            });
        }
        self.passes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn ground(source: &str) -> Result<GroundProgram, GroundingError> {
        ground_with(source, GroundingOptions::default())
    }

    fn ground_with(source: &str, options: GroundingOptions) -> Result<GroundProgram, GroundingError> {
        let program = SourceProgram::new(parse_program(source).expect("parse failed"));
        IterativeGrounder::new(program, options).ground(&Bindings::new())
    }

    fn lines(program: &GroundProgram) -> Vec<String> {
        program.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn facts_and_rules() {
        let g = ground("p(1). p(2). q(X) :- p(X), X > 1.").expect("ground");
        assert_eq!(lines(&g), ["p(1).", "p(2).", "q(2) :- p(2), 2 > 1."]);
        assert_eq!(g.certain().len(), 3);
    }

    #[test]
    fn transitive_closure() {
        let g = ground(
            "edge(1,2). edge(2,3). edge(3,4).
             path(X,Y) :- edge(X,Y).
             path(X,Z) :- path(X,Y), edge(Y,Z).",
        )
        .expect("ground");
        let paths = g.possible().iter().filter(|a| a.application().predicate == sym!(path)).count();
        assert_eq!(paths, 6);
        assert_eq!(g.len(), 3 + 3 + 3);
    }

    #[test]
    fn certain_negation_drops_instances() {
        let g = ground("p. q :- not p. r :- not q.").expect("ground");
        assert_eq!(lines(&g), ["p.", "r :- not q."]);
        assert!(g.certain().contains(&Atom::app(sym!(r), [])));
        assert!(g.is_stratified());
    }

    #[test]
    fn unstratified_negation_keeps_instances() {
        let g = ground("a :- not b. b :- not a.").expect("ground");
        assert_eq!(lines(&g), ["a :- not b.", "b :- not a."]);
        assert!(g.certain().is_empty());
        assert!(!g.is_stratified());
    }

    #[test]
    fn disjunction_is_not_certain() {
        let g = ground("a | b. c :- a. d :- not a.").expect("ground");
        assert_eq!(lines(&g), ["a | b.", "c :- a.", "d :- not a."]);
        assert!(g.certain().is_empty());
    }

    #[test]
    fn choice_feeds_domain() {
        let g = ground("q(a). q(b). {p(X):q(X)}. r(X) :- p(X).").expect("ground");
        assert_eq!(
            lines(&g),
            ["q(a).", "q(b).", "{p(a):q(a);p(b):q(b)}.", "r(a) :- p(a).", "r(b) :- p(b)."]
        );
    }

    #[test]
    fn recursive_choice_conditions() {
        let g = ground("n(1). {n(X+1):n(X), X < 3}.").expect("ground");
        assert_eq!(
            lines(&g),
            ["n(1).", "{n(2):n(1),1 < 3;n(3):n(2),2 < 3}."]
        );
    }

    #[test]
    fn aggregates_see_everything() {
        let g = ground("p(1). p(2). ok :- #count{X:p(X)} >= 1. p(3) :- ok.").expect("ground");
        assert_eq!(
            lines(&g),
            [
                "p(1).",
                "p(2).",
                "ok :- #count{1:p(1);2:p(2);3:p(3)} >= 1.",
                "p(3) :- ok."
            ]
        );
    }

    #[test]
    fn anonymous_variables() {
        let g = ground("p(1,a). p(2,b). q(X) :- p(X,_).").expect("ground");
        assert_eq!(lines(&g)[2..], ["q(1) :- p(1,a).", "q(2) :- p(2,b)."]);
    }

    #[test]
    fn duplicate_instances_collapse() {
        let g = ground("p(1). p(1). q :- p(X). q :- p(1).").expect("ground");
        assert_eq!(lines(&g), ["p(1).", "q :- p(1)."]);
    }

    #[test]
    fn initial_bindings() {
        let program = SourceProgram::new(parse_program("n. p(N) :- n.").expect("parse"));
        let b = Bindings::from([(sym!(N), GroundTerm::number(7))]);
        let g = IterativeGrounder::new(program.clone(), GroundingOptions::default())
            .ground(&b)
            .expect("ground");
        assert_eq!(lines(&g), ["n.", "p(7) :- n."]);
        assert!(matches!(
            IterativeGrounder::new(program, GroundingOptions::default()).ground(&Bindings::new()),
            Err(GroundingError::UnsafeVariable { .. })
        ));
    }

    #[test]
    fn query_answers() {
        let g = ground("p(2). p(1). q(3). p(X)?").expect("ground");
        assert_eq!(
            g.answers(),
            [Atom::app(sym!(p), [GroundTerm::number(1)]), Atom::app(sym!(p), [GroundTerm::number(2)])]
        );
    }

    #[test]
    fn errors_name_source_rule() {
        match ground("p(0). q(Y) :- p(X), Y = 1/X, p(Y).") {
            Err(GroundingError::UndefinedArithmetic { rule, .. }) => {
                assert_eq!(rule, "q(Y) :- p(X), Y = 1/X, p(Y).")
            }
            other => panic!("unexpected {other:?}"),
        }
        match ground("p(1). q :- p(_), #sum{X:p(X)} < a.") {
            Err(GroundingError::AggregateBoundType { rule, .. }) => {
                assert_eq!(rule, "q :- p(_), #sum{X:p(X)} < a.")
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn non_termination() {
        let source = "n(0). n(X+1) :- n(X).";
        match ground_with(source, GroundingOptions::default().max_iterations(10)) {
            Err(GroundingError::NonTermination { passes, .. }) => assert_eq!(passes, 10),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            ground_with(source, GroundingOptions::default().time_limit(Duration::from_millis(20))),
            Err(GroundingError::NonTermination { .. })
        ));
    }
}
