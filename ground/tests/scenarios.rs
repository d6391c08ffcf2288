//! Whole programs, from text to ground statements.

use slash_ground::{ground, GroundProgram, GroundingError};
use slash_syntax::{parse_program, BaseRule, Statement, Symbol, SyntaxError};

fn ground_source(source: &str) -> Result<GroundProgram, GroundingError> {
    ground(parse_program(source).expect("parse failed"))
}

fn lines(program: &GroundProgram) -> Vec<String> {
    program.iter().map(|s| s.to_string()).collect()
}

fn digits(image: &str) -> String {
    (0..10).map(|d| format!("digit({image},{d}). ")).collect()
}

#[test]
fn npp_per_input() {
    let g = ground_source(
        "img(i1). img(i2).
         #npp(digit(X),[0,1,2,3,4,5,6,7,8,9]) :- img(X).",
    )
    .expect("ground");
    let npps = g
        .iter()
        .filter_map(|s| match s {
            BaseRule::Npp(rule) => Some(&rule.head),
            _ => None,
        })
        .collect::<Vec<_>>();
    assert_eq!(npps.len(), 2);
    assert!(npps.iter().all(|npp| npp.outcomes.len() == 10));
    assert_eq!(
        lines(&g)[2..],
        [
            "#npp(digit(i1),[0,1,2,3,4,5,6,7,8,9]) :- img(i1).",
            "#npp(digit(i2),[0,1,2,3,4,5,6,7,8,9]) :- img(i2).",
        ]
    );
    // Every outcome atom is a possible fact for later rules.
    assert_eq!(
        g.possible()
            .iter()
            .filter(|a| a.application().predicate == Symbol::from("digit"))
            .count(),
        20
    );
}

#[test]
fn addition() {
    let source = format!(
        "{}{}addition(I1,I2,D1+D2) :- digit(I1,D1), digit(I2,D2), I1<I2.",
        digits("i1"),
        digits("i2")
    );
    let g = ground_source(&source).expect("ground");
    let additions = lines(&g)
        .into_iter()
        .filter(|s| s.starts_with("addition"))
        .collect::<Vec<_>>();
    assert_eq!(additions.len(), 100);
    assert!(additions.contains(&String::from(
        "addition(i1,i2,12) :- digit(i1,3), digit(i2,9), i1 < i2."
    )));
    // Sums range over 0..=18.
    assert_eq!(
        g.possible()
            .iter()
            .filter(|a| a.application().predicate == Symbol::from("addition"))
            .count(),
        19
    );
}

#[test]
fn addition_over_npp_outputs() {
    let g = ground_source(
        "img(i1). img(i2).
         #npp(digit(X),[0,1,2,3,4,5,6,7,8,9]) :- img(X).
         addition(I1,I2,D1+D2) :- digit(I1,D1), digit(I2,D2), I1<I2.",
    )
    .expect("ground");
    assert_eq!(g.len(), 2 + 2 + 100);
    // Sums range over 0..=18.
    assert_eq!(
        g.possible()
            .iter()
            .filter(|a| a.application().predicate == Symbol::from("addition"))
            .count(),
        19
    );
}

#[test]
fn unsafe_arithmetic_variable() {
    match ground_source("q(1). p(X) :- q(X), X = Z+1.") {
        Err(GroundingError::UnsafeVariable { variable, rule }) => {
            assert_eq!(variable, Symbol::from("Z"));
            assert_eq!(rule, "p(X) :- q(X), X = Z+1.");
        }
        other => panic!("unexpected {other:?}"),
    }
    assert!(matches!(
        ground_source("q(1). p(X) :- q(X+Z)."),
        Err(GroundingError::UnsafeVariable { .. })
    ));
}

#[test]
fn arithmetic_in_body_atoms() {
    let g = ground_source("p(2,1). q(X) :- p(X+1,X).").expect("ground");
    assert_eq!(lines(&g), ["p(2,1).", "q(1) :- p(2,1)."]);

    let g = ground_source("p(1,3). q(2,2). r(X,Y) :- p(X,Y+1), q(Y,X+1).").expect("ground");
    assert_eq!(lines(&g), ["p(1,3).", "q(2,2).", "r(1,2) :- p(1,3), q(2,2)."]);
}

#[test]
fn arithmetic_fault_in_body_atom() {
    match ground_source("p(0,0). q :- p(X,1/X).") {
        Err(GroundingError::UndefinedArithmetic { term, rule, .. }) => {
            assert_eq!(term, "1/0");
            assert_eq!(rule, "q :- p(X,1/X).");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn choice() {
    let g = ground_source("q(a). q(b). q(c). 1 <= { p(X) : q(X) } <= 2.").expect("ground");
    assert_eq!(
        lines(&g),
        [
            "q(a).",
            "q(b).",
            "q(c).",
            "1 <= {p(a):q(a);p(b):q(b);p(c):q(c)} <= 2.",
        ]
    );
    match &g.statements()[3] {
        BaseRule::Choice(rule) => assert_eq!(rule.head.elements.len(), 3),
        other => panic!("unexpected {other}"),
    }
}

#[test]
fn empty_sum_round_trips() {
    let g = ground_source("ok :- #sum{} <= 0.").expect("ground");
    assert_eq!(g.to_string(), "ok :- #sum{} <= 0.\n");
    let again = ground_source(&g.to_string()).expect("ground");
    assert_eq!(again.statements(), g.statements());
}

#[test]
fn ground_programs_round_trip() {
    let sources = [
        "p(1). p(2). q(X,-X) :- p(X), not r(X).",
        "a | -b :- not c. c :- a.",
        "item(\"x y\"). item(f(1,g)). 0 <= {pick(I):item(I)} <= 1.",
        "p(1). p(3). big :- #max{X:p(X)} > 2. small :- not #count{X:p(X), X < 2} >= 1.",
        "img(i). #npp(label(X),[cat,dog]) :- img(X). ok :- label(i,cat).",
    ];
    for source in sources {
        let g = ground_source(source).expect("ground");
        let again = ground_source(&g.to_string()).expect("ground");
        assert_eq!(again.statements(), g.statements(), "{source}");
    }
}

#[test]
fn unknown_aggregate_function() {
    let e = parse_program("p :- #avg{X:q(X)} > 1.").expect_err("parsed");
    match e {
        SyntaxError::UnknownAggregateFunction(ref unknown) => {
            assert_eq!(unknown.0, Symbol::from("avg"));
            assert_eq!(
                GroundingError::from(unknown.clone()).to_string(),
                "unknown aggregate function `#avg`"
            );
        }
        other => panic!("unexpected {other}"),
    }
}

#[test]
fn npp_arity_mismatch() {
    assert!(matches!(
        ground_source("img(i). #npp(digit(X),[0,1]) :- img(X). ok :- digit(i)."),
        Err(GroundingError::NppArityMismatch { expected: 2, found: 1, .. })
    ));
    match ground_source("img(i). #npp(digit(X),[0,1]) :- img(X). digit(i)?") {
        Err(GroundingError::NppArityMismatch { expected, found, rule, .. }) => {
            assert_eq!((expected, found), (2, 1));
            assert_eq!(rule, "digit(i)?");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn queries() {
    let g = ground_source(
        "edge(a,b). edge(b,c).
         reach(X,Y) :- edge(X,Y).
         reach(X,Z) :- reach(X,Y), edge(Y,Z).
         reach(a,Y)?",
    )
    .expect("ground");
    let answers = g.answers().iter().map(|a| a.to_string()).collect::<Vec<_>>();
    assert_eq!(answers, ["reach(a,b)", "reach(a,c)"]);
    assert!(matches!(
        parse_program("p(X)?").expect("parse").as_slice(),
        [Statement::Query(_)]
    ));
}
