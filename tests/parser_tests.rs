//! End-to-end parser tests: the bottom-up loop over real lattices, the
//! matcher, depth/width bounding, repetition operators, and the per-parse
//! attribute whitelist.

use trellis::attributes::{AttrValue, Attributes};
use trellis::errors::ParseError;
use trellis::grammar::{Grammar, Rule, RuleSemantics};
use trellis::graph::{LayerGraph, NodeKind, Support, TerminalSpan};
use trellis::parser::{get_match, parse_graph, ResolverConfig};

fn rule(lhs: &str, rhs: &[&str]) -> Rule {
    Rule::new(lhs, rhs).unwrap()
}

fn span(name: &str, text: &str, start: usize, end: usize) -> TerminalSpan {
    TerminalSpan::new(name, text, start, end)
}

fn parse(graph: &mut LayerGraph, grammar: &Grammar) {
    parse_graph(graph, grammar, &ResolverConfig::default()).unwrap();
}

#[test]
fn test_two_leaf_scenario_produces_one_s() {
    let grammar = Grammar::builder()
        .rule(rule("A", &["a"]))
        .rule(rule("B", &["b"]))
        .rule(rule("S", &["A", "B"]))
        .start_symbols(&["S"])
        .depth_limit(3)
        .build()
        .unwrap();
    let mut graph = LayerGraph::from_spans(&[span("a", "a", 0, 1), span("b", "b", 1, 2)]);
    parse(&mut graph, &grammar);

    let s_nodes = graph.nodes_named("S");
    assert_eq!(s_nodes.len(), 1);
    let s = graph.node(s_nodes[0]);
    assert_eq!((s.start, s.end), (0, 2));
    assert_eq!(s.terminals, vec!["a", "b"]);
    assert_eq!(s.kind, NodeKind::NonTerminal);
}

#[test]
fn test_width_limit_blocks_wide_nodes() {
    let grammar = Grammar::builder()
        .rule(rule("A", &["a"]))
        .rule(rule("B", &["b"]))
        .rule(rule("S", &["A", "B"]))
        .depth_limit(3)
        .width_limit(1)
        .build()
        .unwrap();
    let mut graph = LayerGraph::from_spans(&[span("a", "a", 0, 1), span("b", "b", 1, 2)]);
    parse(&mut graph, &grammar);

    assert!(graph.nodes_named("S").is_empty());
    // The single-leaf derivations fit the limit and still happen.
    assert_eq!(graph.nodes_named("A").len(), 1);
    assert_eq!(graph.nodes_named("B").len(), 1);
}

#[test]
fn test_priority_resolves_same_group_derivations() {
    // Two rules produce B over the same leaf within one group; the
    // numerically lower priority must win regardless of derivation order.
    let grammar = Grammar::builder()
        .rule(rule("B", &["x"]).with_group(9).with_priority(0))
        .rule(rule("Y", &["x"]))
        .rule(rule("B", &["Y"]).with_group(9).with_priority(1))
        .depth_limit(3)
        .build()
        .unwrap();
    let mut graph = LayerGraph::from_spans(&[span("x", "x", 1, 2)]);
    parse(&mut graph, &grammar);

    let b_nodes = graph.nodes_named("B");
    assert_eq!(b_nodes.len(), 1);
    let b = graph.node(b_nodes[0]);
    assert_eq!((b.start, b.end), (1, 2));
    assert_eq!(b.priority, 0);
}

#[test]
fn test_depth_limit_counts_rule_application_rounds() {
    let grammar = Grammar::builder()
        .rule(rule("A1", &["a"]))
        .rule(rule("A2", &["A1"]))
        .rule(rule("A3", &["A2"]))
        .depth_limit(1)
        .build()
        .unwrap();
    let mut graph = LayerGraph::from_spans(&[span("a", "a", 0, 1)]);
    parse(&mut graph, &grammar);

    // Leaves expand at depth 0, their derivations at depth 1; A2's own
    // expansion would need depth 2.
    assert_eq!(graph.nodes_named("A1").len(), 1);
    assert_eq!(graph.nodes_named("A2").len(), 1);
    assert!(graph.nodes_named("A3").is_empty());
}

#[test]
fn test_seq_run_yields_one_node_per_span() {
    let grammar = Grammar::builder()
        .rule(rule("P", &["SEQ(x)"]))
        .start_symbols(&["P"])
        .depth_limit(5)
        .build()
        .unwrap();
    let mut graph = LayerGraph::from_spans(&[
        span("x", "x1", 0, 1),
        span("x", "x2", 1, 2),
        span("x", "x3", 2, 3),
    ]);
    parse(&mut graph, &grammar);

    // Six contiguous sub-runs, one Plus node each; alternate associations of
    // the same run collapse through support flattening.
    let plus: Vec<_> = graph
        .live_nodes()
        .filter(|&id| graph.node(id).kind == NodeKind::Plus)
        .collect();
    assert_eq!(plus.len(), 6);
    let maximal: Vec<_> = plus
        .iter()
        .filter(|&&id| {
            let n = graph.node(id);
            (n.start, n.end) == (0, 3)
        })
        .collect();
    assert_eq!(maximal.len(), 1);
    assert_eq!(graph.node(*maximal[0]).terminals, vec!["x", "x", "x"]);

    // Exactly one output P node covers the maximal run.
    let wide_p = graph
        .nodes_named("P")
        .into_iter()
        .filter(|&id| (graph.node(id).start, graph.node(id).end) == (0, 3))
        .count();
    assert_eq!(wide_p, 1);
}

#[test]
fn test_mseq_prunes_partial_combinations() {
    let grammar = Grammar::builder()
        .rule(rule("M", &["MSEQ(x)"]))
        .depth_limit(5)
        .build()
        .unwrap();
    let mut graph = LayerGraph::from_spans(&[
        span("x", "one", 0, 1),
        span("x", "two", 1, 2),
        span("x", "three", 2, 3),
    ]);
    parse(&mut graph, &grammar);

    // Subset-based resolution leaves exactly the maximal MSEQ node.
    let mseq: Vec<_> = graph
        .live_nodes()
        .filter(|&id| graph.node(id).kind == NodeKind::MSeq)
        .collect();
    assert_eq!(mseq.len(), 1);
    let node = graph.node(mseq[0]);
    assert_eq!((node.start, node.end), (0, 3));
    assert_eq!(node.support.len(), 3);
}

#[test]
fn test_mseq_is_insensitive_to_span_order() {
    let grammar = Grammar::builder()
        .rule(rule("M", &["MSEQ(x)"]))
        .depth_limit(4)
        .build()
        .unwrap();

    let forward = [span("x", "one", 0, 1), span("x", "two", 1, 2)];
    let backward = [span("x", "two", 1, 2), span("x", "one", 0, 1)];

    for spans in [forward, backward] {
        let mut graph = LayerGraph::from_spans(&spans);
        parse(&mut graph, &grammar);
        let mseq: Vec<_> = graph
            .live_nodes()
            .filter(|&id| graph.node(id).kind == NodeKind::MSeq)
            .collect();
        assert_eq!(mseq.len(), 1);
        let mut texts: Vec<&str> = graph
            .node(mseq[0])
            .leaves
            .iter()
            .map(|&leaf| graph.node(leaf).text.as_deref().unwrap())
            .collect();
        texts.sort_unstable();
        assert_eq!(texts, vec!["one", "two"]);
    }
}

#[test]
fn test_reparse_is_idempotent() {
    let grammar = Grammar::builder()
        .rule(rule("P", &["SEQ(x)"]))
        .rule(rule("S", &["P", "y"]))
        .depth_limit(5)
        .build()
        .unwrap();
    let mut graph = LayerGraph::from_spans(&[
        span("x", "x1", 0, 1),
        span("x", "x2", 1, 2),
        span("y", "y", 2, 3),
    ]);
    parse(&mut graph, &grammar);
    let saturated: Vec<_> = graph.live_nodes().collect();

    parse(&mut graph, &grammar);
    let reparsed: Vec<_> = graph.live_nodes().collect();
    assert_eq!(saturated, reparsed);
}

#[test]
fn test_get_match_enumerates_ambiguous_supports() {
    let graph = LayerGraph::from_spans(&[
        span("a", "a", 0, 1),
        span("b", "b1", 1, 2),
        span("b", "b2", 1, 2),
        span("c", "c", 2, 3),
    ]);
    let rule = rule("S", &["a", "b", "c"]);
    let anchor = graph.nodes_named("c")[0];

    let matches = get_match(&graph, &rule, anchor, 2);
    assert_eq!(matches.len(), 2);
    for support in &matches {
        assert_eq!(support.len(), 3);
        assert_eq!(graph.node(support[0]).name, "a");
        assert_eq!(graph.node(support[1]).name, "b");
        assert_eq!(graph.node(support[2]).name, "c");
    }
}

#[test]
fn test_from_spans_connects_only_zero_gap_spans() {
    let graph = LayerGraph::from_spans(&[
        span("a", "a", 0, 2),
        span("b", "b", 1, 3),
        span("c", "c", 2, 4),
    ]);
    let a = graph.nodes_named("a")[0];
    let b = graph.nodes_named("b")[0];
    let c = graph.nodes_named("c")[0];

    // a ends where c starts; b overlaps both and connects to neither.
    assert_eq!(graph.succs(a), &[c]);
    assert!(graph.succs(b).is_empty());
    assert!(graph.preds(b).is_empty());
    assert_eq!(graph.preds(c), &[a]);
}

// ============================================================================
// RULE SEMANTICS - validator / decorator / scoring through the parser
// ============================================================================

#[derive(Debug)]
struct AcceptText(&'static str);

impl RuleSemantics for AcceptText {
    fn validate(&self, support: &Support<'_>) -> bool {
        support.texts().join(" ") == self.0
    }
}

#[derive(Debug)]
struct Labeled(&'static str);

impl RuleSemantics for Labeled {
    fn decorate(&self, _support: &Support<'_>) -> Attributes {
        Attributes::new().update("label".to_string(), AttrValue::from(self.0))
    }

    fn score(&self, support: &Support<'_>) -> f64 {
        support.terminals().len() as f64
    }
}

#[test]
fn test_validator_filters_candidate_supports() {
    use std::sync::Arc;
    let grammar = Grammar::builder()
        .rule(rule("A", &["a"]).with_semantics(Arc::new(AcceptText("good"))))
        .depth_limit(2)
        .build()
        .unwrap();
    let mut graph = LayerGraph::from_spans(&[span("a", "good", 0, 1), span("a", "bad", 1, 2)]);
    parse(&mut graph, &grammar);

    let a_nodes = graph.nodes_named("A");
    assert_eq!(a_nodes.len(), 1);
    assert_eq!(graph.node(a_nodes[0]).start, 0);
}

#[test]
fn test_decorator_and_scoring_reach_the_node() {
    use std::sync::Arc;
    let grammar = Grammar::builder()
        .rule(rule("NP", &["det", "noun"]).with_semantics(Arc::new(Labeled("np"))))
        .legal_attributes(&["label"])
        .depth_limit(2)
        .build()
        .unwrap();
    let mut graph =
        LayerGraph::from_spans(&[span("det", "the", 0, 3), span("noun", "cat", 4, 7)]);
    // No edge: spans have a gap. Re-tag without the gap.
    let mut graph2 =
        LayerGraph::from_spans(&[span("det", "the", 0, 3), span("noun", "cat", 3, 7)]);
    parse(&mut graph, &grammar);
    parse(&mut graph2, &grammar);

    assert!(graph.nodes_named("NP").is_empty());
    let np_nodes = graph2.nodes_named("NP");
    assert_eq!(np_nodes.len(), 1);
    let np = graph2.node(np_nodes[0]);
    assert_eq!(np.attributes.get("label"), Some(&AttrValue::from("np")));
    assert_eq!(np.score, 2.0);
}

#[test]
fn test_illegal_attribute_aborts_parse_but_not_grammar() {
    use std::sync::Arc;
    let grammar = Grammar::builder()
        .rule(rule("NP", &["det", "noun"]).with_semantics(Arc::new(Labeled("np"))))
        .depth_limit(2)
        .build()
        .unwrap();
    let spans = [span("det", "the", 0, 3), span("noun", "cat", 3, 7)];

    let mut graph = LayerGraph::from_spans(&spans);
    let err = parse_graph(&mut graph, &grammar, &ResolverConfig::default()).unwrap_err();
    assert!(matches!(err, ParseError::IllegalAttribute { ref attribute, .. } if attribute == "label"));

    // The grammar object stays usable for the next parse.
    let mut graph = LayerGraph::from_spans(&spans);
    assert!(parse_graph(&mut graph, &grammar, &ResolverConfig::default()).is_err());
}
