//! Topological order of the function call DAG, so leaves lower before the
//! functions that consume them.

use crate::error::CoreError;
use crate::function::Environment;
use crate::ir::expr::{CallKind, Expr, ExprKind};
use crate::symbol::Symbol;
use crate::visitor::{walk_expr, Visitor};
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet, VecDeque};

struct CalleeCollector(Vec<Symbol>);
impl Visitor for CalleeCollector {
    fn visit_expr(&mut self, e: &Expr) {
        if let ExprKind::Call(name, _, CallKind::Halide) = &e.kind {
            self.0.push(name.clone());
        }
        walk_expr(self, e);
    }
}

fn callees_of(body: &Expr) -> Vec<Symbol> {
    let mut c = CalleeCollector(Vec::new());
    c.visit_expr(body);
    c.0
}

fn scheduling_error(function: &str, reason: impl Into<String>) -> CoreError {
    CoreError::SchedulingError {
        function: function.to_string(),
        reason: reason.into(),
    }
}

/// Returns the realization order: functions with all dependencies already
/// placed come first, the target function comes last. Only the closure of
/// `target`'s Halide-call dependencies participates; unrelated functions
/// elsewhere in `env` are ignored.
pub fn compute_realization_order(
    env: &Environment,
    target: &Symbol,
) -> Result<Vec<Symbol>, CoreError> {
    if !env.contains_key(target) {
        return Err(CoreError::UnresolvableReference {
            name: target.to_string(),
        });
    }

    // Reachability: the set of functions target (transitively) calls.
    let mut reachable: HashSet<Symbol> = HashSet::new();
    let mut queue: VecDeque<Symbol> = VecDeque::new();
    reachable.insert(target.clone());
    queue.push_back(target.clone());
    while let Some(name) = queue.pop_front() {
        let f = env.get(&name).ok_or_else(|| CoreError::UnresolvableReference {
            name: name.to_string(),
        })?;
        for callee in callees_of(&f.body) {
            if reachable.insert(callee.clone()) {
                queue.push_back(callee);
            }
        }
    }

    let mut graph: DiGraph<Symbol, ()> = DiGraph::new();
    let mut nodes: HashMap<Symbol, NodeIndex> = HashMap::new();
    for name in &reachable {
        let idx = graph.add_node(name.clone());
        nodes.insert(name.clone(), idx);
    }
    for name in &reachable {
        let f = &env[name];
        for callee in callees_of(&f.body) {
            if reachable.contains(&callee) {
                // producer (callee) realized before consumer (name).
                graph.add_edge(nodes[&callee], nodes[name], ());
            }
        }
    }

    toposort(&graph, None)
        .map(|order| order.into_iter().map(|idx| graph[idx].clone()).collect())
        .map_err(|_| scheduling_error(target, "cycle detected in the function call graph"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::Function;
    use crate::ir::expr::{CallKind, ExprBuilder};
    use crate::types::Type;

    fn leaf(name: &str) -> Function {
        Function::new(name, vec![Symbol::new("x")], ExprBuilder::int_imm(Type::int(32), 0).unwrap())
    }

    #[test]
    fn producers_precede_consumers() {
        let mut env = Environment::new();
        let g = leaf("g");
        let call_g = ExprBuilder::call(Type::int(32), "g", vec![], CallKind::Halide);
        let f = Function::new("f", vec![Symbol::new("x")], call_g);
        env.insert(Symbol::new("g"), g);
        env.insert(Symbol::new("f"), f);
        let order = compute_realization_order(&env, &Symbol::new("f")).unwrap();
        assert_eq!(order, vec![Symbol::new("g"), Symbol::new("f")]);
    }

    #[test]
    fn cycle_is_rejected() {
        let mut env = Environment::new();
        let call_b = ExprBuilder::call(Type::int(32), "b", vec![], CallKind::Halide);
        let call_a = ExprBuilder::call(Type::int(32), "a", vec![], CallKind::Halide);
        env.insert(Symbol::new("a"), Function::new("a", vec![], call_b));
        env.insert(Symbol::new("b"), Function::new("b", vec![], call_a));
        assert!(compute_realization_order(&env, &Symbol::new("a")).is_err());
    }

    #[test]
    fn unrelated_function_is_ignored() {
        let mut env = Environment::new();
        env.insert(Symbol::new("f"), leaf("f"));
        env.insert(Symbol::new("unrelated"), leaf("unrelated"));
        let order = compute_realization_order(&env, &Symbol::new("f")).unwrap();
        assert_eq!(order, vec![Symbol::new("f")]);
    }
}
