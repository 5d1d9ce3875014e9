//! Module linearization: flattening an include graph into one ancestor chain.
//!
//! The chain of a namespace starts with the namespace itself, followed by its
//! directly included modules in reverse inclusion order (each expanded to its
//! own chain), followed by the chain of its superclass. When a module shows
//! up in more than one of those chains only its last position is kept, so it
//! still comes after every module that includes it.
//!
//! ```text
//! module Base; end
//! module BaseWithMethod; include Base; def foo; end; end
//! module OtherModuleWithMethod; def foo(i); end; end
//! class E
//!   include BaseWithMethod
//!   include OtherModuleWithMethod
//! end
//!
//! linearize(E) = [E, OtherModuleWithMethod, BaseWithMethod, Base]
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};

/// Read access to an include graph.
///
/// Edges are listed in the order they were written; the linearizer takes
/// care of giving later includes precedence.
pub trait IncludeGraph {
    type Node: Copy + Eq + Hash + fmt::Debug;

    /// Directly included modules, in inclusion order.
    fn includes(&self, node: Self::Node) -> &[Self::Node];

    /// Directly extended modules, in extension order.
    fn extends(&self, node: Self::Node) -> &[Self::Node];

    fn superclass(&self, node: Self::Node) -> Option<Self::Node>;

    /// Display name, used to report and normalize cycles.
    fn name(&self, node: Self::Node) -> &str;
}

/// Failure to linearize a namespace.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinearizeError {
    /// A namespace transitively includes (or inherits from) itself. The cycle
    /// starts at its lexicographically smallest member, so every member of
    /// one cycle reports the same error.
    #[error("cyclic include: {}", format_cycle(.cycle))]
    CyclicInclude { cycle: Vec<Arc<str>> },
}

impl LinearizeError {
    /// Whether `name` is part of the reported cycle.
    pub fn involves(&self, name: &str) -> bool {
        match self {
            LinearizeError::CyclicInclude { cycle } => cycle.iter().any(|n| n.as_ref() == name),
        }
    }
}

fn format_cycle(cycle: &[Arc<str>]) -> String {
    let mut parts: Vec<String> = cycle.iter().map(|name| format!("`{}`", name)).collect();
    if let Some(first) = parts.first().cloned() {
        parts.push(first);
    }
    parts.join(" -> ")
}

/// An entry of a singleton ancestor chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Ancestor<N> {
    /// The singleton class of a namespace: its `def self.x` methods
    Singleton(N),
    /// A module whose instance methods are reachable through `extend`
    Module(N),
}

/// Linearize `node` into its ancestor chain.
pub fn linearize<G: IncludeGraph>(graph: &G, node: G::Node) -> Result<Vec<G::Node>, LinearizeError> {
    Linearizer::new(graph)
        .ancestors(node)
        .map(|chain| chain.to_vec())
}

/// Linearize the singleton side of `node`:
/// `[singleton(node)] ++ extends (reversed, linearized) ++ singleton ancestors(superclass)`.
pub fn linearize_singleton<G: IncludeGraph>(
    graph: &G,
    node: G::Node,
) -> Result<Vec<Ancestor<G::Node>>, LinearizeError> {
    Linearizer::new(graph).singleton_ancestors(node)
}

/// Memoizing linearizer over one immutable graph.
pub struct Linearizer<'g, G: IncludeGraph> {
    graph: &'g G,
    memo: FxHashMap<G::Node, Arc<[G::Node]>>,
    /// Nodes currently being linearized, for cycle detection
    stack: Vec<G::Node>,
}

impl<'g, G: IncludeGraph> Linearizer<'g, G> {
    pub fn new(graph: &'g G) -> Self {
        Self::with_memo(graph, FxHashMap::default())
    }

    /// Resume from chains already linearized over the same graph.
    pub fn with_memo(graph: &'g G, memo: FxHashMap<G::Node, Arc<[G::Node]>>) -> Self {
        Self {
            graph,
            memo,
            stack: Vec::new(),
        }
    }

    /// Every chain linearized so far, including the seeded ones.
    pub fn into_memo(self) -> FxHashMap<G::Node, Arc<[G::Node]>> {
        self.memo
    }

    /// The ancestor chain of `node`, most specific first.
    pub fn ancestors(&mut self, node: G::Node) -> Result<Arc<[G::Node]>, LinearizeError> {
        if let Some(chain) = self.memo.get(&node) {
            return Ok(chain.clone());
        }
        if let Some(pos) = self.stack.iter().position(|n| *n == node) {
            let error = cycle_error(self.graph, &self.stack[pos..]);
            tracing::debug!("[LINEARIZE] {}", error);
            return Err(error);
        }

        self.stack.push(node);
        let result = self.compute(node);
        self.stack.pop();

        let chain: Arc<[G::Node]> = result?.into();
        tracing::trace!(
            "[LINEARIZE] {} -> {:?}",
            self.graph.name(node),
            chain.iter().map(|n| self.graph.name(*n)).collect::<Vec<_>>()
        );
        self.memo.insert(node, chain.clone());
        Ok(chain)
    }

    fn compute(&mut self, node: G::Node) -> Result<Vec<G::Node>, LinearizeError> {
        let graph = self.graph;
        let mut parts = vec![node];

        // Most recently included first.
        for &included in graph.includes(node).iter().rev() {
            parts.extend_from_slice(&self.ancestors(included)?);
        }
        if let Some(superclass) = graph.superclass(node) {
            parts.extend_from_slice(&self.ancestors(superclass)?);
        }

        Ok(keep_last(parts))
    }

    /// Singleton chain of `node`. The instance side is linearized first so
    /// superclass cycles are rejected before the walk.
    pub fn singleton_ancestors(
        &mut self,
        node: G::Node,
    ) -> Result<Vec<Ancestor<G::Node>>, LinearizeError> {
        self.ancestors(node)?;

        let graph = self.graph;
        let mut parts = Vec::new();
        let mut current = Some(node);
        while let Some(namespace) = current {
            parts.push(Ancestor::Singleton(namespace));
            for &extended in graph.extends(namespace).iter().rev() {
                let sub_chain = self.ancestors(extended)?;
                parts.extend(sub_chain.iter().map(|&module| Ancestor::Module(module)));
            }
            current = graph.superclass(namespace);
        }

        Ok(keep_last(parts))
    }
}

/// Drop every entry that shows up again later. Each merged sub-chain keeps
/// its order, and an ancestor shared by several of them lands after all of
/// the modules that include it.
fn keep_last<T: Copy + Eq + Hash>(parts: Vec<T>) -> Vec<T> {
    let mut seen = FxHashSet::default();
    let mut chain: Vec<T> = parts
        .into_iter()
        .rev()
        .filter(|entry| seen.insert(*entry))
        .collect();
    chain.reverse();
    chain
}

/// Cycle through `members` in edge order, rotated to start at the
/// lexicographically smallest name.
fn cycle_error<G: IncludeGraph>(graph: &G, members: &[G::Node]) -> LinearizeError {
    let names: Vec<Arc<str>> = members.iter().map(|n| Arc::from(graph.name(*n))).collect();
    let start = names
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.cmp(b))
        .map(|(idx, _)| idx)
        .unwrap_or(0);
    let mut cycle = names;
    cycle.rotate_left(start);
    LinearizeError::CyclicInclude { cycle }
}

// ============================================================================
// CYCLES
// ============================================================================

/// A strongly connected group of namespaces in the include and superclass
/// graph: each member reaches every other one, itself included.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IncludeCycle<N> {
    /// Members in discovery order
    pub members: Vec<N>,
    /// The shortest cycle through the member with the smallest name
    pub error: LinearizeError,
}

/// Every include or superclass cycle reachable from `roots`.
///
/// Unlike [`linearize`], which stops at the first cycle it runs into, this
/// finds each strongly connected component separately, so a namespace on
/// one cycle that also includes another cycle is still reported for its own.
pub fn find_cycles<G: IncludeGraph>(
    graph: &G,
    roots: impl IntoIterator<Item = G::Node>,
) -> Vec<IncludeCycle<G::Node>> {
    let mut tarjan = Tarjan {
        graph,
        visits: FxHashMap::default(),
        next_index: 0,
        stack: Vec::new(),
        components: Vec::new(),
    };
    for root in roots {
        if !tarjan.visits.contains_key(&root) {
            tarjan.visit(root);
        }
    }

    let mut cycles: Vec<IncludeCycle<G::Node>> = tarjan
        .components
        .into_iter()
        .filter(|members| {
            members.len() > 1 || successors(graph, members[0]).any(|next| next == members[0])
        })
        .map(|members| {
            let error = cycle_error(graph, &shortest_cycle(graph, &members));
            tracing::debug!("[LINEARIZE] found {}", error);
            IncludeCycle { members, error }
        })
        .collect();
    cycles.sort_by(|a, b| a.error.to_string().cmp(&b.error.to_string()));
    cycles
}

fn successors<G: IncludeGraph>(graph: &G, node: G::Node) -> impl Iterator<Item = G::Node> + '_ {
    graph
        .includes(node)
        .iter()
        .copied()
        .chain(graph.superclass(node))
}

#[derive(Clone, Copy)]
struct Visit {
    index: usize,
    lowlink: usize,
    on_stack: bool,
}

/// Tarjan's strongly connected components over include and superclass edges.
struct Tarjan<'g, G: IncludeGraph> {
    graph: &'g G,
    visits: FxHashMap<G::Node, Visit>,
    next_index: usize,
    stack: Vec<G::Node>,
    components: Vec<Vec<G::Node>>,
}

impl<G: IncludeGraph> Tarjan<'_, G> {
    fn visit(&mut self, node: G::Node) {
        let index = self.next_index;
        self.next_index += 1;
        self.visits.insert(
            node,
            Visit {
                index,
                lowlink: index,
                on_stack: true,
            },
        );
        self.stack.push(node);

        let graph = self.graph;
        for next in successors(graph, node) {
            let reached = match self.visits.get(&next).copied() {
                None => {
                    self.visit(next);
                    self.visits.get(&next).map(|v| v.lowlink)
                }
                Some(visit) if visit.on_stack => Some(visit.index),
                Some(_) => None,
            };
            if let (Some(low), Some(visit)) = (reached, self.visits.get_mut(&node)) {
                visit.lowlink = visit.lowlink.min(low);
            }
        }

        if self.visits.get(&node).is_some_and(|v| v.lowlink == v.index) {
            let mut component = Vec::new();
            while let Some(member) = self.stack.pop() {
                if let Some(visit) = self.visits.get_mut(&member) {
                    visit.on_stack = false;
                }
                component.push(member);
                if member == node {
                    break;
                }
            }
            component.reverse();
            self.components.push(component);
        }
    }
}

/// Breadth-first search for the shortest path from the smallest-named
/// member back to itself, staying inside the component.
fn shortest_cycle<G: IncludeGraph>(graph: &G, members: &[G::Node]) -> Vec<G::Node> {
    let Some(&start) = members.iter().min_by(|a, b| graph.name(**a).cmp(graph.name(**b))) else {
        return Vec::new();
    };
    let inside: FxHashSet<G::Node> = members.iter().copied().collect();
    let mut parent: FxHashMap<G::Node, G::Node> = FxHashMap::default();
    let mut queue = VecDeque::from([start]);

    while let Some(node) = queue.pop_front() {
        for next in successors(graph, node) {
            if next == start {
                let mut path = vec![node];
                let mut current = node;
                while let Some(&previous) = parent.get(&current) {
                    path.push(previous);
                    current = previous;
                }
                path.reverse();
                return path;
            }
            if inside.contains(&next) && !parent.contains_key(&next) {
                parent.insert(next, node);
                queue.push_back(next);
            }
        }
    }
    vec![start]
}
