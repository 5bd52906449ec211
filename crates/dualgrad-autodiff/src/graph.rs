//! Computation graph for reverse-mode automatic differentiation.
//!
//! Nodes live in an arena owned by a [`Graph`] and are addressed by
//! generation-checked [`NodeId`] handles. Whenever an operation consumes a
//! node, the consumed node records an [`Edge`] holding the local partial
//! derivative of the operation and the id of the node it produced. The graph
//! only grows forward in time, so an edge always points to a node with a
//! larger index and no cycle can form.
//!
//! [`Var`] is the user-facing value type: a copyable `(graph, id)` pair that
//! overloads the arithmetic operators and records edges as it goes.

use crate::ops::{BinaryOp, BinaryPartials, UnaryOp, UnaryPartials};
use dualgrad_core::{AdError, Numeric, Real, Result};
use std::cell::{Cell, RefCell};
use std::fmt::{self, Debug};
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Generation-checked handle to a node in a [`Graph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: usize,
    generation: u32,
}

impl NodeId {
    pub(crate) fn new(index: usize, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Position of the node in the arena.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Graph generation in which the node was created.
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node{}@{}", self.index, self.generation)
    }
}

/// A recorded use of a node: the local partial derivative of the consuming
/// operation and the node it produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    /// ∂child/∂self at the primals seen when the edge was recorded
    pub local: Real,
    /// The node produced by the operation
    pub child: NodeId,
}

/// A node in the computation graph.
#[derive(Debug, Clone)]
pub(crate) struct NodeRecord {
    pub(crate) primal: Real,
    /// Cached dRoot/dNode; `None` until resolved or seeded
    pub(crate) gradient: Option<Real>,
    pub(crate) edges: Vec<Edge>,
    pub(crate) generation: u32,
}

impl NodeRecord {
    fn new(primal: Real, generation: u32) -> Self {
        Self {
            primal,
            gradient: None,
            edges: Vec::new(),
            generation,
        }
    }
}

/// Arena holding one evaluation pass worth of nodes.
///
/// Variables created before the first operation or constant persist
/// across [`reset`](Graph::reset); every node created afterwards is
/// discarded by it. `reset` takes `&mut self`, so no [`Var`] can outlive it;
/// a raw [`NodeId`] that does is reported as [`AdError::StaleNode`].
///
/// # Example
///
/// ```
/// use dualgrad_autodiff::Graph;
///
/// let mut graph = Graph::new();
/// let x = graph.variable(5.0).id();
///
/// // f(x) = (5x + 50) / (2x^2)
/// {
///     let xv = graph.var(x).unwrap();
///     let y = ((xv * 5.0 + 50.0) / (xv * xv * 2.0)).unwrap();
///     y.seed();
/// }
/// assert!((graph.grad(x).unwrap() + 0.5).abs() < 1e-12);
///
/// graph.reset();
/// assert_eq!(graph.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct Graph {
    pub(crate) nodes: RefCell<Vec<NodeRecord>>,
    generation: Cell<u32>,
    /// Length of the leading run of nodes that survives a reset
    persistent: Cell<usize>,
    /// Set once the first operation or constant node has been recorded
    sealed: Cell<bool>,
    pub(crate) root: Cell<Option<NodeId>>,
}

impl Graph {
    /// Creates a new empty computation graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty graph with room for `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: RefCell::new(Vec::with_capacity(capacity)),
            ..Self::default()
        }
    }

    /// Appends a node. Only seed nodes pushed before anything else may join
    /// the persistent prefix; any other node seals the graph first.
    fn push_node(&self, primal: Real, seed: bool) -> NodeId {
        if !seed {
            self.sealed.set(true);
        }
        let generation = self.generation.get();
        let mut nodes = self.nodes.borrow_mut();
        let id = NodeId {
            index: nodes.len(),
            generation,
        };
        nodes.push(NodeRecord::new(primal, generation));
        if !self.sealed.get() {
            self.persistent.set(nodes.len());
        }
        id
    }

    /// Creates a seed variable with an empty edge list and no gradient.
    pub fn variable(&self, value: Real) -> Var<'_> {
        let id = self.push_node(value, true);
        Var { graph: self, id }
    }

    /// Creates one seed variable per coordinate of `point`.
    pub fn variables(&self, point: &[Real]) -> Vec<Var<'_>> {
        point.iter().map(|&x| self.variable(x)).collect()
    }

    /// Creates a constant node.
    ///
    /// Constants are ordinary nodes that no seed depends on. They never
    /// survive a reset, and variables created after one are not seeds.
    pub fn constant(&self, value: Real) -> Var<'_> {
        let id = self.push_node(value, false);
        Var { graph: self, id }
    }

    /// Re-binds a node id to this graph.
    pub fn var(&self, id: NodeId) -> Result<Var<'_>> {
        self.validate(id)?;
        Ok(Var { graph: self, id })
    }

    /// Checks that `id` was issued by the current generation of this graph.
    pub fn validate(&self, id: NodeId) -> Result<()> {
        let nodes = self.nodes.borrow();
        match nodes.get(id.index) {
            Some(record) if record.generation == id.generation => Ok(()),
            _ => Err(AdError::stale_node(
                id.index,
                id.generation,
                self.generation.get(),
            )),
        }
    }

    /// Returns the number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.nodes.borrow().len()
    }

    /// Returns true if the graph holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.borrow().is_empty()
    }

    /// Total number of recorded edges.
    pub fn num_edges(&self) -> usize {
        self.nodes.borrow().iter().map(|n| n.edges.len()).sum()
    }

    /// Current generation; incremented by every reset.
    pub fn generation(&self) -> u32 {
        self.generation.get()
    }

    /// Number of nodes that survive a reset.
    pub fn num_persistent(&self) -> usize {
        self.persistent.get()
    }

    /// The primal value of a node.
    pub fn primal(&self, id: NodeId) -> Result<Real> {
        self.validate(id)?;
        Ok(self.nodes.borrow()[id.index].primal)
    }

    /// The edges recorded on a node, in recording order.
    pub fn edges(&self, id: NodeId) -> Result<Vec<Edge>> {
        self.validate(id)?;
        Ok(self.nodes.borrow()[id.index].edges.clone())
    }

    /// The currently seeded output node, if any.
    pub fn root(&self) -> Option<NodeId> {
        self.root.get()
    }

    /// Marks `id` as the output being differentiated.
    ///
    /// Sets its gradient to 1.0 and discards every gradient cached for a
    /// previous output.
    pub fn seed(&self, id: NodeId) -> Result<()> {
        self.validate(id)?;
        self.seed_valid(id);
        Ok(())
    }

    fn seed_valid(&self, id: NodeId) {
        let mut nodes = self.nodes.borrow_mut();
        for record in nodes.iter_mut() {
            record.gradient = None;
        }
        nodes[id.index].gradient = Some(1.0);
        self.root.set(Some(id));
    }

    /// dRoot/dNode for the seeded root.
    ///
    /// See [`backward::grad`](crate::backward::grad).
    pub fn grad(&self, id: NodeId) -> Result<Real> {
        crate::backward::grad(self, id)
    }

    /// Clears every edge and gradient and discards all non-seed nodes.
    ///
    /// Seed variables keep their ids; every other id issued before the reset
    /// becomes stale.
    pub fn reset(&mut self) {
        let keep = self.persistent.get();
        let nodes = self.nodes.get_mut();
        let discarded = nodes.len().saturating_sub(keep);
        nodes.truncate(keep);
        for record in nodes.iter_mut() {
            record.edges.clear();
            record.gradient = None;
        }

        let generation = self.generation.get().wrapping_add(1);
        self.generation.set(generation);
        self.sealed.set(false);
        self.root.set(None);

        log::trace!(
            "graph reset to generation {generation}: kept {keep} seed nodes, discarded {discarded}"
        );
    }

    /// Removes every node, seeds included.
    pub fn clear(&mut self) {
        self.persistent.set(0);
        self.reset();
    }

    pub(crate) fn push_unary(&self, input: NodeId, rule: UnaryPartials) -> NodeId {
        let out = self.push_node(rule.value, false);
        let mut nodes = self.nodes.borrow_mut();
        nodes[input.index].edges.push(Edge {
            local: rule.partial,
            child: out,
        });
        out
    }

    pub(crate) fn push_binary(&self, lhs: NodeId, rhs: NodeId, rule: BinaryPartials) -> NodeId {
        let out = self.push_node(rule.value, false);
        let mut nodes = self.nodes.borrow_mut();
        nodes[lhs.index].edges.push(Edge {
            local: rule.lhs,
            child: out,
        });
        nodes[rhs.index].edges.push(Edge {
            local: rule.rhs,
            child: out,
        });
        out
    }
}

/// A differentiable value recorded in a [`Graph`].
#[derive(Clone, Copy)]
pub struct Var<'g> {
    graph: &'g Graph,
    id: NodeId,
}

impl<'g> Var<'g> {
    /// The handle of the underlying node.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The graph this value is recorded in.
    pub fn graph(&self) -> &'g Graph {
        self.graph
    }

    /// The primal value.
    pub fn value(&self) -> Real {
        self.graph.nodes.borrow()[self.id.index].primal
    }

    /// Marks this value as the output being differentiated.
    pub fn seed(&self) {
        self.graph.seed_valid(self.id);
    }

    /// dRoot/dSelf for the seeded root.
    pub fn grad(&self) -> Result<Real> {
        crate::backward::grad(self.graph, self.id)
    }

    /// The edges recorded on this node.
    pub fn edges(&self) -> Vec<Edge> {
        self.graph.nodes.borrow()[self.id.index].edges.clone()
    }

    fn same_graph(&self, other: &Var<'g>) {
        assert!(
            std::ptr::eq(self.graph, other.graph),
            "Vars must belong to the same graph"
        );
    }

    fn unary(self, op: UnaryOp) -> Result<Self> {
        let rule = op.apply(self.value())?;
        let id = self.graph.push_unary(self.id, rule);
        Ok(Var { graph: self.graph, id })
    }

    fn unary_total(self, op: UnaryOp) -> Self {
        let rule = op.eval(self.value());
        let id = self.graph.push_unary(self.id, rule);
        Var { graph: self.graph, id }
    }

    fn binary(self, rhs: Self, op: BinaryOp) -> Result<Self> {
        self.same_graph(&rhs);
        let rule = op.apply(self.value(), rhs.value())?;
        let id = self.graph.push_binary(self.id, rhs.id, rule);
        Ok(Var { graph: self.graph, id })
    }

    fn binary_total(self, rhs: Self, op: BinaryOp) -> Self {
        self.same_graph(&rhs);
        let rule = op.eval(self.value(), rhs.value());
        let id = self.graph.push_binary(self.id, rhs.id, rule);
        Var { graph: self.graph, id }
    }
}

impl Debug for Var<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Var")
            .field("id", &self.id)
            .field("value", &self.value())
            .finish()
    }
}

impl Numeric for Var<'_> {
    fn primal(&self) -> Real {
        self.value()
    }

    fn lift(&self, value: Real) -> Self {
        self.graph.constant(value)
    }

    fn try_div(&self, rhs: &Self) -> Result<Self> {
        self.binary(*rhs, BinaryOp::Divide)
    }

    fn recip(&self) -> Result<Self> {
        self.unary(UnaryOp::Recip)
    }

    fn powi(&self, n: i32) -> Result<Self> {
        self.unary(UnaryOp::Powi(n))
    }

    fn powf(&self, p: Real) -> Result<Self> {
        self.unary(UnaryOp::Powf(p))
    }

    fn pow(&self, exponent: &Self) -> Result<Self> {
        self.binary(*exponent, BinaryOp::Pow)
    }

    fn exp(&self) -> Result<Self> {
        self.unary(UnaryOp::Exp)
    }

    fn ln(&self) -> Result<Self> {
        self.unary(UnaryOp::Ln)
    }

    fn sqrt(&self) -> Result<Self> {
        self.unary(UnaryOp::Sqrt)
    }

    fn sin(&self) -> Self {
        self.unary_total(UnaryOp::Sin)
    }

    fn cos(&self) -> Self {
        self.unary_total(UnaryOp::Cos)
    }

    fn tan(&self) -> Result<Self> {
        self.unary(UnaryOp::Tan)
    }

    fn asin(&self) -> Result<Self> {
        self.unary(UnaryOp::Asin)
    }

    fn acos(&self) -> Result<Self> {
        self.unary(UnaryOp::Acos)
    }

    fn atan(&self) -> Self {
        self.unary_total(UnaryOp::Atan)
    }

    fn sinh(&self) -> Result<Self> {
        self.unary(UnaryOp::Sinh)
    }

    fn cosh(&self) -> Result<Self> {
        self.unary(UnaryOp::Cosh)
    }

    fn tanh(&self) -> Self {
        self.unary_total(UnaryOp::Tanh)
    }
}

// --- Arithmetic: Var op Var ---

impl<'g> Add for Var<'g> {
    type Output = Var<'g>;
    fn add(self, rhs: Self) -> Self::Output {
        self.binary_total(rhs, BinaryOp::Add)
    }
}

impl<'g> Sub for Var<'g> {
    type Output = Var<'g>;
    fn sub(self, rhs: Self) -> Self::Output {
        self.binary_total(rhs, BinaryOp::Subtract)
    }
}

impl<'g> Mul for Var<'g> {
    type Output = Var<'g>;
    fn mul(self, rhs: Self) -> Self::Output {
        self.binary_total(rhs, BinaryOp::Multiply)
    }
}

impl<'g> Div for Var<'g> {
    type Output = Result<Var<'g>>;
    fn div(self, rhs: Self) -> Self::Output {
        self.binary(rhs, BinaryOp::Divide)
    }
}

impl<'g> Neg for Var<'g> {
    type Output = Var<'g>;
    fn neg(self) -> Self::Output {
        self.unary_total(UnaryOp::Negate)
    }
}

// --- Arithmetic: Var op Real (the constant gets no node) ---

impl<'g> Add<Real> for Var<'g> {
    type Output = Var<'g>;
    fn add(self, c: Real) -> Self::Output {
        self.unary_total(UnaryOp::Offset(c))
    }
}

impl<'g> Sub<Real> for Var<'g> {
    type Output = Var<'g>;
    fn sub(self, c: Real) -> Self::Output {
        self.unary_total(UnaryOp::Offset(-c))
    }
}

impl<'g> Mul<Real> for Var<'g> {
    type Output = Var<'g>;
    fn mul(self, c: Real) -> Self::Output {
        self.unary_total(UnaryOp::Scale(c))
    }
}

impl<'g> Div<Real> for Var<'g> {
    type Output = Result<Var<'g>>;
    fn div(self, c: Real) -> Self::Output {
        self.div_real(c)
    }
}

// --- Arithmetic: Real op Var ---

impl<'g> Add<Var<'g>> for Real {
    type Output = Var<'g>;
    fn add(self, x: Var<'g>) -> Self::Output {
        x + self
    }
}

impl<'g> Sub<Var<'g>> for Real {
    type Output = Var<'g>;
    fn sub(self, x: Var<'g>) -> Self::Output {
        x.rsub_real(self)
    }
}

impl<'g> Mul<Var<'g>> for Real {
    type Output = Var<'g>;
    fn mul(self, x: Var<'g>) -> Self::Output {
        x * self
    }
}

impl<'g> Div<Var<'g>> for Real {
    type Output = Result<Var<'g>>;
    fn div(self, x: Var<'g>) -> Self::Output {
        Ok(x.recip()? * self)
    }
}
