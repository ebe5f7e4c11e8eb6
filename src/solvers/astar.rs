//! Best-first search over implicit graphs.
//!
//! A [`Solver`] keeps a pool of search states so repeated solves reuse their allocations. Solves
//! are `async` and pass through a yield checkpoint before every expansion, which lets several
//! searches on the same thread make progress side by side.
//!
//! ```
//! use mendel_rs::solvers::astar::{SolveOptions, Solver};
//!
//! let solver = Solver::new();
//! let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! let result = rt.block_on(solver.solve(
//!     0,
//!     3,
//!     |v: &i32, sink| {
//!         sink.push(v + 1, 1.0);
//!         sink.push(v - 1, 1.0);
//!     },
//!     SolveOptions::by_vertex(),
//! ));
//! assert!(result.success);
//! assert_eq!(vec![0, 1, 2, 3], result.path);
//! ```

use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::pin::Pin;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, trace};

/// Future returned by a [`YieldPolicy`] when the search should give up control.
pub type YieldFuture = Pin<Box<dyn Future<Output = ()>>>;

/// Decides at each checkpoint of a solve whether to suspend.
pub trait YieldPolicy {
    fn checkpoint(&mut self) -> Option<YieldFuture>;
}

impl<F> YieldPolicy for F
where
    F: FnMut() -> Option<YieldFuture>,
{
    fn checkpoint(&mut self) -> Option<YieldFuture> {
        self()
    }
}

/// Yields to the tokio scheduler at most once per `quantum`.
#[derive(Clone, Debug)]
pub struct IntervalYield {
    quantum: Duration,
    next: Option<Instant>,
}

impl IntervalYield {
    pub const DEFAULT_QUANTUM: Duration = Duration::from_millis(5);

    pub fn new(quantum: Duration) -> Self {
        Self {
            quantum,
            next: None,
        }
    }
}

impl Default for IntervalYield {
    fn default() -> Self {
        Self::new(Self::DEFAULT_QUANTUM)
    }
}

impl YieldPolicy for IntervalYield {
    fn checkpoint(&mut self) -> Option<YieldFuture> {
        let now = Instant::now();
        match self.next {
            Some(next) if now < next => None,
            _ => {
                self.next = Some(now + self.quantum);
                Some(Box::pin(tokio::task::yield_now()))
            }
        }
    }
}

/// Never suspends; a solve runs to completion on its first poll.
#[derive(Clone, Copy, Debug, Default)]
pub struct NeverYield;

impl YieldPolicy for NeverYield {
    fn checkpoint(&mut self) -> Option<YieldFuture> {
        None
    }
}

/// Per-solve configuration.
pub struct SolveOptions<'a, V, K> {
    key: Box<dyn Fn(&V) -> K + 'a>,
    heuristic: Option<Box<dyn Fn(&V, &V) -> f64 + 'a>>,
    yield_policy: Option<Box<dyn YieldPolicy + 'a>>,
}

impl<'a, V: Clone + 'a> SolveOptions<'a, V, V> {
    /// Vertices are their own deduplication keys.
    pub fn by_vertex() -> Self {
        Self::by_key(V::clone)
    }
}

impl<'a, V: Clone + 'a> Default for SolveOptions<'a, V, V> {
    fn default() -> Self {
        Self::by_vertex()
    }
}

impl<'a, V, K> SolveOptions<'a, V, K> {
    /// Vertices with equal `key` are the same vertex. The goal test compares keys too.
    pub fn by_key(key: impl Fn(&V) -> K + 'a) -> Self {
        Self {
            key: Box::new(key),
            heuristic: None,
            yield_policy: None,
        }
    }

    /// Estimated remaining cost from a vertex to the goal, called as `heuristic(vertex, goal)`.
    /// Defaults to zero.
    pub fn with_heuristic(mut self, heuristic: impl Fn(&V, &V) -> f64 + 'a) -> Self {
        self.heuristic = Some(Box::new(heuristic));
        self
    }

    /// Replaces the default [`IntervalYield`].
    pub fn with_yield(mut self, policy: impl YieldPolicy + 'a) -> Self {
        self.yield_policy = Some(Box::new(policy));
        self
    }
}

#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct SolveResult<V> {
    pub success: bool,
    /// Start to goal inclusive on success, empty otherwise.
    pub path: Vec<V>,
}

impl<V> SolveResult<V> {
    fn failure() -> Self {
        Self {
            success: false,
            path: Vec::new(),
        }
    }
}

type NodeId = usize;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum NodeState {
    Open,
    Closed,
}

struct Node<V> {
    state: NodeState,
    vertex: V,
    /// Cost of the best known path from the start.
    cost: f64,
    /// `cost` plus the heuristic estimate.
    score: f64,
    parent: Option<NodeId>,
    is_goal: bool,
}

/// Orders nodes so that the best candidate sorts last.
fn compare_nodes<V>(x: &Node<V>, y: &Node<V>) -> Ordering {
    y.score
        .total_cmp(&x.score)
        .then_with(|| y.cost.total_cmp(&x.cost))
}

/// Search state of one solve. Its buffers are kept when it goes back to the pool.
struct SingleSolver<V, K> {
    nodes: Vec<Node<V>>,
    seen: HashMap<K, NodeId>,
    opens: Vec<NodeId>,
    opens_dirty: bool,
}

impl<V, K> SingleSolver<V, K> {
    fn new() -> Self {
        Self {
            nodes: Vec::new(),
            seen: HashMap::new(),
            opens: Vec::new(),
            opens_dirty: false,
        }
    }

    fn clear(&mut self) {
        self.nodes.clear();
        self.seen.clear();
        self.opens.clear();
        self.opens_dirty = false;
    }

    fn pop_open(&mut self) -> Option<NodeId> {
        if self.opens_dirty {
            let nodes = &self.nodes;
            self.opens.sort_by(|&a, &b| compare_nodes(&nodes[a], &nodes[b]));
            self.opens_dirty = false;
        }
        while let Some(id) = self.opens.pop() {
            if self.nodes[id].state == NodeState::Open {
                return Some(id);
            }
        }
        None
    }

    fn path_to(&self, id: NodeId) -> Vec<V>
    where
        V: Clone,
    {
        let mut path = Vec::new();
        let mut current = Some(id);
        while let Some(id) = current {
            path.push(self.nodes[id].vertex.clone());
            current = self.nodes[id].parent;
        }
        path.reverse();
        path
    }
}

impl<V, K: Hash + Eq> SingleSolver<V, K> {
    fn open_if_unseen(
        &mut self,
        ctx: &Context<'_, '_, V, K>,
        vertex: V,
        cost: f64,
        parent: Option<NodeId>,
    ) {
        let key = (ctx.options.key)(&vertex);
        if self.seen.contains_key(&key) {
            return;
        }
        let h = ctx
            .options
            .heuristic
            .as_ref()
            .map_or(0.0, |h| h(&vertex, ctx.goal));
        let id = self.nodes.len();
        let is_goal = key == *ctx.goal_key;
        self.seen.insert(key, id);
        self.nodes.push(Node {
            state: NodeState::Open,
            vertex,
            cost,
            score: cost + h,
            parent,
            is_goal,
        });
        self.opens.push(id);
        self.opens_dirty = true;
    }
}

struct Context<'c, 'a, V, K> {
    goal: &'c V,
    goal_key: &'c K,
    options: &'c SolveOptions<'a, V, K>,
}

/// Handed to the edge callback to report the neighbors of the vertex being expanded.
pub struct EdgeSink<'s, 'c, 'a, V, K> {
    search: &'s mut SingleSolver<V, K>,
    ctx: &'s Context<'c, 'a, V, K>,
    from: NodeId,
}

impl<V, K: Hash + Eq> EdgeSink<'_, '_, '_, V, K> {
    /// Reports an edge of weight `cost` to `vertex`. Ignored if `vertex` was already reached.
    pub fn push(&mut self, vertex: V, cost: f64) {
        let cost = self.search.nodes[self.from].cost + cost;
        self.search
            .open_if_unseen(self.ctx, vertex, cost, Some(self.from));
    }
}

/// Returns the leased search state to its pool when dropped, so an abandoned solve still gives
/// it back.
struct Lease<'p, V, K> {
    pool: &'p RefCell<Vec<SingleSolver<V, K>>>,
    solver: Option<SingleSolver<V, K>>,
}

impl<V, K> Lease<'_, V, K> {
    fn get(&mut self) -> &mut SingleSolver<V, K> {
        self.solver.get_or_insert_with(SingleSolver::new)
    }
}

impl<V, K> Drop for Lease<'_, V, K> {
    fn drop(&mut self) {
        if let Some(mut solver) = self.solver.take() {
            solver.clear();
            self.pool.borrow_mut().push(solver);
        }
    }
}

/// Pooled best-first search.
///
/// Solves running concurrently on one thread each lease their own search state. The type is not
/// `Sync`.
pub struct Solver<V, K = V> {
    pool: RefCell<Vec<SingleSolver<V, K>>>,
}

impl<V, K> Default for Solver<V, K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, K> Solver<V, K> {
    pub fn new() -> Self {
        Self {
            pool: RefCell::new(Vec::new()),
        }
    }

    /// Number of search states waiting in the pool.
    pub fn idle(&self) -> usize {
        self.pool.borrow().len()
    }

    fn lease(&self) -> Lease<'_, V, K> {
        let solver = self.pool.borrow_mut().pop();
        Lease {
            pool: &self.pool,
            solver,
        }
    }
}

impl<V: Clone, K: Hash + Eq> Solver<V, K> {
    /// Searches from `start` to `goal`.
    ///
    /// `edges(vertex, sink)` reports the neighbors of `vertex` through [`EdgeSink::push`]. The
    /// open vertex with the smallest score is expanded next, ties going to the smaller path
    /// cost and then to the vertex opened last. A vertex keeps the path it was first reached
    /// by.
    pub async fn solve<E>(
        &self,
        start: V,
        goal: V,
        mut edges: E,
        mut options: SolveOptions<'_, V, K>,
    ) -> SolveResult<V>
    where
        E: FnMut(&V, &mut EdgeSink<'_, '_, '_, V, K>),
    {
        let mut lease = self.lease();
        let mut policy: Box<dyn YieldPolicy + '_> = match options.yield_policy.take() {
            Some(policy) => policy,
            None => Box::new(IntervalYield::default()),
        };
        let goal_key = (options.key)(&goal);
        let ctx = Context {
            goal: &goal,
            goal_key: &goal_key,
            options: &options,
        };

        lease.get().open_if_unseen(&ctx, start, 0.0, None);
        let mut expanded = 0usize;
        loop {
            if let Some(pause) = policy.checkpoint() {
                pause.await;
            }
            let search = lease.get();
            let Some(id) = search.pop_open() else {
                debug!(expanded, "search exhausted");
                return SolveResult::failure();
            };
            if search.nodes[id].is_goal {
                let path = search.path_to(id);
                debug!(expanded, path_len = path.len(), "goal reached");
                return SolveResult {
                    success: true,
                    path,
                };
            }
            search.nodes[id].state = NodeState::Closed;
            expanded += 1;
            trace!(node = id, cost = search.nodes[id].cost, "expand");

            let vertex = search.nodes[id].vertex.clone();
            let mut sink = EdgeSink {
                search,
                ctx: &ctx,
                from: id,
            };
            edges(&vertex, &mut sink);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;
    use std::cell::Cell;

    type Point = (i32, i32);

    const MAZE: [[u8; 5]; 5] = [
        [0, 0, 0, 0, 0],
        [0, 0, 1, 0, 0],
        [0, 0, 1, 0, 1],
        [0, 1, 1, 0, 0],
        [0, 0, 0, 0, 0],
    ];

    fn grid_neighbors<const N: usize>(map: &[[u8; N]; N], (x, y): Point) -> Vec<Point> {
        let mut out = Vec::new();
        for i in -1..=1 {
            for j in -1..=1 {
                let (x2, y2) = (x + i, y + j);
                if (i, j) == (0, 0) || x2 < 0 || y2 < 0 || x2 >= N as i32 || y2 >= N as i32 {
                    continue;
                }
                if map[y2 as usize][x2 as usize] == 0 {
                    out.push((x2, y2));
                }
            }
        }
        out
    }

    fn line_edges(v: &i64, sink: &mut EdgeSink<'_, '_, '_, i64, i64>) {
        sink.push(v + 1, 1.0);
        sink.push(v - 1, 1.0);
    }

    fn always_yield() -> impl YieldPolicy {
        || -> Option<YieldFuture> { Some(Box::pin(tokio::task::yield_now())) }
    }

    #[tokio::test]
    async fn maze_test() {
        let solver = Solver::new();
        let result = solver
            .solve(
                (1, 1),
                (4, 4),
                |&v: &Point, sink| {
                    for w in grid_neighbors(&MAZE, v) {
                        sink.push(w, 1.0);
                    }
                },
                SolveOptions::by_key(|&(x, y): &Point| format!("{},{}", x, y)).with_heuristic(
                    |&(x1, y1): &Point, &(x2, y2): &Point| {
                        let h = (x2 - x1).abs().max((y2 - y1).abs());
                        h as f64
                    },
                ),
            )
            .await;
        assert_eq!(
            SolveResult {
                success: true,
                path: vec![(1, 1), (2, 0), (3, 1), (3, 2), (4, 3), (4, 4)],
            },
            result
        );
    }

    #[tokio::test]
    async fn line_test() {
        let solver = Solver::new();
        let result = solver
            .solve(0, 3, line_edges, SolveOptions::by_vertex())
            .await;
        assert!(result.success);
        assert_eq!(vec![0, 1, 2, 3], result.path);
        assert_eq!(1, solver.idle());
    }

    #[tokio::test]
    async fn start_is_goal_test() {
        let solver = Solver::new();
        let result = solver
            .solve(7, 7, line_edges, SolveOptions::by_vertex())
            .await;
        assert_eq!(vec![7], result.path);
    }

    #[tokio::test]
    async fn unreachable_goal_test() {
        let solver = Solver::new();
        let result = solver
            .solve(
                0u32,
                5,
                |&v: &u32, sink| {
                    if v < 3 {
                        sink.push(v + 1, 1.0);
                    }
                },
                SolveOptions::by_vertex().with_yield(NeverYield),
            )
            .await;
        assert_eq!(SolveResult::failure(), result);
        assert_eq!(1, solver.idle());
    }

    #[tokio::test]
    async fn yield_policy_is_used_test() {
        let used = Cell::new(false);
        let solver = Solver::new();
        let result = solver
            .solve(
                0,
                3,
                line_edges,
                SolveOptions::by_vertex().with_yield(|| -> Option<YieldFuture> {
                    used.set(true);
                    None
                }),
            )
            .await;
        assert!(result.success);
        assert!(used.get());
    }

    #[tokio::test]
    async fn interleaved_solves_test() {
        let solver = Solver::new();
        let solve = || {
            solver.solve(
                0,
                3,
                line_edges,
                SolveOptions::by_vertex().with_yield(always_yield()),
            )
        };
        for _ in 0..3 {
            let (a, b, c) = tokio::join!(solve(), solve(), solve());
            for result in [a, b, c] {
                assert!(result.success);
                assert_eq!(vec![0, 1, 2, 3], result.path);
            }
        }
        assert_eq!(3, solver.idle());
    }

    #[tokio::test]
    async fn dropped_solve_returns_state_test() {
        let solver = Solver::new();
        let mut far = Box::pin(solver.solve(
            0,
            1_000_000,
            line_edges,
            SolveOptions::by_vertex().with_yield(always_yield()),
        ));
        tokio::select! {
            biased;
            _ = &mut far => panic!("search should still be running"),
            _ = tokio::task::yield_now() => {}
        }
        assert_eq!(0, solver.idle());
        drop(far);
        assert_eq!(1, solver.idle());
    }

    #[tokio::test]
    async fn matches_reference_search_test() {
        let mut rng = thread_rng();
        let solver = Solver::new();
        for _ in 0..50 {
            let mut map = [[0u8; 8]; 8];
            for row in map.iter_mut() {
                for cell in row.iter_mut() {
                    *cell = u8::from(rng.gen_bool(0.3));
                }
            }
            map[0][0] = 0;
            map[7][7] = 0;

            let reference = pathfinding::directed::astar::astar(
                &(0, 0),
                |&p| grid_neighbors(&map, p).into_iter().map(|q| (q, 1usize)),
                |_| 0,
                |&p| p == (7, 7),
            );
            let result = solver
                .solve(
                    (0, 0),
                    (7, 7),
                    |&v: &Point, sink| {
                        for w in grid_neighbors(&map, v) {
                            sink.push(w, 1.0);
                        }
                    },
                    SolveOptions::by_vertex().with_yield(NeverYield),
                )
                .await;
            match reference {
                None => assert!(!result.success),
                Some((_, cost)) => {
                    assert!(result.success);
                    assert_eq!(cost + 1, result.path.len());
                    for step in result.path.windows(2) {
                        assert!(grid_neighbors(&map, step[0]).contains(&step[1]));
                    }
                }
            }
        }
        assert_eq!(1, solver.idle());
    }
}
