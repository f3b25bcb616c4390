//! Event-driven signal propagation.

use tracing::{trace, warn};

use crate::circuit::{ComponentId, ConnectorRef, Graph};
use crate::components::Component;
use crate::error::{GatesimError, Result};

use super::SimulatorConfig;

/// Propagation walker for one settle pass.
///
/// The walk is not topologically ordered: a gate recomputes as soon as any
/// input changes, and later updates within the same pass overwrite earlier
/// ones. On an acyclic graph the final values are those of a fixed point.
/// A wiring cycle keeps descending until `max_depth` is reached and the pass
/// fails.
///
/// Pending work lives on a heap-allocated frame stack; call-stack use does
/// not grow with `max_depth` or with block nesting.
///
/// Every driven input re-propagates its owner's outputs whether or not they
/// changed. Fan-out that reconverges downstream is therefore walked once per
/// path: a chain of `n` diamonds (`x -> NOT`, `x -> NOT`, both into an `OR`)
/// costs on the order of `2^n` visits per settle.
pub struct Propagator {
    /// Recursion bound
    pub max_depth: usize,
    /// Current recursion depth
    depth: usize,
    /// Connectors driven so far in this pass
    visits: usize,
}

/// One level of pending work.
#[derive(Debug)]
enum Frame {
    /// Propagate from every source of a graph. `owner` is the block whose
    /// interior is being settled, `None` for the graph the walk started on.
    Settle {
        owner: Option<ComponentId>,
        sources: Vec<ConnectorRef>,
        next: usize,
    },
    /// Drive each line out of one `OUT` connector.
    Fanout {
        dests: Vec<ConnectorRef>,
        value: bool,
        next: usize,
    },
    /// Propagate from each output of a recomputed component.
    Outputs {
        component: ComponentId,
        count: usize,
        next: usize,
    },
}

/// Frame stack plus the chain of blocks leading to the current graph level.
#[derive(Debug, Default)]
struct Walk {
    frames: Vec<Frame>,
    path: Vec<ComponentId>,
}

/// Every `OUT` connector of every primitive source, in component order.
fn source_refs(graph: &Graph) -> Vec<ConnectorRef> {
    graph
        .sources()
        .flat_map(|id| {
            let bits = graph.component(id).map_or(0, |c| c.outputs().len());
            (0..bits).map(move |k| ConnectorRef::output(id, k))
        })
        .collect()
}

/// Descend from `root` through the block interiors named by `path`.
fn level<'g>(root: &'g mut Graph, path: &[ComponentId]) -> Result<&'g mut Graph> {
    let mut graph = root;
    for &id in path {
        graph = match graph.component_mut(id) {
            Some(Component::Block(block)) => &mut block.graph,
            _ => return Err(GatesimError::component_not_found(id)),
        };
    }
    Ok(graph)
}

impl Propagator {
    /// Create a propagator for one pass.
    pub fn new(config: &SimulatorConfig) -> Self {
        Self {
            max_depth: config.max_depth,
            depth: 0,
            visits: 0,
        }
    }

    /// Number of input connectors driven so far.
    pub fn visits(&self) -> usize {
        self.visits
    }

    /// Re-propagate from every primitive source, in component order.
    pub fn settle(&mut self, graph: &mut Graph) -> Result<()> {
        let mut walk = Walk::default();
        walk.frames.push(Frame::Settle {
            owner: None,
            sources: source_refs(graph),
            next: 0,
        });
        self.run(graph, &mut walk)
    }

    /// Push an output connector's value along every outgoing line.
    pub fn propagate(&mut self, graph: &mut Graph, source: ConnectorRef) -> Result<()> {
        let mut walk = Walk::default();
        self.begin_propagate(graph, &mut walk, source)?;
        self.run(graph, &mut walk)
    }

    /// Set an input connector, recompute its owner, and propagate from each
    /// of the owner's outputs.
    pub fn drive(&mut self, graph: &mut Graph, dest: ConnectorRef, value: bool) -> Result<()> {
        let mut walk = Walk::default();
        self.begin_drive(graph, &mut walk, dest, value)?;
        self.run(graph, &mut walk)
    }

    fn run(&mut self, root: &mut Graph, walk: &mut Walk) -> Result<()> {
        while let Some(frame) = walk.frames.last_mut() {
            match frame {
                Frame::Settle {
                    owner,
                    sources,
                    next,
                } => match sources.get(*next) {
                    Some(&source) => {
                        *next += 1;
                        self.begin_propagate(root, walk, source)?;
                    }
                    None => {
                        let owner = *owner;
                        walk.frames.pop();
                        trace!(level = walk.path.len(), visits = self.visits, "settled");
                        if let Some(id) = owner {
                            walk.path.pop();
                            if let Some(Component::Block(block)) =
                                level(root, &walk.path)?.component_mut(id)
                            {
                                block.sync_outputs();
                            }
                        }
                    }
                },
                Frame::Fanout { dests, value, next } => match dests.get(*next) {
                    Some(&dest) => {
                        *next += 1;
                        let value = *value;
                        self.begin_drive(root, walk, dest, value)?;
                    }
                    None => {
                        walk.frames.pop();
                        self.depth -= 1;
                    }
                },
                Frame::Outputs {
                    component,
                    count,
                    next,
                } => {
                    if *next < *count {
                        let source = ConnectorRef::output(*component, *next);
                        *next += 1;
                        self.begin_propagate(root, walk, source)?;
                    } else {
                        walk.frames.pop();
                    }
                }
            }
        }
        Ok(())
    }

    fn begin_propagate(
        &mut self,
        root: &mut Graph,
        walk: &mut Walk,
        source: ConnectorRef,
    ) -> Result<()> {
        let graph = level(root, &walk.path)?;
        let value = graph
            .connector(source)
            .ok_or_else(|| GatesimError::connector_not_found(source))?
            .value;

        self.enter()?;
        walk.frames.push(Frame::Fanout {
            dests: graph.fanout(source),
            value,
            next: 0,
        });
        Ok(())
    }

    fn begin_drive(
        &mut self,
        root: &mut Graph,
        walk: &mut Walk,
        dest: ConnectorRef,
        value: bool,
    ) -> Result<()> {
        self.visits += 1;
        let component = level(root, &walk.path)?
            .component_mut(dest.component)
            .ok_or_else(|| GatesimError::connector_not_found(dest))?;
        component
            .connectors_mut(dest.direction)
            .get_mut(dest.index)
            .ok_or_else(|| GatesimError::connector_not_found(dest))?
            .set_value(value);

        if component.is_sink() {
            return Ok(());
        }
        walk.frames.push(Frame::Outputs {
            component: dest.component,
            count: component.outputs().len(),
            next: 0,
        });
        match component {
            Component::Block(block) => {
                // Interior settles first, then the boundary outputs are read
                block.load_inputs();
                walk.frames.push(Frame::Settle {
                    owner: Some(dest.component),
                    sources: source_refs(&block.graph),
                    next: 0,
                });
                walk.path.push(dest.component);
            }
            Component::Gate(gate) => {
                gate.recompute();
            }
            Component::Input(_)
            | Component::InputBus(_)
            | Component::Output(_)
            | Component::OutputBus(_) => {}
        }
        Ok(())
    }

    /// Descend one recursion level. Block interiors share the same budget.
    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > self.max_depth {
            warn!(max_depth = self.max_depth, "propagation depth exceeded, aborting settle");
            return Err(GatesimError::PropagationOverflow {
                max_depth: self.max_depth,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::{Color, ComponentId, Point};
    use crate::components::{Block, Component, Gate, GateKind, Input, Output};

    /// Input pin wired straight to an output pin, wrapped `levels` times.
    fn nested_buffer(levels: usize) -> Block {
        let mut g = Graph::new();
        let a = g.add_component(Component::Input(Input::new(Point::default())));
        let out = g.add_component(Component::Output(Output::new(Point::default())));
        g.connect(ConnectorRef::output(a, 0), ConnectorRef::input(out, 0)).unwrap();
        let mut block = Block::new("BUF", Color::GREEN, g, Point::default()).unwrap();
        for _ in 0..levels {
            let mut g = Graph::new();
            let a = g.add_component(Component::Input(Input::new(Point::default())));
            let inner = g.add_component(Component::Block(block));
            let out = g.add_component(Component::Output(Output::new(Point::default())));
            g.connect(ConnectorRef::output(a, 0), ConnectorRef::input(inner, 0)).unwrap();
            g.connect(ConnectorRef::output(inner, 0), ConnectorRef::input(out, 0)).unwrap();
            block = Block::new("BUF", Color::GREEN, g, Point::default()).unwrap();
        }
        block
    }

    /// a -> OR.0 ; OR.out -> NOT ; NOT.out -> `link` ; `link` -> OR.1
    fn ring(link: Option<Block>) -> Graph {
        let mut g = Graph::new();
        let a = g.add_component(Component::Input(Input::new(Point::default())));
        let or = g.add_component(Component::Gate(Gate::new(GateKind::Or, Point::default())));
        let not = g.add_component(Component::Gate(Gate::new(GateKind::Not, Point::default())));
        g.connect(ConnectorRef::output(a, 0), ConnectorRef::input(or, 0)).unwrap();
        g.connect(ConnectorRef::output(or, 0), ConnectorRef::input(not, 0)).unwrap();
        match link {
            Some(block) => {
                let b = g.add_component(Component::Block(block));
                g.connect(ConnectorRef::output(not, 0), ConnectorRef::input(b, 0)).unwrap();
                g.connect(ConnectorRef::output(b, 0), ConnectorRef::input(or, 1)).unwrap();
            }
            None => {
                g.connect(ConnectorRef::output(not, 0), ConnectorRef::input(or, 1)).unwrap();
            }
        }
        g
    }

    /// Settle with the default config on a 1 MiB thread.
    fn settle_on_small_stack(mut g: Graph) -> Result<()> {
        std::thread::Builder::new()
            .stack_size(1 << 20)
            .spawn(move || g.settle(&SimulatorConfig::default()))
            .unwrap()
            .join()
            .unwrap()
    }

    #[test]
    fn test_reconvergent_paths_settle() {
        // a -> NOT -> XOR.0, a -> XOR.1 ; XOR(!a, a) is always true
        let mut g = Graph::new();
        let a = g.add_component(Component::Input(Input::new(Point::default())));
        let not = g.add_component(Component::Gate(Gate::new(GateKind::Not, Point::default())));
        let xor = g.add_component(Component::Gate(Gate::new(GateKind::Xor, Point::default())));
        let out = g.add_component(Component::Output(Output::new(Point::default())));
        g.connect(ConnectorRef::output(a, 0), ConnectorRef::input(not, 0)).unwrap();
        g.connect(ConnectorRef::output(not, 0), ConnectorRef::input(xor, 0)).unwrap();
        g.connect(ConnectorRef::output(a, 0), ConnectorRef::input(xor, 1)).unwrap();
        g.connect(ConnectorRef::output(xor, 0), ConnectorRef::input(out, 0)).unwrap();

        let config = SimulatorConfig::default();
        for value in [false, true, false] {
            if let Some(Component::Input(i)) = g.component_mut(a) {
                i.output.value = value;
            }
            g.settle(&config).unwrap();
            assert!(g.connector(ConnectorRef::input(out, 0)).unwrap().value);
        }
    }

    #[test]
    fn test_cycle_is_bounded() {
        let mut g = ring(None);
        let config = SimulatorConfig::new().with_max_depth(64);
        let err = g.settle(&config).unwrap_err();
        assert!(matches!(err, GatesimError::PropagationOverflow { max_depth: 64 }));
    }

    #[test]
    fn test_default_depth_cycle_fits_small_stack() {
        let err = settle_on_small_stack(ring(None)).unwrap_err();
        assert!(matches!(err, GatesimError::PropagationOverflow { max_depth: 1024 }));
    }

    #[test]
    fn test_nested_block_cycle_fits_small_stack() {
        let err = settle_on_small_stack(ring(Some(nested_buffer(32)))).unwrap_err();
        assert!(matches!(err, GatesimError::PropagationOverflow { max_depth: 1024 }));
    }

    #[test]
    fn test_nested_block_passes_value() {
        let mut g = Graph::new();
        let a = g.add_component(Component::Input(Input::new(Point::default())));
        let b = g.add_component(Component::Block(nested_buffer(3)));
        let out = g.add_component(Component::Output(Output::new(Point::default())));
        g.connect(ConnectorRef::output(a, 0), ConnectorRef::input(b, 0)).unwrap();
        g.connect(ConnectorRef::output(b, 0), ConnectorRef::input(out, 0)).unwrap();
        if let Some(Component::Input(i)) = g.component_mut(a) {
            i.output.value = true;
        }

        let config = SimulatorConfig::default();
        let mut p = Propagator::new(&config);
        p.settle(&mut g).unwrap();
        assert!(g.connector(ConnectorRef::input(out, 0)).unwrap().value);
        assert!(g.connector(ConnectorRef::output(b, 0)).unwrap().value);
        // One boundary input and one interior sink per level, then the canvas sink
        assert_eq!(p.visits(), 2 * 4 + 1);
    }

    #[test]
    fn test_missing_source_reported() {
        let mut g = Graph::new();
        let config = SimulatorConfig::default();
        let mut p = Propagator::new(&config);
        let err = p.propagate(&mut g, ConnectorRef::output(ComponentId(0), 0)).unwrap_err();
        assert!(matches!(err, GatesimError::ConnectorNotFound { .. }));
    }

    #[test]
    fn test_fanout_visits() {
        let mut g = Graph::new();
        let a = g.add_component(Component::Input(Input::new(Point::default())));
        for _ in 0..3 {
            let out = g.add_component(Component::Output(Output::new(Point::default())));
            g.connect(ConnectorRef::output(a, 0), ConnectorRef::input(out, 0)).unwrap();
        }
        let config = SimulatorConfig::default();
        let mut p = Propagator::new(&config);
        p.settle(&mut g).unwrap();
        assert_eq!(p.visits(), 3);
    }
}
