//! Main simulator interface.

use std::path::Path;

use tracing::{debug, info};

use crate::circuit::{Color, ComponentId, ConnectorRef, Graph, LineId, Point, Project};
use crate::components::{Component, Connector};
use crate::error::{GatesimError, Result};

use super::{truth_table, TruthTable, DEFAULT_MAX_DEPTH};

/// Configuration for the simulator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatorConfig {
    /// Recursion bound for one settle pass.
    pub max_depth: usize,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl SimulatorConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the recursion bound.
    ///
    /// Every line followed and every block level entered costs one level.
    /// Acyclic circuits need at most their longest path length; a feedback
    /// loop always exhausts the bound.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// An editing session over a project.
///
/// Every value or structural change runs exactly one settle pass on the
/// canvas before returning, so sink values are always current.
pub struct Simulator {
    /// The project being edited
    project: Project,
    /// Propagation settings
    config: SimulatorConfig,
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new(Project::new())
    }
}

impl Simulator {
    /// Create a new simulator with default configuration.
    pub fn new(project: Project) -> Self {
        Self::with_config(project, SimulatorConfig::default())
    }

    /// Create a new simulator with custom configuration.
    pub fn with_config(project: Project, config: SimulatorConfig) -> Self {
        Self { project, config }
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn canvas(&self) -> &Graph {
        &self.project.canvas
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Run one settle pass over the canvas.
    pub fn settle(&mut self) -> Result<()> {
        self.project.canvas.settle(&self.config)
    }

    /// Clone a template (primitive or block) onto the canvas at `at`.
    pub fn place(&mut self, template: &Component, at: Point) -> Result<ComponentId> {
        let mut component = template.clone();
        component.place_at(at);
        let id = self.project.canvas.add_component(component);
        self.settle()?;
        Ok(id)
    }

    /// Instantiate a palette block onto the canvas at `at`.
    pub fn place_block(&mut self, index: usize, at: Point) -> Result<ComponentId> {
        let component = self.project.instantiate(index, at)?;
        let id = self.project.canvas.add_component(component);
        self.settle()?;
        Ok(id)
    }

    /// Package canvas components as a new palette block.
    pub fn create_block(
        &mut self,
        selection: &[ComponentId],
        label: impl Into<String>,
        color: Color,
    ) -> Result<usize> {
        self.project.create_block(selection, label, color)
    }

    /// Wire two connectors together.
    pub fn connect(&mut self, a: ConnectorRef, b: ConnectorRef) -> Result<LineId> {
        let id = self.project.canvas.connect(a, b)?;
        self.settle()?;
        Ok(id)
    }

    /// Remove every line attached to a connector, clearing what they drove.
    pub fn disconnect(&mut self, r: ConnectorRef) -> Result<usize> {
        let removed = self.project.canvas.disconnect(r)?;
        for line in &removed {
            self.project.canvas.release(line.dest, &self.config)?;
        }
        self.settle()?;
        Ok(removed.len())
    }

    /// Remove a single line, clearing what it drove.
    pub fn remove_line(&mut self, id: LineId) -> Result<()> {
        let line = self.project.canvas.remove_line(id)?;
        self.project.canvas.release(line.dest, &self.config)?;
        self.settle()
    }

    /// Delete a component together with its lines.
    pub fn remove_component(&mut self, id: ComponentId) -> Result<Component> {
        let (component, orphaned) = self.project.canvas.remove_component(id)?;
        for dest in orphaned {
            self.project.canvas.release(dest, &self.config)?;
        }
        self.settle()?;
        Ok(component)
    }

    /// Move a component. Positions do not affect values, so no settle.
    pub fn move_component(&mut self, id: ComponentId, dx: f32, dy: f32) -> Result<()> {
        self.project
            .canvas
            .component_mut(id)
            .ok_or(GatesimError::ComponentNotFound { component: id })?
            .translate(dx, dy);
        Ok(())
    }

    /// Flip one bit of an input source, returning the new value.
    pub fn toggle_input(&mut self, id: ComponentId, bit: usize) -> Result<bool> {
        let current = self.source_bit(id, bit)?.value;
        self.set_input(id, bit, !current)?;
        Ok(!current)
    }

    /// Set one bit of an input source.
    pub fn set_input(&mut self, id: ComponentId, bit: usize, value: bool) -> Result<()> {
        self.source_bit(id, bit)?.value = value;
        debug!(component = %id, bit, value, "set input");
        self.settle()
    }

    /// Set every bit of an input bus from an integer.
    pub fn set_bus_value(&mut self, id: ComponentId, value: i32) -> Result<()> {
        match self.project.canvas.component_mut(id) {
            Some(Component::InputBus(bus)) => bus.set_value(value),
            Some(other) => {
                return Err(GatesimError::NotASource {
                    component: id,
                    kind: other.kind_name(),
                })
            }
            None => return Err(GatesimError::ComponentNotFound { component: id }),
        }
        self.settle()
    }

    fn source_bit(&mut self, id: ComponentId, bit: usize) -> Result<&mut Connector> {
        let component = self
            .project
            .canvas
            .component_mut(id)
            .ok_or(GatesimError::ComponentNotFound { component: id })?;
        if !component.is_source() {
            return Err(GatesimError::NotASource {
                component: id,
                kind: component.kind_name(),
            });
        }
        let width = component.outputs().len();
        component
            .outputs_mut()
            .get_mut(bit)
            .ok_or(GatesimError::BitOutOfRange {
                component: id,
                bit,
                width,
            })
    }

    /// Values currently on a component's input connectors (sinks) or output
    /// connectors (everything else).
    pub fn read(&self, id: ComponentId) -> Result<Vec<bool>> {
        let component = self
            .project
            .canvas
            .component(id)
            .ok_or(GatesimError::ComponentNotFound { component: id })?;
        let bits = if component.is_sink() {
            component.inputs()
        } else {
            component.outputs()
        };
        Ok(bits.iter().map(|c| c.value).collect())
    }

    /// Remove all canvas components and lines. The palette is kept.
    pub fn clear(&mut self) {
        self.project.canvas.clear();
    }

    /// Replace the whole project from encoded bytes.
    ///
    /// The current project is untouched unless decoding succeeds.
    pub fn load(&mut self, bytes: &[u8]) -> Result<()> {
        let project = Project::from_bytes(bytes)?;
        self.project = project;
        self.settle()
    }

    /// Replace the whole project from a file.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let project = Project::load_file(path)?;
        self.project = project;
        self.settle()
    }

    /// Encode the current project.
    pub fn save(&self) -> Vec<u8> {
        let bytes = self.project.to_bytes();
        info!(bytes = bytes.len(), "encoded project");
        bytes
    }

    /// Write the current project to a file.
    pub fn save_file(&self, path: impl AsRef<Path>) -> Result<()> {
        self.project.save_file(path)
    }

    /// Truth table of the canvas.
    pub fn truth_table(&self) -> Result<TruthTable> {
        truth_table(&self.project.canvas, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{
        primitives, BusWidth, Gate, GateKind, Input, InputBus, Output, OutputBus,
    };

    fn gate(kind: GateKind) -> Component {
        Component::Gate(Gate::new(kind, Point::default()))
    }

    fn input() -> Component {
        Component::Input(Input::new(Point::default()))
    }

    fn output() -> Component {
        Component::Output(Output::new(Point::default()))
    }

    /// Canvas with two inputs wired through `kind` into one output.
    fn two_input(
        kind: GateKind,
    ) -> (Simulator, ComponentId, ComponentId, ComponentId, ComponentId) {
        let mut sim = Simulator::default();
        let a = sim.place(&input(), Point::new(0.0, 0.0)).unwrap();
        let b = sim.place(&input(), Point::new(0.0, 40.0)).unwrap();
        let g = sim.place(&gate(kind), Point::new(80.0, 20.0)).unwrap();
        let out = sim.place(&output(), Point::new(200.0, 20.0)).unwrap();
        sim.connect(ConnectorRef::output(a, 0), ConnectorRef::input(g, 0)).unwrap();
        sim.connect(ConnectorRef::output(b, 0), ConnectorRef::input(g, 1)).unwrap();
        sim.connect(ConnectorRef::output(g, 0), ConnectorRef::input(out, 0)).unwrap();
        (sim, a, b, g, out)
    }

    #[test]
    fn test_toggle_propagates() {
        let (mut sim, a, b, _, out) = two_input(GateKind::And);
        assert_eq!(sim.read(out).unwrap(), vec![false]);
        assert!(sim.toggle_input(a, 0).unwrap());
        assert_eq!(sim.read(out).unwrap(), vec![false]);
        sim.toggle_input(b, 0).unwrap();
        assert_eq!(sim.read(out).unwrap(), vec![true]);
    }

    #[test]
    fn test_settle_is_idempotent() {
        let (mut sim, a, _, _, out) = two_input(GateKind::Or);
        sim.set_input(a, 0, true).unwrap();
        let before = sim.canvas().clone();
        sim.settle().unwrap();
        sim.settle().unwrap();
        assert_eq!(sim.canvas(), &before);
        assert_eq!(sim.read(out).unwrap(), vec![true]);
    }

    #[test]
    fn test_disconnect_clears_downstream() {
        let (mut sim, a, b, g, out) = two_input(GateKind::And);
        sim.set_input(a, 0, true).unwrap();
        sim.set_input(b, 0, true).unwrap();
        assert_eq!(sim.read(out).unwrap(), vec![true]);

        assert_eq!(sim.disconnect(ConnectorRef::input(g, 1)).unwrap(), 1);
        assert_eq!(sim.read(out).unwrap(), vec![false]);
        assert!(!sim.canvas().connector(ConnectorRef::input(g, 1)).unwrap().value);
    }

    #[test]
    fn test_remove_component_clears_downstream() {
        let (mut sim, a, _, _, _) = two_input(GateKind::Or);
        sim.set_input(a, 0, true).unwrap();
        let removed = sim.remove_component(a).unwrap();
        assert!(removed.is_source());
        // Ids shift down: b=0, gate=1, out=2
        assert_eq!(sim.read(ComponentId(2)).unwrap(), vec![false]);
        assert_eq!(sim.canvas().lines().len(), 2);
    }

    #[test]
    fn test_remove_line() {
        let (mut sim, a, _, _, out) = two_input(GateKind::Or);
        sim.set_input(a, 0, true).unwrap();
        sim.remove_line(LineId(2)).unwrap();
        assert_eq!(sim.read(out).unwrap(), vec![false]);
        assert!(matches!(
            sim.remove_line(LineId(9)),
            Err(GatesimError::LineNotFound { line: 9 })
        ));
    }

    #[test]
    fn test_rejected_wire_keeps_edge() {
        let (mut sim, a, b, g, _) = two_input(GateKind::Xor);
        let err = sim
            .connect(ConnectorRef::output(b, 0), ConnectorRef::input(g, 0))
            .unwrap_err();
        assert!(matches!(err, GatesimError::InputAlreadyConnected { .. }));
        let (_, line) = sim.canvas().incoming(ConnectorRef::input(g, 0)).unwrap();
        assert_eq!(line.source, ConnectorRef::output(a, 0));
    }

    #[test]
    fn test_cannot_toggle_non_source() {
        let (mut sim, _, _, g, _) = two_input(GateKind::And);
        assert!(matches!(
            sim.toggle_input(g, 0),
            Err(GatesimError::NotASource { kind: "gate", .. })
        ));
        assert!(matches!(
            sim.toggle_input(ComponentId(0), 1),
            Err(GatesimError::BitOutOfRange { bit: 1, width: 1, .. })
        ));
    }

    #[test]
    fn test_bus_passthrough() {
        let mut sim = Simulator::default();
        let source = Component::InputBus(InputBus::new(BusWidth::Four, Point::default()));
        let sink = Component::OutputBus(OutputBus::new(BusWidth::Four, Point::default()));
        let src = sim.place(&source, Point::default()).unwrap();
        let dst = sim.place(&sink, Point::new(100.0, 0.0)).unwrap();
        for k in 0..4 {
            sim.connect(ConnectorRef::output(src, k), ConnectorRef::input(dst, k)).unwrap();
        }
        sim.set_bus_value(src, 0b1010).unwrap();
        assert_eq!(sim.read(dst).unwrap(), vec![true, false, true, false]);
        match sim.canvas().component(dst) {
            Some(Component::OutputBus(bus)) => assert_eq!(bus.value(), 10),
            other => panic!("unexpected {other:?}"),
        }
        assert!(sim.set_bus_value(dst, 1).is_err());
    }

    #[test]
    fn test_block_instance_matches_gate() {
        let (mut sim, a, b, g, out) = two_input(GateKind::And);
        let index = sim.create_block(&[a, b, g, out], "AND2", Color::GREEN).unwrap();
        sim.clear();

        let x = sim.place(&input(), Point::default()).unwrap();
        let y = sim.place(&input(), Point::new(0.0, 40.0)).unwrap();
        let blk = sim.place_block(index, Point::new(80.0, 0.0)).unwrap();
        let o = sim.place(&output(), Point::new(200.0, 0.0)).unwrap();
        sim.connect(ConnectorRef::output(x, 0), ConnectorRef::input(blk, 0)).unwrap();
        sim.connect(ConnectorRef::output(y, 0), ConnectorRef::input(blk, 1)).unwrap();
        sim.connect(ConnectorRef::output(blk, 0), ConnectorRef::input(o, 0)).unwrap();

        for (p, q) in [(false, false), (true, false), (false, true), (true, true)] {
            sim.set_input(x, 0, p).unwrap();
            sim.set_input(y, 0, q).unwrap();
            assert_eq!(sim.read(o).unwrap(), vec![p && q], "inputs {p} {q}");
        }
    }

    #[test]
    fn test_sibling_instances_independent() {
        let (mut sim, a, b, g, out) = two_input(GateKind::Or);
        let index = sim.create_block(&[a, b, g, out], "OR2", Color::BLUE).unwrap();
        sim.clear();

        let x = sim.place(&input(), Point::default()).unwrap();
        let first = sim.place_block(index, Point::new(80.0, 0.0)).unwrap();
        let second = sim.place_block(index, Point::new(80.0, 100.0)).unwrap();
        sim.connect(ConnectorRef::output(x, 0), ConnectorRef::input(first, 0)).unwrap();
        sim.set_input(x, 0, true).unwrap();

        assert_eq!(sim.read(first).unwrap(), vec![true]);
        assert_eq!(sim.read(second).unwrap(), vec![false]);
        let interior = sim.canvas().resolve(ConnectorRef::output(second, 0)).unwrap();
        assert!(!interior.value);
        assert!(!sim.project().template(index).unwrap().outputs[0].value);
    }

    #[test]
    fn test_nested_blocks() {
        // inner: NOT ; outer: two inner NOTs in series == identity
        let mut sim = Simulator::default();
        let i = sim.place(&input(), Point::default()).unwrap();
        let n = sim.place(&gate(GateKind::Not), Point::default()).unwrap();
        let o = sim.place(&output(), Point::default()).unwrap();
        sim.connect(ConnectorRef::output(i, 0), ConnectorRef::input(n, 0)).unwrap();
        sim.connect(ConnectorRef::output(n, 0), ConnectorRef::input(o, 0)).unwrap();
        let inv = sim.create_block(&[i, n, o], "INV", Color::RED).unwrap();
        sim.clear();

        let i = sim.place(&input(), Point::default()).unwrap();
        let b1 = sim.place_block(inv, Point::default()).unwrap();
        let b2 = sim.place_block(inv, Point::default()).unwrap();
        let o = sim.place(&output(), Point::default()).unwrap();
        sim.connect(ConnectorRef::output(i, 0), ConnectorRef::input(b1, 0)).unwrap();
        sim.connect(ConnectorRef::output(b1, 0), ConnectorRef::input(b2, 0)).unwrap();
        sim.connect(ConnectorRef::output(b2, 0), ConnectorRef::input(o, 0)).unwrap();
        let buf = sim.create_block(&[i, b1, b2, o], "BUF", Color::GREEN).unwrap();
        sim.clear();

        let i = sim.place(&input(), Point::default()).unwrap();
        let b = sim.place_block(buf, Point::default()).unwrap();
        sim.connect(ConnectorRef::output(i, 0), ConnectorRef::input(b, 0)).unwrap();
        for value in [true, false, true] {
            sim.set_input(i, 0, value).unwrap();
            assert_eq!(sim.read(b).unwrap(), vec![value]);
        }
    }

    #[test]
    fn test_move_component() {
        let mut sim = Simulator::default();
        let palette = primitives();
        let id = sim.place(&palette[0], Point::new(10.0, 10.0)).unwrap();
        sim.move_component(id, 5.0, -5.0).unwrap();
        assert_eq!(sim.canvas().component(id).unwrap().rect().origin(), Point::new(15.0, 5.0));
        assert!(sim.move_component(ComponentId(3), 1.0, 1.0).is_err());
    }

    #[test]
    fn test_failed_load_keeps_project() {
        let (mut sim, a, _, _, _) = two_input(GateKind::And);
        sim.set_input(a, 0, true).unwrap();
        let before = sim.canvas().clone();
        let mut bytes = sim.save();
        bytes.truncate(bytes.len() / 2);
        assert!(sim.load(&bytes).unwrap_err().is_decode());
        assert_eq!(sim.canvas(), &before);
    }
}
