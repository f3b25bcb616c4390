//! End-to-end tests over the public API: build, save, load, re-save.

use gatesim_core::circuit::{Color, ComponentId, ConnectorRef, Point};
use gatesim_core::components::{
    primitives, BusWidth, Component, Gate, GateKind, Input, InputBus, Output, OutputBus,
};
use gatesim_core::solver::truth_table;
use gatesim_core::{GatesimError, Project, Simulator, SimulatorConfig};

fn pin_in(label: &str) -> Component {
    let mut c = Component::Input(Input::new(Point::default()));
    c.set_label(label);
    c
}

fn pin_out(label: &str) -> Component {
    let mut c = Component::Output(Output::new(Point::default()));
    c.set_label(label);
    c
}

fn gate(kind: GateKind) -> Component {
    Component::Gate(Gate::new(kind, Point::default()))
}

fn wire(sim: &mut Simulator, from: ComponentId, out: usize, to: ComponentId, input: usize) {
    sim.connect(ConnectorRef::output(from, out), ConnectorRef::input(to, input))
        .unwrap();
}

/// Half adder template at palette 0, full adder (two half adders + OR) at
/// palette 1, one full adder wired to pins on the canvas.
fn full_adder_project() -> (Simulator, [ComponentId; 5]) {
    let mut sim = Simulator::default();

    let a = sim.place(&pin_in("A"), Point::new(0.0, 0.0)).unwrap();
    let b = sim.place(&pin_in("B"), Point::new(0.0, 60.0)).unwrap();
    let xor = sim.place(&gate(GateKind::Xor), Point::new(100.0, 0.0)).unwrap();
    let and = sim.place(&gate(GateKind::And), Point::new(100.0, 60.0)).unwrap();
    let s = sim.place(&pin_out("S"), Point::new(200.0, 0.0)).unwrap();
    let c = sim.place(&pin_out("C"), Point::new(200.0, 60.0)).unwrap();
    wire(&mut sim, a, 0, xor, 0);
    wire(&mut sim, b, 0, xor, 1);
    wire(&mut sim, a, 0, and, 0);
    wire(&mut sim, b, 0, and, 1);
    wire(&mut sim, xor, 0, s, 0);
    wire(&mut sim, and, 0, c, 0);
    let half = sim
        .create_block(&[a, b, xor, and, s, c], "HADD", Color::BLUE)
        .unwrap();
    sim.clear();

    let a = sim.place(&pin_in("A"), Point::new(0.0, 0.0)).unwrap();
    let b = sim.place(&pin_in("B"), Point::new(0.0, 60.0)).unwrap();
    let cin = sim.place(&pin_in("CIN"), Point::new(0.0, 120.0)).unwrap();
    let h1 = sim.place_block(half, Point::new(100.0, 0.0)).unwrap();
    let h2 = sim.place_block(half, Point::new(200.0, 60.0)).unwrap();
    let or = sim.place(&gate(GateKind::Or), Point::new(300.0, 60.0)).unwrap();
    let s = sim.place(&pin_out("S"), Point::new(400.0, 0.0)).unwrap();
    let cout = sim.place(&pin_out("COUT"), Point::new(400.0, 60.0)).unwrap();
    wire(&mut sim, a, 0, h1, 0);
    wire(&mut sim, b, 0, h1, 1);
    wire(&mut sim, h1, 0, h2, 0);
    wire(&mut sim, cin, 0, h2, 1);
    wire(&mut sim, h2, 0, s, 0);
    wire(&mut sim, h1, 1, or, 0);
    wire(&mut sim, h2, 1, or, 1);
    wire(&mut sim, or, 0, cout, 0);
    let full = sim
        .create_block(&[a, b, cin, h1, h2, or, s, cout], "FADD", Color::RED)
        .unwrap();
    sim.clear();

    let a = sim.place(&pin_in("A"), Point::new(0.0, 0.0)).unwrap();
    let b = sim.place(&pin_in("B"), Point::new(0.0, 60.0)).unwrap();
    let cin = sim.place(&pin_in("CIN"), Point::new(0.0, 120.0)).unwrap();
    let adder = sim.place_block(full, Point::new(100.0, 40.0)).unwrap();
    let s = sim.place(&pin_out("S"), Point::new(250.0, 0.0)).unwrap();
    let cout = sim.place(&pin_out("COUT"), Point::new(250.0, 80.0)).unwrap();
    wire(&mut sim, a, 0, adder, 0);
    wire(&mut sim, b, 0, adder, 1);
    wire(&mut sim, cin, 0, adder, 2);
    wire(&mut sim, adder, 0, s, 0);
    wire(&mut sim, adder, 1, cout, 0);

    (sim, [a, b, cin, s, cout])
}

#[test]
fn test_full_adder_behaviour() {
    let (mut sim, [a, b, cin, s, cout]) = full_adder_project();
    for n in 0..8u8 {
        let bits = [n & 4 != 0, n & 2 != 0, n & 1 != 0];
        for (id, bit) in [a, b, cin].into_iter().zip(bits) {
            sim.set_input(id, 0, bit).unwrap();
        }
        let sum = bits.iter().filter(|&&x| x).count();
        assert_eq!(sim.read(s).unwrap(), vec![sum % 2 == 1], "sum for {n:03b}");
        assert_eq!(sim.read(cout).unwrap(), vec![sum >= 2], "carry for {n:03b}");
    }
}

#[test]
fn test_save_load_resave_is_byte_identical() {
    let (mut sim, [a, _, cin, _, _]) = full_adder_project();
    sim.set_input(a, 0, true).unwrap();
    sim.set_input(cin, 0, true).unwrap();

    let bytes = sim.save();
    let mut reloaded = Simulator::default();
    reloaded.load(&bytes).unwrap();

    assert_eq!(reloaded.project(), sim.project());
    assert_eq!(reloaded.save(), bytes);
}

#[test]
fn test_reloaded_project_behaves_identically() {
    let (sim, _) = full_adder_project();
    let project = Project::from_bytes(&sim.save()).unwrap();
    let config = SimulatorConfig::default();

    assert_eq!(
        truth_table(&project.canvas, &config).unwrap(),
        truth_table(&sim.project().canvas, &config).unwrap()
    );
    for (loaded, original) in project.palette.iter().zip(&sim.project().palette) {
        assert_eq!(
            truth_table(&loaded.graph, &config).unwrap(),
            truth_table(&original.graph, &config).unwrap()
        );
    }
}

#[test]
fn test_file_roundtrip() {
    let (sim, _) = full_adder_project();
    let name = format!("gatesim-roundtrip-{}.gsim", std::process::id());
    let path = std::env::temp_dir().join(name);
    sim.save_file(&path).unwrap();

    let mut reloaded = Simulator::default();
    reloaded.load_file(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(reloaded.save(), sim.save());
    assert!(matches!(
        reloaded.load_file(&path),
        Err(GatesimError::FileReadError { .. })
    ));
}

#[test]
fn test_bus_project_roundtrip() {
    let mut sim = Simulator::default();
    let source = Component::InputBus(InputBus::new(BusWidth::Four, Point::default()));
    let sink = Component::OutputBus(OutputBus::new(BusWidth::Four, Point::default()));
    let bus_in = sim.place(&source, Point::new(0.0, 0.0)).unwrap();
    let bus_out = sim.place(&sink, Point::new(200.0, 0.0)).unwrap();
    for k in 0..4 {
        sim.connect(ConnectorRef::output(bus_in, k), ConnectorRef::input(bus_out, k))
            .unwrap();
    }
    sim.set_bus_value(bus_in, 11).unwrap();
    assert_eq!(sim.read(bus_out).unwrap(), vec![true, false, true, true]);

    let mut reloaded = Simulator::default();
    reloaded.load(&sim.save()).unwrap();
    match reloaded.canvas().component(bus_out) {
        Some(Component::OutputBus(bus)) => assert_eq!(bus.value(), 11),
        other => panic!("expected an output bus, got {other:?}"),
    }
}

#[test]
fn test_every_primitive_survives_roundtrip() {
    let mut sim = Simulator::default();
    for (i, template) in primitives().iter().enumerate() {
        sim.place(template, Point::new(0.0, 50.0 * i as f32)).unwrap();
    }
    let bytes = sim.save();
    let project = Project::from_bytes(&bytes).unwrap();
    assert_eq!(project.canvas.len(), primitives().len());
    assert_eq!(project.to_bytes(), bytes);
}

#[test]
fn test_corrupt_file_keeps_session() {
    let (mut sim, _) = full_adder_project();
    let before = sim.save();

    let mut corrupt = before.clone();
    corrupt.truncate(corrupt.len() / 2);
    let err = sim.load(&corrupt).unwrap_err();
    assert!(err.is_decode());
    assert_eq!(sim.save(), before);
}
