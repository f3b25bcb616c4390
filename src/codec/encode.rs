//! Project and graph encoding.

use crate::circuit::{ConnectorRef, Graph, Line, Project, Rect};
use crate::components::{Block, Component, Connector, InputBus, OutputBus};

use super::bytes::ByteWriter;
use super::*;

/// Serialize a whole project.
pub fn encode_project(project: &Project) -> Vec<u8> {
    let mut w = ByteWriter::new();
    w.write_bytes(&MAGIC);
    w.write_u16(VERSION);
    w.write_len(project.palette.len());
    for template in &project.palette {
        // Templates are stored as ordinary block records
        write_block(&mut w, template);
    }
    write_graph(&mut w, &project.canvas);
    w.finish()
}

/// Serialize a single graph without the file header.
pub fn encode_graph(graph: &Graph) -> Vec<u8> {
    let mut w = ByteWriter::new();
    write_graph(&mut w, graph);
    w.finish()
}

fn write_graph(w: &mut ByteWriter, graph: &Graph) {
    w.write_len(graph.len());
    for component in graph.components() {
        write_component(w, component);
    }
    w.write_len(graph.lines().len());
    for line in graph.lines() {
        write_line(w, line);
    }
}

fn write_component(w: &mut ByteWriter, component: &Component) {
    let tag = match component {
        Component::Input(_) => TAG_INPUT,
        Component::Output(_) => TAG_OUTPUT,
        Component::Gate(_) => TAG_GATE,
        Component::InputBus(_) => TAG_INPUT_BUS,
        Component::OutputBus(_) => TAG_OUTPUT_BUS,
        Component::Block(block) => return write_block(w, block),
    };
    w.write_u8(tag);
    write_rect(w, &component.rect());
    w.write_str(component.label());

    match component {
        Component::Gate(gate) => w.write_u8(gate.kind.code()),
        Component::InputBus(InputBus { width, signed, .. })
        | Component::OutputBus(OutputBus { width, signed, .. }) => {
            w.write_u8(width.bits() as u8);
            w.write_bool(*signed);
        }
        _ => {}
    }

    write_connectors(w, component.inputs());
    write_connectors(w, component.outputs());
}

fn write_block(w: &mut ByteWriter, block: &Block) {
    w.write_u8(TAG_BLOCK);
    write_rect(w, &block.rect);
    w.write_str(&block.label);
    let c = block.color;
    w.write_bytes(&[c.r, c.g, c.b, c.a]);
    write_graph(w, &block.graph);
    write_connectors(w, &block.inputs);
    write_connectors(w, &block.outputs);
    w.write_len(block.num_inputs());
    w.write_len(block.num_outputs());
}

fn write_rect(w: &mut ByteWriter, rect: &Rect) {
    w.write_f32(rect.x);
    w.write_f32(rect.y);
    w.write_f32(rect.width);
    w.write_f32(rect.height);
}

fn write_connectors(w: &mut ByteWriter, connectors: &[Connector]) {
    w.write_len(connectors.len());
    for c in connectors {
        w.write_u8(c.direction.code());
        w.write_f32(c.position.x);
        w.write_f32(c.position.y);
        w.write_bool(c.value);
        match c.bypass {
            Some(target) => {
                w.write_bool(true);
                write_ref(w, target);
            }
            None => w.write_bool(false),
        }
    }
}

fn write_line(w: &mut ByteWriter, line: &Line) {
    write_ref(w, line.source);
    write_ref(w, line.dest);
}

fn write_ref(w: &mut ByteWriter, r: ConnectorRef) {
    w.write_len(r.component.0);
    w.write_u8(r.direction.code());
    w.write_len(r.index);
}
