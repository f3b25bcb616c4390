//! Project and graph decoding.

use tracing::debug;

use crate::circuit::{
    validate_block, validate_graph, Color, ComponentId, ConnectorRef, Direction, Graph, Line,
    Point, Project, Rect,
};
use crate::components::{
    Block, BusWidth, Component, Connector, Gate, GateKind, Input, InputBus, Output, OutputBus,
};
use crate::error::{GatesimError, Result};

use super::bytes::ByteReader;
use super::*;

/// Parse a whole project.
///
/// Fails without side effects on any truncation, unknown value, dangling
/// reference, or trailing data.
pub fn decode_project(bytes: &[u8]) -> Result<Project> {
    let mut r = ByteReader::new(bytes);

    let magic: [u8; 4] = r.read_bytes()?;
    if magic != MAGIC {
        return Err(GatesimError::InvalidMagic {
            expected: MAGIC,
            actual: magic,
        });
    }
    let version = r.read_u16()?;
    if version != VERSION {
        return Err(GatesimError::UnsupportedVersion { version });
    }

    let count = r.read_count(MIN_COMPONENT)?;
    let mut palette = Vec::with_capacity(count);
    for i in 0..count {
        let offset = r.offset();
        match read_component(&mut r, 0)? {
            Component::Block(block) => {
                validate_block(&block)?;
                palette.push(block);
            }
            other => {
                return Err(GatesimError::malformed(format!(
                    "palette entry {i} at byte {offset} is a {}, not a block",
                    other.kind_name()
                )));
            }
        }
    }

    let canvas = read_graph(&mut r, 0)?;
    validate_graph(&canvas)?;
    finish(&r)?;

    debug!(
        templates = palette.len(),
        components = canvas.len(),
        lines = canvas.lines().len(),
        "decoded project"
    );
    Ok(Project { canvas, palette })
}

/// Parse a single graph written by [`encode_graph`](super::encode_graph).
pub fn decode_graph(bytes: &[u8]) -> Result<Graph> {
    let mut r = ByteReader::new(bytes);
    let graph = read_graph(&mut r, 0)?;
    validate_graph(&graph)?;
    finish(&r)?;
    Ok(graph)
}

fn finish(r: &ByteReader<'_>) -> Result<()> {
    match r.remaining() {
        0 => Ok(()),
        count => Err(GatesimError::TrailingBytes { count }),
    }
}

fn read_graph(r: &mut ByteReader<'_>, depth: usize) -> Result<Graph> {
    let count = r.read_count(MIN_COMPONENT)?;
    let mut components = Vec::with_capacity(count);
    for _ in 0..count {
        components.push(read_component(r, depth)?);
    }
    let count = r.read_count(MIN_LINE)?;
    let mut lines = Vec::with_capacity(count);
    for _ in 0..count {
        let source = read_ref(r)?;
        let dest = read_ref(r)?;
        lines.push(Line { source, dest });
    }
    Ok(Graph::from_parts(components, lines))
}

fn read_component(r: &mut ByteReader<'_>, depth: usize) -> Result<Component> {
    let offset = r.offset();
    let tag = r.read_u8()?;
    let rect = read_rect(r)?;
    let label = r.read_str()?;

    let component = match tag {
        TAG_INPUT => {
            let (_, outputs) = read_io(r, offset, 0, 1)?;
            Component::Input(Input {
                label,
                rect,
                output: single(outputs)?,
            })
        }
        TAG_OUTPUT => {
            let (inputs, _) = read_io(r, offset, 1, 0)?;
            Component::Output(Output {
                label,
                rect,
                input: single(inputs)?,
            })
        }
        TAG_GATE => {
            let code_offset = r.offset();
            let code = r.read_u8()?;
            let kind = GateKind::from_code(code).ok_or(GatesimError::UnknownGateKind {
                code,
                offset: code_offset,
            })?;
            let (inputs, outputs) = read_io(r, offset, kind.arity(), 1)?;
            Component::Gate(Gate {
                label,
                rect,
                kind,
                inputs,
                output: single(outputs)?,
            })
        }
        TAG_INPUT_BUS => {
            let (width, signed) = read_bus(r)?;
            let (_, outputs) = read_io(r, offset, 0, width.bits())?;
            Component::InputBus(InputBus {
                label,
                rect,
                width,
                signed,
                outputs,
            })
        }
        TAG_OUTPUT_BUS => {
            let (width, signed) = read_bus(r)?;
            let (inputs, _) = read_io(r, offset, width.bits(), 0)?;
            Component::OutputBus(OutputBus {
                label,
                rect,
                width,
                signed,
                inputs,
            })
        }
        TAG_BLOCK => {
            if depth >= MAX_NESTING_DEPTH {
                return Err(GatesimError::NestingTooDeep {
                    max: MAX_NESTING_DEPTH,
                });
            }
            let [cr, cg, cb, ca] = r.read_bytes()?;
            let graph = read_graph(r, depth + 1)?;
            let inputs = read_connectors(r, Direction::In)?;
            let outputs = read_connectors(r, Direction::Out)?;
            let num_inputs = r.read_len()?;
            let num_outputs = r.read_len()?;
            if num_inputs != inputs.len() || num_outputs != outputs.len() {
                return Err(GatesimError::malformed(format!(
                    "block at byte {offset} declares {num_inputs}/{num_outputs} connectors \
                     but stores {}/{}",
                    inputs.len(),
                    outputs.len()
                )));
            }
            Component::Block(Block {
                label,
                rect,
                color: Color {
                    r: cr,
                    g: cg,
                    b: cb,
                    a: ca,
                },
                graph,
                inputs,
                outputs,
            })
        }
        _ => return Err(GatesimError::UnknownComponentTag { tag, offset }),
    };
    Ok(component)
}

/// Read the input and output arrays of a primitive, checking their sizes.
fn read_io(
    r: &mut ByteReader<'_>,
    offset: usize,
    num_inputs: usize,
    num_outputs: usize,
) -> Result<(Vec<Connector>, Vec<Connector>)> {
    let inputs = read_connectors(r, Direction::In)?;
    let outputs = read_connectors(r, Direction::Out)?;
    if inputs.len() != num_inputs || outputs.len() != num_outputs {
        return Err(GatesimError::malformed(format!(
            "component at byte {offset} has {}/{} connectors, expected {num_inputs}/{num_outputs}",
            inputs.len(),
            outputs.len()
        )));
    }
    Ok((inputs, outputs))
}

fn single(mut connectors: Vec<Connector>) -> Result<Connector> {
    connectors
        .pop()
        .ok_or_else(|| GatesimError::malformed("missing connector"))
}

fn read_bus(r: &mut ByteReader<'_>) -> Result<(BusWidth, bool)> {
    let offset = r.offset();
    let bits = r.read_u8()?;
    let width = BusWidth::from_bits(bits).ok_or(GatesimError::InvalidBusWidth {
        width: bits,
        offset,
    })?;
    Ok((width, r.read_bool()?))
}

fn read_rect(r: &mut ByteReader<'_>) -> Result<Rect> {
    Ok(Rect::new(
        r.read_f32()?,
        r.read_f32()?,
        r.read_f32()?,
        r.read_f32()?,
    ))
}

fn read_direction(r: &mut ByteReader<'_>) -> Result<Direction> {
    let offset = r.offset();
    let value = r.read_u8()?;
    Direction::from_code(value).ok_or(GatesimError::InvalidDirection { value, offset })
}

fn read_connectors(r: &mut ByteReader<'_>, expected: Direction) -> Result<Vec<Connector>> {
    let count = r.read_count(MIN_CONNECTOR)?;
    let mut connectors = Vec::with_capacity(count);
    for _ in 0..count {
        let offset = r.offset();
        let direction = read_direction(r)?;
        if direction != expected {
            return Err(GatesimError::malformed(format!(
                "connector at byte {offset} is {direction}, expected {expected}"
            )));
        }
        let position = Point::new(r.read_f32()?, r.read_f32()?);
        let value = r.read_bool()?;
        let bypass = if r.read_bool()? {
            Some(read_ref(r)?)
        } else {
            None
        };
        connectors.push(Connector {
            direction,
            position,
            value,
            bypass,
        });
    }
    Ok(connectors)
}

fn read_ref(r: &mut ByteReader<'_>) -> Result<ConnectorRef> {
    let component = ComponentId(r.read_len()?);
    let direction = read_direction(r)?;
    let index = r.read_len()?;
    Ok(ConnectorRef {
        component,
        direction,
        index,
    })
}
