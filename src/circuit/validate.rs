//! Structural validation of decoded graphs.

use std::collections::HashSet;

use crate::components::{Block, Component};
use crate::error::{GatesimError, Result};

use super::{ConnectorRef, Direction, Graph};

/// Validate a graph and every block interior nested in it.
///
/// Checks:
/// - Every line endpoint addresses an existing connector
/// - Lines run from an `OUT` connector to an `IN` connector
/// - No `IN` connector has more than one driver
/// - Block boundaries bypass to interior source outputs / sink inputs
/// - Only block boundary connectors carry a bypass
pub fn validate_graph(graph: &Graph) -> Result<()> {
    let mut driven = HashSet::new();
    for (i, line) in graph.lines().iter().enumerate() {
        check_endpoint(graph, line.source, Direction::Out, i)?;
        check_endpoint(graph, line.dest, Direction::In, i)?;
        if line.source.component == line.dest.component {
            return Err(GatesimError::malformed(format!(
                "line {i} wires component {} to itself",
                line.source.component
            )));
        }
        if !driven.insert(line.dest) {
            return Err(GatesimError::malformed(format!(
                "input {} has more than one driver",
                line.dest
            )));
        }
    }

    for (id, component) in graph.iter() {
        match component {
            Component::Block(block) => validate_block(block)?,
            other => {
                let stray = other
                    .inputs()
                    .iter()
                    .chain(other.outputs())
                    .any(|c| c.bypass.is_some());
                if stray {
                    return Err(GatesimError::malformed(format!(
                        "{} {id} carries a boundary bypass",
                        other.kind_name()
                    )));
                }
            }
        }
    }
    Ok(())
}

/// Validate a block's boundary and its interior graph.
pub fn validate_block(block: &Block) -> Result<()> {
    for (k, c) in block.inputs.iter().enumerate() {
        let what = format!("'{}' input {k}", block.label);
        check_bypass(&block.graph, c.bypass, Direction::Out, &what)?;
    }
    for (k, c) in block.outputs.iter().enumerate() {
        let what = format!("'{}' output {k}", block.label);
        check_bypass(&block.graph, c.bypass, Direction::In, &what)?;
    }
    validate_graph(&block.graph)
}

fn check_endpoint(graph: &Graph, r: ConnectorRef, expected: Direction, line: usize) -> Result<()> {
    if r.direction != expected {
        return Err(GatesimError::malformed(format!(
            "line {line} endpoint {r} should be {expected}"
        )));
    }
    if graph.connector(r).is_none() {
        return Err(GatesimError::malformed(format!(
            "line {line} references missing connector {r}"
        )));
    }
    Ok(())
}

fn check_bypass(
    interior: &Graph,
    bypass: Option<ConnectorRef>,
    expected: Direction,
    what: &str,
) -> Result<()> {
    let target = bypass
        .ok_or_else(|| GatesimError::malformed(format!("block {what} has no bypass target")))?;
    let owner_ok = match interior.component(target.component) {
        Some(c) if expected == Direction::Out => c.is_source(),
        Some(c) => c.is_sink(),
        None => false,
    };
    if target.direction != expected || !owner_ok || interior.connector(target).is_none() {
        return Err(GatesimError::malformed(format!(
            "block {what} bypasses to invalid connector {target}"
        )));
    }
    Ok(())
}
