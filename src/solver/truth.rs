//! Exhaustive truth-table enumeration.

use std::fmt;

use crate::circuit::{ComponentId, ConnectorRef, Graph};
use crate::error::{GatesimError, Result};

use super::{SimulatorConfig, MAX_TRUTH_TABLE_BITS};

/// One row of a truth table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TruthRow {
    pub inputs: Vec<bool>,
    pub outputs: Vec<bool>,
}

/// Sink values for every combination of source bits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TruthTable {
    /// Column names of the source bits
    pub inputs: Vec<String>,
    /// Column names of the sink bits
    pub outputs: Vec<String>,
    pub rows: Vec<TruthRow>,
}

/// Column names and connector refs for a set of components' bits.
fn columns(
    graph: &Graph,
    ids: Vec<ComponentId>,
    sources: bool,
) -> (Vec<String>, Vec<ConnectorRef>) {
    let mut names = Vec::new();
    let mut refs = Vec::new();
    for id in ids {
        let Some(component) = graph.component(id) else {
            continue;
        };
        let bits = if sources {
            component.outputs().len()
        } else {
            component.inputs().len()
        };
        for k in 0..bits {
            names.push(if bits == 1 {
                component.label().to_string()
            } else {
                format!("{}[{}]", component.label(), k)
            });
            refs.push(if sources {
                ConnectorRef::output(id, k)
            } else {
                ConnectorRef::input(id, k)
            });
        }
    }
    (names, refs)
}

/// Enumerate every combination of source bits on a private copy of `graph`.
///
/// Source bits are numbered in component order, MSB first within a bus; row
/// `n` assigns bit `i` the value of bit `(width - 1 - i)` of `n`.
pub fn truth_table(graph: &Graph, config: &SimulatorConfig) -> Result<TruthTable> {
    let (inputs, source_refs) = columns(graph, graph.sources().collect(), true);
    let (outputs, sink_refs) = columns(graph, graph.sinks().collect(), false);

    let n = source_refs.len();
    if n > MAX_TRUTH_TABLE_BITS {
        return Err(GatesimError::TooManyInputs {
            bits: n,
            max: MAX_TRUTH_TABLE_BITS,
        });
    }

    let mut work = graph.clone();
    let mut rows = Vec::with_capacity(1 << n);
    for combo in 0..(1usize << n) {
        let bits: Vec<bool> = (0..n).map(|i| (combo >> (n - 1 - i)) & 1 == 1).collect();
        for (r, &bit) in source_refs.iter().zip(&bits) {
            if let Some(c) = work.connector_mut(*r) {
                c.value = bit;
            }
        }
        work.settle(config)?;
        let values = sink_refs
            .iter()
            .map(|r| work.connector(*r).map(|c| c.value).unwrap_or(false))
            .collect();
        rows.push(TruthRow {
            inputs: bits,
            outputs: values,
        });
    }

    Ok(TruthTable {
        inputs,
        outputs,
        rows,
    })
}

impl fmt::Display for TruthTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header: Vec<&str> = self
            .inputs
            .iter()
            .chain(&self.outputs)
            .map(String::as_str)
            .collect();
        let split = self.inputs.len();
        for (i, name) in header.iter().enumerate() {
            if i == split {
                write!(f, "| ")?;
            }
            write!(f, "{name} ")?;
        }
        writeln!(f)?;
        for row in &self.rows {
            for (i, (bit, name)) in row.inputs.iter().chain(&row.outputs).zip(&header).enumerate() {
                if i == split {
                    write!(f, "| ")?;
                }
                write!(f, "{:<width$} ", u8::from(*bit), width = name.len())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
