//! Top-level project: the canvas plus a palette of block templates.

use std::path::Path;

use tracing::{debug, info};

use super::{Color, ComponentId, Graph, Point};
use crate::codec;
use crate::components::{Block, Component};
use crate::error::{GatesimError, Result};

/// A complete editable project.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Project {
    /// The graph the user edits directly
    pub canvas: Graph,
    /// User-defined block definitions available for instantiation
    pub palette: Vec<Block>,
}

impl Project {
    /// Create an empty project.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a palette template.
    pub fn template(&self, index: usize) -> Result<&Block> {
        self.palette
            .get(index)
            .ok_or(GatesimError::TemplateNotFound { index })
    }

    /// Append a template to the palette, returning its index.
    pub fn add_template(&mut self, block: Block) -> usize {
        self.palette.push(block);
        self.palette.len() - 1
    }

    /// Package a canvas selection as a new palette template.
    ///
    /// The selected components are copied; the canvas is left unchanged.
    pub fn create_block(
        &mut self,
        selection: &[ComponentId],
        label: impl Into<String>,
        color: Color,
    ) -> Result<usize> {
        if selection.is_empty() {
            return Err(GatesimError::EmptySelection);
        }
        let interior = self.canvas.extract(selection)?;
        let block = Block::new(label, color, interior, Point::default())?;
        debug!(
            label = %block.label,
            inputs = block.num_inputs(),
            outputs = block.num_outputs(),
            "create block template"
        );
        Ok(self.add_template(block))
    }

    /// Copy a template into a fresh, independent component at `at`.
    pub fn instantiate(&self, index: usize, at: Point) -> Result<Component> {
        let mut component = Component::Block(self.template(index)?.clone());
        component.place_at(at);
        Ok(component)
    }

    /// Encode the project.
    pub fn to_bytes(&self) -> Vec<u8> {
        codec::encode_project(self)
    }

    /// Decode a project.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        codec::decode_project(bytes)
    }

    /// Write the project to a file.
    pub fn save_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.to_bytes();
        std::fs::write(path, &bytes).map_err(|e| GatesimError::FileWriteError {
            path: path.display().to_string(),
            source: e,
        })?;
        info!(path = %path.display(), bytes = bytes.len(), "saved project");
        Ok(())
    }

    /// Read a project from a file.
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| GatesimError::FileReadError {
            path: path.display().to_string(),
            source: e,
        })?;
        let project = Self::from_bytes(&bytes)?;
        info!(
            path = %path.display(),
            components = project.canvas.len(),
            templates = project.palette.len(),
            "loaded project"
        );
        Ok(project)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::ConnectorRef;
    use crate::components::{Gate, GateKind, Input, Output};

    #[test]
    fn test_create_block_leaves_canvas() {
        let mut project = Project::new();
        let a = project.canvas.add_component(Component::Input(Input::new(Point::default())));
        let not = project
            .canvas
            .add_component(Component::Gate(Gate::new(GateKind::Not, Point::default())));
        let out = project.canvas.add_component(Component::Output(Output::new(Point::default())));
        project.canvas.connect(ConnectorRef::output(a, 0), ConnectorRef::input(not, 0)).unwrap();
        project.canvas.connect(ConnectorRef::output(not, 0), ConnectorRef::input(out, 0)).unwrap();

        let index = project.create_block(&[a, not, out], "INV", Color::RED).unwrap();
        assert_eq!(index, 0);
        assert_eq!(project.canvas.len(), 3);
        let block = project.template(0).unwrap();
        assert_eq!(block.graph.lines().len(), 2);
        assert_eq!((block.num_inputs(), block.num_outputs()), (1, 1));
    }

    #[test]
    fn test_instantiate_places_copy() {
        let mut project = Project::new();
        let a = project.canvas.add_component(Component::Input(Input::new(Point::default())));
        project.create_block(&[a], "SRC", Color::BLUE).unwrap();
        let c = project.instantiate(0, Point::new(50.0, 60.0)).unwrap();
        assert_eq!(c.rect().origin(), Point::new(50.0, 60.0));
        assert_eq!(c.label(), "SRC");
        assert!(matches!(
            project.instantiate(3, Point::default()),
            Err(GatesimError::TemplateNotFound { index: 3 })
        ));
    }

    #[test]
    fn test_empty_selection() {
        let mut project = Project::new();
        assert!(matches!(
            project.create_block(&[], "X", Color::GREEN),
            Err(GatesimError::EmptySelection)
        ));
        assert!(matches!(
            project.create_block(&[ComponentId(4)], "X", Color::GREEN),
            Err(GatesimError::ComponentNotFound { .. })
        ));
    }

    #[test]
    fn test_duplicate_selection_rejected() {
        let mut project = Project::new();
        let a = project.canvas.add_component(Component::Input(Input::new(Point::default())));
        let out = project.canvas.add_component(Component::Output(Output::new(Point::default())));
        project.canvas.connect(ConnectorRef::output(a, 0), ConnectorRef::input(out, 0)).unwrap();

        let err = project.create_block(&[a, a, out], "BUF", Color::GREEN).unwrap_err();
        assert!(matches!(err, GatesimError::DuplicateSelection { component } if component == a));
        assert!(project.palette.is_empty());
    }
}
