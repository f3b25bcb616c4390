//! Binary project serialization.
//!
//! A project file stores the palette of block templates followed by the
//! canvas. All integers and floats are little-endian.
//!
//! # File Format
//!
//! ```text
//! +--------------------+
//! | Magic (4 bytes)    |  "GSIM"
//! +--------------------+
//! | version (2)        |  u16, currently 1
//! +--------------------+
//! | template count (4) |  u32, then one block component record each
//! +--------------------+
//! | canvas graph       |  graph record
//! +--------------------+
//! ```
//!
//! # Records
//!
//! ```text
//! graph      = u32 count, component * count, u32 count, line * count
//! component  = u8 tag, rect (4 * f32 x y w h), string label, body,
//!              connectors inputs, connectors outputs
//! body       = Input / Output:        (empty)
//!              Gate:                  u8 gate kind
//!              InputBus / OutputBus:  u8 width bits, u8 signed
//!              Block:                 color (4 * u8), graph interior
//! block tail = u32 num_inputs, u32 num_outputs (after the connectors)
//! connectors = u32 count, connector * count
//! connector  = u8 direction, f32 x, f32 y, u8 value, u8 has_bypass, [ref]
//! line       = ref source, ref dest
//! ref        = u32 component, u8 direction, u32 index
//! string     = u32 length, UTF-8 bytes
//! ```
//!
//! Tags: Input=0, Output=1, Gate=2, InputBus=3, OutputBus=4, Block=5.
//! Gate kinds: NOT=0, AND=1, OR=2, XOR=3. Directions: IN=0, OUT=1.
//!
//! Decoding validates every level after it is built, so a decoded project
//! never holds dangling references.

mod bytes;
mod decode;
mod encode;

pub use decode::{decode_graph, decode_project};
pub use encode::{encode_graph, encode_project};

/// Magic number for project files: "GSIM"
pub const MAGIC: [u8; 4] = *b"GSIM";

/// Current format version
pub const VERSION: u16 = 1;

/// Deepest block nesting accepted by the decoder.
pub const MAX_NESTING_DEPTH: usize = 64;

const TAG_INPUT: u8 = 0;
const TAG_OUTPUT: u8 = 1;
const TAG_GATE: u8 = 2;
const TAG_INPUT_BUS: u8 = 3;
const TAG_OUTPUT_BUS: u8 = 4;
const TAG_BLOCK: u8 = 5;

/// Smallest possible encoded sizes, used to bound counts before allocating.
const MIN_CONNECTOR: usize = 11;
const MIN_REF: usize = 9;
const MIN_LINE: usize = 2 * MIN_REF;
const MIN_COMPONENT: usize = 1 + 16 + 4 + 4 + 4;
