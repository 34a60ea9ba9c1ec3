//! DWG readers.

pub mod bit_reader;
pub mod classes;
pub mod dwg_reader;
pub mod object_map;
pub mod object_reader;

pub use bit_reader::BitReader;
pub use dwg_reader::{DwgFileReader, DwgReaderConfiguration};
pub use object_map::{ObjectMap, ObjectMapReader};
