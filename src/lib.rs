//! The Nand2Tetris toolchain core: a three-stage compilation pipeline.
//!
//! - [jack] lowers Jack source to VM code.
//! - [vm] lowers VM code to Hack assembly.
//! - [asm] assembles Hack assembly to 16-bit machine code.
//!
//! Each stage is a pure text-in, text-out transform; file discovery and I/O
//! live in the `jackc`/`vmtrans`/`asm` binaries, not in the library.

pub mod asm;
pub mod jack;
pub mod logging;
pub mod vm;
