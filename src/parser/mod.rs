// Python parsing layer

pub mod ast;
mod python;

pub use ast::{
    ClassInfo, CodeMetrics, EnclosingKind, FileAnalysis, FunctionInfo, ImportKind,
    ImportStatement,
};
pub use python::PythonParser;
