//! Pattern notation: compilation and auto-detection.

mod compiler;
mod detector;

pub use compiler::{
    compile_pattern, validate_pattern, BracketPolicy, CompileOptions, PatternCaptures,
    PatternCompiler, PatternPart, PatternSpec,
};
pub use detector::{detect_pattern, Detection, DetectionMethod, PatternDetector};
