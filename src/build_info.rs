//! Compile-time build information.

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));
