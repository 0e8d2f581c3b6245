//! Platform glue shared by the Android app shells: asset unpacking, lifecycle
//! forwarding, the permission gate, and surface routing. The native runtimes
//! behind the FFI boundary are external collaborators and live elsewhere.

pub mod assets;
pub mod lifecycle;
pub mod permissions;
pub mod surface;

#[cfg(target_os = "android")]
pub mod android;
