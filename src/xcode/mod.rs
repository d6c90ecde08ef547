//! Xcode project file operations

pub mod pbxproj;
pub mod scheme;

// Re-exports for library consumers
#[allow(unused_imports)]
pub use pbxproj::Pbxproj;
#[allow(unused_imports)]
pub use scheme::SchemeDocument;
