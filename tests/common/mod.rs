// Common test utilities and mock providers


// Re-export commonly used items
// Note: These may appear unused in some test binaries
#[allow(unused_imports)]
pub use helpers::{
    args, create_test_services, create_test_services_with, MockCalculator, MockExtractor,
    MockSearch, TestProviders,
};
