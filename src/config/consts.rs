/// Default fuel budget per module instance (100 million instructions)
pub const DEFAULT_FUEL_LEVEL: u64 = 100_000_000;
/// Minimum allowed fuel budget (1 million instructions)
pub const MIN_FUEL_LEVEL: u64 = 1_000_000;
/// Maximum allowed fuel budget (500 million instructions) - security limit
pub const MAX_FUEL_LEVEL: u64 = 500_000_000;

/// Quiescence window applied to edit events, in milliseconds
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// Largest module binary the loader accepts (16MB)
pub const MAX_MODULE_SIZE: usize = 16 * 1024 * 1024;

/// Default location of the compiled conversion module
pub const DEFAULT_MODULE_PATH: &str = "zig-out/bin/unit_data_converter.wasm";

/// Precision value meaning "let the module decide"
pub const AUTOMATIC_PRECISION: i32 = -1;
pub const MIN_PRECISION: i32 = 0;
pub const MAX_PRECISION: i32 = 10;
/// Slider position shown before the user touches it
pub const DEFAULT_PRECISION_SLIDER: i32 = 6;
