use std::collections::HashMap;

use super::SizeOption;

pub const SIZE_SMALL: &str = "small";
pub const SIZE_MEDIUM: &str = "medium";
pub const SIZE_LARGE: &str = "large";

pub fn is_symbolic_size(value: &str, sizes: &HashMap<String, u32>) -> bool {
    resolve_symbolic_size(value, sizes).is_some()
}

pub fn resolve_symbolic_size(value: &str, sizes: &HashMap<String, u32>) -> Option<u32> {
    let name = value.trim().to_lowercase();
    sizes.get(&name).copied()
}

// Anything that is neither a known name nor a positive pixel count is 0
pub fn resolve_size(option: Option<&SizeOption>, sizes: &HashMap<String, u32>) -> u32 {
    match option {
        Some(SizeOption::Pixels(px)) if *px > 0 => u32::try_from(*px).unwrap_or(u32::MAX),
        Some(SizeOption::Name(name)) if is_symbolic_size(name, sizes) => {
            resolve_symbolic_size(name, sizes).unwrap_or(0)
        }
        _ => 0,
    }
}
