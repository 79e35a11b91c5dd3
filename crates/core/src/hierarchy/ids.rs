//! Stable 63-bit submodule identifiers (`spec.md` §4.7 step 2).

use std::hash::Hasher;

use fnv::FnvHasher;

use super::scan::ModuleSource;

const TOP_BIT_MASK: u64 = !(1u64 << 63);

/// `CUSTOM_ID` if the module declared one, else a 64-bit FNV-1a hash of
/// its name with the top bit masked to zero so the id always fits in 63
/// bits.
pub fn assign_id(module: &ModuleSource) -> u64 {
    match module.custom_id {
        Some(id) => id & TOP_BIT_MASK,
        None => hash_name(&module.name) & TOP_BIT_MASK,
    }
}

fn hash_name(name: &str) -> u64 {
    let mut hasher = FnvHasher::default();
    hasher.write(name.as_bytes());
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_custom_id_wins_over_hash() {
        let module = ModuleSource {
            name: "adder".to_string(),
            body: String::new(),
            custom_id: Some(1 << 63 | 7),
        };
        assert_eq!(assign_id(&module), 7);
    }

    #[test]
    fn hash_assignment_is_deterministic_and_masked() {
        let module = ModuleSource {
            name: "adder".to_string(),
            body: String::new(),
            custom_id: None,
        };
        let a = assign_id(&module);
        let b = assign_id(&module);
        assert_eq!(a, b);
        assert_eq!(a & (1 << 63), 0);
    }

    #[test]
    fn different_names_hash_differently() {
        let a = ModuleSource { name: "adder".to_string(), body: String::new(), custom_id: None };
        let b = ModuleSource { name: "subtractor".to_string(), body: String::new(), custom_id: None };
        assert_ne!(assign_id(&a), assign_id(&b));
    }
}
