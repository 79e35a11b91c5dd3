//! Lenient lexical module scan (`spec.md` §4.7 step 1): no real parser,
//! just enough regex to find module declarations, their bodies, and an
//! optional numeric `CUSTOM_ID` parameter.

use std::sync::OnceLock;

use regex::Regex;

/// One module as found in the combined source text: its name, full
/// declaration-to-`endmodule` body (used for dependency scanning and
/// blackbox injection), and an explicit id override if declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleSource {
    pub name: String,
    pub body: String,
    pub custom_id: Option<u64>,
}

fn module_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)\bmodule\s+([A-Za-z_][A-Za-z0-9_$]*)\s*(?:#\s*\(([^;]*?)\))?\s*\(.*?\bendmodule\b")
            .expect("static module regex is valid")
    })
}

fn custom_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"CUSTOM_ID\s*=\s*(\d+)").expect("static CUSTOM_ID regex is valid"))
}

/// Find every `module ... endmodule` block in `source`, lenient to
/// whitespace and comments inside the body (the scan never inspects
/// statement-level syntax, only the declaration header and a raw
/// containment search over the body text).
pub fn scan_modules(source: &str) -> Vec<ModuleSource> {
    module_regex()
        .captures_iter(source)
        .map(|caps| {
            let name = caps[1].to_string();
            let body = caps.get(0).unwrap().as_str().to_string();
            let params = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            let custom_id = custom_id_regex()
                .captures(params)
                .and_then(|c| c[1].parse::<u64>().ok());
            ModuleSource { name, body, custom_id }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_two_modules_in_sequence() {
        let source = "module top(input a, output b); child inst(.x(a), .y(b)); endmodule\n\
                       module child(input x, output y); assign y = x; endmodule\n";
        let modules = scan_modules(source);
        assert_eq!(modules.len(), 2);
        assert_eq!(modules[0].name, "top");
        assert_eq!(modules[1].name, "child");
    }

    #[test]
    fn picks_up_declared_custom_id() {
        let source = "module leaf #(parameter CUSTOM_ID = 4242) (input a); endmodule\n";
        let modules = scan_modules(source);
        assert_eq!(modules[0].custom_id, Some(4242));
    }

    #[test]
    fn module_without_custom_id_has_none() {
        let source = "module leaf(input a); endmodule\n";
        let modules = scan_modules(source);
        assert_eq!(modules[0].custom_id, None);
    }
}
