//! Dependency-DAG construction, topological compile ordering, and
//! blackbox-attribute injection (`spec.md` §4.7 steps 3 and 5).

use std::collections::{HashMap, HashSet};

use super::ids::assign_id;
use super::scan::ModuleSource;
use super::HierarchyError;

/// The result of scanning and ordering one source file's modules: every
/// module's assigned id, and the bottom-up compile order of the
/// submodules `top` transitively instantiates.
#[derive(Debug, Clone)]
pub struct CompilePlan {
    pub top: String,
    /// Submodules only, dependencies before dependents, `top` excluded.
    pub compile_order: Vec<String>,
    pub ids: HashMap<String, u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

/// Whether `haystack`'s body textually contains `needle` as a whole
/// identifier (word-boundary containment, `spec.md` §4.7 step 3).
fn textually_contains(haystack: &str, needle: &str) -> bool {
    let bytes = haystack.as_bytes();
    let nlen = needle.len();
    let is_word = |b: u8| b.is_ascii_alphanumeric() || b == b'_' || b == b'$';
    let mut start = 0;
    while let Some(offset) = haystack[start..].find(needle) {
        let pos = start + offset;
        let before_ok = pos == 0 || !is_word(bytes[pos - 1]);
        let after = pos + nlen;
        let after_ok = after >= bytes.len() || !is_word(bytes[after]);
        if before_ok && after_ok {
            return true;
        }
        start = pos + 1;
        if start >= haystack.len() {
            break;
        }
    }
    false
}

fn topo_visit<'a>(
    name: &'a str,
    modules: &'a HashMap<String, &'a ModuleSource>,
    edges: &'a HashMap<String, Vec<String>>,
    marks: &mut HashMap<String, Mark>,
    order: &mut Vec<String>,
) -> Result<(), HierarchyError> {
    match marks.get(name) {
        Some(Mark::Done) => return Ok(()),
        Some(Mark::Visiting) => return Err(HierarchyError::CyclicDependency(name.to_string())),
        None => {}
    }
    marks.insert(name.to_string(), Mark::Visiting);
    if let Some(deps) = edges.get(name) {
        for dep in deps {
            if !modules.contains_key(dep.as_str()) {
                continue;
            }
            topo_visit(dep, modules, edges, marks, order)?;
        }
    }
    marks.insert(name.to_string(), Mark::Done);
    order.push(name.to_string());
    Ok(())
}

/// Build the dependency-ordered compile plan for `top` out of every
/// module found by [`super::scan::scan_modules`].
pub fn build_plan(modules: &[ModuleSource], top: &str) -> Result<CompilePlan, HierarchyError> {
    let by_name: HashMap<String, &ModuleSource> =
        modules.iter().map(|m| (m.name.clone(), m)).collect();
    if !by_name.contains_key(top) {
        return Err(HierarchyError::UnknownTopModule(top.to_string()));
    }

    let names: Vec<&String> = by_name.keys().collect();
    let mut edges: HashMap<String, Vec<String>> = HashMap::new();
    for module in modules {
        let mut deps = Vec::new();
        for other in &names {
            if other.as_str() == module.name {
                continue;
            }
            if textually_contains(&module.body, other) {
                deps.push((*other).clone());
            }
        }
        edges.insert(module.name.clone(), deps);
    }

    let mut marks = HashMap::new();
    let mut order = Vec::new();
    topo_visit(top, &by_name, &edges, &mut marks, &mut order)?;
    order.retain(|name| name != top);

    let ids = modules
        .iter()
        .map(|m| (m.name.clone(), assign_id(m)))
        .collect();

    Ok(CompilePlan {
        top: top.to_string(),
        compile_order: order,
        ids,
    })
}

/// Insert a `(* blackbox *)` attribute immediately before every
/// `module <name>` declaration named in `submodules`, so an external
/// synthesizer preserves them as distinct instances instead of inlining
/// them when it compiles `source` (`spec.md` §4.7 step 5). Pure text
/// transform; never touches modules outside `submodules`.
pub fn inject_blackbox_attributes(source: &str, submodules: &HashSet<String>) -> String {
    if submodules.is_empty() {
        return source.to_string();
    }
    let is_word = |b: u8| b.is_ascii_alphanumeric() || b == b'_' || b == b'$';
    let bytes = source.as_bytes();
    let mut out = String::with_capacity(source.len() + submodules.len() * 16);
    let mut cursor = 0usize;
    let mut search_from = 0usize;
    while let Some(offset) = source[search_from..].find("module") {
        let pos = search_from + offset;
        let preceded_by_word = pos > 0 && is_word(bytes[pos - 1]);
        if preceded_by_word {
            // Part of a longer identifier (e.g. the tail of `endmodule`).
            search_from = pos + "module".len();
            continue;
        }

        let after_keyword = &source[pos + "module".len()..];
        let name_start_in_after = after_keyword.len() - after_keyword.trim_start().len();
        let trimmed = after_keyword.trim_start();
        let name_end = trimmed
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '$'))
            .unwrap_or(trimmed.len());
        let candidate = &trimmed[..name_end];

        if !candidate.is_empty() && submodules.contains(candidate) {
            out.push_str(&source[cursor..pos]);
            out.push_str("(* blackbox *)\n");
            cursor = pos;
        }

        search_from = pos + "module".len() + name_start_in_after + name_end;
    }
    out.push_str(&source[cursor..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::scan::scan_modules;

    fn plan_for(source: &str, top: &str) -> CompilePlan {
        let modules = scan_modules(source);
        build_plan(&modules, top).unwrap()
    }

    #[test]
    fn compile_order_puts_dependencies_first() {
        let source = "module top(input a); adder inst(); mux inst2(); endmodule\n\
                       module adder(input a); mux inst(); endmodule\n\
                       module mux(input a); endmodule\n";
        let plan = plan_for(source, "top");
        let pos_adder = plan.compile_order.iter().position(|n| n == "adder").unwrap();
        let pos_mux = plan.compile_order.iter().position(|n| n == "mux").unwrap();
        assert!(pos_mux < pos_adder, "mux must compile before the adder that contains it");
        assert!(!plan.compile_order.contains(&"top".to_string()));
    }

    #[test]
    fn unreferenced_sibling_modules_are_not_compiled() {
        let source = "module top(input a); child inst(); endmodule\n\
                       module child(input a); endmodule\n\
                       module unrelated(input a); endmodule\n";
        let plan = plan_for(source, "top");
        assert_eq!(plan.compile_order, vec!["child".to_string()]);
    }

    #[test]
    fn cyclic_dependency_is_rejected() {
        let source = "module a(input x); b inst(); endmodule\n\
                       module b(input x); a inst(); endmodule\n";
        let modules = scan_modules(source);
        let err = build_plan(&modules, "a").unwrap_err();
        assert!(matches!(err, HierarchyError::CyclicDependency(_)));
    }

    #[test]
    fn unknown_top_module_is_an_error() {
        let modules = scan_modules("module leaf(input a); endmodule\n");
        assert!(matches!(build_plan(&modules, "top"), Err(HierarchyError::UnknownTopModule(_))));
    }

    #[test]
    fn blackbox_attribute_is_injected_only_before_named_submodules() {
        let source = "module top(input a); endmodule\nmodule child(input a); endmodule\n";
        let mut submodules = HashSet::new();
        submodules.insert("child".to_string());
        let out = inject_blackbox_attributes(source, &submodules);
        assert!(out.contains("(* blackbox *)\nmodule child"));
        assert!(!out.contains("(* blackbox *)\nmodule top"));
    }
}
