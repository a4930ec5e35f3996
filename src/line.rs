// A single proof line and its (initially uninterpreted) justification.

use crate::prop::Prop;

/// The first-order scope map carried by each line: for every universally
/// instantiated variable currently in scope, the set of existentially
/// introduced constants that depend on it.
///
/// `im`'s persistent maps mean a line that doesn't touch `vars` (the
/// overwhelming majority of propositional-rule lines) shares its cited
/// line's map by reference count instead of deep-cloning it, and the
/// key-wise union `merge_vars` performs is cheap even when many lines cite
/// a common ancestor.
pub type VarsMap = im::HashMap<String, im::HashSet<String>>;

/// The justification a line cites, exactly as the parser produced it: a
/// rule name plus the line numbers it was given. The checker resolves this
/// against the `Context` into a concrete rule invocation; `Line` itself
/// never holds anything but this uninterpreted form (data model invariant).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Justification {
    pub name: String,
    pub args: Vec<i64>,
}

impl Justification {
    pub fn new(name: impl Into<String>, args: Vec<i64>) -> Justification {
        Justification {
            name: name.into(),
            args,
        }
    }

    pub fn is_hypothesis(&self) -> bool {
        self.name == "hyp" || self.name == "prem"
    }

    pub fn is_deduction(&self) -> bool {
        self.name == "ded"
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub num: i64,
    pub typ: Prop,
    pub just: Justification,
    pub vars: VarsMap,
}

impl Line {
    pub fn new(num: i64, typ: Prop, just: Justification) -> Line {
        Line {
            num,
            typ,
            just,
            vars: VarsMap::new(),
        }
    }
}

/// Unions `vars` maps key-wise (set union per key) — the "variable-context
/// merging" a multi-line justification performs before its own rule runs.
pub fn merge_vars<'a>(maps: impl IntoIterator<Item = &'a VarsMap>) -> VarsMap {
    let mut out = VarsMap::new();
    for map in maps {
        for (k, v) in map.iter() {
            let mut merged = out.get(k).cloned().unwrap_or_default();
            for c in v.iter() {
                merged.insert(c.clone());
            }
            out.insert(k.clone(), merged);
        }
    }
    out
}
